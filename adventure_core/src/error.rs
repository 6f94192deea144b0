//! Error types for the adventure engine.

use std::path::PathBuf;

use story_graph::{ChoiceKey, LoadError, NodeKey};

use crate::config::{ConfigError, Messages};

/// Failures of a single start or choose request.
///
/// None of these leave a session in a changed state. A choice letter that is
/// well-formed but not offered by the current node is not an error; the engine
/// answers it with a re-rendered reply instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdventureError {
    /// The story has no `start` node.
    #[error("story has no start node")]
    NoStartNode,

    /// The quota gate refused a new playthrough today.
    #[error("daily play limit reached")]
    DailyLimitReached,

    /// The user has no active playthrough.
    #[error("user is not playing")]
    NotPlaying,

    /// The input does not reduce to a single letter.
    #[error("invalid choice input {input:?}")]
    InvalidChoiceFormat { input: String },

    /// An option points at a node that does not exist, or at an empty
    /// weighted table.
    #[error("broken link from '{from}' via option {choice} to {}", describe_target(.target))]
    BrokenLink {
        from: NodeKey,
        choice: ChoiceKey,
        target: Option<NodeKey>,
    },
}

fn describe_target(target: &Option<NodeKey>) -> String {
    match target {
        Some(key) => format!("missing node '{key}'"),
        None => "no target".to_string(),
    }
}

impl AdventureError {
    /// User-facing guidance for this failure.
    pub fn user_message<'a>(&self, messages: &'a Messages) -> &'a str {
        match self {
            AdventureError::NoStartNode => &messages.no_start_node,
            AdventureError::DailyLimitReached => &messages.daily_limit_reached,
            AdventureError::NotPlaying => &messages.not_playing,
            AdventureError::InvalidChoiceFormat { .. } => &messages.invalid_choice_format,
            AdventureError::BrokenLink { .. } => &messages.content_error,
        }
    }

    /// Whether the failure points at a defect in the story data or setup
    /// rather than at the player's input.
    pub fn is_content_defect(&self) -> bool {
        matches!(
            self,
            AdventureError::NoStartNode | AdventureError::BrokenLink { .. }
        )
    }
}

/// Failures while composing an engine. An engine that fails to compose must
/// not serve traffic.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("story data {path} has no 'start' node")]
    NoStartNode { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let messages = Messages::default();

        assert_eq!(
            AdventureError::NotPlaying.user_message(&messages),
            messages.not_playing
        );
        assert_eq!(
            AdventureError::InvalidChoiceFormat { input: "??".into() }.user_message(&messages),
            messages.invalid_choice_format
        );
    }

    #[test]
    fn test_broken_link_display() {
        let choice = ChoiceKey::parse_input("b").unwrap();
        let err = AdventureError::BrokenLink {
            from: NodeKey::start(),
            choice,
            target: Some(NodeKey::new("void")),
        };
        assert_eq!(
            err.to_string(),
            "broken link from 'start' via option B to missing node 'void'"
        );
        assert!(err.is_content_defect());

        let err = AdventureError::BrokenLink {
            from: NodeKey::start(),
            choice,
            target: None,
        };
        assert!(err.to_string().ends_with("to no target"));
    }

    #[test]
    fn test_player_errors_are_not_content_defects() {
        assert!(!AdventureError::NotPlaying.is_content_defect());
        assert!(!AdventureError::DailyLimitReached.is_content_defect());
    }
}
