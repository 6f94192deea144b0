//! Response Formatter - turns a story node into a reply a transport can render.

use serde::Serialize;

use story_graph::{ChoiceKey, StoryNode};

use crate::collaborators::{MediaHandle, MediaResolver};
use crate::config::{AdventureConfig, Messages};

/// A rendered choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceButton {
    pub letter: ChoiceKey,
    /// Display text, e.g. `A. Go left`.
    pub label: String,
    /// Exact command the transport binds to the choice, e.g. `/choose A`.
    pub action: String,
}

/// A presentation-agnostic reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub text: String,
    /// Resolved media in declared order; unresolvable references are dropped.
    pub media: Vec<MediaHandle>,
    /// Choices grouped into rows.
    pub choices: Vec<Vec<ChoiceButton>>,
    pub is_end: bool,
    /// Set when the reply re-renders a node because the picked letter is not
    /// one of its options.
    pub rejected_choice: Option<ChoiceKey>,
}

impl Response {
    /// All choices in order, ignoring rows.
    pub fn buttons(&self) -> impl Iterator<Item = &ChoiceButton> {
        self.choices.iter().flatten()
    }

    /// The letters offered, in order.
    pub fn letters(&self) -> Vec<ChoiceKey> {
        self.buttons().map(|b| b.letter).collect()
    }

    fn append(&mut self, notice: &str) {
        self.text.push_str("\n\n");
        self.text.push_str(notice);
    }
}

/// Presentation settings for replies.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    pub messages: Messages,
    /// Maximum choices per row; zero is treated as one.
    pub choices_per_row: usize,
    pub choose_command: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        AdventureConfig::default().into()
    }
}

impl From<AdventureConfig> for FormatOptions {
    fn from(config: AdventureConfig) -> Self {
        Self {
            messages: config.messages,
            choices_per_row: config.choices_per_row,
            choose_command: config.choose_command,
        }
    }
}

/// Builds [`Response`]s from nodes.
#[derive(Debug, Clone, Default)]
pub struct ResponseFormatter {
    options: FormatOptions,
}

impl ResponseFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn messages(&self) -> &Messages {
        &self.options.messages
    }

    /// Format a node.
    ///
    /// Endings never get choices. A non-ending node with options gets one
    /// button per option in declared order plus the choose prompt; one without
    /// options gets the no-options notice, which marks a content dead end.
    pub fn format<M: MediaResolver + ?Sized>(&self, node: &StoryNode, media: &M) -> Response {
        let messages = &self.options.messages;

        let mut text = node
            .text
            .clone()
            .unwrap_or_else(|| messages.unknown_place.clone());

        let resolved = node
            .image
            .iter()
            .filter_map(|reference| media.resolve(reference))
            .collect();

        let mut choices = Vec::new();
        if node.has_choices() {
            let buttons: Vec<ChoiceButton> = node
                .options
                .iter()
                .map(|(letter, option)| ChoiceButton {
                    letter: *letter,
                    label: format!("{letter}. {}", option.label),
                    action: format!("{} {letter}", self.options.choose_command),
                })
                .collect();
            choices = buttons
                .chunks(self.options.choices_per_row.max(1))
                .map(<[ChoiceButton]>::to_vec)
                .collect();

            text.push('\n');
            text.push_str(&messages.choose_prompt);
        } else if !node.is_end {
            text.push('\n');
            text.push_str(&messages.no_options);
        }

        Response {
            text,
            media: resolved,
            choices,
            is_end: node.is_end,
            rejected_choice: None,
        }
    }

    /// Re-render a node after a letter it does not offer.
    pub fn format_rejected<M: MediaResolver + ?Sized>(
        &self,
        node: &StoryNode,
        choice: ChoiceKey,
        media: &M,
    ) -> Response {
        let mut response = self.format(node, media);
        response.append(&self.options.messages.invalid_choice);
        response.rejected_choice = Some(choice);
        response
    }

    /// Format an ending reached by a choice.
    pub fn format_ending<M: MediaResolver + ?Sized>(&self, node: &StoryNode, media: &M) -> Response {
        let mut response = self.format(node, media);
        response.is_end = true;
        response.append(&self.options.messages.ending_marker);
        response
    }
}
