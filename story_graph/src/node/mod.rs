//! Node definitions for the story graph.

mod option;

pub use option::*;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;

/// Unique identifier for story nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Key of the node every playthrough begins at.
    pub const START: &'static str = "start";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key of the entry node.
    pub fn start() -> Self {
        Self::new(Self::START)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for NodeKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The letter a player sends to pick an option, always `A`..=`Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChoiceKey(char);

impl ChoiceKey {
    /// Normalize free-form player input into a choice letter.
    ///
    /// Surrounding whitespace is trimmed and the letter is uppercased, so
    /// `" b "` becomes `B`. Anything other than exactly one ASCII letter is
    /// rejected.
    pub fn parse_input(raw: &str) -> Option<Self> {
        let mut chars = raw.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(Self(c.to_ascii_uppercase())),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        self.0
    }
}

impl TryFrom<char> for ChoiceKey {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        if c.is_ascii_uppercase() {
            Ok(Self(c))
        } else {
            Err(format!("option key must be a single uppercase letter, got {c:?}"))
        }
    }
}

impl TryFrom<String> for ChoiceKey {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(format!(
                "option key must be a single uppercase letter, got {raw:?}"
            )),
        }
    }
}

impl From<ChoiceKey> for String {
    fn from(key: ChoiceKey) -> Self {
        key.0.to_string()
    }
}

impl std::fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single narrative beat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    /// Narrative body. Absent text is rendered with a placeholder.
    #[serde(default)]
    pub text: Option<String>,

    /// Ordered media references; the data file may give one string or a list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<String>,

    /// Choices keyed by letter, in the order the story declares them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: IndexMap<ChoiceKey, StoryOption>,

    /// Terminal node. Options of an ending are never offered.
    #[serde(rename = "is_end", default, deserialize_with = "null_as_default")]
    pub is_end: bool,
}

impl StoryNode {
    /// Create a node with the given narrative text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Append a media reference.
    pub fn with_image(mut self, reference: impl Into<String>) -> Self {
        self.image.push(reference.into());
        self
    }

    /// Add an option under the given letter.
    pub fn with_option(mut self, key: ChoiceKey, label: impl Into<String>, next: Next) -> Self {
        self.options.insert(key, StoryOption::new(label, next));
        self
    }

    /// Mark the node as an ending.
    pub fn ending(mut self) -> Self {
        self.is_end = true;
        self
    }

    /// Look up the option for a letter.
    ///
    /// Endings never expose options, whatever the data says.
    pub fn option(&self, key: ChoiceKey) -> Option<&StoryOption> {
        if self.is_end {
            return None;
        }
        self.options.get(&key)
    }

    /// Whether the node offers at least one choice.
    pub fn has_choices(&self) -> bool {
        !self.is_end && !self.options.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(reference)) => vec![reference],
        Some(OneOrMany::Many(references)) => references,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
