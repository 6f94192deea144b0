//! Configuration for the adventure: where the story lives, daily limits and
//! every fixed string shown to players.
//!
//! Configuration is TOML. A deployment usually ships a defaults file and lets
//! operators override individual keys in an optional user file:
//!
//! ```toml
//! story_data_file = "story_data.json"
//! image_dir = "images/"
//! daily_limit = 2
//!
//! [messages]
//! ending_marker = "~ The End ~"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level adventure configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdventureConfig {
    /// Story document, relative to the resource root unless absolute.
    pub story_data_file: PathBuf,

    /// Image directory, relative to the resource root unless absolute.
    pub image_dir: PathBuf,

    /// Completed playthroughs allowed per user per day. Zero disables the limit.
    pub daily_limit: u32,

    /// Maximum choices per presentation row.
    pub choices_per_row: usize,

    /// Command a rendered choice sends back, followed by the letter.
    pub choose_command: String,

    pub messages: Messages,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self {
            story_data_file: PathBuf::from("story_data.json"),
            image_dir: PathBuf::from("images/"),
            daily_limit: 2,
            choices_per_row: 2,
            choose_command: "/choose".to_string(),
            messages: Messages::default(),
        }
    }
}

impl AdventureConfig {
    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let table = read_table(path.as_ref())?;
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Read a defaults file and overlay an optional user file on top of it.
    ///
    /// Tables are merged key by key, so a user file that only sets
    /// `messages.ending_marker` keeps every other message from the defaults.
    /// A user file that does not exist is not an error.
    pub fn load_layered(
        defaults: impl AsRef<Path>,
        user: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let mut merged = read_table(defaults.as_ref())?;

        let user = user.as_ref();
        if user.exists() {
            merge_tables(&mut merged, read_table(user)?);
        } else {
            tracing::debug!(path = %user.display(), "No user config, using defaults only");
        }

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Resolve relative story and image paths against a resource root.
    pub fn resolve_paths(&self, resource_root: &Path) -> (PathBuf, PathBuf) {
        (
            resource_root.join(&self.story_data_file),
            resource_root.join(&self.image_dir),
        )
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(source.parse::<toml::Table>()?)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

/// Fixed strings shown to players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Appended to a node that offers choices.
    pub choose_prompt: String,
    /// Appended to a non-ending node without choices.
    pub no_options: String,
    /// Appended when the picked letter is not offered.
    pub invalid_choice: String,
    /// Appended when an ending is reached.
    pub ending_marker: String,
    /// Shown for a node without text.
    pub unknown_place: String,

    pub not_playing: String,
    pub invalid_choice_format: String,
    pub content_error: String,
    pub no_start_node: String,
    pub daily_limit_reached: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            choose_prompt: "--------------------\nPick one of the options below:".to_string(),
            no_options: "--------------------\nThere seem to be no clear options here.".to_string(),
            invalid_choice: "That is not one of the options, please choose again from the list above."
                .to_string(),
            ending_marker: "🎉 The End 🎉".to_string(),
            unknown_place: "You arrive somewhere unfamiliar...".to_string(),
            not_playing: "You have not started an adventure yet. Send /start to begin.".to_string(),
            invalid_choice_format: "Please send a valid option letter (A, B, C...).".to_string(),
            content_error: "Something is wrong with the story here, please contact an administrator."
                .to_string(),
            no_start_node: "The adventure is missing its starting point, please contact an administrator."
                .to_string(),
            daily_limit_reached: "You have reached today's adventure limit, come back tomorrow!"
                .to_string(),
        }
    }
}
