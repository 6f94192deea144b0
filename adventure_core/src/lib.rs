//! # Adventure Core
//!
//! The traversal engine of the branching adventure. This crate reads the
//! story from `story_graph`, tracks where each player stands, resolves their
//! choices (including weighted-random branches) and turns nodes into
//! presentation-agnostic replies.
//!
//! ## Core Components
//!
//! - **session**: Per-user position in the story, guarded per user
//! - **engine**: Start and choose operations, weighted branch selection
//! - **format**: Builds replies with text, media and choice rows
//! - **collaborators**: Media lookup and daily quota seams
//! - **config**: TOML configuration with default and user layers
//!
//! ## Design Philosophy
//!
//! - **Injected**: The engine is constructed explicitly with its story and collaborators
//! - **Ephemeral**: Sessions live in memory only and end when an ending is reached
//! - **Forgiving**: Content defects are reported, never allowed to corrupt a session

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod session;

pub use collaborators::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use format::*;
pub use session::*;
