//! Seams to the world outside the engine: media lookup and play quotas.
//!
//! The engine only depends on the traits; the concrete types here are the
//! reference implementations a simple deployment composes with.

mod media;
mod quota;

pub use media::*;
pub use quota::*;
