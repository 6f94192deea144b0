//! # Story Graph
//!
//! The story data crate - every node of the adventure, the choices it offers,
//! and where each choice leads. This crate is the single source of truth for
//! story content and does not contain any session or traversal logic.
//!
//! A story is loaded once from a JSON document keyed by node identifier and is
//! read-only afterwards:
//!
//! ```json
//! {
//!   "start": {
//!     "text": "A fork in the road.",
//!     "image": "fork.png",
//!     "options": {
//!       "A": { "text": "Go left", "next": "cave" },
//!       "B": { "text": "Toss a coin", "next": [
//!         { "node": "river", "probability": 0.5 },
//!         { "node": "cave", "probability": 0.5 }
//!       ] }
//!     }
//!   },
//!   "cave": { "text": "It is dark.", "is_end": true },
//!   "river": { "text": "You drown.", "is_end": true }
//! }
//! ```

pub mod graph;
pub mod node;

pub use graph::*;
pub use node::*;
