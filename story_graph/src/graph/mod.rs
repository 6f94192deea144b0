//! Story Graph - the loaded-once, read-only map of every story node.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::node::{NodeKey, StoryNode};

/// Errors raised while loading story data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read story data {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a JSON object of nodes.
    #[error("story data is not a JSON object of nodes: {0}")]
    Parse(#[from] serde_json::Error),

    /// A single node failed typed decoding.
    #[error("story node '{node}' is malformed: {source}")]
    MalformedNode {
        node: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The full story: node key to node definition.
///
/// Built once at startup and never mutated afterwards. Nodes are looked up by
/// key; a missing key is reported as `None`, not as a load failure.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    nodes: HashMap<NodeKey, StoryNode>,
}

impl StoryGraph {
    /// Parse a story document.
    ///
    /// Every node is decoded on its own so a malformed entry is reported
    /// together with its key.
    pub fn from_json_str(source: &str) -> Result<Self, LoadError> {
        let document: Map<String, Value> = serde_json::from_str(source)?;

        let mut nodes = HashMap::with_capacity(document.len());
        for (key, value) in document {
            let node: StoryNode = serde_json::from_value(value)
                .map_err(|source| LoadError::MalformedNode {
                    node: key.clone(),
                    source,
                })?;
            nodes.insert(NodeKey::from(key), node);
        }

        Ok(Self { nodes })
    }

    /// Read and parse a story file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let graph = Self::from_json_str(&source)?;
        tracing::info!(
            path = %path.display(),
            nodes = graph.len(),
            has_start = graph.has_start(),
            "Loaded story data"
        );
        Ok(graph)
    }

    /// Get a node by key.
    pub fn get(&self, key: &str) -> Option<&StoryNode> {
        self.nodes.get(key)
    }

    /// Check if a node exists.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Get the entry node, if the story defines one.
    pub fn start(&self) -> Option<&StoryNode> {
        self.get(NodeKey::START)
    }

    /// Check if the entry node exists.
    pub fn has_start(&self) -> bool {
        self.contains(NodeKey::START)
    }

    /// Get the total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<K: Into<NodeKey>> FromIterator<(K, StoryNode)> for StoryGraph {
    fn from_iter<I: IntoIterator<Item = (K, StoryNode)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(|(k, n)| (k.into(), n)).collect(),
        }
    }
}
