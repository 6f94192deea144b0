//! Options and their next-node rules.

use serde::{Deserialize, Serialize};

use super::NodeKey;

/// One selectable choice on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryOption {
    /// Display text for the choice.
    #[serde(rename = "text", default)]
    pub label: String,

    /// Where the choice leads.
    pub next: Next,
}

impl StoryOption {
    pub fn new(label: impl Into<String>, next: Next) -> Self {
        Self {
            label: label.into(),
            next,
        }
    }
}

/// Next-node rule of an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Next {
    /// Always lead to this node.
    Fixed(NodeKey),
    /// Pick one target at random using the declared probabilities.
    Weighted(Vec<Branch>),
}

impl Next {
    /// Create a fixed transition.
    pub fn fixed(target: impl Into<NodeKey>) -> Self {
        Next::Fixed(target.into())
    }

    /// Create a weighted transition from `(target, probability)` pairs.
    pub fn weighted<K: Into<NodeKey>>(branches: impl IntoIterator<Item = (K, f64)>) -> Self {
        Next::Weighted(
            branches
                .into_iter()
                .map(|(node, probability)| Branch::new(node, probability))
                .collect(),
        )
    }
}

/// A weighted target of a random transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBranch")]
pub struct Branch {
    pub node: NodeKey,
    /// Probability from 0.0 to 1.0. Tables are advisory and need not sum to 1.0.
    pub probability: f64,
}

impl Branch {
    pub fn new(node: impl Into<NodeKey>, probability: f64) -> Self {
        Self {
            node: node.into(),
            probability,
        }
    }
}

#[derive(Deserialize)]
struct RawBranch {
    node: NodeKey,
    probability: f64,
}

impl TryFrom<RawBranch> for Branch {
    type Error = String;

    fn try_from(raw: RawBranch) -> Result<Self, Self::Error> {
        if !raw.probability.is_finite() || raw.probability < 0.0 {
            return Err(format!(
                "branch to {} has invalid probability {}",
                raw.node, raw.probability
            ));
        }
        Ok(Branch::new(raw.node, raw.probability))
    }
}
