//! Resolving an option's next-node rule to a concrete target.

use rand::Rng;

use story_graph::{Branch, Next, NodeKey};

/// Outcome of resolving a next-node rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// A fixed target.
    Target(&'a NodeKey),
    /// The weighted branch the roll landed in.
    Drawn { target: &'a NodeKey, roll: f64 },
    /// The roll fell past the end of a table whose probabilities sum to less
    /// than the roll; the first declared target is used.
    Fallback { target: &'a NodeKey, roll: f64 },
    /// An empty weighted table.
    NoTarget,
}

impl<'a> Resolution<'a> {
    /// The chosen node, if any.
    pub fn target(&self) -> Option<&'a NodeKey> {
        match *self {
            Resolution::Target(target)
            | Resolution::Drawn { target, .. }
            | Resolution::Fallback { target, .. } => Some(target),
            Resolution::NoTarget => None,
        }
    }

    /// The random draw, for weighted tables that had at least one branch.
    pub fn roll(&self) -> Option<f64> {
        match *self {
            Resolution::Drawn { roll, .. } | Resolution::Fallback { roll, .. } => Some(roll),
            Resolution::Target(_) | Resolution::NoTarget => None,
        }
    }
}

/// Resolve a next-node rule, drawing from `rng` for weighted tables.
pub fn resolve_next<'a, R: Rng>(next: &'a Next, rng: &mut R) -> Resolution<'a> {
    match next {
        Next::Fixed(target) => Resolution::Target(target),
        Next::Weighted(branches) => {
            let roll: f64 = rng.gen();
            pick_weighted(branches, roll)
        }
    }
}

/// Pick a weighted branch for a roll in `[0, 1)`.
///
/// Walks the table in declared order accumulating probability and selects the
/// first branch whose cumulative probability is at least `roll`. A roll past
/// the total falls back to the first branch.
pub fn pick_weighted(branches: &[Branch], roll: f64) -> Resolution<'_> {
    let mut cumulative = 0.0;
    for branch in branches {
        cumulative += branch.probability;
        if cumulative >= roll {
            return Resolution::Drawn {
                target: &branch.node,
                roll,
            };
        }
    }

    match branches.first() {
        Some(first) => Resolution::Fallback {
            target: &first.node,
            roll,
        },
        None => Resolution::NoTarget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(entries: &[(&str, f64)]) -> Vec<Branch> {
        entries.iter().map(|(n, p)| Branch::new(*n, *p)).collect()
    }

    fn key(s: &str) -> NodeKey {
        NodeKey::new(s)
    }

    #[test]
    fn test_roll_on_boundary_selects_earlier_branch() {
        let branches = table(&[("x", 0.5), ("y", 0.5)]);
        assert_eq!(
            pick_weighted(&branches, 0.5),
            Resolution::Drawn {
                target: &key("x"),
                roll: 0.5
            }
        );
        assert_eq!(pick_weighted(&branches, 0.500001).target(), Some(&key("y")));
        assert_eq!(pick_weighted(&branches, 0.0).target(), Some(&key("x")));
    }

    #[test]
    fn test_three_way_table() {
        let branches = table(&[("a", 0.2), ("b", 0.3), ("c", 0.5)]);
        assert_eq!(pick_weighted(&branches, 0.1).target(), Some(&key("a")));
        assert_eq!(pick_weighted(&branches, 0.45).target(), Some(&key("b")));
        assert_eq!(pick_weighted(&branches, 0.99).target(), Some(&key("c")));
    }

    #[test]
    fn test_short_table_falls_back_to_first() {
        let branches = table(&[("a", 0.2), ("b", 0.3)]);
        let resolution = pick_weighted(&branches, 0.9);

        assert!(matches!(resolution, Resolution::Fallback { .. }));
        assert_eq!(resolution.target(), Some(&key("a")));
    }

    #[test]
    fn test_overfull_table_never_reaches_later_branches() {
        let branches = table(&[("a", 0.8), ("b", 0.8)]);
        assert_eq!(pick_weighted(&branches, 0.7).target(), Some(&key("a")));
        assert_eq!(pick_weighted(&branches, 0.9).target(), Some(&key("b")));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(pick_weighted(&[], 0.3), Resolution::NoTarget);
        assert_eq!(pick_weighted(&[], 0.3).target(), None);
    }

    #[test]
    fn test_fixed_ignores_rng() {
        let next = Next::fixed("hall");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let resolution = resolve_next(&next, &mut rng);
            assert_eq!(resolution, Resolution::Target(&key("hall")));
            assert_eq!(resolution.roll(), None);
        }
    }

    #[test]
    fn test_weighted_uses_rng() {
        let next = Next::weighted([("only", 1.0)]);
        let mut rng = StdRng::seed_from_u64(7);
        let resolution = resolve_next(&next, &mut rng);

        assert_eq!(resolution.target(), Some(&key("only")));
        let roll = resolution.roll().unwrap();
        assert!((0.0..1.0).contains(&roll));
    }

    #[test]
    fn test_fallback_and_empty_rolls() {
        let branches = table(&[("a", 0.1)]);
        assert_eq!(pick_weighted(&branches, 0.9).roll(), Some(0.9));
        assert_eq!(pick_weighted(&[], 0.9).roll(), None);
    }
}
