use adventure_core::{pick_weighted, Resolution};
use proptest::prelude::*;
use story_graph::{Branch, ChoiceKey};

proptest! {
    #[test]
    fn single_letters_normalize_to_uppercase(c in proptest::char::range('a', 'z'), pad in " {0,3}") {
        let input = format!("{pad}{c}{pad}");
        let key = ChoiceKey::parse_input(&input).unwrap();
        prop_assert_eq!(key.letter(), c.to_ascii_uppercase());
    }

    #[test]
    fn longer_inputs_are_rejected(input in "[A-Za-z]{2,8}") {
        prop_assert!(ChoiceKey::parse_input(&input).is_none());
    }

    #[test]
    fn weighted_pick_returns_a_declared_target(
        weights in proptest::collection::vec(0.0f64..1.0, 1..8),
        roll in 0.0f64..1.0,
    ) {
        let branches: Vec<Branch> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| Branch::new(format!("n{i}"), *w))
            .collect();

        let resolution = pick_weighted(&branches, roll);
        let target = resolution.target().unwrap();
        prop_assert!(branches.iter().any(|b| &b.node == target));

        prop_assert_eq!(resolution.roll(), Some(roll));

        let total: f64 = weights.iter().sum();
        if let Resolution::Fallback { .. } = resolution {
            prop_assert!(total < roll);
            prop_assert_eq!(target, &branches[0].node);
        }
    }
}
