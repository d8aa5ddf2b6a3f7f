//! Property-based tests for the history store
//!
//! These tests verify the store invariants across arbitrary append sequences:
//! - Length never exceeds capacity
//! - Survivors are exactly the most recent turns, in insertion order
//! - Ids are unique for the store's lifetime
//! - Context slices never contain warnings
//! - The persisted form round-trips

use super::*;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_kind() -> impl Strategy<Value = TurnKind> {
    prop_oneof![
        Just(TurnKind::User),
        Just(TurnKind::Assistant),
        Just(TurnKind::Warning),
    ]
}

fn arb_turn_input() -> impl Strategy<Value = (String, TurnKind)> {
    ("[a-zA-Z0-9 _.!?,]{0,40}", arb_kind())
}

fn arb_capacity() -> impl Strategy<Value = NonZeroUsize> {
    (1usize..25).prop_map(|n| NonZeroUsize::new(n).unwrap())
}

fn arb_conversation_id() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z0-9-]{1,12}")
}

fn build(capacity: NonZeroUsize, inputs: &[(String, TurnKind)]) -> HistoryStore {
    let mut store = HistoryStore::new(capacity);
    for (content, kind) in inputs {
        store.add_turn(content.clone(), *kind, None);
    }
    store
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: capacity bound holds after every append, and the surviving
    // turns are exactly the newest ones in insertion order
    #[test]
    fn prop_capacity_invariant(
        capacity in arb_capacity(),
        inputs in proptest::collection::vec(arb_turn_input(), 0..60)
    ) {
        let mut store = HistoryStore::new(capacity);
        let mut added: Vec<Turn> = Vec::new();

        for (content, kind) in &inputs {
            added.push(store.add_turn(content.clone(), *kind, None));
            prop_assert!(store.len() <= capacity.get());

            let expected_len = added.len().min(capacity.get());
            let expected = &added[added.len() - expected_len..];
            prop_assert_eq!(store.turns(None), expected);
        }
    }

    // Invariant 2: no two turns ever share an id, including evicted ones
    #[test]
    fn prop_ids_unique(
        capacity in arb_capacity(),
        inputs in proptest::collection::vec(arb_turn_input(), 0..80)
    ) {
        let mut store = HistoryStore::new(capacity);
        let mut seen = HashSet::new();
        for (content, kind) in inputs {
            let turn = store.add_turn(content, kind, None);
            prop_assert!(seen.insert(turn.id().clone()), "Duplicate id {}", turn.id());
        }
    }

    // Invariant 3: context slices hold only user/assistant turns, at most
    // `limit` of them, and they are the newest such turns in order
    #[test]
    fn prop_context_excludes_warnings(
        inputs in proptest::collection::vec(arb_turn_input(), 0..30),
        limit in 0usize..10
    ) {
        let store = build(NonZeroUsize::new(30).unwrap(), &inputs);
        let context = store.context_turns(limit);

        prop_assert!(context.len() <= limit);
        prop_assert!(context.iter().all(|t| t.kind() != TurnKind::Warning));

        let eligible: Vec<&Turn> = store
            .turns(None)
            .iter()
            .filter(|t| t.kind().is_context())
            .collect();
        let expected = &eligible[eligible.len().saturating_sub(limit)..];
        prop_assert_eq!(context.as_slice(), expected);
    }

    // Invariant 4: related turns are a contiguous window containing the target
    #[test]
    fn prop_related_window_contains_target(
        inputs in proptest::collection::vec(arb_turn_input(), 1..20),
        pick in any::<prop::sample::Index>(),
        window in 0usize..5
    ) {
        let store = build(NonZeroUsize::new(20).unwrap(), &inputs);
        let all = store.turns(None);
        let index = pick.index(all.len());
        let target = &all[index];

        let related = store.related_turns(target.id().as_str(), window);
        prop_assert!(related.contains(target));
        prop_assert!(related.len() <= 2 * window + 1);

        let start = index.saturating_sub(window);
        prop_assert_eq!(related, &all[start..start + related.len()]);
    }

    // Invariant 5: serialize/deserialize reproduces the store
    #[test]
    fn prop_round_trip(
        capacity in arb_capacity(),
        conversation_id in arb_conversation_id(),
        inputs in proptest::collection::vec(arb_turn_input(), 0..40)
    ) {
        let mut store = HistoryStore::new(capacity);
        store.set_conversation_id(conversation_id);
        for (content, kind) in inputs {
            store.add_turn(content, kind, None);
        }

        let json = store.to_json().unwrap();
        let restored = HistoryStore::from_json(&json).unwrap();

        prop_assert_eq!(restored.capacity(), store.capacity());
        prop_assert_eq!(restored.conversation_id(), store.conversation_id());
        prop_assert_eq!(restored.turns(None), store.turns(None));
    }
}
