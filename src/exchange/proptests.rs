//! Property-based tests for the exchange state machine

use super::*;
use crate::history::TurnKind;
use crate::transport::{SendResponse, TransportErrorKind};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ]{0,29}"
}

fn arb_error_kind() -> impl Strategy<Value = TransportErrorKind> {
    prop_oneof![
        Just(TransportErrorKind::Network),
        Just(TransportErrorKind::RateLimit),
        Just(TransportErrorKind::ServerError),
        Just(TransportErrorKind::Auth),
        Just(TransportErrorKind::InvalidRequest),
        Just(TransportErrorKind::InvalidResponse),
        Just(TransportErrorKind::Unknown),
    ]
}

fn arb_optional_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), Just(Some(String::new())), arb_text().prop_map(Some)]
}

fn arb_response() -> impl Strategy<Value = SendResponse> {
    (any::<bool>(), arb_optional_text(), arb_optional_text()).prop_map(
        |(requires_confirmation, warning, response)| SendResponse {
            requires_confirmation,
            warning,
            response,
        },
    )
}

fn arb_state() -> impl Strategy<Value = ExchangeState> {
    prop_oneof![
        Just(ExchangeState::Idle),
        (arb_text(), any::<bool>()).prop_map(|(held_text, confirmed)| {
            ExchangeState::AwaitingResponse {
                held_text,
                confirmed,
            }
        }),
        (arb_text(), arb_text()).prop_map(|(held_text, warning)| {
            ExchangeState::AwaitingConfirmation { held_text, warning }
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::UserSubmit { text }),
        Just(Event::Proceed),
        Just(Event::Cancel),
        arb_response().prop_map(|response| Event::ResponseReceived { response }),
        (arb_error_kind(), arb_text())
            .prop_map(|(kind, message)| Event::TransportFailed { kind, message }),
    ]
}

// ============================================================================
// Validity Checkers
// ============================================================================

fn count_sends(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::SendChat { .. }))
        .count()
}

fn effects_are_valid(effects: &[Effect], new_state: &ExchangeState) -> bool {
    // A request goes out only when entering AwaitingResponse, and only one
    let sends = count_sends(effects);
    if sends > 1 || (sends == 1 && !matches!(new_state, ExchangeState::AwaitingResponse { .. })) {
        return false;
    }

    // Prompts only when entering AwaitingConfirmation
    let prompts = effects
        .iter()
        .any(|e| matches!(e, Effect::PromptConfirmation { .. }));
    if prompts && !matches!(new_state, ExchangeState::AwaitingConfirmation { .. }) {
        return false;
    }

    // Recorded turns are persisted afterwards
    let last_record = effects
        .iter()
        .rposition(|e| matches!(e, Effect::RecordTurn { .. }));
    let last_persist = effects
        .iter()
        .rposition(|e| matches!(e, Effect::PersistHistory));
    match (last_record, last_persist) {
        (Some(record), Some(persist)) => record < persist,
        (Some(_), None) => false,
        _ => true,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Any event sequence leaves consistent effects, and rejected events
    // leave the state untouched
    #[test]
    fn prop_sequences_stay_consistent(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = ExchangeState::Idle;
        let mut in_flight = 0usize;

        for event in events {
            match transition(&state, event) {
                Ok(result) => {
                    prop_assert!(
                        effects_are_valid(&result.effects, &result.new_state),
                        "Invalid effects for state {:?}: {:?}",
                        result.new_state,
                        result.effects
                    );
                    in_flight = match result.new_state {
                        ExchangeState::AwaitingResponse { .. } => {
                            in_flight + count_sends(&result.effects)
                        }
                        _ => 0,
                    };
                    // At most one request outstanding
                    prop_assert!(in_flight <= 1);
                    state = result.new_state;
                }
                Err(_) => { /* Rejected events are fine */ }
            }
        }
    }

    // Transitions are pure
    #[test]
    fn prop_transition_is_deterministic(state in arb_state(), event in arb_event()) {
        let first = transition(&state, event.clone());
        let second = transition(&state, event);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "Diverged: {:?} vs {:?}", a, b),
        }
    }

    // A fresh submission is only accepted when idle
    #[test]
    fn prop_submit_only_from_idle(state in arb_state(), text in arb_text()) {
        let result = transition(&state, Event::UserSubmit { text });
        prop_assert_eq!(result.is_ok(), state.is_idle());
    }

    // Proceed sends exactly the held text with the flag set
    #[test]
    fn prop_proceed_sends_held_text(held in arb_text(), warning in arb_text()) {
        let state = ExchangeState::AwaitingConfirmation {
            held_text: held.clone(),
            warning,
        };
        let result = transition(&state, Event::Proceed).unwrap();
        prop_assert_eq!(
            result.effects,
            vec![Effect::SendChat { text: held, confirmed: true }]
        );
    }

    // Replies to a request in flight always settle, warning before assistant
    #[test]
    fn prop_response_settles(
        held in arb_text(),
        confirmed in any::<bool>(),
        response in arb_response(),
    ) {
        let state = ExchangeState::AwaitingResponse { held_text: held.clone(), confirmed };
        let wants_confirmation = response.requires_confirmation && !confirmed;
        let result = transition(&state, Event::ResponseReceived { response }).unwrap();

        if wants_confirmation {
            prop_assert_eq!(result.new_state.held_text(), Some(held.as_str()));
        } else {
            prop_assert!(result.new_state.is_idle());
            let kinds: Vec<TurnKind> = result
                .effects
                .iter()
                .filter_map(|e| match e {
                    Effect::RecordTurn { kind, content } => {
                        assert!(!content.is_empty());
                        Some(*kind)
                    }
                    _ => None,
                })
                .collect();
            prop_assert!(kinds.windows(2).all(|w| w[0] == TurnKind::Warning && w[1] == TurnKind::Assistant));
            prop_assert!(!kinds.contains(&TurnKind::User));
        }
    }

    // Failures always produce exactly one warning turn
    #[test]
    fn prop_failure_records_one_warning(
        held in arb_text(),
        confirmed in any::<bool>(),
        kind in arb_error_kind(),
    ) {
        let state = ExchangeState::AwaitingResponse { held_text: held, confirmed };
        let result = transition(&state, Event::TransportFailed { kind, message: String::new() }).unwrap();
        prop_assert!(result.new_state.is_idle());
        prop_assert_eq!(
            result.effects,
            vec![Effect::record_warning(kind.user_message()), Effect::PersistHistory]
        );
    }
}
