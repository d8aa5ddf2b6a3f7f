//! Send/confirm exchange state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! transition function maps a state and an event to a new state plus the
//! effects the controller must carry out. No I/O happens here.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::ExchangeState;
pub use transition::{transition, TransitionError, TransitionResult, DEFAULT_CONFIRMATION_WARNING};
