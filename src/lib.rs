//! JANE chat widget core
//!
//! Conversation history, the send/confirm exchange with the chat endpoint,
//! and the local persistence behind them. Presentation is abstracted behind
//! [`surface::ChatSurface`]; a terminal implementation ships with the crate.

pub mod config;
pub mod controller;
pub mod exchange;
pub mod history;
pub mod storage;
pub mod surface;
pub mod terminal;
pub mod transport;

#[cfg(test)]
mod testing;
