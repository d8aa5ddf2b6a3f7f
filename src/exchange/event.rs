//! Events that drive the exchange

use crate::transport::{SendResponse, TransportErrorKind};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// Fresh submission; `text` is already trimmed
    UserSubmit { text: String },
    /// Send the held text with the confirmation flag set
    Proceed,
    /// Drop the held text
    Cancel,

    // Transport events
    ResponseReceived { response: SendResponse },
    TransportFailed {
        kind: TransportErrorKind,
        message: String,
    },
}
