//! UI capability set consumed by the conversation controller
//!
//! Everything visual (scrolling, highlighting, toasts, markdown rendering)
//! lives behind this trait. The controller never touches presentation state
//! except through these calls.

use crate::history::{TurnId, TurnKind};
use std::sync::Arc;

/// Handle to a visible "waiting for reply" indicator
pub trait PendingIndicator {
    /// Remove the indicator
    fn dispose(self);
}

/// UI collaborator for one chat session
pub trait ChatSurface: Send + Sync {
    type Indicator: PendingIndicator + Send;

    /// Render a turn in the transcript
    ///
    /// `id` is `None` for presentation-only entries such as the greeting.
    fn append_turn(&self, content: &str, kind: TurnKind, scroll_into_view: bool, id: Option<&TurnId>);

    fn show_pending_indicator(&self) -> Self::Indicator;

    /// Ask the user whether to send a flagged message anyway
    ///
    /// The answer comes back through the controller's `proceed` or `cancel`.
    fn show_confirmation_prompt(&self, warning: &str);

    /// Short-lived error notice that is not part of the transcript
    fn show_transient_error(&self, message: &str);

    fn input_text(&self) -> String;

    fn set_input_text(&self, text: &str);

    /// Remove every rendered turn
    fn clear_transcript(&self);
}

impl<T: ChatSurface + ?Sized> ChatSurface for Arc<T> {
    type Indicator = T::Indicator;

    fn append_turn(&self, content: &str, kind: TurnKind, scroll_into_view: bool, id: Option<&TurnId>) {
        (**self).append_turn(content, kind, scroll_into_view, id);
    }

    fn show_pending_indicator(&self) -> Self::Indicator {
        (**self).show_pending_indicator()
    }

    fn show_confirmation_prompt(&self, warning: &str) {
        (**self).show_confirmation_prompt(warning);
    }

    fn show_transient_error(&self, message: &str) {
        (**self).show_transient_error(message);
    }

    fn input_text(&self) -> String {
        (**self).input_text()
    }

    fn set_input_text(&self, text: &str) {
        (**self).set_input_text(text);
    }

    fn clear_transcript(&self) {
        (**self).clear_transcript();
    }
}
