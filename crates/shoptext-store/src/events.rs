//! Fire-and-forget parse notifications for the surrounding UI.
//!
//! Observers must not fail: implementations swallow their own errors, and
//! the pipeline calls them without inspecting any outcome, so delivery
//! problems can never change a parse result.

/// Receives parse lifecycle signals. All methods default to no-ops.
pub trait ParseObserver {
    fn parse_requested(&self, message_id: &str) {
        let _ = message_id;
    }

    fn parse_done(&self, message_id: &str, parsed: usize, errors: &[String]) {
        let _ = (message_id, parsed, errors);
    }
}

/// Discards every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ParseObserver for NullObserver {}

/// Forwards signals to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ParseObserver for LogObserver {
    fn parse_requested(&self, message_id: &str) {
        tracing::info!(message_id, "shop parse requested");
    }

    fn parse_done(&self, message_id: &str, parsed: usize, errors: &[String]) {
        if errors.is_empty() {
            tracing::info!(message_id, parsed, "shop parse done");
        } else {
            tracing::warn!(message_id, parsed, ?errors, "shop parse done with errors");
        }
    }
}
