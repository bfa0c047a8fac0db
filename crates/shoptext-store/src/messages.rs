//! Message acquisition boundary.
//!
//! The host hands us chat messages by index; parsing wants "the text most
//! likely to carry shop data". The candidate order (explicit index, then
//! the latest message, then the opening message) comes from how the host
//! lays conversations out: fresh data lands at the tail, seed catalogs sit
//! in the opener.

/// A message body ready for parsing, with the id used in event signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    pub message_id: String,
    pub text: String,
}

/// Supplies message text by index. `None` index means "best candidate".
pub trait MessageSource {
    fn payload(&self, index: Option<usize>) -> Option<MessagePayload>;
}

/// In-memory conversation; each entry is one message body. Doubles as the
/// CLI's source (a file read becomes a one-message log).
#[derive(Debug, Default, Clone)]
pub struct ChatLog {
    messages: Vec<String>,
}

impl ChatLog {
    #[must_use]
    pub fn new(messages: Vec<String>) -> Self {
        ChatLog { messages }
    }

    #[must_use]
    pub fn single(text: impl Into<String>) -> Self {
        ChatLog {
            messages: vec![text.into()],
        }
    }
}

impl MessageSource for ChatLog {
    fn payload(&self, index: Option<usize>) -> Option<MessagePayload> {
        let mut candidates: Vec<usize> = Vec::new();
        if let Some(explicit) = index {
            candidates.push(explicit);
        }
        if !self.messages.is_empty() {
            candidates.push(self.messages.len() - 1);
            candidates.push(0);
        }

        for candidate in candidates {
            let Some(text) = self.messages.get(candidate) else {
                tracing::debug!(candidate, "no message at candidate index");
                continue;
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            tracing::debug!(candidate, "message payload selected");
            return Some(MessagePayload {
                message_id: candidate.to_string(),
                text: trimmed.to_string(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_index_wins() {
        let log = ChatLog::new(vec!["first".into(), "second".into(), "third".into()]);
        let payload = log.payload(Some(1)).expect("payload");
        assert_eq!(payload.message_id, "1");
        assert_eq!(payload.text, "second");
    }

    #[test]
    fn latest_non_empty_wins_without_index() {
        let log = ChatLog::new(vec!["opener".into(), "latest".into()]);
        let payload = log.payload(None).expect("payload");
        assert_eq!(payload.message_id, "1");
        assert_eq!(payload.text, "latest");
    }

    #[test]
    fn empty_latest_falls_back_to_opener() {
        let log = ChatLog::new(vec!["opener".into(), "   ".into()]);
        let payload = log.payload(None).expect("payload");
        assert_eq!(payload.message_id, "0");
        assert_eq!(payload.text, "opener");
    }

    #[test]
    fn out_of_range_index_falls_back() {
        let log = ChatLog::new(vec!["only".into()]);
        let payload = log.payload(Some(99)).expect("payload");
        assert_eq!(payload.message_id, "0");
    }

    #[test]
    fn empty_log_yields_nothing() {
        assert!(ChatLog::default().payload(None).is_none());
        assert!(ChatLog::new(vec!["  ".into()]).payload(None).is_none());
    }
}
