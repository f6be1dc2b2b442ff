//! Short-lived buffer of typed characters for label jump-assignment.

use std::time::Duration;

use web_time::Instant;

/// Accumulates typed characters; expires after a period of inactivity.
#[derive(Debug, Clone)]
pub struct PrefixBuffer {
    text: String,
    last_input: Option<Instant>,
    timeout: Duration,
}

impl PrefixBuffer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            text: String::new(),
            last_input: None,
            timeout,
        }
    }

    /// Append `ch` typed at `now`, first discarding the buffer if it expired.
    pub fn push(&mut self, ch: char, now: Instant) -> &str {
        let expired = self
            .last_input
            .is_none_or(|last| now.duration_since(last) > self.timeout);
        if expired {
            self.text.clear();
        }
        self.text.push(ch);
        self.last_input = Some(now);
        &self.text
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.last_input = None;
    }
}
