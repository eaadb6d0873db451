use std::sync::{Arc, Mutex};

/// Sink for human readable, non-fatal error messages.
///
/// The UI may surface these or ignore them.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Reporter that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Reporter that keeps every message for later display
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Remove and return all messages
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, message: &str) {
        tracing::debug!(message, "error reported");
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter_drain() {
        let reporter = CollectingReporter::new();
        reporter.report("timeout accessing geonames.org");
        reporter.report("geonames.org did not provide reverse lookup information");

        assert_eq!(reporter.messages().len(), 2);
        assert_eq!(reporter.drain().len(), 2);
        assert!(reporter.messages().is_empty());
    }
}
