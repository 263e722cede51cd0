//! Where deletion announcements go.

/// Receives one message per deletion, before the deletion happens.
pub trait Reporter {
    fn announce(&mut self, message: &str);
}

impl<F: FnMut(&str)> Reporter for F {
    fn announce(&mut self, message: &str) {
        self(message)
    }
}

/// Forwards announcements to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn announce(&mut self, message: &str) {
        tracing::info!(target: "filejanitor::removal", "{message}");
    }
}

/// Keeps every announcement in memory.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub messages: Vec<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for Recorder {
    fn announce(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
