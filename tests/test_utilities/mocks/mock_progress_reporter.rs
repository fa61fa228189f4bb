use vuln_impact::prelude::*;

/// Mock ProgressReporter for testing that captures messages
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    pub messages: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn messages_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.get_messages()
            .into_iter()
            .filter(|m| m.starts_with(prefix))
            .collect()
    }
}

impl ProgressReporter for MockProgressReporter {
    fn start(&self, total: usize, label: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Start: {} ({})", label, total));
    }

    fn advance(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Advance: {}", message));
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Warn: {}", message));
    }

    fn finish(&self, summary: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Finish: {}", summary));
    }
}
