use std::sync::{Arc, Mutex};

use shopledger::port::{StatsEvent, StatsNotifier};

/// Thread-safe event collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<StatsEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("lock notifier events").len()
    }

    pub fn events(&self) -> Vec<StatsEvent> {
        self.events.lock().expect("lock notifier events").clone()
    }
}

impl StatsNotifier for RecordingNotifier {
    fn notify(&self, event: &StatsEvent) {
        self.events
            .lock()
            .expect("lock notifier events")
            .push(event.clone());
    }
}
