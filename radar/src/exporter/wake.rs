use std::{sync::Arc, time::Duration};

use tokio::sync::Notify;

/// Wakes the exporter when new scans arrive.
///
/// Signals never block and never queue: any number of signals raised while
/// nobody waits collapse into a single pending wake up.
#[derive(Debug, Clone, Default)]
pub struct WakeSignal {
    notify: Arc<Notify>,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.notify.notify_one();
    }

    /// Waits for a signal. Returns false when `timeout` elapsed first.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.notify.notified())
            .await
            .is_ok()
    }
}
