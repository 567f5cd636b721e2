// Cooperative stop signal shared by the scheduler and the price monitor
use std::time::Duration;
use tokio::sync::watch;

/// Owner side: flips the flag once
#[derive(Debug)]
pub struct StopHandle {
    sender: watch::Sender<bool>,
}

/// Worker side: cheap to clone, checked between polls and ticks
#[derive(Debug, Clone)]
pub struct StopSignal {
    receiver: watch::Receiver<bool>,
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (sender, receiver) = watch::channel(false);
    (StopHandle { sender }, StopSignal { receiver })
}

impl StopHandle {
    pub fn stop(&self) {
        self.sender.send_replace(true);
    }
}

impl StopSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (handle, signal) = stop_channel();
        // A closed channel keeps reporting `false`
        drop(handle);
        signal
    }

    pub fn is_stopped(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Sleep for `duration` unless a stop arrives first. Returns `false` when stopped.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_stopped() {
            return false;
        }

        let mut receiver = self.receiver.clone();
        let stop_arrived = tokio::select! {
            _ = tokio::time::sleep(duration) => None,
            changed = receiver.wait_for(|stopped| *stopped) => Some(changed.is_ok()),
        };

        match stop_arrived {
            None => !self.is_stopped(),
            Some(true) => false,
            Some(false) => {
                // Handle dropped without stopping
                tokio::time::sleep(duration).await;
                true
            }
        }
    }
}
