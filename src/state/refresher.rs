use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Asks the UI to reload the current bracket on a fixed interval. The UI
/// owns the request, so a tick goes through the same path as the reload key.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events }
    }

    pub async fn run(self) {
        let mut bracket_interval = interval(REFRESH_INTERVAL);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        bracket_interval.tick().await;

        loop {
            bracket_interval.tick().await;
            if self.ui_events.send(UiEvent::RefreshTick).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_after_each_interval() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = tokio::spawn(PeriodicRefresher::new(tx).run());

        tokio::time::sleep(REFRESH_INTERVAL / 2).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(REFRESH_INTERVAL).await;
        assert!(matches!(rx.recv().await, Some(UiEvent::RefreshTick)));
        task.abort();
    }
}
