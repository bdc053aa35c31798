use crate::state::messages::NetworkRequest;
use log::debug;
use playoff_api::auth::WATCH_INTERVAL_SECS;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Ticks the network worker so it can refresh or expire the session token.
pub struct SessionWatchdog {
    network_requests: mpsc::Sender<NetworkRequest>,
    cancel: watch::Receiver<bool>,
    period: Duration,
}

impl SessionWatchdog {
    pub fn spawn(network_requests: mpsc::Sender<NetworkRequest>) -> WatchdogHandle {
        Self::spawn_with_period(network_requests, Duration::from_secs(WATCH_INTERVAL_SECS))
    }

    pub fn spawn_with_period(
        network_requests: mpsc::Sender<NetworkRequest>,
        period: Duration,
    ) -> WatchdogHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let watchdog = Self { network_requests, cancel: cancel_rx, period };
        WatchdogHandle { cancel: cancel_tx, task: tokio::spawn(watchdog.run()) }
    }

    async fn run(mut self) {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticks.tick().await;

        loop {
            tokio::select! {
                changed = self.cancel.changed() => {
                    if changed.is_err() || *self.cancel.borrow() {
                        debug!("session watchdog cancelled");
                        break;
                    }
                }
                _ = ticks.tick() => {
                    if self.network_requests.send(NetworkRequest::CheckSession).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Owner side of a running watchdog. Dropping it also stops the task.
pub struct WatchdogHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatchdogHandle {
    pub fn cancel(self) -> JoinHandle<()> {
        let _ = self.cancel.send(true);
        self.task
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = SessionWatchdog::spawn_with_period(tx, Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(matches!(rx.recv().await, Some(NetworkRequest::CheckSession)));
        assert!(matches!(rx.recv().await, Some(NetworkRequest::CheckSession)));

        handle.cancel().await.unwrap();
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err(), "no ticks after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = SessionWatchdog::spawn_with_period(tx, Duration::from_secs(5));
        drop(handle);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.recv().await.is_none(), "sender dropped with the task");
    }
}
