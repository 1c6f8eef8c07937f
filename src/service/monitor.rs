use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::select;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::instrument;

use super::remote::Remote;
use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkState {
    Online,
    Offline,
}

impl LinkState {
    pub fn is_online(self) -> bool {
        matches!(self, LinkState::Online)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Online => f.write_str("online"),
            LinkState::Offline => f.write_str("offline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LinkState,
    pub to: LinkState,
}

/// Keeps the shared link-state flag honest by probing the remote's health endpoint.
///
/// Every probe takes a generation number when it starts. A result is only recorded
/// if no newer probe has been recorded already, so a slow probe cannot overwrite a
/// fresher answer.
#[derive(Clone)]
pub struct ConnectionMonitor {
    remote: Arc<dyn Remote>,
    timeout: Duration,
    state: Arc<watch::Sender<LinkState>>,
    transitions: broadcast::Sender<Transition>,
    issued: Arc<AtomicU64>,
    recorded: Arc<AtomicU64>,
}

impl std::fmt::Debug for ConnectionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMonitor")
            .field("timeout", &self.timeout)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl ConnectionMonitor {
    pub fn new(remote: Arc<dyn Remote>, timeout: Duration) -> Self {
        let (state, _) = watch::channel(LinkState::Online);
        let (transitions, _) = broadcast::channel(16);

        Self {
            remote,
            timeout,
            state: Arc::new(state),
            transitions,
            issued: Arc::default(),
            recorded: Arc::default(),
        }
    }

    /// One bounded health request. Never fails: anything but a timely answer is Offline.
    pub async fn probe(&self) -> LinkState {
        match tokio::time::timeout(self.timeout, self.remote.health()).await {
            Ok(Ok(_)) => LinkState::Online,
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "health probe failed");
                LinkState::Offline
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.timeout, "health probe timed out");
                LinkState::Offline
            }
        }
    }

    /// Probe once and record the outcome. Returns the link state afterwards, which is
    /// a newer probe's answer if one finished first.
    #[instrument(skip(self))]
    pub async fn check(&self) -> LinkState {
        let generation = self.next_generation();
        let state = self.probe().await;
        self.apply(generation, state);
        self.state()
    }

    /// Store `state` in the shared flag. Returns the transition when it differs from
    /// the previous state; only then are subscribers notified.
    pub fn record(&self, state: LinkState) -> Option<Transition> {
        let generation = self.next_generation();
        self.apply(generation, state)
    }

    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, generation: u64, state: LinkState) -> Option<Transition> {
        let mut from = state;
        let mut superseded = false;

        let changed = self.state.send_if_modified(|current| {
            if self.recorded.fetch_max(generation, Ordering::SeqCst) > generation {
                superseded = true;
                return false;
            }

            from = *current;
            if *current == state {
                return false;
            }
            *current = state;
            true
        });

        if superseded {
            tracing::debug!(generation, %state, "dropping a probe overtaken by a newer one");
            return None;
        }

        if !changed {
            return None;
        }

        let transition = Transition { from, to: state };
        match state {
            LinkState::Online => tracing::info!("connection to the remote restored"),
            LinkState::Offline => tracing::warn!("connection to the remote lost"),
        }
        let _ = self.transitions.send(transition);

        Some(transition)
    }

    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// A receiver that always sees the latest link state.
    pub fn watch(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.transitions.subscribe()
    }

    /// Check the link every `period` until the returned task is stopped.
    pub fn start_monitoring(&self, period: Duration) -> Task {
        let monitor = self.clone();

        Task::spawn(move |mut quit| async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!("monitor the remote link every {:?}", period);

            loop {
                select! {
                    _ = interval.tick() => {
                        monitor.check().await;
                    },
                    _ = &mut quit => break,
                }
            }

            tracing::debug!("link monitor stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::remote::MemoryRemote;

    fn monitor() -> (Arc<MemoryRemote>, ConnectionMonitor) {
        let remote = Arc::new(MemoryRemote::new(Vec::new()));
        let monitor = ConnectionMonitor::new(remote.clone(), Duration::from_secs(3));
        (remote, monitor)
    }

    #[tokio::test]
    async fn only_state_changes_are_announced() {
        let (remote, monitor) = monitor();
        let mut transitions = monitor.subscribe();

        assert_eq!(monitor.check().await, LinkState::Online);
        assert_eq!(monitor.check().await, LinkState::Online);
        remote.set_online(false);
        assert_eq!(monitor.check().await, LinkState::Offline);
        assert_eq!(monitor.check().await, LinkState::Offline);

        assert_eq!(
            transitions.try_recv().unwrap(),
            Transition {
                from: LinkState::Online,
                to: LinkState::Offline
            }
        );
        assert!(transitions.try_recv().is_err());
        assert_eq!(monitor.state(), LinkState::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_health_counts_as_offline() {
        let (remote, monitor) = monitor();
        remote.set_latency(Duration::from_secs(10));

        assert_eq!(monitor.probe().await, LinkState::Offline);
    }

    #[tokio::test]
    async fn record_reports_the_previous_state() {
        let (_remote, monitor) = monitor();

        assert_eq!(monitor.record(LinkState::Online), None);
        assert_eq!(
            monitor.record(LinkState::Offline),
            Some(Transition {
                from: LinkState::Online,
                to: LinkState::Offline
            })
        );
        assert_eq!(
            monitor.record(LinkState::Online).map(|t| t.from),
            Some(LinkState::Offline)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_check_does_not_overwrite_a_newer_one() {
        let (remote, monitor) = monitor();
        let mut transitions = monitor.subscribe();

        remote.set_latency(Duration::from_secs(10));
        let slow = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.check().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        remote.set_latency(Duration::ZERO);
        assert_eq!(monitor.check().await, LinkState::Online);

        assert_eq!(slow.await.unwrap(), LinkState::Online);
        assert_eq!(monitor.state(), LinkState::Online);
        assert!(transitions.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn monitoring_probes_on_every_tick() {
        let (remote, monitor) = monitor();
        let mut link = monitor.watch();
        let task = monitor.start_monitoring(Duration::from_secs(30));

        remote.set_online(false);
        tokio::time::sleep(Duration::from_secs(31)).await;
        link.changed().await.unwrap();
        assert_eq!(*link.borrow(), LinkState::Offline);

        remote.set_online(true);
        tokio::time::sleep(Duration::from_secs(30)).await;
        link.changed().await.unwrap();
        assert_eq!(*link.borrow(), LinkState::Online);

        task.shutdown().await;
    }
}
