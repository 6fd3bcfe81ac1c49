//! Connectivity polling state machine.
//!
//! # Design
//! Two states, Online and Offline, starting optimistically Online. The poll
//! task samples the injected signal once per lap and emits a notification
//! only on an edge — a sample that differs from the held state. Each lap
//! schedules its own sleep with the interval belonging to the *current*
//! state, so a transition reschedules the cadence by dropping the old sleep
//! rather than branching inside a fixed-rate tick. The default configuration
//! polls faster while offline, prioritizing reconnect detection.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::event::{ApiEvent, EventSink};
use crate::transport::ConnectivitySignal;

/// Handle to a running poll task. Dropping or [`stop`]ping it aborts the
/// task; only one task runs per handle.
///
/// [`stop`]: ConnectivityMonitor::stop
pub struct ConnectivityMonitor {
    handle: JoinHandle<()>,
}

impl ConnectivityMonitor {
    /// Spawn the poll loop. Must run inside a tokio runtime.
    pub fn start(
        signal: Arc<dyn ConnectivitySignal>,
        sink: Arc<dyn EventSink>,
        online_interval: Duration,
        offline_interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut online = true;
            let mut interval = online_interval;
            loop {
                tokio::time::sleep(interval).await;
                let sampled = signal.is_online();
                if sampled == online {
                    continue;
                }
                if sampled {
                    info!("connectivity restored");
                    sink.dispatch(ApiEvent::Reconnected);
                    interval = online_interval;
                } else {
                    info!("connectivity lost");
                    sink.dispatch(ApiEvent::Disconnected);
                    interval = offline_interval;
                }
                online = sampled;
            }
        });
        Self { handle }
    }

    /// Stop polling. No further events are emitted after this returns.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    const ONLINE: Duration = Duration::from_millis(5000);
    const OFFLINE: Duration = Duration::from_millis(1000);

    fn monitor(
        initial: bool,
    ) -> (Arc<AtomicBool>, ConnectivityMonitor, mpsc::UnboundedReceiver<ApiEvent>) {
        let flag = Arc::new(AtomicBool::new(initial));
        let sampled = Arc::clone(&flag);
        let signal: Arc<dyn ConnectivitySignal> = Arc::new(move || sampled.load(Ordering::SeqCst));
        let (tx, rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::start(signal, Arc::new(tx), ONLINE, OFFLINE);
        (flag, monitor, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_on_edges_and_switches_cadence() {
        let (flag, monitor, mut rx) = monitor(false);
        let started = Instant::now();

        // Assumed online at start; first poll after the online interval
        // observes the mismatch.
        assert_eq!(rx.recv().await, Some(ApiEvent::Disconnected));
        assert_eq!(started.elapsed(), ONLINE);

        // Now polling at the offline interval: recovery is seen 1s later,
        // not 5s.
        flag.store(true, Ordering::SeqCst);
        assert_eq!(rx.recv().await, Some(ApiEvent::Reconnected));
        assert_eq!(started.elapsed(), ONLINE + OFFLINE);

        // Back on the online cadence.
        flag.store(false, Ordering::SeqCst);
        assert_eq!(rx.recv().await, Some(ApiEvent::Disconnected));
        assert_eq!(started.elapsed(), ONLINE + OFFLINE + ONLINE);

        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn no_duplicate_emission_while_state_holds() {
        let (_flag, monitor, mut rx) = monitor(false);

        assert_eq!(rx.recv().await, Some(ApiEvent::Disconnected));

        // Dozens of offline polls follow; none may emit again.
        let next = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert!(next.is_err(), "expected no event while offline holds");

        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn steady_online_emits_nothing() {
        let (_flag, monitor, mut rx) = monitor(true);

        let next = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert!(next.is_err(), "expected no event while online holds");

        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_emission() {
        let (flag, monitor, mut rx) = monitor(false);

        assert_eq!(rx.recv().await, Some(ApiEvent::Disconnected));
        monitor.stop();

        flag.store(true, Ordering::SeqCst);
        let next = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert!(matches!(next, Err(_) | Ok(None)), "expected no event after stop");
    }
}
