//! GC Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{BackingStore, LruCacher};

// == GC Handle ==
/// Handle to a running GC task.
///
/// Dropping the handle leaves the task running for the life of the runtime.
#[derive(Debug)]
pub struct GcHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl GcHandle {
    /// Signals the task to stop and waits for it to finish.
    ///
    /// A sweep already in progress completes first.
    pub async fn shutdown(self) {
        // The task may already be gone if it was aborted
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            debug!(error = %err, "GC task ended abnormally");
        }
    }

    /// Cancels the task without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Shortest pause between two sweeps; a zero `gc_interval` is raised to it.
pub const MIN_GC_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a background task that sweeps `cacher` every `gc_interval`.
///
/// The first sweep runs one interval after the call. Intervals below
/// [`MIN_GC_INTERVAL`] are clamped to it. Each tick runs
/// [`LruCacher::sweep`], which takes the same lock as foreground
/// operations and removes at most `gc_max_removed` entries.
///
/// # Example
/// ```ignore
/// let cacher = Arc::new(LruCacher::new(MemoryStore::new(), Duration::from_secs(60), 1000));
/// let gc = spawn_gc_task(cacher.clone());
/// // Later, during shutdown:
/// gc.shutdown().await;
/// ```
pub fn spawn_gc_task<V, S>(cacher: Arc<LruCacher<V, S>>) -> GcHandle
where
    V: 'static,
    S: BackingStore<V> + 'static,
{
    let period = cacher.config().gc_interval.max(MIN_GC_INTERVAL);
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!(interval = ?period, "Starting GC task");

        // The next tick is scheduled from the previous deadline, before the sweep runs
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut listening = true;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    cacher.sweep();
                }
                result = &mut shutdown_rx, if listening => {
                    if result.is_ok() {
                        break;
                    }
                    // Handle dropped without a shutdown request: keep sweeping
                    listening = false;
                }
            }
        }

        info!("GC task stopped");
    });

    GcHandle { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cache::{ManualClock, MemoryStore};
    use crate::config::CacheConfig;

    fn test_cacher(
        gc_interval: Duration,
        gc_max_removed: usize,
    ) -> (Arc<LruCacher<String, MemoryStore<String>>>, ManualClock) {
        let clock = ManualClock::new();
        let config = CacheConfig {
            expired: Duration::from_secs(2),
            max_element_size: 100,
            gc_interval,
            gc_max_removed,
        };
        let cacher = LruCacher::with_clock(MemoryStore::new(), config, Arc::new(clock.clone()));
        (Arc::new(cacher), clock)
    }

    #[tokio::test]
    async fn test_gc_task_removes_expired_entries() {
        let (cacher, clock) = test_cacher(Duration::from_millis(50), 100);

        cacher.put("expire_soon", "value".to_string()).unwrap();
        clock.advance(Duration::from_secs(3));

        let gc = spawn_gc_task(cacher.clone());
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The sweep removed it without any lazy lookup
        assert!(cacher.is_empty());
        assert!(cacher.store().is_empty());
        assert!(cacher.stats().sweeps >= 1);

        gc.shutdown().await;
    }

    #[tokio::test]
    async fn test_gc_task_preserves_valid_entries() {
        let (cacher, _clock) = test_cacher(Duration::from_millis(50), 100);

        cacher.put("long_lived", "value".to_string()).unwrap();

        let gc = spawn_gc_task(cacher.clone());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cacher.stats().sweeps >= 1);
        assert_eq!(cacher.get("long_lived"), Some("value".to_string()));

        gc.shutdown().await;
    }

    #[tokio::test]
    async fn test_gc_task_first_sweep_waits_one_interval() {
        let (cacher, _clock) = test_cacher(Duration::from_secs(60), 100);

        let gc = spawn_gc_task(cacher.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cacher.stats().sweeps, 0);
        gc.shutdown().await;
    }

    #[tokio::test]
    async fn test_gc_task_shutdown_stops_sweeping() {
        let (cacher, _clock) = test_cacher(Duration::from_millis(20), 100);

        let gc = spawn_gc_task(cacher.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        gc.shutdown().await;

        let sweeps = cacher.stats().sweeps;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cacher.stats().sweeps, sweeps);
    }

    #[tokio::test]
    async fn test_gc_task_keeps_running_when_handle_dropped() {
        let (cacher, _clock) = test_cacher(Duration::from_millis(20), 100);

        drop(spawn_gc_task(cacher.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        let sweeps = cacher.stats().sweeps;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cacher.stats().sweeps > sweeps);
    }

    #[tokio::test]
    async fn test_gc_task_can_be_aborted() {
        let (cacher, _clock) = test_cacher(Duration::from_secs(1), 100);

        let gc = spawn_gc_task(cacher);
        gc.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(gc.is_finished(), "Task should be finished after abort");
        // Shutting down an aborted task is harmless
        gc.shutdown().await;
    }

    #[tokio::test]
    async fn test_gc_task_zero_interval_is_clamped() {
        let (cacher, clock) = test_cacher(Duration::ZERO, 100);

        cacher.put("expire_soon", "value".to_string()).unwrap();
        clock.advance(Duration::from_secs(3));

        let gc = spawn_gc_task(cacher.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!gc.is_finished(), "GC task should survive a zero interval");
        assert!(cacher.stats().sweeps >= 1);
        assert!(cacher.is_empty());

        gc.shutdown().await;
    }

    #[test]
    fn test_gc_task_sweeps_are_bounded() {
        tokio_test::block_on(async {
            let (cacher, clock) = test_cacher(Duration::from_millis(30), 4);

            for i in 0..10 {
                cacher.put(&format!("key-{i}"), format!("data-{i}")).unwrap();
            }
            clock.advance(Duration::from_secs(3));

            let gc = spawn_gc_task(cacher.clone());
            // Each sweep drops at most four entries, so the backlog drains over several ticks
            tokio::time::sleep(Duration::from_millis(300)).await;
            gc.shutdown().await;

            let stats = cacher.stats();
            assert!(cacher.is_empty());
            assert_eq!(stats.expirations, 10);
            assert!(stats.sweeps >= 3);
        });
    }
}
