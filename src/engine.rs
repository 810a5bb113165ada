use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::models::{StatusEntry, Target};
use crate::probe;
use crate::registry::{Registry, RegistryError};
use crate::status::StatusBoard;
use crate::store::Store;

/// Owns the registry and status board and drives the check cycles. All
/// shared state sits behind its own mutex; callers go through `Arc<Monitor>`.
pub struct Monitor {
    config: MonitorConfig,
    registry: Mutex<Registry>,
    board: Mutex<StatusBoard>,
    store: Store,
    cycle_counter: AtomicU64,
}

impl Monitor {
    pub fn new(config: MonitorConfig, store: Store, saved: Vec<Target>) -> Self {
        let registry = Registry::from_saved(saved);
        let mut board = StatusBoard::new();
        for target in registry.list() {
            board.ensure(&target);
        }
        Self {
            config,
            registry: Mutex::new(registry),
            board: Mutex::new(board),
            store,
            cycle_counter: AtomicU64::new(0),
        }
    }

    /// Adds a target and persists the new list before returning, so the
    /// store never lags memory by more than one call. A failed save is
    /// reported but does not roll back the in-memory registry.
    pub async fn add_target(&self, target: Target) -> Result<(), RegistryError> {
        {
            let mut registry = self.registry.lock().await;
            registry.add(target.clone())?;
            if let Err(e) = self.store.save(&registry.list()) {
                warn!("failed to save targets: {:#}", e);
            }
        }
        self.board.lock().await.ensure(&target);
        info!("added {}", target);
        Ok(())
    }

    pub async fn remove_target(&self, target: &Target) -> Result<(), RegistryError> {
        {
            let mut registry = self.registry.lock().await;
            registry.remove(target)?;
            if let Err(e) = self.store.save(&registry.list()) {
                warn!("failed to save targets: {:#}", e);
            }
        }
        self.board.lock().await.forget(target);
        info!("removed {}", target);
        Ok(())
    }

    /// Registry-ordered view of every target with its current status.
    pub async fn snapshot(&self) -> Vec<(Target, StatusEntry)> {
        let targets = self.registry.lock().await.list();
        let board = self.board.lock().await;
        targets
            .into_iter()
            .map(|target| {
                let entry = board.get(&target);
                (target, entry)
            })
            .collect()
    }

    /// Runs one check cycle: snapshot the registry, announce Pending for
    /// every snapshot target, then fan out one probe task per target. Each
    /// task reports into the board on its own as it finishes; the returned
    /// handles exist only so callers who care (tests, the cycle watcher)
    /// can observe completion.
    pub async fn run_cycle(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let targets = self.registry.lock().await.list();
        let cycle = self.cycle_counter.fetch_add(1, Ordering::Relaxed) + 1;

        {
            let mut board = self.board.lock().await;
            for target in &targets {
                board.set_pending(target, cycle);
            }
        }
        info!("cycle {}: probing {} targets", cycle, targets.len());

        let timeout = Duration::from_secs(self.config.probe_timeout);
        let mut probes = Vec::with_capacity(targets.len());
        for target in targets {
            let monitor = Arc::clone(self);
            probes.push(tokio::spawn(async move {
                let reachable = probe::probe(&target.host, target.port, timeout).await;
                monitor
                    .board
                    .lock()
                    .await
                    .apply(&target, cycle, reachable, Utc::now());
            }));
        }
        probes
    }

    /// Fire-and-forget cycle, used by the manual trigger and the periodic
    /// timer. A detached watcher drains the probe handles only to log how
    /// long the cycle took.
    pub fn spawn_cycle(self: &Arc<Self>) {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let started = Instant::now();
            let mut probes: FuturesUnordered<_> =
                monitor.run_cycle().await.into_iter().collect();
            let total = probes.len();
            while probes.next().await.is_some() {}
            info!(
                "cycle completed {} probes in {:.2}s",
                total,
                started.elapsed().as_secs_f64()
            );
        });
    }

    /// Periodic trigger, for the life of the process. Checks once right
    /// away, then every `check_interval` seconds. Manual cycles run
    /// concurrently and never reset this timer.
    pub async fn run(self: Arc<Self>) {
        self.spawn_cycle();
        loop {
            tokio::time::sleep(Duration::from_secs(self.config.check_interval)).await;
            self.spawn_cycle();
        }
    }
}
