//! # Module scheduler: supervised fixed-interval tick loop.
//!
//! [`Scheduler`] owns the set of active modules, drives their lifecycle,
//! and runs the tick loop that invokes every running module once per
//! round, isolating failures per module.
//!
//! ## Architecture
//! ```text
//! start():
//!   for each registered module ─► on_start (isolated) ─► running = true
//!   spawn tick loop:
//!     loop {
//!       select { cancelled ─► break, interval tick ─► round }
//!       round: snapshot running entries
//!              ├─► spawn tick task: lock module ─► recheck running ─► on_tick
//!              ├─► spawn tick task: ...
//!              └─► (round is never awaited)
//!     }
//!
//! stop():
//!   cancel loop (no new round starts)
//!   for each running module ─► running = false ─► lock ─► on_stop (isolated)
//! ```
//!
//! ## Rules
//! - A failing `on_tick` is logged and the module is ticked again next
//!   round; the scheduler never gives up on a module.
//! - Round pacing is wall-clock driven: round N+1 begins one interval
//!   after round N began, whether or not round N's ticks finished.
//! - Tick tasks re-check the running flag after acquiring the module
//!   lock, so a tick never runs after `on_stop` completed.
//! - Dynamic membership: adding after `start()` runs `on_start` first;
//!   removing runs `on_stop` and excludes the module from later rounds.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{RuntimeError, panic_message};
use crate::modules::module::ModuleRef;

struct Entry {
    module: ModuleRef,
    running: Arc<AtomicBool>,
}

/// Supervised fixed-interval scheduler over named modules.
pub struct Scheduler {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    cancel: CancellationToken,
    tick_interval: Duration,
    started: AtomicBool,
}

impl Scheduler {
    /// Creates a scheduler that ticks every `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            cancel: CancellationToken::new(),
            tick_interval,
            started: AtomicBool::new(false),
        }
    }

    /// Registers a module under its own name.
    ///
    /// Before `start()` the module just joins the set; afterwards its
    /// `on_start` runs immediately (isolated) and, on success, the module
    /// joins the next tick round.
    pub async fn add(&self, module: ModuleRef) -> Result<(), RuntimeError> {
        if self.cancel.is_cancelled() {
            return Err(RuntimeError::SchedulerStopped);
        }

        let name = module.lock().await.name().to_string();
        let running = Arc::new(AtomicBool::new(false));

        {
            let mut entries = self.entries.write().await;
            if entries.contains_key(&name) {
                return Err(RuntimeError::ModuleExists { name });
            }
            entries.insert(
                name.clone(),
                Entry {
                    module: Arc::clone(&module),
                    running: Arc::clone(&running),
                },
            );
        }

        if self.started.load(AtomicOrdering::SeqCst) {
            start_module(&name, &module, &running).await;
        }
        Ok(())
    }

    /// Removes a module: flips it off, runs `on_stop` (isolated), drops
    /// the entry.
    pub async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        let entry = {
            let mut entries = self.entries.write().await;
            entries
                .remove(name)
                .ok_or_else(|| RuntimeError::ModuleNotFound {
                    name: name.to_string(),
                })?
        };
        if entry.running.swap(false, AtomicOrdering::SeqCst) {
            stop_module(name, &entry.module).await;
        }
        Ok(())
    }

    /// Starts every registered module and spawns the tick loop.
    ///
    /// Idempotent: a second call is a no-op; a stopped scheduler never
    /// restarts. One module's failing `on_start` is logged and does not
    /// prevent the others from starting.
    pub async fn start(&self) {
        if self.cancel.is_cancelled() || self.started.swap(true, AtomicOrdering::SeqCst) {
            return;
        }

        let snapshot = self.snapshot_all().await;
        for (name, module, running) in &snapshot {
            start_module(name, module, running).await;
        }

        let entries = Arc::clone(&self.entries);
        let cancel = self.cancel.clone();
        let tick_interval = self.tick_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let round: Vec<(String, ModuleRef, Arc<AtomicBool>)> = {
                    let entries = entries.read().await;
                    entries
                        .iter()
                        .filter(|(_, entry)| entry.running.load(AtomicOrdering::SeqCst))
                        .map(|(name, entry)| {
                            (
                                name.clone(),
                                Arc::clone(&entry.module),
                                Arc::clone(&entry.running),
                            )
                        })
                        .collect()
                };

                for (name, module, running) in round {
                    tokio::spawn(async move {
                        let mut guard = module.lock().await;
                        // the module may have been stopped while this task
                        // waited on the lock
                        if !running.load(AtomicOrdering::SeqCst) {
                            return;
                        }
                        match std::panic::AssertUnwindSafe(guard.on_tick())
                            .catch_unwind()
                            .await
                        {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => {
                                warn!(module = %name, label = err.as_label(), "tick failed: {err}");
                            }
                            Err(panic) => {
                                error!(module = %name, "tick panicked: {}", panic_message(panic));
                            }
                        }
                    });
                }
            }
            debug!("tick loop cancelled");
        });
    }

    /// Stops the scheduler: cancels the tick loop (a round already in
    /// flight is not aborted, but no new round starts), then runs
    /// `on_stop` on every running module, isolating failures.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let snapshot = self.snapshot_all().await;
        for (name, module, running) in &snapshot {
            if running.swap(false, AtomicOrdering::SeqCst) {
                stop_module(name, module).await;
            }
        }
    }

    /// Sorted names of all registered modules.
    pub async fn list(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// True when the named module is registered and running.
    pub async fn is_running(&self, name: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(name)
            .is_some_and(|entry| entry.running.load(AtomicOrdering::SeqCst))
    }

    async fn snapshot_all(&self) -> Vec<(String, ModuleRef, Arc<AtomicBool>)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    Arc::clone(&entry.module),
                    Arc::clone(&entry.running),
                )
            })
            .collect()
    }
}

/// Runs `on_start` under the module lock, isolating failures; marks the
/// module running only on success.
async fn start_module(name: &str, module: &ModuleRef, running: &Arc<AtomicBool>) {
    let mut guard = module.lock().await;
    match std::panic::AssertUnwindSafe(guard.on_start())
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {
            running.store(true, AtomicOrdering::SeqCst);
        }
        Ok(Err(err)) => {
            warn!(module = %name, label = err.as_label(), "start failed: {err}");
        }
        Err(panic) => {
            error!(module = %name, "start panicked: {}", panic_message(panic));
        }
    }
}

/// Runs `on_stop` under the module lock (waiting out an in-flight tick),
/// isolating failures.
async fn stop_module(name: &str, module: &ModuleRef) {
    let mut guard = module.lock().await;
    match std::panic::AssertUnwindSafe(guard.on_stop())
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(module = %name, label = err.as_label(), "stop failed: {err}");
        }
        Err(panic) => {
            error!(module = %name, "stop panicked: {}", panic_message(panic));
        }
    }
}
