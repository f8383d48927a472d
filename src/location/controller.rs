use super::{
    coordinate::MockCoordinate,
    interface::{LocationSubsystem, PermissionChecker, PermissionKind, ProviderHandle, ProviderProperties},
};
use crate::{config::Emitter, error::AppError, time::TimeProvider};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, trace, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum ControllerState {
    #[default]
    Stopped = 0,
    Running = 1,
}

impl Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            ControllerState::Stopped => "stopped",
            ControllerState::Running => "running",
        };
        f.write_str(state)
    }
}

#[derive(Debug, Default)]
pub struct EmissionStats {
    emitted: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub emitted: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl EmissionStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            emitted: self.emitted.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// Everything the periodic task needs to push one fix.
struct FixEmitter {
    subsystem: Arc<dyn LocationSubsystem>,
    permissions: Arc<dyn PermissionChecker>,
    time_provider: Arc<dyn TimeProvider>,
    coordinate: MockCoordinate,
    handle: ProviderHandle,
    stats: Arc<EmissionStats>,
}

impl FixEmitter {
    fn emit(&self) -> Result<(), AppError> {
        if !self.permissions.has_permission(PermissionKind::FineLocation) {
            self.stats.skipped.fetch_add(1, Ordering::SeqCst);
            return Err(AppError::PermissionDenied(PermissionKind::FineLocation));
        }
        let fix = self.coordinate.fix_at(
            &self.handle.name,
            self.time_provider.now_millis(),
            self.time_provider.elapsed_realtime_nanos(),
        );
        match self.subsystem.push_fix(&self.handle, &fix) {
            Ok(()) => {
                self.stats.emitted.fetch_add(1, Ordering::SeqCst);
                trace!(provider = %self.handle.name, time_ms = fix.time_ms, "Fix pushed.");
                Ok(())
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                match e {
                    AppError::EmissionFailed(_) => Err(e),
                    other => Err(AppError::EmissionFailed(other.to_string())),
                }
            }
        }
    }
}

async fn emit_loop(emitter: FixEmitter, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            biased;
            // the only value ever sent is `true`; a dropped sender also means stop
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {
                if let Err(e) = emitter.emit() {
                    warn!(provider = %emitter.handle.name, error = %e, "Emission skipped.");
                }
            }
        }
    }
    debug!(provider = %emitter.handle.name, "Emission task finished.");
}

struct RunningTask {
    handle: ProviderHandle,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RunningTask {
    fn stopping(&self) -> bool {
        *self.stop_tx.borrow()
    }
}

/// Owns the synthetic location source and the task feeding it.
///
/// `start` while running and `stop` while stopped are no-ops. Transitions are
/// serialized by an async mutex, and `stop` joins the periodic task before it
/// tears the source down, so no fix is pushed once it returns. `state` only
/// changes while the mutex is held, together with the task slot.
pub struct MockLocationController {
    subsystem: Arc<dyn LocationSubsystem>,
    permissions: Arc<dyn PermissionChecker>,
    time_provider: Arc<dyn TimeProvider>,
    coordinate: MockCoordinate,
    properties: ProviderProperties,
    cfg: Emitter,
    running: Mutex<Option<RunningTask>>,
    state: AtomicUsize,
    stats: Arc<EmissionStats>,
}

impl MockLocationController {
    pub fn new(
        subsystem: Arc<dyn LocationSubsystem>, permissions: Arc<dyn PermissionChecker>,
        time_provider: Arc<dyn TimeProvider>, coordinate: MockCoordinate, cfg: Emitter,
    ) -> Self {
        Self {
            subsystem,
            permissions,
            time_provider,
            coordinate,
            properties: ProviderProperties::default(),
            cfg,
            running: Mutex::new(None),
            state: AtomicUsize::new(ControllerState::Stopped as usize),
            stats: Arc::new(EmissionStats::default()),
        }
    }

    pub fn state(&self) -> ControllerState {
        ControllerState::from_usize(self.state.load(Ordering::SeqCst)).unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ControllerState::Running
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn coordinate(&self) -> MockCoordinate {
        self.coordinate
    }

    pub async fn start(&self) -> Result<(), AppError> {
        let mut running = self.running.lock().await;
        match running.as_ref().map(RunningTask::stopping) {
            Some(false) => {
                debug!(provider = %self.cfg.provider, "Start ignored, already running.");
                return Ok(());
            }
            // an interrupted stop left its task behind
            Some(true) => self.finish_stop(&mut running).await,
            None => {}
        }

        for kind in [PermissionKind::FineLocation, PermissionKind::MockLocation] {
            if !self.permissions.has_permission(kind) {
                warn!(permission = %kind, "Cannot start mock location.");
                return Err(AppError::PermissionDenied(kind));
            }
        }

        let handle = self.subsystem.register_synthetic_source(&self.cfg.provider, &self.properties)?;
        if let Err(e) = self.subsystem.set_enabled(&handle, true) {
            error!(provider = %handle.name, error = %e, "Failed to enable synthetic source.");
            if let Err(e) = self.subsystem.unregister(&handle) {
                warn!(provider = %handle.name, error = %e, "Failed to unregister synthetic source.");
            }
            return Err(e);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let emitter = FixEmitter {
            subsystem: self.subsystem.clone(),
            permissions: self.permissions.clone(),
            time_provider: self.time_provider.clone(),
            coordinate: self.coordinate,
            handle: handle.clone(),
            stats: self.stats.clone(),
        };
        let join = tokio::spawn(emit_loop(emitter, Duration::from_millis(self.cfg.interval_ms), stop_rx));

        *running = Some(RunningTask { handle, stop_tx, join });
        self.state.store(ControllerState::Running as usize, Ordering::SeqCst);
        info!(
            provider = %self.cfg.provider,
            latitude = self.coordinate.latitude,
            longitude = self.coordinate.longitude,
            interval_ms = self.cfg.interval_ms,
            "Mock location started."
        );
        Ok(())
    }

    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        if running.is_none() {
            debug!(provider = %self.cfg.provider, "Stop ignored, not running.");
            return;
        }
        self.finish_stop(&mut running).await;
    }

    /// Signals, joins and tears down the task in the slot. The task stays in
    /// the slot until teardown is done, so dropping this future mid-join
    /// leaves a state the next `start` or `stop` can complete.
    async fn finish_stop(&self, running: &mut Option<RunningTask>) {
        let Some(task) = running.as_mut() else {
            return;
        };
        task.stop_tx.send_replace(true);
        if let Err(e) = (&mut task.join).await {
            error!(provider = %task.handle.name, error = %e, "Emission task ended abnormally.");
        }
        self.teardown(&task.handle);

        if let Some(task) = running.take() {
            self.state.store(ControllerState::Stopped as usize, Ordering::SeqCst);
            info!(provider = %task.handle.name, "Mock location stopped.");
        }
    }

    fn teardown(&self, handle: &ProviderHandle) {
        if let Err(e) = self.subsystem.set_enabled(handle, false) {
            warn!(provider = %handle.name, error = %e, "Failed to disable synthetic source.");
        }
        if let Err(e) = self.subsystem.unregister(handle) {
            warn!(provider = %handle.name, error = %e, "Failed to unregister synthetic source.");
        }
    }
}

impl Drop for MockLocationController {
    fn drop(&mut self) {
        if let Some(task) = self.running.get_mut().take() {
            task.join.abort();
            self.teardown(&task.handle);
        }
    }
}
