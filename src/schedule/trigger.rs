use super::window::{is_active, ScheduleWindow};
use crate::{
    config::TriggerPolicy,
    error::AppError,
    location::controller::{ControllerState, MockLocationController},
    time::TimeProvider,
    utils::ux_ts_to_string,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Applies the schedule window to the controller: start inside, stop outside.
pub struct ScheduleTrigger {
    pub window: ScheduleWindow,
    pub controller: Arc<MockLocationController>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub policy: TriggerPolicy,
    pub check_interval: Duration,
    last_applied: Mutex<Option<bool>>,
}

impl ScheduleTrigger {
    pub fn new(
        window: ScheduleWindow, controller: Arc<MockLocationController>, time_provider: Arc<dyn TimeProvider>,
        policy: TriggerPolicy, check_interval: Duration,
    ) -> Self {
        Self { window, controller, time_provider, policy, check_interval, last_applied: Mutex::new(None) }
    }

    pub async fn evaluate_and_apply(&self) -> Result<ControllerState, AppError> {
        let minute = self.time_provider.minute_of_day();
        let active = is_active(&self.window, minute)?;

        let last = *self.last_applied.lock().unwrap_or_else(|p| p.into_inner());
        if self.policy == TriggerPolicy::Edge && last == Some(active) {
            debug!(minute, active, "Schedule unchanged.");
            return Ok(self.controller.state());
        }

        if active {
            if !self.controller.is_running() {
                info!(minute, window = %self.window, "Entering schedule window.");
            }
            self.controller.start().await?;
        } else {
            if self.controller.is_running() {
                info!(minute, window = %self.window, "Leaving schedule window.");
            }
            self.controller.stop().await;
        }
        *self.last_applied.lock().unwrap_or_else(|p| p.into_inner()) = Some(active);
        Ok(self.controller.state())
    }

    /// Time to wait before the next evaluation: the check interval, or less
    /// when a window boundary comes first.
    pub fn next_wait(&self) -> Duration {
        match self.window.minutes_until_change(self.time_provider.minute_of_day()) {
            Ok(minutes) => self.check_interval.min(Duration::from_secs(minutes as u64 * 60)),
            Err(_) => self.check_interval,
        }
    }
}

pub async fn run_schedule_trigger(
    trigger: Arc<ScheduleTrigger>,
    mut stop_signal: watch::Receiver<bool>,
    end_time: Option<i64>, // Optional parameter for simulation
) -> Result<(), AppError> {
    let mut now = trigger.time_provider.now();
    info!(window = %trigger.window, policy = ?trigger.policy, at = ux_ts_to_string(now), "Starting schedule trigger.");
    while end_time.map_or(true, |end| now < end) && !*stop_signal.borrow() {
        if let Err(e) = trigger.evaluate_and_apply().await {
            error!(error = %e, "Failed to apply schedule.");
        }

        let wait = trigger.next_wait();
        tokio::select! {
            _ = trigger.time_provider.sleep(wait) => {}
            changed = stop_signal.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        now = trigger.time_provider.now();
    }
    info!("Ending schedule trigger.");
    Ok(())
}
