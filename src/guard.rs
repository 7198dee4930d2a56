//! Trade form submission guard
//!
//! On submit the control is disabled and shows a busy label. It is restored
//! after a fixed delay, whether or not the submitted trade has finished.
//! `complete` is the completion-driven alternative: hosts that can observe
//! the real response call it to restore early.

use crate::clock::Millis;
use crate::config::DashboardConfig;
use crate::timers::{TimerId, TimerQueue, TimerTask};
use crate::view::DashboardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Control disabled, restore scheduled
    Guarded,
    /// Already guarding an earlier submission
    AlreadyBusy,
    /// No submit control on the page
    NoControl,
}

#[derive(Debug)]
struct BusyControl {
    original_label: String,
    timer: TimerId,
}

#[derive(Debug)]
pub struct FormSubmissionGuard {
    restore_after: Millis,
    busy_label: String,
    busy: Option<BusyControl>,
}

impl FormSubmissionGuard {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            restore_after: config.submit_restore_ms,
            busy_label: config.busy_label.clone(),
            busy: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn begin(
        &mut self,
        view: &mut dyn DashboardView,
        timers: &mut TimerQueue,
        now: Millis,
    ) -> SubmitOutcome {
        if self.busy.is_some() {
            return SubmitOutcome::AlreadyBusy;
        }
        let Ok(original_label) = view.submit_label() else {
            return SubmitOutcome::NoControl;
        };
        if let Err(e) = view.set_submit_state(false, &self.busy_label) {
            log::debug!("Submit guard skipped: {e}");
            return SubmitOutcome::NoControl;
        }

        let timer = timers.schedule_once(now, self.restore_after, TimerTask::RestoreSubmitControl);
        self.busy = Some(BusyControl { original_label, timer });
        SubmitOutcome::Guarded
    }

    /// Fixed-delay restore fired
    pub fn restore(&mut self, view: &mut dyn DashboardView) -> bool {
        let Some(busy) = self.busy.take() else {
            return false;
        };
        Self::reenable(view, &busy.original_label);
        true
    }

    /// Real completion observed; restore now and drop the pending timer
    pub fn complete(&mut self, view: &mut dyn DashboardView, timers: &mut TimerQueue) -> bool {
        let Some(busy) = self.busy.take() else {
            return false;
        };
        timers.cancel(busy.timer);
        Self::reenable(view, &busy.original_label);
        true
    }

    fn reenable(view: &mut dyn DashboardView, label: &str) {
        if let Err(e) = view.set_submit_state(true, label) {
            log::debug!("Submit control vanished before restore: {e}");
        }
    }
}
