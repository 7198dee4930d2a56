//! Refresh scheduler
//!
//! Periodic, visibility-gated, interaction-aware polling. States:
//! `Disabled` (no timer armed), `Idle` (timer armed, nothing in flight),
//! `Running` (a fetch-render cycle is in flight).
//!
//! The in-flight flag is the only mutual exclusion. It guards against
//! logical reentrancy (a timer tick, a visibility event and a click all
//! landing while one cycle is still awaiting the network), not threads.
//! A cycle in flight when auto-refresh is disabled still completes.

use std::cell::Cell;

use crate::clock::Millis;
use crate::timers::{TimerId, TimerQueue, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Disabled,
    Idle,
    Running,
}

/// Why a cycle was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Timer,
    BecameVisible,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    Hidden,
    InputFocused,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Enabled,
    Disabled,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    period: Millis,
    timer: Cell<Option<TimerId>>,
    in_flight: Cell<bool>,
    last_run_at: Cell<Option<Millis>>,
}

/// Held for the duration of one cycle; clears the in-flight flag on drop
#[derive(Debug)]
pub struct CycleGuard<'a> {
    in_flight: &'a Cell<bool>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.set(false);
    }
}

impl RefreshScheduler {
    pub fn new(period: Millis) -> Self {
        Self {
            period,
            timer: Cell::new(None),
            in_flight: Cell::new(false),
            last_run_at: Cell::new(None),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.in_flight.get() {
            SchedulerState::Running
        } else if self.is_enabled() {
            SchedulerState::Idle
        } else {
            SchedulerState::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.timer.get().is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    pub fn last_run_at(&self) -> Option<Millis> {
        self.last_run_at.get()
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer.get()
    }

    /// Arm the periodic timer. False if it was already armed.
    pub fn start(&self, timers: &mut TimerQueue, now: Millis) -> bool {
        if self.is_enabled() {
            return false;
        }
        let id = timers.schedule_repeating(now, self.period, TimerTask::RefreshTick);
        self.timer.set(Some(id));
        true
    }

    /// Cancel the periodic timer. False if nothing was armed.
    /// Does not abort a cycle already in flight.
    pub fn stop(&self, timers: &mut TimerQueue) -> bool {
        match self.timer.take() {
            Some(id) => timers.cancel(id),
            None => false,
        }
    }

    pub fn toggle(&self, timers: &mut TimerQueue, now: Millis) -> Toggled {
        if self.stop(timers) {
            Toggled::Disabled
        } else {
            self.start(timers, now);
            Toggled::Enabled
        }
    }

    /// Gate a trigger. Manual refreshes skip the visibility and focus
    /// checks but never overlap a running cycle.
    pub fn check(
        &self,
        trigger: RefreshTrigger,
        visible: bool,
        input_focused: bool,
    ) -> Result<(), SkipReason> {
        if self.in_flight.get() {
            return Err(SkipReason::InFlight);
        }
        if trigger == RefreshTrigger::Manual {
            return Ok(());
        }
        if !self.is_enabled() {
            return Err(SkipReason::Disabled);
        }
        if !visible {
            return Err(SkipReason::Hidden);
        }
        if input_focused {
            return Err(SkipReason::InputFocused);
        }
        Ok(())
    }

    /// Enter `Running`. None if a cycle is already in flight.
    pub fn begin(&self, now: Millis) -> Option<CycleGuard<'_>> {
        if self.in_flight.replace(true) {
            return None;
        }
        self.last_run_at.set(Some(now));
        Some(CycleGuard { in_flight: &self.in_flight })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_arms_timer() {
        let mut timers = TimerQueue::new();
        let scheduler = RefreshScheduler::new(30_000);
        assert_eq!(scheduler.state(), SchedulerState::Disabled);

        assert!(scheduler.start(&mut timers, 0));
        assert!(!scheduler.start(&mut timers, 0));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.take_due(30_000).len(), 1);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut timers = TimerQueue::new();
        let scheduler = RefreshScheduler::new(30_000);
        scheduler.start(&mut timers, 0);

        assert_eq!(scheduler.toggle(&mut timers, 10), Toggled::Disabled);
        assert!(timers.is_empty());
        assert_eq!(scheduler.state(), SchedulerState::Disabled);

        assert_eq!(scheduler.toggle(&mut timers, 20), Toggled::Enabled);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(timers.len(), 1);
        assert!(timers.is_armed(scheduler.timer().unwrap()));

        // And from disabled
        let fresh = RefreshScheduler::new(30_000);
        let mut empty = TimerQueue::new();
        fresh.toggle(&mut empty, 0);
        fresh.toggle(&mut empty, 0);
        assert_eq!(fresh.state(), SchedulerState::Disabled);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_guards() {
        let mut timers = TimerQueue::new();
        let scheduler = RefreshScheduler::new(30_000);

        assert_eq!(scheduler.check(RefreshTrigger::Timer, true, false), Err(SkipReason::Disabled));
        assert_eq!(scheduler.check(RefreshTrigger::Manual, false, true), Ok(()));

        scheduler.start(&mut timers, 0);
        assert_eq!(scheduler.check(RefreshTrigger::Timer, false, false), Err(SkipReason::Hidden));
        assert_eq!(
            scheduler.check(RefreshTrigger::BecameVisible, true, true),
            Err(SkipReason::InputFocused)
        );
        assert_eq!(scheduler.check(RefreshTrigger::Timer, true, false), Ok(()));
    }

    #[test]
    fn test_single_cycle_in_flight() {
        let scheduler = RefreshScheduler::new(30_000);

        let guard = scheduler.begin(5).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert!(scheduler.begin(6).is_none());
        assert_eq!(scheduler.check(RefreshTrigger::Manual, true, false), Err(SkipReason::InFlight));

        drop(guard);
        assert_eq!(scheduler.state(), SchedulerState::Disabled);
        assert_eq!(scheduler.last_run_at(), Some(5));
    }

    #[test]
    fn test_disable_mid_cycle_keeps_cycle() {
        let mut timers = TimerQueue::new();
        let scheduler = RefreshScheduler::new(30_000);
        scheduler.start(&mut timers, 0);

        let guard = scheduler.begin(0).unwrap();
        assert_eq!(scheduler.toggle(&mut timers, 1), Toggled::Disabled);
        assert_eq!(scheduler.state(), SchedulerState::Running);

        drop(guard);
        assert_eq!(scheduler.state(), SchedulerState::Disabled);
    }
}
