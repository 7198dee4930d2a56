//! Timer queue - explicit scheduled tasks with cancellation
//!
//! The engine never owns a real timer. Every delayed action (refresh tick,
//! notification expiry, submit-control restore) is an entry here, and the
//! host pumps [`TimerQueue::take_due`] from its event loop. Cancelling is a
//! first-class operation that reports whether anything was armed.

use crate::clock::Millis;
use crate::notifications::NotificationId;

/// Opaque handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    RefreshTick,
    ExpireNotification(NotificationId),
    RestoreSubmitControl,
}

#[derive(Debug)]
struct TimerEntry {
    id: TimerId,
    due: Millis,
    period: Option<Millis>,
    task: TimerTask,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `task` once, `delay` ms after `now`
    pub fn schedule_once(&mut self, now: Millis, delay: Millis, task: TimerTask) -> TimerId {
        self.push(now + delay, None, task)
    }

    /// Fire `task` every `period` ms, first at `now + period`
    pub fn schedule_repeating(&mut self, now: Millis, period: Millis, task: TimerTask) -> TimerId {
        let period = period.max(1);
        self.push(now + period, Some(period), task)
    }

    /// Returns true if the timer was armed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Next deadline, if any
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.due).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop every task due at `now`, in deadline order.
    ///
    /// One-shot entries are removed. Repeating entries fire once per call
    /// however many periods were missed, then move to the first grid
    /// point after `now`.
    pub fn take_due(&mut self, now: Millis) -> Vec<(TimerId, TimerTask)> {
        let mut fired: Vec<(Millis, TimerId, TimerTask)> = Vec::new();

        self.entries.retain_mut(|entry| {
            if entry.due > now {
                return true;
            }
            fired.push((entry.due, entry.id, entry.task));
            match entry.period {
                Some(period) => {
                    let missed = (now - entry.due) / period + 1;
                    entry.due += missed * period;
                    true
                }
                None => false,
            }
        });

        fired.sort_by_key(|(due, id, _)| (*due, id.0));
        fired.into_iter().map(|(_, id, task)| (id, task)).collect()
    }

    /// Drop everything. Returns how many timers were armed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    fn push(&mut self, due: Millis, period: Option<Millis>, task: TimerTask) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(TimerEntry { id, due, period, task });
        id
    }
}
