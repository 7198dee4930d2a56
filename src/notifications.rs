//! Transient success/error notifications
//!
//! Newest first. Each notification owns exactly one expiry timer in the
//! shared [`TimerQueue`]; dismissing cancels it, expiring consumes it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Millis;
use crate::config::DashboardConfig;
use crate::timers::{TimerId, TimerQueue, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for NotificationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Millis,
    pub ttl: Millis,
    #[serde(skip)]
    timer: TimerId,
}

impl Notification {
    pub fn is_expired(&self, now: Millis) -> bool {
        now.saturating_sub(self.created_at) >= self.ttl
    }
}

#[derive(Debug)]
pub struct NotificationCenter {
    success_ttl: Millis,
    error_ttl: Millis,
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            success_ttl: config.success_ttl_ms,
            error_ttl: config.error_ttl_ms,
            items: Vec::new(),
        }
    }

    pub fn ttl_for(&self, severity: Severity) -> Millis {
        match severity {
            Severity::Success => self.success_ttl,
            Severity::Error => self.error_ttl,
        }
    }

    /// Insert at the front and arm its expiry
    pub fn notify(
        &mut self,
        timers: &mut TimerQueue,
        now: Millis,
        message: impl Into<String>,
        severity: Severity,
    ) -> NotificationId {
        let id = NotificationId::new();
        let ttl = self.ttl_for(severity);
        let timer = timers.schedule_once(now, ttl, TimerTask::ExpireNotification(id));

        self.items.insert(
            0,
            Notification {
                id,
                message: message.into(),
                severity,
                created_at: now,
                ttl,
                timer,
            },
        );
        id
    }

    /// Expiry timer fired. Returns false if it was already dismissed.
    pub fn expire(&mut self, id: NotificationId) -> bool {
        self.remove(id).is_some()
    }

    /// Manual dismissal; cancels the pending expiry
    pub fn dismiss(&mut self, timers: &mut TimerQueue, id: NotificationId) -> bool {
        match self.remove(id) {
            Some(n) => {
                timers.cancel(n.timer);
                true
            }
            None => false,
        }
    }

    /// Visible notifications, newest first
    pub fn list(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop everything and cancel their timers
    pub fn clear(&mut self, timers: &mut TimerQueue) -> usize {
        let count = self.items.len();
        for n in self.items.drain(..) {
            timers.cancel(n.timer);
        }
        count
    }

    fn remove(&mut self, id: NotificationId) -> Option<Notification> {
        let idx = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(idx))
    }
}
