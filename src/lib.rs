//! OTC Dashboard - client-side engine for the OTC trading dashboard
//!
//! Polls the trade history endpoint, renders it into the trades table,
//! keeps auxiliary charts in step and raises transient notifications.
//! Compiled to WebAssembly for the browser; the engine itself is plain Rust
//! driven through injected collaborators, so it also runs natively in tests.
//!
//! # Architecture
//! - [`DashboardController`] owns every component and is driven by host events
//! - Virtual timers (refresh tick, notification expiry, submit restore) are
//!   fired by [`DashboardController::pump`]
//! - [`TradeSource`], [`DashboardView`] and [`ChartBackend`] are the host seams
//! - `browser` (wasm32 only) binds the seams to the DOM, `fetch` and Chart.js
//!
//! # Features
//! - Visibility- and focus-gated auto-refresh, never two cycles at once
//! - Empty responses never blank a populated table
//! - Chart lifecycle with stale-handle detection and full teardown

// Clippy configuration for dashboard code patterns
#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::map_unwrap_or)] // Explicit error handling preference

pub mod analytics;
pub mod charts;
pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod guard;
pub mod notifications;
pub mod scheduler;
pub mod table;
pub mod timers;
pub mod types;
pub mod view;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(test)]
pub(crate) mod test_support;

pub use analytics::ChartFeed;
pub use charts::{
    ChartBackend, ChartConfig, ChartData, ChartHandle, ChartInstance, ChartTheme, Dataset,
    UpdateMode,
};
pub use client::{HttpTradeSource, TradeSource};
pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use config::DashboardConfig;
pub use controller::{Collaborators, CycleOutcome, DashboardController, TeardownReport, UiAction};
pub use error::{DashboardError, Result};
pub use notifications::{Notification, NotificationId, Severity};
pub use scheduler::{SchedulerState, SkipReason, Toggled};
pub use table::{PatternFormatter, TimestampFormatter};
pub use types::{Route, Trade};
pub use view::{DashboardView, HeadlessView};
