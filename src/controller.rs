//! Dashboard controller - wires the engine together
//!
//! One explicitly constructed object per dashboard, with injected
//! collaborators (trade source, view, chart backend, clock). Everything runs
//! on the host's single event thread; methods take `&self` and keep their
//! `RefCell` borrows short so a cycle suspended on the network never holds
//! one. The host drives time by calling [`DashboardController::pump`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::analytics::ChartFeed;
use crate::charts::{ChartBackend, ChartConfig, ChartData, ChartHandle, ChartRegistry, ChartTheme};
use crate::client::TradeSource;
use crate::clock::{Clock, Millis};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::guard::{FormSubmissionGuard, SubmitOutcome};
use crate::notifications::{Notification, NotificationCenter, NotificationId, Severity};
use crate::scheduler::{RefreshScheduler, RefreshTrigger, SchedulerState, SkipReason, Toggled};
use crate::table::{Reconciliation, RowView, TableRenderer, TimestampFormatter, TradeTable};
use crate::timers::{TimerQueue, TimerTask};
use crate::types::Trade;
use crate::view::DashboardView;
use crate::visibility::{VisibilityTracker, VisibilityTransition};

const REFRESH_FAILED: &str = "Failed to refresh data";
const AUTO_REFRESH_ENABLED: &str = "Auto-refresh enabled";
const AUTO_REFRESH_DISABLED: &str = "Auto-refresh disabled";

/// Everything the controller talks to
pub struct Collaborators {
    pub source: Box<dyn TradeSource>,
    pub view: Box<dyn DashboardView>,
    pub charts: Box<dyn ChartBackend>,
    pub clock: Rc<dyn Clock>,
    /// Trade time rendering; `None` uses `timestamp_format`
    pub timestamps: Option<Rc<dyn TimestampFormatter>>,
}

/// Result of one refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Rendered { rows: usize },
    KeptOnEmpty,
    /// Fetch or decode failed; one error notification was raised
    Failed,
    Skipped(SkipReason),
}

/// UI affordances the host maps its events onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Refresh,
    ToggleAutoRefresh,
    SubmitTrade,
    SubmissionComplete,
    Dismiss(NotificationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownReport {
    pub timers_cancelled: usize,
    pub charts_destroyed: usize,
}

pub struct DashboardController {
    config: DashboardConfig,
    clock: Rc<dyn Clock>,
    source: Box<dyn TradeSource>,
    view: RefCell<Box<dyn DashboardView>>,
    timers: RefCell<TimerQueue>,
    scheduler: RefreshScheduler,
    visibility: Cell<VisibilityTracker>,
    table: RefCell<TradeTable>,
    notifications: RefCell<NotificationCenter>,
    charts: RefCell<ChartRegistry>,
    feeds: RefCell<Vec<(ChartHandle, ChartFeed)>>,
    guard: RefCell<FormSubmissionGuard>,
    stopped: Cell<bool>,
}

impl DashboardController {
    pub fn new(config: DashboardConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let Collaborators { source, view, charts, clock, timestamps } = collaborators;
        let mut renderer = TableRenderer::new(&config);
        if let Some(timestamps) = timestamps {
            renderer = renderer.with_formatter(timestamps);
        }
        Ok(Self {
            scheduler: RefreshScheduler::new(config.refresh_interval_ms),
            visibility: Cell::new(VisibilityTracker::default()),
            table: RefCell::new(TradeTable::new(renderer)),
            notifications: RefCell::new(NotificationCenter::new(&config)),
            charts: RefCell::new(ChartRegistry::new(charts)),
            feeds: RefCell::new(Vec::new()),
            guard: RefCell::new(FormSubmissionGuard::new(&config)),
            timers: RefCell::new(TimerQueue::new()),
            stopped: Cell::new(false),
            view: RefCell::new(view),
            source,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Host visibility at mount. Never triggers a cycle.
    pub fn set_visible(&self, visible: bool) {
        self.visibility.set(VisibilityTracker::new(visible));
    }

    /// Environment ready: apply chart defaults, arm auto-refresh
    pub fn start(&self) -> bool {
        self.stopped.set(false);
        self.charts.borrow_mut().apply_theme(&ChartTheme {
            text_color: self.config.chart_text_color.clone(),
            border_color: self.config.chart_border_color.clone(),
            background_color: self.config.chart_background_color.clone(),
        });

        let armed = self.scheduler.start(&mut self.timers.borrow_mut(), self.now());
        log::info!(
            "Dashboard started: refresh every {}ms, {} trades per cycle",
            self.config.refresh_interval_ms,
            self.config.trade_limit
        );
        armed
    }

    /// Environment teardown. No timer or chart survives this, including
    /// anything a cycle still awaiting the network would schedule.
    pub fn stop(&self) -> TeardownReport {
        self.stopped.set(true);
        let mut timers = self.timers.borrow_mut();
        let timers_cancelled = timers.len();

        self.scheduler.stop(&mut timers);
        self.guard.borrow_mut().complete(&mut **self.view.borrow_mut(), &mut timers);
        self.notifications.borrow_mut().clear(&mut timers);
        timers.clear();
        drop(timers);

        self.feeds.borrow_mut().clear();
        let charts_destroyed = self.charts.borrow_mut().destroy_all();

        log::info!("Dashboard stopped: {timers_cancelled} timers cancelled, {charts_destroyed} charts destroyed");
        TeardownReport { timers_cancelled, charts_destroyed }
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Fire due timers; runs a refresh cycle if the periodic tick fired
    pub async fn pump(&self) -> Option<CycleOutcome> {
        if self.fire_due() {
            Some(self.refresh(RefreshTrigger::Timer).await)
        } else {
            None
        }
    }

    /// Explicit user refresh: ignores visibility and focus, never overlaps
    pub async fn refresh_now(&self) -> CycleOutcome {
        self.refresh(RefreshTrigger::Manual).await
    }

    /// Host visibility observation. Becoming visible may trigger a cycle.
    pub async fn on_visibility_change(&self, visible: bool) -> Option<CycleOutcome> {
        let mut tracker = self.visibility.get();
        let transition = tracker.observe(visible);
        self.visibility.set(tracker);

        match transition {
            Some(VisibilityTransition::BecameVisible) => {
                Some(self.refresh(RefreshTrigger::BecameVisible).await)
            }
            Some(VisibilityTransition::BecameHidden) | None => None,
        }
    }

    pub fn toggle_auto_refresh(&self) -> Toggled {
        let toggled = self.scheduler.toggle(&mut self.timers.borrow_mut(), self.now());
        let message = match toggled {
            Toggled::Enabled => AUTO_REFRESH_ENABLED,
            Toggled::Disabled => AUTO_REFRESH_DISABLED,
        };
        log::info!("{message}");
        self.notify(message, Severity::Success);
        toggled
    }

    async fn refresh(&self, trigger: RefreshTrigger) -> CycleOutcome {
        let visible = self.visibility.get().is_visible();
        let focused = self.view.borrow().input_has_focus();
        if let Err(reason) = self.scheduler.check(trigger, visible, focused) {
            log::debug!("Refresh skipped ({trigger:?}): {reason:?}");
            return CycleOutcome::Skipped(reason);
        }
        let Some(_cycle) = self.scheduler.begin(self.now()) else {
            return CycleOutcome::Skipped(SkipReason::InFlight);
        };

        self.set_loading(true);
        let outcome = match self.source.fetch(self.config.trade_limit).await {
            Ok(trades) => self.apply_trades(&trades),
            Err(e) if self.stopped.get() => {
                log::debug!("Refresh failed after teardown ({trigger:?}): {e}");
                CycleOutcome::Failed
            }
            Err(e) => {
                log::warn!("Error refreshing data ({trigger:?}): {e}");
                self.notify(REFRESH_FAILED, Severity::Error);
                CycleOutcome::Failed
            }
        };
        self.set_loading(false);
        outcome
    }

    /// Table first, then any chart derived from the same trades
    fn apply_trades(&self, trades: &[Trade]) -> CycleOutcome {
        let mut table = self.table.borrow_mut();
        match table.reconcile(trades) {
            Reconciliation::KeptOnEmpty => {
                log::debug!("Empty trade list, keeping displayed rows");
                CycleOutcome::KeptOnEmpty
            }
            Reconciliation::Replaced { rows } => {
                if let Err(e) = self.view.borrow_mut().replace_rows(table.rows()) {
                    log::debug!("Trade table not rendered: {e}");
                }
                drop(table);
                self.update_bound_charts(trades);
                CycleOutcome::Rendered { rows }
            }
        }
    }

    fn update_bound_charts(&self, trades: &[Trade]) {
        let feeds = self.feeds.borrow();
        let mut charts = self.charts.borrow_mut();
        for (handle, feed) in feeds.iter() {
            if let Err(e) = charts.update(handle, feed.derive(trades)) {
                log::debug!("Chart {} not updated: {e}", handle.id());
            }
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Err(e) = self.view.borrow_mut().set_loading(loading) {
            log::debug!("Loading indicator: {e}");
        }
    }

    /// Handle every due timer. True if the periodic refresh tick fired.
    fn fire_due(&self) -> bool {
        let due = self.timers.borrow_mut().take_due(self.now());
        let mut tick = false;
        let mut redraw = false;

        for (id, task) in due {
            match task {
                TimerTask::RefreshTick => tick |= self.scheduler.timer() == Some(id),
                TimerTask::ExpireNotification(nid) => {
                    redraw |= self.notifications.borrow_mut().expire(nid);
                }
                TimerTask::RestoreSubmitControl => {
                    self.guard.borrow_mut().restore(&mut **self.view.borrow_mut());
                }
            }
        }
        if redraw {
            self.redraw_notifications();
        }
        tick
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn notify(&self, message: &str, severity: Severity) -> NotificationId {
        let id = self.notifications.borrow_mut().notify(
            &mut self.timers.borrow_mut(),
            self.now(),
            message,
            severity,
        );
        self.redraw_notifications();
        id
    }

    pub fn dismiss(&self, id: NotificationId) -> bool {
        let removed = self
            .notifications
            .borrow_mut()
            .dismiss(&mut self.timers.borrow_mut(), id);
        if removed {
            self.redraw_notifications();
        }
        removed
    }

    fn redraw_notifications(&self) {
        let notifications = self.notifications.borrow();
        if let Err(e) = self.view.borrow_mut().show_notifications(notifications.list()) {
            log::debug!("Notifications not rendered: {e}");
        }
    }

    // ------------------------------------------------------------------
    // Trade form
    // ------------------------------------------------------------------

    pub fn submit_trade(&self) -> SubmitOutcome {
        self.guard.borrow_mut().begin(
            &mut **self.view.borrow_mut(),
            &mut self.timers.borrow_mut(),
            self.now(),
        )
    }

    pub fn complete_submission(&self) -> bool {
        self.guard
            .borrow_mut()
            .complete(&mut **self.view.borrow_mut(), &mut self.timers.borrow_mut())
    }

    // ------------------------------------------------------------------
    // Charts
    // ------------------------------------------------------------------

    pub fn create_chart(&self, id: &str, config: ChartConfig) -> Result<ChartHandle> {
        self.charts.borrow_mut().create(id, config)
    }

    pub fn update_chart(&self, handle: &ChartHandle, data: ChartData) -> Result<()> {
        self.charts.borrow_mut().update(handle, data)
    }

    pub fn destroy_chart(&self, id: &str) -> bool {
        self.feeds.borrow_mut().retain(|(h, _)| h.id() != id);
        self.charts.borrow_mut().destroy(id)
    }

    /// Redraw `handle` from `feed` after every refresh that replaced rows
    pub fn bind_chart(&self, handle: ChartHandle, feed: ChartFeed) {
        let mut feeds = self.feeds.borrow_mut();
        feeds.retain(|(h, _)| h != &handle);
        feeds.push((handle, feed));
    }

    pub fn chart_count(&self) -> usize {
        self.charts.borrow().len()
    }

    // ------------------------------------------------------------------
    // UI dispatch and state
    // ------------------------------------------------------------------

    pub async fn handle_action(&self, action: UiAction) {
        match action {
            UiAction::Refresh => {
                self.refresh_now().await;
            }
            UiAction::ToggleAutoRefresh => {
                self.toggle_auto_refresh();
            }
            UiAction::SubmitTrade => {
                self.submit_trade();
            }
            UiAction::SubmissionComplete => {
                self.complete_submission();
            }
            UiAction::Dismiss(id) => {
                self.dismiss(id);
            }
        }
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn last_run_at(&self) -> Option<Millis> {
        self.scheduler.last_run_at()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.get().is_visible()
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.table.borrow().rows().to_vec()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().list().to_vec()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Earliest pending deadline, for hosts that sleep until it
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.borrow().next_due()
    }

    fn now(&self) -> Millis {
        self.clock.now_ms()
    }
}
