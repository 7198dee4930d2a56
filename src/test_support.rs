//! In-memory collaborators shared by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::charts::{ChartBackend, ChartConfig, ChartData, ChartInstance, ChartTheme, UpdateMode};
use crate::client::TradeSource;
use crate::error::{DashboardError, Result};
use crate::notifications::Notification;
use crate::table::RowView;
use crate::types::{Route, Trade};
use crate::view::{self, DashboardView};

/// OTC USDC -> ETH, 1000 in at 3500.1234, 0.25% slippage, $12.50 saved
pub(crate) fn sample_trade(id: u64) -> Trade {
    Trade {
        id,
        created_at: "2024-06-15T12:00:00Z".to_string(),
        route: Route::Otc,
        input_token: "USDC".to_string(),
        output_token: "ETH".to_string(),
        input_amount: 1000.0,
        price: 3500.1234,
        slippage: 0.25,
        cost_savings: 12.5,
        output_amount: None,
        jupiter_slippage: None,
        execution_time: None,
    }
}

// ============================================================================
// View
// ============================================================================

#[derive(Debug)]
struct ViewState {
    has_table: bool,
    has_submit: bool,
    rows: Vec<RowView>,
    row_writes: usize,
    notifications: Vec<Notification>,
    loading_history: Vec<bool>,
    focus: bool,
    submit_enabled: bool,
    submit_label: String,
}

/// Records every write; clones share state so a test can keep one after
/// handing another to the controller.
#[derive(Debug, Clone)]
pub(crate) struct RecordingView {
    state: Rc<RefCell<ViewState>>,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewState {
                has_table: true,
                has_submit: true,
                rows: Vec::new(),
                row_writes: 0,
                notifications: Vec::new(),
                loading_history: Vec::new(),
                focus: false,
                submit_enabled: true,
                submit_label: "Execute Trade".to_string(),
            })),
        }
    }
}

impl RecordingView {
    pub(crate) fn without_submit() -> Self {
        let view = Self::default();
        view.state.borrow_mut().has_submit = false;
        view
    }

    pub(crate) fn without_table() -> Self {
        let view = Self::default();
        view.state.borrow_mut().has_table = false;
        view
    }

    pub(crate) fn set_focus(&self, focus: bool) {
        self.state.borrow_mut().focus = focus;
    }

    pub(crate) fn rows(&self) -> Vec<RowView> {
        self.state.borrow().rows.clone()
    }

    pub(crate) fn row_writes(&self) -> usize {
        self.state.borrow().row_writes
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications.clone()
    }

    pub(crate) fn loading_history(&self) -> Vec<bool> {
        self.state.borrow().loading_history.clone()
    }

    pub(crate) fn submit_enabled(&self) -> bool {
        self.state.borrow().submit_enabled
    }

    pub(crate) fn submit_text(&self) -> String {
        self.state.borrow().submit_label.clone()
    }
}

impl DashboardView for RecordingView {
    fn replace_rows(&mut self, rows: &[RowView]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.has_table {
            return Err(view::missing(view::TABLE_BODY_SELECTOR));
        }
        state.rows = rows.to_vec();
        state.row_writes += 1;
        Ok(())
    }

    fn show_notifications(&mut self, notifications: &[Notification]) -> Result<()> {
        self.state.borrow_mut().notifications = notifications.to_vec();
        Ok(())
    }

    fn set_loading(&mut self, loading: bool) -> Result<()> {
        self.state.borrow_mut().loading_history.push(loading);
        Ok(())
    }

    fn input_has_focus(&self) -> bool {
        self.state.borrow().focus
    }

    fn submit_label(&self) -> Result<String> {
        let state = self.state.borrow();
        if !state.has_submit {
            return Err(view::missing(view::SUBMIT_BUTTON_SELECTOR));
        }
        Ok(state.submit_label.clone())
    }

    fn set_submit_state(&mut self, enabled: bool, label: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.has_submit {
            return Err(view::missing(view::SUBMIT_BUTTON_SELECTOR));
        }
        state.submit_enabled = enabled;
        state.submit_label = label.to_string();
        Ok(())
    }
}

// ============================================================================
// Charts
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum ChartEvent {
    Created(String),
    Updated(String, UpdateMode, ChartData),
    Destroyed(String),
    Themed,
}

/// Shared record of what the chart backend was asked to do
#[derive(Debug, Clone, Default)]
pub(crate) struct ChartLog {
    events: Rc<RefCell<Vec<ChartEvent>>>,
}

impl ChartLog {
    fn push(&self, event: ChartEvent) {
        self.events.borrow_mut().push(event);
    }

    pub(crate) fn created(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ChartEvent::Created(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn updates(&self) -> Vec<(String, UpdateMode)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ChartEvent::Updated(id, mode, _) => Some((id.clone(), *mode)),
                _ => None,
            })
            .collect()
    }

    /// Data passed with the latest update of `id`
    pub(crate) fn last_data(&self, id: &str) -> Option<ChartData> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            ChartEvent::Updated(chart, _, data) if chart == id => Some(data.clone()),
            _ => None,
        })
    }

    pub(crate) fn destroyed(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ChartEvent::Destroyed(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn themed(&self) -> usize {
        self.events.borrow().iter().filter(|e| **e == ChartEvent::Themed).count()
    }
}

/// Backend with a fixed set of surfaces
#[derive(Debug)]
pub(crate) struct RecordingCharts {
    surfaces: Vec<String>,
    log: ChartLog,
}

impl RecordingCharts {
    pub(crate) fn new(surfaces: &[&str]) -> Self {
        Self {
            surfaces: surfaces.iter().map(ToString::to_string).collect(),
            log: ChartLog::default(),
        }
    }

    pub(crate) fn log(&self) -> ChartLog {
        self.log.clone()
    }
}

struct RecordingChart {
    id: String,
    log: ChartLog,
}

impl ChartInstance for RecordingChart {
    fn apply(&mut self, data: &ChartData, mode: UpdateMode) -> Result<()> {
        self.log.push(ChartEvent::Updated(self.id.clone(), mode, data.clone()));
        Ok(())
    }

    fn destroy(&mut self) {
        self.log.push(ChartEvent::Destroyed(self.id.clone()));
    }
}

impl ChartBackend for RecordingCharts {
    fn create(&mut self, id: &str, _config: &ChartConfig) -> Result<Box<dyn ChartInstance>> {
        if !self.surfaces.iter().any(|s| s == id) {
            return Err(view::missing(id));
        }
        self.log.push(ChartEvent::Created(id.to_string()));
        Ok(Box::new(RecordingChart { id: id.to_string(), log: self.log.clone() }))
    }

    fn apply_theme(&mut self, _theme: &ChartTheme) {
        self.log.push(ChartEvent::Themed);
    }
}

// ============================================================================
// Trade source
// ============================================================================

enum Scripted {
    Trades(Vec<Trade>),
    Network(String),
    Decode(String),
}

#[derive(Default)]
struct SourceState {
    responses: RefCell<VecDeque<Scripted>>,
    calls: Cell<usize>,
    last_limit: Cell<Option<usize>>,
}

/// Answers fetches from a queue; an empty queue answers with no trades.
/// Every fetch suspends once before answering, like a real request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedSource {
    state: Rc<SourceState>,
}

impl ScriptedSource {
    pub(crate) fn push_trades(&self, trades: Vec<Trade>) {
        self.state.responses.borrow_mut().push_back(Scripted::Trades(trades));
    }

    pub(crate) fn push_network_error(&self, message: &str) {
        self.state.responses.borrow_mut().push_back(Scripted::Network(message.to_string()));
    }

    pub(crate) fn push_decode_error(&self, message: &str) {
        self.state.responses.borrow_mut().push_back(Scripted::Decode(message.to_string()));
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.calls.get()
    }

    pub(crate) fn last_limit(&self) -> Option<usize> {
        self.state.last_limit.get()
    }
}

impl TradeSource for ScriptedSource {
    fn fetch(&self, limit: usize) -> LocalBoxFuture<'_, Result<Vec<Trade>>> {
        let state = Rc::clone(&self.state);
        async move {
            state.calls.set(state.calls.get() + 1);
            state.last_limit.set(Some(limit));
            tokio::task::yield_now().await;

            let next = state.responses.borrow_mut().pop_front();
            match next {
                None => Ok(Vec::new()),
                Some(Scripted::Trades(trades)) => Ok(trades),
                Some(Scripted::Network(msg)) => Err(DashboardError::Network(msg)),
                Some(Scripted::Decode(msg)) => Err(DashboardError::Decode(msg)),
            }
        }
        .boxed_local()
    }
}
