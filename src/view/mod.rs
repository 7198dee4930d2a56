//! View module - render targets the engine writes to
//!
//! The engine never touches markup directly. Hosts implement
//! [`DashboardView`]; the browser binding implements it over the DOM with
//! the HTML produced by [`markup`].
//!
//! # Surfaces
//! - Trades table body (`#tradesTable tbody`)
//! - Notification container, newest first
//! - Loading indicator (`#loadingIndicator`)
//! - Trade form submit button (`#tradeForm button[type="submit"]`)
//!
//! A missing surface is reported as `RenderTargetMissing`; the controller
//! treats that as a silent no-op.

pub mod markup;

use crate::error::{DashboardError, Result};
use crate::notifications::Notification;
use crate::table::RowView;

pub const TABLE_BODY_SELECTOR: &str = "#tradesTable tbody";
pub const LOADING_SELECTOR: &str = "#loadingIndicator";
pub const NOTIFICATION_CONTAINER_SELECTOR: &str = "main .container";
pub const TRADE_FORM_SELECTOR: &str = "#tradeForm";
pub const SUBMIT_BUTTON_SELECTOR: &str = "button[type=\"submit\"]";

/// Host render targets and interaction probes
pub trait DashboardView {
    /// Replace every displayed trade row
    fn replace_rows(&mut self, rows: &[RowView]) -> Result<()>;

    /// Redraw the notification list (newest first)
    fn show_notifications(&mut self, notifications: &[Notification]) -> Result<()>;

    fn set_loading(&mut self, loading: bool) -> Result<()>;

    /// True while a text input, textarea or select has focus
    fn input_has_focus(&self) -> bool;

    /// Current label of the trade form's submit control
    fn submit_label(&self) -> Result<String>;

    fn set_submit_state(&mut self, enabled: bool, label: &str) -> Result<()>;
}

/// View with no surfaces, for hosts that only consume the engine's state
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessView;

impl DashboardView for HeadlessView {
    fn replace_rows(&mut self, _rows: &[RowView]) -> Result<()> {
        Err(missing(TABLE_BODY_SELECTOR))
    }

    fn show_notifications(&mut self, _notifications: &[Notification]) -> Result<()> {
        Err(missing(NOTIFICATION_CONTAINER_SELECTOR))
    }

    fn set_loading(&mut self, _loading: bool) -> Result<()> {
        Err(missing(LOADING_SELECTOR))
    }

    fn input_has_focus(&self) -> bool {
        false
    }

    fn submit_label(&self) -> Result<String> {
        Err(missing(SUBMIT_BUTTON_SELECTOR))
    }

    fn set_submit_state(&mut self, _enabled: bool, _label: &str) -> Result<()> {
        Err(missing(SUBMIT_BUTTON_SELECTOR))
    }
}

pub(crate) fn missing(selector: &str) -> DashboardError {
    DashboardError::RenderTargetMissing(selector.to_string())
}
