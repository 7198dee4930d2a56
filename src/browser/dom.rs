//! DOM render targets

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use super::js_message;
use crate::error::{DashboardError, Result};
use crate::notifications::Notification;
use crate::table::RowView;
use crate::view::{
    self, DashboardView, LOADING_SELECTOR, NOTIFICATION_CONTAINER_SELECTOR, SUBMIT_BUTTON_SELECTOR,
    TABLE_BODY_SELECTOR, TRADE_FORM_SELECTOR, markup,
};

/// Alerts live in their own block at the top of the page container
const NOTIFICATION_STACK_ID: &str = "otcNotifications";

pub struct DomView {
    document: Document,
}

impl DomView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn query(&self, selector: &str) -> Result<Element> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or_else(|| view::missing(selector))
    }

    fn submit_button(&self) -> Result<HtmlButtonElement> {
        let selector = format!("{TRADE_FORM_SELECTOR} {SUBMIT_BUTTON_SELECTOR}");
        self.query(&selector)?
            .dyn_into::<HtmlButtonElement>()
            .map_err(|_| view::missing(&selector))
    }

    fn notification_stack(&self) -> Result<Element> {
        if let Some(stack) = self.document.get_element_by_id(NOTIFICATION_STACK_ID) {
            return Ok(stack);
        }
        self.query(NOTIFICATION_CONTAINER_SELECTOR)?
            .insert_adjacent_html("afterbegin", &format!(r#"<div id="{NOTIFICATION_STACK_ID}"></div>"#))
            .map_err(|e| DashboardError::RenderTargetMissing(js_message(&e)))?;
        self.document
            .get_element_by_id(NOTIFICATION_STACK_ID)
            .ok_or_else(|| view::missing(NOTIFICATION_CONTAINER_SELECTOR))
    }
}

impl DashboardView for DomView {
    fn replace_rows(&mut self, rows: &[RowView]) -> Result<()> {
        self.query(TABLE_BODY_SELECTOR)?.set_inner_html(&markup::rows_html(rows));
        Ok(())
    }

    fn show_notifications(&mut self, notifications: &[Notification]) -> Result<()> {
        self.notification_stack()?
            .set_inner_html(&markup::notifications_html(notifications));
        Ok(())
    }

    fn set_loading(&mut self, loading: bool) -> Result<()> {
        let indicator = self
            .query(LOADING_SELECTOR)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| view::missing(LOADING_SELECTOR))?;
        indicator
            .style()
            .set_property("display", if loading { "block" } else { "none" })
            .map_err(|e| DashboardError::RenderTargetMissing(js_message(&e)))
    }

    fn input_has_focus(&self) -> bool {
        self.document
            .active_element()
            .is_some_and(|el| el.matches("input, textarea, select").unwrap_or(false))
    }

    fn submit_label(&self) -> Result<String> {
        Ok(self.submit_button()?.inner_html())
    }

    fn set_submit_state(&mut self, enabled: bool, label: &str) -> Result<()> {
        let button = self.submit_button()?;
        button.set_disabled(!enabled);
        if enabled {
            // Restores the markup captured before the busy state
            button.set_inner_html(label);
        } else {
            button.set_inner_html(&markup::busy_button_html(label));
        }
        Ok(())
    }
}
