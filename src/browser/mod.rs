//! Browser binding
//!
//! `mountDashboard()` builds a controller over the live page and wires it to
//! the window: a heartbeat interval pumping the timer queue, visibility
//! changes, delegated clicks, the trade form and page unload. Configuration
//! comes from `data-*` attributes on `<body>` (`data-refresh-interval-ms`,
//! `data-trade-limit`, ...).

mod chartjs;
mod dom;
mod locale;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::JSON;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, Window};

use crate::analytics::ChartFeed;
use crate::charts::{ChartConfig, ChartData, ChartHandle};
use crate::client::HttpTradeSource;
use crate::clock::SystemClock;
use crate::config::DashboardConfig;
use crate::controller::{Collaborators, DashboardController, UiAction};
use crate::notifications::{NotificationId, Severity};
use crate::scheduler::Toggled;
use crate::view::TRADE_FORM_SELECTOR;
use crate::view::markup::DISMISS_ATTR;

use chartjs::ChartJsBackend;
use dom::DomView;
use locale::LocaleFormatter;

const REFRESH_ATTR: &str = "data-refresh";
const TOGGLE_ATTR: &str = "data-toggle-auto-refresh";

pub(crate) fn js_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// `REFRESH_INTERVAL_MS` -> `refreshIntervalMs` (dataset key of
/// `data-refresh-interval-ms`)
fn dataset_key(var: &str) -> String {
    let mut key = String::with_capacity(var.len());
    let mut upper = false;
    for c in var.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            key.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            key.push(c.to_ascii_lowercase());
        }
    }
    key
}

/// A second mount keeps the installed logger and only adjusts its level
fn init_logging(filter: log::LevelFilter) {
    match filter.to_level() {
        Some(level) if console_log::init_with_level(level).is_ok() => {}
        _ => log::set_max_level(filter),
    }
}

fn read_config(document: &Document) -> DashboardConfig {
    let Some(body) = document.body() else {
        return DashboardConfig::default();
    };
    let dataset = body.dataset();
    DashboardConfig::from_vars(|var| dataset.get(&dataset_key(var)))
}

/// Handle returned to page scripts
#[wasm_bindgen]
pub struct Dashboard {
    controller: Rc<DashboardController>,
    charts: RefCell<HashMap<String, ChartHandle>>,
    heartbeat: Rc<Cell<Option<i32>>>,
}

#[wasm_bindgen(js_name = mountDashboard)]
pub fn mount_dashboard() -> Result<Dashboard, JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = read_config(&document);
    init_logging(config.level_filter());

    let base_url = if config.api_base.is_empty() {
        window.location().origin()?
    } else {
        config.api_base.clone()
    };
    let pump_interval = i32::try_from(config.pump_interval_ms).unwrap_or(i32::MAX);

    let controller = Rc::new(
        DashboardController::new(
            config,
            Collaborators {
                source: Box::new(HttpTradeSource::new(base_url)),
                view: Box::new(DomView::new(document.clone())),
                charts: Box::new(ChartJsBackend::new(document.clone())),
                clock: Rc::new(SystemClock),
                timestamps: Some(Rc::new(LocaleFormatter)),
            },
        )
        .map_err(to_js_error)?,
    );
    controller.set_visible(!document.hidden());
    controller.start();

    let heartbeat = Rc::new(Cell::new(None));
    install_heartbeat(&window, &controller, &heartbeat, pump_interval)?;
    install_listeners(&window, &document, &controller, &heartbeat)?;

    Ok(Dashboard { controller, charts: RefCell::new(HashMap::new()), heartbeat })
}

fn install_heartbeat(
    window: &Window,
    controller: &Rc<DashboardController>,
    heartbeat: &Rc<Cell<Option<i32>>>,
    interval_ms: i32,
) -> Result<(), JsValue> {
    let ctrl = Rc::clone(controller);
    let tick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        let ctrl = Rc::clone(&ctrl);
        spawn_local(async move {
            ctrl.pump().await;
        });
    }));
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        interval_ms,
    )?;
    tick.forget();
    heartbeat.set(Some(id));
    Ok(())
}

fn teardown(controller: &DashboardController, heartbeat: &Cell<Option<i32>>) {
    if let (Some(id), Some(window)) = (heartbeat.take(), web_sys::window()) {
        window.clear_interval_with_handle(id);
    }
    controller.stop();
}

/// Map a click onto the dashboard affordance it landed in, if any
fn click_action(target: &Element) -> Option<UiAction> {
    let closest = |attr: &str| target.closest(&format!("[{attr}]")).ok().flatten();

    if closest(REFRESH_ATTR).is_some() {
        return Some(UiAction::Refresh);
    }
    if closest(TOGGLE_ATTR).is_some() {
        return Some(UiAction::ToggleAutoRefresh);
    }
    closest(DISMISS_ATTR)
        .and_then(|el| el.get_attribute(DISMISS_ATTR))
        .and_then(|raw| raw.parse::<NotificationId>().ok())
        .map(UiAction::Dismiss)
}

fn install_listeners(
    window: &Window,
    document: &Document,
    controller: &Rc<DashboardController>,
    heartbeat: &Rc<Cell<Option<i32>>>,
) -> Result<(), JsValue> {
    // Visibility
    {
        let ctrl = Rc::clone(controller);
        let doc = document.clone();
        let cb = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let ctrl = Rc::clone(&ctrl);
            let visible = !doc.hidden();
            spawn_local(async move {
                ctrl.on_visibility_change(visible).await;
            });
        }));
        document.add_event_listener_with_callback("visibilitychange", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // Delegated clicks
    {
        let ctrl = Rc::clone(controller);
        let cb = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |ev: Event| {
            let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Some(action) = click_action(&target) else {
                return;
            };
            ev.prevent_default();
            let ctrl = Rc::clone(&ctrl);
            spawn_local(async move {
                ctrl.handle_action(action).await;
            });
        }));
        document.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // Trade form
    {
        let ctrl = Rc::clone(controller);
        let cb = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |ev: Event| {
            let is_form = ev
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .is_some_and(|el| el.matches(TRADE_FORM_SELECTOR).unwrap_or(false));
            if is_form {
                ctrl.submit_trade();
            }
        }));
        document.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // Unload
    {
        let ctrl = Rc::clone(controller);
        let heartbeat = Rc::clone(heartbeat);
        let cb = Closure::<dyn FnMut()>::wrap(Box::new(move || teardown(&ctrl, &heartbeat)));
        window.add_event_listener_with_callback("beforeunload", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    Ok(())
}

#[wasm_bindgen]
impl Dashboard {
    pub fn refresh(&self) {
        let ctrl = Rc::clone(&self.controller);
        spawn_local(async move {
            ctrl.refresh_now().await;
        });
    }

    /// True when auto-refresh ends up enabled
    #[wasm_bindgen(js_name = toggleAutoRefresh)]
    pub fn toggle_auto_refresh(&self) -> bool {
        self.controller.toggle_auto_refresh() == Toggled::Enabled
    }

    /// Returns the notification id (for `dismiss`)
    pub fn notify(&self, message: &str, is_error: bool) -> String {
        let severity = if is_error { Severity::Error } else { Severity::Success };
        self.controller.notify(message, severity).to_string()
    }

    pub fn dismiss(&self, id: &str) -> bool {
        id.parse::<NotificationId>()
            .is_ok_and(|id| self.controller.dismiss(id))
    }

    #[wasm_bindgen(js_name = submissionComplete)]
    pub fn submission_complete(&self) -> bool {
        self.controller.complete_submission()
    }

    /// `config` is a plain Chart.js config object (`type`, `data`, `options`)
    #[wasm_bindgen(js_name = createChart)]
    pub fn create_chart(&self, id: &str, config: &JsValue) -> Result<(), JsValue> {
        let json: String = JSON::stringify(config)?.into();
        let config: ChartConfig = serde_json::from_str(&json).map_err(to_js_error)?;
        let handle = self.controller.create_chart(id, config).map_err(to_js_error)?;
        self.charts.borrow_mut().insert(id.to_string(), handle);
        Ok(())
    }

    #[wasm_bindgen(js_name = updateChart)]
    pub fn update_chart(&self, id: &str, data: &JsValue) -> Result<(), JsValue> {
        let json: String = JSON::stringify(data)?.into();
        let data: ChartData = serde_json::from_str(&json).map_err(to_js_error)?;
        let handle = self.handle(id)?;
        self.controller.update_chart(&handle, data).map_err(to_js_error)
    }

    /// Feed names: `route_count`, `route_volume`, `slippage`, `cost_savings`
    #[wasm_bindgen(js_name = bindChart)]
    pub fn bind_chart(&self, id: &str, feed: &str) -> Result<(), JsValue> {
        let feed: ChartFeed =
            serde_json::from_value(serde_json::Value::String(feed.to_string())).map_err(to_js_error)?;
        let handle = self.handle(id)?;
        self.controller.bind_chart(handle, feed);
        Ok(())
    }

    #[wasm_bindgen(js_name = destroyChart)]
    pub fn destroy_chart(&self, id: &str) -> bool {
        self.charts.borrow_mut().remove(id);
        self.controller.destroy_chart(id)
    }

    /// Cancel every timer and destroy every chart
    pub fn stop(&self) {
        self.charts.borrow_mut().clear();
        teardown(&self.controller, &self.heartbeat);
    }
}

impl Dashboard {
    fn handle(&self, id: &str) -> Result<ChartHandle, JsValue> {
        self.charts
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("Chart not found: {id}")))
    }
}
