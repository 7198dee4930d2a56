//! Chart.js backend
//!
//! Talks to the page's global `Chart` through `js_sys::Reflect`. Configs and
//! data cross the boundary as JSON.

use js_sys::{Array, Function, JSON, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement};

use super::js_message;
use crate::charts::{ChartBackend, ChartConfig, ChartData, ChartInstance, ChartTheme, UpdateMode};
use crate::error::{DashboardError, Result};
use crate::view;

fn chart_error(err: JsValue) -> DashboardError {
    DashboardError::Chart(js_message(&err))
}

fn chart_global() -> Result<Function> {
    Reflect::get(&js_sys::global(), &JsValue::from_str("Chart"))
        .ok()
        .and_then(|c| c.dyn_into::<Function>().ok())
        .ok_or_else(|| DashboardError::Chart("Chart.js is not loaded".into()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    let json = serde_json::to_string(value)?;
    JSON::parse(&json).map_err(chart_error)
}

fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(chart_error)?
        .dyn_into::<Function>()
        .map_err(chart_error)?
        .apply(target, args)
        .map_err(chart_error)
}

pub struct ChartJsBackend {
    document: Document,
}

impl ChartJsBackend {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ChartBackend for ChartJsBackend {
    fn create(&mut self, id: &str, config: &ChartConfig) -> Result<Box<dyn ChartInstance>> {
        let canvas = self
            .document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| view::missing(id))?;

        let args = Array::of2(&JsValue::from(canvas), &to_js(config)?);
        let chart = Reflect::construct(&chart_global()?, &args).map_err(chart_error)?;
        Ok(Box::new(ChartJsInstance { chart }))
    }

    fn apply_theme(&mut self, theme: &ChartTheme) {
        let defaults = chart_global()
            .and_then(|c| Reflect::get(&c, &JsValue::from_str("defaults")).map_err(chart_error));
        let defaults = match defaults {
            Ok(d) => d,
            Err(e) => {
                log::debug!("Chart theme not applied: {e}");
                return;
            }
        };

        for (key, value) in [
            ("color", &theme.text_color),
            ("borderColor", &theme.border_color),
            ("backgroundColor", &theme.background_color),
        ] {
            if let Err(e) = Reflect::set(&defaults, &JsValue::from_str(key), &JsValue::from_str(value)) {
                log::debug!("Chart default {key} not set: {}", js_message(&e));
            }
        }
    }
}

struct ChartJsInstance {
    chart: JsValue,
}

impl ChartInstance for ChartJsInstance {
    fn apply(&mut self, data: &ChartData, mode: UpdateMode) -> Result<()> {
        Reflect::set(&self.chart, &JsValue::from_str("data"), &to_js(data)?).map_err(chart_error)?;
        let args = match mode {
            UpdateMode::Immediate => Array::of1(&JsValue::from_str("none")),
            UpdateMode::Animated => Array::new(),
        };
        call_method(&self.chart, "update", &args)?;
        Ok(())
    }

    fn destroy(&mut self) {
        if let Err(e) = call_method(&self.chart, "destroy", &Array::new()) {
            log::warn!("Chart destroy failed: {e}");
        }
    }
}
