//! Trade times in the browser's locale

use chrono::{DateTime, Utc};
use js_sys::{Date, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::table::TimestampFormatter;

/// `Date.prototype.toLocaleString()` with the page's default locale and zone
#[derive(Debug, Default)]
pub struct LocaleFormatter;

impl TimestampFormatter for LocaleFormatter {
    fn format(&self, at: DateTime<Utc>) -> Option<String> {
        let date = Date::new(&JsValue::from_f64(at.timestamp_millis() as f64));
        Reflect::get(&date, &JsValue::from_str("toLocaleString"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?
            .call0(&date)
            .ok()?
            .as_string()
    }
}
