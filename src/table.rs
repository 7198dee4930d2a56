//! Trade table reconciliation
//!
//! [`TableRenderer`] turns trades into display rows and is pure.
//! [`TradeTable`] holds what is currently displayed and applies the
//! keep-on-empty policy: an empty trade list never blanks a populated table.
//! Anything else replaces the whole row set in the order received.
//! Trade times go through a [`TimestampFormatter`] so the host can render
//! them in its own locale.

use std::fmt::Write as _;
use std::rc::Rc;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::types::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteBadge {
    Otc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlippageLevel {
    Normal,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsStyle {
    Positive,
    Neutral,
}

/// One displayed table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub trade_id: u64,
    pub time: String,
    pub route: String,
    pub route_badge: RouteBadge,
    pub pair: String,
    pub amount: String,
    pub price: String,
    pub slippage: String,
    pub slippage_level: SlippageLevel,
    pub savings: String,
    pub savings_style: SavingsStyle,
}

/// Display form of a parsed trade time
pub trait TimestampFormatter: std::fmt::Debug {
    /// `None` falls back to the raw value as received
    fn format(&self, at: DateTime<Utc>) -> Option<String>;
}

/// chrono pattern rendered in the local timezone (`timestamp_format`)
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
}

impl PatternFormatter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into() }
    }
}

impl TimestampFormatter for PatternFormatter {
    fn format(&self, at: DateTime<Utc>) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", at.with_timezone(&Local).format(&self.pattern)).ok()?;
        Some(out)
    }
}

#[derive(Debug, Clone)]
pub struct TableRenderer {
    slippage_warning_percent: f64,
    timestamps: Rc<dyn TimestampFormatter>,
}

impl TableRenderer {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            slippage_warning_percent: config.slippage_warning_percent,
            timestamps: Rc::new(PatternFormatter::new(config.timestamp_format.as_str())),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, timestamps: Rc<dyn TimestampFormatter>) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn render(&self, trades: &[Trade]) -> Vec<RowView> {
        trades.iter().map(|t| self.render_row(t)).collect()
    }

    pub fn render_row(&self, trade: &Trade) -> RowView {
        let (savings, savings_style) = if trade.cost_savings > 0.0 {
            (format!("+${:.2}", trade.cost_savings), SavingsStyle::Positive)
        } else {
            ("$0.00".to_string(), SavingsStyle::Neutral)
        };

        RowView {
            trade_id: trade.id,
            time: self.format_time(&trade.created_at),
            route: trade.route.to_string(),
            route_badge: if trade.route.is_otc() { RouteBadge::Otc } else { RouteBadge::Other },
            pair: trade.pair(),
            amount: format!("{:.2} {}", trade.input_amount, trade.input_token),
            price: format!("${:.4}", trade.price),
            slippage: format!("{:.3}%", trade.slippage),
            slippage_level: if trade.slippage > self.slippage_warning_percent {
                SlippageLevel::Warning
            } else {
                SlippageLevel::Normal
            },
            savings,
            savings_style,
        }
    }

    /// Unparseable input is shown as received
    fn format_time(&self, raw: &str) -> String {
        parse_timestamp(raw)
            .and_then(|utc| self.timestamps.format(utc))
            .unwrap_or_else(|| raw.to_string())
    }
}

/// RFC 3339, or naive ISO 8601 as written by the backend (UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Replaced { rows: usize },
    KeptOnEmpty,
}

/// Currently displayed rows
#[derive(Debug)]
pub struct TradeTable {
    renderer: TableRenderer,
    rows: Vec<RowView>,
}

impl TradeTable {
    pub fn new(renderer: TableRenderer) -> Self {
        Self { renderer, rows: Vec::new() }
    }

    pub fn reconcile(&mut self, trades: &[Trade]) -> Reconciliation {
        if trades.is_empty() {
            return Reconciliation::KeptOnEmpty;
        }
        self.rows = self.renderer.render(trades);
        Reconciliation::Replaced { rows: self.rows.len() }
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }
}
