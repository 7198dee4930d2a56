//! Configuration management for the dashboard engine

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Origin prefix for API calls ("" = same origin)
    pub api_base: String,

    /// Log level
    pub log_level: String,

    /// Trades requested per refresh
    pub trade_limit: usize,

    /// Timing (milliseconds)
    pub refresh_interval_ms: u64,
    pub success_ttl_ms: u64,
    pub error_ttl_ms: u64,
    pub submit_restore_ms: u64,
    pub pump_interval_ms: u64, // Browser heartbeat driving the timer queue

    /// Submit button label while a submission is in flight
    pub busy_label: String,

    /// Row formatting
    pub slippage_warning_percent: f64, // Strictly above this is flagged
    pub timestamp_format: String,      // chrono format, rendered in local time

    /// Chart defaults applied on start
    pub chart_text_color: String,
    pub chart_border_color: String,
    pub chart_background_color: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            log_level: "info".to_string(),
            trade_limit: 10,
            refresh_interval_ms: 30_000,
            success_ttl_ms: 3_000,
            error_ttl_ms: 5_000,
            submit_restore_ms: 2_000,
            pump_interval_ms: 250,
            busy_label: "Executing...".to_string(),
            slippage_warning_percent: 1.0,
            timestamp_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),
            chart_text_color: "#adb5bd".to_string(),
            chart_border_color: "rgba(255, 255, 255, 0.1)".to_string(),
            chart_background_color: "rgba(255, 255, 255, 0.05)".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a key lookup (env vars, `data-*` attributes, ...)
    ///
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            api_base: lookup("API_BASE").unwrap_or(d.api_base),

            log_level: lookup("LOG_LEVEL").unwrap_or(d.log_level),

            trade_limit: lookup("TRADE_LIMIT")
                .map(|v| v.parse().unwrap_or(d.trade_limit))
                .unwrap_or(d.trade_limit),

            refresh_interval_ms: lookup("REFRESH_INTERVAL_MS")
                .map(|v| v.parse().unwrap_or(d.refresh_interval_ms))
                .unwrap_or(d.refresh_interval_ms),

            success_ttl_ms: lookup("SUCCESS_TTL_MS")
                .map(|v| v.parse().unwrap_or(d.success_ttl_ms))
                .unwrap_or(d.success_ttl_ms),

            error_ttl_ms: lookup("ERROR_TTL_MS")
                .map(|v| v.parse().unwrap_or(d.error_ttl_ms))
                .unwrap_or(d.error_ttl_ms),

            submit_restore_ms: lookup("SUBMIT_RESTORE_MS")
                .map(|v| v.parse().unwrap_or(d.submit_restore_ms))
                .unwrap_or(d.submit_restore_ms),

            pump_interval_ms: lookup("PUMP_INTERVAL_MS")
                .map(|v| v.parse().unwrap_or(d.pump_interval_ms))
                .unwrap_or(d.pump_interval_ms),

            busy_label: lookup("BUSY_LABEL").unwrap_or(d.busy_label),

            slippage_warning_percent: lookup("SLIPPAGE_WARNING_PERCENT")
                .map(|v| v.parse().unwrap_or(d.slippage_warning_percent))
                .unwrap_or(d.slippage_warning_percent),

            timestamp_format: lookup("TIMESTAMP_FORMAT").unwrap_or(d.timestamp_format),

            chart_text_color: lookup("CHART_TEXT_COLOR").unwrap_or(d.chart_text_color),
            chart_border_color: lookup("CHART_BORDER_COLOR").unwrap_or(d.chart_border_color),
            chart_background_color: lookup("CHART_BACKGROUND_COLOR")
                .unwrap_or(d.chart_background_color),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.trade_limit == 0 {
            return Err(DashboardError::Config("trade_limit must be positive".into()));
        }
        if self.refresh_interval_ms == 0 || self.pump_interval_ms == 0 {
            return Err(DashboardError::Config("intervals must be positive".into()));
        }
        if self.success_ttl_ms == 0 || self.error_ttl_ms == 0 {
            return Err(DashboardError::Config("notification TTLs must be positive".into()));
        }
        if !self.slippage_warning_percent.is_finite() || self.slippage_warning_percent < 0.0 {
            return Err(DashboardError::Config(
                "slippage_warning_percent must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// `log` level filter for the configured level name
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
