//! Error types for the dashboard engine
//!
//! Uses thiserror for ergonomic error definitions.
//! Refresh failures are caught by the scheduler and never escape to the host.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard engine errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Request failed in transport or returned a non-2xx status
    #[error("Network error: {0}")]
    Network(String),

    /// Payload could not be decoded into a trade list
    #[error("Decode error: {0}")]
    Decode(String),

    /// Expected surface (table, canvas, control, container) is absent
    #[error("Render target missing: {0}")]
    RenderTargetMissing(String),

    /// A live chart already owns this id
    #[error("Chart already exists: {0}")]
    ChartExists(String),

    /// No live chart for this id
    #[error("Chart not found: {0}")]
    ChartNotFound(String),

    /// Handle points at a chart that was destroyed (and possibly recreated)
    #[error("Stale chart handle: {id} (generation {generation})")]
    StaleChartHandle { id: String, generation: u64 },

    /// Chart backend failure
    #[error("Chart error: {0}")]
    Chart(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// Errors a refresh cycle turns into a user-visible notification
    pub fn is_refresh_failure(&self) -> bool {
        matches!(self, DashboardError::Network(_) | DashboardError::Decode(_))
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashboardError::Decode(err.to_string())
        } else {
            DashboardError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::StaleChartHandle { id: "volume".into(), generation: 3 };
        assert_eq!(err.to_string(), "Stale chart handle: volume (generation 3)");
    }

    #[test]
    fn test_json_error_is_decode() {
        let json_err = serde_json::from_str::<Vec<i32>>("{not json").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(matches!(err, DashboardError::Decode(_)));
        assert!(err.is_refresh_failure());
    }

    #[test]
    fn test_render_target_missing_is_not_refresh_failure() {
        let err = DashboardError::RenderTargetMissing("#tradesTable tbody".into());
        assert!(!err.is_refresh_failure());
    }
}
