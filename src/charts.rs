//! Chart registry
//!
//! Owns every live chart instance, keyed by surface id. At most one live
//! instance per id: `create` on a taken id is rejected, the caller must
//! `destroy` first. Handles carry a generation so a handle to a destroyed
//! chart cannot drive its replacement.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// One series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Backend-specific styling (colors, fill, ...) passed through untouched
    #[serde(flatten)]
    pub style: serde_json::Map<String, serde_json::Value>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self { label: label.into(), data, style: serde_json::Map::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Minimal chart configuration: kind, initial data, opaque options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ChartData,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl ChartConfig {
    pub fn new(kind: impl Into<String>, data: ChartData) -> Self {
        Self { kind: kind.into(), data, options: serde_json::Value::Null }
    }
}

/// Global defaults pushed to the backend once on start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTheme {
    pub text_color: String,
    pub border_color: String,
    pub background_color: String,
}

/// Redraw mode for an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Default transitions
    Animated,
    /// Redraw without transition animation (live feeds)
    Immediate,
}

/// A live chart owned by the registry
pub trait ChartInstance {
    fn apply(&mut self, data: &ChartData, mode: UpdateMode) -> Result<()>;

    fn destroy(&mut self);
}

/// Creates chart instances on named surfaces
pub trait ChartBackend {
    /// Fails with `RenderTargetMissing` when no surface exists for `id`
    fn create(&mut self, id: &str, config: &ChartConfig) -> Result<Box<dyn ChartInstance>>;

    fn apply_theme(&mut self, _theme: &ChartTheme) {}
}

/// Proof of a live chart; invalid once that chart is destroyed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartHandle {
    id: String,
    generation: u64,
}

impl ChartHandle {
    pub fn id(&self) -> &str {
        &self.id
    }
}

struct ChartEntry {
    generation: u64,
    instance: Box<dyn ChartInstance>,
    config: ChartConfig,
}

pub struct ChartRegistry {
    backend: Box<dyn ChartBackend>,
    charts: HashMap<String, ChartEntry>,
    next_generation: u64,
}

impl ChartRegistry {
    pub fn new(backend: Box<dyn ChartBackend>) -> Self {
        Self { backend, charts: HashMap::new(), next_generation: 0 }
    }

    pub fn apply_theme(&mut self, theme: &ChartTheme) {
        self.backend.apply_theme(theme);
    }

    pub fn create(&mut self, id: &str, config: ChartConfig) -> Result<ChartHandle> {
        if self.charts.contains_key(id) {
            return Err(DashboardError::ChartExists(id.to_string()));
        }
        let instance = self.backend.create(id, &config)?;

        self.next_generation += 1;
        let generation = self.next_generation;
        self.charts.insert(id.to_string(), ChartEntry { generation, instance, config });

        log::debug!("Chart created: {id} (generation {generation})");
        Ok(ChartHandle { id: id.to_string(), generation })
    }

    /// Replace data and redraw without animation
    pub fn update(&mut self, handle: &ChartHandle, data: ChartData) -> Result<()> {
        let entry = self
            .charts
            .get_mut(&handle.id)
            .ok_or_else(|| DashboardError::ChartNotFound(handle.id.clone()))?;
        if entry.generation != handle.generation {
            return Err(DashboardError::StaleChartHandle {
                id: handle.id.clone(),
                generation: handle.generation,
            });
        }

        entry.instance.apply(&data, UpdateMode::Immediate)?;
        entry.config.data = data;
        Ok(())
    }

    /// Idempotent. Returns true if a live chart was released.
    pub fn destroy(&mut self, id: &str) -> bool {
        match self.charts.remove(id) {
            Some(mut entry) => {
                entry.instance.destroy();
                log::debug!("Chart destroyed: {id}");
                true
            }
            None => false,
        }
    }

    /// Teardown. Returns how many charts were released.
    pub fn destroy_all(&mut self) -> usize {
        let mut count = 0;
        for (_, mut entry) in self.charts.drain() {
            entry.instance.destroy();
            count += 1;
        }
        count
    }

    pub fn is_live(&self, handle: &ChartHandle) -> bool {
        self.charts.get(&handle.id).is_some_and(|e| e.generation == handle.generation)
    }

    /// Last-applied configuration
    pub fn config(&self, id: &str) -> Option<&ChartConfig> {
        self.charts.get(id).map(|e| &e.config)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl std::fmt::Debug for ChartRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRegistry")
            .field("charts", &self.charts.keys().collect::<Vec<_>>())
            .field("next_generation", &self.next_generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ChartLog, RecordingCharts};

    fn registry() -> (ChartRegistry, ChartLog) {
        let backend = RecordingCharts::new(&["volume", "routes"]);
        let log = backend.log();
        (ChartRegistry::new(Box::new(backend)), log)
    }

    fn config() -> ChartConfig {
        ChartConfig::new(
            "bar",
            ChartData { labels: vec!["OTC".into()], datasets: vec![Dataset::new("Trades", vec![1.0])] },
        )
    }

    #[test]
    fn test_double_create_rejected() {
        let (mut charts, _) = registry();
        charts.create("volume", config()).unwrap();

        let err = charts.create("volume", config()).unwrap_err();
        assert!(matches!(err, DashboardError::ChartExists(id) if id == "volume"));
        assert_eq!(charts.len(), 1);
    }

    #[test]
    fn test_missing_surface() {
        let (mut charts, _) = registry();
        let err = charts.create("nowhere", config()).unwrap_err();
        assert!(matches!(err, DashboardError::RenderTargetMissing(_)));
        assert!(charts.is_empty());
    }

    #[test]
    fn test_update_is_not_animated() {
        let (mut charts, log) = registry();
        let handle = charts.create("volume", config()).unwrap();

        let data = ChartData { labels: vec!["DEX".into()], datasets: vec![Dataset::new("Trades", vec![4.0])] };
        charts.update(&handle, data.clone()).unwrap();

        assert_eq!(log.updates(), vec![("volume".to_string(), UpdateMode::Immediate)]);
        assert_eq!(charts.config("volume").unwrap().data, data);
    }

    #[test]
    fn test_destroy_idempotent() {
        let (mut charts, log) = registry();
        charts.create("volume", config()).unwrap();

        assert!(charts.destroy("volume"));
        assert!(!charts.destroy("volume"));
        assert!(!charts.destroy("never-created"));
        assert_eq!(log.destroyed(), vec!["volume".to_string()]);
    }

    #[test]
    fn test_stale_handle_after_recreate() {
        let (mut charts, _) = registry();
        let old = charts.create("volume", config()).unwrap();
        charts.destroy("volume");

        assert!(matches!(
            charts.update(&old, ChartData::default()),
            Err(DashboardError::ChartNotFound(_))
        ));

        let new = charts.create("volume", config()).unwrap();
        assert!(!charts.is_live(&old));
        assert!(charts.is_live(&new));
        assert!(matches!(
            charts.update(&old, ChartData::default()),
            Err(DashboardError::StaleChartHandle { .. })
        ));
    }

    #[test]
    fn test_destroy_all_leaves_nothing() {
        let (mut charts, log) = registry();
        charts.create("volume", config()).unwrap();
        charts.create("routes", config()).unwrap();

        assert_eq!(charts.destroy_all(), 2);
        assert!(charts.is_empty());
        assert_eq!(log.destroyed().len(), 2);
        assert_eq!(charts.destroy_all(), 0);
    }

    #[test]
    fn test_config_serializes_type_key() {
        let json = serde_json::to_value(config()).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["data"]["datasets"][0]["label"], "Trades");
        assert!(json.get("options").is_none());
    }
}
