//! Generation parameters
//!
//! `LayoutConfig` gathers everything the pipeline needs besides the seed. It
//! can be built in code, deserialized from JSON (missing fields fall back to
//! the defaults) or loaded from a file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::consts::*;
use crate::error::ConfigError;
use crate::layout::Rect;

/// Whether corridors may overlap other corridors
///
/// Corridors never overlap rooms, whatever the policy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrossingPolicy {
    #[default]
    Forbid,
    Allow,
}

impl CrossingPolicy {
    /// Whether a corridor may overlap another corridor
    pub fn allows(self) -> bool {
        self == CrossingPolicy::Allow
    }
}

/// How corridors are built between two rooms
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoutingStrategy {
    /// Straight or L-shaped rectangle segments between door anchors
    #[default]
    Direct,
    /// Shortest four-connected cell path on the unit grid
    Grid,
}

/// Edge weight between two room centers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

/// What to do with a required edge no attempt could route
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnroutablePolicy {
    /// Discard the attempt and restart from room placement
    #[default]
    Restart,
    /// Commit the least-bad geometry and flag the connector as forced
    ForceBestEffort,
}

/// Attempt budgets at each level of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptBudgets {
    /// Room samples per pipeline attempt
    pub placement: u32,
    /// Geometry proposals per edge
    pub per_edge: u32,
    /// Full pipeline runs
    pub pipeline: u32,
}

impl Default for AttemptBudgets {
    fn default() -> Self {
        Self {
            placement: DEFAULT_PLACEMENT_ATTEMPTS,
            per_edge: DEFAULT_EDGE_ATTEMPTS,
            pipeline: DEFAULT_PIPELINE_ATTEMPTS,
        }
    }
}

/// Full set of layout generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Map width; the map spans x in [0, width]
    pub width: u32,
    /// Map height; the map spans y in [0, height]
    pub height: u32,
    /// Number of rooms every layout must contain
    pub room_count: usize,
    /// Allowed (width, height) room sizes
    pub room_sizes: Vec<(u32, u32)>,
    /// Minimum empty gap between randomly placed rooms
    pub room_padding: u32,
    /// Share of rooms placed flush against an existing room
    pub touching_fraction: f64,
    pub corridor_thickness: f64,
    pub crossing: CrossingPolicy,
    pub strategy: RoutingStrategy,
    pub metric: DistanceMetric,
    /// Extra loop edges as a share of the spanning tree size
    pub extra_edge_fraction: f64,
    pub unroutable: UnroutablePolicy,
    pub budgets: AttemptBudgets,
    /// Bucket size of the spatial index
    pub index_cell_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            room_count: DEFAULT_ROOM_COUNT,
            room_sizes: DEFAULT_ROOM_SIZES.to_vec(),
            room_padding: 0,
            touching_fraction: 0.0,
            corridor_thickness: DEFAULT_CORRIDOR_THICKNESS,
            crossing: CrossingPolicy::Forbid,
            strategy: RoutingStrategy::Direct,
            metric: DistanceMetric::Euclidean,
            extra_edge_fraction: 0.0,
            unroutable: UnroutablePolicy::Restart,
            budgets: AttemptBudgets::default(),
            index_cell_size: DEFAULT_INDEX_CELL_SIZE,
        }
    }
}

impl LayoutConfig {
    /// Config for a map of the given size, otherwise default
    pub fn with_bounds(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The map rectangle anchored at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    /// Check every field for values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBounds {
                width: self.width,
                height: self.height,
            });
        }
        if self.room_sizes.is_empty() {
            return Err(ConfigError::NoRoomSizes);
        }
        if let Some(&(width, height)) = self.room_sizes.iter().find(|(w, h)| *w == 0 || *h == 0) {
            return Err(ConfigError::EmptyRoomSize { width, height });
        }
        positive("corridor_thickness", self.corridor_thickness)?;
        positive("index_cell_size", self.index_cell_size)?;
        fraction("touching_fraction", self.touching_fraction)?;
        fraction("extra_edge_fraction", self.extra_edge_fraction)?;

        let budgets = [
            ("placement", self.budgets.placement),
            ("per_edge", self.budgets.per_edge),
            ("pipeline", self.budgets.pipeline),
        ];
        if let Some(&(name, _)) = budgets.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroBudget { name });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config_is_valid() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json_str(
            r#"{ "width": 40, "room_count": 3, "crossing": "allow", "budgets": { "per_edge": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.height, DEFAULT_MAP_HEIGHT);
        assert_eq!(config.room_count, 3);
        assert_eq!(config.crossing, CrossingPolicy::Allow);
        assert_eq!(config.budgets.per_edge, 4);
        assert_eq!(config.budgets.pipeline, DEFAULT_PIPELINE_ATTEMPTS);
    }

    #[test]
    fn test_roundtrip() {
        let config = LayoutConfig {
            strategy: RoutingStrategy::Grid,
            metric: DistanceMetric::Manhattan,
            unroutable: UnroutablePolicy::ForceBestEffort,
            ..LayoutConfig::with_bounds(60, 30)
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"force_best_effort\""));
        let parsed = LayoutConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = LayoutConfig::with_bounds(0, 10);
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBounds { .. })));

        config = LayoutConfig::default();
        config.room_sizes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoRoomSizes)));

        config = LayoutConfig::default();
        config.corridor_thickness = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "corridor_thickness", .. })
        ));

        config = LayoutConfig::default();
        config.touching_fraction = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::FractionOutOfRange { .. })));

        config = LayoutConfig::default();
        config.budgets.pipeline = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroBudget { name: "pipeline" })
        ));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            LayoutConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_enum_strings() {
        assert_eq!(RoutingStrategy::from_str("grid").unwrap(), RoutingStrategy::Grid);
        assert_eq!(CrossingPolicy::Allow.to_string(), "allow");
        assert_eq!(UnroutablePolicy::ForceBestEffort.as_ref(), "force_best_effort");
    }

    #[test]
    fn test_crossing_policy_allows() {
        assert!(CrossingPolicy::Allow.allows());
        assert!(!CrossingPolicy::Forbid.allows());
        assert!(!LayoutConfig::default().crossing.allows());
    }
}
