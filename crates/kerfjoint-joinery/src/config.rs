//! Engine configuration.
//!
//! Numeric tolerances, probe geometry and tessellation counts used by every
//! joinery computation, plus the default box job run by the binary. Files are
//! JSON or TOML, chosen by extension.

use crate::boxes::{BoxProperties, TopBottomProperties};
use crate::error::{JoineryError, JoineryResult, ParameterError};
use kerfjoint_geometry::Probe;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometric tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Overlap volume above which two solids interact.
    pub intersection_volume: f64,
    /// Cross product norm under which two directions are parallel.
    pub direction_epsilon: f64,
    /// Per-component match between a corner cross product and the normal.
    pub frame_epsilon: f64,
    /// Allowed difference between the two inner hinge radii.
    pub arc_radius_epsilon: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            intersection_volume: 0.001,
            direction_epsilon: 1e-5,
            frame_epsilon: 1e-6,
            arc_radius_epsilon: 1e-3,
        }
    }
}

/// Polygon counts used when curved features are turned into facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tessellation {
    pub cylinder_segments: usize,
    pub arc_segments: usize,
    pub bezier_samples: usize,
}

impl Default for Tessellation {
    fn default() -> Self {
        Self {
            cylinder_segments: 16,
            arc_segments: 12,
            bezier_samples: 8,
        }
    }
}

/// Box generated by the command line tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BoxJob {
    pub properties: BoxProperties,
    pub top: TopBottomProperties,
    pub bottom: TopBottomProperties,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoineryConfig {
    pub tolerances: Tolerances,
    pub probe: Probe,
    pub tessellation: Tessellation,
    /// Slit clearance used to estimate hinge links before a global hinge
    /// material exists.
    pub default_hinge_clearance: f64,
    pub box_job: BoxJob,
}

impl Default for JoineryConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            probe: Probe::default(),
            tessellation: Tessellation::default(),
            default_hinge_clearance: 0.20,
            box_job: BoxJob::default(),
        }
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), ParameterError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be > 0, got {value}"),
        })
    }
}

impl JoineryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> JoineryResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(JoineryError::InvalidParameters(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        config.validate()?;
        tracing::debug!("Loaded joinery config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> JoineryResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(JoineryError::InvalidParameters(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> JoineryResult<()> {
        let t = &self.tolerances;
        require_positive("tolerances.intersection_volume", t.intersection_volume)?;
        require_positive("tolerances.direction_epsilon", t.direction_epsilon)?;
        require_positive("tolerances.frame_epsilon", t.frame_epsilon)?;
        require_positive("tolerances.arc_radius_epsilon", t.arc_radius_epsilon)?;

        require_positive("probe.offset", self.probe.offset)?;
        require_positive("probe.radius", self.probe.radius)?;
        require_positive("probe.threshold", self.probe.threshold)?;
        if self.probe.radius >= self.probe.offset {
            return Err(ParameterError::Incompatible(
                "probe radius must be smaller than probe offset".to_string(),
            )
            .into());
        }

        let tess = &self.tessellation;
        if tess.cylinder_segments < 3 || tess.arc_segments < 1 || tess.bezier_samples < 1 {
            return Err(ParameterError::InvalidValue {
                name: "tessellation".to_string(),
                reason: "cylinders need 3 segments, arcs and curves at least 1".to_string(),
            }
            .into());
        }

        require_positive("default_hinge_clearance", self.default_hinge_clearance)?;
        self.box_job.properties.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = JoineryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tolerances.intersection_volume, 0.001);
        assert_eq!(config.probe.radius, 0.04);
        assert_eq!(config.default_hinge_clearance, 0.20);
    }

    #[test]
    fn test_rejects_bad_probe() {
        let mut config = JoineryConfig::default();
        config.probe.radius = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: JoineryConfig = toml::from_str(
            r#"
            default_hinge_clearance = 0.3

            [tessellation]
            cylinder_segments = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.default_hinge_clearance, 0.3);
        assert_eq!(config.tessellation.cylinder_segments, 24);
        assert_eq!(config.tessellation.arc_segments, 12);
        assert_eq!(config.tolerances, Tolerances::default());
    }
}
