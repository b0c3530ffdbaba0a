//! Layout configuration.
//!
//! With the `config` feature, a [`LayoutConfig`] can be loaded from YAML.
//! Every field is optional in the file and falls back to its default.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config")]
use std::path::Path;

use crate::error::{Error, Result};

/// Which screen axis carries the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Values run along x, groups are stacked along y.
    Horizontal,
    /// Values run along y, groups sit side by side along x.
    #[default]
    Vertical,
}

/// How nodes are partitioned for collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum GroupMode {
    /// Only nodes of the same group can collide.
    #[default]
    Grouped,
    /// All nodes form a single swarm and collide with each other.
    Unified,
}

/// Parameters of the collision simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LayoutConfig {
    /// Minimum gap between circle edges, in pixels.
    pub spacing: f32,
    /// Minimum gap between adjacent groups, in pixels.
    pub gap: f32,
    /// Share of the pending displacement applied per pass, in `(0, 1]`.
    pub force_strength: f32,
    /// Number of resolver passes.
    pub iterations: usize,
    /// Axis orientation.
    pub orientation: Orientation,
    /// Collision partitioning.
    pub group_mode: GroupMode,
    /// Keep nodes inside their group band.
    pub bounded: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 2.0,
            gap: 0.0,
            force_strength: 1.0,
            iterations: 120,
            orientation: Orientation::Vertical,
            group_mode: GroupMode::Grouped,
            bounded: true,
        }
    }
}

impl LayoutConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum gap between circle edges.
    #[must_use]
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the gap between adjacent groups.
    #[must_use]
    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    /// Set the per-pass force strength.
    #[must_use]
    pub fn force_strength(mut self, force_strength: f32) -> Self {
        self.force_strength = force_strength;
        self
    }

    /// Set the number of resolver passes.
    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the collision partitioning.
    #[must_use]
    pub fn group_mode(mut self, group_mode: GroupMode) -> Self {
        self.group_mode = group_mode;
        self
    }

    /// Enable or disable band clamping.
    #[must_use]
    pub fn bounded(mut self, bounded: bool) -> Self {
        self.bounded = bounded;
        self
    }

    /// Check every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(Error::invalid_config(
                "spacing",
                format!("must be a finite value >= 0, got {}", self.spacing),
            ));
        }
        if !self.gap.is_finite() || self.gap < 0.0 {
            return Err(Error::invalid_config(
                "gap",
                format!("must be a finite value >= 0, got {}", self.gap),
            ));
        }
        if self.force_strength.is_nan() || self.force_strength <= 0.0 || self.force_strength > 1.0 {
            return Err(Error::invalid_config(
                "force_strength",
                format!("must be in (0, 1], got {}", self.force_strength),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl LayoutConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Serializes the configuration to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| Error::ConfigParse { line: 0, message: e.to_string() })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
