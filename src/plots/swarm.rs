//! Swarm plot builder.
//!
//! Resolves the value and group scales from the chart dimensions and the
//! data, then runs the layout engine.

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::{GroupMode, LayoutConfig, Orientation};
use crate::error::{Error, Result};
use crate::geometry::Bounds;
use crate::layout::{layout, Accessors, SizeSpec, SwarmLayout, SwarmNode};
use crate::scale::{BandScale, LinearScale, LogScale, Scale};

/// Value scale family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleKind {
    /// Linear mapping.
    #[default]
    Linear,
    /// Base-10 logarithmic mapping.
    Log,
}

/// One end of the value domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainBound {
    /// Taken from the data.
    Auto,
    /// Fixed value.
    Fixed(f32),
}

/// How the value scale is derived from the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScaleSpec {
    /// Scale family.
    pub kind: ScaleKind,
    /// Lower domain bound.
    pub min: DomainBound,
    /// Upper domain bound.
    pub max: DomainBound,
}

impl Default for ValueScaleSpec {
    fn default() -> Self {
        Self { kind: ScaleKind::Linear, min: DomainBound::Fixed(0.0), max: DomainBound::Auto }
    }
}

impl ValueScaleSpec {
    /// Linear scale starting at zero.
    #[must_use]
    pub fn linear() -> Self {
        Self::default()
    }

    /// Logarithmic scale with both bounds taken from the data.
    #[must_use]
    pub fn log() -> Self {
        Self { kind: ScaleKind::Log, min: DomainBound::Auto, max: DomainBound::Auto }
    }

    /// Set the lower bound.
    #[must_use]
    pub fn min(mut self, min: DomainBound) -> Self {
        self.min = min;
        self
    }

    /// Set the upper bound.
    #[must_use]
    pub fn max(mut self, max: DomainBound) -> Self {
        self.max = max;
        self
    }

    /// Resolve the domain over the finite `values` and build the scale.
    ///
    /// A collapsed domain is widened by 0.5 on each side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the domain is invalid for the scale kind.
    pub fn resolve(&self, values: &[f32], range: (f32, f32)) -> Result<ValueScale> {
        let finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let auto = Bounds::from_values(&finite);

        let min = match self.min {
            DomainBound::Fixed(v) => v,
            DomainBound::Auto => auto.map_or(0.0, |b| b.min),
        };
        let max = match self.max {
            DomainBound::Fixed(v) => v,
            DomainBound::Auto => auto.map_or(min, |b| b.max),
        };
        let (min, max) = if (max - min).abs() < f32::EPSILON { (min - 0.5, max + 0.5) } else { (min, max) };

        match self.kind {
            ScaleKind::Linear => LinearScale::new((min, max), range).map(ValueScale::Linear),
            ScaleKind::Log => LogScale::new((min, max), range).map(ValueScale::Log),
        }
    }
}

/// A resolved value scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueScale {
    /// Linear mapping.
    Linear(LinearScale),
    /// Logarithmic mapping.
    Log(LogScale),
}

impl Scale<f32, f32> for ValueScale {
    fn scale(&self, value: f32) -> f32 {
        match self {
            Self::Linear(s) => s.scale(value),
            Self::Log(s) => s.scale(value),
        }
    }

    fn domain(&self) -> (f32, f32) {
        match self {
            Self::Linear(s) => s.domain(),
            Self::Log(s) => s.domain(),
        }
    }

    fn range(&self) -> (f32, f32) {
        match self {
            Self::Linear(s) => s.range(),
            Self::Log(s) => s.range(),
        }
    }
}

/// Swarm plot builder.
#[derive(Debug)]
pub struct SwarmPlot<D, K, C = ()> {
    accessors: Accessors<D, K, C>,
    groups: Vec<K>,
    value_scale: ValueScaleSpec,
    config: LayoutConfig,
    width: u32,
    height: u32,
    margin: u32,
}

impl<D, K, C> SwarmPlot<D, K, C>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create a new swarm plot builder.
    #[must_use]
    pub fn new(accessors: Accessors<D, K, C>) -> Self {
        Self {
            accessors,
            groups: Vec::new(),
            value_scale: ValueScaleSpec::default(),
            config: LayoutConfig::default(),
            width: 600,
            height: 400,
            margin: 0,
        }
    }

    /// Set the groups in axis order.
    #[must_use]
    pub fn groups(mut self, groups: impl IntoIterator<Item = K>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Set the value scale.
    #[must_use]
    pub fn value_scale(mut self, spec: ValueScaleSpec) -> Self {
        self.value_scale = spec;
        self
    }

    /// Set the circle size.
    #[must_use]
    pub fn size(self, size: SizeSpec<D>) -> Self {
        Self { accessors: self.accessors.size(size), ..self }
    }

    /// Replace the whole layout configuration.
    #[must_use]
    pub fn layout_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the minimum gap between circle edges.
    #[must_use]
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.config.spacing = spacing;
        self
    }

    /// Set the gap between adjacent groups.
    #[must_use]
    pub fn gap(mut self, gap: f32) -> Self {
        self.config.gap = gap;
        self
    }

    /// Set the number of resolver passes.
    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set the orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.orientation = orientation;
        self
    }

    /// Set the collision partitioning.
    #[must_use]
    pub fn group_mode(mut self, mode: GroupMode) -> Self {
        self.config.group_mode = mode;
        self
    }

    /// Set margin.
    #[must_use]
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Current layout configuration.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plot area is empty, no groups are set for
    /// non-empty data, the value domain is invalid for the scale kind, or
    /// the layout itself rejects the input.
    pub fn build(&self, data: &[D]) -> Result<BuiltSwarmPlot<K, C>> {
        let (inner_width, inner_height) = self.inner_size()?;
        self.config.validate()?;

        let (value_range, group_span) = match self.config.orientation {
            Orientation::Horizontal => ((0.0, inner_width), inner_height),
            Orientation::Vertical => ((inner_height, 0.0), inner_width),
        };

        let group_scale = if self.groups.is_empty() {
            if !data.is_empty() {
                return Err(Error::invalid_config("groups", "at least one group is required"));
            }
            BandScale::from_bands(std::iter::empty())?
        } else {
            BandScale::new(&self.groups, group_span, self.config.gap)?
        };

        let values: Vec<f32> = data.iter().map(|d| self.accessors.value_of(d)).collect();
        let value_scale = self.value_scale.resolve(&values, value_range)?;

        let layout = layout(data, &self.accessors, &value_scale, &group_scale, &self.config)?;

        Ok(BuiltSwarmPlot {
            layout,
            value_scale,
            group_scale,
            orientation: self.config.orientation,
            width: self.width,
            height: self.height,
            margin: self.margin,
        })
    }

    fn inner_size(&self) -> Result<(f32, f32)> {
        let margins = self.margin.saturating_mul(2);
        if self.width <= margins || self.height <= margins {
            return Err(Error::InvalidDimensions { width: self.width, height: self.height });
        }
        Ok(((self.width - margins) as f32, (self.height - margins) as f32))
    }
}

impl<D, K, C> batuta_common::display::WithDimensions for SwarmPlot<D, K, C> {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// A laid-out swarm plot ready for rendering.
#[derive(Debug, Clone)]
pub struct BuiltSwarmPlot<K: Eq + Hash, C = ()> {
    pub(crate) layout: SwarmLayout<K, C>,
    pub(crate) value_scale: ValueScale,
    pub(crate) group_scale: BandScale<K>,
    pub(crate) orientation: Orientation,
    width: u32,
    height: u32,
    margin: u32,
}

impl<K: Eq + Hash, C> BuiltSwarmPlot<K, C> {
    /// Positioned nodes in input order.
    #[must_use]
    pub fn nodes(&self) -> &[SwarmNode<K, C>] {
        self.layout.nodes()
    }

    /// Range of secondary coordinates used, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.layout.bounds()
    }

    /// The underlying layout.
    #[must_use]
    pub fn layout(&self) -> &SwarmLayout<K, C> {
        &self.layout
    }

    /// The resolved value scale.
    #[must_use]
    pub fn value_scale(&self) -> &ValueScale {
        &self.value_scale
    }

    /// The resolved group scale.
    #[must_use]
    pub fn group_scale(&self) -> &BandScale<K> {
        &self.group_scale
    }

    /// Chart orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Outer chart size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Margin around the plot area.
    #[must_use]
    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Plot area width.
    #[must_use]
    pub fn inner_width(&self) -> f32 {
        (self.width - 2 * self.margin) as f32
    }

    /// Plot area height.
    #[must_use]
    pub fn inner_height(&self) -> f32 {
        (self.height - 2 * self.margin) as f32
    }
}
