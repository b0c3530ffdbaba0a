//! Layer dispatch for renderers.
//!
//! A renderer walks a list of [`Layer`]s over a built plot. Named layers are
//! routed to a [`LayerVisitor`]; custom layers are plain functions. Both see
//! the same read-only [`LayerContext`].

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::config::Orientation;
use crate::geometry::Bounds;
use crate::layout::SwarmNode;
use crate::plots::swarm::{BuiltSwarmPlot, ValueScale};
use crate::scale::BandScale;

/// Read-only view of a built plot handed to every layer.
#[derive(Debug)]
pub struct LayerContext<'a, K: Eq + Hash, C = ()> {
    /// Positioned nodes in input order.
    pub nodes: &'a [SwarmNode<K, C>],
    /// Range of secondary coordinates used.
    pub bounds: Option<Bounds>,
    /// Plot area width.
    pub inner_width: f32,
    /// Plot area height.
    pub inner_height: f32,
    /// Chart orientation.
    pub orientation: Orientation,
    /// Value axis scale.
    pub value_scale: &'a ValueScale,
    /// Group axis scale.
    pub group_scale: &'a BandScale<K>,
}

/// User-supplied layer function.
pub type CustomLayer<K, C> = Arc<dyn Fn(&LayerContext<'_, K, C>) + Send + Sync>;

/// One drawing layer.
pub enum Layer<K: Eq + Hash, C = ()> {
    /// Grid lines.
    Grid,
    /// Value and group axes.
    Axes,
    /// The circles themselves.
    Circles,
    /// Annotations on selected nodes.
    Annotations,
    /// Interaction mesh.
    Mesh,
    /// Caller-defined layer.
    Custom(CustomLayer<K, C>),
}

impl<K: Eq + Hash, C> Layer<K, C> {
    /// The stock layer stack, bottom to top.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::Grid, Self::Axes, Self::Circles, Self::Annotations, Self::Mesh]
    }

    /// Wrap a function as a custom layer.
    pub fn custom(f: impl Fn(&LayerContext<'_, K, C>) + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl<K: Eq + Hash, C> Clone for Layer<K, C> {
    fn clone(&self) -> Self {
        match self {
            Self::Grid => Self::Grid,
            Self::Axes => Self::Axes,
            Self::Circles => Self::Circles,
            Self::Annotations => Self::Annotations,
            Self::Mesh => Self::Mesh,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<K: Eq + Hash, C> fmt::Debug for Layer<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grid => "Grid",
            Self::Axes => "Axes",
            Self::Circles => "Circles",
            Self::Annotations => "Annotations",
            Self::Mesh => "Mesh",
            Self::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

/// Receives the named layers. Every method defaults to doing nothing.
pub trait LayerVisitor<K: Eq + Hash, C = ()> {
    /// Grid lines.
    fn grid(&mut self, _ctx: &LayerContext<'_, K, C>) {}

    /// Axes.
    fn axes(&mut self, _ctx: &LayerContext<'_, K, C>) {}

    /// Circles.
    fn circles(&mut self, _ctx: &LayerContext<'_, K, C>) {}

    /// Annotations.
    fn annotations(&mut self, _ctx: &LayerContext<'_, K, C>) {}

    /// Interaction mesh.
    fn mesh(&mut self, _ctx: &LayerContext<'_, K, C>) {}
}

impl<K: Eq + Hash, C> BuiltSwarmPlot<K, C> {
    /// Read-only context shared by all layers.
    #[must_use]
    pub fn context(&self) -> LayerContext<'_, K, C> {
        LayerContext {
            nodes: self.layout.nodes(),
            bounds: self.layout.bounds(),
            inner_width: self.inner_width(),
            inner_height: self.inner_height(),
            orientation: self.orientation,
            value_scale: &self.value_scale,
            group_scale: &self.group_scale,
        }
    }

    /// Walk `layers` in order.
    pub fn visit_layers<V>(&self, layers: &[Layer<K, C>], visitor: &mut V)
    where
        V: LayerVisitor<K, C> + ?Sized,
    {
        let ctx = self.context();
        for layer in layers {
            match layer {
                Layer::Grid => visitor.grid(&ctx),
                Layer::Axes => visitor.axes(&ctx),
                Layer::Circles => visitor.circles(&ctx),
                Layer::Annotations => visitor.annotations(&ctx),
                Layer::Mesh => visitor.mesh(&ctx),
                Layer::Custom(f) => f(&ctx),
            }
        }
    }
}
