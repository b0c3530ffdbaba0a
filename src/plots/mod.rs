//! Swarm plot types.
//!
//! Provides the chart builder on top of the layout engine and the layer
//! dispatch used by renderers.

mod layers;
mod swarm;

pub use layers::{CustomLayer, Layer, LayerContext, LayerVisitor};
pub use swarm::{BuiltSwarmPlot, DomainBound, ScaleKind, SwarmPlot, ValueScale, ValueScaleSpec};
