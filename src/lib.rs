//! # Trueno-Swarm
//!
//! Deterministic swarm plot layout built on [trueno](https://crates.io/crates/trueno).
//!
//! A swarm plot shows every data point as a circle. Values fix each circle's
//! position along the value axis; circles in the same group are then pushed
//! apart along the group axis until they no longer overlap.
//!
//! ## Features
//!
//! - **Pure function**: identical inputs produce bit-identical layouts
//! - **Bounded cost**: the resolver runs a fixed number of passes
//! - **Scale agnostic**: any [`scale::Scale`] and [`scale::GroupScale`] can drive the layout
//! - **Renderer agnostic**: output is positions plus a layer visitor
//!
//! ## Quick Start
//!
//! ```rust
//! use trueno_swarm::prelude::*;
//!
//! type Row = (&'static str, f32);
//!
//! let data: Vec<Row> = vec![("a", 3.0), ("a", 3.0), ("a", 3.2), ("b", 7.5)];
//!
//! let plot = SwarmPlot::new(Accessors::new(|d: &Row| d.1, |d: &Row| d.0))
//!     .groups(["a", "b"])
//!     .size(SizeSpec::Fixed(12.0))
//!     .dimensions(400, 300)
//!     .build(&data)?;
//!
//! for node in plot.nodes() {
//!     println!("{} at ({:.1}, {:.1}) r={}", node.id(), node.x(), node.y(), node.radius());
//! }
//! # Ok::<(), trueno_swarm::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `config`: YAML loading for [`config::LayoutConfig`] (enabled by default)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Geometric primitives (points, bounds).
pub mod geometry;

/// Value and group scales.
pub mod scale;

/// Layout configuration and YAML loading.
pub mod config;

// ============================================================================
// Layout Modules
// ============================================================================

/// Node initialization, collision resolution and the layout entry point.
pub mod layout;

/// Swarm plot builder and layer dispatch.
pub mod plots;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-swarm operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_swarm::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::config::{GroupMode, LayoutConfig, Orientation};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Bounds, Point};
    pub use crate::layout::{layout, Accessors, SizeSpec, SwarmLayout, SwarmNode};
    pub use crate::plots::{
        BuiltSwarmPlot, DomainBound, Layer, LayerContext, LayerVisitor, SwarmPlot, ValueScaleSpec,
    };
    pub use crate::scale::{BandScale, GroupBand, GroupScale, LinearScale, LogScale, Scale};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
