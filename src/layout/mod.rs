//! Swarm layout engine.
//!
//! [`layout`] is a pure function: it turns data rows into positioned,
//! non-overlapping circles. Nothing is cached between calls.
//!
//! # Example
//!
//! ```
//! use trueno_swarm::config::LayoutConfig;
//! use trueno_swarm::layout::{layout, Accessors};
//! use trueno_swarm::scale::{BandScale, LinearScale};
//!
//! type Row = (&'static str, f32);
//!
//! let data: Vec<Row> = vec![("a", 1.0), ("a", 1.0), ("b", 4.0)];
//! let accessors = Accessors::new(|d: &Row| d.1, |d: &Row| d.0);
//! let values = LinearScale::new((0.0, 5.0), (0.0, 500.0)).unwrap();
//! let groups = BandScale::new(&["a", "b"], 200.0, 0.0).unwrap();
//!
//! let result = layout(&data, &accessors, &values, &groups, &LayoutConfig::default()).unwrap();
//! assert_eq!(result.len(), 3);
//! assert!(result.residual_overlap() < 1e-3);
//! ```

mod collision;
mod node;

pub use node::{Accessor, Accessors, SizeSpec, SwarmNode, DEFAULT_SIZE};

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::config::{GroupMode, LayoutConfig};
use crate::error::Result;
use crate::geometry::Bounds;
use crate::scale::{GroupScale, Scale};

use collision::CollisionResolver;

/// Result of a layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmLayout<K, C = ()> {
    nodes: Vec<SwarmNode<K, C>>,
    bounds: Option<Bounds>,
    residual_overlap: f32,
}

impl<K, C> SwarmLayout<K, C> {
    /// Nodes in input order.
    #[must_use]
    pub fn nodes(&self) -> &[SwarmNode<K, C>] {
        &self.nodes
    }

    /// Consume the layout, keeping only the nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<SwarmNode<K, C>> {
        self.nodes
    }

    /// Range of secondary coordinates actually used, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Largest overlap left between two colliding circles, zero when resolved.
    ///
    /// Overlap is measured against `radius_a + radius_b + spacing`.
    #[must_use]
    pub fn residual_overlap(&self) -> f32 {
        self.residual_overlap
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the layout has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Position `data` as a swarm.
///
/// # Errors
///
/// Fails before any simulation work when the configuration is out of range,
/// a value is not finite, a group is unknown to `group_scale`, or a value has
/// no position on `value_scale`.
pub fn layout<D, K, C, V, G>(
    data: &[D],
    accessors: &Accessors<D, K, C>,
    value_scale: &V,
    group_scale: &G,
    config: &LayoutConfig,
) -> Result<SwarmLayout<K, C>>
where
    K: Eq + Hash + Debug,
    V: Scale<f32, f32> + ?Sized,
    G: GroupScale<K> + ?Sized,
{
    config.validate()?;

    let mut nodes = node::initialize(data, accessors, value_scale, group_scale, config.orientation)?;
    let partitions = partition(&nodes, config.group_mode);

    let mut resolver = CollisionResolver::new(&nodes, partitions, config);
    for pass in 0..config.iterations {
        let displacement = resolver.step(&mut nodes);
        tracing::trace!(pass, displacement, "resolver pass");
    }

    let residual_overlap = resolver.residual_overlap(&nodes);
    let secondaries: Vec<f32> = nodes.iter().map(|n| n.secondary).collect();
    let bounds = Bounds::from_values(&secondaries);

    tracing::debug!(
        nodes = nodes.len(),
        partitions = resolver.partition_count(),
        candidate_checks = resolver.checks(),
        iterations = config.iterations,
        residual_overlap,
        "swarm layout complete"
    );

    Ok(SwarmLayout { nodes, bounds, residual_overlap })
}

/// Split node indices into collision partitions, in first-seen group order.
fn partition<K, C>(nodes: &[SwarmNode<K, C>], mode: GroupMode) -> Vec<Vec<usize>>
where
    K: Eq + Hash,
{
    if nodes.is_empty() {
        return Vec::new();
    }

    match mode {
        GroupMode::Unified => vec![(0..nodes.len()).collect()],
        GroupMode::Grouped => {
            let mut groups: IndexMap<&K, Vec<usize>> = IndexMap::new();
            for (i, node) in nodes.iter().enumerate() {
                groups.entry(&node.group).or_default().push(i);
            }
            groups.into_values().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Orientation;
    use crate::error::Error;
    use crate::scale::{BandScale, GroupBand, LinearScale};
    use approx::assert_abs_diff_eq;

    type Row = (&'static str, f32);

    fn accessors() -> Accessors<Row, &'static str> {
        Accessors::new(|d: &Row| d.1, |d: &Row| d.0).size(SizeSpec::Fixed(20.0))
    }

    fn identity() -> LinearScale {
        LinearScale::new((0.0, 1000.0), (0.0, 1000.0)).unwrap()
    }

    fn single_band(_: &&'static str) -> Option<GroupBand> {
        Some(GroupBand::new(100.0, 50.0))
    }

    fn min_distance(nodes: &[SwarmNode<&'static str>]) -> f32 {
        let mut min = f32::INFINITY;
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                if a.group() == b.group() {
                    min = min.min(a.position().distance(b.position()));
                }
            }
        }
        min
    }

    #[test]
    fn test_three_node_scenario() {
        let data = vec![("g", 10.0), ("g", 10.0), ("g", 10.0)];
        let config = LayoutConfig::new().spacing(2.0);

        let result = layout(&data, &accessors(), &identity(), &single_band, &config).unwrap();

        let s: Vec<f32> = result.nodes().iter().map(SwarmNode::secondary).collect();
        assert_abs_diff_eq!(s[0], 78.0, epsilon = 1e-3);
        assert_abs_diff_eq!(s[1], 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(s[2], 122.0, epsilon = 1e-3);

        let bounds = result.bounds().unwrap();
        assert_abs_diff_eq!(bounds.min, 78.0, epsilon = 1e-3);
        assert_abs_diff_eq!(bounds.max, 122.0, epsilon = 1e-3);
        assert!(result.residual_overlap() < 1e-3);
    }

    #[test]
    fn test_zero_iterations_rests_on_center() {
        let data = vec![("g", 10.0), ("g", 10.0), ("g", 11.0)];
        let config = LayoutConfig::new().iterations(0);

        let result = layout(&data, &accessors(), &identity(), &single_band, &config).unwrap();

        for node in result.nodes() {
            assert_eq!(node.secondary(), 100.0);
        }
        assert!(result.residual_overlap() > 0.0);
    }

    #[test]
    fn test_empty_data() {
        let data: Vec<Row> = Vec::new();
        let result = layout(&data, &accessors(), &identity(), &single_band, &LayoutConfig::default()).unwrap();

        assert!(result.is_empty());
        assert!(result.bounds().is_none());
        assert_eq!(result.residual_overlap(), 0.0);
    }

    #[test]
    fn test_output_keeps_input_order() {
        let data = vec![("g", 30.0), ("g", 10.0), ("g", 20.0), ("g", 10.0)];
        let result = layout(&data, &accessors(), &identity(), &single_band, &LayoutConfig::default()).unwrap();

        let indices: Vec<usize> = result.nodes().iter().map(SwarmNode::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        let values: Vec<f32> = result.nodes().iter().map(SwarmNode::value).collect();
        assert_eq!(values, vec![30.0, 10.0, 20.0, 10.0]);
        for (node, row) in result.nodes().iter().zip(&data) {
            assert_eq!(node.primary(), row.1);
        }
    }

    #[test]
    fn test_groups_do_not_collide_when_grouped() {
        let bands = BandScale::from_bands([
            ("a", GroupBand::new(100.0, 50.0)),
            ("b", GroupBand::new(100.0, 50.0)),
        ])
        .unwrap();
        let data = vec![("a", 10.0), ("b", 10.0)];

        let grouped = layout(&data, &accessors(), &identity(), &bands, &LayoutConfig::default()).unwrap();
        assert!(grouped.nodes().iter().all(|n| n.secondary() == 100.0));

        let unified = LayoutConfig::new().group_mode(GroupMode::Unified);
        let result = layout(&data, &accessors(), &identity(), &bands, &unified).unwrap();
        let gap = (result.nodes()[1].secondary() - result.nodes()[0].secondary()).abs();
        assert_abs_diff_eq!(gap, 22.0, epsilon = 1e-3);
    }

    #[test]
    fn test_horizontal_orientation_maps_secondary_to_y() {
        let data = vec![("g", 10.0)];
        let config = LayoutConfig::new().orientation(Orientation::Horizontal);
        let result = layout(&data, &accessors(), &identity(), &single_band, &config).unwrap();

        let node = &result.nodes()[0];
        assert_eq!(node.x(), 10.0);
        assert_eq!(node.y(), 100.0);

        let config = LayoutConfig::new().orientation(Orientation::Vertical);
        let result = layout(&data, &accessors(), &identity(), &single_band, &config).unwrap();
        let node = &result.nodes()[0];
        assert_eq!(node.x(), 100.0);
        assert_eq!(node.y(), 10.0);
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let data = vec![("missing", f32::NAN)];
        let config = LayoutConfig::new().spacing(-1.0);

        let err = layout(&data, &accessors(), &identity(), &single_band, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { key: "spacing", .. }));
    }

    #[test]
    fn test_unknown_group_is_reported() {
        let bands = BandScale::new(&["a"], 100.0, 0.0).unwrap();
        let data = vec![("a", 1.0), ("z", 2.0)];

        let err = layout(&data, &accessors(), &identity(), &bands, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownGroup(ref g) if g.contains('z')));
    }

    #[test]
    fn test_minimum_distance_never_shrinks() {
        let data: Vec<Row> = (0..25).map(|i| ("g", (i % 5) as f32 * 3.0)).collect();
        let band = |_: &&'static str| Some(GroupBand::new(0.0, 500.0));
        let mut last = 0.0_f32;

        for iterations in 0..40 {
            let config = LayoutConfig::new().iterations(iterations).force_strength(0.5);
            let result = layout(&data, &accessors(), &identity(), &band, &config).unwrap();
            let current = min_distance(result.nodes());
            assert!(current + 1e-3 >= last, "pass {iterations}: {current} < {last}");
            last = current;
        }
    }

    #[test]
    fn test_partition_first_seen_order() {
        let data = vec![("b", 1.0), ("a", 2.0), ("b", 3.0)];
        let band = |_: &&'static str| Some(GroupBand::new(0.0, 10.0));
        let nodes = node::initialize(&data, &accessors(), &identity(), &band, Orientation::Vertical).unwrap();

        assert_eq!(partition(&nodes, GroupMode::Grouped), vec![vec![0, 2], vec![1]]);
        assert_eq!(partition(&nodes, GroupMode::Unified), vec![vec![0, 1, 2]]);
        assert!(partition::<&str, ()>(&[], GroupMode::Unified).is_empty());
    }
}
