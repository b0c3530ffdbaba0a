//! Collision resolution along the secondary axis.
//!
//! Each pass orders a partition by `(secondary, rank)` and treats every
//! overlapping pair as a constraint `secondary_b - secondary_a >= gap`, where
//! `gap` is the secondary separation that restores a center distance of
//! `radius_a + radius_b + spacing` given the fixed primary offset.
//!
//! A forward sweep satisfies all constraints by only pushing later nodes up,
//! a backward sweep by only pushing earlier nodes down. Both results are
//! feasible, so their average is too; an isolated pair moves by half the
//! overlap in each direction. Nodes move `force_strength` of the way to that
//! target, then the whole partition is nudged toward its centers and clamped
//! into its bands.
//!
//! Candidates are looked up per pass. Nodes are bucketed once into primary
//! cells `2 * max_radius + spacing` wide, so a colliding pair always shares a
//! cell or sits in adjacent ones. Within a cell the already swept nodes are
//! kept ordered by their swept position, and a lookup stops as soon as no
//! remaining node can reach the current target.

use std::collections::BTreeSet;

use crate::config::LayoutConfig;
use crate::layout::node::SwarmNode;

/// Fraction of a partition's mean offset from its centers removed per pass.
pub(crate) const CENTERING_PULL: f32 = 0.1;

/// A collision partition, bucketed along the primary axis.
#[derive(Debug)]
struct Partition {
    members: Vec<usize>,
    /// Node indices per cell, cells in ascending primary order.
    cells: Vec<Vec<usize>>,
    max_radius: f32,
}

impl Partition {
    fn new<K, C>(
        nodes: &[SwarmNode<K, C>],
        members: Vec<usize>,
        spacing: f32,
        cell: &mut [usize],
    ) -> Self {
        let max_radius = members.iter().map(|&i| nodes[i].radius).fold(0.0_f32, f32::max);
        let width = 2.0 * max_radius + spacing;

        let mut by_primary = members.clone();
        by_primary.sort_by(|&a, &b| nodes[a].primary.total_cmp(&nodes[b].primary).then(a.cmp(&b)));

        let mut cells: Vec<Vec<usize>> = Vec::new();
        let mut start = 0.0_f32;
        for i in by_primary {
            let primary = nodes[i].primary;
            if cells.is_empty() || primary - start >= width {
                start = primary;
                cells.push(Vec::new());
            }
            if let Some(last) = cells.last_mut() {
                last.push(i);
            }
            cell[i] = cells.len() - 1;
        }

        Self { members, cells, max_radius }
    }

    /// Cells a node in `cell` can collide with.
    fn around(&self, cell: usize) -> std::ops::RangeInclusive<usize> {
        cell.saturating_sub(1)..=(cell + 1).min(self.cells.len().saturating_sub(1))
    }
}

/// Iterative resolver over a fixed set of partitions.
#[derive(Debug)]
pub(crate) struct CollisionResolver {
    force_strength: f32,
    spacing: f32,
    bounded: bool,
    partitions: Vec<Partition>,
    cell: Vec<usize>,
    order: Vec<usize>,
    forward: Vec<f32>,
    backward: Vec<f32>,
    /// Swept nodes per cell, keyed by swept position.
    swept: Vec<BTreeSet<(u32, usize)>>,
    checks: usize,
}

impl CollisionResolver {
    pub(crate) fn new<K, C>(
        nodes: &[SwarmNode<K, C>],
        partitions: Vec<Vec<usize>>,
        config: &LayoutConfig,
    ) -> Self {
        let n = nodes.len();
        let mut cell = vec![0; n];
        let partitions: Vec<Partition> = partitions
            .into_iter()
            .map(|members| Partition::new(nodes, members, config.spacing, &mut cell))
            .collect();
        let widest = partitions.iter().map(|p| p.cells.len()).max().unwrap_or(0);

        Self {
            force_strength: config.force_strength,
            spacing: config.spacing,
            bounded: config.bounded,
            partitions,
            cell,
            order: Vec::new(),
            forward: vec![0.0; n],
            backward: vec![0.0; n],
            swept: vec![BTreeSet::new(); widest],
            checks: 0,
        }
    }

    pub(crate) fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Candidate nodes inspected by all passes so far.
    pub(crate) fn checks(&self) -> usize {
        self.checks
    }

    /// Run one pass over every partition. Returns the total repulsion applied.
    pub(crate) fn step<K, C>(&mut self, nodes: &mut [SwarmNode<K, C>]) -> f32 {
        let mut total = 0.0;
        for p in 0..self.partitions.len() {
            total += self.step_partition(p, nodes);
        }
        total
    }

    fn step_partition<K, C>(&mut self, p: usize, nodes: &mut [SwarmNode<K, C>]) -> f32 {
        let (force_strength, bounded) = (self.force_strength, self.bounded);
        let spacing = self.spacing;
        let Self { partitions, cell, order, forward, backward, swept, checks, .. } = self;
        let partition = &partitions[p];
        if partition.members.is_empty() {
            return 0.0;
        }
        let cells = partition.cells.len();

        order.clear();
        order.extend_from_slice(&partition.members);
        order.sort_by(|&a, &b| {
            nodes[a].secondary.total_cmp(&nodes[b].secondary).then(nodes[a].rank.cmp(&nodes[b].rank))
        });

        for &i in order.iter() {
            let reach = nodes[i].radius + partition.max_radius + spacing;
            let mut target = nodes[i].secondary;
            for k in partition.around(cell[i]) {
                for &(_, j) in swept[k].iter().rev() {
                    *checks += 1;
                    if forward[j] + reach <= target {
                        break;
                    }
                    if let Some(gap) = required_gap(&nodes[i], &nodes[j], spacing) {
                        target = target.max(forward[j] + gap);
                    }
                }
            }
            forward[i] = target;
            swept[cell[i]].insert((sort_key(target), i));
        }
        swept[..cells].iter_mut().for_each(BTreeSet::clear);

        for &i in order.iter().rev() {
            let reach = nodes[i].radius + partition.max_radius + spacing;
            let mut target = nodes[i].secondary;
            for k in partition.around(cell[i]) {
                for &(_, j) in swept[k].iter() {
                    *checks += 1;
                    if backward[j] - reach >= target {
                        break;
                    }
                    if let Some(gap) = required_gap(&nodes[i], &nodes[j], spacing) {
                        target = target.min(backward[j] - gap);
                    }
                }
            }
            backward[i] = target;
            swept[cell[i]].insert((sort_key(target), i));
        }
        swept[..cells].iter_mut().for_each(BTreeSet::clear);

        let mut repulsion = 0.0_f32;
        let mut offset = 0.0_f32;
        for &i in order.iter() {
            let node = &mut nodes[i];
            let shift = ((forward[i] + backward[i]) / 2.0 - node.secondary) * force_strength;
            node.secondary += shift;
            repulsion += shift.abs();
            offset += node.band.center - node.secondary;
        }

        // rigid translation: distances inside the partition are untouched
        let count = order.len() as f32;
        let cap = repulsion / count;
        let pull = (offset / count * CENTERING_PULL).clamp(-cap, cap);
        for &i in order.iter() {
            let node = &mut nodes[i];
            node.secondary += pull;
            if bounded {
                node.secondary = reflect_into(node.secondary, node.band.start(), node.band.end());
            }
        }

        repulsion
    }

    /// Largest remaining overlap between two colliding nodes, or zero.
    pub(crate) fn residual_overlap<K, C>(&self, nodes: &[SwarmNode<K, C>]) -> f32 {
        let mut worst = 0.0_f32;
        for partition in &self.partitions {
            let window = 2.0 * partition.max_radius + self.spacing;
            let columns: Vec<Vec<usize>> = partition
                .cells
                .iter()
                .map(|members| {
                    let mut sorted = members.clone();
                    sorted.sort_by(|&a, &b| nodes[a].secondary.total_cmp(&nodes[b].secondary));
                    sorted
                })
                .collect();

            for (k, column) in columns.iter().enumerate() {
                for (m, &a) in column.iter().enumerate() {
                    let secondary = nodes[a].secondary;
                    let within = |&&b: &&usize| nodes[b].secondary - secondary < window;
                    let next = columns.get(k + 1).map_or(&[][..], |next| {
                        let from =
                            next.partition_point(|&b| nodes[b].secondary <= secondary - window);
                        &next[from..]
                    });
                    let same = column[m + 1..].iter().take_while(within);
                    for &b in same.chain(next.iter().take_while(within)) {
                        worst = worst.max(overlap(&nodes[a], &nodes[b], self.spacing));
                    }
                }
            }
        }
        worst
    }
}

/// Secondary separation two nodes need, or `None` if their primary offset
/// already keeps them apart.
fn required_gap<K, C>(a: &SwarmNode<K, C>, b: &SwarmNode<K, C>, spacing: f32) -> Option<f32> {
    let reach = a.radius + b.radius + spacing;
    let dp = (b.primary - a.primary).abs();
    (dp < reach).then(|| (reach * reach - dp * dp).sqrt())
}

fn overlap<K, C>(a: &SwarmNode<K, C>, b: &SwarmNode<K, C>, spacing: f32) -> f32 {
    let reach = a.radius + b.radius + spacing;
    reach - (b.secondary - a.secondary).hypot(b.primary - a.primary)
}

/// Map an `f32` to a `u32` with the same `total_cmp` order.
fn sort_key(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & 0x8000_0000 == 0 {
        bits | 0x8000_0000
    } else {
        !bits
    }
}
/// Fold `value` back into `[lo, hi]` by mirroring the overflow at the edge.
fn reflect_into(value: f32, lo: f32, hi: f32) -> f32 {
    let mirrored = if value > hi {
        hi - (value - hi)
    } else if value < lo {
        lo + (lo - value)
    } else {
        value
    };
    mirrored.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Orientation;
    use crate::scale::GroupBand;
    use approx::assert_abs_diff_eq;

    fn node(index: usize, primary: f32, radius: f32, band: GroupBand) -> SwarmNode<u8> {
        SwarmNode {
            id: index.to_string(),
            index,
            group: 0,
            value: primary,
            radius,
            primary,
            secondary: band.center,
            color: (),
            band,
            rank: index,
            orientation: Orientation::Horizontal,
        }
    }

    fn cluster(count: usize, radius: f32, band: GroupBand) -> Vec<SwarmNode<u8>> {
        (0..count).map(|i| node(i, 0.0, radius, band)).collect()
    }

    fn run(nodes: &mut [SwarmNode<u8>], config: &LayoutConfig) -> CollisionResolver {
        let partition = (0..nodes.len()).collect();
        let mut resolver = CollisionResolver::new(nodes, vec![partition], config);
        for _ in 0..config.iterations {
            resolver.step(nodes);
        }
        resolver
    }

    fn secondaries(nodes: &[SwarmNode<u8>]) -> Vec<f32> {
        nodes.iter().map(|n| n.secondary).collect()
    }

    #[test]
    fn test_three_coincident_nodes_spread_symmetrically() {
        let mut nodes = cluster(3, 10.0, GroupBand::new(100.0, 50.0));
        let config = LayoutConfig::new().spacing(2.0).iterations(1);
        run(&mut nodes, &config);

        let s = secondaries(&nodes);
        assert_abs_diff_eq!(s[0], 78.0, epsilon = 1e-4);
        assert_abs_diff_eq!(s[1], 100.0, epsilon = 1e-4);
        assert_abs_diff_eq!(s[2], 122.0, epsilon = 1e-4);
    }

    #[test]
    fn test_resolved_layout_is_stable() {
        let mut nodes = cluster(3, 10.0, GroupBand::new(100.0, 50.0));
        let config = LayoutConfig::new().spacing(2.0).iterations(1);
        let mut resolver = run(&mut nodes, &config);
        let settled = secondaries(&nodes);

        for _ in 0..50 {
            resolver.step(&mut nodes);
        }
        assert_eq!(secondaries(&nodes), settled);
        assert!(resolver.residual_overlap(&nodes) <= 0.0);
    }

    #[test]
    fn test_force_strength_damps_each_pass() {
        let band = GroupBand::new(0.0, 100.0);
        let mut nodes = cluster(2, 5.0, band);
        let config = LayoutConfig::new().spacing(0.0).force_strength(0.5).iterations(1);
        run(&mut nodes, &config);

        // full resolution would be -5 / +5
        let s = secondaries(&nodes);
        assert_abs_diff_eq!(s[0], -2.5, epsilon = 1e-5);
        assert_abs_diff_eq!(s[1], 2.5, epsilon = 1e-5);
    }

    #[test]
    fn test_distant_primaries_do_not_collide() {
        let band = GroupBand::new(50.0, 50.0);
        let mut nodes = vec![node(0, 0.0, 5.0, band), node(1, 30.0, 5.0, band)];
        let config = LayoutConfig::new().spacing(2.0).iterations(10);
        let resolver = run(&mut nodes, &config);

        assert_eq!(secondaries(&nodes), vec![50.0, 50.0]);
        assert_eq!(resolver.partitions[0].cells, vec![vec![0], vec![1]]);
        assert_eq!(resolver.residual_overlap(&nodes), 0.0);
    }

    #[test]
    fn test_collisions_across_adjacent_cells() {
        // cells are 12px wide: primaries 0 and 11 start cells 0 and 1
        let band = GroupBand::new(0.0, 100.0);
        let mut nodes =
            vec![node(0, 0.0, 5.0, band), node(1, 11.0, 5.0, band), node(2, 13.0, 5.0, band)];
        let config = LayoutConfig::new().spacing(2.0).iterations(1);
        let partition = (0..nodes.len()).collect();
        let mut resolver = CollisionResolver::new(&nodes, vec![partition], &config);
        assert_eq!(resolver.partitions[0].cells, vec![vec![0, 1], vec![2]]);
        assert!(resolver.residual_overlap(&nodes) > 0.0);

        resolver.step(&mut nodes);
        assert!(resolver.residual_overlap(&nodes) < 1e-4);
        // 1 and 2 sit in different cells and still separate
        let distance = (nodes[2].secondary - nodes[1].secondary).hypot(2.0);
        assert!(distance >= 12.0 - 1e-4, "distance {distance}");
    }

    #[test]
    fn test_same_value_work_stays_linear() {
        let n = 10_000;
        let passes = 5;
        let mut nodes = cluster(n, 3.0, GroupBand::new(0.0, 1.0e6));
        let config = LayoutConfig::new().spacing(2.0).iterations(passes);
        let resolver = run(&mut nodes, &config);

        assert!(resolver.checks() <= 6 * n * passes, "checks {}", resolver.checks());
        // coordinates reach 4e4, where f32 steps are a few thousandths
        assert!(resolver.residual_overlap(&nodes) < 0.05);
    }

    #[test]
    fn test_partial_primary_overlap_uses_secondary_gap() {
        // centers 6 apart on the primary axis, must end 10 apart: gap = 8
        let band = GroupBand::new(0.0, 100.0);
        let mut nodes = vec![node(0, 0.0, 5.0, band), node(1, 6.0, 5.0, band)];
        let config = LayoutConfig::new().spacing(0.0).iterations(1);
        run(&mut nodes, &config);

        let s = secondaries(&nodes);
        assert_abs_diff_eq!(s[1] - s[0], 8.0, epsilon = 1e-4);
        let distance = (s[1] - s[0]).hypot(6.0);
        assert_abs_diff_eq!(distance, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rank_breaks_ties() {
        let band = GroupBand::new(0.0, 100.0);
        let mut nodes = cluster(2, 5.0, band);
        nodes[0].rank = 1;
        nodes[1].rank = 0;
        let config = LayoutConfig::new().spacing(0.0).iterations(1);
        run(&mut nodes, &config);

        assert!(nodes[1].secondary < nodes[0].secondary);
    }

    #[test]
    fn test_bounded_band_keeps_nodes_inside() {
        let band = GroupBand::new(0.0, 10.0);
        let mut nodes = cluster(8, 5.0, band);
        let config = LayoutConfig::new().spacing(2.0).iterations(20);
        let resolver = run(&mut nodes, &config);

        for n in &nodes {
            assert!(n.secondary >= -10.0 && n.secondary <= 10.0, "escaped: {}", n.secondary);
        }
        // 8 circles of 12px do not fit in 20px
        assert!(resolver.residual_overlap(&nodes) > 0.0);
    }

    #[test]
    fn test_unbounded_band_lets_nodes_spread() {
        let band = GroupBand::new(0.0, 10.0);
        let mut nodes = cluster(8, 5.0, band);
        let config = LayoutConfig::new().spacing(2.0).iterations(20).bounded(false);
        let resolver = run(&mut nodes, &config);

        assert!(nodes.iter().any(|n| n.secondary.abs() > 10.0));
        assert!(resolver.residual_overlap(&nodes) < 1e-3);
    }

    #[test]
    fn test_reflect_into() {
        assert_abs_diff_eq!(reflect_into(12.0, 0.0, 10.0), 8.0);
        assert_abs_diff_eq!(reflect_into(-3.0, 0.0, 10.0), 3.0);
        assert_abs_diff_eq!(reflect_into(5.0, 0.0, 10.0), 5.0);
        // overflow larger than the band collapses onto the edge
        assert_abs_diff_eq!(reflect_into(35.0, 0.0, 10.0), 0.0);
        assert_abs_diff_eq!(reflect_into(7.0, 4.0, 4.0), 4.0);
    }
}
