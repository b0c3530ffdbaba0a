//! Swarm nodes and their initialization from raw data.

use std::fmt;
use std::fmt::Debug;

use crate::config::Orientation;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::scale::{GroupBand, GroupScale, Scale};

/// Boxed accessor reading one field out of a datum.
pub type Accessor<D, T> = Box<dyn Fn(&D) -> T + Send + Sync>;

type IdAccessor<D> = Box<dyn Fn(usize, &D) -> String + Send + Sync>;

/// Default circle diameter, in pixels.
pub const DEFAULT_SIZE: f32 = 6.0;

/// How the diameter of each circle is derived.
pub enum SizeSpec<D> {
    /// Every circle has the same diameter.
    Fixed(f32),
    /// Linear mapping of a datum field onto a diameter range.
    Scaled {
        /// Reads the field that drives the size.
        accessor: Accessor<D, f32>,
        /// Field domain `(min, max)`.
        values: (f32, f32),
        /// Diameter range `(min, max)`.
        sizes: (f32, f32),
    },
    /// Arbitrary per-datum diameter.
    Custom(Accessor<D, f32>),
}

impl<D> SizeSpec<D> {
    /// Diameter for `datum`, before clamping.
    pub fn size_of(&self, datum: &D) -> f32 {
        match self {
            Self::Fixed(size) => *size,
            Self::Scaled { accessor, values, sizes } => {
                let span = values.1 - values.0;
                let t = if span.abs() < f32::EPSILON { 0.0 } else { (accessor(datum) - values.0) / span };
                sizes.0 + t * (sizes.1 - sizes.0)
            }
            Self::Custom(accessor) => accessor(datum),
        }
    }
}

impl<D> Default for SizeSpec<D> {
    fn default() -> Self {
        Self::Fixed(DEFAULT_SIZE)
    }
}

impl<D> Debug for SizeSpec<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Scaled { values, sizes, .. } => f
                .debug_struct("Scaled")
                .field("values", values)
                .field("sizes", sizes)
                .finish_non_exhaustive(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Caller functions that read the fields the layout needs from each datum.
pub struct Accessors<D, K, C = ()> {
    value: Accessor<D, f32>,
    group: Accessor<D, K>,
    id: Option<IdAccessor<D>>,
    size: SizeSpec<D>,
    color: Accessor<D, C>,
}

impl<D: 'static, K: 'static> Accessors<D, K, ()> {
    /// Accessors with the default size and no color.
    pub fn new(
        value: impl Fn(&D) -> f32 + Send + Sync + 'static,
        group: impl Fn(&D) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: Box::new(value),
            group: Box::new(group),
            id: None,
            size: SizeSpec::default(),
            color: Box::new(|_: &D| ()),
        }
    }
}

impl<D, K, C> Accessors<D, K, C> {
    /// Set the id accessor. Ids default to the input index.
    #[must_use]
    pub fn id(mut self, id: impl Fn(usize, &D) -> String + Send + Sync + 'static) -> Self {
        self.id = Some(Box::new(id));
        self
    }

    /// Set how circle diameters are derived.
    #[must_use]
    pub fn size(mut self, size: SizeSpec<D>) -> Self {
        self.size = size;
        self
    }

    /// Set the color accessor. Colors are stored on nodes, never interpreted.
    #[must_use]
    pub fn color<C2>(self, color: impl Fn(&D) -> C2 + Send + Sync + 'static) -> Accessors<D, K, C2> {
        Accessors {
            value: self.value,
            group: self.group,
            id: self.id,
            size: self.size,
            color: Box::new(color),
        }
    }

    /// The size specification in use.
    pub fn size_spec(&self) -> &SizeSpec<D> {
        &self.size
    }

    pub(crate) fn value_of(&self, datum: &D) -> f32 {
        (self.value)(datum)
    }

    pub(crate) fn group_of(&self, datum: &D) -> K {
        (self.group)(datum)
    }

    fn id_of(&self, index: usize, datum: &D) -> String {
        self.id.as_ref().map_or_else(|| index.to_string(), |id| id(index, datum))
    }
}

impl<D, K, C> Debug for Accessors<D, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessors")
            .field("size", &self.size)
            .field("custom_id", &self.id.is_some())
            .finish_non_exhaustive()
    }
}

/// One positioned circle.
///
/// `primary` is fixed once the node is created; the collision resolver only
/// moves `secondary`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmNode<K, C = ()> {
    pub(crate) id: String,
    pub(crate) index: usize,
    pub(crate) group: K,
    pub(crate) value: f32,
    pub(crate) radius: f32,
    pub(crate) primary: f32,
    pub(crate) secondary: f32,
    pub(crate) color: C,
    pub(crate) band: GroupBand,
    pub(crate) rank: usize,
    pub(crate) orientation: Orientation,
}

impl<K, C> SwarmNode<K, C> {
    /// Node identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Position of the source datum in the input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Group key.
    pub fn group(&self) -> &K {
        &self.group
    }

    /// Raw value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Circle radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Circle diameter.
    pub fn size(&self) -> f32 {
        self.radius * 2.0
    }

    /// Coordinate along the value axis.
    pub fn primary(&self) -> f32 {
        self.primary
    }

    /// Coordinate along the group axis.
    pub fn secondary(&self) -> f32 {
        self.secondary
    }

    /// Color resolved by the caller.
    pub fn color(&self) -> &C {
        &self.color
    }

    /// Band of the node's group.
    pub fn band(&self) -> GroupBand {
        self.band
    }

    /// Position in the value-then-input order.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Screen x coordinate.
    pub fn x(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.primary,
            Orientation::Vertical => self.secondary,
        }
    }

    /// Screen y coordinate.
    pub fn y(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.secondary,
            Orientation::Vertical => self.primary,
        }
    }

    /// Screen position of the circle center.
    pub fn position(&self) -> Point {
        Point::new(self.x(), self.y())
    }
}

/// Build nodes in input order with `secondary` resting on the group center.
pub(crate) fn initialize<D, K, C, V, G>(
    data: &[D],
    accessors: &Accessors<D, K, C>,
    value_scale: &V,
    group_scale: &G,
    orientation: Orientation,
) -> Result<Vec<SwarmNode<K, C>>>
where
    K: Debug,
    V: Scale<f32, f32> + ?Sized,
    G: GroupScale<K> + ?Sized,
{
    let mut nodes = Vec::with_capacity(data.len());

    for (index, datum) in data.iter().enumerate() {
        let value = accessors.value_of(datum);
        if !value.is_finite() {
            return Err(Error::InvalidValue { index, value });
        }

        let group = accessors.group_of(datum);
        let band = group_scale.band(&group).ok_or_else(|| Error::UnknownGroup(format!("{group:?}")))?;
        if !band.center.is_finite() || !band.extent.is_finite() || band.extent < 0.0 {
            return Err(Error::invalid_config(
                "extent",
                format!("group {group:?} has band {band:?}"),
            ));
        }

        let primary = value_scale.scale(value);
        if !primary.is_finite() {
            return Err(Error::ScaleDomain(format!(
                "value {value} at row {index} has no position on the value axis"
            )));
        }

        let size = accessors.size.size_of(datum);
        let radius = if size.is_finite() && size >= 0.0 {
            size / 2.0
        } else {
            tracing::warn!(index, size, "invalid circle size, clamping to zero");
            0.0
        };

        nodes.push(SwarmNode {
            id: accessors.id_of(index, datum),
            index,
            group,
            value,
            radius,
            primary,
            secondary: band.center,
            color: (accessors.color)(datum),
            band,
            rank: 0,
            orientation,
        });
    }

    assign_ranks(&mut nodes);
    Ok(nodes)
}

/// Rank nodes by value, breaking ties by input index.
fn assign_ranks<K, C>(nodes: &mut [SwarmNode<K, C>]) {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| nodes[a].value.total_cmp(&nodes[b].value).then(a.cmp(&b)));

    for (rank, index) in order.into_iter().enumerate() {
        nodes[index].rank = rank;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::LinearScale;

    struct Row {
        group: &'static str,
        value: f32,
        weight: f32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { group: "b", value: 3.0, weight: 1.0 },
            Row { group: "a", value: 1.0, weight: -4.0 },
            Row { group: "b", value: 1.0, weight: 10.0 },
        ]
    }

    fn bands(key: &&'static str) -> Option<GroupBand> {
        match *key {
            "a" => Some(GroupBand::new(50.0, 50.0)),
            "b" => Some(GroupBand::new(150.0, 50.0)),
            _ => None,
        }
    }

    fn value_scale() -> LinearScale {
        LinearScale::new((0.0, 10.0), (0.0, 100.0)).unwrap()
    }

    #[test]
    fn test_initialize_sets_primary_and_center() {
        let accessors = Accessors::new(|r: &Row| r.value, |r: &Row| r.group);
        let nodes =
            initialize(&rows(), &accessors, &value_scale(), &bands, Orientation::Horizontal)
                .unwrap();

        assert_eq!(nodes.len(), 3);
        assert!((nodes[0].primary() - 30.0).abs() < 1e-4);
        assert!((nodes[0].secondary() - 150.0).abs() < f32::EPSILON);
        assert!((nodes[1].secondary() - 50.0).abs() < f32::EPSILON);
        assert!((nodes[0].radius() - DEFAULT_SIZE / 2.0).abs() < f32::EPSILON);
        assert_eq!(nodes[2].id(), "2");
        assert!((nodes[0].x() - nodes[0].primary()).abs() < f32::EPSILON);
        assert!((nodes[0].y() - nodes[0].secondary()).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ranks_break_ties_by_index() {
        let accessors = Accessors::new(|r: &Row| r.value, |r: &Row| r.group);
        let nodes =
            initialize(&rows(), &accessors, &value_scale(), &bands, Orientation::Vertical).unwrap();

        // values 3, 1, 1 -> rows 1 and 2 tie, row 1 first
        let ranks: Vec<_> = nodes.iter().map(SwarmNode::rank).collect();
        assert_eq!(ranks, vec![2, 0, 1]);
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let accessors = Accessors::new(|r: &Row| r.value, |r: &Row| r.group)
            .size(SizeSpec::Custom(Box::new(|r: &Row| r.weight)));
        let nodes =
            initialize(&rows(), &accessors, &value_scale(), &bands, Orientation::Vertical).unwrap();

        assert!((nodes[0].radius() - 0.5).abs() < f32::EPSILON);
        assert!(nodes[1].radius().abs() < f32::EPSILON);
        assert!((nodes[2].radius() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scaled_size() {
        let spec = SizeSpec::Scaled {
            accessor: Box::new(|r: &Row| r.weight),
            values: (0.0, 10.0),
            sizes: (4.0, 24.0),
        };

        let sizes: Vec<f32> = rows().iter().map(|r| spec.size_of(r)).collect();
        assert!((sizes[0] - 6.0).abs() < 1e-5);
        assert!((sizes[2] - 24.0).abs() < 1e-5);
        assert!(format!("{spec:?}").starts_with("Scaled"));
    }

    #[test]
    fn test_unknown_group_is_rejected() {
        let accessors = Accessors::new(|r: &Row| r.value, |_: &Row| "zzz");
        let result =
            initialize(&rows(), &accessors, &value_scale(), &bands, Orientation::Vertical);

        assert!(matches!(result, Err(Error::UnknownGroup(key)) if key.contains("zzz")));
    }

    #[test]
    fn test_non_finite_value_is_rejected() {
        let accessors = Accessors::new(|_: &Row| f32::NAN, |r: &Row| r.group);
        let result =
            initialize(&rows(), &accessors, &value_scale(), &bands, Orientation::Vertical);

        assert!(matches!(result, Err(Error::InvalidValue { index: 0, .. })));
    }

    #[test]
    fn test_custom_id_and_color() {
        let accessors = Accessors::new(|r: &Row| r.value, |r: &Row| r.group)
            .id(|i, r: &Row| format!("{}-{i}", r.group))
            .color(|r: &Row| r.group.len());
        let nodes =
            initialize(&rows(), &accessors, &value_scale(), &bands, Orientation::Vertical).unwrap();

        assert_eq!(nodes[1].id(), "a-1");
        assert_eq!(*nodes[1].color(), 1);
    }
}
