//! Geometric primitives shared by the layout and its consumers.

use trueno::Vector;

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Closed interval `[min, max]` along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest coordinate.
    pub min: f32,
    /// Largest coordinate.
    pub max: f32,
}

impl Bounds {
    /// Create bounds, ordering the endpoints.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Tightest bounds around `values`, or `None` when there are none.
    ///
    /// Uses trueno's SIMD reductions.
    #[must_use]
    pub fn from_values(values: &[f32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let vec = Vector::from_vec(values.to_vec());
        let min = vec.min().ok()?;
        let max = vec.max().ok()?;
        Some(Self { min, max })
    }

    /// Length of the interval.
    #[must_use]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Midpoint of the interval.
    #[must_use]
    pub fn center(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    /// Whether `value` lies inside the interval.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}
