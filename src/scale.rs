//! Scale adapters for the two swarm axes.
//!
//! The layout engine only ever calls two mapping operations: a value scale
//! (`value -> pixel` along the primary axis) and a group scale
//! (`group key -> band` along the secondary axis). It never inspects the
//! concrete scale type.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear value scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f32, f32),
    range: (f32, f32),
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or not finite.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain(format!(
                "Linear scale domain must be finite, got {domain:?}"
            )));
        }
        if (domain.1 - domain.0).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { domain, range })
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        lerp(self.range, t)
    }

    fn domain(&self) -> (f32, f32) {
        self.domain
    }

    fn range(&self) -> (f32, f32) {
        self.range
    }
}

/// Logarithmic value scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    domain: (f32, f32),
    range: (f32, f32),
    base: f32,
}

impl LogScale {
    /// Create a base-10 logarithmic scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain contains non-positive values.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        Self::with_base(domain, range, 10.0)
    }

    /// Create a logarithmic scale with a custom base.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain contains non-positive values, the domain
    /// is empty, or the base is not a valid logarithm base.
    pub fn with_base(domain: (f32, f32), range: (f32, f32), base: f32) -> Result<Self> {
        if !is_positive(domain.0) || !is_positive(domain.1) {
            return Err(Error::ScaleDomain("Log scale domain must be positive".to_string()));
        }
        if (domain.1 - domain.0).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }
        if !is_positive(base) || (base - 1.0).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain(
                "Log scale base must be positive and not 1".to_string(),
            ));
        }

        Ok(Self { domain, range, base })
    }

    fn log(&self, value: f32) -> f32 {
        value.max(f32::MIN_POSITIVE).ln() / self.base.ln()
    }
}

impl Scale<f32, f32> for LogScale {
    fn scale(&self, value: f32) -> f32 {
        let lo = self.log(self.domain.0);
        let hi = self.log(self.domain.1);
        lerp(self.range, (self.log(value) - lo) / (hi - lo))
    }

    fn domain(&self) -> (f32, f32) {
        self.domain
    }

    fn range(&self) -> (f32, f32) {
        self.range
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn lerp((start, end): (f32, f32), t: f32) -> f32 {
    start + t * (end - start)
}

/// Pixel band allotted to one group on the secondary axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupBand {
    /// Pixel coordinate of the group's centerline.
    pub center: f32,
    /// Available half-width perpendicular to the value axis.
    pub extent: f32,
}

impl GroupBand {
    /// Create a new band.
    #[must_use]
    pub const fn new(center: f32, extent: f32) -> Self {
        Self { center, extent }
    }

    /// Lowest secondary coordinate inside the band.
    #[must_use]
    pub fn start(&self) -> f32 {
        self.center - self.extent
    }

    /// Highest secondary coordinate inside the band.
    #[must_use]
    pub fn end(&self) -> f32 {
        self.center + self.extent
    }
}

/// Maps a group key to its band on the secondary axis.
pub trait GroupScale<K> {
    /// The band for `key`, or `None` if the key is not part of the scale.
    fn band(&self, key: &K) -> Option<GroupBand>;
}

impl<K, F> GroupScale<K> for F
where
    F: Fn(&K) -> Option<GroupBand>,
{
    fn band(&self, key: &K) -> Option<GroupBand> {
        self(key)
    }
}

/// Ordinal band scale that splits a pixel span into equally sized groups.
///
/// With `n` groups over `span` pixels separated by `gap`, every band is
/// `(span - gap * (n - 1)) / n` wide and group `i` is centered at
/// `i * (band + gap) + band / 2`.
#[derive(Debug, Clone)]
pub struct BandScale<K: Eq + Hash> {
    bands: IndexMap<K, GroupBand>,
}

impl<K> BandScale<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Build a band scale over `[0, span]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `groups` is empty or contains duplicates, if `gap`
    /// is negative, or if the gaps leave no room for the bands.
    pub fn new(groups: &[K], span: f32, gap: f32) -> Result<Self> {
        if groups.is_empty() {
            return Err(Error::invalid_config("groups", "at least one group is required"));
        }
        if !gap.is_finite() || gap < 0.0 {
            return Err(Error::invalid_config("gap", format!("must be >= 0, got {gap}")));
        }

        let n = groups.len() as f32;
        let band = (span - gap * (n - 1.0)) / n;
        if !is_positive(band) {
            return Err(Error::invalid_config(
                "gap",
                format!("{} groups with gap {gap} do not fit in {span}px", groups.len()),
            ));
        }

        let mut bands = IndexMap::with_capacity(groups.len());
        for (i, key) in groups.iter().enumerate() {
            let center = i as f32 * (band + gap) + band / 2.0;
            if bands.insert(key.clone(), GroupBand::new(center, band / 2.0)).is_some() {
                return Err(Error::invalid_config("groups", format!("duplicate group {key:?}")));
            }
        }

        Ok(Self { bands })
    }

    /// Build a band scale from explicit bands, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate keys or a negative extent.
    pub fn from_bands(bands: impl IntoIterator<Item = (K, GroupBand)>) -> Result<Self> {
        let mut map = IndexMap::new();
        for (key, band) in bands {
            if !band.extent.is_finite() || band.extent < 0.0 {
                return Err(Error::invalid_config(
                    "extent",
                    format!("group {key:?} has extent {}", band.extent),
                ));
            }
            if map.contains_key(&key) {
                return Err(Error::invalid_config("groups", format!("duplicate group {key:?}")));
            }
            map.insert(key, band);
        }
        Ok(Self { bands: map })
    }

    /// Position of `key` along the group axis.
    #[must_use]
    pub fn ordinal_index(&self, key: &K) -> Option<usize> {
        self.bands.get_index_of(key)
    }

    /// Group keys in axis order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.bands.keys()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether the scale has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl<K: Eq + Hash> GroupScale<K> for BandScale<K> {
    fn band(&self, key: &K) -> Option<GroupBand> {
        self.bands.get(key).copied()
    }
}
