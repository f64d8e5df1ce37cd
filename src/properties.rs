//! Slide properties and typed accessors for the well-known OpenSlide keys.
//!
//! OpenSlide exposes metadata as string key/value pairs. Vendor-specific keys
//! are namespaced by vendor (`aperio.AppMag`, `hamamatsu.SourceLens`, ...);
//! the `openslide.*` keys are normalized across vendors and are the ones the
//! typed accessors below read.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PropertyError;

// =============================================================================
// Well-known property names
// =============================================================================

/// Background color as an RGB hex triplet, if any.
pub const PROPERTY_BACKGROUND_COLOR: &str = "openslide.background-color";

/// Height of the rectangle bounding the non-empty region, if available.
pub const PROPERTY_BOUNDS_HEIGHT: &str = "openslide.bounds-height";

/// Width of the rectangle bounding the non-empty region, if available.
pub const PROPERTY_BOUNDS_WIDTH: &str = "openslide.bounds-width";

/// X coordinate of the rectangle bounding the non-empty region, if available.
pub const PROPERTY_BOUNDS_X: &str = "openslide.bounds-x";

/// Y coordinate of the rectangle bounding the non-empty region, if available.
pub const PROPERTY_BOUNDS_Y: &str = "openslide.bounds-y";

/// Microns per pixel in the X dimension of level 0, if known.
pub const PROPERTY_MPP_X: &str = "openslide.mpp-x";

/// Microns per pixel in the Y dimension of level 0, if known.
pub const PROPERTY_MPP_Y: &str = "openslide.mpp-y";

/// Objective power of the scanner, if known.
pub const PROPERTY_OBJECTIVE_POWER: &str = "openslide.objective-power";

/// Name of the format driver that opened the slide.
pub const PROPERTY_VENDOR: &str = "openslide.vendor";

/// Free-form comment, if any.
pub const PROPERTY_COMMENT: &str = "openslide.comment";

/// Hash of the slide's pixel data and metadata.
pub const PROPERTY_QUICKHASH: &str = "openslide.quickhash-1";

// =============================================================================
// Typed values
// =============================================================================

/// Physical pixel size at level 0, in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spacing {
    /// Microns per pixel along X
    pub x: f64,

    /// Microns per pixel along Y
    pub y: f64,
}

/// Rectangle bounding the non-empty region of the slide, in level 0 pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: u64,
    pub height: u64,
}

// =============================================================================
// SlideProperties
// =============================================================================

/// All non-empty properties of a slide, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlideProperties {
    values: BTreeMap<String, String>,
}

impl SlideProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property. Empty values are skipped.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.insert(name.into(), value);
        }
    }

    /// Look up a property value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Format driver name (`openslide.vendor`).
    pub fn vendor(&self) -> Option<&str> {
        self.get(PROPERTY_VENDOR)
    }

    /// Slide comment (`openslide.comment`).
    pub fn comment(&self) -> Option<&str> {
        self.get(PROPERTY_COMMENT)
    }

    /// Quickhash (`openslide.quickhash-1`).
    pub fn quickhash(&self) -> Option<&str> {
        self.get(PROPERTY_QUICKHASH)
    }

    /// Microns per pixel at level 0.
    ///
    /// Both axes must be present and numeric.
    pub fn spacing(&self) -> Result<Spacing, PropertyError> {
        Ok(Spacing {
            x: self.parse(PROPERTY_MPP_X)?,
            y: self.parse(PROPERTY_MPP_Y)?,
        })
    }

    /// Objective power, e.g. `20` or `40`.
    pub fn objective_power(&self) -> Result<f64, PropertyError> {
        self.parse(PROPERTY_OBJECTIVE_POWER)
    }

    /// Bounding box of the non-empty region.
    pub fn bounds(&self) -> Result<Bounds, PropertyError> {
        Ok(Bounds {
            x: self.parse(PROPERTY_BOUNDS_X)?,
            y: self.parse(PROPERTY_BOUNDS_Y)?,
            width: self.parse(PROPERTY_BOUNDS_WIDTH)?,
            height: self.parse(PROPERTY_BOUNDS_HEIGHT)?,
        })
    }

    /// Background color as `[r, g, b]`.
    pub fn background_color(&self) -> Result<[u8; 3], PropertyError> {
        let value = self.require(PROPERTY_BACKGROUND_COLOR)?;
        parse_hex_color(value).ok_or_else(|| PropertyError::Parse {
            name: PROPERTY_BACKGROUND_COLOR,
            value: value.to_string(),
        })
    }

    fn require(&self, name: &'static str) -> Result<&str, PropertyError> {
        self.get(name).ok_or(PropertyError::Missing(name))
    }

    fn parse<T: FromStr>(&self, name: &'static str) -> Result<T, PropertyError> {
        let value = self.require(name)?;
        value.trim().parse().map_err(|_| PropertyError::Parse {
            name,
            value: value.to_string(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SlideProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

/// Parse an RGB hex triplet such as `FFFFFF` or `#E0E0E0`.
fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let value = value.trim().trim_start_matches('#');
    let mut rgb = [0u8; 3];
    hex::decode_to_slice(value, &mut rgb).ok()?;
    Some(rgb)
}
