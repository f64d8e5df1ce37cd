//! Serializable summary of a slide.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::handle::SlideHandle;
use super::reader::{LevelInfo, Slide};
use crate::properties::{Bounds, Spacing, PROPERTY_VENDOR};

/// Everything `wsi-openslide info` reports about a slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideInfo {
    pub path: PathBuf,
    pub vendor: Option<String>,
    pub dimensions: Option<(u64, u64)>,
    pub levels: Vec<LevelInfo>,
    pub associated_images: BTreeMap<String, (u64, u64)>,
    pub mpp: Option<Spacing>,
    pub objective_power: Option<f64>,
    pub bounds: Option<Bounds>,
    /// Hex triplet as stored, e.g. `"FFFFFF"`
    pub background_color: Option<String>,
    pub property_count: usize,
}

impl SlideInfo {
    /// Gather the summary from an open slide.
    ///
    /// Optional metadata that is missing or malformed is reported as `None`.
    pub fn collect<H: SlideHandle>(slide: &Slide<H>) -> Self {
        Self {
            path: slide.path().to_path_buf(),
            vendor: slide.property_value(PROPERTY_VENDOR),
            dimensions: slide.dimensions(),
            levels: slide.levels(),
            associated_images: slide.associated_image_dimensions(),
            mpp: slide.spacing().ok(),
            objective_power: slide.objective_power().ok(),
            bounds: slide.bounds().ok(),
            background_color: slide.background_color().ok().map(hex::encode_upper),
            property_count: slide.property_names().len(),
        }
    }
}
