//! The [`Slide`] type: safe access to an open whole-slide image.
//!
//! `Slide` owns a backend handle and turns the raw C-style calls of
//! [`SlideHandle`] into a Rust API:
//!
//! - sentinel values (`-1`) become `Option`s
//! - the handle's sticky error string becomes [`SlideError::Native`]
//! - pixel buffers are allocated here, filled by the backend, and converted
//!   from premultiplied ARGB to straight RGBA

use std::collections::BTreeMap;
use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::Serialize;
use tracing::{debug, warn};

use super::handle::{Backend, SlideHandle};
use super::native::{NativeBackend, NativeHandle};
use crate::error::SlideError;
use crate::pixel::argb_to_rgba;
use crate::properties::{
    Bounds, SlideProperties, Spacing, PROPERTY_BACKGROUND_COLOR, PROPERTY_BOUNDS_HEIGHT,
    PROPERTY_BOUNDS_WIDTH, PROPERTY_BOUNDS_X, PROPERTY_BOUNDS_Y, PROPERTY_MPP_X, PROPERTY_MPP_Y,
    PROPERTY_OBJECTIVE_POWER,
};
use crate::thumbnail::{resize_to_thumbnail, thumbnail_downsample};

// =============================================================================
// Level Information
// =============================================================================

/// Information about a single pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelInfo {
    /// Width of this level in pixels
    pub width: u64,

    /// Height of this level in pixels
    pub height: u64,

    /// Downsample factor relative to level 0
    ///
    /// Level 0 has downsample 1.0, level 1 might have 4.0, etc.
    pub downsample: f64,
}

// =============================================================================
// Library-level functions
// =============================================================================

/// Quickly determine whether a file is a slide OpenSlide can read.
///
/// Returns the vendor name (`"aperio"`, `"hamamatsu"`, `"generic-tiff"`, ...)
/// without fully opening the file.
pub fn detect_vendor(path: impl AsRef<Path>) -> Result<String, SlideError> {
    detect_vendor_with(&NativeBackend::shared()?, path)
}

/// [`detect_vendor`] against an explicit backend.
pub fn detect_vendor_with<B: Backend>(
    backend: &B,
    path: impl AsRef<Path>,
) -> Result<String, SlideError> {
    let path = path.as_ref();
    let c_path = path_to_cstring(path)?;
    backend
        .detect_vendor(&c_path)
        .ok_or_else(|| SlideError::NoVendor {
            path: path.display().to_string(),
        })
}

/// Version of the loaded OpenSlide library.
pub fn version() -> Result<Option<String>, SlideError> {
    Ok(NativeBackend::shared()?.version())
}

fn path_to_cstring(path: &Path) -> Result<CString, SlideError> {
    let s = path
        .to_str()
        .ok_or_else(|| SlideError::InvalidPath(path.display().to_string()))?;
    CString::new(s).map_err(|_| SlideError::InvalidPath(s.escape_default().to_string()))
}

fn dimensions_from_raw((width, height): (i64, i64)) -> Option<(u64, u64)> {
    if width < 0 || height < 0 {
        return None;
    }
    Some((width as u64, height as u64))
}

/// Number of `u32` pixels for a `width` x `height` buffer, if addressable.
fn pixel_count(width: u64, height: u64) -> Option<usize> {
    let count = usize::try_from(width.checked_mul(height)?).ok()?;
    // RGBA output needs four bytes per pixel.
    count.checked_mul(4)?;
    Some(count)
}

// =============================================================================
// Slide
// =============================================================================

/// An open whole-slide image.
///
/// The underlying handle is released when the slide is dropped or
/// [`closed`](Slide::close).
///
/// # Example
///
/// ```no_run
/// use wsi_openslide::Slide;
///
/// let slide = Slide::open("CMU-1.svs")?;
/// println!("{} levels", slide.level_count());
///
/// let region = slide.read_region(1000, 1000, 0, 512, 512)?;
/// region.save("region.png").ok();
/// # Ok::<(), wsi_openslide::SlideError>(())
/// ```
pub struct Slide<H: SlideHandle = NativeHandle> {
    handle: H,
    path: PathBuf,
}

impl Slide<NativeHandle> {
    /// Open a slide with the process-wide OpenSlide library.
    ///
    /// Opening parses the slide's index and can be slow; keep the `Slide`
    /// around rather than reopening it for each read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SlideError> {
        Self::open_with(&NativeBackend::shared()?, path)
    }
}

impl<H: SlideHandle> Slide<H> {
    /// Open a slide through an explicit backend.
    pub fn open_with<B>(backend: &B, path: impl AsRef<Path>) -> Result<Self, SlideError>
    where
        B: Backend<Handle = H>,
    {
        let path = path.as_ref();
        let c_path = path_to_cstring(path)?;

        let handle = backend
            .open(&c_path)?
            .ok_or_else(|| SlideError::Unrecognized {
                path: path.display().to_string(),
            })?;

        // A recognized but broken file comes back as a handle in error state.
        if let Some(message) = handle.error() {
            warn!("Failed to open {}: {}", path.display(), message);
            return Err(SlideError::Native(message));
        }

        debug!("Opened slide {}", path.display());
        Ok(Self {
            handle,
            path: path.to_path_buf(),
        })
    }

    /// Path the slide was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the slide.
    pub fn close(self) {
        debug!("Closing slide {}", self.path.display());
    }

    /// The handle's error message, if it has entered the error state.
    ///
    /// Errors are sticky: once set, every further read fails.
    pub fn error(&self) -> Option<String> {
        self.handle.error()
    }

    fn check_error(&self) -> Result<(), SlideError> {
        match self.handle.error() {
            Some(message) => {
                warn!("OpenSlide error on {}: {}", self.path.display(), message);
                Err(SlideError::Native(message))
            }
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Levels
    // -------------------------------------------------------------------------

    /// Number of pyramid levels. Zero if the handle is in the error state.
    pub fn level_count(&self) -> usize {
        usize::try_from(self.handle.level_count()).unwrap_or(0)
    }

    /// Dimensions of level 0, the full-resolution image.
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        dimensions_from_raw(self.handle.level0_dimensions())
    }

    /// Dimensions of a level, or `None` if the level does not exist.
    pub fn level_dimensions(&self, level: usize) -> Option<(u64, u64)> {
        let level = i32::try_from(level).ok()?;
        dimensions_from_raw(self.handle.level_dimensions(level))
    }

    /// Downsample factor of a level relative to level 0.
    pub fn level_downsample(&self, level: usize) -> Option<f64> {
        let level = i32::try_from(level).ok()?;
        let downsample = self.handle.level_downsample(level);
        (downsample > 0.0).then_some(downsample)
    }

    /// Downsample factors of every level, in level order.
    pub fn level_downsamples(&self) -> Vec<f64> {
        (0..self.level_count())
            .filter_map(|level| self.level_downsample(level))
            .collect()
    }

    /// Dimensions and downsample of a level.
    pub fn level_info(&self, level: usize) -> Option<LevelInfo> {
        let (width, height) = self.level_dimensions(level)?;
        let downsample = self.level_downsample(level)?;
        Some(LevelInfo {
            width,
            height,
            downsample,
        })
    }

    /// Information about every level, in level order.
    pub fn levels(&self) -> Vec<LevelInfo> {
        (0..self.level_count())
            .filter_map(|level| self.level_info(level))
            .collect()
    }

    /// Best level to read for a given downsample factor.
    pub fn best_level_for_downsample(&self, downsample: f64) -> Option<usize> {
        usize::try_from(self.handle.best_level_for_downsample(downsample)).ok()
    }

    // -------------------------------------------------------------------------
    // Pixel data
    // -------------------------------------------------------------------------

    /// Read a region as an RGBA image.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Top-left corner in level 0 coordinates
    /// * `level` - Level to read pixels from
    /// * `width`, `height` - Region size in pixels of `level`
    ///
    /// Areas outside the slide come back fully transparent.
    pub fn read_region(
        &self,
        x: i64,
        y: i64,
        level: usize,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, SlideError> {
        let native_level = i32::try_from(level).map_err(|_| SlideError::LevelOutOfRange {
            level,
            count: self.level_count(),
        })?;

        let mut pixels = self.alloc_pixels(width as u64, height as u64)?;

        debug!(
            "Reading region x={} y={} level={} size={}x{} from {}",
            x,
            y,
            level,
            width,
            height,
            self.path.display()
        );
        self.handle.read_region(
            &mut pixels,
            x,
            y,
            native_level,
            width as i64,
            height as i64,
        );
        self.check_error()?;

        into_image(width, height, &pixels)
    }

    /// Names of the associated images (`"label"`, `"macro"`, `"thumbnail"`, ...).
    pub fn associated_image_names(&self) -> Vec<String> {
        self.handle.associated_image_names()
    }

    /// Dimensions of every associated image, by name.
    pub fn associated_image_dimensions(&self) -> BTreeMap<String, (u64, u64)> {
        self.associated_image_names()
            .into_iter()
            .filter_map(|name| {
                let c_name = CString::new(name.as_str()).ok()?;
                let dims = dimensions_from_raw(self.handle.associated_image_dimensions(&c_name))?;
                Some((name, dims))
            })
            .collect()
    }

    /// Read an associated image as an RGBA image.
    pub fn read_associated_image(&self, name: &str) -> Result<RgbaImage, SlideError> {
        let not_found = || SlideError::AssociatedImageNotFound(name.to_string());

        let c_name = CString::new(name).map_err(|_| not_found())?;
        let (width, height) =
            dimensions_from_raw(self.handle.associated_image_dimensions(&c_name))
                .ok_or_else(not_found)?;

        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(SlideError::InvalidRegion {
                    message: format!("associated image {} is {}x{}", name, width, height),
                })
            }
        };

        let mut pixels = self.alloc_pixels(width as u64, height as u64)?;

        debug!("Reading associated image {} from {}", name, self.path.display());
        self.handle.read_associated_image(&c_name, &mut pixels);
        self.check_error()?;

        into_image(width, height, &pixels)
    }

    fn alloc_pixels(&self, width: u64, height: u64) -> Result<Vec<u32>, SlideError> {
        if width == 0 || height == 0 {
            return Err(SlideError::InvalidRegion {
                message: format!("empty region {}x{}", width, height),
            });
        }
        let count = pixel_count(width, height).ok_or_else(|| SlideError::InvalidRegion {
            message: format!("region {}x{} is too large", width, height),
        })?;
        Ok(vec![0u32; count])
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Names of all properties.
    pub fn property_names(&self) -> Vec<String> {
        self.handle.property_names()
    }

    /// Value of one property, or `None` if it is not set.
    pub fn property_value(&self, name: &str) -> Option<String> {
        let c_name = CString::new(name).ok()?;
        self.handle.property_value(&c_name)
    }

    /// All properties with a non-empty value.
    pub fn properties(&self) -> SlideProperties {
        self.property_names()
            .into_iter()
            .filter_map(|name| {
                let value = self.property_value(&name)?;
                Some((name, value))
            })
            .collect()
    }

    fn known_properties(&self, names: &[&str]) -> SlideProperties {
        names
            .iter()
            .filter_map(|name| Some((*name, self.property_value(name)?)))
            .collect()
    }

    /// Microns per pixel at level 0.
    pub fn spacing(&self) -> Result<Spacing, SlideError> {
        Ok(self
            .known_properties(&[PROPERTY_MPP_X, PROPERTY_MPP_Y])
            .spacing()?)
    }

    /// Objective power the slide was scanned at.
    pub fn objective_power(&self) -> Result<f64, SlideError> {
        Ok(self
            .known_properties(&[PROPERTY_OBJECTIVE_POWER])
            .objective_power()?)
    }

    /// Rectangle bounding the non-empty region, in level 0 pixels.
    pub fn bounds(&self) -> Result<Bounds, SlideError> {
        Ok(self
            .known_properties(&[
                PROPERTY_BOUNDS_X,
                PROPERTY_BOUNDS_Y,
                PROPERTY_BOUNDS_WIDTH,
                PROPERTY_BOUNDS_HEIGHT,
            ])
            .bounds()?)
    }

    /// Background color as `[r, g, b]`.
    pub fn background_color(&self) -> Result<[u8; 3], SlideError> {
        Ok(self
            .known_properties(&[PROPERTY_BACKGROUND_COLOR])
            .background_color()?)
    }

    // -------------------------------------------------------------------------
    // Thumbnail
    // -------------------------------------------------------------------------

    /// Render a thumbnail whose longest side is `size` pixels.
    ///
    /// Reads the whole of the best level for the required downsample and
    /// resamples it bilinearly.
    pub fn thumbnail(&self, size: u32) -> Result<RgbaImage, SlideError> {
        if size == 0 {
            return Err(SlideError::InvalidThumbnailSize(size));
        }

        let level0 = match self.dimensions() {
            Some(dims) => dims,
            None => {
                self.check_error()?;
                return Err(SlideError::InvalidRegion {
                    message: "slide has no level 0".to_string(),
                });
            }
        };

        let downsample = thumbnail_downsample(level0, size);
        let level = self.best_level_for_downsample(downsample).unwrap_or(0);
        let (width, height) =
            self.level_dimensions(level)
                .ok_or_else(|| SlideError::LevelOutOfRange {
                    level,
                    count: self.level_count(),
                })?;

        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(SlideError::InvalidRegion {
                    message: format!("level {} is {}x{}", level, width, height),
                })
            }
        };

        debug!(
            "Thumbnail {} from level {} (downsample {:.2})",
            size, level, downsample
        );
        let region = self.read_region(0, 0, level, width, height)?;
        Ok(resize_to_thumbnail(&region, size))
    }
}

impl<H: SlideHandle> fmt::Debug for Slide<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slide")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn into_image(width: u32, height: u32, pixels: &[u32]) -> Result<RgbaImage, SlideError> {
    RgbaImage::from_raw(width, height, argb_to_rgba(pixels)).ok_or_else(|| {
        SlideError::InvalidRegion {
            message: format!("buffer does not match {}x{}", width, height),
        }
    })
}
