//! Backend traits sitting between [`Slide`](super::Slide) and OpenSlide.
//!
//! The traits mirror the OpenSlide C API one call at a time, sentinel values
//! included. All marshaling policy (error checks, buffer sizing, pixel
//! conversion) lives in [`Slide`](super::Slide), so the native implementation
//! stays a thin shim and tests can substitute an in-memory backend.

use std::ffi::CStr;

use crate::error::SlideError;

// =============================================================================
// Backend Trait
// =============================================================================

/// Entry points that do not need an open slide.
pub trait Backend: Send + Sync {
    /// Handle type produced by [`Backend::open`].
    type Handle: SlideHandle;

    /// Library version string, if the library reports one.
    fn version(&self) -> Option<String>;

    /// Quickly check whether a file is a recognized slide.
    ///
    /// Returns the vendor name, or `None` if no format driver matches.
    fn detect_vendor(&self, path: &CStr) -> Option<String>;

    /// Open a slide.
    ///
    /// Returns `None` if the file is not recognized. A recognized file that
    /// fails to open is returned as a handle whose [`SlideHandle::error`] is
    /// set.
    fn open(&self, path: &CStr) -> Result<Option<Self::Handle>, SlideError>;
}

// =============================================================================
// SlideHandle Trait
// =============================================================================

/// Per-slide calls, one for one with the OpenSlide API.
///
/// Once a handle enters the error state every query returns its sentinel
/// (`-1`, `-1.0`, empty list, zeroed buffer) and [`SlideHandle::error`]
/// keeps returning the first error. Dropping the handle releases it.
pub trait SlideHandle: Send + Sync {
    /// Current error message, if the handle is in the error state.
    fn error(&self) -> Option<String>;

    /// Number of levels, or `-1` on error.
    fn level_count(&self) -> i32;

    /// Level 0 dimensions, or `(-1, -1)` on error.
    fn level0_dimensions(&self) -> (i64, i64);

    /// Level dimensions, or `(-1, -1)` on error or out-of-range level.
    fn level_dimensions(&self, level: i32) -> (i64, i64);

    /// Downsample factor, or `-1.0` on error or out-of-range level.
    fn level_downsample(&self, level: i32) -> f64;

    /// Best level for a downsample factor, or `-1` on error.
    fn best_level_for_downsample(&self, downsample: f64) -> i32;

    /// Read premultiplied ARGB pixels into `dest`.
    ///
    /// `x`/`y` are level 0 coordinates; `dest` holds `width * height` pixels.
    fn read_region(&self, dest: &mut [u32], x: i64, y: i64, level: i32, width: i64, height: i64);

    /// Associated image names.
    fn associated_image_names(&self) -> Vec<String>;

    /// Associated image dimensions, or `(-1, -1)` if the name is unknown.
    fn associated_image_dimensions(&self, name: &CStr) -> (i64, i64);

    /// Read a whole associated image into `dest` as premultiplied ARGB.
    fn read_associated_image(&self, name: &CStr, dest: &mut [u32]);

    /// Property names.
    fn property_names(&self) -> Vec<String>;

    /// Property value, or `None` if the property is not set.
    fn property_value(&self, name: &CStr) -> Option<String>;
}
