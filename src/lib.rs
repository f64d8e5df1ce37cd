//! # wsi-openslide
//!
//! Safe Rust bindings to [OpenSlide](https://openslide.org) for reading
//! Whole Slide Images (WSI).
//!
//! Whole Slide Images are gigapixel microscopy scans stored as a pyramid of
//! progressively downsampled levels, in one of many vendor formats (Aperio
//! SVS, Hamamatsu NDPI, Leica SCN, MIRAX, Philips TIFF, ...). OpenSlide does
//! the format work; this crate wraps it:
//!
//! - **Levels**: count, dimensions, downsample factors, best level for a zoom
//! - **Regions**: read any rectangle of any level as an RGBA image
//! - **Associated images**: label, macro and thumbnail images in the file
//! - **Metadata**: vendor properties plus typed MPP, objective power, bounds
//!   and background color
//! - **Thumbnails**: bilinear thumbnails of a requested size
//!
//! OpenSlide is loaded at runtime, so the crate builds without it. Set
//! `OPENSLIDE_LIBRARY` to point at a specific `libopenslide`.
//!
//! ## Modules
//!
//! - [`slide`] - The [`Slide`] API and its backend traits
//! - [`ffi`] - Dynamic loading of the native library
//! - [`properties`] - Property names and typed accessors
//! - [`pixel`] - Premultiplied ARGB to RGBA conversion
//! - [`thumbnail`] - Thumbnail sizing and resampling
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use wsi_openslide::Slide;
//!
//! let slide = Slide::open("CMU-1.svs")?;
//! let (width, height) = slide.dimensions().unwrap_or_default();
//! println!("{}x{} in {} levels", width, height, slide.level_count());
//!
//! if let Ok(spacing) = slide.spacing() {
//!     println!("{} x {} µm/px", spacing.x, spacing.y);
//! }
//!
//! let label = slide.read_associated_image("label")?;
//! label.save("label.png").ok();
//! # Ok::<(), wsi_openslide::SlideError>(())
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod pixel;
pub mod properties;
pub mod slide;
pub mod thumbnail;

// Re-export commonly used types
pub use config::{
    AssociatedConfig, Cli, Command, InfoConfig, PropertiesConfig, RegionConfig, SlideArgs,
    ThumbnailConfig,
};
pub use error::{LibraryError, PropertyError, SlideError};
pub use ffi::OpenSlideLibrary;
pub use pixel::{argb_pixel_to_rgba, argb_to_rgba};
pub use properties::{
    Bounds, SlideProperties, Spacing, PROPERTY_BACKGROUND_COLOR, PROPERTY_BOUNDS_HEIGHT,
    PROPERTY_BOUNDS_WIDTH, PROPERTY_BOUNDS_X, PROPERTY_BOUNDS_Y, PROPERTY_COMMENT, PROPERTY_MPP_X,
    PROPERTY_MPP_Y, PROPERTY_OBJECTIVE_POWER, PROPERTY_QUICKHASH, PROPERTY_VENDOR,
};
pub use slide::{
    detect_vendor, detect_vendor_with, version, Backend, LevelInfo, NativeBackend, NativeHandle,
    Slide, SlideHandle, SlideInfo,
};
pub use thumbnail::{resize_to_thumbnail, thumbnail_downsample, thumbnail_size};
