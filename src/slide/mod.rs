//! Slide access layer.
//!
//! This module provides the safe [`Slide`] API and the backend seam it is
//! built on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                 Slide                   │
//! │  (errors, buffers, ARGB → RGBA,         │
//! │   properties, thumbnails)               │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │       Backend / SlideHandle traits      │
//! │   (one call per OpenSlide function)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     NativeBackend / NativeHandle        │
//! │        (libopenslide via ffi)           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use wsi_openslide::slide::{detect_vendor, Slide};
//!
//! let vendor = detect_vendor("CMU-1.svs")?;
//! let slide = Slide::open("CMU-1.svs")?;
//!
//! for (level, info) in slide.levels().iter().enumerate() {
//!     println!("level {}: {}x{} (x{})", level, info.width, info.height, info.downsample);
//! }
//!
//! let thumbnail = slide.thumbnail(512)?;
//! # Ok::<(), wsi_openslide::SlideError>(())
//! ```

mod handle;
mod info;
mod native;
mod reader;

pub use handle::{Backend, SlideHandle};
pub use info::SlideInfo;
pub use native::{NativeBackend, NativeHandle};
pub use reader::{detect_vendor, detect_vendor_with, version, LevelInfo, Slide};
