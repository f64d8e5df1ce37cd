//! Dynamic loading of `libopenslide`.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::raw::c_char;
use std::sync::{Arc, OnceLock};

use libloading::Library;
use tracing::debug;

use super::openslide_t;
use crate::error::LibraryError;

/// Environment variable that pins the library path, bypassing the search.
pub const LIBRARY_ENV: &str = "OPENSLIDE_LIBRARY";

#[cfg(target_os = "macos")]
const DEFAULT_CANDIDATES: &[&str] = &[
    "libopenslide.1.dylib",
    "libopenslide.0.dylib",
    "libopenslide.dylib",
];

#[cfg(windows)]
const DEFAULT_CANDIDATES: &[&str] = &["libopenslide-1.dll", "libopenslide-0.dll", "openslide.dll"];

#[cfg(all(unix, not(target_os = "macos")))]
const DEFAULT_CANDIDATES: &[&str] = &["libopenslide.so.1", "libopenslide.so.0", "libopenslide.so"];

// =============================================================================
// Function signatures (openslide.h)
// =============================================================================

pub(crate) type DetectVendorFn = unsafe extern "C" fn(*const c_char) -> *const c_char;
pub(crate) type OpenFn = unsafe extern "C" fn(*const c_char) -> *mut openslide_t;
pub(crate) type CloseFn = unsafe extern "C" fn(*mut openslide_t);
pub(crate) type GetErrorFn = unsafe extern "C" fn(*mut openslide_t) -> *const c_char;
pub(crate) type LevelCountFn = unsafe extern "C" fn(*mut openslide_t) -> i32;
pub(crate) type Level0DimensionsFn = unsafe extern "C" fn(*mut openslide_t, *mut i64, *mut i64);
pub(crate) type LevelDimensionsFn =
    unsafe extern "C" fn(*mut openslide_t, i32, *mut i64, *mut i64);
pub(crate) type LevelDownsampleFn = unsafe extern "C" fn(*mut openslide_t, i32) -> f64;
pub(crate) type BestLevelFn = unsafe extern "C" fn(*mut openslide_t, f64) -> i32;
pub(crate) type ReadRegionFn =
    unsafe extern "C" fn(*mut openslide_t, *mut u32, i64, i64, i32, i64, i64);
pub(crate) type NameListFn = unsafe extern "C" fn(*mut openslide_t) -> *const *const c_char;
pub(crate) type AssociatedDimensionsFn =
    unsafe extern "C" fn(*mut openslide_t, *const c_char, *mut i64, *mut i64);
pub(crate) type ReadAssociatedFn = unsafe extern "C" fn(*mut openslide_t, *const c_char, *mut u32);
pub(crate) type PropertyValueFn =
    unsafe extern "C" fn(*mut openslide_t, *const c_char) -> *const c_char;
pub(crate) type VersionFn = unsafe extern "C" fn() -> *const c_char;

// =============================================================================
// OpenSlideLibrary
// =============================================================================

/// A loaded OpenSlide shared library and its resolved entry points.
///
/// Load it once and share it behind an `Arc`; every
/// [`NativeHandle`](crate::slide::NativeHandle) keeps the library alive for
/// as long as the handle exists.
///
/// ```ignore
/// use std::sync::Arc;
/// use wsi_openslide::ffi::OpenSlideLibrary;
///
/// let lib = Arc::new(OpenSlideLibrary::load()?);
/// ```
pub struct OpenSlideLibrary {
    pub(crate) detect_vendor: DetectVendorFn,
    pub(crate) open: OpenFn,
    pub(crate) close: CloseFn,
    pub(crate) get_error: GetErrorFn,
    pub(crate) get_level_count: LevelCountFn,
    pub(crate) get_level0_dimensions: Level0DimensionsFn,
    pub(crate) get_level_dimensions: LevelDimensionsFn,
    pub(crate) get_level_downsample: LevelDownsampleFn,
    pub(crate) get_best_level_for_downsample: BestLevelFn,
    pub(crate) read_region: ReadRegionFn,
    pub(crate) get_associated_image_names: NameListFn,
    pub(crate) get_associated_image_dimensions: AssociatedDimensionsFn,
    pub(crate) read_associated_image: ReadAssociatedFn,
    pub(crate) get_property_names: NameListFn,
    pub(crate) get_property_value: PropertyValueFn,
    pub(crate) get_version: VersionFn,

    source: String,

    // Must outlive the function pointers above.
    _library: Library,
}

impl OpenSlideLibrary {
    /// Load OpenSlide from `OPENSLIDE_LIBRARY` or the platform's default names.
    pub fn load() -> Result<Self, LibraryError> {
        let override_path = env::var_os(LIBRARY_ENV);
        let candidates = candidate_names(override_path.as_deref());

        let mut tried = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match Self::load_from(candidate) {
                Ok(lib) => return Ok(lib),
                Err(LibraryError::NotFound { .. }) => {
                    tried.push(candidate.to_string_lossy().into_owned());
                }
                Err(e) => return Err(e),
            }
        }

        Err(LibraryError::NotFound { tried })
    }

    /// Load OpenSlide from an explicit path or library name.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let source = path.to_string_lossy().into_owned();

        // SAFETY: loading runs the library's initializers; OpenSlide's are
        // limited to GLib type registration.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            debug!("Could not load {}: {}", source, e);
            LibraryError::NotFound {
                tried: vec![source.clone()],
            }
        })?;

        // SAFETY: each symbol is resolved with the signature declared in
        // openslide.h.
        let lib = unsafe {
            Self {
                detect_vendor: symbol(&library, "openslide_detect_vendor")?,
                open: symbol(&library, "openslide_open")?,
                close: symbol(&library, "openslide_close")?,
                get_error: symbol(&library, "openslide_get_error")?,
                get_level_count: symbol(&library, "openslide_get_level_count")?,
                get_level0_dimensions: symbol(&library, "openslide_get_level0_dimensions")?,
                get_level_dimensions: symbol(&library, "openslide_get_level_dimensions")?,
                get_level_downsample: symbol(&library, "openslide_get_level_downsample")?,
                get_best_level_for_downsample: symbol(
                    &library,
                    "openslide_get_best_level_for_downsample",
                )?,
                read_region: symbol(&library, "openslide_read_region")?,
                get_associated_image_names: symbol(
                    &library,
                    "openslide_get_associated_image_names",
                )?,
                get_associated_image_dimensions: symbol(
                    &library,
                    "openslide_get_associated_image_dimensions",
                )?,
                read_associated_image: symbol(&library, "openslide_read_associated_image")?,
                get_property_names: symbol(&library, "openslide_get_property_names")?,
                get_property_value: symbol(&library, "openslide_get_property_value")?,
                get_version: symbol(&library, "openslide_get_version")?,
                source,
                _library: library,
            }
        };

        debug!("Loaded OpenSlide from {}", lib.source);
        Ok(lib)
    }

    /// Process-wide library instance, loaded on first use.
    ///
    /// A failed load is remembered; later calls return the same error.
    pub fn shared() -> Result<Arc<Self>, LibraryError> {
        static SHARED: OnceLock<Result<Arc<OpenSlideLibrary>, LibraryError>> = OnceLock::new();
        SHARED
            .get_or_init(|| OpenSlideLibrary::load().map(Arc::new))
            .clone()
    }

    /// The path or name this library was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for OpenSlideLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenSlideLibrary")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Resolve one symbol and copy out the function pointer.
unsafe fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T, LibraryError> {
    library
        .get::<T>(name.as_bytes())
        .map(|sym| *sym)
        .map_err(|e| LibraryError::MissingSymbol {
            symbol: name,
            message: e.to_string(),
        })
}

/// Library names to try, in order.
///
/// An explicit override replaces the platform defaults entirely.
pub fn candidate_names(override_path: Option<&OsStr>) -> Vec<OsString> {
    match override_path {
        Some(path) if !path.is_empty() => vec![path.to_os_string()],
        _ => DEFAULT_CANDIDATES
            .iter()
            .map(|name| OsString::from(*name))
            .collect(),
    }
}
