//! [`Backend`] implementation over the loaded OpenSlide library.

use std::ffi::CStr;
use std::ptr::NonNull;
use std::sync::Arc;

use tracing::debug;

use super::handle::{Backend, SlideHandle};
use crate::error::SlideError;
use crate::ffi::{self, openslide_t, OpenSlideLibrary};

// =============================================================================
// NativeBackend
// =============================================================================

/// Backend that calls into `libopenslide`.
#[derive(Debug, Clone)]
pub struct NativeBackend {
    lib: Arc<OpenSlideLibrary>,
}

impl NativeBackend {
    /// Wrap an already loaded library.
    pub fn new(lib: Arc<OpenSlideLibrary>) -> Self {
        Self { lib }
    }

    /// Use the process-wide library, loading it on first use.
    pub fn shared() -> Result<Self, SlideError> {
        Ok(Self::new(OpenSlideLibrary::shared()?))
    }

    /// The underlying library.
    pub fn library(&self) -> &Arc<OpenSlideLibrary> {
        &self.lib
    }
}

impl Backend for NativeBackend {
    type Handle = NativeHandle;

    fn version(&self) -> Option<String> {
        unsafe { ffi::string_from_ptr((self.lib.get_version)()) }
    }

    fn detect_vendor(&self, path: &CStr) -> Option<String> {
        // The returned string is static inside OpenSlide.
        unsafe { ffi::string_from_ptr((self.lib.detect_vendor)(path.as_ptr())) }
    }

    fn open(&self, path: &CStr) -> Result<Option<NativeHandle>, SlideError> {
        let raw = unsafe { (self.lib.open)(path.as_ptr()) };
        Ok(NonNull::new(raw).map(|ptr| NativeHandle {
            lib: Arc::clone(&self.lib),
            ptr,
        }))
    }
}

// =============================================================================
// NativeHandle
// =============================================================================

/// An open `openslide_t`, closed on drop.
pub struct NativeHandle {
    lib: Arc<OpenSlideLibrary>,
    ptr: NonNull<openslide_t>,
}

// SAFETY: OpenSlide handles are thread-safe; all calls on one handle may be
// made concurrently from multiple threads.
unsafe impl Send for NativeHandle {}
unsafe impl Sync for NativeHandle {}

impl NativeHandle {
    fn raw(&self) -> *mut openslide_t {
        self.ptr.as_ptr()
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        debug!("Closing OpenSlide handle {:p}", self.ptr);
        unsafe { (self.lib.close)(self.raw()) }
    }
}

impl SlideHandle for NativeHandle {
    fn error(&self) -> Option<String> {
        unsafe { ffi::string_from_ptr((self.lib.get_error)(self.raw())) }
    }

    fn level_count(&self) -> i32 {
        unsafe { (self.lib.get_level_count)(self.raw()) }
    }

    fn level0_dimensions(&self) -> (i64, i64) {
        let (mut w, mut h) = (-1i64, -1i64);
        unsafe { (self.lib.get_level0_dimensions)(self.raw(), &mut w, &mut h) };
        (w, h)
    }

    fn level_dimensions(&self, level: i32) -> (i64, i64) {
        let (mut w, mut h) = (-1i64, -1i64);
        unsafe { (self.lib.get_level_dimensions)(self.raw(), level, &mut w, &mut h) };
        (w, h)
    }

    fn level_downsample(&self, level: i32) -> f64 {
        unsafe { (self.lib.get_level_downsample)(self.raw(), level) }
    }

    fn best_level_for_downsample(&self, downsample: f64) -> i32 {
        unsafe { (self.lib.get_best_level_for_downsample)(self.raw(), downsample) }
    }

    fn read_region(&self, dest: &mut [u32], x: i64, y: i64, level: i32, width: i64, height: i64) {
        debug_assert_eq!(dest.len() as i64, width * height);
        unsafe {
            (self.lib.read_region)(self.raw(), dest.as_mut_ptr(), x, y, level, width, height)
        }
    }

    fn associated_image_names(&self) -> Vec<String> {
        unsafe { ffi::strings_from_array((self.lib.get_associated_image_names)(self.raw())) }
    }

    fn associated_image_dimensions(&self, name: &CStr) -> (i64, i64) {
        let (mut w, mut h) = (-1i64, -1i64);
        unsafe {
            (self.lib.get_associated_image_dimensions)(self.raw(), name.as_ptr(), &mut w, &mut h)
        };
        (w, h)
    }

    fn read_associated_image(&self, name: &CStr, dest: &mut [u32]) {
        unsafe { (self.lib.read_associated_image)(self.raw(), name.as_ptr(), dest.as_mut_ptr()) }
    }

    fn property_names(&self) -> Vec<String> {
        unsafe { ffi::strings_from_array((self.lib.get_property_names)(self.raw())) }
    }

    fn property_value(&self, name: &CStr) -> Option<String> {
        unsafe { ffi::string_from_ptr((self.lib.get_property_value)(self.raw(), name.as_ptr())) }
    }
}
