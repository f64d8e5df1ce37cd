//! Raw access to the native OpenSlide library.
//!
//! OpenSlide is loaded at runtime via `libloading` instead of being linked at
//! build time, so the crate builds (and its pure-Rust parts run) on machines
//! without OpenSlide installed. Opening a slide on such a machine fails with
//! [`crate::error::LibraryError::NotFound`].
//!
//! # Module Structure
//!
//! - [`library`] - [`OpenSlideLibrary`], the resolved function table
//! - this module - C string marshaling helpers shared by the native backend
//!
//! # Safety
//!
//! Every function pointer in [`OpenSlideLibrary`] is an `unsafe extern "C"`
//! call into OpenSlide. Callers must pass a live `openslide_t` handle and
//! buffers sized as the OpenSlide API documents.

pub mod library;

use std::ffi::CStr;
use std::os::raw::c_char;

pub use library::{candidate_names, OpenSlideLibrary, LIBRARY_ENV};

/// Opaque OpenSlide handle (`openslide_t`).
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct openslide_t {
    _opaque: [u8; 0],
}

/// Copy a nullable C string into an owned `String`.
///
/// Invalid UTF-8 is replaced rather than rejected; property values written by
/// scanner software are not always clean.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid for
/// the duration of the call.
pub(crate) unsafe fn string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Copy a NULL-terminated array of C strings into a `Vec<String>`.
///
/// # Safety
///
/// `array` must be null or point to an array of valid C strings terminated by
/// a null pointer.
pub(crate) unsafe fn strings_from_array(array: *const *const c_char) -> Vec<String> {
    let mut strings = Vec::new();
    if array.is_null() {
        return strings;
    }

    let mut index = 0;
    loop {
        let entry = *array.add(index);
        match string_from_ptr(entry) {
            Some(s) => strings.push(s),
            None => break,
        }
        index += 1;
    }
    strings
}
