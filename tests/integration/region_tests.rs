//! Region and associated image read tests.
//!
//! Tests verify:
//! - Arguments are passed through to the backend unchanged
//! - Returned images have the requested size and RGBA pixels
//! - Areas outside the slide are transparent
//! - Native errors are surfaced verbatim
//! - Invalid requests are rejected before reaching the backend

use image::Rgba;

use wsi_openslide::slide::Slide;
use wsi_openslide::SlideError;

use super::test_utils::{fixture_backend, RegionCall};

// =============================================================================
// read_region
// =============================================================================

#[test]
fn test_read_region_dimensions() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let region = slide.read_region(10, 10, 0, 400, 300).unwrap();
    assert_eq!(region.dimensions(), (400, 300));
}

#[test]
fn test_read_region_passes_arguments() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    slide.read_region(-20, 1000, 2, 64, 32).unwrap();
    assert_eq!(
        backend.region_calls(),
        vec![RegionCall {
            x: -20,
            y: 1000,
            level: 2,
            width: 64,
            height: 32,
        }]
    );
}

#[test]
fn test_read_region_pixels_are_rgba() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let region = slide.read_region(5, 7, 0, 4, 4).unwrap();
    // The mock encodes level column in red, level row in green, level in blue.
    assert_eq!(region.get_pixel(0, 0), &Rgba([5, 7, 0, 255]));
    assert_eq!(region.get_pixel(3, 2), &Rgba([8, 9, 0, 255]));
}

#[test]
fn test_read_region_on_lower_level() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    // Level 2 is downsampled ~16x; x/y stay in level 0 coordinates.
    let region = slide.read_region(160, 320, 2, 2, 2).unwrap();
    assert_eq!(region.get_pixel(0, 0), &Rgba([9, 19, 2, 255]));
}

#[test]
fn test_read_region_outside_is_transparent() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "mirax.mrxs").unwrap();

    let region = slide.read_region(998, 0, 0, 4, 1).unwrap();
    assert_eq!(region.get_pixel(1, 0)[3], 255);
    assert_eq!(region.get_pixel(2, 0), &Rgba([0, 0, 0, 0]));
    assert_eq!(region.get_pixel(3, 0), &Rgba([0, 0, 0, 0]));
}

#[test]
fn test_read_region_native_error() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "flaky.svs").unwrap();

    match slide.read_region(0, 0, 0, 16, 16) {
        Err(SlideError::Native(message)) => assert_eq!(message, "JPEG decompression failed"),
        other => panic!("Expected Native error, got {:?}", other),
    }

    // Errors are sticky.
    assert!(slide.read_region(0, 0, 0, 16, 16).is_err());
}

#[test]
fn test_read_region_empty_rejected() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert!(matches!(
        slide.read_region(0, 0, 0, 0, 10),
        Err(SlideError::InvalidRegion { .. })
    ));
    assert!(matches!(
        slide.read_region(0, 0, 0, 10, 0),
        Err(SlideError::InvalidRegion { .. })
    ));
    assert!(backend.region_calls().is_empty());
}

#[test]
fn test_read_region_level_not_addressable() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let result = slide.read_region(0, 0, usize::MAX, 8, 8);
    match result {
        Err(SlideError::LevelOutOfRange { level, count }) => {
            assert_eq!(level, usize::MAX);
            assert_eq!(count, 3);
        }
        other => panic!("Expected LevelOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_read_region_missing_level_is_transparent() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    // Like OpenSlide, a nonexistent level yields a cleared buffer.
    let region = slide.read_region(0, 0, 7, 2, 2).unwrap();
    assert!(region.pixels().all(|p| p == &Rgba([0, 0, 0, 0])));
}

// =============================================================================
// Associated images
// =============================================================================

#[test]
fn test_associated_image_names() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(
        slide.associated_image_names(),
        vec!["label", "macro", "thumbnail"]
    );
}

#[test]
fn test_associated_image_dimensions() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let dims = slide.associated_image_dimensions();
    assert_eq!(dims.len(), 3);
    assert_eq!(dims["label"], (387, 463));
    assert_eq!(dims["macro"], (1280, 431));
    assert_eq!(dims["thumbnail"], (1024, 732));
}

#[test]
fn test_read_associated_image() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let label = slide.read_associated_image("label").unwrap();
    assert_eq!(label.dimensions(), (387, 463));
    assert_eq!(label.get_pixel(0, 0), &Rgba([200, 100, 50, 255]));
}

#[test]
fn test_read_associated_image_unpremultiplies() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let macro_image = slide.read_associated_image("macro").unwrap();
    // 255 * 64 / 128
    assert_eq!(macro_image.get_pixel(10, 10), &Rgba([127, 127, 127, 128]));
}

#[test]
fn test_read_associated_image_unknown() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    match slide.read_associated_image("overview") {
        Err(SlideError::AssociatedImageNotFound(name)) => assert_eq!(name, "overview"),
        other => panic!("Expected AssociatedImageNotFound, got {:?}", other),
    }
}

#[test]
fn test_read_associated_image_native_error() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "flaky.svs").unwrap();

    assert!(matches!(
        slide.read_associated_image("thumbnail"),
        Err(SlideError::Native(_))
    ));
}

#[test]
fn test_no_associated_images() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "mirax.mrxs").unwrap();

    assert!(slide.associated_image_names().is_empty());
    assert!(slide.associated_image_dimensions().is_empty());
}
