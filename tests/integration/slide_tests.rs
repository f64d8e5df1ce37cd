//! Slide lifecycle and level query tests.
//!
//! Tests verify:
//! - Opening recognized, unrecognized and broken slides
//! - Vendor detection
//! - Handles are closed exactly once
//! - Level count, dimensions, downsamples and best-level lookup

use wsi_openslide::slide::{detect_vendor_with, Backend, LevelInfo, Slide};
use wsi_openslide::SlideError;

use super::test_utils::{fixture_backend, MockBackend, MockSlide};

// =============================================================================
// Opening
// =============================================================================

#[test]
fn test_open_success() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.path().to_str(), Some("CMU-1.svs"));
    assert_eq!(slide.error(), None);
}

#[test]
fn test_open_unrecognized() {
    let backend = fixture_backend();
    let result = Slide::open_with(&backend, "notes.txt");

    match result {
        Err(SlideError::Unrecognized { path }) => assert_eq!(path, "notes.txt"),
        other => panic!("Expected Unrecognized, got {:?}", other),
    }
}

#[test]
fn test_open_unrecognized_message() {
    let backend = fixture_backend();
    let err = Slide::open_with(&backend, "notes.txt").unwrap_err();
    assert_eq!(err.to_string(), "File notes.txt unrecognized.");
}

#[test]
fn test_open_error_state_is_surfaced() {
    let backend = fixture_backend();
    let result = Slide::open_with(&backend, "corrupt.svs");

    match result {
        Err(SlideError::Native(message)) => {
            assert_eq!(message, "Cannot read TIFF directory");
        }
        other => panic!("Expected Native error, got {:?}", other),
    }
    // The broken handle is still released.
    assert_eq!(backend.closed_count(), 1);
}

#[test]
fn test_open_path_with_nul() {
    let backend = fixture_backend();
    let result = Slide::open_with(&backend, "CMU\0-1.svs");
    assert!(matches!(result, Err(SlideError::InvalidPath(_))));
}

// =============================================================================
// Closing
// =============================================================================

#[test]
fn test_close_releases_handle_once() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();
    assert_eq!(backend.closed_count(), 0);

    slide.close();
    assert_eq!(backend.closed_count(), 1);
}

#[test]
fn test_drop_releases_handle() {
    let backend = fixture_backend();
    {
        let _a = Slide::open_with(&backend, "CMU-1.svs").unwrap();
        let _b = Slide::open_with(&backend, "mirax.mrxs").unwrap();
    }
    assert_eq!(backend.closed_count(), 2);
}

// =============================================================================
// Vendor detection and version
// =============================================================================

#[test]
fn test_detect_vendor() {
    let backend = fixture_backend();
    assert_eq!(detect_vendor_with(&backend, "CMU-1.svs").unwrap(), "aperio");
    assert_eq!(detect_vendor_with(&backend, "mirax.mrxs").unwrap(), "mirax");
}

#[test]
fn test_detect_vendor_unknown() {
    let backend = fixture_backend();
    let err = detect_vendor_with(&backend, "notes.txt").unwrap_err();

    assert!(matches!(err, SlideError::NoVendor { .. }));
    assert_eq!(err.to_string(), "No vendor for notes.txt");
}

#[test]
fn test_version() {
    assert_eq!(fixture_backend().version().as_deref(), Some("4.0.0"));
}

// =============================================================================
// Levels
// =============================================================================

#[test]
fn test_level_count_and_dimensions() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.level_count(), 3);
    assert_eq!(slide.dimensions(), Some((46000, 32914)));
    assert_eq!(slide.level_dimensions(0), Some((46000, 32914)));
    assert_eq!(slide.level_dimensions(1), Some((11500, 8228)));
    assert_eq!(slide.level_dimensions(2), Some((2875, 2057)));
}

#[test]
fn test_level_out_of_range() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.level_dimensions(3), None);
    assert_eq!(slide.level_downsample(3), None);
    assert_eq!(slide.level_info(3), None);
    assert_eq!(slide.level_dimensions(usize::MAX), None);
}

#[test]
fn test_level_downsamples() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.level_downsample(0), Some(1.0));
    assert_eq!(slide.level_downsamples(), vec![1.0, 4.000_217, 16.001_66]);
}

#[test]
fn test_levels() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let levels = slide.levels();
    assert_eq!(levels.len(), 3);
    assert_eq!(
        levels[1],
        LevelInfo {
            width: 11500,
            height: 8228,
            downsample: 4.000_217,
        }
    );
}

#[test]
fn test_best_level_for_downsample() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.best_level_for_downsample(1.0), Some(0));
    assert_eq!(slide.best_level_for_downsample(5.0), Some(1));
    assert_eq!(slide.best_level_for_downsample(100.0), Some(2));
}

#[test]
fn test_error_state_sentinels() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "flaky.svs").unwrap();

    // Trip the error, then every query reports its sentinel.
    assert!(slide.read_region(0, 0, 0, 4, 4).is_err());
    assert_eq!(slide.level_count(), 0);
    assert_eq!(slide.dimensions(), None);
    assert!(slide.levels().is_empty());
    assert_eq!(slide.best_level_for_downsample(2.0), None);
    assert_eq!(
        slide.error().as_deref(),
        Some("JPEG decompression failed")
    );
}

#[test]
fn test_empty_backend() {
    let backend = MockBackend::new().with_slide("empty.tif", MockSlide::default());
    let slide = Slide::open_with(&backend, "empty.tif").unwrap();

    assert_eq!(slide.level_count(), 0);
    assert_eq!(slide.dimensions(), None);
    assert!(slide.level_downsamples().is_empty());
}
