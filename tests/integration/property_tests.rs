//! Property and metadata tests.
//!
//! Tests verify:
//! - Property names and values pass through unchanged
//! - The property map skips empty values
//! - Typed accessors for MPP, objective power, bounds and background color
//! - The serialized slide summary

use wsi_openslide::slide::{Slide, SlideInfo};
use wsi_openslide::{
    Bounds, PropertyError, SlideError, Spacing, PROPERTY_COMMENT, PROPERTY_MPP_X, PROPERTY_VENDOR,
};

use super::test_utils::fixture_backend;

#[test]
fn test_property_names_in_native_order() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let names = slide.property_names();
    assert_eq!(names.len(), 6);
    assert_eq!(names[0], PROPERTY_VENDOR);
    assert_eq!(names[5], "aperio.AppMag");
}

#[test]
fn test_property_value() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.property_value(PROPERTY_MPP_X).as_deref(), Some("0.4990"));
    assert_eq!(slide.property_value("aperio.AppMag").as_deref(), Some("20"));
    assert_eq!(slide.property_value("hamamatsu.SourceLens"), None);
    assert_eq!(slide.property_value("bad\0name"), None);
}

#[test]
fn test_properties_skip_empty_values() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let properties = slide.properties();
    assert_eq!(properties.len(), 5);
    assert_eq!(properties.get(PROPERTY_COMMENT), None);
    assert_eq!(properties.vendor(), Some("aperio"));
}

#[test]
fn test_spacing() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    assert_eq!(slide.spacing().unwrap(), Spacing { x: 0.499, y: 0.499 });
}

#[test]
fn test_spacing_unavailable() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "mirax.mrxs").unwrap();

    match slide.spacing() {
        Err(SlideError::Property(PropertyError::Missing(name))) => {
            assert_eq!(name, PROPERTY_MPP_X);
        }
        other => panic!("Expected missing mpp, got {:?}", other),
    }
}

#[test]
fn test_objective_power() {
    let backend = fixture_backend();

    let aperio = Slide::open_with(&backend, "CMU-1.svs").unwrap();
    assert_eq!(aperio.objective_power().unwrap(), 20.0);

    let mirax = Slide::open_with(&backend, "mirax.mrxs").unwrap();
    assert!(mirax.objective_power().is_err());
}

#[test]
fn test_bounds_and_background() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "mirax.mrxs").unwrap();

    assert_eq!(
        slide.bounds().unwrap(),
        Bounds {
            x: 100,
            y: 50,
            width: 800,
            height: 400,
        }
    );
    assert_eq!(slide.background_color().unwrap(), [255, 255, 255]);
}

#[test]
fn test_slide_info_summary() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "CMU-1.svs").unwrap();

    let info = SlideInfo::collect(&slide);
    assert_eq!(info.vendor.as_deref(), Some("aperio"));
    assert_eq!(info.dimensions, Some((46000, 32914)));
    assert_eq!(info.levels.len(), 3);
    assert_eq!(info.associated_images.len(), 3);
    assert_eq!(info.mpp, Some(Spacing { x: 0.499, y: 0.499 }));
    assert_eq!(info.objective_power, Some(20.0));
    assert_eq!(info.bounds, None);
    assert_eq!(info.background_color, None);
    assert_eq!(info.property_count, 6);
}

#[test]
fn test_slide_info_json() {
    let backend = fixture_backend();
    let slide = Slide::open_with(&backend, "mirax.mrxs").unwrap();

    let json = serde_json::to_value(SlideInfo::collect(&slide)).unwrap();
    assert_eq!(json["vendor"], "mirax");
    assert_eq!(json["background_color"], "FFFFFF");
    assert_eq!(json["bounds"]["width"], 800);
    assert_eq!(json["levels"][0]["width"], 1000);
    assert_eq!(json["dimensions"], serde_json::json!([1000, 500]));
    assert!(json["mpp"].is_null());
}
