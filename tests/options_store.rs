use serde_json::json;
use waterbox::{
    ColorScheme, OptionKey, OptionValue, Options, OptionsPatch, Pattern, PatternName, Scale,
    Waterbox, WaterboxError,
};

fn seeded() -> Waterbox {
    Waterbox::seeded(7).unwrap()
}

#[test]
fn construction_notifies_once_with_every_field() {
    let wb = seeded();
    assert_eq!(wb.update_count(), 1);
    assert_eq!(wb.last_update().len(), 12);
    for key in OptionKey::ALL {
        assert!(wb.last_update().contains(&key), "{key} missing");
    }
}

#[test]
fn setters_round_trip() {
    let mut wb = seeded();
    let scheme = ColorScheme::with_contrast("#3366cc", "rgba(0, 0, 0, 0.5)", 0.15);
    let pattern = Pattern::predefined(PatternName::Dotted, 6.0, 0.25);
    let scale = Scale {
        divisions: 4,
        size: 0.3,
    };

    wb.set_width(320)
        .unwrap()
        .set_height(240)
        .unwrap()
        .set_value(64)
        .unwrap()
        .set_stroke_width(2.5)
        .unwrap()
        .set_clip_edges(false)
        .unwrap()
        .set_water_color_scheme(scheme.clone())
        .unwrap()
        .set_front_pattern(Some(pattern.clone()))
        .unwrap()
        .set_scale(Some(scale))
        .unwrap();

    assert_eq!(wb.width(), 320);
    assert_eq!(wb.height(), 240);
    assert_eq!(wb.value(), 64);
    assert_eq!(wb.stroke_width(), 2.5);
    assert!(!wb.clip_edges());
    assert_eq!(wb.water_color_scheme(), &scheme);
    assert_eq!(wb.front_pattern(), Some(&pattern));
    assert_eq!(wb.scale(), Some(scale));
    assert_eq!(
        wb.get(OptionKey::Value),
        Some(OptionValue::Number(64.0))
    );
}

#[test]
fn optional_fields_can_be_cleared() {
    let mut wb = seeded();
    wb.clear(OptionKey::FrontColorScheme)
        .unwrap()
        .clear(OptionKey::Scale)
        .unwrap();
    assert!(wb.front_color_scheme().is_none());
    assert_eq!(wb.get(OptionKey::Scale), None);
}

#[test]
fn required_fields_cannot_be_cleared() {
    let mut wb = seeded();
    let err = wb.clear(OptionKey::BackColorScheme).unwrap_err();
    assert!(matches!(err, WaterboxError::Required { .. }));
    assert_eq!(err.option_key(), Some("backColorScheme"));
    assert_eq!(wb.back_color_scheme(), &Options::default().back_color_scheme);
}

#[test]
fn value_bounds() {
    let mut wb = seeded();
    for ok in [0.0, 100.0, 50.0] {
        wb.set(OptionKey::Value, OptionValue::Number(ok)).unwrap();
        assert_eq!(f64::from(wb.value()), ok);
    }

    for bad in [-1.0, 101.0, 50.5] {
        let before = wb.options().clone();
        let err = wb
            .set(OptionKey::Value, OptionValue::Number(bad))
            .unwrap_err();
        assert_eq!(err.option_key(), Some("value"), "{bad}");
        assert_eq!(wb.options(), &before);
    }

    let err = wb.set(OptionKey::Value, OptionValue::Number(50.5)).unwrap_err();
    assert!(err.is_type());
    let err = wb.set(OptionKey::Value, OptionValue::Number(101.0)).unwrap_err();
    assert!(err.is_range());
}

#[test]
fn dimensions_must_be_positive_integers() {
    let mut wb = seeded();
    let err = wb.set_width(0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid width: Invalid dimension: 0. Dimension must be a positive integer."
    );
    assert_eq!(wb.width(), 100);
    assert!(wb.set(OptionKey::Height, OptionValue::Number(12.5)).is_err());
    assert_eq!(wb.height(), 200);
}

#[test]
fn malformed_color_schemes_are_rejected() {
    let mut wb = seeded();
    let before = wb.options().clone();

    let missing_stroke = json!({"waterColorScheme": {"fill": "#fff", "lighter": "#fff", "darker": "#000"}});
    let err = wb.update_json(&missing_stroke).unwrap_err();
    assert!(err.is_shape());
    assert_eq!(err.option_key(), Some("waterColorScheme"));

    let both_shapes = json!({"backColorScheme": {
        "fill": "#fff", "stroke": "#000", "contrast": 0.2, "lighter": "#fff", "darker": "#000"
    }});
    assert!(wb.update_json(&both_shapes).unwrap_err().is_shape());

    let bad_color = ColorScheme::explicit("#fff", "nope", "#fff", "#000");
    assert!(wb.set_back_color_scheme(bad_color).unwrap_err().is_type());

    let bad_contrast = ColorScheme::with_contrast("#fff", "#000", 1.5);
    assert!(wb.set_back_color_scheme(bad_contrast).unwrap_err().is_range());

    assert_eq!(wb.options(), &before);
}

#[test]
fn batches_notify_once_with_all_keys() {
    let mut wb = seeded();
    let changed = wb
        .update(OptionsPatch::new().value(30).stroke_width(3.0))
        .unwrap();
    assert_eq!(changed, vec![OptionKey::Value, OptionKey::StrokeWidth]);
    assert_eq!(wb.update_count(), 2);
    assert_eq!(wb.last_update(), &[OptionKey::Value, OptionKey::StrokeWidth]);
}

#[test]
fn failing_batch_applies_nothing() {
    let mut wb = seeded();
    let before = wb.options().clone();
    let err = wb
        .update(OptionsPatch::new().value(30).width(0))
        .unwrap_err();
    assert_eq!(err.option_key(), Some("width"));
    assert_eq!(wb.options(), &before);
    assert_eq!(wb.update_count(), 1);
}

#[test]
fn invalid_pattern_keeps_previous_pattern() {
    let mut wb = seeded();
    let grid = Pattern::predefined(PatternName::Grid, 8.0, 0.4);
    wb.set_water_pattern(Some(grid.clone())).unwrap();
    let handle = wb.pattern_paint(OptionKey::WaterPattern).cloned();

    let err = wb
        .update_json(&json!({
            "waterPattern": {"type": "predefined", "name": "blocky", "size": -1, "alpha": 0.5}
        }))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid waterPattern: Invalid number: -1. Number must be positive."
    );
    assert_eq!(wb.water_pattern(), Some(&grid));
    assert_eq!(
        wb.pattern_paint(OptionKey::WaterPattern).map(|p| p.tile().clone()),
        handle.map(|p| p.tile().clone())
    );
}

#[test]
fn json_patches_use_camel_case_and_null_clears() {
    let mut wb = seeded();
    let changed = wb
        .update_json(&json!({
            "strokeWidth": 2,
            "clipEdges": false,
            "frontColorScheme": null,
            "backPattern": {"type": "predefined", "name": "checkered", "size": 4, "alpha": 1}
        }))
        .unwrap();
    assert_eq!(changed.len(), 4);
    assert_eq!(wb.stroke_width(), 2.0);
    assert!(!wb.clip_edges());
    assert!(wb.front_color_scheme().is_none());
    assert_eq!(
        wb.back_pattern(),
        Some(&Pattern::predefined(PatternName::Checkered, 4.0, 1.0))
    );

    let err = wb.update_json(&json!({"colour": "red"})).unwrap_err();
    assert!(err.is_shape());
    let err = wb.update_json(&json!({"value": null})).unwrap_err();
    assert!(matches!(err, WaterboxError::Required { .. }));
    let err = wb
        .update_json(&json!({"backPattern": {"type": "predefined", "name": "plaid", "size": 1, "alpha": 1}}))
        .unwrap_err();
    assert!(err.is_range());
}

#[test]
fn set_options_replaces_everything() {
    let mut wb = seeded();
    let options = Options {
        width: 50,
        height: 50,
        front_color_scheme: None,
        scale: None,
        ..Options::default()
    };
    wb.set_options(&options).unwrap();
    assert_eq!(wb.options(), &options);
    assert_eq!(wb.last_update().len(), 12);
    assert_eq!(wb.canvas().width(), 50);
}

#[test]
fn options_serialize_to_documented_json() {
    let v = serde_json::to_value(seeded().options()).unwrap();
    assert_eq!(v["height"], json!(200));
    assert_eq!(v["waterColorScheme"]["fill"], json!("rgba(58, 123, 213, 0.7)"));
    assert_eq!(v["frontColorScheme"]["darker"], json!("rgba(130, 130, 130, 0.2)"));
}
