//! Option validators.
//!
//! Two layers:
//!
//! - `validate_*` check typed values (bounds, integrality, color syntax) and return the value to
//!   store;
//! - `parse_*` turn untrusted JSON into typed values, rejecting anything whose shape does not
//!   match a known option exactly (missing keys, extra keys, wrong primitive kinds).
//!
//! JSON input goes through both: [`parse_patch`] produces a patch and the config store runs the
//! typed validators on it.

use serde_json::{Map, Value};

use crate::color::Color;
use crate::foundation::error::{WaterboxError, WaterboxResult};
use crate::options::{
    ColorScheme, OptionKey, OptionValue, OptionsPatch, Pattern, PatternName, Scale, Shades,
};

/// Numeric requirement with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRule {
    integer: bool,
    positive: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberRule {
    /// Any finite real.
    pub const fn real() -> Self {
        Self {
            integer: false,
            positive: false,
            min: None,
            max: None,
        }
    }

    /// Any finite integer.
    pub const fn integer() -> Self {
        Self {
            integer: true,
            ..Self::real()
        }
    }

    /// Strictly greater than zero.
    pub const fn positive(self) -> Self {
        Self {
            positive: true,
            ..self
        }
    }

    pub const fn min(self, min: f64) -> Self {
        Self {
            min: Some(min),
            ..self
        }
    }

    pub const fn max(self, max: f64) -> Self {
        Self {
            max: Some(max),
            ..self
        }
    }

    fn requirement(self) -> String {
        let noun = if self.integer { "an integer" } else { "a number" };
        match (self.positive, self.min, self.max) {
            (true, _, _) if self.integer => "a positive integer".to_owned(),
            (true, _, _) => "positive".to_owned(),
            (false, Some(lo), Some(hi)) => format!("{noun} between {lo} and {hi}"),
            (false, Some(lo), None) => format!("{noun} of at least {lo}"),
            (false, None, Some(hi)) => format!("{noun} of at most {hi}"),
            (false, None, None) => {
                if self.integer {
                    "an integer".to_owned()
                } else {
                    "a finite number".to_owned()
                }
            }
        }
    }

    /// Check `v`, naming it `subject` in the error message.
    ///
    /// Non-finite or fractional (for integer rules) values are type errors; values outside the
    /// bounds are range errors.
    pub fn check(self, v: f64, subject: &str) -> WaterboxResult<f64> {
        let message = || {
            format!(
                "Invalid {subject}: {v}. {} must be {}.",
                capitalize(subject),
                self.requirement()
            )
        };

        if !v.is_finite() || (self.integer && v.fract() != 0.0) {
            return Err(WaterboxError::type_error(message()));
        }
        let below = (self.positive && v <= 0.0) || self.min.is_some_and(|lo| v < lo);
        let above = self.max.is_some_and(|hi| v > hi);
        if below || above {
            return Err(WaterboxError::range(message()));
        }
        Ok(v)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn validate_dimension(v: f64) -> WaterboxResult<u32> {
    let v = NumberRule::integer().positive().check(v, "dimension")?;
    if v > f64::from(u32::MAX) {
        return Err(WaterboxError::range(format!(
            "Invalid dimension: {v}. Dimension must be at most {}.",
            u32::MAX
        )));
    }
    Ok(v as u32)
}

pub fn validate_value(v: f64) -> WaterboxResult<u8> {
    NumberRule::integer()
        .min(0.0)
        .max(100.0)
        .check(v, "value")
        .map(|v| v as u8)
}

pub fn validate_stroke_width(v: f64) -> WaterboxResult<f64> {
    NumberRule::real().positive().check(v, "stroke width")
}

pub fn validate_color(s: &str) -> WaterboxResult<Color> {
    Color::parse(s)
}

pub fn validate_color_scheme(scheme: &ColorScheme) -> WaterboxResult<ColorScheme> {
    validate_color(&scheme.fill)?;
    validate_color(&scheme.stroke)?;
    match &scheme.shades {
        Shades::Contrast { contrast } => {
            NumberRule::real().min(0.0).max(1.0).check(*contrast, "contrast")?;
        }
        Shades::Explicit { lighter, darker } => {
            validate_color(lighter)?;
            validate_color(darker)?;
        }
    }
    Ok(scheme.clone())
}

pub fn validate_pattern(pattern: &Pattern) -> WaterboxResult<Pattern> {
    if let Pattern::Predefined { size, alpha, .. } = pattern {
        NumberRule::real().positive().check(*size, "number")?;
        NumberRule::real().min(0.0).max(1.0).check(*alpha, "alpha")?;
    }
    Ok(pattern.clone())
}

pub fn validate_scale(scale: &Scale) -> WaterboxResult<Scale> {
    NumberRule::integer()
        .min(2.0)
        .check(f64::from(scale.divisions), "divisions")?;
    NumberRule::real().min(0.0).max(1.0).check(scale.size, "size")?;
    Ok(*scale)
}

/// Parse a JSON object of options into a patch. `null` clears a field.
pub fn parse_patch(json: &Value) -> WaterboxResult<OptionsPatch> {
    let obj = expect_object(json, "options")?;
    let mut patch = OptionsPatch::new();
    for (name, value) in obj {
        let key: OptionKey = name.parse()?;
        if value.is_null() {
            patch = patch.clear(key);
            continue;
        }
        let value = parse_value(key, value).map_err(|e| e.for_option(key.as_str()))?;
        patch = patch.set(key, value);
    }
    Ok(patch)
}

/// Parse the JSON representation of a single option.
pub fn parse_value(key: OptionKey, json: &Value) -> WaterboxResult<OptionValue> {
    match key {
        OptionKey::Width | OptionKey::Height | OptionKey::Value | OptionKey::StrokeWidth => {
            parse_number(json).map(OptionValue::Number)
        }
        OptionKey::ClipEdges => parse_bool(json).map(OptionValue::Bool),
        OptionKey::BackColorScheme | OptionKey::WaterColorScheme | OptionKey::FrontColorScheme => {
            parse_color_scheme(json).map(OptionValue::ColorScheme)
        }
        OptionKey::BackPattern | OptionKey::WaterPattern | OptionKey::FrontPattern => {
            parse_pattern(json).map(OptionValue::Pattern)
        }
        OptionKey::Scale => parse_scale(json).map(OptionValue::Scale),
    }
}

pub fn parse_color_scheme(json: &Value) -> WaterboxResult<ColorScheme> {
    let obj = expect_object(json, "color scheme")?;
    let shades = if obj.contains_key("contrast") {
        exact_keys(obj, &["fill", "stroke", "contrast"], "color scheme")?;
        Shades::Contrast {
            contrast: parse_number(&obj["contrast"])?,
        }
    } else {
        exact_keys(obj, &["fill", "stroke", "lighter", "darker"], "color scheme")?;
        Shades::Explicit {
            lighter: parse_string(&obj["lighter"])?,
            darker: parse_string(&obj["darker"])?,
        }
    };
    Ok(ColorScheme {
        fill: parse_string(&obj["fill"])?,
        stroke: parse_string(&obj["stroke"])?,
        shades,
    })
}

pub fn parse_pattern(json: &Value) -> WaterboxResult<Pattern> {
    let obj = expect_object(json, "pattern")?;
    let kind = match obj.get("type") {
        Some(t) => parse_string(t)?,
        None => return Err(WaterboxError::shape("Invalid pattern object: missing key 'type'.")),
    };
    match kind.as_str() {
        "predefined" => {
            exact_keys(obj, &["type", "name", "size", "alpha"], "pattern")?;
            let name: PatternName = parse_string(&obj["name"])?.parse()?;
            Ok(Pattern::Predefined {
                name,
                size: parse_number(&obj["size"])?,
                alpha: parse_number(&obj["alpha"])?,
            })
        }
        "custom" => {
            exact_keys(obj, &["type", "creator"], "pattern")?;
            Err(WaterboxError::type_error(
                "Invalid pattern creator. Creator must be a function.",
            ))
        }
        other => Err(WaterboxError::shape(format!(
            "Invalid pattern object: unknown type '{other}'."
        ))),
    }
}

pub fn parse_scale(json: &Value) -> WaterboxResult<Scale> {
    let obj = expect_object(json, "scale")?;
    exact_keys(obj, &["divisions", "size"], "scale")?;
    let divisions = NumberRule::integer()
        .min(2.0)
        .max(f64::from(u32::MAX))
        .check(parse_number(&obj["divisions"])?, "divisions")?;
    Ok(Scale {
        divisions: divisions as u32,
        size: parse_number(&obj["size"])?,
    })
}

fn expect_object<'a>(json: &'a Value, name: &str) -> WaterboxResult<&'a Map<String, Value>> {
    json.as_object()
        .ok_or_else(|| WaterboxError::shape(format!("Invalid {name} object.")))
}

/// Reject `obj` unless its key set is exactly `keys`.
fn exact_keys(obj: &Map<String, Value>, keys: &[&str], name: &str) -> WaterboxResult<()> {
    if let Some(missing) = keys.iter().find(|k| !obj.contains_key(**k)) {
        return Err(WaterboxError::shape(format!(
            "Invalid {name} object: missing key '{missing}'."
        )));
    }
    if let Some(extra) = obj.keys().find(|k| !keys.contains(&k.as_str())) {
        return Err(WaterboxError::shape(format!(
            "Invalid {name} object: unexpected key '{extra}'."
        )));
    }
    Ok(())
}

fn parse_number(json: &Value) -> WaterboxResult<f64> {
    json.as_f64().ok_or_else(|| {
        WaterboxError::type_error(format!("Invalid number: {json}. Value must be a number."))
    })
}

fn parse_bool(json: &Value) -> WaterboxResult<bool> {
    json.as_bool()
        .ok_or_else(|| WaterboxError::type_error(format!("Invalid boolean value: {json}.")))
}

fn parse_string(json: &Value) -> WaterboxResult<String> {
    json.as_str().map(str::to_owned).ok_or_else(|| {
        WaterboxError::type_error(format!(
            "Invalid string value: {json}. Value must be a string."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dimension_must_be_positive_integer() {
        assert_eq!(validate_dimension(500.0).unwrap(), 500);
        let err = validate_dimension(0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid dimension: 0. Dimension must be a positive integer."
        );
        assert!(err.is_range());
        assert!(validate_dimension(10.5).unwrap_err().is_type());
        assert!(validate_dimension(f64::NAN).unwrap_err().is_type());
    }

    #[test]
    fn value_bounds_are_inclusive() {
        for ok in [0.0, 50.0, 100.0] {
            assert_eq!(f64::from(validate_value(ok).unwrap()), ok);
        }
        assert!(validate_value(-1.0).unwrap_err().is_range());
        assert!(validate_value(101.0).unwrap_err().is_range());
        assert!(validate_value(50.5).unwrap_err().is_type());
    }

    #[test]
    fn stroke_width_accepts_positive_reals() {
        assert_eq!(validate_stroke_width(0.5).unwrap(), 0.5);
        assert!(validate_stroke_width(0.0).is_err());
        assert!(validate_stroke_width(f64::INFINITY).is_err());
    }

    #[test]
    fn predefined_pattern_size_must_be_positive() {
        let err = validate_pattern(&Pattern::predefined(PatternName::Blocky, -1.0, 0.5))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid number: -1. Number must be positive.");
        assert!(validate_pattern(&Pattern::predefined(PatternName::Blocky, 1.0, 1.5)).is_err());
        assert!(validate_pattern(&Pattern::predefined(PatternName::Blocky, 1.0, 0.0)).is_ok());
    }

    #[test]
    fn scale_needs_two_divisions() {
        assert!(validate_scale(&Scale { divisions: 2, size: 0.0 }).is_ok());
        assert!(validate_scale(&Scale { divisions: 1, size: 0.5 }).unwrap_err().is_range());
        assert!(validate_scale(&Scale { divisions: 4, size: 1.5 }).is_err());
    }

    #[test]
    fn color_scheme_checks_every_color() {
        let ok = ColorScheme::with_contrast("#123456", "black", 0.3);
        assert_eq!(validate_color_scheme(&ok).unwrap(), ok);
        let bad = ColorScheme::explicit("#123456", "black", "#fff", "nope");
        assert!(validate_color_scheme(&bad).unwrap_err().is_type());
        let bad = ColorScheme::with_contrast("#123456", "black", 1.2);
        assert!(validate_color_scheme(&bad).unwrap_err().is_range());
    }

    #[test]
    fn color_scheme_shape_is_exact() {
        let missing_stroke = json!({"fill": "#fff", "contrast": 0.2});
        assert!(parse_color_scheme(&missing_stroke).unwrap_err().is_shape());

        let both = json!({
            "fill": "#fff", "stroke": "#000", "contrast": 0.2, "lighter": "#fff", "darker": "#000"
        });
        assert!(parse_color_scheme(&both).unwrap_err().is_shape());

        let half = json!({"fill": "#fff", "stroke": "#000", "lighter": "#fff"});
        assert!(parse_color_scheme(&half).unwrap_err().is_shape());

        assert!(parse_color_scheme(&json!("#fff")).unwrap_err().is_shape());
        assert!(parse_color_scheme(&json!({"fill": 1, "stroke": "#000", "contrast": 0.1}))
            .unwrap_err()
            .is_type());

        let scheme = parse_color_scheme(&json!({"fill": "#fff", "stroke": "#000", "contrast": 0.2}))
            .unwrap();
        assert_eq!(scheme, ColorScheme::with_contrast("#fff", "#000", 0.2));
    }

    #[test]
    fn pattern_shapes() {
        let p = parse_pattern(&json!({"type": "predefined", "name": "dotted", "size": 4, "alpha": 0.3}))
            .unwrap();
        assert_eq!(p, Pattern::predefined(PatternName::Dotted, 4.0, 0.3));

        let extra = json!({"type": "predefined", "name": "dotted", "size": 4, "alpha": 0.3, "x": 1});
        assert!(parse_pattern(&extra).unwrap_err().is_shape());

        let unknown = json!({"type": "predefined", "name": "plaid", "size": 4, "alpha": 0.3});
        assert!(parse_pattern(&unknown)
            .unwrap_err()
            .to_string()
            .contains("unknown pattern name: plaid"));

        let custom = json!({"type": "custom", "creator": "fn"});
        assert!(parse_pattern(&custom).unwrap_err().is_type());

        assert!(parse_pattern(&json!({"name": "grid"})).unwrap_err().is_shape());
    }

    #[test]
    fn patch_parsing_prefixes_field_errors() {
        let patch = parse_patch(&json!({"width": 10, "frontPattern": null})).unwrap();
        let keys: Vec<_> = patch.keys().collect();
        assert_eq!(keys, vec![OptionKey::Width, OptionKey::FrontPattern]);

        let err = parse_patch(&json!({"clipEdges": "yes"})).unwrap_err();
        assert_eq!(err.option_key(), Some("clipEdges"));
        assert!(err.is_type());

        assert!(parse_patch(&json!({"depth": 3})).unwrap_err().is_shape());
        assert!(parse_patch(&json!([1, 2])).unwrap_err().is_shape());
    }

    #[test]
    fn scale_json_requires_integer_divisions() {
        assert_eq!(
            parse_scale(&json!({"divisions": 4, "size": 0.25})).unwrap(),
            Scale { divisions: 4, size: 0.25 }
        );
        assert!(parse_scale(&json!({"divisions": 4.5, "size": 0.25})).unwrap_err().is_type());
        assert!(parse_scale(&json!({"divisions": 4})).unwrap_err().is_shape());
        let err = parse_scale(&json!({"divisions": -3, "size": 0.25})).unwrap_err();
        assert!(err.is_range());
        assert!(err.to_string().contains("between 2 and"), "{err}");
    }
}
