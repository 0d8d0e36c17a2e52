use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::{Configurable, Patch};
use crate::foundation::error::{WaterboxError, WaterboxResult};
use crate::pattern::PatternCreator;
use crate::validate;

/// Every option that drives a render.
///
/// Instances held by a [`crate::Waterbox`] are always validated; building one by hand does not
/// validate anything until it passes through a [`crate::config::ConfigStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub width: u32,
    pub height: u32,
    /// Fill level in percent, `0..=100`.
    pub value: u8,
    pub stroke_width: f64,
    pub clip_edges: bool,
    pub back_color_scheme: ColorScheme,
    pub water_color_scheme: ColorScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_color_scheme: Option<ColorScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_pattern: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_pattern: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_pattern: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 100,
            height: 200,
            value: 0,
            stroke_width: 1.0,
            clip_edges: true,
            back_color_scheme: ColorScheme::explicit("#1e1e1e", "#000000", "#2a2a2a", "#141414"),
            water_color_scheme: ColorScheme::explicit(
                "rgba(58, 123, 213, 0.7)",
                "rgba(42, 92, 160, 0.7)",
                "rgba(90, 149, 224, 0.7)",
                "rgba(43, 95, 168, 0.7)",
            ),
            front_color_scheme: Some(ColorScheme::explicit(
                "rgba(180, 180, 180, 0.1)",
                "rgba(150, 150, 150, 0.1)",
                "rgba(200, 200, 200, 0.1)",
                "rgba(130, 130, 130, 0.2)",
            )),
            back_pattern: None,
            water_pattern: None,
            front_pattern: None,
            scale: Some(Scale {
                divisions: 10,
                size: 0.5,
            }),
        }
    }
}

impl Options {
    /// The pattern stored under one of the three pattern keys.
    pub fn pattern(&self, key: OptionKey) -> Option<&Pattern> {
        match key {
            OptionKey::BackPattern => self.back_pattern.as_ref(),
            OptionKey::WaterPattern => self.water_pattern.as_ref(),
            OptionKey::FrontPattern => self.front_pattern.as_ref(),
            _ => None,
        }
    }
}

/// Fill/stroke colors of one box part plus how its light and dark shades are obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScheme {
    pub fill: String,
    pub stroke: String,
    #[serde(flatten)]
    pub shades: Shades,
}

impl ColorScheme {
    pub fn explicit(
        fill: impl Into<String>,
        stroke: impl Into<String>,
        lighter: impl Into<String>,
        darker: impl Into<String>,
    ) -> Self {
        Self {
            fill: fill.into(),
            stroke: stroke.into(),
            shades: Shades::Explicit {
                lighter: lighter.into(),
                darker: darker.into(),
            },
        }
    }

    pub fn with_contrast(fill: impl Into<String>, stroke: impl Into<String>, contrast: f64) -> Self {
        Self {
            fill: fill.into(),
            stroke: stroke.into(),
            shades: Shades::Contrast { contrast },
        }
    }
}

/// Exactly one way of obtaining the lighter/darker panel tones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Shades {
    /// Derive both shades from `fill` by shifting lightness by `contrast` (`0..=1`).
    Contrast { contrast: f64 },
    /// Use the given colors verbatim.
    Explicit { lighter: String, darker: String },
}

/// Texture source for a group of faces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Pattern {
    /// Procedurally generated tile.
    Predefined {
        name: PatternName,
        size: f64,
        alpha: f64,
    },
    /// Caller-supplied paint source.
    Custom {
        #[serde(skip)]
        creator: PatternCreator,
    },
}

impl Pattern {
    pub fn predefined(name: PatternName, size: f64, alpha: f64) -> Self {
        Self::Predefined { name, size, alpha }
    }

    pub fn custom(creator: PatternCreator) -> Self {
        Self::Custom { creator }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternName {
    Blocky,
    Noise,
    Dotted,
    Grid,
    Checkered,
    Debug,
}

impl PatternName {
    pub const ALL: [PatternName; 6] = [
        Self::Blocky,
        Self::Noise,
        Self::Dotted,
        Self::Grid,
        Self::Checkered,
        Self::Debug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocky => "blocky",
            Self::Noise => "noise",
            Self::Dotted => "dotted",
            Self::Grid => "grid",
            Self::Checkered => "checkered",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for PatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternName {
    type Err = WaterboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| WaterboxError::range(format!("unknown pattern name: {s}")))
    }
}

/// Scale markings: `divisions - 1` chevrons splitting the height into equal steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub divisions: u32,
    /// Chevron width as a fraction of the diamond width.
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Width,
    Height,
    Value,
    BackColorScheme,
    WaterColorScheme,
    FrontColorScheme,
    BackPattern,
    WaterPattern,
    FrontPattern,
    StrokeWidth,
    Scale,
    ClipEdges,
}

impl OptionKey {
    pub const ALL: [OptionKey; 12] = [
        Self::Width,
        Self::Height,
        Self::Value,
        Self::BackColorScheme,
        Self::WaterColorScheme,
        Self::FrontColorScheme,
        Self::BackPattern,
        Self::WaterPattern,
        Self::FrontPattern,
        Self::StrokeWidth,
        Self::Scale,
        Self::ClipEdges,
    ];

    pub const PATTERNS: [OptionKey; 3] = [Self::BackPattern, Self::WaterPattern, Self::FrontPattern];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Value => "value",
            Self::BackColorScheme => "backColorScheme",
            Self::WaterColorScheme => "waterColorScheme",
            Self::FrontColorScheme => "frontColorScheme",
            Self::BackPattern => "backPattern",
            Self::WaterPattern => "waterPattern",
            Self::FrontPattern => "frontPattern",
            Self::StrokeWidth => "strokeWidth",
            Self::Scale => "scale",
            Self::ClipEdges => "clipEdges",
        }
    }

    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Self::FrontColorScheme
                | Self::BackPattern
                | Self::WaterPattern
                | Self::FrontPattern
                | Self::Scale
        )
    }

    pub fn is_pattern(self) -> bool {
        Self::PATTERNS.contains(&self)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = WaterboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| WaterboxError::shape(format!("Invalid options object: unknown option '{s}'.")))
    }
}

/// Dynamically typed option value.
///
/// Numeric fields travel as `f64` so integrality and bounds are checked by the validators,
/// the same way for typed calls and for JSON input.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Number(f64),
    Bool(bool),
    ColorScheme(ColorScheme),
    Pattern(Pattern),
    Scale(Scale),
}

impl OptionValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::ColorScheme(_) => "color scheme",
            Self::Pattern(_) => "pattern",
            Self::Scale(_) => "scale",
        }
    }
}

fn mismatch(key: OptionKey, value: &OptionValue) -> WaterboxError {
    WaterboxError::type_error(format!(
        "a {} value cannot be stored in {key}",
        value.kind()
    ))
}

impl Configurable for Options {
    type Key = OptionKey;
    type Value = OptionValue;

    fn keys() -> &'static [OptionKey] {
        &OptionKey::ALL
    }

    fn is_optional(key: OptionKey) -> bool {
        key.is_optional()
    }

    fn get(&self, key: OptionKey) -> Option<OptionValue> {
        match key {
            OptionKey::Width => Some(OptionValue::Number(f64::from(self.width))),
            OptionKey::Height => Some(OptionValue::Number(f64::from(self.height))),
            OptionKey::Value => Some(OptionValue::Number(f64::from(self.value))),
            OptionKey::StrokeWidth => Some(OptionValue::Number(self.stroke_width)),
            OptionKey::ClipEdges => Some(OptionValue::Bool(self.clip_edges)),
            OptionKey::BackColorScheme => {
                Some(OptionValue::ColorScheme(self.back_color_scheme.clone()))
            }
            OptionKey::WaterColorScheme => {
                Some(OptionValue::ColorScheme(self.water_color_scheme.clone()))
            }
            OptionKey::FrontColorScheme => self
                .front_color_scheme
                .clone()
                .map(OptionValue::ColorScheme),
            OptionKey::BackPattern | OptionKey::WaterPattern | OptionKey::FrontPattern => {
                self.pattern(key).cloned().map(OptionValue::Pattern)
            }
            OptionKey::Scale => self.scale.map(OptionValue::Scale),
        }
    }

    fn validate(key: OptionKey, value: OptionValue) -> WaterboxResult<OptionValue> {
        match (key, value) {
            (OptionKey::Width | OptionKey::Height, OptionValue::Number(n)) => {
                validate::validate_dimension(n).map(|d| OptionValue::Number(f64::from(d)))
            }
            (OptionKey::Value, OptionValue::Number(n)) => {
                validate::validate_value(n).map(|v| OptionValue::Number(f64::from(v)))
            }
            (OptionKey::StrokeWidth, OptionValue::Number(n)) => {
                validate::validate_stroke_width(n).map(OptionValue::Number)
            }
            (OptionKey::ClipEdges, v @ OptionValue::Bool(_)) => Ok(v),
            (
                OptionKey::BackColorScheme
                | OptionKey::WaterColorScheme
                | OptionKey::FrontColorScheme,
                OptionValue::ColorScheme(scheme),
            ) => validate::validate_color_scheme(&scheme).map(OptionValue::ColorScheme),
            (
                OptionKey::BackPattern | OptionKey::WaterPattern | OptionKey::FrontPattern,
                OptionValue::Pattern(pattern),
            ) => validate::validate_pattern(&pattern).map(OptionValue::Pattern),
            (OptionKey::Scale, OptionValue::Scale(scale)) => {
                validate::validate_scale(&scale).map(OptionValue::Scale)
            }
            (key, value) => Err(mismatch(key, &value)),
        }
    }

    fn apply(&mut self, key: OptionKey, value: Option<OptionValue>) -> WaterboxResult<()> {
        match (key, value) {
            (OptionKey::Width, Some(OptionValue::Number(n))) => self.width = n as u32,
            (OptionKey::Height, Some(OptionValue::Number(n))) => self.height = n as u32,
            (OptionKey::Value, Some(OptionValue::Number(n))) => self.value = n as u8,
            (OptionKey::StrokeWidth, Some(OptionValue::Number(n))) => self.stroke_width = n,
            (OptionKey::ClipEdges, Some(OptionValue::Bool(b))) => self.clip_edges = b,
            (OptionKey::BackColorScheme, Some(OptionValue::ColorScheme(s))) => {
                self.back_color_scheme = s
            }
            (OptionKey::WaterColorScheme, Some(OptionValue::ColorScheme(s))) => {
                self.water_color_scheme = s
            }
            (OptionKey::FrontColorScheme, Some(OptionValue::ColorScheme(s))) => {
                self.front_color_scheme = Some(s)
            }
            (OptionKey::FrontColorScheme, None) => self.front_color_scheme = None,
            (OptionKey::BackPattern, p) => self.back_pattern = pattern_slot(key, p)?,
            (OptionKey::WaterPattern, p) => self.water_pattern = pattern_slot(key, p)?,
            (OptionKey::FrontPattern, p) => self.front_pattern = pattern_slot(key, p)?,
            (OptionKey::Scale, Some(OptionValue::Scale(s))) => self.scale = Some(s),
            (OptionKey::Scale, None) => self.scale = None,
            (key, None) => return Err(WaterboxError::required(key.as_str())),
            (key, Some(value)) => return Err(mismatch(key, &value)),
        }
        Ok(())
    }
}

fn pattern_slot(key: OptionKey, value: Option<OptionValue>) -> WaterboxResult<Option<Pattern>> {
    match value {
        None => Ok(None),
        Some(OptionValue::Pattern(p)) => Ok(Some(p)),
        Some(other) => Err(mismatch(key, &other)),
    }
}

/// A batch of option mutations.
pub type OptionsPatch = Patch<Options>;

impl Patch<Options> {
    pub fn width(self, width: u32) -> Self {
        self.set(OptionKey::Width, OptionValue::Number(f64::from(width)))
    }

    pub fn height(self, height: u32) -> Self {
        self.set(OptionKey::Height, OptionValue::Number(f64::from(height)))
    }

    pub fn value(self, value: u8) -> Self {
        self.set(OptionKey::Value, OptionValue::Number(f64::from(value)))
    }

    pub fn stroke_width(self, stroke_width: f64) -> Self {
        self.set(OptionKey::StrokeWidth, OptionValue::Number(stroke_width))
    }

    pub fn clip_edges(self, clip: bool) -> Self {
        self.set(OptionKey::ClipEdges, OptionValue::Bool(clip))
    }

    pub fn back_color_scheme(self, scheme: ColorScheme) -> Self {
        self.set(OptionKey::BackColorScheme, OptionValue::ColorScheme(scheme))
    }

    pub fn water_color_scheme(self, scheme: ColorScheme) -> Self {
        self.set(OptionKey::WaterColorScheme, OptionValue::ColorScheme(scheme))
    }

    pub fn front_color_scheme(self, scheme: Option<ColorScheme>) -> Self {
        self.entry(
            OptionKey::FrontColorScheme,
            scheme.map(OptionValue::ColorScheme),
        )
    }

    pub fn back_pattern(self, pattern: Option<Pattern>) -> Self {
        self.entry(OptionKey::BackPattern, pattern.map(OptionValue::Pattern))
    }

    pub fn water_pattern(self, pattern: Option<Pattern>) -> Self {
        self.entry(OptionKey::WaterPattern, pattern.map(OptionValue::Pattern))
    }

    pub fn front_pattern(self, pattern: Option<Pattern>) -> Self {
        self.entry(OptionKey::FrontPattern, pattern.map(OptionValue::Pattern))
    }

    pub fn scale(self, scale: Option<Scale>) -> Self {
        self.entry(OptionKey::Scale, scale.map(OptionValue::Scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_round_trip_through_names() {
        for key in OptionKey::ALL {
            assert_eq!(key.as_str().parse::<OptionKey>().unwrap(), key);
        }
        assert!("colour".parse::<OptionKey>().unwrap_err().is_shape());
    }

    #[test]
    fn optionality_matches_field_types() {
        let optional: Vec<_> = OptionKey::ALL
            .into_iter()
            .filter(|k| k.is_optional())
            .collect();
        assert_eq!(
            optional,
            vec![
                OptionKey::FrontColorScheme,
                OptionKey::BackPattern,
                OptionKey::WaterPattern,
                OptionKey::FrontPattern,
                OptionKey::Scale,
            ]
        );
    }

    #[test]
    fn defaults_serialize_in_camel_case() {
        let v = serde_json::to_value(Options::default()).unwrap();
        assert_eq!(v["width"], json!(100));
        assert_eq!(v["strokeWidth"], json!(1.0));
        assert_eq!(v["clipEdges"], json!(true));
        assert_eq!(v["backColorScheme"]["lighter"], json!("#2a2a2a"));
        assert_eq!(v["scale"], json!({"divisions": 10, "size": 0.5}));
        assert!(v.get("backPattern").is_none());
    }

    #[test]
    fn patterns_serialize_with_type_tag() {
        let p = Pattern::predefined(PatternName::Grid, 10.0, 0.5);
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"type": "predefined", "name": "grid", "size": 10.0, "alpha": 0.5})
        );
        let scheme = ColorScheme::with_contrast("#fff", "#000", 0.2);
        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            json!({"fill": "#fff", "stroke": "#000", "contrast": 0.2})
        );
    }

    #[test]
    fn mismatched_value_kind_is_a_type_error() {
        let err = Options::validate(OptionKey::Width, OptionValue::Bool(true)).unwrap_err();
        assert!(err.is_type());
    }

    #[test]
    fn typed_patch_builders_set_keys() {
        let patch = OptionsPatch::new().width(10).height(20).front_pattern(None);
        let keys: Vec<_> = patch.keys().collect();
        assert_eq!(
            keys,
            vec![OptionKey::Width, OptionKey::Height, OptionKey::FrontPattern]
        );
    }
}
