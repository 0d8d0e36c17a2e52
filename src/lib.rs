//! Waterbox renders an isometric liquid-fill container.
//!
//! The fill level, colors, textures and scale markings are driven by a small set of validated
//! options:
//!
//! - Build a [`Waterbox`] (defaults or your own [`Options`])
//! - Mutate options field by field, in batches ([`OptionsPatch`]) or from JSON
//! - Call [`Waterbox::render`] and read the pixels back as a [`FrameRGBA`]
#![forbid(unsafe_code)]

mod foundation;

/// CSS colors and shade derivation.
pub mod color;
/// Generic validate, diff and notify store.
pub mod config;
/// Typed options, patches and defaults.
pub mod options;
/// Procedural textures.
pub mod pattern;
/// Geometry, rasterization and compositing.
pub mod render;
/// Per-kind validators and JSON boundary parsing.
pub mod validate;
mod waterbox;

pub use crate::foundation::core::{Affine, Area, BezPath, Point, Size, Vec2};
pub use crate::foundation::error::{WaterboxError, WaterboxResult};

pub use crate::color::Color;
pub use crate::config::{ConfigStore, Configurable, NoopListener, Patch, UpdateListener};
pub use crate::options::{
    ColorScheme, OptionKey, OptionValue, Options, OptionsPatch, Pattern, PatternName, Scale,
    Shades,
};
pub use crate::pattern::{PatternContext, PatternCreator, PatternFactory, PatternPaint, Repetition};
pub use crate::render::composite::BlendMode;
pub use crate::render::geometry::FrameLayout;
pub use crate::render::surface::{Canvas, FrameRGBA};
pub use crate::waterbox::Waterbox;
