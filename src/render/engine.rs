//! Frame painter.
//!
//! A frame is painted in up to three groups (back, water, front) onto the work buffer, then
//! copied to the output. Each group fills its faces with tri-toned panels and then strokes all
//! of its outlines in a single edge pass on the scratch buffer.

use crate::color::Color;
use crate::foundation::core::BezPath;
use crate::foundation::error::WaterboxResult;
use crate::options::{ColorScheme, Options, Shades};
use crate::pattern::PatternPaint;
use crate::render::composite::BlendMode;
use crate::render::geometry::{FacePath, FrameLayout};
use crate::render::paint::{Paint, PaintCommand, Painter, StrokeStyle};
use crate::render::surface::Canvas;

/// Resolved colors of one scheme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelColors {
    pub fill: Color,
    pub lighter: Color,
    pub darker: Color,
    pub stroke: Color,
}

impl PanelColors {
    /// Tones for bottom diamond, left back wall, right back wall.
    pub fn back_tones(&self) -> [Color; 3] {
        [self.fill, self.lighter, self.darker]
    }

    /// Tones for left wall, right wall, top diamond.
    pub fn front_tones(&self) -> [Color; 3] {
        [self.darker, self.lighter, self.fill]
    }
}

/// Resolve a scheme's shades, deriving them from `fill` when only a contrast is given.
pub fn get_colors(scheme: &ColorScheme) -> WaterboxResult<PanelColors> {
    let fill = Color::parse(&scheme.fill)?;
    let stroke = Color::parse(&scheme.stroke)?;
    let (lighter, darker) = match &scheme.shades {
        Shades::Contrast { contrast } => (fill.lighten(*contrast), fill.darken(*contrast)),
        Shades::Explicit { lighter, darker } => (Color::parse(lighter)?, Color::parse(darker)?),
    };
    Ok(PanelColors {
        fill,
        lighter,
        darker,
        stroke,
    })
}

/// Pattern handles for the three face groups.
#[derive(Clone, Copy, Debug, Default)]
pub struct FramePatterns<'a> {
    pub back: Option<&'a PatternPaint>,
    pub water: Option<&'a PatternPaint>,
    pub front: Option<&'a PatternPaint>,
}

/// The three canvases a frame is painted with. All must share the options' size.
#[derive(Debug)]
pub struct FrameSurfaces<'a> {
    pub output: &'a mut Canvas,
    pub work: &'a mut Canvas,
    pub scratch: &'a mut Canvas,
}

struct Group<'a> {
    faces: &'a [FacePath],
    separators: &'a [BezPath],
    tones: [Color; 3],
    stroke: Color,
    pattern: Option<&'a PatternPaint>,
}

#[tracing::instrument(
    skip_all,
    fields(width = options.width, height = options.height, value = options.value)
)]
pub fn render_frame(
    options: &Options,
    patterns: FramePatterns<'_>,
    surfaces: FrameSurfaces<'_>,
    painter: &mut Painter,
) -> WaterboxResult<()> {
    let FrameSurfaces {
        output,
        work,
        scratch,
    } = surfaces;
    let layout = FrameLayout::new(options.width, options.height, options.stroke_width);
    let edges = EdgeStyle {
        width: options.stroke_width,
        clip: options.clip_edges,
    };

    work.clear();

    let back = get_colors(&options.back_color_scheme)?;
    let separators = options
        .scale
        .as_ref()
        .map(|scale| layout.separators(scale))
        .unwrap_or_default();
    paint_group(
        painter,
        work,
        scratch,
        &Group {
            faces: &layout.back_faces(),
            separators: &separators,
            tones: back.back_tones(),
            stroke: back.stroke,
            pattern: patterns.back,
        },
        edges,
    )?;

    if options.value > 0 {
        let water = get_colors(&options.water_color_scheme)?;
        paint_group(
            painter,
            work,
            scratch,
            &Group {
                faces: &layout.water_faces(options.value),
                separators: &[],
                tones: water.front_tones(),
                stroke: water.stroke,
                pattern: patterns.water,
            },
            edges,
        )?;
    }

    if let Some(scheme) = &options.front_color_scheme {
        let front = get_colors(scheme)?;
        paint_group(
            painter,
            work,
            scratch,
            &Group {
                faces: &layout.front_faces(),
                separators: &[],
                tones: front.front_tones(),
                stroke: front.stroke,
                pattern: patterns.front,
            },
            edges,
        )?;
    }

    output.clear();
    painter.draw_canvas(output, work, BlendMode::SourceOver)
}

#[derive(Clone, Copy, Debug)]
struct EdgeStyle {
    width: f64,
    clip: bool,
}

fn paint_group(
    painter: &mut Painter,
    target: &mut Canvas,
    scratch: &mut Canvas,
    group: &Group<'_>,
    edges: EdgeStyle,
) -> WaterboxResult<()> {
    for (face, tone) in group.faces.iter().zip(group.tones) {
        paint_filling(painter, target, scratch, face, tone, group.pattern)?;
    }

    let outlines = group
        .faces
        .iter()
        .map(|f| &f.path)
        .chain(group.separators.iter());
    paint_edges(painter, target, scratch, outlines, group.stroke, edges.width, edges.clip)
}

/// Fill one panel with its tone, overlaying `pattern` when present.
pub fn paint_filling(
    painter: &mut Painter,
    target: &mut Canvas,
    scratch: &mut Canvas,
    face: &FacePath,
    tone: Color,
    pattern: Option<&PatternPaint>,
) -> WaterboxResult<()> {
    let Some(pattern) = pattern else {
        return painter.draw(
            target,
            &PaintCommand::fill(face.path.clone(), Paint::Solid(tone)),
        );
    };

    scratch.clear();
    painter.draw(
        scratch,
        &PaintCommand::fill(face.path.clone(), Paint::Solid(tone)),
    )?;
    painter.draw(
        scratch,
        &PaintCommand::fill(
            face.path.clone(),
            Paint::Pattern {
                pattern: pattern.clone(),
                transform: face.paint_transform,
            },
        )
        .with_blend(BlendMode::Overlay),
    )?;
    painter.draw_canvas(target, scratch, BlendMode::SourceOver)
}

/// Stroke every outline once.
///
/// With `clip` set, the strokes are collected on `scratch` and then erase the target beneath
/// them by the stroke color's alpha instead of being drawn over it.
pub fn paint_edges<'p>(
    painter: &mut Painter,
    target: &mut Canvas,
    scratch: &mut Canvas,
    outlines: impl IntoIterator<Item = &'p BezPath>,
    stroke: Color,
    width: f64,
    clip: bool,
) -> WaterboxResult<()> {
    scratch.clear();

    let style = StrokeStyle::round(width);
    let line = if clip {
        Color::BLACK.with_alpha(stroke.alpha())
    } else {
        stroke
    };

    for path in outlines {
        painter.draw(
            scratch,
            &PaintCommand::stroke(path.clone(), style, Paint::Solid(Color::BLACK))
                .with_blend(BlendMode::DestinationOut),
        )?;
        painter.draw(
            scratch,
            &PaintCommand::stroke(path.clone(), style, Paint::Solid(line)),
        )?;
    }

    let blend = if clip {
        BlendMode::DestinationOut
    } else {
        BlendMode::SourceOver
    };
    painter.draw_canvas(target, scratch, blend)
}
