//! Immutable paint commands and the painter that executes them.
//!
//! A command carries everything a draw needs: geometry, paint source and blend mode. The
//! [`Painter`] keeps only reusable scratch memory, so no drawing state leaks from one command
//! to the next.

use crate::color::Color;
use crate::foundation::core::{Affine, BezPath, Point};
use crate::foundation::error::WaterboxResult;
use crate::pattern::PatternPaint;
use crate::render::composite::{self, BlendMode};
use crate::render::raster::Rasterizer;
use crate::render::surface::Canvas;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeCap {
    /// Butt caps, miter joins.
    Butt,
    /// Round caps, round joins.
    Round,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: StrokeCap,
}

impl StrokeStyle {
    pub fn round(width: f64) -> Self {
        Self {
            width,
            cap: StrokeCap::Round,
        }
    }

    pub fn butt(width: f64) -> Self {
        Self {
            width,
            cap: StrokeCap::Butt,
        }
    }
}

/// Device-space shape to cover.
#[derive(Clone, Debug)]
pub enum Geometry {
    Fill(BezPath),
    Stroke { path: BezPath, style: StrokeStyle },
}

/// Where source pixels come from.
#[derive(Clone, Debug)]
pub enum Paint {
    Solid(Color),
    /// Repeating texture; `transform` maps pattern space to device space.
    Pattern {
        pattern: PatternPaint,
        transform: Affine,
    },
}

#[derive(Clone, Debug)]
pub struct PaintCommand {
    pub geometry: Geometry,
    pub paint: Paint,
    pub blend: BlendMode,
}

impl PaintCommand {
    pub fn fill(path: BezPath, paint: Paint) -> Self {
        Self {
            geometry: Geometry::Fill(path),
            paint,
            blend: BlendMode::SourceOver,
        }
    }

    pub fn stroke(path: BezPath, style: StrokeStyle, paint: Paint) -> Self {
        Self {
            geometry: Geometry::Stroke { path, style },
            paint,
            blend: BlendMode::SourceOver,
        }
    }

    pub fn with_blend(self, blend: BlendMode) -> Self {
        Self { blend, ..self }
    }
}

/// Executes [`PaintCommand`]s against canvases.
pub struct Painter {
    raster: Rasterizer,
    coverage: Vec<u8>,
}

impl std::fmt::Debug for Painter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Painter").finish_non_exhaustive()
    }
}

impl Default for Painter {
    fn default() -> Self {
        Self::new()
    }
}

impl Painter {
    pub fn new() -> Self {
        Self {
            raster: Rasterizer::new(),
            coverage: Vec::new(),
        }
    }

    pub fn draw(&mut self, target: &mut Canvas, cmd: &PaintCommand) -> WaterboxResult<()> {
        if target.is_empty() {
            return Ok(());
        }
        let (w, h) = (target.width_u16(), target.height_u16());
        self.raster.coverage(&cmd.geometry, w, h, &mut self.coverage);

        let source = Source::new(&cmd.paint);
        let width = usize::from(w);
        let data = target.data_mut();
        for (i, &cov) in self.coverage.iter().enumerate() {
            if cov == 0 {
                continue;
            }
            let src = source.sample(i % width, i / width);
            let src = composite::scale(src, cov);
            let o = i * 4;
            let dst = [data[o], data[o + 1], data[o + 2], data[o + 3]];
            data[o..o + 4].copy_from_slice(&composite::blend(cmd.blend, dst, src));
        }
        Ok(())
    }

    /// Composite another canvas of the same size onto `target` (an image blit at the origin).
    pub fn draw_canvas(
        &mut self,
        target: &mut Canvas,
        source: &Canvas,
        blend: BlendMode,
    ) -> WaterboxResult<()> {
        composite::blend_in_place(target.data_mut(), source.data(), blend)
    }
}

enum Source<'a> {
    Solid([u8; 4]),
    Pattern {
        pattern: &'a PatternPaint,
        inverse: Affine,
    },
    Nothing,
}

impl<'a> Source<'a> {
    fn new(paint: &'a Paint) -> Self {
        match paint {
            Paint::Solid(c) => Self::Solid(c.to_rgba8_premul()),
            Paint::Pattern { pattern, transform } => {
                if transform.determinant().abs() < 1e-12 {
                    // Degenerate face: the texture collapses to nothing.
                    Self::Nothing
                } else {
                    Self::Pattern {
                        pattern,
                        inverse: transform.inverse(),
                    }
                }
            }
        }
    }

    fn sample(&self, x: usize, y: usize) -> [u8; 4] {
        match self {
            Self::Solid(px) => *px,
            Self::Pattern { pattern, inverse } => {
                let p = *inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                pattern.sample(p.x, p.y)
            }
            Self::Nothing => [0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((x0, y0));
        p.line_to((x1, y0));
        p.line_to((x1, y1));
        p.line_to((x0, y1));
        p.close_path();
        p
    }

    #[test]
    fn solid_fill_paints_inside_the_path() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let mut painter = Painter::new();
        painter
            .draw(
                &mut canvas,
                &PaintCommand::fill(rect_path(0.0, 0.0, 2.0, 4.0), Paint::Solid(Color::BLACK)),
            )
            .unwrap();
        assert_eq!(canvas.pixel(0, 1), [0, 0, 0, 255]);
        assert_eq!(canvas.pixel(3, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn destination_out_fill_erases() {
        let mut canvas = Canvas::from_premul_bytes(2, 1, vec![255, 0, 0, 255, 255, 0, 0, 255])
            .unwrap();
        let mut painter = Painter::new();
        let cmd = PaintCommand::fill(rect_path(0.0, 0.0, 1.0, 1.0), Paint::Solid(Color::BLACK))
            .with_blend(BlendMode::DestinationOut);
        painter.draw(&mut canvas, &cmd).unwrap();
        assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(1, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn degenerate_pattern_transform_paints_nothing() {
        let tile = Canvas::from_premul_bytes(1, 1, vec![255, 255, 255, 255]).unwrap();
        let ctx_canvas = Canvas::new(1, 1).unwrap();
        let pattern = ctx_canvas
            .pattern_context()
            .create_pattern(tile, crate::pattern::Repetition::Repeat)
            .unwrap();
        let mut canvas = Canvas::new(2, 2).unwrap();
        let cmd = PaintCommand::fill(
            rect_path(0.0, 0.0, 2.0, 2.0),
            Paint::Pattern {
                pattern,
                transform: Affine::scale_non_uniform(0.0, 1.0),
            },
        );
        Painter::new().draw(&mut canvas, &cmd).unwrap();
        assert!(canvas.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_canvas_blits_with_blend() {
        let mut dst = Canvas::from_premul_bytes(1, 1, vec![0, 0, 255, 255]).unwrap();
        let src = Canvas::from_premul_bytes(1, 1, vec![0, 0, 0, 255]).unwrap();
        Painter::new()
            .draw_canvas(&mut dst, &src, BlendMode::DestinationOut)
            .unwrap();
        assert_eq!(dst.pixel(0, 0), [0, 0, 0, 0]);
    }
}
