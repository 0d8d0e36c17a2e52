//! Procedural, tileable textures.
//!
//! [`PatternFactory`] turns a [`Pattern`] into a [`PatternPaint`]: predefined names are
//! rasterized into a small repeating tile, custom patterns call the caller's creator with a
//! [`PatternContext`]. Randomized tiles (`blocky`, `noise`) draw from the factory's RNG, which
//! can be seeded for reproducible output.

use std::fmt;
use std::sync::Arc;

use kurbo::Shape as _;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

use crate::color::Color;
use crate::foundation::core::{BezPath, Point};
use crate::foundation::error::{WaterboxError, WaterboxResult};
use crate::options::{Pattern, PatternName};
use crate::render::paint::{PaintCommand, Painter, Paint, StrokeStyle};
use crate::render::surface::{Canvas, MAX_CANVAS_PIXELS};

/// How a tile repeats outside its own bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Repetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

/// A paint source backed by a tile image.
#[derive(Clone, Debug)]
pub struct PatternPaint {
    tile: Arc<Canvas>,
    repetition: Repetition,
}

impl PatternPaint {
    pub fn tile(&self) -> &Canvas {
        &self.tile
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    /// Premultiplied texel at pattern-space position `(x, y)` (nearest sampling).
    pub fn sample(&self, x: f64, y: f64) -> [u8; 4] {
        let (w, h) = (f64::from(self.tile.width()), f64::from(self.tile.height()));
        let (tx, ty) = (x.floor(), y.floor());
        let wrap_x = matches!(self.repetition, Repetition::Repeat | Repetition::RepeatX);
        let wrap_y = matches!(self.repetition, Repetition::Repeat | Repetition::RepeatY);

        let tx = if wrap_x {
            tx.rem_euclid(w)
        } else if (0.0..w).contains(&tx) {
            tx
        } else {
            return [0; 4];
        };
        let ty = if wrap_y {
            ty.rem_euclid(h)
        } else if (0.0..h).contains(&ty) {
            ty
        } else {
            return [0; 4];
        };
        self.tile.pixel(tx as u32, ty as u32)
    }
}

/// Minimal capability handed to custom pattern creators.
///
/// Patterns are bound to the canvas whose context created them; the orchestrator always uses
/// its work buffer.
#[derive(Clone, Copy, Debug)]
pub struct PatternContext<'a> {
    surface: &'a Canvas,
}

impl<'a> PatternContext<'a> {
    pub(crate) fn new(surface: &'a Canvas) -> Self {
        Self { surface }
    }

    /// Size of the canvas this context draws on.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    /// Wrap `image` as a repeating paint source.
    pub fn create_pattern(
        &self,
        image: Canvas,
        repetition: Repetition,
    ) -> WaterboxResult<PatternPaint> {
        if image.is_empty() {
            return Err(WaterboxError::context(
                "Failed to create pattern: image has no pixels",
            ));
        }
        Ok(PatternPaint {
            tile: Arc::new(image),
            repetition,
        })
    }
}

type CreatorFn = dyn Fn(&PatternContext<'_>) -> WaterboxResult<PatternPaint> + Send + Sync;

/// Caller-supplied pattern constructor.
///
/// Two creators compare equal only when they share the same closure allocation.
#[derive(Clone)]
pub struct PatternCreator(Arc<CreatorFn>);

impl PatternCreator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PatternContext<'_>) -> WaterboxResult<PatternPaint> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn create(&self, ctx: &PatternContext<'_>) -> WaterboxResult<PatternPaint> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for PatternCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PatternCreator(..)")
    }
}

impl PartialEq for PatternCreator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

pub struct PatternFactory {
    rng: StdRng,
    painter: Painter,
}

impl fmt::Debug for PatternFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternFactory").finish_non_exhaustive()
    }
}

impl Default for PatternFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternFactory {
    /// Factory seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Factory with reproducible noise.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            painter: Painter::new(),
        }
    }

    /// Materialize `pattern` against `ctx`.
    #[tracing::instrument(skip(self, ctx))]
    pub fn create(
        &mut self,
        ctx: &PatternContext<'_>,
        pattern: &Pattern,
    ) -> WaterboxResult<PatternPaint> {
        match pattern {
            Pattern::Predefined { name, size, alpha } => {
                let tile = self.tile(*name, *size, *alpha)?;
                ctx.create_pattern(tile, Repetition::Repeat)
            }
            Pattern::Custom { creator } => creator.create(ctx),
        }
    }

    /// Rasterize a predefined tile.
    pub fn tile(&mut self, name: PatternName, size: f64, alpha: f64) -> WaterboxResult<Canvas> {
        let alpha = alpha.clamp(0.0, 1.0);
        match name {
            PatternName::Blocky => self.coarse_noise(positive_or(size, 10.0), alpha),
            PatternName::Noise => self.coarse_noise(positive_or(size, 1.0), alpha),
            PatternName::Dotted => self.dot_matrix(positive_or(size, 10.0), alpha),
            PatternName::Grid => self.grid(positive_or(size, 10.0), alpha),
            PatternName::Checkered => checkered(positive_or(size, 10.0), alpha),
            PatternName::Debug => debug_gradient(positive_or(size, 10.0), alpha),
        }
    }

    /// 64×64 cells of white at random opacity in `[0, alpha)`.
    fn coarse_noise(&mut self, cell: f64, alpha: f64) -> WaterboxResult<Canvas> {
        let extent = cell * 64.0;
        let mut canvas = tile_canvas(extent, extent)?;
        let (w, h) = (canvas.width(), canvas.height());
        let cols = (f64::from(w) / cell).ceil() as usize;
        let rows = (f64::from(h) / cell).ceil() as usize;

        let values: Vec<[u8; 4]> = (0..rows * cols)
            .map(|_| {
                let a = self.rng.random::<f64>() * alpha;
                Color::WHITE.with_alpha(a).to_rgba8_premul()
            })
            .collect();

        let data = canvas.data_mut();
        for y in 0..h {
            let row = ((f64::from(y) / cell) as usize).min(rows - 1);
            for x in 0..w {
                let col = ((f64::from(x) / cell) as usize).min(cols - 1);
                let o = ((y * w + x) as usize) * 4;
                data[o..o + 4].copy_from_slice(&values[row * cols + col]);
            }
        }
        Ok(canvas)
    }

    /// Centered grid of dots, radius 0.1×spacing, on a 4×4 spacing tile.
    fn dot_matrix(&mut self, spacing: f64, alpha: f64) -> WaterboxResult<Canvas> {
        let extent = spacing * 4.0;
        let mut canvas = tile_canvas(extent, extent)?;
        let radius = spacing * 0.1;

        let cols = (extent / spacing).round().max(1.0);
        let rows = (extent / spacing).round().max(1.0);
        let step_x = extent / cols;
        let step_y = extent / rows;
        let paint = Paint::Solid(Color::WHITE.with_alpha(alpha));

        let mut y = step_y / 2.0;
        while y < extent + 0.0001 {
            let mut x = step_x / 2.0;
            while x < extent + 0.0001 {
                let dot = kurbo::Circle::new(Point::new(x, y), radius).to_path(0.05);
                self.painter
                    .draw(&mut canvas, &PaintCommand::fill(dot, paint.clone()))?;
                x += step_x;
            }
            y += step_y;
        }
        Ok(canvas)
    }

    /// Cross-hatch on a 4×4 cell tile, line width 0.05×cell.
    fn grid(&mut self, cell: f64, alpha: f64) -> WaterboxResult<Canvas> {
        let extent = cell * 4.0;
        let mut canvas = tile_canvas(extent, extent)?;
        let style = StrokeStyle::butt(cell * 0.05);
        let paint = Paint::Solid(Color::WHITE.with_alpha(alpha));

        let mut lines = Vec::new();
        let mut x = 0.0;
        while x <= extent {
            lines.push(line((x + 0.5, 0.0), (x + 0.5, extent)));
            x += cell;
        }
        let mut y = 0.0;
        while y <= extent {
            lines.push(line((0.0, y + 0.5), (extent, y + 0.5)));
            y += cell;
        }

        for l in lines {
            self.painter
                .draw(&mut canvas, &PaintCommand::stroke(l, style, paint.clone()))?;
        }
        Ok(canvas)
    }
}

fn positive_or(size: f64, fallback: f64) -> f64 {
    if size > 0.0 { size } else { fallback }
}

fn line(from: (f64, f64), to: (f64, f64)) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(from);
    p.line_to(to);
    p
}

/// Allocate a tile canvas, truncating fractional extents.
fn tile_canvas(w: f64, h: f64) -> WaterboxResult<Canvas> {
    let (w, h) = (w.floor(), h.floor());
    let too_big = w > f64::from(u16::MAX)
        || h > f64::from(u16::MAX)
        || w * h > MAX_CANVAS_PIXELS as f64;
    if !(w >= 1.0 && h >= 1.0) || too_big {
        return Err(WaterboxError::context(format!(
            "Failed to create pattern: tile of {w}x{h} px cannot be allocated"
        )));
    }
    Canvas::new(w as u32, h as u32)
}

/// 2×2 alternating white/black blocks.
fn checkered(cell: f64, alpha: f64) -> WaterboxResult<Canvas> {
    let mut canvas = tile_canvas(cell * 2.0, cell * 2.0)?;
    let (w, h) = (canvas.width(), canvas.height());
    let white = Color::WHITE.with_alpha(alpha).to_rgba8_premul();
    let black = Color::BLACK.with_alpha(alpha).to_rgba8_premul();

    let data = canvas.data_mut();
    for y in 0..h {
        let by = (f64::from(y) / cell) as u32;
        for x in 0..w {
            let bx = (f64::from(x) / cell) as u32;
            let px = if (bx + by) % 2 == 0 { white } else { black };
            let o = ((y * w + x) as usize) * 4;
            data[o..o + 4].copy_from_slice(&px);
        }
    }
    Ok(canvas)
}

/// Radial hue gradient for calibrating texture alignment.
fn debug_gradient(size: f64, alpha: f64) -> WaterboxResult<Canvas> {
    const STOPS: [(f64, Color); 4] = [
        (0.0, Color::rgba(1.0, 0.0, 0.0, 1.0)),
        (0.25, Color::rgba(1.0, 1.0, 0.0, 1.0)),
        (0.5, Color::rgba(0.0, 128.0 / 255.0, 0.0, 1.0)),
        (1.0, Color::rgba(0.0, 0.0, 1.0, 1.0)),
    ];

    let mut canvas = tile_canvas(size * 2.0, size * 2.0)?;
    let (w, h) = (canvas.width(), canvas.height());
    let radius = size.hypot(size);

    let data = canvas.data_mut();
    for y in 0..h {
        for x in 0..w {
            let dx = f64::from(x) + 0.5 - size;
            let dy = f64::from(y) + 0.5 - size;
            let t = (dx.hypot(dy) / radius).clamp(0.0, 1.0);
            let c = gradient_at(&STOPS, t).with_alpha(alpha);
            let o = ((y * w + x) as usize) * 4;
            data[o..o + 4].copy_from_slice(&c.to_rgba8_premul());
        }
    }
    Ok(canvas)
}

fn gradient_at(stops: &[(f64, Color)], t: f64) -> Color {
    for pair in stops.windows(2) {
        let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
        if t <= t1 {
            let u = if t1 > t0 { ((t - t0) / (t1 - t0)).clamp(0.0, 1.0) } else { 0.0 };
            return Color::rgba(
                c0.r + (c1.r - c0.r) * u,
                c0.g + (c1.g - c0.g) * u,
                c0.b + (c1.b - c0.b) * u,
                c0.a + (c1.a - c0.a) * u,
            );
        }
    }
    stops.last().map_or(Color::TRANSPARENT, |(_, c)| *c)
}
