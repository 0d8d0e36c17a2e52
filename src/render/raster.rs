//! Path coverage through `vello_cpu`.
//!
//! Paths are rasterized as opaque white; the alpha channel of the result is the anti-aliased
//! coverage of the shape. Colors, textures and blending are applied afterwards by the compositor.

use crate::foundation::core::BezPath;
use crate::render::paint::{Geometry, StrokeCap};

pub(crate) struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl Rasterizer {
    pub(crate) fn new() -> Self {
        Self {
            ctx: None,
            pixmap: None,
        }
    }

    /// Write one coverage byte per pixel of a `width`×`height` surface into `out`.
    pub(crate) fn coverage(
        &mut self,
        geometry: &Geometry,
        width: u16,
        height: u16,
        out: &mut Vec<u8>,
    ) {
        out.clear();
        if width == 0 || height == 0 {
            return;
        }

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));

        match geometry {
            Geometry::Fill(path) => ctx.fill_path(&bezpath_to_cpu(path)),
            Geometry::Stroke { path, style } => {
                let (cap, join) = match style.cap {
                    StrokeCap::Butt => (vello_cpu::kurbo::Cap::Butt, vello_cpu::kurbo::Join::Miter),
                    StrokeCap::Round => {
                        (vello_cpu::kurbo::Cap::Round, vello_cpu::kurbo::Join::Round)
                    }
                };
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(style.width)
                        .with_caps(cap)
                        .with_join(join),
                );
                ctx.stroke_path(&bezpath_to_cpu(path));
            }
        }
        ctx.flush();

        let mut pixmap = match self.pixmap.take() {
            Some(p) if p.width() == width && p.height() == height => p,
            _ => vello_cpu::Pixmap::new(width, height),
        };
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut pixmap);

        out.extend(pixmap.data_as_u8_slice().chunks_exact(4).map(|px| px[3]));

        self.pixmap = Some(pixmap);
        self.ctx = Some(ctx);
    }
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
