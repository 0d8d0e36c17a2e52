//! Isometric layout of the container.
//!
//! Every face derives from one 2:1 diamond (`size`) sitting inside the inset drawing rect.
//! Paths are produced in device space; each face also carries the transform its texture is
//! sampled through, so patterns follow the slant of the face they cover.

use std::f64::consts::FRAC_PI_4;

use crate::foundation::core::{Affine, Area, BezPath, Size, Vec2};
use crate::options::Scale;

/// Which edge of its area a diamond is textured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RhombusPosition {
    Top,
    Bottom,
}

/// Which side of the box a wall belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    /// Back walls, textured from their bottom edge.
    Back,
    /// Front and water walls, textured from their top edge.
    Front,
}

/// A closed face outline plus the pattern-space → device-space transform used to texture it.
#[derive(Clone, Debug)]
pub struct FacePath {
    pub path: BezPath,
    pub paint_transform: Affine,
}

fn rect_path(x: f64, y: f64, w: f64, h: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((x, y));
    p.line_to((x + w, y));
    p.line_to((x + w, y + h));
    p.line_to((x, y + h));
    p.close_path();
    p
}

/// Diamond inscribed in `area`: a square rotated by 45° and squashed to the area's bounds.
pub fn rhombus_path(area: Area, position: RhombusPosition) -> FacePath {
    let a = 0.5 * area.w.hypot(area.h);
    let b = (2.0 * a * a).sqrt();
    if b == 0.0 {
        return FacePath {
            path: BezPath::new(),
            paint_transform: Affine::IDENTITY,
        };
    }

    let center = area.center();
    let m = Affine::translate(center.to_vec2())
        * Affine::scale_non_uniform(area.w / b, area.h / b)
        * Affine::rotate(FRAC_PI_4);

    let mut path = rect_path(-a / 2.0, -a / 2.0, a, a);
    path.apply_affine(m);

    let anchor = match position {
        RhombusPosition::Top => Vec2::new(-a / 2.0, -a / 2.0 + 2.0 * a),
        RhombusPosition::Bottom => Vec2::new(a / 2.0 - 2.0 * a, a / 2.0),
    };
    FacePath {
        path,
        paint_transform: m * Affine::translate(anchor),
    }
}

/// Sheared wall: a `area.w × (area.h - size.h)` rectangle whose left edge starts `left` px and
/// right edge `right` px below the top of the diamond's horizontal axis.
pub fn wall_path(area: Area, size: Size, left: f64, right: f64, facing: Facing) -> FacePath {
    let x = area.x;
    let y = area.y + size.h / 2.0;
    let w = area.w;
    let h = area.h - size.h;
    let skew_y = if w == 0.0 { 0.0 } else { (right - left) / w };

    let m = Affine::translate((x, y + left)) * Affine::new([1.0, skew_y, 0.0, 1.0, 0.0, 0.0]);
    let mut path = rect_path(0.0, 0.0, w, h);
    path.apply_affine(m);

    let diagonal = (right - left).hypot(w);
    let compensate = if diagonal == 0.0 { 1.0 } else { w / diagonal };
    let pivot = match facing {
        Facing::Back => h,
        Facing::Front => 0.0,
    };
    FacePath {
        path,
        paint_transform: m
            * Affine::translate((-x, pivot))
            * Affine::scale_non_uniform(compensate, 1.0),
    }
}

/// Open chevron peaking at `area.y`, `scale` (0..=1) of the diamond wide.
pub fn separator_path(area: Area, scale: f64) -> BezPath {
    let s = scale / 2.0;
    let cx = area.x + area.w / 2.0;
    let mut p = BezPath::new();
    p.move_to((cx - area.w * s, area.y + area.h * s));
    p.line_to((cx, area.y));
    p.line_to((cx + area.w * s, area.y + area.h * s));
    p
}

/// Percent heights of the `divisions - 1` inner scale marks.
pub fn make_steps(divisions: u32) -> Vec<f64> {
    let step = 100.0 / f64::from(divisions);
    (1..divisions).map(|i| step * f64::from(i)).collect()
}

/// Derived geometry of one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameLayout {
    /// Inset drawing rect.
    pub rect: Area,
    /// Top/bottom diamond extent.
    pub size: Size,
}

impl FrameLayout {
    pub fn new(width: u32, height: u32, stroke_width: f64) -> Self {
        let (width, height) = (f64::from(width), f64::from(height));
        let actual_width = width.min(height);
        let rect = Area::new(
            width / 2.0 - actual_width / 2.0 + stroke_width / 2.0,
            stroke_width / 2.0,
            actual_width - stroke_width - 1.0,
            height - stroke_width - 1.0,
        );
        let size = Size::new(rect.w, rect.w / 2.0);
        Self { rect, size }
    }

    /// Height covered by liquid at `value` percent, diamond included.
    pub fn fill_height(&self, value: u8) -> f64 {
        self.size.h + f64::from(value) / 100.0 * (self.rect.h - self.size.h)
    }

    /// Top of the liquid's bounding area; decreases as `value` grows.
    pub fn water_top(&self, value: u8) -> f64 {
        self.rect.bottom() - self.fill_height(value)
    }

    fn half_walls(&self, y: f64, h: f64) -> (Area, Area) {
        let half = self.size.w / 2.0;
        (
            Area::new(self.rect.x, y, half, h),
            Area::new(self.rect.x + self.rect.w / 2.0, y, half, h),
        )
    }

    /// Bottom diamond, left back wall, right back wall.
    pub fn back_faces(&self) -> [FacePath; 3] {
        let Self { rect, size } = *self;
        let bottom = Area::new(rect.x, rect.bottom() - size.h, size.w, size.h);
        let (left, right) = self.half_walls(rect.y, rect.h);
        [
            rhombus_path(bottom, RhombusPosition::Bottom),
            wall_path(left, size, 0.0, -size.h / 2.0, Facing::Back),
            wall_path(right, size, -size.h / 2.0, 0.0, Facing::Back),
        ]
    }

    /// Scale chevrons, bottom to top.
    pub fn separators(&self, scale: &Scale) -> Vec<BezPath> {
        let Self { rect, size } = *self;
        make_steps(scale.divisions)
            .into_iter()
            .map(|step| {
                let y = rect.bottom() - size.h - (rect.h - size.h) * step / 100.0;
                separator_path(Area::new(rect.x, y, size.w, size.h), scale.size)
            })
            .collect()
    }

    /// Left wall, right wall, top diamond of the liquid body.
    pub fn water_faces(&self, value: u8) -> [FacePath; 3] {
        let fill_height = self.fill_height(value);
        let top = self.rect.bottom() - fill_height;
        self.front_like(top, fill_height)
    }

    /// Left wall, right wall, top diamond of the glass front.
    pub fn front_faces(&self) -> [FacePath; 3] {
        self.front_like(self.rect.y, self.rect.h)
    }

    fn front_like(&self, y: f64, h: f64) -> [FacePath; 3] {
        let size = self.size;
        let (left, right) = self.half_walls(y, h);
        [
            wall_path(left, size, 0.0, size.h / 2.0, Facing::Front),
            wall_path(right, size, size.h / 2.0, 0.0, Facing::Front),
            rhombus_path(
                Area::new(self.rect.x, y, size.w, size.h),
                RhombusPosition::Top,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Point;
    use kurbo::Shape as _;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_layout_numbers() {
        let layout = FrameLayout::new(100, 200, 1.0);
        assert!(close(layout.rect.x, 1.0));
        assert!(close(layout.rect.y, 0.5));
        assert!(close(layout.rect.w, 98.0));
        assert!(close(layout.rect.h, 198.0));
        assert!(close(layout.size.h, 49.0));
        assert!(close(layout.fill_height(50), 123.5));
        assert!(close(layout.fill_height(0), 49.0));
        assert!(close(layout.fill_height(100), 198.0));
    }

    #[test]
    fn layout_is_centered_in_wide_canvases() {
        let layout = FrameLayout::new(300, 100, 2.0);
        assert!(close(layout.rect.w, 97.0));
        assert!(close(layout.rect.x, 150.0 - 50.0 + 1.0));
    }

    #[test]
    fn water_top_rises_strictly_with_value() {
        let layout = FrameLayout::new(120, 240, 1.5);
        let tops: Vec<f64> = (0..=100).map(|v| layout.water_top(v)).collect();
        assert!(tops.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn make_steps_excludes_the_ends() {
        assert_eq!(make_steps(4), vec![25.0, 50.0, 75.0]);
        assert_eq!(make_steps(2), vec![50.0]);
        assert!(make_steps(1).is_empty());
    }

    #[test]
    fn rhombus_touches_area_edge_midpoints() {
        let area = Area::new(10.0, 20.0, 80.0, 40.0);
        let face = rhombus_path(area, RhombusPosition::Top);
        let bbox = face.path.bounding_box();
        assert!(close(bbox.x0, 10.0) && close(bbox.x1, 90.0));
        assert!(close(bbox.y0, 20.0) && close(bbox.y1, 60.0));
        assert!(face.path.contains(Point::new(50.0, 40.0)));
        assert!(!face.path.contains(Point::new(12.0, 22.0)));
    }

    #[test]
    fn degenerate_rhombus_is_empty() {
        let face = rhombus_path(Area::new(0.0, 0.0, 0.0, 0.0), RhombusPosition::Bottom);
        assert!(face.path.elements().is_empty());
    }

    #[test]
    fn wall_shears_by_offset_difference() {
        let size = Size::new(40.0, 20.0);
        let face = wall_path(
            Area::new(0.0, 0.0, 20.0, 100.0),
            size,
            0.0,
            10.0,
            Facing::Front,
        );
        let pts: Vec<Point> = face.path.elements().iter().filter_map(|el| el.end_point()).collect();
        // Left edge starts at y = size.h / 2; the right edge is pushed down by 10.
        assert_eq!(pts[0], Point::new(0.0, 10.0));
        assert_eq!(pts[1], Point::new(20.0, 20.0));
        assert_eq!(pts[2], Point::new(20.0, 100.0));
        assert_eq!(pts[3], Point::new(0.0, 90.0));
    }

    #[test]
    fn separator_is_an_open_chevron() {
        let path = separator_path(Area::new(0.0, 50.0, 100.0, 50.0), 0.5);
        let pts: Vec<Point> = path.elements().iter().filter_map(|el| el.end_point()).collect();
        assert_eq!(
            pts,
            vec![Point::new(25.0, 62.5), Point::new(50.0, 50.0), Point::new(75.0, 62.5)]
        );
    }

    #[test]
    fn separators_follow_scale_divisions() {
        let layout = FrameLayout::new(100, 200, 1.0);
        let marks = layout.separators(&Scale {
            divisions: 10,
            size: 0.5,
        });
        assert_eq!(marks.len(), 9);
        let first_peak = marks[0].elements()[1].end_point().map(|p| p.y);
        let expected = layout.rect.bottom() - layout.size.h - (layout.rect.h - layout.size.h) * 0.1;
        assert!(close(first_peak.unwrap_or(f64::NAN), expected));
    }

    #[test]
    fn water_faces_sit_at_fill_height() {
        let layout = FrameLayout::new(100, 200, 1.0);
        let [_, _, top] = layout.water_faces(50);
        let bbox = top.path.bounding_box();
        assert!(close(bbox.y0, layout.water_top(50)));
    }
}
