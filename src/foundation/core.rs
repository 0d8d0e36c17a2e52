pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Axis-aligned region described by its top-left corner and extent.
///
/// Unlike [`kurbo::Rect`], the extent may be negative or zero for degenerate layouts
/// (e.g. a 1px wide container); geometry built from it stays well defined.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Area {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn bottom(self) -> f64 {
        self.y + self.h
    }
}

/// Width/height pair.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}
