use crate::foundation::error::{WaterboxError, WaterboxResult};
use crate::pattern::PatternContext;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Largest surface, in pixels, that [`Canvas`] will allocate (8192×8192).
pub const MAX_CANVAS_PIXELS: usize = 1 << 26;

/// Premultiplied RGBA8 drawing surface.
///
/// Dimensions are limited to `u16` like the rasterizer behind it, and the area to
/// [`MAX_CANVAS_PIXELS`]. Asking for anything larger, or running out of memory, fails with a
/// drawing-context error rather than truncating or aborting.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> WaterboxResult<Self> {
        let (w, h) = Self::check_extent(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            data: alloc_pixels(w, h)?,
        })
    }

    /// Zero-sized canvas; draws on it are no-ops.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// Build a canvas from premultiplied RGBA8 bytes.
    pub fn from_premul_bytes(width: u32, height: u32, data: Vec<u8>) -> WaterboxResult<Self> {
        let (w, h) = Self::check_extent(width, height)?;
        if data.len() != usize::from(w) * usize::from(h) * 4 {
            return Err(WaterboxError::context("canvas byte len mismatch"));
        }
        Ok(Self {
            width: w,
            height: h,
            data,
        })
    }

    /// Verify that a surface of this size can be acquired.
    pub fn check_extent(width: u32, height: u32) -> WaterboxResult<(u16, u16)> {
        let w: u16 = width.try_into().map_err(|_| {
            WaterboxError::context(format!("can't get context: width {width} exceeds u16"))
        })?;
        let h: u16 = height.try_into().map_err(|_| {
            WaterboxError::context(format!("can't get context: height {height} exceeds u16"))
        })?;
        if usize::from(w) * usize::from(h) > MAX_CANVAS_PIXELS {
            return Err(WaterboxError::context(format!(
                "can't get context: {width}x{height} exceeds {MAX_CANVAS_PIXELS} pixels"
            )));
        }
        Ok((w, h))
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub(crate) fn width_u16(&self) -> u16 {
        self.width
    }

    pub(crate) fn height_u16(&self) -> u16 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Resize and clear, like assigning a new size to an HTML canvas.
    pub fn resize(&mut self, width: u32, height: u32) -> WaterboxResult<()> {
        let (w, h) = Self::check_extent(width, height)?;
        self.data = alloc_pixels(w, h)?;
        self.width = w;
        self.height = h;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width() || y >= self.height() {
            return [0; 4];
        }
        let i = ((y as usize) * usize::from(self.width) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Capability handed to pattern creators; patterns made through it paint on this canvas.
    pub fn pattern_context(&self) -> PatternContext<'_> {
        PatternContext::new(self)
    }

    /// Copy pixels out as a frame, optionally un-premultiplying.
    pub fn to_frame(&self, premultiplied: bool) -> FrameRGBA {
        let mut data = self.data.clone();
        if !premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data,
            premultiplied,
        }
    }
}

/// Zeroed RGBA8 storage; allocation failure is reported instead of aborting.
fn alloc_pixels(w: u16, h: u16) -> WaterboxResult<Vec<u8>> {
    let len = usize::from(w) * usize::from(h) * 4;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        WaterboxError::context(format!("can't get context: {w}x{h} surface: {e}"))
    })?;
    data.resize(len, 0);
    Ok(data)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_canvas_is_a_context_error() {
        let err = Canvas::new(70_000, 10).unwrap_err();
        assert!(matches!(err, WaterboxError::Context(_)));
    }

    #[test]
    fn huge_area_is_a_context_error() {
        let err = Canvas::new(65_535, 65_535).unwrap_err();
        assert!(matches!(err, WaterboxError::Context(_)));
        assert!(Canvas::check_extent(8192, 8192).is_ok());
        assert!(Canvas::check_extent(8193, 8192).is_err());
    }

    #[test]
    fn failed_resize_keeps_the_canvas() {
        let mut c = Canvas::new(2, 2).unwrap();
        c.data_mut().fill(7);
        assert!(c.resize(65_535, 65_535).is_err());
        assert_eq!((c.width(), c.height()), (2, 2));
        assert!(c.data().iter().all(|&b| b == 7));
    }

    #[test]
    fn resize_clears_pixels() {
        let mut c = Canvas::new(2, 2).unwrap();
        c.data_mut().fill(255);
        c.resize(3, 1).unwrap();
        assert_eq!(c.data().len(), 12);
        assert!(c.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn frame_readback_unpremultiplies() {
        let c = Canvas::from_premul_bytes(1, 1, vec![64, 0, 0, 128]).unwrap();
        let f = c.to_frame(false);
        assert_eq!(f.data, vec![128, 0, 0, 128]);
        assert!(!f.premultiplied);
        assert_eq!(c.to_frame(true).data, vec![64, 0, 0, 128]);
    }

    #[test]
    fn pixel_outside_is_transparent() {
        let c = Canvas::new(1, 1).unwrap();
        assert_eq!(c.pixel(5, 5), [0, 0, 0, 0]);
    }
}
