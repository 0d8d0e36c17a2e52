use crate::foundation::error::{WaterboxError, WaterboxResult};
use crate::foundation::math::unit_to_u8;
use vello_cpu::peniko::color::{Srgb, parse_color};

/// Straight-alpha sRGB color with unit-range channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any CSS color string (`#rgb`, `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`, named).
    pub fn parse(s: &str) -> WaterboxResult<Self> {
        let parsed = parse_color(s.trim()).map_err(|_| {
            WaterboxError::type_error(format!(
                "Invalid color: {s}. Color must be a valid CSS color."
            ))
        })?;
        let [r, g, b, a] = parsed.to_alpha_color::<Srgb>().components;
        Ok(Self::rgba(
            f64::from(r).clamp(0.0, 1.0),
            f64::from(g).clamp(0.0, 1.0),
            f64::from(b).clamp(0.0, 1.0),
            f64::from(a).clamp(0.0, 1.0),
        ))
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    pub fn alpha(self) -> f64 {
        self.a
    }

    /// Perceived brightness in `[0, 1]` (ITU BT.601 weights).
    pub fn brightness(self) -> f64 {
        (self.r * 299.0 + self.g * 587.0 + self.b * 114.0) / 1000.0
    }

    /// Shift HSL lightness up by `amount` (clamped), keeping hue, saturation and alpha.
    pub fn lighten(self, amount: f64) -> Self {
        self.shift_lightness(amount)
    }

    /// Shift HSL lightness down by `amount` (clamped), keeping hue, saturation and alpha.
    pub fn darken(self, amount: f64) -> Self {
        self.shift_lightness(-amount)
    }

    fn shift_lightness(self, delta: f64) -> Self {
        let (h, s, l) = rgb_to_hsl(self.r, self.g, self.b);
        let (r, g, b) = hsl_to_rgb(h, s, (l + delta).clamp(0.0, 1.0));
        Self::rgba(r, g, b, self.a)
    }

    pub fn to_rgba8_premul(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            unit_to_u8(self.r.clamp(0.0, 1.0) * a),
            unit_to_u8(self.g.clamp(0.0, 1.0) * a),
            unit_to_u8(self.b.clamp(0.0, 1.0) * a),
            unit_to_u8(a),
        ]
    }

    /// CSS serialization: `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(self) -> String {
        let r = unit_to_u8(self.r);
        let g = unit_to_u8(self.g);
        let b = unit_to_u8(self.b);
        let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        if a >= 1.0 {
            format!("rgb({r}, {g}, {b})")
        } else {
            format!("rgba({r}, {g}, {b}, {a})")
        }
    }
}

/// Hue in `[0, 1)`, saturation and lightness in `[0, 1]`.
fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d <= f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn parses_hex_rgba_and_named() {
        let c = Color::parse("#ff0000").unwrap();
        assert!(close(c.r, 1.0) && close(c.g, 0.0) && close(c.a, 1.0));

        let c = Color::parse("rgba(58, 123, 213, 0.7)").unwrap();
        assert!(close(c.r, 58.0 / 255.0));
        assert!(close(c.a, 0.7));

        let c = Color::parse("white").unwrap();
        assert!(close(c.brightness(), 1.0));
    }

    #[test]
    fn rejects_garbage() {
        let err = Color::parse("not-a-color").unwrap_err();
        assert!(err.is_type());
        assert!(err.to_string().contains("not-a-color"));
    }

    #[test]
    fn lighten_and_darken_move_brightness() {
        let fill = Color::parse("rgba(100, 150, 200, 0.1)").unwrap();
        let lighter = fill.lighten(0.2);
        let darker = fill.darken(0.2);
        assert!(lighter.brightness() > fill.brightness());
        assert!(darker.brightness() < fill.brightness());
        assert!(close(lighter.a, 0.1));
    }

    #[test]
    fn hsl_round_trip_is_stable() {
        let c = Color::rgba(0.2, 0.4, 0.6, 1.0);
        let (h, s, l) = rgb_to_hsl(c.r, c.g, c.b);
        let (r, g, b) = hsl_to_rgb(h, s, l);
        assert!(close(r, 0.2) && close(g, 0.4) && close(b, 0.6));
    }

    #[test]
    fn css_output_matches_alpha() {
        assert_eq!(Color::rgba(1.0, 0.0, 0.0, 1.0).to_css(), "rgb(255, 0, 0)");
        assert_eq!(Color::rgba(0.0, 0.0, 1.0, 0.5).to_css(), "rgba(0, 0, 255, 0.5)");
    }

    #[test]
    fn premultiplies_channels() {
        assert_eq!(Color::rgba(1.0, 1.0, 1.0, 0.5).to_rgba8_premul(), [128, 128, 128, 128]);
        assert_eq!(Color::TRANSPARENT.to_rgba8_premul(), [0, 0, 0, 0]);
    }
}
