use crate::foundation::error::{WaterboxError, WaterboxResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

pub type PremulRgba8 = [u8; 4];

/// How a source pixel combines with the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Normal alpha compositing.
    #[default]
    SourceOver,
    /// Separable `overlay` blend composited source-over.
    Overlay,
    /// Erase the destination by the source alpha; source color is ignored.
    DestinationOut,
}

pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

pub fn destination_out(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = mul_div255_u8(u16::from(dst[i]), inv);
    }
    out
}

/// W3C `overlay`: hard-light with source and backdrop swapped.
pub fn overlay(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if dst[3] == 0 {
        return src;
    }

    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sp = f32::from(src[i]) / 255.0;
        let dp = f32::from(dst[i]) / 255.0;
        let cs = (sp / sa).min(1.0);
        let cb = (dp / da).min(1.0);
        let mixed = if cb <= 0.5 {
            cs * 2.0 * cb
        } else {
            let t = 2.0 * cb - 1.0;
            cs + t - cs * t
        };
        let v = sp * (1.0 - da) + dp * (1.0 - sa) + sa * da * mixed;
        out[i] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    let a = sa + da - sa * da;
    out[3] = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
    out
}

pub fn blend(mode: BlendMode, dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match mode {
        BlendMode::SourceOver => over(dst, src),
        BlendMode::Overlay => overlay(dst, src),
        BlendMode::DestinationOut => destination_out(dst, src),
    }
}

/// Scale a premultiplied pixel by an 8-bit coverage/opacity.
pub fn scale(px: PremulRgba8, coverage: u8) -> PremulRgba8 {
    match coverage {
        0 => [0; 4],
        255 => px,
        c => {
            let c = u16::from(c);
            [
                mul_div255_u8(u16::from(px[0]), c),
                mul_div255_u8(u16::from(px[1]), c),
                mul_div255_u8(u16::from(px[2]), c),
                mul_div255_u8(u16::from(px[3]), c),
            ]
        }
    }
}

/// Composite a whole `src` buffer onto `dst` (same size).
pub fn blend_in_place(dst: &mut [u8], src: &[u8], mode: BlendMode) -> WaterboxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(WaterboxError::context(
            "blend_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = blend(mode, [d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}
