pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Unit float to 8-bit channel, rounded.
pub(crate) fn unit_to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}
