//! Fixed-point coordinate convention
//!
//! Token and peg positions are stored magnified by `PADDING` so that per-tick
//! increments stay well above float resolution. Values are unpadded only when
//! compared against logical distances (overlap, bucket spans) or drawn.
//! Never mix padded and logical values inside one expression.

use glam::DVec2;

/// Magnification applied to stored physics coordinates
pub const PADDING: f64 = 10_000.0;

/// Logical units to fixed-point space
#[inline]
pub fn pad(value: f64) -> f64 {
    value * PADDING
}

/// Fixed-point space to whole logical units (floors)
#[inline]
pub fn unpad(value: f64) -> f64 {
    (value / PADDING).floor()
}

/// Component-wise `pad`
#[inline]
pub fn pad_vec(v: DVec2) -> DVec2 {
    DVec2::new(pad(v.x), pad(v.y))
}

/// Component-wise `unpad`
#[inline]
pub fn unpad_vec(v: DVec2) -> DVec2 {
    DVec2::new(unpad(v.x), unpad(v.y))
}
