//! Collision detection and response against the static board
//!
//! Everything here works on fixed-point positions and uses only IEEE-exact
//! arithmetic (`+ - * / sqrt`). The contact direction is the normalised
//! centre-to-centre vector rather than an `atan2` angle, which gives the same
//! `cos`/`sin` pair without platform-dependent trig.

use glam::DVec2;

use super::board::{Board, Bucket, Peg};
use super::fixed::{pad, unpad};
use crate::consts::DEGENERATE_NUDGE;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit vector from the obstacle toward the token (the contact angle)
    pub normal: DVec2,
    /// Overlap in logical units (for position correction)
    pub penetration: f64,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: DVec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a token against one peg
///
/// A token centred exactly above or below a peg (zero horizontal separation)
/// has its separation replaced by `DEGENERATE_NUDGE` toward +x, so the contact
/// vector is never zero-length and a token cannot balance on a peg forever.
pub fn peg_contact(pos: DVec2, radius: f64, peg: &Peg) -> CollisionResult {
    let mut delta = pos - peg.pos;
    let dist = delta.length();
    if dist >= pad(radius + peg.radius) {
        return CollisionResult::miss();
    }

    if delta.x == 0.0 {
        delta.x = pad(DEGENERATE_NUDGE);
    }
    let dist = delta.length();
    let normal = delta / dist;
    let penetration = radius + peg.radius - unpad(dist);

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Angle-and-speed bounce off a fixed obstacle
///
/// The token leaves along the contact normal at its incoming speed, with the
/// horizontal and vertical components scaled independently.
#[inline]
pub fn bounce(vel: DVec2, normal: DVec2, horizontal_friction: f64, vertical_friction: f64) -> DVec2 {
    let speed = vel.length();
    DVec2::new(
        normal.x * speed * horizontal_friction,
        normal.y * speed * vertical_friction,
    )
}

/// Push a position out of an obstacle along the contact normal
#[inline]
pub fn separate(pos: DVec2, normal: DVec2, penetration: f64) -> DVec2 {
    DVec2::new(
        pos.x + pad(normal.x * penetration),
        pos.y + pad(normal.y * penetration),
    )
}

/// Which side wall, if any, the token has crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHit {
    Left,
    Right,
}

/// Check the token against the board's side walls
pub fn wall_contact(pos: DVec2, radius: f64, board_width: f64) -> Option<WallHit> {
    if pos.x < pad(radius) {
        Some(WallHit::Left)
    } else if pos.x > pad(board_width - radius) {
        Some(WallHit::Right)
    } else {
        None
    }
}

/// Whether a token has been captured by a bucket
///
/// Its unpadded x must lie in the bucket's span and its bottom edge must have
/// reached the bucket's top edge.
#[inline]
pub fn bucket_capture(pos: DVec2, radius: f64, bucket: &Bucket) -> bool {
    bucket.spans_x(unpad(pos.x)) && unpad(pos.y) + radius >= bucket.top()
}

/// First capturing bucket in left-to-right order
pub fn find_capture(pos: DVec2, radius: f64, board: &Board) -> Option<usize> {
    board
        .buckets
        .iter()
        .position(|bucket| bucket_capture(pos, radius, bucket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;

    fn peg_at(x: f64, y: f64) -> Peg {
        Peg {
            pos: DVec2::new(pad(x), pad(y)),
            radius: 4.0,
        }
    }

    #[test]
    fn test_peg_contact_miss() {
        let peg = peg_at(100.0, 100.0);
        let result = peg_contact(DVec2::new(pad(120.0), pad(100.0)), 7.0, &peg);
        assert!(!result.hit);
    }

    #[test]
    fn test_peg_contact_touching_is_not_a_hit() {
        // Exactly radius + radius apart
        let peg = peg_at(100.0, 100.0);
        let result = peg_contact(DVec2::new(pad(111.0), pad(100.0)), 7.0, &peg);
        assert!(!result.hit);
    }

    #[test]
    fn test_peg_contact_from_left() {
        let peg = peg_at(100.0, 100.0);
        let result = peg_contact(DVec2::new(pad(92.0), pad(100.0)), 7.0, &peg);
        assert!(result.hit);
        assert_eq!(result.normal, DVec2::new(-1.0, 0.0));
        assert_eq!(result.penetration, 3.0);
    }

    #[test]
    fn test_peg_contact_vertical_alignment_is_nudged() {
        let peg = peg_at(100.0, 100.0);
        let result = peg_contact(DVec2::new(pad(100.0), pad(92.0)), 7.0, &peg);
        assert!(result.hit);
        assert!(result.normal.x > 0.0, "nudge goes toward +x");
        assert!(result.normal.y < 0.0, "still pushed upward");
        assert!((result.normal.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_peg_contact_zero_distance_is_finite() {
        let peg = peg_at(100.0, 100.0);
        let result = peg_contact(peg.pos, 7.0, &peg);
        assert!(result.hit);
        assert!(result.normal.is_finite());
        assert_eq!(result.normal, DVec2::new(1.0, 0.0));
        assert!(result.penetration.is_finite());
    }

    #[test]
    fn test_bounce_scales_components_independently() {
        let vel = DVec2::new(0.0, 5.0);
        let normal = DVec2::new(0.6, -0.8);
        let out = bounce(vel, normal, 0.4, 0.8);
        assert!((out.x - 0.6 * 5.0 * 0.4).abs() < 1e-12);
        assert!((out.y + 0.8 * 5.0 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_separate_moves_along_normal() {
        let out = separate(DVec2::new(pad(10.0), pad(10.0)), DVec2::new(0.0, -1.0), 2.0);
        assert_eq!(out, DVec2::new(pad(10.0), pad(8.0)));
    }

    #[test]
    fn test_wall_contact() {
        assert_eq!(wall_contact(DVec2::new(pad(3.0), 0.0), 7.0, 800.0), Some(WallHit::Left));
        assert_eq!(wall_contact(DVec2::new(pad(797.0), 0.0), 7.0, 800.0), Some(WallHit::Right));
        assert_eq!(wall_contact(DVec2::new(pad(400.0), 0.0), 7.0, 800.0), None);
    }

    #[test]
    fn test_bucket_capture_requires_bottom_edge() {
        let board = Board::new(&BoardConfig::default());
        let bucket = &board.buckets[8];
        // Above the bucket top (612) by more than the radius
        assert!(!bucket_capture(DVec2::new(pad(400.0), pad(600.0)), 7.0, bucket));
        // Bottom edge exactly at the top edge
        assert!(bucket_capture(DVec2::new(pad(400.0), pad(605.0)), 7.0, bucket));
    }

    #[test]
    fn test_find_capture_left_to_right() {
        let board = Board::new(&BoardConfig::default());
        let pos = DVec2::new(pad(113.5), pad(640.0));
        assert_eq!(find_capture(pos, 7.0, &board), Some(0));
        let pos = DVec2::new(pad(50.0), pad(640.0));
        assert_eq!(find_capture(pos, 7.0, &board), None);
    }
}
