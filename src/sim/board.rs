//! Board layout: the peg lattice and the bucket row
//!
//! Built once per engine from `BoardConfig` and never mutated afterwards.
//! Pegs live in fixed-point space (they take part in collision math), buckets
//! in logical space (they are compared against unpadded token positions).

use std::ops::Range;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::fixed::{pad, pad_vec, unpad};
use crate::config::BoardConfig;

/// A fixed circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    /// Centre, fixed-point
    pub pos: DVec2,
    /// Radius, logical
    pub radius: f64,
}

/// A capture zone at the bottom of the board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Centre, logical
    pub center: DVec2,
    pub width: f64,
    pub height: f64,
    /// Display-only payout multiplier
    pub multiplier: f64,
    /// Display-only landing probability (percent)
    pub probability: f64,
}

impl Bucket {
    #[inline]
    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    /// Half-open horizontal span test so neighbouring buckets tile without gaps
    #[inline]
    pub fn spans_x(&self, x: f64) -> bool {
        x >= self.left() && x < self.right()
    }

    /// Point-in-bounds test used for pointer hover (logical coordinates)
    pub fn contains_point(&self, p: DVec2) -> bool {
        self.spans_x(p.x) && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// The immutable board shared by every token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f64,
    pub height: f64,
    /// Starting y for every token, logical
    pub drop_height: f64,
    /// Number of peg rows
    pub rows: usize,
    pub pegs: Vec<Peg>,
    /// Ordered left to right; index is the outcome identity
    pub buckets: Vec<Bucket>,
}

impl Board {
    /// Lay out the peg lattice and bucket row (pure function of the config)
    ///
    /// Row `k` holds `k + 3` pegs centred on the board, so consecutive rows are
    /// staggered by half a spacing. The last row leaves `rows + 1` gaps, one
    /// above each bucket.
    pub fn new(config: &BoardConfig) -> Self {
        let mut pegs = Vec::new();
        for row in 0..config.rows {
            let count = row + 3;
            let y = config.first_row_y + row as f64 * config.row_spacing;
            for col in 0..count {
                let x = config.width / 2.0 - config.peg_spacing * (row + 2) as f64 / 2.0
                    + col as f64 * config.peg_spacing;
                pegs.push(Peg {
                    pos: pad_vec(DVec2::new(x, y)),
                    radius: config.peg_radius,
                });
            }
        }

        let bucket_count = config.bucket_count();
        let center_index = (bucket_count / 2) as f64;
        let y = config.height - config.bucket_baseline;
        let buckets = (0..bucket_count)
            .map(|i| Bucket {
                center: DVec2::new(
                    config.width / 2.0 + config.bucket_width * (i as f64 - center_index),
                    y,
                ),
                width: config.bucket_width,
                height: config.bucket_height,
                multiplier: config.multipliers[i],
                probability: config.probabilities[i],
            })
            .collect();

        Self {
            width: config.width,
            height: config.height,
            drop_height: config.drop_height,
            rows: config.rows,
            pegs,
            buckets,
        }
    }

    /// Default starting offset (fixed-point): the horizontal centre
    pub fn center_offset(&self) -> f64 {
        pad(self.width / 2.0)
    }

    /// Logical x range a drop may start from: the span of the bucket row
    ///
    /// Tokens started outside it can fall past the outermost pegs and never
    /// reach a bucket.
    pub fn drop_span(&self) -> Range<f64> {
        match (self.buckets.first(), self.buckets.last()) {
            (Some(first), Some(last)) => first.left()..last.right(),
            _ => 0.0..0.0,
        }
    }

    /// Whether a fixed-point offset starts over the bucket row
    ///
    /// Compared after unpadding, the same way capture compares positions.
    pub fn contains_offset(&self, offset: f64) -> bool {
        offset.is_finite() && self.drop_span().contains(&unpad(offset))
    }

    /// First bucket (left to right) whose bounds contain a logical point
    pub fn bucket_at(&self, p: DVec2) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains_point(p))
    }

    /// Gap between drawn bucket rectangles
    pub fn bucket_gap(&self) -> f64 {
        self.pegs.first().map(|p| p.radius * 2.0).unwrap_or(0.0)
    }
}
