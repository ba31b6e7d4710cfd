//! A single dropped token and its per-tick physics
//!
//! A token only reads the board; it never owns pegs or buckets. Once captured
//! it stops moving and reports its bucket exactly once.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::collision::{WallHit, bounce, find_capture, peg_contact, separate, wall_contact};
use super::fixed::{pad, unpad, unpad_vec};
use crate::config::PhysicsConfig;

/// Lifecycle of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenState {
    /// Moving under gravity; the only state in which position changes
    Falling,
    /// Terminal: resting in the given bucket
    Captured { bucket: usize },
}

/// Completion notification for one drop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    pub token_id: u32,
    /// Index of the capturing bucket, left to right
    pub bucket: usize,
    /// Fixed-point offset the drop started from
    pub offset: f64,
    /// Physics steps taken before capture
    pub ticks: u64,
}

/// Past position kept for trail rendering (fixed-point)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: DVec2,
}

/// A dropped token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: u32,
    /// Centre, fixed-point
    pub pos: DVec2,
    /// Velocity per tick, fixed-point
    pub vel: DVec2,
    /// Radius, logical
    pub radius: f64,
    /// Fixed-point horizontal offset the token was dropped from
    pub offset: f64,
    pub state: TokenState,
    /// Physics steps taken so far
    pub ticks: u64,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: VecDeque<TrailPoint>,
    trail_length: usize,
    #[serde(skip)]
    off_board_reported: bool,
}

impl Token {
    /// Place a new token at the board's drop height and the given offset
    pub fn new(id: u32, offset: f64, board: &Board, physics: &PhysicsConfig) -> Self {
        Self {
            id,
            pos: DVec2::new(offset, pad(board.drop_height)),
            vel: DVec2::ZERO,
            radius: physics.ball_radius,
            offset,
            state: TokenState::Falling,
            ticks: 0,
            trail: VecDeque::with_capacity(physics.trail_length + 1),
            trail_length: physics.trail_length,
            off_board_reported: false,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.state == TokenState::Falling
    }

    /// Centre in whole logical units, as drawn and as compared against buckets
    pub fn logical_pos(&self) -> DVec2 {
        unpad_vec(self.pos)
    }

    /// Whether position and velocity are still real numbers
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }

    /// Maximum number of trail points kept
    pub fn trail_length(&self) -> usize {
        self.trail_length
    }

    /// Record current position to trail (call once per drawn frame)
    pub fn record_trail(&mut self) {
        self.trail.push_front(TrailPoint { pos: self.pos });
        self.trail.truncate(self.trail_length);
    }

    /// Advance one fixed physics step
    ///
    /// Returns the capturing bucket index on the step that captures the token,
    /// and `None` on every other call, including every call after capture.
    pub fn update(&mut self, board: &Board, physics: &PhysicsConfig) -> Option<usize> {
        if !self.is_falling() {
            return None;
        }
        self.ticks += 1;

        // Semi-implicit Euler: velocity first, then position
        self.vel.y += pad(physics.gravity);
        self.pos.x += self.vel.x;
        self.pos.y += self.vel.y;

        for peg in &board.pegs {
            let contact = peg_contact(self.pos, self.radius, peg);
            if contact.hit {
                self.vel = bounce(
                    self.vel,
                    contact.normal,
                    physics.horizontal_friction,
                    physics.vertical_friction,
                );
                self.pos = separate(self.pos, contact.normal, contact.penetration);
            }
        }

        match wall_contact(self.pos, self.radius, board.width) {
            Some(WallHit::Left) => {
                self.pos.x = pad(self.radius);
                self.vel.x = self.vel.x.abs() * physics.horizontal_friction;
            }
            Some(WallHit::Right) => {
                self.pos.x = pad(board.width - self.radius);
                self.vel.x = -self.vel.x.abs() * physics.horizontal_friction;
            }
            None => {}
        }

        if let Some(bucket) = find_capture(self.pos, self.radius, board) {
            self.vel = DVec2::ZERO;
            self.state = TokenState::Captured { bucket };
            return Some(bucket);
        }

        if !self.off_board_reported && unpad(self.pos.y) > board.height * 2.0 {
            self.off_board_reported = true;
            log::warn!(
                "Token {} is a board height below the bottom and still falling (offset {})",
                self.id,
                self.offset
            );
        }

        None
    }

    /// Build the completion notification for a captured token
    pub fn landing(&self) -> Option<Landing> {
        match self.state {
            TokenState::Captured { bucket } => Some(Landing {
                token_id: self.id,
                bucket,
                offset: self.offset,
                ticks: self.ticks,
            }),
            TokenState::Falling => None,
        }
    }
}
