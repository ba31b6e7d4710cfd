//! Fixed timestep simulation tick
//!
//! Advances the live token set deterministically. The trajectory of a token
//! depends only on how many steps it has taken, never on host frame pacing.

use super::board::Board;
use super::token::{Landing, Token};
use crate::config::PhysicsConfig;
use crate::error::EngineError;

/// Fixed timestep accumulator
///
/// Host frame deltas go in, a whole number of physics steps comes out.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per step, in seconds
    dt: f64,
    /// Accumulated time from variable frame deltas
    accumulator: f64,
    /// Cap on steps per frame to prevent a spiral of death
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f64, max_steps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    ///
    /// Negative or non-finite frame times count as zero.
    pub fn accumulate(&mut self, frame_dt: f64) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f64);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f64 * self.dt;
        steps
    }

    /// Drop any partial step (used when the host loop restarts)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

}

/// Run up to `steps` physics steps on one token, stopping at capture
pub fn advance_token(
    token: &mut Token,
    board: &Board,
    physics: &PhysicsConfig,
    steps: u32,
) -> Option<Landing> {
    for _ in 0..steps {
        if token.update(board, physics).is_some() {
            return token.landing();
        }
    }
    None
}

/// Advance every live token and remove the ones that landed
///
/// Landings are returned in insertion order of the tokens. A token whose state
/// stops being finite aborts the step with `CorruptState`; tokens earlier in
/// the set have already been advanced at that point.
pub fn advance(
    tokens: &mut Vec<Token>,
    board: &Board,
    physics: &PhysicsConfig,
    steps: u32,
) -> Result<Vec<Landing>, EngineError> {
    let mut landings = Vec::new();
    for token in tokens.iter_mut() {
        if let Some(landing) = advance_token(token, board, physics, steps) {
            landings.push(landing);
        }
        if !token.is_finite() {
            return Err(EngineError::CorruptState { token: token.id });
        }
    }
    tokens.retain(Token::is_falling);
    Ok(landings)
}
