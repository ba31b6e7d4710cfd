//! Deterministic simulation module
//!
//! All drop physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Fixed-point positions, trig-free collision math
//! - Stable iteration order (pegs in layout order, tokens in drop order)
//! - No rendering or platform dependencies

pub mod board;
pub mod collision;
pub mod fixed;
pub mod outcomes;
pub mod tick;
pub mod token;

pub use board::{Board, Bucket, Peg};
pub use collision::{CollisionResult, WallHit, find_capture, peg_contact};
pub use fixed::{PADDING, pad, unpad};
pub use outcomes::{OutcomeTable, Sample, simulate_drop, survey};
pub use tick::{FixedTimestep, advance, advance_token};
pub use token::{Landing, Token, TokenState, TrailPoint};
