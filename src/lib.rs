//! Plinko Drop - deterministic peg-board drop engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board layout, token physics, collisions)
//! - `engine`: Drop engine (live tokens, resize, hover, frame loop)
//! - `renderer`: Drawing surface abstraction plus canvas/WebGPU backends
//! - `config`: Board, physics and display tuning
//! - `web`: Browser host (wasm32 only)

pub mod config;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{BoardConfig, DisplaySettings, EngineConfig, PhysicsConfig, QualityPreset};
pub use engine::DropEngine;
pub use error::EngineError;
pub use sim::{Board, Bucket, Landing, Peg, Token};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (one physics step per 60 Hz frame)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical board dimensions
    pub const BOARD_WIDTH: f64 = 800.0;
    pub const BOARD_HEIGHT: f64 = 800.0;

    /// Peg lattice defaults
    pub const PEG_ROWS: usize = 16;
    pub const PEG_RADIUS: f64 = 4.0;
    pub const PEG_SPACING: f64 = 36.0;
    pub const ROW_SPACING: f64 = 35.0;
    pub const FIRST_ROW_Y: f64 = 70.0;

    /// Bucket defaults
    pub const BUCKET_WIDTH: f64 = 36.0;
    pub const BUCKET_HEIGHT: f64 = 36.0;
    /// Distance from the bottom edge to the bucket centre line
    pub const BUCKET_BASELINE: f64 = 170.0;

    /// Token defaults
    pub const DROP_HEIGHT: f64 = 50.0;
    pub const BALL_RADIUS: f64 = 7.0;
    pub const TRAIL_LENGTH: usize = 30;

    /// Physics defaults (logical px per tick)
    pub const GRAVITY: f64 = 0.2;
    pub const HORIZONTAL_FRICTION: f64 = 0.4;
    pub const VERTICAL_FRICTION: f64 = 0.8;

    /// Horizontal separation (logical px) substituted when a token sits exactly above a peg
    pub const DEGENERATE_NUDGE: f64 = 1.0;

    /// Display-only multiplier table, symmetric, lowest at the edges
    pub const DEFAULT_MULTIPLIERS: [f64; 17] = [
        0.2, 0.3, 0.5, 0.8, 1.0, 1.2, 1.5, 2.0, 3.0, 2.0, 1.5, 1.2, 1.0, 0.8, 0.5, 0.3, 0.2,
    ];

    /// Display-only landing probabilities (percent) shown in hover tooltips
    pub const DEFAULT_PROBABILITIES: [f64; 17] = [
        0.2, 0.45, 0.9, 3.0, 7.0, 7.45, 9.7, 12.5, 16.8, 12.5, 9.7, 7.45, 7.0, 3.0, 0.9, 0.45, 0.2,
    ];
}
