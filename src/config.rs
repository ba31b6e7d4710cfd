//! Engine configuration
//!
//! Board geometry and physics tuning are fixed for an engine's lifetime.
//! Display settings only change how the board is drawn.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f64 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether shadow glow around pegs and hovered buckets is rendered
    pub fn glow_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Peg lattice and bucket geometry, in logical board units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: f64,
    pub height: f64,
    /// Number of peg rows; the board has `rows + 1` buckets
    pub rows: usize,
    pub peg_radius: f64,
    /// Horizontal distance between neighbouring pegs in a row
    pub peg_spacing: f64,
    /// Vertical distance between rows
    pub row_spacing: f64,
    /// y of the first (three-peg) row
    pub first_row_y: f64,
    pub bucket_width: f64,
    pub bucket_height: f64,
    /// Distance from the bottom edge up to the bucket centre line
    pub bucket_baseline: f64,
    /// y at which every token starts
    pub drop_height: f64,
    /// Display multiplier per bucket, left to right
    pub multipliers: Vec<f64>,
    /// Display landing probability (percent) per bucket, left to right
    pub probabilities: Vec<f64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            rows: PEG_ROWS,
            peg_radius: PEG_RADIUS,
            peg_spacing: PEG_SPACING,
            row_spacing: ROW_SPACING,
            first_row_y: FIRST_ROW_Y,
            bucket_width: BUCKET_WIDTH,
            bucket_height: BUCKET_HEIGHT,
            bucket_baseline: BUCKET_BASELINE,
            drop_height: DROP_HEIGHT,
            multipliers: DEFAULT_MULTIPLIERS.to_vec(),
            probabilities: DEFAULT_PROBABILITIES.to_vec(),
        }
    }
}

impl BoardConfig {
    pub fn bucket_count(&self) -> usize {
        self.rows + 1
    }

    fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("peg_radius", self.peg_radius),
            ("peg_spacing", self.peg_spacing),
            ("row_spacing", self.row_spacing),
            ("bucket_width", self.bucket_width),
            ("bucket_height", self.bucket_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "board.{name} must be positive, got {value}"
                )));
            }
        }
        if self.rows == 0 {
            return Err(EngineError::InvalidConfig("board.rows must be at least 1".into()));
        }
        for (name, value) in [
            ("first_row_y", self.first_row_y),
            ("bucket_baseline", self.bucket_baseline),
            ("drop_height", self.drop_height),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfig(format!("board.{name} must be finite")));
            }
        }
        let buckets = self.bucket_count();
        if self.multipliers.len() != buckets {
            return Err(EngineError::InvalidConfig(format!(
                "board.multipliers has {} entries, expected {buckets}",
                self.multipliers.len()
            )));
        }
        if self.probabilities.len() != buckets {
            return Err(EngineError::InvalidConfig(format!(
                "board.probabilities has {} entries, expected {buckets}",
                self.probabilities.len()
            )));
        }
        Ok(())
    }
}

/// Physics tuning, per fixed tick, in logical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration added to vy every tick
    pub gravity: f64,
    /// Scale applied to the horizontal component of a peg bounce
    pub horizontal_friction: f64,
    /// Scale applied to the vertical component of a peg bounce
    pub vertical_friction: f64,
    pub ball_radius: f64,
    /// Maximum number of past positions kept per token
    pub trail_length: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            horizontal_friction: HORIZONTAL_FRICTION,
            vertical_friction: VERTICAL_FRICTION,
            ball_radius: BALL_RADIUS,
            trail_length: TRAIL_LENGTH,
        }
    }
}

impl PhysicsConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "physics.gravity must be positive, got {}",
                self.gravity
            )));
        }
        for (name, value) in [
            ("horizontal_friction", self.horizontal_friction),
            ("vertical_friction", self.vertical_friction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "physics.{name} must be within 0..=1, got {value}"
                )));
            }
        }
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "physics.ball_radius must be positive, got {}",
                self.ball_radius
            )));
        }
        Ok(())
    }
}

/// Frame pacing for the physics integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestepConfig {
    /// Physics steps per second
    pub hz: f64,
    /// Cap on physics steps run for one rendered frame
    pub max_substeps: u32,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            hz: 1.0 / SIM_DT,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl TimestepConfig {
    pub fn dt(&self) -> f64 {
        1.0 / self.hz
    }
}

/// Presentation preferences; never consulted by physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Token trails
    pub trails: bool,
    /// Shadow glow on pegs and hovered buckets
    pub glow: bool,
    /// Probability tooltip over the hovered bucket
    pub tooltips: bool,
    /// Reduced motion (no glow, short trails)
    pub reduced_motion: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            trails: true,
            glow: true,
            tooltips: true,
            reduced_motion: false,
        }
    }
}

impl DisplaySettings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if !preset.glow_enabled() {
            self.glow = false;
        }
    }

    /// Effective glow (respects preset and reduced_motion)
    pub fn effective_glow(&self) -> bool {
        self.glow && self.quality.glow_enabled() && !self.reduced_motion
    }

    /// Number of trail points actually drawn for a stored trail of `stored` points
    pub fn visible_trail(&self, stored: usize) -> usize {
        if !self.trails {
            return 0;
        }
        let quality = if self.reduced_motion {
            QualityPreset::Low.trail_quality()
        } else {
            self.quality.trail_quality()
        };
        ((stored as f64) * quality).ceil() as usize
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardConfig,
    pub physics: PhysicsConfig,
    pub timestep: TimestepConfig,
    pub display: DisplaySettings,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.board.validate()?;
        self.physics.validate()?;
        if !self.timestep.hz.is_finite() || self.timestep.hz <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "timestep.hz must be positive, got {}",
                self.timestep.hz
            )));
        }
        if self.timestep.max_substeps == 0 {
            return Err(EngineError::InvalidConfig(
                "timestep.max_substeps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
