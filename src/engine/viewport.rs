//! Scale factor and canvas sizing
//!
//! The board is always drawn whole, at the largest uniform scale that fits
//! the container. Physics never sees the scale.

use glam::DVec2;

use crate::error::EngineError;
use crate::renderer::Canvas;

/// Largest uniform scale that fits a `board` inside a `container`
pub fn fit_scale(container: (u32, u32), board: DVec2) -> f64 {
    (container.0 as f64 / board.x).min(container.1 as f64 / board.y)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Logical board size
    board: DVec2,
    scale: f64,
    /// Container size waiting to be applied at the next frame
    pending: Option<(u32, u32)>,
}

impl Viewport {
    /// Fit a board of logical size `board` into a container of device pixels
    pub fn fit(container: (u32, u32), board: DVec2) -> Result<Self, EngineError> {
        if container.0 == 0 || container.1 == 0 {
            return Err(EngineError::ZeroSizedSurface {
                width: container.0,
                height: container.1,
            });
        }
        Ok(Self {
            board,
            scale: fit_scale(container, board),
            pending: None,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Canvas backing size for the current scale
    pub fn canvas_size(&self) -> (u32, u32) {
        let size = self.board * self.scale;
        (size.x as u32, size.y as u32)
    }

    /// Record a new container size; zero sizes are rejected and the current
    /// dimensions kept
    pub fn request_resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.pending = Some((width, height));
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a pending resize, if any. Returns the new scale when it changed
    pub fn apply_pending<C: Canvas>(&mut self, canvas: &mut C) -> Option<f64> {
        let container = self.pending.take()?;
        self.scale = fit_scale(container, self.board);
        self.apply_to(canvas);
        Some(self.scale)
    }

    /// Size the canvas and install the scale transform
    pub fn apply_to<C: Canvas>(&self, canvas: &mut C) {
        let (w, h) = self.canvas_size();
        canvas.set_size(w, h);
        canvas.set_scale(self.scale);
    }

    /// Canvas pixel position to logical board coordinates
    pub fn to_logical(&self, px: DVec2) -> DVec2 {
        px / self.scale
    }
}
