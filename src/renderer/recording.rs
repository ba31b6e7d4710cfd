//! Headless canvas that records a display list
//!
//! Each `clear` starts a new frame, so `commands()` always holds exactly what
//! the most recent frame drew.

use glam::DVec2;
use serde::Serialize;

use super::{Canvas, Paint, PathOp, Rgba, TextStyle};
use crate::error::EngineError;

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Shadow {
        color: Rgba,
        blur: f64,
    },
    Rect {
        origin: DVec2,
        size: DVec2,
        paint: Paint,
    },
    Circle {
        center: DVec2,
        radius: f64,
        paint: Paint,
    },
    FillPath {
        path: Vec<PathOp>,
        paint: Paint,
    },
    StrokePath {
        path: Vec<PathOp>,
        color: Rgba,
        width: f64,
    },
    Text {
        text: String,
        at: DVec2,
        style: TextStyle,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    scale: f64,
    commands: Vec<DrawCommand>,
    /// Number of completed frames
    frames: u64,
    /// Fault to report from the next `finish` (fault injection)
    fail_next: Option<String>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            ..Default::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Make the next `finish` fail with a surface fault
    pub fn fail_next_frame(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Circles drawn with a solid fill of the given colour
    pub fn solid_circles(&self, color: Rgba) -> Vec<(DVec2, f64)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Circle {
                    center,
                    radius,
                    paint: Paint::Solid(c),
                } if *c == color => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }

    /// Text strings drawn this frame
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn set_shadow(&mut self, color: Rgba, blur: f64) {
        self.commands.push(DrawCommand::Shadow { color, blur });
    }

    fn fill_rect(&mut self, origin: DVec2, size: DVec2, paint: &Paint) {
        self.commands.push(DrawCommand::Rect {
            origin,
            size,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn fill_path(&mut self, path: &[PathOp], paint: &Paint) {
        self.commands.push(DrawCommand::FillPath {
            path: path.to_vec(),
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &[PathOp], color: Rgba, width: f64) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.to_vec(),
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, at: DVec2, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style: *style,
        });
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(EngineError::Surface(reason));
        }
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_starts_new_frame() {
        let mut canvas = RecordingCanvas::new(100, 100);
        canvas.fill_circle(DVec2::ZERO, 1.0, &Paint::Solid([1.0; 4]));
        assert_eq!(canvas.commands().len(), 1);
        canvas.clear();
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn test_finish_counts_frames_and_reports_faults() {
        let mut canvas = RecordingCanvas::new(100, 100);
        assert!(canvas.finish().is_ok());
        canvas.fail_next_frame("context lost");
        assert_eq!(
            canvas.finish(),
            Err(EngineError::Surface("context lost".into()))
        );
        assert_eq!(canvas.frames(), 1);
        assert!(canvas.finish().is_ok());
    }

    #[test]
    fn test_solid_circle_filter() {
        let mut canvas = RecordingCanvas::new(100, 100);
        canvas.fill_circle(DVec2::new(1.0, 2.0), 3.0, &Paint::Solid([1.0; 4]));
        canvas.fill_circle(DVec2::new(4.0, 5.0), 6.0, &Paint::Solid([0.0; 4]));
        assert_eq!(canvas.solid_circles([1.0; 4]), vec![(DVec2::new(1.0, 2.0), 3.0)]);
    }
}
