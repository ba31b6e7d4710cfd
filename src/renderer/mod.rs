//! Rendering module
//!
//! The engine never talks to a graphics API directly. It draws through the
//! `Canvas` trait, a small 2D immediate-mode surface in logical board
//! coordinates; each backend applies the scale factor it was given.
//!
//! Backends:
//! - `RecordingCanvas`: headless display list (tests, tooling)
//! - `MeshCanvas`: tessellates into coloured triangles for `GpuPresenter`
//! - `WebCanvas` (wasm32): `CanvasRenderingContext2d`

pub mod mesh;
pub mod pipeline;
pub mod recording;
pub mod scene;
pub mod shapes;
pub mod vertex;
#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use mesh::MeshCanvas;
pub use pipeline::{GpuCanvas, GpuPresenter};
pub use recording::{DrawCommand, RecordingCanvas};
#[cfg(target_arch = "wasm32")]
pub use web::WebCanvas;

/// Linear RGBA colour, components in 0..=1
pub type Rgba = [f32; 4];

/// Colour from a `0xRRGGBB` literal
pub const fn rgb(hex: u32) -> Rgba {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Same colour with a different alpha
pub const fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha]
}

/// Darken RGB by `amount` (0 = unchanged, 1 = black)
pub fn darken(color: Rgba, amount: f32) -> Rgba {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [color[0] * k, color[1] * k, color[2] * k, color[3]]
}

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0..=1
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// How a filled shape is coloured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Solid(Rgba),
    /// Gradient along the segment `start -> end`
    Linear {
        start: DVec2,
        end: DVec2,
        stops: Vec<GradientStop>,
    },
    /// Concentric gradient between two radii around `center`
    Radial {
        center: DVec2,
        inner_radius: f64,
        outer_radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Evaluate the paint at a logical point
    ///
    /// Backends without native gradients sample this per vertex.
    pub fn color_at(&self, p: DVec2) -> Rgba {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { start, end, stops } => {
                let axis = *end - *start;
                let len_sq = axis.length_squared();
                let t = if len_sq > 0.0 {
                    (p - *start).dot(axis) / len_sq
                } else {
                    0.0
                };
                sample_stops(stops, t as f32)
            }
            Paint::Radial {
                center,
                inner_radius,
                outer_radius,
                stops,
            } => {
                let span = outer_radius - inner_radius;
                let t = if span > 0.0 {
                    (p.distance(*center) - inner_radius) / span
                } else {
                    0.0
                };
                sample_stops(stops, t as f32)
            }
        }
    }
}

/// Piecewise-linear colour lookup, clamped to the end stops
fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0.0; 4];
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let u = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return lerp_color(a.color, b.color, u);
        }
    }
    last.color
}

/// One segment of a path, in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    MoveTo(DVec2),
    LineTo(DVec2),
    QuadTo { ctrl: DVec2, to: DVec2 },
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in logical pixels
    pub size_px: f64,
    pub bold: bool,
    pub align: TextAlign,
    pub color: Rgba,
}

/// The drawing surface the engine renders to
///
/// All coordinates passed to drawing calls are logical board coordinates.
/// `set_scale` tells the backend how many device pixels one logical unit
/// covers; `set_size` and `size` are in device pixels.
pub trait Canvas {
    /// Current backing size in device pixels
    fn size(&self) -> (u32, u32);
    /// Resize the backing surface
    fn set_size(&mut self, width: u32, height: u32);
    /// Logical-to-device scale applied to every later drawing call
    fn set_scale(&mut self, scale: f64);
    /// Clear the whole surface to transparent
    fn clear(&mut self);
    /// Glow applied to later fills; a zero blur disables it
    fn set_shadow(&mut self, color: Rgba, blur: f64);
    fn fill_rect(&mut self, origin: DVec2, size: DVec2, paint: &Paint);
    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: &Paint);
    fn fill_path(&mut self, path: &[PathOp], paint: &Paint);
    fn stroke_path(&mut self, path: &[PathOp], color: Rgba, width: f64);
    fn fill_text(&mut self, text: &str, at: DVec2, style: &TextStyle);
    /// End of frame; backends report deferred faults here
    fn finish(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Lets a host pick the backend at runtime (`DropEngine<Box<dyn Canvas>>`)
impl<T: Canvas + ?Sized> Canvas for Box<T> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }
    fn set_size(&mut self, width: u32, height: u32) {
        (**self).set_size(width, height)
    }
    fn set_scale(&mut self, scale: f64) {
        (**self).set_scale(scale)
    }
    fn clear(&mut self) {
        (**self).clear()
    }
    fn set_shadow(&mut self, color: Rgba, blur: f64) {
        (**self).set_shadow(color, blur)
    }
    fn fill_rect(&mut self, origin: DVec2, size: DVec2, paint: &Paint) {
        (**self).fill_rect(origin, size, paint)
    }
    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: &Paint) {
        (**self).fill_circle(center, radius, paint)
    }
    fn fill_path(&mut self, path: &[PathOp], paint: &Paint) {
        (**self).fill_path(path, paint)
    }
    fn stroke_path(&mut self, path: &[PathOp], color: Rgba, width: f64) {
        (**self).stroke_path(path, color, width)
    }
    fn fill_text(&mut self, text: &str, at: DVec2, style: &TextStyle) {
        (**self).fill_text(text, at, style)
    }
    fn finish(&mut self) -> Result<(), EngineError> {
        (**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_literal() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_darken() {
        let c = darken([1.0, 0.5, 0.0, 0.7], 0.3);
        assert!((c[0] - 0.7).abs() < 1e-6);
        assert!((c[1] - 0.35).abs() < 1e-6);
        assert_eq!(c[3], 0.7);
    }

    #[test]
    fn test_linear_paint_endpoints() {
        let paint = Paint::Linear {
            start: DVec2::new(0.0, 0.0),
            end: DVec2::new(0.0, 100.0),
            stops: vec![
                GradientStop::new(0.0, [0.0, 0.0, 0.0, 1.0]),
                GradientStop::new(1.0, [1.0, 1.0, 1.0, 1.0]),
            ],
        };
        assert_eq!(paint.color_at(DVec2::new(5.0, -10.0)), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(paint.color_at(DVec2::new(5.0, 200.0)), [1.0, 1.0, 1.0, 1.0]);
        let mid = paint.color_at(DVec2::new(0.0, 50.0));
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_radial_paint_fades_out() {
        let paint = Paint::Radial {
            center: DVec2::ZERO,
            inner_radius: 0.0,
            outer_radius: 10.0,
            stops: vec![
                GradientStop::new(0.0, [1.0, 0.84, 0.0, 0.5]),
                GradientStop::new(1.0, [1.0, 0.84, 0.0, 0.0]),
            ],
        };
        assert_eq!(paint.color_at(DVec2::ZERO)[3], 0.5);
        assert_eq!(paint.color_at(DVec2::new(20.0, 0.0))[3], 0.0);
    }

    #[test]
    fn test_empty_stops_are_transparent() {
        let paint = Paint::Linear {
            start: DVec2::ZERO,
            end: DVec2::ONE,
            stops: vec![],
        };
        assert_eq!(paint.color_at(DVec2::ZERO), [0.0; 4]);
    }
}
