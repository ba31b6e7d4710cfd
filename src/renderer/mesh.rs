//! Canvas that tessellates every drawing call into coloured triangles
//!
//! Gradients are sampled per vertex. Text and shadows have no triangle form
//! and are skipped; the WebGPU presenter draws whatever this produces.

use glam::DVec2;

use super::shapes;
use super::vertex::Vertex;
use super::{Canvas, Paint, PathOp, Rgba, TextStyle};

/// Grid resolution for rectangles filled with a radial gradient
const RADIAL_RECT_CELLS: u32 = 8;

#[derive(Debug, Clone)]
pub struct MeshCanvas {
    width: u32,
    height: u32,
    scale: f64,
    vertices: Vec<Vertex>,
}

impl MeshCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            vertices: Vec::new(),
        }
    }

    /// Triangle list for the current frame, in device pixels
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn push(&mut self, points: &[DVec2], paint: &Paint) {
        let scale = self.scale;
        self.vertices.extend(points.iter().map(|p| {
            let device = *p * scale;
            Vertex::new(device.x as f32, device.y as f32, paint.color_at(*p))
        }));
    }
}

impl Canvas for MeshCanvas {
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
        self.vertices.clear();
    }

    fn set_shadow(&mut self, _color: Rgba, _blur: f64) {}

    fn fill_rect(&mut self, origin: DVec2, size: DVec2, paint: &Paint) {
        let cells = match paint {
            Paint::Radial { .. } => RADIAL_RECT_CELLS,
            _ => 1,
        };
        let points = shapes::rect(origin, size, cells);
        self.push(&points, paint);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: &Paint) {
        let segments = shapes::circle_segments(radius * self.scale);
        let points = shapes::circle(center, radius, segments);
        self.push(&points, paint);
    }

    fn fill_path(&mut self, path: &[PathOp], paint: &Paint) {
        for outline in shapes::flatten(path) {
            let points = shapes::polygon_fan(&outline);
            self.push(&points, paint);
        }
    }

    fn stroke_path(&mut self, path: &[PathOp], color: Rgba, width: f64) {
        let paint = Paint::Solid(color);
        for outline in shapes::flatten(path) {
            let points = shapes::polyline(&outline, width);
            self.push(&points, &paint);
        }
    }

    fn fill_text(&mut self, _text: &str, _at: DVec2, _style: &TextStyle) {}
}
