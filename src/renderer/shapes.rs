//! Shape tessellation for 2D primitives
//!
//! Every function returns a flat triangle list (three points per triangle) in
//! the caller's coordinate space. Colouring happens later, per vertex.

use glam::DVec2;
use std::f64::consts::PI;

use super::PathOp;

/// Segments used to flatten one quadratic curve
const QUAD_SEGMENTS: u32 = 6;

/// Segment count for a circle of the given on-screen radius
pub fn circle_segments(radius_px: f64) -> u32 {
    (radius_px.max(0.0) as u32).clamp(12, 64)
}

/// Filled circle as a triangle fan around the centre
pub fn circle(center: DVec2, radius: f64, segments: u32) -> Vec<DVec2> {
    let segments = segments.max(3);
    let mut points = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f64 / segments as f64) * 2.0 * PI;
        let theta2 = ((i + 1) as f64 / segments as f64) * 2.0 * PI;

        // Triangle from center to edge
        points.push(center);
        points.push(center + DVec2::new(theta1.cos(), theta1.sin()) * radius);
        points.push(center + DVec2::new(theta2.cos(), theta2.sin()) * radius);
    }

    points
}

/// Axis-aligned rectangle split into a `cells x cells` grid
///
/// A finer grid lets per-vertex colouring approximate radial gradients.
pub fn rect(origin: DVec2, size: DVec2, cells: u32) -> Vec<DVec2> {
    let cells = cells.max(1);
    let step = size / cells as f64;
    let mut points = Vec::with_capacity((cells * cells * 6) as usize);

    for row in 0..cells {
        for col in 0..cells {
            let a = origin + step * DVec2::new(col as f64, row as f64);
            let b = a + DVec2::new(step.x, 0.0);
            let c = a + step;
            let d = a + DVec2::new(0.0, step.y);

            // Two triangles per cell
            points.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    points
}

/// Flatten a path into polylines, one per subpath
///
/// Closed subpaths repeat their first point at the end.
pub fn flatten(path: &[PathOp]) -> Vec<Vec<DVec2>> {
    let mut subpaths = Vec::new();
    let mut current: Vec<DVec2> = Vec::new();

    for op in path {
        match *op {
            PathOp::MoveTo(p) => {
                if current.len() > 1 {
                    subpaths.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            PathOp::LineTo(p) => current.push(p),
            PathOp::QuadTo { ctrl, to } => {
                let from = current.last().copied().unwrap_or(ctrl);
                for i in 1..=QUAD_SEGMENTS {
                    let t = i as f64 / QUAD_SEGMENTS as f64;
                    let u = 1.0 - t;
                    current.push(from * (u * u) + ctrl * (2.0 * u * t) + to * (t * t));
                }
            }
            PathOp::Close => {
                if let Some(&first) = current.first() {
                    current.push(first);
                }
                if current.len() > 1 {
                    subpaths.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if current.len() > 1 {
        subpaths.push(current);
    }

    subpaths
}

/// Fill a polygon as a fan around its vertex centroid
///
/// Exact for shapes that are star-shaped about the centroid, which covers
/// rounded boxes with a small arrow.
pub fn polygon_fan(outline: &[DVec2]) -> Vec<DVec2> {
    if outline.len() < 3 {
        return Vec::new();
    }
    let centroid = outline.iter().copied().sum::<DVec2>() / outline.len() as f64;
    let mut points = Vec::with_capacity(outline.len() * 3);
    for pair in outline.windows(2) {
        points.extend_from_slice(&[centroid, pair[0], pair[1]]);
    }
    points
}

/// Stroke a polyline with quads of the given width
pub fn polyline(points: &[DVec2], width: f64) -> Vec<DVec2> {
    let mut out = Vec::with_capacity(points.len().saturating_sub(1) * 6);
    let half = width / 2.0;

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        // Direction from p1 to p2
        let dir = (p2 - p1).normalize_or_zero();
        if dir == DVec2::ZERO {
            continue;
        }
        // Perpendicular for width
        let perp = DVec2::new(-dir.y, dir.x) * half;

        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        // Two triangles
        out.extend_from_slice(&[v1a, v1b, v2a, v2a, v1b, v2b]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_points_on_radius() {
        let pts = circle(DVec2::new(10.0, 10.0), 5.0, 16);
        assert_eq!(pts.len(), 48);
        for tri in pts.chunks(3) {
            assert_eq!(tri[0], DVec2::new(10.0, 10.0));
            assert!((tri[1].distance(tri[0]) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rect_grid_covers_area() {
        let pts = rect(DVec2::ZERO, DVec2::new(4.0, 2.0), 2);
        assert_eq!(pts.len(), 24);
        let area: f64 = pts
            .chunks(3)
            .map(|t| ((t[1] - t[0]).perp_dot(t[2] - t[0])).abs() / 2.0)
            .sum();
        assert!((area - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_flatten_closes_subpath() {
        let path = [
            PathOp::MoveTo(DVec2::ZERO),
            PathOp::LineTo(DVec2::new(1.0, 0.0)),
            PathOp::QuadTo {
                ctrl: DVec2::new(1.0, 1.0),
                to: DVec2::new(0.0, 1.0),
            },
            PathOp::Close,
        ];
        let subpaths = flatten(&path);
        assert_eq!(subpaths.len(), 1);
        let outline = &subpaths[0];
        assert_eq!(outline.first(), outline.last());
        assert_eq!(outline.len(), 2 + QUAD_SEGMENTS as usize + 1);
        assert_eq!(outline[outline.len() - 2], DVec2::new(0.0, 1.0));
    }

    #[test]
    fn test_polyline_skips_degenerate_segments() {
        let pts = polyline(&[DVec2::ZERO, DVec2::ZERO, DVec2::new(1.0, 0.0)], 2.0);
        assert_eq!(pts.len(), 6);
    }

    #[test]
    fn test_polygon_fan_needs_three_points() {
        assert!(polygon_fan(&[DVec2::ZERO, DVec2::ONE]).is_empty());
        let square = [
            DVec2::ZERO,
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
            DVec2::ZERO,
        ];
        assert_eq!(polygon_fan(&square).len(), 12);
    }
}
