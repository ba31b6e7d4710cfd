//! Board, bucket and token drawing
//!
//! Everything is drawn in logical board coordinates through `Canvas`.
//! Physics positions are unpadded here and nowhere else in the renderer.

use glam::DVec2;

use super::{Canvas, GradientStop, Paint, PathOp, Rgba, TextAlign, TextStyle, darken, with_alpha};
use crate::config::DisplaySettings;
use crate::sim::fixed::unpad_vec;
use crate::sim::{Board, Bucket, Token};

/// Colors for board elements
pub mod colors {
    use super::super::{Rgba, rgb};

    pub const BACKGROUND_TOP: Rgba = rgb(0x181818);
    pub const BACKGROUND_BOTTOM: Rgba = rgb(0x282828);
    pub const PEG: Rgba = [1.0, 1.0, 1.0, 1.0];
    pub const PEG_GLOW: Rgba = [1.0, 1.0, 1.0, 0.3];
    pub const LABEL_SHADOW: Rgba = [0.0, 0.0, 0.0, 0.3];
    pub const TOKEN: Rgba = rgb(0xffd700);
    pub const TOOLTIP_TOP: Rgba = [40.0 / 255.0, 44.0 / 255.0, 52.0 / 255.0, 0.95];
    pub const TOOLTIP_BOTTOM: Rgba = [30.0 / 255.0, 33.0 / 255.0, 40.0 / 255.0, 0.95];
    pub const TOOLTIP_BORDER: Rgba = [1.0, 1.0, 1.0, 0.1];
    pub const TEXT_LIGHT: Rgba = [1.0, 1.0, 1.0, 1.0];
    pub const TEXT_DARK: Rgba = [0.0, 0.0, 0.0, 1.0];

    /// Bucket bands from the edge inward
    pub const BUCKET_BANDS: [Rgba; 5] = [
        rgb(0xff003f),
        rgb(0xff7f00),
        rgb(0xffbf00),
        rgb(0xffff00),
        rgb(0x7fff00),
    ];
}

const PEG_GLOW_BLUR: f64 = 5.0;
const LABEL_SHADOW_BLUR: f64 = 2.0;
const HOVER_GLOW_RADIUS: f64 = 40.0;
const TOOLTIP_WIDTH: f64 = 70.0;
const TOOLTIP_HEIGHT: f64 = 24.0;
const TOOLTIP_CORNER: f64 = 5.0;
const TOOLTIP_ARROW: f64 = 5.0;
/// Space between the tooltip arrow tip and the bucket top
const TOOLTIP_MARGIN: f64 = 5.0;
const TRAIL_PEAK_ALPHA: f32 = 0.5;

/// Background and label colours for a bucket, banded by distance from the edge
pub fn bucket_colors(index: usize, count: usize) -> (Rgba, Rgba) {
    let from_edge = index.min(count.saturating_sub(1).saturating_sub(index));
    let band = (from_edge / 2).min(colors::BUCKET_BANDS.len() - 1);
    let text = if band >= 3 {
        colors::TEXT_DARK
    } else {
        colors::TEXT_LIGHT
    };
    (colors::BUCKET_BANDS[band], text)
}

/// Redraw the whole frame: background, pegs, buckets, then every live token
///
/// Each token records its current position into its trail before it is drawn.
pub fn draw_frame<C: Canvas>(
    canvas: &mut C,
    board: &Board,
    tokens: &mut [Token],
    hovered: Option<usize>,
    display: &DisplaySettings,
) {
    canvas.clear();
    draw_background(canvas, board);
    draw_pegs(canvas, board, display);
    draw_buckets(canvas, board, hovered, display);
    for token in tokens.iter_mut() {
        token.record_trail();
        draw_token(canvas, token, display);
    }
}

pub fn draw_background<C: Canvas>(canvas: &mut C, board: &Board) {
    let paint = Paint::Linear {
        start: DVec2::ZERO,
        end: DVec2::new(0.0, board.height),
        stops: vec![
            GradientStop::new(0.0, colors::BACKGROUND_TOP),
            GradientStop::new(1.0, colors::BACKGROUND_BOTTOM),
        ],
    };
    canvas.fill_rect(DVec2::ZERO, DVec2::new(board.width, board.height), &paint);
}

pub fn draw_pegs<C: Canvas>(canvas: &mut C, board: &Board, display: &DisplaySettings) {
    let glow = display.effective_glow();
    if glow {
        canvas.set_shadow(colors::PEG_GLOW, PEG_GLOW_BLUR);
    }
    let paint = Paint::Solid(colors::PEG);
    for peg in &board.pegs {
        let center = unpad_vec(peg.pos);
        canvas.fill_circle(center, peg.radius, &paint);
    }
    if glow {
        canvas.set_shadow(colors::PEG_GLOW, 0.0);
    }
}

/// Drawn rectangle of a bucket: its span narrowed by the inter-bucket gap
fn bucket_rect(bucket: &Bucket, gap: f64) -> (DVec2, DVec2) {
    let origin = DVec2::new(bucket.left() + gap / 2.0, bucket.top());
    (origin, DVec2::new(bucket.width - gap, bucket.height))
}

pub fn draw_buckets<C: Canvas>(
    canvas: &mut C,
    board: &Board,
    hovered: Option<usize>,
    display: &DisplaySettings,
) {
    let gap = board.bucket_gap();
    let count = board.buckets.len();
    let glow = display.effective_glow();

    for (i, bucket) in board.buckets.iter().enumerate() {
        let (base, text_color) = bucket_colors(i, count);
        let (origin, size) = bucket_rect(bucket, gap);
        let paint = Paint::Linear {
            start: DVec2::new(bucket.center.x, bucket.top()),
            end: DVec2::new(bucket.center.x, bucket.bottom()),
            stops: vec![
                GradientStop::new(0.0, base),
                GradientStop::new(1.0, darken(base, 0.3)),
            ],
        };
        canvas.fill_rect(origin, size, &paint);

        if glow {
            canvas.set_shadow(colors::LABEL_SHADOW, LABEL_SHADOW_BLUR);
        }
        canvas.fill_text(
            &format!("{}x", bucket.multiplier),
            DVec2::new(bucket.center.x, bucket.center.y + 4.0),
            &TextStyle {
                size_px: 13.0,
                bold: true,
                align: TextAlign::Center,
                color: text_color,
            },
        );
        if glow {
            canvas.set_shadow(colors::LABEL_SHADOW, 0.0);
        }

        if hovered == Some(i) {
            draw_hover_glow(canvas, bucket, gap);
            if display.tooltips {
                draw_tooltip(canvas, bucket);
            }
        }
    }
}

fn draw_hover_glow<C: Canvas>(canvas: &mut C, bucket: &Bucket, gap: f64) {
    let paint = Paint::Radial {
        center: bucket.center,
        inner_radius: 0.0,
        outer_radius: HOVER_GLOW_RADIUS,
        stops: vec![
            GradientStop::new(0.0, [1.0, 1.0, 1.0, 0.3]),
            GradientStop::new(0.5, [1.0, 1.0, 1.0, 0.1]),
            GradientStop::new(1.0, [1.0, 1.0, 1.0, 0.0]),
        ],
    };
    let (origin, size) = bucket_rect(bucket, gap);
    canvas.fill_rect(
        DVec2::new(origin.x - 10.0, bucket.center.y - bucket.height),
        DVec2::new(size.x + 20.0, bucket.height * 2.0),
        &paint,
    );
}

/// Rounded tooltip outline with a downward arrow, starting at `(x, y)` top-left
pub fn tooltip_path(x: f64, y: f64, w: f64, h: f64) -> Vec<PathOp> {
    let r = TOOLTIP_CORNER;
    let mid = x + w / 2.0;
    let p = DVec2::new;
    vec![
        PathOp::MoveTo(p(x + r, y)),
        PathOp::LineTo(p(x + w - r, y)),
        PathOp::QuadTo { ctrl: p(x + w, y), to: p(x + w, y + r) },
        PathOp::LineTo(p(x + w, y + h - r)),
        PathOp::QuadTo { ctrl: p(x + w, y + h), to: p(x + w - r, y + h) },
        PathOp::LineTo(p(mid + TOOLTIP_ARROW, y + h)),
        PathOp::LineTo(p(mid, y + h + TOOLTIP_ARROW)),
        PathOp::LineTo(p(mid - TOOLTIP_ARROW, y + h)),
        PathOp::LineTo(p(x + r, y + h)),
        PathOp::QuadTo { ctrl: p(x, y + h), to: p(x, y + h - r) },
        PathOp::LineTo(p(x, y + r)),
        PathOp::QuadTo { ctrl: p(x, y), to: p(x + r, y) },
        PathOp::Close,
    ]
}

pub fn draw_tooltip<C: Canvas>(canvas: &mut C, bucket: &Bucket) {
    let x = bucket.center.x - TOOLTIP_WIDTH / 2.0;
    let y = bucket.top() - TOOLTIP_HEIGHT - TOOLTIP_MARGIN;
    let path = tooltip_path(x, y, TOOLTIP_WIDTH, TOOLTIP_HEIGHT);
    let paint = Paint::Linear {
        start: DVec2::new(x, y),
        end: DVec2::new(x, y + TOOLTIP_HEIGHT),
        stops: vec![
            GradientStop::new(0.0, colors::TOOLTIP_TOP),
            GradientStop::new(1.0, colors::TOOLTIP_BOTTOM),
        ],
    };
    canvas.fill_path(&path, &paint);
    canvas.stroke_path(&path, colors::TOOLTIP_BORDER, 1.0);
    canvas.fill_text(
        &format!("{:.1}%", bucket.probability),
        DVec2::new(x + TOOLTIP_WIDTH / 2.0, y + TOOLTIP_HEIGHT / 2.0 + 4.0),
        &TextStyle {
            size_px: 12.0,
            bold: true,
            align: TextAlign::Center,
            color: colors::TEXT_LIGHT,
        },
    );
}

/// Fading trail (newest point brightest and largest), then the solid body
pub fn draw_token<C: Canvas>(canvas: &mut C, token: &Token, display: &DisplaySettings) {
    let capacity = token.trail_length().max(1) as f64;
    let visible = display.visible_trail(token.trail.len());
    for (i, point) in token.trail.iter().take(visible).enumerate() {
        let age = i as f64 / capacity;
        let alpha = ((capacity - i as f64) / capacity) as f32 * TRAIL_PEAK_ALPHA;
        let center = unpad_vec(point.pos);
        let paint = Paint::Radial {
            center,
            inner_radius: 0.0,
            outer_radius: token.radius,
            stops: vec![
                GradientStop::new(0.0, with_alpha(colors::TOKEN, alpha)),
                GradientStop::new(1.0, with_alpha(colors::TOKEN, 0.0)),
            ],
        };
        canvas.fill_circle(center, token.radius * (1.0 - age), &paint);
    }

    canvas.fill_circle(token.logical_pos(), token.radius, &Paint::Solid(colors::TOKEN));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoardConfig, PhysicsConfig, QualityPreset};
    use crate::renderer::{DrawCommand, RecordingCanvas, rgb};
    use crate::sim::fixed::pad;

    fn board() -> Board {
        Board::new(&BoardConfig::default())
    }

    #[test]
    fn test_bucket_color_bands() {
        assert_eq!(bucket_colors(0, 17).0, rgb(0xff003f));
        assert_eq!(bucket_colors(16, 17).0, rgb(0xff003f));
        assert_eq!(bucket_colors(2, 17).0, rgb(0xff7f00));
        assert_eq!(bucket_colors(5, 17).0, rgb(0xffbf00));
        assert_eq!(bucket_colors(9, 17), (rgb(0xffff00), colors::TEXT_DARK));
        assert_eq!(bucket_colors(8, 17), (rgb(0x7fff00), colors::TEXT_DARK));
        assert_eq!(bucket_colors(1, 17).1, colors::TEXT_LIGHT);
    }

    #[test]
    fn test_static_frame_contents() {
        let board = board();
        let mut canvas = RecordingCanvas::new(800, 800);
        draw_frame(&mut canvas, &board, &mut [], None, &DisplaySettings::default());

        assert!(matches!(canvas.commands()[0], DrawCommand::Rect { .. }));
        assert_eq!(canvas.solid_circles(colors::PEG).len(), board.pegs.len());
        let labels = canvas.texts();
        assert_eq!(labels.len(), board.buckets.len());
        assert_eq!(labels[0], "0.2x");
        assert_eq!(labels[8], "3x");
    }

    #[test]
    fn test_hover_adds_tooltip() {
        let board = board();
        let mut canvas = RecordingCanvas::new(800, 800);
        draw_frame(&mut canvas, &board, &mut [], Some(8), &DisplaySettings::default());
        assert!(canvas.texts().contains(&"16.8%"));
        assert!(
            canvas
                .commands()
                .iter()
                .any(|c| matches!(c, DrawCommand::StrokePath { .. }))
        );
    }

    #[test]
    fn test_tooltips_can_be_disabled() {
        let board = board();
        let display = DisplaySettings {
            tooltips: false,
            ..Default::default()
        };
        let mut canvas = RecordingCanvas::new(800, 800);
        draw_frame(&mut canvas, &board, &mut [], Some(8), &display);
        assert!(!canvas.texts().contains(&"16.8%"));
    }

    #[test]
    fn test_low_quality_has_no_shadows() {
        let board = board();
        let mut canvas = RecordingCanvas::new(800, 800);
        let display = DisplaySettings::from_preset(QualityPreset::Low);
        draw_frame(&mut canvas, &board, &mut [], None, &display);
        assert!(
            !canvas
                .commands()
                .iter()
                .any(|c| matches!(c, DrawCommand::Shadow { .. }))
        );
    }

    #[test]
    fn test_tooltip_path_is_closed() {
        let path = tooltip_path(0.0, 0.0, 70.0, 24.0);
        assert_eq!(path.first(), Some(&PathOp::MoveTo(DVec2::new(5.0, 0.0))));
        assert_eq!(path.last(), Some(&PathOp::Close));
        // Arrow tip hangs below the box
        assert!(path.contains(&PathOp::LineTo(DVec2::new(35.0, 29.0))));
    }

    #[test]
    fn test_token_drawn_with_trail() {
        let board = board();
        let physics = PhysicsConfig::default();
        let mut tokens = vec![Token::new(1, pad(395.0), &board, &physics)];
        let mut canvas = RecordingCanvas::new(800, 800);
        draw_frame(&mut canvas, &board, &mut tokens, None, &DisplaySettings::default());

        assert_eq!(tokens[0].trail.len(), 1);
        let bodies = canvas.solid_circles(colors::TOKEN);
        assert_eq!(bodies, vec![(DVec2::new(395.0, 50.0), 7.0)]);
    }

    #[test]
    fn test_trail_fades_with_age() {
        let board = board();
        let physics = PhysicsConfig::default();
        let mut token = Token::new(1, pad(395.0), &board, &physics);
        for _ in 0..5 {
            token.record_trail();
            token.update(&board, &physics);
        }
        let mut canvas = RecordingCanvas::new(800, 800);
        draw_token(&mut canvas, &token, &DisplaySettings::default());

        let radii: Vec<f64> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Circle {
                    radius,
                    paint: Paint::Radial { .. },
                    ..
                } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii.len(), 5);
        assert!(radii.windows(2).all(|w| w[0] > w[1]));
    }
}
