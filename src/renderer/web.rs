//! Canvas backed by a browser `CanvasRenderingContext2d`
//!
//! Drawing calls that can throw record the first JS error; `finish` reports it
//! as a surface fault so the engine stops instead of drawing garbage.

use std::f64::consts::PI;

use glam::DVec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Canvas, GradientStop, Paint, PathOp, Rgba, TextAlign, TextStyle};
use crate::error::EngineError;

/// CSS `rgba()` string for a colour
fn css(color: Rgba) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        color[3].clamp(0.0, 1.0)
    )
}

pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scale: f64,
    fault: Option<String>,
}

impl WebCanvas {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EngineError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| EngineError::MissingSurface(format!("2d context: {e:?}")))?
            .ok_or_else(|| EngineError::MissingSurface("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::MissingSurface("2d context has the wrong type".into()))?;
        Ok(Self {
            canvas,
            ctx,
            scale: 1.0,
            fault: None,
        })
    }

    fn record(&mut self, result: Result<(), JsValue>) {
        if let Err(e) = result {
            self.fault.get_or_insert_with(|| format!("{e:?}"));
        }
    }

    fn apply_scale(&mut self) {
        let s = self.scale;
        let result = self.ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0);
        self.record(result);
    }

    fn gradient(&mut self, gradient: CanvasGradient, stops: &[GradientStop]) -> CanvasGradient {
        for stop in stops {
            let result = gradient.add_color_stop(stop.offset, &css(stop.color));
            self.record(result);
        }
        gradient
    }

    fn set_fill(&mut self, paint: &Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&css(*color)),
            Paint::Linear { start, end, stops } => {
                let g = self.ctx.create_linear_gradient(start.x, start.y, end.x, end.y);
                let g = self.gradient(g, stops);
                self.ctx.set_fill_style_canvas_gradient(&g);
            }
            Paint::Radial {
                center,
                inner_radius,
                outer_radius,
                stops,
            } => match self.ctx.create_radial_gradient(
                center.x,
                center.y,
                *inner_radius,
                center.x,
                center.y,
                *outer_radius,
            ) {
                Ok(g) => {
                    let g = self.gradient(g, stops);
                    self.ctx.set_fill_style_canvas_gradient(&g);
                }
                Err(e) => self.record(Err(e)),
            },
        }
    }

    fn trace(&mut self, path: &[PathOp]) {
        self.ctx.begin_path();
        for op in path {
            match *op {
                PathOp::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathOp::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathOp::QuadTo { ctrl, to } => {
                    self.ctx.quadratic_curve_to(ctrl.x, ctrl.y, to.x, to.y)
                }
                PathOp::Close => self.ctx.close_path(),
            }
        }
    }
}

impl Canvas for WebCanvas {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        // Resizing the element resets the context transform
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.apply_scale();
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.apply_scale();
    }

    fn clear(&mut self) {
        let result = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.record(result);
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.apply_scale();
    }

    fn set_shadow(&mut self, color: Rgba, blur: f64) {
        self.ctx.set_shadow_color(&css(color));
        self.ctx.set_shadow_blur(blur);
    }

    fn fill_rect(&mut self, origin: DVec2, size: DVec2, paint: &Paint) {
        self.set_fill(paint);
        self.ctx.fill_rect(origin.x, origin.y, size.x, size.y);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: &Paint) {
        self.set_fill(paint);
        self.ctx.begin_path();
        let result = self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, PI * 2.0);
        self.record(result);
        self.ctx.fill();
    }

    fn fill_path(&mut self, path: &[PathOp], paint: &Paint) {
        self.set_fill(paint);
        self.trace(path);
        self.ctx.fill();
    }

    fn stroke_path(&mut self, path: &[PathOp], color: Rgba, width: f64) {
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width);
        self.trace(path);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, at: DVec2, style: &TextStyle) {
        let weight = if style.bold { "bold " } else { "" };
        self.ctx.set_font(&format!("{weight}{}px Arial", style.size_px));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.ctx.set_fill_style_str(&css(style.color));
        let result = self.ctx.fill_text(text, at.x, at.y);
        self.record(result);
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        match self.fault.take() {
            Some(reason) => Err(EngineError::Surface(reason)),
            None => Ok(()),
        }
    }
}
