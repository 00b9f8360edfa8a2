//! `DrawingContext` over a browser `CanvasRenderingContext2d`.

use easel_core::host::DrawingContext;
use easel_core::kurbo::{Affine, Point, Rect};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

pub struct WebContext {
    ctx: CanvasRenderingContext2d,
}

impl WebContext {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn raw(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

/// Canvas calls only throw on non-finite arguments; log and carry on.
fn check(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("canvas {op} failed: {err:?}");
    }
}

impl DrawingContext for WebContext {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_transform(&mut self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        check("setTransform", self.ctx.set_transform(a, b, c, d, e, f));
    }

    fn transform(&mut self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        check("transform", self.ctx.transform(a, b, c, d, e, f));
    }

    fn translate(&mut self, x: f64, y: f64) {
        check("translate", self.ctx.translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        check("rotate", self.ctx.rotate(angle));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ctx
            .clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx
            .fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ctx
            .stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn move_to(&mut self, point: Point) {
        self.ctx.move_to(point.x, point.y);
    }

    fn line_to(&mut self, point: Point) {
        self.ctx.line_to(point.x, point.y);
    }

    fn rect(&mut self, rect: Rect) {
        self.ctx.rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        check("arc", self.ctx.arc(center.x, center.y, radius, start, end));
    }

    fn ellipse(&mut self, center: Point, radii: (f64, f64), rotation: f64, start: f64, end: f64) {
        check(
            "ellipse",
            self.ctx
                .ellipse(center.x, center.y, radii.0, radii.1, rotation, start, end),
        );
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        check("fillText", self.ctx.fill_text(text, at.x, at.y));
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        check("strokeText", self.ctx.stroke_text(text, at.x, at.y));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ctx.set_fill_style_str(style);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ctx.set_stroke_style_str(style);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }
}
