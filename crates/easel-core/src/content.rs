//! Static screen content: a declared list of shapes drawn in order.
//!
//! Used when a screen has no render callback of its own. Every shape is
//! positioned by its center (`left`, `top`) in viewport units and rotated
//! by `angle` degrees around that center. Later shapes overlap earlier ones.

use crate::canvas::{RenderFn, Screen};
use crate::component::FrameOutcome;
use crate::host::{DrawingContext, SurfaceElement};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

// ─── Model ───────────────────────────────────────────────────────────────

/// Geometry and paint shared by every shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeAttrs {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees.
    pub angle: f64,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
}

impl Default for ShapeAttrs {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextAttrs {
    #[serde(flatten)]
    pub shape: ShapeAttrs,
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_style: String,
    pub font_weight: String,
}

impl Default for TextAttrs {
    fn default() -> Self {
        Self {
            shape: ShapeAttrs::default(),
            text: String::new(),
            font_size: 32.0,
            font_family: "sans-serif".to_string(),
            font_style: "normal".to_string(),
            font_weight: "normal".to_string(),
        }
    }
}

impl TextAttrs {
    /// CSS font shorthand, e.g. `italic bold 32px sans-serif`.
    pub fn font(&self) -> String {
        format!(
            "{} {} {}px {}",
            self.font_style, self.font_weight, self.font_size, self.font_family
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAttrs {
    #[serde(flatten)]
    pub shape: ShapeAttrs,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    Rect(ShapeAttrs),
    Circle(ShapeAttrs),
    Ellipse(ShapeAttrs),
    Line(ShapeAttrs),
    Triangle(ShapeAttrs),
    #[serde(alias = "i-text")]
    Text(TextAttrs),
    /// Area of interest: participates in hit regions, never painted.
    Aoi(ShapeAttrs),
    /// Accepted for compatibility; images need asset loading and are skipped.
    Image(ImageAttrs),
}

impl Shape {
    pub fn attrs(&self) -> &ShapeAttrs {
        match self {
            Shape::Rect(a)
            | Shape::Circle(a)
            | Shape::Ellipse(a)
            | Shape::Line(a)
            | Shape::Triangle(a)
            | Shape::Aoi(a) => a,
            Shape::Text(t) => &t.shape,
            Shape::Image(i) => &i.shape,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Rect(_) => "rect",
            Shape::Circle(_) => "circle",
            Shape::Ellipse(_) => "ellipse",
            Shape::Line(_) => "line",
            Shape::Triangle(_) => "triangle",
            Shape::Text(_) => "text",
            Shape::Aoi(_) => "aoi",
            Shape::Image(_) => "image",
        }
    }

    /// Axis-aligned bounds before rotation, in viewport units.
    pub fn bounds(&self) -> Rect {
        let a = self.attrs();
        Rect::from_center_size(Point::new(a.left, a.top), (a.width, a.height))
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

/// Draw every shape in list order.
pub fn render_content(shapes: &[Shape], ctx: &mut dyn DrawingContext) {
    for shape in shapes {
        draw_shape(ctx, shape);
    }
}

/// Wrap a shape list into a render callback that never finishes on its own.
pub fn content_render_fn(shapes: Vec<Shape>) -> RenderFn {
    Box::new(
        move |_timestamp: f64,
              _surface: &dyn SurfaceElement,
              ctx: &mut dyn DrawingContext,
              _screen: &Screen| {
            render_content(&shapes, ctx);
            FrameOutcome::Continue
        },
    )
}

fn draw_shape(ctx: &mut dyn DrawingContext, shape: &Shape) {
    let a = shape.attrs();
    match shape {
        Shape::Aoi(_) => return,
        Shape::Image(img) => {
            log::warn!("skipping image shape {:?}: images are not loaded", img.src);
            return;
        }
        _ => {}
    }

    let (hw, hh) = (a.width / 2.0, a.height / 2.0);
    ctx.save();
    ctx.translate(a.left, a.top);
    ctx.rotate(a.angle.to_radians());

    match shape {
        Shape::Text(t) => {
            draw_text(ctx, t);
            ctx.restore();
            return;
        }
        Shape::Rect(_) => {
            ctx.begin_path();
            ctx.rect(Rect::new(-hw, -hh, hw, hh));
        }
        Shape::Circle(_) => {
            ctx.begin_path();
            ctx.arc(Point::ORIGIN, hw, 0.0, TAU);
        }
        Shape::Ellipse(_) => {
            ctx.begin_path();
            ctx.ellipse(Point::ORIGIN, (hw, hh), 0.0, 0.0, TAU);
        }
        Shape::Line(_) => {
            ctx.begin_path();
            ctx.move_to(Point::new(-hw, 0.0));
            ctx.line_to(Point::new(hw, 0.0));
        }
        Shape::Triangle(_) => {
            ctx.begin_path();
            ctx.move_to(Point::new(-hw, hh));
            ctx.line_to(Point::new(0.0, -hh));
            ctx.line_to(Point::new(hw, hh));
            ctx.close_path();
        }
        Shape::Aoi(_) | Shape::Image(_) => {}
    }

    paint(ctx, a);
    ctx.restore();
}

fn paint(ctx: &mut dyn DrawingContext, a: &ShapeAttrs) {
    if let Some(fill) = &a.fill {
        ctx.set_fill_style(fill);
        ctx.fill();
    }
    if let Some(stroke) = &a.stroke
        && a.stroke_width > 0.0
    {
        ctx.set_line_width(a.stroke_width);
        ctx.set_stroke_style(stroke);
        ctx.stroke();
    }
}

fn draw_text(ctx: &mut dyn DrawingContext, t: &TextAttrs) {
    ctx.set_font(&t.font());
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    if let Some(fill) = &t.shape.fill {
        ctx.set_fill_style(fill);
        ctx.fill_text(&t.text, Point::ORIGIN);
    }
    if let Some(stroke) = &t.shape.stroke
        && t.shape.stroke_width > 0.0
    {
        ctx.set_line_width(t.shape.stroke_width);
        ctx.set_stroke_style(stroke);
        ctx.stroke_text(&t.text, Point::ORIGIN);
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DrawCommand, RecordingContext};
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Vec<Shape> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deserialize_shape_list() {
        let shapes = parse(
            r##"[
                { "type": "rect", "left": 10, "top": 20, "width": 50, "height": 40, "fill": "red" },
                { "type": "i-text", "text": "+", "fontSize": 48, "fill": "black" },
                { "type": "aoi", "width": 100, "height": 100 },
                { "type": "image", "src": "cat.png", "width": 64, "height": 64 }
            ]"##,
        );
        let kinds: Vec<&str> = shapes.iter().map(Shape::kind).collect();
        assert_eq!(kinds, vec!["rect", "text", "aoi", "image"]);
        assert_eq!(shapes[0].bounds(), Rect::new(-15.0, 0.0, 35.0, 40.0));
        match &shapes[1] {
            Shape::Text(t) => {
                assert_eq!(t.text, "+");
                assert_eq!(t.font(), "normal normal 48px sans-serif");
                assert_eq!(t.shape.fill.as_deref(), Some("black"));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn unknown_shape_type_is_rejected() {
        assert!(serde_json::from_str::<Vec<Shape>>(r#"[{ "type": "hexagon" }]"#).is_err());
    }

    #[test]
    fn rect_is_centered_rotated_filled_and_stroked() {
        let shapes = parse(
            r#"[{ "type": "rect", "left": 100, "top": 50, "width": 20, "height": 10,
                  "angle": 90, "fill": "blue", "stroke": "white", "strokeWidth": 2 }]"#,
        );
        let mut ctx = RecordingContext::default();
        render_content(&shapes, &mut ctx);
        assert_eq!(
            ctx.commands(),
            &[
                DrawCommand::Save,
                DrawCommand::Translate(100.0, 50.0),
                DrawCommand::Rotate(90f64.to_radians()),
                DrawCommand::BeginPath,
                DrawCommand::Rect(Rect::new(-10.0, -5.0, 10.0, 5.0)),
                DrawCommand::FillStyle("blue".into()),
                DrawCommand::Fill,
                DrawCommand::LineWidth(2.0),
                DrawCommand::StrokeStyle("white".into()),
                DrawCommand::Stroke,
                DrawCommand::Restore,
            ]
        );
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn shapes_draw_in_list_order_and_skip_invisible_ones() {
        let shapes = parse(
            r#"[
                { "type": "circle", "width": 10, "height": 10, "fill": "a" },
                { "type": "aoi", "width": 10, "height": 10 },
                { "type": "image", "src": "x.png" },
                { "type": "triangle", "width": 10, "height": 10, "fill": "b" }
            ]"#,
        );
        let mut ctx = RecordingContext::default();
        render_content(&shapes, &mut ctx);
        let fills: Vec<&str> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillStyle(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec!["a", "b"]);
        assert!(ctx.commands().contains(&DrawCommand::ClosePath));
        assert_eq!(
            ctx.commands().iter().filter(|c| **c == DrawCommand::Save).count(),
            2
        );
    }

    #[test]
    fn zero_stroke_width_skips_stroke() {
        let shapes = parse(
            r#"[{ "type": "line", "width": 10, "stroke": "black", "strokeWidth": 0 }]"#,
        );
        let mut ctx = RecordingContext::default();
        render_content(&shapes, &mut ctx);
        assert!(!ctx.commands().contains(&DrawCommand::Stroke));
    }

    #[test]
    fn text_is_centered_on_its_position() {
        let shapes = parse(
            r#"[{ "type": "text", "text": "Ready?", "fill": "black", "fontWeight": "bold" }]"#,
        );
        let mut ctx = RecordingContext::default();
        render_content(&shapes, &mut ctx);
        let cmds = ctx.commands();
        assert!(cmds.contains(&DrawCommand::Font("normal bold 32px sans-serif".into())));
        assert!(cmds.contains(&DrawCommand::TextAlign("center".into())));
        assert!(cmds.contains(&DrawCommand::TextBaseline("middle".into())));
        assert!(cmds.contains(&DrawCommand::FillText("Ready?".into(), Point::ORIGIN)));
    }
}
