//! In-memory host: records drawing instead of rasterizing.
//!
//! `RecordingContext` logs every call as a [`DrawCommand`] and tracks the
//! current transform and save depth the way a canvas 2D context would.
//! The surface, container and environment types model just enough of a
//! document to run components off-screen.

use crate::error::EaselResult;
use crate::host::{
    Container, ContainerRef, ContextKind, ContextRef, DrawingContext, Environment, Mountable,
    RealizedMarkup, SurfaceElement, SurfaceRef,
};
use crate::markup::{Fragment, Placeholder};
use kurbo::{Affine, Point, Rect, Size};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Default canvas element size in layout pixels.
const DEFAULT_SURFACE: Size = Size::new(300.0, 150.0);

// ─── Drawing context ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    SetTransform(Affine),
    Transform(Affine),
    Translate(f64, f64),
    Rotate(f64),
    ClearRect(Rect),
    FillRect(Rect),
    StrokeRect(Rect),
    BeginPath,
    ClosePath,
    MoveTo(Point),
    LineTo(Point),
    Rect(Rect),
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
    },
    Ellipse {
        center: Point,
        radii: (f64, f64),
        rotation: f64,
        start: f64,
        end: f64,
    },
    Fill,
    Stroke,
    FillText(String, Point),
    StrokeText(String, Point),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    Font(String),
    TextAlign(String),
    TextBaseline(String),
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    transform: Affine,
    stack: Vec<Affine>,
}

impl RecordingContext {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the command log, keeping transform state.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn current_transform(&self) -> Affine {
        self.transform
    }

    /// Number of unmatched `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl DrawingContext for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.transform);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        // Like a canvas, restoring an empty stack is silently ignored.
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn transform(&mut self, transform: Affine) {
        self.transform *= transform;
        self.commands.push(DrawCommand::Transform(transform));
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform *= Affine::translate((x, y));
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.transform *= Affine::rotate(angle);
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClearRect(rect));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::StrokeRect(rect));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn move_to(&mut self, point: Point) {
        self.commands.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.commands.push(DrawCommand::LineTo(point));
    }

    fn rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rect(rect));
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start,
            end,
        });
    }

    fn ellipse(&mut self, center: Point, radii: (f64, f64), rotation: f64, start: f64, end: f64) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            rotation,
            start,
            end,
        });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.commands.push(DrawCommand::FillText(text.to_string(), at));
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        self.commands.push(DrawCommand::StrokeText(text.to_string(), at));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::FillStyle(style.to_string()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::StrokeStyle(style.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: &str) {
        self.commands.push(DrawCommand::TextAlign(align.to_string()));
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.commands.push(DrawCommand::TextBaseline(baseline.to_string()));
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HeadlessSurface {
    storage: Size,
    layout: Rect,
    attached: bool,
    context: Option<Rc<RefCell<RecordingContext>>>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self {
            storage: DEFAULT_SURFACE,
            layout: Rect::from_origin_size(Point::ORIGIN, DEFAULT_SURFACE),
            attached: false,
            context: None,
        }
    }
}

impl HeadlessSurface {
    pub fn new_shared() -> Rc<RefCell<HeadlessSurface>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// A detached surface behind the trait-object handle.
    pub fn shared() -> SurfaceRef {
        Self::new_shared()
    }

    /// The recording context, if one has been requested.
    pub fn recording(&self) -> Option<Rc<RefCell<RecordingContext>>> {
        self.context.clone()
    }

    /// Move the layout box, as a reflow would.
    pub fn set_layout_origin(&mut self, origin: Point) {
        self.layout = Rect::from_origin_size(origin, self.layout.size());
    }
}

impl SurfaceElement for HeadlessSurface {
    fn storage_size(&self) -> Size {
        self.storage
    }

    fn set_storage_size(&mut self, size: Size) {
        self.storage = size;
    }

    fn layout_rect(&self) -> Rect {
        self.layout
    }

    fn set_layout_size(&mut self, size: Size) {
        self.layout = Rect::from_origin_size(self.layout.origin(), size);
    }

    fn context(&mut self, kind: ContextKind) -> Option<ContextRef> {
        if kind != ContextKind::TwoD {
            return None;
        }
        let ctx = self
            .context
            .get_or_insert_with(|| Rc::new(RefCell::new(RecordingContext::default())));
        Some(ctx.clone() as ContextRef)
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─── Container ───────────────────────────────────────────────────────────

pub struct HeadlessContainer {
    pub label: String,
    size: Size,
    children: Vec<Mountable>,
    /// How many times the container was cleared.
    pub cleared: usize,
}

impl HeadlessContainer {
    pub fn new(label: impl Into<String>, size: Size) -> Self {
        Self {
            label: label.into(),
            size,
            children: Vec::new(),
            cleared: 0,
        }
    }

    pub fn new_shared(size: Size) -> Rc<RefCell<HeadlessContainer>> {
        Rc::new(RefCell::new(Self::new("container", size)))
    }

    pub fn shared(size: Size) -> ContainerRef {
        Self::new_shared(size)
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn children(&self) -> &[Mountable] {
        &self.children
    }

    pub fn surface_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| matches!(c, Mountable::Surface(_)))
            .count()
    }

    pub fn container_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| matches!(c, Mountable::Container(_)))
            .count()
    }
}

impl Container for HeadlessContainer {
    fn content_box(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        for child in self.children.drain(..) {
            if let Mountable::Surface(surface) = child {
                surface.borrow_mut().set_attached(false);
            }
        }
        self.cleared += 1;
    }

    fn append(&mut self, child: Mountable) -> EaselResult<()> {
        if let Mountable::Surface(surface) = &child {
            surface.borrow_mut().set_attached(true);
        }
        self.children.push(child);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─── Environment ─────────────────────────────────────────────────────────

/// Off-screen environment with a fixed device pixel ratio.
pub struct HeadlessEnvironment {
    pub device_pixel_ratio: f64,
    /// Content box given to containers realized from markup.
    pub markup_box: Size,
    created: RefCell<Vec<Rc<RefCell<HeadlessSurface>>>>,
    realized: RefCell<Vec<Rc<RefCell<HeadlessSurface>>>>,
}

impl HeadlessEnvironment {
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            device_pixel_ratio,
            markup_box: Size::new(800.0, 600.0),
            created: RefCell::new(Vec::new()),
            realized: RefCell::new(Vec::new()),
        }
    }

    /// Number of surfaces made by `create_surface`.
    pub fn created_surfaces(&self) -> usize {
        self.created.borrow().len()
    }

    /// The `i`-th surface made by `create_surface`.
    pub fn created_surface(&self, i: usize) -> Option<Rc<RefCell<HeadlessSurface>>> {
        self.created.borrow().get(i).cloned()
    }

    /// The `i`-th surface realized from a markup placeholder.
    pub fn realized_surface(&self, i: usize) -> Option<Rc<RefCell<HeadlessSurface>>> {
        self.realized.borrow().get(i).cloned()
    }
}

impl Default for HeadlessEnvironment {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Environment for HeadlessEnvironment {
    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn create_surface(&self) -> EaselResult<SurfaceRef> {
        let surface = HeadlessSurface::new_shared();
        self.created.borrow_mut().push(surface.clone());
        Ok(surface)
    }

    fn realize_markup(
        &self,
        fragment: &Fragment,
        placeholder: &Placeholder,
    ) -> EaselResult<RealizedMarkup> {
        let surface = HeadlessSurface::new_shared();
        {
            let mut s = surface.borrow_mut();
            let width = placeholder.attr("width").and_then(|v| v.parse().ok());
            let height = placeholder.attr("height").and_then(|v| v.parse().ok());
            if let (Some(w), Some(h)) = (width, height) {
                s.set_storage_size(Size::new(w, h));
                s.set_layout_size(Size::new(w, h));
            }
        }
        self.realized.borrow_mut().push(surface.clone());

        let root = Rc::new(RefCell::new(HeadlessContainer::new("fragment", self.markup_box)));
        let surface_ref: SurfaceRef = surface;
        let surface_parent = match placeholder.parent_path() {
            Some(path) => {
                let tag = fragment
                    .element_at(path)
                    .map(|el| el.tag.clone())
                    .unwrap_or_default();
                let parent: ContainerRef =
                    Rc::new(RefCell::new(HeadlessContainer::new(tag, self.markup_box)));
                parent
                    .borrow_mut()
                    .append(Mountable::Surface(surface_ref.clone()))?;
                root.borrow_mut()
                    .append(Mountable::Container(parent.clone()))?;
                Some(parent)
            }
            None => {
                root.borrow_mut()
                    .append(Mountable::Surface(surface_ref.clone()))?;
                None
            }
        };

        Ok(RealizedMarkup {
            root,
            surface: surface_ref,
            surface_parent,
        })
    }
}
