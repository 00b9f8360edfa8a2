//! Narrow interfaces onto the host environment.
//!
//! The core never touches a real windowing or DOM API. A host (the browser
//! crate, the headless recorder, or a caller's own) implements these traits
//! and the components talk to it through shared handles.

use crate::error::EaselResult;
use crate::markup::{Fragment, Placeholder};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a drawing surface.
pub type SurfaceRef = Rc<RefCell<dyn SurfaceElement>>;
/// Shared handle to a surface's drawing context.
pub type ContextRef = Rc<RefCell<dyn DrawingContext>>;
/// Shared handle to a layout container.
pub type ContainerRef = Rc<RefCell<dyn Container>>;

/// Kind of drawing context requested from a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContextKind {
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "bitmaprenderer")]
    BitmapRenderer,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::TwoD => "2d",
            ContextKind::BitmapRenderer => "bitmaprenderer",
        }
    }
}

/// Immediate-mode 2D drawing primitives.
///
/// Mirrors the subset of a canvas 2D context the core and the static
/// content renderer use. Angles are radians.
pub trait DrawingContext {
    fn save(&mut self);
    fn restore(&mut self);
    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);
    /// Multiply the current transform by `transform`.
    fn transform(&mut self, transform: Affine);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);

    fn clear_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    fn stroke_rect(&mut self, rect: Rect);

    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    fn rect(&mut self, rect: Rect);
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64);
    fn ellipse(&mut self, center: Point, radii: (f64, f64), rotation: f64, start: f64, end: f64);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_text(&mut self, text: &str, at: Point);
    fn stroke_text(&mut self, text: &str, at: Point);

    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
}

/// A physical pixel buffer with a layout presentation.
pub trait SurfaceElement {
    /// Storage size in physical pixels.
    fn storage_size(&self) -> Size;
    fn set_storage_size(&mut self, size: Size);
    /// Bounding box in layout pixels.
    fn layout_rect(&self) -> Rect;
    fn set_layout_size(&mut self, size: Size);
    /// The surface's drawing context, created on first request.
    fn context(&mut self, kind: ContextKind) -> Option<ContextRef>;
    /// Whether the surface is already part of the visual tree.
    fn is_attached(&self) -> bool;
    /// Called by containers as the surface is appended or cleared.
    fn set_attached(&mut self, attached: bool);
    /// Lets a host recover its own surface type behind a [`SurfaceRef`].
    fn as_any(&self) -> &dyn Any;
}

/// Something a container can hold.
#[derive(Clone)]
pub enum Mountable {
    Surface(SurfaceRef),
    Container(ContainerRef),
}

/// A layout node that surfaces and markup are inserted into.
pub trait Container {
    /// Content-box size in layout pixels.
    fn content_box(&self) -> Size;
    /// Remove all current children.
    fn clear(&mut self);
    /// Append `child` as the last child.
    ///
    /// # Errors
    /// Returns a host error if the child cannot be inserted.
    fn append(&mut self, child: Mountable) -> EaselResult<()>;
    fn as_any(&self) -> &dyn Any;
}

/// Live objects created for a frame's embedding markup.
#[derive(Clone)]
pub struct RealizedMarkup {
    /// Root of the realized fragment, appended to the frame's container.
    pub root: ContainerRef,
    /// The surface realized from the placeholder element.
    pub surface: SurfaceRef,
    /// The placeholder's parent element, if it has one.
    pub surface_parent: Option<ContainerRef>,
}

/// Factories and queries provided by the host.
pub trait Environment {
    /// Physical pixels per layout pixel.
    fn device_pixel_ratio(&self) -> f64;
    /// Create a detached drawing surface.
    ///
    /// # Errors
    /// Returns a host error if the host cannot make one.
    fn create_surface(&self) -> EaselResult<SurfaceRef>;
    /// Turn a parsed fragment into live objects.
    ///
    /// # Errors
    /// Returns a host error if the fragment cannot be materialized.
    fn realize_markup(
        &self,
        fragment: &Fragment,
        placeholder: &Placeholder,
    ) -> EaselResult<RealizedMarkup>;
}
