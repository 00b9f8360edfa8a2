//! Canvas elements and DOM containers behind the core's host traits.

use crate::context::WebContext;
use easel_core::error::{EaselError, EaselResult};
use easel_core::host::{Container, ContextKind, ContextRef, Mountable, SurfaceElement};
use easel_core::kurbo::{Rect, Size};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, Window};

// ─── Surface ─────────────────────────────────────────────────────────────

pub struct WebSurface {
    canvas: HtmlCanvasElement,
    context: Option<ContextRef>,
}

impl WebSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            context: None,
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl SurfaceElement for WebSurface {
    fn storage_size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn set_storage_size(&mut self, size: Size) {
        self.canvas.set_width(to_pixels(size.width));
        self.canvas.set_height(to_pixels(size.height));
    }

    fn layout_rect(&self) -> Rect {
        let r = self.canvas.get_bounding_client_rect();
        Rect::new(r.x(), r.y(), r.x() + r.width(), r.y() + r.height())
    }

    fn set_layout_size(&mut self, size: Size) {
        let style = self.canvas.style();
        for (prop, value) in [("width", size.width), ("height", size.height)] {
            if let Err(err) = style.set_property(prop, &format!("{value}px")) {
                log::warn!("cannot set canvas {prop}: {err:?}");
            }
        }
    }

    fn context(&mut self, kind: ContextKind) -> Option<ContextRef> {
        if kind != ContextKind::TwoD {
            log::warn!("`{}` contexts are not supported", kind.as_str());
            return None;
        }
        if self.context.is_none() {
            let ctx = self
                .canvas
                .get_context(kind.as_str())
                .ok()
                .flatten()?
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()?;
            let shared: ContextRef = Rc::new(RefCell::new(WebContext::new(ctx)));
            self.context = Some(shared);
        }
        self.context.clone()
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }

    /// The DOM already knows; nothing to record.
    fn set_attached(&mut self, _attached: bool) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn to_pixels(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

// ─── Container ───────────────────────────────────────────────────────────

pub struct WebContainer {
    element: Element,
    window: Window,
}

impl WebContainer {
    pub fn new(element: Element, window: Window) -> Self {
        Self { element, window }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn padding(&self, side: &str) -> f64 {
        let Ok(Some(style)) = self.window.get_computed_style(&self.element) else {
            return 0.0;
        };
        style
            .get_property_value(&format!("padding-{side}"))
            .ok()
            .and_then(|v| v.trim_end_matches("px").parse().ok())
            .unwrap_or(0.0)
    }
}

impl Container for WebContainer {
    fn content_box(&self) -> Size {
        let width = f64::from(self.element.client_width())
            - self.padding("left")
            - self.padding("right");
        let height = f64::from(self.element.client_height())
            - self.padding("top")
            - self.padding("bottom");
        Size::new(width.max(0.0), height.max(0.0))
    }

    fn clear(&mut self) {
        self.element.set_inner_html("");
    }

    fn append(&mut self, child: Mountable) -> EaselResult<()> {
        let node: Option<web_sys::Node> = match &child {
            Mountable::Surface(surface) => surface
                .borrow()
                .as_any()
                .downcast_ref::<WebSurface>()
                .map(|s| s.canvas.clone().into()),
            Mountable::Container(container) => container
                .borrow()
                .as_any()
                .downcast_ref::<WebContainer>()
                .map(|c| c.element.clone().into()),
        };
        let node =
            node.ok_or_else(|| EaselError::host("cannot append a non-DOM child to a DOM container"))?;
        self.element
            .append_child(&node)
            .map_err(|err| EaselError::host(format!("append failed: {err:?}")))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
