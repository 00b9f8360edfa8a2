//! The browser as an `Environment`.

use crate::dom::{WebContainer, WebSurface};
use easel_core::error::{EaselError, EaselResult};
use easel_core::host::{ContainerRef, Environment, RealizedMarkup, SurfaceRef};
use easel_core::markup::{self, Fragment, Placeholder};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlCanvasElement, Window};

pub struct BrowserEnvironment {
    window: Window,
    document: Document,
}

fn js_err(what: &str, err: JsValue) -> EaselError {
    EaselError::host(format!("{what}: {err:?}"))
}

impl BrowserEnvironment {
    pub fn new() -> EaselResult<Self> {
        let window = web_sys::window().ok_or_else(|| EaselError::host("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| EaselError::host("no document"))?;
        Ok(Self { window, document })
    }

    /// Wrap the element with `id` as a container.
    pub fn container_by_id(&self, id: &str) -> EaselResult<ContainerRef> {
        let element = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| EaselError::host(format!("no element #{id}")))?;
        Ok(self.wrap(element))
    }

    fn wrap(&self, element: Element) -> ContainerRef {
        Rc::new(RefCell::new(WebContainer::new(element, self.window.clone())))
    }

    fn create_element(&self, tag: &str) -> EaselResult<Element> {
        self.document
            .create_element(tag)
            .map_err(|e| js_err(&format!("createElement({tag})"), e))
    }

    /// Build DOM nodes for `nodes` under `parent`, remembering the element
    /// found at `target`.
    fn build(
        &self,
        parent: &Element,
        nodes: &[markup::Node],
        path: &mut Vec<usize>,
        target: &[usize],
        found: &mut Option<Element>,
    ) -> EaselResult<()> {
        for (i, node) in nodes.iter().enumerate() {
            path.push(i);
            match node {
                markup::Node::Text(text) => {
                    let text = self.document.create_text_node(text);
                    parent
                        .append_child(&text)
                        .map_err(|e| js_err("appendChild", e))?;
                }
                markup::Node::Element(el) => {
                    let element = self.create_element(&el.tag)?;
                    for (name, value) in &el.attrs {
                        element
                            .set_attribute(name, value)
                            .map_err(|e| js_err("setAttribute", e))?;
                    }
                    self.build(&element, &el.children, path, target, found)?;
                    if path.as_slice() == target {
                        *found = Some(element.clone());
                    }
                    parent
                        .append_child(&element)
                        .map_err(|e| js_err("appendChild", e))?;
                }
            }
            path.pop();
        }
        Ok(())
    }
}

impl Environment for BrowserEnvironment {
    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn create_surface(&self) -> EaselResult<SurfaceRef> {
        let canvas = self
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EaselError::host("created element is not a canvas"))?;
        Ok(Rc::new(RefCell::new(WebSurface::new(canvas))))
    }

    fn realize_markup(
        &self,
        fragment: &Fragment,
        placeholder: &Placeholder,
    ) -> EaselResult<RealizedMarkup> {
        let root = self.create_element("div")?;
        let mut found = None;
        self.build(&root, &fragment.nodes, &mut Vec::new(), &placeholder.path, &mut found)?;

        let element = found.ok_or_else(|| EaselError::host("placeholder was not realized"))?;
        let parent = match placeholder.parent_path() {
            Some(_) => element.parent_element().map(|p| self.wrap(p)),
            None => None,
        };
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EaselError::host("placeholder is not a canvas element"))?;

        let surface: SurfaceRef = Rc::new(RefCell::new(WebSurface::new(canvas)));
        Ok(RealizedMarkup {
            root: self.wrap(root),
            surface,
            surface_parent: parent,
        })
    }
}
