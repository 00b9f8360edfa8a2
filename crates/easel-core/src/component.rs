//! The component contract shared by leaves, composites and flow control.
//!
//! Components are classified by a capability tag set at construction
//! rather than by their concrete type, so composites can validate a
//! subtree without knowing every drawable kind in advance.

use crate::config::CanvasOptions;
use crate::error::EaselResult;
use crate::host::Environment;
use crate::id::ComponentId;
use crate::lifecycle::{Lifecycle, Status};
use smallvec::SmallVec;

/// What a component can do inside a drawing tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Draws onto a canvas surface (screens and canvas composites).
    Drawable,
    /// Generic flow control; drawable iff all of its children are.
    Flow,
    /// Anything else.
    Plain,
}

/// Result of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameOutcome {
    /// Keep rendering.
    #[default]
    Continue,
    /// The component is done; the scheduler should end it.
    Finished,
}

/// Child handles returned by [`Component::children`].
pub type Children<'a> = SmallVec<[&'a dyn Component; 4]>;

pub trait Component {
    /// Human-readable type name, used in errors.
    fn kind(&self) -> &'static str;
    fn capability(&self) -> Capability;
    fn lifecycle(&self) -> &Lifecycle;

    fn id(&self) -> ComponentId {
        self.lifecycle().id()
    }

    fn status(&self) -> Status {
        self.lifecycle().status()
    }

    fn children(&self) -> Children<'_> {
        SmallVec::new()
    }

    fn canvas_options(&self) -> &CanvasOptions;
    fn canvas_options_mut(&mut self) -> &mut CanvasOptions;

    /// created → prepared. Errors here are fatal and leave the component
    /// unable to start.
    fn prepare(&mut self, env: &dyn Environment) -> EaselResult<()>;
    /// prepared → running.
    fn start(&mut self, env: &dyn Environment) -> EaselResult<()>;
    /// Draw one frame.
    fn render(&mut self, env: &dyn Environment, timestamp: f64) -> EaselResult<FrameOutcome>;
    /// → done. Safe to call more than once.
    fn end(&mut self, env: &dyn Environment) -> EaselResult<()>;
}

/// Whether `component` may be nested under a drawable composite.
pub fn is_drawable(component: &dyn Component) -> bool {
    first_non_drawable(component).is_none()
}

/// The first component, depth-first, that makes the subtree non-drawable.
pub fn first_non_drawable(component: &dyn Component) -> Option<&dyn Component> {
    match component.capability() {
        Capability::Drawable => None,
        Capability::Plain => Some(component),
        Capability::Flow => component
            .children()
            .into_iter()
            .find_map(first_non_drawable),
    }
}

/// `kind @id`, for logs and error messages.
pub fn describe(component: &dyn Component) -> String {
    format!("{} {}", component.kind(), component.id())
}
