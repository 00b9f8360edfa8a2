pub mod canvas;
pub mod component;
pub mod config;
pub mod content;
pub mod error;
pub mod flow;
pub mod headless;
pub mod host;
pub mod id;
pub mod lifecycle;
pub mod markup;
pub mod runner;
pub mod surface;
pub mod transform;

pub use canvas::{Frame, RenderFn, Screen, Sequence};
pub use component::{Capability, Component, FrameOutcome, is_drawable};
pub use config::{CanvasOptions, HandMeDown, HandMeDowns, ScreenSpec};
pub use content::Shape;
pub use error::{EaselError, EaselResult};
pub use host::{Container, ContextKind, DrawingContext, Environment, SurfaceElement};
pub use id::ComponentId;
pub use lifecycle::{Event, Lifecycle, Status};
pub use runner::AnimationLoop;
pub use transform::{TransformOptions, Transforms, ViewportScale, compute_transform};

// Re-export kurbo geometry so hosts don't need a direct dependency
pub use kurbo;
