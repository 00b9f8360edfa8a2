//! Canvas components: the drawable leaf and the drawable composites.

mod frame;
mod screen;
mod sequence;

pub use frame::Frame;
pub use screen::{RenderFn, Screen, VIEWPORT_EDGE_STYLE};
pub use sequence::Sequence;
