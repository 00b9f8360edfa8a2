//! Component configuration: the hand-me-down record shared down a
//! component tree, and the declarative screen description.

use crate::content::Shape;
use crate::error::EaselResult;
use crate::host::{ContainerRef, ContextKind, SurfaceRef};
use crate::id::ComponentId;
use crate::transform::ViewportScale;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

// ─── Canvas options ──────────────────────────────────────────────────────

/// Surface-related configuration every component carries.
#[derive(Clone, Default)]
pub struct CanvasOptions {
    /// Where the component mounts its surface or markup.
    pub container: Option<ContainerRef>,
    /// The drawing surface, supplied by the caller or created lazily.
    pub surface: Option<SurfaceRef>,
    pub context_type: ContextKind,
    /// Set when the surface still has to be sized and attached at start.
    pub insert_on_run: bool,
    /// `None` means "not decided yet"; resolved to `true` at preparation.
    pub pixel_density_scaling: Option<bool>,
}

impl fmt::Debug for CanvasOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasOptions")
            .field("container", &self.container.is_some())
            .field("surface", &self.surface.is_some())
            .field("context_type", &self.context_type)
            .field("insert_on_run", &self.insert_on_run)
            .field("pixel_density_scaling", &self.pixel_density_scaling)
            .finish()
    }
}

// ─── Hand-me-downs ───────────────────────────────────────────────────────

/// A configuration key a parent copies into its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandMeDown {
    Container,
    Surface,
    PixelDensityScaling,
}

/// Ordered, duplicate-free set of hand-me-down keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandMeDowns(SmallVec<[HandMeDown; 4]>);

impl HandMeDowns {
    pub fn new(keys: &[HandMeDown]) -> Self {
        let mut set = Self::default();
        for &key in keys {
            set.add(key);
        }
        set
    }

    /// Add `key` unless already present.
    pub fn add(&mut self, key: HandMeDown) {
        if !self.0.contains(&key) {
            self.0.push(key);
        }
    }

    pub fn contains(&self, key: HandMeDown) -> bool {
        self.0.contains(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = HandMeDown> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Merge `parent`'s values for `keys` into a copy of `child`.
///
/// Values the child already defines always win.
pub fn hand_down(parent: &CanvasOptions, child: &CanvasOptions, keys: &HandMeDowns) -> CanvasOptions {
    let mut merged = child.clone();
    for key in keys.iter() {
        match key {
            HandMeDown::Container => {
                if merged.container.is_none() {
                    merged.container = parent.container.clone();
                }
            }
            HandMeDown::Surface => {
                if merged.surface.is_none() {
                    merged.surface = parent.surface.clone();
                }
            }
            HandMeDown::PixelDensityScaling => {
                if merged.pixel_density_scaling.is_none() {
                    merged.pixel_density_scaling = parent.pixel_density_scaling;
                }
            }
        }
    }
    merged
}

/// Whether two option records point at the same surface.
pub fn shares_surface(a: &CanvasOptions, b: &CanvasOptions) -> bool {
    match (&a.surface, &b.surface) {
        (Some(x), Some(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

// ─── Screen description ──────────────────────────────────────────────────

/// Declarative configuration of a screen, as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenSpec {
    pub id: Option<ComponentId>,
    pub context_type: ContextKind,
    pub insert_on_run: bool,
    pub center_origin: bool,
    /// `[width, height]` in viewport units.
    pub viewport: [f64; 2],
    pub viewport_scale: ViewportScale,
    pub show_viewport_edge: bool,
    pub pixel_density_scaling: Option<bool>,
    pub clear_on_render: bool,
    pub content: Vec<Shape>,
}

impl Default for ScreenSpec {
    fn default() -> Self {
        Self {
            id: None,
            context_type: ContextKind::TwoD,
            insert_on_run: false,
            center_origin: true,
            viewport: [800.0, 600.0],
            viewport_scale: ViewportScale::Auto,
            show_viewport_edge: false,
            pixel_density_scaling: None,
            clear_on_render: true,
            content: Vec::new(),
        }
    }
}

impl ScreenSpec {
    /// Read a screen description from JSON.
    pub fn from_json(json: &str) -> EaselResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn viewport_size(&self) -> Size {
        Size::new(self.viewport[0], self.viewport[1])
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
