//! Viewport → surface coordinate transforms.
//!
//! Authors describe drawings in abstract viewport units. The transform
//! engine maps those units onto the physical pixels of a surface of
//! arbitrary size and pixel density. Everything here is pure.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Determinants below this are treated as non-invertible.
const DEGENERATE_EPSILON: f64 = 1e-12;

// ─── Scaling policy ──────────────────────────────────────────────────────

/// How viewport units are scaled onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ViewportScale {
    /// Largest uniform scale that fits the viewport inside the surface.
    #[default]
    Auto,
    /// Fixed number of layout pixels per viewport unit.
    Fixed(f64),
}

impl Serialize for ViewportScale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ViewportScale::Auto => serializer.serialize_str("auto"),
            ViewportScale::Fixed(f) => serializer.serialize_f64(*f),
        }
    }
}

impl<'de> Deserialize<'de> for ViewportScale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Factor(f64),
            Keyword(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Factor(f) => Ok(ViewportScale::Fixed(f)),
            Repr::Keyword(k) if k == "auto" => Ok(ViewportScale::Auto),
            Repr::Keyword(k) => Err(serde::de::Error::custom(format!(
                "viewport scale must be \"auto\" or a number, got {k:?}"
            ))),
        }
    }
}

// ─── Inputs & outputs ────────────────────────────────────────────────────

/// Policies and surface facts that shape the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOptions {
    pub scale: ViewportScale,
    /// Map viewport (0, 0) to the surface center instead of its top-left corner.
    pub center_origin: bool,
    /// Density factor already baked into the surface's storage size.
    /// `1.0` when density scaling is disabled.
    pub pixel_ratio: f64,
    /// The surface's bounding box in layout pixels.
    pub layout_rect: Rect,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            scale: ViewportScale::Auto,
            center_origin: true,
            pixel_ratio: 1.0,
            layout_rect: Rect::ZERO,
        }
    }
}

/// The matrices derived for one run of a drawable component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    /// Viewport units → surface storage pixels.
    pub device: Affine,
    /// Surface storage pixels → viewport units. Identity when `device`
    /// is degenerate.
    pub viewport: Affine,
    /// Layout-pixel (pointer) coordinates relative to the layout rect's
    /// parent → viewport units.
    pub pointer: Affine,
}

impl Transforms {
    /// Uniform scale factor of the device matrix.
    pub fn scale(&self) -> f64 {
        self.device.as_coeffs()[0]
    }

    /// Map a viewport point onto the surface.
    pub fn to_surface(&self, point: Point) -> Point {
        self.device * point
    }

    /// Map a surface storage pixel back into viewport units.
    pub fn to_viewport(&self, point: Point) -> Point {
        self.viewport * point
    }

    /// Map a pointer position in layout pixels into viewport units.
    pub fn from_pointer(&self, point: Point) -> Point {
        self.pointer * point
    }

    /// Length of one storage pixel in viewport units.
    pub fn pixel_in_viewport_units(&self) -> f64 {
        self.viewport.as_coeffs()[0].abs()
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────

/// Compute the device and viewport matrices for a surface.
///
/// `surface` is the storage size in physical pixels; `viewport` the
/// author's logical size. Auto scaling derives the scale from storage
/// pixels, which already include density, so only a fixed factor is
/// multiplied by `pixel_ratio`. Degenerate sizes never fail: a non-finite
/// scale collapses to zero and the inverse falls back to identity.
pub fn compute_transform(surface: Size, viewport: Size, options: &TransformOptions) -> Transforms {
    let raw_scale = match options.scale {
        ViewportScale::Auto => {
            (surface.width / viewport.width).min(surface.height / viewport.height)
        }
        ViewportScale::Fixed(factor) => factor * options.pixel_ratio,
    };
    let scale = if raw_scale.is_finite() { raw_scale } else { 0.0 };

    let origin = if options.center_origin {
        Vec2::new(surface.width / 2.0, surface.height / 2.0)
    } else {
        Vec2::ZERO
    };

    let device = Affine::new([scale, 0.0, 0.0, scale, origin.x, origin.y]);
    let viewport_matrix = if device.determinant().abs() > DEGENERATE_EPSILON {
        device.inverse()
    } else {
        Affine::IDENTITY
    };

    let layout = options.layout_rect;
    let storage_per_layout_x = ratio_or_one(surface.width, layout.width());
    let storage_per_layout_y = ratio_or_one(surface.height, layout.height());
    let pointer = viewport_matrix
        * Affine::new([storage_per_layout_x, 0.0, 0.0, storage_per_layout_y, 0.0, 0.0])
        * Affine::translate(-layout.origin().to_vec2());

    log::debug!(
        "transform: surface {}x{} viewport {}x{} scale {scale} origin ({}, {})",
        surface.width,
        surface.height,
        viewport.width,
        viewport.height,
        origin.x,
        origin.y
    );

    Transforms {
        device,
        viewport: viewport_matrix,
        pointer,
    }
}

/// The viewport's bounds in viewport units, given the origin policy.
pub fn viewport_bounds(viewport: Size, center_origin: bool) -> Rect {
    if center_origin {
        Rect::new(
            -viewport.width / 2.0,
            -viewport.height / 2.0,
            viewport.width / 2.0,
            viewport.height / 2.0,
        )
    } else {
        Rect::from_origin_size(Point::ORIGIN, viewport)
    }
}

fn ratio_or_one(storage: f64, layout: f64) -> f64 {
    let ratio = storage / layout;
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
