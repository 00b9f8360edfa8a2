//! Drawing-surface management.
//!
//! `ensure_surface` runs at preparation so children can be handed the
//! shared surface; `insert_surface` runs at start, once the container has
//! its final size.

use crate::config::CanvasOptions;
use crate::error::{EaselError, EaselResult};
use crate::host::{ContainerRef, Environment, Mountable, SurfaceRef};
use kurbo::Size;

/// Create a surface if none was supplied and settle the density flag.
///
/// # Errors
/// Propagates a host error if the surface cannot be created.
pub fn ensure_surface(options: &mut CanvasOptions, env: &dyn Environment) -> EaselResult<()> {
    if options.surface.is_none() {
        options.surface = Some(env.create_surface()?);
        options.insert_on_run = true;
    }
    if options.pixel_density_scaling.is_none() {
        options.pixel_density_scaling = Some(true);
    }
    Ok(())
}

/// Physical pixels per layout pixel for this component's surface.
pub fn density_factor(options: &CanvasOptions, env: &dyn Environment) -> f64 {
    if options.pixel_density_scaling.unwrap_or(true) {
        env.device_pixel_ratio()
    } else {
        1.0
    }
}

/// Size `surface` to the content box of `container`.
///
/// Storage pixels are the layout size times `ratio`, rounded down.
pub fn fit_surface(surface: &SurfaceRef, container: &ContainerRef, ratio: f64) -> Size {
    let layout = container.borrow().content_box();
    let storage = Size::new((layout.width * ratio).floor(), (layout.height * ratio).floor());
    let mut s = surface.borrow_mut();
    s.set_storage_size(storage);
    s.set_layout_size(layout);
    storage
}

/// Size and attach an internally created surface.
///
/// A no-op (returning `false`) when the surface was supplied by the caller
/// or has already been inserted.
///
/// # Errors
/// Returns a state error if there is no surface or no container to
/// insert it into.
pub fn insert_surface(
    options: &mut CanvasOptions,
    env: &dyn Environment,
    clear_container: bool,
) -> EaselResult<bool> {
    if !options.insert_on_run {
        return Ok(false);
    }
    let surface = options
        .surface
        .clone()
        .ok_or_else(|| EaselError::state("no surface to insert; prepare first"))?;
    let container = options
        .container
        .clone()
        .ok_or_else(|| EaselError::state("no container to insert the surface into"))?;

    let storage = fit_surface(&surface, &container, density_factor(options, env));
    if clear_container {
        container.borrow_mut().clear();
    }
    let attached = surface.borrow().is_attached();
    if !attached {
        container
            .borrow_mut()
            .append(Mountable::Surface(surface.clone()))?;
    }
    options.insert_on_run = false;
    log::debug!(
        "surface inserted: {}x{} storage px (cleared: {clear_container}, appended: {})",
        storage.width,
        storage.height,
        !attached
    );
    Ok(true)
}
