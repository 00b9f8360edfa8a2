//! The drawable leaf: one surface, one transform, a render callback per frame.

use crate::component::{Capability, Component, FrameOutcome};
use crate::config::{CanvasOptions, ScreenSpec};
use crate::content::content_render_fn;
use crate::error::{EaselError, EaselResult};
use crate::host::{
    ContainerRef, ContextRef, DrawingContext, Environment, SurfaceElement, SurfaceRef,
};
use crate::id::ComponentId;
use crate::lifecycle::{Lifecycle, Status};
use crate::surface::{density_factor, ensure_surface, insert_surface};
use crate::transform::{TransformOptions, Transforms, compute_transform, viewport_bounds};
use kurbo::{Affine, Point, Rect};

/// Stroke style of the debug viewport outline.
pub const VIEWPORT_EDGE_STYLE: &str = "rgb(229, 229, 229)";

/// Per-frame drawing callback: `(timestamp, surface, context, screen)`.
///
/// The context is already in viewport units. The returned outcome tells
/// the scheduler whether to keep rendering.
pub type RenderFn =
    Box<dyn FnMut(f64, &dyn SurfaceElement, &mut dyn DrawingContext, &Screen) -> FrameOutcome>;

/// State that only exists while the screen runs.
struct RunState {
    context: ContextRef,
    transforms: Transforms,
    pixel_ratio: f64,
    /// Saves issued by the render callback and not yet restored.
    open_saves: usize,
}

pub struct Screen {
    lifecycle: Lifecycle,
    options: CanvasOptions,
    spec: ScreenSpec,
    render_fn: Option<RenderFn>,
    run: Option<RunState>,
}

impl Screen {
    pub fn new(spec: ScreenSpec) -> Self {
        let id = spec.id.unwrap_or_else(|| ComponentId::with_prefix("screen"));
        let options = CanvasOptions {
            context_type: spec.context_type,
            insert_on_run: spec.insert_on_run,
            pixel_density_scaling: spec.pixel_density_scaling,
            ..Default::default()
        };
        Self {
            lifecycle: Lifecycle::new(id),
            options,
            spec,
            render_fn: None,
            run: None,
        }
    }

    /// Build a screen from its JSON description.
    pub fn from_json(json: &str) -> EaselResult<Self> {
        Ok(Self::new(ScreenSpec::from_json(json)?))
    }

    pub fn with_render_fn(
        mut self,
        render_fn: impl FnMut(f64, &dyn SurfaceElement, &mut dyn DrawingContext, &Screen) -> FrameOutcome
        + 'static,
    ) -> Self {
        self.render_fn = Some(Box::new(render_fn));
        self
    }

    pub fn with_surface(mut self, surface: SurfaceRef) -> Self {
        self.options.surface = Some(surface);
        self
    }

    pub fn with_container(mut self, container: ContainerRef) -> Self {
        self.options.container = Some(container);
        self
    }

    pub fn spec(&self) -> &ScreenSpec {
        &self.spec
    }

    pub fn surface(&self) -> Option<&SurfaceRef> {
        self.options.surface.as_ref()
    }

    /// Transforms of the current run, if started.
    pub fn transforms(&self) -> Option<Transforms> {
        self.run.as_ref().map(|r| r.transforms)
    }

    /// Map a viewport point onto the surface.
    ///
    /// # Errors
    /// Returns a state error before the screen has started.
    pub fn to_surface_coordinates(&self, point: Point) -> EaselResult<Point> {
        self.running_transforms("map coordinates of")
            .map(|t| t.to_surface(point))
    }

    /// Map a pointer position (layout pixels) into viewport units.
    ///
    /// # Errors
    /// Returns a state error before the screen has started.
    pub fn to_viewport_coordinates(&self, pointer: Point) -> EaselResult<Point> {
        self.running_transforms("map pointer for")
            .map(|t| t.from_pointer(pointer))
    }

    /// Recompute and re-apply the transforms after the surface was resized.
    ///
    /// Transforms are never refreshed implicitly.
    pub fn refresh_transform(&mut self) -> EaselResult<Transforms> {
        let surface = self.surface_handle()?;
        let pixel_ratio = match &self.run {
            Some(run) => run.pixel_ratio,
            None => return Err(self.not_running("refresh the transform of")),
        };
        let transforms = self.compute_transforms(&surface, pixel_ratio);
        if let Some(run) = self.run.as_mut() {
            run.transforms = transforms;
            run.context.borrow_mut().set_transform(transforms.device);
        }
        Ok(transforms)
    }

    fn running_transforms(&self, action: &str) -> EaselResult<Transforms> {
        self.transforms().ok_or_else(|| self.not_running(action))
    }

    fn not_running(&self, action: &str) -> EaselError {
        EaselError::state(format!(
            "cannot {action} {}: transform not computed yet",
            self.id()
        ))
    }

    fn surface_handle(&self) -> EaselResult<SurfaceRef> {
        self.options
            .surface
            .clone()
            .ok_or_else(|| EaselError::state(format!("{} has no surface", self.id())))
    }

    fn compute_transforms(&self, surface: &SurfaceRef, pixel_ratio: f64) -> Transforms {
        let s = surface.borrow();
        compute_transform(
            s.storage_size(),
            self.spec.viewport_size(),
            &TransformOptions {
                scale: self.spec.viewport_scale,
                center_origin: self.spec.center_origin,
                pixel_ratio,
                layout_rect: s.layout_rect(),
            },
        )
    }

    fn draw_chrome(&self, ctx: &mut dyn DrawingContext, surface: &SurfaceRef, transforms: &Transforms) {
        if self.spec.clear_on_render {
            let size = surface.borrow().storage_size();
            ctx.save();
            ctx.set_transform(Affine::IDENTITY);
            ctx.clear_rect(Rect::from_origin_size(Point::ORIGIN, size));
            ctx.restore();
        }
        if self.spec.show_viewport_edge {
            ctx.save();
            ctx.set_line_width(transforms.pixel_in_viewport_units());
            ctx.set_stroke_style(VIEWPORT_EDGE_STYLE);
            ctx.stroke_rect(viewport_bounds(
                self.spec.viewport_size(),
                self.spec.center_origin,
            ));
            ctx.restore();
        }
    }
}

impl Component for Screen {
    fn kind(&self) -> &'static str {
        "canvas.Screen"
    }

    fn capability(&self) -> Capability {
        Capability::Drawable
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn canvas_options(&self) -> &CanvasOptions {
        &self.options
    }

    fn canvas_options_mut(&mut self) -> &mut CanvasOptions {
        &mut self.options
    }

    fn prepare(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.require(Status::Created, "prepare")?;
        ensure_surface(&mut self.options, env)?;
        if self.render_fn.is_none() {
            self.render_fn = Some(content_render_fn(self.spec.content.clone()));
        }
        self.lifecycle.mark_prepared()
    }

    fn start(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.require(Status::Prepared, "start")?;
        insert_surface(&mut self.options, env, true)?;

        let surface = self.surface_handle()?;
        let kind = self.options.context_type;
        let context = surface.borrow_mut().context(kind).ok_or_else(|| {
            EaselError::host(format!("surface offers no `{}` context", kind.as_str()))
        })?;

        let pixel_ratio = density_factor(&self.options, env);
        let transforms = self.compute_transforms(&surface, pixel_ratio);
        {
            let mut ctx = context.borrow_mut();
            ctx.save();
            ctx.set_transform(transforms.device);
        }
        self.run = Some(RunState {
            context,
            transforms,
            pixel_ratio,
            open_saves: 0,
        });
        self.lifecycle.mark_running()
    }

    fn render(&mut self, _env: &dyn Environment, timestamp: f64) -> EaselResult<FrameOutcome> {
        self.lifecycle.require(Status::Running, "render")?;
        let surface = self.surface_handle()?;
        let (context, transforms, open_saves) = match &self.run {
            Some(run) => (run.context.clone(), run.transforms, run.open_saves),
            None => return Err(self.not_running("render")),
        };

        self.draw_chrome(&mut *context.borrow_mut(), &surface, &transforms);

        let Some(mut render_fn) = self.render_fn.take() else {
            return Ok(FrameOutcome::Continue);
        };
        let (outcome, open_saves) = {
            let mut ctx = context.borrow_mut();
            let mut tracked = TrackedContext {
                inner: &mut *ctx,
                open_saves,
            };
            let element = surface.borrow();
            let outcome = render_fn(timestamp, &*element, &mut tracked, &*self);
            (outcome, tracked.open_saves)
        };
        self.render_fn = Some(render_fn);
        if let Some(run) = self.run.as_mut() {
            run.open_saves = open_saves;
        }

        log::trace!("{} frame at {timestamp}: {outcome:?}", self.id());
        Ok(outcome)
    }

    fn end(&mut self, _env: &dyn Environment) -> EaselResult<()> {
        if let Some(run) = self.run.take() {
            let mut ctx = run.context.borrow_mut();
            if run.open_saves > 0 {
                log::warn!(
                    "{}: render callback left {} save(s) open",
                    self.id(),
                    run.open_saves
                );
            }
            for _ in 0..run.open_saves {
                ctx.restore();
            }
            ctx.restore();
        }
        self.lifecycle.finish();
        Ok(())
    }
}

// ─── Save tracking ───────────────────────────────────────────────────────

/// Forwards to the surface context, counting the callback's saves so the
/// screen can unwind them at end and ignore restores that would pop the
/// screen's own state.
struct TrackedContext<'a> {
    inner: &'a mut dyn DrawingContext,
    open_saves: usize,
}

impl DrawingContext for TrackedContext<'_> {
    fn save(&mut self) {
        self.open_saves += 1;
        self.inner.save();
    }

    fn restore(&mut self) {
        if self.open_saves == 0 {
            log::warn!("ignoring restore without matching save");
            return;
        }
        self.open_saves -= 1;
        self.inner.restore();
    }

    fn set_transform(&mut self, transform: Affine) {
        self.inner.set_transform(transform);
    }

    fn transform(&mut self, transform: Affine) {
        self.inner.transform(transform);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.inner.translate(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        self.inner.rotate(angle);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.inner.clear_rect(rect);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.inner.fill_rect(rect);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.inner.stroke_rect(rect);
    }

    fn begin_path(&mut self) {
        self.inner.begin_path();
    }

    fn close_path(&mut self) {
        self.inner.close_path();
    }

    fn move_to(&mut self, point: Point) {
        self.inner.move_to(point);
    }

    fn line_to(&mut self, point: Point) {
        self.inner.line_to(point);
    }

    fn rect(&mut self, rect: Rect) {
        self.inner.rect(rect);
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        self.inner.arc(center, radius, start, end);
    }

    fn ellipse(&mut self, center: Point, radii: (f64, f64), rotation: f64, start: f64, end: f64) {
        self.inner.ellipse(center, radii, rotation, start, end);
    }

    fn fill(&mut self) {
        self.inner.fill();
    }

    fn stroke(&mut self) {
        self.inner.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.inner.fill_text(text, at);
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        self.inner.stroke_text(text, at);
    }

    fn set_fill_style(&mut self, style: &str) {
        self.inner.set_fill_style(style);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.inner.set_stroke_style(style);
    }

    fn set_line_width(&mut self, width: f64) {
        self.inner.set_line_width(width);
    }

    fn set_font(&mut self, font: &str) {
        self.inner.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.inner.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.inner.set_text_baseline(baseline);
    }
}
