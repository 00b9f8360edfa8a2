//! Drawable sequence: children run one after another on one shared surface.

use crate::component::{Capability, Children, Component, FrameOutcome, describe};
use crate::config::{CanvasOptions, HandMeDown};
use crate::error::{EaselError, EaselResult};
use crate::flow::Sequencer;
use crate::host::{ContainerRef, Environment, SurfaceRef};
use crate::id::ComponentId;
use crate::lifecycle::{Lifecycle, Status};
use crate::surface::{ensure_surface, insert_surface};

pub struct Sequence {
    lifecycle: Lifecycle,
    options: CanvasOptions,
    sequencer: Sequencer,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Component>>) -> Self {
        Self::with_id(ComponentId::with_prefix("canvas-sequence"), children)
    }

    pub fn with_id(id: ComponentId, children: Vec<Box<dyn Component>>) -> Self {
        let mut sequencer = Sequencer::new(children);
        let keys = sequencer.hand_me_downs_mut();
        keys.add(HandMeDown::Surface);
        keys.add(HandMeDown::PixelDensityScaling);
        Self {
            lifecycle: Lifecycle::new(id),
            options: CanvasOptions::default(),
            sequencer,
        }
    }

    pub fn with_container(mut self, container: ContainerRef) -> Self {
        self.options.container = Some(container);
        self
    }

    pub fn with_surface(mut self, surface: SurfaceRef) -> Self {
        self.options.surface = Some(surface);
        self
    }

    pub fn with_pixel_density_scaling(mut self, enabled: bool) -> Self {
        self.options.pixel_density_scaling = Some(enabled);
        self
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Every direct child must be able to draw on the shared surface.
    fn check_children(&self) -> EaselResult<()> {
        for child in self.sequencer.children() {
            if child.capability() != Capability::Drawable {
                return Err(EaselError::composition(describe(self), child.kind()));
            }
        }
        Ok(())
    }
}

impl Component for Sequence {
    fn kind(&self) -> &'static str {
        "canvas.Sequence"
    }

    fn capability(&self) -> Capability {
        Capability::Drawable
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn children(&self) -> Children<'_> {
        self.sequencer.children()
    }

    fn canvas_options(&self) -> &CanvasOptions {
        &self.options
    }

    fn canvas_options_mut(&mut self) -> &mut CanvasOptions {
        &mut self.options
    }

    fn prepare(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.require(Status::Created, "prepare")?;
        self.check_children()?;
        ensure_surface(&mut self.options, env)?;
        self.sequencer.hand_down(&self.options);
        self.sequencer.prepare(env)?;
        log::debug!(
            "{} prepared with {} children",
            describe(self),
            self.sequencer.children().len()
        );
        self.lifecycle.mark_prepared()
    }

    fn start(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.require(Status::Prepared, "start")?;
        insert_surface(&mut self.options, env, true)?;
        self.lifecycle.mark_running()?;
        if !self.sequencer.start(env)? {
            self.lifecycle.finish();
        }
        Ok(())
    }

    fn render(&mut self, env: &dyn Environment, timestamp: f64) -> EaselResult<FrameOutcome> {
        if self.lifecycle.status() == Status::Done {
            return Ok(FrameOutcome::Finished);
        }
        self.lifecycle.require(Status::Running, "render")?;
        let outcome = self.sequencer.render(env, timestamp)?;
        if outcome == FrameOutcome::Finished {
            self.lifecycle.finish();
        }
        Ok(outcome)
    }

    fn end(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.sequencer.end(env)?;
        self.lifecycle.finish();
        Ok(())
    }
}
