//! Generic flow control: running children one after another.
//!
//! `Sequencer` is the reusable engine; `flow::Sequence` is the plain
//! flow-control component built on it. Canvas composites embed the same
//! engine and add surface handling around it.

use crate::component::{Capability, Children, Component, FrameOutcome};
use crate::config::{CanvasOptions, HandMeDown, HandMeDowns, hand_down};
use crate::error::EaselResult;
use crate::host::{ContainerRef, Environment};
use crate::id::ComponentId;
use crate::lifecycle::{Lifecycle, Status};

// ─── Sequencer ───────────────────────────────────────────────────────────

pub struct Sequencer {
    children: Vec<Box<dyn Component>>,
    current: usize,
    hand_me_downs: HandMeDowns,
}

impl Sequencer {
    pub fn new(children: Vec<Box<dyn Component>>) -> Self {
        Self {
            children,
            current: 0,
            hand_me_downs: HandMeDowns::new(&[HandMeDown::Container]),
        }
    }

    pub fn hand_me_downs(&self) -> &HandMeDowns {
        &self.hand_me_downs
    }

    pub fn hand_me_downs_mut(&mut self) -> &mut HandMeDowns {
        &mut self.hand_me_downs
    }

    pub fn children(&self) -> Children<'_> {
        let mut out = Children::new();
        for child in &self.children {
            out.push(child.as_ref());
        }
        out
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut (dyn Component + 'static)> {
        self.children.get_mut(index).map(|c| c.as_mut())
    }

    /// Index of the child currently running.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Copy the parent's hand-me-down values into every child.
    pub fn hand_down(&mut self, parent: &CanvasOptions) {
        for child in &mut self.children {
            let merged = hand_down(parent, child.canvas_options(), &self.hand_me_downs);
            *child.canvas_options_mut() = merged;
        }
    }

    /// Prepare every child in order, stopping at the first failure.
    pub fn prepare(&mut self, env: &dyn Environment) -> EaselResult<()> {
        for child in &mut self.children {
            child.prepare(env)?;
        }
        Ok(())
    }

    /// Start the first child. Returns `false` if there is none.
    pub fn start(&mut self, env: &dyn Environment) -> EaselResult<bool> {
        self.current = 0;
        match self.children.first_mut() {
            Some(first) => {
                first.start(env)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Render the current child, advancing when it finishes.
    pub fn render(&mut self, env: &dyn Environment, timestamp: f64) -> EaselResult<FrameOutcome> {
        let Some(child) = self.children.get_mut(self.current) else {
            return Ok(FrameOutcome::Finished);
        };
        let outcome = child.render(env, timestamp)?;
        if outcome == FrameOutcome::Continue && child.status() != Status::Done {
            return Ok(FrameOutcome::Continue);
        }

        child.end(env)?;
        self.current += 1;
        match self.children.get_mut(self.current) {
            Some(next) => {
                log::debug!("sequence advancing to child {}", self.current);
                next.start(env)?;
                Ok(FrameOutcome::Continue)
            }
            None => Ok(FrameOutcome::Finished),
        }
    }

    /// End the running child, if any.
    pub fn end(&mut self, env: &dyn Environment) -> EaselResult<()> {
        if let Some(child) = self.children.get_mut(self.current)
            && child.status() == Status::Running
        {
            child.end(env)?;
        }
        Ok(())
    }
}

// ─── flow::Sequence ──────────────────────────────────────────────────────

/// Plain flow-control sequence. Drawable only when all of its children are.
pub struct Sequence {
    lifecycle: Lifecycle,
    options: CanvasOptions,
    sequencer: Sequencer,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Component>>) -> Self {
        Self::with_id(ComponentId::with_prefix("sequence"), children)
    }

    pub fn with_id(id: ComponentId, children: Vec<Box<dyn Component>>) -> Self {
        let mut sequencer = Sequencer::new(children);
        // Surface keys only carry a value when a canvas composite above set
        // them, so nested screens draw on that composite's surface.
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

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }
}

impl Component for Sequence {
    fn kind(&self) -> &'static str {
        "flow.Sequence"
    }

    fn capability(&self) -> Capability {
        Capability::Flow
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
        self.sequencer.hand_down(&self.options);
        self.sequencer.prepare(env)?;
        self.lifecycle.mark_prepared()
    }

    fn start(&mut self, env: &dyn Environment) -> EaselResult<()> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Screen;
    use crate::config::ScreenSpec;
    use crate::headless::{HeadlessContainer, HeadlessEnvironment};
    use kurbo::Size;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn one_frame_screen() -> Box<dyn Component> {
        Box::new(
            Screen::new(ScreenSpec::default()).with_render_fn(|_, _, _, _| FrameOutcome::Finished),
        )
    }

    #[test]
    fn container_is_handed_down_but_no_surface_is_invented() {
        let env = HeadlessEnvironment::new(1.0);
        let container = HeadlessContainer::shared(Size::new(100.0, 100.0));
        let mut seq = Sequence::new(vec![one_frame_screen(), one_frame_screen()])
            .with_container(container.clone());
        seq.prepare(&env).unwrap();

        for child in seq.children() {
            let handed = child.canvas_options().container.clone().unwrap();
            assert!(Rc::ptr_eq(&handed, &container));
        }
        // Each screen made its own surface.
        assert_eq!(env.created_surfaces(), 2);
    }

    #[test]
    fn advances_through_children() {
        let env = HeadlessEnvironment::new(1.0);
        let container = HeadlessContainer::shared(Size::new(100.0, 100.0));
        let mut seq = Sequence::new(vec![one_frame_screen(), one_frame_screen()])
            .with_container(container);
        seq.prepare(&env).unwrap();
        seq.start(&env).unwrap();

        assert_eq!(seq.render(&env, 0.0).unwrap(), FrameOutcome::Continue);
        assert_eq!(seq.sequencer().current(), 1);
        assert_eq!(seq.render(&env, 1.0).unwrap(), FrameOutcome::Finished);
        assert_eq!(seq.status(), Status::Done);
        assert_eq!(seq.render(&env, 2.0).unwrap(), FrameOutcome::Finished);
    }

    #[test]
    fn end_stops_running_child() {
        let env = HeadlessEnvironment::new(1.0);
        let container = HeadlessContainer::shared(Size::new(100.0, 100.0));
        let mut seq = Sequence::new(vec![one_frame_screen()]).with_container(container);
        seq.prepare(&env).unwrap();
        seq.start(&env).unwrap();
        seq.end(&env).unwrap();
        assert_eq!(seq.children()[0].status(), Status::Done);
        assert_eq!(seq.status(), Status::Done);
    }
}
