//! Drawable frame: nested drawable content shown inside embedding markup.
//!
//! The markup must contain a `<canvas>` placeholder. The realized
//! placeholder becomes the shared surface and the surrounding markup is
//! left intact. A frame has no end condition of its own: it finishes when
//! its content does.

use crate::component::{Capability, Children, Component, FrameOutcome, describe, first_non_drawable};
use crate::config::{CanvasOptions, HandMeDown, HandMeDowns, hand_down};
use crate::error::{EaselError, EaselResult};
use crate::host::{ContainerRef, Environment, Mountable, RealizedMarkup};
use crate::id::ComponentId;
use crate::lifecycle::{Event, Lifecycle, Status};
use crate::markup;
use crate::surface::{ensure_surface, insert_surface};

pub struct Frame {
    lifecycle: Lifecycle,
    options: CanvasOptions,
    markup: String,
    content: Box<dyn Component>,
    realized: Option<RealizedMarkup>,
    hand_me_downs: HandMeDowns,
}

impl Frame {
    pub fn new(markup: impl Into<String>, content: Box<dyn Component>) -> Self {
        Self::with_id(ComponentId::with_prefix("frame"), markup, content)
    }

    pub fn with_id(id: ComponentId, markup: impl Into<String>, content: Box<dyn Component>) -> Self {
        Self {
            lifecycle: Lifecycle::new(id),
            options: CanvasOptions::default(),
            markup: markup.into(),
            content,
            realized: None,
            hand_me_downs: HandMeDowns::new(&[
                HandMeDown::Surface,
                HandMeDown::PixelDensityScaling,
            ]),
        }
    }

    pub fn with_container(mut self, container: ContainerRef) -> Self {
        self.options.container = Some(container);
        self
    }

    pub fn content(&self) -> &dyn Component {
        self.content.as_ref()
    }

    /// Live objects for the embedding markup, once prepared.
    pub fn realized(&self) -> Option<&RealizedMarkup> {
        self.realized.as_ref()
    }

    /// Where the content (and the placeholder surface) is mounted.
    pub fn content_mount(&self) -> Option<ContainerRef> {
        self.content.canvas_options().container.clone()
    }
}

impl Component for Frame {
    fn kind(&self) -> &'static str {
        "canvas.Frame"
    }

    fn capability(&self) -> Capability {
        Capability::Drawable
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn children(&self) -> Children<'_> {
        let mut out = Children::new();
        out.push(self.content.as_ref());
        out
    }

    fn canvas_options(&self) -> &CanvasOptions {
        &self.options
    }

    fn canvas_options_mut(&mut self) -> &mut CanvasOptions {
        &mut self.options
    }

    fn prepare(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.require(Status::Created, "prepare")?;
        if let Some(offender) = first_non_drawable(self.content.as_ref()) {
            return Err(EaselError::composition(describe(self), offender.kind()));
        }

        let (fragment, placeholder) = markup::parse_with_placeholder(&self.markup)?;
        let realized = env.realize_markup(&fragment, &placeholder)?;
        self.options.surface = Some(realized.surface.clone());

        let mount = realized
            .surface_parent
            .clone()
            .or_else(|| self.options.container.clone());
        self.content.canvas_options_mut().container = mount;

        let frame = self.lifecycle.clone();
        self.content.lifecycle().on(Event::End, move |content, _| {
            log::debug!("content {content} ended, finishing {}", frame.id());
            frame.finish();
        });

        ensure_surface(&mut self.options, env)?;
        self.options.insert_on_run = true;

        let merged = hand_down(&self.options, self.content.canvas_options(), &self.hand_me_downs);
        *self.content.canvas_options_mut() = merged;
        self.realized = Some(realized);

        self.content.prepare(env)?;
        self.lifecycle.mark_prepared()
    }

    fn start(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.require(Status::Prepared, "start")?;
        let realized = self
            .realized
            .clone()
            .ok_or_else(|| EaselError::state(format!("{} was not prepared", describe(self))))?;

        let container = self.options.container.clone().ok_or_else(|| {
            EaselError::state(format!("{} has no container to mount its markup in", describe(self)))
        })?;
        {
            let mut container = container.borrow_mut();
            container.clear();
            container.append(Mountable::Container(realized.root.clone()))?;
        }

        // Size the placeholder against the content mount; the markup
        // around it is kept.
        let mut slot = self.options.clone();
        slot.container = self.content_mount();
        insert_surface(&mut slot, env, false)?;
        self.options.insert_on_run = slot.insert_on_run;

        self.lifecycle.mark_running()?;
        self.content.start(env)
    }

    fn render(&mut self, env: &dyn Environment, timestamp: f64) -> EaselResult<FrameOutcome> {
        if self.lifecycle.status() == Status::Done {
            return Ok(FrameOutcome::Finished);
        }
        self.lifecycle.require(Status::Running, "render")?;
        if self.content.render(env, timestamp)? == FrameOutcome::Finished {
            // Ending the content finishes the frame through its end handler.
            self.content.end(env)?;
        }
        Ok(match self.lifecycle.status() {
            Status::Done => FrameOutcome::Finished,
            _ => FrameOutcome::Continue,
        })
    }

    fn end(&mut self, env: &dyn Environment) -> EaselResult<()> {
        if self.content.status() != Status::Done {
            self.content.end(env)?;
        }
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
    use crate::host::SurfaceElement;
    use kurbo::Size;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    const MARKUP: &str = r#"<div class="stage"><p>Score</p><canvas width="200" height="100"></canvas></div>"#;

    fn screen() -> Box<dyn Component> {
        Box::new(Screen::new(ScreenSpec::default()).with_render_fn(|ts, _, _, _| {
            if ts >= 1.0 {
                FrameOutcome::Finished
            } else {
                FrameOutcome::Continue
            }
        }))
    }

    #[test]
    fn placeholder_becomes_the_content_surface() {
        let env = HeadlessEnvironment::new(1.0);
        let container = HeadlessContainer::new_shared(Size::new(640.0, 480.0));
        let mut frame = Frame::new(MARKUP, screen()).with_container(container.clone());
        frame.prepare(&env).unwrap();

        assert_eq!(env.created_surfaces(), 0);
        let placeholder = env.realized_surface(0).unwrap();
        let content_surface = frame.content().canvas_options().surface.clone().unwrap();
        let placeholder_ref: crate::host::SurfaceRef = placeholder;
        assert!(Rc::ptr_eq(&placeholder_ref, &content_surface));

        let mount = frame.content_mount().unwrap();
        let parent = frame.realized().unwrap().surface_parent.clone().unwrap();
        assert!(Rc::ptr_eq(&mount, &parent));

        frame.start(&env).unwrap();
        assert_eq!(container.borrow().container_count(), 1);
        assert_eq!(frame.content().status(), Status::Running);
    }

    #[test]
    fn missing_placeholder_is_structure_error() {
        let env = HeadlessEnvironment::new(1.0);
        let mut frame = Frame::new("<div><p>no surface</p></div>", screen());
        let err = frame.prepare(&env).unwrap_err();
        assert!(matches!(err, EaselError::Structure(_)));
        assert!(frame.start(&env).is_err());
    }

    #[test]
    fn content_end_finishes_frame_once() {
        let env = HeadlessEnvironment::new(1.0);
        let container = HeadlessContainer::shared(Size::new(640.0, 480.0));
        let mut frame = Frame::new(MARKUP, screen()).with_container(container);
        let ends = Rc::new(Cell::new(0));
        let counter = ends.clone();
        frame.lifecycle().on(Event::End, move |_, _| counter.set(counter.get() + 1));

        frame.prepare(&env).unwrap();
        frame.start(&env).unwrap();
        assert_eq!(frame.render(&env, 0.0).unwrap(), FrameOutcome::Continue);
        assert_eq!(frame.render(&env, 1.0).unwrap(), FrameOutcome::Finished);
        assert_eq!(frame.status(), Status::Done);
        assert_eq!(ends.get(), 1);

        frame.end(&env).unwrap();
        assert_eq!(ends.get(), 1);
    }

    #[test]
    fn start_without_container_is_state_error() {
        let env = HeadlessEnvironment::new(1.0);
        let mut frame = Frame::new(MARKUP, screen());
        frame.prepare(&env).unwrap();

        let err = frame.start(&env).unwrap_err();
        assert!(matches!(err, EaselError::State(_)));
        assert_eq!(frame.status(), Status::Prepared);
        assert_eq!(frame.content().status(), Status::Prepared);
    }

    #[test]
    fn top_level_placeholder_mounts_in_frame_container() {
        let env = HeadlessEnvironment::new(2.0);
        let container = HeadlessContainer::new_shared(Size::new(300.0, 200.0));
        let mut frame = Frame::new("<canvas></canvas>", screen()).with_container(container.clone());
        frame.prepare(&env).unwrap();

        let container_ref: ContainerRef = container;
        assert!(Rc::ptr_eq(&frame.content_mount().unwrap(), &container_ref));

        frame.start(&env).unwrap();
        let surface = env.realized_surface(0).unwrap();
        assert_eq!(surface.borrow().storage_size(), Size::new(600.0, 400.0));
    }
}
