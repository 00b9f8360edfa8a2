//! Integration tests: nesting rules and lifecycle coupling of the canvas
//! composites, run against the headless host.

use easel_core::canvas::{Frame, Screen, Sequence};
use easel_core::component::{Capability, Component, FrameOutcome, is_drawable};
use easel_core::config::{CanvasOptions, ScreenSpec};
use easel_core::error::{EaselError, EaselResult};
use easel_core::flow;
use easel_core::headless::{HeadlessContainer, HeadlessEnvironment};
use easel_core::host::Environment;
use easel_core::kurbo::Size;
use easel_core::lifecycle::{Event, Lifecycle, Status};
use easel_core::runner::AnimationLoop;
use easel_core::{ComponentId, SurfaceElement};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A component that draws nothing and is not canvas based.
struct Note {
    lifecycle: Lifecycle,
    options: CanvasOptions,
}

impl Note {
    fn boxed() -> Box<dyn Component> {
        Box::new(Self {
            lifecycle: Lifecycle::new(ComponentId::with_prefix("note")),
            options: CanvasOptions::default(),
        })
    }
}

impl Component for Note {
    fn kind(&self) -> &'static str {
        "html.Note"
    }

    fn capability(&self) -> Capability {
        Capability::Plain
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

    fn prepare(&mut self, _env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.mark_prepared()
    }

    fn start(&mut self, _env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.mark_running()
    }

    fn render(&mut self, _env: &dyn Environment, _timestamp: f64) -> EaselResult<FrameOutcome> {
        Ok(FrameOutcome::Continue)
    }

    fn end(&mut self, _env: &dyn Environment) -> EaselResult<()> {
        self.lifecycle.finish();
        Ok(())
    }
}

fn screen_for(frames: u32) -> Box<dyn Component> {
    let mut seen = 0;
    Box::new(
        Screen::new(ScreenSpec::default()).with_render_fn(move |_, _, _, _| {
            seen += 1;
            if seen >= frames {
                FrameOutcome::Finished
            } else {
                FrameOutcome::Continue
            }
        }),
    )
}

// ─── Classification ──────────────────────────────────────────────────────

#[test]
fn flow_is_drawable_only_when_every_leaf_is() {
    let drawable = flow::Sequence::new(vec![screen_for(1), screen_for(1)]);
    assert!(is_drawable(&drawable));

    let mixed = flow::Sequence::new(vec![
        screen_for(1),
        Box::new(flow::Sequence::new(vec![Note::boxed()])),
    ]);
    assert!(!is_drawable(&mixed));
}

// ─── Sequence ────────────────────────────────────────────────────────────

#[test]
fn sequence_with_plain_child_never_starts() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let container = HeadlessContainer::new_shared(Size::new(400.0, 300.0));
    let seq = Sequence::new(vec![screen_for(1), Note::boxed()]).with_container(container.clone());
    let mut anim = AnimationLoop::new(Box::new(seq));

    let err = anim.start(&env).unwrap_err();
    match &err {
        EaselError::Composition { child, .. } => assert_eq!(child, "html.Note"),
        other => panic!("expected composition error, got {other:?}"),
    }
    assert_eq!(anim.root().status(), Status::Created);
    assert_eq!(anim.root().children()[0].status(), Status::Created);
    assert!(!anim.is_running());
    assert_eq!(container.borrow().surface_count(), 0);
}

#[test]
fn sequence_children_take_turns_on_one_surface() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let container = HeadlessContainer::new_shared(Size::new(400.0, 300.0));
    let seq = Sequence::new(vec![screen_for(2), screen_for(3)]).with_container(container.clone());
    let mut anim = AnimationLoop::new(Box::new(seq));
    anim.start(&env).unwrap();

    let mut ts = 0.0;
    while anim.tick(&env, ts).unwrap() {
        ts += 16.0;
    }
    assert_eq!(anim.frames(), 5);
    assert_eq!(env.created_surfaces(), 1);
    assert_eq!(container.borrow().surface_count(), 1);
    for child in anim.root().children() {
        assert_eq!(child.status(), Status::Done);
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────

#[test]
fn frame_without_placeholder_fails_structurally() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let frame = Frame::new("<section><p>nothing to draw on</p></section>", screen_for(1));
    let mut anim = AnimationLoop::new(Box::new(frame));
    let err = anim.start(&env).unwrap_err();
    assert!(matches!(err, EaselError::Structure(_)), "got {err:?}");
    assert!(!anim.is_running());
}

#[test]
fn frame_rejects_plain_leaf_anywhere_in_content() {
    let env = HeadlessEnvironment::new(1.0);
    let content = flow::Sequence::new(vec![
        screen_for(1),
        Box::new(flow::Sequence::new(vec![Note::boxed()])),
    ]);
    let mut frame = Frame::new(include_str!("fixtures/stage.html"), Box::new(content));
    let err = frame.prepare(&env).unwrap_err();
    match err {
        EaselError::Composition { parent, child } => {
            assert!(parent.starts_with("canvas.Frame @frame_"));
            assert_eq!(child, "html.Note");
        }
        other => panic!("expected composition error, got {other:?}"),
    }
}

#[test]
fn content_end_finishes_frame_exactly_once() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let container = HeadlessContainer::shared(Size::new(800.0, 600.0));
    let mut frame =
        Frame::new(include_str!("fixtures/stage.html"), screen_for(100)).with_container(container);

    let frame_ends = Rc::new(Cell::new(0));
    let counter = frame_ends.clone();
    frame.lifecycle().on(Event::End, move |_, _| counter.set(counter.get() + 1));

    frame.prepare(&env).unwrap();
    frame.start(&env).unwrap();
    assert_eq!(frame.render(&env, 0.0).unwrap(), FrameOutcome::Continue);

    // The frame has no end condition of its own; the content finishing
    // on its own is enough to finish it.
    let content = frame.content().lifecycle().clone();
    assert!(content.finish());
    assert_eq!(frame.status(), Status::Done);
    assert_eq!(frame_ends.get(), 1);
    assert_eq!(frame.render(&env, 16.0).unwrap(), FrameOutcome::Finished);

    frame.end(&env).unwrap();
    assert_eq!(frame_ends.get(), 1);
}

#[test]
fn frame_keeps_markup_and_sizes_placeholder() {
    init_logging();
    let env = HeadlessEnvironment::new(2.0);
    let container = HeadlessContainer::new_shared(Size::new(800.0, 600.0));
    let mut frame =
        Frame::new(include_str!("fixtures/stage.html"), screen_for(1)).with_container(container.clone());
    frame.prepare(&env).unwrap();
    frame.start(&env).unwrap();

    // Only the realized fragment root sits in the frame's container.
    assert_eq!(container.borrow().container_count(), 1);
    assert_eq!(container.borrow().surface_count(), 0);

    // The placeholder is sized against its parent (`div.board`), never
    // re-appended, and its parent is never cleared.
    let surface = env.realized_surface(0).unwrap();
    assert_eq!(surface.borrow().storage_size(), Size::new(1600.0, 1200.0));
    assert!(surface.borrow().is_attached());

    let screen_transforms = frame.content().status();
    assert_eq!(screen_transforms, Status::Running);
}

#[test]
fn flow_sequence_runs_inside_frame() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let container = HeadlessContainer::shared(Size::new(800.0, 600.0));
    let content = flow::Sequence::new(vec![screen_for(1), screen_for(2)]);
    let frame =
        Frame::new(include_str!("fixtures/stage.html"), Box::new(content)).with_container(container);
    let mut anim = AnimationLoop::new(Box::new(frame));
    anim.start(&env).unwrap();

    let mut ts = 0.0;
    while anim.tick(&env, ts).unwrap() {
        ts += 16.0;
    }
    assert_eq!(anim.frames(), 3);
    assert_eq!(anim.root().status(), Status::Done);
    assert_eq!(env.created_surfaces(), 0);

    // Every screen drew on the placeholder and left it balanced.
    let surface = env.realized_surface(0).unwrap();
    let recording = surface.borrow().recording().unwrap();
    assert_eq!(recording.borrow().depth(), 0);
}

#[test]
fn flow_sequence_in_frame_draws_on_the_placeholder() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let container = HeadlessContainer::new_shared(Size::new(800.0, 600.0));
    let content = flow::Sequence::new(vec![screen_for(1), screen_for(1)]);
    let mut frame = Frame::new(include_str!("fixtures/stage.html"), Box::new(content))
        .with_container(container.clone());
    frame.prepare(&env).unwrap();
    frame.start(&env).unwrap();

    assert_eq!(env.created_surfaces(), 0);
    let placeholder = env.realized_surface(0).unwrap();
    assert!(placeholder.borrow().is_attached());

    // The placeholder's parent keeps its markup.
    let parent = frame.realized().unwrap().surface_parent.clone().unwrap();
    let parent = parent.borrow();
    let parent = parent.as_any().downcast_ref::<HeadlessContainer>().unwrap();
    assert_eq!(parent.cleared, 0);
    assert_eq!(parent.surface_count(), 1);
    assert_eq!(container.borrow().cleared, 1);
}
