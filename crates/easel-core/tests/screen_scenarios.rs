//! Integration tests: a screen loaded from JSON, driven frame by frame on
//! the headless host.

use easel_core::canvas::{Screen, VIEWPORT_EDGE_STYLE};
use easel_core::component::{Component, FrameOutcome};
use easel_core::config::ScreenSpec;
use easel_core::lifecycle::Status;
use easel_core::headless::{DrawCommand, HeadlessContainer, HeadlessEnvironment, HeadlessSurface};
use easel_core::kurbo::{Point, Size};
use easel_core::runner::AnimationLoop;
use easel_core::transform::ViewportScale;
use easel_core::SurfaceElement;
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_near(actual: Point, expected: Point) {
    assert!(
        (actual - expected).hypot() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn json_screen_draws_its_content() {
    init_logging();
    let env = HeadlessEnvironment::new(1.0);
    let container = HeadlessContainer::shared(Size::new(800.0, 600.0));
    let screen = Screen::from_json(include_str!("fixtures/title_screen.json"))
        .unwrap()
        .with_container(container);
    assert_eq!(screen.spec().viewport, [400.0, 300.0]);
    assert_eq!(screen.spec().content.len(), 4);

    let mut anim = AnimationLoop::new(Box::new(screen));
    anim.start(&env).unwrap();
    assert!(anim.tick(&env, 0.0).unwrap());

    let surface = env.created_surface(0).unwrap();
    let recording = surface.borrow().recording().unwrap();
    let commands = recording.borrow().commands().to_vec();

    assert!(commands.contains(&DrawCommand::StrokeStyle(VIEWPORT_EDGE_STYLE.to_string())));
    assert!(commands.contains(&DrawCommand::FillStyle("#3b82f6".to_string())));
    assert!(
        commands
            .iter()
            .any(|c| matches!(c, DrawCommand::FillText(text, _) if text == "Ready?"))
    );
    assert_eq!(
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill))
            .count(),
        1,
        "only the rect fills a path; the circle is stroked and the area of interest is invisible"
    );

    anim.stop(&env).unwrap();
    assert_eq!(recording.borrow().depth(), 0);
}

#[test]
fn doubled_viewport_scenario() {
    let env = HeadlessEnvironment::new(1.0);
    let surface = HeadlessSurface::new_shared();
    surface.borrow_mut().set_storage_size(Size::new(800.0, 600.0));
    let mut screen = Screen::new(ScreenSpec {
        viewport: [400.0, 300.0],
        ..Default::default()
    })
    .with_surface(surface);
    screen.prepare(&env).unwrap();
    screen.start(&env).unwrap();

    assert_eq!(screen.transforms().unwrap().scale(), 2.0);
    assert_near(
        screen.to_surface_coordinates(Point::ORIGIN).unwrap(),
        Point::new(400.0, 300.0),
    );
    assert_near(
        screen.to_surface_coordinates(Point::new(200.0, 150.0)).unwrap(),
        Point::new(800.0, 600.0),
    );
}

#[test]
fn fixed_unit_scale_without_centering() {
    let env = HeadlessEnvironment::new(1.0);
    let surface = HeadlessSurface::new_shared();
    surface.borrow_mut().set_storage_size(Size::new(800.0, 600.0));
    let mut screen = Screen::new(ScreenSpec {
        viewport: [800.0, 600.0],
        viewport_scale: ViewportScale::Fixed(1.0),
        center_origin: false,
        ..Default::default()
    })
    .with_surface(surface);
    screen.prepare(&env).unwrap();
    screen.start(&env).unwrap();

    assert_near(
        screen.to_surface_coordinates(Point::ORIGIN).unwrap(),
        Point::ORIGIN,
    );
}

#[test]
fn pointer_maps_back_into_viewport_units() {
    let env = HeadlessEnvironment::new(2.0);
    let surface = HeadlessSurface::new_shared();
    {
        let mut s = surface.borrow_mut();
        s.set_storage_size(Size::new(800.0, 600.0));
        s.set_layout_size(Size::new(400.0, 300.0));
        s.set_layout_origin(Point::new(10.0, 20.0));
    }
    let mut screen = Screen::new(ScreenSpec {
        viewport: [400.0, 300.0],
        ..Default::default()
    })
    .with_surface(surface);
    screen.prepare(&env).unwrap();
    screen.start(&env).unwrap();

    // The center of the element's layout box is the viewport origin.
    assert_near(
        screen.to_viewport_coordinates(Point::new(210.0, 170.0)).unwrap(),
        Point::ORIGIN,
    );
    assert_near(
        screen.to_viewport_coordinates(Point::new(10.0, 20.0)).unwrap(),
        Point::new(-200.0, -150.0),
    );
}

#[test]
fn render_outcome_reaches_the_loop() {
    let env = HeadlessEnvironment::new(1.0);
    let screen = Screen::new(ScreenSpec::default())
        .with_surface(HeadlessSurface::shared())
        .with_render_fn(|_, _, _, screen| {
            // The callback can query its own screen mid-frame.
            let corner = screen.to_surface_coordinates(Point::ORIGIN).unwrap_or(Point::ZERO);
            if corner.x > 0.0 {
                FrameOutcome::Finished
            } else {
                FrameOutcome::Continue
            }
        });
    let mut anim = AnimationLoop::new(Box::new(screen));
    anim.start(&env).unwrap();
    assert!(!anim.tick(&env, 0.0).unwrap());
    assert_eq!(anim.frames(), 1);
    assert_eq!(anim.root().status(), Status::Done);
}
