//! Browser host for Easel.
//!
//! Exposes a small `wasm-bindgen` API: mount a screen (optionally inside
//! frame markup) into a page element and drive it with
//! `requestAnimationFrame` until its content finishes.

pub mod console;
pub mod context;
pub mod dom;
pub mod env;
pub mod raf;

use easel_core::canvas::{Frame, Screen};
use easel_core::component::Component;
use easel_core::error::EaselError;
use easel_core::runner::AnimationLoop;
use env::BrowserEnvironment;
use log::LevelFilter;
use raf::RafDriver;
use wasm_bindgen::prelude::*;

/// Surface core errors to JavaScript as `Error` objects.
fn to_js(err: EaselError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Route `log` output to the browser console.
///
/// `level` is one of `error`, `warn`, `info`, `debug`, `trace`; anything
/// else means `info`.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    let level = level.parse().unwrap_or(LevelFilter::Info);
    console::init(level);
}

/// A running screen bound to a page element.
#[wasm_bindgen]
pub struct ScreenPlayer {
    driver: RafDriver,
}

#[wasm_bindgen]
impl ScreenPlayer {
    /// Mount the screen described by `spec_json` into `#container_id` and
    /// start rendering.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, spec_json: &str) -> Result<ScreenPlayer, JsValue> {
        let env = BrowserEnvironment::new().map_err(to_js)?;
        let container = env.container_by_id(container_id).map_err(to_js)?;
        let screen = Screen::from_json(spec_json)
            .map_err(to_js)?
            .with_container(container);
        Self::play(Box::new(screen), env)
    }

    /// Like `new`, but the screen draws into the `<canvas>` of `markup`,
    /// which replaces the container's content.
    pub fn framed(
        container_id: &str,
        markup: &str,
        spec_json: &str,
    ) -> Result<ScreenPlayer, JsValue> {
        let env = BrowserEnvironment::new().map_err(to_js)?;
        let container = env.container_by_id(container_id).map_err(to_js)?;
        let screen = Screen::from_json(spec_json).map_err(to_js)?;
        let frame = Frame::new(markup, Box::new(screen)).with_container(container);
        Self::play(Box::new(frame), env)
    }

    fn play(root: Box<dyn Component>, env: BrowserEnvironment) -> Result<ScreenPlayer, JsValue> {
        let mut anim = AnimationLoop::new(root);
        anim.start(&env).map_err(to_js)?;
        let driver = RafDriver::new(anim, env);
        driver.start();
        Ok(ScreenPlayer { driver })
    }

    /// Stop rendering and restore the surface's drawing state.
    pub fn stop(&self) {
        self.driver.stop();
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.driver.frames() as f64
    }
}
