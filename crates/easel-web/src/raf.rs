//! `requestAnimationFrame` driver for an [`AnimationLoop`].
//!
//! The closure re-registers itself every frame until the loop reports it
//! is done or [`RafDriver::stop`] is called. The root is ended either way.

use crate::env::BrowserEnvironment;
use easel_core::runner::AnimationLoop;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct Inner {
    closure: RefCell<Option<RafClosure>>,
    anim: RefCell<AnimationLoop>,
    env: BrowserEnvironment,
    running: Cell<bool>,
    raf_id: Cell<i32>,
}

pub struct RafDriver {
    inner: Rc<Inner>,
}

impl RafDriver {
    /// Wrap an already started loop.
    pub fn new(anim: AnimationLoop, env: BrowserEnvironment) -> Self {
        Self {
            inner: Rc::new(Inner {
                closure: RefCell::new(None),
                anim: RefCell::new(anim),
                env,
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |timestamp: f64| {
            if !inner.running.get() {
                return;
            }
            let more = inner.anim.borrow_mut().tick(&inner.env, timestamp);
            match more {
                Ok(true) => {}
                Ok(false) => inner.running.set(false),
                Err(err) => {
                    log::error!("animation stopped: {err}");
                    inner.running.set(false);
                }
            }
            if inner.running.get()
                && let Some(ref closure) = *inner.closure.borrow()
            {
                let id = request_animation_frame(closure.as_ref().unchecked_ref());
                inner.raf_id.set(id);
            }
        }) as Box<dyn FnMut(f64)>);

        let id = request_animation_frame(closure.as_ref().unchecked_ref());
        self.inner.raf_id.set(id);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Cancel the pending frame and end the root component.
    pub fn stop(&self) {
        if self.inner.running.replace(false) {
            cancel_animation_frame(self.inner.raf_id.get());
        }
        if let Err(err) = self.inner.anim.borrow_mut().stop(&self.inner.env) {
            log::error!("ending animation failed: {err}");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn frames(&self) -> u64 {
        self.inner.anim.borrow().frames()
    }
}

impl Drop for RafDriver {
    fn drop(&mut self) {
        self.stop();
        self.inner.closure.borrow_mut().take();
    }
}
