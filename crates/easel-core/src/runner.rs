//! Drives a root component from an external frame clock.

use crate::component::{Component, FrameOutcome, describe};
use crate::error::EaselResult;
use crate::host::Environment;
use crate::lifecycle::Status;

/// Owns a root component and forwards animation frames to it.
///
/// The host calls [`tick`](Self::tick) once per display refresh until it
/// returns `false`. However the run stops (the content finishing, an
/// error, or [`stop`](Self::stop)), the root is ended exactly once.
pub struct AnimationLoop {
    root: Box<dyn Component>,
    frames: u64,
}

impl AnimationLoop {
    pub fn new(root: Box<dyn Component>) -> Self {
        Self { root, frames: 0 }
    }

    pub fn root(&self) -> &dyn Component {
        self.root.as_ref()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.root.status() == Status::Running
    }

    /// Prepare and start the root.
    ///
    /// # Errors
    /// Preparation failures are returned as is; the root is never started.
    pub fn start(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.root.prepare(env)?;
        self.root.start(env)?;
        log::debug!("{} started", describe(self.root.as_ref()));
        Ok(())
    }

    /// Render one frame. Returns whether another frame is wanted.
    ///
    /// # Errors
    /// A render error ends the root before being returned.
    pub fn tick(&mut self, env: &dyn Environment, timestamp: f64) -> EaselResult<bool> {
        if !self.is_running() {
            return Ok(false);
        }
        self.frames += 1;
        match self.root.render(env, timestamp) {
            Ok(FrameOutcome::Continue) if self.is_running() => Ok(true),
            Ok(_) => {
                self.stop(env)?;
                Ok(false)
            }
            Err(err) => {
                log::error!("{} failed: {err}", describe(self.root.as_ref()));
                if let Err(stop_err) = self.stop(env) {
                    log::error!("ending after the failure also failed: {stop_err}");
                }
                Err(err)
            }
        }
    }

    /// End the root early. Safe to call after it finished.
    pub fn stop(&mut self, env: &dyn Environment) -> EaselResult<()> {
        self.root.end(env)?;
        log::debug!(
            "{} ended after {} frame(s)",
            describe(self.root.as_ref()),
            self.frames
        );
        Ok(())
    }
}
