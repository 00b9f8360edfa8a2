//! Per-component lifecycle state and event subscription.
//!
//! A `Lifecycle` is a clonable handle: composites keep a clone of a child's
//! lifecycle to subscribe to its events, which is how a frame couples its
//! own end to the end of its content.

use crate::error::{EaselError, EaselResult};
use crate::id::ComponentId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Where a component is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Created,
    Prepared,
    Running,
    Done,
}

/// Events emitted after each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Prepare,
    Run,
    End,
}

type Handler = Box<dyn FnMut(ComponentId, Event)>;

struct Inner {
    id: ComponentId,
    status: Status,
    handlers: Vec<(Event, Handler)>,
}

#[derive(Clone)]
pub struct Lifecycle {
    inner: Rc<RefCell<Inner>>,
}

impl Lifecycle {
    pub fn new(id: ComponentId) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                id,
                status: Status::Created,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.inner.borrow().id
    }

    pub fn status(&self) -> Status {
        self.inner.borrow().status
    }

    /// Register a handler for `event`. Handlers run in registration order.
    pub fn on(&self, event: Event, handler: impl FnMut(ComponentId, Event) + 'static) {
        self.inner
            .borrow_mut()
            .handlers
            .push((event, Box::new(handler)));
    }

    /// created → prepared.
    pub fn mark_prepared(&self) -> EaselResult<()> {
        self.advance(Status::Created, Status::Prepared, Event::Prepare)
    }

    /// prepared → running.
    pub fn mark_running(&self) -> EaselResult<()> {
        self.advance(Status::Prepared, Status::Running, Event::Run)
    }

    /// Move to done and emit `End`.
    ///
    /// Returns `false` if the component had already finished; the end
    /// event is emitted at most once.
    pub fn finish(&self) -> bool {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.status == Status::Done {
                return false;
            }
            inner.status = Status::Done;
            inner.id
        };
        log::debug!("{id} → Done");
        self.emit(Event::End);
        true
    }

    /// Fail with a state error unless the component is `expected`.
    pub fn require(&self, expected: Status, action: &str) -> EaselResult<()> {
        let inner = self.inner.borrow();
        if inner.status == expected {
            Ok(())
        } else {
            Err(EaselError::state(format!(
                "cannot {action} {}: status is {:?}, expected {expected:?}",
                inner.id, inner.status
            )))
        }
    }

    fn advance(&self, from: Status, to: Status, event: Event) -> EaselResult<()> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status != from {
                return Err(EaselError::state(format!(
                    "{} cannot move to {to:?} from {:?}",
                    inner.id, inner.status
                )));
            }
            inner.status = to;
            log::debug!("{} → {to:?}", inner.id);
        }
        self.emit(event);
        Ok(())
    }

    // Handlers are moved out while they run so they may touch this
    // lifecycle (or register new handlers) without a double borrow.
    fn emit(&self, event: Event) {
        let (id, mut handlers) = {
            let mut inner = self.inner.borrow_mut();
            (inner.id, std::mem::take(&mut inner.handlers))
        };
        for (on, handler) in handlers.iter_mut() {
            if *on == event {
                handler(id, event);
            }
        }
        let mut inner = self.inner.borrow_mut();
        handlers.append(&mut inner.handlers);
        inner.handlers = handlers;
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Lifecycle")
            .field("id", &inner.id)
            .field("status", &inner.status)
            .field("handlers", &inner.handlers.len())
            .finish()
    }
}
