//! Event funnel between host listeners and the frame driver
//!
//! Host listeners never touch simulation state. They push into an
//! [`EventInbox`] through a cloneable [`EventSender`], and the driver drains
//! the inbox once at the start of every frame. Each event kind has a single
//! slot, so the latest value wins and intermediate values are dropped.

use std::cell::RefCell;
use std::rc::Rc;

use crate::node::{Pointer, SurfaceSize};

/// Event kinds a host can subscribe the engine to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    PointerMove,
}

/// An event reported by the host surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEvent {
    /// The drawable was resized to a new surface size
    Resize(SurfaceSize),
    /// The pointer moved, surface-space coordinates
    PointerMove(Pointer),
}

/// Events pending since the last drain
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pending {
    pub resize: Option<SurfaceSize>,
    pub pointer: Option<Pointer>,
}

/// Consumer side, owned by the driver
#[derive(Debug, Default)]
pub struct EventInbox {
    slots: Rc<RefCell<Pending>>,
}

impl EventInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// A producer handle feeding this inbox
    pub fn sender(&self) -> EventSender {
        EventSender {
            slots: Rc::clone(&self.slots),
        }
    }

    /// Take everything pending, leaving the inbox empty
    pub fn drain(&self) -> Pending {
        std::mem::take(&mut *self.slots.borrow_mut())
    }
}

/// Producer side, handed to host listeners
#[derive(Debug, Clone)]
pub struct EventSender {
    slots: Rc<RefCell<Pending>>,
}

impl EventSender {
    /// Record an event, replacing any pending event of the same kind
    pub fn send(&self, event: FieldEvent) {
        let mut slots = self.slots.borrow_mut();
        match event {
            FieldEvent::Resize(size) => slots.resize = Some(size),
            FieldEvent::PointerMove(pointer) => slots.pointer = Some(pointer),
        }
    }
}
