//! Signals that an [`crate::Rsvg`] sends to its listeners.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use crate::error::Error;

/// Something that happened to an [`crate::Rsvg`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The document is loaded and can be queried.
    Load,

    /// A chunk could not be written, or the document could not be sealed.
    Error(Error),

    /// A deprecated API was used.  Sent once per message and process.
    Deprecation(&'static str),
}

type Listener = Box<dyn FnMut(&Event)>;

/// Listeners, and the events that are waiting for the next [`Emitter::run_deferred`].
///
/// Emitting only needs a shared reference, so that getters can send deprecation
/// warnings.
#[derive(Default)]
pub(crate) struct Emitter {
    listeners: RefCell<Vec<Listener>>,
    deferred: RefCell<VecDeque<Event>>,
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter::default()
    }

    pub fn add_listener<F>(&self, f: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(f));
    }

    /// Sends `event` to every listener now.
    pub fn emit(&self, event: Event) {
        let mut listeners = self.listeners.borrow_mut();

        for listener in listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Queues `event` until the next [`Emitter::run_deferred`].
    pub fn defer(&self, event: Event) {
        self.deferred.borrow_mut().push_back(event);
    }

    /// Sends the queued events in order.  Returns how many were sent.
    pub fn run_deferred(&self) -> usize {
        let mut sent = 0;

        // Popping one at a time lets listeners queue new events.
        loop {
            let event = self.deferred.borrow_mut().pop_front();

            match event {
                Some(event) => {
                    self.emit(event);
                    sent += 1;
                }
                None => break,
            }
        }

        sent
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.borrow().is_empty()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.borrow().len())
            .field("deferred", &self.deferred.borrow())
            .finish()
    }
}
