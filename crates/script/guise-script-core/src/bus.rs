//! The external message bus: where messages for addresses the runtime does
//! not host are handed off.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::message::Message;

/// Deliver-by-address service outside the runtime. Implementations must keep
/// per-sender order for each receiver.
pub trait MessageBus {
    fn post(&mut self, message: Message);
}

/// In-process FIFO bus. Clones share one queue, so a host can keep a handle
/// and drain what the runtime forwarded.
#[derive(Clone, Debug, Default)]
pub struct QueueBus {
    queue: Rc<RefCell<VecDeque<Message>>>,
}

impl QueueBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&self) -> Vec<Message> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl MessageBus for QueueBus {
    fn post(&mut self, message: Message) {
        self.queue.borrow_mut().push_back(message);
    }
}
