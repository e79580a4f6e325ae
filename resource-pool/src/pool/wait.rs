use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};

use futures_channel::oneshot;

/// The outcome delivered to a queued acquire request.
pub type WaitResult<T, E> = Result<T, E>;

pub type WaitResponder<T, E> = oneshot::Sender<WaitResult<T, E>>;

pub type Waiter<T, E> = oneshot::Receiver<WaitResult<T, E>>;

/// Identifies a queued waiter so that it can be withdrawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitId(usize);

/// Pending acquire requests, served strictly in arrival order.
pub struct WaitQueue<T, E> {
    next_id: usize,
    queue: VecDeque<(WaitId, WaitResponder<T, E>)>,
}

impl<T, E> WaitQueue<T, E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            queue: VecDeque::new(),
        }
    }

    /// Add a waiter at the tail of the queue.
    pub fn push(&mut self) -> (WaitId, Waiter<T, E>) {
        let (send, receive) = oneshot::channel();
        let id = WaitId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.queue.push_back((id, send));
        (id, receive)
    }

    /// Remove the oldest waiter which is still listening.
    pub fn pop(&mut self) -> Option<WaitResponder<T, E>> {
        while let Some((_, send)) = self.queue.pop_front() {
            if !send.is_canceled() {
                return Some(send);
            }
        }
        None
    }

    /// Withdraw a waiter. Returns `false` if it has already been dequeued.
    pub fn remove(&mut self, id: WaitId) -> bool {
        if let Some(pos) = self.queue.iter().position(|(wid, _)| *wid == id) {
            self.queue.remove(pos);
            true
        } else {
            false
        }
    }

    /// Hand a resource to the oldest listening waiter. The resource is
    /// returned if no waiter accepted it.
    pub fn resolve(&mut self, res: T) -> Option<T> {
        let mut result = Ok(res);
        while let Some(send) = self.pop() {
            match send.send(result) {
                Ok(()) => return None,
                Err(returned) => result = returned,
            }
        }
        result.ok()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T, E> Debug for WaitQueue<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue")
            .field("len", &self.queue.len())
            .finish()
    }
}
