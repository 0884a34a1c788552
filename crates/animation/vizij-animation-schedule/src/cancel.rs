//! Single-threaded cancellation token.
//!
//! Listeners run synchronously, on the thread that calls
//! [`CancellationToken::cancel`], in registration order. Cancelling is
//! idempotent: listeners run at most once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener = Box<dyn FnOnce() + 'static>;

#[derive(Default)]
struct TokenState {
    cancelled: Cell<bool>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
}

/// Cloneable handle used to cancel running schedules
#[derive(Clone, Default)]
pub struct CancellationToken {
    state: Rc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Cancel and run every registered listener. Later calls do nothing.
    pub fn cancel(&self) {
        if self.state.cancelled.replace(true) {
            return;
        }
        let listeners = std::mem::take(&mut *self.state.listeners.borrow_mut());
        for (_, listener) in listeners {
            listener();
        }
    }

    /// Run `listener` on cancellation, or right away if already cancelled.
    ///
    /// Dropping the returned registration removes the listener.
    pub fn register(&self, listener: impl FnOnce() + 'static) -> CancellationRegistration {
        if self.is_cancelled() {
            listener();
            return CancellationRegistration {
                state: Weak::new(),
                id: 0,
            };
        }
        let id = self.state.next_id.get();
        self.state.next_id.set(id.wrapping_add(1));
        self.state
            .listeners
            .borrow_mut()
            .push((id, Box::new(listener)));
        CancellationRegistration {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    /// Number of listeners waiting for cancellation
    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps a listener registered until dropped
#[must_use = "dropping the registration removes the listener"]
pub struct CancellationRegistration {
    state: Weak<TokenState>,
    id: u64,
}

impl Drop for CancellationRegistration {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            // Pull the listener out first so its captures drop after the borrow ends.
            let removed = {
                let mut listeners = state.listeners.borrow_mut();
                listeners
                    .iter()
                    .position(|(id, _)| *id == self.id)
                    .map(|index| listeners.remove(index))
            };
            drop(removed);
        }
    }
}

impl fmt::Debug for CancellationRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationRegistration")
            .field("id", &self.id)
            .finish()
    }
}
