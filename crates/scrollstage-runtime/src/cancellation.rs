#![forbid(unsafe_code)]

//! Cooperative cancellation for self-rescheduling timer tasks.
//!
//! Everything runs on the host's event loop, so the flag is a shared
//! `Rc<Cell<bool>>` rather than an atomic. A task holds a
//! [`CancellationToken`] and checks it before doing work or rescheduling;
//! the owner keeps the [`CancellationSource`] and revokes it on teardown.
//!
//! Dropping the source does **not** cancel. Cancellation is explicit.

use std::cell::Cell;
use std::rc::Rc;

/// Observes a [`CancellationSource`].
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Control side of a cancellation flag.
#[derive(Debug, Default)]
pub struct CancellationSource {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token observing this source.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: Rc::clone(&self.cancelled),
        }
    }

    /// Revoke every token handed out by this source.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_observe_cancel() {
        let source = CancellationSource::new();
        let a = source.token();
        let b = a.clone();
        assert!(!a.is_cancelled());
        source.cancel();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(source.is_cancelled());
    }

    #[test]
    fn drop_does_not_cancel() {
        let source = CancellationSource::new();
        let token = source.token();
        drop(source);
        assert!(!token.is_cancelled());
    }
}
