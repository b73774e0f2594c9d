use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Page-wide scroll lock. Every open modal or drawer holds a [`ScrollGuard`];
/// the page scrolls again once the last guard is dropped.
#[derive(Clone, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl ScrollLock {
    pub fn acquire(&self) -> ScrollGuard {
        self.holders.fetch_add(1, Ordering::SeqCst);
        ScrollGuard {
            holders: self.holders.clone(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the scroll lock is released as soon as the guard is dropped"]
pub struct ScrollGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Blocking message dialog with a single OK button.
pub struct AlertModal {
    lock: ScrollLock,
    message: String,
    guard: Option<ScrollGuard>,
}

impl AlertModal {
    pub fn new(lock: ScrollLock) -> Self {
        Self {
            lock,
            message: String::new(),
            guard: None,
        }
    }

    /// Show `message`, replacing any message already on screen.
    pub fn open(&mut self, message: impl Into<String>) {
        self.message = message.into();
        if self.guard.is_none() {
            self.guard = Some(self.lock.acquire());
        }
    }

    pub fn close(&mut self) {
        self.message.clear();
        self.guard = None;
    }

    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.is_open().then_some(self.message.as_str())
    }
}
