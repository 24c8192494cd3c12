//! Visibility capability injected into the scheduler.
//!
//! A hosting view reports whether anyone is watching. The scheduler skips
//! network calls while hidden and refreshes immediately when the view becomes
//! visible again. Dropping the receiver returned by `subscribe` detaches the
//! observer.

use std::sync::Arc;
use tokio::sync::watch;

/// Published visibility. `shown_epoch` counts hidden -> visible transitions,
/// so a hide/show pair that the receiver never observes separately still
/// shows up as a new epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
    pub shown_epoch: u64,
}

impl Visibility {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            shown_epoch: 0,
        }
    }
}

pub trait VisibilitySource: Send + Sync {
    fn is_visible(&self) -> bool;

    /// Receiver that yields the new visibility on every change
    fn subscribe(&self) -> watch::Receiver<Visibility>;
}

/// Visibility for headless hosts that are always watched
#[derive(Debug)]
pub struct AlwaysVisible {
    tx: watch::Sender<Visibility>,
}

impl AlwaysVisible {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Visibility::new(true));
        Self { tx }
    }
}

impl Default for AlwaysVisible {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilitySource for AlwaysVisible {
    fn is_visible(&self) -> bool {
        true
    }

    fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.tx.subscribe()
    }
}

/// Visibility driven by the host (a UI focus hook, a test, an API call)
#[derive(Debug, Clone)]
pub struct VisibilityHandle {
    tx: Arc<watch::Sender<Visibility>>,
}

impl VisibilityHandle {
    pub fn new(visible: bool) -> Self {
        let (tx, _) = watch::channel(Visibility::new(visible));
        Self { tx: Arc::new(tx) }
    }

    /// Update visibility; subscribers are only notified on an actual change
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if current.visible == visible {
                return false;
            }
            current.visible = visible;
            if visible {
                current.shown_epoch += 1;
            }
            true
        });
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    pub fn show(&self) {
        self.set_visible(true);
    }
}

impl VisibilitySource for VisibilityHandle {
    fn is_visible(&self) -> bool {
        self.tx.borrow().visible
    }

    fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.tx.subscribe()
    }
}
