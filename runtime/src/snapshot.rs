//! Player snapshot shared between the loop thread and presentation.

use std::sync::Arc;

use parking_lot::Mutex;
use tower_defence_core::PlayerSnapshot;

/// Lock-protected copy of the latest [`PlayerSnapshot`].
#[derive(Clone, Debug, Default)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<PlayerSnapshot>>,
}

impl SharedSnapshot {
    /// Creates a handle holding the default snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the published snapshot.
    pub fn publish(&self, snapshot: &PlayerSnapshot) {
        self.inner.lock().clone_from(snapshot);
    }

    /// Clones the most recently published snapshot.
    #[must_use]
    pub fn read(&self) -> PlayerSnapshot {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_observe_published_values() {
        let shared = SharedSnapshot::new();
        let reader = shared.clone();

        shared.publish(&PlayerSnapshot {
            tick: 9,
            kills: 2,
            ..PlayerSnapshot::default()
        });

        let snapshot = reader.read();
        assert_eq!(snapshot.tick, 9);
        assert_eq!(snapshot.kills, 2);
    }
}
