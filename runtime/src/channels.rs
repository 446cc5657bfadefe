//! Queues connecting the game loop to presentation adapters.

use std::{num::NonZeroUsize, sync::Arc};

use tower_defence_core::{Event, EventCategory, Intent};
use tower_defence_queue::BoundedEventQueue;

/// Arrival-ordered intent queue plus one outbound queue per [`EventCategory`].
///
/// Cloning yields another handle to the same queues.
#[derive(Clone, Debug)]
pub struct Channels {
    intents: Arc<BoundedEventQueue<Intent>>,
    towers: Arc<BoundedEventQueue<Event>>,
    attacks: Arc<BoundedEventQueue<Event>>,
    monsters: Arc<BoundedEventQueue<Event>>,
    unit_info: Arc<BoundedEventQueue<Event>>,
    rounds: Arc<BoundedEventQueue<Event>>,
    diagnostics: Arc<BoundedEventQueue<Event>>,
}

impl Channels {
    /// Creates every queue with the same capacity.
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            intents: queue(capacity),
            towers: queue(capacity),
            attacks: queue(capacity),
            monsters: queue(capacity),
            unit_info: queue(capacity),
            rounds: queue(capacity),
            diagnostics: queue(capacity),
        }
    }

    /// Sends an intent to the simulation. Every intent kind shares one queue
    /// and is applied in submission order.
    pub fn submit(&self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Intents awaiting the round machine, oldest first.
    #[must_use]
    pub fn intents(&self) -> &BoundedEventQueue<Intent> {
        &self.intents
    }

    /// Outbound queue carrying events of `category`.
    #[must_use]
    pub fn outbound(&self, category: EventCategory) -> &BoundedEventQueue<Event> {
        match category {
            EventCategory::Towers => &self.towers,
            EventCategory::Attacks => &self.attacks,
            EventCategory::Monsters => &self.monsters,
            EventCategory::UnitInfo => &self.unit_info,
            EventCategory::Rounds => &self.rounds,
            EventCategory::Diagnostics => &self.diagnostics,
        }
    }

    /// Pushes an event onto the queue of its category.
    pub fn route(&self, event: Event) {
        self.outbound(event.category()).push(event);
    }
}

fn queue<T>(capacity: NonZeroUsize) -> Arc<BoundedEventQueue<T>> {
    Arc::new(BoundedEventQueue::with_capacity(capacity))
}
