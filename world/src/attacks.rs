//! In-flight attacks and their movement policies.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{within_map, AttackId, MonsterId, Properties, TowerId};

/// How an attack chooses where to fly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Guidance {
    /// Flies to a point recorded at firing time.
    Fixed { destination: Vec2 },
    /// Re-reads the target position every tick.
    Homing {
        target: MonsterId,
        last_known: Vec2,
    },
}

/// Result of advancing an attack for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    InFlight,
    Arrived,
    OutOfBounds,
}

#[derive(Clone, Debug)]
pub(crate) struct Attack {
    pub(crate) id: AttackId,
    pub(crate) tower: TowerId,
    pub(crate) guidance: Guidance,
    /// Snapshot of the tower's effective properties when the attack was fired.
    pub(crate) properties: Properties,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) hit: bool,
}

impl Attack {
    /// Homing target, if the attack still follows one.
    pub(crate) fn homing_target(&self) -> Option<MonsterId> {
        match self.guidance {
            Guidance::Homing { target, .. } => Some(target),
            Guidance::Fixed { .. } => None,
        }
    }

    /// Moves the attack toward its destination.
    ///
    /// `locate` resolves live monsters; a homing attack whose target no
    /// longer resolves degrades to a fixed attack aimed at the last known
    /// point.
    pub(crate) fn advance<F>(&mut self, dt: Duration, locate: F) -> (Flight, Vec2)
    where
        F: Fn(MonsterId) -> Option<Vec2>,
    {
        let destination = match self.guidance {
            Guidance::Fixed { destination } => destination,
            Guidance::Homing { target, last_known } => match locate(target) {
                Some(position) => {
                    self.guidance = Guidance::Homing {
                        target,
                        last_known: position,
                    };
                    position
                }
                None => {
                    tracing::debug!(
                        attack = self.id.get(),
                        monster = target.get(),
                        "homing target gone, continuing to last known position"
                    );
                    self.guidance = Guidance::Fixed {
                        destination: last_known,
                    };
                    last_known
                }
            },
        };

        let start = self.position;
        let offset = destination - self.position;
        let distance = offset.length();
        let step = self.speed * dt.as_secs_f32();

        if distance <= step {
            self.position = destination;
            return (Flight::Arrived, self.position - start);
        }

        self.position += offset / distance * step;
        let flight = if within_map(self.position) {
            Flight::InFlight
        } else {
            Flight::OutOfBounds
        };
        (flight, self.position - start)
    }
}
