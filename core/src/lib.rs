#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defence engine.
//!
//! This crate defines the message surface that connects presentation
//! adapters, the game loop, and the authoritative simulation. Presentation
//! submits [`Intent`] values describing desired mutations, the simulation
//! applies them during the building phase, and every state change is
//! broadcast as an [`Event`] routed to a per-[`EventCategory`] queue.
//! Positions crossing the boundary are normalized map coordinates where
//! `(0, 0)` is the top-left corner and `(1, 1)` the bottom-right.

use std::time::Duration;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod stats;

pub use stats::{
    Armor, ArmorKind, DamageRange, DamageTable, DamageType, Effect, Enhancement, Properties,
    StatModifier, DAMAGE_TYPE_COUNT,
};

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an in-flight attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackId(u32);

impl AttackId {
    /// Creates a new attack identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Axis-aligned rectangle expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    origin: TileCoord,
    size: TileRectSize,
}

impl TileRect {
    /// Constructs a rectangle from an origin tile and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: TileCoord, size: TileRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left tile that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole tiles.
    #[must_use]
    pub const fn size(&self) -> TileRectSize {
        self.size
    }

    /// Reports whether the tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column >= self.origin.column
            && tile.row >= self.origin.row
            && tile.column < self.origin.column + self.size.width
            && tile.row < self.origin.row + self.size.height
    }

    /// Iterates every tile covered by the rectangle in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height).flat_map(move |dy| {
            (0..size.width).map(move |dx| TileCoord::new(origin.column + dx, origin.row + dy))
        })
    }
}

/// Size of a [`TileRect`] measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRectSize {
    width: u32,
    height: u32,
}

impl TileRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Reports whether a normalized map point lies within the playable area.
#[must_use]
pub fn within_map(point: Vec2) -> bool {
    (0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y)
}

/// Lifts a normalized map point into the float triple carried by events.
#[must_use]
pub fn to_event_space(point: Vec2) -> Vec3 {
    point.extend(0.0)
}

/// Lifecycle phase of a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Simulation has not started yet.
    #[default]
    Paused,
    /// Building phase: intents are accepted and no monsters walk.
    Idle,
    /// A wave is in progress.
    Active,
}

/// Modifier payload carried by [`Intent::Modify`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModifierPayload {
    /// A single modifier to fold into the tower's accumulator.
    Single(StatModifier),
    /// A pre-combined accumulator merged as a whole.
    Accumulated(Enhancement),
}

/// Presentation-originated requests to mutate simulation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Constructs a tower whose footprint is anchored at the tile under `at`.
    Build {
        /// Catalog name of the tower blueprint.
        blueprint: String,
        /// Tier of the blueprint to construct.
        tier: u8,
        /// Normalized map point selecting the anchor tile.
        at: Vec2,
    },
    /// Applies a stat modifier to the tower covering the tile under `at`.
    Modify {
        /// Modifier to apply.
        modifier: ModifierPayload,
        /// Normalized map point selecting the tower.
        at: Vec2,
    },
    /// Focuses the tower under `at` on the tile under `target`.
    Target {
        /// Normalized map point selecting the tower.
        at: Vec2,
        /// Normalized map point selecting the focus tile.
        target: Vec2,
    },
    /// Requests a unit information response for the tile under `at`.
    PrintInfo {
        /// Normalized map point selecting the unit.
        at: Vec2,
    },
}

impl Intent {
    /// Discriminant used when reporting rejections.
    #[must_use]
    pub const fn kind(&self) -> IntentKind {
        match self {
            Self::Build { .. } => IntentKind::Build,
            Self::Modify { .. } => IntentKind::Modify,
            Self::Target { .. } => IntentKind::Target,
            Self::PrintInfo { .. } => IntentKind::PrintInfo,
        }
    }
}

/// Field-less mirror of [`Intent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    /// [`Intent::Build`].
    Build,
    /// [`Intent::Modify`].
    Modify,
    /// [`Intent::Target`].
    Target,
    /// [`Intent::PrintInfo`].
    PrintInfo,
}

/// Reasons an intent may be rejected by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum IntentRejection {
    /// The blueprint or tier is not present in the tower catalog.
    #[error("unknown tower blueprint or tier")]
    UnknownBlueprint,
    /// The addressed point or footprint extends beyond the grid.
    #[error("location lies outside the map")]
    OutOfBounds,
    /// The requested footprint overlaps an occupied tile.
    #[error("footprint overlaps an occupied tile")]
    Occupied,
    /// The requested footprint covers the spawn or destination tile.
    #[error("footprint covers the spawn or destination tile")]
    ReservedTile,
    /// Building would disconnect the spawn from the destination.
    #[error("footprint would block the monster path")]
    BlocksPath,
    /// No tower covers the addressed tile.
    #[error("no tower at the addressed tile")]
    NoTower,
    /// The focus tile lies outside the tower's range.
    #[error("focus tile is out of range")]
    OutOfRange,
    /// Nothing to report at the addressed tile.
    #[error("no unit at the addressed tile")]
    EmptyTile,
    /// The modifier carries a NaN or infinite value, or would push a tower
    /// stat out of the finite range.
    #[error("modifier value is not a finite number")]
    InvalidModifier,
}

/// Why a monster left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Health dropped to zero.
    Killed {
        /// Tower whose attack landed the killing blow, if any.
        by: Option<TowerId>,
    },
    /// The monster reached the destination tile.
    Leaked,
}

/// Unit information response payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnitInfo {
    /// Description of a tower.
    Tower(TowerInfo),
    /// Description of a monster.
    Monster(MonsterInfo),
}

/// Snapshot describing a single tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerInfo {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Blueprint the tower was built from.
    pub blueprint: String,
    /// Tier of the blueprint.
    pub tier: u8,
    /// Monsters killed by the tower.
    pub kills: u32,
    /// Effective properties after enhancement.
    pub properties: Properties,
    /// Currently cached target.
    pub target: Option<MonsterId>,
}

/// Snapshot describing a single monster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterInfo {
    /// Identifier of the monster.
    pub monster: MonsterId,
    /// Unique display name.
    pub name: String,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Current movement speed in normalized units per second.
    pub speed: f32,
    /// Armor worn by the monster.
    pub armor: Armor,
}

/// Outbound channel an [`Event`] is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Tower creation and modification.
    Towers,
    /// Attack creation, movement and removal.
    Attacks,
    /// Monster creation, movement and removal.
    Monsters,
    /// Unit information responses.
    UnitInfo,
    /// Round state transitions.
    Rounds,
    /// Rejected intents.
    Diagnostics,
}

/// Events broadcast by the simulation after each step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a tower was constructed.
    TowerCreated {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Blueprint the tower was built from.
        blueprint: String,
        /// Tier of the blueprint.
        tier: u8,
        /// Center of the footprint.
        position: Vec3,
        /// Tiles covered by the tower.
        footprint: TileRect,
    },
    /// Reports that a tower's effective properties changed.
    TowerModified {
        /// Identifier of the modified tower.
        tower: TowerId,
        /// Effective properties after the modification.
        properties: Properties,
    },
    /// Confirms that a tower fired an attack.
    AttackCreated {
        /// Identifier assigned to the attack.
        attack: AttackId,
        /// Tower that fired the attack.
        tower: TowerId,
        /// Launch position.
        position: Vec3,
    },
    /// Reports that an attack moved during the tick.
    AttackMoved {
        /// Identifier of the attack.
        attack: AttackId,
        /// Displacement applied during the tick.
        delta: Vec3,
        /// Duration the displacement should be interpolated over.
        duration: Duration,
    },
    /// Reports that an attack left the simulation.
    AttackRemoved {
        /// Identifier of the attack.
        attack: AttackId,
        /// Whether the attack struck a monster.
        hit: bool,
    },
    /// Confirms that a monster entered the map.
    MonsterCreated {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Unique display name.
        name: String,
        /// Spawn position.
        position: Vec3,
    },
    /// Reports that a monster moved during the tick.
    MonsterMoved {
        /// Identifier of the monster.
        monster: MonsterId,
        /// Displacement applied during the tick.
        delta: Vec3,
        /// Duration the displacement should be interpolated over.
        duration: Duration,
    },
    /// Reports that a monster left the simulation.
    MonsterRemoved {
        /// Identifier of the monster.
        monster: MonsterId,
        /// Reason for the removal.
        cause: RemovalCause,
    },
    /// Responds to [`Intent::PrintInfo`].
    UnitInformation(UnitInfo),
    /// Announces a round state transition.
    RoundStateChanged {
        /// State that was left.
        from: RoundState,
        /// State that was entered.
        to: RoundState,
        /// Round number after the transition.
        round: u32,
    },
    /// Reports that an intent was rejected without changing state.
    IntentRejected {
        /// Kind of the rejected intent.
        intent: IntentKind,
        /// Specific reason for the rejection.
        reason: IntentRejection,
    },
}

impl Event {
    /// Outbound channel the event belongs to.
    #[must_use]
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::TowerCreated { .. } | Self::TowerModified { .. } => EventCategory::Towers,
            Self::AttackCreated { .. } | Self::AttackMoved { .. } | Self::AttackRemoved { .. } => {
                EventCategory::Attacks
            }
            Self::MonsterCreated { .. }
            | Self::MonsterMoved { .. }
            | Self::MonsterRemoved { .. } => EventCategory::Monsters,
            Self::UnitInformation(_) => EventCategory::UnitInfo,
            Self::RoundStateChanged { .. } => EventCategory::Rounds,
            Self::IntentRejected { .. } => EventCategory::Diagnostics,
        }
    }
}

/// Player-facing summary published once per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Number of ticks simulated so far.
    pub tick: u64,
    /// Current round number; zero before the first wave.
    pub round: u32,
    /// Current round state.
    pub state: RoundState,
    /// Monsters currently alive.
    pub live_monsters: u32,
    /// Towers standing on the grid.
    pub towers: u32,
    /// Monsters killed across all rounds.
    pub kills: u32,
    /// Monsters that reached the destination across all rounds.
    pub leaked: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn tile_rect_iterates_row_major() {
        let rect = TileRect::from_origin_and_size(TileCoord::new(2, 3), TileRectSize::new(2, 2));
        let tiles: Vec<_> = rect.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(2, 3),
                TileCoord::new(3, 3),
                TileCoord::new(2, 4),
                TileCoord::new(3, 4),
            ]
        );
        assert!(rect.contains(TileCoord::new(3, 4)));
        assert!(!rect.contains(TileCoord::new(4, 4)));
    }

    #[test]
    fn map_bounds_are_inclusive() {
        assert!(within_map(Vec2::new(0.0, 1.0)));
        assert!(!within_map(Vec2::new(-0.01, 0.5)));
        assert!(!within_map(Vec2::new(0.5, 1.01)));
    }

    #[test]
    fn events_route_to_their_category() {
        let moved = Event::MonsterMoved {
            monster: MonsterId::new(1),
            delta: Vec3::ZERO,
            duration: Duration::from_millis(33),
        };
        let rejected = Event::IntentRejected {
            intent: IntentKind::Build,
            reason: IntentRejection::Occupied,
        };
        assert_eq!(moved.category(), EventCategory::Monsters);
        assert_eq!(rejected.category(), EventCategory::Diagnostics);
    }

    #[test]
    fn attack_event_round_trips_through_bincode() {
        assert_round_trip(&Event::AttackMoved {
            attack: AttackId::new(9),
            delta: Vec3::new(0.01, -0.02, 0.0),
            duration: Duration::from_millis(33),
        });
    }

    #[test]
    fn modify_intent_round_trips_through_bincode() {
        assert_round_trip(&Intent::Modify {
            modifier: ModifierPayload::Single(StatModifier::TypedDamage {
                kind: DamageType::Fire,
                amount: 3.0,
            }),
            at: Vec2::new(0.25, 0.75),
        });
    }

    #[test]
    fn rejection_messages_are_human_readable() {
        assert_eq!(
            IntentRejection::BlocksPath.to_string(),
            "footprint would block the monster path"
        );
    }
}
