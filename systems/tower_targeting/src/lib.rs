#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target acquisition system that picks the nearest in-range monster for a tower.
//!
//! The search first revalidates the tower's cached target, then honours an
//! optional focus tile, and only then expands outward from the tower's
//! footprint in distance order. Expansion is geometric: tiles are visited by
//! the distance of their centers to the tower, regardless of obstructions.

use std::{cmp::Ordering, collections::BinaryHeap};

use glam::Vec2;
use tower_defence_core::{MonsterId, TileCoord, TileRect};

/// Read-only view of the grid and its monsters used during acquisition.
pub trait Battlefield {
    /// Number of tile columns and rows.
    fn dimensions(&self) -> (u32, u32);

    /// Width and height of a single tile in normalized map units.
    fn tile_extent(&self) -> Vec2;

    /// Center of the tile in normalized map units.
    fn tile_center(&self, tile: TileCoord) -> Vec2;

    /// Monsters currently registered on the tile, in insertion order.
    fn residents(&self, tile: TileCoord) -> &[MonsterId];

    /// Position of the monster when it is still in play.
    ///
    /// Implementations return `None` for removed, dead, or out-of-bounds
    /// monsters so a single predicate decides liveness.
    fn locate(&self, monster: MonsterId) -> Option<Vec2>;
}

/// Parameters describing the tower performing the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetRequest {
    /// Tiles covered by the tower.
    pub footprint: TileRect,
    /// Center of the tower in normalized map units.
    pub center: Vec2,
    /// Targeting radius in normalized map units.
    pub range: f32,
    /// Target selected on a previous tick.
    pub cached: Option<MonsterId>,
    /// Tile the tower was told to focus on.
    pub focus: Option<TileCoord>,
}

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    frontier: BinaryHeap<FrontierTile>,
    visited: Vec<bool>,
    columns: u32,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the target the tower should shoot at this tick.
    ///
    /// A still-valid cached target always wins, even when a nearer monster
    /// has appeared since it was selected.
    pub fn acquire<B>(&mut self, battlefield: &B, request: &TargetRequest) -> Option<MonsterId>
    where
        B: Battlefield,
    {
        if let Some(cached) = request.cached {
            if in_range(battlefield, cached, request.center, request.range).is_some() {
                return Some(cached);
            }
        }

        if let Some(focus) = request.focus {
            if let Some(monster) = nearest_resident(battlefield, focus, request) {
                return Some(monster);
            }
        }

        self.search(battlefield, request)
    }

    fn search<B>(&mut self, battlefield: &B, request: &TargetRequest) -> Option<MonsterId>
    where
        B: Battlefield,
    {
        let (columns, rows) = battlefield.dimensions();
        self.reset(columns, rows);
        if self.visited.is_empty() {
            return None;
        }

        let reach = tile_reach(battlefield.tile_extent());
        for tile in request.footprint.tiles() {
            let _ = self.mark_visited(tile);
        }

        let footprint = request.footprint;
        let first_column = i64::from(footprint.origin().column()) - 1;
        let first_row = i64::from(footprint.origin().row()) - 1;
        let last_column = i64::from(footprint.origin().column()) + i64::from(footprint.size().width());
        let last_row = i64::from(footprint.origin().row()) + i64::from(footprint.size().height());

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                if let Some(tile) = tile_at(column, row, columns, rows) {
                    self.enqueue(battlefield, tile, request, reach);
                }
            }
        }

        while let Some(FrontierTile { tile, .. }) = self.frontier.pop() {
            if let Some(monster) = nearest_resident(battlefield, tile, request) {
                self.frontier.clear();
                return Some(monster);
            }

            let column = i64::from(tile.column());
            let row = i64::from(tile.row());
            for (dx, dy) in NEIGHBOR_OFFSETS {
                if let Some(neighbor) = tile_at(column + dx, row + dy, columns, rows) {
                    self.enqueue(battlefield, neighbor, request, reach);
                }
            }
        }

        None
    }

    fn reset(&mut self, columns: u32, rows: u32) {
        self.frontier.clear();
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.columns = columns;
        if self.visited.len() == count {
            self.visited.fill(false);
        } else {
            self.visited = vec![false; count];
        }
    }

    fn enqueue<B>(&mut self, battlefield: &B, tile: TileCoord, request: &TargetRequest, reach: f32)
    where
        B: Battlefield,
    {
        if !self.mark_visited(tile) {
            return;
        }

        let distance = battlefield.tile_center(tile).distance(request.center);
        if distance > request.range + reach {
            return;
        }

        self.frontier.push(FrontierTile { distance, tile });
    }

    /// Marks the tile visited, reporting whether it was unvisited before.
    fn mark_visited(&mut self, tile: TileCoord) -> bool {
        let offset = u64::from(tile.row()) * u64::from(self.columns) + u64::from(tile.column());
        let index = usize::try_from(offset).ok();
        match index.and_then(|index| self.visited.get_mut(index)) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        }
    }
}

const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Clone, Copy, Debug)]
struct FrontierTile {
    distance: f32,
    tile: TileCoord,
}

impl PartialEq for FrontierTile {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierTile {}

impl PartialOrd for FrontierTile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierTile {
    // Reversed so the max-heap pops the closest tile first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.tile.cmp(&self.tile))
    }
}

fn tile_at(column: i64, row: i64, columns: u32, rows: u32) -> Option<TileCoord> {
    if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
        return None;
    }
    Some(TileCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}

fn tile_reach(extent: Vec2) -> f32 {
    extent.length() / 2.0
}

fn in_range<B>(battlefield: &B, monster: MonsterId, center: Vec2, range: f32) -> Option<f32>
where
    B: Battlefield,
{
    let distance = battlefield.locate(monster)?.distance(center);
    (distance <= range).then_some(distance)
}

fn nearest_resident<B>(battlefield: &B, tile: TileCoord, request: &TargetRequest) -> Option<MonsterId>
where
    B: Battlefield,
{
    let mut best: Option<(f32, MonsterId)> = None;
    for &monster in battlefield.residents(tile) {
        let Some(distance) = in_range(battlefield, monster, request.center, request.range) else {
            continue;
        };
        match best {
            Some((closest, _)) if closest <= distance => {}
            _ => best = Some((distance, monster)),
        }
    }
    best.map(|(_, monster)| monster)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use tower_defence_core::TileRectSize;

    struct Field {
        columns: u32,
        rows: u32,
        residents: BTreeMap<TileCoord, Vec<MonsterId>>,
        positions: BTreeMap<MonsterId, Vec2>,
    }

    impl Field {
        fn new(columns: u32, rows: u32) -> Self {
            Self {
                columns,
                rows,
                residents: BTreeMap::new(),
                positions: BTreeMap::new(),
            }
        }

        fn place(&mut self, id: u32, tile: TileCoord) {
            let monster = MonsterId::new(id);
            let center = self.tile_center(tile);
            self.residents.entry(tile).or_default().push(monster);
            let _ = self.positions.insert(monster, center);
        }
    }

    impl Battlefield for Field {
        fn dimensions(&self) -> (u32, u32) {
            (self.columns, self.rows)
        }

        fn tile_extent(&self) -> Vec2 {
            Vec2::new(1.0 / self.columns as f32, 1.0 / self.rows as f32)
        }

        fn tile_center(&self, tile: TileCoord) -> Vec2 {
            let extent = self.tile_extent();
            Vec2::new(
                (tile.column() as f32 + 0.5) * extent.x,
                (tile.row() as f32 + 0.5) * extent.y,
            )
        }

        fn residents(&self, tile: TileCoord) -> &[MonsterId] {
            self.residents.get(&tile).map_or(&[], Vec::as_slice)
        }

        fn locate(&self, monster: MonsterId) -> Option<Vec2> {
            self.positions.get(&monster).copied()
        }
    }

    fn request(field: &Field, origin: TileCoord, range_tiles: f32) -> TargetRequest {
        let footprint = TileRect::from_origin_and_size(origin, TileRectSize::new(1, 1));
        TargetRequest {
            footprint,
            center: field.tile_center(origin),
            range: range_tiles * field.tile_extent().x,
            cached: None,
            focus: None,
        }
    }

    #[test]
    fn selects_nearest_monster_in_range() {
        let mut field = Field::new(10, 10);
        field.place(1, TileCoord::new(8, 5));
        field.place(2, TileCoord::new(6, 5));
        let mut targeting = TowerTargeting::new();

        let target = targeting.acquire(&field, &request(&field, TileCoord::new(4, 5), 3.0));

        assert_eq!(target, Some(MonsterId::new(2)));
    }

    #[test]
    fn ignores_monsters_beyond_range() {
        let mut field = Field::new(10, 10);
        field.place(1, TileCoord::new(9, 9));
        let mut targeting = TowerTargeting::new();

        let target = targeting.acquire(&field, &request(&field, TileCoord::new(0, 0), 2.0));

        assert_eq!(target, None);
    }

    #[test]
    fn keeps_cached_target_while_it_stays_in_range() {
        let mut field = Field::new(10, 10);
        field.place(1, TileCoord::new(7, 5));
        field.place(2, TileCoord::new(5, 5));
        let mut targeting = TowerTargeting::new();
        let mut query = request(&field, TileCoord::new(4, 5), 4.0);
        query.cached = Some(MonsterId::new(1));

        assert_eq!(targeting.acquire(&field, &query), Some(MonsterId::new(1)));
    }

    #[test]
    fn stale_cached_target_is_replaced() {
        let mut field = Field::new(10, 10);
        field.place(2, TileCoord::new(5, 5));
        let mut targeting = TowerTargeting::new();
        let mut query = request(&field, TileCoord::new(4, 5), 4.0);
        query.cached = Some(MonsterId::new(77));

        assert_eq!(targeting.acquire(&field, &query), Some(MonsterId::new(2)));
    }

    #[test]
    fn footprint_residents_are_not_seeded() {
        let mut field = Field::new(6, 6);
        field.place(1, TileCoord::new(2, 2));
        let mut targeting = TowerTargeting::new();

        let target = targeting.acquire(&field, &request(&field, TileCoord::new(2, 2), 3.0));

        assert_eq!(target, None);
    }

    #[test]
    fn focus_tile_overrides_nearer_monsters() {
        let mut field = Field::new(10, 10);
        field.place(1, TileCoord::new(5, 5));
        field.place(2, TileCoord::new(7, 5));
        let mut targeting = TowerTargeting::new();
        let mut query = request(&field, TileCoord::new(4, 5), 4.0);
        query.focus = Some(TileCoord::new(7, 5));

        assert_eq!(targeting.acquire(&field, &query), Some(MonsterId::new(2)));
    }

    #[test]
    fn shared_tile_prefers_earliest_resident_on_ties() {
        let mut field = Field::new(8, 8);
        field.place(9, TileCoord::new(3, 2));
        field.place(4, TileCoord::new(3, 2));
        let mut targeting = TowerTargeting::new();

        let target = targeting.acquire(&field, &request(&field, TileCoord::new(2, 2), 2.0));

        assert_eq!(target, Some(MonsterId::new(9)));
    }

    #[test]
    fn frontier_orders_by_distance_then_tile() {
        let near = FrontierTile {
            distance: 0.1,
            tile: TileCoord::new(5, 5),
        };
        let far = FrontierTile {
            distance: 0.2,
            tile: TileCoord::new(0, 0),
        };
        let mut heap = BinaryHeap::from(vec![far, near]);
        assert_eq!(heap.pop().map(|entry| entry.tile), Some(TileCoord::new(5, 5)));
    }
}
