//! Breadth-first shortest path search over the tile grid.

use std::collections::VecDeque;

use tower_defence_core::TileCoord;

/// Reusable 4-connected breadth-first search.
///
/// Visited flags, step distances and predecessors are stored densely in
/// row-major order and retained between searches so repeated path checks
/// during building do not reallocate.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    columns: u32,
    rows: u32,
    visited: Vec<bool>,
    distances: Vec<u32>,
    predecessors: Vec<Option<usize>>,
    frontier: VecDeque<TileCoord>,
    origin: Option<TileCoord>,
}

impl Pathfinder {
    /// Creates an empty pathfinder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches from `start` until `goal` is reached, skipping tiles for which
    /// `is_blocked` returns `true`.
    ///
    /// Returns whether `goal` is reachable. The start tile is never treated as
    /// blocked. After a successful search [`Pathfinder::path_to`] reconstructs
    /// the route.
    pub fn search<F>(
        &mut self,
        columns: u32,
        rows: u32,
        start: TileCoord,
        goal: TileCoord,
        mut is_blocked: F,
    ) -> bool
    where
        F: FnMut(TileCoord) -> bool,
    {
        self.reset(columns, rows);
        let Ok(width) = usize::try_from(columns) else {
            return false;
        };
        let Some(start_index) = index(width, columns, rows, start) else {
            return false;
        };
        if index(width, columns, rows, goal).is_none() {
            return false;
        }

        self.visited[start_index] = true;
        self.distances[start_index] = 0;
        self.origin = Some(start);
        self.frontier.push_back(start);

        while let Some(tile) = self.frontier.pop_front() {
            if tile == goal {
                self.frontier.clear();
                return true;
            }
            let Some(current) = index(width, columns, rows, tile) else {
                continue;
            };
            let next_distance = self.distances[current].saturating_add(1);

            for neighbor in neighbors(tile, columns, rows) {
                let Some(next) = index(width, columns, rows, neighbor) else {
                    continue;
                };
                if self.visited[next] || is_blocked(neighbor) {
                    continue;
                }
                self.visited[next] = true;
                self.distances[next] = next_distance;
                self.predecessors[next] = Some(current);
                self.frontier.push_back(neighbor);
            }
        }

        false
    }

    /// Number of steps from the last search start to `tile`, if it was reached.
    #[must_use]
    pub fn distance(&self, tile: TileCoord) -> Option<u32> {
        let width = usize::try_from(self.columns).ok()?;
        let offset = index(width, self.columns, self.rows, tile)?;
        self.visited[offset].then(|| self.distances[offset])
    }

    /// Route from the last search start to `tile`, excluding the start and
    /// including `tile`.
    #[must_use]
    pub fn path_to(&self, tile: TileCoord) -> Option<Vec<TileCoord>> {
        let origin = self.origin?;
        let width = usize::try_from(self.columns).ok()?;
        let mut current = index(width, self.columns, self.rows, tile)?;
        if !self.visited[current] {
            return None;
        }

        let mut path = Vec::new();
        let mut coord = tile;
        while coord != origin {
            path.push(coord);
            current = self.predecessors[current]?;
            coord = coord_of(width, current)?;
        }
        path.reverse();
        Some(path)
    }

    fn reset(&mut self, columns: u32, rows: u32) {
        let count = usize::try_from(columns)
            .ok()
            .zip(usize::try_from(rows).ok())
            .and_then(|(width, height)| width.checked_mul(height))
            .unwrap_or(0);

        self.columns = columns;
        self.rows = rows;
        self.origin = None;
        self.frontier.clear();
        if self.visited.len() == count {
            self.visited.fill(false);
            self.distances.fill(u32::MAX);
            self.predecessors.fill(None);
        } else {
            self.visited = vec![false; count];
            self.distances = vec![u32::MAX; count];
            self.predecessors = vec![None; count];
        }
    }
}

fn neighbors(tile: TileCoord, columns: u32, rows: u32) -> impl Iterator<Item = TileCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = tile.row().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(tile.column(), row));
        count += 1;
    }
    if tile.column() + 1 < columns {
        candidates[count] = Some(TileCoord::new(tile.column() + 1, tile.row()));
        count += 1;
    }
    if tile.row() + 1 < rows {
        candidates[count] = Some(TileCoord::new(tile.column(), tile.row() + 1));
        count += 1;
    }
    if let Some(column) = tile.column().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(column, tile.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, columns: u32, rows: u32, tile: TileCoord) -> Option<usize> {
    if tile.column() >= columns || tile.row() >= rows {
        return None;
    }
    let column = usize::try_from(tile.column()).ok()?;
    let row = usize::try_from(tile.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord_of(width: usize, offset: usize) -> Option<TileCoord> {
    if width == 0 {
        return None;
    }
    let column = u32::try_from(offset % width).ok()?;
    let row = u32::try_from(offset / width).ok()?;
    Some(TileCoord::new(column, row))
}
