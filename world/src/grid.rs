//! Fixed-size tile grid tracking tower occupancy and monster residency.

use glam::Vec2;
use tower_defence_core::{MonsterId, TileCoord, TileRect, TowerId};

/// One cell of the game grid.
#[derive(Clone, Debug)]
pub struct Tile {
    coord: TileCoord,
    center: Vec2,
    occupant: Option<TowerId>,
    residents: Vec<MonsterId>,
}

impl Tile {
    /// Grid index of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Center of the tile in normalized map units.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Tower whose footprint covers the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<TowerId> {
        self.occupant
    }

    /// Reports whether a tower obstructs the tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Monsters currently inside the tile, in the order they entered.
    #[must_use]
    pub fn residents(&self) -> &[MonsterId] {
        &self.residents
    }
}

/// Dense row-major collection of tiles.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    extent: Vec2,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid of `columns` × `rows` empty tiles spanning the unit square.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let extent = if columns == 0 || rows == 0 {
            Vec2::ZERO
        } else {
            Vec2::new(1.0 / columns as f32, 1.0 / rows as f32)
        };

        let mut tiles = Vec::with_capacity(usize::try_from(columns * rows).unwrap_or(0));
        for row in 0..rows {
            for column in 0..columns {
                tiles.push(Tile {
                    coord: TileCoord::new(column, row),
                    center: Vec2::new(
                        (column as f32 + 0.5) * extent.x,
                        (row as f32 + 0.5) * extent.y,
                    ),
                    occupant: None,
                    residents: Vec::new(),
                });
            }
        }

        Self {
            columns,
            rows,
            extent,
            tiles,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width and height of one tile in normalized map units.
    #[must_use]
    pub const fn extent(&self) -> Vec2 {
        self.extent
    }

    /// Reports whether the coordinate addresses a tile of this grid.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }

    /// Reports whether every tile of the rectangle lies inside the grid.
    #[must_use]
    pub const fn contains_rect(&self, rect: TileRect) -> bool {
        let origin = rect.origin();
        let size = rect.size();
        size.width() > 0
            && size.height() > 0
            && origin.column() + size.width() <= self.columns
            && origin.row() + size.height() <= self.rows
    }

    /// Tile addressed by the coordinate.
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<&Tile> {
        self.index(tile).and_then(|index| self.tiles.get(index))
    }

    /// Tile containing the normalized map point, if the point lies on the map.
    ///
    /// The right and bottom edges belong to the last column and row.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> Option<TileCoord> {
        if !tower_defence_core::within_map(point) || self.columns == 0 || self.rows == 0 {
            return None;
        }
        let column = ((point.x * self.columns as f32) as u32).min(self.columns - 1);
        let row = ((point.y * self.rows as f32) as u32).min(self.rows - 1);
        Some(TileCoord::new(column, row))
    }

    /// Center of the tile in normalized map units.
    #[must_use]
    pub fn center(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            (tile.column() as f32 + 0.5) * self.extent.x,
            (tile.row() as f32 + 0.5) * self.extent.y,
        )
    }

    /// Center of a rectangle of tiles in normalized map units.
    #[must_use]
    pub fn rect_center(&self, rect: TileRect) -> Vec2 {
        let origin = rect.origin();
        let size = rect.size();
        Vec2::new(
            (origin.column() as f32 + size.width() as f32 / 2.0) * self.extent.x,
            (origin.row() as f32 + size.height() as f32 / 2.0) * self.extent.y,
        )
    }

    /// Reports whether a tower obstructs the tile. Out-of-bounds tiles count as blocked.
    #[must_use]
    pub fn is_blocked(&self, tile: TileCoord) -> bool {
        self.tile(tile).map_or(true, Tile::is_occupied)
    }

    /// Monsters registered on the tile.
    #[must_use]
    pub fn residents(&self, tile: TileCoord) -> &[MonsterId] {
        self.tile(tile).map_or(&[], Tile::residents)
    }

    pub(crate) fn occupy(&mut self, rect: TileRect, tower: TowerId) {
        for coord in rect.tiles() {
            if let Some(tile) = self.tile_mut(coord) {
                tile.occupant = Some(tower);
            }
        }
    }

    pub(crate) fn add_resident(&mut self, tile: TileCoord, monster: MonsterId) {
        if let Some(tile) = self.tile_mut(tile) {
            tile.residents.push(monster);
        }
    }

    /// Detaches the monster from the tile, reporting whether it was registered there.
    pub(crate) fn remove_resident(&mut self, tile: TileCoord, monster: MonsterId) -> bool {
        let Some(tile) = self.tile_mut(tile) else {
            return false;
        };
        match tile.residents.iter().position(|resident| *resident == monster) {
            Some(position) => {
                let _ = tile.residents.remove(position);
                true
            }
            None => false,
        }
    }

    fn tile_mut(&mut self, tile: TileCoord) -> Option<&mut Tile> {
        self.index(tile).and_then(|index| self.tiles.get_mut(index))
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let row = usize::try_from(tile.row()).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
