//! Static maze layout and the pixel/tile conversions calibrated against it.

use dont_blink_core::{TileIndex, TileKind, UnknownTileId};
use glam::Vec2;
use thiserror::Error;

/// Vertical correction applied when mapping a position to a row.
///
/// Sprites are anchored at their centre while their feet rest near the bottom
/// of the tile; the offset shifts the sampled point accordingly.
pub const ROW_ANCHOR_CORRECTION: f32 = 70.0;

/// Errors raised while building or indexing a maze.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MazeError {
    /// The layout contained no rows or no columns.
    #[error("maze layout is empty")]
    Empty,
    /// A row's length differed from the first row.
    #[error("maze row {row} has {found} columns, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },
    /// The layout contained an id outside the tile kind range.
    #[error("maze cell ({row}, {column}) holds an invalid tile: {source}")]
    UnknownTile {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
        /// Underlying conversion failure.
        source: UnknownTileId,
    },
    /// Tile dimensions were zero, negative or not finite.
    #[error("tile size {width}x{height} must be positive")]
    InvalidTileSize {
        /// Requested tile width.
        width: f32,
        /// Requested tile height.
        height: f32,
    },
    /// A level anchor such as the spawn or the goal lies outside the maze.
    #[error("{anchor} tile ({}, {}) lies outside the maze", .index.row(), .index.column())]
    AnchorOutOfBounds {
        /// Name of the anchor.
        anchor: &'static str,
        /// Offending tile index.
        index: TileIndex,
    },
    /// The goal anchor sits on a tile without the goal trigger.
    #[error("goal tile ({}, {}) is not a finish tile", .0.row(), .0.column())]
    GoalWithoutTrigger(TileIndex),
    /// The layout has more rows or columns than a tile index can address.
    #[error("maze of {rows}x{columns} tiles is too large")]
    TooLarge {
        /// Number of rows in the layout.
        rows: usize,
        /// Number of columns in the layout.
        columns: usize,
    },
    /// A tile index addressed a cell outside the maze.
    #[error("tile ({}, {}) lies outside the maze", .0.row(), .0.column())]
    OutOfRange(TileIndex),
}

/// Immutable grid of tile kinds with the geometry used by the game loop.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeGrid {
    rows: u32,
    columns: u32,
    tile_width: f32,
    tile_height: f32,
    cells: Vec<TileKind>,
}

impl MazeGrid {
    /// Builds a maze from a literal matrix of tile ids.
    pub fn from_ids<R>(rows: &[R], tile_width: f32, tile_height: f32) -> Result<Self, MazeError>
    where
        R: AsRef<[u8]>,
    {
        let mut kinds = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let converted = row
                .as_ref()
                .iter()
                .enumerate()
                .map(|(column, id)| {
                    TileKind::try_from(*id).map_err(|source| MazeError::UnknownTile {
                        row: row_index,
                        column,
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            kinds.push(converted);
        }
        Self::from_kinds(kinds.as_slice(), tile_width, tile_height)
    }

    /// Builds a maze from a matrix of tile kinds.
    pub fn from_kinds<R>(rows: &[R], tile_width: f32, tile_height: f32) -> Result<Self, MazeError>
    where
        R: AsRef<[TileKind]>,
    {
        if !(tile_width.is_finite() && tile_height.is_finite())
            || tile_width <= 0.0
            || tile_height <= 0.0
        {
            return Err(MazeError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }

        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        if expected == 0 {
            return Err(MazeError::Empty);
        }

        let (row_count, column_count) = dimensions(rows.len(), expected)?;

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(MazeError::Ragged {
                    row: row_index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            rows: row_count,
            columns: column_count,
            tile_width,
            tile_height,
            cells,
        })
    }

    /// Number of rows in the maze.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the maze.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Width of a single tile in world units.
    #[must_use]
    pub const fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Height of a single tile in world units.
    #[must_use]
    pub const fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Total width of the maze in world units.
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.columns as f32 * self.tile_width
    }

    /// Total height of the maze in world units.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.rows as f32 * self.tile_height
    }

    /// Upper-left corner of the maze; the maze is centred on the origin.
    #[must_use]
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(-self.total_width() / 2.0, self.total_height() / 2.0)
    }

    /// Maps a world position to the tile index convention used by the game.
    ///
    /// No clamping is performed: positions outside the maze yield indices
    /// outside the grid.
    #[must_use]
    pub fn tile_index_from_position(&self, position: Vec2) -> TileIndex {
        let top_left = self.top_left();
        let row_offset = top_left.y - position.y + ROW_ANCHOR_CORRECTION;
        let column_offset = position.x - top_left.x;
        let row = (row_offset / self.tile_height).floor() as i32;
        let column = (column_offset / self.tile_width).floor() as i32 + 1;
        TileIndex::new(row, column)
    }

    /// Maps a tile index back to the world position of that tile's centre.
    #[must_use]
    pub fn position_from_tile_index(&self, index: TileIndex) -> Vec2 {
        let top_left = self.top_left();
        Vec2::new(
            top_left.x + index.column() as f32 * self.tile_width - self.tile_width / 2.0,
            top_left.y - index.row() as f32 * self.tile_height - self.tile_height / 2.0,
        )
    }

    /// Raw lookup into the stored cells using zero-based row and column.
    #[must_use]
    pub fn tile(&self, row: i32, column: i32) -> Option<TileKind> {
        self.storage_index(row, column)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Kind of the tile addressed by a tile index.
    #[must_use]
    pub fn tile_at(&self, index: TileIndex) -> Option<TileKind> {
        self.tile(index.row(), index.column() - 1)
    }

    /// Reports whether the tile index lies inside the maze.
    #[must_use]
    pub fn contains(&self, index: TileIndex) -> bool {
        self.tile_at(index).is_some()
    }

    /// Reports whether the tile addressed by the index can be stood on.
    pub fn is_passable(&self, index: TileIndex) -> Result<bool, MazeError> {
        self.tile_at(index)
            .map(TileKind::is_passable)
            .ok_or(MazeError::OutOfRange(index))
    }

    /// Iterates over the tiles in row-major order with their tile indices.
    pub fn iter(&self) -> impl Iterator<Item = (TileIndex, TileKind)> + '_ {
        let columns = self.columns as usize;
        self.cells.iter().enumerate().map(move |(offset, kind)| {
            let row = (offset / columns) as i32;
            let column = (offset % columns) as i32 + 1;
            (TileIndex::new(row, column), *kind)
        })
    }

    fn storage_index(&self, row: i32, column: i32) -> Option<usize> {
        let row = u32::try_from(row).ok()?;
        let column = u32::try_from(column).ok()?;
        if row < self.rows && column < self.columns {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Tile indices are `i32`, so both dimensions must fit into one.
fn dimensions(rows: usize, columns: usize) -> Result<(u32, u32), MazeError> {
    let too_large = || MazeError::TooLarge { rows, columns };
    let fits = |len: usize| {
        i32::try_from(len)
            .ok()
            .and_then(|len| u32::try_from(len).ok())
    };
    Ok((fits(rows).ok_or_else(too_large)?, fits(columns).ok_or_else(too_large)?))
}
