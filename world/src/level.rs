//! Built-in level layouts.

use dont_blink_core::{TileIndex, TileTrigger};

use crate::maze::{MazeError, MazeGrid};

/// Edge length of a maze tile in world units.
pub const TILE_LENGTH: f32 = 200.0;

/// Identifies one of the built-in levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LevelId {
    /// Small corridor maze used while tuning the blink loop.
    Training,
    /// The full crypt maze.
    #[default]
    Crypt,
}

/// Maze together with the tiles the session is anchored on.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    maze: MazeGrid,
    spawn: TileIndex,
    goal: TileIndex,
}

impl Level {
    /// Creates a level, validating that the spawn and goal lie inside the maze
    /// and that the goal carries the goal trigger.
    pub fn new(maze: MazeGrid, spawn: TileIndex, goal: TileIndex) -> Result<Self, MazeError> {
        for (anchor, index) in [("spawn", spawn), ("goal", goal)] {
            if !maze.contains(index) {
                return Err(MazeError::AnchorOutOfBounds { anchor, index });
            }
        }
        let trigger = maze.tile_at(goal).and_then(|kind| kind.config().trigger);
        if trigger != Some(TileTrigger::Goal) {
            return Err(MazeError::GoalWithoutTrigger(goal));
        }
        Ok(Self { maze, spawn, goal })
    }

    /// Builds one of the built-in levels.
    pub fn builtin(id: LevelId) -> Result<Self, MazeError> {
        match id {
            LevelId::Training => Self::new(
                MazeGrid::from_ids(&TRAINING_LAYOUT, TILE_LENGTH, TILE_LENGTH)?,
                TileIndex::new(2, 6),
                TileIndex::new(3, 11),
            ),
            LevelId::Crypt => Self::new(
                MazeGrid::from_ids(&CRYPT_LAYOUT, TILE_LENGTH, TILE_LENGTH)?,
                TileIndex::new(19, 14),
                TileIndex::new(9, 13),
            ),
        }
    }

    /// Static maze of the level.
    #[must_use]
    pub const fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    /// Tile the player spawns on.
    #[must_use]
    pub const fn spawn(&self) -> TileIndex {
        self.spawn
    }

    /// Tile the player must reach.
    #[must_use]
    pub const fn goal(&self) -> TileIndex {
        self.goal
    }
}

const F: u8 = 0;
const G: u8 = 1;
const W: u8 = 3;

const TRAINING_LAYOUT: [[u8; 11]; 5] = [
    [W, W, W, W, W, W, W, W, W, W, W],
    [F, F, F, F, F, F, F, W, W, W, W],
    [W, W, W, W, F, F, F, W, W, W, W],
    [W, W, W, W, F, F, F, F, F, F, G],
    [W, W, W, W, W, W, W, W, W, W, W],
];

// 0 floor, 1 finish, 2 finish wall, 3 wall, 4 wall corner, 5 half wall,
// 6 guide screen, 7 safe tile.
const CRYPT_LAYOUT: [[u8; 16]; 21] = [
    [4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 4],
    [3, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 3],
    [3, 0, 5, 5, 5, 5, 0, 0, 3, 0, 5, 5, 5, 5, 0, 3],
    [3, 0, 0, 0, 0, 3, 0, 0, 0, 0, 3, 0, 0, 0, 0, 3],
    [3, 5, 5, 0, 0, 3, 0, 5, 5, 5, 3, 0, 0, 5, 5, 3],
    [3, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3],
    [3, 0, 3, 5, 5, 5, 5, 5, 0, 0, 5, 5, 5, 3, 0, 3],
    [3, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 3],
    [3, 0, 3, 0, 5, 5, 5, 0, 0, 0, 0, 2, 2, 2, 0, 3],
    [3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 2, 0, 3],
    [3, 0, 0, 0, 5, 5, 5, 0, 0, 0, 0, 0, 0, 3, 0, 3],
    [3, 5, 5, 0, 0, 0, 0, 0, 3, 5, 5, 5, 0, 3, 0, 3],
    [3, 0, 0, 0, 3, 3, 3, 0, 3, 0, 0, 0, 0, 0, 0, 3],
    [3, 0, 3, 0, 0, 0, 0, 0, 3, 0, 3, 5, 5, 5, 5, 3],
    [3, 0, 3, 5, 5, 5, 5, 0, 3, 0, 0, 0, 0, 0, 0, 3],
    [3, 0, 0, 0, 0, 0, 0, 0, 3, 0, 5, 5, 5, 3, 0, 3],
    [3, 5, 5, 5, 5, 0, 3, 0, 0, 0, 0, 0, 0, 3, 0, 3],
    [3, 0, 0, 0, 0, 0, 3, 0, 3, 5, 5, 5, 0, 3, 0, 3],
    [3, 0, 3, 5, 5, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 3],
    [3, 0, 0, 0, 0, 0, 0, 6, 0, 0, 3, 0, 7, 0, 0, 3],
    [4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 4],
];
