#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy placement system that teleports the enemy next to the player.

use dont_blink_core::{Command, FacingDirection, TileIndex, TileKind};
use dont_blink_world::MazeGrid;
use glam::Vec2;
use log::debug;
use rand::Rng;

/// Neighbour offsets examined around the player, paired with the facing the
/// enemy sprite adopts when it lands there.
pub const CANDIDATE_OFFSETS: [(i32, i32, FacingDirection); 4] = [
    (0, 1, FacingDirection::Left),
    (1, 0, FacingDirection::Back),
    (-1, 0, FacingDirection::Front),
    (0, -1, FacingDirection::Right),
];

/// Tile the enemy may be teleported onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Tile index of the destination.
    pub tile: TileIndex,
    /// Facing paired with the offset that produced the candidate.
    pub facing: FacingDirection,
}

/// Pure system that picks a floor tile adjacent to the player for the enemy.
#[derive(Debug, Default)]
pub struct Placement {
    candidates: Vec<Candidate>,
}

impl Placement {
    /// Creates a new placement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a teleport command moving the enemy next to the player.
    ///
    /// Nothing is emitted when every neighbour of the player is blocked or the
    /// player stands outside the maze.
    /// Returns the chosen candidate.
    pub fn teleport_near<R>(
        &mut self,
        player_position: Vec2,
        maze: &MazeGrid,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> Option<Candidate>
    where
        R: Rng + ?Sized,
    {
        self.collect_candidates(player_position, maze);
        if self.candidates.is_empty() {
            debug!("no floor tile next to the player, enemy stays put");
            return None;
        }

        let chosen = self.candidates[rng.gen_range(0..self.candidates.len())];
        out.push(Command::TeleportEnemy {
            tile: chosen.tile,
            position: maze.position_from_tile_index(chosen.tile),
            facing: chosen.facing,
        });
        Some(chosen)
    }

    /// Lists the tiles the enemy could be teleported onto.
    #[must_use]
    pub fn candidates(&mut self, player_position: Vec2, maze: &MazeGrid) -> &[Candidate] {
        self.collect_candidates(player_position, maze);
        &self.candidates
    }

    fn collect_candidates(&mut self, player_position: Vec2, maze: &MazeGrid) {
        let player = maze.tile_index_from_position(player_position);
        self.candidates.clear();
        if !maze.contains(player) {
            debug!("player at {player:?} is outside the maze");
            return;
        }
        self.candidates.extend(
            CANDIDATE_OFFSETS
                .iter()
                .filter(|(rows, columns, _)| {
                    // Storage column is one less than the tile index column.
                    maze.tile(player.row() + rows, player.column() + columns - 1)
                        == Some(TileKind::Floor)
                })
                .map(|&(rows, columns, facing)| Candidate {
                    tile: player.offset(rows, columns),
                    facing,
                }),
        );
    }
}
