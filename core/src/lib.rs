#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Don't Blink engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and the presentation layer react to. Systems never mutate the
//! world directly; they read snapshots and respond with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Don't Blink.";

/// Radius around the enemy inside which an accepted blink kills the player.
pub const DEFAULT_KILL_RADIUS: f32 = 500.0;

/// Acceleration applied to the player for a full-strength movement intent.
pub const DEFAULT_MOVE_ACCELERATION: f32 = 800.0;

/// How long the guide screen locks movement after the player touches it.
pub const GUIDE_DISPLAY_DURATION: Duration = Duration::from_secs(12);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Pauses or resumes gameplay depending on face visibility.
    SetPaused {
        /// Whether gameplay should be suspended.
        paused: bool,
    },
    /// Records the movement intent resolved by the host's input layer.
    SubmitMovementIntent {
        /// Direction the player wants to walk in.
        intent: MovementIntent,
    },
    /// Records the player position produced by the host's physics step.
    SyncPlayerPosition {
        /// Player position expressed in world units.
        position: Vec2,
    },
    /// Marks a blink as accepted, producing the blackout pulse.
    AcceptBlink,
    /// Creates the enemy or moves it to the provided tile.
    TeleportEnemy {
        /// Tile index the enemy should occupy.
        tile: TileIndex,
        /// World-space position matching the tile index.
        position: Vec2,
        /// Direction the enemy sprite should face.
        facing: FacingDirection,
    },
    /// Ends the run because the player blinked next to the enemy.
    KillPlayer,
    /// Reports that the host's physics saw the player touch the enemy.
    ReportEnemyContact,
    /// Ends the run because the player reached the goal tile.
    DeclareWin,
    /// Restores the level to its initial state.
    ResetSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
        /// Total time elapsed since the session started.
        elapsed: Duration,
    },
    /// Gameplay was suspended because the face is no longer visible.
    GameplayPaused,
    /// Gameplay resumed because the face became visible again.
    GameplayResumed,
    /// A blink passed the cooldown and produced a consequence.
    BlinkAccepted,
    /// The enemy appeared for the first time.
    EnemySpawned {
        /// Tile the enemy occupies.
        tile: TileIndex,
        /// World-space position of the enemy.
        position: Vec2,
        /// Direction the enemy sprite faces.
        facing: FacingDirection,
        /// Distance inside which an accepted blink kills the player.
        kill_radius: f32,
    },
    /// The existing enemy moved next to the player.
    EnemyTeleported {
        /// Position the enemy occupied before moving.
        from: Vec2,
        /// Position the enemy occupies after moving.
        to: Vec2,
        /// Tile the enemy occupies after moving.
        tile: TileIndex,
        /// Direction the enemy sprite faces after moving.
        facing: FacingDirection,
    },
    /// The player's walk animation direction changed.
    PlayerFacingChanged {
        /// Direction the player walks in.
        facing: WalkDirection,
    },
    /// The guide screen opened and locked movement.
    GuideShown,
    /// The guide screen closed and movement is allowed again.
    GuideHidden,
    /// The player blinked inside the enemy's kill radius or touched the enemy.
    PlayerKilled,
    /// The player reached the goal tile.
    PlayerWon,
    /// The level was restored to its initial state.
    SessionReset,
}

/// Final state of a session, if it has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The player blinked while the enemy was close or ran into it.
    Killed,
    /// The player reached the goal tile.
    Won,
}

/// Discrete tile kinds composing the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable floor; the only kind the enemy may be teleported onto.
    Floor,
    /// Walkable goal tile.
    Finish,
    /// Solid wall framing the goal.
    FinishWall,
    /// Solid full-height wall.
    VerticalWall,
    /// Solid full-height wall corner.
    VerticalWallCorner,
    /// Solid half-height wall.
    HorizontalWall,
    /// Walkable tile hosting the guide screen.
    GuideMarker,
    /// Walkable tile near the spawn.
    SafeTile,
}

impl TileKind {
    /// All tile kinds in id order.
    pub const ALL: [TileKind; 8] = [
        Self::Floor,
        Self::Finish,
        Self::FinishWall,
        Self::VerticalWall,
        Self::VerticalWallCorner,
        Self::HorizontalWall,
        Self::GuideMarker,
        Self::SafeTile,
    ];

    /// Numeric identifier used by literal maze matrices.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Floor => 0,
            Self::Finish => 1,
            Self::FinishWall => 2,
            Self::VerticalWall => 3,
            Self::VerticalWallCorner => 4,
            Self::HorizontalWall => 5,
            Self::GuideMarker => 6,
            Self::SafeTile => 7,
        }
    }

    /// Presentation and collision configuration associated with the kind.
    #[must_use]
    pub const fn config(self) -> TileConfig {
        match self {
            Self::Floor | Self::SafeTile => TileConfig::new(FLOOR_TEXTURE, false, None),
            Self::Finish => TileConfig::new(FLOOR_TEXTURE, false, Some(TileTrigger::Goal)),
            Self::FinishWall => TileConfig::new(FLOOR_TEXTURE, true, None),
            Self::VerticalWall => TileConfig::new("full-tile", true, None),
            Self::VerticalWallCorner => TileConfig::new("full-tile-corner", true, None),
            Self::HorizontalWall => TileConfig::new("half-tile", true, None),
            Self::GuideMarker => TileConfig::new(FLOOR_TEXTURE, false, Some(TileTrigger::Guide)),
        }
    }

    /// Reports whether bodies may stand on the tile.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !self.config().obstacle
    }
}

const FLOOR_TEXTURE: &str = "Tiles";

impl TryFrom<u8> for TileKind {
    type Error = UnknownTileId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == value)
            .ok_or(UnknownTileId(value))
    }
}

/// Raised when a literal maze contains an id outside the [`TileKind`] range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unknown tile id {0}")]
pub struct UnknownTileId(pub u8);

/// Per-kind tile configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileConfig {
    /// Texture key the renderer should draw.
    pub texture: &'static str,
    /// Whether the tile carries a static collision body.
    pub obstacle: bool,
    /// Contact trigger attached to the tile, if any.
    pub trigger: Option<TileTrigger>,
}

impl TileConfig {
    const fn new(texture: &'static str, obstacle: bool, trigger: Option<TileTrigger>) -> Self {
        Self {
            texture,
            obstacle,
            trigger,
        }
    }
}

/// Contact triggers a tile can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileTrigger {
    /// The level's goal anchor must carry this trigger.
    Goal,
    /// Stepping onto the tile shows the guide and locks movement.
    Guide,
}

/// Row and column addressing a maze tile.
///
/// Rows are zero-based. Columns follow the conversion convention of the maze
/// grid, where column `c` addresses the stored column `c - 1`. Both fields are
/// signed so that positions outside the maze and neighbour offsets stay
/// representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    row: i32,
    column: i32,
}

impl TileIndex {
    /// Creates a new tile index.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Row component of the index.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column component of the index.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Returns the index shifted by the provided row and column deltas.
    #[must_use]
    pub const fn offset(self, rows: i32, columns: i32) -> Self {
        Self {
            row: self.row + rows,
            column: self.column + columns,
        }
    }
}

/// Walk animation directions of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkDirection {
    /// Walking toward the top of the screen.
    Up,
    /// Walking toward the left of the screen.
    Left,
    /// Walking toward the bottom of the screen.
    Down,
    /// Walking toward the right of the screen.
    Right,
}

impl WalkDirection {
    /// Axis dominance required before a direction wins over the other axis.
    pub const THRESHOLD: f32 = 0.3;

    /// Resolves the walk direction for a velocity or intent vector.
    ///
    /// The dominant axis wins when it exceeds the other by [`Self::THRESHOLD`];
    /// near-diagonal vectors fall back to the strictly larger axis, and ties
    /// resolve vertically.
    #[must_use]
    pub fn resolve(dx: f32, dy: f32) -> Self {
        let horizontal = if dx > 0.0 { Self::Right } else { Self::Left };
        let vertical = if dy > 0.0 { Self::Up } else { Self::Down };

        if dx.abs() > dy.abs() + Self::THRESHOLD {
            horizontal
        } else if dy.abs() > dx.abs() + Self::THRESHOLD {
            vertical
        } else if dx.abs() > dy.abs() {
            horizontal
        } else {
            vertical
        }
    }
}

/// Directions the enemy sprite can face.
///
/// These describe how the sprite looks at the player and are unrelated to
/// compass directions; they are deliberately kept apart from [`WalkDirection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacingDirection {
    /// Sprite faces the viewer.
    Front,
    /// Sprite shows its back.
    Back,
    /// Sprite looks to the left.
    Left,
    /// Sprite looks to the right.
    Right,
}

/// Movement request produced by the host's keyboard mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MovementIntent {
    dx: i8,
    dy: i8,
}

impl MovementIntent {
    /// Intent that keeps the player still.
    pub const IDLE: Self = Self { dx: 0, dy: 0 };

    /// Creates a new intent; components are clamped to `-1..=1`.
    #[must_use]
    pub fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.clamp(-1, 1),
            dy: dy.clamp(-1, 1),
        }
    }

    /// Horizontal component, positive to the right.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Vertical component, positive upward.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Reports whether the intent requests no movement.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Force the physics collaborator should apply for this intent.
    ///
    /// Diagonal intents are scaled by `1 / sqrt(2)` so that their magnitude
    /// matches axis-aligned movement.
    #[must_use]
    pub fn force(&self, acceleration: f32) -> Vec2 {
        let force = Vec2::new(f32::from(self.dx), f32::from(self.dy)) * acceleration;
        if self.dx != 0 && self.dy != 0 {
            force / std::f32::consts::SQRT_2
        } else {
            force
        }
    }

    /// Walk direction matching the intent, or `None` when idle.
    #[must_use]
    pub fn walk_direction(&self) -> Option<WalkDirection> {
        if self.is_idle() {
            None
        } else {
            Some(WalkDirection::resolve(
                f32::from(self.dx),
                f32::from(self.dy),
            ))
        }
    }
}

/// Read-only snapshot of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Position in world units.
    pub position: Vec2,
    /// Walk animation direction.
    pub facing: WalkDirection,
    /// Movement intent currently applied.
    pub intent: MovementIntent,
    /// Whether the player may currently move.
    pub movement_enabled: bool,
}

/// Read-only snapshot of the enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Position in world units.
    pub position: Vec2,
    /// Tile the enemy occupies.
    pub tile: TileIndex,
    /// Direction the sprite faces.
    pub facing: FacingDirection,
    /// Distance inside which an accepted blink kills the player.
    pub kill_radius: f32,
}

impl EnemySnapshot {
    /// Reports whether the provided position lies within the kill radius.
    ///
    /// The boundary is inclusive.
    #[must_use]
    pub fn is_within_kill_radius(&self, position: Vec2) -> bool {
        self.position.distance_squared(position) <= self.kill_radius * self.kill_radius
    }
}

/// Blink and face-visibility reading produced by the tracking pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlinkSample {
    /// Whether a usable face is currently tracked.
    pub face_visible: bool,
    /// Whether the left eye is closed.
    pub left_blink: bool,
    /// Whether the right eye is closed.
    pub right_blink: bool,
}

impl BlinkSample {
    /// Sample reported before the tracker produced any reading.
    pub const OPEN_EYES: Self = Self {
        face_visible: true,
        left_blink: false,
        right_blink: false,
    };

    /// Sample reported while no face is tracked.
    pub const NO_FACE: Self = Self {
        face_visible: false,
        left_blink: false,
        right_blink: false,
    };

    /// Reports whether either eye is closed.
    #[must_use]
    pub const fn blink_detected(&self) -> bool {
        self.left_blink || self.right_blink
    }
}

impl Default for BlinkSample {
    fn default() -> Self {
        Self::OPEN_EYES
    }
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
    fn tile_ids_map_to_kinds() {
        for (id, kind) in TileKind::ALL.iter().enumerate() {
            assert_eq!(TileKind::try_from(id as u8), Ok(*kind));
            assert_eq!(kind.id() as usize, id);
        }
    }

    #[test]
    fn unknown_tile_id_is_rejected() {
        assert_eq!(TileKind::try_from(8), Err(UnknownTileId(8)));
        assert_eq!(UnknownTileId(42).to_string(), "unknown tile id 42");
    }

    #[test]
    fn passable_kinds_match_obstacle_flags() {
        let passable: Vec<_> = TileKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_passable())
            .collect();
        assert_eq!(
            passable,
            vec![
                TileKind::Floor,
                TileKind::Finish,
                TileKind::GuideMarker,
                TileKind::SafeTile
            ]
        );
    }

    #[test]
    fn triggers_are_attached_to_finish_and_guide() {
        assert_eq!(TileKind::Finish.config().trigger, Some(TileTrigger::Goal));
        assert_eq!(
            TileKind::GuideMarker.config().trigger,
            Some(TileTrigger::Guide)
        );
        assert_eq!(TileKind::VerticalWall.config().texture, "full-tile");
        assert_eq!(TileKind::HorizontalWall.config().texture, "half-tile");
    }

    #[test]
    fn tile_kind_round_trips_through_bincode() {
        assert_round_trip(&TileKind::GuideMarker);
        assert_round_trip(&TileIndex::new(-1, 14));
        assert_round_trip(&SessionOutcome::Won);
    }

    #[test]
    fn walk_direction_prefers_dominant_axis() {
        assert_eq!(WalkDirection::resolve(1.0, 0.0), WalkDirection::Right);
        assert_eq!(WalkDirection::resolve(-1.0, 0.0), WalkDirection::Left);
        assert_eq!(WalkDirection::resolve(0.0, 1.0), WalkDirection::Up);
        assert_eq!(WalkDirection::resolve(0.0, -1.0), WalkDirection::Down);
        assert_eq!(WalkDirection::resolve(0.9, 0.7), WalkDirection::Right);
        assert_eq!(WalkDirection::resolve(1.0, -1.0), WalkDirection::Down);
    }

    #[test]
    fn diagonal_force_keeps_axis_magnitude() {
        let diagonal = MovementIntent::new(1, 1).force(DEFAULT_MOVE_ACCELERATION);
        assert!((diagonal.length() - DEFAULT_MOVE_ACCELERATION).abs() < 1e-3);

        let straight = MovementIntent::new(-3, 0).force(DEFAULT_MOVE_ACCELERATION);
        assert_eq!(straight, Vec2::new(-DEFAULT_MOVE_ACCELERATION, 0.0));
        assert_eq!(MovementIntent::IDLE.walk_direction(), None);
    }

    #[test]
    fn kill_radius_boundary_is_inclusive() {
        let enemy = EnemySnapshot {
            position: Vec2::ZERO,
            tile: TileIndex::new(0, 0),
            facing: FacingDirection::Front,
            kill_radius: DEFAULT_KILL_RADIUS,
        };
        assert!(enemy.is_within_kill_radius(Vec2::new(300.0, 400.0)));
        assert!(!enemy.is_within_kill_radius(Vec2::new(300.0, 401.0)));
    }

    #[test]
    fn blink_detected_when_either_eye_closes() {
        let left = BlinkSample {
            left_blink: true,
            ..BlinkSample::OPEN_EYES
        };
        let right = BlinkSample {
            right_blink: true,
            ..BlinkSample::OPEN_EYES
        };
        assert!(left.blink_detected());
        assert!(right.blink_detected());
        assert!(!BlinkSample::default().blink_detected());
    }
}
