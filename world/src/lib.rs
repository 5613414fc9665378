#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Don't Blink.

mod level;
mod maze;

use std::time::Duration;

use dont_blink_core::{
    Command, EnemySnapshot, Event, FacingDirection, MovementIntent, PlayerSnapshot,
    SessionOutcome, TileIndex, TileTrigger, WalkDirection, DEFAULT_KILL_RADIUS,
    GUIDE_DISPLAY_DURATION, WELCOME_BANNER,
};
use glam::Vec2;
use log::{debug, info};

pub use level::{Level, LevelId, TILE_LENGTH};
pub use maze::{MazeError, MazeGrid, ROW_ANCHOR_CORRECTION};

/// Represents the authoritative Don't Blink world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    level: Level,
    player: Player,
    enemy: Option<Enemy>,
    elapsed: Duration,
    paused: bool,
    outcome: Option<SessionOutcome>,
    accepted_blinks: u32,
    guide_until: Option<Duration>,
    on_guide_tile: bool,
}

impl World {
    /// Creates a new world for the provided level with the player at its spawn.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let player = Player::spawn_at(level.maze().position_from_tile_index(level.spawn()));
        Self {
            banner: WELCOME_BANNER,
            level,
            player,
            enemy: None,
            elapsed: Duration::ZERO,
            paused: false,
            outcome: None,
            accepted_blinks: 0,
            guide_until: None,
            on_guide_tile: false,
        }
    }

    /// Creates a new world for one of the built-in levels.
    pub fn from_builtin(id: LevelId) -> Result<Self, MazeError> {
        Level::builtin(id).map(Self::new)
    }

    fn gameplay_active(&self) -> bool {
        !self.paused && self.outcome.is_none()
    }

    fn reset(&mut self) {
        self.player =
            Player::spawn_at(self.level.maze().position_from_tile_index(self.level.spawn()));
        self.enemy = None;
        self.elapsed = Duration::ZERO;
        self.paused = false;
        self.outcome = None;
        self.accepted_blinks = 0;
        self.guide_until = None;
        self.on_guide_tile = false;
    }

    fn kill_player(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(SessionOutcome::Killed);
        self.player.disable_movement();
        info!("player killed after {:?}", self.elapsed);
        out_events.push(Event::PlayerKilled);
    }

    fn close_expired_guide(&mut self, out_events: &mut Vec<Event>) {
        if self.guide_until.is_some_and(|until| self.elapsed >= until) {
            self.guide_until = None;
            debug!("guide closed after {:?}", self.elapsed);
            out_events.push(Event::GuideHidden);
        }
    }

    /// Opens the guide when the player steps onto a guide tile.
    fn touch_tiles(&mut self, out_events: &mut Vec<Event>) {
        let maze = self.level.maze();
        let on_guide = maze
            .tile_at(maze.tile_index_from_position(self.player.position))
            .and_then(|kind| kind.config().trigger)
            == Some(TileTrigger::Guide);
        if on_guide && !self.on_guide_tile && self.guide_until.is_none() && self.outcome.is_none()
        {
            self.guide_until = Some(self.elapsed.saturating_add(GUIDE_DISPLAY_DURATION));
            self.player.intent = MovementIntent::IDLE;
            info!("guide shown, movement locked");
            out_events.push(Event::GuideShown);
        }
        self.on_guide_tile = on_guide;
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                elapsed: world.elapsed,
            });
            world.close_expired_guide(out_events);
        }
        Command::SetPaused { paused } => {
            if world.paused == paused {
                return;
            }
            world.paused = paused;
            if paused {
                world.player.intent = MovementIntent::IDLE;
                info!("face lost, gameplay paused");
                out_events.push(Event::GameplayPaused);
            } else {
                info!("face visible, gameplay resumed");
                out_events.push(Event::GameplayResumed);
            }
        }
        Command::SubmitMovementIntent { intent } => {
            if !world.gameplay_active()
                || !world.player.movement_enabled
                || world.guide_until.is_some()
            {
                world.player.intent = MovementIntent::IDLE;
                return;
            }
            world.player.intent = intent;
            if let Some(facing) = intent.walk_direction() {
                if facing != world.player.facing {
                    world.player.facing = facing;
                    out_events.push(Event::PlayerFacingChanged { facing });
                }
            }
        }
        Command::SyncPlayerPosition { position } => {
            if world.paused || world.outcome == Some(SessionOutcome::Killed) {
                return;
            }
            world.player.position = position;
            world.touch_tiles(out_events);
        }
        Command::AcceptBlink => {
            if !world.gameplay_active() {
                return;
            }
            world.accepted_blinks = world.accepted_blinks.saturating_add(1);
            out_events.push(Event::BlinkAccepted);
        }
        Command::TeleportEnemy {
            tile,
            position,
            facing,
        } => {
            if world.outcome == Some(SessionOutcome::Killed) {
                return;
            }
            match world.enemy.as_mut() {
                Some(enemy) => {
                    let from = enemy.position;
                    enemy.position = position;
                    enemy.tile = tile;
                    enemy.facing = facing;
                    debug!("enemy teleported to {tile:?} facing {facing:?}");
                    out_events.push(Event::EnemyTeleported {
                        from,
                        to: position,
                        tile,
                        facing,
                    });
                }
                None => {
                    let enemy = Enemy::new(tile, position, facing);
                    debug!("enemy spawned at {tile:?} facing {facing:?}");
                    out_events.push(Event::EnemySpawned {
                        tile,
                        position,
                        facing,
                        kill_radius: enemy.kill_radius,
                    });
                    world.enemy = Some(enemy);
                }
            }
        }
        Command::KillPlayer => world.kill_player(out_events),
        Command::ReportEnemyContact => {
            if world.enemy.is_none() || !world.gameplay_active() {
                return;
            }
            info!("player ran into the enemy");
            world.kill_player(out_events);
        }
        Command::DeclareWin => {
            if world.outcome.is_some() {
                return;
            }
            world.outcome = Some(SessionOutcome::Won);
            world.player.disable_movement();
            info!("player reached the goal after {:?}", world.elapsed);
            out_events.push(Event::PlayerWon);
        }
        Command::ResetSession => {
            world.reset();
            out_events.push(Event::SessionReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dont_blink_core::{EnemySnapshot, PlayerSnapshot, SessionOutcome, TileIndex};
    use glam::Vec2;

    use super::{Level, MazeGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the active level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Provides read-only access to the static maze.
    #[must_use]
    pub fn maze(world: &World) -> &MazeGrid {
        world.level.maze()
    }

    /// Tile the player must reach to win.
    #[must_use]
    pub fn goal(world: &World) -> TileIndex {
        world.level.goal()
    }

    /// World position of the goal tile.
    #[must_use]
    pub fn goal_position(world: &World) -> Vec2 {
        world.level.maze().position_from_tile_index(world.level.goal())
    }

    /// Captures a snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a snapshot of the enemy, if it has appeared.
    #[must_use]
    pub fn enemy(world: &World) -> Option<EnemySnapshot> {
        world.enemy.as_ref().map(super::Enemy::snapshot)
    }

    /// Reports whether gameplay is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether the guide screen currently locks movement.
    #[must_use]
    pub fn is_guide_shown(world: &World) -> bool {
        world.guide_until.is_some()
    }

    /// Reports how the session ended, if it has.
    #[must_use]
    pub fn outcome(world: &World) -> Option<SessionOutcome> {
        world.outcome
    }

    /// Total time elapsed since the session started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of blinks that produced a consequence this session.
    #[must_use]
    pub fn accepted_blinks(world: &World) -> u32 {
        world.accepted_blinks
    }
}

#[derive(Clone, Debug)]
struct Player {
    position: Vec2,
    facing: WalkDirection,
    intent: MovementIntent,
    movement_enabled: bool,
}

impl Player {
    fn spawn_at(position: Vec2) -> Self {
        Self {
            position,
            facing: WalkDirection::Down,
            intent: MovementIntent::IDLE,
            movement_enabled: true,
        }
    }

    fn disable_movement(&mut self) {
        self.movement_enabled = false;
        self.intent = MovementIntent::IDLE;
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            facing: self.facing,
            intent: self.intent,
            movement_enabled: self.movement_enabled,
        }
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    position: Vec2,
    tile: TileIndex,
    facing: FacingDirection,
    kill_radius: f32,
}

impl Enemy {
    fn new(tile: TileIndex, position: Vec2, facing: FacingDirection) -> Self {
        Self {
            position,
            tile,
            facing,
            kill_radius: DEFAULT_KILL_RADIUS,
        }
    }

    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            position: self.position,
            tile: self.tile,
            facing: self.facing,
            kill_radius: self.kill_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypt() -> World {
        World::from_builtin(LevelId::Crypt).expect("crypt level")
    }

    fn teleport(tile: TileIndex, position: Vec2) -> Command {
        Command::TeleportEnemy {
            tile,
            position,
            facing: FacingDirection::Front,
        }
    }

    #[test]
    fn player_spawns_on_level_spawn_tile() {
        let world = crypt();
        let maze = query::maze(&world);
        let player = query::player(&world);
        assert_eq!(
            maze.tile_index_from_position(player.position),
            TileIndex::new(19, 14)
        );
        assert!(player.movement_enabled);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn tick_reports_elapsed_time() {
        let mut world = crypt();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(16),
                elapsed: Duration::from_millis(32),
            })
        );
    }

    #[test]
    fn first_teleport_spawns_enemy_then_moves_it() {
        let mut world = crypt();
        let mut events = Vec::new();
        let first = Vec2::new(100.0, 100.0);
        let second = Vec2::new(300.0, 100.0);

        apply(&mut world, teleport(TileIndex::new(1, 1), first), &mut events);
        apply(&mut world, teleport(TileIndex::new(1, 2), second), &mut events);

        assert_eq!(
            events,
            vec![
                Event::EnemySpawned {
                    tile: TileIndex::new(1, 1),
                    position: first,
                    facing: FacingDirection::Front,
                    kill_radius: DEFAULT_KILL_RADIUS,
                },
                Event::EnemyTeleported {
                    from: first,
                    to: second,
                    tile: TileIndex::new(1, 2),
                    facing: FacingDirection::Front,
                },
            ]
        );
        let enemy = query::enemy(&world).expect("enemy present");
        assert_eq!(enemy.position, second);
    }

    #[test]
    fn pause_events_fire_only_on_change() {
        let mut world = crypt();
        let mut events = Vec::new();
        for paused in [true, true, false, false, true] {
            apply(&mut world, Command::SetPaused { paused }, &mut events);
        }
        assert_eq!(
            events,
            vec![
                Event::GameplayPaused,
                Event::GameplayResumed,
                Event::GameplayPaused
            ]
        );
        assert!(query::is_paused(&world));
    }

    #[test]
    fn movement_intent_is_dropped_while_paused() {
        let mut world = crypt();
        let mut events = Vec::new();
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        apply(
            &mut world,
            Command::SubmitMovementIntent {
                intent: MovementIntent::new(1, 0),
            },
            &mut events,
        );
        assert!(query::player(&world).intent.is_idle());

        apply(&mut world, Command::SetPaused { paused: false }, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::SubmitMovementIntent {
                intent: MovementIntent::new(1, 0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlayerFacingChanged {
                facing: WalkDirection::Right
            }]
        );
        assert_eq!(query::player(&world).intent, MovementIntent::new(1, 0));
    }

    #[test]
    fn win_is_declared_once_and_disables_movement() {
        let mut world = crypt();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SubmitMovementIntent {
                intent: MovementIntent::new(0, 1),
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::DeclareWin, &mut events);
        apply(&mut world, Command::DeclareWin, &mut events);
        apply(&mut world, Command::KillPlayer, &mut events);

        assert_eq!(events, vec![Event::PlayerWon]);
        assert_eq!(query::outcome(&world), Some(SessionOutcome::Won));
        let player = query::player(&world);
        assert!(!player.movement_enabled);
        assert!(player.intent.is_idle());
    }

    #[test]
    fn killed_player_ignores_teleports_and_position_updates() {
        let mut world = crypt();
        let mut events = Vec::new();
        let before = query::player(&world).position;
        apply(&mut world, Command::KillPlayer, &mut events);
        apply(
            &mut world,
            Command::SyncPlayerPosition {
                position: Vec2::ZERO,
            },
            &mut events,
        );
        apply(&mut world, teleport(TileIndex::new(1, 1), Vec2::ZERO), &mut events);
        apply(&mut world, Command::AcceptBlink, &mut events);

        assert_eq!(events, vec![Event::PlayerKilled]);
        assert_eq!(query::player(&world).position, before);
        assert!(query::enemy(&world).is_none());
    }

    #[test]
    fn paused_world_ignores_position_updates() {
        let mut world = crypt();
        let mut events = Vec::new();
        let before = query::player(&world).position;
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        apply(
            &mut world,
            Command::SyncPlayerPosition {
                position: before + Vec2::new(37.0, 0.0),
            },
            &mut events,
        );
        assert_eq!(query::player(&world).position, before);

        apply(&mut world, Command::SetPaused { paused: false }, &mut events);
        apply(
            &mut world,
            Command::SyncPlayerPosition {
                position: before + Vec2::new(37.0, 0.0),
            },
            &mut events,
        );
        assert_eq!(
            query::player(&world).position,
            before + Vec2::new(37.0, 0.0)
        );
    }

    #[test]
    fn enemy_contact_kills_once_an_enemy_exists() {
        let mut world = crypt();
        let mut events = Vec::new();
        apply(&mut world, Command::ReportEnemyContact, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::outcome(&world), None);

        apply(&mut world, teleport(TileIndex::new(19, 15), Vec2::ZERO), &mut events);
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        apply(&mut world, Command::ReportEnemyContact, &mut events);
        assert_eq!(query::outcome(&world), None);

        apply(&mut world, Command::SetPaused { paused: false }, &mut events);
        events.clear();
        apply(&mut world, Command::ReportEnemyContact, &mut events);
        apply(&mut world, Command::ReportEnemyContact, &mut events);

        assert_eq!(events, vec![Event::PlayerKilled]);
        assert_eq!(query::outcome(&world), Some(SessionOutcome::Killed));
        assert!(!query::player(&world).movement_enabled);
    }

    #[test]
    fn guide_tile_locks_movement_until_the_guide_closes() {
        let mut world = crypt();
        let mut events = Vec::new();
        let guide = query::maze(&world).position_from_tile_index(TileIndex::new(19, 8));
        apply(
            &mut world,
            Command::SyncPlayerPosition { position: guide },
            &mut events,
        );
        assert_eq!(events, vec![Event::GuideShown]);
        assert!(query::is_guide_shown(&world));

        // Standing on the tile does not reopen the guide.
        apply(
            &mut world,
            Command::SyncPlayerPosition {
                position: guide + Vec2::new(10.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SubmitMovementIntent {
                intent: MovementIntent::new(1, 0),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::GuideShown]);
        assert!(query::player(&world).intent.is_idle());

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: GUIDE_DISPLAY_DURATION,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced {
                    dt: GUIDE_DISPLAY_DURATION,
                    elapsed: GUIDE_DISPLAY_DURATION,
                },
                Event::GuideHidden,
            ]
        );
        assert!(!query::is_guide_shown(&world));

        apply(
            &mut world,
            Command::SubmitMovementIntent {
                intent: MovementIntent::new(1, 0),
            },
            &mut events,
        );
        assert_eq!(query::player(&world).intent, MovementIntent::new(1, 0));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut world = crypt();
        let mut events = Vec::new();
        apply(&mut world, teleport(TileIndex::new(1, 1), Vec2::ZERO), &mut events);
        apply(&mut world, Command::AcceptBlink, &mut events);
        apply(&mut world, Command::KillPlayer, &mut events);
        events.clear();

        apply(&mut world, Command::ResetSession, &mut events);

        assert_eq!(events, vec![Event::SessionReset]);
        assert!(query::enemy(&world).is_none());
        assert_eq!(query::outcome(&world), None);
        assert_eq!(query::accepted_blinks(&world), 0);
        assert!(query::player(&world).movement_enabled);
    }

    #[test]
    fn goal_position_matches_goal_tile() {
        let world = crypt();
        let goal = query::goal_position(&world);
        assert_eq!(
            query::maze(&world).tile_index_from_position(goal),
            query::goal(&world)
        );
        assert_eq!(query::level(&world).goal(), TileIndex::new(9, 13));
    }
}
