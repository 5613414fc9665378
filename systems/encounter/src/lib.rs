#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter system that turns blinks into consequences.
//!
//! Once per frame the system samples the blink signal at a fixed cadence,
//! debounces accepted blinks, kills the player when a blink happens inside the
//! enemy's kill radius and otherwise teleports the enemy next to the player.
//! Independently it pauses gameplay while the face is not visible and declares
//! the win once the player stands close enough to the goal tile.

use std::time::Duration;

use dont_blink_core::{BlinkSample, Command, EnemySnapshot, Event, PlayerSnapshot, TileIndex};
use dont_blink_system_placement::Placement;
use dont_blink_world::{query, MazeGrid, World};
use log::{debug, info};
use rand::Rng;

/// Default minimum interval between two accepted blinks.
pub const DEFAULT_BLINK_COOLDOWN: Duration = Duration::from_millis(500);
/// Default interval between two samples of the blink signal.
pub const DEFAULT_BLINK_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default distance to the goal tile that completes the level.
pub const DEFAULT_WIN_TRIGGER_DISTANCE: f32 = 70.0;

/// Configuration parameters required to construct the encounter system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    blink_cooldown: Duration,
    blink_poll_interval: Duration,
    win_trigger_distance: f32,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        blink_cooldown: Duration,
        blink_poll_interval: Duration,
        win_trigger_distance: f32,
    ) -> Self {
        Self {
            blink_cooldown,
            blink_poll_interval,
            win_trigger_distance,
        }
    }

    /// Minimum interval between two accepted blinks.
    #[must_use]
    pub const fn blink_cooldown(&self) -> Duration {
        self.blink_cooldown
    }

    /// Interval between two samples of the blink signal.
    #[must_use]
    pub const fn blink_poll_interval(&self) -> Duration {
        self.blink_poll_interval
    }

    /// Distance to the goal tile that completes the level.
    #[must_use]
    pub const fn win_trigger_distance(&self) -> f32 {
        self.win_trigger_distance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_BLINK_COOLDOWN,
            DEFAULT_BLINK_POLL_INTERVAL,
            DEFAULT_WIN_TRIGGER_DISTANCE,
        )
    }
}

/// Lifecycle of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncounterPhase {
    /// Blinks have consequences and the goal can be reached.
    Active,
    /// The win sequence is running; blinks are ignored.
    Won,
    /// The run is over.
    Killed,
}

/// Read-only inputs the encounter system needs from the world.
#[derive(Clone, Copy, Debug)]
pub struct EncounterView<'a> {
    /// Static maze of the level.
    pub maze: &'a MazeGrid,
    /// Snapshot of the player.
    pub player: PlayerSnapshot,
    /// Snapshot of the enemy, if it has appeared.
    pub enemy: Option<EnemySnapshot>,
    /// Tile the player must reach.
    pub goal: TileIndex,
}

impl<'a> EncounterView<'a> {
    /// Captures the view from the authoritative world.
    #[must_use]
    pub fn from_world(world: &'a World) -> Self {
        Self {
            maze: query::maze(world),
            player: query::player(world),
            enemy: query::enemy(world),
            goal: query::goal(world),
        }
    }
}

/// Pure system that reacts to the blink signal and the player's progress.
#[derive(Debug)]
pub struct Encounter {
    config: Config,
    placement: Placement,
    phase: EncounterPhase,
    paused: bool,
    last_poll: Option<Duration>,
    last_accepted_blink: Option<Duration>,
}

impl Encounter {
    /// Creates a new encounter system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            placement: Placement::new(),
            phase: EncounterPhase::Active,
            paused: false,
            last_poll: None,
            last_accepted_blink: None,
        }
    }

    /// Configuration the system was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current phase of the run.
    #[must_use]
    pub const fn phase(&self) -> EncounterPhase {
        self.phase
    }

    /// Reports whether the last processed frame was paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Consumes world events, the latest blink sample and a world view to emit
    /// commands for the current frame.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        sample: BlinkSample,
        view: &EncounterView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let now = self.ingest(events);

        if self.phase == EncounterPhase::Killed {
            return;
        }

        let paused = !sample.face_visible;
        if paused != self.paused {
            debug!("face visible: {}", sample.face_visible);
        }
        self.paused = paused;
        out.push(Command::SetPaused { paused });
        if paused {
            return;
        }

        let Some(now) = now else {
            return;
        };

        if self.poll_due(now) {
            self.last_poll = Some(now);
            if self.phase == EncounterPhase::Active && sample.blink_detected() {
                self.handle_blink(now, view, rng, out);
            }
        }

        if self.phase == EncounterPhase::Active && self.reached_goal(view) {
            info!("player reached the goal tile {:?}", view.goal);
            self.phase = EncounterPhase::Won;
            out.push(Command::DeclareWin);
        }
    }

    fn ingest(&mut self, events: &[Event]) -> Option<Duration> {
        let mut now = None;
        for event in events {
            match event {
                Event::TimeAdvanced { elapsed, .. } => now = Some(*elapsed),
                Event::PlayerKilled => self.phase = EncounterPhase::Killed,
                Event::PlayerWon => {
                    if self.phase == EncounterPhase::Active {
                        self.phase = EncounterPhase::Won;
                    }
                }
                Event::SessionReset => self.reset(),
                _ => {}
            }
        }
        now
    }

    fn reset(&mut self) {
        self.phase = EncounterPhase::Active;
        self.paused = false;
        self.last_poll = None;
        self.last_accepted_blink = None;
    }

    fn poll_due(&self, now: Duration) -> bool {
        self.last_poll
            .map_or(true, |last| now.saturating_sub(last) >= self.config.blink_poll_interval)
    }

    fn handle_blink<R>(
        &mut self,
        now: Duration,
        view: &EncounterView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        if let Some(last) = self.last_accepted_blink {
            if now.saturating_sub(last) < self.config.blink_cooldown {
                debug!("blink at {now:?} ignored during cooldown");
                return;
            }
        }

        out.push(Command::AcceptBlink);
        self.last_accepted_blink = Some(now);

        if let Some(enemy) = view.enemy {
            if enemy.is_within_kill_radius(view.player.position) {
                info!("blink at {now:?} inside the kill radius");
                self.phase = EncounterPhase::Killed;
                out.push(Command::KillPlayer);
                return;
            }
        }

        let _ = self
            .placement
            .teleport_near(view.player.position, view.maze, rng, out);
    }

    fn reached_goal(&self, view: &EncounterView<'_>) -> bool {
        let goal = view.maze.position_from_tile_index(view.goal);
        view.player.position.distance(goal) < self.config.win_trigger_distance
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
