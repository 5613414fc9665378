#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Don't Blink adapters.
//!
//! Adapters translate the world's events into a [`Scene`] and hand it to a
//! [`RenderingBackend`] every frame. The scene never reads the world directly
//! after construction; it is kept in sync through [`Scene::apply_events`] and
//! [`Scene::sync_player`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use dont_blink_core::{
    Event, FacingDirection, MovementIntent, PlayerSnapshot, TileIndex, TileTrigger, WalkDirection,
};
use dont_blink_world::{query, MazeGrid, World};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black, used for the blackout overlay and the clear color.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the same color with the provided alpha, clamped to 0.0..=1.0.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement requested by the keyboard mapping on this frame.
    pub movement: MovementIntent,
    /// Whether the adapter detected a restart request on this frame.
    pub restart: bool,
}

/// One maze tile as the renderer should draw it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSprite {
    /// Tile index the sprite represents.
    pub tile: TileIndex,
    /// Centre of the tile in world units.
    pub position: Vec2,
    /// Texture key to draw.
    pub texture: &'static str,
    /// Whether the tile carries a static collision body.
    pub obstacle: bool,
    /// Contact trigger attached to the tile, if any.
    pub trigger: Option<TileTrigger>,
}

impl TileSprite {
    /// Builds the sprite table for every tile of the maze in row-major order.
    #[must_use]
    pub fn table(maze: &MazeGrid) -> Vec<Self> {
        maze.iter()
            .map(|(tile, kind)| {
                let config = kind.config();
                Self {
                    tile,
                    position: maze.position_from_tile_index(tile),
                    texture: config.texture,
                    obstacle: config.obstacle,
                    trigger: config.trigger,
                }
            })
            .collect()
    }
}

/// Black full-screen flash played whenever a blink is accepted.
///
/// The alpha ramps up over [`Self::FADE_IN`], stays opaque for
/// [`Self::HOLD`] and ramps down over [`Self::FADE_OUT`]. Triggering while a
/// pulse is running restarts it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlackoutPulse {
    elapsed: Option<Duration>,
}

impl BlackoutPulse {
    /// Duration of the fade to black.
    pub const FADE_IN: Duration = Duration::from_millis(50);
    /// Duration the screen stays black.
    pub const HOLD: Duration = Duration::from_millis(100);
    /// Duration of the fade back to the scene.
    pub const FADE_OUT: Duration = Duration::from_millis(50);

    /// Total length of one pulse.
    #[must_use]
    pub fn total() -> Duration {
        Self::FADE_IN + Self::HOLD + Self::FADE_OUT
    }

    /// Starts the pulse from the beginning.
    pub fn trigger(&mut self) {
        self.elapsed = Some(Duration::ZERO);
    }

    /// Advances the pulse, finishing it once the fade-out completes.
    pub fn advance(&mut self, dt: Duration) {
        if let Some(elapsed) = self.elapsed {
            let elapsed = elapsed.saturating_add(dt);
            self.elapsed = (elapsed < Self::total()).then_some(elapsed);
        }
    }

    /// Reports whether the pulse is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Overlay alpha for the current point of the pulse.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        let Some(elapsed) = self.elapsed else {
            return 0.0;
        };
        let fade_out_start = Self::FADE_IN + Self::HOLD;
        if elapsed < Self::FADE_IN {
            elapsed.as_secs_f32() / Self::FADE_IN.as_secs_f32()
        } else if elapsed < fade_out_start {
            1.0
        } else {
            let into_fade = elapsed.saturating_sub(fade_out_start);
            (1.0 - into_fade.as_secs_f32() / Self::FADE_OUT.as_secs_f32()).clamp(0.0, 1.0)
        }
    }
}

/// Player sprite state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSprite {
    /// Position in world units.
    pub position: Vec2,
    /// Walk animation direction.
    pub facing: WalkDirection,
    /// Whether the walk animation is running.
    pub walking: bool,
}

impl PlayerSprite {
    /// Number of frames in each walk cycle.
    pub const FRAMES_PER_DIRECTION: usize = 9;

    /// Texture key of a walk-cycle frame; frames wrap around the cycle.
    #[must_use]
    pub fn walk_texture(&self, frame: usize) -> String {
        let first = match self.facing {
            WalkDirection::Up => 0,
            WalkDirection::Left => 9,
            WalkDirection::Down => 18,
            WalkDirection::Right => 27,
        };
        format!("walk{}", first + frame % Self::FRAMES_PER_DIRECTION)
    }
}

/// Enemy sprite state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySprite {
    /// Tile the enemy occupies.
    pub tile: TileIndex,
    /// Position in world units.
    pub position: Vec2,
    /// Direction the sprite faces.
    pub facing: FacingDirection,
}

/// Scene change requested once the session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneTransition {
    /// Cut to the death screen.
    Death,
    /// Pan to the goal and show the win screen.
    Win,
}

/// Scene description combining the maze, its inhabitants and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Banner displayed when the session boots.
    pub banner: &'static str,
    /// Maze tiles in row-major order.
    pub tiles: Vec<TileSprite>,
    /// Player sprite.
    pub player: PlayerSprite,
    /// Enemy sprite, once the enemy has appeared.
    pub enemy: Option<EnemySprite>,
    /// Whether the pause overlay is shown.
    pub pause_overlay: bool,
    /// Whether the guide screen is shown.
    pub guide_overlay: bool,
    /// Blackout pulse played after accepted blinks.
    pub blackout: BlackoutPulse,
    /// Pending scene change, if the session ended.
    pub transition: Option<SceneTransition>,
}

impl Scene {
    /// Builds the scene for the current world state.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let player = query::player(world);
        Self {
            banner: query::welcome_banner(world),
            tiles: TileSprite::table(query::maze(world)),
            player: PlayerSprite {
                position: player.position,
                facing: player.facing,
                walking: !player.intent.is_idle(),
            },
            enemy: query::enemy(world).map(|enemy| EnemySprite {
                tile: enemy.tile,
                position: enemy.position,
                facing: enemy.facing,
            }),
            pause_overlay: query::is_paused(world),
            guide_overlay: query::is_guide_shown(world),
            blackout: BlackoutPulse::default(),
            transition: None,
        }
    }

    /// Updates presentation state from a batch of world events.
    pub fn apply_events(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt, .. } => self.blackout.advance(*dt),
                Event::GameplayPaused => self.pause_overlay = true,
                Event::GameplayResumed => self.pause_overlay = false,
                Event::BlinkAccepted => self.blackout.trigger(),
                Event::GuideShown => self.guide_overlay = true,
                Event::GuideHidden => self.guide_overlay = false,
                Event::EnemySpawned {
                    tile,
                    position,
                    facing,
                    ..
                }
                | Event::EnemyTeleported {
                    tile,
                    to: position,
                    facing,
                    ..
                } => {
                    self.enemy = Some(EnemySprite {
                        tile: *tile,
                        position: *position,
                        facing: *facing,
                    });
                }
                Event::PlayerFacingChanged { facing } => self.player.facing = *facing,
                Event::PlayerKilled => {
                    let _ = self.transition.get_or_insert(SceneTransition::Death);
                }
                Event::PlayerWon => {
                    let _ = self.transition.get_or_insert(SceneTransition::Win);
                }
                Event::SessionReset => {
                    self.enemy = None;
                    self.pause_overlay = false;
                    self.guide_overlay = false;
                    self.blackout = BlackoutPulse::default();
                    self.transition = None;
                }
            }
        }
    }

    /// Copies the player's physics state into the sprite.
    pub fn sync_player(&mut self, player: &PlayerSnapshot) {
        self.player.position = player.position;
        self.player.facing = player.facing;
        self.player.walking = player.movement_enabled && !player.intent.is_idle();
    }

    /// Color of the full-screen blackout overlay for this frame.
    #[must_use]
    pub fn blackout_color(&self) -> Color {
        Color::BLACK.with_alpha(self.blackout.alpha())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Don't Blink scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered. Returning `false` stops the backend.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<Scene>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool;
}
