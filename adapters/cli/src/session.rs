//! Headless session runner.
//!
//! Drives the world, the encounter and heartbeat systems and the scene with a
//! fixed frame delta. A scripted tracker thread stands in for the camera and
//! publishes blink samples into the shared mailbox in lockstep with the frame
//! loop.

use std::{
    fmt,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Result};
use dont_blink_core::{
    BlinkSample, Command, Event, MovementIntent, SessionOutcome, DEFAULT_MOVE_ACCELERATION,
};
use dont_blink_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, SceneTransition,
};
use dont_blink_system_blink::BlinkMailbox;
use dont_blink_system_encounter::{Config as EncounterConfig, Encounter, EncounterView};
use dont_blink_system_heartbeat::{Config as HeartbeatConfig, Heartbeat, HeartbeatCue};
use dont_blink_world::{self as world, query, MazeGrid, World};
use glam::Vec2;
use log::{debug, info, warn};
use rand::RngCore;

/// How long a scripted blink keeps the eyes closed.
const SCRIPTED_BLINK_LENGTH: Duration = Duration::from_millis(150);

/// Velocity damping applied by the headless physics step, per second.
const LINEAR_DAMPING: f32 = 10.0;

/// Per-axis speed limit of the player body.
const MAX_SPEED: f32 = 800.0;

/// Collision box of the player's feet, relative to the sprite centre.
const PLAYER_FEET_OFFSET: Vec2 = Vec2::new(0.0, -70.0);
const PLAYER_FEET_SIZE: Vec2 = Vec2::new(95.0, 30.0);

/// Collision box of the enemy sprite, centred on its position.
const ENEMY_BODY_SIZE: Vec2 = Vec2::new(190.0, 190.0);

/// Blink schedule replayed by the scripted tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BlinkScript {
    frame: Duration,
    blink_every: Option<Duration>,
    face_lost: Option<(Duration, Duration)>,
}

impl BlinkScript {
    /// Creates a script that blinks periodically, or never when `blink_every`
    /// is `None`.
    pub(crate) const fn new(frame: Duration, blink_every: Option<Duration>) -> Self {
        Self {
            frame,
            blink_every,
            face_lost: None,
        }
    }

    /// Hides the face for `length` starting at `start`.
    pub(crate) fn with_face_lost(mut self, start: Duration, length: Duration) -> Self {
        self.face_lost = Some((start, start.saturating_add(length)));
        self
    }

    /// Sample the tracker reports on the provided frame.
    fn sample(&self, frame: u64) -> BlinkSample {
        let elapsed = self.frame.as_nanos() * u128::from(frame + 1);
        if let Some((start, end)) = self.face_lost {
            if (start.as_nanos()..end.as_nanos()).contains(&elapsed) {
                return BlinkSample::NO_FACE;
            }
        }
        let Some(period) = self.blink_every.filter(|period| !period.is_zero()) else {
            return BlinkSample::OPEN_EYES;
        };
        let closed = elapsed >= period.as_nanos()
            && elapsed % period.as_nanos() < SCRIPTED_BLINK_LENGTH.as_nanos();
        BlinkSample {
            face_visible: true,
            left_blink: closed,
            right_blink: closed,
        }
    }
}

/// Tracker thread replaying a [`BlinkScript`] into a mailbox.
struct ScriptedTracker {
    frames: Sender<u64>,
    published: Receiver<()>,
    handle: JoinHandle<()>,
}

impl ScriptedTracker {
    fn spawn(mailbox: BlinkMailbox, script: BlinkScript) -> Self {
        let (frames, frame_rx) = mpsc::channel::<u64>();
        let (published_tx, published) = mpsc::channel();
        let handle = thread::spawn(move || {
            for frame in frame_rx {
                mailbox.publish(script.sample(frame));
                if published_tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self {
            frames,
            published,
            handle,
        }
    }

    /// Lets the tracker publish the sample of `frame` and waits until it did.
    fn advance(&self, frame: u64) -> Result<()> {
        self.frames
            .send(frame)
            .map_err(|_| anyhow!("scripted tracker stopped before frame {frame}"))?;
        self.published
            .recv()
            .map_err(|_| anyhow!("scripted tracker stopped while publishing frame {frame}"))
    }

    fn finish(self) -> Result<()> {
        drop(self.frames);
        self.handle
            .join()
            .map_err(|_| anyhow!("scripted tracker thread panicked"))
    }
}

/// Minimal kinematic body standing in for the host's physics engine.
#[derive(Clone, Copy, Debug, Default)]
struct Body {
    velocity: Vec2,
}

impl Body {
    fn step(&mut self, position: Vec2, intent: MovementIntent, maze: &MazeGrid, dt: Duration) -> Vec2 {
        let dt = dt.as_secs_f32();
        self.velocity += intent.force(DEFAULT_MOVE_ACCELERATION) * dt;
        self.velocity /= 1.0 + LINEAR_DAMPING * dt;
        self.velocity = self.velocity.clamp(Vec2::splat(-MAX_SPEED), Vec2::splat(MAX_SPEED));

        let next = position + self.velocity * dt;
        let index = maze.tile_index_from_position(next);
        if maze.is_passable(index).unwrap_or(false) {
            next
        } else {
            self.velocity = Vec2::ZERO;
            position
        }
    }

    fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}

/// Reports whether the player's feet overlap the enemy's body.
fn touches_enemy(player: Vec2, enemy: Vec2) -> bool {
    let gap = (player + PLAYER_FEET_OFFSET - enemy).abs();
    let reach = (PLAYER_FEET_SIZE + ENEMY_BODY_SIZE) / 2.0;
    gap.x < reach.x && gap.y < reach.y
}

/// Backend that runs the update loop without a window.
#[derive(Clone, Debug)]
pub(crate) struct HeadlessBackend {
    frames: u64,
    frame: Duration,
    inputs: Vec<FrameInput>,
    retries: u32,
}

impl HeadlessBackend {
    /// Creates a backend running at most `frames` frames of length `frame`.
    pub(crate) fn new(frames: u64, frame: Duration) -> Self {
        Self {
            frames,
            frame,
            inputs: Vec::new(),
            retries: 0,
        }
    }

    /// Requests a restart after each of the first `retries` endings.
    pub(crate) fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Replays the provided inputs, one per frame; later frames are idle.
    #[cfg(test)]
    pub(crate) fn with_inputs(mut self, inputs: Vec<FrameInput>) -> Self {
        self.inputs = inputs;
        self
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<Scene>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool,
    {
        info!("running '{}' headless", presentation.window_title);
        let mut scene = presentation.scene;
        let mut retries = self.retries;
        let mut restart = false;
        for frame in 0..self.frames {
            let index = usize::try_from(frame).unwrap_or(usize::MAX);
            let mut input = self.inputs.get(index).copied().unwrap_or_default();
            input.restart |= std::mem::take(&mut restart);
            if update_scene(self.frame, input, &mut scene) {
                continue;
            }
            if retries == 0 || scene.transition.is_none() {
                break;
            }
            retries -= 1;
            restart = true;
        }
        Ok(scene)
    }
}

/// Tuning and pacing of one session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionOptions {
    pub(crate) encounter: EncounterConfig,
    pub(crate) heartbeat: HeartbeatConfig,
    pub(crate) script: BlinkScript,
}

/// What happened during a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionSummary {
    pub(crate) frames: u64,
    pub(crate) elapsed: Duration,
    pub(crate) outcome: Option<SessionOutcome>,
    pub(crate) accepted_blinks: u32,
    pub(crate) teleports: u32,
    pub(crate) restarts: u32,
    pub(crate) paused_frames: u64,
    pub(crate) peak_heartbeat: Option<f32>,
    pub(crate) transition: Option<SceneTransition>,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(SessionOutcome::Killed) => "killed",
            Some(SessionOutcome::Won) => "won",
            None => "unfinished",
        };
        writeln!(f, "outcome: {outcome}")?;
        if let Some(transition) = self.transition {
            writeln!(f, "scene: {transition:?}")?;
        }
        if self.restarts > 0 {
            writeln!(f, "restarts: {}", self.restarts)?;
        }
        writeln!(
            f,
            "frames: {} ({:.2}s, {} paused)",
            self.frames,
            self.elapsed.as_secs_f32(),
            self.paused_frames
        )?;
        writeln!(f, "accepted blinks: {}", self.accepted_blinks)?;
        write!(f, "enemy teleports: {}", self.teleports)?;
        if let Some(rate) = self.peak_heartbeat {
            write!(f, "\npeak heartbeat rate: {rate:.2}")?;
        }
        Ok(())
    }
}

/// Runs a session on `world` until it ends or the backend runs out of frames.
pub(crate) fn run<B>(
    world: &mut World,
    backend: B,
    options: SessionOptions,
    rng: &mut dyn RngCore,
) -> Result<SessionSummary>
where
    B: RenderingBackend,
{
    let mailbox = BlinkMailbox::new();
    let tracker = ScriptedTracker::spawn(mailbox.clone(), options.script);
    let mut encounter = Encounter::new(options.encounter);
    let mut heartbeat = Heartbeat::new(options.heartbeat);
    let mut body = Body::default();
    let mut pending: Vec<Event> = Vec::new();
    let mut summary = SessionSummary::default();
    let mut failure = None;

    let presentation = Presentation::new(
        query::welcome_banner(world),
        Color::BLACK,
        Scene::from_world(world),
    );

    let scene = backend.run(presentation, |dt, input, scene| {
        if let Err(error) = tracker.advance(summary.frames) {
            failure = Some(error);
            return false;
        }
        summary.frames += 1;

        let mut events = std::mem::take(&mut pending);
        if input.restart {
            info!("restarting after {:?}", scene.transition);
            world::apply(world, Command::ResetSession, &mut events);
            body = Body::default();
            summary.restarts += 1;
        }
        world::apply(world, Command::Tick { dt }, &mut events);
        world::apply(
            world,
            Command::SubmitMovementIntent {
                intent: input.movement,
            },
            &mut events,
        );
        let player = query::player(world);
        if query::is_paused(world) {
            body.halt();
        } else if player.movement_enabled {
            let position = body.step(player.position, player.intent, query::maze(world), dt);
            world::apply(world, Command::SyncPlayerPosition { position }, &mut events);
            if query::enemy(world).is_some_and(|enemy| touches_enemy(position, enemy.position)) {
                world::apply(world, Command::ReportEnemyContact, &mut events);
            }
        }

        let sample = mailbox.latest();
        let mut commands = Vec::new();
        {
            let view = EncounterView::from_world(world);
            encounter.handle(&events, sample, &view, &mut *rng, &mut commands);
        }
        if encounter.is_paused() {
            summary.paused_frames += 1;
        }

        let player = query::player(world);
        let enemy = query::enemy(world);
        match heartbeat.handle(&events, &player, enemy.as_ref()) {
            HeartbeatCue::Started { rate } | HeartbeatCue::Beating { rate } => {
                let peak = summary.peak_heartbeat.get_or_insert(rate);
                *peak = peak.max(rate);
            }
            HeartbeatCue::Stopped => debug!("heartbeat faded out"),
            HeartbeatCue::Silent => {}
        }

        summary.teleports += count_teleports(&events);
        scene.apply_events(&events);
        scene.sync_player(&player);

        for command in commands {
            world::apply(world, command, &mut pending);
        }

        scene.transition.is_none()
    });

    tracker.finish()?;
    if let Some(error) = failure {
        return Err(error);
    }
    let mut scene = scene?;

    // Events produced by the last frame's commands.
    summary.teleports += count_teleports(&pending);
    scene.apply_events(&pending);

    if let Some(transition) = scene.transition {
        info!("session ended with {transition:?}");
    } else if summary.frames > 0 && query::outcome(world).is_none() {
        warn!("session stopped after {} frames without an outcome", summary.frames);
    }

    summary.elapsed = query::elapsed(world);
    summary.outcome = query::outcome(world);
    summary.accepted_blinks = query::accepted_blinks(world);
    summary.transition = scene.transition;
    Ok(summary)
}

fn count_teleports(events: &[Event]) -> u32 {
    let count = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::EnemySpawned { .. } | Event::EnemyTeleported { .. }
            )
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
