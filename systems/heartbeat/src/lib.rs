#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Proximity heartbeat that speeds up as the enemy closes in.

use dont_blink_core::{EnemySnapshot, Event, PlayerSnapshot};
use log::debug;

/// Default distance within which the heartbeat is audible.
pub const DEFAULT_MAX_DISTANCE: f32 = 550.0;
/// Default playback rate at the edge of the audible range.
pub const DEFAULT_MIN_RATE: f32 = 2.0;
/// Default playback rate when the enemy stands on the player.
pub const DEFAULT_MAX_RATE: f32 = 5.0;

/// Configuration parameters required to construct the heartbeat system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    max_distance: f32,
    min_rate: f32,
    max_rate: f32,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(max_distance: f32, min_rate: f32, max_rate: f32) -> Self {
        Self {
            max_distance,
            min_rate,
            max_rate,
        }
    }

    /// Distance within which the heartbeat is audible until an enemy reports
    /// its kill radius.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Slowest playback rate.
    #[must_use]
    pub const fn min_rate(&self) -> f32 {
        self.min_rate
    }

    /// Fastest playback rate.
    #[must_use]
    pub const fn max_rate(&self) -> f32 {
        self.max_rate
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE, DEFAULT_MIN_RATE, DEFAULT_MAX_RATE)
    }
}

/// Instruction for the audio adapter produced once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeartbeatCue {
    /// Nothing is playing and nothing should start.
    Silent,
    /// Playback should start at the provided rate.
    Started {
        /// Playback rate multiplier.
        rate: f32,
    },
    /// Playback continues at the provided rate.
    Beating {
        /// Playback rate multiplier.
        rate: f32,
    },
    /// Playback should stop.
    Stopped,
}

/// Pure system translating enemy proximity into heartbeat cues.
#[derive(Debug)]
pub struct Heartbeat {
    config: Config,
    max_distance: f32,
    playing: bool,
    silenced: bool,
}

impl Heartbeat {
    /// Creates a new heartbeat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            max_distance: config.max_distance,
            playing: false,
            silenced: false,
        }
    }

    /// Distance within which the heartbeat is currently audible.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Reports whether playback is running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playback rate for the provided distance, or `None` when out of range.
    ///
    /// The boundary distance is still audible.
    #[must_use]
    pub fn rate_at(&self, distance: f32) -> Option<f32> {
        if distance > self.max_distance {
            return None;
        }
        let normalized = if self.max_distance > 0.0 {
            (distance / self.max_distance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let span = self.config.max_rate - self.config.min_rate;
        Some(self.config.max_rate - normalized * span)
    }

    /// Consumes world events and snapshots to produce this frame's cue.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        enemy: Option<&EnemySnapshot>,
    ) -> HeartbeatCue {
        for event in events {
            match event {
                Event::EnemySpawned { kill_radius, .. } => self.max_distance = *kill_radius,
                Event::PlayerKilled | Event::PlayerWon => self.silenced = true,
                Event::SessionReset => {
                    self.silenced = false;
                    self.max_distance = self.config.max_distance;
                }
                _ => {}
            }
        }

        let rate = if self.silenced {
            None
        } else {
            enemy.and_then(|enemy| self.rate_at(enemy.position.distance(player.position)))
        };

        match (self.playing, rate) {
            (false, None) => HeartbeatCue::Silent,
            (false, Some(rate)) => {
                debug!("heartbeat started at rate {rate:.2}");
                self.playing = true;
                HeartbeatCue::Started { rate }
            }
            (true, Some(rate)) => HeartbeatCue::Beating { rate },
            (true, None) => {
                debug!("heartbeat stopped");
                self.playing = false;
                HeartbeatCue::Stopped
            }
        }
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_spans_the_configured_bounds() {
        let heartbeat = Heartbeat::default();
        assert_eq!(heartbeat.rate_at(0.0), Some(DEFAULT_MAX_RATE));
        assert_eq!(heartbeat.rate_at(550.0), Some(DEFAULT_MIN_RATE));
        assert_eq!(heartbeat.rate_at(275.0), Some(3.5));
        assert_eq!(heartbeat.rate_at(550.5), None);
    }

    #[test]
    fn zero_range_only_hears_contact() {
        let heartbeat = Heartbeat::new(Config::new(0.0, 1.0, 4.0));
        assert_eq!(heartbeat.rate_at(0.0), Some(4.0));
        assert_eq!(heartbeat.rate_at(0.1), None);
    }
}
