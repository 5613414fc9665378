//! Optional TOML tuning file layered over the built-in defaults.
//!
//! ```toml
//! [encounter]
//! blink_cooldown_ms = 400
//!
//! [heartbeat]
//! max_rate = 6.0
//! ```

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use dont_blink_system_encounter::Config as EncounterConfig;
use dont_blink_system_heartbeat::Config as HeartbeatConfig;
use serde::Deserialize;

/// Tuning overrides; every field left out keeps its default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Tuning {
    encounter: EncounterTuning,
    heartbeat: HeartbeatTuning,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EncounterTuning {
    blink_cooldown_ms: Option<u64>,
    blink_poll_interval_ms: Option<u64>,
    win_trigger_distance: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HeartbeatTuning {
    max_distance: Option<f32>,
    min_rate: Option<f32>,
    max_rate: Option<f32>,
}

impl Tuning {
    /// Reads and parses a tuning file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid tuning file at {}", path.display()))
    }

    /// Parses tuning overrides from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse tuning toml contents")
    }

    /// Encounter configuration with the overrides applied.
    pub(crate) fn encounter_config(&self) -> EncounterConfig {
        let defaults = EncounterConfig::default();
        let tuning = &self.encounter;
        EncounterConfig::new(
            tuning
                .blink_cooldown_ms
                .map_or(defaults.blink_cooldown(), Duration::from_millis),
            tuning
                .blink_poll_interval_ms
                .map_or(defaults.blink_poll_interval(), Duration::from_millis),
            tuning
                .win_trigger_distance
                .unwrap_or(defaults.win_trigger_distance()),
        )
    }

    /// Heartbeat configuration with the overrides applied.
    pub(crate) fn heartbeat_config(&self) -> HeartbeatConfig {
        let defaults = HeartbeatConfig::default();
        let tuning = &self.heartbeat;
        HeartbeatConfig::new(
            tuning.max_distance.unwrap_or(defaults.max_distance()),
            tuning.min_rate.unwrap_or(defaults.min_rate()),
            tuning.max_rate.unwrap_or(defaults.max_rate()),
        )
    }
}
