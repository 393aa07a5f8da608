// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::midi::DEFAULT_PITCH_WHEEL_RANGE;

/// Default number of voices.
pub const DEFAULT_POLYPHONY: usize = 64;

/// A YAML representation of the voice manager configuration.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
pub struct ManagerConfig {
    /// The fixed number of voices.
    #[serde(default = "default_polyphony")]
    polyphony: usize,

    /// Pitch wheel range in semitones. 2 for plain MIDI, 48 for most MPE.
    #[serde(default = "default_pitch_wheel_range")]
    pitch_wheel_range: f64,
}

fn default_polyphony() -> usize {
    DEFAULT_POLYPHONY
}

fn default_pitch_wheel_range() -> f64 {
    DEFAULT_PITCH_WHEEL_RANGE
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            polyphony: DEFAULT_POLYPHONY,
            pitch_wheel_range: DEFAULT_PITCH_WHEEL_RANGE,
        }
    }
}

impl ManagerConfig {
    /// Creates a new, validated configuration.
    pub fn new(polyphony: usize, pitch_wheel_range: f64) -> Result<Self, ConfigError> {
        let config = Self {
            polyphony,
            pitch_wheel_range,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration file.
    pub fn deserialize(path: &Path) -> Result<ManagerConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<ManagerConfig>()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a voice manager cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polyphony == 0 {
            return Err(ConfigError::InvalidPolyphony);
        }
        if !(self.pitch_wheel_range.is_finite() && self.pitch_wheel_range > 0.0) {
            return Err(ConfigError::InvalidPitchWheelRange(self.pitch_wheel_range));
        }
        Ok(())
    }

    /// Gets the number of voices.
    pub fn polyphony(&self) -> usize {
        self.polyphony
    }

    /// Gets the pitch wheel range in semitones.
    pub fn pitch_wheel_range(&self) -> f64 {
        self.pitch_wheel_range
    }
}
