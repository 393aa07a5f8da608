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

//! Per-note expression values and the updates that change them.

use serde::{Deserialize, Serialize};

use crate::voices::{Note, NotePattern};

/// Number of MIDI 1.0 channels whose expression state is cached.
pub const MIDI_CHANNELS: usize = 16;

/// The kinds of per-note expression a note carries.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Linear gain, 1.0 is unity.
    Volume,
    /// 0.0 is hard left, 1.0 is hard right.
    Pan,
    /// Offset from the base key in semitones.
    Tuning,
    /// Vibrato depth (MIDI CC1).
    Modulation,
    Expression,
    Brightness,
    Pressure,
}

/// A full set of expression values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpressionValues {
    pub volume: f64,
    pub pan: f64,
    pub tuning: f64,
    pub modulation: f64,
    pub expression: f64,
    pub brightness: f64,
    pub pressure: f64,
}

impl Default for ExpressionValues {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.5,
            tuning: 0.0,
            modulation: 0.0,
            expression: 1.0,
            brightness: 0.5,
            pressure: 1.0,
        }
    }
}

impl ExpressionValues {
    /// Gets a single expression value.
    pub fn get(&self, expression: Expression) -> f64 {
        match expression {
            Expression::Volume => self.volume,
            Expression::Pan => self.pan,
            Expression::Tuning => self.tuning,
            Expression::Modulation => self.modulation,
            Expression::Expression => self.expression,
            Expression::Brightness => self.brightness,
            Expression::Pressure => self.pressure,
        }
    }

    /// Sets a single expression value.
    pub fn set(&mut self, expression: Expression, value: f64) {
        let slot = match expression {
            Expression::Volume => &mut self.volume,
            Expression::Pan => &mut self.pan,
            Expression::Tuning => &mut self.tuning,
            Expression::Modulation => &mut self.modulation,
            Expression::Expression => &mut self.expression,
            Expression::Brightness => &mut self.brightness,
            Expression::Pressure => &mut self.pressure,
        };
        *slot = value;
    }
}

/// Channel-wide expression values, remembered so that notes starting after
/// a channel message (common with MPE controllers) pick them up.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelExpressions {
    channels: [ExpressionValues; MIDI_CHANNELS],
}

impl Default for ChannelExpressions {
    fn default() -> Self {
        Self {
            channels: [ExpressionValues::default(); MIDI_CHANNELS],
        }
    }
}

impl ChannelExpressions {
    /// Restores every channel to the default values.
    pub fn reset(&mut self) {
        self.channels = [ExpressionValues::default(); MIDI_CHANNELS];
    }

    /// Gets the cached values for a channel, if the channel is in range.
    pub fn get(&self, channel: u8) -> Option<&ExpressionValues> {
        self.channels.get(usize::from(channel))
    }

    /// Caches the update if it addresses a whole channel: no note ID, no key,
    /// and a definite MIDI 1.0 channel.
    pub fn record(&mut self, note_mod: &NoteMod) {
        let pattern = &note_mod.pattern;
        if pattern.note_id.is_some() || pattern.key.is_some() {
            return;
        }
        if let Some(values) = pattern
            .channel
            .and_then(|channel| self.channels.get_mut(usize::from(channel)))
        {
            values.set(note_mod.expression, note_mod.value);
        }
    }
}

/// A transient expression update, applied to every note its pattern matches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteMod {
    pub time: u32,
    pub expression: Expression,
    pub value: f64,
    pub pattern: NotePattern,
}

impl NoteMod {
    /// Applies the update to a note.
    pub fn apply_to(&self, note: &mut Note) {
        match self.expression {
            Expression::Tuning => note.key = f64::from(note.base_key) + self.value,
            Expression::Volume => note.volume = self.value,
            Expression::Pan => note.pan = self.value,
            Expression::Modulation => note.modulation = self.value,
            Expression::Expression => note.expression = self.value,
            Expression::Brightness => note.brightness = self.value,
            Expression::Pressure => note.pressure = self.value,
        }
    }
}
