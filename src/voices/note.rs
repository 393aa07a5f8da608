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

//! Notes, their lifecycle states, and the patterns that address them.

use std::fmt;

use crate::expression::ExpressionValues;

/// Identifies one note instance. Host-supplied IDs are non-negative; IDs the
/// manager generates for notes without one are negative, so the two can
/// never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(i32);

impl NoteId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Builds a generated ID from a positive counter value.
    pub(crate) const fn internal(counter: u32) -> Self {
        Self(-(counter as i32))
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Whether the host knows this ID and should be told when it ends.
    pub fn is_host(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Lifecycle state of a note. The declaration order is significant: voice
/// stealing prefers notes further along it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteState {
    /// Just attacked.
    Down,
    /// Retriggered in place on an existing voice.
    Legato,
    /// Sustaining.
    Continue,
    /// Released during this step.
    Up,
    /// Decaying after release, until the renderer stops it.
    Release,
    /// Being stolen. Always followed immediately by a stop.
    Kill,
}

impl NoteState {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// The state a flush leaves the note in: edge states settle into the
    /// matching steady state.
    pub fn settled(self) -> NoteState {
        match self {
            NoteState::Down | NoteState::Legato => NoteState::Continue,
            NoteState::Up => NoteState::Release,
            other => other,
        }
    }

    /// Steady states, whose zero-length tasks carry nothing.
    pub fn is_steady(self) -> bool {
        matches!(self, NoteState::Continue | NoteState::Release)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteState::Down => "down",
            NoteState::Legato => "legato",
            NoteState::Continue => "continue",
            NoteState::Up => "up",
            NoteState::Release => "release",
            NoteState::Kill => "kill",
        }
    }
}

impl fmt::Display for NoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One live entry in the voice manager.
///
/// `voice_index` is an identity, not a storage position: it is assigned at
/// start, kept through legato, and only returned to the pool on stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub voice_index: usize,
    pub note_id: NoteId,
    pub port: u16,
    pub channel: u8,
    pub base_key: u8,
    /// Current pitch, including any tuning offset.
    pub key: f64,
    pub velocity: f64,
    pub volume: f64,
    pub pan: f64,
    pub modulation: f64,
    pub expression: f64,
    pub brightness: f64,
    pub pressure: f64,
    pub state: NoteState,
    pub process_from: u32,
    pub process_to: u32,
    /// Samples since the last attack, legato retrigger, or release.
    pub(crate) age: u64,
}

impl Note {
    pub(crate) fn new(voice_index: usize, note_id: NoteId, draft: &NoteDraft) -> Self {
        let values = &draft.expressions;
        Self {
            voice_index,
            note_id,
            port: draft.port,
            channel: draft.channel,
            base_key: draft.key,
            key: f64::from(draft.key) + values.tuning,
            velocity: draft.velocity,
            volume: values.volume,
            pan: values.pan,
            modulation: values.modulation,
            expression: values.expression,
            brightness: values.brightness,
            pressure: values.pressure,
            state: NoteState::Down,
            process_from: draft.time,
            process_to: draft.time,
            age: 0,
        }
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Age extrapolated to a time later in the current block.
    pub fn age_at(&self, time: u32) -> u64 {
        self.age + u64::from(time.saturating_sub(self.process_from))
    }

    pub fn released(&self) -> bool {
        matches!(
            self.state,
            NoteState::Up | NoteState::Release | NoteState::Kill
        )
    }

    /// Lower is more killable. Very young notes are protected, and notes
    /// further through their lifecycle go first.
    pub fn kill_cost(&self) -> f32 {
        1.0 / (self.age as f32 + 1.0) + 10.0 - f32::from(self.state.ordinal())
    }
}

/// An address that may leave any component unspecified.
///
/// A definite note ID matches exactly that note, released or not. Without
/// one, every specified component must match and released notes never do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotePattern {
    pub note_id: Option<NoteId>,
    pub port: Option<u16>,
    pub channel: Option<u8>,
    pub key: Option<u8>,
}

impl NotePattern {
    /// Matches every unreleased note.
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches exactly one note instance.
    pub fn exact(note_id: NoteId) -> Self {
        Self {
            note_id: Some(note_id),
            ..Self::default()
        }
    }

    pub fn is_exact(&self) -> bool {
        self.note_id.is_some()
    }

    pub fn matches(&self, note: &Note) -> bool {
        if let Some(id) = self.note_id {
            return note.note_id == id;
        }
        if note.released() {
            return false;
        }
        self.port.map_or(true, |port| port == note.port)
            && self.channel.map_or(true, |channel| channel == note.channel)
            && self.key.map_or(true, |key| key == note.base_key)
    }
}

/// A note that would start, before it has been given a voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteDraft {
    pub time: u32,
    /// `None` when the source carried no ID; one is generated on commit.
    pub note_id: Option<NoteId>,
    pub port: u16,
    pub channel: u8,
    pub key: u8,
    pub velocity: f64,
    /// Starting expression values, seeded from the channel cache.
    pub expressions: ExpressionValues,
}

/// A release that would be applied to every note its pattern matches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReleaseDraft {
    pub time: u32,
    pub velocity: f64,
    pub pattern: NotePattern,
}
