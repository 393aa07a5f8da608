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

//! Incoming events, in both of the dialects a plugin host can deliver.
//!
//! Structured note events carry stable note IDs and may leave any address
//! component unspecified. Raw MIDI events carry only the bytes of a channel
//! message and are resolved structurally by port, channel and key.

use crate::expression::Expression;
use crate::voices::{NoteId, NotePattern};

/// An event delivered to the voice manager, timestamped in samples from the
/// start of the current block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// A structured note-on.
    NoteOn(NoteEvent),
    /// A structured note-off.
    NoteOff(NoteEvent),
    /// A structured choke. Classified the same way as a note-off.
    NoteChoke(NoteEvent),
    /// A per-note expression update.
    NoteExpression(ExpressionEvent),
    /// A raw MIDI 1.0 channel message.
    Midi(MidiEvent),
}

impl Event {
    /// The sample offset of this event within its block.
    pub fn time(&self) -> u32 {
        match self {
            Event::NoteOn(e) | Event::NoteOff(e) | Event::NoteChoke(e) => e.time,
            Event::NoteExpression(e) => e.time,
            Event::Midi(e) => e.time,
        }
    }
}

/// A structured note event. Any address field may be `None` (a wildcard).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    pub time: u32,
    pub note_id: Option<NoteId>,
    pub port: Option<u16>,
    pub channel: Option<u8>,
    pub key: Option<u8>,
    /// Normalized velocity, 0.0 to 1.0.
    pub velocity: f64,
}

impl NoteEvent {
    /// Creates a fully addressed note event.
    pub fn new(
        time: u32,
        note_id: Option<NoteId>,
        port: u16,
        channel: u8,
        key: u8,
        velocity: f64,
    ) -> Self {
        Self {
            time,
            note_id,
            port: Some(port),
            channel: Some(channel),
            key: Some(key),
            velocity,
        }
    }

    /// The address pattern described by this event.
    pub fn pattern(&self) -> NotePattern {
        NotePattern {
            note_id: self.note_id,
            port: self.port,
            channel: self.channel,
            key: self.key,
        }
    }
}

/// A structured per-note expression event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpressionEvent {
    pub time: u32,
    pub expression: Expression,
    pub value: f64,
    pub note_id: Option<NoteId>,
    pub port: Option<u16>,
    pub channel: Option<u8>,
    pub key: Option<u8>,
}

impl ExpressionEvent {
    /// The address pattern described by this event.
    pub fn pattern(&self) -> NotePattern {
        NotePattern {
            note_id: self.note_id,
            port: self.port,
            channel: self.channel,
            key: self.key,
        }
    }
}

/// A raw MIDI channel message. Bytes past the message length are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    pub time: u32,
    pub port: u16,
    pub data: [u8; 3],
}

impl MidiEvent {
    pub fn new(time: u32, port: u16, data: [u8; 3]) -> Self {
        Self { time, port, data }
    }
}
