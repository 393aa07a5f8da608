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

//! Note and voice lifecycle management for polyphonic audio plugins.
//!
//! A [`VoiceManager`] turns an interleaved stream of structured note events,
//! note expressions and raw MIDI into render tasks: one voice, one sample
//! range, one lifecycle state. It steals voices when full and never allocates
//! after construction.

pub mod config;
pub mod event;
pub mod expression;
pub mod midi;
pub mod render;
pub mod util;
pub mod voices;

pub use event::{Event, ExpressionEvent, MidiEvent, NoteEvent};
pub use expression::{ChannelExpressions, Expression, ExpressionValues, NoteMod};
pub use voices::{
    DiscardNoteEnds, Note, NoteDraft, NoteEnd, NoteEndSink, NoteId, NotePattern, NoteState,
    ReleaseDraft, Task, VoiceManager,
};
