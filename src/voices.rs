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

//! Note and voice lifecycle management.
//!
//! Converts timestamped note, expression and MIDI events into per-voice
//! render tasks, with voice stealing and sample-accurate splitting.

mod manager;
mod note;
mod sink;
mod task;

pub use manager::VoiceManager;
pub use note::{Note, NoteDraft, NoteId, NotePattern, NoteState, ReleaseDraft};
pub use sink::{DiscardNoteEnds, NoteEnd, NoteEndSink};
pub use task::Task;
