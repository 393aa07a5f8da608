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

use std::ops::Range;

use super::note::{Note, NoteState};

/// An instruction to render one voice over `[process_from, process_to)` in a
/// single lifecycle state. Zero-length tasks are meaningful for edge states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Task {
    note: Note,
}

impl Task {
    pub(crate) fn new(note: Note) -> Self {
        Self { note }
    }

    /// The note as it was when the task was emitted. Pass this to
    /// [`VoiceManager::stop`](super::VoiceManager::stop) once the voice is silent.
    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn voice_index(&self) -> usize {
        self.note.voice_index
    }

    pub fn state(&self) -> NoteState {
        self.note.state
    }

    pub fn process_from(&self) -> u32 {
        self.note.process_from
    }

    pub fn process_to(&self) -> u32 {
        self.note.process_to
    }

    pub fn range(&self) -> Range<u32> {
        self.note.process_from..self.note.process_to
    }

    pub fn len(&self) -> u32 {
        self.note.process_to - self.note.process_from
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
