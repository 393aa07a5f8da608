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

use super::note::NoteId;

/// Tells the host a note ID is no longer live, so it can release any
/// per-note modulation bound to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEnd {
    pub time: u32,
    pub note_id: NoteId,
    pub port: u16,
    pub channel: u8,
    pub key: u8,
}

/// Receives note-ended notifications. Implementations are called from the
/// audio thread and should not block.
pub trait NoteEndSink {
    fn note_end(&mut self, end: NoteEnd);
}

/// Collects notifications. Reserve capacity up front to stay allocation free.
impl NoteEndSink for Vec<NoteEnd> {
    fn note_end(&mut self, end: NoteEnd) {
        self.push(end);
    }
}

/// Drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardNoteEnds;

impl NoteEndSink for DiscardNoteEnds {
    fn note_end(&mut self, _end: NoteEnd) {}
}
