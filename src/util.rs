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

use crate::voices::{NoteEnd, Task};

/// Formats a task as a single aligned line.
pub fn format_task(block: usize, task: &Task) -> String {
    let note = task.note();
    format!(
        "block {:>4}  voice {:>3}  note {:>11}  {:<8}  [{:>5}, {:>5})  key {:>6.2}  vel {:.2}",
        block,
        task.voice_index(),
        note.note_id,
        task.state(),
        task.process_from(),
        task.process_to(),
        note.key,
        note.velocity,
    )
}

/// Formats a note-ended notification as a single line.
pub fn format_note_end(block: usize, end: &NoteEnd) -> String {
    format!(
        "block {:>4}  end   note {:>11}  at {:>5}  port {} channel {} key {}",
        block, end.note_id, end.time, end.port, end.channel, end.key,
    )
}
