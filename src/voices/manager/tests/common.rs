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
use std::collections::HashSet;

use crate::event::{Event, ExpressionEvent, MidiEvent, NoteEvent};
use crate::expression::Expression;
use crate::voices::{Note, NoteEnd, NoteId, NoteState, Task, VoiceManager};

pub(crate) fn note_on(time: u32, note_id: i32, key: u8) -> Event {
    Event::NoteOn(NoteEvent::new(
        time,
        Some(NoteId::new(note_id)),
        0,
        0,
        key,
        1.0,
    ))
}

pub(crate) fn note_off(time: u32, note_id: i32, key: u8) -> Event {
    Event::NoteOff(NoteEvent::new(
        time,
        Some(NoteId::new(note_id)),
        0,
        0,
        key,
        0.0,
    ))
}

/// A note off with every address component left open.
pub(crate) fn release_all(time: u32) -> Event {
    Event::NoteOff(NoteEvent {
        time,
        note_id: None,
        port: None,
        channel: None,
        key: None,
        velocity: 0.0,
    })
}

pub(crate) fn expression(
    time: u32,
    expression: Expression,
    value: f64,
    note_id: Option<i32>,
    channel: Option<u8>,
) -> Event {
    Event::NoteExpression(ExpressionEvent {
        time,
        expression,
        value,
        note_id: note_id.map(NoteId::new),
        port: None,
        channel,
        key: None,
    })
}

pub(crate) fn midi(time: u32, data: [u8; 3]) -> Event {
    Event::Midi(MidiEvent::new(time, 0, data))
}

/// Runs an event through the manager and copies out the resulting tasks.
pub(crate) fn play(manager: &mut VoiceManager, event: Event, ends: &mut Vec<NoteEnd>) -> Vec<Task> {
    manager.process_event(&event, ends).to_vec()
}

/// Note ID, state and range of each task, for compact assertions.
pub(crate) fn summarize(tasks: &[Task]) -> Vec<(i32, NoteState, u32, u32)> {
    tasks
        .iter()
        .map(|task| {
            (
                task.note().note_id.value(),
                task.state(),
                task.process_from(),
                task.process_to(),
            )
        })
        .collect()
}

pub(crate) fn find_note(manager: &VoiceManager, note_id: i32) -> Option<Note> {
    manager
        .active_notes()
        .find(|note| note.note_id == NoteId::new(note_id))
        .copied()
}

/// Checks that every voice is either free or holds a note, never both, and
/// that each note sits on the voice it names.
pub(crate) fn assert_voice_invariants(manager: &VoiceManager) {
    let free: HashSet<usize> = manager.free.iter().copied().collect();
    assert_eq!(free.len(), manager.free.len(), "duplicate free voices");

    for (index, slot) in manager.voices.iter().enumerate() {
        match slot {
            Some(note) => {
                assert_eq!(note.voice_index, index);
                assert!(!free.contains(&index), "voice {} is free and active", index);
            }
            None => assert!(free.contains(&index), "voice {} was lost", index),
        }
    }
    assert_eq!(
        manager.active_count() + manager.free_voice_count(),
        manager.polyphony()
    );
}
