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

//! Offline runner that drives a voice manager from an event script, standing
//! in for a plugin's audio callback and its renderer.

use tracing::{info, warn};

use crate::config::script::Script;
use crate::config::ConfigError;
use crate::event::Event;
use crate::voices::{Note, NoteEnd, NoteEndSink, NoteState, Task, VoiceManager};

/// A task, tagged with the block it was emitted in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedTask {
    pub block: usize,
    pub task: Task,
}

/// A note-ended notification, tagged with the block it was emitted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedNoteEnd {
    pub block: usize,
    pub end: NoteEnd,
}

/// Everything a script produced, in emission order.
#[derive(Debug, Default)]
pub struct Rendering {
    pub tasks: Vec<RenderedTask>,
    pub note_ends: Vec<RenderedNoteEnd>,
}

/// Runs every block of the script through the manager.
///
/// Each block is rewound, fed its events in time order, and flushed to its
/// end. Released notes are stopped once they have rung for the script's
/// release length, as a renderer would once their tails decay.
pub fn render(script: &Script, manager: &mut VoiceManager) -> Result<Rendering, ConfigError> {
    let blocks = script.events()?;
    let frames = script.frames();
    info!(
        blocks = blocks.len(),
        frames,
        polyphony = manager.polyphony(),
        legato = script.legato(),
        "Rendering script"
    );

    let mut rendering = Rendering::default();
    let mut note_ends: Vec<NoteEnd> = Vec::with_capacity(manager.polyphony());
    for (block, mut events) in blocks.into_iter().enumerate() {
        events.sort_by_key(Event::time);
        manager.start_block();

        for event in &events {
            if event.time() >= frames {
                warn!(
                    block,
                    time = event.time(),
                    frames,
                    "Dropping event past the end of its block"
                );
                continue;
            }
            let tasks = dispatch(script, manager, event, &mut note_ends);
            rendering
                .tasks
                .extend(tasks.iter().map(|&task| RenderedTask { block, task }));
        }

        let tasks = manager.process_to(frames);
        rendering
            .tasks
            .extend(tasks.iter().map(|&task| RenderedTask { block, task }));

        stop_decayed(manager, script.release_samples(), &mut note_ends);
        rendering.note_ends.extend(
            note_ends
                .drain(..)
                .map(|end| RenderedNoteEnd { block, end }),
        );
    }

    info!(
        tasks = rendering.tasks.len(),
        note_ends = rendering.note_ends.len(),
        active = manager.active_count(),
        "Script rendered"
    );
    Ok(rendering)
}

/// Routes an event, retriggering the sounding note in legato mode.
fn dispatch<'a, S>(
    script: &Script,
    manager: &'a mut VoiceManager,
    event: &Event,
    sink: &mut S,
) -> &'a [Task]
where
    S: NoteEndSink + ?Sized,
{
    if script.legato() {
        if let Some(draft) = manager.would_start(event) {
            let target = manager
                .active_notes()
                .find(|note| {
                    !note.released() || note.age_at(draft.time) < script.legato_window()
                })
                .copied();
            return match target {
                Some(target) => manager.legato(&draft, &target, sink),
                None => manager.start(&draft, sink),
            };
        }
    }
    manager.process_event(event, sink)
}

fn stop_decayed<S>(manager: &mut VoiceManager, release_samples: u64, sink: &mut S)
where
    S: NoteEndSink + ?Sized,
{
    let decayed: Vec<Note> = manager
        .active_notes()
        .filter(|note| note.state == NoteState::Release && note.age() >= release_samples)
        .copied()
        .collect();
    for note in &decayed {
        manager.stop(note, sink);
    }
}
