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
use std::fmt;

use tracing::{debug, trace};

use super::note::{Note, NoteDraft, NoteId, NotePattern, NoteState, ReleaseDraft};
use super::sink::{NoteEnd, NoteEndSink};
use super::task::Task;
use crate::config::manager::ManagerConfig;
use crate::event::Event;
use crate::expression::{ChannelExpressions, ExpressionValues, NoteMod};
use crate::midi::{self, MidiAction, DEFAULT_PITCH_WHEEL_RANGE};

/// Generated note IDs count up from here and are emitted negated.
const FIRST_INTERNAL_ID: u32 = 2;
/// Generated IDs wrap before reaching the sign bit.
const INTERNAL_ID_LIMIT: u32 = 0x7FFF_FFFF;

/// Tracks active notes across a fixed pool of voices and turns events into
/// render tasks.
///
/// All storage is reserved at construction. Every operation after that is
/// allocation free, lock free and bounded by the polyphony, so it can run
/// inside an audio callback. The returned task slices are only valid until
/// the next call.
pub struct VoiceManager {
    /// Notes indexed by voice. A slot is `Some` exactly when its index is
    /// not in `free`.
    voices: Vec<Option<Note>>,
    /// Free voice indices, used as a stack.
    free: Vec<usize>,
    tasks: Vec<Task>,
    channel_expressions: ChannelExpressions,
    pitch_wheel_range: f64,
    next_internal_id: u32,
}

impl VoiceManager {
    /// Creates a manager with the default pitch wheel range.
    ///
    /// # Panics
    ///
    /// Panics if `polyphony` is zero.
    pub fn new(polyphony: usize) -> Self {
        Self::with_pitch_wheel_range(polyphony, DEFAULT_PITCH_WHEEL_RANGE)
    }

    /// Creates a manager with a pitch wheel range in semitones.
    ///
    /// # Panics
    ///
    /// Panics if `polyphony` is zero.
    pub fn with_pitch_wheel_range(polyphony: usize, pitch_wheel_range: f64) -> Self {
        assert!(polyphony > 0, "polyphony must be at least 1");
        let mut manager = Self {
            voices: vec![None; polyphony],
            free: Vec::with_capacity(polyphony),
            tasks: Vec::with_capacity(polyphony),
            channel_expressions: ChannelExpressions::default(),
            pitch_wheel_range,
            next_internal_id: FIRST_INTERNAL_ID,
        };
        manager.reset();
        manager
    }

    /// Creates a manager from a validated configuration.
    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::with_pitch_wheel_range(config.polyphony(), config.pitch_wheel_range())
    }

    /// The fixed number of voices.
    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    pub fn pitch_wheel_range(&self) -> f64 {
        self.pitch_wheel_range
    }

    pub fn set_pitch_wheel_range(&mut self, semitones: f64) {
        self.pitch_wheel_range = semitones;
    }

    /// Iterates over active notes in voice order.
    pub fn active_notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.voices.iter().flatten()
    }

    pub fn active_count(&self) -> usize {
        self.polyphony() - self.free.len()
    }

    pub fn free_voice_count(&self) -> usize {
        self.free.len()
    }

    /// Cached channel-wide expression values.
    pub fn channel_expressions(&self) -> &ChannelExpressions {
        &self.channel_expressions
    }

    /// Drops every note and cached expression and refills the voice pool.
    /// Call on stream reset or deactivation.
    pub fn reset(&mut self) {
        self.voices.fill(None);
        self.tasks.clear();
        self.channel_expressions.reset();
        self.free.clear();
        // Reversed so voice 0 is handed out first.
        self.free.extend((0..self.voices.len()).rev());
        debug!(polyphony = self.voices.len(), "Voice manager reset");
    }

    /// Rewinds every note to the start of a new block.
    pub fn start_block(&mut self) {
        self.tasks.clear();
        for note in self.voices.iter_mut().flatten() {
            note.process_from = 0;
            note.process_to = 0;
        }
    }

    /// Emits a task for every note up to `frames` and settles edge states.
    /// Use at the end of a block, or mid-block before a change that affects
    /// every note.
    pub fn process_to(&mut self, frames: u32) -> &[Task] {
        self.tasks.clear();
        for note in self.voices.iter_mut().flatten() {
            if note.process_from < frames {
                note.process_to = frames;
                self.tasks.push(Task::new(*note));
                note.age += u64::from(frames - note.process_from);
                note.process_from = frames;
                note.state = note.state.settled();
            }
        }
        &self.tasks
    }

    /// Classifies an event as a note start, without committing it.
    ///
    /// A structured note-on without a port or channel lives on port 0 and
    /// channel 0 for matching, but never picks up cached channel
    /// expressions.
    pub fn would_start(&self, event: &Event) -> Option<NoteDraft> {
        match event {
            Event::NoteOn(e) => {
                let key = e.key?;
                let mut draft = self.draft(
                    e.time,
                    e.note_id,
                    e.port.unwrap_or_default(),
                    e.channel.unwrap_or_default(),
                    key,
                    e.velocity,
                );
                // Cached channel expressions only apply to a definite channel.
                if e.channel.is_none() {
                    draft.expressions = ExpressionValues::default();
                }
                Some(draft)
            }
            Event::Midi(e) => match midi::translate(&e.data, self.pitch_wheel_range)? {
                (channel, MidiAction::NoteOn { key, velocity }) => {
                    Some(self.draft(e.time, None, e.port, channel, key, velocity))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Classifies an event as a release, without committing it.
    pub fn would_release(&self, event: &Event) -> Option<ReleaseDraft> {
        match event {
            Event::NoteOff(e) | Event::NoteChoke(e) => Some(ReleaseDraft {
                time: e.time,
                velocity: e.velocity,
                pattern: e.pattern(),
            }),
            Event::Midi(e) => match midi::translate(&e.data, self.pitch_wheel_range)? {
                (channel, MidiAction::NoteOff { key, velocity }) => Some(ReleaseDraft {
                    time: e.time,
                    velocity,
                    pattern: NotePattern {
                        note_id: None,
                        port: Some(e.port),
                        channel: Some(channel),
                        key: Some(key),
                    },
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// Classifies an event as an expression update, without committing it.
    pub fn would_modify(&self, event: &Event) -> Option<NoteMod> {
        match event {
            Event::NoteExpression(e) => Some(NoteMod {
                time: e.time,
                expression: e.expression,
                value: e.value,
                pattern: e.pattern(),
            }),
            Event::Midi(e) => match midi::translate(&e.data, self.pitch_wheel_range)? {
                (
                    channel,
                    MidiAction::Expression {
                        expression,
                        value,
                        key,
                    },
                ) => Some(NoteMod {
                    time: e.time,
                    expression,
                    value,
                    pattern: NotePattern {
                        note_id: None,
                        port: Some(e.port),
                        channel: Some(channel),
                        key,
                    },
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// Starts, releases or modifies notes as the event requires.
    pub fn process_event<S>(&mut self, event: &Event, sink: &mut S) -> &[Task]
    where
        S: NoteEndSink + ?Sized,
    {
        if let Some(draft) = self.would_start(event) {
            return self.start(&draft, sink);
        }
        if let Some(release) = self.would_release(event) {
            return self.release(&release);
        }
        if let Some(note_mod) = self.would_modify(event) {
            return self.modify(&note_mod);
        }
        self.tasks.clear();
        &self.tasks
    }

    /// Declines a drafted note. The host is still told its ID has ended.
    pub fn ignore<S>(&self, draft: &NoteDraft, sink: &mut S)
    where
        S: NoteEndSink + ?Sized,
    {
        if let Some(note_id) = draft.note_id.filter(NoteId::is_host) {
            sink.note_end(NoteEnd {
                time: draft.time,
                note_id,
                port: draft.port,
                channel: draft.channel,
                key: draft.key,
            });
        }
    }

    /// Starts a new note on a free voice, stealing one if none are free. The
    /// returned tasks hold the stolen note's `Kill` task, if any.
    pub fn start<S>(&mut self, draft: &NoteDraft, sink: &mut S) -> &[Task]
    where
        S: NoteEndSink + ?Sized,
    {
        self.tasks.clear();
        if self.free.is_empty() {
            self.steal(draft.time, sink);
        }
        let Some(voice_index) = self.free.pop() else {
            return &self.tasks;
        };
        let note_id = match draft.note_id {
            Some(note_id) => note_id,
            None => self.next_note_id(),
        };
        self.voices[voice_index] = Some(Note::new(voice_index, note_id, draft));
        &self.tasks
    }

    /// Retriggers `target` in place with the drafted note, keeping its voice.
    pub fn legato<S>(&mut self, draft: &NoteDraft, target: &Note, sink: &mut S) -> &[Task]
    where
        S: NoteEndSink + ?Sized,
    {
        self.tasks.clear();
        let note_id = match draft.note_id {
            Some(note_id) => note_id,
            None => self.next_note_id(),
        };
        let Some(note) = live_note(&mut self.voices, target) else {
            trace!(note_id = %target.note_id, "Legato target is no longer active");
            return &self.tasks;
        };

        add_task(&mut self.tasks, note, draft.time, false);
        // The old ID is finished as far as the host is concerned.
        send_note_end(note, sink);

        let mut retriggered = Note::new(note.voice_index, note_id, draft);
        retriggered.state = NoteState::Legato;
        retriggered.process_from = note.process_from;
        retriggered.process_to = note.process_from;
        *note = retriggered;
        &self.tasks
    }

    /// Releases every note the draft matches, at the draft's own time.
    pub fn release(&mut self, draft: &ReleaseDraft) -> &[Task] {
        self.release_at(draft, draft.time)
    }

    /// Releases every note the draft matches at `time`. A draft with a
    /// definite note ID releases at most one note.
    pub fn release_at(&mut self, draft: &ReleaseDraft, time: u32) -> &[Task] {
        self.tasks.clear();
        for note in self.voices.iter_mut().flatten() {
            if draft.pattern.matches(note) {
                add_task(&mut self.tasks, note, time, false);
                note.state = NoteState::Up;
                note.velocity = draft.velocity;
                note.age = 0;
                if draft.pattern.is_exact() {
                    break;
                }
            }
        }
        &self.tasks
    }

    /// Applies an expression update at its own time.
    pub fn modify(&mut self, note_mod: &NoteMod) -> &[Task] {
        self.modify_at(note_mod, note_mod.time)
    }

    /// Applies an expression update to every matching note at `time`.
    /// Channel-wide updates are also cached for notes started later.
    pub fn modify_at(&mut self, note_mod: &NoteMod, time: u32) -> &[Task] {
        self.tasks.clear();
        self.channel_expressions.record(note_mod);
        for note in self.voices.iter_mut().flatten() {
            if note_mod.pattern.matches(note) {
                add_task(&mut self.tasks, note, time, true);
                note_mod.apply_to(note);
                if note_mod.pattern.is_exact() {
                    break;
                }
            }
        }
        &self.tasks
    }

    /// Frees the note's voice. The renderer calls this once a released
    /// note has gone silent. Stale notes (already stopped or stolen) are
    /// ignored.
    pub fn stop<S>(&mut self, note: &Note, sink: &mut S)
    where
        S: NoteEndSink + ?Sized,
    {
        if live_note(&mut self.voices, note).is_none() {
            trace!(
                note_id = %note.note_id,
                voice = note.voice_index,
                "Ignoring stop for inactive note"
            );
            return;
        }
        self.free_voice(note.voice_index, sink);
    }

    fn draft(
        &self,
        time: u32,
        note_id: Option<NoteId>,
        port: u16,
        channel: u8,
        key: u8,
        velocity: f64,
    ) -> NoteDraft {
        NoteDraft {
            time,
            note_id,
            port,
            channel,
            key,
            velocity,
            expressions: self
                .channel_expressions
                .get(channel)
                .copied()
                .unwrap_or_default(),
        }
    }

    /// Kills the cheapest note, ending its task at `time`.
    fn steal<S>(&mut self, time: u32, sink: &mut S)
    where
        S: NoteEndSink + ?Sized,
    {
        let mut victim: Option<(usize, f32)> = None;
        for note in self.voices.iter().flatten() {
            let cost = note.kill_cost();
            if victim.map_or(true, |(_, best)| cost < best) {
                victim = Some((note.voice_index, cost));
            }
        }
        let Some((voice_index, cost)) = victim else {
            return;
        };

        if let Some(note) = self.voices[voice_index].as_mut() {
            note.state = NoteState::Kill;
            note.process_to = time.max(note.process_from);
            // Pushed even when zero length.
            self.tasks.push(Task::new(*note));
            debug!(
                voice = voice_index,
                note_id = %note.note_id,
                cost,
                "Voice limit reached, stealing"
            );
        }
        self.free_voice(voice_index, sink);
    }

    fn free_voice<S>(&mut self, voice_index: usize, sink: &mut S)
    where
        S: NoteEndSink + ?Sized,
    {
        if let Some(note) = self.voices[voice_index].take() {
            send_note_end(&note, sink);
            self.free.push(voice_index);
        }
    }

    fn next_note_id(&mut self) -> NoteId {
        let note_id = NoteId::internal(self.next_internal_id);
        self.next_internal_id += 1;
        if self.next_internal_id >= INTERNAL_ID_LIMIT {
            self.next_internal_id = FIRST_INTERNAL_ID;
        }
        note_id
    }
}

/// The live note on `note`'s voice, if it is still the same note.
fn live_note<'a>(voices: &'a mut [Option<Note>], note: &Note) -> Option<&'a mut Note> {
    voices
        .get_mut(note.voice_index)
        .and_then(Option::as_mut)
        .filter(|live| live.note_id == note.note_id)
}

/// Closes out the note's pending range as a task ending at `to`.
///
/// Zero-length tasks are skipped for steady states, and for pure expression
/// updates whatever the state, since neither carries a transition.
fn add_task(tasks: &mut Vec<Task>, note: &mut Note, to: u32, expression_only: bool) {
    let to = to.max(note.process_from);
    if to == note.process_from && (expression_only || note.state.is_steady()) {
        return;
    }
    note.process_to = to;
    tasks.push(Task::new(*note));
    note.age += u64::from(to - note.process_from);
    note.process_from = to;
}

fn send_note_end<S>(note: &Note, sink: &mut S)
where
    S: NoteEndSink + ?Sized,
{
    if note.note_id.is_host() {
        sink.note_end(NoteEnd {
            time: note.process_to,
            note_id: note.note_id,
            port: note.port,
            channel: note.channel,
            key: note.base_key,
        });
    }
}

impl fmt::Debug for VoiceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceManager")
            .field("active_voices", &self.active_count())
            .field("polyphony", &self.polyphony())
            .field("pitch_wheel_range", &self.pitch_wheel_range)
            .finish()
    }
}
