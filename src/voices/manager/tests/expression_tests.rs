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
use std::error::Error;

use crate::event::{Event, ExpressionEvent, NoteEvent};
use crate::expression::Expression;
use crate::voices::manager::tests::common::{
    expression, find_note, midi, note_on, play, release_all, summarize,
};
use crate::voices::{NoteId, NoteState, VoiceManager};

#[test]
fn test_zero_length_expression_is_suppressed() -> Result<(), Box<dyn Error>> {
    let mut manager = VoiceManager::new(2);
    let mut ends = Vec::new();
    play(&mut manager, note_on(10, 1, 60), &mut ends);

    // Even a Down note gets no task for an update at its own start time.
    let tasks = play(
        &mut manager,
        expression(10, Expression::Volume, 0.5, Some(1), None),
        &mut ends,
    );
    assert!(tasks.is_empty());
    assert_eq!(find_note(&manager, 1).ok_or("note 1 missing")?.volume, 0.5);

    assert_eq!(
        summarize(&play(
            &mut manager,
            expression(30, Expression::Volume, 0.25, Some(1), None),
            &mut ends,
        )),
        vec![(1, NoteState::Down, 10, 30)]
    );
    assert!(play(
        &mut manager,
        expression(30, Expression::Pan, 0.0, Some(1), None),
        &mut ends,
    )
    .is_empty());

    let note = find_note(&manager, 1).ok_or("note 1 missing")?;
    assert_eq!(note.volume, 0.25);
    assert_eq!(note.pan, 0.0);
    Ok(())
}

#[test]
fn test_expression_splits_the_block() {
    let mut manager = VoiceManager::new(2);
    let mut ends = Vec::new();
    play(&mut manager, note_on(0, 1, 60), &mut ends);
    manager.process_to(100);
    manager.start_block();

    assert_eq!(
        summarize(&play(
            &mut manager,
            expression(25, Expression::Brightness, 0.9, None, None),
            &mut ends,
        )),
        vec![(1, NoteState::Continue, 0, 25)]
    );
    assert_eq!(
        summarize(manager.process_to(100)),
        vec![(1, NoteState::Continue, 25, 100)]
    );
}

#[test]
fn test_tuning_offsets_the_key() -> Result<(), Box<dyn Error>> {
    let mut manager = VoiceManager::new(1);
    let mut ends = Vec::new();
    play(&mut manager, note_on(0, 1, 60), &mut ends);

    play(
        &mut manager,
        expression(5, Expression::Tuning, 0.5, Some(1), None),
        &mut ends,
    );
    play(
        &mut manager,
        expression(6, Expression::Tuning, -1.0, Some(1), None),
        &mut ends,
    );

    let note = find_note(&manager, 1).ok_or("note 1 missing")?;
    assert_eq!(note.base_key, 60);
    assert_eq!(note.key, 59.0);
    Ok(())
}

#[test]
fn test_channel_expression_applies_to_new_notes() -> Result<(), Box<dyn Error>> {
    let mut manager = VoiceManager::new(2);
    let mut ends = Vec::new();

    assert!(play(
        &mut manager,
        expression(0, Expression::Volume, 0.5, None, Some(0)),
        &mut ends,
    )
    .is_empty());
    assert_eq!(
        manager.channel_expressions().get(0).map(|values| values.volume),
        Some(0.5)
    );

    play(&mut manager, note_on(10, 1, 60), &mut ends);
    let event = Event::NoteOn(NoteEvent::new(10, Some(NoteId::new(2)), 0, 1, 60, 1.0));
    play(&mut manager, event, &mut ends);

    assert_eq!(find_note(&manager, 1).ok_or("note 1 missing")?.volume, 0.5);
    assert_eq!(find_note(&manager, 2).ok_or("note 2 missing")?.volume, 1.0);
    Ok(())
}

#[test]
fn test_channel_less_note_skips_channel_expressions() -> Result<(), Box<dyn Error>> {
    let mut manager = VoiceManager::new(2);
    let mut ends = Vec::new();
    play(&mut manager, midi(0, [0xE0, 0x00, 0x60]), &mut ends);

    let event = Event::NoteOn(NoteEvent {
        time: 0,
        note_id: Some(NoteId::new(1)),
        port: None,
        channel: None,
        key: Some(60),
        velocity: 1.0,
    });
    play(&mut manager, event, &mut ends);

    let note = find_note(&manager, 1).ok_or("note 1 missing")?;
    assert_eq!(note.channel, 0);
    assert_eq!(note.key, 60.0);
    Ok(())
}

#[test]
fn test_keyed_expression_is_not_cached() -> Result<(), Box<dyn Error>> {
    let mut manager = VoiceManager::new(2);
    let mut ends = Vec::new();
    let event = Event::NoteExpression(ExpressionEvent {
        time: 0,
        expression: Expression::Pressure,
        value: 0.1,
        note_id: None,
        port: None,
        channel: Some(0),
        key: Some(60),
    });
    play(&mut manager, event, &mut ends);
    play(&mut manager, note_on(0, 1, 60), &mut ends);

    assert_eq!(find_note(&manager, 1).ok_or("note 1 missing")?.pressure, 1.0);
    Ok(())
}

#[test]
fn test_released_notes_skip_wildcard_expressions() -> Result<(), Box<dyn Error>> {
    let mut manager = VoiceManager::new(2);
    let mut ends = Vec::new();
    play(&mut manager, note_on(0, 1, 60), &mut ends);
    play(&mut manager, release_all(10), &mut ends);

    assert!(play(
        &mut manager,
        expression(20, Expression::Modulation, 1.0, None, None),
        &mut ends,
    )
    .is_empty());
    assert_eq!(find_note(&manager, 1).ok_or("note 1 missing")?.modulation, 0.0);

    assert_eq!(
        summarize(&play(
            &mut manager,
            expression(20, Expression::Modulation, 1.0, Some(1), None),
            &mut ends,
        )),
        vec![(1, NoteState::Up, 10, 20)]
    );
    assert_eq!(find_note(&manager, 1).ok_or("note 1 missing")?.modulation, 1.0);
    Ok(())
}

#[test]
fn test_reset_clears_channel_expressions() {
    let mut manager = VoiceManager::new(1);
    let mut ends = Vec::new();
    play(
        &mut manager,
        expression(0, Expression::Pan, 0.0, None, Some(3)),
        &mut ends,
    );
    manager.reset();

    assert_eq!(
        manager.channel_expressions().get(3).map(|values| values.pan),
        Some(0.5)
    );
}
