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
use midly::live::LiveEvent;
use midly::MidiMessage;
use tracing::trace;

use crate::expression::Expression;

/// Pitch wheel range in semitones for plain MIDI. MPE setups commonly use 48.
pub const DEFAULT_PITCH_WHEEL_RANGE: f64 = 2.0;

pub const CC_MODULATION: u8 = 1;
/// Foot controller, mapped to brightness.
pub const CC_BRIGHTNESS: u8 = 4;
pub const CC_VOLUME: u8 = 7;
pub const CC_PAN: u8 = 10;
pub const CC_EXPRESSION: u8 = 11;

const PITCH_BEND_CENTER: f64 = 8192.0;

/// What a MIDI channel message means to the voice manager.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiAction {
    NoteOn { key: u8, velocity: f64 },
    NoteOff { key: u8, velocity: f64 },
    /// A per-key update when `key` is set, otherwise channel-wide.
    Expression {
        expression: Expression,
        value: f64,
        key: Option<u8>,
    },
}

/// Maps a CC7 value to linear gain, with 100 at unity and a steep fall-off
/// below it.
pub fn cc_volume(value: u8) -> f64 {
    (f64::from(value) / 100.0).powf(5.8)
}

/// Converts a raw 14-bit pitch wheel value to a tuning offset in semitones.
pub fn pitch_bend_semitones(raw: u16, range: f64) -> f64 {
    (f64::from(raw) - PITCH_BEND_CENTER) * range / PITCH_BEND_CENTER
}

fn normalized(value: u8) -> f64 {
    f64::from(value) / 127.0
}

/// Length of a channel message with the given status byte.
fn message_len(status: u8) -> Option<usize> {
    match status & 0xF0 {
        0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => Some(3),
        0xC0 | 0xD0 => Some(2),
        _ => None,
    }
}

/// Translates a raw channel message, returning its channel and action.
/// Anything the manager has no use for yields `None`.
pub fn translate(data: &[u8; 3], pitch_wheel_range: f64) -> Option<(u8, MidiAction)> {
    let len = message_len(data[0])?;
    let (channel, message) = match LiveEvent::parse(&data[..len]) {
        Ok(LiveEvent::Midi { channel, message }) => (channel.as_int(), message),
        Ok(_) => return None,
        Err(err) => {
            trace!(err = %err, status = data[0], "Ignoring malformed MIDI message");
            return None;
        }
    };

    let action = match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => MidiAction::NoteOn {
            key: key.as_int(),
            velocity: normalized(vel.as_int()),
        },
        // Note on with zero velocity is a note off.
        MidiMessage::NoteOn { key, vel } | MidiMessage::NoteOff { key, vel } => {
            MidiAction::NoteOff {
                key: key.as_int(),
                velocity: normalized(vel.as_int()),
            }
        }
        MidiMessage::Aftertouch { key, vel } => MidiAction::Expression {
            expression: Expression::Pressure,
            value: normalized(vel.as_int()),
            key: Some(key.as_int()),
        },
        MidiMessage::ChannelAftertouch { vel } => MidiAction::Expression {
            expression: Expression::Pressure,
            value: normalized(vel.as_int()),
            key: None,
        },
        MidiMessage::PitchBend { bend } => MidiAction::Expression {
            expression: Expression::Tuning,
            value: pitch_bend_semitones(bend.0.as_int(), pitch_wheel_range),
            key: None,
        },
        MidiMessage::Controller { controller, value } => {
            let value = value.as_int();
            let (expression, value) = match controller.as_int() {
                CC_MODULATION => (Expression::Modulation, normalized(value)),
                CC_BRIGHTNESS => (Expression::Brightness, normalized(value)),
                CC_VOLUME => (Expression::Volume, cc_volume(value)),
                CC_PAN => (Expression::Pan, normalized(value)),
                CC_EXPRESSION => (Expression::Expression, normalized(value)),
                other => {
                    trace!(controller = other, "Ignoring unmapped MIDI CC");
                    return None;
                }
            };
            MidiAction::Expression {
                expression,
                value,
                key: None,
            }
        }
        MidiMessage::ProgramChange { .. } => return None,
    };

    Some((channel, action))
}
