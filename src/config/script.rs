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
use std::path::Path;

use config::{Config, File};
use midly::live::LiveEvent;
use midly::num::{u14, u4, u7};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::event::{Event, ExpressionEvent, MidiEvent, NoteEvent};
use crate::expression::Expression;
use crate::voices::NoteId;

/// Default window, in samples, in which a released note can still be
/// retriggered legato.
pub const DEFAULT_LEGATO_WINDOW: u64 = 480;

/// A YAML representation of an event script: blocks of timestamped events to
/// drive a voice manager with.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct Script {
    /// The length of every block in frames.
    frames: u32,

    /// How long a released note rings before the renderer stops it.
    #[serde(default)]
    release_samples: u64,

    /// Monophonic legato: new notes retrigger the sounding note in place.
    #[serde(default)]
    legato: bool,

    /// How recently released a note may be and still take a legato retrigger.
    #[serde(default = "default_legato_window")]
    legato_window: u64,

    /// The blocks, in order.
    #[serde(default)]
    blocks: Vec<Block>,
}

fn default_legato_window() -> u64 {
    DEFAULT_LEGATO_WINDOW
}

impl Script {
    /// Parses and validates a script file.
    pub fn deserialize(path: &Path) -> Result<Script, ConfigError> {
        let script = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Script>()?;
        script.validate()?;
        Ok(script)
    }

    /// Checks the block length and that every event converts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames == 0 {
            return Err(ConfigError::InvalidBlockLength);
        }
        self.events().map(|_| ())
    }

    /// Gets the block length in frames.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Gets the release tail length in samples.
    pub fn release_samples(&self) -> u64 {
        self.release_samples
    }

    /// Whether new notes should retrigger the sounding note.
    pub fn legato(&self) -> bool {
        self.legato
    }

    /// Gets the legato window in samples.
    pub fn legato_window(&self) -> u64 {
        self.legato_window
    }

    /// Gets the blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Converts every block's events.
    pub fn events(&self) -> Result<Vec<Vec<Event>>, ConfigError> {
        self.blocks
            .iter()
            .map(|block| {
                block
                    .events
                    .iter()
                    .map(ToEvent::to_event)
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

/// One block of events.
#[derive(Deserialize, Clone, Serialize, Debug, Default)]
pub struct Block {
    #[serde(default)]
    events: Vec<ScriptEvent>,
}

impl Block {
    /// Gets the events in this block.
    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }
}

/// Implementers must convert to a voice manager event.
pub trait ToEvent {
    /// Converts the implementer to an event.
    fn to_event(&self) -> Result<Event, ConfigError>;
}

/// Events that can be parsed from YAML.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    NoteOn(Note),
    NoteOff(Note),
    NoteChoke(Note),
    NoteExpression(NoteExpression),
    Midi(Midi),
}

impl ToEvent for ScriptEvent {
    fn to_event(&self) -> Result<Event, ConfigError> {
        Ok(match self {
            ScriptEvent::NoteOn(e) => Event::NoteOn(e.to_note_event()?),
            ScriptEvent::NoteOff(e) => Event::NoteOff(e.to_note_event()?),
            ScriptEvent::NoteChoke(e) => Event::NoteChoke(e.to_note_event()?),
            ScriptEvent::NoteExpression(e) => e.to_event()?,
            ScriptEvent::Midi(e) => e.to_event()?,
        })
    }
}

/// A structured note event. Channels are 0-indexed and any address field
/// may be omitted as a wildcard.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
pub struct Note {
    /// Sample offset within the block.
    time: u32,
    /// Host note ID. Must be non-negative.
    note_id: Option<i32>,
    port: Option<u16>,
    channel: Option<u8>,
    key: Option<u8>,
    /// Normalized velocity.
    #[serde(default = "default_velocity")]
    velocity: f64,
}

fn default_velocity() -> f64 {
    1.0
}

impl Note {
    fn to_note_event(&self) -> Result<NoteEvent, ConfigError> {
        Ok(NoteEvent {
            time: self.time,
            note_id: parse_note_id(self.note_id)?,
            port: self.port,
            channel: self.channel,
            key: self.key,
            velocity: self.velocity,
        })
    }
}

/// A structured note expression event.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
pub struct NoteExpression {
    time: u32,
    expression: Expression,
    value: f64,
    note_id: Option<i32>,
    port: Option<u16>,
    channel: Option<u8>,
    key: Option<u8>,
}

impl ToEvent for NoteExpression {
    fn to_event(&self) -> Result<Event, ConfigError> {
        Ok(Event::NoteExpression(ExpressionEvent {
            time: self.time,
            expression: self.expression,
            value: self.value,
            note_id: parse_note_id(self.note_id)?,
            port: self.port,
            channel: self.channel,
            key: self.key,
        }))
    }
}

/// A raw MIDI event, described as a message and encoded to bytes.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
pub struct Midi {
    time: u32,
    #[serde(default)]
    port: u16,
    message: MidiMessage,
}

impl ToEvent for Midi {
    fn to_event(&self) -> Result<Event, ConfigError> {
        let mut buf = Vec::with_capacity(3);
        self.message.to_midi_event()?.write_std(&mut buf)?;
        let mut data = [0u8; 3];
        let len = buf.len().min(data.len());
        data[..len].copy_from_slice(&buf[..len]);
        Ok(Event::Midi(MidiEvent::new(self.time, self.port, data)))
    }
}

/// MIDI channel messages. Channels are 1-indexed, as on hardware.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        key: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        key: u8,
        #[serde(default)]
        velocity: u8,
    },
    Aftertouch {
        channel: u8,
        key: u8,
        pressure: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ChannelAftertouch {
        channel: u8,
        pressure: u8,
    },
    /// A raw 14-bit bend, 8192 is centered.
    PitchBend {
        channel: u8,
        bend: u16,
    },
}

impl MidiMessage {
    /// Converts the message to a MIDI live event.
    pub fn to_midi_event(&self) -> Result<LiveEvent<'static>, ConfigError> {
        let (channel, message) = match *self {
            MidiMessage::NoteOn {
                channel,
                key,
                velocity,
            } => (
                channel,
                midly::MidiMessage::NoteOn {
                    key: parse_u7("key", key)?,
                    vel: parse_u7("velocity", velocity)?,
                },
            ),
            MidiMessage::NoteOff {
                channel,
                key,
                velocity,
            } => (
                channel,
                midly::MidiMessage::NoteOff {
                    key: parse_u7("key", key)?,
                    vel: parse_u7("velocity", velocity)?,
                },
            ),
            MidiMessage::Aftertouch {
                channel,
                key,
                pressure,
            } => (
                channel,
                midly::MidiMessage::Aftertouch {
                    key: parse_u7("key", key)?,
                    vel: parse_u7("pressure", pressure)?,
                },
            ),
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => (
                channel,
                midly::MidiMessage::Controller {
                    controller: parse_u7("controller", controller)?,
                    value: parse_u7("value", value)?,
                },
            ),
            MidiMessage::ChannelAftertouch { channel, pressure } => (
                channel,
                midly::MidiMessage::ChannelAftertouch {
                    vel: parse_u7("pressure", pressure)?,
                },
            ),
            MidiMessage::PitchBend { channel, bend } => (
                channel,
                midly::MidiMessage::PitchBend {
                    bend: midly::PitchBend(u14::try_from(bend).ok_or(
                        ConfigError::InvalidMidi {
                            field: "bend",
                            value: u32::from(bend),
                        },
                    )?),
                },
            ),
        };
        Ok(LiveEvent::Midi {
            channel: parse_channel(channel)?,
            message,
        })
    }
}

fn parse_note_id(note_id: Option<i32>) -> Result<Option<NoteId>, ConfigError> {
    match note_id {
        Some(id) if id < 0 => Err(ConfigError::InvalidNoteId(id)),
        Some(id) => Ok(Some(NoteId::new(id))),
        None => Ok(None),
    }
}

fn parse_channel(channel: u8) -> Result<u4, ConfigError> {
    u4::try_from(channel.wrapping_sub(1)).ok_or(ConfigError::InvalidMidi {
        field: "channel",
        value: u32::from(channel),
    })
}

fn parse_u7(field: &'static str, value: u8) -> Result<u7, ConfigError> {
    u7::try_from(value).ok_or(ConfigError::InvalidMidi {
        field,
        value: u32::from(value),
    })
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;

    use config::{Config, File, FileFormat};

    use super::*;

    fn parse_event(yaml: &str) -> Result<Event, Box<dyn Error>> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<ScriptEvent>()?
            .to_event()?)
    }

    #[test]
    fn note_on() -> Result<(), Box<dyn Error>> {
        let event = parse_event(
            r#"
            type: note_on
            time: 12
            note_id: 3
            channel: 1
            key: 60
            velocity: 0.5
        "#,
        )?;
        assert_eq!(
            Event::NoteOn(NoteEvent {
                time: 12,
                note_id: Some(NoteId::new(3)),
                port: None,
                channel: Some(1),
                key: Some(60),
                velocity: 0.5,
            }),
            event
        );
        Ok(())
    }

    #[test]
    fn wildcard_note_off() -> Result<(), Box<dyn Error>> {
        let event = parse_event(
            r#"
            type: note_off
            time: 4
        "#,
        )?;
        match event {
            Event::NoteOff(e) => {
                assert_eq!(e.time, 4);
                assert_eq!(e.pattern(), crate::voices::NotePattern::any());
            }
            other => panic!("unexpected event {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn note_expression() -> Result<(), Box<dyn Error>> {
        let event = parse_event(
            r#"
            type: note_expression
            time: 0
            expression: tuning
            value: -0.5
            key: 64
        "#,
        )?;
        match event {
            Event::NoteExpression(e) => {
                assert_eq!(e.expression, Expression::Tuning);
                assert_eq!(e.value, -0.5);
                assert_eq!(e.key, Some(64));
                assert_eq!(e.note_id, None);
            }
            other => panic!("unexpected event {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn midi_messages() -> Result<(), Box<dyn Error>> {
        let cases = [
            (
                "type: note_on\n    channel: 1\n    key: 60\n    velocity: 100",
                [0x90, 60, 100],
            ),
            (
                "type: note_off\n    channel: 2\n    key: 60",
                [0x81, 60, 0],
            ),
            (
                "type: control_change\n    channel: 16\n    controller: 7\n    value: 100",
                [0xBF, 7, 100],
            ),
            (
                "type: channel_aftertouch\n    channel: 3\n    pressure: 64",
                [0xD2, 64, 0],
            ),
            (
                "type: pitch_bend\n    channel: 1\n    bend: 12288",
                [0xE0, 0x00, 0x60],
            ),
        ];
        for (message, expected) in cases {
            let yaml = format!("type: midi\ntime: 7\nport: 1\nmessage:\n    {}\n", message);
            assert_eq!(
                Event::Midi(MidiEvent::new(7, 1, expected)),
                parse_event(&yaml)?,
                "{}",
                message
            );
        }
        Ok(())
    }

    #[test]
    fn invalid_values() {
        let invalid_channel = parse_event(
            "type: midi\ntime: 0\nmessage:\n    type: note_on\n    channel: 0\n    key: 1\n    velocity: 1\n",
        );
        assert!(invalid_channel.is_err());

        let invalid_key = parse_event(
            "type: midi\ntime: 0\nmessage:\n    type: note_on\n    channel: 1\n    key: 200\n    velocity: 1\n",
        );
        assert!(invalid_key.is_err());

        let negative_id = parse_event("type: note_on\ntime: 0\nkey: 60\nnote_id: -4\n");
        assert!(negative_id.is_err());
    }

    #[test]
    fn script_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("script.yaml");
        fs::write(
            &path,
            r#"
frames: 64
release_samples: 32
blocks:
  - events:
      - type: note_on
        time: 0
        note_id: 1
        key: 60
      - type: note_off
        time: 10
        note_id: 1
  - events: []
"#,
        )?;

        let script = Script::deserialize(&path)?;
        assert_eq!(script.frames(), 64);
        assert_eq!(script.release_samples(), 32);
        assert!(!script.legato());
        assert_eq!(script.legato_window(), DEFAULT_LEGATO_WINDOW);
        assert_eq!(script.blocks().len(), 2);

        let events = script.events()?;
        assert_eq!(events[0].len(), 2);
        assert!(events[1].is_empty());

        fs::write(&path, "frames: 0\n")?;
        assert!(matches!(
            Script::deserialize(&path),
            Err(ConfigError::InvalidBlockLength)
        ));
        Ok(())
    }
}
