//! MIDI Channel Voice messages for playing back a tuned [`Song`].
//!
//! Every voice plays on its own channel, s.t. pitch-bend messages affect a single voice only.

use crate::bend::EncodedBend;
use crate::chord::Song;
use crate::chord::Voice;
use crate::chord::NUM_VOICES;

/// Velocity used for all rendered notes.
pub const DEFAULT_VELOCITY: u8 = 100;

/// A type-safe representation of the MIDI messages needed to play back a tuned song.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelMessage {
    channel: u8,
    message_type: ChannelMessageType,
}

impl ChannelMessage {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn message_type(&self) -> ChannelMessageType {
        self.message_type
    }
}

/// The channel-agnostic part of a MIDI message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChannelMessageType {
    NoteOff { key: u8, velocity: u8 },
    NoteOn { key: u8, velocity: u8 },
    /// `value` is an unsigned 14-bit value where 8192 means no bend.
    PitchBendChange { value: u16 },
}

impl ChannelMessageType {
    /// Creates a new [`ChannelMessage`] from `self` with the given `channel`.
    ///
    /// [`None`] is returned if the channel value is outside the range [0..16).
    pub fn in_channel(self, channel: u8) -> Option<ChannelMessage> {
        match channel < 16 {
            true => Some(ChannelMessage {
                channel,
                message_type: self,
            }),
            false => None,
        }
    }
}

/// A [`ChannelMessage`] scheduled at an absolute time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimedMessage {
    /// Absolute time in the duration units of the score.
    pub tick: u64,
    pub message: ChannelMessage,
}

/// Renders `song` with its per-chord `encoded` bends into a list of [`TimedMessage`]s sorted by time.
///
/// Voice `v` plays on channel `v.index()`. At the start of each chord every sounding voice receives its pitch bend. A note held from the previous chord is not struck again unless its corrected note number changed.
///
/// # Examples
///
/// ```
/// # use barbershop::bend::EncodedBend;
/// # use barbershop::chord::{Chord, ChordType, Note, Song};
/// # use barbershop::midi::{self, ChannelMessageType};
/// let lead_only = Chord::new(0, ChordType::Major, [None, None, Some(Note::new(64, false)), None], 480);
/// let song = Song::new(vec![lead_only]).unwrap();
///
/// let e4 = EncodedBend { wire_value: 7631, midi_number: Some(64) };
/// let messages = midi::render_song(&song, &[[EncodedBend::SILENT, EncodedBend::SILENT, e4, EncodedBend::SILENT]]);
///
/// let rendered: Vec<_> = messages
///     .iter()
///     .map(|timed| (timed.tick, timed.message.channel(), timed.message.message_type()))
///     .collect();
/// assert_eq!(
///     rendered,
///     [
///         (0, 2, ChannelMessageType::PitchBendChange { value: 7631 }),
///         (0, 2, ChannelMessageType::NoteOn { key: 64, velocity: 100 }),
///         (480, 2, ChannelMessageType::NoteOff { key: 64, velocity: 0 }),
///     ]
/// );
/// ```
pub fn render_song(song: &Song, encoded: &[[EncodedBend; NUM_VOICES]]) -> Vec<TimedMessage> {
    let mut messages = Vec::new();
    let mut held_keys: [Option<u8>; NUM_VOICES] = [None; NUM_VOICES];

    for ((chord, bends), start_time) in song
        .chords()
        .iter()
        .zip(encoded)
        .zip(song.start_times())
    {
        let end_time = start_time + u64::from(chord.duration());

        let mut retuned_keys = Vec::new();
        let mut pitch_bends = Vec::new();
        let mut note_ons = Vec::new();
        let mut note_offs = Vec::new();

        for voice in Voice::ALL {
            let channel = voice.index() as u8;
            let bend = bends[voice.index()];
            let key = chord.voice(voice).and(bend.midi_number);
            let held_key = held_keys[voice.index()].take();

            // A held note shifted to another key has to be struck again
            if let Some(held_key) = held_key.filter(|&held_key| Some(held_key) != key) {
                retuned_keys.push(note_off(channel, held_key));
            }

            let Some(key) = key else {
                continue;
            };

            pitch_bends.push(ChannelMessage {
                channel,
                message_type: ChannelMessageType::PitchBendChange {
                    value: bend.wire_value,
                },
            });
            if held_key != Some(key) {
                note_ons.push(ChannelMessage {
                    channel,
                    message_type: ChannelMessageType::NoteOn {
                        key,
                        velocity: DEFAULT_VELOCITY,
                    },
                });
            }
            match chord.is_tied(voice) {
                true => held_keys[voice.index()] = Some(key),
                false => note_offs.push(note_off(channel, key)),
            }
        }

        let at = |tick: u64| move |message: ChannelMessage| TimedMessage { tick, message };
        messages.extend(retuned_keys.into_iter().map(at(start_time)));
        messages.extend(pitch_bends.into_iter().map(at(start_time)));
        messages.extend(note_ons.into_iter().map(at(start_time)));
        messages.extend(note_offs.into_iter().map(at(end_time)));
    }

    messages
}

fn note_off(channel: u8, key: u8) -> ChannelMessage {
    ChannelMessage {
        channel,
        message_type: ChannelMessageType::NoteOff { key, velocity: 0 },
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::chord::Chord;
    use crate::chord::ChordType;
    use crate::chord::Note;

    use super::*;

    fn encoded(wire_value: u16, midi_number: u8) -> EncodedBend {
        EncodedBend {
            wire_value,
            midi_number: Some(midi_number),
        }
    }

    fn rendered(messages: &[TimedMessage]) -> Vec<(u64, u8, ChannelMessageType)> {
        messages
            .iter()
            .map(|timed| {
                (
                    timed.tick,
                    timed.message.channel(),
                    timed.message.message_type(),
                )
            })
            .collect()
    }

    fn two_chords_with_held_bass() -> Song {
        Song::new(vec![
            Chord::new(
                0,
                ChordType::Major,
                [Some(Note::new(48, true)), None, None, None],
                100,
            ),
            Chord::new(
                5,
                ChordType::Major,
                [Some(Note::new(48, false)), None, None, None],
                50,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn held_note_is_bent_but_not_struck_again() {
        let silent = EncodedBend::SILENT;
        let messages = render_song(
            &two_chords_with_held_bass(),
            &[
                [encoded(8192, 48), silent, silent, silent],
                [encoded(8272, 48), silent, silent, silent],
            ],
        );

        assert_eq!(
            rendered(&messages),
            [
                (0, 0, ChannelMessageType::PitchBendChange { value: 8192 }),
                (0, 0, ChannelMessageType::NoteOn { key: 48, velocity: 100 }),
                (100, 0, ChannelMessageType::PitchBendChange { value: 8272 }),
                (150, 0, ChannelMessageType::NoteOff { key: 48, velocity: 0 }),
            ]
        );
    }

    #[test]
    fn held_note_with_shifted_key_is_struck_again() {
        let silent = EncodedBend::SILENT;
        let messages = render_song(
            &two_chords_with_held_bass(),
            &[
                [encoded(16000, 48), silent, silent, silent],
                [encoded(12400, 49), silent, silent, silent],
            ],
        );

        assert_eq!(
            rendered(&messages),
            [
                (0, 0, ChannelMessageType::PitchBendChange { value: 16000 }),
                (0, 0, ChannelMessageType::NoteOn { key: 48, velocity: 100 }),
                (100, 0, ChannelMessageType::NoteOff { key: 48, velocity: 0 }),
                (100, 0, ChannelMessageType::PitchBendChange { value: 12400 }),
                (100, 0, ChannelMessageType::NoteOn { key: 49, velocity: 100 }),
                (150, 0, ChannelMessageType::NoteOff { key: 49, velocity: 0 }),
            ]
        );
    }

    #[test]
    fn every_voice_plays_on_its_own_channel() {
        let song = Song::new(vec![Chord::new(
            0,
            ChordType::Dominant7,
            [
                Some(Note::new(48, false)),
                Some(Note::new(55, false)),
                Some(Note::new(64, false)),
                Some(Note::new(70, false)),
            ],
            10,
        )])
        .unwrap();
        let bends = [[
            encoded(8192, 48),
            encoded(8272, 55),
            encoded(7631, 64),
            encoded(6915, 70),
        ]];

        let messages = render_song(&song, &bends);
        assert_eq!(messages.len(), 12);
        for timed in &messages {
            let voice = Voice::from_index(usize::from(timed.message.channel())).unwrap();
            match timed.message.message_type() {
                ChannelMessageType::PitchBendChange { value } => {
                    assert_eq!(timed.tick, 0);
                    assert_eq!(value, bends[0][voice.index()].wire_value);
                }
                ChannelMessageType::NoteOn { key, .. } => {
                    assert_eq!(timed.tick, 0);
                    assert_eq!(Some(key), bends[0][voice.index()].midi_number);
                }
                ChannelMessageType::NoteOff { .. } => assert_eq!(timed.tick, 10),
            }
        }
    }

    #[test]
    fn channels_beyond_15_are_rejected() {
        let note_on = ChannelMessageType::NoteOn {
            key: 64,
            velocity: 100,
        };
        assert_eq!(note_on.in_channel(15).map(|message| message.channel()), Some(15));
        assert_eq!(note_on.in_channel(16), None);
    }
}
