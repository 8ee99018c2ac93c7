//! Encoding of bends into 14-bit MIDI pitch-bend values.
//!
//! The pitch-bend range of the receiving device is assumed to be ±2 semitones, i.e. one semitone corresponds to 4096 wire units. Bends exceeding this range are expressed by shifting the note number.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use log::debug;

use crate::chord::Song;
use crate::chord::Voice;
use crate::chord::NUM_VOICES;
use crate::tuner::TunedSong;

/// Wire value of an unbent note.
pub const CENTER: i64 = 8192;

/// Largest representable wire value.
pub const MAX_WIRE_VALUE: i64 = 16383;

/// Wire units per semitone.
pub const UNITS_PER_SEMITONE: i64 = 4096;

/// Largest number of semitones a note number is shifted by, in either direction.
pub const MAX_NOTE_SHIFT: i64 = 12;

/// The wire representation of a single note's bend.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncodedBend {
    /// 14-bit pitch-bend value between 0 and 16383.
    pub wire_value: u16,

    /// The note number to play, corrected by the whole semitones the bend could not express. [`None`] for a silent voice.
    pub midi_number: Option<u8>,
}

impl EncodedBend {
    /// Encoding of a silent voice.
    pub const SILENT: EncodedBend = EncodedBend {
        wire_value: 0,
        midi_number: None,
    };
}

/// Encodes `bend` (in semitones) of the note with the given `midi_number`.
///
/// # Examples
///
/// ```
/// # use barbershop::bend;
/// # use barbershop::bend::EncodedBend;
/// # use barbershop::bend::EncodeError;
/// assert_eq!(
///     bend::encode_bend(0.0, 60),
///     Ok(EncodedBend { wire_value: 8192, midi_number: Some(60) })
/// );
/// assert_eq!(
///     bend::encode_bend(-0.5, 60),
///     Ok(EncodedBend { wire_value: 6144, midi_number: Some(60) })
/// );
///
/// // Two semitones are one unit beyond the pitch-bend range
/// assert_eq!(
///     bend::encode_bend(2.0, 60),
///     Ok(EncodedBend { wire_value: 12288, midi_number: Some(61) })
/// );
/// assert_eq!(
///     bend::encode_bend(-2.5, 60),
///     Ok(EncodedBend { wire_value: 2048, midi_number: Some(59) })
/// );
///
/// assert_eq!(bend::encode_bend(20.0, 60), Err(EncodeError::BendOutOfRange { bend: 20.0 }));
/// assert_eq!(bend::encode_bend(2.5, 127), Err(EncodeError::NoteOutOfRange { midi_number: 128 }));
/// ```
pub fn encode_bend(bend: f64, midi_number: i32) -> Result<EncodedBend, EncodeError> {
    let wire_value = (CENTER as f64 + bend * UNITS_PER_SEMITONE as f64).round();
    let max_correction = (MAX_NOTE_SHIFT * UNITS_PER_SEMITONE) as f64;
    if !(-max_correction..=MAX_WIRE_VALUE as f64 + max_correction).contains(&wire_value) {
        return Err(EncodeError::BendOutOfRange { bend });
    }
    let wire_value = wire_value as i64;

    let shift = if wire_value > MAX_WIRE_VALUE {
        div_ceil(wire_value - MAX_WIRE_VALUE, UNITS_PER_SEMITONE)
    } else if wire_value < 0 {
        -div_ceil(-wire_value, UNITS_PER_SEMITONE)
    } else {
        0
    };

    if shift.abs() > MAX_NOTE_SHIFT {
        return Err(EncodeError::BendOutOfRange { bend });
    }

    let corrected_number = i64::from(midi_number) + shift;
    let corrected_number = u8::try_from(corrected_number)
        .ok()
        .filter(|&number| number < 128)
        .ok_or(EncodeError::NoteOutOfRange {
            midi_number: corrected_number as i32,
        })?;

    if shift != 0 {
        debug!(
            "Shifted note {} by {} semitones to encode bend {:+.4}",
            midi_number, shift, bend
        );
    }

    Ok(EncodedBend {
        wire_value: (wire_value - shift * UNITS_PER_SEMITONE) as u16,
        midi_number: Some(corrected_number),
    })
}

fn div_ceil(numer: i64, denom: i64) -> i64 {
    (numer + denom - 1) / denom
}

/// Encodes the posterior bend of every voice of every chord of `song`.
///
/// `half_step_size` is the number of bend units per semitone the song was tuned with.
pub fn encode_song(
    song: &Song,
    tuned: &TunedSong,
    half_step_size: f64,
) -> Result<Vec<[EncodedBend; NUM_VOICES]>, SongEncodeError> {
    song.chords()
        .iter()
        .zip(tuned.chords())
        .enumerate()
        .map(|(chord_index, (chord, resolved))| {
            let mut encoded = [EncodedBend::SILENT; NUM_VOICES];
            for voice in Voice::ALL {
                if let Some(note) = chord.voice(voice) {
                    let bend = resolved.posterior_bend(voice) / half_step_size;
                    encoded[voice.index()] =
                        encode_bend(bend, note.midi_number()).map_err(|error| SongEncodeError {
                            chord_index,
                            voice,
                            error,
                        })?;
                }
            }
            Ok(encoded)
        })
        .collect()
}

/// Error reported by [`encode_bend`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// The bend exceeds the pitch-bend range even after shifting the note by an octave.
    BendOutOfRange { bend: f64 },

    /// The shifted note number is not a valid MIDI note number.
    NoteOutOfRange { midi_number: i32 },
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            EncodeError::BendOutOfRange { bend } => write!(
                f,
                "The bend {bend:+.4} exceeds the encodable range of {MAX_NOTE_SHIFT} semitones"
            ),
            EncodeError::NoteOutOfRange { midi_number } => write!(
                f,
                "The corrected note number {midi_number} is outside the MIDI range [0..128)"
            ),
        }
    }
}

/// Error reported by [`encode_song`], locating the note that could not be encoded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SongEncodeError {
    pub chord_index: usize,
    pub voice: Voice,
    pub error: EncodeError,
}

impl Display for SongEncodeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Could not encode the {} of chord {}: {}",
            self.voice, self.chord_index, self.error
        )
    }
}

#[cfg(test)]
mod test {
    use crate::chord::Chord;
    use crate::chord::ChordType;
    use crate::chord::Note;
    use crate::table::TuningTables;
    use crate::tuner::BarbershopTuner;
    use crate::tuner::TunerOptions;

    use super::*;

    #[test]
    fn bend_of_two_semitones_shifts_note_once() {
        let encoded = encode_bend(2.0, 64).unwrap();
        assert_eq!(encoded.midi_number, Some(65));
        assert_eq!(encoded.wire_value, 16384 - 4096);
        assert!(i64::from(encoded.wire_value) <= MAX_WIRE_VALUE);
    }

    #[test]
    fn boundary_values_need_no_shift() {
        assert_eq!(
            encode_bend(-2.0, 64),
            Ok(EncodedBend {
                wire_value: 0,
                midi_number: Some(64)
            })
        );
        assert_eq!(
            encode_bend(8191.0 / 4096.0, 64),
            Ok(EncodedBend {
                wire_value: 16383,
                midi_number: Some(64)
            })
        );
    }

    #[test]
    fn large_bends_shift_by_whole_semitones() {
        let encoded = encode_bend(5.25, 60).unwrap();
        // 8192 + 21504 = 29696 exceeds the range by 13313 units, i.e. 4 semitones
        assert_eq!(encoded.midi_number, Some(64));
        assert_eq!(encoded.wire_value, 29696 - 4 * 4096);

        let encoded = encode_bend(-5.25, 60).unwrap();
        assert_eq!(encoded.midi_number, Some(56));
        assert_eq!(encoded.wire_value, (8192 - 21504 + 4 * 4096) as u16);
    }

    #[test]
    fn corrections_beyond_an_octave_are_rejected() {
        assert!(encode_bend(13.9, 60).is_ok());
        assert_eq!(
            encode_bend(14.0, 60),
            Err(EncodeError::BendOutOfRange { bend: 14.0 })
        );
        assert_eq!(
            encode_bend(-14.5, 60),
            Err(EncodeError::BendOutOfRange { bend: -14.5 })
        );
        assert!(matches!(
            encode_bend(f64::NAN, 60),
            Err(EncodeError::BendOutOfRange { .. })
        ));
    }

    #[test]
    fn huge_bends_are_rejected() {
        assert_eq!(
            encode_bend(-1e300, 60),
            Err(EncodeError::BendOutOfRange { bend: -1e300 })
        );
        assert_eq!(
            encode_bend(1e300, 60),
            Err(EncodeError::BendOutOfRange { bend: 1e300 })
        );
        assert!(matches!(
            encode_bend(f64::NEG_INFINITY, 60),
            Err(EncodeError::BendOutOfRange { .. })
        ));
    }

    #[test]
    fn corrected_note_must_be_valid() {
        assert_eq!(
            encode_bend(-2.5, 0),
            Err(EncodeError::NoteOutOfRange { midi_number: -1 })
        );
    }

    #[test]
    fn encode_tuned_song() {
        let song = Song::new(vec![
            Chord::new(
                0,
                ChordType::Major,
                [
                    Some(Note::new(48, false)),
                    None,
                    Some(Note::new(64, false)),
                    Some(Note::new(67, false)),
                ],
                480,
            ),
            Chord::new(
                0,
                ChordType::Major,
                [None, None, Some(Note::new(64, false)), None],
                480,
            ),
        ])
        .unwrap();
        let tuner = BarbershopTuner::new(TunerOptions::default(), TuningTables::default());
        let tuned = tuner.tune_song(&song).unwrap();

        let encoded = encode_song(&song, &tuned, 1.0).unwrap();
        assert_eq!(encoded.len(), 2);

        // The lead of the first chord is in 12-EDO
        assert_eq!(
            encoded[0][Voice::Lead.index()],
            EncodedBend {
                wire_value: 8192,
                midi_number: Some(64)
            }
        );
        assert_eq!(encoded[0][Voice::Baritone.index()], EncodedBend::SILENT);
        assert_eq!(encoded[1][Voice::Bass.index()], EncodedBend::SILENT);
        assert_eq!(encoded[1][Voice::Lead.index()].midi_number, Some(64));
    }

    #[test]
    fn encoding_errors_name_the_note() {
        let song = Song::new(vec![Chord::new(
            0,
            ChordType::Major,
            [Some(Note::new(127, false)), None, Some(Note::new(64, false)), None],
            480,
        )])
        .unwrap();
        let options = TunerOptions::default();
        let tuner = BarbershopTuner::new(options, TuningTables::default());
        let tuned = tuner.tune_song(&song).unwrap();

        // Scaling by a tiny half step size blows the bass up to several semitones
        let error = encode_song(&song, &tuned, 0.01).unwrap_err();
        assert_eq!(error.chord_index, 0);
        assert_eq!(error.voice, Voice::Bass);
    }
}
