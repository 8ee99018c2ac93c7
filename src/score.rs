//! Import of songs written in the line-based chord notation.
//!
//! Each line contains one chord:
//!
//! ```text
//! EnM(en3t,bn3 ,en4t,g#4 )280
//! ```
//!
//! - `EnM`: The root note name (`En`) followed by the chord type symbol (`M`, `m`, `7`, `o` or `0`).
//! - `(en3t,bn3 ,en4t,g#4 )`: Bass, baritone, lead and tenor. Each slot is a note name, an octave digit and either `t` for a note held into the next chord or a space. Four spaces denote a silent voice.
//! - `280`: The duration of the chord.
//!
//! Note names consist of a letter followed by `b`, `n` or `#`. Only the root name starts with an uppercase letter.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io;
use std::io::Read;

use log::debug;

use crate::chord::Chord;
use crate::chord::ChordType;
use crate::chord::Note;
use crate::chord::Song;
use crate::chord::SongError;
use crate::chord::Voice;
use crate::chord::NUM_VOICES;
use crate::parse;

const SILENT_SLOT: &str = "    ";

/// Reads a [`Song`] from a score with one chord per line.
///
/// Blank lines are ignored. The tie information of the imported chords is validated before the [`Song`] is returned.
///
/// # Examples
///
/// ```
/// # use barbershop::chord::{ChordType, Voice};
/// # use barbershop::score;
/// let score = "\
///     CnM(cn3 ,gn3 ,en4t,cn5 )480\n\
///     An7(cn3 ,gn3 ,en4 ,c#5 )480\n";
///
/// let song = score::import(score.as_bytes()).unwrap();
/// assert_eq!(song.len(), 2);
///
/// let second = &song.chords()[1];
/// assert_eq!(second.root(), 9);
/// assert_eq!(second.chord_type(), ChordType::Dominant7);
/// assert_eq!(second.voice(Voice::Tenor).unwrap().midi_number(), 73);
/// ```
pub fn import(reader: impl Read) -> Result<Song, ScoreImportError> {
    let (chords, line_numbers) = parse::consume_lines(
        (Vec::new(), Vec::new()),
        reader,
        |(mut chords, mut line_numbers), line_number, line| -> Result<_, ScoreImportError> {
            chords.push(parse_chord(line).map_err(|kind| ScoreImportError::ParseError {
                line_number,
                kind,
            })?);
            line_numbers.push(line_number);
            Ok((chords, line_numbers))
        },
    )?;

    debug!("Imported {} chords", chords.len());

    Song::new(chords).map_err(|error| {
        let line_of = |chord_index: usize| line_numbers[chord_index];
        match error {
            SongError::Empty => ScoreImportError::EmptyScore,
            SongError::TieContinuity { chord_index, voice } => ScoreImportError::TieContinuity {
                line_number: line_of(chord_index),
                voice,
            },
            SongError::DanglingTie { chord_index, voice } => ScoreImportError::DanglingTie {
                line_number: line_of(chord_index),
                voice,
            },
        }
    })
}

fn parse_chord(line: &str) -> Result<Chord, ScoreParseErrorKind> {
    let (name, rest) = line.split_once('(').ok_or(ScoreParseErrorKind::Syntax)?;
    let (slots, duration) = rest.split_once(')').ok_or(ScoreParseErrorKind::Syntax)?;

    let mut name_chars = name.trim().chars();
    let root = match (name_chars.next(), name_chars.next()) {
        (Some(letter), Some(accidental)) => note_offset(letter.to_ascii_lowercase(), accidental),
        _ => None,
    }
    .ok_or(ScoreParseErrorKind::Root)?;
    let chord_type = match (name_chars.next(), name_chars.next()) {
        (Some(symbol), None) => ChordType::from_symbol(symbol),
        _ => None,
    }
    .ok_or(ScoreParseErrorKind::ChordType)?;

    let slots: Vec<_> = slots.split(',').collect();
    if slots.len() != NUM_VOICES {
        return Err(ScoreParseErrorKind::NumberOfVoices(slots.len()));
    }
    let mut voices = [None; NUM_VOICES];
    for (voice, slot) in Voice::ALL.into_iter().zip(slots) {
        voices[voice.index()] = parse_note(slot).ok_or(ScoreParseErrorKind::Note(voice))?;
    }

    let duration = duration
        .trim()
        .parse()
        .map_err(|_| ScoreParseErrorKind::Duration)?;

    Ok(Chord::new(root, chord_type, voices, duration))
}

/// Returns [`None`] if `slot` is malformed and `Some(None)` for a silent voice.
fn parse_note(slot: &str) -> Option<Option<Note>> {
    if slot == SILENT_SLOT {
        return Some(None);
    }

    let chars: Vec<_> = slot.chars().collect();
    let &[letter, accidental, octave, tie] = chars.as_slice() else {
        return None;
    };

    let offset = note_offset(letter, accidental)?;
    let octave = i32::try_from(octave.to_digit(10)?).ok()?;
    let tied = match tie {
        't' => true,
        ' ' => false,
        _ => return None,
    };

    Some(Some(Note::new((octave + 1) * 12 + offset, tied)))
}

/// Semitones above C of the note name, e.g. -1 for `cb` and 12 for `b#`.
fn note_offset(letter: char, accidental: char) -> Option<i32> {
    let natural = match letter {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        'b' => 11,
        _ => return None,
    };
    let alteration = match accidental {
        'b' => -1,
        'n' => 0,
        '#' => 1,
        _ => return None,
    };
    Some(natural + alteration)
}

/// Error reported when importing a score fails.
#[derive(Debug)]
pub enum ScoreImportError {
    IoError(io::Error),
    ParseError {
        line_number: usize,
        kind: ScoreParseErrorKind,
    },

    /// The score does not contain any chord.
    EmptyScore,

    /// `voice` is held into the chord at `line_number` but changes its pitch there.
    TieContinuity { line_number: usize, voice: Voice },

    /// `voice` is held beyond the last chord, located at `line_number`.
    DanglingTie { line_number: usize, voice: Voice },
}

/// Specifies which part of a chord line is malformed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScoreParseErrorKind {
    /// The line is not of the form `<name>(<notes>)<duration>`.
    Syntax,

    /// Invalid root note name.
    Root,

    /// Invalid chord type symbol.
    ChordType,

    /// Number of note slots other than four.
    NumberOfVoices(usize),

    /// Invalid note slot of the given voice.
    Note(Voice),

    /// Invalid duration.
    Duration,
}

impl From<io::Error> for ScoreImportError {
    fn from(v: io::Error) -> Self {
        Self::IoError(v)
    }
}

impl Display for ScoreParseErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ScoreParseErrorKind::Syntax => {
                write!(f, "Must be of the form <root><type>(<bass>,<baritone>,<lead>,<tenor>)<duration>")
            }
            ScoreParseErrorKind::Root => write!(f, "Invalid root note name"),
            ScoreParseErrorKind::ChordType => {
                write!(f, "Invalid chord type, must be one of M, m, 7, o, 0")
            }
            ScoreParseErrorKind::NumberOfVoices(num_voices) => {
                write!(f, "Found {num_voices} notes but exactly {NUM_VOICES} are required")
            }
            ScoreParseErrorKind::Note(voice) => write!(f, "Invalid note of the {voice}"),
            ScoreParseErrorKind::Duration => write!(f, "Invalid duration"),
        }
    }
}

impl Display for ScoreImportError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ScoreImportError::IoError(err) => write!(f, "IO error / {err}"),
            ScoreImportError::ParseError { line_number, kind } => {
                write!(f, "Line {line_number}: {kind}")
            }
            ScoreImportError::EmptyScore => write!(f, "The score does not contain any chord"),
            ScoreImportError::TieContinuity { line_number, voice } => write!(
                f,
                "Line {line_number}: The {voice} is tied into this chord but changes its pitch"
            ),
            ScoreImportError::DanglingTie { line_number, voice } => write!(
                f,
                "Line {line_number}: The {voice} is tied beyond the last chord"
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_chord_line() {
        let chord = parse_chord("EnM(en3t,bn3 ,en4t,g#4 )280").unwrap();

        assert_eq!(chord.root(), 4);
        assert_eq!(chord.chord_type(), ChordType::Major);
        assert_eq!(chord.duration(), 280);
        assert_eq!(
            chord.voices(),
            &[
                Some(Note::new(52, true)),
                Some(Note::new(59, false)),
                Some(Note::new(64, true)),
                Some(Note::new(68, false)),
            ]
        );
    }

    #[test]
    fn parse_silent_voices_and_enharmonic_edges() {
        let chord = parse_chord("Cb0(    ,cb4 ,    ,b#3 )0").unwrap();

        assert_eq!(chord.root(), 11);
        assert_eq!(chord.chord_type(), ChordType::HalfDiminished7);
        assert_eq!(chord.voice(Voice::Bass), None);
        assert_eq!(chord.voice(Voice::Lead), None);
        // cb4 sounds as b3 and b#3 sounds as c4
        assert_eq!(chord.voice(Voice::Baritone).unwrap().midi_number(), 59);
        assert_eq!(chord.voice(Voice::Tenor).unwrap().midi_number(), 60);
    }

    #[test]
    fn parse_errors() {
        let kinds = [
            ("EnM en3 ,bn3 ,en4 ,g#4 280", ScoreParseErrorKind::Syntax),
            ("XnM(en3 ,bn3 ,en4 ,g#4 )280", ScoreParseErrorKind::Root),
            ("En(en3 ,bn3 ,en4 ,g#4 )280", ScoreParseErrorKind::ChordType),
            ("EnMaj(en3 ,bn3 ,en4 ,g#4 )280", ScoreParseErrorKind::ChordType),
            ("EnM(en3 ,bn3 ,en4 )280", ScoreParseErrorKind::NumberOfVoices(3)),
            ("EnM(en3 ,bn3 ,en4x,g#4 )280", ScoreParseErrorKind::Note(Voice::Lead)),
            ("EnM(en3,bn3 ,en4 ,g#4 )280", ScoreParseErrorKind::Note(Voice::Bass)),
            ("EnM(en3 ,bx3 ,en4 ,g#4 )280", ScoreParseErrorKind::Note(Voice::Baritone)),
            ("EnM(en3 ,bn3 ,en4 ,g#  )280", ScoreParseErrorKind::Note(Voice::Tenor)),
            ("EnM(en3 ,bn3 ,en4 ,g#4 )", ScoreParseErrorKind::Duration),
            ("EnM(en3 ,bn3 ,en4 ,g#4 )-1", ScoreParseErrorKind::Duration),
        ];

        for (line, expected_kind) in kinds {
            assert_eq!(parse_chord(line).map(|_| ()), Err(expected_kind), "{line}");
        }
    }

    #[test]
    fn import_reports_line_numbers() {
        let score = "CnM(cn3 ,gn3 ,en4 ,cn5 )480\n\nCnM(cn3 ,gn3 ,en4 ,cn5 480\n";
        assert!(matches!(
            import(score.as_bytes()),
            Err(ScoreImportError::ParseError {
                line_number: 3,
                kind: ScoreParseErrorKind::Syntax
            })
        ));
    }

    #[test]
    fn tie_continuity_is_checked_on_import() {
        let score = "\
            CnM(cn3t,gn3 ,en4 ,cn5 )480\n\
            Dnm(dn3 ,an3 ,fn4 ,dn5 )480\n";
        assert!(matches!(
            import(score.as_bytes()),
            Err(ScoreImportError::TieContinuity {
                line_number: 2,
                voice: Voice::Bass
            })
        ));
    }

    #[test]
    fn dangling_tie_is_rejected() {
        let score = "\
            CnM(cn3 ,gn3 ,en4 ,cn5 )480\n\
            \n\
            CnM(cn3 ,gn3 ,en4 ,cn5t)480\n";
        assert!(matches!(
            import(score.as_bytes()),
            Err(ScoreImportError::DanglingTie {
                line_number: 3,
                voice: Voice::Tenor
            })
        ));
    }

    #[test]
    fn empty_score_is_rejected() {
        assert!(matches!(
            import("\n  \n".as_bytes()),
            Err(ScoreImportError::EmptyScore)
        ));
    }
}
