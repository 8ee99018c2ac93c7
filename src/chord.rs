//! Chords, voices and songs of a four-part barbershop arrangement.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

pub const NUM_VOICES: usize = 4;

/// One of the four parts of a barbershop quartet.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Voice {
    Bass,
    Baritone,
    Lead,
    Tenor,
}

impl Voice {
    /// All voices in score order.
    pub const ALL: [Voice; NUM_VOICES] = [Voice::Bass, Voice::Baritone, Voice::Lead, Voice::Tenor];

    /// All voices ordered by how strongly a held note should resist retuning.
    pub const BY_IMPORTANCE: [Voice; NUM_VOICES] =
        [Voice::Lead, Voice::Bass, Voice::Tenor, Voice::Baritone];

    pub fn index(self) -> usize {
        match self {
            Voice::Bass => 0,
            Voice::Baritone => 1,
            Voice::Lead => 2,
            Voice::Tenor => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Voice> {
        Voice::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Voice::Bass => "bass",
            Voice::Baritone => "baritone",
            Voice::Lead => "lead",
            Voice::Tenor => "tenor",
        }
    }
}

impl Display for Voice {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

/// The harmonic quality of a chord. Each type is tuned with its own interval table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChordType {
    Major,
    Minor,
    Dominant7,
    Diminished7,
    HalfDiminished7,
}

impl ChordType {
    pub const ALL: [ChordType; 5] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Dominant7,
        ChordType::Diminished7,
        ChordType::HalfDiminished7,
    ];

    pub fn index(self) -> usize {
        match self {
            ChordType::Major => 0,
            ChordType::Minor => 1,
            ChordType::Dominant7 => 2,
            ChordType::Diminished7 => 3,
            ChordType::HalfDiminished7 => 4,
        }
    }

    /// Returns the [`ChordType`] denoted by `symbol` in score notation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use barbershop::chord::ChordType;
    /// assert_eq!(ChordType::from_symbol('M'), Some(ChordType::Major));
    /// assert_eq!(ChordType::from_symbol('m'), Some(ChordType::Minor));
    /// assert_eq!(ChordType::from_symbol('7'), Some(ChordType::Dominant7));
    /// assert_eq!(ChordType::from_symbol('o'), Some(ChordType::Diminished7));
    /// assert_eq!(ChordType::from_symbol('0'), Some(ChordType::HalfDiminished7));
    /// assert_eq!(ChordType::from_symbol('x'), None);
    /// ```
    pub fn from_symbol(symbol: char) -> Option<ChordType> {
        ChordType::ALL
            .into_iter()
            .find(|chord_type| chord_type.symbol() == symbol)
    }

    pub fn symbol(self) -> char {
        match self {
            ChordType::Major => 'M',
            ChordType::Minor => 'm',
            ChordType::Dominant7 => '7',
            ChordType::Diminished7 => 'o',
            ChordType::HalfDiminished7 => '0',
        }
    }

    /// Name used for tuning-table files, e.g. `dominant7` for `dominant7.txt`.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Dominant7 => "dominant7",
            ChordType::Diminished7 => "diminished7",
            ChordType::HalfDiminished7 => "half-diminished7",
        }
    }
}

/// A sounding note of a single voice within a [`Chord`].
///
/// # Examples
///
/// ```
/// # use barbershop::chord::Note;
/// let e4 = Note::new(64, true);
/// assert_eq!(e4.pitch_class(), 4);
/// assert_eq!(e4.octave(), 4);
/// assert!(e4.is_tied());
///
/// let b_below_c0 = Note::new(11, false);
/// assert_eq!(b_below_c0.pitch_class(), 11);
/// assert_eq!(b_below_c0.octave(), -1);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Note {
    midi_number: i32,
    tied: bool,
}

impl Note {
    /// Creates a [`Note`]. `tied` means that the note is held into the next chord.
    pub fn new(midi_number: i32, tied: bool) -> Self {
        Self { midi_number, tied }
    }

    pub fn midi_number(self) -> i32 {
        self.midi_number
    }

    /// Semitones above the nearest C below or at the note, between 0 and 11.
    pub fn pitch_class(self) -> u8 {
        self.midi_number.rem_euclid(12) as u8
    }

    /// Octave in scientific pitch notation (middle C is in octave 4).
    pub fn octave(self) -> i32 {
        self.midi_number.div_euclid(12) - 1
    }

    pub fn is_tied(self) -> bool {
        self.tied
    }
}

/// One harmonic event: four voice slots over a root with a [`ChordType`].
///
/// A slot containing [`None`] denotes a silent voice.
#[derive(Clone, Debug, PartialEq)]
pub struct Chord {
    root: u8,
    chord_type: ChordType,
    voices: [Option<Note>; NUM_VOICES],
    duration: u32,
}

impl Chord {
    /// Creates a new [`Chord`]. The `root` is reduced to a pitch class between 0 and 11.
    pub fn new(
        root: i32,
        chord_type: ChordType,
        voices: [Option<Note>; NUM_VOICES],
        duration: u32,
    ) -> Self {
        Self {
            root: root.rem_euclid(12) as u8,
            chord_type,
            voices,
            duration,
        }
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn chord_type(&self) -> ChordType {
        self.chord_type
    }

    pub fn voice(&self, voice: Voice) -> Option<Note> {
        self.voices[voice.index()]
    }

    pub fn voices(&self) -> &[Option<Note>; NUM_VOICES] {
        &self.voices
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether `voice` holds its note into the next chord.
    pub fn is_tied(&self, voice: Voice) -> bool {
        self.voice(voice).map_or(false, Note::is_tied)
    }
}

/// A validated, non-empty sequence of [`Chord`]s.
///
/// Every note held into the next chord must sound at the same pitch there, and the last chord must not hold any note.
///
/// # Examples
///
/// ```
/// # use barbershop::chord::{Chord, ChordType, Note, Song, SongError, Voice};
/// let held_e4 = Some(Note::new(64, true));
/// let e4 = Some(Note::new(64, false));
/// let f4 = Some(Note::new(65, false));
///
/// let first = Chord::new(0, ChordType::Major, [None, None, held_e4, None], 100);
///
/// let valid = Song::new(vec![first.clone(), Chord::new(9, ChordType::Minor, [None, None, e4, None], 100)]);
/// assert_eq!(valid.unwrap().len(), 2);
///
/// let pitch_changes = Song::new(vec![first.clone(), Chord::new(5, ChordType::Major, [None, None, f4, None], 100)]);
/// assert_eq!(pitch_changes.unwrap_err(), SongError::TieContinuity { chord_index: 1, voice: Voice::Lead });
///
/// let dangling = Song::new(vec![first]);
/// assert_eq!(dangling.unwrap_err(), SongError::DanglingTie { chord_index: 0, voice: Voice::Lead });
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    chords: Vec<Chord>,
}

impl Song {
    pub fn new(chords: Vec<Chord>) -> Result<Self, SongError> {
        let last_chord = chords.last().ok_or(SongError::Empty)?;

        for (chord_index, pair) in chords.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            for voice in Voice::ALL {
                if let Some(held_note) = previous.voice(voice).filter(|note| note.is_tied()) {
                    let continues = current
                        .voice(voice)
                        .map_or(false, |note| note.midi_number() == held_note.midi_number());
                    if !continues {
                        return Err(SongError::TieContinuity {
                            chord_index: chord_index + 1,
                            voice,
                        });
                    }
                }
            }
        }

        if let Some(voice) = Voice::ALL
            .into_iter()
            .find(|&voice| last_chord.is_tied(voice))
        {
            return Err(SongError::DanglingTie {
                chord_index: chords.len() - 1,
                voice,
            });
        }

        Ok(Self { chords })
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Always `false` since a [`Song`] contains at least one chord.
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// The start time of every chord, being the sum of all preceding durations.
    pub fn start_times(&self) -> impl Iterator<Item = u64> + '_ {
        self.chords.iter().scan(0u64, |time, chord| {
            let start_time = *time;
            *time += u64::from(chord.duration());
            Some(start_time)
        })
    }
}

/// Error reported when the chords of a [`Song`] violate its invariants.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SongError {
    /// The song does not contain any chord.
    Empty,

    /// `voice` was held into the chord at `chord_index` but sounds at a different pitch or is silent there.
    TieContinuity { chord_index: usize, voice: Voice },

    /// The last chord holds a note of `voice` into a chord that does not exist.
    DanglingTie { chord_index: usize, voice: Voice },
}

impl Display for SongError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SongError::Empty => write!(f, "The song does not contain any chord"),
            SongError::TieContinuity { chord_index, voice } => write!(
                f,
                "The {voice} is tied into chord {chord_index} but changes its pitch there"
            ),
            SongError::DanglingTie { chord_index, voice } => write!(
                f,
                "The {voice} is tied beyond the last chord (chord {chord_index})"
            ),
        }
    }
}
