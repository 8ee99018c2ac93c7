//! Adaptive just intonation of a whole [`Song`].
//!
//! Tuning happens in two steps:
//! - The *vertical* step tunes every chord in isolation. Each sounding note receives an individual bend, i.e. its deviation from 12-EDO according to the chord's just intervals.
//! - The *horizontal* step walks through the song in order and shifts each chord as a whole by a master bend, s.t. held notes and the lead do not audibly retune.

mod horizontal;
mod vertical;

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use log::info;

use crate::chord::Chord;
use crate::chord::Song;
use crate::chord::Voice;
use crate::chord::NUM_VOICES;
use crate::table::TuningTables;

pub use self::horizontal::constraints;
pub use self::horizontal::resolve_master_bend;
pub use self::horizontal::Constraint;
pub use self::horizontal::ConstraintSource;
pub use self::horizontal::Resolution;
pub use self::horizontal::ResolutionOutcome;
pub use self::horizontal::ResolveError;
pub use self::vertical::individual_bend;
pub use self::vertical::individual_bends;

/// Decides which constraint wins when held notes and the lead cannot be satisfied at the same time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Priority {
    TiesFirst,
    LeadFirst,
}

/// ```
/// # use barbershop::tuner::Priority;
/// assert_eq!("ties-first".parse::<Priority>().unwrap(), Priority::TiesFirst);
/// assert_eq!("t".parse::<Priority>().unwrap(), Priority::TiesFirst);
/// assert_eq!("lead-first".parse::<Priority>().unwrap(), Priority::LeadFirst);
/// assert_eq!("l".parse::<Priority>().unwrap(), Priority::LeadFirst);
/// assert_eq!(
///     "bass-first".parse::<Priority>().unwrap_err().to_string(),
///     "Invalid priority 'bass-first': Must be ties-first (t) or lead-first (l)"
/// );
/// ```
impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ties-first" | "t" => Ok(Priority::TiesFirst),
            "lead-first" | "l" => Ok(Priority::LeadFirst),
            other => Err(PriorityError(other.to_owned())),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(match self {
            Priority::TiesFirst => "ties-first",
            Priority::LeadFirst => "lead-first",
        })
    }
}

/// Error reported when parsing a [`Priority`] fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriorityError(pub String);

impl Display for PriorityError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid priority '{}': Must be ties-first (t) or lead-first (l)",
            self.0
        )
    }
}

/// Parameters of the tuning algorithm.
///
/// # Examples
///
/// ```
/// # use barbershop::tuner::Priority;
/// # use barbershop::tuner::TunerOptions;
/// let options = TunerOptions::default();
/// assert_eq!(options.half_step_size, 1.0);
/// assert_eq!(options.tie_radius, 0.03);
/// assert_eq!(options.lead_radius, 0.15);
/// assert_eq!(options.priority, Priority::TiesFirst);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TunerOptions {
    /// Size of one 12-EDO semitone in bend units (defaults to 1.0, s.t. 0.01 is a cent).
    pub half_step_size: f64,

    /// How far a held note may retune across a chord change (defaults to 0.03, 3 cents).
    pub tie_radius: f64,

    /// How far the lead may move between consecutive chords (defaults to 0.15).
    pub lead_radius: f64,

    /// Which constraint wins in case of a conflict (defaults to [`Priority::TiesFirst`]).
    pub priority: Priority,
}

impl Default for TunerOptions {
    fn default() -> Self {
        Self {
            half_step_size: 1.0,
            tie_radius: 0.03,
            lead_radius: 0.15,
            priority: Priority::TiesFirst,
        }
    }
}

/// The tuning of a chord after both tuning steps.
///
/// A [`ResolvedChord`] is everything the horizontal step needs to know about the previous chord.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolvedChord {
    master_bend: f64,
    individual_bends: [f64; NUM_VOICES],
    tied: [bool; NUM_VOICES],
}

impl ResolvedChord {
    /// Creates a [`ResolvedChord`]. `tied` marks the voices whose notes are held into the next chord.
    pub fn new(
        master_bend: f64,
        individual_bends: [f64; NUM_VOICES],
        tied: [bool; NUM_VOICES],
    ) -> Self {
        Self {
            master_bend,
            individual_bends,
            tied,
        }
    }

    /// Resolves the first chord of a song, s.t. the lead sounds in 12-EDO.
    ///
    /// # Examples
    ///
    /// ```
    /// # use barbershop::chord::Voice;
    /// # use barbershop::tuner::ResolvedChord;
    /// let first = ResolvedChord::first(&[0.02, -0.14, 0.0196, 0.0], [false; 4]);
    /// assert_eq!(first.master_bend(), -0.0196);
    /// assert_eq!(first.posterior_bend(Voice::Lead), 0.0);
    /// ```
    pub fn first(individual_bends: &[f64; NUM_VOICES], tied: [bool; NUM_VOICES]) -> Self {
        Self::new(
            -individual_bends[Voice::Lead.index()],
            *individual_bends,
            tied,
        )
    }

    pub fn master_bend(&self) -> f64 {
        self.master_bend
    }

    pub fn individual_bend(&self, voice: Voice) -> f64 {
        self.individual_bends[voice.index()]
    }

    pub fn individual_bends(&self) -> &[f64; NUM_VOICES] {
        &self.individual_bends
    }

    /// The total deviation of `voice` from 12-EDO: master bend plus individual bend.
    pub fn posterior_bend(&self, voice: Voice) -> f64 {
        self.master_bend + self.individual_bend(voice)
    }

    pub fn is_tied(&self, voice: Voice) -> bool {
        self.tied[voice.index()]
    }
}

/// Largest pitch change of a held note across a chord change.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TieRetuning {
    pub voice: Voice,

    /// Posterior bend in the previous chord minus posterior bend in the current chord.
    pub amount: f64,
}

/// Observations about a single chord change, exposed for reporting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransitionStatistics {
    /// Index of the chord that has been resolved.
    pub chord_index: usize,

    /// Change of the master bend compared to the previous chord.
    pub drift: f64,

    /// Largest retuning of a held note, if any note was held.
    pub max_tie_retuning: Option<TieRetuning>,

    /// Posterior bend of the lead, i.e. its deviation from 12-EDO.
    pub lead_deviation: f64,

    pub outcome: ResolutionOutcome,
}

impl TransitionStatistics {
    fn between(
        chord_index: usize,
        previous: &ResolvedChord,
        current: &ResolvedChord,
        outcome: ResolutionOutcome,
    ) -> Self {
        let max_tie_retuning = Voice::BY_IMPORTANCE
            .into_iter()
            .filter(|&voice| previous.is_tied(voice))
            .map(|voice| TieRetuning {
                voice,
                amount: previous.posterior_bend(voice) - current.posterior_bend(voice),
            })
            .fold(None, |max: Option<TieRetuning>, candidate| match max {
                Some(max) if max.amount.abs() >= candidate.amount.abs() => Some(max),
                _ => Some(candidate),
            });

        Self {
            chord_index,
            drift: current.master_bend() - previous.master_bend(),
            max_tie_retuning,
            lead_deviation: current.posterior_bend(Voice::Lead),
            outcome,
        }
    }
}

/// The result of tuning a [`Song`]: one [`ResolvedChord`] per chord and statistics for every chord change.
#[derive(Clone, Debug, PartialEq)]
pub struct TunedSong {
    chords: Vec<ResolvedChord>,
    statistics: Vec<TransitionStatistics>,
}

impl TunedSong {
    pub fn chords(&self) -> &[ResolvedChord] {
        &self.chords
    }

    /// Statistics for every chord change, starting with the change into the second chord.
    pub fn statistics(&self) -> &[TransitionStatistics] {
        &self.statistics
    }

    /// Sum of all drifts, i.e. the change of the master bend between the first and the last chord.
    pub fn cumulative_drift(&self) -> f64 {
        self.statistics.iter().map(|stats| stats.drift).sum()
    }
}

/// Tunes songs using a fixed set of [`TunerOptions`] and [`TuningTables`].
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use barbershop::chord::{Chord, ChordType, Note, Song, Voice};
/// # use barbershop::tuner::{BarbershopTuner, TunerOptions};
/// # use barbershop::table::TuningTables;
/// let c_major = Chord::new(
///     0,
///     ChordType::Major,
///     [Some(Note::new(48, false)), Some(Note::new(55, false)), Some(Note::new(64, true)), Some(Note::new(72, false))],
///     480,
/// );
/// let a_minor = Chord::new(
///     9,
///     ChordType::Minor,
///     [Some(Note::new(45, false)), Some(Note::new(57, false)), Some(Note::new(64, false)), Some(Note::new(72, false))],
///     480,
/// );
/// let song = Song::new(vec![c_major, a_minor]).unwrap();
///
/// let tuner = BarbershopTuner::new(TunerOptions::default(), TuningTables::default());
/// let tuned = tuner.tune_song(&song).unwrap();
///
/// // The lead starts in 12-EDO
/// assert_approx_eq!(tuned.chords()[0].posterior_bend(Voice::Lead), 0.0);
///
/// // The held E does not retune by more than 3 cents
/// let retuning = tuned.statistics()[0].max_tie_retuning.unwrap();
/// assert_eq!(retuning.voice, Voice::Lead);
/// assert!(retuning.amount.abs() <= 0.03 + 1e-7);
/// ```
#[derive(Clone, Debug)]
pub struct BarbershopTuner {
    options: TunerOptions,
    tables: TuningTables,
}

impl BarbershopTuner {
    pub fn new(options: TunerOptions, tables: TuningTables) -> Self {
        Self { options, tables }
    }

    pub fn options(&self) -> &TunerOptions {
        &self.options
    }

    pub fn tables(&self) -> &TuningTables {
        &self.tables
    }

    /// Computes the individual bends of every voice of `chord` (vertical step).
    pub fn tune_vertically(&self, chord: &Chord) -> [f64; NUM_VOICES] {
        individual_bends(
            chord,
            self.tables.table(chord.chord_type()),
            self.options.half_step_size,
        )
    }

    /// Tunes all chords of `song`.
    ///
    /// The vertical step is applied to every chord independently. The horizontal step then resolves the chords strictly in score order since every chord depends on the resolved state of its predecessor.
    pub fn tune_song(&self, song: &Song) -> Result<TunedSong, TuningError> {
        let mut chords = song
            .chords()
            .iter()
            .map(|chord| (chord, self.tune_vertically(chord)));

        let (first_chord, first_bends) = chords.next().ok_or(TuningError::EmptySong)?;
        let mut previous = ResolvedChord::first(&first_bends, tied_voices(first_chord));
        info!(
            "Set master bend for chord 0 to {:.4}",
            previous.master_bend()
        );

        let mut resolved = Vec::with_capacity(song.len());
        let mut statistics = Vec::with_capacity(song.len().saturating_sub(1));
        resolved.push(previous);

        for (chord_index, (chord, individual_bends)) in (1..).zip(chords) {
            let resolution = resolve_master_bend(&self.options, &previous, &individual_bends)
                .map_err(|error| TuningError::Resolve { chord_index, error })?;
            info!(
                "Set master bend for chord {} to {:.4}",
                chord_index, resolution.master_bend
            );

            let current = ResolvedChord::new(
                resolution.master_bend,
                individual_bends,
                tied_voices(chord),
            );
            statistics.push(TransitionStatistics::between(
                chord_index,
                &previous,
                &current,
                resolution.outcome,
            ));
            resolved.push(current);
            previous = current;
        }

        Ok(TunedSong {
            chords: resolved,
            statistics,
        })
    }
}

fn tied_voices(chord: &Chord) -> [bool; NUM_VOICES] {
    Voice::ALL.map(|voice| chord.is_tied(voice))
}

/// Error reported when tuning a [`Song`] fails.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TuningError {
    /// There is no chord to tune.
    EmptySong,

    /// The master bend of the chord at `chord_index` could not be resolved.
    Resolve {
        chord_index: usize,
        error: ResolveError,
    },
}

impl Display for TuningError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TuningError::EmptySong => write!(f, "The song does not contain any chord"),
            TuningError::Resolve { chord_index, error } => {
                write!(f, "Could not resolve chord {chord_index}: {error}")
            }
        }
    }
}
