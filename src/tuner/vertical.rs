use log::debug;

use crate::chord::Chord;
use crate::chord::Voice;
use crate::chord::NUM_VOICES;
use crate::table::IntervalTable;

/// Calculates how far a note with the given `pitch_class` deviates from 12-EDO when tuned justly above `root`.
///
/// The result is measured in units of `half_step_size` per 12-EDO semitone.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use barbershop::chord::ChordType;
/// # use barbershop::table::TuningTables;
/// # use barbershop::tuner;
/// let tables = TuningTables::default();
/// let major = tables.table(ChordType::Major);
///
/// // The just major third (5/4) is about 13.7 cents flat of 12-EDO
/// assert_approx_eq!(tuner::individual_bend(4, 0, major, 1.0), -0.136863);
///
/// // Same interval above a different root
/// assert_approx_eq!(tuner::individual_bend(1, 9, major, 1.0), -0.136863);
///
/// // The just fifth (3/2) is about 2 cents sharp, scaled to a half step of 100 units
/// assert_approx_eq!(tuner::individual_bend(7, 0, major, 100.0), 1.955001);
/// ```
pub fn individual_bend(
    pitch_class: u8,
    root: u8,
    table: &IntervalTable,
    half_step_size: f64,
) -> f64 {
    let semitones_above_root = (i32::from(pitch_class) - i32::from(root)).rem_euclid(12) as u8;
    let interval = table.interval(semitones_above_root);

    let just_distance = half_step_size * interval.as_semitones();
    let bend = just_distance - f64::from(semitones_above_root) * half_step_size;

    debug!(
        "Tuning pitch class {} with root {} to {:+.4} using fraction {}",
        pitch_class, root, bend, interval
    );
    bend
}

/// Calculates the individual bend of every voice of `chord`. Silent voices receive a bend of 0.
pub fn individual_bends(
    chord: &Chord,
    table: &IntervalTable,
    half_step_size: f64,
) -> [f64; NUM_VOICES] {
    let mut bends = [0.0; NUM_VOICES];
    for voice in Voice::ALL {
        if let Some(note) = chord.voice(voice) {
            bends[voice.index()] =
                individual_bend(note.pitch_class(), chord.root(), table, half_step_size);
        }
    }
    bends
}
