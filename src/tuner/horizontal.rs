use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use log::debug;
use log::warn;

use crate::chord::Voice;
use crate::chord::NUM_VOICES;
use crate::range::BendRange;
use crate::range::RangeError;

use super::Priority;
use super::ResolvedChord;
use super::TunerOptions;

/// The voice or role a [`Constraint`] protects.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstraintSource {
    /// A note held from the previous chord.
    Tie(Voice),

    /// The melody, constrained whether or not it is held.
    Lead,
}

impl Display for ConstraintSource {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ConstraintSource::Tie(voice) => write!(f, "tied {voice}"),
            ConstraintSource::Lead => write!(f, "lead"),
        }
    }
}

/// A limit on how far a single voice may move across a chord change.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Constraint {
    pub source: ConstraintSource,

    /// How far the voice would move if the master bend of the current chord was 0.
    pub difference: f64,

    /// The allowed movement around 0.
    pub tolerance: BendRange,
}

impl Constraint {
    /// The master bends which keep the voice within its tolerance.
    pub fn range(&self) -> BendRange {
        self.tolerance.translate(self.difference)
    }

    /// Whether a master bend of 0 keeps the voice within its tolerance.
    pub fn is_met_without_bend(&self) -> bool {
        self.tolerance.contains(self.difference)
    }
}

/// Builds the constraints of the transition from `previous` into a chord with the given `individual_bends`.
///
/// Held notes are visited in the order of [`Voice::BY_IMPORTANCE`]. The lead constraint precedes or follows them depending on [`TunerOptions::priority`].
///
/// # Examples
///
/// ```
/// # use barbershop::chord::Voice;
/// # use barbershop::tuner::{self, ConstraintSource, ResolvedChord, TunerOptions, Priority};
/// let previous = ResolvedChord::new(0.0, [0.0; 4], [true, false, true, false]);
///
/// let sources = |priority| {
///     let options = TunerOptions { priority, ..Default::default() };
///     tuner::constraints(&options, &previous, &[0.0; 4])
///         .into_iter()
///         .map(|constraint| constraint.source)
///         .collect::<Vec<_>>()
/// };
///
/// assert_eq!(
///     sources(Priority::TiesFirst),
///     [ConstraintSource::Tie(Voice::Lead), ConstraintSource::Tie(Voice::Bass), ConstraintSource::Lead]
/// );
/// assert_eq!(
///     sources(Priority::LeadFirst),
///     [ConstraintSource::Lead, ConstraintSource::Tie(Voice::Lead), ConstraintSource::Tie(Voice::Bass)]
/// );
/// ```
pub fn constraints(
    options: &TunerOptions,
    previous: &ResolvedChord,
    individual_bends: &[f64; NUM_VOICES],
) -> Vec<Constraint> {
    let difference =
        |voice: Voice| previous.posterior_bend(voice) - individual_bends[voice.index()];

    let ties = Voice::BY_IMPORTANCE
        .into_iter()
        .filter(|&voice| previous.is_tied(voice))
        .map(|voice| Constraint {
            source: ConstraintSource::Tie(voice),
            difference: difference(voice),
            tolerance: BendRange::symmetric(options.tie_radius),
        });

    let lead = Constraint {
        source: ConstraintSource::Lead,
        difference: difference(Voice::Lead),
        tolerance: BendRange::symmetric(options.lead_radius),
    };

    match options.priority {
        Priority::TiesFirst => ties.chain([lead]).collect(),
        Priority::LeadFirst => [lead].into_iter().chain(ties).collect(),
    }
}

/// How the master bend of a chord was chosen.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResolutionOutcome {
    /// No voice leaves its tolerance without a master bend.
    ZeroDrift,

    /// All constraints are met by the master bend closest to 0.
    AllSatisfied,

    /// The constraint `unmet` (and every constraint with a lower priority) had to be sacrificed.
    Compromised { unmet: ConstraintSource },
}

/// The master bend chosen for a chord.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolution {
    pub master_bend: f64,
    pub outcome: ResolutionOutcome,
}

/// Chooses the master bend of the chord following `previous`.
///
/// If no voice leaves its tolerance the master bend is 0. Otherwise, the constraint ranges are collapsed in priority order into a single window. When a constraint does not overlap the window the boundary of the window nearest to that constraint is chosen and all remaining constraints are ignored. If all constraints overlap the value of the window closest to 0 is chosen.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use barbershop::chord::Voice;
/// # use barbershop::tuner::{self, ConstraintSource, ResolutionOutcome, ResolvedChord, TunerOptions};
/// let options = TunerOptions::default();
///
/// // The lead held its note at 20 cents sharp
/// let previous = ResolvedChord::new(0.2, [0.0; 4], [false, false, true, false]);
///
/// let resolution = tuner::resolve_master_bend(&options, &previous, &[0.0; 4]).unwrap();
/// assert_approx_eq!(resolution.master_bend, 0.17);
/// assert_eq!(resolution.outcome, ResolutionOutcome::AllSatisfied);
/// ```
pub fn resolve_master_bend(
    options: &TunerOptions,
    previous: &ResolvedChord,
    individual_bends: &[f64; NUM_VOICES],
) -> Result<Resolution, ResolveError> {
    let constraints = constraints(options, previous, individual_bends);

    if let Some(constraint) = constraints
        .iter()
        .find(|constraint| constraint.tolerance.is_degenerate())
    {
        return Err(ResolveError::Range(RangeError::Degenerate {
            range: constraint.tolerance,
        }));
    }

    for constraint in &constraints {
        debug!(
            "Constraint {} moves by {:+.4} and allows {}",
            constraint.source,
            constraint.difference,
            constraint.range()
        );
    }

    let mut remaining = constraints.iter();
    let mut window = match remaining.next() {
        Some(first) if !constraints.iter().all(Constraint::is_met_without_bend) => first.range(),
        _ => {
            debug!("All constraints met without master bend");
            return Ok(Resolution {
                master_bend: 0.0,
                outcome: ResolutionOutcome::ZeroDrift,
            });
        }
    };

    for constraint in remaining {
        let range = constraint.range();
        let distance = window.distance(range);
        if distance > 0.0 {
            warn!(
                "Constraint of {} cannot be satisfied, choosing the highest possible master bend",
                constraint.source
            );
            return Ok(Resolution {
                master_bend: window.upper(),
                outcome: ResolutionOutcome::Compromised {
                    unmet: constraint.source,
                },
            });
        }
        if distance < 0.0 {
            warn!(
                "Constraint of {} cannot be satisfied, choosing the lowest possible master bend",
                constraint.source
            );
            return Ok(Resolution {
                master_bend: window.lower(),
                outcome: ResolutionOutcome::Compromised {
                    unmet: constraint.source,
                },
            });
        }
        window = window.intersect(range).map_err(ResolveError::Range)?;
    }

    let master_bend = if window.lower() > 0.0 {
        window.lower()
    } else if window.upper() < 0.0 {
        window.upper()
    } else {
        return Err(ResolveError::FastPathMismatch { window });
    };

    debug!("All constraints satisfied within {}", window);
    Ok(Resolution {
        master_bend,
        outcome: ResolutionOutcome::AllSatisfied,
    })
}

/// Error reported when the master bend of a chord cannot be resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResolveError {
    /// A constraint range is malformed, e.g. due to a negative radius.
    Range(RangeError),

    /// At least one constraint rejected a master bend of 0 but the collapsed `window` contains 0.
    FastPathMismatch { window: BendRange },
}

impl From<RangeError> for ResolveError {
    fn from(v: RangeError) -> Self {
        Self::Range(v)
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ResolveError::Range(err) => write!(f, "{err}"),
            ResolveError::FastPathMismatch { window } => write!(
                f,
                "The window {window} contains 0 although a master bend of 0 violates a constraint"
            ),
        }
    }
}
