//! Exact frequency ratios of just intervals.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::parse;

/// Struct representing a just interval above a chord root as an exact ratio of two integers.
///
/// Both the numerator and the denominator are stored as positive numbers, s.t. the interval is always a valid frequency ratio. A fraction with two negative terms is normalized.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use barbershop::fraction::Fraction;
/// let major_third = Fraction::new(5, 4).unwrap();
/// assert_approx_eq!(major_third.as_float(), 1.25);
/// assert_approx_eq!(major_third.as_semitones(), 3.863137);
///
/// let parsed = "5/4 # major third".parse::<Fraction>().unwrap();
/// assert_eq!(parsed, major_third);
/// assert_eq!(parsed.to_string(), "5/4");
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Fraction {
    numer: i32,
    denom: i32,
}

impl Fraction {
    pub const UNISON: Fraction = Fraction::new_unchecked(1, 1);

    /// Creates a new [`Fraction`], failing if `denom` is 0 or the ratio is not positive.
    pub fn new(numer: i32, denom: i32) -> Result<Self, FractionError> {
        let input = || format!("{numer}/{denom}");
        if denom == 0 {
            return Err(FractionError::ZeroDenominator { input: input() });
        }
        let (numer, denom) = match (numer.checked_neg(), denom.checked_neg()) {
            (Some(negated_numer), Some(negated_denom)) if denom < 0 => {
                (negated_numer, negated_denom)
            }
            _ => (numer, denom),
        };
        if numer <= 0 || denom < 0 {
            return Err(FractionError::NotPositive { input: input() });
        }
        Ok(Self::new_unchecked(numer, denom))
    }

    pub(crate) const fn new_unchecked(numer: i32, denom: i32) -> Self {
        Self { numer, denom }
    }

    pub fn numer(self) -> i32 {
        self.numer
    }

    pub fn denom(self) -> i32 {
        self.denom
    }

    /// The linear frequency factor `numer / denom`.
    pub fn as_float(self) -> f64 {
        f64::from(self.numer) / f64::from(self.denom)
    }

    /// The size of the interval in 12-EDO semitones, i.e. `12 * log2(numer / denom)`.
    pub fn as_semitones(self) -> f64 {
        12.0 * self.as_float().log2()
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(&format!("{}/{}", self.numer, self.denom))
    }
}

/// [`Fraction`]s are parsed from `N/D` expressions. Everything behind a `#` is treated as a comment.
///
/// # Examples
///
/// ```
/// # use barbershop::fraction::Fraction;
/// # use barbershop::fraction::FractionError;
/// assert_eq!("3/2".parse::<Fraction>().unwrap(), Fraction::new(3, 2).unwrap());
/// assert_eq!(" 7/4 # harmonic seventh".parse::<Fraction>().unwrap(), Fraction::new(7, 4).unwrap());
///
/// assert!(matches!("3".parse::<Fraction>(), Err(FractionError::Malformed { .. })));
/// assert!(matches!("3/2/1".parse::<Fraction>(), Err(FractionError::Malformed { .. })));
/// assert!(matches!("3/x".parse::<Fraction>(), Err(FractionError::Malformed { .. })));
/// assert!(matches!("3/0".parse::<Fraction>(), Err(FractionError::ZeroDenominator { .. })));
/// assert!(matches!("-3/2".parse::<Fraction>(), Err(FractionError::NotPositive { .. })));
/// ```
impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expression = parse::strip_comment(s);
        let malformed = || FractionError::Malformed {
            input: expression.to_owned(),
        };

        if let [numer, denom] = expression.split('/').collect::<Vec<_>>().as_slice() {
            let numer = numer.trim().parse().map_err(|_| malformed())?;
            let denom = denom.trim().parse().map_err(|_| malformed())?;
            Fraction::new(numer, denom).map_err(|err| err.with_input(expression))
        } else {
            Err(malformed())
        }
    }
}

/// Error reported when a [`Fraction`] cannot be constructed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FractionError {
    /// The text does not consist of exactly two integers separated by a single `/`.
    Malformed { input: String },

    /// The denominator is 0.
    ZeroDenominator { input: String },

    /// The fraction evaluates to zero or a negative number.
    NotPositive { input: String },
}

impl FractionError {
    fn with_input(self, input: &str) -> Self {
        let input = input.to_owned();
        match self {
            FractionError::Malformed { .. } => FractionError::Malformed { input },
            FractionError::ZeroDenominator { .. } => FractionError::ZeroDenominator { input },
            FractionError::NotPositive { .. } => FractionError::NotPositive { input },
        }
    }
}

impl Display for FractionError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FractionError::Malformed { input } => write!(
                f,
                "The fraction '{input}' can't be parsed: Must be of the form N/D (e.g. 5/4)"
            ),
            FractionError::ZeroDenominator { input } => {
                write!(f, "The fraction '{input}' has 0 as its denominator")
            }
            FractionError::NotPositive { input } => {
                write!(f, "The fraction '{input}' must be positive")
            }
        }
    }
}
