//! Closed intervals of bend values and the algebra the horizontal tuning step is built on.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// Tolerance used for all containment and distance comparisons.
///
/// Bends are sums of `log2` results, s.t. values which should coincide may differ in their last bits.
pub const EPSILON: f64 = 1e-7;

/// A closed interval `[lower, upper]` of bend values in semitones.
///
/// # Examples
///
/// ```
/// # use barbershop::range::BendRange;
/// let tolerance = BendRange::symmetric(0.03);
/// assert!(tolerance.contains(0.0));
/// assert!(tolerance.contains(-0.03));
/// assert!(!tolerance.contains(0.031));
///
/// let shifted = tolerance.translate(0.1);
/// assert!((shifted.lower() - 0.07).abs() < 1e-12);
/// assert!((shifted.upper() - 0.13).abs() < 1e-12);
/// assert!((tolerance.distance(shifted) - 0.04).abs() < 1e-12);
/// assert!((shifted.distance(tolerance) + 0.04).abs() < 1e-12);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BendRange {
    lower: f64,
    upper: f64,
}

impl BendRange {
    /// Creates a new [`BendRange`]. A `lower` bound above `upper` yields a degenerate range which is rejected by [`BendRange::intersect`].
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Creates the range `[-radius, radius]`.
    pub fn symmetric(radius: f64) -> Self {
        Self::new(-radius, radius)
    }

    pub fn lower(self) -> f64 {
        self.lower
    }

    pub fn upper(self) -> f64 {
        self.upper
    }

    pub fn is_degenerate(self) -> bool {
        self.lower > self.upper
    }

    pub fn contains(self, value: f64) -> bool {
        self.lower - EPSILON <= value && value <= self.upper + EPSILON
    }

    /// Signed gap between `self` and `other`.
    ///
    /// The result is 0 if both ranges overlap. Otherwise, it is positive if `other` lies entirely above `self` and negative if `other` lies entirely below `self`.
    pub fn distance(self, other: BendRange) -> f64 {
        if other.lower > self.upper + EPSILON {
            other.lower - self.upper
        } else if other.upper < self.lower - EPSILON {
            other.upper - self.lower
        } else {
            0.0
        }
    }

    /// Returns the overlapping part of `self` and `other`.
    ///
    /// The result is never wider than `self`. If both ranges merely touch within [`EPSILON`], the result is the touching bound of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use barbershop::range::BendRange;
    /// # use barbershop::range::RangeError;
    /// let window = BendRange::new(-0.1, 0.2);
    ///
    /// assert_eq!(window.intersect(BendRange::new(0.0, 0.5)), Ok(BendRange::new(0.0, 0.2)));
    /// assert_eq!(window.intersect(BendRange::new(-1.0, 1.0)), Ok(window));
    /// assert!(matches!(window.intersect(BendRange::new(0.3, 0.5)), Err(RangeError::Disjoint { .. })));
    /// assert!(matches!(window.intersect(BendRange::new(0.5, 0.3)), Err(RangeError::Degenerate { .. })));
    /// ```
    pub fn intersect(self, other: BendRange) -> Result<BendRange, RangeError> {
        for range in [self, other] {
            if range.is_degenerate() {
                return Err(RangeError::Degenerate { range });
            }
        }

        let distance = self.distance(other);
        if distance != 0.0 {
            return Err(RangeError::Disjoint {
                first: self,
                second: other,
                distance,
            });
        }

        if other.lower > self.upper {
            Ok(BendRange::new(self.upper, self.upper))
        } else if other.upper < self.lower {
            Ok(BendRange::new(self.lower, self.lower))
        } else {
            Ok(BendRange::new(
                self.lower.max(other.lower),
                self.upper.min(other.upper),
            ))
        }
    }

    /// Shifts both bounds by `delta`.
    pub fn translate(self, delta: f64) -> BendRange {
        BendRange::new(self.lower + delta, self.upper + delta)
    }
}

impl Display for BendRange {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        write!(
            f,
            "[{:+.precision$}, {:+.precision$}]",
            self.lower, self.upper
        )
    }
}

/// Error reported by [`BendRange::intersect`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RangeError {
    /// The lower bound of `range` lies above its upper bound.
    Degenerate { range: BendRange },

    /// The ranges do not overlap.
    Disjoint {
        first: BendRange,
        second: BendRange,
        distance: f64,
    },
}

impl Display for RangeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RangeError::Degenerate { range } => {
                write!(f, "The range {range} has its lower bound above its upper bound")
            }
            RangeError::Disjoint {
                first,
                second,
                distance,
            } => write!(
                f,
                "The ranges {first} and {second} do not overlap (distance {distance:+.4})"
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn containment_is_tolerant() {
        let range = BendRange::new(0.1, 0.2);
        assert!(range.contains(0.15));
        assert!(range.contains(0.1 - EPSILON / 2.0));
        assert!(range.contains(0.2 + EPSILON / 2.0));
        assert!(!range.contains(0.1 - 2.0 * EPSILON));
        assert!(!range.contains(0.2 + 2.0 * EPSILON));
    }

    #[test]
    fn distance_sign_points_towards_other_range() {
        let base = BendRange::new(-0.03, 0.03);

        assert_eq!(base.distance(BendRange::new(0.0, 0.1)), 0.0);
        assert_eq!(base.distance(BendRange::new(-1.0, 1.0)), 0.0);
        assert_eq!(base.distance(BendRange::new(0.03, 0.05)), 0.0);
        assert_eq!(base.distance(BendRange::new(0.03 + EPSILON / 2.0, 0.05)), 0.0);

        assert_approx_eq!(base.distance(BendRange::new(0.07, 0.13)), 0.04);
        assert_approx_eq!(base.distance(BendRange::new(-0.13, -0.07)), -0.04);
    }

    #[test]
    fn intersection_never_widens_the_window() {
        let mut window = BendRange::new(-0.5, 0.5);
        let constraints = [
            BendRange::new(-1.0, 0.2),
            BendRange::new(-0.3, 0.4),
            BendRange::new(-2.0, 2.0),
            BendRange::new(0.1, 0.15),
            BendRange::new(0.15 + EPSILON / 2.0, 0.3),
        ];

        for constraint in constraints {
            let tightened = window.intersect(constraint).unwrap();
            assert!(tightened.lower() >= window.lower());
            assert!(tightened.upper() <= window.upper());
            assert!(!tightened.is_degenerate());
            window = tightened;
        }

        assert_eq!(window, BendRange::new(0.15, 0.15));
    }

    #[test]
    fn touching_below_collapses_to_lower_bound() {
        let window = BendRange::new(0.0, 0.1);
        let touching = BendRange::new(-0.1, -EPSILON / 2.0);
        assert_eq!(window.intersect(touching), Ok(BendRange::new(0.0, 0.0)));
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        let degenerate = BendRange::new(0.2, 0.1);
        assert!(degenerate.is_degenerate());
        assert_eq!(
            BendRange::symmetric(1.0).intersect(degenerate),
            Err(RangeError::Degenerate { range: degenerate })
        );
        assert_eq!(
            degenerate.intersect(BendRange::symmetric(1.0)),
            Err(RangeError::Degenerate { range: degenerate })
        );
    }

    #[test]
    fn format_range() {
        assert_eq!(BendRange::new(-0.03, 0.15).to_string(), "[-0.0300, +0.1500]");
        assert_eq!(format!("{:.1}", BendRange::new(-0.03, 0.15)), "[-0.0, +0.1]");
    }
}
