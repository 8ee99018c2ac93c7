//! Just-intonation interval tables per chord type.
//!
//! A table file lists one fraction per semitone above the chord root:
//!
//! ```text
//! 1/1   # unison
//! 16/15
//! 9/8
//! 6/5   # minor third
//! 5/4   # major third
//! ...
//! ```

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io;
use std::io::Read;

use crate::chord::ChordType;
use crate::fraction::Fraction;
use crate::fraction::FractionError;
use crate::parse;

pub const NUM_INTERVALS: usize = 12;

const fn f(numer: i32, denom: i32) -> Fraction {
    Fraction::new_unchecked(numer, denom)
}

/// 17-limit table with a harmonic seventh, used for major and dominant seventh chords.
pub const MAJOR_LIMIT_17: [Fraction; NUM_INTERVALS] = [
    f(1, 1),
    f(17, 16),
    f(9, 8),
    f(6, 5),
    f(5, 4),
    f(4, 3),
    f(17, 12),
    f(3, 2),
    f(8, 5),
    f(5, 3),
    f(7, 4),
    f(15, 8),
];

/// 7-limit table, used for minor and half-diminished seventh chords (5:6:7:9).
pub const MINOR_LIMIT_7: [Fraction; NUM_INTERVALS] = [
    f(1, 1),
    f(16, 15),
    f(9, 8),
    f(6, 5),
    f(5, 4),
    f(4, 3),
    f(7, 5),
    f(3, 2),
    f(8, 5),
    f(5, 3),
    f(9, 5),
    f(15, 8),
];

/// 17-limit table for diminished seventh chords (10:12:14:17).
pub const DIMINISHED7_LIMIT_17: [Fraction; NUM_INTERVALS] = [
    f(1, 1),
    f(16, 15),
    f(9, 8),
    f(6, 5),
    f(5, 4),
    f(4, 3),
    f(7, 5),
    f(3, 2),
    f(8, 5),
    f(17, 10),
    f(7, 4),
    f(15, 8),
];

/// The just intervals of a chord type, indexed by the number of semitones above the chord root.
///
/// # Examples
///
/// ```
/// # use barbershop::fraction::Fraction;
/// # use barbershop::table::IntervalTable;
/// # use barbershop::table::TableError;
/// let table = IntervalTable::import(
///     "1/1\n16/15\n9/8\n6/5\n5/4 # major third\n4/3\n45/32\n3/2\n8/5\n5/3\n9/5\n15/8\n".as_bytes(),
/// )
/// .unwrap();
/// assert_eq!(table.interval(4), Fraction::new(5, 4).unwrap());
///
/// let too_short = IntervalTable::from_fractions(vec![Fraction::UNISON; 11]);
/// assert_eq!(too_short.unwrap_err(), TableError::WrongNumberOfEntries(11));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IntervalTable {
    intervals: [Fraction; NUM_INTERVALS],
}

impl IntervalTable {
    pub const fn from_array(intervals: [Fraction; NUM_INTERVALS]) -> Self {
        Self { intervals }
    }

    /// Creates an [`IntervalTable`] from exactly [`NUM_INTERVALS`] fractions.
    pub fn from_fractions(
        fractions: impl IntoIterator<Item = Fraction>,
    ) -> Result<Self, TableError> {
        let fractions: Vec<_> = fractions.into_iter().collect();
        let num_entries = fractions.len();
        let intervals = fractions
            .try_into()
            .map_err(|_| TableError::WrongNumberOfEntries(num_entries))?;
        Ok(Self { intervals })
    }

    /// Reads an [`IntervalTable`] from a text source with one fraction per line.
    ///
    /// Blank lines and comments starting with `#` are ignored.
    pub fn import(reader: impl Read) -> Result<Self, TableImportError> {
        let fractions = parse::consume_lines(
            Vec::with_capacity(NUM_INTERVALS),
            reader,
            |mut fractions, line_number, line| -> Result<_, TableImportError> {
                let line = parse::strip_comment(line);
                if !line.is_empty() {
                    let fraction: Fraction = line
                        .parse()
                        .map_err(|error| TableImportError::ParseError { line_number, error })?;
                    fractions.push(fraction);
                }
                Ok(fractions)
            },
        )?;
        Ok(Self::from_fractions(fractions)?)
    }

    /// Returns the just interval `semitones_above_root` semitones above the chord root.
    ///
    /// # Panics
    ///
    /// Panics if `semitones_above_root` is not smaller than [`NUM_INTERVALS`].
    pub fn interval(&self, semitones_above_root: u8) -> Fraction {
        self.intervals[usize::from(semitones_above_root)]
    }

    pub fn intervals(&self) -> &[Fraction; NUM_INTERVALS] {
        &self.intervals
    }
}

/// Error reported when the number of entries of an [`IntervalTable`] is not [`NUM_INTERVALS`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TableError {
    WrongNumberOfEntries(usize),
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TableError::WrongNumberOfEntries(num_entries) => write!(
                f,
                "The tuning table has {num_entries} entries but exactly {NUM_INTERVALS} are required"
            ),
        }
    }
}

/// Error reported when importing an [`IntervalTable`] fails.
#[derive(Debug)]
pub enum TableImportError {
    IoError(io::Error),
    ParseError {
        line_number: usize,
        error: FractionError,
    },
    TableError(TableError),
}

impl From<io::Error> for TableImportError {
    fn from(v: io::Error) -> Self {
        Self::IoError(v)
    }
}

impl From<TableError> for TableImportError {
    fn from(v: TableError) -> Self {
        Self::TableError(v)
    }
}

impl Display for TableImportError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TableImportError::IoError(err) => write!(f, "IO error / {err}"),
            TableImportError::ParseError { line_number, error } => {
                write!(f, "Line {line_number}: {error}")
            }
            TableImportError::TableError(err) => write!(f, "{err}"),
        }
    }
}

/// Assigns an [`IntervalTable`] to every [`ChordType`].
///
/// The lookup is total: each chord type always has a table.
///
/// # Examples
///
/// ```
/// # use barbershop::chord::ChordType;
/// # use barbershop::fraction::Fraction;
/// # use barbershop::table::TuningTables;
/// let tables = TuningTables::default();
///
/// let barbershop_seventh = tables.table(ChordType::Dominant7).interval(10);
/// assert_eq!(barbershop_seventh, Fraction::new(7, 4).unwrap());
///
/// let minor_third = tables.table(ChordType::Minor).interval(3);
/// assert_eq!(minor_third, Fraction::new(6, 5).unwrap());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TuningTables {
    tables: [IntervalTable; 5],
}

impl TuningTables {
    pub fn table(&self, chord_type: ChordType) -> &IntervalTable {
        &self.tables[chord_type.index()]
    }

    /// Replaces the table used for `chord_type`.
    pub fn with_table(mut self, chord_type: ChordType, table: IntervalTable) -> Self {
        self.tables[chord_type.index()] = table;
        self
    }
}

impl Default for TuningTables {
    fn default() -> Self {
        Self {
            tables: [
                IntervalTable::from_array(MAJOR_LIMIT_17),
                IntervalTable::from_array(MINOR_LIMIT_7),
                IntervalTable::from_array(MAJOR_LIMIT_17),
                IntervalTable::from_array(DIMINISHED7_LIMIT_17),
                IntervalTable::from_array(MINOR_LIMIT_7),
            ],
        }
    }
}
