//! Adaptive just intonation for four-part barbershop arrangements.
//!
//! The crate tunes every chord of a [`chord::Song`] in just intonation while keeping held notes and the lead from audibly retuning across chord changes. The results are encoded as MIDI pitch-bend values.

mod parse;

pub mod bend;
pub mod chord;
pub mod fraction;
pub mod midi;
pub mod range;
pub mod score;
pub mod table;
pub mod tuner;
