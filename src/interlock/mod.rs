//! Interlock system: proximity/alignment evaluation and the one-way lock.

mod pair;
mod system;

pub use pair::{CandidatePair, PairKey, PairState};
pub use system::InterlockSystem;
