//! EQ advice for EvenTone
//!
//! Maps band imbalance findings to skill-appropriate advisory text.

pub mod composer;
pub mod table;

pub use composer::{compose, elaboration, BALANCED_MESSAGE};
pub use table::AdvisoryTable;
