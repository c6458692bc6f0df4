//! The reference lifecycle manager.
//!
//! One [`Checker::check`] call walks a reference through its states:
//!
//! ```text
//! Absent ──create──▶ Created (established)
//! Present ──decode+compare──▶ Match (pass)
//!                          └─▶ Staged ──prompt──▶ Accepted (established)
//!                                             └─▶ Rejected (fail)
//!                                    (no prompt) NonInteractiveMismatch
//! ```
//!
//! An existing reference is only ever modified by the accept step.

mod checker;
mod options;
mod outcome;

#[cfg(test)]
mod tests;

pub use checker::Checker;
pub use options::CheckOptions;
pub use outcome::{CheckOutcome, Resolution, Verdict};
