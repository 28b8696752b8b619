//! Lexical extraction passes over IR text.
//!
//! Four linear scans, all surface-token based:
//! - [`split`]: function regions and basic blocks
//! - [`instr`]: instruction classification and tallies
//! - [`loops`]: loop-marked regions and loop aggregates
//! - [`calls`]: call edges, recursion, caller height, profiling counts
//!
//! [`features`] merges the pass outputs into feature rows.
//!
//! None of these passes ever fail: unmatched braces truncate the affected
//! region, missing markers or metadata yield zero-valued defaults, and
//! ambiguous matches degrade rather than abort.

pub mod calls;
pub mod features;
pub mod instr;
pub mod loops;
pub mod split;
