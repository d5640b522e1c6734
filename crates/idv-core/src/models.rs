//! Domain models.
//!
//! `session`, `document` and `audit` mirror the three storage tables.
//! `verification` is the aggregated, UI-facing view computed on read.

pub mod audit;
pub mod document;
pub mod session;
pub mod verification;
