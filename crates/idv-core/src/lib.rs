//! IDV Core — domain models, repository traits, and error types shared
//! by the storage, verification, and server crates.

pub mod error;
pub mod models;
pub mod repository;
