//! Error taxonomy for `Map` operations.
//!
//! Lookup misses are not errors anywhere in this crate; they surface as
//! `Ok(None)`. The variants here are the fault classes that do propagate.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// An operation ran after `free`; the handle is gone and nothing may
    /// dereference it.
    #[error("map was freed and can no longer be used")]
    UseAfterFree,

    /// Removal reported failure for a key the preceding lookup found.
    /// Signals a broken invariant (e.g. the handle was mutated externally
    /// between the two steps); never swallowed.
    #[error("failed to remove key {:?} after lookup found it", String::from_utf8_lossy(.key))]
    RemovalFailure { key: Vec<u8> },
}

pub type Result<T> = std::result::Result<T, MapError>;
