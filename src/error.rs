//! Error taxonomy for the trim engine.
//!
//! Scanners are total over a well-formed snapshot and never fail. Errors
//! only come from addressing (a line or offset outside the snapshot) and
//! from misuse of the host-side registry.

use std::fmt;

/// What kind of coordinate was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    Offset,
    Line,
    Column,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset => write!(f, "offset"),
            Self::Line => write!(f, "line"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Errors surfaced by the engine and the session registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A line, offset or column lies outside the snapshot. Never clamped.
    #[error("{kind} {index} out of bounds (limit {limit})")]
    OutOfBounds {
        kind: Coordinate,
        index: usize,
        limit: usize,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl EngineError {
    pub(crate) fn offset(index: usize, limit: usize) -> Self {
        Self::OutOfBounds {
            kind: Coordinate::Offset,
            index,
            limit,
        }
    }

    pub(crate) fn line(index: usize, limit: usize) -> Self {
        Self::OutOfBounds {
            kind: Coordinate::Line,
            index,
            limit,
        }
    }

    pub(crate) fn column(index: usize, limit: usize) -> Self {
        Self::OutOfBounds {
            kind: Coordinate::Column,
            index,
            limit,
        }
    }
}
