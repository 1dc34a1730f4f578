//! Trailing whitespace normalization for text buffers on save.
//!
//! Given the full text of a buffer, the engine computes the deletions that
//! strip horizontal whitespace before every line terminator and drop surplus
//! blank lines at the end of the buffer. A [`session::TrimSession`] can also
//! remember the whitespace the user typed up to the cursor and put it back
//! after the save, so trimming never disturbs a line being edited.
//!
//! Layers, leaf first:
//!
//! - [`text`]: snapshots and the line offset index
//! - [`scan`]: trailing whitespace and blank tail scanners
//! - [`cursor`]: cursor whitespace capture and restore planning
//! - [`session`]: the trim/restore state machine and the session registry
//! - [`host`]: documents, persistence and the save cycle
//! - [`config`], [`events`], [`cli`]: configuration, event log, commands

pub mod cli;
pub mod config;
pub mod cursor;
pub mod edit;
pub mod error;
pub mod events;
pub mod host;
pub mod scan;
pub mod session;
pub mod text;

pub use edit::{DeletionRange, Insertion};
pub use error::EngineError;
pub use session::{RestoreResult, SessionRegistry, TrimOptions, TrimResult, TrimSession};
pub use text::{LineOffsetIndex, LineTerminator, TextSnapshot};
