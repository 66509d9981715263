//! Error types and result definitions for the boreal block store.
//!
//! Boreal uses a single error enum ([`Error`]) across all of its crates. All
//! fallible operations return [`Result<T>`], and errors propagate upward with
//! the `?` operator; nothing in the workspace logs-and-swallows an error.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
