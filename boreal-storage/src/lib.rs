//! Object-store bucket abstraction for the boreal block store.
//!
//! The [`Bucket`] trait is the storage capability the engine consumes:
//! streaming uploads, lexically ordered child listing, object stat, and
//! ranged reads. Two adapters ship with the crate: [`MemBucket`] for tests
//! and purely in-memory operation, and [`LocalBucket`] for embedded
//! persistence under a local directory tree. Every operation threads a
//! [`CancelToken`] so an abandoned query stops issuing I/O.

pub mod bucket;
pub mod cancel;

pub use bucket::*;
pub use cancel::CancelToken;
