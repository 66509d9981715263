//! Push-based physical operators over Arrow record batches.
//!
//! Stages implement [`PhysicalNode`]: upstream calls `callback` once per
//! batch, stages forward derived batches downstream. Multiple upstream
//! partitions may call into the same stage concurrently, so stages keep
//! their state behind interior mutability.
//!
//! The crate ships the terminal stages of the scan pipeline: the streaming
//! [`Distinct`] operator and the [`BatchCollector`] result sink.

pub mod distinct;
pub mod hash;
pub mod node;

pub use distinct::Distinct;
pub use node::{BatchCollector, PhysicalNode};
