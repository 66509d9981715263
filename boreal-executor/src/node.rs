//! Plan-node plumbing for the push-based pipeline.

use std::fmt;
use std::sync::{Arc, Mutex};

use arrow::record_batch::RecordBatch;
use boreal_result::Result;
use boreal_storage::CancelToken;

/// One stage of the push-based physical pipeline.
///
/// Wiring happens at plan-build time through [`PhysicalNode::set_next`];
/// execution then only calls [`PhysicalNode::callback`], possibly from
/// several upstream partitions at once.
pub trait PhysicalNode: fmt::Debug + Send + Sync {
    /// Wire the downstream stage this node forwards to. Terminal sinks
    /// ignore the call.
    fn set_next(&mut self, next: Arc<dyn PhysicalNode>);

    /// Consume one record batch.
    fn callback(&self, token: &CancelToken, batch: &RecordBatch) -> Result<()>;
}

/// Terminal sink that keeps every batch it receives.
#[derive(Debug, Default)]
pub struct BatchCollector {
    batches: Mutex<Vec<RecordBatch>>,
}

impl BatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the batches collected so far.
    pub fn batches(&self) -> Vec<RecordBatch> {
        self.batches
            .lock()
            .expect("BatchCollector batches lock poisoned")
            .clone()
    }

    /// Drain the collected batches.
    pub fn take(&self) -> Vec<RecordBatch> {
        std::mem::take(
            &mut *self
                .batches
                .lock()
                .expect("BatchCollector batches lock poisoned"),
        )
    }
}

impl PhysicalNode for BatchCollector {
    fn set_next(&mut self, _next: Arc<dyn PhysicalNode>) {}

    fn callback(&self, token: &CancelToken, batch: &RecordBatch) -> Result<()> {
        token.check()?;
        self.batches
            .lock()
            .expect("BatchCollector batches lock poisoned")
            .push(batch.clone());
        Ok(())
    }
}
