//! Cooperative cancellation for storage operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use boreal_result::{Error, Result};

/// Shared cancellation flag threaded through every bucket operation.
///
/// Clones observe the same flag. Cancellation is cooperative: operations
/// check the token at their entry points (and the range-read adapter before
/// each fetch), so an in-flight byte copy finishes its current chunk before
/// the next check fails.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; all clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Fail fast with [`Error::Cancelled`] once cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());

        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(Error::Cancelled)));
    }
}
