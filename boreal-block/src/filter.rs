//! Row-group pruning contract.

use boreal_result::Result;

use crate::rowgroup::BlockRowGroup;

/// Statistics-level predicate with one-sided certainty.
///
/// `Ok(false)` means the row group definitely holds no matching rows and may
/// be skipped; `Ok(true)` means it may hold matches and must be read. A
/// conforming implementation never returns a false negative, so pruning is
/// always safe. Implementations typically inspect
/// [`BlockRowGroup::row_group_metadata`] column statistics.
pub trait TrueNegativeFilter: Send + Sync {
    fn eval(&self, row_group: &BlockRowGroup) -> Result<bool>;
}

/// Pass-through filter that prunes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllMayContain;

impl TrueNegativeFilter for AllMayContain {
    fn eval(&self, _row_group: &BlockRowGroup) -> Result<bool> {
        Ok(true)
    }
}
