//! Identifier and key layout for persisted blocks.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, UNIX_EPOCH};

use boreal_result::{Error, Result};
use ulid::Ulid;

/// File name of the columnar payload inside each block directory.
pub const DATA_FILE_NAME: &str = "data.parquet";

/// Time-ordered 128-bit block identifier.
///
/// Wraps a ULID: the high 48 bits carry a millisecond timestamp, the rest is
/// random. The canonical 26-character Crockford base-32 rendering sorts
/// lexically in time order, which is what makes bucket listings chronological
/// and lets a timestamp horizon act as a cursor over them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(Ulid);

impl BlockId {
    /// Mint an identifier stamped with the current wall clock.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Mint an identifier with an explicit millisecond timestamp. The random
    /// tail still distinguishes identifiers minted in the same millisecond.
    pub fn from_timestamp_ms(timestamp_ms: u64) -> Self {
        Self(Ulid::from_datetime(
            UNIX_EPOCH + Duration::from_millis(timestamp_ms),
        ))
    }

    /// Millisecond timestamp component.
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BlockId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ulid = Ulid::from_string(s)
            .map_err(|e| Error::InvalidArgumentError(format!("malformed block id '{s}': {e}")))?;
        Ok(Self(ulid))
    }
}

/// Object key of a block's columnar payload: `<table>/<ulid>/data.parquet`.
pub fn block_key(table: &str, id: &BlockId) -> String {
    format!("{table}/{id}/{DATA_FILE_NAME}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        let id: BlockId = "01ARZ3NDEKTSV4RRFFQ69G5FAV".parse().expect("parse");
        assert_eq!(
            block_key("metrics", &id),
            "metrics/01ARZ3NDEKTSV4RRFFQ69G5FAV/data.parquet"
        );
    }

    #[test]
    fn lexical_order_matches_time_order() {
        let early = BlockId::from_timestamp_ms(1_000);
        let late = BlockId::from_timestamp_ms(2_000);
        assert!(early.to_string() < late.to_string());
        assert_eq!(early.timestamp_ms(), 1_000);
        assert_eq!(late.timestamp_ms(), 2_000);
    }

    #[test]
    fn parse_roundtrip_and_rejection() {
        let id = BlockId::new();
        let parsed: BlockId = id.to_string().parse().expect("roundtrip");
        assert_eq!(parsed, id);

        let err = "not-a-ulid".parse::<BlockId>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
    }
}
