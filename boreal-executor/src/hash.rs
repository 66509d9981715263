//! Per-row hashing of Arrow arrays for set-semantic operators.
//!
//! Dispatch is a closed match over the supported array variants, one hash
//! routine per variant. Hash 0 is reserved as the null/empty sentinel: a
//! zero entry removes that column from the row's composite key, so nulls
//! collapse to "absent". Genuine value hashes that land on 0 are remapped
//! to keep the sentinel unambiguous.

use std::hash::{BuildHasher, RandomState};

use arrow::array::cast::AsArray;
use arrow::array::{
    Array, GenericByteArray, GenericListArray, OffsetSizeTrait, StructArray,
};
use arrow::datatypes::{
    ArrowDictionaryKeyType, ArrowNativeType, ArrowPrimitiveType, ByteArrayType, DataType,
    Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use boreal_result::{Error, Result};

/// Sentinel hash for null and empty positions.
pub const NULL_HASH: u64 = 0;

// Where a genuine value hashes to the sentinel, it is remapped here.
const ZERO_STANDIN: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
fn guard_sentinel(hash: u64) -> u64 {
    if hash == NULL_HASH {
        ZERO_STANDIN
    } else {
        hash
    }
}

/// Combine two 64-bit hashes order-sensitively.
#[inline]
pub fn hash_combine(lhs: u64, rhs: u64) -> u64 {
    lhs ^ rhs
        .wrapping_add(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(lhs << 6)
        .wrapping_add(lhs >> 2)
}

/// Hash every row of `array` with the seeded `state`, one hash per row.
///
/// Null positions (and empty strings, binaries, and lists, which collapse
/// the same way) produce [`NULL_HASH`]. Unsupported column types are an
/// error rather than a silent fallback.
pub fn hash_array(state: &RandomState, array: &dyn Array) -> Result<Vec<u64>> {
    match array.data_type() {
        DataType::Boolean => {
            let array = array.as_boolean();
            Ok((0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        NULL_HASH
                    } else {
                        guard_sentinel(state.hash_one(array.value(i)))
                    }
                })
                .collect())
        }
        DataType::Int8 => Ok(hash_primitive::<Int8Type>(state, array)),
        DataType::Int16 => Ok(hash_primitive::<Int16Type>(state, array)),
        DataType::Int32 => Ok(hash_primitive::<Int32Type>(state, array)),
        DataType::Int64 => Ok(hash_primitive::<Int64Type>(state, array)),
        DataType::UInt8 => Ok(hash_primitive::<UInt8Type>(state, array)),
        DataType::UInt16 => Ok(hash_primitive::<UInt16Type>(state, array)),
        DataType::UInt32 => Ok(hash_primitive::<UInt32Type>(state, array)),
        DataType::UInt64 => Ok(hash_primitive::<UInt64Type>(state, array)),
        DataType::Float32 => {
            let array = array.as_primitive::<Float32Type>();
            Ok((0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        NULL_HASH
                    } else {
                        guard_sentinel(state.hash_one(array.value(i).to_bits()))
                    }
                })
                .collect())
        }
        DataType::Float64 => {
            let array = array.as_primitive::<Float64Type>();
            Ok((0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        NULL_HASH
                    } else {
                        guard_sentinel(state.hash_one(array.value(i).to_bits()))
                    }
                })
                .collect())
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            Ok(hash_primitive::<TimestampSecondType>(state, array))
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            Ok(hash_primitive::<TimestampMillisecondType>(state, array))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            Ok(hash_primitive::<TimestampMicrosecondType>(state, array))
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            Ok(hash_primitive::<TimestampNanosecondType>(state, array))
        }
        DataType::Date32 => Ok(hash_primitive::<Date32Type>(state, array)),
        DataType::Date64 => Ok(hash_primitive::<Date64Type>(state, array)),
        DataType::Utf8 => Ok(hash_bytes(state, array.as_string::<i32>())),
        DataType::LargeUtf8 => Ok(hash_bytes(state, array.as_string::<i64>())),
        DataType::Binary => Ok(hash_bytes(state, array.as_binary::<i32>())),
        DataType::LargeBinary => Ok(hash_bytes(state, array.as_binary::<i64>())),
        DataType::Dictionary(key_type, _) => match key_type.as_ref() {
            DataType::Int8 => hash_dictionary::<Int8Type>(state, array),
            DataType::Int16 => hash_dictionary::<Int16Type>(state, array),
            DataType::Int32 => hash_dictionary::<Int32Type>(state, array),
            DataType::Int64 => hash_dictionary::<Int64Type>(state, array),
            DataType::UInt8 => hash_dictionary::<UInt8Type>(state, array),
            DataType::UInt16 => hash_dictionary::<UInt16Type>(state, array),
            DataType::UInt32 => hash_dictionary::<UInt32Type>(state, array),
            DataType::UInt64 => hash_dictionary::<UInt64Type>(state, array),
            other => Err(Error::InvalidArgumentError(format!(
                "unsupported dictionary key type for hashing: {other}"
            ))),
        },
        DataType::List(_) => hash_list(state, array.as_list::<i32>()),
        DataType::LargeList(_) => hash_list(state, array.as_list::<i64>()),
        DataType::Struct(_) => hash_struct(state, array.as_struct()),
        other => Err(Error::InvalidArgumentError(format!(
            "unsupported column type for hashing: {other}"
        ))),
    }
}

fn hash_primitive<T>(state: &RandomState, array: &dyn Array) -> Vec<u64>
where
    T: ArrowPrimitiveType,
    T::Native: std::hash::Hash,
{
    let array = array.as_primitive::<T>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                NULL_HASH
            } else {
                guard_sentinel(state.hash_one(array.value(i)))
            }
        })
        .collect()
}

fn hash_bytes<T>(state: &RandomState, array: &GenericByteArray<T>) -> Vec<u64>
where
    T: ByteArrayType,
    T::Native: AsRef<[u8]>,
{
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return NULL_HASH;
            }
            let bytes = array.value(i).as_ref();
            if bytes.is_empty() {
                NULL_HASH
            } else {
                guard_sentinel(state.hash_one(bytes))
            }
        })
        .collect()
}

// A dictionary row hashes exactly like its resolved value, so dictionary
// and flat encodings of the same data dedupe together.
fn hash_dictionary<K>(state: &RandomState, array: &dyn Array) -> Result<Vec<u64>>
where
    K: ArrowDictionaryKeyType,
{
    let array = array.as_dictionary::<K>();
    let value_hashes = hash_array(state, array.values().as_ref())?;
    let keys = array.keys();
    Ok((0..array.len())
        .map(|i| {
            if array.is_null(i) {
                NULL_HASH
            } else {
                value_hashes[keys.value(i).as_usize()]
            }
        })
        .collect())
}

fn hash_list<O>(state: &RandomState, array: &GenericListArray<O>) -> Result<Vec<u64>>
where
    O: OffsetSizeTrait,
{
    let value_hashes = hash_array(state, array.values().as_ref())?;
    let offsets = array.value_offsets();
    Ok((0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return NULL_HASH;
            }
            let start = offsets[i].as_usize();
            let end = offsets[i + 1].as_usize();
            if start == end {
                return NULL_HASH;
            }
            let mut hash = 0u64;
            for j in start..end {
                hash = hash_combine(hash, value_hashes[j]);
            }
            guard_sentinel(hash)
        })
        .collect())
}

fn hash_struct(state: &RandomState, array: &StructArray) -> Result<Vec<u64>> {
    let mut column_hashes = Vec::with_capacity(array.num_columns());
    for column in array.columns() {
        column_hashes.push(hash_array(state, column.as_ref())?);
    }
    Ok((0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return NULL_HASH;
            }
            let mut hash = 0u64;
            for hashes in &column_hashes {
                hash = hash_combine(hash, hashes[i]);
            }
            guard_sentinel(hash)
        })
        .collect())
}
