use boreal_storage::MemBucket;

use bucket_harness::{
    run_listing_contract, run_listing_error_propagation, run_missing_key_contract,
    run_range_roundtrip,
};

#[test]
fn mem_range_roundtrip() {
    run_range_roundtrip(&MemBucket::new());
}

#[test]
fn mem_listing_contract() {
    run_listing_contract(&MemBucket::new());
}

#[test]
fn mem_listing_error_propagation() {
    run_listing_error_propagation(&MemBucket::new());
}

#[test]
fn mem_missing_key_contract() {
    run_missing_key_contract(&MemBucket::new());
}
