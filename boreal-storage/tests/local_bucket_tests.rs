use boreal_storage::LocalBucket;
use tempfile::TempDir;

use bucket_harness::{
    run_listing_contract, run_listing_error_propagation, run_missing_key_contract,
    run_range_roundtrip,
};

fn make_local(tmp: &TempDir) -> LocalBucket {
    LocalBucket::new(tmp.path().join("bucket")).expect("open local bucket")
}

#[test]
fn local_range_roundtrip() {
    let tmp = TempDir::new().expect("tempdir");
    run_range_roundtrip(&make_local(&tmp));
}

#[test]
fn local_listing_contract() {
    let tmp = TempDir::new().expect("tempdir");
    run_listing_contract(&make_local(&tmp));
}

#[test]
fn local_listing_error_propagation() {
    let tmp = TempDir::new().expect("tempdir");
    run_listing_error_propagation(&make_local(&tmp));
}

#[test]
fn local_missing_key_contract() {
    let tmp = TempDir::new().expect("tempdir");
    run_missing_key_contract(&make_local(&tmp));
}
