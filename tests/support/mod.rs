#![allow(dead_code, unused_imports)]

pub mod flaky;
pub mod records;

use std::sync::Arc;

use indexed_rust::{ManualClock, MemoryDatastore, RecordStore, StoreConfig};

pub use flaky::FlakyDatastore;
pub use records::{Blob, File, Item, Note};

/// Memory-backed store whose clock starts at `start` and only moves when advanced.
pub fn store_at(start: i64) -> (RecordStore<MemoryDatastore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start));
    let store = RecordStore::new(StoreConfig::new(MemoryDatastore::new()).with_clock(clock.clone()));
    (store, clock)
}

/// Route store logs to the test harness output.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
