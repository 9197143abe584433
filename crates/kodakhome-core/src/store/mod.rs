// ── Session data store ──
//
// Last successful snapshot of devices and their event buckets.

mod data_store;
mod refresh;

pub use data_store::DataStore;
