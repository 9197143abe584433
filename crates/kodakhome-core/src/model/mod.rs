// ── Domain model ──
//
// Wire types come straight from kodakhome-api; this module adds the
// per-device event bucket the session aggregates pages into, plus a few
// helpers consumers lean on.

pub mod bucket;
pub mod event;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use kodakhome_core::model::*` gives you everything.

pub use bucket::DeviceEventBucket;
pub use event::EventExt;

pub use kodakhome_api::{Device, DeviceListing, Event, EventType, TokenInfo, UserProfile};
