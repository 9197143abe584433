// kodakhome-core: Session and event aggregation layer between kodakhome-api and the CLI.

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SessionConfig, TlsVerification};
pub use error::CoreError;
pub use filter::EventFilter;
pub use session::{ConnectionState, SmartHomeSession};
pub use store::DataStore;

pub use kodakhome_api::{AuthFailure, Endpoints, Region};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Device, DeviceEventBucket, DeviceListing, Event, EventExt, EventType, TokenInfo, UserProfile,
};
