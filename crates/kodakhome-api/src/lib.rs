// kodakhome-api: Async Rust client for the Kodak Smart Home cloud API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod events;
pub mod login;
pub mod models;
pub mod region;
pub mod transport;

pub use auth::AuthFailure;
pub use client::SmartHomeClient;
pub use error::Error;
pub use models::{Device, DeviceListing, Event, EventPage, EventType, TokenInfo, UserProfile};
pub use region::{Endpoints, Region};
pub use transport::{TlsMode, TransportConfig};
