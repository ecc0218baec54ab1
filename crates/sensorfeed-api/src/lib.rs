// sensorfeed-api: Async Rust client for the sensor manager HTTP API

pub mod alerts;
pub mod client;
pub mod error;
pub mod history;
pub mod models;
pub mod notifications;
pub mod transport;

pub use client::SensorClient;
pub use error::Error;
pub use models::{AlertRecord, HistoryRecord, RawValue, SensorKind};
pub use transport::{TlsMode, TransportConfig};
