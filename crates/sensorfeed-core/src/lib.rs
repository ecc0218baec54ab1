//! Bounded incremental sensor feeds between `sensorfeed-api` and consumers.
//!
//! This crate owns the domain model, the polling protocol and the reactive
//! plumbing for the sensorfeed workspace:
//!
//! - **[`Monitor`]**: Lifecycle facade: [`start()`](Monitor::start) loads
//!   every channel, fetches the alert baseline and spawns the tick loop;
//!   [`stop()`](Monitor::stop) cancels it deterministically.
//!   [`Monitor::oneshot()`](Monitor::oneshot) is the single-invocation mode
//!   used by the CLI.
//!
//! - **[`ChannelFeed`] / [`FeedSynchronizer`]**: The bounded incremental
//!   feed: newest-first, id-deduplicated, capped at `capacity`, advanced by
//!   a last-seen watermark so overlapping poll windows never duplicate.
//!
//! - **[`SnapshotStream<T>`]**: Subscription handle over a `watch`
//!   channel. A poll that brings nothing new publishes nothing.
//!
//! - **[`Notifier`]**: Side channel for newly raised alerts with an
//!   explicit [`NotifyOutcome`].

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    DEFAULT_ALERT_LIMIT, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_LIMIT, DeviceIds,
    MAX_POINTS, MonitorConfig, TlsVerification,
};
pub use error::CoreError;
pub use monitor::{Monitor, MonitorState, TickReport};
pub use notify::{DisabledNotifier, LogNotifier, Notification, Notifier, NotifyOutcome};
pub use store::{AlertBoard, ChannelFeed, FeedHealth, FeedSynchronizer, FeedUpdate, MergeOutcome};
pub use stream::{AlertFilter, ReadingFilter, SnapshotStream};

pub use model::{
    Alert, AlertStatus, Channel, Proximity, Reading, ReadingValue, Severity, SoundLevel,
};
