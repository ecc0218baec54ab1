// ── Domain model ──
//
// Canonical types shared by every consumer. Wire shapes from
// `sensorfeed-api` are converted into these in `crate::convert`.

pub mod alert;
pub mod channel;
pub mod level;
pub mod reading;

pub use alert::{Alert, AlertStatus, Severity};
pub use channel::Channel;
pub use level::{Proximity, SoundLevel};
pub use reading::{Reading, ReadingValue};
