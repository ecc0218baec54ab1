// ── Feed storage ──
//
// Bounded per-channel feeds, their synchronizers, per-channel health,
// and the alert board.

mod alerts;
mod feed;
mod health;
mod sync;

pub use alerts::AlertBoard;
pub(crate) use alerts::sort_newest_first;
pub use feed::{ChannelFeed, MergeOutcome};
pub use health::FeedHealth;
pub use sync::{FeedSynchronizer, FeedUpdate};
