//! Playback session: the queue store and the state around it.
//!
//! `PlaybackSession` is the single owner of queue and playback state. All
//! mutation goes through its named operations (or the equivalent `Action`
//! passed to `PlaybackSession::apply`); readers get a `SessionSnapshot`.

mod queue;
mod shuffle;
mod store;
mod types;

pub use queue::Queue;
pub use store::PlaybackSession;
pub use types::{Action, RepeatMode, SessionSnapshot};
