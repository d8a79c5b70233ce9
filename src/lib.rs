//! cadenza: the playback core of a streaming music client.
//!
//! The crate owns the playback queue and audio-session state machine
//! (`session`), the media-resolution pipeline (`resolver`), the radio
//! station extender (`radio`) and the controller binding them to an audio
//! output (`player`). Catalog and favorites services are consumed over
//! HTTP through the `catalog` and `favorites` clients.

pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod logging;
pub mod mpris;
pub mod player;
pub mod radio;
pub mod resolver;
pub mod session;

mod http;
#[cfg(test)]
mod testing;

pub use catalog::{CatalogApi, CatalogClient, ItemKind, Track};
pub use error::{ApiError, PlaybackStartError, ResolutionError, Result};
pub use player::{Controller, Notice, Player, PlayerCmd};
pub use resolver::MediaResolver;
pub use session::{Action, PlaybackSession, RepeatMode, SessionSnapshot};
