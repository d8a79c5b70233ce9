use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Track;
use crate::session::{Action, SessionSnapshot};

/// Intents accepted by the player task.
#[derive(Debug, Clone)]
pub enum PlayerCmd {
    /// Any queue or playback-state operation.
    Apply(Action),
    /// Replace the queue with `tracks` and start playing `tracks[start]`.
    /// Leaves radio mode.
    PlayList { tracks: Vec<Track>, start: usize },
    /// Absolute position in the current track.
    Seek(Duration),
    /// Create a station seeded by this song and switch to it.
    StartRadio(Track),
    /// Flip the favorite flag of the current track.
    ToggleFavorite,
    Quit,
}

/// User-facing outcomes. The core never renders these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoStreamFound { title: String },
    PlaybackFailed { reason: String },
    RadioStarted { count: usize },
    NoRadioSongs,
    RadioFailed,
    FavoriteAdded,
    FavoriteRemoved,
    FavoriteFailed,
    LoginRequired,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::NoStreamFound { .. }
                | Notice::PlaybackFailed { .. }
                | Notice::NoRadioSongs
                | Notice::RadioFailed
                | Notice::FavoriteFailed
                | Notice::LoginRequired
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoStreamFound { title } => write!(f, "No stream available for \"{title}\""),
            Notice::PlaybackFailed { reason } => write!(f, "Playback failed: {reason}"),
            Notice::RadioStarted { count } => write!(f, "Radio started with {count} songs"),
            Notice::NoRadioSongs => f.write_str("No radio songs found"),
            Notice::RadioFailed => f.write_str("Failed to start radio"),
            Notice::FavoriteAdded => f.write_str("Added to Favorites"),
            Notice::FavoriteRemoved => f.write_str("Removed from Favorites"),
            Notice::FavoriteFailed => f.write_str("Failed to update favorites"),
            Notice::LoginRequired => f.write_str("Please log in to save favorites"),
        }
    }
}

/// Latest published session state, shared with renderers.
pub type SnapshotHandle = Arc<Mutex<SessionSnapshot>>;
