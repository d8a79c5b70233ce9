//! Session-related small types: repeat mode, actions and snapshots.

use std::time::Duration;

use crate::catalog::Track;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop advancing at the end of the queue.
    #[default]
    Off,
    /// Wrap around to the start of the queue.
    All,
    /// Replay the current track when it ends.
    One,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Every mutation the session accepts, as a value.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the queue wholesale (leaves shuffle).
    SetQueue(Vec<Track>),
    /// Make a track current and request playback.
    SetCurrentTrack(Track),
    SetPlaying(bool),
    TogglePlayPause,
    /// Push tracks at the end of the queue.
    Append(Vec<Track>),
    /// Insert tracks right after the current track.
    InsertNext(Vec<Track>),
    RemoveAt(usize),
    Reorder { from: usize, to: usize },
    ToggleShuffle,
    ToggleRepeat,
    SetStationId(Option<String>),
    NextTrack,
    PreviousTrack,
    SetVolume(f32),
    ToggleMute,
    SetProgress(Duration),
    SetDuration(Duration),
    ToggleQueueVisible,
}

/// Read-only copy of the session handed to renderers.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub current_track: Option<Track>,
    pub queue: Vec<Track>,
    pub is_playing: bool,
    pub volume: f32,
    pub progress: Duration,
    pub duration: Duration,
    pub repeat_mode: RepeatMode,
    pub shuffle_enabled: bool,
    pub station_id: Option<String>,
    pub queue_visible: bool,
    pub is_favorited: bool,
}

impl SessionSnapshot {
    /// Position of the current track in the queue (first id match).
    pub fn current_index(&self) -> Option<usize> {
        let current = self.current_track.as_ref()?;
        self.queue.iter().position(|t| t.id == current.id)
    }
}
