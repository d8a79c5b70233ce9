//! The audio output seam.

use std::time::Duration;

use crate::error::PlaybackStartError;

/// Identifies one `load` call. Events carry it so late events from a
/// replaced source can be told apart.
pub type SourceId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// The source is decoded and ready; `duration` when the container knows it.
    Loaded {
        source: SourceId,
        duration: Option<Duration>,
    },
    /// Periodic position report while playing.
    Progress { source: SourceId, position: Duration },
    /// The source played to its end.
    Ended { source: SourceId },
    /// `play` could not start the source.
    StartFailed {
        source: SourceId,
        error: PlaybackStartError,
    },
    /// The stream could not be fetched or decoded.
    LoadFailed { source: SourceId, message: String },
}

impl OutputEvent {
    pub fn source(&self) -> SourceId {
        match self {
            OutputEvent::Loaded { source, .. }
            | OutputEvent::Progress { source, .. }
            | OutputEvent::Ended { source }
            | OutputEvent::StartFailed { source, .. }
            | OutputEvent::LoadFailed { source, .. } => *source,
        }
    }
}

/// Something that can play one stream URL at a time.
///
/// Calls are fire-and-forget; outcomes come back as [`OutputEvent`]s on
/// the channel the implementation was built with. Loading a new source
/// implicitly replaces the previous one.
pub trait AudioOutput: Send {
    /// Start fetching and decoding `url`. The source stays paused.
    fn load(&mut self, source: SourceId, url: &str);

    /// Drop the current source, aborting any pending load or start.
    fn clear(&mut self);

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position: Duration);

    /// `volume` is already clamped to `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
}
