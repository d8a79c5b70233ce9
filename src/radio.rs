//! Radio mode: station creation and auto-extension of the queue.

use tracing::{debug, info, warn};

use crate::catalog::{CatalogApi, StationSeed, Track};
use crate::config::RadioSettings;
use crate::error::Result;
use crate::session::PlaybackSession;

pub const DEFAULT_REFILL_THRESHOLD: usize = 3;
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// A continuation fetch the caller should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRequest {
    pub station_id: String,
    pub batch_size: usize,
}

/// Inputs the depth check reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Watched {
    station_id: String,
    track_epoch: u64,
    queue_len: usize,
}

/// Watches queue depth in radio mode and asks for more tracks when the
/// listener gets close to the end.
///
/// At most one request is in flight at a time. The check only runs when
/// the station, the queue length or the current-track assignment changed
/// since the previous check, so an exhausted station is not polled in a
/// loop. Selecting the same song again counts as a change.
#[derive(Debug)]
pub struct RadioExtender {
    threshold: usize,
    batch_size: usize,
    in_flight: bool,
    last_seen: Option<Watched>,
}

impl Default for RadioExtender {
    fn default() -> Self {
        Self::new(DEFAULT_REFILL_THRESHOLD, DEFAULT_BATCH_SIZE)
    }
}

impl RadioExtender {
    pub fn new(threshold: usize, batch_size: usize) -> Self {
        Self {
            threshold,
            batch_size: batch_size.max(1),
            in_flight: false,
            last_seen: None,
        }
    }

    pub fn from_settings(settings: &RadioSettings) -> Self {
        Self::new(settings.refill_threshold, settings.batch_size)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Decide whether a continuation fetch is due. Marks the request as in
    /// flight when it returns one.
    pub fn check(&mut self, session: &PlaybackSession) -> Option<ExtensionRequest> {
        let station_id = session.station_id()?;
        session.current_track()?;
        let queue_len = session.queue().len();

        let watched = Watched {
            station_id: station_id.to_string(),
            track_epoch: session.track_epoch(),
            queue_len,
        };
        if self.last_seen.as_ref() == Some(&watched) {
            return None;
        }
        self.last_seen = Some(watched);

        if queue_len == 0 {
            return None;
        }
        let index = session.current_index()?;
        let remaining = queue_len - index;
        if remaining > self.threshold {
            return None;
        }
        if self.in_flight {
            debug!(station = %station_id, "extension already in flight");
            return None;
        }

        self.in_flight = true;
        debug!(station = %station_id, remaining, "requesting station batch");
        Some(ExtensionRequest {
            station_id: station_id.to_string(),
            batch_size: self.batch_size,
        })
    }

    /// Apply the outcome of a fetch started by [`check`](Self::check).
    ///
    /// Clears the in-flight guard in every case. Tracks are appended only if
    /// the session is still on the station they were fetched for. Returns the
    /// number of tracks added.
    pub fn finish(
        &mut self,
        session: &mut PlaybackSession,
        station_id: &str,
        result: Result<Vec<Track>>,
    ) -> usize {
        self.in_flight = false;
        let tracks = match result {
            Ok(tracks) => tracks,
            Err(err) => {
                warn!(station = %station_id, error = %err, "station extension failed");
                return 0;
            }
        };
        if tracks.is_empty() {
            debug!(station = %station_id, "station returned no more tracks");
            return 0;
        }
        if session.station_id() != Some(station_id) {
            debug!(station = %station_id, "dropping batch for a station no longer playing");
            return 0;
        }
        let added = tracks.len();
        session.append(tracks);
        info!(station = %station_id, added, "station extended");
        added
    }
}

/// Perform the fetch described by an [`ExtensionRequest`].
pub async fn fetch_batch(catalog: &dyn CatalogApi, request: &ExtensionRequest) -> Result<Vec<Track>> {
    catalog
        .continue_station(&request.station_id, request.batch_size)
        .await
}

/// How a "play radio" request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationOutcome {
    Started { station_id: Option<String>, count: usize },
    Empty,
    Failed(String),
}

/// Switch the session to a freshly created station.
///
/// On a non-empty seed the first song becomes current, the queue is
/// replaced by the seed list and radio mode is entered. Otherwise the
/// session is left alone.
pub fn begin_station(session: &mut PlaybackSession, seed: Result<StationSeed>) -> StationOutcome {
    let seed = match seed {
        Ok(seed) => seed,
        Err(err) => {
            warn!(error = %err, "station creation failed");
            return StationOutcome::Failed(err.to_string());
        }
    };
    let Some(first) = seed.tracks.first().cloned() else {
        return StationOutcome::Empty;
    };
    let count = seed.tracks.len();
    session.set_current_track(first);
    session.set_queue(seed.tracks);
    session.set_station_id(seed.station_id.clone());
    info!(station = ?seed.station_id, count, "radio started");
    StationOutcome::Started {
        station_id: seed.station_id,
        count,
    }
}
