//! `PlaybackSession`: queue store operations and playback state.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::catalog::Track;

use super::queue::{Queue, Slot};
use super::shuffle::shuffle_pinned;
use super::types::{Action, RepeatMode, SessionSnapshot};

pub const DEFAULT_VOLUME: f32 = 0.7;

/// The process-wide playback state.
///
/// Owned by the player controller; nothing else writes to it.
#[derive(Debug)]
pub struct PlaybackSession {
    queue: Queue,
    /// Pre-shuffle order. Non-empty only while shuffle is on.
    original_queue: Queue,
    current_track: Option<Track>,
    /// Bumped on every assignment of `current_track`, including
    /// re-selecting the same track.
    track_epoch: u64,
    is_playing: bool,
    volume: f32,
    last_volume: f32,
    progress: Duration,
    duration: Duration,
    repeat_mode: RepeatMode,
    shuffle_enabled: bool,
    station_id: Option<String>,
    queue_visible: bool,
    next_key: u64,
    rng: StdRng,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Session with a caller-provided shuffle source.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            queue: Queue::default(),
            original_queue: Queue::default(),
            current_track: None,
            track_epoch: 0,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            last_volume: DEFAULT_VOLUME,
            progress: Duration::ZERO,
            duration: Duration::ZERO,
            repeat_mode: RepeatMode::Off,
            shuffle_enabled: false,
            station_id: None,
            queue_visible: false,
            next_key: 0,
            rng,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn original_queue(&self) -> &Queue {
        &self.original_queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn track_epoch(&self) -> u64 {
        self.track_epoch
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn progress(&self) -> Duration {
        self.progress
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn station_id(&self) -> Option<&str> {
        self.station_id.as_deref()
    }

    pub fn queue_visible(&self) -> bool {
        self.queue_visible
    }

    /// Index of the current track in the queue, by first id match.
    pub fn current_index(&self) -> Option<usize> {
        let current = self.current_track.as_ref()?;
        self.queue.position_of(&current.id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_track: self.current_track.clone(),
            queue: self.queue.to_vec(),
            is_playing: self.is_playing,
            volume: self.volume,
            progress: self.progress,
            duration: self.duration,
            repeat_mode: self.repeat_mode,
            shuffle_enabled: self.shuffle_enabled,
            station_id: self.station_id.clone(),
            queue_visible: self.queue_visible,
            is_favorited: false,
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub fn apply(&mut self, action: Action) {
        debug!(?action, "session action");
        match action {
            Action::SetQueue(tracks) => self.set_queue(tracks),
            Action::SetCurrentTrack(track) => self.set_current_track(track),
            Action::SetPlaying(playing) => self.set_playing(playing),
            Action::TogglePlayPause => self.toggle_play_pause(),
            Action::Append(tracks) => self.append(tracks),
            Action::InsertNext(tracks) => self.insert_next(tracks),
            Action::RemoveAt(index) => {
                self.remove_at(index);
            }
            Action::Reorder { from, to } => {
                self.reorder(from, to);
            }
            Action::ToggleShuffle => self.toggle_shuffle(),
            Action::ToggleRepeat => self.toggle_repeat(),
            Action::SetStationId(id) => self.set_station_id(id),
            Action::NextTrack => {
                self.next_track();
            }
            Action::PreviousTrack => {
                self.previous_track();
            }
            Action::SetVolume(v) => self.set_volume(v),
            Action::ToggleMute => self.toggle_mute(),
            Action::SetProgress(p) => self.set_progress(p),
            Action::SetDuration(d) => self.set_duration(d),
            Action::ToggleQueueVisible => self.toggle_queue_visible(),
        }
    }

    // ------------------------------------------------------------------
    // Queue store
    // ------------------------------------------------------------------

    /// Replace the queue wholesale. Leaves shuffle and drops the pre-shuffle
    /// snapshot; the current track is untouched.
    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        let slots = self.make_slots(tracks);
        self.queue = Queue::from_slots(slots);
        self.original_queue = Queue::default();
        self.shuffle_enabled = false;
    }

    /// Make `track` current and request playback. Membership in the queue
    /// is the caller's business.
    pub fn set_current_track(&mut self, track: Track) {
        self.assign_current(track);
        self.is_playing = true;
    }

    pub fn append(&mut self, tracks: Vec<Track>) {
        let slots = self.make_slots(tracks);
        for slot in slots {
            if self.shuffle_enabled {
                self.original_queue.push(slot.clone());
            }
            self.queue.push(slot);
        }
    }

    /// Insert right after the current track, or append when the current
    /// track is not in the queue.
    pub fn insert_next(&mut self, tracks: Vec<Track>) {
        let Some(index) = self.current_index() else {
            self.append(tracks);
            return;
        };
        let slots = self.make_slots(tracks);
        if self.shuffle_enabled {
            let current_id = self.current_track.as_ref().map(|t| t.id.as_str());
            let at = current_id
                .and_then(|id| self.original_queue.position_of(id))
                .map(|i| i + 1)
                .unwrap_or(self.original_queue.len());
            self.original_queue.insert_at(at, slots.clone());
        }
        self.queue.insert_at(index + 1, slots);
    }

    /// Remove the slot at `index`. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> bool {
        let Some(slot) = self.queue.remove_at(index) else {
            return false;
        };
        if self.shuffle_enabled {
            self.original_queue.remove_key(slot.key);
        }
        true
    }

    /// Move the slot at `from` to `to`. Out-of-range indices are ignored.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.queue.reorder(from, to)
    }

    /// Toggle shuffle. Not available in radio mode.
    ///
    /// Enabling snapshots the current order and pins the current track (if
    /// queued) at the front. Disabling restores the snapshot verbatim.
    pub fn toggle_shuffle(&mut self) {
        if self.station_id.is_some() {
            debug!("shuffle ignored in radio mode");
            return;
        }
        if self.shuffle_enabled {
            self.shuffle_enabled = false;
            self.restore_original();
        } else {
            self.shuffle_enabled = true;
            self.original_queue = self.queue.clone();
            let pinned = self.current_index();
            shuffle_pinned(self.queue.slots_mut(), pinned, &mut self.rng);
        }
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat_mode = self.repeat_mode.cycle();
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Enter or leave radio mode. Entering forces shuffle off and restores
    /// the pre-shuffle order.
    pub fn set_station_id(&mut self, id: Option<String>) {
        self.station_id = id;
        if self.station_id.is_some() {
            self.shuffle_enabled = false;
            self.restore_original();
        }
    }

    /// Advance to the next slot, wrapping with `RepeatMode::All`.
    ///
    /// Returns whether the current track changed. Repeat-one looping is
    /// handled by the end-of-track logic, not here.
    pub fn next_track(&mut self) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        let target = if index + 1 < self.queue.len() {
            Some(index + 1)
        } else if self.repeat_mode == RepeatMode::All {
            Some(0)
        } else {
            None
        };
        self.move_to(target)
    }

    /// Step back one slot, wrapping to the end with `RepeatMode::All`.
    pub fn previous_track(&mut self) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        let target = if index > 0 {
            Some(index - 1)
        } else if self.repeat_mode == RepeatMode::All {
            Some(self.queue.len() - 1)
        } else {
            None
        };
        self.move_to(target)
    }

    // ------------------------------------------------------------------
    // Playback state
    // ------------------------------------------------------------------

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn toggle_play_pause(&mut self) {
        self.is_playing = !self.is_playing;
    }

    /// Set the output volume, clamped to `0.0..=1.0`.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.volume = volume;
        if volume > 0.0 {
            self.last_volume = volume;
        }
    }

    /// Mute, or restore the last audible volume (1.0 if there was none).
    pub fn toggle_mute(&mut self) {
        if self.volume > 0.0 {
            self.last_volume = self.volume;
            self.volume = 0.0;
        } else {
            self.volume = if self.last_volume > 0.0 { self.last_volume } else { 1.0 };
        }
    }

    pub fn set_progress(&mut self, progress: Duration) {
        self.progress = progress;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn toggle_queue_visible(&mut self) {
        self.queue_visible = !self.queue_visible;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn move_to(&mut self, target: Option<usize>) -> bool {
        match target.and_then(|i| self.queue.get(i)).cloned() {
            Some(track) => {
                self.assign_current(track);
                true
            }
            None => false,
        }
    }

    fn assign_current(&mut self, track: Track) {
        self.current_track = Some(track);
        self.track_epoch += 1;
        self.progress = Duration::ZERO;
        self.duration = Duration::ZERO;
    }

    fn restore_original(&mut self) {
        if !self.original_queue.is_empty() {
            self.queue = std::mem::take(&mut self.original_queue);
        }
    }

    fn make_slots(&mut self, tracks: Vec<Track>) -> Vec<Slot> {
        tracks
            .into_iter()
            .map(|track| {
                let key = self.next_key;
                self.next_key += 1;
                Slot { key, track }
            })
            .collect()
    }
}
