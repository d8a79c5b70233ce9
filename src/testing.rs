//! In-memory collaborators shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::catalog::{CatalogApi, ItemDetails, ItemKind, MediaLinks, StationSeed, Track};
use crate::error::{ApiError, Result};
use crate::favorites::{Favorites, FavoritesApi};
use crate::player::{AudioOutput, SourceId};

pub(crate) fn failure(what: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        url: format!("fake://{what}"),
    }
}

/// Scriptable `CatalogApi`. Unscripted calls fail with a 500.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    links: Mutex<HashMap<String, MediaLinks>>,
    tokens: Mutex<HashMap<String, String>>,
    station: Mutex<Option<Result<StationSeed>>>,
    batches: Mutex<VecDeque<Result<Vec<Track>>>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_links(&self, track_id: &str, links: MediaLinks) {
        self.links.lock().unwrap().insert(track_id.to_string(), links);
    }

    pub(crate) fn with_token(&self, item_id: &str, token: &str) {
        self.tokens
            .lock()
            .unwrap()
            .insert(item_id.to_string(), token.to_string());
    }

    pub(crate) fn with_station(&self, seed: Result<StationSeed>) {
        *self.station.lock().unwrap() = Some(seed);
    }

    pub(crate) fn push_batch(&self, batch: Result<Vec<Track>>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    /// Park `media_links` for this track until the returned handle is notified.
    pub(crate) fn hold(&self, track_id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(track_id.to_string(), notify.clone());
        notify
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn media_links(&self, track_id: &str, token: &str) -> Result<MediaLinks> {
        self.record(format!("links:{track_id}:{token}"));
        let hold = self.holds.lock().unwrap().get(track_id).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.links
            .lock()
            .unwrap()
            .get(track_id)
            .cloned()
            .ok_or_else(|| failure("mediaURL"))
    }

    async fn details(&self, item_id: &str, kind: ItemKind) -> Result<ItemDetails> {
        self.record(format!("details:{item_id}:{}", kind.as_str()));
        let token = self.tokens.lock().unwrap().get(item_id).cloned();
        match token {
            Some(token) => Ok(ItemDetails {
                encrypted_media_token: Some(token),
                track: None,
            }),
            None => Err(failure("details")),
        }
    }

    async fn item_list(&self, item_id: &str, kind: ItemKind) -> Result<Vec<Track>> {
        self.record(format!("list:{item_id}:{}", kind.as_str()));
        Err(failure("list"))
    }

    async fn create_station(&self, seed_id: &str) -> Result<StationSeed> {
        self.record(format!("station:{seed_id}"));
        self.station
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(failure("radioNew")))
    }

    async fn continue_station(&self, station_id: &str, batch_size: usize) -> Result<Vec<Track>> {
        self.record(format!("more:{station_id}:{batch_size}"));
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Song with a direct stream URL, so resolution needs no network.
pub(crate) fn playable(id: &str) -> Track {
    let mut track = Track::new(id, id.to_uppercase());
    track.media_url = Some(format!("https://cdn.example.com/{id}.mp3"));
    track
}

/// One call made on a [`FakeOutput`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OutputCall {
    Load(SourceId, String),
    Clear,
    Play,
    Pause,
    Seek(Duration),
    Volume(f32),
}

/// `AudioOutput` that only records what it was asked to do.
#[derive(Clone, Default)]
pub(crate) struct FakeOutput {
    calls: Arc<Mutex<Vec<OutputCall>>>,
}

impl FakeOutput {
    pub(crate) fn calls(&self) -> Vec<OutputCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn take(&self) -> Vec<OutputCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn record(&self, call: OutputCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioOutput for FakeOutput {
    fn load(&mut self, source: SourceId, url: &str) {
        self.record(OutputCall::Load(source, url.to_string()));
    }

    fn clear(&mut self) {
        self.record(OutputCall::Clear);
    }

    fn play(&mut self) {
        self.record(OutputCall::Play);
    }

    fn pause(&mut self) {
        self.record(OutputCall::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.record(OutputCall::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(OutputCall::Volume(volume));
    }
}

/// Scriptable `FavoritesApi`.
#[derive(Default)]
pub(crate) struct FakeFavorites {
    songs: Mutex<Vec<Track>>,
    fail_writes: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl FakeFavorites {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_song(&self, track: Track) {
        self.songs.lock().unwrap().push(track);
    }

    pub(crate) fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn write(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if *self.fail_writes.lock().unwrap() {
            Err(failure("favorites"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FavoritesApi for FakeFavorites {
    async fn favorites(&self, user_id: &str) -> Result<Favorites> {
        self.calls.lock().unwrap().push(format!("fetch:{user_id}"));
        Ok(Favorites {
            songs: self.songs.lock().unwrap().clone(),
            ..Favorites::default()
        })
    }

    async fn add_favorite(&self, user_id: &str, item: &Track, kind: ItemKind) -> Result<()> {
        self.write(format!("add:{user_id}:{}:{}", item.id, kind.as_str()))
    }

    async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<()> {
        self.write(format!("remove:{user_id}:{item_id}"))
    }

    async fn add_recently_played(&self, user_id: &str, item: &Track) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("recent:{user_id}:{}", item.id));
        Ok(())
    }

    async fn recently_played(&self, _user_id: &str) -> Result<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn clear_recently_played(&self, _user_id: &str) -> Result<()> {
        Ok(())
    }
}
