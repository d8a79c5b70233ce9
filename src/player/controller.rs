//! The playback session controller.
//!
//! Owns the `PlaybackSession` and the audio output. Every change to the
//! session, whatever its origin, is followed by `reconcile`, which compares
//! the session against what the output was last told and issues the
//! difference: a new source on track change, play/pause on intent change,
//! volume, and a radio depth check.
//!
//! Network work runs on spawned tasks that report back through the inbox.
//! Each track change allocates a new `SourceId`; results and output events
//! tagged with an older id are dropped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogApi, ItemKind, StationSeed, Track};
use crate::error::{ResolutionError, Result as ApiResult};
use crate::favorites::{FavoriteChange, FavoriteState, FavoritesApi};
use crate::radio::{self, RadioExtender, StationOutcome};
use crate::resolver::{MediaResolver, ResolvedStream};
use crate::session::{PlaybackSession, RepeatMode, SessionSnapshot};

use super::output::{AudioOutput, OutputEvent, SourceId};
use super::types::{Notice, PlayerCmd, SnapshotHandle};

/// Completions of spawned network work.
#[derive(Debug)]
pub(crate) enum Internal {
    Resolved {
        source: SourceId,
        title: String,
        result: Result<ResolvedStream, ResolutionError>,
    },
    Extended {
        station_id: String,
        result: ApiResult<Vec<Track>>,
    },
    StationCreated(ApiResult<StationSeed>),
    FavoriteChecked {
        track_id: String,
        favorited: bool,
    },
    FavoriteSettled {
        track_id: String,
        change: FavoriteChange,
        ok: bool,
    },
}

#[derive(Clone)]
struct Account {
    user_id: String,
    api: Arc<dyn FavoritesApi>,
}

/// What the output was last told.
#[derive(Debug, Default)]
struct Observed {
    epoch: u64,
    playing: bool,
    volume: Option<f32>,
}

/// The source currently bound to the output.
#[derive(Debug, Default)]
struct Binding {
    source: SourceId,
    loaded: bool,
}

pub struct Controller<O: AudioOutput> {
    session: PlaybackSession,
    catalog: Arc<dyn CatalogApi>,
    resolver: MediaResolver,
    extender: RadioExtender,
    account: Option<Account>,
    favorite: FavoriteState,
    output: O,
    internal_tx: UnboundedSender<Internal>,
    inbox: Option<UnboundedReceiver<Internal>>,
    notices: UnboundedSender<Notice>,
    published: SnapshotHandle,
    observed: Observed,
    binding: Binding,
    next_source: SourceId,
}

impl<O: AudioOutput> Controller<O> {
    pub fn new(
        session: PlaybackSession,
        catalog: Arc<dyn CatalogApi>,
        output: O,
        notices: UnboundedSender<Notice>,
    ) -> Self {
        let (internal_tx, inbox) = mpsc::unbounded_channel();
        let published = Arc::new(Mutex::new(session.snapshot()));
        Self {
            resolver: MediaResolver::new(catalog.clone()),
            catalog,
            session,
            extender: RadioExtender::default(),
            account: None,
            favorite: FavoriteState::default(),
            output,
            internal_tx,
            inbox: Some(inbox),
            notices,
            published,
            observed: Observed::default(),
            binding: Binding::default(),
            next_source: 0,
        }
    }

    pub fn with_resolver(mut self, resolver: MediaResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_extender(mut self, extender: RadioExtender) -> Self {
        self.extender = extender;
        self
    }

    /// Enable favorites and play history for `user_id`.
    pub fn with_account(mut self, user_id: impl Into<String>, api: Arc<dyn FavoritesApi>) -> Self {
        self.account = Some(Account {
            user_id: user_id.into(),
            api,
        });
        self
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.published.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = self.session.snapshot();
        snapshot.is_favorited = self.favorite.is_favorited();
        snapshot
    }

    /// Drive the controller until `Quit` or until every command sender is gone.
    pub async fn run(
        mut self,
        mut commands: UnboundedReceiver<PlayerCmd>,
        mut output_events: UnboundedReceiver<OutputEvent>,
    ) {
        let Some(mut inbox) = self.inbox.take() else {
            warn!("controller inbox already taken");
            return;
        };
        self.reconcile();
        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.dispatch(cmd) {
                        break;
                    }
                }
                Some(event) = output_events.recv() => self.on_output(event),
                Some(msg) = inbox.recv() => self.on_internal(msg),
            }
        }
        info!("player stopped");
    }

    /// Handle one intent. Returns `false` on `Quit`.
    pub fn dispatch(&mut self, cmd: PlayerCmd) -> bool {
        match cmd {
            PlayerCmd::Apply(action) => self.session.apply(action),
            PlayerCmd::PlayList { tracks, start } => self.play_list(tracks, start),
            PlayerCmd::Seek(position) => self.seek(position),
            PlayerCmd::StartRadio(seed) => self.start_radio(&seed),
            PlayerCmd::ToggleFavorite => self.toggle_favorite(),
            PlayerCmd::Quit => {
                self.output.clear();
                return false;
            }
        }
        self.reconcile();
        true
    }

    pub fn on_output(&mut self, event: OutputEvent) {
        if event.source() != self.binding.source {
            debug!(source = event.source(), "ignoring event from a replaced source");
            return;
        }
        match event {
            OutputEvent::Loaded { duration, .. } => {
                self.binding.loaded = true;
                let duration = duration
                    .or_else(|| self.session.current_track().and_then(Track::duration))
                    .unwrap_or_default();
                self.session.set_duration(duration);
                if self.session.is_playing() {
                    self.output.play();
                }
            }
            OutputEvent::Progress { position, .. } => self.session.set_progress(position),
            OutputEvent::Ended { .. } => self.on_track_end(),
            OutputEvent::StartFailed { error, .. } => {
                if error.is_abort() {
                    debug!("playback start aborted by a source change");
                } else {
                    self.fail_playback(error.to_string());
                }
            }
            OutputEvent::LoadFailed { message, .. } => {
                self.binding.loaded = false;
                self.fail_playback(message);
            }
        }
        self.reconcile();
    }

    pub(crate) fn on_internal(&mut self, msg: Internal) {
        match msg {
            Internal::Resolved {
                source,
                title,
                result,
            } => self.bind(source, &title, result),
            Internal::Extended { station_id, result } => {
                self.extender.finish(&mut self.session, &station_id, result);
            }
            Internal::StationCreated(seed) => match radio::begin_station(&mut self.session, seed) {
                StationOutcome::Started { count, .. } => self.notify(Notice::RadioStarted { count }),
                StationOutcome::Empty => self.notify(Notice::NoRadioSongs),
                StationOutcome::Failed(_) => self.notify(Notice::RadioFailed),
            },
            Internal::FavoriteChecked {
                track_id,
                favorited,
            } => self.favorite.apply_check(&track_id, favorited),
            Internal::FavoriteSettled { track_id, change, ok } => {
                self.favorite.settle(&track_id, change, ok);
                self.notify(match (ok, change) {
                    (true, FavoriteChange::Add) => Notice::FavoriteAdded,
                    (true, FavoriteChange::Remove) => Notice::FavoriteRemoved,
                    (false, _) => Notice::FavoriteFailed,
                });
            }
        }
        self.reconcile();
    }

    /// Wait for the next completion and apply it.
    #[cfg(test)]
    pub(crate) async fn settle_next(&mut self) -> bool {
        let Some(inbox) = self.inbox.as_mut() else {
            return false;
        };
        match inbox.recv().await {
            Some(msg) => {
                self.on_internal(msg);
                true
            }
            None => false,
        }
    }

    fn reconcile(&mut self) {
        if self.session.track_epoch() != self.observed.epoch {
            self.observed.epoch = self.session.track_epoch();
            self.on_track_change();
        }

        let playing = self.session.is_playing();
        if playing != self.observed.playing {
            self.observed.playing = playing;
            if !playing {
                self.output.pause();
            } else if self.binding.loaded {
                self.output.play();
            } else {
                debug!("start deferred until the source is loaded");
            }
        }

        let volume = self.session.volume();
        if self.observed.volume != Some(volume) {
            self.observed.volume = Some(volume);
            self.output.set_volume(volume);
        }

        if let Some(request) = self.extender.check(&self.session) {
            let catalog = self.catalog.clone();
            let tx = self.internal_tx.clone();
            tokio::spawn(async move {
                let result = radio::fetch_batch(catalog.as_ref(), &request).await;
                let _ = tx.send(Internal::Extended {
                    station_id: request.station_id,
                    result,
                });
            });
        }

        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        if let Ok(mut slot) = self.published.lock() {
            *slot = snapshot;
        }
    }

    fn notify(&self, notice: Notice) {
        debug!(%notice, "notice");
        let _ = self.notices.send(notice);
    }

    fn on_track_change(&mut self) {
        self.output.clear();
        self.next_source += 1;
        self.binding = Binding {
            source: self.next_source,
            loaded: false,
        };

        let Some(track) = self.session.current_track().cloned() else {
            self.favorite.reset(None);
            return;
        };
        info!(track = %track.id, title = %track.display(), "track changed");
        self.favorite.reset(Some(&track.id));

        let source = self.binding.source;
        let resolver = self.resolver.clone();
        let tx = self.internal_tx.clone();
        let title = track.title.clone();
        let to_resolve = track.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(&to_resolve).await;
            let _ = tx.send(Internal::Resolved {
                source,
                title,
                result,
            });
        });

        if let Some(account) = self.account.clone() {
            self.track_history(&account, &track);
        }
    }

    fn track_history(&self, account: &Account, track: &Track) {
        let check = account.clone();
        let track_id = track.id.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let favorited = match check.api.favorites(&check.user_id).await {
                Ok(favorites) => favorites.has_song(&track_id),
                Err(err) => {
                    warn!(error = %err, "favorites lookup failed");
                    false
                }
            };
            let _ = tx.send(Internal::FavoriteChecked { track_id, favorited });
        });

        let recent = account.clone();
        let item = track.clone();
        tokio::spawn(async move {
            if let Err(err) = recent.api.add_recently_played(&recent.user_id, &item).await {
                warn!(error = %err, "could not record play history");
            }
        });
    }

    fn bind(&mut self, source: SourceId, title: &str, result: Result<ResolvedStream, ResolutionError>) {
        if source != self.binding.source {
            debug!(source, "discarding stale resolution");
            return;
        }
        match result {
            Ok(stream) => {
                debug!(source, quality = ?stream.quality, "binding stream");
                self.output.load(source, &stream.url);
            }
            Err(err) => {
                warn!(error = %err, "playback not started");
                self.notify(Notice::NoStreamFound {
                    title: title.to_string(),
                });
            }
        }
    }

    fn on_track_end(&mut self) {
        if self.session.repeat_mode() == RepeatMode::One {
            self.session.set_progress(Duration::ZERO);
            self.output.seek(Duration::ZERO);
            self.output.play();
            return;
        }
        if !self.session.next_track() {
            debug!("end of queue");
        }
    }

    fn fail_playback(&mut self, reason: String) {
        warn!(%reason, "playback failed");
        self.notify(Notice::PlaybackFailed { reason });
        self.session.set_playing(false);
    }

    fn play_list(&mut self, tracks: Vec<Track>, start: usize) {
        let Some(first) = tracks.get(start.min(tracks.len().saturating_sub(1))).cloned() else {
            return;
        };
        self.session.set_station_id(None);
        self.session.set_queue(tracks);
        self.session.set_current_track(first);
    }

    fn seek(&mut self, position: Duration) {
        let duration = self.session.duration();
        let position = if duration.is_zero() {
            position
        } else {
            position.min(duration)
        };
        self.session.set_progress(position);
        self.output.seek(position);
    }

    fn start_radio(&mut self, seed: &Track) {
        let catalog = self.catalog.clone();
        let tx = self.internal_tx.clone();
        let seed_id = seed.catalog_id().to_string();
        info!(seed = %seed_id, "starting radio");
        tokio::spawn(async move {
            let result = catalog.create_station(&seed_id).await;
            let _ = tx.send(Internal::StationCreated(result));
        });
    }

    fn toggle_favorite(&mut self) {
        let Some(account) = self.account.clone() else {
            self.notify(Notice::LoginRequired);
            return;
        };
        let Some(track) = self.session.current_track().cloned() else {
            return;
        };
        let Some((track_id, change)) = self.favorite.begin_toggle() else {
            return;
        };
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = match change {
                FavoriteChange::Add => {
                    account
                        .api
                        .add_favorite(&account.user_id, &track, ItemKind::Song)
                        .await
                }
                FavoriteChange::Remove => account.api.remove_favorite(&account.user_id, &track.id).await,
            };
            if let Err(err) = &result {
                warn!(error = %err, "favorite update failed");
            }
            let _ = tx.send(Internal::FavoriteSettled {
                track_id,
                change,
                ok: result.is_ok(),
            });
        });
    }
}
