//! MPRIS "now playing" integration over the session bus.
//!
//! The service runs on its own thread with a small async executor. Remote
//! controls (media keys, `playerctl`) are forwarded as [`ControlCmd`]s; the
//! runtime turns them into player intents. Published state is pushed in with
//! [`MprisHandle::set_now_playing`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_io::{Timer, block_on};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::session::SessionSnapshot;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.cadenza";
const TRACK_PREFIX: &str = "/org/mpris/MediaPlayer2/track/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative move in microseconds; negative goes back.
    Seek(i64),
    /// Absolute position in the current track.
    SetPosition(std::time::Duration),
}

#[derive(Debug, Default)]
struct SharedState {
    has_track: bool,
    playing: bool,
    volume: f64,
    position_micros: i64,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<String>,
}

#[derive(Clone)]
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// Mirror the published session into the bus properties.
    pub fn set_now_playing(&self, snapshot: &SessionSnapshot) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.playing = snapshot.is_playing;
        s.volume = f64::from(snapshot.volume);
        s.position_micros = micros(snapshot.progress);

        let Some(track) = snapshot.current_track.as_ref() else {
            let volume = s.volume;
            *s = SharedState {
                volume,
                ..SharedState::default()
            };
            return;
        };
        s.has_track = true;
        s.title = Some(track.title.clone());
        s.artist = if track.subtitle.trim().is_empty() {
            Vec::new()
        } else {
            vec![track.subtitle.trim().to_string()]
        };
        s.album = track.album.clone();
        s.art_url = track.image.clone();
        s.length_micros = if snapshot.duration.is_zero() {
            track.duration().map(micros)
        } else {
            Some(micros(snapshot.duration))
        };
        s.track_id = Some(track_object_path(&track.id));
    }
}

fn micros(d: std::time::Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

/// D-Bus object paths only allow `[A-Za-z0-9_]` per element.
fn track_object_path(id: &str) -> String {
    let element: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if element.is_empty() {
        format!("{TRACK_PREFIX}_")
    } else {
        format!("{TRACK_PREFIX}{element}")
    }
}

fn insert(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match OwnedValue::try_from(value) {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => debug!(key, error = %e, "skipping metadata entry"),
    }
}

struct RootIface {
    tx: UnboundedSender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "cadenza"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: UnboundedSender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    /// Ignored unless `track_id` names the current track, as MPRIS requires.
    fn set_position(&self, track_id: OwnedObjectPath, position: i64) {
        let current = self.state.lock().ok().and_then(|s| s.track_id.clone());
        if position < 0 || current.as_deref() != Some(track_id.as_str()) {
            debug!(track = %track_id.as_str(), position, "ignoring stale SetPosition");
            return;
        }
        let position = std::time::Duration::from_micros(position.unsigned_abs());
        let _ = self.tx.send(ControlCmd::SetPosition(position));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match (s.has_track, s.playing) {
            (false, _) => "Stopped",
            (true, true) => "Playing",
            (true, false) => "Paused",
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(path) = s.track_id.as_deref().and_then(|p| ObjectPath::try_from(p).ok()) {
            insert(&mut map, "mpris:trackid", Value::from(path));
        }
        insert(
            &mut map,
            "xesam:title",
            Value::from(s.title.clone().unwrap_or_default()),
        );
        if !s.artist.is_empty() {
            insert(&mut map, "xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            insert(&mut map, "xesam:album", Value::from(album.clone()));
        }
        if let Some(art) = &s.art_url {
            insert(&mut map, "mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(len) = s.length_micros {
            insert(&mut map, "mpris:length", Value::from(len));
        }
        map
    }
}

/// Register the MPRIS service on a background thread.
///
/// A missing session bus is logged and otherwise ignored; the handle stays
/// usable.
pub fn spawn_mpris(tx: UnboundedSender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let state_for_thread = state.clone();

    let spawned = std::thread::Builder::new()
        .name("cadenza-mpris".into())
        .spawn(move || {
            block_on(async move {
                let _connection = match serve(tx, state_for_thread).await {
                    Ok(connection) => connection,
                    Err(e) => {
                        warn!(error = %e, "MPRIS unavailable");
                        return;
                    }
                };
                loop {
                    Timer::after(std::time::Duration::from_secs(3600)).await;
                }
            });
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not start MPRIS thread");
    }

    MprisHandle { state }
}

async fn serve(tx: UnboundedSender<ControlCmd>, state: Arc<Mutex<SharedState>>) -> zbus::Result<Connection> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;
    let server = connection.object_server();
    server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await?;
    server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;
    debug!(name = BUS_NAME, "MPRIS service registered");
    Ok(connection)
}
