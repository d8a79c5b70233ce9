//! `AudioOutput` backed by rodio.
//!
//! A dedicated thread owns the output device and the current `Sink`.
//! Streams are downloaded on short-lived fetch threads and handed back to
//! the audio thread, which decodes them into a paused sink. Seeking
//! rebuilds the sink from the buffered bytes and skips into the source.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use crate::config::ApiSettings;
use crate::error::{OutputError, PlaybackStartError};

use super::output::{AudioOutput, OutputEvent, SourceId};

const TICK: Duration = Duration::from_millis(200);

enum AudioCmd {
    Load { source: SourceId, url: String },
    Fetched {
        source: SourceId,
        result: Result<Vec<u8>, OutputError>,
    },
    Clear,
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Quit,
}

pub struct RodioOutput {
    tx: Sender<AudioCmd>,
    join: Option<JoinHandle<()>>,
}

impl RodioOutput {
    /// Open the default output device and start the audio thread.
    ///
    /// Blocks until the device is open so a missing device is reported here
    /// rather than on the first `play`.
    pub fn spawn(api: &ApiSettings, events: UnboundedSender<OutputEvent>) -> Result<Self, OutputError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), OutputError>>();
        let loopback = tx.clone();
        let timeout = Duration::from_secs(api.timeout_secs.max(1) * 4);
        let user_agent = api.user_agent.clone();

        let join = thread::Builder::new()
            .name("cadenza-audio".into())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(OutputError::Device(e.to_string())));
                        return;
                    }
                };
                // rodio prints a notice on drop; it would land in the console.
                stream.log_on_drop(false);

                let http = match reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .user_agent(user_agent)
                    .build()
                {
                    Ok(client) => client,
                    Err(e) => {
                        let _ = ready_tx.send(Err(OutputError::Fetch(e.to_string())));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                AudioThread::new(&stream, http, events, loopback).run(rx);
            })
            .map_err(|e| OutputError::Device(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx, join: Some(join) }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => Err(OutputError::Device("audio thread exited during startup".into())),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone");
        }
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, source: SourceId, url: &str) {
        self.send(AudioCmd::Load {
            source,
            url: url.to_string(),
        });
    }

    fn clear(&mut self) {
        self.send(AudioCmd::Clear);
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCmd::Quit);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

struct Loaded {
    source: SourceId,
    bytes: Arc<[u8]>,
    sink: Sink,
    /// Position the sink was built at; `get_pos` counts from here.
    offset: Duration,
    ended: bool,
}

struct AudioThread<'a> {
    stream: &'a OutputStream,
    http: reqwest::blocking::Client,
    events: UnboundedSender<OutputEvent>,
    loopback: Sender<AudioCmd>,
    current: Option<Loaded>,
    pending: Option<SourceId>,
    last_source: SourceId,
    volume: f32,
}

impl<'a> AudioThread<'a> {
    fn new(
        stream: &'a OutputStream,
        http: reqwest::blocking::Client,
        events: UnboundedSender<OutputEvent>,
        loopback: Sender<AudioCmd>,
    ) -> Self {
        Self {
            stream,
            http,
            events,
            loopback,
            current: None,
            pending: None,
            last_source: 0,
            volume: 1.0,
        }
    }

    fn run(mut self, rx: Receiver<AudioCmd>) {
        loop {
            match rx.recv_timeout(TICK) {
                Ok(AudioCmd::Quit) => break,
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.stop();
    }

    fn emit(&self, event: OutputEvent) {
        let _ = self.events.send(event);
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { source, url } => {
                self.stop();
                self.pending = Some(source);
                self.last_source = source;
                self.fetch(source, url);
            }
            AudioCmd::Fetched { source, result } => {
                if self.pending != Some(source) {
                    debug!(source, "discarding stale stream");
                    return;
                }
                self.pending = None;
                match result {
                    Ok(bytes) => self.install(source, bytes.into()),
                    Err(e) => {
                        warn!(source, error = %e, "stream fetch failed");
                        self.emit(OutputEvent::LoadFailed {
                            source,
                            message: e.to_string(),
                        });
                    }
                }
            }
            AudioCmd::Clear => self.stop(),
            AudioCmd::Play => match &self.current {
                Some(loaded) => loaded.sink.play(),
                None => self.emit(OutputEvent::StartFailed {
                    source: self.pending.unwrap_or(self.last_source),
                    error: PlaybackStartError::Aborted,
                }),
            },
            AudioCmd::Pause => {
                if let Some(loaded) = &self.current {
                    loaded.sink.pause();
                }
            }
            AudioCmd::Seek(position) => self.seek(position),
            AudioCmd::SetVolume(volume) => {
                self.volume = volume;
                if let Some(loaded) = &self.current {
                    loaded.sink.set_volume(volume);
                }
            }
            AudioCmd::Quit => {}
        }
    }

    fn fetch(&self, source: SourceId, url: String) {
        let http = self.http.clone();
        let back = self.loopback.clone();
        let spawned = thread::Builder::new()
            .name("cadenza-fetch".into())
            .spawn(move || {
                let result = download(&http, &url);
                let _ = back.send(AudioCmd::Fetched { source, result });
            });
        if let Err(e) = spawned {
            error!(error = %e, "could not start fetch thread");
            self.emit(OutputEvent::LoadFailed {
                source,
                message: e.to_string(),
            });
        }
    }

    fn install(&mut self, source: SourceId, bytes: Arc<[u8]>) {
        let decoder = match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(decoder) => decoder,
            Err(e) => {
                warn!(source, error = %e, "stream decode failed");
                self.emit(OutputEvent::LoadFailed {
                    source,
                    message: OutputError::Decode(e.to_string()).to_string(),
                });
                return;
            }
        };
        let duration = decoder.total_duration();
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(decoder);
        sink.pause();
        self.current = Some(Loaded {
            source,
            bytes,
            sink,
            offset: Duration::ZERO,
            ended: false,
        });
        debug!(source, ?duration, "stream loaded");
        self.emit(OutputEvent::Loaded { source, duration });
    }

    fn seek(&mut self, position: Duration) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        let was_paused = loaded.sink.is_paused();
        let decoder = match Decoder::new(Cursor::new(loaded.bytes.clone())) {
            Ok(decoder) => decoder,
            Err(e) => {
                let source = loaded.source;
                self.emit(OutputEvent::LoadFailed {
                    source,
                    message: OutputError::Decode(e.to_string()).to_string(),
                });
                return;
            }
        };
        loaded.sink.stop();
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(decoder.skip_duration(position));
        if was_paused {
            sink.pause();
        }
        loaded.sink = sink;
        loaded.offset = position;
        loaded.ended = false;
    }

    fn tick(&mut self) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        if loaded.sink.is_paused() || loaded.ended {
            return;
        }
        let source = loaded.source;
        if loaded.sink.empty() {
            loaded.ended = true;
            self.emit(OutputEvent::Ended { source });
        } else {
            let position = loaded.offset + loaded.sink.get_pos();
            self.emit(OutputEvent::Progress { source, position });
        }
    }

    fn stop(&mut self) {
        if let Some(loaded) = self.current.take() {
            loaded.sink.stop();
        }
        self.pending = None;
    }
}

fn download(http: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, OutputError> {
    let response = http
        .get(url)
        .send()
        .map_err(|e| OutputError::Fetch(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(OutputError::Fetch(format!("status {status} from {url}")));
    }
    let bytes = response
        .bytes()
        .map_err(|e| OutputError::Fetch(e.to_string()))?;
    Ok(bytes.to_vec())
}
