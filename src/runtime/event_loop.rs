use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use cadenza::catalog::{CatalogClient, ItemKind};
use cadenza::mpris::{ControlCmd, MprisHandle};
use cadenza::player::{Notice, Player, PlayerCmd};
use cadenza::session::Action;

use super::console::{self, Command, LookupUse};
use super::find_tracks;
use super::mpris_sync::{control_intents, update_mpris};

const MPRIS_SYNC: Duration = Duration::from_millis(250);

/// Intent sources and output sinks of a console session.
pub struct EventLoopState {
    pub player: Player,
    pub catalog: Arc<CatalogClient>,
    pub mpris: MprisHandle,
}

/// Drive the session until the user quits, MPRIS asks to quit or the
/// process is interrupted. The player task is shut down on the way out.
pub async fn run(
    state: EventLoopState,
    mut notices: UnboundedReceiver<Notice>,
    mut control_rx: UnboundedReceiver<ControlCmd>,
    initial: Option<Command>,
) -> anyhow::Result<()> {
    let mut lines = spawn_stdin();
    let mut console_open = true;

    let mut tick = tokio::time::interval(MPRIS_SYNC);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    if let Some(cmd) = initial {
        state.handle(cmd);
    }

    loop {
        tokio::select! {
            line = lines.recv(), if console_open => match line {
                Some(line) => match console::parse_command(&line) {
                    Ok(Some(cmd)) => {
                        if !state.handle(cmd) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => println!("{msg} (type 'help')"),
                },
                None => {
                    // Stdin closed; keep playing until interrupted.
                    debug!("console input closed");
                    console_open = false;
                }
            },
            Some(cmd) = control_rx.recv() => match control_intents(cmd, state.player.snapshot().progress) {
                Some(intents) => {
                    for intent in intents {
                        state.player.send(intent);
                    }
                }
                None => break,
            },
            Some(notice) = notices.recv() => print_notice(&notice),
            _ = tick.tick() => update_mpris(&state.mpris, &state.player.state_handle()),
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
        }
    }

    info!("shutting down");
    state.player.shutdown().await;
    Ok(())
}

impl EventLoopState {
    /// Returns `false` when the session should end.
    fn handle(&self, cmd: Command) -> bool {
        match cmd {
            Command::Quit => return false,
            Command::Intent(intent) => {
                self.player.send(intent);
            }
            Command::Lookup { id, kind, then } => {
                spawn_lookup(self.catalog.clone(), self.player.sender(), id, kind, then);
            }
            Command::Jump(index) => match self.player.snapshot().queue.get(index) {
                Some(track) => {
                    self.player.apply(Action::SetCurrentTrack(track.clone()));
                }
                None => println!("no queue entry {}", index + 1),
            },
            Command::VolumeStep(step) => {
                let volume = self.player.snapshot().volume;
                self.player.apply(Action::SetVolume(volume + step));
            }
            Command::ShowQueue => println!("{}", console::format_queue(&self.player.snapshot())),
            Command::Status => println!("{}", console::format_status(&self.player.snapshot())),
            Command::Help => println!("{}", console::HELP),
        }
        true
    }
}

fn spawn_lookup(
    catalog: Arc<CatalogClient>,
    player: UnboundedSender<PlayerCmd>,
    id: String,
    kind: ItemKind,
    then: LookupUse,
) {
    tokio::spawn(async move {
        let mut tracks = match find_tracks(catalog.as_ref(), &id, kind).await {
            Ok(tracks) => tracks,
            Err(e) => {
                println!("! {e:#}");
                return;
            }
        };
        match tracks.as_slice() {
            [one] => println!("{}", one.display()),
            many => println!("{} songs", many.len()),
        }
        let cmd = match then {
            LookupUse::Play => PlayerCmd::PlayList { tracks, start: 0 },
            LookupUse::Radio => PlayerCmd::StartRadio(tracks.swap_remove(0)),
            LookupUse::PlayNext => PlayerCmd::Apply(Action::InsertNext(tracks)),
            LookupUse::Append => PlayerCmd::Apply(Action::Append(tracks)),
        };
        let _ = player.send(cmd);
    });
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        println!("! {notice}");
    } else {
        println!("{notice}");
    }
}

/// Stdin is read on a plain thread; tokio's stdin would hold the runtime
/// open on shutdown.
fn spawn_stdin() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("cadenza-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not start console reader");
    }
    rx
}
