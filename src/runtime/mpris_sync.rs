use std::time::Duration;

use cadenza::mpris::{ControlCmd, MprisHandle};
use cadenza::player::{PlayerCmd, SnapshotHandle};
use cadenza::session::Action;

pub fn update_mpris(mpris: &MprisHandle, state: &SnapshotHandle) {
    if let Ok(snapshot) = state.lock() {
        mpris.set_now_playing(&snapshot);
    }
}

/// Player intents for a remote control, given the current position. `None`
/// means quit.
pub fn control_intents(cmd: ControlCmd, progress: Duration) -> Option<Vec<PlayerCmd>> {
    let actions = match cmd {
        ControlCmd::Quit => return None,
        ControlCmd::Play => vec![PlayerCmd::Apply(Action::SetPlaying(true))],
        ControlCmd::Pause => vec![PlayerCmd::Apply(Action::SetPlaying(false))],
        ControlCmd::PlayPause => vec![PlayerCmd::Apply(Action::TogglePlayPause)],
        ControlCmd::Stop => vec![
            PlayerCmd::Apply(Action::SetPlaying(false)),
            PlayerCmd::Seek(Duration::ZERO),
        ],
        ControlCmd::Next => vec![PlayerCmd::Apply(Action::NextTrack)],
        ControlCmd::Prev => vec![PlayerCmd::Apply(Action::PreviousTrack)],
        ControlCmd::Seek(offset) => {
            let delta = Duration::from_micros(offset.unsigned_abs());
            let target = if offset < 0 {
                progress.saturating_sub(delta)
            } else {
                progress + delta
            };
            vec![PlayerCmd::Seek(target)]
        }
        ControlCmd::SetPosition(position) => vec![PlayerCmd::Seek(position)],
    };
    Some(actions)
}
