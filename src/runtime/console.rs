//! Line commands typed on the console and the text printed back.

use std::time::Duration;

use cadenza::catalog::ItemKind;
use cadenza::player::PlayerCmd;
use cadenza::session::{Action, RepeatMode, SessionSnapshot};

/// Volume change for `+` and `-`.
pub const VOLUME_STEP: f32 = 0.1;

/// How looked-up tracks are used once the catalog returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupUse {
    Play,
    Radio,
    PlayNext,
    Append,
}

#[derive(Debug, Clone)]
pub enum Command {
    Intent(PlayerCmd),
    /// Fetch a song, album or playlist by catalog id first.
    Lookup {
        id: String,
        kind: ItemKind,
        then: LookupUse,
    },
    /// Make queue entry `n` (0-based) current.
    Jump(usize),
    VolumeStep(f32),
    ShowQueue,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  play <id>         play a song now (replaces the queue)
  radio <id>        start a station seeded by a song
  next <id>         queue a song right after the current one
  add <id>          queue a song at the end
  play|next|add album <id>
  play|next|add playlist <id>
                    the same for every song of an album or playlist
  jump <n>          play queue entry n
  clear             empty the queue (the current song keeps playing)
  t | space         play / pause
  n | p             next / previous track
  s                 toggle shuffle
  r                 cycle repeat (off, all, one)
  + | - | m         volume up / down / mute
  vol <0-100>       set volume
  seek <secs|m:ss>  jump within the current track
  f                 favorite / unfavorite the current track
  rm <n>            remove queue entry n
  mv <from> <to>    move queue entry
  queue | status    show the queue / what is playing
  q                 quit";

/// Parse one console line. Blank lines parse to `None`. Queue positions are
/// 1-based on the console.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    // A lone space is the play/pause key.
    if line == " " {
        return Ok(Some(intent(Action::TogglePlayPause)));
    }
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head, rest.as_slice()) {
        ("q" | "quit" | "exit", []) => Command::Quit,
        ("h" | "help" | "?", []) => Command::Help,
        ("t" | "toggle" | "play" | "pause", []) => intent(Action::TogglePlayPause),
        ("n" | "next", []) => intent(Action::NextTrack),
        ("p" | "prev" | "previous", []) => intent(Action::PreviousTrack),
        ("s" | "shuffle", []) => intent(Action::ToggleShuffle),
        ("r" | "repeat", []) => intent(Action::ToggleRepeat),
        ("m" | "mute", []) => intent(Action::ToggleMute),
        ("+", []) => Command::VolumeStep(VOLUME_STEP),
        ("-", []) => Command::VolumeStep(-VOLUME_STEP),
        ("f" | "fav", []) => Command::Intent(PlayerCmd::ToggleFavorite),
        ("queue" | "ls", []) => Command::ShowQueue,
        ("status" | "st", []) => Command::Status,
        ("vol" | "volume", [level]) => {
            let level: u8 = level
                .parse()
                .map_err(|_| format!("not a volume: {level}"))?;
            if level > 100 {
                return Err("volume is 0-100".to_string());
            }
            intent(Action::SetVolume(f32::from(level) / 100.0))
        }
        ("seek", [at]) => Command::Intent(PlayerCmd::Seek(parse_position(at)?)),
        ("play", [id]) => lookup(id, ItemKind::Song, LookupUse::Play),
        ("radio", [id]) => lookup(id, ItemKind::Song, LookupUse::Radio),
        ("next", [id]) => lookup(id, ItemKind::Song, LookupUse::PlayNext),
        ("add", [id]) => lookup(id, ItemKind::Song, LookupUse::Append),
        ("play" | "next" | "add", [kind @ ("album" | "playlist"), id]) => {
            let then = match head {
                "play" => LookupUse::Play,
                "next" => LookupUse::PlayNext,
                _ => LookupUse::Append,
            };
            lookup(id, ItemKind::parse(kind), then)
        }
        ("jump" | "j", [n]) => Command::Jump(parse_position_index(n)?),
        ("clear", []) => intent(Action::SetQueue(Vec::new())),
        ("rm", [n]) => intent(Action::RemoveAt(parse_position_index(n)?)),
        ("mv", [from, to]) => intent(Action::Reorder {
            from: parse_position_index(from)?,
            to: parse_position_index(to)?,
        }),
        _ => return Err(format!("unknown command: {}", line.trim())),
    };
    Ok(Some(command))
}

fn intent(action: Action) -> Command {
    Command::Intent(PlayerCmd::Apply(action))
}

fn lookup(id: &str, kind: ItemKind, then: LookupUse) -> Command {
    Command::Lookup {
        id: id.to_string(),
        kind,
        then,
    }
}

fn parse_position_index(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("not a queue position: {raw}")),
    }
}

/// `90`, `1:30` and `1:30.5` all mean ninety seconds in (plus a half).
pub fn parse_position(raw: &str) -> Result<Duration, String> {
    let bad = || format!("not a position: {raw}");
    let (minutes, seconds) = match raw.split_once(':') {
        Some((m, s)) => (m.parse::<u64>().map_err(|_| bad())?, s),
        None => (0, raw),
    };
    let seconds: f64 = seconds.parse().map_err(|_| bad())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(bad());
    }
    Ok(Duration::from_secs(minutes * 60) + Duration::from_secs_f64(seconds))
}

pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// One-line summary of what is playing.
pub fn format_status(s: &SessionSnapshot) -> String {
    let Some(track) = s.current_track.as_ref() else {
        return "nothing playing".to_string();
    };
    let mut line = format!(
        "{} {}  {} / {}  vol {}%",
        if s.is_playing { "▶" } else { "⏸" },
        track.display(),
        format_time(s.progress),
        format_time(s.duration),
        (s.volume * 100.0).round() as u32,
    );
    match s.repeat_mode {
        RepeatMode::Off => {}
        RepeatMode::All => line.push_str("  repeat all"),
        RepeatMode::One => line.push_str("  repeat one"),
    }
    if s.shuffle_enabled {
        line.push_str("  shuffle");
    }
    if s.station_id.is_some() {
        line.push_str("  radio");
    }
    if s.is_favorited {
        line.push_str("  ♥");
    }
    line
}

/// Numbered queue listing with the current entry marked.
pub fn format_queue(s: &SessionSnapshot) -> String {
    if s.queue.is_empty() {
        return "queue is empty".to_string();
    }
    let current = s.current_index();
    s.queue
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if Some(i) == current { '>' } else { ' ' };
            format!("{marker}{:>3}. {}", i + 1, track.display())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
