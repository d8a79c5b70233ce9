use std::path::PathBuf;
use std::time::Duration;

use cadenza::catalog::{CatalogClient, ItemKind, Track};
use cadenza::config::{RepeatModeSetting, Settings};
use cadenza::mpris::ControlCmd;
use cadenza::player::PlayerCmd;
use cadenza::session::{Action, RepeatMode, SessionSnapshot};

use super::find_tracks;
use super::cli::{Invocation, download_file_name, parse_args};
use super::console::{Command, LookupUse, format_queue, format_status, parse_command, parse_position};
use super::mpris_sync::control_intents;
use super::startup::initial_session;

fn parsed(line: &str) -> Command {
    parse_command(line).unwrap().unwrap()
}

fn action(line: &str) -> Action {
    match parsed(line) {
        Command::Intent(PlayerCmd::Apply(action)) => action,
        other => panic!("{line:?} parsed to {other:?}"),
    }
}

#[test]
fn blank_lines_are_ignored() {
    assert!(parse_command("").unwrap().is_none());
    assert!(parse_command("   \t").unwrap().is_none());
}

#[test]
fn single_key_commands_map_to_actions() {
    assert!(matches!(action(" "), Action::TogglePlayPause));
    assert!(matches!(action("t"), Action::TogglePlayPause));
    assert!(matches!(action("play"), Action::TogglePlayPause));
    assert!(matches!(action("n"), Action::NextTrack));
    assert!(matches!(action("p"), Action::PreviousTrack));
    assert!(matches!(action("s"), Action::ToggleShuffle));
    assert!(matches!(action("r"), Action::ToggleRepeat));
    assert!(matches!(action("m"), Action::ToggleMute));
    assert!(matches!(parsed("f"), Command::Intent(PlayerCmd::ToggleFavorite)));
    assert!(matches!(parsed("q"), Command::Quit));
    assert!(matches!(parsed("+"), Command::VolumeStep(s) if s > 0.0));
    assert!(matches!(parsed("-"), Command::VolumeStep(s) if s < 0.0));
}

#[test]
fn id_commands_become_lookups() {
    for (line, want) in [
        ("play abc", LookupUse::Play),
        ("radio abc", LookupUse::Radio),
        ("next abc", LookupUse::PlayNext),
        ("add abc", LookupUse::Append),
    ] {
        match parsed(line) {
            Command::Lookup { id, kind, then } => {
                assert_eq!(id, "abc");
                assert_eq!(kind, ItemKind::Song);
                assert_eq!(then, want, "{line}");
            }
            other => panic!("{line:?} parsed to {other:?}"),
        }
    }
}

#[test]
fn album_and_playlist_commands_look_up_lists() {
    for (line, want_kind, want_use) in [
        ("play album al1", ItemKind::Album, LookupUse::Play),
        ("next album al1", ItemKind::Album, LookupUse::PlayNext),
        ("add playlist al1", ItemKind::Playlist, LookupUse::Append),
        ("play playlist al1", ItemKind::Playlist, LookupUse::Play),
    ] {
        match parsed(line) {
            Command::Lookup { id, kind, then } => {
                assert_eq!(id, "al1");
                assert_eq!((kind, then), (want_kind, want_use), "{line}");
            }
            other => panic!("{line:?} parsed to {other:?}"),
        }
    }
    assert!(parse_command("radio album al1").is_err());
    assert!(parse_command("play artist a1").is_err());
}

#[test]
fn jump_and_clear_edit_the_queue() {
    assert!(matches!(parsed("jump 2"), Command::Jump(1)));
    assert!(parse_command("jump 0").is_err());
    assert!(matches!(action("clear"), Action::SetQueue(tracks) if tracks.is_empty()));
}

#[test]
fn queue_positions_are_one_based() {
    assert!(matches!(action("rm 1"), Action::RemoveAt(0)));
    assert!(matches!(action("mv 3 1"), Action::Reorder { from: 2, to: 0 }));
    assert!(parse_command("rm 0").is_err());
    assert!(parse_command("rm x").is_err());
}

#[test]
fn volume_is_given_in_percent() {
    assert!(matches!(action("vol 40"), Action::SetVolume(v) if (v - 0.4).abs() < 1e-6));
    assert!(parse_command("vol 140").is_err());
    assert!(parse_command("vol -1").is_err());
}

#[test]
fn seek_accepts_seconds_and_minutes() {
    assert_eq!(parse_position("90").unwrap(), Duration::from_secs(90));
    assert_eq!(parse_position("1:30").unwrap(), Duration::from_secs(90));
    assert_eq!(parse_position("0:02.5").unwrap(), Duration::from_millis(2_500));
    assert!(parse_position("-3").is_err());
    assert!(parse_position("a:10").is_err());
    assert!(matches!(
        parsed("seek 1:00"),
        Command::Intent(PlayerCmd::Seek(d)) if d == Duration::from_secs(60)
    ));
}

#[test]
fn unknown_commands_are_errors() {
    assert!(parse_command("dance").is_err());
    assert!(parse_command("q now").is_err());
}

fn track(id: &str, title: &str, artist: &str) -> Track {
    let mut t = Track::new(id, title);
    t.subtitle = artist.to_string();
    t
}

#[test]
fn status_line_shows_track_and_modes() {
    let current = track("a", "Song", "Band");
    let snapshot = SessionSnapshot {
        current_track: Some(current.clone()),
        queue: vec![current],
        is_playing: true,
        volume: 0.7,
        progress: Duration::from_secs(65),
        duration: Duration::from_secs(200),
        repeat_mode: RepeatMode::One,
        station_id: Some("st".into()),
        ..SessionSnapshot::default()
    };
    let line = format_status(&snapshot);
    assert!(line.contains("Band - Song"), "{line}");
    assert!(line.contains("1:05 / 3:20"), "{line}");
    assert!(line.contains("vol 70%"), "{line}");
    assert!(line.contains("repeat one"), "{line}");
    assert!(line.contains("radio"), "{line}");
    assert!(!line.contains("shuffle"), "{line}");

    assert_eq!(format_status(&SessionSnapshot::default()), "nothing playing");
}

#[test]
fn queue_listing_marks_current() {
    let a = track("a", "One", "");
    let b = track("b", "Two", "X");
    let snapshot = SessionSnapshot {
        current_track: Some(b.clone()),
        queue: vec![a, b],
        ..SessionSnapshot::default()
    };
    let listing = format_queue(&snapshot);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines, vec!["   1. One", ">  2. X - Two"]);
    assert_eq!(format_queue(&SessionSnapshot::default()), "queue is empty");
}

#[test]
fn args_select_invocation() {
    assert_eq!(parse_args(Vec::<String>::new()), Ok(Invocation::Console));
    assert_eq!(
        parse_args(["play", "x1"]),
        Ok(Invocation::Play {
            id: "x1".into(),
            kind: ItemKind::Song,
        })
    );
    assert_eq!(
        parse_args(["play", "album", "al1"]),
        Ok(Invocation::Play {
            id: "al1".into(),
            kind: ItemKind::Album,
        })
    );
    assert_eq!(parse_args(["radio", "x1"]), Ok(Invocation::Radio("x1".into())));
    assert_eq!(
        parse_args(["download", "x1", "/tmp/a.mp3"]),
        Ok(Invocation::Download {
            id: "x1".into(),
            dest: Some(PathBuf::from("/tmp/a.mp3")),
        })
    );
    assert_eq!(parse_args(["config"]), Ok(Invocation::PrintConfig));
    assert_eq!(parse_args(["--help"]), Ok(Invocation::Help));
    assert!(parse_args(["play"]).is_err());
}

#[test]
fn download_names_are_path_safe() {
    assert_eq!(
        download_file_name("AC/DC - Thunder: Live", "x"),
        PathBuf::from("AC_DC - Thunder_ Live.mp3")
    );
    assert_eq!(download_file_name("  ", "x1"), PathBuf::from("x1.mp3"));
}

#[test]
fn remote_controls_map_to_intents() {
    assert!(control_intents(ControlCmd::Quit, Duration::ZERO).is_none());

    let intents = control_intents(ControlCmd::PlayPause, Duration::ZERO).unwrap();
    assert!(matches!(intents.as_slice(), [PlayerCmd::Apply(Action::TogglePlayPause)]));

    let intents = control_intents(ControlCmd::Stop, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        intents.as_slice(),
        [PlayerCmd::Apply(Action::SetPlaying(false)), PlayerCmd::Seek(d)] if d.is_zero()
    ));
}

#[test]
fn initial_session_uses_playback_settings() {
    let mut settings = Settings::default();
    settings.playback.volume = 0.25;
    settings.playback.repeat = RepeatModeSetting::All;

    let session = initial_session(&settings);
    assert_eq!(session.volume(), 0.25);
    assert_eq!(session.repeat_mode(), RepeatMode::All);
    assert!(session.current_track().is_none());
}

fn seek_target(cmd: ControlCmd, progress: Duration) -> Duration {
    match control_intents(cmd, progress).unwrap().as_slice() {
        [PlayerCmd::Seek(d)] => *d,
        other => panic!("expected one seek, got {other:?}"),
    }
}

#[test]
fn remote_seeks_become_absolute_positions() {
    let at = Duration::from_secs(30);
    assert_eq!(seek_target(ControlCmd::Seek(5_000_000), at), Duration::from_secs(35));
    assert_eq!(seek_target(ControlCmd::Seek(-10_000_000), at), Duration::from_secs(20));
    assert_eq!(seek_target(ControlCmd::Seek(-60_000_000), at), Duration::ZERO);
    assert_eq!(
        seek_target(ControlCmd::SetPosition(Duration::from_secs(90)), at),
        Duration::from_secs(90)
    );
}

#[tokio::test]
async fn find_tracks_fetches_songs_and_lists() {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/details/s1/song"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "s1", "title": "Solo" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/details/al1/album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [{ "id": "a", "title": "A" }, { "id": "b", "title": "B" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/details/pl0/playlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": [] })))
        .mount(&server)
        .await;

    let catalog = CatalogClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        &server.uri(),
        "500x500",
    )
    .unwrap();

    let song = find_tracks(&catalog, "s1", ItemKind::Song).await.unwrap();
    assert_eq!(song.len(), 1);
    assert_eq!(song[0].title, "Solo");

    let album = find_tracks(&catalog, "al1", ItemKind::Album).await.unwrap();
    assert_eq!(album.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);

    let err = find_tracks(&catalog, "pl0", ItemKind::Playlist).await.unwrap_err();
    assert!(err.to_string().contains("no playable songs"), "{err}");
}
