use std::path::PathBuf;

use cadenza::catalog::ItemKind;

pub const USAGE: &str = "\
usage: cadenza [command]

  (none)                     start an empty session and read console commands
  play <song-id>             start a session playing one song
  play album|playlist <id>   start a session playing a whole album or playlist
  radio <song-id>            start a session on a station seeded by a song
  download <song-id> [file]  resolve a song and save its stream
  config                     print the effective configuration
  help                       show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Console,
    Play { id: String, kind: ItemKind },
    Radio(String),
    Download { id: String, dest: Option<PathBuf> },
    PrintConfig,
    Help,
}

/// Parse the process arguments, program name excluded.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    let words: Vec<&str> = args.iter().map(String::as_str).collect();
    match words.as_slice() {
        [] => Ok(Invocation::Console),
        ["play", id] => Ok(Invocation::Play {
            id: id.to_string(),
            kind: ItemKind::Song,
        }),
        ["play", kind @ ("album" | "playlist"), id] => Ok(Invocation::Play {
            id: id.to_string(),
            kind: ItemKind::parse(kind),
        }),
        ["radio", id] => Ok(Invocation::Radio(id.to_string())),
        ["download", id] => Ok(Invocation::Download {
            id: id.to_string(),
            dest: None,
        }),
        ["download", id, dest] => Ok(Invocation::Download {
            id: id.to_string(),
            dest: Some(PathBuf::from(dest)),
        }),
        ["config"] => Ok(Invocation::PrintConfig),
        ["help" | "-h" | "--help"] => Ok(Invocation::Help),
        _ => Err(format!("unrecognized arguments: {}", args.join(" "))),
    }
}

/// Default download target: the display name with path-hostile characters
/// replaced.
pub fn download_file_name(display: &str, id: &str) -> PathBuf {
    let stem: String = display
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        PathBuf::from(format!("{id}.mp3"))
    } else {
        PathBuf::from(format!("{stem}.mp3"))
    }
}
