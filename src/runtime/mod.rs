//! Binary runtime: settings, startup, the console loop and MPRIS wiring.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::sync::mpsc;
use tracing::warn;

use cadenza::catalog::{CatalogApi, CatalogClient, ItemKind, Track};
use cadenza::config::Settings;
use cadenza::logging;
use cadenza::resolver::MediaResolver;

mod cli;
mod console;
mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

use cli::Invocation;
use console::{Command, LookupUse};

pub fn run() -> anyhow::Result<()> {
    let invocation = match cli::parse_args(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("cadenza: {msg}\n\n{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    let loaded = settings::load_settings();
    logging::init(&loaded.settings.logging);
    if let Some(problem) = &loaded.problem {
        warn!("{problem}");
    }
    let settings = loaded.settings;

    let initial = match invocation {
        Invocation::Help => {
            println!("{}", cli::USAGE);
            return Ok(());
        }
        Invocation::PrintConfig => {
            print!("{}", settings.to_toml().context("rendering settings")?);
            return Ok(());
        }
        Invocation::Download { id, dest } => return block_on(download(&settings, id, dest)),
        Invocation::Console => None,
        Invocation::Play { id, kind } => Some(Command::Lookup {
            id,
            kind,
            then: LookupUse::Play,
        }),
        Invocation::Radio(id) => Some(Command::Lookup {
            id,
            kind: ItemKind::Song,
            then: LookupUse::Radio,
        }),
    };
    block_on(session(&settings, initial))
}

fn block_on<F: std::future::Future<Output = anyhow::Result<()>>>(fut: F) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?
        .block_on(fut)
}

async fn session(settings: &Settings, initial: Option<Command>) -> anyhow::Result<()> {
    let services = startup::start(settings)?;

    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let mpris = cadenza::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &services.player.state_handle());

    println!("cadenza ready, type 'help' for commands");
    let state = event_loop::EventLoopState {
        player: services.player,
        catalog: services.catalog,
        mpris,
    };
    event_loop::run(state, services.notices, control_rx, initial).await
}

/// Fetch a song record by catalog id.
pub async fn find_song(catalog: &dyn CatalogApi, id: &str) -> anyhow::Result<Track> {
    catalog
        .details(id, ItemKind::Song)
        .await
        .with_context(|| format!("looking up {id}"))?
        .track
        .ok_or_else(|| anyhow!("no song with id {id}"))
}

/// Fetch what a lookup names: one song, or every song of an album or
/// playlist. Never returns an empty list.
pub async fn find_tracks(catalog: &dyn CatalogApi, id: &str, kind: ItemKind) -> anyhow::Result<Vec<Track>> {
    if kind == ItemKind::Song {
        return Ok(vec![find_song(catalog, id).await?]);
    }
    let tracks = catalog
        .item_list(id, kind)
        .await
        .with_context(|| format!("looking up {} {id}", kind.as_str()))?;
    if tracks.is_empty() {
        return Err(anyhow!("{} {id} has no playable songs", kind.as_str()));
    }
    Ok(tracks)
}

async fn download(settings: &Settings, id: String, dest: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = Arc::new(CatalogClient::from_settings(settings).context("building catalog client")?);
    let track = find_song(catalog.as_ref(), &id).await?;
    let resolver = MediaResolver::with_preference(catalog.clone(), settings.resolver.quality_preference.clone());
    let stream = resolver.resolve(&track).await?;
    let dest = dest.unwrap_or_else(|| cli::download_file_name(&track.display(), &id));
    let bytes = catalog
        .download_to(&stream.url, &dest)
        .await
        .with_context(|| format!("saving {}", dest.display()))?;
    println!("saved {} ({} KiB)", dest.display(), bytes / 1024);
    Ok(())
}
