use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use cadenza::catalog::CatalogClient;
use cadenza::config::Settings;
use cadenza::favorites::FavoritesClient;
use cadenza::player::{Controller, Notice, Player, RodioOutput};
use cadenza::radio::RadioExtender;
use cadenza::resolver::MediaResolver;
use cadenza::session::PlaybackSession;

pub struct Services {
    pub player: Player,
    pub catalog: Arc<CatalogClient>,
    pub notices: UnboundedReceiver<Notice>,
}

/// Session with the configured playback defaults applied.
pub fn initial_session(settings: &Settings) -> PlaybackSession {
    let mut session = PlaybackSession::new();
    session.set_volume(settings.playback.volume);
    session.set_repeat_mode(settings.playback.repeat.into());
    session
}

/// Open the audio device, wire the controller and start the player task.
///
/// Must be called from within the tokio runtime.
pub fn start(settings: &Settings) -> anyhow::Result<Services> {
    let catalog = Arc::new(CatalogClient::from_settings(settings).context("building catalog client")?);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let output = RodioOutput::spawn(&settings.api, events_tx).context("opening audio output")?;

    let (notices_tx, notices) = mpsc::unbounded_channel();
    let resolver = MediaResolver::with_preference(catalog.clone(), settings.resolver.quality_preference.clone());
    let mut controller = Controller::new(initial_session(settings), catalog.clone(), output, notices_tx)
        .with_resolver(resolver)
        .with_extender(RadioExtender::from_settings(&settings.radio));

    if let Some(user_id) = settings.account.user_id.as_deref() {
        let favorites = FavoritesClient::from_settings(settings).context("building favorites client")?;
        controller = controller.with_account(user_id, Arc::new(favorites));
        info!(user = user_id, "favorites enabled");
    }

    let player = Player::spawn(controller, events_rx);
    Ok(Services {
        player,
        catalog,
        notices,
    })
}
