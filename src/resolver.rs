//! Media resolution: turn a `Track` into a playable stream URL.
//!
//! Order of attempts:
//!
//! 1. `media_url` on the track, returned as-is.
//! 2. `encrypted_media_token` exchanged through the link-resolution endpoint.
//! 3. A details lookup to obtain a token, then step 2.
//!
//! Collaborator failures never escape: they are logged and the pipeline
//! moves on, ending in [`ResolutionError::NoStreamFound`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CatalogApi, MediaLinks, QualityLink, Track};
use crate::error::ResolutionError;

/// Tier ranking used when nothing else is configured.
pub const DEFAULT_QUALITY_PREFERENCE: [&str; 3] = ["320kbps", "160kbps", "96kbps"];

/// A URL ready to be handed to the audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub url: String,
    /// Tier the link was picked from, when the service tagged it.
    pub quality: Option<String>,
}

impl ResolvedStream {
    fn untagged(url: String) -> Self {
        Self { url, quality: None }
    }
}

#[derive(Clone)]
pub struct MediaResolver {
    catalog: Arc<dyn CatalogApi>,
    preference: Vec<String>,
}

impl MediaResolver {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self::with_preference(
            catalog,
            DEFAULT_QUALITY_PREFERENCE.iter().map(|q| q.to_string()).collect(),
        )
    }

    pub fn with_preference(catalog: Arc<dyn CatalogApi>, preference: Vec<String>) -> Self {
        Self { catalog, preference }
    }

    pub fn preference(&self) -> &[String] {
        &self.preference
    }

    pub async fn resolve(&self, track: &Track) -> Result<ResolvedStream, ResolutionError> {
        if let Some(url) = track.media_url.as_deref().filter(|u| !u.is_empty()) {
            debug!(track = %track.id, "direct media url");
            return Ok(ResolvedStream::untagged(url.to_string()));
        }

        let token = match track.encrypted_media_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => Some(token.to_string()),
            None => self.lookup_token(track).await,
        };

        let Some(token) = token else {
            return Err(ResolutionError::NoStreamFound(track.id.clone()));
        };

        self.exchange(track, &token)
            .await
            .ok_or_else(|| ResolutionError::NoStreamFound(track.id.clone()))
    }

    async fn lookup_token(&self, track: &Track) -> Option<String> {
        let id = track.catalog_id();
        debug!(track = %id, kind = track.kind.as_str(), "details lookup for media token");
        match self.catalog.details(id, track.kind).await {
            Ok(details) => details.encrypted_media_token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!(track = %id, error = %err, "details lookup failed");
                None
            }
        }
    }

    async fn exchange(&self, track: &Track, token: &str) -> Option<ResolvedStream> {
        let id = track.catalog_id();
        let links = match self.catalog.media_links(id, token).await {
            Ok(links) => links,
            Err(err) => {
                warn!(track = %id, error = %err, "link resolution failed");
                return None;
            }
        };
        match links {
            MediaLinks::Direct(url) => Some(ResolvedStream::untagged(url)),
            MediaLinks::Ranked(list) => {
                let picked = select_link(&list, &self.preference)?;
                debug!(track = %id, quality = %picked.quality, "stream tier selected");
                Some(ResolvedStream {
                    url: picked.link.clone(),
                    quality: Some(picked.quality.clone()),
                })
            }
            MediaLinks::Missing => None,
        }
    }
}

/// First link matching the preference order, else the last candidate.
///
/// Candidates with an empty `link` are never picked.
pub fn select_link<'a>(links: &'a [QualityLink], preference: &[String]) -> Option<&'a QualityLink> {
    let usable = || links.iter().filter(|l| !l.link.is_empty());
    preference
        .iter()
        .find_map(|tier| usable().find(|l| &l.quality == tier))
        .or_else(|| usable().last())
}

#[cfg(test)]
mod tests;
