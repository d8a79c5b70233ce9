//! HTTP client for the catalog proxy and the station service.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{ApiError, Result};
use crate::http::{build_client, endpoint, get_json, parse_base};

use super::model::{ItemKind, RawTrack, Track};
use super::normalize::{from_catalog, from_station};

/// One candidate stream for a track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QualityLink {
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub link: String,
}

/// What the link-resolution endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLinks {
    /// Candidates tagged with a quality tier, in the service's order.
    Ranked(Vec<QualityLink>),
    /// A single untagged stream URL.
    Direct(String),
    /// No `links` field at all.
    Missing,
}

/// Result of a details lookup.
#[derive(Debug, Clone, Default)]
pub struct ItemDetails {
    pub encrypted_media_token: Option<String>,
    /// The looked-up record itself, when it carried an identifier.
    pub track: Option<Track>,
}

/// A freshly created radio station.
#[derive(Debug, Clone, Default)]
pub struct StationSeed {
    pub station_id: Option<String>,
    pub tracks: Vec<Track>,
}

/// The remote collaborators the playback core depends on.
///
/// Implemented over HTTP by [`CatalogClient`]; tests plug in fakes.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Exchange an encrypted media token for stream links.
    async fn media_links(&self, track_id: &str, token: &str) -> Result<MediaLinks>;

    /// Look an item up by id to obtain its encrypted media token.
    async fn details(&self, item_id: &str, kind: ItemKind) -> Result<ItemDetails>;

    /// Songs of an album or playlist, in catalog order.
    async fn item_list(&self, item_id: &str, kind: ItemKind) -> Result<Vec<Track>>;

    /// Seed a new station from a song id.
    async fn create_station(&self, seed_id: &str) -> Result<StationSeed>;

    /// Next batch of tracks for an existing station. Empty on exhaustion.
    async fn continue_station(&self, station_id: &str, batch_size: usize) -> Result<Vec<Track>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LinksField {
    List(Vec<QualityLink>),
    Bare(String),
}

#[derive(Deserialize)]
struct LinksResponse {
    #[serde(default)]
    links: Option<LinksField>,
}

/// Albums answer with `list`, some playlists with `songs`.
#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    list: Option<serde_json::Value>,
    #[serde(default)]
    songs: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct StationResponse {
    #[serde(default, rename = "stationId")]
    station_id: Option<String>,
    #[serde(default)]
    songs: Option<Vec<RawTrack>>,
}

/// Catalog proxy client.
///
/// Stateless apart from the pooled `reqwest::Client`; nothing is cached.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    api_base: Url,
    radio_base: Url,
    image_size: String,
}

impl CatalogClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: build_client(&settings.api)?,
            api_base: parse_base(&settings.api.base_url)?,
            radio_base: parse_base(&settings.api.radio_base_url)?,
            image_size: settings.images.size.clone(),
        })
    }

    /// Share an existing connection pool.
    pub fn with_client(client: Client, api_base: &str, radio_base: &str, image_size: &str) -> Result<Self> {
        Ok(Self {
            client,
            api_base: parse_base(api_base)?,
            radio_base: parse_base(radio_base)?,
            image_size: image_size.to_string(),
        })
    }

    /// Download a resolved stream to `dest`, returning the byte count.
    pub async fn download_to(&self, stream_url: &str, dest: &Path) -> Result<u64> {
        let url = parse_base(stream_url)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        info!(path = %dest.display(), bytes = bytes.len(), "stream saved");
        Ok(bytes.len() as u64)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn media_links(&self, track_id: &str, token: &str) -> Result<MediaLinks> {
        let url = endpoint(&self.api_base, &["mediaURL", track_id, token])?;
        let body: LinksResponse = get_json(&self.client, url).await?;
        Ok(match body.links {
            Some(LinksField::List(links)) => MediaLinks::Ranked(links),
            Some(LinksField::Bare(link)) if !link.is_empty() => MediaLinks::Direct(link),
            _ => MediaLinks::Missing,
        })
    }

    async fn details(&self, item_id: &str, kind: ItemKind) -> Result<ItemDetails> {
        let url = endpoint(&self.api_base, &["details", item_id, kind.as_str()])?;
        let raw: RawTrack = get_json(&self.client, url).await?;
        let encrypted_media_token = raw
            .encrypted_media_url
            .clone()
            .or_else(|| raw.more_info.as_ref().and_then(|m| m.encrypted_media_url.clone()));
        Ok(ItemDetails {
            encrypted_media_token,
            track: from_catalog(raw, &self.image_size),
        })
    }

    async fn item_list(&self, item_id: &str, kind: ItemKind) -> Result<Vec<Track>> {
        let url = endpoint(&self.api_base, &["details", item_id, kind.as_str()])?;
        let body: ListResponse = get_json(&self.client, url).await?;
        let Some(serde_json::Value::Array(items)) = body.list.or(body.songs) else {
            return Ok(Vec::new());
        };
        let tracks: Vec<Track> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RawTrack>(item).ok())
            .filter_map(|raw| from_catalog(raw, &self.image_size))
            .collect();
        debug!(item = item_id, kind = kind.as_str(), tracks = tracks.len(), "item list fetched");
        Ok(tracks)
    }

    async fn create_station(&self, seed_id: &str) -> Result<StationSeed> {
        let mut url = endpoint(&self.radio_base, &["radioNew"])?;
        url.query_pairs_mut().append_pair("query", seed_id);
        let body: StationResponse = get_json(&self.client, url).await?;
        let tracks: Vec<Track> = body
            .songs
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| from_station(raw, &self.image_size))
            .collect();
        debug!(station = ?body.station_id, tracks = tracks.len(), "station created");
        Ok(StationSeed {
            station_id: body.station_id,
            tracks,
        })
    }

    async fn continue_station(&self, station_id: &str, batch_size: usize) -> Result<Vec<Track>> {
        let batch = batch_size.to_string();
        let url = endpoint(&self.radio_base, &["moreRadioNew", station_id, batch.as_str()])?;
        // Exhausted stations answer with something other than an array.
        let body: serde_json::Value = get_json(&self.client, url).await?;
        let serde_json::Value::Array(items) = body else {
            return Ok(Vec::new());
        };
        let tracks = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RawTrack>(item).ok())
            .filter_map(|raw| from_station(raw, &self.image_size))
            .collect();
        Ok(tracks)
    }
}
