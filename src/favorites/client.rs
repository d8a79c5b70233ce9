use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{ItemKind, RawTrack, Track, from_catalog};
use crate::config::Settings;
use crate::error::Result;
use crate::http::{build_client, endpoint, get_json, parse_base, post_json};

/// A user's favorites, grouped the way the service stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    pub songs: Vec<Track>,
    pub albums: Vec<Track>,
    pub playlists: Vec<Track>,
}

impl Favorites {
    pub fn has_song(&self, id: &str) -> bool {
        self.songs.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.songs.len() + self.albums.len() + self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn favorites(&self, user_id: &str) -> Result<Favorites>;

    async fn add_favorite(&self, user_id: &str, item: &Track, kind: ItemKind) -> Result<()>;

    async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<()>;

    async fn add_recently_played(&self, user_id: &str, item: &Track) -> Result<()>;

    async fn recently_played(&self, user_id: &str) -> Result<Vec<Track>>;

    async fn clear_recently_played(&self, user_id: &str) -> Result<()>;
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FavoritesResponse {
    songs: Vec<RawTrack>,
    albums: Vec<RawTrack>,
    playlists: Vec<RawTrack>,
}

#[derive(Serialize)]
struct AddFavorite<'a> {
    user_id: &'a str,
    item_id: &'a str,
    #[serde(rename = "type")]
    kind: ItemKind,
    item_data: &'a Track,
}

#[derive(Serialize)]
struct RemoveFavorite<'a> {
    user_id: &'a str,
    item_id: &'a str,
}

#[derive(Serialize)]
struct AddRecent<'a> {
    user_id: &'a str,
    item_id: &'a str,
    item_data: &'a Track,
}

#[derive(Serialize)]
struct UserOnly<'a> {
    user_id: &'a str,
}

/// HTTP client for `/favorites/*` and `/recently-played/*`.
#[derive(Debug, Clone)]
pub struct FavoritesClient {
    client: Client,
    api_base: Url,
    image_size: String,
}

impl FavoritesClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: build_client(&settings.api)?,
            api_base: parse_base(&settings.api.base_url)?,
            image_size: settings.images.size.clone(),
        })
    }

    pub fn with_client(client: Client, api_base: &str, image_size: &str) -> Result<Self> {
        Ok(Self {
            client,
            api_base: parse_base(api_base)?,
            image_size: image_size.to_string(),
        })
    }

    fn tracks(&self, raw: Vec<RawTrack>) -> Vec<Track> {
        raw.into_iter()
            .filter_map(|r| from_catalog(r, &self.image_size))
            .collect()
    }
}

#[async_trait]
impl FavoritesApi for FavoritesClient {
    async fn favorites(&self, user_id: &str) -> Result<Favorites> {
        let url = endpoint(&self.api_base, &["favorites", user_id])?;
        let body: FavoritesResponse = get_json(&self.client, url).await?;
        let favorites = Favorites {
            songs: self.tracks(body.songs),
            albums: self.tracks(body.albums),
            playlists: self.tracks(body.playlists),
        };
        debug!(user = %user_id, count = favorites.len(), "favorites fetched");
        Ok(favorites)
    }

    async fn add_favorite(&self, user_id: &str, item: &Track, kind: ItemKind) -> Result<()> {
        let url = endpoint(&self.api_base, &["favorites", "add"])?;
        let body = AddFavorite {
            user_id,
            item_id: &item.id,
            kind,
            item_data: item,
        };
        post_json(&self.client, url, &body).await
    }

    async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<()> {
        let url = endpoint(&self.api_base, &["favorites", "remove"])?;
        post_json(&self.client, url, &RemoveFavorite { user_id, item_id }).await
    }

    async fn add_recently_played(&self, user_id: &str, item: &Track) -> Result<()> {
        let url = endpoint(&self.api_base, &["recently-played", "add"])?;
        let body = AddRecent {
            user_id,
            item_id: &item.id,
            item_data: item,
        };
        post_json(&self.client, url, &body).await
    }

    async fn recently_played(&self, user_id: &str) -> Result<Vec<Track>> {
        let url = endpoint(&self.api_base, &["recently-played", user_id])?;
        let raw: Vec<RawTrack> = get_json(&self.client, url).await?;
        Ok(self.tracks(raw))
    }

    async fn clear_recently_played(&self, user_id: &str) -> Result<()> {
        let url = endpoint(&self.api_base, &["recently-played", "clear"])?;
        post_json(&self.client, url, &UserOnly { user_id }).await
    }
}
