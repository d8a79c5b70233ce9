//! Catalog types: the canonical `Track` and the loosely-typed records it is
//! built from.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::normalize::id_from_url;

/// What kind of catalog item a record describes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Song,
    Album,
    Artist,
    Playlist,
    Mix,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Song => "song",
            ItemKind::Album => "album",
            ItemKind::Artist => "artist",
            ItemKind::Playlist => "playlist",
            ItemKind::Mix => "mix",
        }
    }

    /// Unknown kinds are treated as songs, which is what the catalog means
    /// when the field is missing.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "album" => ItemKind::Album,
            "artist" => ItemKind::Artist,
            "playlist" => ItemKind::Playlist,
            "mix" => ItemKind::Mix,
            _ => ItemKind::Song,
        }
    }
}

/// A playable catalog item.
///
/// Serializes to the catalog's own field names so a snapshot can be handed
/// back to the favorites service as `item_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(rename = "encrypted_media_url", skip_serializing_if = "Option::is_none")]
    pub encrypted_media_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perma_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl Track {
    /// Minimal song record; the remaining fields default to absent.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            image: None,
            album: None,
            duration_secs: None,
            media_url: None,
            encrypted_media_token: None,
            perma_url: None,
            kind: ItemKind::Song,
        }
    }

    /// Identifier used on the wire: the permalink's last segment when the
    /// record carries one, otherwise `id`.
    pub fn catalog_id(&self) -> &str {
        self.perma_url
            .as_deref()
            .and_then(id_from_url)
            .unwrap_or(&self.id)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }

    /// `"Artist - Title"`, or just the title when there is no artist line.
    pub fn display(&self) -> String {
        if self.subtitle.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.subtitle.trim(), self.title)
        }
    }
}

/// A catalog record as the service sends it. Field presence varies by
/// endpoint; nothing downstream of `normalize` reads this type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTrack {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub artist: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub album: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub media_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub encrypted_media_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub perma_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    pub more_info: Option<RawMoreInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMoreInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub encrypted_media_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub album: Option<String>,
}

/// Accept strings and numbers, map everything else (objects, arrays, null,
/// empty strings) to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
