//! Ingestion mapping: one function per source shape, all producing a
//! canonical [`Track`].

use super::model::{ItemKind, RawTrack, Track};

const LOW_RES_TOKENS: [&str; 3] = ["150x150", "50x50", "250x250"];

/// Rewrite the catalog's low-resolution artwork size tokens to `size`.
pub fn high_res_image(url: &str, size: &str) -> String {
    LOW_RES_TOKENS
        .iter()
        .fold(url.to_string(), |acc, token| acc.replace(token, size))
}

/// Last path segment of a permalink, query string stripped.
pub fn id_from_url(url: &str) -> Option<&str> {
    let last = url.rsplit('/').next()?;
    let id = last.split('?').next().unwrap_or_default();
    if id.is_empty() { None } else { Some(id) }
}

/// Decode the handful of HTML entities the catalog leaves in text fields.
pub fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
}

/// Map a record from the browse/details/favorites endpoints.
///
/// The artist line falls back `subtitle -> artist -> description`.
/// Records without any usable identifier are dropped.
pub fn from_catalog(raw: RawTrack, image_size: &str) -> Option<Track> {
    let subtitle = raw
        .subtitle
        .clone()
        .or_else(|| raw.artist.clone())
        .or_else(|| raw.description.clone());
    let kind = raw
        .kind
        .as_deref()
        .map(ItemKind::parse)
        .unwrap_or_default();
    build(raw, subtitle, kind, image_size)
}

/// Map a record from the station endpoints.
///
/// Station records are always songs and prefer `description` over `artist`
/// for the artist line.
pub fn from_station(raw: RawTrack, image_size: &str) -> Option<Track> {
    let subtitle = raw
        .subtitle
        .clone()
        .or_else(|| raw.description.clone())
        .or_else(|| raw.artist.clone());
    build(raw, subtitle, ItemKind::Song, image_size)
}

fn build(raw: RawTrack, subtitle: Option<String>, kind: ItemKind, image_size: &str) -> Option<Track> {
    let perma_url = raw.perma_url.or(raw.url);
    let id = raw
        .id
        .or_else(|| perma_url.as_deref().and_then(id_from_url).map(str::to_string))?;

    let more_info = raw.more_info.unwrap_or_default();
    let duration_secs = raw
        .duration
        .or(more_info.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| d.round() as u64);

    Some(Track {
        id,
        title: decode_entities(raw.title.as_deref().unwrap_or_default()),
        subtitle: decode_entities(subtitle.as_deref().unwrap_or_default()),
        image: raw.image.map(|url| high_res_image(&url, image_size)),
        album: raw.album.or(more_info.album).map(|a| decode_entities(&a)),
        duration_secs,
        media_url: raw.media_url,
        encrypted_media_token: raw.encrypted_media_url.or(more_info.encrypted_media_url),
        perma_url,
        kind,
    })
}
