use super::*;
use crate::testing::FakeCatalog;

fn link(quality: &str, link: &str) -> QualityLink {
    QualityLink {
        quality: quality.into(),
        link: link.into(),
    }
}

fn default_pref() -> Vec<String> {
    DEFAULT_QUALITY_PREFERENCE.iter().map(|s| s.to_string()).collect()
}

fn tokened(id: &str, token: &str) -> Track {
    let mut t = Track::new(id, "Song");
    t.encrypted_media_token = Some(token.into());
    t
}

#[test]
fn select_prefers_highest_listed_tier() {
    let links = vec![link("96kbps", "u96"), link("320kbps", "u320"), link("160kbps", "u160")];
    assert_eq!(select_link(&links, &default_pref()).map(|l| l.link.as_str()), Some("u320"));
}

#[test]
fn select_falls_back_to_160_then_96() {
    let links = vec![link("96kbps", "u96"), link("160kbps", "u160")];
    assert_eq!(select_link(&links, &default_pref()).map(|l| l.link.as_str()), Some("u160"));

    let links = vec![link("96kbps", "u96")];
    assert_eq!(select_link(&links, &default_pref()).map(|l| l.link.as_str()), Some("u96"));
}

#[test]
fn select_unknown_tiers_takes_last() {
    let links = vec![link("12kbps", "first"), link("48kbps", "middle"), link("64kbps", "last")];
    assert_eq!(select_link(&links, &default_pref()).map(|l| l.link.as_str()), Some("last"));
    assert!(select_link(&[], &default_pref()).is_none());
}

#[test]
fn select_honours_custom_preference() {
    let links = vec![link("320kbps", "u320"), link("96kbps", "u96")];
    let pref = vec!["96kbps".to_string()];
    assert_eq!(select_link(&links, &pref).map(|l| l.link.as_str()), Some("u96"));
}

#[tokio::test]
async fn direct_url_skips_network() {
    let catalog = FakeCatalog::new();
    let resolver = MediaResolver::new(catalog.clone());
    let mut track = tokened("a", "TOK");
    track.media_url = Some("https://cdn.example.com/a.mp3".into());

    let stream = resolver.resolve(&track).await.unwrap();
    assert_eq!(stream.url, "https://cdn.example.com/a.mp3");
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn token_is_exchanged_for_ranked_link() {
    let catalog = FakeCatalog::new();
    catalog.with_links(
        "a",
        MediaLinks::Ranked(vec![link("96kbps", "u96"), link("160kbps", "u160")]),
    );
    let resolver = MediaResolver::new(catalog.clone());

    let stream = resolver.resolve(&tokened("a", "TOK")).await.unwrap();
    assert_eq!(stream.url, "u160");
    assert_eq!(stream.quality.as_deref(), Some("160kbps"));
    assert_eq!(catalog.calls(), vec!["links:a:TOK"]);
}

#[tokio::test]
async fn bare_link_is_used_directly() {
    let catalog = FakeCatalog::new();
    catalog.with_links("a", MediaLinks::Direct("https://cdn.example.com/bare".into()));
    let resolver = MediaResolver::new(catalog);

    let stream = resolver.resolve(&tokened("a", "TOK")).await.unwrap();
    assert_eq!(stream.url, "https://cdn.example.com/bare");
    assert!(stream.quality.is_none());
}

#[tokio::test]
async fn missing_token_goes_through_details_lookup() {
    let catalog = FakeCatalog::new();
    catalog.with_token("a", "FROM_DETAILS");
    catalog.with_links("a", MediaLinks::Ranked(vec![link("320kbps", "u320")]));
    let resolver = MediaResolver::new(catalog.clone());

    let stream = resolver.resolve(&Track::new("a", "Song")).await.unwrap();
    assert_eq!(stream.url, "u320");
    assert_eq!(catalog.calls(), vec!["details:a:song", "links:a:FROM_DETAILS"]);
}

#[tokio::test]
async fn details_lookup_uses_permalink_id() {
    let catalog = FakeCatalog::new();
    catalog.with_token("XyZ", "T");
    catalog.with_links("XyZ", MediaLinks::Direct("u".into()));
    let resolver = MediaResolver::new(catalog.clone());

    let mut track = Track::new("internal-1", "Song");
    track.perma_url = Some("https://www.example.com/song/title/XyZ".into());
    resolver.resolve(&track).await.unwrap();
    assert_eq!(catalog.count("details:XyZ"), 1);
}

#[tokio::test]
async fn failed_details_lookup_is_no_stream_found() {
    let catalog = FakeCatalog::new();
    let resolver = MediaResolver::new(catalog.clone());

    let err = resolver.resolve(&Track::new("a", "Song")).await.unwrap_err();
    assert_eq!(err, ResolutionError::NoStreamFound("a".into()));
    assert_eq!(catalog.count("links:"), 0);
}

#[tokio::test]
async fn failed_link_resolution_is_no_stream_found() {
    let catalog = FakeCatalog::new();
    let resolver = MediaResolver::new(catalog);
    let err = resolver.resolve(&tokened("a", "TOK")).await.unwrap_err();
    assert!(matches!(err, ResolutionError::NoStreamFound(_)));
}

#[tokio::test]
async fn missing_or_empty_links_are_no_stream_found() {
    let catalog = FakeCatalog::new();
    catalog.with_links("a", MediaLinks::Missing);
    catalog.with_links("b", MediaLinks::Ranked(Vec::new()));
    let resolver = MediaResolver::new(catalog);

    assert!(resolver.resolve(&tokened("a", "T")).await.is_err());
    assert!(resolver.resolve(&tokened("b", "T")).await.is_err());
}
