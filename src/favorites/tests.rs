use super::*;
use crate::catalog::{ItemKind, Track};
use crate::error::ApiError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FavoritesClient {
    FavoritesClient::with_client(reqwest::Client::new(), &format!("{}/api", server.uri()), "500x500").unwrap()
}

fn song(id: &str) -> Track {
    let mut t = Track::new(id, "Song");
    t.subtitle = "Artist".into();
    t
}

#[test]
fn toggle_flips_then_settles() {
    let mut state = FavoriteState::default();
    state.reset(Some("a"));
    assert!(!state.is_favorited());

    let (id, change) = state.begin_toggle().unwrap();
    assert_eq!((id.as_str(), change), ("a", FavoriteChange::Add));
    assert!(state.is_favorited());
    state.settle("a", change, true);
    assert!(state.is_favorited());
}

#[test]
fn failed_toggle_rolls_back() {
    let mut state = FavoriteState::default();
    state.reset(Some("a"));
    state.apply_check("a", true);

    let (_, change) = state.begin_toggle().unwrap();
    assert_eq!(change, FavoriteChange::Remove);
    assert!(!state.is_favorited());
    state.settle("a", change, false);
    assert!(state.is_favorited());
}

#[test]
fn late_results_for_other_tracks_are_ignored() {
    let mut state = FavoriteState::default();
    state.reset(Some("a"));
    let (_, change) = state.begin_toggle().unwrap();
    state.reset(Some("b"));
    state.settle("a", change, false);
    state.apply_check("a", true);
    assert!(!state.is_favorited());
    assert_eq!(state.track_id(), Some("b"));
}

#[test]
fn lookup_landing_during_toggle_does_not_override_it() {
    let mut state = FavoriteState::default();
    state.reset(Some("a"));
    let (_, change) = state.begin_toggle().unwrap();

    state.apply_check("a", false);
    assert!(state.is_favorited());

    state.settle("a", change, true);
    assert!(state.is_favorited());

    state.apply_check("a", false);
    assert!(state.is_favorited());

    state.reset(Some("a"));
    state.apply_check("a", true);
    assert!(state.is_favorited());
}

#[test]
fn toggle_without_track_does_nothing() {
    let mut state = FavoriteState::default();
    assert!(state.begin_toggle().is_none());
    assert!(!state.is_favorited());
}

#[tokio::test]
async fn fetch_groups_and_normalizes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "songs": [{ "id": "s1", "title": "One &amp; Two", "duration": 120 }],
            "albums": [{ "id": "al1", "title": "Album", "type": "album" }],
            "playlists": []
        })))
        .mount(&server)
        .await;

    let favs = client_for(&server).favorites("u1").await.unwrap();
    assert!(favs.has_song("s1"));
    assert!(!favs.has_song("al1"));
    assert_eq!(favs.songs[0].title, "One & Two");
    assert_eq!(favs.songs[0].duration_secs, Some(120));
    assert_eq!(favs.albums[0].kind, ItemKind::Album);
    assert_eq!(favs.len(), 2);
}

#[tokio::test]
async fn add_posts_item_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites/add"))
        .and(body_json(json!({
            "user_id": "u1",
            "item_id": "s1",
            "type": "song",
            "item_data": { "id": "s1", "title": "Song", "subtitle": "Artist", "type": "song" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .add_favorite("u1", &song("s1"), ItemKind::Song)
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_posts_ids_and_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites/remove"))
        .and(body_json(json!({ "user_id": "u1", "item_id": "s1" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).remove_favorite("u1", "s1").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }), "{err:?}");
}

#[tokio::test]
async fn recently_played_round() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/recently-played/add"))
        .and(body_json(json!({
            "user_id": "u1",
            "item_id": "s1",
            "item_data": { "id": "s1", "title": "Song", "subtitle": "Artist", "type": "song" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recently-played/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "title": "Song", "image": "https://i/x-50x50.jpg" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/recently-played/clear"))
        .and(body_json(json!({ "user_id": "u1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.add_recently_played("u1", &song("s1")).await.unwrap();
    let recent = client.recently_played("u1").await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].image.as_deref(), Some("https://i/x-500x500.jpg"));
    client.clear_recently_played("u1").await.unwrap();
}
