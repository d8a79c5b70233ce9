//! Favorites and play history for the signed-in user.
//!
//! `client` talks to the persistence service; `state` holds the favorite
//! flag of the current track with optimistic toggling.

mod client;
mod state;

pub use client::{Favorites, FavoritesApi, FavoritesClient};
pub use state::{FavoriteChange, FavoriteState};

#[cfg(test)]
mod tests;
