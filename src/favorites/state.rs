/// Direction of a favorite toggle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FavoriteChange {
    Add,
    Remove,
}

/// Favorite flag of the current track.
///
/// The flag flips as soon as a toggle starts; [`settle`](Self::settle)
/// rolls it back if the service call failed. Results for a track that is
/// no longer current are ignored. Once the listener has toggled the
/// current track, lookups for it are ignored too: an answer may have been
/// read before the toggle reached the service.
#[derive(Debug, Clone, Default)]
pub struct FavoriteState {
    track_id: Option<String>,
    favorited: bool,
    toggled: bool,
}

impl FavoriteState {
    pub fn is_favorited(&self) -> bool {
        self.favorited
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    /// Follow a current-track change. The flag is unknown (false) until a
    /// check comes back.
    pub fn reset(&mut self, track_id: Option<&str>) {
        self.track_id = track_id.map(str::to_string);
        self.favorited = false;
        self.toggled = false;
    }

    /// Record the answer of a favorites lookup.
    pub fn apply_check(&mut self, track_id: &str, favorited: bool) {
        if !self.toggled && self.track_id.as_deref() == Some(track_id) {
            self.favorited = favorited;
        }
    }

    /// Flip the flag and report which call to make. `None` without a track.
    pub fn begin_toggle(&mut self) -> Option<(String, FavoriteChange)> {
        let id = self.track_id.clone()?;
        let change = if self.favorited {
            FavoriteChange::Remove
        } else {
            FavoriteChange::Add
        };
        self.favorited = !self.favorited;
        self.toggled = true;
        Some((id, change))
    }

    pub fn settle(&mut self, track_id: &str, change: FavoriteChange, ok: bool) {
        if self.track_id.as_deref() != Some(track_id) {
            return;
        }
        if !ok {
            self.favorited = change == FavoriteChange::Remove;
        }
    }
}
