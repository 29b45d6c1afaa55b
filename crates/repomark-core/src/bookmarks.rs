// Bookmark store: id-keyed set of repository snapshots, persisted on every change
use crate::models::Repository;
use repomark_storage::LocalStorage;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The one storage slot we own
pub const STORAGE_KEY: &str = "github-bookmarks";

/// Everything that can happen to the bookmark set
#[derive(Debug, Clone)]
pub enum BookmarkAction {
    /// Add if absent, remove if present
    Toggle(Repository),
    /// Replace the whole set
    Load(Vec<Repository>),
}

/// Pure bookmark state, no I/O
///
/// Keyed by repository id, one entry per repository.
/// The value is whatever snapshot was handed in at toggle time; later
/// searches never refresh it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkState {
    bookmarks: BTreeMap<u64, Repository>,
}

impl BookmarkState {
    /// Reducer: consume the old state, hand back the new one
    pub fn apply(mut self, action: BookmarkAction) -> Self {
        match action {
            BookmarkAction::Toggle(repo) => {
                if self.bookmarks.remove(&repo.id).is_none() {
                    self.bookmarks.insert(repo.id, repo);
                }
                self
            }
            BookmarkAction::Load(repos) => Self::from_list(repos),
        }
    }

    fn from_list(repos: Vec<Repository>) -> Self {
        // Later duplicates win, same as rebuilding a keyed map
        let bookmarks = repos.into_iter().map(|r| (r.id, r)).collect();
        Self { bookmarks }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.bookmarks.contains_key(&id)
    }

    pub fn get(&self, id: u64) -> Option<&Repository> {
        self.bookmarks.get(&id)
    }

    /// Snapshots in ascending id order
    pub fn values(&self) -> impl Iterator<Item = &Repository> {
        self.bookmarks.values()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}

/// Bookmark state glued to a storage backend
///
/// Every dispatched action is followed by a full rewrite of the stored
/// JSON array. Storage trouble is logged and swallowed: the in-memory set
/// stays the source of truth for this session.
pub struct BookmarkStore {
    state: BookmarkState,
    storage: Box<dyn LocalStorage>,
}

impl BookmarkStore {
    /// Read whatever is stored and start from there
    ///
    /// Never fails. Missing, unreadable or malformed data all mean "no
    /// bookmarks yet".
    pub fn open(storage: Box<dyn LocalStorage>) -> Self {
        let state = match Self::read_stored(storage.as_ref()) {
            Ok(Some(repos)) => {
                debug!("Loaded {} bookmarks from storage", repos.len());
                BookmarkState::from_list(repos)
            }
            Ok(None) => BookmarkState::default(),
            Err(e) => {
                warn!("Ignoring stored bookmarks: {}", e);
                BookmarkState::default()
            }
        };

        Self { state, storage }
    }

    fn read_stored(storage: &dyn LocalStorage) -> crate::Result<Option<Vec<Repository>>> {
        let Some(raw) = storage.get_item(STORAGE_KEY)? else {
            return Ok(None);
        };

        let repos: Vec<Repository> = serde_json::from_str(&raw)?;
        Ok(Some(repos))
    }

    /// Run an action through the reducer, then persist
    pub fn dispatch(&mut self, action: BookmarkAction) -> &BookmarkState {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(action);
        self.persist();
        &self.state
    }

    /// Flip bookmark membership; returns true if it is bookmarked afterwards
    pub fn toggle(&mut self, repo: &Repository) -> bool {
        let (id, full_name) = (repo.id, repo.full_name.clone());
        let bookmarked = self.dispatch(BookmarkAction::Toggle(repo.clone())).contains(id);

        if bookmarked {
            info!("Bookmarked {} ({})", full_name, id);
        } else {
            info!("Removed bookmark {} ({})", full_name, id);
        }
        bookmarked
    }

    /// Replace everything with `repos`
    pub fn load(&mut self, repos: Vec<Repository>) {
        self.dispatch(BookmarkAction::Load(repos));
    }

    pub fn is_bookmarked(&self, id: u64) -> bool {
        self.state.contains(id)
    }

    pub fn get(&self, id: u64) -> Option<&Repository> {
        self.state.get(id)
    }

    /// All bookmarked snapshots, ascending id
    pub fn all(&self) -> Vec<&Repository> {
        self.state.values().collect()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn state(&self) -> &BookmarkState {
        &self.state
    }

    /// Serialized form, exactly what lands in storage
    pub fn to_json(&self) -> crate::Result<String> {
        let snapshots: Vec<&Repository> = self.state.values().collect();
        Ok(serde_json::to_string(&snapshots)?)
    }

    /// Give the backend back, e.g. to reopen from it
    pub fn into_storage(self) -> Box<dyn LocalStorage> {
        self.storage
    }

    fn persist(&mut self) {
        let json = match self.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize bookmarks: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set_item(STORAGE_KEY, &json) {
            warn!("Failed to save bookmarks: {}", e);
        }
    }
}
