// Core business logic lives here - the brain of the operation
pub mod bookmarks;
pub mod config;
pub mod debounce;
pub mod error;
pub mod models;
pub mod providers;
pub mod search;
pub mod view;

pub use bookmarks::{BookmarkAction, BookmarkState, BookmarkStore, STORAGE_KEY};
pub use config::Config;
pub use debounce::Debouncer;
pub use error::Error;
pub use models::{Owner, Repository, POPULAR_SEARCHES};
pub use providers::GitHubProvider;
pub use search::{SearchController, SearchOutcome, SearchProvider, SearchState};
pub use view::{Screen, ViewFilters};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
