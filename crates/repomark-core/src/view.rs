// What actually ends up on screen: results x bookmarks x filters
use crate::{bookmarks::BookmarkStore, models::Repository, search::SearchState};

/// User-toggled view switches, never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewFilters {
    /// Only the bookmarked part of the current results
    pub bookmarked_only: bool,
    /// Every bookmark, whatever the search says
    pub show_all_bookmarks: bool,
}

impl ViewFilters {
    pub fn toggle_bookmarked_only(&mut self) {
        self.bookmarked_only = !self.bookmarked_only;
    }

    pub fn toggle_show_all_bookmarks(&mut self) {
        self.show_all_bookmarks = !self.show_all_bookmarks;
    }
}

/// Pick the list to render; first matching rule wins
///
/// 1. show-all-bookmarks: the whole bookmark store
/// 2. bookmarked-only: results that are bookmarked, in result order
/// 3. otherwise: results as they came
pub fn visible_repositories<'a>(
    results: &'a [Repository],
    bookmarks: &'a BookmarkStore,
    filters: ViewFilters,
) -> Vec<&'a Repository> {
    if filters.show_all_bookmarks {
        return bookmarks.all();
    }

    if filters.bookmarked_only {
        return results
            .iter()
            .filter(|repo| bookmarks.is_bookmarked(repo.id))
            .collect();
    }

    results.iter().collect()
}

/// How many of the current results are bookmarked
pub fn bookmarked_in_results(results: &[Repository], bookmarks: &BookmarkStore) -> usize {
    results
        .iter()
        .filter(|repo| bookmarks.is_bookmarked(repo.id))
        .count()
}

/// Is there anything worth showing beyond the welcome screen?
pub fn has_result_context(debounced_query: &str, filters: ViewFilters) -> bool {
    !debounced_query.trim().is_empty() || filters.show_all_bookmarks
}

/// The bookmarked-only switch only makes sense with results to filter
pub fn can_filter_results(debounced_query: &str, results: &[Repository]) -> bool {
    !debounced_query.trim().is_empty() && !results.is_empty()
}

/// Which screen the body shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Error(String),
    Welcome,
    NoResults,
    Results,
}

impl Screen {
    /// Loading beats error beats welcome beats empty beats the list
    pub fn select(search: &SearchState, has_context: bool, visible_len: usize) -> Self {
        if search.is_loading() {
            return Screen::Loading;
        }
        if let Some(message) = search.error() {
            return Screen::Error(message.to_string());
        }
        if !has_context {
            return Screen::Welcome;
        }
        if visible_len == 0 {
            return Screen::NoResults;
        }
        Screen::Results
    }
}
