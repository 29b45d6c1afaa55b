// TUI application state and event handling
use ratatui::widgets::ListState;
use repomark_core::{
    models::Repository,
    view::{self, Screen, ViewFilters},
    BookmarkStore, Debouncer, SearchController, SearchOutcome, POPULAR_SEARCHES,
};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,    // Navigating results
    Searching, // Typing in search box
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    /// What's in the box right now
    pub search_input: String,
    /// What the last search actually ran with
    pub debounced_query: String,
    pub filters: ViewFilters,
    pub selected_index: usize,
    pub list_state: ListState,
    pub status_message: Option<String>,
    pub bookmarks: BookmarkStore,
    pub search: SearchController,
    pub debouncer: Debouncer<String>,
}

impl App {
    pub fn new(bookmarks: BookmarkStore, search: SearchController, debounce: Duration) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Searching,
            search_input: String::new(),
            debounced_query: String::new(),
            filters: ViewFilters::default(),
            selected_index: 0,
            list_state,
            status_message: None,
            bookmarks,
            search,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Replace the query text; the search follows once typing stops
    pub fn set_query(&mut self, query: String) {
        self.debouncer.push(query.clone());
        self.search_input = query;
    }

    pub fn push_char(&mut self, c: char) {
        let mut query = self.search_input.clone();
        query.push(c);
        self.set_query(query);
    }

    pub fn pop_char(&mut self) {
        let mut query = self.search_input.clone();
        query.pop();
        self.set_query(query);
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// Skip the wait and search for what's typed right now
    pub fn flush_query(&mut self) {
        if self.debouncer.is_pending() {
            self.debouncer.cancel();
            self.on_debounced(self.search_input.clone());
        }
    }

    /// The query went quiet: run it
    pub fn on_debounced(&mut self, query: String) {
        debug!("Debounced query: '{}'", query);
        self.search.submit(&query);
        self.debounced_query = query;
        self.reset_selection();
    }

    pub fn on_search_outcome(&mut self, outcome: SearchOutcome) {
        if self.search.apply(outcome) {
            self.reset_selection();
        }
    }

    pub fn results(&self) -> &[Repository] {
        self.search.state().repositories()
    }

    /// The list the body shows after filters
    pub fn visible(&self) -> Vec<&Repository> {
        view::visible_repositories(self.results(), &self.bookmarks, self.filters)
    }

    pub fn screen(&self) -> Screen {
        let has_context = view::has_result_context(&self.debounced_query, self.filters);
        Screen::select(self.search.state(), has_context, self.visible().len())
    }

    pub fn bookmarked_in_results(&self) -> usize {
        view::bookmarked_in_results(self.results(), &self.bookmarks)
    }

    pub fn can_filter_results(&self) -> bool {
        view::can_filter_results(&self.debounced_query, self.results())
    }

    /// Bookmarked-only switch; can always be turned off, only turned on with results
    pub fn toggle_bookmarked_only(&mut self) {
        if self.filters.bookmarked_only || self.can_filter_results() {
            self.filters.toggle_bookmarked_only();
            self.reset_selection();
        }
    }

    pub fn toggle_show_all_bookmarks(&mut self) {
        self.filters.toggle_show_all_bookmarks();
        self.reset_selection();
    }

    pub fn selected_repository(&self) -> Option<&Repository> {
        self.visible().get(self.selected_index).copied()
    }

    /// Add/remove the highlighted repository from bookmarks
    pub fn toggle_selected_bookmark(&mut self) {
        let Some(repo) = self.selected_repository().cloned() else {
            return;
        };

        let bookmarked = self.bookmarks.toggle(&repo);
        self.status_message = Some(if bookmarked {
            format!("Bookmarked {}", repo.full_name)
        } else {
            format!("Removed {} from bookmarks", repo.full_name)
        });

        // Filtered views can shrink under the cursor
        self.clamp_selection();
    }

    /// Quick-fill from the suggestion list (1-based, as shown on screen)
    pub fn apply_suggestion(&mut self, number: usize) -> bool {
        let suggestions = match self.screen() {
            Screen::Welcome => POPULAR_SEARCHES.len(),
            Screen::NoResults => 3,
            _ => 0,
        };
        if number == 0 || number > suggestions {
            return false;
        }

        let (query, _) = POPULAR_SEARCHES[number - 1];
        self.set_query(query.to_string());
        true
    }

    pub fn next_result(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn previous_result(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    fn reset_selection(&mut self) {
        self.selected_index = 0;
        self.list_state = ListState::default();
        self.list_state.select(Some(0));
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(len - 1);
        }
        self.list_state.select(Some(self.selected_index));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use repomark_core::{Owner, Result, SearchProvider};
    use repomark_storage::MemoryStorage;
    use std::sync::Arc;

    pub fn repo(id: u64, full_name: &str, stars: u32) -> Repository {
        let (owner, name) = full_name.split_once('/').unwrap();
        Repository {
            id,
            name: name.to_string(),
            full_name: full_name.to_string(),
            description: None,
            url: format!("https://github.com/{}", full_name),
            stars,
            language: Some("TypeScript".to_string()),
            owner: Owner {
                login: owner.to_string(),
                avatar_url: String::new(),
            },
        }
    }

    /// Answers every query with the same canned list
    pub struct CannedProvider(pub Vec<Repository>);

    #[async_trait::async_trait]
    impl SearchProvider for CannedProvider {
        async fn search(&self, _query: &str) -> Result<Vec<Repository>> {
            Ok(self.0.clone())
        }
    }

    pub fn app_with(results: Vec<Repository>) -> App {
        let bookmarks = BookmarkStore::open(Box::new(MemoryStorage::new()));
        let search = SearchController::new(Arc::new(CannedProvider(results)));
        App::new(bookmarks, search, Duration::from_millis(300))
    }

    pub fn abc() -> Vec<Repository> {
        vec![
            repo(1, "facebook/react", 230_000),
            repo(2, "vuejs/core", 48_000),
            repo(3, "sveltejs/svelte", 80_000),
        ]
    }

    /// Run a search to completion, skipping the debounce wait
    pub async fn searched(app: &mut App, query: &str) {
        app.set_query(query.to_string());
        app.flush_query();
        app.search.settle().await;
    }
}
