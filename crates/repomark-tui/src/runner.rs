// TUI event loop and terminal management
use crate::{App, InputMode};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use tracing::{info, warn};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("TUI started with {} bookmarks", app.bookmarks.len());
    let result = event_loop(&mut terminal, &mut app).await;

    // Restore terminal, even if the loop blew up
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// One loop, three wake-up sources: keys, the debounce timer, finished searches
async fn event_loop(terminal: &mut Tui, app: &mut App) -> anyhow::Result<()> {
    let mut events = EventStream::new();

    while !app.should_quit {
        terminal.draw(|f| crate::ui::render(f, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => handle_key(app, key),
                Some(Ok(_)) => {} // resize and friends just redraw
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            query = app.debouncer.settled() => app.on_debounced(query),
            Some(outcome) = app.search.next_outcome() => app.on_search_outcome(outcome),
        }
    }

    Ok(())
}

/// Map a key press onto app state
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.quit(),
            KeyCode::Char('u') => app.clear_query(),
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Searching => match key.code {
            KeyCode::Enter => {
                app.flush_query();
                app.enter_normal_mode();
            }
            KeyCode::Esc | KeyCode::Down | KeyCode::Tab => {
                app.enter_normal_mode();
            }
            KeyCode::Char(c) => {
                app.push_char(c);
            }
            KeyCode::Backspace => {
                app.pop_char();
            }
            _ => {}
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => {
                app.quit();
            }
            KeyCode::Char('/') | KeyCode::Char('i') => {
                app.enter_search_mode();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                app.next_result();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.previous_result();
            }
            KeyCode::Char('b') | KeyCode::Char(' ') => {
                app.toggle_selected_bookmark();
            }
            KeyCode::Char('f') => {
                app.toggle_bookmarked_only();
            }
            KeyCode::Char('a') => {
                app.toggle_show_all_bookmarks();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let number = c.to_digit(10).unwrap_or(0) as usize;
                if app.apply_suggestion(number) {
                    app.enter_search_mode();
                }
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                if let Some(repo) = app.selected_repository() {
                    // Open in browser
                    let url = repo.url.clone();
                    if let Err(e) = open::that(&url) {
                        warn!("Failed to open {}: {}", url, e);
                        app.status_message = Some(format!("Failed to open browser: {}", e));
                    }
                }
            }
            KeyCode::Esc => {
                app.clear_status();
            }
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::*;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_typing_fills_query() {
        let mut app = app_with(abc());
        type_text(&mut app, "react");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_input, "reac");
    }

    #[tokio::test]
    async fn test_ctrl_u_clears_query() {
        let mut app = app_with(abc());
        type_text(&mut app, "react");
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        assert_eq!(app.search_input, "");
    }

    #[tokio::test]
    async fn test_enter_searches_immediately() {
        let mut app = app_with(abc());
        type_text(&mut app, "react");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.debounced_query, "react");
        assert!(!app.debouncer.is_pending());
        assert!(app.search.state().is_loading());
    }

    #[tokio::test]
    async fn test_q_only_quits_in_normal_mode() {
        let mut app = app_with(abc());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.search_input, "q");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_bookmark_and_filter_keys() {
        let mut app = app_with(abc());
        searched(&mut app, "js").await;
        app.enter_normal_mode();

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('b'));
        assert!(app.bookmarks.is_bookmarked(3));

        press(&mut app, KeyCode::Char('f'));
        assert!(app.filters.bookmarked_only);

        press(&mut app, KeyCode::Char('a'));
        assert!(app.filters.show_all_bookmarks);
        assert_eq!(app.visible().len(), 1);
    }

    #[tokio::test]
    async fn test_number_picks_suggestion_on_welcome() {
        let mut app = app_with(abc());
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));

        assert_eq!(app.search_input, "typescript");
        assert_eq!(app.input_mode, InputMode::Searching);
    }

    #[tokio::test]
    async fn test_release_events_are_ignored() {
        let mut app = app_with(abc());
        let mut key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert_eq!(app.search_input, "");
    }
}
