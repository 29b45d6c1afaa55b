// UI rendering logic
use crate::{App, InputMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use repomark_core::{models::Repository, Screen, POPULAR_SEARCHES};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search input
            Constraint::Length(1), // Filter bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_search_input(frame, app, chunks[1]);
    render_filter_bar(frame, app, chunks[2]);

    match app.screen() {
        Screen::Loading => render_loading(frame, chunks[3]),
        Screen::Error(message) => render_error(frame, &message, chunks[3]),
        Screen::Welcome => render_welcome(frame, chunks[3]),
        Screen::NoResults => render_no_results(frame, chunks[3]),
        Screen::Results => render_results_list(frame, app, chunks[3]),
    }

    render_status_bar(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "🔍 GitHub Repository Search",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  search and bookmark repositories",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, header_chunks[0]);

    let stats = Paragraph::new(Line::from(vec![
        Span::styled("⭐ ", Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{} bookmarked", app.bookmarks.len()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("📊 ", Style::default().fg(Color::Green)),
        Span::styled(
            format!("{} shown", app.visible().len()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(stats, header_chunks[1]);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_style = match app.input_mode {
        InputMode::Searching => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default(),
    };

    let (text, text_style) = if app.search_input.is_empty() {
        ("Search repositories...", Style::default().fg(Color::DarkGray))
    } else {
        (app.search_input.as_str(), input_style)
    };

    let input = Paragraph::new(text).style(text_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title(" Search (/ to edit, Ctrl-u to clear) "),
    );
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching {
        frame.set_cursor_position((cursor_x(area, &app.search_input), area.y.saturating_add(1)));
    }
}

/// Column just past the typed text, measured in display cells, kept inside the box
fn cursor_x(area: Rect, input: &str) -> u16 {
    let offset = u16::try_from(Span::raw(input).width()).unwrap_or(u16::MAX);
    let last_inner = area.x.saturating_add(area.width.saturating_sub(2));
    area.x.saturating_add(1).saturating_add(offset).min(last_inner)
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let active = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::Gray);

    let mut spans = Vec::new();

    if app.can_filter_results() {
        let label = if app.filters.bookmarked_only {
            " 📚 Show All "
        } else {
            " ⭐ Bookmarks "
        };
        let style = if app.filters.bookmarked_only { active } else { inactive };
        spans.push(Span::styled("[f]", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(label, style));

        let count = app.bookmarked_in_results();
        if count > 0 {
            spans.push(Span::styled(
                format!("({})", count),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::raw("   "));
    }

    let (label, style) = if app.filters.show_all_bookmarks {
        (" Showing: All Bookmarks ", active)
    } else {
        (" All Bookmarks ", inactive)
    };
    spans.push(Span::styled("[a]", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(label, style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⏳ Searching repositories...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Fetching data from GitHub API",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_message(frame, lines, area);
}

fn render_error(frame: &mut Frame, message: &str, area: Rect) {
    let hint = if message.to_lowercase().contains("rate limit") {
        "GitHub API rate limit reached. Please try again later."
    } else {
        "Please check your connection and try again"
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("❌ {}", message),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    render_message(frame, lines, area);
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to GitHub Repository Search!",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Discover and bookmark open-source projects from GitHub."),
        Line::from("Search by name, topic, or technology to find repositories that interest you."),
        Line::from(""),
        Line::from(Span::styled(
            "Popular searches to get started:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(suggestion_lines(POPULAR_SEARCHES.len()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "🔍 Search as you type   ⭐ Bookmark with b   💾 Bookmarks survive restarts",
        Style::default().fg(Color::DarkGray),
    )));

    render_message(frame, lines, area);
}

fn render_no_results(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "📭 No repositories found",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Try searching for something else or browse these popular topics:",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    lines.extend(suggestion_lines(3));
    render_message(frame, lines, area);
}

fn suggestion_lines(count: usize) -> Vec<Line<'static>> {
    POPULAR_SEARCHES
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, (_, label))| {
            Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(*label),
            ])
        })
        .collect()
}

fn render_message(frame: &mut Frame, lines: Vec<Line>, area: Rect) {
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_results_list(frame: &mut Frame, app: &mut App, area: Rect) {
    // Build owned items first so the list state can be borrowed mutably afterwards
    let items: Vec<ListItem<'static>> = app
        .visible()
        .into_iter()
        .map(|repo| repository_item(repo, app.bookmarks.is_bookmarked(repo.id)))
        .collect();
    let count = items.len();

    let title = format!(
        " Found {} {} ",
        count,
        if count == 1 { "repository" } else { "repositories" }
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn repository_item(repo: &Repository, bookmarked: bool) -> ListItem<'static> {
    let marker = if bookmarked {
        Span::styled("★ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("☆ ", Style::default().fg(Color::DarkGray))
    };

    let title = Line::from(vec![
        marker,
        Span::styled(
            repo.full_name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  by {}", repo.owner.login),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let description = Line::from(Span::raw(format!(
        "  {}",
        repo.description
            .as_deref()
            .unwrap_or("No description available")
    )));

    let mut footer = vec![Span::styled(
        format!("  ⭐ {}", format_stars(repo.stars)),
        Style::default().fg(Color::Yellow),
    )];
    if let Some(language) = &repo.language {
        footer.push(Span::styled(
            format!("  {}", language),
            Style::default().fg(Color::Green),
        ));
    }

    ListItem::new(vec![title, description, Line::from(footer)])
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = match (&app.status_message, app.input_mode) {
        (Some(message), _) => message.clone(),
        (None, InputMode::Searching) => {
            "Type to search | Enter: search now | Esc: browse results".to_string()
        }
        (None, InputMode::Normal) => {
            "j/k: move | b: bookmark | f: bookmarked only | a: all bookmarks | o: open | /: search | q: quit"
                .to_string()
        }
    };

    let status = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(status, area);
}

/// Compact star count: 999, 1.0k, 12.3k
pub fn format_stars(count: u32) -> String {
    if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}
