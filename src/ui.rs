use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DetailState, FavoritesState, InputMode, PageState, Screen, ToastKind};
use crate::catalog::CatalogError;
use crate::theme::ColorScheme;
use crate::types::{Character, CharacterStatus};

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &App) {
    // Dynamic chrome: the search bar only takes rows while it has something
    // to show, so the body always gets the rest.
    let search_expanded = app.screen() == Screen::Catalog
        && (app.input_mode() == InputMode::Search || !app.query().search().is_empty());
    let show_debug = app.debug_visible() && !app.debug_log().is_empty();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(5);
    constraints.push(Constraint::Length(1)); // header
    if search_expanded {
        constraints.push(Constraint::Length(3)); // search input
    }
    constraints.push(Constraint::Min(0)); // body (fills remainder)
    if show_debug {
        constraints.push(Constraint::Length(3)); // debug (auto-collapses)
    }
    constraints.push(Constraint::Length(1)); // footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], app);
    idx += 1;
    if search_expanded {
        search_bar(f, chunks[idx], app);
        idx += 1;
    }
    body(f, chunks[idx], app);
    idx += 1;
    if show_debug {
        debug_panel(f, chunks[idx], app);
        idx += 1;
    }
    footer(f, chunks[idx], app);

    // Overlays render last
    if app.toast_message().is_some() {
        draw_toast_modal(f, app);
    }
}

// ===============================
// Header / Search
// ===============================
fn header(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();
    let titles = ["Catalog", "Favorites"];
    // The detail screen keeps its originating tab highlighted.
    let selected = match app.screen() {
        Screen::Catalog => 0,
        Screen::Favorites => 1,
        Screen::Detail => match app.return_screen() {
            Screen::Favorites => 1,
            _ => 0,
        },
    };

    // Build tab bar with box-drawing borders
    let mut spans = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        if i == 0 {
            spans.push(Span::raw("┌─"));
        } else {
            spans.push(Span::raw("┬─"));
        }

        if i == selected {
            spans.push(Span::styled(
                *title,
                Style::default().fg(th.focus_border).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(*title));
        }

        spans.push(Span::raw("─"));
    }
    spans.push(Span::raw("┐"));

    // One-row strip: the tab bar draws its own box glyphs, no block around it.
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn search_bar(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();
    let focused = app.input_mode() == InputMode::Search;
    // While typing, show the draft; otherwise what was actually committed.
    let text = if focused {
        app.search_input()
    } else {
        app.query().search()
    };

    let border_color = if focused { th.focus_border } else { th.unfocused_border };
    let hint = "(Press / to search by name)";
    let shown = if text.is_empty() && !focused { hint } else { text };

    let paragraph = Paragraph::new(shown)
        .style(Style::default().fg(if focused { th.focus_border } else { th.text }))
        .block(
            Block::default()
                .title(" Search ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border_color)),
        );

    f.render_widget(paragraph, area);

    if focused && area.width > 2 {
        // Cursor inside the input box. Count characters, not bytes, so
        // multibyte input does not push the cursor past the text.
        let cols = text.chars().count().min((area.width.saturating_sub(2)) as usize);
        f.set_cursor_position((area.x + 1 + cols as u16, area.y + 1));
    }
}

// ===============================
// Body
// ===============================
fn body(f: &mut Frame, area: Rect, app: &App) {
    // Show warning if terminal is too small to be usable
    const MIN_WIDTH: u16 = 50;
    const MIN_HEIGHT: u16 = 12;

    let th = app.colors();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let warning_text = format!(
            "Terminal too small!\n\nMinimum size: {}×{}\nCurrent size: {}×{}\n\nPlease resize your terminal.",
            MIN_WIDTH, MIN_HEIGHT, area.width, area.height
        );

        let warning = Paragraph::new(warning_text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(th.toast_error).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(th.toast_error)),
            );

        let vertical_center = Layout::vertical([
            Constraint::Percentage(40),
            Constraint::Length(7),
            Constraint::Percentage(40),
        ])
        .split(area);

        let horizontal_center = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(vertical_center[1]);

        f.render_widget(warning, horizontal_center[1]);
        return;
    }

    match app.screen() {
        Screen::Catalog => render_catalog_pane(f, area, app),
        Screen::Detail => render_detail_pane(f, area, app),
        Screen::Favorites => render_favorites_pane(f, area, app),
    }
}

/// The body pane is "focused" whenever the search input is not.
fn pane_block<'a>(app: &App, th: &ColorScheme, title: String) -> Block<'a> {
    let focused = app.input_mode() == InputMode::Normal;
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(if focused { BorderType::Double } else { BorderType::Rounded })
        .border_style(
            Style::default()
                .fg(if focused { th.focus_border } else { th.unfocused_border })
                .add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() }),
        )
}

fn render_catalog_pane(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();

    match app.page_state() {
        PageState::Loading => {
            let block = pane_block(app, &th, " Characters ".to_string());
            let loading = Paragraph::new("Loading characters...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(th.text_dim))
                .block(block);
            f.render_widget(loading, area);
        }
        PageState::Failed(error) => {
            render_error_pane(f, area, app, &th, " Characters ", error);
        }
        PageState::Ready { page, stale } => {
            let rows = app.visible_rows();

            let mut title = format!(" Characters · {} match ", page.info.count);
            if *stale {
                title = format!("{}· refreshing... ", title);
            }
            let block = pane_block(app, &th, title);

            if rows.is_empty() {
                let empty = Paragraph::new("No characters match this search.")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(th.text_dim))
                    .block(block);
                f.render_widget(empty, area);
                return;
            }

            let items: Vec<ListItem> = rows
                .iter()
                .map(|c| character_row(c, app.store().is_favorite(c.id), &th))
                .collect();

            let mut st = ListState::default();
            st.select(Some(app.selected_row().min(rows.len() - 1)));

            let list = List::new(items)
                .highlight_style(
                    Style::default()
                        .bg(th.selection_bg)
                        .fg(th.selection_fg)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("")
                .block(block);

            f.render_stateful_widget(list, area, &mut st);
        }
    }
}

fn render_favorites_pane(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();
    let title = format!(" Favorites · {} saved ", app.store().len());

    match app.favorites_state() {
        FavoritesState::Loading => {
            let loading = Paragraph::new("Loading favorites...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(th.text_dim))
                .block(pane_block(app, &th, title));
            f.render_widget(loading, area);
        }
        FavoritesState::Failed(error) => {
            render_error_pane(f, area, app, &th, " Favorites ", error);
        }
        FavoritesState::Ready(list) => {
            if list.is_empty() {
                let empty =
                    Paragraph::new("No favorites yet.\n\nPress f on a character to save it.")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(th.text_dim))
                        .block(pane_block(app, &th, title));
                f.render_widget(empty, area);
                return;
            }

            let items: Vec<ListItem> =
                list.iter().map(|c| character_row(c, true, &th)).collect();

            let mut st = ListState::default();
            st.select(Some(app.favorites_selected().min(list.len() - 1)));

            let widget = List::new(items)
                .highlight_style(
                    Style::default()
                        .bg(th.selection_bg)
                        .fg(th.selection_fg)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("")
                .block(pane_block(app, &th, title));

            f.render_stateful_widget(widget, area, &mut st);
        }
    }
}

fn render_detail_pane(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();
    let title = " Character dossier · Esc back ".to_string();

    match app.detail_state() {
        DetailState::Loading => {
            let loading = Paragraph::new("Loading character...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(th.text_dim))
                .block(pane_block(app, &th, title));
            f.render_widget(loading, area);
        }
        DetailState::Failed(error) => {
            render_error_pane(f, area, app, &th, " Character dossier ", error);
        }
        DetailState::Ready(c) => {
            let fav = app.store().is_favorite(c.id);
            let lines = dossier_lines(c, fav, &th);
            let dossier = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((app.detail_scroll(), 0))
                .block(pane_block(app, &th, title));
            f.render_widget(dossier, area);
        }
    }
}

fn render_error_pane(
    f: &mut Frame,
    area: Rect,
    app: &App,
    th: &ColorScheme,
    title: &str,
    error: &CatalogError,
) {
    let text = format!("{error}\n\nPress r to retry.");
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(th.toast_error))
        .block(pane_block(app, th, title.to_string()));
    f.render_widget(widget, area);
}

fn character_row<'a>(c: &'a Character, favorite: bool, th: &ColorScheme) -> ListItem<'a> {
    let mut spans = Vec::with_capacity(6);

    if favorite {
        spans.push(Span::styled("★ ", Style::default().fg(th.badge)));
    } else {
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled(c.name.as_str(), Style::default().fg(th.text)));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("● {}", c.status.label()),
        Style::default().fg(status_color(th, c.status)),
    ));

    if !c.species.is_empty() {
        spans.push(Span::styled(
            format!(" · {}", c.species),
            Style::default().fg(th.text_dim),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn dossier_lines<'a>(c: &'a Character, favorite: bool, th: &ColorScheme) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(12);

    let mut name_spans = vec![Span::styled(
        c.name.as_str(),
        Style::default().fg(th.text).add_modifier(Modifier::BOLD),
    )];
    if favorite {
        name_spans.push(Span::styled("  ★ favorited", Style::default().fg(th.badge)));
    }
    lines.push(Line::from(name_spans));

    let mut vitals = vec![Span::styled(
        format!("● {}", c.status.label()),
        Style::default().fg(status_color(th, c.status)),
    )];
    if !c.species.is_empty() {
        vitals.push(Span::styled(
            format!(" · {}", c.species),
            Style::default().fg(th.text),
        ));
    }
    if !c.gender.is_empty() {
        vitals.push(Span::styled(
            format!(" · {}", c.gender),
            Style::default().fg(th.text),
        ));
    }
    lines.push(Line::from(vitals));

    if !c.kind.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Subtype: {}", c.kind),
            Style::default().fg(th.text_dim),
        )));
    }

    lines.push(Line::default());
    lines.push(field_line("Origin:   ", &c.origin.name, th));
    lines.push(field_line("Location: ", &c.location.name, th));
    if let Some(created) = c.created {
        lines.push(Line::from(vec![
            Span::styled("Added:    ", Style::default().fg(th.text_dim)),
            Span::styled(
                created.format("%Y-%m-%d").to_string(),
                Style::default().fg(th.text),
            ),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(
            format!("Episodes ({}): ", c.episode.len()),
            Style::default().fg(th.text_dim),
        ),
        Span::styled(
            format_episode_numbers(&c.episode_numbers()),
            Style::default().fg(th.text),
        ),
    ]));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Image: {}", c.image),
        Style::default().fg(th.text_dim),
    )));
    lines.push(Line::from(Span::styled(
        format!("Link:  citadex://v1/character/{}", c.id),
        Style::default().fg(th.text_dim),
    )));

    lines
}

fn field_line<'a>(label: &'static str, value: &'a str, th: &ColorScheme) -> Line<'a> {
    let shown = if value.is_empty() { "unknown" } else { value };
    Line::from(vec![
        Span::styled(label, Style::default().fg(th.text_dim)),
        Span::styled(shown, Style::default().fg(th.text)),
    ])
}

/// First eight episode numbers, then a count of the rest.
fn format_episode_numbers(numbers: &[u64]) -> String {
    const SHOWN: usize = 8;
    if numbers.is_empty() {
        return "none".to_string();
    }
    let head: Vec<String> = numbers.iter().take(SHOWN).map(|n| format!("E{n}")).collect();
    let mut out = head.join(", ");
    if numbers.len() > SHOWN {
        out.push_str(&format!(" +{} more", numbers.len() - SHOWN));
    }
    out
}

fn status_color(th: &ColorScheme, status: CharacterStatus) -> ratatui::style::Color {
    match status {
        CharacterStatus::Alive => th.status_alive,
        CharacterStatus::Dead => th.status_dead,
        CharacterStatus::Unknown => th.status_unknown,
    }
}

// ===============================
// Footer / Debug
// ===============================
fn footer(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();
    let mut spans: Vec<Span> = Vec::with_capacity(32);

    let key = |k: &'static str| Span::styled(k, Style::default().fg(th.focus_border));
    match app.screen() {
        Screen::Catalog => {
            spans.push(key("/"));
            spans.push(Span::raw(" search │ "));
            spans.push(key("s"));
            spans.push(Span::raw(" status │ "));
            spans.push(key("o"));
            spans.push(Span::raw(" sort │ "));
            spans.push(key("←/→"));
            spans.push(Span::raw(" page │ "));
            spans.push(key("Enter"));
            spans.push(Span::raw(" open │ "));
            spans.push(key("f"));
            spans.push(Span::raw(" fav │ "));
            spans.push(key("Tab"));
            spans.push(Span::raw(" favorites │ "));
        }
        Screen::Detail => {
            spans.push(key("Esc"));
            spans.push(Span::raw(" back │ "));
            spans.push(key("↑/↓"));
            spans.push(Span::raw(" scroll │ "));
            spans.push(key("f"));
            spans.push(Span::raw(" fav │ "));
        }
        Screen::Favorites => {
            spans.push(key("Enter"));
            spans.push(Span::raw(" open │ "));
            spans.push(key("f"));
            spans.push(Span::raw(" unfav │ "));
            spans.push(key("Tab"));
            spans.push(Span::raw(" catalog │ "));
        }
    }
    spans.push(key("t"));
    spans.push(Span::raw(" theme │ "));
    spans.push(key("y"));
    spans.push(Span::raw(" link │ "));
    spans.push(key("q"));
    spans.push(Span::raw(" quit"));

    if app.screen() == Screen::Catalog {
        if let PageState::Ready { page, .. } = app.page_state() {
            // Arrows follow the service's own next/prev envelope.
            let mut badge = format!("PAGE {} OF {}", app.query().page(), page.info.pages);
            if page.info.has_prev() {
                badge.insert_str(0, "‹ ");
            }
            if page.info.has_next() {
                badge.push_str(" ›");
            }
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(
                badge,
                Style::default().fg(th.badge).add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(param) = app.query().status().as_param() {
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(
                format!("[{param}]"),
                Style::default().fg(th.badge).add_modifier(Modifier::BOLD),
            ));
        }
    }
    if !app.store().is_empty() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("★ {}", app.store().len()),
            Style::default().fg(th.focus_border),
        ));
    }
    if app.debug_visible() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("[DEBUG]", Style::default().fg(th.debug_indicator)));
    }
    if let Some((toast, kind)) = app.toast_message() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            toast,
            Style::default().fg(toast_color(&th, kind)).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw(format!(" │ FPS {}", app.fps())));

    // One-row strip, same as the header.
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn debug_panel(f: &mut Frame, area: Rect, app: &App) {
    let th = app.colors();
    let log = app.debug_log();
    if area.height <= 1 {
        let rule = Block::default()
            .borders(Borders::TOP)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(th.text_dim));
        f.render_widget(rule, area);
        return;
    }

    let lines_to_show = (area.height.saturating_sub(2)) as usize; // inner height
    let start = log.len().saturating_sub(lines_to_show);
    let lines: Vec<Line> = log[start..]
        .iter()
        .map(|msg| Line::from(Span::raw(msg.as_str())))
        .collect();

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(th.text_dim))
        .block(
            Block::default()
                .title(" Debug ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(th.text_dim)),
        );

    f.render_widget(paragraph, area);
}

// ===============================
// Overlays
// ===============================
fn draw_toast_modal(f: &mut Frame, app: &App) {
    let th = app.colors();
    let Some((message, kind)) = app.toast_message() else {
        return;
    };
    let color = toast_color(&th, kind);
    let glyph = match kind {
        ToastKind::Info => "✓",
        ToastKind::Error => "✗",
    };

    // Small centered box (40% width, 3 lines height)
    let area = f.area();
    let width = (area.width * 4) / 10;
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let overlay = Rect { x, y, width, height };

    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    let text = Paragraph::new(format!("{glyph} {message}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(block);

    f.render_widget(text, overlay);
}

fn toast_color(th: &ColorScheme, kind: ToastKind) -> ratatui::style::Color {
    match kind {
        ToastKind::Info => th.toast_success,
        ToastKind::Error => th.toast_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoritesStore;
    use crate::theme::Theme;
    use crate::types::{AppEvent, CharacterPage, LocationRef, PageInfo};
    use ratatui::backend::TestBackend;
    use ratatui::layout::Position;
    use ratatui::Terminal;
    use tokio::sync::mpsc::unbounded_channel;

    fn test_app(dir: &std::path::Path) -> App {
        // The receiver is dropped on purpose: render tests never look at
        // scheduled requests, and App ignores send failures.
        let (fetch_tx, _) = unbounded_channel();
        let store = FavoritesStore::load(dir);
        App::new(30, vec![30], 400, dir.to_path_buf(), store, Theme::Dark, fetch_tx)
    }

    fn character(id: u64, name: &str) -> Character {
        Character {
            id,
            name: name.to_string(),
            status: CharacterStatus::Alive,
            species: "Human".to_string(),
            kind: String::new(),
            gender: "unknown".to_string(),
            origin: LocationRef::default(),
            location: LocationRef::default(),
            image: String::new(),
            episode: Vec::new(),
            created: None,
        }
    }

    fn page_with_info(next: Option<&str>, prev: Option<&str>) -> CharacterPage {
        CharacterPage {
            info: PageInfo {
                count: 100,
                pages: 5,
                next: next.map(str::to_string),
                prev: prev.map(str::to_string),
            },
            results: vec![character(1, "Rick Sanchez")],
        }
    }

    fn render(app: &App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(140, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_footer_paging_arrows_follow_the_service_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        // First page: the service offers a next URL but no previous one.
        app.on_event(AppEvent::PageLoaded {
            generation: 0,
            query: app.query().fetch_key(),
            page: page_with_info(Some("https://example.test/character?page=2"), None),
            fresh: true,
        });
        let text = screen_text(&render(&app));
        assert!(text.contains("PAGE 1 OF 5 ›"), "next arrow expected in: {text}");
        assert!(!text.contains("‹ PAGE"), "no previous page on page 1");

        // A middle page gets arrows on both sides.
        app.next_page();
        app.on_event(AppEvent::PageLoaded {
            generation: 1,
            query: app.query().fetch_key(),
            page: page_with_info(
                Some("https://example.test/character?page=3"),
                Some("https://example.test/character?page=1"),
            ),
            fresh: true,
        });
        let text = screen_text(&render(&app));
        assert!(text.contains("‹ PAGE 2 OF 5 ›"), "both arrows expected in: {text}");
    }

    #[test]
    fn test_search_cursor_advances_by_characters_not_bytes() {
        let dir = tempfile::tempdir().unwrap();

        let mut plain = test_app(dir.path());
        plain.open_search();
        for c in "morty".chars() {
            plain.search_push(c);
        }

        let mut accented = test_app(dir.path());
        accented.open_search();
        for c in "mörtÿ".chars() {
            accented.search_push(c);
        }

        let mut plain_terminal = render(&plain);
        let mut accented_terminal = render(&accented);
        let plain_cursor = plain_terminal.get_cursor_position().unwrap();
        let accented_cursor = accented_terminal.get_cursor_position().unwrap();

        assert_eq!(plain_cursor, Position::new(6, 2), "box border plus five columns");
        assert_eq!(accented_cursor, plain_cursor, "five characters, five columns");
    }

    #[test]
    fn test_toast_styles_follow_the_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.show_toast("Added #1 to favorites".to_string());
        let text = screen_text(&render(&app));
        assert!(text.contains("✓ Added #1 to favorites"));

        app.show_error_toast("Refresh failed: timed out".to_string());
        let terminal = render(&app);
        let text = screen_text(&terminal);
        assert!(text.contains("✗ Refresh failed: timed out"));
        assert!(!text.contains('✓'), "an error toast must not look like a confirmation");

        let buffer = terminal.backend().buffer();
        let glyph = buffer
            .content
            .iter()
            .find(|cell| cell.symbol() == "✗")
            .expect("the error glyph is on screen");
        assert_eq!(glyph.style().fg, Some(app.colors().toast_error));
    }
}
