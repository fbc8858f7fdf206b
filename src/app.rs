use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::CatalogError;
use crate::favorites::FavoritesStore;
use crate::fetch::FetchRequest;
use crate::query::{QueryState, SortOrder};
use crate::router::{self, Route, RouteV1};
use crate::theme::{self, Theme};
use crate::types::{AppEvent, Character, CharacterPage};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Catalog,
    Detail,
    Favorites,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Flavor of a toast notification. Errors render in the error style so a
/// failed refresh never looks like a confirmation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// Render state of the catalog list. Exactly one of these is true at any
/// moment; there is no fourth "partially loaded" state.
#[derive(Debug, Clone)]
pub enum PageState {
    Loading,
    Failed(CatalogError),
    /// `stale` marks a cached snapshot shown while the refetch runs.
    Ready { page: CharacterPage, stale: bool },
}

#[derive(Debug, Clone)]
pub enum DetailState {
    Loading,
    Failed(CatalogError),
    Ready(Box<Character>),
}

#[derive(Debug, Clone)]
pub enum FavoritesState {
    Loading,
    Failed(CatalogError),
    Ready(Vec<Character>),
}

pub struct App {
    quit: bool,
    screen: Screen,
    return_screen: Screen, // where Esc from the detail screen goes back to
    input_mode: InputMode,

    // Catalog list state
    query: QueryState,
    page_generation: u64,
    page_state: PageState,
    selected_row: usize,

    // Detail state
    detail_id: Option<u64>,
    detail_state: DetailState,
    detail_scroll: u16,

    // Favorites state
    store: FavoritesStore,
    favorites_generation: u64,
    favorites_state: FavoritesState,
    favorites_selected: usize,

    // Search input state. The deadline outlives the input mode: leaving
    // search with Esc still lets a pending commit fire.
    search_input: String,
    debounce: Duration,
    debounce_deadline: Option<Instant>,

    theme: Theme,
    state_dir: PathBuf,

    fps: u32,
    fps_choices: Vec<u32>,

    fetch_tx: UnboundedSender<FetchRequest>,

    // Debug log (for development)
    debug_log: Vec<String>,
    debug_visible: bool,

    // Toast notification state
    toast_message: Option<(String, ToastKind, Instant)>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fps: u32,
        fps_choices: Vec<u32>,
        debounce_ms: u64,
        state_dir: PathBuf,
        store: FavoritesStore,
        theme: Theme,
        fetch_tx: UnboundedSender<FetchRequest>,
    ) -> Self {
        Self {
            quit: false,
            screen: Screen::Catalog,
            return_screen: Screen::Catalog,
            input_mode: InputMode::Normal,
            query: QueryState::default(),
            page_generation: 0,
            page_state: PageState::Loading,
            selected_row: 0,
            detail_id: None,
            detail_state: DetailState::Loading,
            detail_scroll: 0,
            store,
            favorites_generation: 0,
            favorites_state: FavoritesState::Loading,
            favorites_selected: 0,
            search_input: String::new(),
            debounce: Duration::from_millis(debounce_ms),
            debounce_deadline: None,
            theme,
            state_dir,
            fps,
            fps_choices,
            fetch_tx,
            debug_log: Vec::new(),
            debug_visible: false,
            toast_message: None,
        }
    }

    // ----- getters -----
    pub fn quit_flag(&self) -> bool {
        self.quit
    }
    pub fn fps(&self) -> u32 {
        self.fps
    }
    pub fn screen(&self) -> Screen {
        self.screen
    }
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }
    pub fn query(&self) -> &QueryState {
        &self.query
    }
    pub fn page_state(&self) -> &PageState {
        &self.page_state
    }
    pub fn detail_state(&self) -> &DetailState {
        &self.detail_state
    }
    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }
    pub fn favorites_state(&self) -> &FavoritesState {
        &self.favorites_state
    }
    pub fn favorites_selected(&self) -> usize {
        self.favorites_selected
    }
    pub fn selected_row(&self) -> usize {
        self.selected_row
    }
    pub fn search_input(&self) -> &str {
        &self.search_input
    }
    pub fn theme(&self) -> Theme {
        self.theme
    }
    pub fn colors(&self) -> crate::theme::ColorScheme {
        self.theme.colors()
    }
    pub fn return_screen(&self) -> Screen {
        self.return_screen
    }
    pub fn store(&self) -> &FavoritesStore {
        &self.store
    }
    pub fn debug_log(&self) -> &[String] {
        &self.debug_log
    }
    pub fn debug_visible(&self) -> bool {
        self.debug_visible
    }

    /// Current page rows in display order. Sorting happens here, on the rows
    /// already in hand; it never triggers a request.
    pub fn visible_rows(&self) -> Vec<&Character> {
        let PageState::Ready { ref page, .. } = self.page_state else {
            return Vec::new();
        };
        sorted_rows(&page.results, self.query.sort())
    }

    pub fn selected_character(&self) -> Option<&Character> {
        self.visible_rows().get(self.selected_row).copied()
    }

    pub fn selected_favorite(&self) -> Option<&Character> {
        match self.favorites_state {
            FavoritesState::Ready(ref list) => list.get(self.favorites_selected),
            _ => None,
        }
    }

    /// Show a toast notification for 2 seconds
    pub fn show_toast(&mut self, msg: String) {
        self.toast_message = Some((msg, ToastKind::Info, Instant::now()));
    }

    /// Same lifetime as [`show_toast`](Self::show_toast), error styling.
    pub fn show_error_toast(&mut self, msg: String) {
        self.toast_message = Some((msg, ToastKind::Error, Instant::now()));
    }

    /// Get current toast message if still active (visible for 2 seconds)
    pub fn toast_message(&self) -> Option<(&str, ToastKind)> {
        const TOAST_DURATION: Duration = Duration::from_secs(2);
        self.toast_message.as_ref().and_then(|(msg, kind, time)| {
            if time.elapsed() < TOAST_DURATION {
                Some((msg.as_str(), *kind))
            } else {
                None
            }
        })
    }

    // ----- knobs -----
    pub fn cycle_fps(&mut self) {
        if self.fps_choices.is_empty() {
            return;
        }
        let mut idx = self.fps_choices.iter().position(|&v| v == self.fps).unwrap_or(0);
        idx = (idx + 1) % self.fps_choices.len();
        self.fps = self.fps_choices[idx];
        self.show_toast(format!("Render FPS: {}", self.fps));
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
    }

    pub fn log_debug(&mut self, msg: String) {
        const MAX_LOG_ENTRIES: usize = 50;
        log::debug!("{msg}");
        self.debug_log.push(msg);
        if self.debug_log.len() > MAX_LOG_ENTRIES {
            self.debug_log.remove(0);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        theme::persist(&self.state_dir, self.theme);
        self.show_toast(format!("Theme: {}", self.theme));
    }

    // ----- favorites -----
    /// Flip membership for `id`. The store writes through to disk before this
    /// returns; the new membership is what the toast reports.
    pub fn toggle_favorite(&mut self, id: u64) {
        let added = self.store.toggle(id).contains(&id);
        if added {
            self.show_toast(format!("Added #{id} to favorites"));
        } else {
            self.show_toast(format!("Removed #{id} from favorites"));
            // Keep an already-hydrated favorites list in sync without a refetch.
            if let FavoritesState::Ready(ref mut list) = self.favorites_state {
                list.retain(|c| c.id != id);
                self.favorites_selected =
                    self.favorites_selected.min(list.len().saturating_sub(1));
            }
        }
    }

    pub fn toggle_selected_favorite(&mut self) {
        let id = match self.screen {
            Screen::Catalog => self.selected_character().map(|c| c.id),
            Screen::Detail => self.detail_id,
            Screen::Favorites => self.selected_favorite().map(|c| c.id),
        };
        if let Some(id) = id {
            self.toggle_favorite(id);
        }
    }

    /// Hydrate the favorites screen. An empty set resolves on the spot;
    /// no request leaves the process.
    pub fn refresh_favorites(&mut self) {
        self.favorites_generation += 1;
        let ids = self.store.ids().to_vec();
        if ids.is_empty() {
            self.favorites_state = FavoritesState::Ready(Vec::new());
            self.favorites_selected = 0;
            return;
        }
        // Keep showing the previous list while the refresh runs.
        if !matches!(self.favorites_state, FavoritesState::Ready(_)) {
            self.favorites_state = FavoritesState::Loading;
        }
        let _ = self.fetch_tx.send(FetchRequest::Favorites {
            generation: self.favorites_generation,
            ids,
        });
    }

    // ----- navigation -----
    pub fn move_selection(&mut self, delta: isize) {
        match self.screen {
            Screen::Catalog => {
                let len = self.visible_rows().len();
                self.selected_row = step_index(self.selected_row, delta, len);
            }
            Screen::Favorites => {
                let len = match self.favorites_state {
                    FavoritesState::Ready(ref list) => list.len(),
                    _ => 0,
                };
                self.favorites_selected = step_index(self.favorites_selected, delta, len);
            }
            Screen::Detail => self.scroll_detail(delta),
        }
    }

    pub fn scroll_detail(&mut self, delta: isize) {
        if delta < 0 {
            self.detail_scroll = self.detail_scroll.saturating_sub(delta.unsigned_abs() as u16);
        } else {
            self.detail_scroll = self.detail_scroll.saturating_add(delta as u16);
        }
    }

    pub fn open_selected_detail(&mut self) {
        let id = match self.screen {
            Screen::Catalog => self.selected_character().map(|c| c.id),
            Screen::Favorites => self.selected_favorite().map(|c| c.id),
            Screen::Detail => None,
        };
        if let Some(id) = id {
            self.open_detail(id);
        }
    }

    pub fn open_detail(&mut self, id: u64) {
        if self.screen != Screen::Detail {
            self.return_screen = self.screen;
        }
        self.screen = Screen::Detail;
        self.detail_id = Some(id);
        self.detail_state = DetailState::Loading;
        self.detail_scroll = 0;
        let _ = self.fetch_tx.send(FetchRequest::Detail { id });
    }

    pub fn open_favorites(&mut self) {
        self.screen = Screen::Favorites;
        self.refresh_favorites();
    }

    /// Tab between the two list screens. From the detail screen it lands
    /// back on the catalog.
    pub fn switch_screen(&mut self) {
        match self.screen {
            Screen::Catalog => self.open_favorites(),
            Screen::Favorites | Screen::Detail => self.screen = Screen::Catalog,
        }
    }

    pub fn back(&mut self) {
        if self.screen == Screen::Detail {
            self.screen = self.return_screen;
        }
    }

    // ----- query mutations -----
    /// Schedule a fetch for the current query under a fresh generation.
    /// Responses tagged with an older generation are dropped on arrival.
    pub fn schedule_page_fetch(&mut self) {
        self.page_generation += 1;
        self.page_state = PageState::Loading;
        self.selected_row = 0;
        let _ = self.fetch_tx.send(FetchRequest::Page {
            generation: self.page_generation,
            query: self.query.fetch_key(),
        });
    }

    /// Re-request whatever the current screen failed to load.
    pub fn retry(&mut self) {
        match self.screen {
            Screen::Catalog => self.schedule_page_fetch(),
            Screen::Detail => {
                if let Some(id) = self.detail_id {
                    self.detail_state = DetailState::Loading;
                    let _ = self.fetch_tx.send(FetchRequest::Detail { id });
                }
            }
            Screen::Favorites => {
                self.favorites_state = FavoritesState::Loading;
                self.refresh_favorites();
            }
        }
    }

    pub fn cycle_status_filter(&mut self) {
        if self.screen != Screen::Catalog {
            return;
        }
        let next = self.query.status().next();
        if self.query.set_status(next) {
            self.show_toast(format!("Status filter: {next}"));
            self.schedule_page_fetch();
        }
    }

    /// Flip the sort order. Rows reorder in place; the fetch key is
    /// untouched, so nothing is requested. Selection follows the character.
    pub fn toggle_sort(&mut self) {
        if self.screen != Screen::Catalog {
            return;
        }
        let keep = self.selected_character().map(|c| c.id);
        let next = self.query.sort().toggled();
        self.query.set_sort(next);
        if let Some(id) = keep {
            if let Some(pos) = self.visible_rows().iter().position(|c| c.id == id) {
                self.selected_row = pos;
            }
        }
        self.show_toast(format!("Sort: name {next}"));
    }

    pub fn next_page(&mut self) {
        if self.screen != Screen::Catalog {
            return;
        }
        let total = match self.page_state {
            PageState::Ready { ref page, .. } => page.info.pages,
            _ => 0,
        };
        if self.query.next_page(total) {
            self.schedule_page_fetch();
        }
    }

    pub fn prev_page(&mut self) {
        if self.screen != Screen::Catalog {
            return;
        }
        if self.query.prev_page() {
            self.schedule_page_fetch();
        }
    }

    // ----- search input -----
    pub fn open_search(&mut self) {
        if self.screen != Screen::Catalog {
            return;
        }
        self.input_mode = InputMode::Search;
        self.search_input = self.query.search().to_string();
    }

    pub fn search_push(&mut self, c: char) {
        self.search_input.push(c);
        self.arm_debounce();
    }

    pub fn search_backspace(&mut self) {
        self.search_input.pop();
        self.arm_debounce();
    }

    /// Enter: commit immediately and leave search mode.
    pub fn search_submit(&mut self) {
        self.debounce_deadline = None;
        self.input_mode = InputMode::Normal;
        self.commit_search();
    }

    /// Esc: leave search mode. A pending debounce still fires, so the text
    /// typed so far is what gets searched.
    pub fn search_exit(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    fn arm_debounce(&mut self) {
        self.debounce_deadline = Some(Instant::now() + self.debounce);
    }

    /// Called once per loop tick. Commits the search draft when the debounce
    /// window has passed without another keystroke.
    pub fn maybe_commit_search(&mut self) -> bool {
        match self.debounce_deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.debounce_deadline = None;
                self.commit_search()
            }
            _ => false,
        }
    }

    fn commit_search(&mut self) -> bool {
        let text = self.search_input.clone();
        if self.query.set_search(text) {
            self.schedule_page_fetch();
            true
        } else {
            false
        }
    }

    // ----- deep links -----
    pub fn apply_route(&mut self, route: Route) {
        match route {
            Route::V1(RouteV1::Home) => {
                self.screen = Screen::Catalog;
                self.query = QueryState::default();
                self.search_input.clear();
                self.schedule_page_fetch();
            }
            Route::V1(RouteV1::Characters { query }) => {
                self.screen = Screen::Catalog;
                self.search_input = query.search().to_string();
                self.query = query;
                self.schedule_page_fetch();
            }
            Route::V1(RouteV1::Character { id }) => {
                // Esc from a deep-linked detail lands on a catalog that is
                // actually loading, not a blank one.
                self.screen = Screen::Catalog;
                self.schedule_page_fetch();
                self.open_detail(id);
            }
            Route::V1(RouteV1::Favorites) => {
                // Same for Tab: the catalog behind the favorites screen loads.
                self.schedule_page_fetch();
                self.open_favorites();
            }
        }
    }

    /// Canonical citadex:// link for what is on screen right now.
    pub fn current_deep_link(&self) -> String {
        let route = match self.screen {
            Screen::Catalog => Route::V1(RouteV1::Characters {
                query: self.query.clone(),
            }),
            Screen::Detail => match self.detail_id {
                Some(id) => Route::V1(RouteV1::Character { id }),
                None => Route::V1(RouteV1::Home),
            },
            Screen::Favorites => Route::V1(RouteV1::Favorites),
        };
        router::format(&route)
    }

    pub fn copy_current_link(&mut self) {
        let link = self.current_deep_link();
        if crate::clipboard::copy_to_clipboard(&link) {
            self.show_toast(format!("Copied {link}"));
        } else {
            self.show_error_toast(format!("Clipboard unavailable: {link}"));
        }
    }

    // ----- events -----
    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Quit => self.quit = true,
            AppEvent::PageLoaded {
                generation,
                query,
                page,
                fresh,
            } => {
                if generation != self.page_generation {
                    self.log_debug(format!(
                        "[FETCH] dropped stale page response gen={} (current {}) page={}",
                        generation, self.page_generation, query.page
                    ));
                    return;
                }
                self.selected_row = self.selected_row.min(page.results.len().saturating_sub(1));
                self.page_state = PageState::Ready { page, stale: !fresh };
            }
            AppEvent::PageFailed {
                generation,
                query,
                error,
            } => {
                if generation != self.page_generation {
                    self.log_debug(format!(
                        "[FETCH] dropped stale page failure gen={} (current {}) page={}",
                        generation, self.page_generation, query.page
                    ));
                    return;
                }
                match self.page_state {
                    // The cached snapshot stays up; the refresh failure is a toast.
                    PageState::Ready { .. } => {
                        self.log_debug(format!("[FETCH] refresh failed, keeping snapshot: {error}"));
                        self.show_error_toast(format!("Refresh failed: {error}"));
                    }
                    _ => self.page_state = PageState::Failed(error),
                }
            }
            AppEvent::DetailLoaded { id, character } => {
                if self.detail_id == Some(id) {
                    self.detail_state = DetailState::Ready(character);
                }
            }
            AppEvent::DetailFailed { id, error } => {
                if self.detail_id != Some(id) {
                    return;
                }
                match self.detail_state {
                    DetailState::Ready(_) => {
                        self.show_error_toast(format!("Refresh failed: {error}"));
                    }
                    _ => self.detail_state = DetailState::Failed(error),
                }
            }
            AppEvent::FavoritesLoaded {
                generation,
                mut characters,
            } => {
                if generation != self.favorites_generation {
                    self.log_debug(format!(
                        "[FETCH] dropped stale favorites response gen={} (current {})",
                        generation, self.favorites_generation
                    ));
                    return;
                }
                // Service returns id order; the screen shows toggle order.
                let order: std::collections::HashMap<u64, usize> = self
                    .store
                    .ids()
                    .iter()
                    .enumerate()
                    .map(|(i, &id)| (id, i))
                    .collect();
                characters.sort_by_key(|c| order.get(&c.id).copied().unwrap_or(usize::MAX));
                // Membership may have changed while the batch was in flight.
                characters.retain(|c| self.store.is_favorite(c.id));
                self.favorites_selected = self
                    .favorites_selected
                    .min(characters.len().saturating_sub(1));
                self.favorites_state = FavoritesState::Ready(characters);
            }
            AppEvent::FavoritesFailed { generation, error } => {
                if generation != self.favorites_generation {
                    return;
                }
                match self.favorites_state {
                    FavoritesState::Ready(_) => {
                        self.show_error_toast(format!("Refresh failed: {error}"));
                    }
                    _ => self.favorites_state = FavoritesState::Failed(error),
                }
            }
        }
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }
}

/// Sort rows by name, case-insensitive, id as the tiebreak so equal names
/// keep a stable order in both directions.
fn sorted_rows(results: &[Character], sort: SortOrder) -> Vec<&Character> {
    let mut rows: Vec<&Character> = results.iter().collect();
    rows.sort_by(|a, b| {
        let by_name = a.name.to_lowercase().cmp(&b.name.to_lowercase());
        match sort {
            SortOrder::NameAsc => by_name.then(a.id.cmp(&b.id)),
            SortOrder::NameDesc => by_name.reverse().then(a.id.cmp(&b.id)),
        }
    });
    rows
}

fn step_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len - 1;
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        (current + delta as usize).min(max)
    }
    .min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CharacterStatus, LocationRef};
    use tokio::sync::mpsc::unbounded_channel;

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

    #[test]
    fn test_sorted_rows_ascending_and_descending() {
        let rows = vec![
            character(2, "morty"),
            character(1, "Rick"),
            character(3, "Birdperson"),
        ];
        let asc: Vec<u64> = sorted_rows(&rows, SortOrder::NameAsc)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(asc, vec![3, 2, 1]);

        let desc: Vec<u64> = sorted_rows(&rows, SortOrder::NameDesc)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(desc, vec![1, 2, 3]);
    }

    #[test]
    fn test_sorted_rows_equal_names_stay_stable() {
        let rows = vec![character(9, "Rick"), character(4, "rick")];
        let asc: Vec<u64> = sorted_rows(&rows, SortOrder::NameAsc)
            .iter()
            .map(|c| c.id)
            .collect();
        let desc: Vec<u64> = sorted_rows(&rows, SortOrder::NameDesc)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(asc, vec![4, 9]);
        assert_eq!(desc, vec![4, 9]);
    }

    #[test]
    fn test_step_index_clamps_at_both_ends() {
        assert_eq!(step_index(0, -1, 5), 0);
        assert_eq!(step_index(4, 1, 5), 4);
        assert_eq!(step_index(2, 10, 5), 4);
        assert_eq!(step_index(2, -10, 5), 0);
        assert_eq!(step_index(3, 1, 0), 0);
    }

    #[test]
    fn test_toast_expires() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = unbounded_channel();
        let store = FavoritesStore::load(dir.path());
        let mut app = App::new(
            30,
            vec![30],
            400,
            dir.path().to_path_buf(),
            store,
            Theme::Dark,
            tx,
        );
        assert!(app.toast_message().is_none());
        app.show_toast("hello".to_string());
        assert_eq!(app.toast_message(), Some(("hello", ToastKind::Info)));
        app.show_error_toast("broken".to_string());
        assert_eq!(app.toast_message(), Some(("broken", ToastKind::Error)));
    }
}
