//! Color theme system for Citadex.
//!
//! Two schemes, dark (default) and light, toggled at runtime with `t`.
//! The chosen theme is written to a small file in the state directory so it
//! survives restarts; a missing or unreadable file just means the default.

use anyhow::anyhow;
use ratatui::style::Color;
use std::fmt;
use std::path::Path;

/// File inside the state directory holding the persisted theme name.
const THEME_FILE: &str = "theme";

/// Available color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Dark scheme (default) - light text on dark background
    Dark,
    /// Light scheme - dark text on light background
    Light,
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(anyhow!("Unknown theme '{s}'. Available: dark, light")),
        }
    }
}

impl Theme {
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Get the color scheme for this theme
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Dark => ColorScheme::dark(),
            Theme::Light => ColorScheme::light(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// Read the persisted theme choice, if any. Corrupt or absent files are
/// not errors - the caller falls back to its default.
pub fn load_saved(state_dir: &Path) -> Option<Theme> {
    let raw = std::fs::read_to_string(state_dir.join(THEME_FILE)).ok()?;
    match raw.trim().parse::<Theme>() {
        Ok(theme) => Some(theme),
        Err(e) => {
            log::warn!("ignoring persisted theme: {e}");
            None
        }
    }
}

/// Persist the theme choice. Failures are logged and swallowed - a theme
/// that only lasts the session is not worth interrupting the user for.
pub fn persist(state_dir: &Path, theme: Theme) {
    if let Err(e) = std::fs::create_dir_all(state_dir) {
        log::warn!("theme not persisted (mkdir {}): {e}", state_dir.display());
        return;
    }
    if let Err(e) = std::fs::write(state_dir.join(THEME_FILE), theme.to_string()) {
        log::warn!("theme not persisted: {e}");
    }
}

/// Color scheme for a theme
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    /// Background color for normal content
    pub background: Color,
    /// Background for the focused list row's panel
    pub background_focused: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text color (for secondary info)
    pub text_dim: Color,
    /// Border color for focused elements
    pub focus_border: Color,
    /// Border color for unfocused elements
    pub unfocused_border: Color,
    /// Background for selected list items
    pub selection_bg: Color,
    /// Foreground for selected list items
    pub selection_fg: Color,
    /// Accent for badges and favorite markers
    pub badge: Color,
    /// Toast success message color
    pub toast_success: Color,
    /// Toast error message color
    pub toast_error: Color,
    /// Debug panel indicator color
    pub debug_indicator: Color,
    /// Status badge: alive
    pub status_alive: Color,
    /// Status badge: dead
    pub status_dead: Color,
    /// Status badge: unknown
    pub status_unknown: Color,
}

impl ColorScheme {
    /// Dark scheme (default)
    pub fn dark() -> Self {
        Self {
            background: Color::Black,
            background_focused: Color::Rgb(40, 40, 40),
            text: Color::White,
            text_dim: Color::Gray,
            focus_border: Color::Yellow,
            unfocused_border: Color::Gray,
            selection_bg: Color::Yellow,
            selection_fg: Color::Black,
            badge: Color::Cyan,
            toast_success: Color::Green,
            toast_error: Color::Red,
            debug_indicator: Color::Magenta,
            status_alive: Color::Green,
            status_dead: Color::Red,
            status_unknown: Color::Yellow,
        }
    }

    /// Light scheme
    pub fn light() -> Self {
        Self {
            background: Color::White,
            background_focused: Color::Rgb(230, 230, 230),
            text: Color::Black,
            text_dim: Color::DarkGray,
            focus_border: Color::Blue,
            unfocused_border: Color::DarkGray,
            selection_bg: Color::Blue,
            selection_fg: Color::White,
            badge: Color::Rgb(0, 110, 110),
            toast_success: Color::Rgb(0, 130, 0),
            toast_error: Color::Red,
            debug_indicator: Color::Magenta,
            status_alive: Color::Rgb(0, 130, 0),
            status_dead: Color::Red,
            status_unknown: Color::Rgb(160, 120, 0),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parsing() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
        assert!("solarized".parse::<Theme>().is_err());
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_display_matches_parser() {
        for theme in [Theme::Dark, Theme::Light] {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn test_all_themes_have_colors() {
        for theme in &[Theme::Dark, Theme::Light] {
            let colors = theme.colors();
            let _ = colors.background;
            let _ = colors.status_alive;
        }
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_saved(dir.path()), None);

        persist(dir.path(), Theme::Light);
        assert_eq!(load_saved(dir.path()), Some(Theme::Light));

        // Garbage on disk falls back to "nothing saved"
        std::fs::write(dir.path().join(THEME_FILE), "solarized").unwrap();
        assert_eq!(load_saved(dir.path()), None);
    }
}
