//! Citadex - Terminal character catalog browser
//!
//! This library provides the core functionality for Citadex, a terminal UI
//! for browsing the Rick and Morty character catalog: keyword search, status
//! filtering, client-side sorting, pagination, a persistent favorites list
//! and citadex:// deep links.
//!
//! The binary wires these pieces together: a fetch worker task owns the
//! [`catalog::CatalogClient`] and streams [`types::AppEvent`]s to the UI
//! loop, which folds them into [`app::App`] and renders via [`ui`].

// Core modules
pub mod config;
pub mod query;
pub mod types;

// Catalog service client and retry/backoff helpers
pub mod catalog;
pub mod net;

// Background fetch worker
pub mod fetch;

// Persistent state (favorites set, theme choice)
pub mod favorites;
pub mod theme;

pub mod app;
pub mod ui;

// Deep link router
pub mod router;

// Clipboard (best-effort, for copying deep links)
pub mod clipboard;

// Re-export commonly used types
pub use app::{App, InputMode, Screen, ToastKind};
pub use catalog::{CatalogClient, CatalogError};
pub use config::Config;
pub use favorites::FavoritesStore;
pub use query::{CatalogQuery, QueryState, SortOrder, StatusFilter};
pub use types::{AppEvent, Character, CharacterPage};
