//! Persistent favorites store.
//!
//! A flat JSON array of character ids (`favorites.json` in the state
//! directory), insertion-ordered, mirrored in memory and written through on
//! every toggle. Persistence is atomic (write temp file, rename over the
//! original) so a crash mid-write never leaves a corrupt file behind.
//!
//! Storage trouble is deliberately non-fatal in both directions: a missing or
//! unreadable file loads as an empty set, and a failed write degrades the
//! store to session-only. Both are logged, neither reaches the UI as an
//! error.
//!
//! There is exactly one store per process, created in `main` and handed to
//! whatever needs it. Views keep themselves current through `subscribe`:
//! every mutation sends a full snapshot of the id list to each subscriber.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const FAVORITES_FILE: &str = "favorites.json";

pub struct FavoritesStore {
    path: PathBuf,
    ids: Vec<u64>,
    subscribers: Vec<UnboundedSender<Vec<u64>>>,
}

impl FavoritesStore {
    /// Load the persisted set, tolerating absence and corruption. This never
    /// fails: the worst case is starting from an empty set.
    pub fn load(state_dir: &Path) -> Self {
        let path = state_dir.join(FAVORITES_FILE);
        let ids = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<u64>>(&raw) {
                Ok(ids) => {
                    log::debug!("loaded {} favorites from {}", ids.len(), path.display());
                    dedup_preserving_order(ids)
                }
                Err(e) => {
                    log::warn!(
                        "favorites file {} unreadable, starting empty: {e}",
                        path.display()
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(), // first run
        };

        Self {
            path,
            ids,
            subscribers: Vec::new(),
        }
    }

    /// Flip membership for one id: drop it if present, append it otherwise.
    /// The new set is persisted and broadcast before this returns, so a crash
    /// right after the call cannot lose the change. Returns the new set.
    pub fn toggle(&mut self, id: u64) -> &[u64] {
        if self.ids.contains(&id) {
            self.ids.retain(|&existing| existing != id);
        } else {
            self.ids.push(id);
        }

        self.persist();
        self.notify();
        &self.ids
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Ids in insertion order (oldest favorite first).
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Register an observer. The current snapshot is delivered immediately,
    /// then one snapshot per mutation. Dropped receivers are pruned on the
    /// next broadcast.
    pub fn subscribe(&mut self) -> UnboundedReceiver<Vec<u64>> {
        let (tx, rx) = unbounded_channel();
        let _ = tx.send(self.ids.clone());
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self) {
        let snapshot = self.ids.clone();
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!(
                    "favorites not persisted (mkdir {}): {e}",
                    parent.display()
                );
                return;
            }
        }

        let json = match serde_json::to_string(&self.ids) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("favorites not persisted (serialize): {e}");
                return;
            }
        };

        // Write-to-temp then rename keeps the file whole across crashes
        let tmp_path = self.path.with_extension("tmp");
        if let Err(e) = std::fs::write(&tmp_path, json) {
            log::warn!("favorites not persisted (write): {e}");
            return;
        }
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            log::warn!("favorites not persisted (rename): {e}");
        }
    }
}

fn dedup_preserving_order(ids: Vec<u64>) -> Vec<u64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
