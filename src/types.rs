use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::query::CatalogQuery;

/// Life status as reported by the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    // The service spells this one lowercase; also the catch-all for values
    // added server-side after this client shipped.
    #[serde(rename = "unknown")]
    #[serde(other)]
    Unknown,
}

impl CharacterStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CharacterStatus::Alive => "ALIVE",
            CharacterStatus::Dead => "DEAD",
            CharacterStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Origin/location reference embedded in a character record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One character record from the remote catalog. Read-only on our side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub status: CharacterStatus,
    #[serde(default)]
    pub species: String,
    // `type` is a keyword; the service uses it for sub-species (often empty)
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: LocationRef,
    #[serde(default)]
    pub location: LocationRef,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl Character {
    /// Episode number parsed off the tail of an episode URL
    /// (`.../episode/28` -> 28). The service guarantees numeric ids.
    pub fn episode_numbers(&self) -> Vec<u64> {
        self.episode
            .iter()
            .filter_map(|url| url.rsplit('/').next())
            .filter_map(|seg| seg.parse::<u64>().ok())
            .collect()
    }
}

/// Pagination envelope from the list endpoint. `next`/`prev` are URLs or
/// null on the wire; we only care whether they exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }
}

/// One page of list results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterPage {
    #[serde(default)]
    pub info: PageInfo,
    #[serde(default)]
    pub results: Vec<Character>,
}

impl CharacterPage {
    /// What the service means when it 404s a filtered list: nothing matched.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// List page result. `fresh` is false when this is a cached snapshot
    /// replayed while the real fetch is still in flight.
    PageLoaded {
        generation: u64,
        query: CatalogQuery,
        page: CharacterPage,
        fresh: bool,
    },
    PageFailed {
        generation: u64,
        query: CatalogQuery,
        error: CatalogError,
    },
    DetailLoaded {
        id: u64,
        character: Box<Character>,
    },
    DetailFailed {
        id: u64,
        error: CatalogError,
    },
    FavoritesLoaded {
        generation: u64,
        characters: Vec<Character>,
    },
    FavoritesFailed {
        generation: u64,
        error: CatalogError,
    },
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserializes_service_spellings() {
        let alive: CharacterStatus = serde_json::from_str("\"Alive\"").unwrap();
        assert_eq!(alive, CharacterStatus::Alive);
        let dead: CharacterStatus = serde_json::from_str("\"Dead\"").unwrap();
        assert_eq!(dead, CharacterStatus::Dead);
        let unknown: CharacterStatus = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(unknown, CharacterStatus::Unknown);
        // Unrecognized values fold into Unknown instead of failing the page
        let other: CharacterStatus = serde_json::from_str("\"Presumed dead\"").unwrap();
        assert_eq!(other, CharacterStatus::Unknown);
    }

    #[test]
    fn test_character_tolerates_missing_optional_fields() {
        let c: Character =
            serde_json::from_str(r#"{"id": 7, "name": "Abradolf Lincler", "status": "unknown"}"#)
                .unwrap();
        assert_eq!(c.id, 7);
        assert!(c.species.is_empty());
        assert!(c.episode.is_empty());
        assert!(c.created.is_none());
    }

    #[test]
    fn test_episode_numbers_from_urls() {
        let c: Character = serde_json::from_str(
            r#"{
                "id": 1, "name": "Rick Sanchez", "status": "Alive",
                "episode": [
                    "https://rickandmortyapi.com/api/episode/1",
                    "https://rickandmortyapi.com/api/episode/28",
                    "not-a-url"
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(c.episode_numbers(), vec![1, 28]);
    }

    #[test]
    fn test_page_info_next_prev_from_nullable_urls() {
        let info: PageInfo = serde_json::from_str(
            r#"{"count": 826, "pages": 42, "next": "https://rickandmortyapi.com/api/character?page=2", "prev": null}"#,
        )
        .unwrap();
        assert!(info.has_next());
        assert!(!info.has_prev());
        assert_eq!(info.pages, 42);
    }
}
