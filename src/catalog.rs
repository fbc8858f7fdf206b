//! Client for the remote character catalog (rickandmortyapi.com compatible).
//!
//! Three endpoints, all read-only:
//! - `GET /character?page=N[&name=..][&status=..]` - paginated, filtered list
//! - `GET /character/{id}` - single lookup
//! - `GET /character/{id1,id2,...}` - batch lookup
//!
//! ## Service quirks this module normalizes
//!
//! - List responses wrap rows in a `results` array next to an `info` envelope,
//!   but the batch endpoint returns a bare array - and a bare OBJECT when
//!   exactly one id was asked for. `normalize_batch` folds all three shapes
//!   into `Vec<Character>`.
//! - A filtered list that matches nothing is a 404 with an error body, not an
//!   empty page. We map that one case to an empty page.
//!
//! Responses are cached by fetch key ((page, search, status) for lists, id
//! for characters) so a revisited query can paint instantly from the cache
//! while the refetch is in flight.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::net::send_with_backoff;
use crate::query::CatalogQuery;
use crate::types::{Character, CharacterPage};

/// Cached list pages kept before the oldest is dropped.
const MAX_CACHED_PAGES: usize = 32;
/// Cached character records kept before the oldest is dropped.
const MAX_CACHED_CHARACTERS: usize = 256;

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client")
    })
}

/// What can go wrong talking to the catalog. Carried inside app events, so
/// everything is owned data rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport failure or timeout; the service was never properly reached.
    #[error("network error: {0}")]
    Network(String),
    /// The record does not exist on the service.
    #[error("not found")]
    NotFound,
    /// The service answered with a non-success status.
    #[error("service error (http {status})")]
    Server { status: u16 },
    /// The service answered 200 with a body we could not make sense of.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CatalogError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            CatalogError::Server {
                status: status.as_u16(),
            }
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

/// Stateful catalog client: HTTP plumbing plus the response caches.
/// Owned by the fetch worker; the UI only ever sees the emitted events.
pub struct CatalogClient {
    base_url: String,
    timeout_ms: u64,
    max_retries: u8,

    page_cache: HashMap<CatalogQuery, CharacterPage>,
    page_cache_order: Vec<CatalogQuery>, // LRU tracking for eviction
    character_cache: HashMap<u64, Character>,
    character_cache_order: Vec<u64>,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout_ms: u64, max_retries: u8) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            max_retries,
            page_cache: HashMap::new(),
            page_cache_order: Vec::new(),
            character_cache: HashMap::new(),
            character_cache_order: Vec::new(),
        }
    }

    /// Build the list endpoint URL for a fetch key.
    fn list_url(&self, query: &CatalogQuery) -> String {
        let mut url = format!("{}/character?page={}", self.base_url, query.page);
        if !query.search.is_empty() {
            url.push_str("&name=");
            url.push_str(&urlencoding::encode(&query.search));
        }
        if let Some(status) = query.status.as_param() {
            url.push_str("&status=");
            url.push_str(status);
        }
        url
    }

    /// Fetch one list page. A 404 here is the service's "nothing matched",
    /// so it comes back as an empty page rather than an error.
    pub async fn list_characters(
        &mut self,
        query: &CatalogQuery,
    ) -> Result<CharacterPage, CatalogError> {
        let url = self.list_url(query);
        log::debug!("[catalog] GET {url}");

        let rb = http_client()
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms));
        let res = send_with_backoff(rb, "list", self.max_retries).await?;

        let status = res.status();
        if status.as_u16() == 404 {
            let page = CharacterPage::empty();
            self.cache_page(query.clone(), page.clone());
            return Ok(page);
        }
        if !status.is_success() {
            return Err(CatalogError::Server {
                status: status.as_u16(),
            });
        }

        let page: CharacterPage = res
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        log::debug!(
            "[catalog] page {} of {} ({} rows)",
            query.page,
            page.info.pages,
            page.results.len()
        );
        self.cache_page(query.clone(), page.clone());
        for c in &page.results {
            self.cache_character(c.clone());
        }
        Ok(page)
    }

    /// Fetch a single character by id. 404 maps to `NotFound`.
    pub async fn character(&mut self, id: u64) -> Result<Character, CatalogError> {
        let url = format!("{}/character/{id}", self.base_url);
        log::debug!("[catalog] GET {url}");

        let rb = http_client()
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms));
        let res = send_with_backoff(rb, "character", self.max_retries).await?;

        let status = res.status();
        if status.as_u16() == 404 {
            return Err(CatalogError::NotFound);
        }
        if !status.is_success() {
            return Err(CatalogError::Server {
                status: status.as_u16(),
            });
        }

        let character: Character = res
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        self.cache_character(character.clone());
        Ok(character)
    }

    /// Batch lookup by id. An empty id list resolves to an empty vec without
    /// touching the network. Ids the service no longer knows yield a 404,
    /// which comes back as an empty vec so a stale favorites file cannot
    /// wedge the favorites screen.
    pub async fn characters_by_ids(
        &mut self,
        ids: &[u64],
    ) -> Result<Vec<Character>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/character/{joined}", self.base_url);
        log::debug!("[catalog] GET {url} ({} ids)", ids.len());

        let rb = http_client()
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms));
        let res = send_with_backoff(rb, "batch", self.max_retries).await?;

        let status = res.status();
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(CatalogError::Server {
                status: status.as_u16(),
            });
        }

        let value: Value = res
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        let characters = normalize_batch(value)?;
        for c in &characters {
            self.cache_character(c.clone());
        }
        Ok(characters)
    }

    /// Cached copy of a list page, if any. Callers use this as placeholder
    /// content while the refetch for the same key is in flight.
    pub fn cached_page(&mut self, query: &CatalogQuery) -> Option<CharacterPage> {
        let page = self.page_cache.get(query).cloned();
        if page.is_some() {
            // LRU touch: move to the back of the eviction order
            self.page_cache_order.retain(|k| k != query);
            self.page_cache_order.push(query.clone());
        }
        page
    }

    pub fn cached_character(&self, id: u64) -> Option<Character> {
        self.character_cache.get(&id).cloned()
    }

    fn cache_page(&mut self, key: CatalogQuery, page: CharacterPage) {
        self.page_cache_order.retain(|k| k != &key);
        self.page_cache_order.push(key.clone());
        self.page_cache.insert(key, page);

        while self.page_cache_order.len() > MAX_CACHED_PAGES {
            let oldest = self.page_cache_order.remove(0);
            self.page_cache.remove(&oldest);
        }
    }

    fn cache_character(&mut self, character: Character) {
        let id = character.id;
        self.character_cache_order.retain(|&k| k != id);
        self.character_cache_order.push(id);
        self.character_cache.insert(id, character);

        while self.character_cache_order.len() > MAX_CACHED_CHARACTERS {
            let oldest = self.character_cache_order.remove(0);
            self.character_cache.remove(&oldest);
        }
    }
}

/// Fold the batch endpoint's three response shapes into one:
/// a bare array (the usual case), a `results`-wrapped array (list-shaped),
/// or a bare object when exactly one id was requested.
fn normalize_batch(value: Value) -> Result<Vec<Character>, CatalogError> {
    let rows = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(CatalogError::Decode(format!(
                    "results is not an array: {other}"
                )))
            }
            // Singleton request: the service hands back the object itself
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(CatalogError::Decode(format!(
                "expected array or object, got: {other}"
            )))
        }
    };

    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<Character>(row).map_err(|e| CatalogError::Decode(e.to_string()))
        })
        .collect()
}
