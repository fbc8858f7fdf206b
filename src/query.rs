//! Catalog query state: page / search text / status filter / sort order.
//!
//! The first three form the fetch key — they decide what the service is asked
//! for. Sort is presentation only: it reorders rows already in hand and never
//! appears in a request or cache key.

use anyhow::{anyhow, Result};
use std::fmt;

/// Status filter applied server-side via the `status` query param.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    Any,
    Alive,
    Dead,
    Unknown,
}

impl StatusFilter {
    /// Value for the `status` request param. `Any` sends no param at all.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            StatusFilter::Any => None,
            StatusFilter::Alive => Some("alive"),
            StatusFilter::Dead => Some("dead"),
            StatusFilter::Unknown => Some("unknown"),
        }
    }

    /// Cycle order for the filter key: any -> alive -> dead -> unknown -> any.
    pub fn next(&self) -> Self {
        match self {
            StatusFilter::Any => StatusFilter::Alive,
            StatusFilter::Alive => StatusFilter::Dead,
            StatusFilter::Dead => StatusFilter::Unknown,
            StatusFilter::Unknown => StatusFilter::Any,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "" | "any" | "all" => Ok(StatusFilter::Any),
            "alive" => Ok(StatusFilter::Alive),
            "dead" => Ok(StatusFilter::Dead),
            "unknown" => Ok(StatusFilter::Unknown),
            _ => Err(anyhow!(
                "Invalid status '{s}'. Valid options: any, alive, dead, unknown"
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::Any => write!(f, "any"),
            StatusFilter::Alive => write!(f, "alive"),
            StatusFilter::Dead => write!(f, "dead"),
            StatusFilter::Unknown => write!(f, "unknown"),
        }
    }
}

/// Client-side sort over the loaded page, by character name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::NameAsc => SortOrder::NameDesc,
            SortOrder::NameDesc => SortOrder::NameAsc,
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "name-asc" => Ok(SortOrder::NameAsc),
            "desc" | "name-desc" => Ok(SortOrder::NameDesc),
            _ => Err(anyhow!("Invalid sort '{s}'. Valid options: asc, desc")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::NameAsc => write!(f, "asc"),
            SortOrder::NameDesc => write!(f, "desc"),
        }
    }
}

/// The part of the query the service sees. Used as the list cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    pub page: u32,
    pub search: String,
    pub status: StatusFilter,
}

/// Full browse state: fetch key plus presentation-only sort.
///
/// Invariant: `page >= 1` always. Changing search text or status filter
/// resets the page to 1 — a page number under the old filter means nothing
/// under the new one. Changing sort touches nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: u32,
    search: String,
    status: StatusFilter,
    sort: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            status: StatusFilter::Any,
            sort: SortOrder::NameAsc,
        }
    }
}

impl QueryState {
    pub fn new(page: u32, search: String, status: StatusFilter, sort: SortOrder) -> Self {
        Self {
            page: page.max(1),
            search,
            status,
            sort,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }
    pub fn search(&self) -> &str {
        &self.search
    }
    pub fn status(&self) -> StatusFilter {
        self.status
    }
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Cache/fetch key: everything the request depends on, sort excluded.
    pub fn fetch_key(&self) -> CatalogQuery {
        CatalogQuery {
            page: self.page,
            search: self.search.clone(),
            status: self.status,
        }
    }

    /// Returns true if the fetch key changed (callers refetch on true).
    pub fn set_search(&mut self, search: String) -> bool {
        if self.search == search {
            return false;
        }
        self.search = search;
        self.page = 1;
        true
    }

    /// Returns true if the fetch key changed.
    pub fn set_status(&mut self, status: StatusFilter) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.page = 1;
        true
    }

    /// Sort never affects the fetch key, so there is nothing to refetch.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Returns true if the fetch key changed. Values below 1 clamp to 1.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Advance one page, capped by the service's reported page count.
    pub fn next_page(&mut self, total_pages: u32) -> bool {
        if total_pages > 0 && self.page >= total_pages {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_change_resets_page() {
        let mut q = QueryState::default();
        q.set_page(5);
        assert!(q.set_search("rick".into()));
        assert_eq!(q.page(), 1);
        assert_eq!(q.search(), "rick");
    }

    #[test]
    fn test_status_change_resets_page() {
        let mut q = QueryState::default();
        q.set_page(3);
        assert!(q.set_status(StatusFilter::Dead));
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn test_same_search_is_a_no_op() {
        let mut q = QueryState::default();
        q.set_search("morty".into());
        q.set_page(4);
        assert!(!q.set_search("morty".into()));
        assert_eq!(q.page(), 4);
    }

    #[test]
    fn test_sort_keeps_page_and_fetch_key() {
        let mut q = QueryState::default();
        q.set_search("rick".into());
        q.set_page(2);
        let key_before = q.fetch_key();
        q.set_sort(SortOrder::NameDesc);
        assert_eq!(q.page(), 2);
        assert_eq!(q.fetch_key(), key_before);
    }

    #[test]
    fn test_page_clamps_to_one() {
        let mut q = QueryState::default();
        assert!(!q.set_page(0));
        assert_eq!(q.page(), 1);
        assert!(!q.prev_page());
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn test_next_page_respects_total() {
        let mut q = QueryState::default();
        assert!(q.next_page(3));
        assert!(q.next_page(3));
        assert_eq!(q.page(), 3);
        assert!(!q.next_page(3));
        assert_eq!(q.page(), 3);
        // Unknown total (0) never blocks forward navigation
        assert!(q.next_page(0));
        assert_eq!(q.page(), 4);
    }

    #[test]
    fn test_status_param_values() {
        assert_eq!(StatusFilter::Any.as_param(), None);
        assert_eq!(StatusFilter::Alive.as_param(), Some("alive"));
        assert_eq!(StatusFilter::Dead.as_param(), Some("dead"));
        assert_eq!(StatusFilter::Unknown.as_param(), Some("unknown"));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("alive".parse::<StatusFilter>().unwrap(), StatusFilter::Alive);
        assert_eq!("DEAD".parse::<StatusFilter>().unwrap(), StatusFilter::Dead);
        assert_eq!("any".parse::<StatusFilter>().unwrap(), StatusFilter::Any);
        assert!("zombie".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_sort_parsing_and_toggle() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::NameAsc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::NameDesc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::NameAsc.toggled(), SortOrder::NameDesc);
        assert_eq!(SortOrder::NameAsc.toggled().toggled(), SortOrder::NameAsc);
    }
}
