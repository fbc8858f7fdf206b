//! Versioned deep link router for Citadex.
//!
//! Supports citadex://v1/* URLs that map onto the browser UI. A link carries
//! the whole browse state, so copying one from the footer and opening it on
//! another machine lands on the same screen.
//!
//! ## Supported Routes (v1)
//!
//! - `citadex://v1/characters?page=2&q=rick&status=alive&sort=desc` - Catalog
//!   screen with the given query state (all params optional)
//! - `citadex://v1/character/<id>` - Character detail screen
//! - `citadex://v1/favorites` - Favorites screen
//! - `citadex://v1/home` - Catalog screen with default query
//!
//! ## Robust Parsing
//!
//! The parser handles various URL formats robustly:
//! - Case-insensitive scheme: `CITADEX://`, `citadex://`, `Citadex://`
//! - Single-slash variants: `citadex:/v1/...`
//! - Multiple slashes: `citadex:////v1/...`
//! - Fragment stripping: `citadex://v1/favorites#frag`
//! - Path-only form: `/v1/characters?q=rick`
//!
//! Unknown query params are ignored; unparseable values fall back to their
//! defaults rather than rejecting the whole link.

use crate::query::{QueryState, SortOrder, StatusFilter};

/// Split a path from its query/fragment tail.
#[inline]
fn split_query_frag(s: &str) -> (&str, Option<&str>) {
    let (path_and_query, _) = match s.find('#') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    match path_and_query.find('?') {
        Some(i) => (&path_and_query[..i], Some(&path_and_query[i + 1..])),
        None => (path_and_query, None),
    }
}

/// Extract path after the citadex:// scheme (case-insensitive, handles variants)
#[inline]
fn after_scheme(raw: &str) -> Option<&str> {
    // Accept citadex://, CITADEX://, citadex:/, citadex:////...
    let s = raw.trim();
    if let Some(pos) = s.find("://") {
        if s[..pos].eq_ignore_ascii_case("citadex") {
            let mut rest = &s[pos + 3..];
            while rest.starts_with('/') {
                rest = &rest[1..];
            }
            return Some(rest);
        }
    } else if let Some(rest) = s.strip_prefix("citadex:") {
        let mut r = rest;
        while r.starts_with('/') {
            r = &r[1..];
        }
        return Some(r);
    }
    None
}

/// Decode one query-param value. Form-encoding rules: `+` is a space,
/// `%xx` sequences are percent-decoded, garbage passes through untouched.
fn decode_param(raw: &str) -> String {
    let plus_as_space = raw.replace('+', " ");
    match urlencoding::decode(&plus_as_space) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_as_space,
    }
}

/// Build a QueryState from a raw query string. Unknown keys are ignored and
/// malformed values keep their defaults.
fn parse_query_params(raw: Option<&str>) -> QueryState {
    let mut page = 1u32;
    let mut search = String::new();
    let mut status = StatusFilter::Any;
    let mut sort = SortOrder::NameAsc;

    if let Some(raw) = raw {
        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k, decode_param(v)),
                None => (pair, String::new()),
            };
            match key {
                "page" => {
                    if let Ok(p) = value.parse::<u32>() {
                        page = p.max(1);
                    }
                }
                "q" => search = value,
                "status" => {
                    if let Ok(s) = value.parse::<StatusFilter>() {
                        status = s;
                    }
                }
                "sort" => {
                    if let Ok(s) = value.parse::<SortOrder>() {
                        sort = s;
                    }
                }
                _ => {} // Unknown param
            }
        }
    }

    QueryState::new(page, search, status, sort)
}

/// Render a QueryState as a query string, defaults omitted. Empty state
/// yields an empty string (no `?`).
fn format_query_params(query: &QueryState) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if query.page() > 1 {
        parts.push(format!("page={}", query.page()));
    }
    if !query.search().is_empty() {
        parts.push(format!("q={}", urlencoding::encode(query.search())));
    }
    if query.status() != StatusFilter::Any {
        parts.push(format!("status={}", query.status()));
    }
    if query.sort() != SortOrder::NameAsc {
        parts.push(format!("sort={}", query.sort()));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

/// V1 route variants
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteV1 {
    /// Catalog browse state: `citadex://v1/characters?page=&q=&status=&sort=`
    Characters { query: QueryState },
    /// Character detail: `citadex://v1/character/<id>`
    Character { id: u64 },
    /// Favorites screen: `citadex://v1/favorites`
    Favorites,
    /// Home (default catalog): `citadex://v1/home`
    Home,
}

/// Versioned route container
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Version 1 routes
    V1(RouteV1),
}

/// Parse a route from various URL formats
///
/// Accepts:
/// - `citadex://v1/characters[?page=..&q=..&status=..&sort=..]`
/// - `citadex://v1/character/<id>`
/// - `citadex://v1/favorites`
/// - `citadex://v1/home` or `citadex://v1/` or `citadex://v1`
/// - `#/v1/...` (hash format)
/// - `/v1/...` (path only)
///
/// Returns `None` for invalid URLs or unsupported versions.
pub fn parse(raw: &str) -> Option<Route> {
    if raw.is_empty() {
        return Some(Route::V1(RouteV1::Home));
    }

    let s = raw.trim();

    // Extract path component from various formats
    let rest = if let Some(rest) = after_scheme(s) {
        rest
    } else if let Some(rest) = s.strip_prefix("#/") {
        rest
    } else if let Some(rest) = s.strip_prefix('/') {
        rest
    } else {
        s
    };

    let (path, raw_query) = split_query_frag(rest);

    // Parse version and route: "v1/characters", "v1/character/42" etc.
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let version = segments.next()?.to_ascii_lowercase();
    if version != "v1" {
        return None; // Unsupported version
    }

    let screen = segments.next().unwrap_or("").to_ascii_lowercase();
    match screen.as_str() {
        "" | "home" => Some(Route::V1(RouteV1::Home)),
        "characters" => Some(Route::V1(RouteV1::Characters {
            query: parse_query_params(raw_query),
        })),
        "character" => {
            let id = segments.next()?.parse::<u64>().ok()?;
            Some(Route::V1(RouteV1::Character { id }))
        }
        "favorites" => Some(Route::V1(RouteV1::Favorites)),
        _ => None, // Unknown route
    }
}

/// Render a route back into the canonical citadex:// form. `parse(&format(r))`
/// always returns the same route.
pub fn format(route: &Route) -> String {
    match route {
        Route::V1(RouteV1::Home) => "citadex://v1/home".to_string(),
        Route::V1(RouteV1::Favorites) => "citadex://v1/favorites".to_string(),
        Route::V1(RouteV1::Character { id }) => format!("citadex://v1/character/{id}"),
        Route::V1(RouteV1::Characters { query }) => {
            format!("citadex://v1/characters{}", format_query_params(query))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_characters_with_full_query() {
        let route = parse("citadex://v1/characters?page=2&q=rick&status=alive&sort=desc").unwrap();
        let Route::V1(RouteV1::Characters { query }) = route else {
            panic!("Expected Characters route");
        };
        assert_eq!(query.page(), 2);
        assert_eq!(query.search(), "rick");
        assert_eq!(query.status(), StatusFilter::Alive);
        assert_eq!(query.sort(), SortOrder::NameDesc);
    }

    #[test]
    fn test_parse_characters_defaults() {
        let route = parse("citadex://v1/characters").unwrap();
        assert_eq!(
            route,
            Route::V1(RouteV1::Characters {
                query: QueryState::default()
            })
        );

        let route = parse("/v1/characters").unwrap();
        assert_eq!(
            route,
            Route::V1(RouteV1::Characters {
                query: QueryState::default()
            })
        );
    }

    #[test]
    fn test_parse_character_detail() {
        let route = parse("citadex://v1/character/42").unwrap();
        assert_eq!(route, Route::V1(RouteV1::Character { id: 42 }));

        let route = parse("#/v1/character/7").unwrap();
        assert_eq!(route, Route::V1(RouteV1::Character { id: 7 }));
    }

    #[test]
    fn test_parse_favorites() {
        assert_eq!(
            parse("citadex://v1/favorites").unwrap(),
            Route::V1(RouteV1::Favorites)
        );
        assert_eq!(parse("/v1/favorites").unwrap(), Route::V1(RouteV1::Favorites));
    }

    #[test]
    fn test_parse_home() {
        assert_eq!(parse("citadex://v1/home").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("citadex://v1/").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("citadex://v1").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("#/v1/home").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("").unwrap(), Route::V1(RouteV1::Home));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("citadex://v2/characters").is_none()); // Wrong version
        assert!(parse("citadex://v1/character/").is_none()); // Missing id
        assert!(parse("citadex://v1/character/rick").is_none()); // Non-numeric id
        assert!(parse("citadex://v1/episodes").is_none()); // Unknown route
        assert!(parse("nearx://v1/characters").is_none()); // Foreign scheme
    }

    #[test]
    fn test_parse_case_insensitive_scheme() {
        let r1 = parse("CITADEX://v1/character/9").unwrap();
        assert_eq!(r1, Route::V1(RouteV1::Character { id: 9 }));

        let r2 = parse("Citadex://v1/favorites").unwrap();
        assert_eq!(r2, Route::V1(RouteV1::Favorites));
    }

    #[test]
    fn test_parse_slash_variants() {
        // Single slash after colon
        let r = parse("citadex:/v1/character/3").unwrap();
        assert_eq!(r, Route::V1(RouteV1::Character { id: 3 }));

        // Multiple slashes (sometimes happens with URL builders)
        let r = parse("citadex:////v1/favorites").unwrap();
        assert_eq!(r, Route::V1(RouteV1::Favorites));
    }

    #[test]
    fn test_parse_fragment_stripped() {
        let r = parse("citadex://v1/character/42#frag").unwrap();
        assert_eq!(r, Route::V1(RouteV1::Character { id: 42 }));

        let route = parse("citadex://v1/characters?q=rick#frag").unwrap();
        let Route::V1(RouteV1::Characters { query }) = route else {
            panic!("Expected Characters route");
        };
        assert_eq!(query.search(), "rick");
    }

    #[test]
    fn test_query_param_encoding() {
        // %20 and + both decode to a space; a literal plus is %2B
        let route = parse("citadex://v1/characters?q=rick%20sanchez").unwrap();
        let Route::V1(RouteV1::Characters { query }) = route else {
            panic!("Expected Characters route");
        };
        assert_eq!(query.search(), "rick sanchez");

        let route = parse("citadex://v1/characters?q=rick+sanchez").unwrap();
        let Route::V1(RouteV1::Characters { query }) = route else {
            panic!("Expected Characters route");
        };
        assert_eq!(query.search(), "rick sanchez");
    }

    #[test]
    fn test_bad_param_values_fall_back_to_defaults() {
        let route = parse("citadex://v1/characters?page=zero&status=zombie&sort=up&utm=1").unwrap();
        assert_eq!(
            route,
            Route::V1(RouteV1::Characters {
                query: QueryState::default()
            })
        );

        // page=0 clamps rather than rejects
        let route = parse("citadex://v1/characters?page=0").unwrap();
        let Route::V1(RouteV1::Characters { query }) = route else {
            panic!("Expected Characters route");
        };
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_format_round_trips() {
        let routes = [
            Route::V1(RouteV1::Home),
            Route::V1(RouteV1::Favorites),
            Route::V1(RouteV1::Character { id: 42 }),
            Route::V1(RouteV1::Characters {
                query: QueryState::default(),
            }),
            Route::V1(RouteV1::Characters {
                query: QueryState::new(3, "rick sanchez".into(), StatusFilter::Dead, SortOrder::NameDesc),
            }),
        ];
        for route in routes {
            let formatted = format(&route);
            assert_eq!(parse(&formatted).unwrap(), route, "round-trip of {formatted}");
        }
    }

    #[test]
    fn test_format_omits_defaults() {
        let link = format(&Route::V1(RouteV1::Characters {
            query: QueryState::default(),
        }));
        assert_eq!(link, "citadex://v1/characters");

        let link = format(&Route::V1(RouteV1::Characters {
            query: QueryState::new(2, String::new(), StatusFilter::Any, SortOrder::NameAsc),
        }));
        assert_eq!(link, "citadex://v1/characters?page=2");
    }
}
