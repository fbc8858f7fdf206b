//! Background fetch worker.
//!
//! One task owns the catalog client and services requests from the UI loop.
//! Requests fall into three lanes, one per view slot: the catalog page, the
//! detail lookup, and the favorites batch. Each lane runs independently; a
//! newer request supersedes only the in-flight or waiting request in its own
//! lane, while the other lanes keep their turn. A favorites request arriving
//! mid page fetch parks behind it instead of cancelling it, so every lane
//! that asked for data eventually gets an answer. Together with the
//! generation tags the app checks on arrival, a superseded response can
//! never overwrite fresher state.
//!
//! For keys already in the cache the worker replays the cached value
//! immediately (`fresh: false`) so the screen paints while the real fetch
//! runs.

use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::catalog::CatalogClient;
use crate::query::CatalogQuery;
use crate::types::AppEvent;

#[derive(Debug, Clone)]
pub enum FetchRequest {
    /// List page for the catalog screen.
    Page { generation: u64, query: CatalogQuery },
    /// Single character for the detail screen.
    Detail { id: u64 },
    /// Batch lookup for the favorites screen.
    Favorites { generation: u64, ids: Vec<u64> },
}

/// The view slot a request belongs to. Supersession is scoped to a lane:
/// a request can only ever replace an older request in the same lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Page,
    Detail,
    Favorites,
}

impl FetchRequest {
    fn lane(&self) -> Lane {
        match self {
            FetchRequest::Page { .. } => Lane::Page,
            FetchRequest::Detail { .. } => Lane::Detail,
            FetchRequest::Favorites { .. } => Lane::Favorites,
        }
    }
}

/// How a lane fetch ended: with a result, or dropped because a newer
/// request landed in the same lane.
enum LaneOutcome<T> {
    Done(T),
    Superseded(FetchRequest),
}

pub async fn run_fetch_worker(
    mut client: CatalogClient,
    mut req_rx: UnboundedReceiver<FetchRequest>,
    event_tx: UnboundedSender<AppEvent>,
) -> Result<()> {
    // Requests waiting their turn, in arrival order. At most one per lane.
    let mut parked: Vec<FetchRequest> = Vec::new();

    loop {
        let next = if parked.is_empty() {
            match req_rx.recv().await {
                Some(req) => req,
                None => break,
            }
        } else {
            parked.remove(0)
        };

        // Fold in any backlog before starting work: a same-lane arrival
        // replaces the request we were about to run, the rest park.
        let mut req = next;
        while let Ok(newer) = req_rx.try_recv() {
            if newer.lane() == req.lane() {
                req = newer;
            } else {
                park(&mut parked, newer);
            }
        }

        let mut current = Some(req);
        while let Some(req) = current.take() {
            current = service(&mut client, &mut req_rx, &event_tx, &mut parked, req).await;
        }
    }

    log::debug!("[fetch] request channel closed, worker shutting down");
    Ok(())
}

/// Park a request behind the in-flight one, replacing any older request
/// already waiting in the same lane.
fn park(parked: &mut Vec<FetchRequest>, req: FetchRequest) {
    match parked.iter_mut().find(|waiting| waiting.lane() == req.lane()) {
        Some(waiting) => *waiting = req,
        None => parked.push(req),
    }
}

/// Drive one fetch to completion while watching the request channel.
/// An arrival in the same lane aborts the fetch and is handed back; other
/// lanes are parked without interrupting it.
async fn drive_lane<T>(
    req_rx: &mut UnboundedReceiver<FetchRequest>,
    parked: &mut Vec<FetchRequest>,
    lane: Lane,
    fetch: impl Future<Output = T>,
) -> LaneOutcome<T> {
    tokio::pin!(fetch);
    let mut channel_open = true;
    loop {
        tokio::select! {
            biased;
            newer = req_rx.recv(), if channel_open => match newer {
                Some(newer) if newer.lane() == lane => return LaneOutcome::Superseded(newer),
                Some(newer) => park(parked, newer),
                // Closed channel: finish the in-flight fetch, then let the
                // caller drain whatever is still parked.
                None => channel_open = false,
            },
            result = &mut fetch => return LaneOutcome::Done(result),
        }
    }
}

/// Service one request. Returns the same-lane request that superseded it
/// mid-flight, if any, so the caller can move straight on to it.
async fn service(
    client: &mut CatalogClient,
    req_rx: &mut UnboundedReceiver<FetchRequest>,
    event_tx: &UnboundedSender<AppEvent>,
    parked: &mut Vec<FetchRequest>,
    req: FetchRequest,
) -> Option<FetchRequest> {
    match req {
        FetchRequest::Page { generation, query } => {
            if let Some(page) = client.cached_page(&query) {
                let _ = event_tx.send(AppEvent::PageLoaded {
                    generation,
                    query: query.clone(),
                    page,
                    fresh: false,
                });
            }

            let outcome =
                drive_lane(req_rx, parked, Lane::Page, client.list_characters(&query)).await;
            match outcome {
                LaneOutcome::Superseded(newer) => Some(newer),
                LaneOutcome::Done(result) => {
                    let ev = match result {
                        Ok(page) => AppEvent::PageLoaded {
                            generation,
                            query,
                            page,
                            fresh: true,
                        },
                        Err(error) => AppEvent::PageFailed {
                            generation,
                            query,
                            error,
                        },
                    };
                    let _ = event_tx.send(ev);
                    None
                }
            }
        }
        FetchRequest::Detail { id } => {
            if let Some(character) = client.cached_character(id) {
                let _ = event_tx.send(AppEvent::DetailLoaded {
                    id,
                    character: Box::new(character),
                });
            }

            let outcome = drive_lane(req_rx, parked, Lane::Detail, client.character(id)).await;
            match outcome {
                LaneOutcome::Superseded(newer) => Some(newer),
                LaneOutcome::Done(result) => {
                    let ev = match result {
                        Ok(character) => AppEvent::DetailLoaded {
                            id,
                            character: Box::new(character),
                        },
                        Err(error) => AppEvent::DetailFailed { id, error },
                    };
                    let _ = event_tx.send(ev);
                    None
                }
            }
        }
        FetchRequest::Favorites { generation, ids } => {
            let outcome =
                drive_lane(req_rx, parked, Lane::Favorites, client.characters_by_ids(&ids)).await;
            match outcome {
                LaneOutcome::Superseded(newer) => Some(newer),
                LaneOutcome::Done(result) => {
                    let ev = match result {
                        Ok(characters) => AppEvent::FavoritesLoaded {
                            generation,
                            characters,
                        },
                        Err(error) => AppEvent::FavoritesFailed { generation, error },
                    };
                    let _ = event_tx.send(ev);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    /// Nothing listens on port 1, so every fetch fails fast with a transport
    /// error and zero retries. Good enough to watch the lane scheduling.
    fn unroutable_client() -> CatalogClient {
        CatalogClient::new("http://127.0.0.1:1", 200, 0)
    }

    fn page_request(generation: u64) -> FetchRequest {
        FetchRequest::Page {
            generation,
            query: CatalogQuery::default(),
        }
    }

    #[test]
    fn test_lane_of_each_request_kind() {
        assert_eq!(page_request(1).lane(), Lane::Page);
        assert_eq!(FetchRequest::Detail { id: 7 }.lane(), Lane::Detail);
        let batch = FetchRequest::Favorites {
            generation: 1,
            ids: vec![7],
        };
        assert_eq!(batch.lane(), Lane::Favorites);
    }

    #[test]
    fn test_park_replaces_only_the_same_lane() {
        let mut parked = Vec::new();
        park(&mut parked, page_request(1));
        park(
            &mut parked,
            FetchRequest::Favorites {
                generation: 1,
                ids: vec![5],
            },
        );
        park(&mut parked, page_request(2));

        assert_eq!(parked.len(), 2, "one waiting request per lane");
        match &parked[0] {
            FetchRequest::Page { generation, .. } => {
                assert_eq!(*generation, 2, "the newer page request takes the slot")
            }
            other => panic!("expected the page lane to keep its place, got {other:?}"),
        }
        assert!(matches!(parked[1], FetchRequest::Favorites { .. }));
    }

    #[tokio::test]
    async fn test_requests_in_other_lanes_all_resolve() {
        let (req_tx, req_rx) = unbounded_channel();
        let (event_tx, mut event_rx) = unbounded_channel();

        // Both queued before the worker starts: the favorites request must
        // not cancel the page fetch ahead of it.
        req_tx.send(page_request(1)).unwrap();
        req_tx
            .send(FetchRequest::Favorites {
                generation: 1,
                ids: vec![5],
            })
            .unwrap();
        drop(req_tx);

        run_fetch_worker(unroutable_client(), req_rx, event_tx)
            .await
            .unwrap();

        assert!(
            matches!(event_rx.try_recv(), Ok(AppEvent::PageFailed { generation: 1, .. })),
            "the page lane still answers"
        );
        assert!(
            matches!(
                event_rx.try_recv(),
                Ok(AppEvent::FavoritesFailed { generation: 1, .. })
            ),
            "the favorites lane runs right after"
        );
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_same_lane_backlog_collapses_to_newest() {
        let (req_tx, req_rx) = unbounded_channel();
        let (event_tx, mut event_rx) = unbounded_channel();

        req_tx.send(page_request(1)).unwrap();
        req_tx.send(page_request(2)).unwrap();
        req_tx.send(FetchRequest::Detail { id: 7 }).unwrap();
        drop(req_tx);

        run_fetch_worker(unroutable_client(), req_rx, event_tx)
            .await
            .unwrap();

        assert!(
            matches!(event_rx.try_recv(), Ok(AppEvent::PageFailed { generation: 2, .. })),
            "only the newest page request runs"
        );
        assert!(
            matches!(event_rx.try_recv(), Ok(AppEvent::DetailFailed { id: 7, .. })),
            "the detail lane is untouched by the page collapse"
        );
        assert!(event_rx.try_recv().is_err());
    }
}
