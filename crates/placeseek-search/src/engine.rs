//! Query engine and indexer shared by every backend
//!
//! `FullTextEngine` wraps a `PlacesGateway` and provides:
//! - the write path: both table writes under a per-instance exclusive lock
//! - the read path: one match query, then one hydration task per candidate,
//!   gathered back into match order
//!
//! ```text
//! query_string("golden")
//!   │
//!   ├─ match_ids ───────────────► [101, 7, 42]
//!   │
//!   ├─ scatter ── task 0: retrieve 101 ─┐
//!   │          ── task 1: retrieve 7   ─┼─► (position, result) channel
//!   │          ── task 2: retrieve 42  ─┘
//!   │
//!   └─ gather ─ slot[position] = place; first error wins
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use placeseek_core::{Feature, Filter, PlaceResult, PlaceResults};
use placeseek_store::PlacesGateway;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::database::FullTextDatabase;
use crate::error::{Result, SearchError};

/// Alt label of the primary record for an id
const PRIMARY_ALT_LABEL: &str = "";

/// Full-text database built on a storage gateway
pub struct FullTextEngine<G: PlacesGateway> {
    gateway: Arc<G>,
    write_lock: Arc<Mutex<()>>,
}

impl<G: PlacesGateway> FullTextEngine<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run a blocking gateway call off the async workers
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&G) -> placeseek_store::Result<T> + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        let outcome = tokio::task::spawn_blocking(move || f(&*gateway)).await?;
        outcome.map_err(SearchError::from)
    }

    /// Scatter one hydration task per id and gather the places by position
    async fn hydrate(&self, ids: Vec<i64>) -> Result<Vec<PlaceResult>> {
        let count = ids.len();
        let cancel = CancelGuard::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (position, id) in ids.into_iter().enumerate() {
            let tx = tx.clone();
            let gateway = Arc::clone(&self.gateway);
            let cancelled = cancel.signal();

            tokio::task::spawn_blocking(move || {
                if cancelled.load(Ordering::Acquire) {
                    return;
                }

                let outcome = gateway.retrieve_place(id, PRIMARY_ALT_LABEL);

                // The collector is gone once the query has failed or been dropped
                let _ = tx.send((position, outcome));
            });
        }

        drop(tx);

        let mut slots: Vec<Option<PlaceResult>> = (0..count).map(|_| None).collect();
        let mut remaining = count;

        while remaining > 0 {
            match rx.recv().await {
                Some((position, Ok(place))) => {
                    slots[position] = Some(place);
                    remaining -= 1;
                }
                Some((position, Err(e))) => {
                    warn!("Hydration failed for candidate {}: {}", position, e);
                    return Err(SearchError::from(e));
                }
                None => {
                    return Err(SearchError::Task(format!(
                        "{} hydration task(s) exited without reporting",
                        remaining
                    )));
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[async_trait]
impl<G: PlacesGateway> FullTextDatabase for FullTextEngine<G> {
    fn name(&self) -> &str {
        self.gateway.name()
    }

    async fn index_feature(&self, feature: &Feature) -> Result<()> {
        let feature = feature.clone();
        let id = feature.id();
        let write_lock = Arc::clone(&self.write_lock);

        // The lock is held inside the blocking job so a dropped caller can
        // never release it while a write is still in flight.
        self.blocking(move |gateway| {
            let _guard = write_lock.lock();
            gateway.index_search(&feature)?;
            gateway.index_result(&feature)
        })
        .await?;

        debug!("Indexed feature {} in {}", id, self.name());
        Ok(())
    }

    async fn query_string(&self, term: &str, filters: &[&dyn Filter]) -> Result<PlaceResults> {
        if !filters.is_empty() {
            debug!("Ignoring {} filter(s) for query {:?}", filters.len(), term);
        }

        let match_term = term.to_string();
        let ids = self.blocking(move |gateway| gateway.match_ids(&match_term)).await?;

        debug!("Query {:?} matched {} candidate(s)", term, ids.len());

        if ids.is_empty() {
            return Ok(PlaceResults::empty());
        }

        let places = self.hydrate(ids).await?;
        Ok(PlaceResults::new(places))
    }

    async fn close(&self) -> Result<()> {
        self.blocking(|gateway| gateway.close()).await
    }
}

impl<G: PlacesGateway> std::fmt::Debug for FullTextEngine<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullTextEngine")
            .field("gateway", &self.gateway.name())
            .finish()
    }
}

/// Cancellation broadcast for one query
///
/// Fires when dropped: on the first hydration error, on normal return, or
/// when the caller drops the query future. Tasks check it before starting
/// their round trip; tasks already in flight run to completion.
struct CancelGuard {
    cancelled: Arc<AtomicBool>,
}

impl CancelGuard {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    fn signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
