//! 位置インデックス
//!
//! Authoritative agent → coordinate mapping with radius search. The index
//! validates input, stamps records, applies the query error policy and keeps
//! counters; the actual storage sits behind [`LocationStore`].

mod grid;
mod scan;
mod store;

pub use grid::GridStore;
pub use scan::ScanStore;
pub use store::LocationStore;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use driver_locator_common::{
    config::{IndexStrategy, LocatorConfig, QueryErrorPolicy},
    error::LocatorResult,
    types::{
        validate_agent_id, validate_radius, AgentRecord, Coordinate, DistanceUnit, NearbyAgent,
        UpsertStatus,
    },
};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::geo::RadiusQuery;

/// Default grid cell size in degrees.
pub const DEFAULT_CELL_DEGREES: f64 = 0.1;

#[derive(Debug, Default)]
struct Counters {
    upserts: AtomicU64,
    searches: AtomicU64,
    query_failures: AtomicU64,
    evicted: AtomicU64,
}

/// Snapshot of the index counters.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct IndexStats {
    /// Successful upserts
    pub upserts: u64,
    /// Radius searches that reached the store
    pub searches: u64,
    /// Store failures answered with an empty result (fail-open)
    pub query_failures: u64,
    /// Records removed by the stale sweep
    pub evicted: u64,
}

/// 位置インデックス
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct LocationIndex {
    store: Arc<dyn LocationStore>,
    policy: QueryErrorPolicy,
    counters: Arc<Counters>,
}

impl LocationIndex {
    /// Wraps an existing store.
    pub fn new(store: Arc<dyn LocationStore>, policy: QueryErrorPolicy) -> Self {
        Self {
            store,
            policy,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Builds the store selected by the configuration.
    pub fn from_config(config: &LocatorConfig) -> Self {
        let store: Arc<dyn LocationStore> = match config.index_strategy {
            IndexStrategy::Grid => Arc::new(GridStore::new(config.grid_cell_degrees)),
            IndexStrategy::Scan => Arc::new(ScanStore::new()),
        };
        info!(
            strategy = ?config.index_strategy,
            cell_degrees = config.grid_cell_degrees,
            on_query_error = ?config.on_query_error,
            "Location index created"
        );
        Self::new(store, config.on_query_error)
    }

    /// Grid-backed, fail-open index with default settings.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(GridStore::new(DEFAULT_CELL_DEGREES)),
            QueryErrorPolicy::Empty,
        )
    }

    /// The configured query error policy.
    pub fn policy(&self) -> QueryErrorPolicy {
        self.policy
    }

    /// Inserts or overwrites the position of `agent_id`.
    ///
    /// Invalid input is rejected before the store is touched.
    pub async fn upsert(
        &self,
        agent_id: &str,
        coordinate: Coordinate,
    ) -> LocatorResult<UpsertStatus> {
        validate_agent_id(agent_id)?;
        coordinate.validate()?;

        let record = AgentRecord {
            agent_id: agent_id.to_string(),
            coordinate,
            last_updated: Utc::now(),
        };

        let status = self.store.upsert(record).await.map_err(|e| {
            error!(agent_id, error = %e, "Failed to store location");
            e
        })?;

        self.counters.upserts.fetch_add(1, Ordering::Relaxed);
        debug!(agent_id, %coordinate, ?status, "Location stored");
        Ok(status)
    }

    /// Returns every agent within `radius` `unit`s of `center`.
    ///
    /// The boundary is inclusive and the order of the result is unspecified.
    /// With [`QueryErrorPolicy::Empty`] a store failure is logged, counted
    /// and answered with an empty list; validation errors are always returned.
    pub async fn radius_search(
        &self,
        center: Coordinate,
        radius: f64,
        unit: DistanceUnit,
    ) -> LocatorResult<Vec<NearbyAgent>> {
        center.validate()?;
        validate_radius(radius)?;

        let query = RadiusQuery::new(center, radius, unit);
        match self.store.within(&query).await {
            Ok(agents) => {
                self.counters.searches.fetch_add(1, Ordering::Relaxed);
                debug!(%center, radius, %unit, found = agents.len(), "Radius search");
                Ok(agents)
            }
            Err(e) => match self.policy {
                QueryErrorPolicy::Empty => {
                    self.counters.query_failures.fetch_add(1, Ordering::Relaxed);
                    error!(%center, radius, %unit, error = %e, "Radius search failed, returning no agents");
                    Ok(Vec::new())
                }
                QueryErrorPolicy::Propagate => {
                    error!(%center, radius, %unit, error = %e, "Radius search failed");
                    Err(e)
                }
            },
        }
    }

    /// Current record of `agent_id`, if any.
    pub async fn get(&self, agent_id: &str) -> LocatorResult<Option<AgentRecord>> {
        self.store.get(agent_id).await
    }

    /// Number of tracked agents.
    pub async fn len(&self) -> LocatorResult<usize> {
        self.store.len().await
    }

    /// Whether no agent is tracked.
    pub async fn is_empty(&self) -> LocatorResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Removes agents whose last update is older than `max_age`.
    pub async fn evict_stale(&self, max_age: chrono::Duration) -> LocatorResult<usize> {
        let cutoff = Utc::now() - max_age;
        let removed = self.store.remove_older_than(cutoff).await?;
        if removed > 0 {
            self.counters
                .evicted
                .fetch_add(removed as u64, Ordering::Relaxed);
            info!(removed, %cutoff, "Evicted stale agents");
        }
        Ok(removed)
    }

    /// Tears the store down. Every later call fails with a storage error.
    pub async fn close(&self) {
        self.store.close().await;
        info!("Location index closed");
    }

    /// Counter snapshot.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            upserts: self.counters.upserts.load(Ordering::Relaxed),
            searches: self.counters.searches.load(Ordering::Relaxed),
            query_failures: self.counters.query_failures.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
        }
    }
}

impl Default for LocationIndex {
    fn default() -> Self {
        Self::in_memory()
    }
}
