//! Storage seam behind the location index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use driver_locator_common::{
    error::{LocatorError, LocatorResult},
    types::{AgentRecord, NearbyAgent, UpsertStatus},
};

use crate::geo::RadiusQuery;

/// Coordinate storage used by [`super::LocationIndex`].
///
/// Implementations own their records outright and hold their lock only for
/// the duration of a single call. Inputs are validated by the index before
/// they get here.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Inserts or replaces the whole record for `record.agent_id`.
    async fn upsert(&self, record: AgentRecord) -> LocatorResult<UpsertStatus>;

    /// Returns a copy of the record for `agent_id`.
    async fn get(&self, agent_id: &str) -> LocatorResult<Option<AgentRecord>>;

    /// Returns every agent inside the query circle, in no particular order.
    async fn within(&self, query: &RadiusQuery) -> LocatorResult<Vec<NearbyAgent>>;

    /// Removes records last updated strictly before `cutoff`.
    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> LocatorResult<usize>;

    /// Number of stored records.
    async fn len(&self) -> LocatorResult<usize>;

    /// Drops every record. Later calls fail with a storage error.
    async fn close(&self);
}

pub(crate) fn closed_error() -> LocatorError {
    LocatorError::Storage("location store is closed".to_string())
}
