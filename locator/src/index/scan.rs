//! Linear-scan store: checks every record on each query.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use driver_locator_common::{
    error::LocatorResult,
    types::{AgentRecord, NearbyAgent, UpsertStatus},
};
use tokio::sync::RwLock;

use super::store::{closed_error, LocationStore};
use crate::geo::RadiusQuery;

/// Store that answers radius queries by scanning all records.
pub struct ScanStore {
    records: RwLock<Option<HashMap<String, AgentRecord>>>,
}

impl ScanStore {
    /// 新しいストアを作成
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Some(HashMap::new())),
        }
    }
}

impl Default for ScanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationStore for ScanStore {
    async fn upsert(&self, record: AgentRecord) -> LocatorResult<UpsertStatus> {
        let mut guard = self.records.write().await;
        let records = guard.as_mut().ok_or_else(closed_error)?;

        match records.insert(record.agent_id.clone(), record) {
            Some(_) => Ok(UpsertStatus::Updated),
            None => Ok(UpsertStatus::Created),
        }
    }

    async fn get(&self, agent_id: &str) -> LocatorResult<Option<AgentRecord>> {
        let guard = self.records.read().await;
        let records = guard.as_ref().ok_or_else(closed_error)?;
        Ok(records.get(agent_id).cloned())
    }

    async fn within(&self, query: &RadiusQuery) -> LocatorResult<Vec<NearbyAgent>> {
        let guard = self.records.read().await;
        let records = guard.as_ref().ok_or_else(closed_error)?;

        Ok(records
            .values()
            .filter(|record| query.contains(record.coordinate))
            .map(NearbyAgent::from)
            .collect())
    }

    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> LocatorResult<usize> {
        let mut guard = self.records.write().await;
        let records = guard.as_mut().ok_or_else(closed_error)?;

        let before = records.len();
        records.retain(|_, record| record.last_updated >= cutoff);
        Ok(before - records.len())
    }

    async fn len(&self) -> LocatorResult<usize> {
        let guard = self.records.read().await;
        let records = guard.as_ref().ok_or_else(closed_error)?;
        Ok(records.len())
    }

    async fn close(&self) {
        *self.records.write().await = None;
    }
}
