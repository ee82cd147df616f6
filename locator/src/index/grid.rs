//! Grid-bucketed store.
//!
//! The globe is cut into square latitude/longitude cells. Each cell holds the
//! ids of the agents currently inside it, so a radius query only touches the
//! cells that intersect the query's bounding box before applying the exact
//! distance filter. Updates that stay inside a cell never touch the buckets.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use driver_locator_common::{
    config::{MAX_GRID_CELL_DEGREES, MIN_GRID_CELL_DEGREES},
    error::LocatorResult,
    types::{AgentRecord, Coordinate, NearbyAgent, UpsertStatus},
};
use tokio::sync::RwLock;

use super::store::{closed_error, LocationStore};
use crate::geo::{BoundingBox, RadiusQuery};

/// (latitude index, longitude index)
type CellKey = (u32, u32);

#[derive(Default)]
struct GridInner {
    records: HashMap<String, AgentRecord>,
    cells: HashMap<CellKey, HashSet<String>>,
}

impl GridInner {
    fn bucket_insert(&mut self, cell: CellKey, agent_id: &str) {
        self.cells
            .entry(cell)
            .or_default()
            .insert(agent_id.to_string());
    }

    fn bucket_remove(&mut self, cell: CellKey, agent_id: &str) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.remove(agent_id);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

/// Store that buckets agents into fixed-size degree cells.
pub struct GridStore {
    cell_degrees: f64,
    lat_cells: u32,
    lon_cells: u32,
    inner: RwLock<Option<GridInner>>,
}

impl GridStore {
    /// Creates a grid with `cell_degrees`-sized cells.
    ///
    /// `cell_degrees` is clamped to
    /// [`MIN_GRID_CELL_DEGREES`, `MAX_GRID_CELL_DEGREES`]; `LocatorConfig::validate`
    /// rejects values outside that range for configured servers.
    pub fn new(cell_degrees: f64) -> Self {
        debug_assert!(cell_degrees.is_finite());
        let cell_degrees = cell_degrees.clamp(MIN_GRID_CELL_DEGREES, MAX_GRID_CELL_DEGREES);
        let lat_cells = (180.0 / cell_degrees).ceil().max(1.0) as u32;
        let lon_cells = (360.0 / cell_degrees).ceil().max(1.0) as u32;

        Self {
            cell_degrees,
            lat_cells,
            lon_cells,
            inner: RwLock::new(Some(GridInner::default())),
        }
    }

    /// Cell edge length in degrees.
    pub fn cell_degrees(&self) -> f64 {
        self.cell_degrees
    }

    fn lat_index(&self, latitude: f64) -> u32 {
        let idx = ((latitude + 90.0) / self.cell_degrees).floor().max(0.0) as u32;
        idx.min(self.lat_cells - 1)
    }

    fn lon_index(&self, longitude: f64) -> u32 {
        let idx = ((longitude + 180.0) / self.cell_degrees).floor().max(0.0) as u32;
        idx.min(self.lon_cells - 1)
    }

    fn cell_of(&self, coordinate: Coordinate) -> CellKey {
        (
            self.lat_index(coordinate.latitude),
            self.lon_index(coordinate.longitude),
        )
    }

    /// Cell indices intersecting `bbox`, padded by one cell on every side
    /// to absorb floating point error at the edges.
    ///
    /// Longitude indices come back as sorted, non-overlapping ranges.
    fn candidate_cells(
        &self,
        bbox: &BoundingBox,
    ) -> (RangeInclusive<u32>, Vec<RangeInclusive<u32>>) {
        let lat_lo = self.lat_index(bbox.lat.0).saturating_sub(1);
        let lat_hi = (self.lat_index(bbox.lat.1) + 1).min(self.lat_cells - 1);

        let mut spans: Vec<(u32, u32)> = bbox
            .lon
            .iter()
            .map(|&(min, max)| {
                let lo = self.lon_index(min).saturating_sub(1);
                let hi = (self.lon_index(max) + 1).min(self.lon_cells - 1);
                (lo, hi)
            })
            .collect();
        spans.sort_unstable();

        let mut lon: Vec<RangeInclusive<u32>> = Vec::with_capacity(spans.len());
        for (lo, hi) in spans {
            match lon.last_mut() {
                Some(last) if lo <= last.end().saturating_add(1) => {
                    if hi > *last.end() {
                        *last = *last.start()..=hi;
                    }
                }
                _ => lon.push(lo..=hi),
            }
        }

        (lat_lo..=lat_hi, lon)
    }
}

fn span_len(range: &RangeInclusive<u32>) -> u64 {
    u64::from(range.end() - range.start()) + 1
}

#[async_trait]
impl LocationStore for GridStore {
    async fn upsert(&self, record: AgentRecord) -> LocatorResult<UpsertStatus> {
        let new_cell = self.cell_of(record.coordinate);
        let agent_id = record.agent_id.clone();

        let mut guard = self.inner.write().await;
        let inner = guard.as_mut().ok_or_else(closed_error)?;

        match inner.records.insert(agent_id.clone(), record) {
            Some(previous) => {
                let old_cell = self.cell_of(previous.coordinate);
                if old_cell != new_cell {
                    inner.bucket_remove(old_cell, &agent_id);
                    inner.bucket_insert(new_cell, &agent_id);
                }
                Ok(UpsertStatus::Updated)
            }
            None => {
                inner.bucket_insert(new_cell, &agent_id);
                Ok(UpsertStatus::Created)
            }
        }
    }

    async fn get(&self, agent_id: &str) -> LocatorResult<Option<AgentRecord>> {
        let guard = self.inner.read().await;
        let inner = guard.as_ref().ok_or_else(closed_error)?;
        Ok(inner.records.get(agent_id).cloned())
    }

    async fn within(&self, query: &RadiusQuery) -> LocatorResult<Vec<NearbyAgent>> {
        let (lat_range, lon_ranges) = self.candidate_cells(&query.bounding_box());

        let guard = self.inner.read().await;
        let inner = guard.as_ref().ok_or_else(closed_error)?;

        let candidate_count = span_len(&lat_range)
            .saturating_mul(lon_ranges.iter().map(span_len).sum::<u64>());
        let mut hits = Vec::new();
        let mut collect = |bucket: &HashSet<String>| {
            for agent_id in bucket {
                if let Some(record) = inner.records.get(agent_id) {
                    if query.contains(record.coordinate) {
                        hits.push(NearbyAgent::from(record));
                    }
                }
            }
        };

        // Large boxes: walking the occupied cells is cheaper than probing
        // every candidate key.
        if candidate_count > inner.cells.len() as u64 {
            for ((lat, lon), bucket) in &inner.cells {
                if lat_range.contains(lat) && lon_ranges.iter().any(|range| range.contains(lon)) {
                    collect(bucket);
                }
            }
        } else {
            for lat in lat_range {
                for lon in lon_ranges.iter().cloned().flatten() {
                    if let Some(bucket) = inner.cells.get(&(lat, lon)) {
                        collect(bucket);
                    }
                }
            }
        }

        Ok(hits)
    }

    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> LocatorResult<usize> {
        let mut guard = self.inner.write().await;
        let inner = guard.as_mut().ok_or_else(closed_error)?;

        let stale: Vec<(String, CellKey)> = inner
            .records
            .values()
            .filter(|record| record.last_updated < cutoff)
            .map(|record| (record.agent_id.clone(), self.cell_of(record.coordinate)))
            .collect();

        for (agent_id, cell) in &stale {
            inner.records.remove(agent_id);
            inner.bucket_remove(*cell, agent_id);
        }

        Ok(stale.len())
    }

    async fn len(&self) -> LocatorResult<usize> {
        let guard = self.inner.read().await;
        let inner = guard.as_ref().ok_or_else(closed_error)?;
        Ok(inner.records.len())
    }

    async fn close(&self) {
        *self.inner.write().await = None;
    }
}
