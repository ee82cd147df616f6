//! 共通型定義
//!
//! Coordinate, DistanceUnit, AgentRecord等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommonError;

/// Maximum accepted length of an agent identifier, in bytes.
pub const MAX_AGENT_ID_LEN: usize = 256;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    /// Latitude, -90..=90
    pub latitude: f64,
    /// Longitude, -180..=180
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CommonError> {
        let coord = Self {
            latitude,
            longitude,
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Checks the latitude/longitude bounds. NaN and infinities fail.
    pub fn validate(&self) -> Result<(), CommonError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CommonError::Validation(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CommonError::Validation(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Distance unit for radius queries.
///
/// Conversion factors match the Redis GEO commands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DistanceUnit {
    /// Meters
    #[serde(rename = "m", alias = "meters")]
    Meters,
    /// Kilometers
    #[serde(rename = "km", alias = "kilometers")]
    Kilometers,
    /// Statute miles
    #[default]
    #[serde(rename = "mi", alias = "miles")]
    Miles,
    /// International feet
    #[serde(rename = "ft", alias = "feet")]
    Feet,
}

impl DistanceUnit {
    /// Meters in one unit.
    pub fn meters_per_unit(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Kilometers => 1000.0,
            Self::Miles => 1609.34,
            Self::Feet => 0.3048,
        }
    }

    /// Converts a distance in meters into this unit.
    pub fn convert_meters(self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }

    /// Converts a distance in this unit into meters.
    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }

    /// Short code ("m", "km", "mi", "ft").
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Miles => "mi",
            Self::Feet => "ft",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" => Ok(Self::Meters),
            "km" | "kilometer" | "kilometers" => Ok(Self::Kilometers),
            "mi" | "mile" | "miles" => Ok(Self::Miles),
            "ft" | "foot" | "feet" => Ok(Self::Feet),
            other => Err(CommonError::Validation(format!(
                "unknown distance unit '{}' (expected one of m, km, mi, ft)",
                other
            ))),
        }
    }
}

/// Checks an agent identifier: non-empty, not blank, bounded length.
pub fn validate_agent_id(agent_id: &str) -> Result<(), CommonError> {
    if agent_id.trim().is_empty() {
        return Err(CommonError::Validation(
            "agent_id must not be empty".to_string(),
        ));
    }
    if agent_id.len() > MAX_AGENT_ID_LEN {
        return Err(CommonError::Validation(format!(
            "agent_id is {} bytes long (max {})",
            agent_id.len(),
            MAX_AGENT_ID_LEN
        )));
    }
    Ok(())
}

/// Checks a search radius: finite and non-negative. Zero is allowed.
pub fn validate_radius(radius: f64) -> Result<(), CommonError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(CommonError::Validation(format!(
            "radius must be a finite number >= 0, got {}",
            radius
        )));
    }
    Ok(())
}

/// The index's record for one agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRecord {
    /// 一意識別子
    pub agent_id: String,
    /// 現在位置
    pub coordinate: Coordinate,
    /// 最終更新時刻
    pub last_updated: DateTime<Utc>,
}

/// One radius search hit. Always a copy of the stored record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearbyAgent {
    /// エージェントID
    pub agent_id: String,
    /// 位置
    pub coordinate: Coordinate,
}

impl From<&AgentRecord> for NearbyAgent {
    fn from(record: &AgentRecord) -> Self {
        Self {
            agent_id: record.agent_id.clone(),
            coordinate: record.coordinate,
        }
    }
}

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpsertStatus {
    /// First position for this agent
    Created,
    /// Existing record overwritten
    Updated,
}
