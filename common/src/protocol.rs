//! 通信プロトコル定義
//!
//! Driver/Rider ↔ Locator間の通信メッセージ

use serde::{Deserialize, Serialize};

use crate::error::CommonError;
use crate::types::{validate_radius, Coordinate, DistanceUnit, NearbyAgent};

/// Status attached to every driver returned by a nearby search.
pub const DRIVER_STATUS_AVAILABLE: &str = "AVAILABLE";

/// 位置更新リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateLocationRequest {
    /// ドライバーID
    pub driver_id: String,
    /// 現在位置
    pub location: Coordinate,
    /// Client-reported status. Accepted for compatibility, not stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// 位置更新レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationAck {
    /// 成功フラグ
    pub success: bool,
    /// 診断メッセージ
    pub message: String,
}

impl LocationAck {
    /// Successful acknowledgement.
    pub fn stored() -> Self {
        Self {
            success: true,
            message: "Location stored".to_string(),
        }
    }

    /// Failed acknowledgement with a client-facing message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// 近隣ドライバー検索リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearbyDriversRequest {
    /// 検索中心
    pub location: Coordinate,
    /// 半径（マイル）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_miles: Option<f64>,
    /// 半径（`unit` 単位）。`radius_miles` より優先
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// 距離単位 ("m", "km", "mi", "ft")。省略時はマイル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl NearbyDriversRequest {
    /// Resolves the radius and unit of the request.
    ///
    /// `radius` + `unit` win over `radius_miles`. Unknown units and missing,
    /// negative or non-finite radii are validation errors.
    pub fn resolve_radius(&self) -> Result<(f64, DistanceUnit), CommonError> {
        let unit = match self.unit.as_deref() {
            Some(raw) => raw.parse::<DistanceUnit>()?,
            None => DistanceUnit::Miles,
        };

        let radius = match (self.radius, self.radius_miles) {
            (Some(radius), _) => radius,
            (None, Some(miles)) => {
                if unit != DistanceUnit::Miles {
                    return Err(CommonError::Validation(
                        "radius_miles cannot be combined with a non-mile unit; use radius"
                            .to_string(),
                    ));
                }
                miles
            }
            (None, None) => {
                return Err(CommonError::Validation(
                    "either radius or radius_miles is required".to_string(),
                ))
            }
        };

        validate_radius(radius)?;
        Ok((radius, unit))
    }
}

/// 検索結果のドライバー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    /// ドライバーID
    pub driver_id: String,
    /// 位置
    pub location: Coordinate,
    /// ステータス（常に "AVAILABLE"）
    pub status: String,
}

impl From<NearbyAgent> for Driver {
    fn from(agent: NearbyAgent) -> Self {
        Self {
            driver_id: agent.agent_id,
            location: agent.coordinate,
            status: DRIVER_STATUS_AVAILABLE.to_string(),
        }
    }
}

/// 近隣ドライバー検索レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NearbyDriversResponse {
    /// 見つかったドライバー（順序は保証しない）
    pub drivers: Vec<Driver>,
}
