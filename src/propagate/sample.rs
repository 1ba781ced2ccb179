use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Geodetic subpoint of a named object at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub satellite_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_km: f64,
    pub observed_at: DateTime<Utc>,
}

/// Wire form of a position, as returned by `GET /api/position/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionReport {
    /// Object name as it appears in the element feed
    pub satellite: String,
    /// Degrees, -90 to 90
    pub latitude: f64,
    /// Degrees, -180 to 180
    pub longitude: f64,
    /// Kilometers above the WGS-84 ellipsoid
    pub altitude: f64,
}

impl From<PositionSample> for PositionReport {
    fn from(sample: PositionSample) -> Self {
        PositionReport {
            satellite: sample.satellite_name,
            latitude: sample.latitude,
            longitude: sample.longitude,
            altitude: sample.altitude_km,
        }
    }
}

impl PositionReport {
    pub fn into_sample(self, observed_at: DateTime<Utc>) -> PositionSample {
        PositionSample {
            satellite_name: self.satellite,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude_km: self.altitude,
            observed_at,
        }
    }
}
