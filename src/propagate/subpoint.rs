use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::elements::OrbitalElementRecord;
use crate::propagate::error::PropagationError;
use crate::propagate::frames::{ecef_to_geodetic, teme_to_ecef_position};
use crate::propagate::sample::PositionSample;

/// Farthest from the element epoch we are willing to propagate. SGP4 keeps
/// producing numbers well past this, they just stop meaning anything.
const MAX_EPOCH_OFFSET_DAYS: i64 = 3650;

/// Propagate `record` to `at` and project it onto the ellipsoid.
///
/// Deterministic for a given `(record, at)`: latitude and longitude in
/// degrees, altitude in kilometers above the ellipsoid.
pub fn project(
    record: &OrbitalElementRecord,
    at: DateTime<Utc>,
) -> Result<PositionSample, PropagationError> {
    let elements = Elements::from_tle(
        Some(record.name.clone()),
        record.line1.as_bytes(),
        record.line2.as_bytes(),
    )?;
    let constants = Constants::from_elements(&elements)?;

    let timestamp = at.naive_utc();
    let days = (timestamp - elements.datetime).num_days();
    if days.abs() > MAX_EPOCH_OFFSET_DAYS {
        return Err(PropagationError::OutOfRange { days });
    }

    let minutes = elements
        .datetime_to_minutes_since_epoch(&timestamp)
        .map_err(|e| PropagationError::Propagation(e.to_string()))?;
    let prediction = constants.propagate(minutes)?;

    let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp));
    let position = teme_to_ecef_position(prediction.position, sidereal);
    let subpoint = ecef_to_geodetic(position)?;

    Ok(PositionSample {
        satellite_name: record.name.clone(),
        latitude: subpoint.latitude_deg,
        longitude: subpoint.longitude_deg,
        altitude_km: subpoint.altitude_km,
        observed_at: at,
    })
}
