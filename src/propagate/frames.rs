use crate::propagate::error::PropagationError;

// WGS-84
const EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const ECCENTRICITY_SQ: f64 = FLATTENING * (2.0 - FLATTENING);
const POLAR_RADIUS_KM: f64 = EQUATORIAL_RADIUS_KM * (1.0 - FLATTENING);

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Rotate a TEME position about the pole by the sidereal angle, giving the
/// Earth-fixed position of the same point.
pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let [x, y, z] = pos_teme;
    let (sin, cos) = gmst.sin_cos();
    [x * cos + y * sin, y * cos - x * sin, z]
}

/// Point on the WGS-84 ellipsoid directly below an Earth-fixed position,
/// with the height above it.
pub fn ecef_to_geodetic(pos_ecef_km: [f64; 3]) -> Result<Geodetic, PropagationError> {
    let [x, y, z] = pos_ecef_km;
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(PropagationError::Degenerate(pos_ecef_km));
    }

    let p = x.hypot(y);
    if p == 0.0 && z == 0.0 {
        return Err(PropagationError::Degenerate(pos_ecef_km));
    }

    let longitude = y.atan2(x);
    let mut latitude = z.atan2(p * (1.0 - ECCENTRICITY_SQ));
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        let n = prime_vertical_radius(sin_lat);
        let next = (z + ECCENTRICITY_SQ * n * sin_lat).atan2(p);
        let converged = (next - latitude).abs() < LATITUDE_TOLERANCE_RAD;
        latitude = next;
        if converged {
            break;
        }
    }

    let sin_lat = latitude.sin();
    let cos_lat = latitude.cos();
    let altitude = if cos_lat.abs() > 1e-10 {
        p / cos_lat - prime_vertical_radius(sin_lat)
    } else {
        z.abs() - POLAR_RADIUS_KM
    };

    Ok(Geodetic {
        latitude_deg: latitude.to_degrees().clamp(-90.0, 90.0),
        longitude_deg: longitude.to_degrees().clamp(-180.0, 180.0),
        altitude_km: altitude,
    })
}

fn prime_vertical_radius(sin_lat: f64) -> f64 {
    EQUATORIAL_RADIUS_KM / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt_km: f64) -> [f64; 3] {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let n = prime_vertical_radius(lat.sin());
        [
            (n + alt_km) * lat.cos() * lon.cos(),
            (n + alt_km) * lat.cos() * lon.sin(),
            (n * (1.0 - ECCENTRICITY_SQ) + alt_km) * lat.sin(),
        ]
    }

    #[test]
    fn equator_prime_meridian() {
        let geo = ecef_to_geodetic([EQUATORIAL_RADIUS_KM + 400.0, 0.0, 0.0]).unwrap();
        assert!(geo.latitude_deg.abs() < 1e-9);
        assert!(geo.longitude_deg.abs() < 1e-9);
        assert!((geo.altitude_km - 400.0).abs() < 1e-6);
    }

    #[test]
    fn recovers_known_points() {
        for &(lat, lon, alt) in &[
            (51.6, -122.3, 420.0),
            (-33.9, 151.2, 0.0),
            (0.0, 179.9, 35_786.0),
            (89.9, 10.0, 800.0),
        ] {
            let geo = ecef_to_geodetic(geodetic_to_ecef(lat, lon, alt)).unwrap();
            assert!((geo.latitude_deg - lat).abs() < 1e-6, "lat {}", lat);
            assert!((geo.longitude_deg - lon).abs() < 1e-6, "lon {}", lon);
            assert!((geo.altitude_km - alt).abs() < 1e-3, "alt {}", alt);
        }
    }

    #[test]
    fn over_the_pole() {
        let geo = ecef_to_geodetic([0.0, 0.0, POLAR_RADIUS_KM + 500.0]).unwrap();
        assert!((geo.latitude_deg - 90.0).abs() < 1e-9);
        assert!((geo.altitude_km - 500.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_positions() {
        assert!(ecef_to_geodetic([0.0, 0.0, 0.0]).is_err());
        assert!(ecef_to_geodetic([f64::NAN, 1.0, 1.0]).is_err());
    }

    #[test]
    fn teme_rotation_preserves_radius() {
        let teme = [4000.0, -3000.0, 4500.0];
        let ecef = teme_to_ecef_position(teme, 1.234);
        let r = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((r(teme) - r(ecef)).abs() < 1e-9);
        assert_eq!(ecef[2], teme[2]);
    }
}
