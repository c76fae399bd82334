//! Derived orbital quantities used as fuzzy inputs

use crate::data::ElementSet;

/// Earth's gravitational parameter (km³/s²)
pub const MU_EARTH_KM3_S2: f64 = 398600.4418;

/// Earth's mean radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Upper edge of the low-Earth-orbit regime (km)
pub const LEO_CEILING_KM: f64 = 2000.0;

/// Geostationary altitude (km)
pub const GEO_ALTITUDE_KM: f64 = 35786.0;

/// Altitude gap beyond which two orbits count as entirely dissimilar (km)
pub const DEFAULT_ALTITUDE_THRESHOLD_KM: f64 = 1000.0;

/// Mean altitude: semi-major axis from mean motion (Kepler's third law) minus
/// Earth's mean radius.
///
/// Only defined for positive mean motion; [`ElementSet::validate`] guarantees
/// that for parsed element sets.
pub fn mean_altitude_km(set: &ElementSet) -> f64 {
    debug_assert!(set.mean_motion > 0.0, "mean motion must be positive");

    let n_rad_s = set.mean_motion * (2.0 * std::f64::consts::PI) / SECONDS_PER_DAY;
    (MU_EARTH_KM3_S2 / (n_rad_s * n_rad_s)).cbrt() - EARTH_RADIUS_KM
}

/// Heuristic maneuverability proxy in [0, 100].
///
/// Not a physical quantity: it only ranks objects by orbital regime, with a
/// bump for eccentric and highly inclined orbits.
pub fn maneuverability_score(set: &ElementSet) -> f64 {
    maneuverability_for(mean_altitude_km(set), set.eccentricity, set.inclination)
}

/// Score from already-derived quantities. Regime edges belong to the lower
/// regime.
pub fn maneuverability_for(altitude_km: f64, eccentricity: f64, inclination_deg: f64) -> f64 {
    let mut score: f64 = if altitude_km <= LEO_CEILING_KM {
        30.0
    } else if altitude_km <= GEO_ALTITUDE_KM {
        50.0
    } else {
        70.0
    };

    if eccentricity > 0.1 {
        score += 10.0;
    }
    if inclination_deg > 45.0 {
        score += 10.0;
    }

    score.min(100.0)
}

/// Similarity of two orbits in [0, 1].
///
/// Zero as soon as the mean altitudes differ by more than
/// `altitude_threshold_km`. Otherwise one minus the mean of the normalized
/// element differences. Angles are compared without wrap-around, so RAAN
/// values of 1° and 359° count as far apart.
pub fn orbital_similarity(a: &ElementSet, b: &ElementSet, altitude_threshold_km: f64) -> f64 {
    if (mean_altitude_km(a) - mean_altitude_km(b)).abs() > altitude_threshold_km {
        return 0.0;
    }

    let diff_incl = (a.inclination - b.inclination).abs() / 180.0;
    let diff_raan = (a.raan - b.raan).abs() / 360.0;
    let diff_ecc = (a.eccentricity - b.eccentricity).abs();
    let diff_argp = (a.arg_of_perigee - b.arg_of_perigee).abs() / 360.0;

    let similarity = 1.0 - (diff_incl + diff_raan + diff_ecc + diff_argp) / 4.0;
    similarity.clamp(0.0, 1.0)
}
