//! Fuzzy-system inputs derived from a pair of propagated states

use crate::data::ElementSet;
use crate::orbital::{maneuverability_score, orbital_similarity};
use crate::propagation::StateSample;

/// The four crisp inputs to the inference engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Separation (km)
    pub distance_km: f64,
    /// Magnitude of the velocity difference (km/s)
    pub relative_velocity_km_s: f64,
    /// In [0, 1]
    pub orbital_similarity: f64,
    /// Mean maneuverability score of the two objects, in [0, 100]
    pub maneuverability: f64,
}

/// Features that depend only on the element sets, computed once per pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairProfile {
    pub orbital_similarity: f64,
    pub maneuverability: f64,
}

impl PairProfile {
    pub fn new(a: &ElementSet, b: &ElementSet, altitude_threshold_km: f64) -> Self {
        let maneuverability = (maneuverability_score(a) + maneuverability_score(b)) / 2.0;

        Self {
            orbital_similarity: orbital_similarity(a, b, altitude_threshold_km).clamp(0.0, 1.0),
            maneuverability: maneuverability.clamp(0.0, 100.0),
        }
    }

    /// Combine the pair profile with two states sampled at the same instant.
    pub fn features(&self, a: &StateSample, b: &StateSample) -> FeatureVector {
        debug_assert_eq!(a.time, b.time, "states must share an instant");

        FeatureVector {
            distance_km: (a.position_km - b.position_km).norm(),
            relative_velocity_km_s: (a.velocity_km_s - b.velocity_km_s).norm(),
            orbital_similarity: self.orbital_similarity,
            maneuverability: self.maneuverability,
        }
    }
}
