//! Mamdani inference with centroid defuzzification

use super::membership::FuzzyVariable;
use super::rules::{collision_rules, FuzzifiedInputs, Rule};
use super::variables::{
    self, DistanceLabel, ManeuverabilityLabel, RiskLevel, SimilarityLabel, VelocityLabel,
};
use crate::error::InferenceError;
use crate::features::FeatureVector;

/// Immutable inference system: input variables, rule base and the sampled
/// risk output surface. Build once per run and share across samples.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    distance: FuzzyVariable<DistanceLabel>,
    relative_velocity: FuzzyVariable<VelocityLabel>,
    orbital_similarity: FuzzyVariable<SimilarityLabel>,
    maneuverability: FuzzyVariable<ManeuverabilityLabel>,
    rules: Vec<Rule>,
    /// Sample points of the risk universe
    grid: Vec<f64>,
    /// Each risk term evaluated on `grid`, in declaration order
    curves: Vec<(RiskLevel, Vec<f64>)>,
}

impl InferenceEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        let risk = variables::risk();
        let grid = risk.universe().samples();
        let curves = risk
            .terms()
            .iter()
            .map(|(label, mf)| (*label, grid.iter().map(|&x| mf.degree(x)).collect()))
            .collect();

        Self {
            distance: variables::distance(),
            relative_velocity: variables::relative_velocity(),
            orbital_similarity: variables::orbital_similarity(),
            maneuverability: variables::maneuverability(),
            rules,
            grid,
            curves,
        }
    }

    /// Engine with the seven collision-risk rules
    pub fn standard() -> Self {
        Self::new(collision_rules())
    }

    pub fn fuzzify(&self, features: &FeatureVector) -> FuzzifiedInputs {
        FuzzifiedInputs {
            distance: self.distance.fuzzify(features.distance_km),
            relative_velocity: self.relative_velocity.fuzzify(features.relative_velocity_km_s),
            orbital_similarity: self.orbital_similarity.fuzzify(features.orbital_similarity),
            maneuverability: self.maneuverability.fuzzify(features.maneuverability),
        }
    }

    /// Activation of each risk term: the strongest rule concluding it.
    pub fn activations(&self, inputs: &FuzzifiedInputs) -> Vec<(RiskLevel, f64)> {
        self.curves
            .iter()
            .map(|(level, _)| {
                let strength = self
                    .rules
                    .iter()
                    .filter(|r| r.consequent == *level)
                    .map(|r| r.strength(inputs))
                    .fold(0.0, f64::max);
                (*level, strength)
            })
            .collect()
    }

    /// Clip every risk term at its activation and take the pointwise max.
    pub fn aggregate(&self, activations: &[(RiskLevel, f64)]) -> Vec<f64> {
        let mut surface = vec![0.0_f64; self.grid.len()];
        for (level, curve) in &self.curves {
            let cut = activations
                .iter()
                .find(|(l, _)| l == level)
                .map_or(0.0, |(_, a)| *a);
            if cut <= 0.0 {
                continue;
            }
            for (out, &mu) in surface.iter_mut().zip(curve) {
                *out = out.max(mu.min(cut));
            }
        }
        surface
    }

    /// Crisp risk value in [0, 100] for one feature vector.
    pub fn infer(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let inputs = self.fuzzify(features);
        let activations = self.activations(&inputs);
        log::trace!("rule activations {:?}", activations);

        let surface = self.aggregate(&activations);
        centroid(&self.grid, &surface).ok_or(InferenceError::Undefined)
    }
}

/// Center of gravity of a piecewise-linear membership surface.
///
/// Each segment between neighbouring samples is integrated exactly as a
/// trapezoid. Returns `None` when the surface encloses no area.
///
/// Only the grid points are used. The kinks where a clipped term meets its
/// cut height fall between samples, so on the 1-unit risk grid the result can
/// differ from an exact integral by a few hundredths.
pub fn centroid(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());

    let mut moment = 0.0;
    let mut area = 0.0;

    for (x, y) in xs.windows(2).zip(ys.windows(2)) {
        let (x1, x2) = (x[0], x[1]);
        let (y1, y2) = (y[0], y[1]);
        let width = x2 - x1;
        if width == 0.0 || (y1 == 0.0 && y2 == 0.0) {
            continue;
        }

        let segment_area = 0.5 * width * (y1 + y2);
        // Centroid of a trapezoid measured from x1
        let segment_center = x1 + width * (y1 + 2.0 * y2) / (3.0 * (y1 + y2));

        moment += segment_center * segment_area;
        area += segment_area;
    }

    (area > 0.0).then(|| moment / area)
}
