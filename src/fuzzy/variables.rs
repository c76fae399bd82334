//! Linguistic labels and membership tables of the collision-risk system

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::membership::{FuzzyVariable, Triangle, Universe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceLabel {
    VeryClose,
    Close,
    Moderate,
    Far,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VelocityLabel {
    Slow,
    Moderate,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimilarityLabel {
    Different,
    Similar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManeuverabilityLabel {
    Low,
    Medium,
    High,
}

/// Risk labels, most severe first.
///
/// This order is the declaration order of every risk variable and therefore
/// the tie-break order of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::VeryHigh,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Label as written to result files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Separation in km
pub fn distance() -> FuzzyVariable<DistanceLabel> {
    FuzzyVariable::new(
        "distance",
        Universe::new(0.0, 10_000.0, 1.0),
        vec![
            (DistanceLabel::VeryClose, Triangle::new(0.0, 0.0, 150.0)),
            (DistanceLabel::Close, Triangle::new(100.0, 250.0, 500.0)),
            (DistanceLabel::Moderate, Triangle::new(400.0, 1000.0, 3000.0)),
            (DistanceLabel::Far, Triangle::new(2500.0, 5000.0, 10_000.0)),
        ],
    )
}

/// Relative speed in km/s
pub fn relative_velocity() -> FuzzyVariable<VelocityLabel> {
    FuzzyVariable::new(
        "relative_velocity",
        Universe::new(0.0, 15_000.0, 1.0),
        vec![
            (VelocityLabel::Slow, Triangle::new(0.0, 0.0, 2.0)),
            (VelocityLabel::Moderate, Triangle::new(1.0, 4.0, 7.0)),
            (VelocityLabel::Fast, Triangle::new(5.0, 10.0, 15.0)),
        ],
    )
}

pub fn orbital_similarity() -> FuzzyVariable<SimilarityLabel> {
    FuzzyVariable::new(
        "orbital_similarity",
        Universe::new(0.0, 1.01, 0.01),
        vec![
            (SimilarityLabel::Different, Triangle::new(0.0, 0.0, 0.5)),
            (SimilarityLabel::Similar, Triangle::new(0.5, 1.0, 1.0)),
        ],
    )
}

pub fn maneuverability() -> FuzzyVariable<ManeuverabilityLabel> {
    FuzzyVariable::new(
        "maneuverability",
        Universe::new(0.0, 100.0, 1.0),
        vec![
            (ManeuverabilityLabel::Low, Triangle::new(0.0, 0.0, 30.0)),
            (ManeuverabilityLabel::Medium, Triangle::new(20.0, 50.0, 80.0)),
            (ManeuverabilityLabel::High, Triangle::new(60.0, 100.0, 100.0)),
        ],
    )
}

/// Risk scale 0-100; lower values are more dangerous.
///
/// Each call builds a fresh instance: the inference output and the classifier
/// share breakpoints but never state.
pub fn risk() -> FuzzyVariable<RiskLevel> {
    FuzzyVariable::new(
        "risk",
        Universe::new(0.0, 100.0, 1.0),
        vec![
            (RiskLevel::VeryHigh, Triangle::new(0.0, 0.0, 25.0)),
            (RiskLevel::High, Triangle::new(0.0, 25.0, 50.0)),
            (RiskLevel::Medium, Triangle::new(25.0, 50.0, 75.0)),
            (RiskLevel::Low, Triangle::new(50.0, 75.0, 100.0)),
        ],
    )
}
