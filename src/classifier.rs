//! Labels a crisp risk value with its dominant risk category

use crate::fuzzy::{self, FuzzyVariable, RiskLevel};

/// Category with the highest membership and that membership as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub level: RiskLevel,
    /// In [0, 100]
    pub confidence: f64,
}

/// Re-fuzzifies inference output against its own risk variable.
///
/// The breakpoints match the inference output terms, but this is a separate
/// instance evaluated after defuzzification.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    levels: FuzzyVariable<RiskLevel>,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskClassifier {
    pub fn new() -> Self {
        Self {
            levels: fuzzy::risk(),
        }
    }

    /// Ties go to the category declared first (Very High, High, Medium, Low).
    pub fn classify(&self, risk: f64) -> Classification {
        let mut best = Classification {
            level: RiskLevel::VeryHigh,
            confidence: 0.0,
        };
        let mut best_degree = f64::NEG_INFINITY;

        for &(level, degree) in self.levels.fuzzify(risk).iter() {
            if degree > best_degree {
                best_degree = degree;
                best = Classification {
                    level,
                    confidence: (degree * 100.0).clamp(0.0, 100.0),
                };
            }
        }

        best
    }
}
