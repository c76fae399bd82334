//! Rule base as data: antecedent trees over (variable, label) terms

use super::membership::Memberships;
use super::variables::{
    DistanceLabel, ManeuverabilityLabel, RiskLevel, SimilarityLabel, VelocityLabel,
};

/// A single "variable is label" proposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Distance(DistanceLabel),
    RelativeVelocity(VelocityLabel),
    OrbitalSimilarity(SimilarityLabel),
    Maneuverability(ManeuverabilityLabel),
}

/// Fuzzified inputs for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzifiedInputs {
    pub distance: Memberships<DistanceLabel>,
    pub relative_velocity: Memberships<VelocityLabel>,
    pub orbital_similarity: Memberships<SimilarityLabel>,
    pub maneuverability: Memberships<ManeuverabilityLabel>,
}

impl Term {
    pub fn degree(&self, inputs: &FuzzifiedInputs) -> f64 {
        match *self {
            Term::Distance(l) => inputs.distance.degree(l),
            Term::RelativeVelocity(l) => inputs.relative_velocity.degree(l),
            Term::OrbitalSimilarity(l) => inputs.orbital_similarity.degree(l),
            Term::Maneuverability(l) => inputs.maneuverability.degree(l),
        }
    }
}

/// Boolean combination of terms. AND is `min`, OR is `max`.
#[derive(Debug, Clone, PartialEq)]
pub enum Antecedent {
    Is(Term),
    And(Vec<Antecedent>),
    Or(Vec<Antecedent>),
}

impl Antecedent {
    pub fn and(self, other: Antecedent) -> Antecedent {
        match self {
            Antecedent::And(mut parts) => {
                parts.push(other);
                Antecedent::And(parts)
            }
            first => Antecedent::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Antecedent) -> Antecedent {
        match self {
            Antecedent::Or(mut parts) => {
                parts.push(other);
                Antecedent::Or(parts)
            }
            first => Antecedent::Or(vec![first, other]),
        }
    }

    /// Truth degree in [0, 1]
    pub fn truth(&self, inputs: &FuzzifiedInputs) -> f64 {
        match self {
            Antecedent::Is(term) => term.degree(inputs),
            Antecedent::And(parts) => parts
                .iter()
                .map(|p| p.truth(inputs))
                .fold(1.0, f64::min),
            Antecedent::Or(parts) => parts
                .iter()
                .map(|p| p.truth(inputs))
                .fold(0.0, f64::max),
        }
    }
}

impl From<Term> for Antecedent {
    fn from(term: Term) -> Self {
        Antecedent::Is(term)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub antecedent: Antecedent,
    pub consequent: RiskLevel,
}

impl Rule {
    pub fn new(antecedent: impl Into<Antecedent>, consequent: RiskLevel) -> Self {
        Self {
            antecedent: antecedent.into(),
            consequent,
        }
    }

    /// Firing strength for one sample
    pub fn strength(&self, inputs: &FuzzifiedInputs) -> f64 {
        self.antecedent.truth(inputs)
    }
}

fn distance(label: DistanceLabel) -> Antecedent {
    Antecedent::Is(Term::Distance(label))
}

fn velocity(label: VelocityLabel) -> Antecedent {
    Antecedent::Is(Term::RelativeVelocity(label))
}

/// The seven collision-risk rules. All of them contribute to every sample.
pub fn collision_rules() -> Vec<Rule> {
    vec![
        Rule::new(distance(DistanceLabel::VeryClose), RiskLevel::VeryHigh),
        Rule::new(distance(DistanceLabel::Close), RiskLevel::High),
        Rule::new(distance(DistanceLabel::Moderate), RiskLevel::Medium),
        Rule::new(distance(DistanceLabel::Far), RiskLevel::Low),
        Rule::new(
            velocity(VelocityLabel::Fast)
                .and(distance(DistanceLabel::Close))
                .and(
                    Antecedent::Is(Term::OrbitalSimilarity(SimilarityLabel::Similar))
                        .or(Term::Maneuverability(ManeuverabilityLabel::Low).into()),
                ),
            RiskLevel::VeryHigh,
        ),
        Rule::new(
            distance(DistanceLabel::Close).and(velocity(VelocityLabel::Fast)),
            RiskLevel::High,
        ),
        Rule::new(
            Antecedent::Is(Term::Maneuverability(ManeuverabilityLabel::High))
                .and(distance(DistanceLabel::Moderate))
                .and(velocity(VelocityLabel::Moderate)),
            RiskLevel::Low,
        ),
    ]
}
