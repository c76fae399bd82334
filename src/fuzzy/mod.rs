//! Fuzzy inference system for collision risk
//!
//! The system maps four crisp inputs (distance, relative velocity, orbital
//! similarity, maneuverability) to a risk value in [0, 100]:
//!
//! - **membership**: triangular membership functions and fuzzy variables
//! - **variables**: label enums and the breakpoint tables
//! - **rules**: the rule base, stored as AND/OR antecedent trees
//! - **engine**: fuzzification, min/max rule evaluation, max aggregation and
//!   centroid defuzzification
//!
//! Low risk values are the dangerous end of the scale: `very_high` sits at 0
//! and `low` at 75.

mod engine;
mod membership;
mod rules;
mod variables;

pub use engine::InferenceEngine;
pub use membership::FuzzyVariable;
pub use variables::*;
