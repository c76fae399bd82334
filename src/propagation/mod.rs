//! Orbit propagation
//!
//! The risk pipeline only sees the [`Propagator`] trait: given an element set
//! and a UTC instant it returns position and velocity in an Earth-centred
//! inertial frame. [`Sgp4Propagator`] is the production implementation,
//! backed by satkit's SGP4.

mod propagator;

pub use propagator::*;
