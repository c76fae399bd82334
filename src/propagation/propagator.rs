//! SGP4 propagation using satkit

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::Vector3;
use satkit::sgp4::{sgp4, SGP4Error};

use crate::data::ElementSet;
use crate::error::PropagationError;

/// Propagated state of one object at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSample {
    /// Position in the TEME frame (kilometers)
    pub position_km: Vector3<f64>,
    /// Velocity in the TEME frame (km/s)
    pub velocity_km_s: Vector3<f64>,
    pub time: DateTime<Utc>,
}

/// Produces an object's state at a requested instant.
pub trait Propagator {
    fn propagate(
        &self,
        set: &ElementSet,
        at: DateTime<Utc>,
    ) -> Result<StateSample, PropagationError>;
}

/// SGP4 propagator over a set of loaded element sets
///
/// Both objects of a pair are propagated into the same frame at the same
/// instant, so distances and relative speeds do not depend on the choice of
/// inertial frame.
#[derive(Default)]
pub struct Sgp4Propagator {
    /// satkit models indexed by catalog number
    tles: HashMap<u32, satkit::TLE>,
}

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the SGP4 model for an element set
    pub fn load(&mut self, set: &ElementSet) -> Result<(), PropagationError> {
        let tle = satkit::TLE::load_2line(&set.line1, &set.line2).map_err(|e| {
            PropagationError::InvalidElements {
                id: set.catalog_id,
                reason: e.to_string(),
            }
        })?;
        self.tles.insert(set.catalog_id, tle);
        log::debug!("Loaded SGP4 model for {}", set.display_name());
        Ok(())
    }

    /// Get TLE count
    pub fn tle_count(&self) -> usize {
        self.tles.len()
    }
}

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        set: &ElementSet,
        at: DateTime<Utc>,
    ) -> Result<StateSample, PropagationError> {
        let tle = self
            .tles
            .get(&set.catalog_id)
            .ok_or(PropagationError::NotLoaded(set.catalog_id))?;
        let instant = to_instant(at)?;

        // sgp4 updates its internal state, so work on a copy
        let mut tle = tle.clone();
        let (pos, vel, errors) = sgp4(&mut tle, &[instant]);

        // Failures come back per instant with a zeroed state
        match errors.first() {
            Some(SGP4Error::SGP4Success) => {}
            Some(err) => {
                return Err(PropagationError::Sgp4 {
                    id: set.catalog_id,
                    at: at.to_rfc3339(),
                    reason: err.to_string(),
                })
            }
            None => {
                return Err(PropagationError::Sgp4 {
                    id: set.catalog_id,
                    at: at.to_rfc3339(),
                    reason: "no state returned".to_string(),
                })
            }
        }

        // satkit reports meters and m/s
        let pos = pos.column(0);
        let vel = vel.column(0);

        Ok(StateSample {
            position_km: Vector3::new(pos[0], pos[1], pos[2]) / 1000.0,
            velocity_km_s: Vector3::new(vel[0], vel[1], vel[2]) / 1000.0,
            time: at,
        })
    }
}

fn to_instant(at: DateTime<Utc>) -> Result<satkit::Instant, PropagationError> {
    let seconds = at.second() as f64 + at.nanosecond() as f64 * 1.0e-9;
    satkit::Instant::from_datetime(
        at.year(),
        at.month() as i32,
        at.day() as i32,
        at.hour() as i32,
        at.minute() as i32,
        seconds,
    )
    .map_err(|_| PropagationError::InvalidInstant(at.to_rfc3339()))
}
