//! Orbital element sets parsed from two-line element text

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ElementSetError;

/// Mean orbital elements for one catalogued object at a reference epoch.
///
/// Angles are in degrees and mean motion in revolutions per day, as they
/// appear in the two-line format. The raw lines are kept so the
/// propagator can rebuild its own model from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSet {
    pub catalog_id: u32,
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
    /// Revolutions per day
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    /// Right ascension of the ascending node
    pub raan: f64,
    pub arg_of_perigee: f64,
    pub epoch: DateTime<Utc>,
}

impl ElementSet {
    /// Parse a single two-line element set, with an optional name line.
    pub fn from_lines(
        name: Option<String>,
        line1: &str,
        line2: &str,
    ) -> Result<Self, ElementSetError> {
        let tle = satkit::TLE::load_2line(line1, line2)
            .map_err(|e| ElementSetError::Malformed(e.to_string()))?;

        let catalog_id = u32::try_from(tle.sat_num).map_err(|_| {
            ElementSetError::Malformed(format!("catalog number {} out of range", tle.sat_num))
        })?;

        let set = Self {
            catalog_id,
            name: name.filter(|n| !n.is_empty()),
            line1: line1.to_string(),
            line2: line2.to_string(),
            mean_motion: tle.mean_motion,
            eccentricity: tle.eccen,
            inclination: tle.inclination,
            raan: tle.raan,
            arg_of_perigee: tle.arg_of_perigee,
            epoch: instant_to_utc(&tle.epoch)?,
        };
        set.validate()?;
        Ok(set)
    }

    /// Reject element sets the orbital-mechanics helpers cannot work with.
    pub fn validate(&self) -> Result<(), ElementSetError> {
        if !self.mean_motion.is_finite() || self.mean_motion <= 0.0 {
            return Err(ElementSetError::NonPositiveMeanMotion(self.mean_motion));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementSetError::Malformed(format!(
                "eccentricity {} outside [0, 1)",
                self.eccentricity
            )));
        }
        Ok(())
    }

    /// Display name (falls back to the catalog number)
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", self.catalog_id))
    }

    /// Days between the element epoch and `at` (positive when `at` is later)
    pub fn age_days(&self, at: DateTime<Utc>) -> f64 {
        (at - self.epoch).num_seconds() as f64 / 86_400.0
    }
}

/// Parse every element set in a block of 2-line or 3-line text.
///
/// Name lines are optional and may carry the `0 ` prefix used by 3LE files.
pub fn parse_element_text(text: &str) -> Result<Vec<ElementSet>, ElementSetError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut sets = Vec::new();
    let mut name: Option<String> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("1 ") {
            let line2 = lines
                .get(i + 1)
                .filter(|l| l.starts_with("2 "))
                .ok_or_else(|| {
                    ElementSetError::Malformed(format!("line 1 without line 2: '{}'", line))
                })?;
            sets.push(ElementSet::from_lines(name.take(), line, line2)?);
            i += 2;
        } else if line.starts_with("2 ") {
            return Err(ElementSetError::Malformed(format!(
                "line 2 without line 1: '{}'",
                line
            )));
        } else {
            let trimmed = line.trim();
            name = Some(trimmed.strip_prefix("0 ").unwrap_or(trimmed).to_string());
            i += 1;
        }
    }

    Ok(sets)
}

fn instant_to_utc(instant: &satkit::Instant) -> Result<DateTime<Utc>, ElementSetError> {
    let (year, month, day, hour, min, sec) = instant.as_datetime();
    let sec = sec as f64;
    let whole = sec.floor();
    let nanos = ((sec - whole) * 1.0e9).round().min(999_999_999.0) as u32;

    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|d| d.and_hms_nano_opt(hour as u32, min as u32, whole as u32, nanos))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            ElementSetError::Malformed(format!(
                "epoch {:04}-{:02}-{:02} {:02}:{:02}:{} is not a valid date",
                year, month, day, hour, min, sec
            ))
        })
}
