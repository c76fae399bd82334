//! Result files: CSV sink, reader and run summary

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OutputError;
use crate::fuzzy::RiskLevel;
use crate::simulation::{Outcome, RiskResult};

/// Header row of every result file
pub const HEADER: [&str; 7] = [
    "Time",
    "Degree of Membership to This Category",
    "Membership Category",
    "Distance",
    "Relative velocity",
    "Orbital Similarity",
    "Maneuverability",
];

/// Timestamp format of the `Time` column
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Category written when no rule fired
pub const UNDEFINED_CATEGORY: &str = "Undefined";

/// Category written for instants that could not be propagated
pub const PROPAGATION_FAILED_CATEGORY: &str = "Propagation Failed";

/// Result file name for a pair of catalog identifiers
pub fn output_filename(primary: u32, secondary: u32) -> String {
    format!("collision_risk_results_{}_{}.csv", primary, secondary)
}

/// Destination for the time series, fed in chronological order.
pub trait ResultSink {
    fn record(&mut self, result: &RiskResult) -> Result<(), OutputError>;

    fn finish(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

impl ResultSink for Vec<RiskResult> {
    fn record(&mut self, result: &RiskResult) -> Result<(), OutputError> {
        self.push(result.clone());
        Ok(())
    }
}

/// One CSV row. Empty fields mark values that do not exist for that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Degree of Membership to This Category")]
    pub confidence: Option<f64>,
    #[serde(rename = "Membership Category")]
    pub category: String,
    #[serde(rename = "Distance")]
    pub distance_km: Option<f64>,
    #[serde(rename = "Relative velocity")]
    pub relative_velocity_km_s: Option<f64>,
    #[serde(rename = "Orbital Similarity")]
    pub orbital_similarity: Option<f64>,
    #[serde(rename = "Maneuverability")]
    pub maneuverability: Option<f64>,
}

impl From<&RiskResult> for ResultRow {
    fn from(result: &RiskResult) -> Self {
        let (confidence, category) = match result.outcome {
            Outcome::Classified { classification, .. } => (
                Some(classification.confidence),
                classification.level.to_string(),
            ),
            Outcome::InferenceUndefined => (None, UNDEFINED_CATEGORY.to_string()),
            Outcome::PropagationFailed => (None, PROPAGATION_FAILED_CATEGORY.to_string()),
        };
        let features = result.features.as_ref();

        Self {
            time: result.time.format(TIME_FORMAT).to_string(),
            confidence,
            category,
            distance_km: features.map(|f| f.distance_km),
            relative_velocity_km_s: features.map(|f| f.relative_velocity_km_s),
            orbital_similarity: features.map(|f| f.orbital_similarity),
            maneuverability: features.map(|f| f.maneuverability),
        }
    }
}

/// Comma-delimited result file
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(File::create(path)?)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer and emit the header row
    pub fn new(inner: W) -> Result<Self, OutputError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn record(&mut self, result: &RiskResult) -> Result<(), OutputError> {
        self.writer.serialize(ResultRow::from(result))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read a result file back, checking the header row.
pub fn read_results(path: impl AsRef<Path>) -> Result<Vec<ResultRow>, OutputError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;

    let headers = reader.headers()?;
    if !headers.iter().eq(HEADER.iter().copied()) {
        return Err(OutputError::UnexpectedHeader(
            headers.iter().collect::<Vec<_>>().join(","),
        ));
    }

    reader
        .deserialize()
        .map(|row| row.map_err(OutputError::from))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosestApproach {
    pub time: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityPeak {
    pub level: RiskLevel,
    pub confidence: f64,
    pub time: String,
}

/// Aggregate view of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    /// Rows per risk category
    pub categories: BTreeMap<String, usize>,
    pub undefined: usize,
    pub propagation_failures: usize,
    pub closest_approach: Option<ClosestApproach>,
    /// Most severe category seen, at its highest confidence
    pub peak: Option<SeverityPeak>,
}

impl RunSummary {
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = &'a ResultRow>,
    ) -> Result<Self, OutputError> {
        let mut summary = Self::default();
        for row in rows {
            summary.record(row)?;
        }
        Ok(summary)
    }

    pub fn record(&mut self, row: &ResultRow) -> Result<(), OutputError> {
        self.rows += 1;

        if let Some(distance_km) = row.distance_km {
            let closer = self
                .closest_approach
                .as_ref()
                .map_or(true, |c| distance_km < c.distance_km);
            if closer {
                self.closest_approach = Some(ClosestApproach {
                    time: row.time.clone(),
                    distance_km,
                });
            }
        }

        match row.category.as_str() {
            UNDEFINED_CATEGORY => self.undefined += 1,
            PROPAGATION_FAILED_CATEGORY => self.propagation_failures += 1,
            other => {
                let level: RiskLevel = other
                    .parse()
                    .map_err(|_| OutputError::UnknownCategory(other.to_string()))?;
                *self.categories.entry(level.to_string()).or_default() += 1;

                let confidence = row.confidence.unwrap_or(0.0);
                let replace = self.peak.as_ref().map_or(true, |p| {
                    level < p.level || (level == p.level && confidence > p.confidence)
                });
                if replace {
                    self.peak = Some(SeverityPeak {
                        level,
                        confidence,
                        time: row.time.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.categories.get(level.as_str()).copied().unwrap_or(0)
    }

    pub fn log(&self) {
        log::info!("Summary: {} rows", self.rows);
        for level in RiskLevel::ALL {
            log::info!("  {:<10} {}", level.as_str(), self.count(level));
        }
        if self.undefined > 0 {
            log::warn!("  {} rows with undefined inference", self.undefined);
        }
        if self.propagation_failures > 0 {
            log::warn!("  {} rows failed to propagate", self.propagation_failures);
        }
        if let Some(approach) = &self.closest_approach {
            log::info!(
                "  Closest approach {:.3} km at {}",
                approach.distance_km,
                approach.time
            );
        }
        if let Some(peak) = &self.peak {
            log::info!(
                "  Peak: {} ({:.1}%) at {}",
                peak.level,
                peak.confidence,
                peak.time
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use crate::features::FeatureVector;
    use chrono::{TimeZone, Utc};

    fn classified(
        second: u32,
        level: RiskLevel,
        confidence: f64,
        distance_km: f64,
    ) -> RiskResult {
        RiskResult {
            time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, second).unwrap(),
            outcome: Outcome::Classified {
                risk: 10.0,
                classification: Classification { level, confidence },
            },
            features: Some(FeatureVector {
                distance_km,
                relative_velocity_km_s: 1.5,
                orbital_similarity: 0.9,
                maneuverability: 35.0,
            }),
        }
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename(13777, 2828),
            "collision_risk_results_13777_2828.csv"
        );
    }

    #[test]
    fn test_row_layout() {
        let mut buffer = Vec::new();
        {
            let mut sink = CsvSink::new(&mut buffer).unwrap();
            sink.record(&classified(5, RiskLevel::High, 62.5, 120.0))
                .unwrap();
            sink.record(&RiskResult {
                time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 15).unwrap(),
                outcome: Outcome::InferenceUndefined,
                features: Some(FeatureVector {
                    distance_km: 20000.0,
                    relative_velocity_km_s: 1.0,
                    orbital_similarity: 0.0,
                    maneuverability: 30.0,
                }),
            })
            .unwrap();
            sink.finish().unwrap();
        }

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Time,Degree of Membership to This Category,Membership Category,Distance,Relative velocity,Orbital Similarity,Maneuverability"
        );
        assert_eq!(lines[1], "2024-03-01 12:00:05 UTC,62.5,High,120.0,1.5,0.9,35.0");
        assert_eq!(lines[2], "2024-03-01 12:00:15 UTC,,Undefined,20000.0,1.0,0.0,30.0");
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        assert!(matches!(
            read_results(&path),
            Err(OutputError::UnexpectedHeader(_))
        ));
    }

    #[test]
    fn test_summary_counts_and_peaks() {
        let results = [
            classified(0, RiskLevel::Medium, 80.0, 900.0),
            classified(10, RiskLevel::High, 40.0, 300.0),
            classified(20, RiskLevel::High, 70.0, 250.0),
            classified(30, RiskLevel::Low, 99.0, 6000.0),
            RiskResult {
                time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 40).unwrap(),
                outcome: Outcome::PropagationFailed,
                features: None,
            },
        ];
        let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
        let summary = RunSummary::from_rows(&rows).unwrap();

        assert_eq!(summary.rows, 5);
        assert_eq!(summary.count(RiskLevel::High), 2);
        assert_eq!(summary.count(RiskLevel::VeryHigh), 0);
        assert_eq!(summary.propagation_failures, 1);

        let approach = summary.closest_approach.unwrap();
        assert_eq!(approach.distance_km, 250.0);
        assert_eq!(approach.time, "2024-03-01 12:00:20 UTC");

        let peak = summary.peak.unwrap();
        assert_eq!(peak.level, RiskLevel::High);
        assert_eq!(peak.confidence, 70.0);
    }

    #[test]
    fn test_summary_rejects_unknown_category() {
        let mut row = ResultRow::from(&classified(0, RiskLevel::Low, 50.0, 5000.0));
        row.category = "Catastrophic".to_string();

        let mut summary = RunSummary::default();
        assert!(matches!(
            summary.record(&row),
            Err(OutputError::UnknownCategory(_))
        ));
    }
}
