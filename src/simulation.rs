//! Day-long risk time series for one pair of objects

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indicatif::ProgressBar;

use crate::classifier::{Classification, RiskClassifier};
use crate::data::ElementSet;
use crate::error::{InferenceError, PropagationError, RunError, ValidationError};
use crate::features::{FeatureVector, PairProfile};
use crate::fuzzy::InferenceEngine;
use crate::orbital::DEFAULT_ALTITUDE_THRESHOLD_KM;
use crate::output::{ResultRow, ResultSink, RunSummary};
use crate::propagation::Propagator;

/// What to do when one instant cannot be propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// Stop the whole run
    #[default]
    Abort,
    /// Write a marker row for that instant and carry on
    Mark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Calendar day to simulate, starting at 00:00:00 UTC
    pub date: NaiveDate,
    pub step_seconds: u32,
    pub duration_seconds: u32,
    pub altitude_threshold_km: f64,
    pub on_propagation_error: ErrorPolicy,
}

impl SimulationConfig {
    pub const DEFAULT_STEP_SECONDS: u32 = 10;
    pub const DEFAULT_DURATION_SECONDS: u32 = 86_400;

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            step_seconds: Self::DEFAULT_STEP_SECONDS,
            duration_seconds: Self::DEFAULT_DURATION_SECONDS,
            altitude_threshold_km: DEFAULT_ALTITUDE_THRESHOLD_KM,
            on_propagation_error: ErrorPolicy::Abort,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.step_seconds == 0 {
            return Err(ValidationError::ZeroStep);
        }
        if self.step_seconds > self.duration_seconds {
            return Err(ValidationError::StepExceedsDuration {
                step: self.step_seconds,
                duration: self.duration_seconds,
            });
        }
        if !(self.altitude_threshold_km >= 0.0) {
            return Err(ValidationError::InvalidThreshold(self.altitude_threshold_km));
        }
        Ok(())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.date.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn sample_count(&self) -> usize {
        self.duration_seconds.div_ceil(self.step_seconds) as usize
    }

    /// Sample instants in chronological order
    pub fn sample_times(&self) -> impl Iterator<Item = DateTime<Utc>> {
        let start = self.start();
        (0..self.duration_seconds)
            .step_by(self.step_seconds as usize)
            .map(move |t| start + chrono::Duration::seconds(i64::from(t)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Classified {
        risk: f64,
        classification: Classification,
    },
    /// No rule fired; there is no crisp risk for this instant
    InferenceUndefined,
    /// Written only under [`ErrorPolicy::Mark`]
    PropagationFailed,
}

/// One row of the time series.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskResult {
    pub time: DateTime<Utc>,
    pub outcome: Outcome,
    /// Absent when propagation failed
    pub features: Option<FeatureVector>,
}

/// Propagate, extract, infer and classify over a fixed time grid.
///
/// The engine, classifier and pair profile are built once and reused for
/// every sample.
pub struct Simulation<'a, P> {
    propagator: &'a P,
    primary: &'a ElementSet,
    secondary: &'a ElementSet,
    profile: PairProfile,
    engine: InferenceEngine,
    classifier: RiskClassifier,
    config: SimulationConfig,
}

impl<'a, P: Propagator> Simulation<'a, P> {
    pub fn new(
        propagator: &'a P,
        primary: &'a ElementSet,
        secondary: &'a ElementSet,
        config: SimulationConfig,
    ) -> Self {
        let profile = PairProfile::new(primary, secondary, config.altitude_threshold_km);
        log::debug!(
            "Pair profile: similarity {:.4}, maneuverability {:.1}",
            profile.orbital_similarity,
            profile.maneuverability
        );

        Self {
            propagator,
            primary,
            secondary,
            profile,
            engine: InferenceEngine::standard(),
            classifier: RiskClassifier::new(),
            config,
        }
    }

    /// Assess a single instant.
    pub fn assess(&self, time: DateTime<Utc>) -> Result<RiskResult, PropagationError> {
        let a = self.propagator.propagate(self.primary, time)?;
        let b = self.propagator.propagate(self.secondary, time)?;
        let features = self.profile.features(&a, &b);

        let outcome = match self.engine.infer(&features) {
            Ok(risk) => Outcome::Classified {
                risk,
                classification: self.classifier.classify(risk),
            },
            Err(InferenceError::Undefined) => {
                log::debug!(
                    "{}: inference undefined at distance {:.1} km",
                    time,
                    features.distance_km
                );
                Outcome::InferenceUndefined
            }
        };

        Ok(RiskResult {
            time,
            outcome,
            features: Some(features),
        })
    }

    /// Run the full grid, streaming rows to `sink` in chronological order.
    pub fn run<S: ResultSink + ?Sized>(
        &self,
        sink: &mut S,
        progress: &ProgressBar,
    ) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();
        progress.set_length(self.config.sample_count() as u64);

        log::info!(
            "Assessing {} vs {} on {} ({} samples every {} s)",
            self.primary.display_name(),
            self.secondary.display_name(),
            self.config.date,
            self.config.sample_count(),
            self.config.step_seconds
        );

        for time in self.config.sample_times() {
            let result = match self.assess(time) {
                Ok(result) => result,
                Err(e) => match self.config.on_propagation_error {
                    ErrorPolicy::Abort => {
                        progress.abandon();
                        return Err(e.into());
                    }
                    ErrorPolicy::Mark => {
                        log::warn!("{}", e);
                        RiskResult {
                            time,
                            outcome: Outcome::PropagationFailed,
                            features: None,
                        }
                    }
                },
            };

            sink.record(&result)?;
            summary.record(&ResultRow::from(&result))?;
            progress.inc(1);
        }

        sink.finish()?;
        progress.finish_and_clear();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::*;
    use crate::fuzzy::RiskLevel;
    use crate::output::{read_results, CsvSink, HEADER, TIME_FORMAT};
    use crate::propagation::StateSample;
    use nalgebra::Vector3;

    /// Holds the pair at a fixed separation and relative speed.
    struct FixedGeometry {
        distance_km: f64,
        relative_velocity_km_s: f64,
        fail_at: Option<DateTime<Utc>>,
    }

    impl FixedGeometry {
        fn new(distance_km: f64, relative_velocity_km_s: f64) -> Self {
            Self {
                distance_km,
                relative_velocity_km_s,
                fail_at: None,
            }
        }
    }

    impl Propagator for FixedGeometry {
        fn propagate(
            &self,
            set: &ElementSet,
            at: DateTime<Utc>,
        ) -> Result<StateSample, PropagationError> {
            if self.fail_at == Some(at) {
                return Err(PropagationError::Sgp4 {
                    id: set.catalog_id,
                    at: at.to_rfc3339(),
                    reason: "test failure".to_string(),
                });
            }

            let (offset, dv) = if set.catalog_id == 1 {
                (0.0, 0.0)
            } else {
                (self.distance_km, self.relative_velocity_km_s)
            };
            Ok(StateSample {
                position_km: Vector3::new(7000.0, offset, 0.0),
                velocity_km_s: Vector3::new(0.0, 7.5, dv),
                time: at,
            })
        }
    }

    fn pair() -> (ElementSet, ElementSet) {
        (
            synthetic(1, 14.0, 0.001, 98.0),
            synthetic(2, 14.0, 0.001, 98.0),
        )
    }

    fn config() -> SimulationConfig {
        SimulationConfig::for_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn run_fixed(propagator: &FixedGeometry, config: SimulationConfig) -> Vec<RiskResult> {
        let (a, b) = pair();
        let sim = Simulation::new(propagator, &a, &b, config);
        let mut rows: Vec<RiskResult> = Vec::new();
        sim.run(&mut rows, &ProgressBar::hidden()).unwrap();
        rows
    }

    fn level(result: &RiskResult) -> Option<RiskLevel> {
        match result.outcome {
            Outcome::Classified { classification, .. } => Some(classification.level),
            _ => None,
        }
    }

    #[test]
    fn test_time_grid() {
        let config = config();
        assert_eq!(config.sample_count(), 8640);

        let times: Vec<_> = config.sample_times().collect();
        assert_eq!(times.len(), 8640);
        assert_eq!(
            times[0].format(TIME_FORMAT).to_string(),
            "2024-03-01 00:00:00 UTC"
        );
        assert_eq!(
            times[8639].format(TIME_FORMAT).to_string(),
            "2024-03-01 23:59:50 UTC"
        );
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.step_seconds = 0;
        assert_eq!(bad.validate(), Err(ValidationError::ZeroStep));

        let mut bad = config();
        bad.step_seconds = 100_000;
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::StepExceedsDuration { .. })
        ));

        let mut bad = config();
        bad.altitude_threshold_km = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_very_close_all_day_is_very_high() {
        let rows = run_fixed(&FixedGeometry::new(50.0, 1.0), config());

        assert_eq!(rows.len(), 8640);
        assert!(rows.iter().all(|r| level(r) == Some(RiskLevel::VeryHigh)));

        let features = rows[0].features.unwrap();
        assert!((features.distance_km - 50.0).abs() < 1e-9);
        assert!((features.relative_velocity_km_s - 1.0).abs() < 1e-12);
        assert_eq!(features.orbital_similarity, 1.0);
    }

    #[test]
    fn test_far_all_day_is_low() {
        let rows = run_fixed(&FixedGeometry::new(8000.0, 0.5), config());

        assert_eq!(rows.len(), 8640);
        for row in &rows {
            match row.outcome {
                Outcome::Classified {
                    risk,
                    classification,
                } => {
                    assert_eq!(classification.level, RiskLevel::Low);
                    assert!((risk - 75.0).abs() < 0.5);
                    assert!(classification.confidence > 95.0);
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_out_of_domain_rows_are_marked_undefined() {
        let mut config = config();
        config.duration_seconds = 600;
        let rows = run_fixed(&FixedGeometry::new(20_000.0, 1.0), config);

        assert_eq!(rows.len(), 60);
        assert!(rows
            .iter()
            .all(|r| r.outcome == Outcome::InferenceUndefined && r.features.is_some()));
    }

    #[test]
    fn test_propagation_failure_aborts_by_default() {
        let (a, b) = pair();
        let config = config();
        let mut propagator = FixedGeometry::new(50.0, 1.0);
        propagator.fail_at = Some(config.start() + chrono::Duration::seconds(30));

        let sim = Simulation::new(&propagator, &a, &b, config);
        let mut rows: Vec<RiskResult> = Vec::new();
        let result = sim.run(&mut rows, &ProgressBar::hidden());

        assert!(matches!(result, Err(RunError::Propagation(_))));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_propagation_failure_marked_when_configured() {
        let (a, b) = pair();
        let mut config = config();
        config.duration_seconds = 60;
        config.on_propagation_error = ErrorPolicy::Mark;
        let mut propagator = FixedGeometry::new(50.0, 1.0);
        propagator.fail_at = Some(config.start() + chrono::Duration::seconds(30));

        let sim = Simulation::new(&propagator, &a, &b, config);
        let mut rows: Vec<RiskResult> = Vec::new();
        let summary = sim.run(&mut rows, &ProgressBar::hidden()).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[3].outcome, Outcome::PropagationFailed);
        assert!(rows[3].features.is_none());
        assert_eq!(summary.rows, 6);
        assert_eq!(summary.propagation_failures, 1);
    }

    #[test]
    fn test_csv_round_trip_full_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let (a, b) = pair();
        let propagator = FixedGeometry::new(300.0, 8.0);

        let sim = Simulation::new(&propagator, &a, &b, config());
        let mut sink = CsvSink::create(&path).unwrap();
        let summary = sim.run(&mut sink, &ProgressBar::hidden()).unwrap();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next().unwrap(), HEADER.join(","));

        let rows = read_results(&path).unwrap();
        assert_eq!(rows.len(), 8640);
        assert_eq!(summary.rows, 8640);

        let expected: Vec<String> = config()
            .sample_times()
            .map(|t| t.format(TIME_FORMAT).to_string())
            .collect();
        let actual: Vec<String> = rows.iter().map(|r| r.time.clone()).collect();
        assert_eq!(actual, expected);

        assert!((rows[0].distance_km.unwrap() - 300.0).abs() < 1e-9);
        assert!(rows.iter().all(|r| r.confidence.is_some()));
    }
}
