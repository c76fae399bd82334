use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::data::{CelestrakSource, ElementSet, ElementSource, TleFileSource, DEFAULT_SOURCE_URL};
use crate::error::ValidationError;
use crate::orbital::DEFAULT_ALTITUDE_THRESHOLD_KM;
use crate::output::{output_filename, read_results, CsvSink, RunSummary};
use crate::propagation::Sgp4Propagator;
use crate::simulation::{ErrorPolicy, Simulation, SimulationConfig};

/// Element sets older than this relative to the simulated day get a warning
const STALE_ELEMENTS_DAYS: f64 = 30.0;

#[derive(Args, Debug, Clone)]
pub struct AssessArgs {
    /// Catalog number of the first object
    pub primary: String,
    /// Catalog number of the second object
    pub secondary: String,
    /// Day to simulate (YYYY-MM-DD, UTC)
    pub date: String,
    /// Directory the result CSV is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Sampling step in seconds
    #[arg(long, default_value_t = SimulationConfig::DEFAULT_STEP_SECONDS)]
    pub step_seconds: u32,
    /// Simulated span in seconds
    #[arg(long, default_value_t = SimulationConfig::DEFAULT_DURATION_SECONDS)]
    pub duration_seconds: u32,
    /// Mean-altitude difference (km) beyond which orbits count as dissimilar
    #[arg(long, default_value_t = DEFAULT_ALTITUDE_THRESHOLD_KM)]
    pub altitude_threshold_km: f64,
    /// Behaviour when an instant cannot be propagated
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_propagation_error: ErrorPolicy,
    /// Cache directory for downloaded element sets
    #[arg(long, env = "COLLISION_RISK_TLE_CACHE", default_value = "data/cache/tle")]
    pub cache_dir: PathBuf,
    /// Read element sets from a local 2/3-line file instead of downloading
    #[arg(long)]
    pub tle_file: Option<PathBuf>,
    /// Element-set query endpoint
    #[arg(long, env = "COLLISION_RISK_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,
    /// Hide the progress bar
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Result CSV written by `assess`
    pub input: PathBuf,
    /// Print the summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Validated identifiers and date of one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub primary: u32,
    pub secondary: u32,
    pub date: NaiveDate,
}

impl RunRequest {
    pub fn parse(primary: &str, secondary: &str, date: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            primary: parse_catalog_id(primary, "first catalog identifier")?,
            secondary: parse_catalog_id(secondary, "second catalog identifier")?,
            date: parse_date(date)?,
        })
    }
}

fn parse_catalog_id(raw: &str, field: &'static str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    raw.parse()
        .map_err(|_| ValidationError::InvalidIdentifier(raw.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

fn element_source(args: &AssessArgs) -> Result<Box<dyn ElementSource>> {
    match &args.tle_file {
        Some(path) => {
            let source = TleFileSource::open(path)?;
            log::info!("Loaded {} element sets from {:?}", source.len(), path);
            Ok(Box::new(source))
        }
        None => Ok(Box::new(CelestrakSource::new(
            args.source_url.clone(),
            args.cache_dir.clone(),
        )?)),
    }
}

fn fetch(
    source: &dyn ElementSource,
    catalog_id: u32,
    config: &SimulationConfig,
) -> Result<ElementSet> {
    let set = source
        .fetch(catalog_id)
        .with_context(|| format!("failed to retrieve element set for {}", catalog_id))?;

    let age = set.age_days(config.start());
    if age.abs() > STALE_ELEMENTS_DAYS {
        log::warn!(
            "{}: element epoch {} is {:.0} days from {}",
            set.display_name(),
            set.epoch.format("%Y-%m-%d"),
            age.abs(),
            config.date
        );
    }
    Ok(set)
}

/// Run one assessment end to end. Returns the path of the result file.
pub fn run_assessment(args: AssessArgs) -> Result<PathBuf> {
    let request = RunRequest::parse(&args.primary, &args.secondary, &args.date)?;
    let config = SimulationConfig {
        step_seconds: args.step_seconds,
        duration_seconds: args.duration_seconds,
        altitude_threshold_km: args.altitude_threshold_km,
        on_propagation_error: args.on_propagation_error,
        ..SimulationConfig::for_date(request.date)
    };
    config.validate()?;

    if request.primary == request.secondary {
        log::warn!("Both identifiers are {}; separation will be zero", request.primary);
    }

    log::info!("Retrieving element sets...");
    let source = element_source(&args)?;
    let primary = fetch(source.as_ref(), request.primary, &config)?;
    let secondary = fetch(source.as_ref(), request.secondary, &config)?;

    log::info!("Initializing propagator...");
    let mut propagator = Sgp4Propagator::new();
    propagator.load(&primary)?;
    propagator.load(&secondary)?;

    let path = args
        .output_dir
        .join(output_filename(request.primary, request.secondary));
    let mut sink = CsvSink::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(config.sample_count() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{elapsed_precise} {bar:40.cyan/blue} {pos}/{len} {percent}% ETA {eta_precise}",
            )?
            .progress_chars("##-"),
        );
        bar
    };

    let summary = Simulation::new(&propagator, &primary, &secondary, config)
        .run(&mut sink, &progress)?;
    summary.log();

    log::info!("Wrote {} rows to {:?}", summary.rows, path);
    Ok(path)
}

/// Summarize an existing result file.
pub fn run_summary(args: SummaryArgs) -> Result<()> {
    let rows = read_results(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let summary = RunSummary::from_rows(&rows)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.log();
    }
    Ok(())
}
