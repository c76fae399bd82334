//! Error types shared across the risk pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Rejected user input. Raised by the invocation shell before the pipeline runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid catalog identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("invalid date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("step-seconds must be > 0")]
    ZeroStep,

    #[error("step-seconds ({step}) exceeds duration-seconds ({duration})")]
    StepExceedsDuration { step: u32, duration: u32 },

    #[error("altitude threshold must be a non-negative number of km, got {0}")]
    InvalidThreshold(f64),
}

/// Problems turning two-line text into an [`ElementSet`](crate::data::ElementSet).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementSetError {
    #[error("malformed two-line element set: {0}")]
    Malformed(String),

    #[error("mean motion must be positive, got {0} rev/day")]
    NonPositiveMeanMotion(f64),
}

/// Element-set retrieval failures.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("no element set found for catalog {0}")]
    NotFound(u32),

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for catalog {id} failed: {source}")]
    Network {
        id: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("request for catalog {id} returned HTTP {status}")]
    Http { id: u32, status: u16 },

    #[error("element data for catalog {id} is unusable: {source}")]
    Parse {
        id: u32,
        #[source]
        source: ElementSetError,
    },

    #[error("element file {path:?} is unusable: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: ElementSetError,
    },

    #[error("element cache {path:?}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The propagator could not produce a state for an (object, instant) pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    #[error("no element set loaded for catalog {0}")]
    NotLoaded(u32),

    #[error("element set for catalog {id} rejected by SGP4: {reason}")]
    InvalidElements { id: u32, reason: String },

    #[error("instant {0} cannot be represented for propagation")]
    InvalidInstant(String),

    #[error("SGP4 failed for catalog {id} at {at}: {reason}")]
    Sgp4 { id: u32, at: String, reason: String },
}

/// Fuzzy inference could not produce a crisp output.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InferenceError {
    #[error("no rule fired for the given inputs; the centroid is undefined")]
    Undefined,
}

/// Result sink failures.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected header row: {0}")]
    UnexpectedHeader(String),

    #[error("unknown risk category '{0}'")]
    UnknownCategory(String),
}

/// Anything that stops a simulation run part-way.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Propagation(#[from] PropagationError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
