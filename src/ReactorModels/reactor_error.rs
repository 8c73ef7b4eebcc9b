//! Error types of the reactor simulator.
use crate::Kinetics::rate_expressions::KineticsError;
use crate::NumericalMethods::ode_api::NumericalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// where a run stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureStage {
    /// configuration and pre-integration checks
    PreCheck,
    /// inside the numerical primitive; `window` is the time window of a dynamic run
    Integration { window: Option<usize> },
    /// algebraic (root) solve of a steady residual model
    RootSolve,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::PreCheck => write!(f, "pre-check"),
            FailureStage::Integration { window: None } => write!(f, "integration"),
            FailureStage::Integration { window: Some(w) } => {
                write!(f, "integration (time window {})", w)
            }
            FailureStage::RootSolve => write!(f, "root solve"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),
    #[error("Cannot parse reaction: {0}")]
    ReactionParse(String),
    #[error("Kinetics error: {0}")]
    Kinetics(#[from] KineticsError),
    #[error("Invalid local state at {location}: {message}")]
    InvalidLocalState { location: String, message: String },
    #[error("Run of model {variant} failed at {stage}: {message}")]
    RunFailed {
        variant: String,
        stage: FailureStage,
        message: String,
    },
    #[error("Numerical error: {0}")]
    Numerical(#[from] NumericalError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReactorError {
    /// true for errors raised by configuration checks
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ReactorError::MissingData(_)
                | ReactorError::InvalidConfiguration(_)
                | ReactorError::UnknownSpecies(_)
                | ReactorError::ReactionParse(_)
                | ReactorError::Kinetics(_)
                | ReactorError::RunFailed {
                    stage: FailureStage::PreCheck,
                    ..
                }
        )
    }
}

/// the assemblers report invalid states through the numerical primitive
impl From<ReactorError> for NumericalError {
    fn from(err: ReactorError) -> Self {
        match err {
            ReactorError::Numerical(inner) => inner,
            other => NumericalError::InvalidState {
                x: f64::NAN,
                message: other.to_string(),
            },
        }
    }
}
