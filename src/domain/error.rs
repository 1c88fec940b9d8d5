use thiserror::Error;

use crate::optimizer::FitError;

/// Errors surfaced by cluster construction and simulation runs
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid cluster configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Characteristic curve fit failed: {0}")]
    CurveFit(#[from] FitError),

    #[error("End-of-life efficiency loss gives a non-positive degradation threshold ({0} V)")]
    InvalidEndOfLife(f64),

    #[error("Non-physical {quantity} at timestep {index}: {value}")]
    Domain {
        quantity: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Expected {expected} {quantity} samples, got {actual}")]
    LengthMismatch {
        quantity: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Input power series is empty")]
    EmptyInput,
}

impl SimulationError {
    /// Configuration errors are fatal and raised before any timestep runs
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidConfig(_)
                | SimulationError::CurveFit(_)
                | SimulationError::InvalidEndOfLife(_)
        )
    }
}
