use thiserror::Error;

use crate::support::{
    constraint::{ConstraintError, NonNegative, check_all},
    table::TableError,
};

/// Errors raised while building or updating a load profile.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// An array does not have the length its variant requires.
    #[error("{name} has {actual} values, expected {expected}")]
    Length {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An array entry is negative or not a number.
    #[error("{name}[{index}]: {source}")]
    Value {
        name: &'static str,
        index: usize,
        #[source]
        source: ConstraintError,
    },

    #[error("start month {0} is outside 1..=12")]
    StartMonth(u8),

    #[error("the simulation period must be at least one year")]
    SimulationPeriod,

    #[error("peak durations must be positive and at most one month")]
    PeakDuration,

    /// A seasonal efficiency or table entry is not strictly positive.
    #[error("invalid efficiency: {0}")]
    Efficiency(#[source] ConstraintError),

    #[error(transparent)]
    EfficiencyTable(#[from] TableError),

    /// Operating temperatures do not match the simulation horizon.
    #[error("expected {expected} operating temperatures, got {actual}")]
    Temperatures { expected: usize, actual: usize },

    #[error(transparent)]
    Calendar(#[from] jiff::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A load file line could not be read.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Checks that `values` holds `expected` non-negative entries.
pub(super) fn check_series(
    name: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), LoadError> {
    if values.len() != expected {
        return Err(LoadError::Length {
            name,
            expected,
            actual: values.len(),
        });
    }
    check_non_negative(name, values)
}

pub(super) fn check_non_negative(name: &'static str, values: &[f64]) -> Result<(), LoadError> {
    check_all::<f64, NonNegative>(values)
        .map_err(|(index, source)| LoadError::Value { name, index, source })
}
