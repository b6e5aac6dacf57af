//! Borefield g-functions and their cache.
//!
//! A g-function relates the heat extraction history of a borefield to the
//! temperature change at the borehole wall. Computing one is expensive, so
//! sizing goes through a [`GFunctionCache`] that stores curves per depth on a
//! logarithmic [`TimeGrid`] and answers nearby depths by interpolation.
//!
//! The actual computation is injected as a [`GFunctionCalculator`]. The
//! crate ships [`FiniteLineSource`], a uniform heat flux finite line source
//! with spatial superposition. Any closure with the calculator signature
//! works too:
//!
//! ```
//! use twine_borefield::support::{
//!     borehole::BoreholeField,
//!     gfunction::{GFunctionCalculator, GFunctionError, GFunctionOptions},
//! };
//!
//! let logarithmic = |_: &BoreholeField, _: f64, times: &[f64], _: &GFunctionOptions| {
//!     Ok::<_, GFunctionError>(times.iter().map(|t| 0.5 * t.ln()).collect::<Vec<_>>())
//! };
//! # fn takes(_: impl GFunctionCalculator) {}
//! # takes(logarithmic);
//! ```

mod cache;
mod history;
mod line_source;
mod precomputed;
mod time_grid;

pub use cache::{CacheOptions, GFunctionCache};
pub use line_source::FiniteLineSource;
pub use precomputed::PrecomputedGFunctions;
pub use time_grid::TimeGrid;

use thiserror::Error;

use crate::support::{borehole::BoreholeField, pipe::BoxedError};

/// Solver tag forwarded to external calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GFunctionMethod {
    /// Equivalent-borehole reduction.
    #[default]
    Equivalent,
    /// Similarities between borehole pairs.
    Similarities,
    /// Full segment-to-segment interaction.
    Detailed,
}

/// Options passed with every computation request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GFunctionOptions {
    pub method: GFunctionMethod,
    /// Below this time (s) the g-function is taken as linear from the origin.
    pub linear_threshold: Option<f64>,
    /// Replace the line-source self response by a cylindrical heat source.
    pub cylindrical_correction: bool,
}

/// Computes g-values of a borefield at the given times (s).
pub trait GFunctionCalculator {
    /// Returns one g-value per entry of `times`, in the same order.
    ///
    /// # Errors
    ///
    /// Returns a [`GFunctionError`] if the field cannot be evaluated.
    fn compute(
        &self,
        field: &BoreholeField,
        alpha: f64,
        times: &[f64],
        options: &GFunctionOptions,
    ) -> Result<Vec<f64>, GFunctionError>;
}

impl<F> GFunctionCalculator for F
where
    F: Fn(&BoreholeField, f64, &[f64], &GFunctionOptions) -> Result<Vec<f64>, GFunctionError>,
{
    fn compute(
        &self,
        field: &BoreholeField,
        alpha: f64,
        times: &[f64],
        options: &GFunctionOptions,
    ) -> Result<Vec<f64>, GFunctionError> {
        self(field, alpha, times, options)
    }
}

/// Errors raised while producing g-values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GFunctionError {
    /// The field cannot be evaluated, e.g. the radius exceeds the spacing.
    #[error("degenerate borefield: {0}")]
    DegenerateField(&'static str),

    /// The injected calculator failed.
    #[error("g-function computation failed")]
    Compute(#[source] BoxedError),

    /// The calculator returned `NaN` or an infinite value.
    #[error("g-function value at index {0} is not finite")]
    NonFinite(usize),

    /// The calculator returned the wrong number of values.
    #[error("expected {expected} g-values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A requested time is negative or not finite.
    #[error("requested times must be finite and non-negative")]
    InvalidTimes,

    /// A precomputed dataset is inconsistent.
    #[error("invalid precomputed dataset: {0}")]
    Dataset(String),

    /// Interpolating stored curves failed.
    #[error("g-value interpolation failed")]
    Interpolation(#[from] crate::support::table::TableError),
}

/// Non-fatal conditions noticed by the cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GFunctionWarning {
    /// Some g-values were zero or negative at this depth (m).
    NegativeValues { depth: f64 },

    /// A precomputed dataset did not cover this depth (m); computed instead.
    OutOfRange { depth: f64 },
}
