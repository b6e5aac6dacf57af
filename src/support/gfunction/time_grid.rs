use crate::support::units::{HOURS_PER_YEAR, SECONDS_PER_HOUR};

/// Logarithmic time grid for storing g-function curves.
///
/// Cells start at one hour; after every `cells` cells the width doubles
/// (Claesson–Javed load aggregation). The grid always reaches at least the
/// requested horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Width of the first cell, in seconds.
    pub const FIRST_CELL: f64 = SECONDS_PER_HOUR;

    /// Number of cells per doubling level.
    pub const CELLS_PER_LEVEL: usize = 20;

    /// Default horizon: twenty years, in seconds.
    pub const DEFAULT_HORIZON: f64 = 20.0 * HOURS_PER_YEAR as f64 * SECONDS_PER_HOUR;

    /// Builds the grid that first reaches `horizon` seconds.
    #[must_use]
    pub fn covering(horizon: f64) -> Self {
        let horizon = if horizon.is_finite() {
            horizon.max(Self::FIRST_CELL)
        } else {
            Self::DEFAULT_HORIZON
        };

        let mut times = Vec::new();
        let mut t = 0.0;
        let mut width = Self::FIRST_CELL;
        'levels: loop {
            for _ in 0..Self::CELLS_PER_LEVEL {
                t += width;
                times.push(t);
                if t >= horizon {
                    break 'levels;
                }
            }
            width *= 2.0;
        }
        Self { times }
    }

    /// Wraps an existing grid (e.g. from a precomputed dataset).
    pub(super) fn from_times(times: Vec<f64>) -> Self {
        Self { times }
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Last time of the grid.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::covering(Self::DEFAULT_HORIZON)
    }
}
