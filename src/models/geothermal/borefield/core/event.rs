use super::{Quadrant, SizingMethod};

/// Non-fatal conditions noticed while sizing. Depths are in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingWarning {
    /// The iteration cap was reached (or an observer stopped early); the
    /// last depth is returned.
    NonConvergence {
        method: SizingMethod,
        quadrant: Quadrant,
        depth: f64,
    },

    /// The sized depth is below the shallow threshold.
    ShallowField { depth: f64 },

    /// A precomputed g-function dataset did not cover a trial depth.
    OutOfRange { depth: f64 },

    /// Computed g-values were zero or negative at a trial depth.
    NegativeGFunction { depth: f64 },
}

/// Events emitted during sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingEvent {
    /// One fixed-point step from `depth` to `next_depth`.
    Iteration {
        method: SizingMethod,
        quadrant: Quadrant,
        iteration: usize,
        depth: f64,
        next_depth: f64,
    },

    Warning(SizingWarning),
}

/// Actions an observer can take during sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingAction {
    /// Stop the current quadrant and report its latest depth as non-converged.
    StopEarly,
}
