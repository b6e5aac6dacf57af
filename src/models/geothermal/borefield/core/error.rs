use thiserror::Error;

use crate::support::{
    borehole::GeometryError, gfunction::GFunctionError, ground::GroundError, load::LoadError,
    pipe::BoxedError,
};

/// Input a borefield operation needs but was never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingData {
    #[error("no load profile")]
    Load,
    #[error("no borefield geometry")]
    Borefield,
    #[error("no ground model")]
    Ground,
    #[error("no borehole resistance")]
    Resistance,
    #[error("no pipe model")]
    Pipe,
    #[error("no fluid model")]
    Fluid,
}

/// Errors raised by [`Borefield`](crate::models::geothermal::borefield::Borefield).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BorefieldError {
    #[error(transparent)]
    MissingData(#[from] MissingData),

    #[error("invalid load")]
    Load(#[from] LoadError),

    #[error("invalid borefield geometry")]
    Geometry(#[from] GeometryError),

    #[error("invalid ground model")]
    Ground(#[from] GroundError),

    #[error("g-function evaluation failed")]
    GFunction(#[from] GFunctionError),

    /// The resistance calculator failed.
    #[error("borehole resistance calculation failed")]
    Resistance(#[source] BoxedError),

    /// With depth-dependent ground, the trial depth ran past the ceiling or
    /// the limits sit on the wrong side of the ground temperature.
    #[error("no depth satisfies the temperature limits (last trial {depth:.1} m)")]
    UnsolvableDepth { depth: f64 },

    #[error("hourly sizing needs an hourly load")]
    HourlyLoadRequired,

    /// No quadrant needs a borefield, e.g. for a zero load.
    #[error("no quadrant limits the borefield")]
    NoLimitingQuadrant,

    #[error("the minimum temperature limit must be below the maximum")]
    Limits,

    #[error("depth must be positive and finite, got {0} m")]
    InvalidDepth(f64),
}
