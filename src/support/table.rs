//! Linear lookup tables.
//!
//! Thin wrappers over [`ninterp`] used for heat pump efficiency tables and
//! for reading g-values between the points of a time grid. Inputs beyond the
//! table bounds are clamped to the nearest edge.

use ndarray::{Array1, Array2};
use ninterp::{
    error::{InterpolateError, ValidateError},
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interp2DOwned, Interpolator},
    strategy::enums::{Strategy1DEnum, Strategy2DEnum},
};
use thiserror::Error;

/// Errors raised when building or evaluating a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table needs at least one point")]
    Empty,

    #[error("table axes and values differ in length")]
    Shape,

    #[error(transparent)]
    Validation(#[from] ValidateError),

    #[error(transparent)]
    Interpolation(#[from] InterpolateError),
}

#[derive(Debug, Clone)]
enum Inner1D {
    Constant(f64),
    Linear(Interp1DOwned<f64, Strategy1DEnum>),
}

/// Piecewise linear `f(x)`, clamped outside the grid.
#[derive(Debug, Clone)]
pub struct Table1D(Inner1D);

impl Table1D {
    /// # Errors
    ///
    /// Returns a [`TableError`] if the table is empty, the lengths differ, or
    /// `x` is not strictly increasing.
    pub fn new(x: Vec<f64>, f_x: Vec<f64>) -> Result<Self, TableError> {
        if x.len() != f_x.len() {
            return Err(TableError::Shape);
        }
        match x.len() {
            0 => Err(TableError::Empty),
            1 => Ok(Self(Inner1D::Constant(f_x[0]))),
            _ => Ok(Self(Inner1D::Linear(Interp1DOwned::new(
                Array1::from(x),
                Array1::from(f_x),
                ninterp::strategy::Linear.into(),
                Extrapolate::Clamp,
            )?))),
        }
    }

    /// # Errors
    ///
    /// Returns a [`TableError`] if interpolation fails (e.g. `x` is `NaN`).
    pub fn eval(&self, x: f64) -> Result<f64, TableError> {
        match &self.0 {
            Inner1D::Constant(value) => Ok(*value),
            Inner1D::Linear(interp) => Ok(interp.interpolate(&[x])?),
        }
    }

    /// Evaluates the table at each point.
    ///
    /// # Errors
    ///
    /// Returns the first interpolation failure.
    pub fn eval_many(&self, xs: &[f64]) -> Result<Vec<f64>, TableError> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

/// Bilinear `f(x, y)`, clamped outside the grid.
#[derive(Debug, Clone)]
pub struct Table2D(Interp2DOwned<f64, Strategy2DEnum>);

impl Table2D {
    /// Builds a table; `f_xy[i][j]` is the value at `(x[i], y[j])`.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the shape is inconsistent or an axis is not
    /// strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>, f_xy: Vec<Vec<f64>>) -> Result<Self, TableError> {
        if x.is_empty() || y.is_empty() {
            return Err(TableError::Empty);
        }
        if f_xy.len() != x.len() || f_xy.iter().any(|row| row.len() != y.len()) {
            return Err(TableError::Shape);
        }
        let values: Vec<f64> = f_xy.into_iter().flatten().collect();
        let f_xy = Array2::from_shape_vec((x.len(), y.len()), values)
            .map_err(|_| TableError::Shape)?;

        Ok(Self(Interp2DOwned::new(
            Array1::from(x),
            Array1::from(y),
            f_xy,
            ninterp::strategy::Linear.into(),
            Extrapolate::Clamp,
        )?))
    }

    /// # Errors
    ///
    /// Returns a [`TableError`] if interpolation fails.
    pub fn eval(&self, x: f64, y: f64) -> Result<f64, TableError> {
        Ok(self.0.interpolate(&[x, y])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn one_dimensional() {
        let cop = Table1D::new(vec![-5.0, 0.0, 10.0], vec![3.0, 3.5, 4.5]).unwrap();
        assert_relative_eq!(cop.eval(5.0).unwrap(), 4.0);
        // Clamped at both ends.
        assert_relative_eq!(cop.eval(-20.0).unwrap(), 3.0);
        assert_relative_eq!(cop.eval(30.0).unwrap(), 4.5);

        let constant = Table1D::new(vec![1.0], vec![4.0]).unwrap();
        assert_relative_eq!(constant.eval(-3.0).unwrap(), 4.0);
    }

    #[test]
    fn two_dimensional() {
        let table = Table2D::new(
            vec![0.0, 10.0],
            vec![0.5, 1.0],
            vec![vec![3.0, 4.0], vec![4.0, 5.0]],
        )
        .unwrap();
        assert_relative_eq!(table.eval(5.0, 0.75).unwrap(), 4.0);
        assert_relative_eq!(table.eval(20.0, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn invalid_tables() {
        assert!(matches!(Table1D::new(vec![], vec![]), Err(TableError::Empty)));
        assert!(matches!(Table1D::new(vec![0.0, 1.0], vec![1.0]), Err(TableError::Shape)));
        assert!(Table1D::new(vec![1.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(matches!(
            Table2D::new(vec![0.0], vec![0.0, 1.0], vec![vec![1.0]]),
            Err(TableError::Shape)
        ));
    }
}
