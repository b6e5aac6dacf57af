//! Numeric invariants checked once, at construction.
//!
//! Borefield inputs carry a handful of sign invariants: conductivities and
//! borehole resistances must be strictly positive, load entries must not be
//! negative. Wrapping such values in [`Constrained<T, C>`] moves the check to
//! the point where the value enters the crate, so the sizing code can rely on
//! it without re-validating.
//!
//! # Provided constraints
//!
//! - [`NonNegative`]: Zero or greater
//! - [`StrictlyPositive`]: Greater than zero
//!
//! Both markers work with plain floats and with [`uom`] quantities.
//!
//! # Extending
//!
//! Implement [`Constraint<T>`] for your own zero-sized marker type to express
//! another invariant.

mod non_negative;
mod strictly_positive;

use std::marker::PhantomData;

use thiserror::Error;

pub use non_negative::NonNegative;
pub use strictly_positive::StrictlyPositive;

/// A check that a value must pass before it can be wrapped.
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must not be zero")]
    Zero,
    #[error("value is not a number")]
    NotANumber,
}

/// A result type alias to use with [`Constraint`].
pub type ConstraintResult<T, E = ConstraintError> = Result<T, E>;

/// A value that is known to satisfy the constraint `C`.
///
/// # Example
///
/// ```
/// use twine_borefield::support::constraint::{Constrained, StrictlyPositive};
/// use uom::si::{f64::ThermalConductivity, thermal_conductivity::watt_per_meter_kelvin};
///
/// let k_s = ThermalConductivity::new::<watt_per_meter_kelvin>(3.0);
/// let k_s = Constrained::<_, StrictlyPositive>::new(k_s).unwrap();
/// assert_eq!(k_s.into_inner().get::<watt_per_meter_kelvin>(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Checks every entry of a slice, reporting the first offending index.
///
/// # Errors
///
/// Returns the index and the violated constraint of the first failing entry.
pub fn check_all<T, C: Constraint<T>>(values: &[T]) -> Result<(), (usize, ConstraintError)> {
    values
        .iter()
        .enumerate()
        .try_for_each(|(index, value)| C::check(value).map_err(|err| (index, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_all_reports_first_failure() {
        assert!(check_all::<f64, NonNegative>(&[0.0, 1.0, 2.5]).is_ok());

        let err = check_all::<f64, NonNegative>(&[3.0, -1.0, -2.0]).unwrap_err();
        assert_eq!(err, (1, ConstraintError::Negative));

        let err = check_all::<f64, StrictlyPositive>(&[1.0, 0.0]).unwrap_err();
        assert_eq!(err, (1, ConstraintError::Zero));
    }
}
