use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is greater than zero.
///
/// Used for ground conductivity, borehole radius, borehole resistance and
/// heat pump efficiencies, all of which appear as divisors somewhere in the
/// sizing laws.
///
/// # Examples
///
/// ```
/// use twine_borefield::support::constraint::StrictlyPositive;
///
/// let r_b = StrictlyPositive::new(0.2).unwrap();
/// assert_eq!(r_b.into_inner(), 0.2);
///
/// assert!(StrictlyPositive::new(0.0).is_err());
/// assert!(StrictlyPositive::new(-1.0).is_err());
/// assert!(StrictlyPositive::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs a [`Constrained<T, StrictlyPositive>`] if the value is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is zero, negative, or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::<T, StrictlyPositive>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::ThermalConductivity, thermal_conductivity::watt_per_meter_kelvin};

    #[test]
    fn floats() {
        assert!(Constrained::<f64, StrictlyPositive>::new(1.0).is_ok());
        assert_eq!(StrictlyPositive::new(0.0), Err(ConstraintError::Zero));
        assert_eq!(StrictlyPositive::new(-5.0), Err(ConstraintError::Negative));
    }

    #[test]
    fn conductivities() {
        let k_s = ThermalConductivity::new::<watt_per_meter_kelvin>(2.4);
        assert!(StrictlyPositive::new(k_s).is_ok());

        let k_s = ThermalConductivity::new::<watt_per_meter_kelvin>(0.0);
        assert!(StrictlyPositive::new(k_s).is_err());
    }
}
