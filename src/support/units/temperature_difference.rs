use uom::si::{
    f64::{TemperatureInterval, ThermodynamicTemperature},
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin as abs_kelvin,
};

/// Extension trait for computing temperature differences.
///
/// Subtracting two [`ThermodynamicTemperature`] values in [`uom`] yields
/// another absolute temperature; the sizing laws need the interval between a
/// fluid limit and the undisturbed ground temperature instead.
///
/// Upstream discussion:
/// [#380](https://github.com/iliekturtles/uom/issues/380),
/// [#289](https://github.com/iliekturtles/uom/issues/289).
pub trait TemperatureDifference {
    /// Returns the temperature difference `self - other`.
    fn minus(self, other: Self) -> TemperatureInterval;
}

impl TemperatureDifference for ThermodynamicTemperature {
    fn minus(self, other: Self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(
            self.get::<abs_kelvin>() - other.get::<abs_kelvin>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::thermodynamic_temperature::degree_celsius;

    #[test]
    fn limit_headroom() {
        let ground = ThermodynamicTemperature::new::<degree_celsius>(10.0);
        let t_max = ThermodynamicTemperature::new::<degree_celsius>(16.0);
        let t_min = ThermodynamicTemperature::new::<degree_celsius>(0.0);

        assert_relative_eq!(t_max.minus(ground).get::<delta_kelvin>(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(t_min.minus(ground).get::<delta_kelvin>(), -10.0, epsilon = 1e-12);
    }
}
