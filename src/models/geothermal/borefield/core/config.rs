use uom::si::{
    f64::{Length, TemperatureInterval, ThermodynamicTemperature},
    length::meter,
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::degree_celsius,
};

use crate::support::units::TemperatureDifference;

use super::{BorefieldError, Quadrant};

/// Sizing law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizingMethod {
    /// Three-pulse laws on monthly parameters.
    L2,
    /// Monthly temperature superposition.
    #[default]
    L3,
    /// Hourly temperature superposition; needs an hourly load.
    L4,
}

/// Quadrant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadrantChoice {
    /// Size the two quadrants the load imbalance points to and keep the deeper.
    #[default]
    Auto,
    Fixed(Quadrant),
}

/// Settings of a sizing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingConfig {
    /// Depth the iteration starts from; values below 1 m start at 50 m.
    pub initial_depth: Length,

    /// The iteration stops once the depth changes by less than this.
    pub tolerance: Length,

    pub max_iterations: usize,
    pub method: SizingMethod,
    pub quadrant: QuadrantChoice,

    /// Use the configured borehole resistance instead of recomputing it at
    /// every trial depth.
    pub use_constant_rb: bool,

    /// Use the surface temperature instead of the depth-dependent ground temperature.
    pub use_constant_tg: bool,

    /// Serve g-values from the cache; otherwise compute every request.
    pub use_precalculated: bool,

    /// Allow the cache to interpolate between stored depths.
    pub interpolate_gfunctions: bool,

    /// With depth-dependent ground, a trial depth beyond this is unsolvable.
    pub depth_ceiling: Length,

    /// Sized depths below this raise a shallow field warning.
    pub shallow_depth: Length,

    /// Temperature-dependent efficiencies are settled once fluid
    /// temperatures move less than this between passes.
    pub efficiency_tolerance: TemperatureInterval,

    pub max_efficiency_iterations: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            initial_depth: Length::new::<meter>(100.0),
            tolerance: Length::new::<meter>(0.05),
            max_iterations: 40,
            method: SizingMethod::default(),
            quadrant: QuadrantChoice::default(),
            use_constant_rb: true,
            use_constant_tg: false,
            use_precalculated: true,
            interpolate_gfunctions: true,
            depth_ceiling: Length::new::<meter>(10_000.0),
            shallow_depth: Length::new::<meter>(50.0),
            efficiency_tolerance: TemperatureInterval::new::<delta_kelvin>(0.05),
            max_efficiency_iterations: 20,
        }
    }
}

impl SizingConfig {
    /// A copy of this config with the overrides applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &SizingOverrides) -> Self {
        Self {
            initial_depth: overrides.initial_depth.unwrap_or(self.initial_depth),
            tolerance: overrides.tolerance.unwrap_or(self.tolerance),
            max_iterations: overrides.max_iterations.unwrap_or(self.max_iterations),
            method: overrides.method.unwrap_or(self.method),
            quadrant: overrides.quadrant.unwrap_or(self.quadrant),
            use_constant_rb: overrides.use_constant_rb.unwrap_or(self.use_constant_rb),
            use_constant_tg: overrides.use_constant_tg.unwrap_or(self.use_constant_tg),
            use_precalculated: overrides.use_precalculated.unwrap_or(self.use_precalculated),
            ..*self
        }
    }

    /// Starting depth in metres.
    pub(crate) fn start(&self) -> f64 {
        let depth = self.initial_depth.get::<meter>();
        if depth < 1.0 { 50.0 } else { depth }
    }
}

/// Per-call changes to a [`SizingConfig`]; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizingOverrides {
    pub initial_depth: Option<Length>,
    pub tolerance: Option<Length>,
    pub max_iterations: Option<usize>,
    pub method: Option<SizingMethod>,
    pub quadrant: Option<QuadrantChoice>,
    pub use_constant_rb: Option<bool>,
    pub use_constant_tg: Option<bool>,
    pub use_precalculated: Option<bool>,
}

impl SizingOverrides {
    #[must_use]
    pub fn method(method: SizingMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_quadrant(mut self, quadrant: Quadrant) -> Self {
        self.quadrant = Some(QuadrantChoice::Fixed(quadrant));
        self
    }

    #[must_use]
    pub fn with_initial_depth(mut self, depth: Length) -> Self {
        self.initial_depth = Some(depth);
        self
    }
}

/// Allowed range of the mean fluid temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureLimits {
    min: ThermodynamicTemperature,
    max: ThermodynamicTemperature,
}

impl TemperatureLimits {
    /// # Errors
    ///
    /// Returns [`BorefieldError::Limits`] unless `min < max`.
    pub fn new(
        min: ThermodynamicTemperature,
        max: ThermodynamicTemperature,
    ) -> Result<Self, BorefieldError> {
        if max.minus(min).get::<delta_kelvin>() > 0.0 {
            Ok(Self { min, max })
        } else {
            Err(BorefieldError::Limits)
        }
    }

    #[must_use]
    pub fn min(&self) -> ThermodynamicTemperature {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> ThermodynamicTemperature {
        self.max
    }
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            min: ThermodynamicTemperature::new::<degree_celsius>(0.0),
            max: ThermodynamicTemperature::new::<degree_celsius>(16.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_to_a_copy() {
        let config = SizingConfig::default();
        let overridden = config.with_overrides(
            &SizingOverrides::method(SizingMethod::L2).with_quadrant(Quadrant::Three),
        );
        assert_eq!(overridden.method, SizingMethod::L2);
        assert_eq!(overridden.quadrant, QuadrantChoice::Fixed(Quadrant::Three));
        assert_eq!(config.method, SizingMethod::L3);
        assert_eq!(overridden.max_iterations, config.max_iterations);
    }

    #[test]
    fn tiny_initial_depth_starts_at_fifty_metres() {
        let config = SizingConfig {
            initial_depth: Length::new::<meter>(0.5),
            ..SizingConfig::default()
        };
        assert_eq!(config.start(), 50.0);
        assert_eq!(SizingConfig::default().start(), 100.0);
    }

    #[test]
    fn limits_must_be_ordered() {
        let t = ThermodynamicTemperature::new::<degree_celsius>;
        assert!(TemperatureLimits::new(t(0.0), t(16.0)).is_ok());
        assert!(matches!(
            TemperatureLimits::new(t(16.0), t(16.0)),
            Err(BorefieldError::Limits)
        ));
    }
}
