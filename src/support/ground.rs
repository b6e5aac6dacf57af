//! Ground thermal properties and undisturbed ground temperature.
//!
//! A [`GroundModel`] is a stack of [`GroundLayer`]s plus a
//! [`GroundTemperature`] law. All properties that depend on the borehole
//! depth `H` are evaluated over the first `H` metres:
//!
//! - conductivity: thickness-weighted harmonic mean,
//! - volumetric heat capacity: thickness-weighted arithmetic mean,
//! - diffusivity: `α = k / ρc` of those means,
//! - temperature: the undisturbed value at mid-depth `H/2`.
//!
//! The last layer extends indefinitely.

use thiserror::Error;
use uom::si::{
    f64::{
        HeatFluxDensity, Length, TemperatureInterval, ThermalConductivity,
        ThermodynamicTemperature, VolumetricHeatCapacity,
    },
    heat_flux_density::watt_per_square_meter,
    length::meter,
    temperature_interval::kelvin as delta_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::degree_celsius,
    volumetric_heat_capacity::joule_per_cubic_meter_kelvin,
};

use crate::support::constraint::{Constrained, ConstraintError, StrictlyPositive};

/// Errors raised when building a [`GroundModel`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GroundError {
    #[error("ground model needs at least one layer")]
    NoLayers,

    /// Every layer except the last needs a finite, strictly positive thickness.
    #[error("layer {0} needs a finite, strictly positive thickness")]
    Thickness(usize),

    #[error("invalid ground conductivity")]
    Conductivity(#[source] ConstraintError),

    #[error("invalid volumetric heat capacity")]
    HeatCapacity(#[source] ConstraintError),
}

/// A horizontal ground layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundLayer {
    thickness: Option<Length>,
    conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
    heat_capacity: Constrained<VolumetricHeatCapacity, StrictlyPositive>,
}

impl GroundLayer {
    /// Creates a layer; `thickness = None` marks a layer without lower bound.
    ///
    /// # Errors
    ///
    /// Returns a [`GroundError`] if the conductivity or heat capacity is not
    /// strictly positive.
    pub fn new(
        thickness: Option<Length>,
        conductivity: ThermalConductivity,
        heat_capacity: VolumetricHeatCapacity,
    ) -> Result<Self, GroundError> {
        Ok(Self {
            thickness,
            conductivity: StrictlyPositive::new(conductivity).map_err(GroundError::Conductivity)?,
            heat_capacity: StrictlyPositive::new(heat_capacity)
                .map_err(GroundError::HeatCapacity)?,
        })
    }

    #[must_use]
    pub fn conductivity(&self) -> ThermalConductivity {
        self.conductivity.into_inner()
    }

    #[must_use]
    pub fn heat_capacity(&self) -> VolumetricHeatCapacity {
        self.heat_capacity.into_inner()
    }
}

/// Law for the undisturbed ground temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundTemperature {
    /// Uniform temperature.
    Constant(ThermodynamicTemperature),

    /// Surface temperature plus the conductive rise of a geothermal heat flux.
    Flux {
        surface: ThermodynamicTemperature,
        flux: HeatFluxDensity,
    },

    /// Surface temperature plus a fixed rise per 100 m.
    Gradient {
        surface: ThermodynamicTemperature,
        per_100m: TemperatureInterval,
    },
}

impl GroundTemperature {
    /// Temperature at the surface, or the uniform value.
    #[must_use]
    pub fn surface(&self) -> ThermodynamicTemperature {
        match *self {
            Self::Constant(t) => t,
            Self::Flux { surface, .. } | Self::Gradient { surface, .. } => surface,
        }
    }
}

/// Ground properties seen by a borefield.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundModel {
    layers: Vec<GroundLayer>,
    temperature: GroundTemperature,
}

impl GroundModel {
    /// Homogeneous ground.
    ///
    /// # Errors
    ///
    /// Returns a [`GroundError`] if the conductivity or heat capacity is not
    /// strictly positive.
    pub fn homogeneous(
        conductivity: ThermalConductivity,
        heat_capacity: VolumetricHeatCapacity,
        temperature: GroundTemperature,
    ) -> Result<Self, GroundError> {
        let layer = GroundLayer::new(None, conductivity, heat_capacity)?;
        Self::layered(vec![layer], temperature)
    }

    /// Layered ground, top layer first.
    ///
    /// # Errors
    ///
    /// Returns a [`GroundError`] if there are no layers or a layer above the
    /// last one lacks a finite, strictly positive thickness.
    pub fn layered(
        layers: Vec<GroundLayer>,
        temperature: GroundTemperature,
    ) -> Result<Self, GroundError> {
        if layers.is_empty() {
            return Err(GroundError::NoLayers);
        }
        let last = layers.len() - 1;
        for (index, layer) in layers.iter().enumerate().take(last) {
            let ok = layer
                .thickness
                .map(|t| t.get::<meter>())
                .is_some_and(|t| t.is_finite() && t > 0.0);
            if !ok {
                return Err(GroundError::Thickness(index));
            }
        }
        Ok(Self {
            layers,
            temperature,
        })
    }

    #[must_use]
    pub fn layers(&self) -> &[GroundLayer] {
        &self.layers
    }

    #[must_use]
    pub fn temperature_law(&self) -> &GroundTemperature {
        &self.temperature
    }

    /// Whether any property changes with the borehole depth.
    #[must_use]
    pub fn is_depth_dependent(&self) -> bool {
        self.layers.len() > 1 || !matches!(self.temperature, GroundTemperature::Constant(_))
    }

    /// Thickness of each layer within the first `depth` metres.
    fn spans(&self, depth: f64) -> impl Iterator<Item = (f64, &GroundLayer)> {
        let mut top = 0.0;
        self.layers.iter().map(move |layer| {
            let bottom = layer
                .thickness
                .map_or(f64::INFINITY, |t| top + t.get::<meter>());
            let span = (bottom.min(depth) - top).max(0.0);
            top = bottom;
            (span, layer)
        })
    }

    /// Effective conductivity over the first `depth` metres.
    #[must_use]
    pub fn conductivity(&self, depth: Length) -> ThermalConductivity {
        let h = depth.get::<meter>();
        if self.layers.len() == 1 || h <= 0.0 {
            return self.layers[0].conductivity();
        }
        let resistance: f64 = self
            .spans(h)
            .map(|(span, layer)| span / layer.conductivity().get::<watt_per_meter_kelvin>())
            .sum();
        ThermalConductivity::new::<watt_per_meter_kelvin>(h / resistance)
    }

    /// Effective volumetric heat capacity over the first `depth` metres.
    #[must_use]
    pub fn heat_capacity(&self, depth: Length) -> VolumetricHeatCapacity {
        let h = depth.get::<meter>();
        if self.layers.len() == 1 || h <= 0.0 {
            return self.layers[0].heat_capacity();
        }
        let weighted: f64 = self
            .spans(h)
            .map(|(span, layer)| {
                span * layer
                    .heat_capacity()
                    .get::<joule_per_cubic_meter_kelvin>()
            })
            .sum();
        VolumetricHeatCapacity::new::<joule_per_cubic_meter_kelvin>(weighted / h)
    }

    /// Thermal diffusivity over the first `depth` metres, in m²/s.
    #[must_use]
    pub fn diffusivity(&self, depth: Length) -> f64 {
        self.conductivity(depth).get::<watt_per_meter_kelvin>()
            / self
                .heat_capacity(depth)
                .get::<joule_per_cubic_meter_kelvin>()
    }

    /// Undisturbed ground temperature seen by a borehole of the given depth.
    #[must_use]
    pub fn temperature(&self, depth: Length) -> ThermodynamicTemperature {
        let half = 0.5 * depth.get::<meter>();
        let rise = match self.temperature {
            GroundTemperature::Constant(_) => 0.0,
            GroundTemperature::Flux { flux, .. } => {
                let k_s = self.conductivity(depth).get::<watt_per_meter_kelvin>();
                half * flux.get::<watt_per_square_meter>() / k_s
            }
            GroundTemperature::Gradient { per_100m, .. } => {
                half * per_100m.get::<delta_kelvin>() / 100.0
            }
        };
        let surface = self.temperature.surface().get::<degree_celsius>();
        ThermodynamicTemperature::new::<degree_celsius>(surface + rise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn k(value: f64) -> ThermalConductivity {
        ThermalConductivity::new::<watt_per_meter_kelvin>(value)
    }

    fn rho_c(value: f64) -> VolumetricHeatCapacity {
        VolumetricHeatCapacity::new::<joule_per_cubic_meter_kelvin>(value)
    }

    fn celsius(value: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<degree_celsius>(value)
    }

    fn m(value: f64) -> Length {
        Length::new::<meter>(value)
    }

    #[test]
    fn homogeneous_ground() {
        let ground =
            GroundModel::homogeneous(k(3.0), rho_c(2.4e6), GroundTemperature::Constant(celsius(10.0)))
                .unwrap();
        assert!(!ground.is_depth_dependent());
        assert_relative_eq!(ground.diffusivity(m(100.0)), 1.25e-6);
        assert_relative_eq!(
            ground.temperature(m(150.0)).get::<degree_celsius>(),
            10.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn layered_conductivity_is_harmonic() {
        let layers = vec![
            GroundLayer::new(Some(m(50.0)), k(2.0), rho_c(2.0e6)).unwrap(),
            GroundLayer::new(None, k(4.0), rho_c(3.0e6)).unwrap(),
        ];
        let ground = GroundModel::layered(layers, GroundTemperature::Constant(celsius(10.0))).unwrap();
        assert!(ground.is_depth_dependent());

        // Only the top layer is reached.
        assert_relative_eq!(ground.conductivity(m(40.0)).get::<watt_per_meter_kelvin>(), 2.0);

        // 50 m at 2 W/mK and 50 m at 4 W/mK.
        let expected = 100.0 / (50.0 / 2.0 + 50.0 / 4.0);
        assert_relative_eq!(
            ground.conductivity(m(100.0)).get::<watt_per_meter_kelvin>(),
            expected
        );
        assert_relative_eq!(
            ground.heat_capacity(m(100.0)).get::<joule_per_cubic_meter_kelvin>(),
            2.5e6
        );
    }

    #[test]
    fn depth_dependent_temperature() {
        let flux = GroundTemperature::Flux {
            surface: celsius(10.0),
            flux: HeatFluxDensity::new::<watt_per_square_meter>(0.06),
        };
        let ground = GroundModel::homogeneous(k(3.0), rho_c(2.4e6), flux).unwrap();
        // 10 + 50 * 0.06 / 3
        assert_relative_eq!(ground.temperature(m(100.0)).get::<degree_celsius>(), 11.0, epsilon = 1e-9);

        let gradient = GroundTemperature::Gradient {
            surface: celsius(10.0),
            per_100m: TemperatureInterval::new::<delta_kelvin>(2.0),
        };
        let ground = GroundModel::homogeneous(k(3.0), rho_c(2.4e6), gradient).unwrap();
        assert_relative_eq!(ground.temperature(m(200.0)).get::<degree_celsius>(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_ground() {
        assert_eq!(
            GroundModel::layered(Vec::new(), GroundTemperature::Constant(celsius(10.0))),
            Err(GroundError::NoLayers)
        );

        let layers = vec![
            GroundLayer::new(None, k(2.0), rho_c(2.0e6)).unwrap(),
            GroundLayer::new(None, k(4.0), rho_c(3.0e6)).unwrap(),
        ];
        assert_eq!(
            GroundModel::layered(layers, GroundTemperature::Constant(celsius(10.0))),
            Err(GroundError::Thickness(0))
        );

        let err = GroundModel::homogeneous(k(0.0), rho_c(2.4e6), GroundTemperature::Constant(celsius(10.0)))
            .unwrap_err();
        assert_eq!(err, GroundError::Conductivity(ConstraintError::Zero));
    }
}
