//! Pipe and fluid inputs, and the equivalent borehole thermal resistance.
//!
//! The sizing core only needs a borehole resistance `Rb` in m·K/W. It is
//! either a constant [`BoreholeResistance`] or produced by a
//! [`ResistanceCalculator`] from a [`PipeModel`], the fluid properties at the
//! current mean fluid temperature, the mass flow per borehole, the trial
//! borehole and the ground conductivity.
//!
//! [`LineSourceResistance`] is a ready-made calculator for symmetric U-tubes
//! (zeroth-order multipole, Hellström's line-source formula).

use std::{error::Error as StdError, f64::consts::PI};

use thiserror::Error;
use uom::si::{
    dynamic_viscosity::pascal_second,
    f64::{
        DynamicViscosity, Length, MassDensity, MassRate, SpecificHeatCapacity,
        ThermalConductivity, ThermodynamicTemperature,
    },
    length::meter,
    mass_rate::kilogram_per_second,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
};

use crate::support::{
    borehole::Borehole,
    constraint::{Constrained, ConstraintError, StrictlyPositive},
};

/// Boxed error returned by injected collaborators.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Equivalent borehole thermal resistance, in m·K/W.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BoreholeResistance(Constrained<f64, StrictlyPositive>);

impl BoreholeResistance {
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] unless the value is strictly positive.
    pub fn new(value: f64) -> Result<Self, ConstraintError> {
        if !value.is_finite() {
            return Err(ConstraintError::NotANumber);
        }
        StrictlyPositive::new(value).map(Self)
    }

    /// Resistance in m·K/W.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0.into_inner()
    }
}

/// Thermophysical properties of the heat carrier fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidProperties {
    pub conductivity: ThermalConductivity,
    pub density: MassDensity,
    pub specific_heat: SpecificHeatCapacity,
    pub viscosity: DynamicViscosity,
}

impl FluidProperties {
    /// Prandtl number `μ·cp/k`.
    #[must_use]
    pub fn prandtl(&self) -> f64 {
        self.viscosity.get::<pascal_second>()
            * self.specific_heat.get::<joule_per_kilogram_kelvin>()
            / self.conductivity.get::<watt_per_meter_kelvin>()
    }
}

/// Source of fluid properties.
///
/// Temperature-dependent models make the hourly sizing recompute `Rb` at the
/// latest mean fluid temperature.
pub trait FluidModel {
    /// Properties at the given mean fluid temperature.
    fn properties(&self, temperature: ThermodynamicTemperature) -> FluidProperties;

    /// Whether [`FluidModel::properties`] depends on its argument.
    fn is_temperature_dependent(&self) -> bool {
        false
    }
}

impl FluidModel for FluidProperties {
    fn properties(&self, _temperature: ThermodynamicTemperature) -> FluidProperties {
        *self
    }
}

/// Geometry and materials of the U-tubes in a borehole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeModel {
    /// Number of U-tubes per borehole, each with two legs.
    pub u_tubes: usize,
    pub inner_radius: Length,
    pub outer_radius: Length,
    /// Distance from the borehole axis to each leg axis.
    pub shank_spacing: Length,
    pub roughness: Length,
    pub pipe_conductivity: ThermalConductivity,
    pub grout_conductivity: ThermalConductivity,
}

/// Everything a [`ResistanceCalculator`] is given.
#[derive(Debug, Clone, Copy)]
pub struct ResistanceInput<'a> {
    pub pipe: &'a PipeModel,
    pub fluid: FluidProperties,
    pub mass_flow: MassRate,
    pub borehole: &'a Borehole,
    pub ground_conductivity: ThermalConductivity,
}

/// Computes the equivalent borehole resistance.
///
/// Any function or closure `Fn(&ResistanceInput) -> Result<BoreholeResistance, BoxedError>`
/// is a calculator.
pub trait ResistanceCalculator {
    /// # Errors
    ///
    /// Implementations return their own error, boxed.
    fn resistance(&self, input: &ResistanceInput<'_>) -> Result<BoreholeResistance, BoxedError>;
}

impl<F> ResistanceCalculator for F
where
    F: Fn(&ResistanceInput<'_>) -> Result<BoreholeResistance, BoxedError>,
{
    fn resistance(&self, input: &ResistanceInput<'_>) -> Result<BoreholeResistance, BoxedError> {
        self(input)
    }
}

/// Errors raised by [`LineSourceResistance`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipeError {
    #[error("pipe model needs at least one U-tube")]
    NoTubes,

    #[error("pipe legs do not fit in the borehole")]
    Geometry,

    #[error("mass flow must be strictly positive")]
    MassFlow,

    #[error("computed resistance is not physical")]
    Resistance(#[from] ConstraintError),
}

/// Zeroth-order multipole resistance of symmetric U-tubes.
///
/// The `2n` legs sit on a circle of radius `shank_spacing`; all legs carry
/// the same heat rate and share the fluid temperature.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSourceResistance;

impl LineSourceResistance {
    /// # Errors
    ///
    /// Returns a [`PipeError`] for impossible geometry or flow.
    pub fn compute(&self, input: &ResistanceInput<'_>) -> Result<BoreholeResistance, PipeError> {
        let pipe = input.pipe;
        if pipe.u_tubes == 0 {
            return Err(PipeError::NoTubes);
        }
        let legs = 2 * pipe.u_tubes;

        let r_b = input.borehole.radius().get::<meter>();
        let r_pi = pipe.inner_radius.get::<meter>();
        let r_po = pipe.outer_radius.get::<meter>();
        let x_c = pipe.shank_spacing.get::<meter>();
        if !(0.0 < r_pi && r_pi < r_po && r_po <= x_c && x_c + r_po <= r_b) {
            return Err(PipeError::Geometry);
        }

        let mass_flow = input.mass_flow.get::<kilogram_per_second>();
        if mass_flow <= 0.0 {
            return Err(PipeError::MassFlow);
        }

        let k_g = pipe.grout_conductivity.get::<watt_per_meter_kelvin>();
        let k_s = input.ground_conductivity.get::<watt_per_meter_kelvin>();
        let k_p = pipe.pipe_conductivity.get::<watt_per_meter_kelvin>();
        let sigma = (k_g - k_s) / (k_g + k_s);

        let h = convection_coefficient(
            &input.fluid,
            mass_flow / pipe.u_tubes as f64,
            r_pi,
            pipe.roughness.get::<meter>(),
        );
        let r_pipe = (r_po / r_pi).ln() / (2.0 * PI * k_p) + 1.0 / (2.0 * PI * r_pi * h);

        let mut sum = (r_b / r_po).ln() + sigma * (r_b * r_b / (r_b * r_b - x_c * x_c)).ln();
        for j in 1..legs {
            let theta = 2.0 * PI * j as f64 / legs as f64;
            let distance = 2.0 * x_c * (0.5 * theta).sin();
            let mirror = (r_b.powi(4) - 2.0 * r_b * r_b * x_c * x_c * theta.cos() + x_c.powi(4))
                .sqrt();
            sum += (r_b / distance).ln() + sigma * (r_b * r_b / mirror).ln();
        }

        let r_11 = sum / (2.0 * PI * k_g);
        let rb = (r_11 + r_pipe) / legs as f64;
        Ok(BoreholeResistance::new(rb)?)
    }
}

impl ResistanceCalculator for LineSourceResistance {
    fn resistance(&self, input: &ResistanceInput<'_>) -> Result<BoreholeResistance, BoxedError> {
        self.compute(input).map_err(Into::into)
    }
}

/// Internal convection coefficient of one leg, in W/m²K.
///
/// Laminar flow uses `Nu = 4.36`; turbulent flow uses Gnielinski with the
/// Haaland friction factor. The transition band is blended linearly.
fn convection_coefficient(
    fluid: &FluidProperties,
    mass_flow: f64,
    inner_radius: f64,
    roughness: f64,
) -> f64 {
    const LAMINAR_NU: f64 = 4.36;
    const RE_LAMINAR: f64 = 2300.0;
    const RE_TURBULENT: f64 = 4000.0;

    let diameter = 2.0 * inner_radius;
    let mu = fluid.viscosity.get::<pascal_second>();
    let reynolds = 4.0 * mass_flow / (PI * diameter * mu);
    let prandtl = fluid.prandtl();

    let gnielinski = |re: f64| {
        let log_term = (roughness / diameter / 3.7).powf(1.11) + 6.9 / re;
        let f = 0.25 / log_term.log10().powi(2);
        (f / 8.0) * (re - 1000.0) * prandtl
            / (1.0 + 12.7 * (f / 8.0).sqrt() * (prandtl.powf(2.0 / 3.0) - 1.0))
    };

    let nusselt = if reynolds < RE_LAMINAR {
        LAMINAR_NU
    } else if reynolds < RE_TURBULENT {
        let w = (reynolds - RE_LAMINAR) / (RE_TURBULENT - RE_LAMINAR);
        LAMINAR_NU + w * (gnielinski(RE_TURBULENT) - LAMINAR_NU)
    } else {
        gnielinski(reynolds)
    };

    nusselt * fluid.conductivity.get::<watt_per_meter_kelvin>() / diameter
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::mass_density::kilogram_per_cubic_meter;

    fn water() -> FluidProperties {
        FluidProperties {
            conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.568),
            density: MassDensity::new::<kilogram_per_cubic_meter>(1000.0),
            specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(4180.0),
            viscosity: DynamicViscosity::new::<pascal_second>(1.3e-3),
        }
    }

    fn single_u() -> PipeModel {
        PipeModel {
            u_tubes: 1,
            inner_radius: Length::new::<meter>(0.0137),
            outer_radius: Length::new::<meter>(0.016),
            shank_spacing: Length::new::<meter>(0.035),
            roughness: Length::new::<meter>(1e-6),
            pipe_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.4),
            grout_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(1.5),
        }
    }

    fn borehole() -> Borehole {
        Borehole::new(
            Length::new::<meter>(100.0),
            Length::new::<meter>(4.0),
            Length::new::<meter>(0.075),
            Length::new::<meter>(0.0),
            Length::new::<meter>(0.0),
        )
        .unwrap()
    }

    fn input<'a>(pipe: &'a PipeModel, borehole: &'a Borehole, flow: f64) -> ResistanceInput<'a> {
        ResistanceInput {
            pipe,
            fluid: water(),
            mass_flow: MassRate::new::<kilogram_per_second>(flow),
            borehole,
            ground_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(3.0),
        }
    }

    #[test]
    fn single_u_tube_resistance_is_realistic() {
        let pipe = single_u();
        let borehole = borehole();
        let rb = LineSourceResistance.compute(&input(&pipe, &borehole, 0.3)).unwrap();
        assert!(rb.value() > 0.05 && rb.value() < 0.25, "Rb = {}", rb.value());
    }

    #[test]
    fn laminar_flow_raises_resistance() {
        let pipe = single_u();
        let borehole = borehole();
        let turbulent = LineSourceResistance.compute(&input(&pipe, &borehole, 0.3)).unwrap();
        let laminar = LineSourceResistance.compute(&input(&pipe, &borehole, 0.02)).unwrap();
        assert!(laminar.value() > turbulent.value());
    }

    #[test]
    fn double_u_tube_lowers_resistance() {
        let single = single_u();
        let double = PipeModel {
            u_tubes: 2,
            ..single
        };
        let borehole = borehole();
        let r1 = LineSourceResistance.compute(&input(&single, &borehole, 0.3)).unwrap();
        let r2 = LineSourceResistance.compute(&input(&double, &borehole, 0.3)).unwrap();
        assert!(r2.value() < r1.value());
    }

    #[test]
    fn invalid_inputs() {
        let borehole = borehole();
        let pipe = PipeModel {
            shank_spacing: Length::new::<meter>(0.07),
            ..single_u()
        };
        assert_eq!(
            LineSourceResistance.compute(&input(&pipe, &borehole, 0.3)),
            Err(PipeError::Geometry)
        );

        let pipe = single_u();
        assert_eq!(
            LineSourceResistance.compute(&input(&pipe, &borehole, 0.0)),
            Err(PipeError::MassFlow)
        );
        assert!(BoreholeResistance::new(0.0).is_err());
        assert!(BoreholeResistance::new(f64::INFINITY).is_err());
    }

    #[test]
    fn functions_are_calculators() {
        fn fixed(_: &ResistanceInput<'_>) -> Result<BoreholeResistance, BoxedError> {
            Ok(BoreholeResistance::new(0.12)?)
        }
        let pipe = single_u();
        let borehole = borehole();
        let rb = fixed.resistance(&input(&pipe, &borehole, 0.3)).unwrap();
        assert_eq!(rb.value(), 0.12);
    }
}
