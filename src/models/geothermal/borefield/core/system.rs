use std::f64::consts::PI;

use uom::si::{
    f64::{Length, MassRate, ThermodynamicTemperature},
    length::meter,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::degree_celsius,
};

use crate::support::{
    borehole::BoreholeField,
    ground::GroundModel,
    pipe::{BoreholeResistance, FluidModel, PipeModel, ResistanceCalculator, ResistanceInput},
    units::celsius,
};

use super::{BorefieldError, SizingConfig, TemperatureLimits};

/// Where the borehole resistance comes from.
#[derive(Clone, Copy)]
pub(crate) enum Resistance<'a> {
    Constant(BoreholeResistance),
    Calculated {
        calculator: &'a dyn ResistanceCalculator,
        pipe: &'a PipeModel,
        fluid: &'a dyn FluidModel,
        /// Mass flow per borehole.
        mass_flow: MassRate,
    },
}

/// Everything sizing reads, borrowed from the controller for one call.
#[derive(Clone, Copy)]
pub(crate) struct System<'a> {
    pub(crate) field: &'a BoreholeField,
    pub(crate) ground: &'a GroundModel,
    pub(crate) resistance: Resistance<'a>,
    pub(crate) limits: &'a TemperatureLimits,
    pub(crate) config: &'a SizingConfig,
}

/// Depth-dependent quantities at one trial depth.
#[derive(Debug, Clone)]
pub(crate) struct DepthState {
    pub(crate) field: BoreholeField,
    /// Borehole depth (m).
    pub(crate) depth: f64,
    /// Ground conductivity over the borehole (W/(m·K)).
    pub(crate) conductivity: f64,
    /// Ground diffusivity (m²/s).
    pub(crate) alpha: f64,
    /// Undisturbed ground temperature (°C).
    pub(crate) ground_temperature: f64,
    /// Borehole resistance (m·K/W).
    pub(crate) resistance: f64,
}

impl DepthState {
    /// Kelvin per watt of total field load, for a temperature response `g`.
    pub(crate) fn ground_response(&self, g: f64) -> f64 {
        g / (2.0 * PI * self.conductivity * self.total_length())
    }

    /// Kelvin per watt between the fluid and the borehole wall.
    pub(crate) fn fluid_response(&self) -> f64 {
        self.resistance / self.total_length()
    }

    pub(crate) fn total_length(&self) -> f64 {
        self.depth * self.field.len() as f64
    }
}

impl System<'_> {
    /// Evaluates the ground and borehole at `depth` (m).
    ///
    /// `fluid_temperature` (°C) feeds temperature-dependent fluid properties;
    /// the ground temperature is used before any result exists.
    pub(crate) fn at(
        &self,
        depth: f64,
        fluid_temperature: Option<f64>,
    ) -> Result<DepthState, BorefieldError> {
        if !(depth.is_finite() && depth > 0.0) {
            return Err(BorefieldError::InvalidDepth(depth));
        }
        let length = Length::new::<meter>(depth);
        let field = self.field.with_depth(length);
        let conductivity = self.ground.conductivity(length);
        let alpha = self.ground.diffusivity(length);
        let ground_temperature = if self.config.use_constant_tg {
            celsius(self.ground.temperature_law().surface())
        } else {
            celsius(self.ground.temperature(length))
        };

        let resistance = match self.resistance {
            Resistance::Constant(rb) => rb.value(),
            Resistance::Calculated {
                calculator,
                pipe,
                fluid,
                mass_flow,
            } => {
                let t_fluid = fluid_temperature.unwrap_or(ground_temperature);
                let input = ResistanceInput {
                    pipe,
                    fluid: fluid
                        .properties(ThermodynamicTemperature::new::<degree_celsius>(t_fluid)),
                    mass_flow,
                    borehole: &field.boreholes()[0],
                    ground_conductivity: conductivity,
                };
                calculator
                    .resistance(&input)
                    .map_err(BorefieldError::Resistance)?
                    .value()
            }
        };

        Ok(DepthState {
            conductivity: conductivity.get::<watt_per_meter_kelvin>(),
            field,
            depth,
            alpha,
            ground_temperature,
            resistance,
        })
    }

    /// Whether the ground temperature or properties change with depth.
    pub(crate) fn is_depth_dependent(&self) -> bool {
        self.ground.is_depth_dependent() && !self.config.use_constant_tg
            || self.ground.layers().len() > 1
    }

    /// Limits in °C as `(min, max)`.
    pub(crate) fn limits(&self) -> (f64, f64) {
        (celsius(self.limits.min()), celsius(self.limits.max()))
    }
}
