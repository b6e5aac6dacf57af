//! Borefield sizing controller.
//!
//! [`Borefield`] owns the inputs of a sizing problem (geometry, ground,
//! borehole resistance, load and temperature limits), a [`GFunctionCache`]
//! that lives as long as the controller, and the results of the last calls.
//!
//! Setters invalidate what they affect: a new geometry or ground empties the
//! g-function cache, and any input change drops the stored temperatures and
//! sizing outcome. Temperature limits only matter to the next sizing.
//!
//! The temperature computation is also available as a
//! [`twine_core::Model`] through [`Borefield::temperature_model`].

pub(crate) mod core;

pub use self::core::{
    BorefieldError, FluidTemperatures, MissingData, Quadrant, QuadrantChoice, QuadrantSizing,
    SizingAction, SizingConfig, SizingEvent, SizingMethod, SizingOutcome, SizingOverrides,
    SizingStatus, SizingWarning, TemperatureLimits, TemperatureResult,
};

use std::cell::RefCell;

use twine_core::{Model, Observer};
use uom::si::{
    f64::{Length, MassRate},
    length::meter,
};

use crate::support::{
    borehole::BoreholeField,
    gfunction::{
        FiniteLineSource, GFunctionCache, GFunctionCalculator, GFunctionWarning,
        PrecomputedGFunctions,
    },
    ground::GroundModel,
    load::LoadProfile,
    pipe::{
        BoreholeResistance, FluidModel, LineSourceResistance, PipeModel, ResistanceCalculator,
    },
};

use self::core::{Resistance, System, hourly, monthly, size};

/// Default investment cost coefficients, €/m of drilled length.
const COST_PER_METER: [f64; 2] = [35.0, 0.0];

/// Fluid model and mass flow per borehole.
struct Flow {
    fluid: Box<dyn FluidModel>,
    mass_flow: MassRate,
}

/// What sizing reads, kept apart from the cache so both can be borrowed at once.
struct Inputs {
    field: Option<BoreholeField>,
    ground: Option<GroundModel>,
    resistance: Option<BoreholeResistance>,
    calculator: Box<dyn ResistanceCalculator>,
    pipe: Option<PipeModel>,
    flow: Option<Flow>,
    load: Option<LoadProfile>,
    limits: TemperatureLimits,
}

/// Sizes a borefield and computes its temperatures.
pub struct Borefield {
    inputs: Inputs,
    config: SizingConfig,
    cost_coefficients: Vec<f64>,
    cache: GFunctionCache,
    outcome: Option<SizingOutcome>,
    results: Option<TemperatureResult>,
}

impl Default for Borefield {
    fn default() -> Self {
        Self::new(FiniteLineSource)
    }
}

impl Borefield {
    /// Creates an empty controller computing g-functions with `calculator`.
    pub fn new(calculator: impl GFunctionCalculator + 'static) -> Self {
        Self {
            inputs: Inputs {
                field: None,
                ground: None,
                resistance: None,
                calculator: Box::new(LineSourceResistance),
                pipe: None,
                flow: None,
                load: None,
                limits: TemperatureLimits::default(),
            },
            config: SizingConfig::default(),
            cost_coefficients: COST_PER_METER.to_vec(),
            cache: GFunctionCache::new(calculator),
            outcome: None,
            results: None,
        }
    }

    /// Sets the geometry; its depth becomes the current depth.
    pub fn set_borefield(&mut self, field: BoreholeField) {
        self.inputs.field = Some(field);
        self.cache.clear();
        self.invalidate();
    }

    pub fn set_ground(&mut self, ground: GroundModel) {
        self.inputs.ground = Some(ground);
        self.cache.clear();
        self.invalidate();
    }

    pub fn set_load(&mut self, load: LoadProfile) {
        self.inputs.load = Some(load);
        self.invalidate();
    }

    /// Sets a constant borehole resistance.
    pub fn set_borehole_resistance(&mut self, resistance: BoreholeResistance) {
        self.inputs.resistance = Some(resistance);
        self.invalidate();
    }

    pub fn set_pipe(&mut self, pipe: PipeModel) {
        self.inputs.pipe = Some(pipe);
        self.invalidate();
    }

    /// Sets the fluid and its mass flow per borehole.
    pub fn set_fluid(&mut self, fluid: impl FluidModel + 'static, mass_flow: MassRate) {
        self.inputs.flow = Some(Flow {
            fluid: Box::new(fluid),
            mass_flow,
        });
        self.invalidate();
    }

    /// Replaces the default [`LineSourceResistance`].
    pub fn set_resistance_calculator(&mut self, calculator: impl ResistanceCalculator + 'static) {
        self.inputs.calculator = Box::new(calculator);
        self.invalidate();
    }

    /// Sets the allowed fluid temperature range; stored results stay valid.
    pub fn set_temperature_limits(&mut self, limits: TemperatureLimits) {
        self.inputs.limits = limits;
    }

    pub fn set_config(&mut self, config: SizingConfig) {
        self.config = config;
    }

    /// Coefficients of the investment cost polynomial in the total drilled
    /// length (m), highest degree first.
    pub fn set_cost_coefficients(&mut self, coefficients: Vec<f64>) {
        self.cost_coefficients = coefficients;
    }

    #[must_use]
    pub fn borefield(&self) -> Option<&BoreholeField> {
        self.inputs.field.as_ref()
    }

    #[must_use]
    pub fn ground(&self) -> Option<&GroundModel> {
        self.inputs.ground.as_ref()
    }

    #[must_use]
    pub fn load(&self) -> Option<&LoadProfile> {
        self.inputs.load.as_ref()
    }

    #[must_use]
    pub fn temperature_limits(&self) -> &TemperatureLimits {
        &self.inputs.limits
    }

    #[must_use]
    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    #[must_use]
    pub fn gfunction_cache(&self) -> &GFunctionCache {
        &self.cache
    }

    /// Sizes the borefield with the stored config and `overrides`.
    ///
    /// On success the borefield takes the sized depth. On failure the depth
    /// and the previous outcome are kept.
    ///
    /// # Errors
    ///
    /// Returns a [`BorefieldError`] if an input is missing or no depth can be
    /// found.
    pub fn size(&mut self, overrides: &SizingOverrides) -> Result<Length, BorefieldError> {
        self.size_observed(overrides, &mut ())
    }

    /// [`size`](Self::size) with an observer receiving every iteration and warning.
    ///
    /// # Errors
    ///
    /// See [`size`](Self::size).
    pub fn size_observed<Obs>(
        &mut self,
        overrides: &SizingOverrides,
        observer: &mut Obs,
    ) -> Result<Length, BorefieldError>
    where
        Obs: Observer<SizingEvent, SizingAction>,
    {
        let config = self.config.with_overrides(overrides);
        let load = self.inputs.load.as_ref().ok_or(MissingData::Load)?;
        let system = self.inputs.system(&config)?;
        let outcome = size(&system, load, &mut self.cache, observer)?;

        let depth = outcome.depth;
        if let Some(field) = self.inputs.field.as_mut() {
            field.set_depth(depth);
        }
        self.outcome = Some(outcome);
        Ok(depth)
    }

    /// Computes and stores the temperatures at `depth`, monthly or hourly.
    ///
    /// # Errors
    ///
    /// Returns a [`BorefieldError`] if an input is missing, the depth is
    /// invalid, or `hourly_steps` is requested without an hourly load.
    pub fn calculate_temperatures(
        &mut self,
        depth: Length,
        hourly_steps: bool,
    ) -> Result<&TemperatureResult, BorefieldError> {
        let load = self.inputs.load.as_ref().ok_or(MissingData::Load)?;
        let system = self.inputs.system(&self.config)?;
        let fluid_temperature = self.results.as_ref().map(TemperatureResult::mean_fluid);
        let state = system.at(depth.get::<meter>(), fluid_temperature)?;
        let result = if hourly_steps {
            hourly(&mut self.cache, &state, load, &self.config)?
        } else {
            monthly(&mut self.cache, &state, load, &self.config)?
        };
        Ok(self.results.insert(result))
    }

    /// The last computed temperatures, until an input changes.
    #[must_use]
    pub fn results(&self) -> Option<&TemperatureResult> {
        self.results.as_ref()
    }

    /// The last sizing, until an input changes.
    #[must_use]
    pub fn outcome(&self) -> Option<&SizingOutcome> {
        self.outcome.as_ref()
    }

    /// g-values of the field at `depth` for each time (s), through the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`BorefieldError`] if the geometry or ground is missing or
    /// the g-function cannot be evaluated.
    pub fn gvalues(&mut self, times: &[f64], depth: Length) -> Result<Vec<f64>, BorefieldError> {
        let field = self.inputs.field.as_ref().ok_or(MissingData::Borefield)?;
        let ground = self.inputs.ground.as_ref().ok_or(MissingData::Ground)?;
        let depth_m = depth.get::<meter>();
        if !(depth_m.is_finite() && depth_m > 0.0) {
            return Err(BorefieldError::InvalidDepth(depth_m));
        }
        Ok(self.cache.calculate(
            times,
            &field.with_depth(depth),
            ground.diffusivity(depth),
            self.config.interpolate_gfunctions,
            !self.config.use_precalculated,
        )?)
    }

    /// Seeds the cache with a precomputed dataset for the current field and ground.
    ///
    /// # Errors
    ///
    /// Returns [`BorefieldError::MissingData`] without a geometry or ground.
    pub fn load_precomputed_gfunctions(
        &mut self,
        dataset: PrecomputedGFunctions,
    ) -> Result<(), BorefieldError> {
        let field = self.inputs.field.as_ref().ok_or(MissingData::Borefield)?;
        let ground = self.inputs.ground.as_ref().ok_or(MissingData::Ground)?;
        let alpha = ground.diffusivity(field.depth());
        self.cache.load_precomputed(dataset, field, alpha);
        Ok(())
    }

    /// Drains the g-function warnings raised outside of sizing.
    pub fn take_gfunction_warnings(&mut self) -> Vec<GFunctionWarning> {
        self.cache.take_warnings()
    }

    /// Current borehole depth.
    #[must_use]
    pub fn depth(&self) -> Option<Length> {
        self.inputs.field.as_ref().map(BoreholeField::depth)
    }

    /// Total drilled length, `depth · n_boreholes`.
    #[must_use]
    pub fn borehole_length_total(&self) -> Option<Length> {
        self.inputs.field.as_ref().map(BoreholeField::total_length)
    }

    /// Investment cost of the total drilled length.
    #[must_use]
    pub fn investment_cost(&self) -> Option<f64> {
        let length = self.borehole_length_total()?.get::<meter>();
        Some(
            self.cost_coefficients
                .iter()
                .fold(0.0, |acc, c| acc * length + c),
        )
    }

    #[must_use]
    pub fn limiting_quadrant(&self) -> Option<Quadrant> {
        self.outcome.as_ref().map(|o| o.limiting_quadrant)
    }

    /// Depth (m) required by each quadrant of the last sizing.
    #[must_use]
    pub fn quadrant_depths(&self) -> Vec<(Quadrant, f64)> {
        self.outcome
            .iter()
            .flat_map(|o| o.quadrants.iter().map(|q| (q.quadrant, q.depth)))
            .collect()
    }

    /// The temperature computation as a [`Model`] of the depth.
    pub fn temperature_model(&mut self, hourly: bool) -> TemperatureModel<'_> {
        TemperatureModel {
            borefield: RefCell::new(self),
            hourly,
        }
    }

    fn invalidate(&mut self) {
        self.outcome = None;
        self.results = None;
    }
}

impl Inputs {
    fn system<'a>(&'a self, config: &'a SizingConfig) -> Result<System<'a>, BorefieldError> {
        let field = self.field.as_ref().ok_or(MissingData::Borefield)?;
        let ground = self.ground.as_ref().ok_or(MissingData::Ground)?;

        // A constant resistance wins when requested; without one the pipe
        // and fluid are used if present.
        let resistance = match (self.resistance, config.use_constant_rb) {
            (Some(rb), true) => Resistance::Constant(rb),
            (None, true) if self.pipe.is_none() || self.flow.is_none() => {
                return Err(MissingData::Resistance.into());
            }
            _ => {
                let pipe = self.pipe.as_ref().ok_or(MissingData::Pipe)?;
                let flow = self.flow.as_ref().ok_or(MissingData::Fluid)?;
                Resistance::Calculated {
                    calculator: self.calculator.as_ref(),
                    pipe,
                    fluid: flow.fluid.as_ref(),
                    mass_flow: flow.mass_flow,
                }
            }
        };

        Ok(System {
            field,
            ground,
            resistance,
            limits: &self.limits,
            config,
        })
    }
}

/// Temperatures of a [`Borefield`] as a function of its depth.
///
/// Each call stores its result in the borefield like
/// [`Borefield::calculate_temperatures`].
pub struct TemperatureModel<'a> {
    borefield: RefCell<&'a mut Borefield>,
    hourly: bool,
}

impl Model for TemperatureModel<'_> {
    type Input = Length;
    type Output = TemperatureResult;
    type Error = BorefieldError;

    fn call(&self, depth: &Length) -> Result<TemperatureResult, BorefieldError> {
        self.borefield
            .borrow_mut()
            .calculate_temperatures(*depth, self.hourly)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        dynamic_viscosity::pascal_second,
        f64::{
            DynamicViscosity, MassDensity, SpecificHeatCapacity, ThermalConductivity,
            ThermodynamicTemperature, VolumetricHeatCapacity,
        },
        mass_density::kilogram_per_cubic_meter,
        mass_rate::kilogram_per_second,
        specific_heat_capacity::joule_per_kilogram_kelvin,
        thermal_conductivity::watt_per_meter_kelvin,
        thermodynamic_temperature::degree_celsius,
        volumetric_heat_capacity::joule_per_cubic_meter_kelvin,
    };

    use crate::support::{
        gfunction::{GFunctionError, GFunctionOptions},
        ground::GroundTemperature,
        load::{LoadSettings, MonthlyLoad},
        pipe::{BoxedError, FluidProperties, ResistanceInput},
    };

    fn m(value: f64) -> Length {
        Length::new::<meter>(value)
    }

    fn logarithmic(
        field: &BoreholeField,
        _: f64,
        times: &[f64],
        _: &GFunctionOptions,
    ) -> Result<Vec<f64>, GFunctionError> {
        let h = field.depth().get::<meter>();
        Ok(times
            .iter()
            .map(|t| 0.5 * (1.0 + t / 3600.0).ln() * (1.0 + 10.0 / h))
            .collect())
    }

    fn ground() -> GroundModel {
        GroundModel::homogeneous(
            ThermalConductivity::new::<watt_per_meter_kelvin>(3.0),
            VolumetricHeatCapacity::new::<joule_per_cubic_meter_kelvin>(2.4e6),
            GroundTemperature::Constant(ThermodynamicTemperature::new::<degree_celsius>(10.0)),
        )
        .unwrap()
    }

    fn load() -> LoadProfile {
        let monthly = MonthlyLoad::new(
            vec![1000.0; 12],
            vec![400.0; 12],
            vec![20.0; 12],
            vec![8.0; 12],
        )
        .unwrap();
        LoadProfile::new(monthly, LoadSettings::default()).unwrap()
    }

    fn borefield() -> Borefield {
        let mut borefield = Borefield::new(logarithmic);
        borefield.set_borefield(
            BoreholeField::rectangular(2, 2, m(6.0), m(6.0), m(100.0), m(4.0), m(0.075)).unwrap(),
        );
        borefield.set_ground(ground());
        borefield.set_borehole_resistance(BoreholeResistance::new(0.2).unwrap());
        borefield.set_load(load());
        borefield
    }

    #[test]
    fn missing_inputs_are_reported() {
        let mut empty = Borefield::new(logarithmic);
        assert!(matches!(
            empty.size(&SizingOverrides::default()),
            Err(BorefieldError::MissingData(MissingData::Load))
        ));
        empty.set_load(load());
        assert!(matches!(
            empty.size(&SizingOverrides::default()),
            Err(BorefieldError::MissingData(MissingData::Borefield))
        ));
        empty.set_borefield(
            BoreholeField::rectangular(1, 1, m(6.0), m(6.0), m(100.0), m(4.0), m(0.075)).unwrap(),
        );
        empty.set_ground(ground());
        assert!(matches!(
            empty.size(&SizingOverrides::default()),
            Err(BorefieldError::MissingData(MissingData::Resistance))
        ));
    }

    #[test]
    fn sizing_sets_the_depth_and_observables() {
        let mut borefield = borefield();
        let depth = borefield.size(&SizingOverrides::default()).unwrap();

        assert_eq!(borefield.depth(), Some(depth));
        assert_relative_eq!(
            borefield.borehole_length_total().unwrap().get::<meter>(),
            4.0 * depth.get::<meter>()
        );
        assert_relative_eq!(
            borefield.investment_cost().unwrap(),
            35.0 * 4.0 * depth.get::<meter>()
        );
        assert_eq!(borefield.limiting_quadrant(), Some(Quadrant::Four));
        let depths = borefield.quadrant_depths();
        assert_eq!(depths.len(), 2);
        assert_eq!(depths[1], (Quadrant::Four, depth.get::<meter>()));
    }

    #[test]
    fn overrides_do_not_touch_the_stored_config() {
        let mut borefield = borefield();
        borefield
            .size(&SizingOverrides::method(SizingMethod::L2).with_quadrant(Quadrant::Four))
            .unwrap();
        assert_eq!(borefield.outcome().unwrap().method, SizingMethod::L2);
        assert_eq!(borefield.config(), &SizingConfig::default());
    }

    #[test]
    fn failed_sizing_keeps_the_previous_depth() {
        let mut borefield = borefield();
        let depth = borefield.size(&SizingOverrides::default()).unwrap();
        let result = borefield.size(&SizingOverrides::method(SizingMethod::L4));
        assert!(matches!(result, Err(BorefieldError::HourlyLoadRequired)));
        assert_eq!(borefield.depth(), Some(depth));
        assert!(borefield.outcome().is_some());
    }

    #[test]
    fn setters_invalidate_what_they_affect() {
        let mut borefield = borefield();
        borefield.calculate_temperatures(m(100.0), false).unwrap();
        assert!(!borefield.gfunction_cache().stored_depths().is_empty());

        borefield.set_temperature_limits(TemperatureLimits::default());
        assert!(borefield.results().is_some());

        borefield.set_load(load());
        assert!(borefield.results().is_none());
        assert!(!borefield.gfunction_cache().stored_depths().is_empty());

        borefield.set_ground(ground());
        assert!(borefield.gfunction_cache().stored_depths().is_empty());
    }

    fn fixed_resistance(_: &ResistanceInput<'_>) -> Result<BoreholeResistance, BoxedError> {
        Ok(BoreholeResistance::new(0.15)?)
    }

    #[test]
    fn calculated_resistance_needs_pipe_and_fluid() {
        let mut borefield = borefield();
        borefield.set_config(SizingConfig {
            use_constant_rb: false,
            ..SizingConfig::default()
        });
        assert!(matches!(
            borefield.size(&SizingOverrides::default()),
            Err(BorefieldError::MissingData(MissingData::Pipe))
        ));

        borefield.set_pipe(PipeModel {
            u_tubes: 1,
            inner_radius: m(0.0137),
            outer_radius: m(0.016),
            shank_spacing: m(0.035),
            roughness: m(1e-6),
            pipe_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.4),
            grout_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(1.5),
        });
        assert!(matches!(
            borefield.size(&SizingOverrides::default()),
            Err(BorefieldError::MissingData(MissingData::Fluid))
        ));

        borefield.set_fluid(
            FluidProperties {
                conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(0.568),
                density: MassDensity::new::<kilogram_per_cubic_meter>(1000.0),
                specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(4180.0),
                viscosity: DynamicViscosity::new::<pascal_second>(1.3e-3),
            },
            MassRate::new::<kilogram_per_second>(0.3),
        );
        borefield.set_resistance_calculator(fixed_resistance);
        let calculated = borefield.size(&SizingOverrides::default()).unwrap();
        let result = borefield.calculate_temperatures(calculated, false).unwrap();
        assert_relative_eq!(result.resistance, 0.15);

        // The constant resistance of 0.2 wins once it is requested again.
        let constant = borefield
            .size(&SizingOverrides {
                use_constant_rb: Some(true),
                ..SizingOverrides::default()
            })
            .unwrap();
        assert!(constant > calculated);
    }

    #[test]
    fn gvalues_go_through_the_cache() {
        let mut borefield = borefield();
        let g = borefield.gvalues(&[3600.0, 36_000.0], m(100.0)).unwrap();
        assert_relative_eq!(g[0], 0.5 * 2.0_f64.ln() * 1.1, max_relative = 1e-9);
        assert_eq!(borefield.gfunction_cache().stored_depths(), &[100.0]);
        assert!(matches!(
            borefield.gvalues(&[3600.0], m(-1.0)),
            Err(BorefieldError::InvalidDepth(_))
        ));
    }

    #[test]
    fn temperature_model_matches_the_controller() {
        let mut borefield = borefield();
        let direct = borefield.calculate_temperatures(m(120.0), false).unwrap().clone();

        let model = borefield.temperature_model(false);
        let via_model = model.call(&m(120.0)).unwrap();
        assert_eq!(via_model.borehole_wall, direct.borehole_wall);
        assert_relative_eq!(via_model.max_fluid(), direct.max_fluid());
    }
}
