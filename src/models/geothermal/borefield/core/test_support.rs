use uom::si::{
    f64::{Length, ThermalConductivity, ThermodynamicTemperature, VolumetricHeatCapacity},
    length::meter,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::degree_celsius,
    volumetric_heat_capacity::joule_per_cubic_meter_kelvin,
};

use crate::support::{
    borehole::BoreholeField,
    gfunction::{GFunctionCache, GFunctionOptions},
    ground::{GroundModel, GroundTemperature},
    load::{LoadProfile, LoadSettings, MonthlyLoad},
    pipe::BoreholeResistance,
};

use super::{
    SizingConfig, TemperatureLimits,
    system::{DepthState, Resistance, System},
};

pub(super) const ALPHA: f64 = 1.25e-6;

/// A 2 × 2 field at 6 m spacing.
pub(super) fn small_field(depth: f64) -> BoreholeField {
    let m = Length::new::<meter>;
    BoreholeField::rectangular(2, 2, m(6.0), m(6.0), m(depth), m(4.0), m(0.075)).unwrap()
}

/// Cache over a smooth g-function that flattens slowly with depth.
pub(super) fn logarithmic_cache() -> GFunctionCache {
    GFunctionCache::new(
        |field: &BoreholeField, _: f64, times: &[f64], _: &GFunctionOptions| {
            let h = field.depth().get::<meter>();
            Ok(times
                .iter()
                .map(|t| 0.5 * (1.0 + t / 3600.0).ln() * (1.0 + 10.0 / h))
                .collect())
        },
    )
}

/// Ground at 10 °C with k = 3 W/(m·K), Rb = 0.2 m·K/W.
pub(super) fn depth_state(depth: f64) -> DepthState {
    DepthState {
        field: small_field(depth),
        depth,
        conductivity: 3.0,
        alpha: ALPHA,
        ground_temperature: 10.0,
        resistance: 0.2,
    }
}

pub(super) fn monthly_load(
    baseload_heating: [f64; 12],
    baseload_cooling: [f64; 12],
    peak_heating: [f64; 12],
    peak_cooling: [f64; 12],
) -> LoadProfile {
    let load = MonthlyLoad::new(
        baseload_heating.to_vec(),
        baseload_cooling.to_vec(),
        peak_heating.to_vec(),
        peak_cooling.to_vec(),
    )
    .unwrap();
    LoadProfile::new(load, LoadSettings::default()).unwrap()
}

/// Owned inputs a [`System`] borrows from.
pub(super) struct Fixture {
    pub(super) field: BoreholeField,
    pub(super) ground: GroundModel,
    pub(super) resistance: BoreholeResistance,
    pub(super) limits: TemperatureLimits,
    pub(super) config: SizingConfig,
}

impl Fixture {
    /// The small field in the ground of [`depth_state`], limits 0 to 16 °C.
    pub(super) fn new() -> Self {
        let ground = GroundModel::homogeneous(
            ThermalConductivity::new::<watt_per_meter_kelvin>(3.0),
            VolumetricHeatCapacity::new::<joule_per_cubic_meter_kelvin>(3.0 / ALPHA),
            GroundTemperature::Constant(ThermodynamicTemperature::new::<degree_celsius>(10.0)),
        )
        .unwrap();
        Self {
            field: small_field(100.0),
            ground,
            resistance: BoreholeResistance::new(0.2).unwrap(),
            limits: TemperatureLimits::default(),
            config: SizingConfig::default(),
        }
    }

    pub(super) fn system(&self) -> System<'_> {
        System {
            field: &self.field,
            ground: &self.ground,
            resistance: Resistance::Constant(self.resistance),
            limits: &self.limits,
            config: &self.config,
        }
    }
}
