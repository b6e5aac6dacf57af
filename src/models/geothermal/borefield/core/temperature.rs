//! Borehole wall and fluid temperatures for a trial depth.

use uom::si::time::second;

use crate::support::{
    gfunction::GFunctionCache,
    load::{LoadProfile, OperatingTemperatures},
    superposition::{increments, superpose},
    units::{HOURS_PER_YEAR, MONTHS_PER_YEAR, hours_to_seconds},
};

use super::{BorefieldError, Quadrant, SizingConfig, system::DepthState};

/// Fluid temperature series (°C), one value per simulation step.
#[derive(Debug, Clone, PartialEq)]
pub enum FluidTemperatures {
    /// Monthly steps with base and peak conditions in both directions.
    Monthly {
        peak_injection: Vec<f64>,
        peak_extraction: Vec<f64>,
        base_injection: Vec<f64>,
        base_extraction: Vec<f64>,
    },
    /// Hourly mean fluid temperature.
    Hourly(Vec<f64>),
}

/// Temperatures of a borefield at one depth over the simulation period.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureResult {
    /// Borehole depth (m).
    pub depth: f64,
    /// Undisturbed ground temperature used (°C).
    pub ground_temperature: f64,
    /// Borehole resistance used (m·K/W).
    pub resistance: f64,
    /// Borehole wall temperature (°C).
    pub borehole_wall: Vec<f64>,
    pub fluid: FluidTemperatures,
}

impl TemperatureResult {
    /// Whether the series are hourly.
    #[must_use]
    pub fn is_hourly(&self) -> bool {
        matches!(self.fluid, FluidTemperatures::Hourly(_))
    }

    /// Highest fluid temperature over the period.
    #[must_use]
    pub fn max_fluid(&self) -> f64 {
        self.injection_side().iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lowest fluid temperature over the period.
    #[must_use]
    pub fn min_fluid(&self) -> f64 {
        self.extraction_side().iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Mean fluid temperature over the period.
    #[must_use]
    pub fn mean_fluid(&self) -> f64 {
        match &self.fluid {
            FluidTemperatures::Monthly {
                base_injection,
                base_extraction,
                ..
            } => {
                let n = base_injection.len().max(1) as f64;
                base_injection
                    .iter()
                    .zip(base_extraction)
                    .map(|(inj, ext)| 0.5 * (inj + ext))
                    .sum::<f64>()
                    / n
            }
            FluidTemperatures::Hourly(fluid) => {
                fluid.iter().sum::<f64>() / fluid.len().max(1) as f64
            }
        }
    }

    /// The extreme the quadrant checks: the highest injection-side
    /// temperature for quadrants 1 and 2, the lowest extraction-side one for
    /// 3 and 4.
    ///
    /// First-year quadrants look at the first year only, last-year quadrants
    /// at the whole period.
    #[must_use]
    pub fn extreme(&self, quadrant: Quadrant) -> f64 {
        let series = if quadrant.is_heating_limited() {
            self.extraction_side()
        } else {
            self.injection_side()
        };
        let per_year = if self.is_hourly() {
            HOURS_PER_YEAR
        } else {
            MONTHS_PER_YEAR
        };
        let scanned = if quadrant.is_last_year() {
            series
        } else {
            &series[..per_year.min(series.len())]
        };
        if quadrant.is_heating_limited() {
            scanned.iter().copied().fold(f64::INFINITY, f64::min)
        } else {
            scanned.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    }

    /// The temperatures heat pumps would run at, for temperature-dependent efficiencies.
    #[must_use]
    pub fn operating_temperatures(&self) -> OperatingTemperatures {
        match &self.fluid {
            FluidTemperatures::Monthly {
                peak_injection,
                peak_extraction,
                base_injection,
                base_extraction,
            } => OperatingTemperatures::Monthly {
                base_extraction: base_extraction.clone(),
                base_injection: base_injection.clone(),
                peak_extraction: peak_extraction.clone(),
                peak_injection: peak_injection.clone(),
            },
            FluidTemperatures::Hourly(fluid) => OperatingTemperatures::Hourly(fluid.clone()),
        }
    }

    fn injection_side(&self) -> &[f64] {
        match &self.fluid {
            FluidTemperatures::Monthly { peak_injection, .. } => peak_injection,
            FluidTemperatures::Hourly(fluid) => fluid,
        }
    }

    fn extraction_side(&self) -> &[f64] {
        match &self.fluid {
            FluidTemperatures::Monthly { peak_extraction, .. } => peak_extraction,
            FluidTemperatures::Hourly(fluid) => fluid,
        }
    }
}

/// Requests g-values through the cache with the call's settings.
pub(crate) fn gvalues(
    cache: &mut GFunctionCache,
    state: &DepthState,
    config: &SizingConfig,
    times: &[f64],
) -> Result<Vec<f64>, BorefieldError> {
    Ok(cache.calculate(
        times,
        &state.field,
        state.alpha,
        config.interpolate_gfunctions,
        !config.use_precalculated,
    )?)
}

/// Monthly superposition with a peak pulse on top of each month.
pub(crate) fn monthly(
    cache: &mut GFunctionCache,
    state: &DepthState,
    load: &LoadProfile,
    config: &SizingConfig,
) -> Result<TemperatureResult, BorefieldError> {
    let mut elapsed = 0.0;
    let times: Vec<f64> = load
        .hours_per_month()
        .iter()
        .map(|hours| {
            elapsed += hours_to_seconds(*hours);
            elapsed
        })
        .collect();
    let g = gvalues(cache, state, config, &times)?;

    let settings = load.settings();
    let t_ext = settings.peak_duration_extraction.get::<second>();
    let t_inj = settings.peak_duration_injection.get::<second>();
    let (g_ext, g_inj) = if t_ext == t_inj {
        let g = gvalues(cache, state, config, &[t_ext])?;
        (g[0], g[0])
    } else {
        let g = gvalues(cache, state, config, &[t_ext, t_inj])?;
        (g[0], g[1])
    };

    let injection = load.monthly_average_injection();
    let extraction = load.monthly_average_extraction();
    let net_load: Vec<f64> = injection
        .iter()
        .zip(&extraction)
        .map(|(inj, ext)| (inj - ext) * 1000.0)
        .collect();
    let response = superpose(&net_load, &increments(&g));

    let t_g = state.ground_temperature;
    let fluid = state.fluid_response();
    let peak_ext_response = state.ground_response(g_ext) + fluid;
    let peak_inj_response = state.ground_response(g_inj) + fluid;

    let borehole_wall: Vec<f64> = response
        .iter()
        .map(|r| t_g + state.ground_response(*r))
        .collect();

    let months = borehole_wall.len();
    let mut base_injection = Vec::with_capacity(months);
    let mut base_extraction = Vec::with_capacity(months);
    let mut peak_injection = Vec::with_capacity(months);
    let mut peak_extraction = Vec::with_capacity(months);
    let peaks_inj = load.monthly_peak_injection();
    let peaks_ext = load.monthly_peak_extraction();
    for month in 0..months {
        let t_b = borehole_wall[month];
        let base_inj = t_b + injection[month] * 1000.0 * fluid;
        let base_ext = t_b - extraction[month] * 1000.0 * fluid;
        let pulse_inj = (peaks_inj[month] - injection[month]).max(0.0) * 1000.0;
        let pulse_ext = (peaks_ext[month] - extraction[month]).max(0.0) * 1000.0;
        base_injection.push(base_inj);
        base_extraction.push(base_ext);
        peak_injection.push(base_inj + pulse_inj * peak_inj_response);
        peak_extraction.push(base_ext - pulse_ext * peak_ext_response);
    }

    Ok(TemperatureResult {
        depth: state.depth,
        ground_temperature: t_g,
        resistance: state.resistance,
        borehole_wall,
        fluid: FluidTemperatures::Monthly {
            peak_injection,
            peak_extraction,
            base_injection,
            base_extraction,
        },
    })
}

/// Hourly superposition of the net ground load.
pub(crate) fn hourly(
    cache: &mut GFunctionCache,
    state: &DepthState,
    load: &LoadProfile,
    config: &SizingConfig,
) -> Result<TemperatureResult, BorefieldError> {
    let net_load: Vec<f64> = load
        .hourly_load()
        .ok_or(BorefieldError::HourlyLoadRequired)?
        .into_iter()
        .map(|kw| kw * 1000.0)
        .collect();
    let times: Vec<f64> = (1..=net_load.len())
        .map(|hour| hours_to_seconds(hour as f64))
        .collect();
    let g = gvalues(cache, state, config, &times)?;
    let response = superpose(&net_load, &increments(&g));

    let t_g = state.ground_temperature;
    let fluid_response = state.fluid_response();
    let borehole_wall: Vec<f64> = response
        .iter()
        .map(|r| t_g + state.ground_response(*r))
        .collect();
    let fluid = borehole_wall
        .iter()
        .zip(&net_load)
        .map(|(t_b, q)| t_b + q * fluid_response)
        .collect();

    Ok(TemperatureResult {
        depth: state.depth,
        ground_temperature: t_g,
        resistance: state.resistance,
        borehole_wall,
        fluid: FluidTemperatures::Hourly(fluid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::geothermal::borefield::core::test_support::{
        depth_state, logarithmic_cache, monthly_load,
    };

    #[test]
    fn zero_load_stays_at_ground_temperature() {
        let mut cache = logarithmic_cache();
        let state = depth_state(100.0);
        let load = monthly_load([0.0; 12], [0.0; 12], [0.0; 12], [0.0; 12]);
        let result = monthly(&mut cache, &state, &load, &SizingConfig::default()).unwrap();

        assert_eq!(result.borehole_wall.len(), 240);
        for t in &result.borehole_wall {
            assert_relative_eq!(*t, 10.0);
        }
        assert_relative_eq!(result.max_fluid(), 10.0);
        assert_relative_eq!(result.min_fluid(), 10.0);
    }

    #[test]
    fn constant_injection_steps_follow_the_gfunction() {
        let mut cache = logarithmic_cache();
        let state = depth_state(100.0);
        // 730 kWh per month is 1 kW of injection.
        let load = monthly_load([0.0; 12], [730.0; 12], [0.0; 12], [0.0; 12]);
        let result = monthly(&mut cache, &state, &load, &SizingConfig::default()).unwrap();

        let injection = 1000.0;
        let g = gvalues(&mut cache, &state, &SizingConfig::default(), &[730.0 * 3600.0]).unwrap();
        assert_relative_eq!(
            result.borehole_wall[0],
            10.0 + state.ground_response(g[0]) * injection,
            max_relative = 1e-9
        );
        let FluidTemperatures::Monthly { base_injection, peak_injection, .. } = &result.fluid
        else {
            panic!("expected monthly temperatures");
        };
        assert_relative_eq!(
            base_injection[0] - result.borehole_wall[0],
            injection * state.fluid_response(),
            max_relative = 1e-9
        );
        // The peak equals the average, so no pulse is added.
        assert_relative_eq!(peak_injection[5], base_injection[5], max_relative = 1e-12);
        assert!(result.borehole_wall.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn extremes_use_the_quadrant_year() {
        let result = TemperatureResult {
            depth: 100.0,
            ground_temperature: 10.0,
            resistance: 0.1,
            borehole_wall: vec![10.0; 24],
            fluid: FluidTemperatures::Monthly {
                peak_injection: (0..24).map(f64::from).collect(),
                peak_extraction: (0..24).map(|m| -f64::from(m)).collect(),
                base_injection: vec![10.0; 24],
                base_extraction: vec![10.0; 24],
            },
        };
        assert_relative_eq!(result.extreme(Quadrant::One), 11.0);
        assert_relative_eq!(result.extreme(Quadrant::Two), 23.0);
        assert_relative_eq!(result.extreme(Quadrant::Three), -11.0);
        assert_relative_eq!(result.extreme(Quadrant::Four), -23.0);
        assert_relative_eq!(result.mean_fluid(), 10.0);
    }

    #[test]
    fn last_year_quadrants_scan_the_whole_period() {
        let mut peak_injection = vec![12.0; 36];
        peak_injection[17] = 19.0;
        let mut peak_extraction = vec![4.0; 36];
        peak_extraction[14] = -3.0;
        let result = TemperatureResult {
            depth: 100.0,
            ground_temperature: 10.0,
            resistance: 0.1,
            borehole_wall: vec![10.0; 36],
            fluid: FluidTemperatures::Monthly {
                peak_injection,
                peak_extraction,
                base_injection: vec![10.0; 36],
                base_extraction: vec![10.0; 36],
            },
        };
        assert_relative_eq!(result.extreme(Quadrant::One), 12.0);
        assert_relative_eq!(result.extreme(Quadrant::Two), 19.0);
        assert_relative_eq!(result.extreme(Quadrant::Three), 4.0);
        assert_relative_eq!(result.extreme(Quadrant::Four), -3.0);
    }
}
