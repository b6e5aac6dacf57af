use std::f64::consts::PI;

use crate::support::{gfunction::GFunctionCache, load::LoadProfile};

use super::super::{BorefieldError, Quadrant, SizingConfig, system::DepthState, temperature::gvalues};

/// Next depth (m) from the three-pulse laws.
///
/// Last-year quadrants superpose the yearly average, the peak month and the
/// peak (Bernier); first-year quadrants superpose the months before the peak
/// month, the peak month and the peak (Carcel). A non-positive result means
/// the quadrant needs no borefield.
pub(super) fn next_depth(
    cache: &mut GFunctionCache,
    state: &DepthState,
    load: &LoadProfile,
    quadrant: Quadrant,
    limit: f64,
    config: &SizingConfig,
) -> Result<f64, BorefieldError> {
    let heating = quadrant.is_heating_limited();
    let two_pi_k = 2.0 * PI * state.conductivity;
    let headroom = (limit - state.ground_temperature).abs();
    let rb = state.resistance;

    let length = if quadrant.is_last_year() {
        let p = load.last_year_params(heating);
        let g = gvalues(
            cache,
            state,
            config,
            &[p.t_peak, p.t_peak + p.t_month, p.t_total],
        )?;
        let r_annual = (g[2] - g[1]) / two_pi_k;
        let r_month = (g[1] - g[0]) / two_pi_k;
        let r_peak = g[0] / two_pi_k;
        (p.q_annual * r_annual + p.q_monthly * r_month + p.q_peak * (r_peak + rb)) / headroom
    } else {
        let p = load.first_year_params(heating);
        let g = gvalues(
            cache,
            state,
            config,
            &[p.t_peak, p.t_peak + p.t_month, p.t_month_end + p.t_peak],
        )?;
        let r_preceding = (g[2] - g[1]) / two_pi_k;
        let r_month = (g[1] - g[0]) / two_pi_k;
        let r_peak = g[0] / two_pi_k;
        (p.q_peak * (rb + r_peak) + p.q_monthly * r_month + p.q_preceding * r_preceding)
            / headroom
    };

    Ok(length / state.field.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        models::geothermal::borefield::core::test_support::{depth_state, monthly_load},
        support::{borehole::BoreholeField, gfunction::GFunctionOptions},
    };

    const TWO_PI_K: f64 = 2.0 * PI * 3.0;

    /// g = 2 up to a day, 3 up to 3 Ms, 4 up to a year and 6 after.
    fn stepped_cache() -> GFunctionCache {
        GFunctionCache::new(
            |_: &BoreholeField, _: f64, times: &[f64], _: &GFunctionOptions| {
                Ok(times
                    .iter()
                    .map(|&t| match t {
                        t if t <= 86_400.0 => 2.0,
                        t if t <= 3.0e6 => 3.0,
                        t if t <= 31_536_000.0 => 4.0,
                        _ => 6.0,
                    })
                    .collect())
            },
        )
    }

    /// Exact g-values at the requested times, without the grid.
    fn exact() -> SizingConfig {
        SizingConfig {
            use_precalculated: false,
            ..SizingConfig::default()
        }
    }

    #[test]
    fn last_year_law() {
        // 1 kW extracted on average, 10 kW peaks.
        let load = monthly_load([730.0; 12], [0.0; 12], [10.0; 12], [0.0; 12]);
        let state = depth_state(100.0);
        let mut cache = stepped_cache();
        let depth = next_depth(&mut cache, &state, &load, Quadrant::Four, 0.0, &exact()).unwrap();

        // g = [2, 3, 6]: annual 3, monthly 1, peak 2.
        let total = (1000.0 * 3.0 + 1000.0 * 1.0 + 10_000.0 * 2.0) / TWO_PI_K + 10_000.0 * 0.2;
        assert_relative_eq!(depth, total / 10.0 / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn first_year_law() {
        let mut peaks = [0.0; 12];
        peaks[2] = 10.0;
        let load = monthly_load([730.0; 12], [0.0; 12], peaks, [0.0; 12]);
        let state = depth_state(100.0);
        let mut cache = stepped_cache();
        let depth = next_depth(&mut cache, &state, &load, Quadrant::Three, 0.0, &exact()).unwrap();

        // Peak in the third month; g = [2, 3, 4]: preceding 1, monthly 1, peak 2.
        let total =
            10_000.0 * (0.2 + 2.0 / TWO_PI_K) + 1000.0 * 1.0 / TWO_PI_K + 1000.0 * 1.0 / TWO_PI_K;
        assert_relative_eq!(depth, total / 10.0 / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn no_load_needs_no_field() {
        let load = monthly_load([0.0; 12], [0.0; 12], [0.0; 12], [0.0; 12]);
        let state = depth_state(100.0);
        let mut cache = stepped_cache();
        let depth = next_depth(&mut cache, &state, &load, Quadrant::Four, 0.0, &exact()).unwrap();
        assert!(depth <= 0.0);
    }
}
