//! Fixed-point depth sizing.
//!
//! Each candidate quadrant is sized on its own: starting from the configured
//! depth, the sizing law proposes a new depth from the temperatures (L3, L4)
//! or the three-pulse parameters (L2) at the current one, until two depths
//! differ by less than the tolerance. The deepest quadrant limits the field.
//!
//! With temperature-dependent efficiencies the whole search is repeated:
//! the fluid temperatures at the sized depth are fed back into the load,
//! until they move less than the efficiency tolerance between passes. A
//! search that runs out of passes keeps its last depth and warns.
//!
//! # Observer Events
//!
//! One [`SizingEvent::Iteration`] is emitted per step and one
//! [`SizingEvent::Warning`] per warning. Returning [`SizingAction::StopEarly`]
//! from an iteration event ends that quadrant with its latest depth.

mod l2;

use std::borrow::Cow;

use twine_core::Observer;
use uom::si::{f64::Length, length::meter, temperature_interval::kelvin as delta_kelvin};

use crate::support::{
    gfunction::{GFunctionCache, GFunctionWarning},
    load::{LoadProfile, OperatingTemperatures},
};

use super::{
    BorefieldError, Quadrant, QuadrantChoice, SizingAction, SizingEvent, SizingMethod,
    SizingWarning,
    system::{DepthState, System},
    temperature::{self, TemperatureResult},
};

/// How a quadrant's iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingStatus {
    /// Two successive depths differ by less than the tolerance.
    Converged,

    /// The quadrant needs no borefield; its depth is zero.
    NotLimiting,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The sizing of one quadrant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantSizing {
    pub quadrant: Quadrant,
    /// Required depth (m), zero when the quadrant does not limit.
    pub depth: f64,
    pub iterations: usize,
    pub status: SizingStatus,
}

/// Result of a sizing call.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingOutcome {
    /// Required borehole depth.
    pub depth: Length,
    pub method: SizingMethod,
    pub limiting_quadrant: Quadrant,
    /// Every quadrant that was sized, in sizing order.
    pub quadrants: Vec<QuadrantSizing>,
    pub warnings: Vec<SizingWarning>,
}

impl SizingOutcome {
    /// Depth (m) of `quadrant`, if it was sized.
    #[must_use]
    pub fn quadrant_depth(&self, quadrant: Quadrant) -> Option<f64> {
        self.quadrants
            .iter()
            .find(|q| q.quadrant == quadrant)
            .map(|q| q.depth)
    }
}

/// Sizes the borefield for `load`.
pub(crate) fn size<Obs>(
    system: &System<'_>,
    load: &LoadProfile,
    cache: &mut GFunctionCache,
    observer: &mut Obs,
) -> Result<SizingOutcome, BorefieldError>
where
    Obs: Observer<SizingEvent, SizingAction>,
{
    let config = system.config;
    if config.method == SizingMethod::L4 && !load.is_hourly() {
        return Err(BorefieldError::HourlyLoadRequired);
    }

    let quadrants = match config.quadrant {
        QuadrantChoice::Auto => Quadrant::candidates(load.imbalance()).to_vec(),
        QuadrantChoice::Fixed(quadrant) => vec![quadrant],
    };
    let feedback = config.method != SizingMethod::L2 && load.is_temperature_dependent();
    let tolerance = config.efficiency_tolerance.get::<delta_kelvin>();

    let mut sizer = Sizer {
        system,
        cache,
        observer,
        warnings: Vec::new(),
    };
    let mut load = Cow::Borrowed(load);
    let mut pass = 0;

    loop {
        let sized = quadrants
            .iter()
            .map(|&quadrant| sizer.quadrant(quadrant, &load))
            .collect::<Result<Vec<_>, _>>()?;
        let limiting = sized
            .iter()
            .copied()
            .filter(|q| q.depth > 0.0)
            .reduce(|deepest, q| if q.depth > deepest.depth { q } else { deepest })
            .ok_or(BorefieldError::NoLimitingQuadrant)?;

        let settled = if !feedback {
            true
        } else if pass >= config.max_efficiency_iterations {
            sizer.warn(SizingWarning::NonConvergence {
                method: config.method,
                quadrant: limiting.quadrant,
                depth: limiting.depth,
            });
            true
        } else {
            let state = system.at(limiting.depth, None)?;
            let result = sizer.simulate(&state, &load)?;
            let temperatures = result.operating_temperatures();
            let change = load
                .operating_temperatures()
                .map_or(f64::INFINITY, |previous| largest_change(previous, &temperatures));
            if change >= tolerance {
                load.to_mut().apply_operating_temperatures(temperatures)?;
            }
            change < tolerance
        };
        pass += 1;

        if settled {
            if limiting.depth < config.shallow_depth.get::<meter>() {
                sizer.warn(SizingWarning::ShallowField {
                    depth: limiting.depth,
                });
            }
            return Ok(SizingOutcome {
                depth: Length::new::<meter>(limiting.depth),
                method: config.method,
                limiting_quadrant: limiting.quadrant,
                quadrants: sized,
                warnings: sizer.warnings,
            });
        }
    }
}

/// Temperatures at one depth with the method's time resolution.
fn simulate(
    cache: &mut GFunctionCache,
    state: &DepthState,
    load: &LoadProfile,
    system: &System<'_>,
) -> Result<TemperatureResult, BorefieldError> {
    match system.config.method {
        SizingMethod::L2 | SizingMethod::L3 => temperature::monthly(cache, state, load, system.config),
        SizingMethod::L4 => temperature::hourly(cache, state, load, system.config),
    }
}

struct Sizer<'s, 'c, 'o, Obs> {
    system: &'s System<'s>,
    cache: &'c mut GFunctionCache,
    observer: &'o mut Obs,
    warnings: Vec<SizingWarning>,
}

impl<Obs> Sizer<'_, '_, '_, Obs>
where
    Obs: Observer<SizingEvent, SizingAction>,
{
    fn quadrant(
        &mut self,
        quadrant: Quadrant,
        load: &LoadProfile,
    ) -> Result<QuadrantSizing, BorefieldError> {
        let config = self.system.config;
        let tolerance = config.tolerance.get::<meter>();
        let ceiling = config.depth_ceiling.get::<meter>();
        let depth_dependent = self.system.is_depth_dependent();
        let (t_min, t_max) = self.system.limits();
        let limit = if quadrant.is_heating_limited() {
            t_min
        } else {
            t_max
        };

        let mut depth = config.start();
        let mut fluid_temperature = None;

        for iteration in 1..=config.max_iterations {
            let state = self.system.at(depth, fluid_temperature)?;
            let headroom = limit - state.ground_temperature;
            let wrong_side = if quadrant.is_heating_limited() {
                headroom >= 0.0
            } else {
                headroom <= 0.0
            };
            if wrong_side {
                return Err(BorefieldError::UnsolvableDepth { depth });
            }

            let next = match config.method {
                SizingMethod::L2 => l2::next_depth(self.cache, &state, load, quadrant, limit, config),
                SizingMethod::L3 | SizingMethod::L4 => {
                    let result = self.simulate(&state, load)?;
                    fluid_temperature = Some(result.mean_fluid());
                    let ratio = (result.extreme(quadrant) - state.ground_temperature) / headroom;
                    Ok(ratio.max(0.0) * depth)
                }
            };
            self.drain_cache();
            let next = next?;

            if next <= 0.0 {
                return Ok(QuadrantSizing {
                    quadrant,
                    depth: 0.0,
                    iterations: iteration,
                    status: SizingStatus::NotLimiting,
                });
            }
            if !next.is_finite() || (depth_dependent && next > ceiling) {
                return Err(BorefieldError::UnsolvableDepth { depth: next });
            }

            let action = self.observer.observe(&SizingEvent::Iteration {
                method: config.method,
                quadrant,
                iteration,
                depth,
                next_depth: next,
            });

            if (next - depth).abs() < tolerance {
                return Ok(QuadrantSizing {
                    quadrant,
                    depth: next,
                    iterations: iteration,
                    status: SizingStatus::Converged,
                });
            }
            if action == Some(SizingAction::StopEarly) {
                return Ok(self.unconverged(quadrant, next, iteration, SizingStatus::StoppedByObserver));
            }
            depth = next;
        }

        Ok(self.unconverged(quadrant, depth, config.max_iterations, SizingStatus::MaxIters))
    }

    fn unconverged(
        &mut self,
        quadrant: Quadrant,
        depth: f64,
        iterations: usize,
        status: SizingStatus,
    ) -> QuadrantSizing {
        self.warn(SizingWarning::NonConvergence {
            method: self.system.config.method,
            quadrant,
            depth,
        });
        QuadrantSizing {
            quadrant,
            depth,
            iterations,
            status,
        }
    }

    fn simulate(
        &mut self,
        state: &DepthState,
        load: &LoadProfile,
    ) -> Result<TemperatureResult, BorefieldError> {
        simulate(self.cache, state, load, self.system)
    }

    fn drain_cache(&mut self) {
        for warning in self.cache.take_warnings() {
            self.warn(match warning {
                GFunctionWarning::NegativeValues { depth } => {
                    SizingWarning::NegativeGFunction { depth }
                }
                GFunctionWarning::OutOfRange { depth } => SizingWarning::OutOfRange { depth },
            });
        }
    }

    fn warn(&mut self, warning: SizingWarning) {
        let _ = self.observer.observe(&SizingEvent::Warning(warning));
        self.warnings.push(warning);
    }
}

/// Largest absolute difference between two operating temperature sets (K).
fn largest_change(a: &OperatingTemperatures, b: &OperatingTemperatures) -> f64 {
    let max_diff = |x: &[f64], y: &[f64]| {
        if x.len() != y.len() {
            return f64::INFINITY;
        }
        x.iter()
            .zip(y)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    };
    match (a, b) {
        (
            OperatingTemperatures::Monthly {
                base_extraction: be_a,
                base_injection: bi_a,
                peak_extraction: pe_a,
                peak_injection: pi_a,
            },
            OperatingTemperatures::Monthly {
                base_extraction: be_b,
                base_injection: bi_b,
                peak_extraction: pe_b,
                peak_injection: pi_b,
            },
        ) => max_diff(be_a, be_b)
            .max(max_diff(bi_a, bi_b))
            .max(max_diff(pe_a, pe_b))
            .max(max_diff(pi_a, pi_b)),
        (OperatingTemperatures::Hourly(a), OperatingTemperatures::Hourly(b)) => max_diff(a, b),
        _ => f64::INFINITY,
    }
}
