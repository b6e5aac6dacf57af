use std::{collections::BTreeMap, f64::consts::PI};

use libm::erf;
use uom::si::length::meter;

use crate::support::borehole::BoreholeField;

use super::{GFunctionCalculator, GFunctionError, GFunctionOptions};

/// Gauss-Legendre nodes and weights on `[-1, 1]` (eight points).
const GAUSS_NODES: [f64; 8] = [
    -0.960_289_856_497_536_3,
    -0.796_666_477_413_626_7,
    -0.525_532_409_916_329_0,
    -0.183_434_642_495_649_8,
    0.183_434_642_495_649_8,
    0.525_532_409_916_329_0,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_3,
];
const GAUSS_WEIGHTS: [f64; 8] = [
    0.101_228_536_290_376_3,
    0.222_381_034_453_374_5,
    0.313_706_645_877_887_3,
    0.362_683_783_378_362_0,
    0.362_683_783_378_362_0,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
];

/// Segments used for the integral beyond the shortest time.
const TAIL_SEGMENTS: usize = 64;

/// Distances closer than this (m) share one response.
const DISTANCE_RESOLUTION: f64 = 1e-6;

/// Finite line source g-function with uniform heat flux.
///
/// Each borehole is a line source of length `H` buried at `D`, mirrored
/// above the surface. The field response is the average over all borehole
/// pairs; pairs at equal distance share one evaluation. The self response
/// uses the borehole radius as distance.
///
/// The single-pair response is the Claesson–Javed integral
///
/// ```text
/// h(d, t) = ∫_{1/√(4αt)}^{∞} exp(−d²s²) / s² · Y(s) / (2H) ds
/// Y(s)    = 2 ierf(Hs) + 2 ierf((H + 2D)s) − ierf(2(H + D)s) − ierf(2Ds)
/// ```
///
/// integrated with Gauss-Legendre panels in `ln s`. Each time extends the
/// integral of the previous (shorter) time, so a whole curve costs one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiniteLineSource;

impl GFunctionCalculator for FiniteLineSource {
    fn compute(
        &self,
        field: &BoreholeField,
        alpha: f64,
        times: &[f64],
        options: &GFunctionOptions,
    ) -> Result<Vec<f64>, GFunctionError> {
        let first = &field.boreholes()[0];
        let depth = first.depth().get::<meter>();
        let buried = first.buried_depth().get::<meter>();
        let radius = first.radius().get::<meter>();

        if !(depth > radius) {
            return Err(GFunctionError::DegenerateField("radius exceeds depth"));
        }
        if let Some(layout) = field.layout() {
            let spacing = layout.b1.get::<meter>().min(layout.b2.get::<meter>());
            if radius > spacing {
                return Err(GFunctionError::DegenerateField("radius exceeds spacing"));
            }
        }
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(GFunctionError::DegenerateField("diffusivity must be positive"));
        }
        if times.iter().any(|t| !(t.is_finite() && *t >= 0.0)) {
            return Err(GFunctionError::InvalidTimes);
        }

        // Evaluate on the distinct positive times, shortest first.
        let mut distinct: Vec<f64> = times.iter().copied().filter(|&t| t > 0.0).collect();
        if let Some(threshold) = options.linear_threshold {
            distinct.retain(|&t| t >= threshold);
            distinct.push(threshold);
        }
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();

        let groups = distance_groups(field, radius);
        let source = Source {
            depth,
            buried,
            alpha,
        };
        let mut g = vec![0.0; distinct.len()];
        for (distance, weight) in &groups {
            for (value, h) in g.iter_mut().zip(source.response(*distance, &distinct)) {
                *value += weight * h;
            }
        }

        if options.cylindrical_correction {
            for (value, &t) in g.iter_mut().zip(&distinct) {
                *value += cylindrical_correction(alpha * t / (radius * radius));
            }
        }

        let lookup = |t: f64| -> f64 {
            if t <= 0.0 {
                return 0.0;
            }
            if let Some(threshold) = options.linear_threshold {
                if t < threshold {
                    return at(&distinct, &g, threshold) * t / threshold;
                }
            }
            at(&distinct, &g, t)
        };
        Ok(times.iter().map(|&t| lookup(t)).collect())
    }
}

/// Value stored for time `t` in an ascending time list.
fn at(distinct: &[f64], g: &[f64], t: f64) -> f64 {
    distinct
        .binary_search_by(|probe| probe.total_cmp(&t))
        .map_or(0.0, |index| g[index])
}

/// Pair distances with their weight `count / n`; the self pair uses `radius`.
fn distance_groups(field: &BoreholeField, radius: f64) -> Vec<(f64, f64)> {
    let boreholes = field.boreholes();
    let n = boreholes.len() as f64;

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for (i, a) in boreholes.iter().enumerate() {
        for (j, b) in boreholes.iter().enumerate() {
            let distance = if i == j { radius } else { a.distance_to(b) };
            let key = (distance / DISTANCE_RESOLUTION).round() as i64;
            *counts.entry(key).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(key, count)| (key as f64 * DISTANCE_RESOLUTION, count as f64 / n))
        .collect()
}

struct Source {
    depth: f64,
    buried: f64,
    alpha: f64,
}

impl Source {
    /// Pair response at distance `d` for ascending times.
    ///
    /// The lower integration bound falls as time grows, so each later time
    /// adds one panel to the integral of the previous one.
    fn response(&self, d: f64, times: &[f64]) -> Vec<f64> {
        let bounds: Vec<f64> = times
            .iter()
            .map(|t| 1.0 / (4.0 * self.alpha * t).sqrt())
            .collect();
        let Some(&first) = bounds.first() else {
            return Vec::new();
        };

        let upper = first + 10.0 / d;
        let (u_lo, u_hi) = (first.ln(), upper.ln());
        let step = (u_hi - u_lo) / TAIL_SEGMENTS as f64;
        let mut integral: f64 = (0..TAIL_SEGMENTS)
            .map(|k| {
                let a = (u_lo + k as f64 * step).exp();
                let b = (u_lo + (k + 1) as f64 * step).exp();
                self.panel(d, a, b)
            })
            .sum();

        let mut out = Vec::with_capacity(bounds.len());
        out.push(integral);
        for pair in bounds.windows(2) {
            integral += self.panel(d, pair[1], pair[0]);
            out.push(integral);
        }
        out
    }

    /// Integral over `[a, b]` of the pair integrand, with `u = ln s`.
    fn panel(&self, d: f64, a: f64, b: f64) -> f64 {
        let (u_a, u_b) = (a.ln(), b.ln());
        let half = 0.5 * (u_b - u_a);
        let mid = 0.5 * (u_b + u_a);
        let sum: f64 = GAUSS_NODES
            .iter()
            .zip(GAUSS_WEIGHTS)
            .map(|(x, w)| {
                let s = (mid + half * x).exp();
                w * self.integrand(d, s) * s
            })
            .sum();
        sum * half
    }

    fn integrand(&self, d: f64, s: f64) -> f64 {
        let (h, b) = (self.depth, self.buried);
        let y = 2.0 * ierf(h * s) + 2.0 * ierf((h + 2.0 * b) * s)
            - ierf(2.0 * (h + b) * s)
            - ierf(2.0 * b * s);
        (-d * d * s * s).exp() / (s * s) * y / (2.0 * h)
    }
}

/// Integrated error function `x·erf(x) − (1 − exp(−x²))/√π`.
fn ierf(x: f64) -> f64 {
    x * erf(x) - (1.0 - (-x * x).exp()) / PI.sqrt()
}

/// Difference between the cylindrical and the infinite line source self
/// response at Fourier number `fo`.
///
/// The cylinder uses Bernier's fit `G(Fo)` of the cylindrical heat source.
/// The fit drifts by a few percent for large `Fo`, where the true difference
/// is negligible, so the correction fades out between `Fo = 10` and `100`.
fn cylindrical_correction(fo: f64) -> f64 {
    let x = fo.log10();
    let fade = (2.0 - x).clamp(0.0, 1.0);
    if fade == 0.0 {
        return 0.0;
    }
    let g_cyl = 10f64.powf(-0.891_29 + 0.360_81 * x - 0.055_08 * x * x + 3.596_17e-3 * x * x * x);
    fade * (2.0 * PI * g_cyl - 0.5 * exp_integral(1.0 / (4.0 * fo)))
}

/// Exponential integral `E1(x)` for `x > 0`.
fn exp_integral(x: f64) -> f64 {
    const EULER: f64 = 0.577_215_664_901_532_9;

    if x <= 1.0 {
        let mut sum = 0.0;
        let mut term = 1.0;
        for k in 1..=60 {
            term *= -x / k as f64;
            let contribution = -term / k as f64;
            sum += contribution;
            if contribution.abs() < 1e-16 * sum.abs() {
                break;
            }
        }
        -EULER - x.ln() + sum
    } else {
        // Modified Lentz continued fraction.
        let mut b = x + 1.0;
        let mut c = 1.0 / f64::MIN_POSITIVE;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=200 {
            let a = -(i * i) as f64;
            b += 2.0;
            d = 1.0 / (a * d + b);
            c = b + a / c;
            let delta = c * d;
            h *= delta;
            if (delta - 1.0).abs() < 1e-15 {
                break;
            }
        }
        h * (-x).exp()
    }
}
