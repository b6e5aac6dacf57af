use uom::si::length::meter;

use crate::support::{
    borehole::{BoreholeField, FieldKey},
    table::{Table1D, Table2D},
};

use super::{
    GFunctionCalculator, GFunctionError, GFunctionOptions, GFunctionWarning,
    PrecomputedGFunctions, TimeGrid, history::DepthHistory,
};

/// Tuning of a [`GFunctionCache`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheOptions {
    /// When `false`, every request is computed directly and nothing is stored.
    pub enabled: bool,

    /// Stored depths within this distance (m) are reused as is.
    pub depth_match: f64,

    /// Two stored depths bracketing the request are interpolated when each
    /// lies within this fraction of the requested depth.
    pub interpolation_fraction: f64,

    /// Minimum horizon (s) of the stored time grid.
    pub horizon: f64,

    /// Recompute with the cylindrical correction when g-values come out
    /// zero or negative.
    pub cylindrical_when_negative: bool,

    /// Options forwarded to the calculator.
    pub gfunction: GFunctionOptions,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            depth_match: 1.0,
            interpolation_fraction: 0.25,
            horizon: TimeGrid::DEFAULT_HORIZON,
            cylindrical_when_negative: true,
            gfunction: GFunctionOptions::default(),
        }
    }
}

/// The `(field, alpha)` pair all stored curves belong to.
#[derive(Debug, Clone, PartialEq)]
struct Family {
    field: FieldKey,
    alpha: u64,
}

impl Family {
    fn of(field: &BoreholeField, alpha: f64) -> Self {
        Self {
            field: field.key(),
            alpha: alpha.to_bits(),
        }
    }
}

/// How a request is answered from the stored curves.
enum Answer {
    Stored(usize),
    Between(usize, usize),
    Compute,
}

/// Depth-indexed store of g-function curves with just-in-time computation.
///
/// All curves share one [`TimeGrid`] and belong to one borefield geometry
/// and diffusivity; a request for another geometry or diffusivity empties
/// the store. For a request at depth `H`:
///
/// 1. a stored depth within [`CacheOptions::depth_match`] is reused,
/// 2. otherwise two stored depths around `H`, each within
///    [`CacheOptions::interpolation_fraction`]` · H`, are interpolated,
/// 3. otherwise the curve is computed on the grid and stored.
///
/// Answers are read from the grid by linear interpolation in time. A depth
/// that returns after other requests without being stored skips steps 1 and
/// 2 (see the depth history), which keeps fixed-point sizing from cycling.
pub struct GFunctionCache {
    calculator: Box<dyn GFunctionCalculator>,
    options: CacheOptions,
    family: Option<Family>,
    grid: Option<TimeGrid>,
    depths: Vec<f64>,
    curves: Vec<Vec<f64>>,
    history: DepthHistory,
    dataset_range: Option<(f64, f64)>,
    warnings: Vec<GFunctionWarning>,
    computations: usize,
}

impl GFunctionCache {
    /// Creates an empty cache with default options.
    pub fn new(calculator: impl GFunctionCalculator + 'static) -> Self {
        Self::with_options(calculator, CacheOptions::default())
    }

    pub fn with_options(calculator: impl GFunctionCalculator + 'static, options: CacheOptions) -> Self {
        Self {
            calculator: Box::new(calculator),
            options,
            family: None,
            grid: None,
            depths: Vec::new(),
            curves: Vec::new(),
            history: DepthHistory::default(),
            dataset_range: None,
            warnings: Vec::new(),
            computations: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Replaces the options and empties the store.
    pub fn set_options(&mut self, options: CacheOptions) {
        self.options = options;
        self.clear();
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.family = None;
        self.grid = None;
        self.depths.clear();
        self.curves.clear();
        self.history.clear();
        self.dataset_range = None;
    }

    /// Depths with a stored curve, increasing.
    #[must_use]
    pub fn stored_depths(&self) -> &[f64] {
        &self.depths
    }

    /// The grid stored curves are sampled on.
    #[must_use]
    pub fn time_grid(&self) -> Option<&TimeGrid> {
        self.grid.as_ref()
    }

    /// Number of calculator calls made so far.
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Drains the warnings noticed since the last call.
    pub fn take_warnings(&mut self) -> Vec<GFunctionWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Seeds the store with precomputed curves for `field` and `alpha`.
    ///
    /// The dataset's time axis becomes the grid. Requests outside its depth
    /// or time range are computed and reported as
    /// [`GFunctionWarning::OutOfRange`].
    pub fn load_precomputed(
        &mut self,
        dataset: PrecomputedGFunctions,
        field: &BoreholeField,
        alpha: f64,
    ) {
        self.clear();
        self.dataset_range = Some(dataset.depth_range());
        let (time, curves) = dataset.into_parts();
        self.family = Some(Family::of(field, alpha));
        self.grid = Some(TimeGrid::from_times(time));
        (self.depths, self.curves) = curves.into_iter().unzip();
    }

    /// Returns g-values of `field` at its current depth for each time (s).
    ///
    /// With `interpolate = false` stored curves are only reused for matching
    /// depths. With `force_compute` (or a disabled cache) the calculator is
    /// called on `times` directly and nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`GFunctionError`] if a time is invalid or the calculator
    /// fails; the store is left unchanged.
    pub fn calculate(
        &mut self,
        times: &[f64],
        field: &BoreholeField,
        alpha: f64,
        interpolate: bool,
        force_compute: bool,
    ) -> Result<Vec<f64>, GFunctionError> {
        if times.iter().any(|t| !(t.is_finite() && *t >= 0.0)) {
            return Err(GFunctionError::InvalidTimes);
        }
        if times.is_empty() {
            return Ok(Vec::new());
        }

        if force_compute || !self.options.enabled {
            return self.compute(field, alpha, times);
        }

        let depth = field.depth().get::<meter>();
        let family = Family::of(field, alpha);
        let t_max = times.iter().copied().fold(0.0, f64::max);

        let same_family = self.family.as_ref() == Some(&family);
        let grid_fits = self.grid.as_ref().is_some_and(|g| g.max_time() >= t_max);

        if same_family && grid_fits {
            let answer = self.answer(depth, interpolate);
            let values = match answer {
                Answer::Stored(i) => Some(self.read(i, times)?),
                Answer::Between(lo, hi) => Some(self.read_between(lo, hi, depth, times)?),
                Answer::Compute => None,
            };
            if let Some(values) = values {
                self.history.push(depth);
                return Ok(values);
            }
        }

        let out_of_range = self
            .dataset_range
            .is_some_and(|(lo, hi)| !grid_fits || depth < lo || depth > hi);

        let grid = match &self.grid {
            Some(grid) if same_family && grid_fits => grid.clone(),
            _ => TimeGrid::covering(t_max.max(self.options.horizon)),
        };
        let curve = self.compute(field, alpha, grid.times())?;

        if out_of_range {
            self.warnings.push(GFunctionWarning::OutOfRange { depth });
        }
        if !same_family {
            self.clear();
            self.family = Some(family);
        }
        if !(same_family && grid_fits) {
            self.depths.clear();
            self.curves.clear();
            self.dataset_range = None;
            self.grid = Some(grid);
        }

        let index = self.depths.partition_point(|&d| d < depth);
        if self.depths.get(index) == Some(&depth) {
            self.curves[index] = curve;
        } else {
            self.depths.insert(index, depth);
            self.curves.insert(index, curve);
        }
        self.history.push(depth);
        self.read(index, times)
    }

    /// Decides how a request at `depth` is served from the store.
    fn answer(&self, depth: f64, interpolate: bool) -> Answer {
        let stored = self.depths.contains(&depth);
        if self.history.revisits(depth) && !stored {
            return Answer::Compute;
        }

        let nearest = self
            .depths
            .iter()
            .enumerate()
            .map(|(i, d)| (i, (d - depth).abs()))
            .filter(|&(_, gap)| gap <= self.options.depth_match)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, _)) = nearest {
            return Answer::Stored(i);
        }

        if interpolate {
            let hi = self.depths.partition_point(|&d| d < depth);
            if hi > 0 && hi < self.depths.len() {
                let lo = hi - 1;
                let reach = self.options.interpolation_fraction * depth;
                if depth - self.depths[lo] <= reach && self.depths[hi] - depth <= reach {
                    return Answer::Between(lo, hi);
                }
            }
        }
        Answer::Compute
    }

    /// Grid times and the stored curve, both starting from the origin.
    fn axis(&self, index: usize) -> (Vec<f64>, Vec<f64>) {
        let grid = self.grid.as_ref().map_or(&[][..], TimeGrid::times);
        let x = std::iter::once(0.0).chain(grid.iter().copied()).collect();
        let y = std::iter::once(0.0)
            .chain(self.curves[index].iter().copied())
            .collect();
        (x, y)
    }

    fn read(&self, index: usize, times: &[f64]) -> Result<Vec<f64>, GFunctionError> {
        let (x, y) = self.axis(index);
        Ok(Table1D::new(x, y)?.eval_many(times)?)
    }

    fn read_between(
        &self,
        lo: usize,
        hi: usize,
        depth: f64,
        times: &[f64],
    ) -> Result<Vec<f64>, GFunctionError> {
        let (x, lower) = self.axis(lo);
        let (_, upper) = self.axis(hi);
        let table = Table2D::new(
            vec![self.depths[lo], self.depths[hi]],
            x,
            vec![lower, upper],
        )?;
        times
            .iter()
            .map(|&t| table.eval(depth, t).map_err(Into::into))
            .collect()
    }

    /// Calls the calculator and checks its answer.
    fn compute(
        &mut self,
        field: &BoreholeField,
        alpha: f64,
        times: &[f64],
    ) -> Result<Vec<f64>, GFunctionError> {
        let options = self.options.gfunction;
        let values = self.checked(field, alpha, times, &options)?;

        let negative = times.iter().zip(&values).any(|(&t, &g)| t > 0.0 && g <= 0.0);
        if !negative {
            return Ok(values);
        }

        let depth = field.depth().get::<meter>();
        self.warnings.push(GFunctionWarning::NegativeValues { depth });
        if self.options.cylindrical_when_negative && !options.cylindrical_correction {
            let corrected = GFunctionOptions {
                cylindrical_correction: true,
                ..options
            };
            return self.checked(field, alpha, times, &corrected);
        }
        Ok(values)
    }

    fn checked(
        &mut self,
        field: &BoreholeField,
        alpha: f64,
        times: &[f64],
        options: &GFunctionOptions,
    ) -> Result<Vec<f64>, GFunctionError> {
        self.computations += 1;
        let values = self.calculator.compute(field, alpha, times, options)?;
        if values.len() != times.len() {
            return Err(GFunctionError::LengthMismatch {
                expected: times.len(),
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|g| !g.is_finite()) {
            return Err(GFunctionError::NonFinite(index));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::Cell, rc::Rc};

    use approx::assert_relative_eq;
    use uom::si::f64::Length;

    use crate::support::pipe::BoxedError;

    const ALPHA: f64 = 1.25e-6;

    fn field(depth: f64) -> BoreholeField {
        let m = Length::new::<meter>;
        BoreholeField::rectangular(2, 2, m(6.0), m(6.0), m(depth), m(4.0), m(0.075)).unwrap()
    }

    /// A smooth synthetic g-function that is linear in depth.
    fn synthetic(field: &BoreholeField, t: f64) -> f64 {
        let h = field.depth().get::<meter>();
        (1.0 + t / 3600.0).ln() * (1.0 + h / 100.0)
    }

    /// Cache over the synthetic g-function, plus a counter of calculator calls.
    fn counting_cache() -> (GFunctionCache, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let calculator =
            move |field: &BoreholeField, _: f64, times: &[f64], _: &GFunctionOptions| {
                counter.set(counter.get() + 1);
                Ok(times.iter().map(|&t| synthetic(field, t)).collect())
            };
        (GFunctionCache::new(calculator), calls)
    }

    #[test]
    fn stored_depth_returns_stored_values() {
        let (mut cache, calls) = counting_cache();
        let grid = TimeGrid::default();

        let first = cache.calculate(grid.times(), &field(100.0), ALPHA, true, false).unwrap();
        let again = cache.calculate(grid.times(), &field(100.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 1);
        for ((a, b), &t) in first.iter().zip(&again).zip(grid.times()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
            assert_relative_eq!(*a, synthetic(&field(100.0), t), max_relative = 1e-12);
        }
    }

    #[test]
    fn near_depth_is_reused() {
        let (mut cache, calls) = counting_cache();
        let times = [3600.0, 86_400.0];
        cache.calculate(&times, &field(100.0), ALPHA, true, false).unwrap();
        let near = cache.calculate(&times, &field(100.8), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 1);
        assert_relative_eq!(near[0], synthetic(&field(100.0), 3600.0), max_relative = 1e-12);
    }

    #[test]
    fn bracketed_depth_is_interpolated() {
        let (mut cache, calls) = counting_cache();
        let times = [7200.0, 1e8];
        cache.calculate(&times, &field(100.0), ALPHA, true, false).unwrap();
        cache.calculate(&times, &field(120.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 2);

        // Linear in depth, so the interpolation is exact at grid points.
        let mid = cache.calculate(&[7200.0], &field(110.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 2);
        assert_relative_eq!(mid[0], synthetic(&field(110.0), 7200.0), max_relative = 1e-9);

        // Without interpolation the depth is computed.
        cache.calculate(&[7200.0], &field(112.0), ALPHA, false, false).unwrap();
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.stored_depths(), &[100.0, 112.0, 120.0]);
    }

    #[test]
    fn distant_depth_is_computed() {
        let (mut cache, calls) = counting_cache();
        cache.calculate(&[3600.0], &field(100.0), ALPHA, true, false).unwrap();
        cache.calculate(&[3600.0], &field(200.0), ALPHA, true, false).unwrap();
        // 150 is more than 25 % away from both neighbours.
        cache.calculate(&[3600.0], &field(150.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn returning_depth_is_computed_exactly() {
        let (mut cache, calls) = counting_cache();
        let t = [3600.0];
        cache.calculate(&t, &field(100.0), ALPHA, true, false).unwrap();
        cache.calculate(&t, &field(120.0), ALPHA, true, false).unwrap();
        cache.calculate(&t, &field(110.0), ALPHA, true, false).unwrap();
        cache.calculate(&t, &field(110.5), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 2);

        // 110 comes back after 110.5 without being stored.
        cache.calculate(&t, &field(110.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 3);
        assert!(cache.stored_depths().contains(&110.0));
    }

    #[test]
    fn other_geometry_or_ground_empties_the_store() {
        let (mut cache, calls) = counting_cache();
        let t = [3600.0];
        cache.calculate(&t, &field(100.0), ALPHA, true, false).unwrap();
        cache.calculate(&t, &field(100.0), 2.0 * ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.stored_depths(), &[100.0]);

        let m = Length::new::<meter>;
        let wider =
            BoreholeField::rectangular(2, 2, m(8.0), m(6.0), m(100.0), m(4.0), m(0.075)).unwrap();
        cache.calculate(&t, &wider, 2.0 * ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn longer_request_grows_the_grid() {
        let (mut cache, _) = counting_cache();
        cache.calculate(&[3600.0], &field(100.0), ALPHA, true, false).unwrap();
        let horizon = cache.time_grid().unwrap().max_time();

        let long = 2.0 * horizon;
        let g = cache.calculate(&[long], &field(100.0), ALPHA, true, false).unwrap();
        assert!(cache.time_grid().unwrap().max_time() >= long);
        assert_relative_eq!(g[0], synthetic(&field(100.0), long), max_relative = 1e-2);
    }

    #[test]
    fn forced_computation_is_not_stored() {
        let (mut cache, calls) = counting_cache();
        let g = cache.calculate(&[3600.0], &field(100.0), ALPHA, true, true).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(cache.stored_depths().is_empty());
        assert_relative_eq!(g[0], synthetic(&field(100.0), 3600.0));
    }

    #[test]
    fn failures_leave_the_store_unchanged() {
        let failing = |_: &BoreholeField, _: f64, _: &[f64], _: &GFunctionOptions| {
            Err::<Vec<f64>, _>(GFunctionError::Compute(BoxedError::from("solver diverged")))
        };
        let mut cache = GFunctionCache::new(failing);
        let result = cache.calculate(&[3600.0], &field(100.0), ALPHA, true, false);
        assert!(matches!(result, Err(GFunctionError::Compute(_))));
        assert!(cache.stored_depths().is_empty());
        assert!(cache.time_grid().is_none());

        let non_finite = |_: &BoreholeField, _: f64, times: &[f64], _: &GFunctionOptions| {
            Ok(vec![f64::NAN; times.len()])
        };
        let mut cache = GFunctionCache::new(non_finite);
        let result = cache.calculate(&[3600.0], &field(100.0), ALPHA, true, false);
        assert!(matches!(result, Err(GFunctionError::NonFinite(0))));
    }

    #[test]
    fn negative_values_retry_with_cylindrical_correction() {
        let calculator = |_: &BoreholeField, _: f64, times: &[f64], options: &GFunctionOptions| {
            let value = if options.cylindrical_correction { 1.0 } else { -1.0 };
            Ok(vec![value; times.len()])
        };
        let mut cache = GFunctionCache::new(calculator);
        let g = cache.calculate(&[3600.0], &field(100.0), ALPHA, true, false).unwrap();
        assert_relative_eq!(g[0], 1.0);
        assert_eq!(
            cache.take_warnings(),
            vec![GFunctionWarning::NegativeValues { depth: 100.0 }]
        );
        assert!(cache.take_warnings().is_empty());
    }

    #[test]
    fn precomputed_curves_and_range_misses() {
        let (mut cache, calls) = counting_cache();
        let grid = TimeGrid::default();
        let curves = [50.0, 75.0, 100.0]
            .iter()
            .map(|&h| (h, grid.times().iter().map(|&t| synthetic(&field(h), t)).collect()))
            .collect();
        let dataset = PrecomputedGFunctions::new(grid.times().to_vec(), curves).unwrap();
        cache.load_precomputed(dataset, &field(100.0), ALPHA);

        let g = cache.calculate(&[86_400.0], &field(60.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 0);
        assert_relative_eq!(g[0], synthetic(&field(60.0), 86_400.0), max_relative = 1e-3);
        assert!(cache.take_warnings().is_empty());

        cache.calculate(&[86_400.0], &field(140.0), ALPHA, true, false).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(
            cache.take_warnings(),
            vec![GFunctionWarning::OutOfRange { depth: 140.0 }]
        );
    }
}
