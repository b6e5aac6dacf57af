use crate::support::units::{HOURS_PER_YEAR, MONTHS_PER_YEAR};

use super::{LoadError, error::check_series};

/// One year of monthly demand, January first.
///
/// Baseloads are energies per month (kWh), peaks are powers (kW). The year is
/// repeated over the simulation period.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyLoad {
    baseload_heating: Vec<f64>,
    baseload_cooling: Vec<f64>,
    peak_heating: Vec<f64>,
    peak_cooling: Vec<f64>,
}

impl MonthlyLoad {
    /// # Errors
    ///
    /// Returns a [`LoadError`] unless every array has 12 non-negative entries.
    pub fn new(
        baseload_heating: Vec<f64>,
        baseload_cooling: Vec<f64>,
        peak_heating: Vec<f64>,
        peak_cooling: Vec<f64>,
    ) -> Result<Self, LoadError> {
        check_series("baseload_heating", &baseload_heating, MONTHS_PER_YEAR)?;
        check_series("baseload_cooling", &baseload_cooling, MONTHS_PER_YEAR)?;
        check_series("peak_heating", &peak_heating, MONTHS_PER_YEAR)?;
        check_series("peak_cooling", &peak_cooling, MONTHS_PER_YEAR)?;
        Ok(Self {
            baseload_heating,
            baseload_cooling,
            peak_heating,
            peak_cooling,
        })
    }

    #[must_use]
    pub fn baseload_heating(&self) -> &[f64] {
        &self.baseload_heating
    }

    #[must_use]
    pub fn baseload_cooling(&self) -> &[f64] {
        &self.baseload_cooling
    }

    #[must_use]
    pub fn peak_heating(&self) -> &[f64] {
        &self.peak_heating
    }

    #[must_use]
    pub fn peak_cooling(&self) -> &[f64] {
        &self.peak_cooling
    }
}

/// Monthly demand over several years, in chronological order.
///
/// The first entry is the month the simulation starts in; the number of
/// years sets the simulation period.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyLoadSeries {
    baseload_heating: Vec<f64>,
    baseload_cooling: Vec<f64>,
    peak_heating: Vec<f64>,
    peak_cooling: Vec<f64>,
}

impl MonthlyLoadSeries {
    /// # Errors
    ///
    /// Returns a [`LoadError`] unless all arrays share a length that is a
    /// positive multiple of 12 and hold non-negative entries.
    pub fn new(
        baseload_heating: Vec<f64>,
        baseload_cooling: Vec<f64>,
        peak_heating: Vec<f64>,
        peak_cooling: Vec<f64>,
    ) -> Result<Self, LoadError> {
        let months = baseload_heating.len();
        if months == 0 || months % MONTHS_PER_YEAR != 0 {
            return Err(LoadError::Length {
                name: "baseload_heating",
                expected: months.div_ceil(MONTHS_PER_YEAR).max(1) * MONTHS_PER_YEAR,
                actual: months,
            });
        }
        check_series("baseload_heating", &baseload_heating, months)?;
        check_series("baseload_cooling", &baseload_cooling, months)?;
        check_series("peak_heating", &peak_heating, months)?;
        check_series("peak_cooling", &peak_cooling, months)?;
        Ok(Self {
            baseload_heating,
            baseload_cooling,
            peak_heating,
            peak_cooling,
        })
    }

    #[must_use]
    pub fn years(&self) -> usize {
        self.baseload_heating.len() / MONTHS_PER_YEAR
    }

    #[must_use]
    pub fn baseload_heating(&self) -> &[f64] {
        &self.baseload_heating
    }

    #[must_use]
    pub fn baseload_cooling(&self) -> &[f64] {
        &self.baseload_cooling
    }

    #[must_use]
    pub fn peak_heating(&self) -> &[f64] {
        &self.peak_heating
    }

    #[must_use]
    pub fn peak_cooling(&self) -> &[f64] {
        &self.peak_cooling
    }
}

/// Hourly demand (kW), either one year starting on 1 January or several
/// years in chronological order from the start month.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyLoad {
    heating: Vec<f64>,
    cooling: Vec<f64>,
    multiyear: bool,
}

impl HourlyLoad {
    /// One year of 8760 hourly values, repeated over the simulation period.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] unless both arrays have 8760 non-negative entries.
    pub fn new(heating: Vec<f64>, cooling: Vec<f64>) -> Result<Self, LoadError> {
        check_series("hourly_heating", &heating, HOURS_PER_YEAR)?;
        check_series("hourly_cooling", &cooling, HOURS_PER_YEAR)?;
        Ok(Self {
            heating,
            cooling,
            multiyear: false,
        })
    }

    /// Several years of hourly values; the number of years sets the
    /// simulation period.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] unless both arrays share a length that is a
    /// positive multiple of 8760 and hold non-negative entries.
    pub fn multiyear(heating: Vec<f64>, cooling: Vec<f64>) -> Result<Self, LoadError> {
        let hours = heating.len();
        if hours == 0 || hours % HOURS_PER_YEAR != 0 {
            return Err(LoadError::Length {
                name: "hourly_heating",
                expected: hours.div_ceil(HOURS_PER_YEAR).max(1) * HOURS_PER_YEAR,
                actual: hours,
            });
        }
        check_series("hourly_heating", &heating, hours)?;
        check_series("hourly_cooling", &cooling, hours)?;
        Ok(Self {
            heating,
            cooling,
            multiyear: true,
        })
    }

    #[must_use]
    pub fn heating(&self) -> &[f64] {
        &self.heating
    }

    #[must_use]
    pub fn cooling(&self) -> &[f64] {
        &self.cooling
    }

    /// Number of years covered, or `None` for a single repeated year.
    #[must_use]
    pub fn years(&self) -> Option<usize> {
        self.multiyear.then(|| self.heating.len() / HOURS_PER_YEAR)
    }
}

/// The demand a [`LoadProfile`](super::LoadProfile) is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadInput {
    Monthly(MonthlyLoad),
    MonthlySeries(MonthlyLoadSeries),
    Hourly(HourlyLoad),
}

impl LoadInput {
    /// Years fixed by the input itself, if any.
    pub(super) fn fixed_years(&self) -> Option<usize> {
        match self {
            Self::Monthly(_) => None,
            Self::MonthlySeries(series) => Some(series.years()),
            Self::Hourly(hourly) => hourly.years(),
        }
    }
}

impl From<MonthlyLoad> for LoadInput {
    fn from(load: MonthlyLoad) -> Self {
        Self::Monthly(load)
    }
}

impl From<MonthlyLoadSeries> for LoadInput {
    fn from(load: MonthlyLoadSeries) -> Self {
        Self::MonthlySeries(load)
    }
}

impl From<HourlyLoad> for LoadInput {
    fn from(load: HourlyLoad) -> Self {
        Self::Hourly(load)
    }
}
