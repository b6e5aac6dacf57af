//! Building thermal demand and the views sizing needs.
//!
//! A [`LoadProfile`] is built from one of three inputs ([`MonthlyLoad`],
//! [`MonthlyLoadSeries`] or [`HourlyLoad`]) and lays it over the simulation
//! period, starting at the configured month. Demand may be given on the
//! ground side directly ([`LoadSide::Geothermal`]) or on the building side
//! with heat pump efficiencies, in which case
//!
//! - extraction = heating · (1 − 1/COP),
//! - injection = cooling · (1 + 1/EER).
//!
//! Temperature-dependent efficiencies use the reference value until
//! [`LoadProfile::apply_operating_temperatures`] provides fluid temperatures.
//!
//! Units: monthly baseloads in kWh per month, peaks and hourly values in kW,
//! the imbalance in kWh per year. Every setter recomputes the derived arrays
//! right away and leaves the profile unchanged if it fails.
//!
//! ```
//! use twine_borefield::support::load::{LoadProfile, LoadSettings, MonthlyLoad};
//!
//! let load = MonthlyLoad::new(
//!     vec![1000.0; 12],
//!     vec![500.0; 12],
//!     vec![10.0; 12],
//!     vec![5.0; 12],
//! )?;
//! let profile = LoadProfile::new(load, LoadSettings::default())?;
//! assert_eq!(profile.months(), 240);
//! assert_eq!(profile.imbalance(), -6000.0);
//! # Ok::<(), twine_borefield::support::load::LoadError>(())
//! ```

mod calendar;
mod efficiency;
mod error;
mod file;
mod hot_water;
mod input;
mod params;
mod temperatures;
mod views;

pub use efficiency::{Efficiency, EfficiencyTable};
pub use error::LoadError;
pub use file::HourlyLoadFile;
pub use hot_water::{DomesticHotWater, HotWaterDemand};
pub use input::{HourlyLoad, LoadInput, MonthlyLoad, MonthlyLoadSeries};
pub use params::{FirstYearParams, LastYearParams};
pub use temperatures::OperatingTemperatures;

use uom::si::{f64::Time, time::hour};

use crate::support::units::{HOURS_PER_YEAR, MONTHS_PER_YEAR, UPM};

use views::{Sources, Views};

/// How demand is laid over the simulation period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSettings {
    /// Years simulated; multi-year inputs set their own period.
    pub simulation_period: usize,
    /// Calendar month (1 = January) the simulation starts in.
    pub start_month: u8,
    /// Treat every month as [`UPM`] hours long.
    pub all_months_equal: bool,
    pub peak_duration_extraction: Time,
    pub peak_duration_injection: Time,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            simulation_period: 20,
            start_month: 1,
            all_months_equal: true,
            peak_duration_extraction: Time::new::<hour>(6.0),
            peak_duration_injection: Time::new::<hour>(6.0),
        }
    }
}

impl LoadSettings {
    fn validate(&self) -> Result<(), LoadError> {
        if !(1..=12).contains(&self.start_month) {
            return Err(LoadError::StartMonth(self.start_month));
        }
        if self.simulation_period == 0 {
            return Err(LoadError::SimulationPeriod);
        }
        for duration in [self.peak_duration_extraction, self.peak_duration_injection] {
            let hours = duration.get::<hour>();
            if !(hours > 0.0 && hours <= UPM) {
                return Err(LoadError::PeakDuration);
            }
        }
        Ok(())
    }
}

/// Where the demand is measured.
#[derive(Debug, Clone, Default)]
pub enum LoadSide {
    /// Values are already ground extraction (heating) and injection (cooling).
    #[default]
    Geothermal,
    /// Values are building demand served by heat pumps.
    Building {
        heating: Efficiency,
        cooling: Efficiency,
    },
}

/// A building's demand and every derived array over the simulation period.
#[derive(Debug, Clone)]
pub struct LoadProfile {
    input: LoadInput,
    side: LoadSide,
    hot_water: Option<DomesticHotWater>,
    settings: LoadSettings,
    temperatures: Option<OperatingTemperatures>,
    views: Views,
}

impl LoadProfile {
    /// Creates a ground-side profile.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the settings are invalid.
    pub fn new(input: impl Into<LoadInput>, settings: LoadSettings) -> Result<Self, LoadError> {
        let mut profile = Self {
            input: input.into(),
            side: LoadSide::Geothermal,
            hot_water: None,
            settings,
            temperatures: None,
            views: Views::default(),
        };
        settings.validate()?;
        profile.views = profile.sources().derive()?;
        Ok(profile)
    }

    /// Builder form of [`set_side`](Self::set_side).
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the derived arrays cannot be computed.
    pub fn with_side(mut self, side: LoadSide) -> Result<Self, LoadError> {
        self.set_side(side)?;
        Ok(self)
    }

    /// Builder form of [`set_hot_water`](Self::set_hot_water).
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the derived arrays cannot be computed.
    pub fn with_hot_water(mut self, hot_water: DomesticHotWater) -> Result<Self, LoadError> {
        self.set_hot_water(Some(hot_water))?;
        Ok(self)
    }

    /// Replaces the demand. Operating temperatures are dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the derived arrays cannot be computed.
    pub fn set_input(&mut self, input: impl Into<LoadInput>) -> Result<(), LoadError> {
        let input = input.into();
        self.views = Sources {
            input: &input,
            temperatures: None,
            ..self.sources()
        }
        .derive()?;
        self.input = input;
        self.temperatures = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`LoadError`] if the derived arrays cannot be computed.
    pub fn set_side(&mut self, side: LoadSide) -> Result<(), LoadError> {
        self.views = Sources {
            side: &side,
            ..self.sources()
        }
        .derive()?;
        self.side = side;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`LoadError`] if the derived arrays cannot be computed.
    pub fn set_hot_water(&mut self, hot_water: Option<DomesticHotWater>) -> Result<(), LoadError> {
        self.views = Sources {
            hot_water: hot_water.as_ref(),
            ..self.sources()
        }
        .derive()?;
        self.hot_water = hot_water;
        Ok(())
    }

    /// Changes the settings. Operating temperatures are dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the settings are invalid.
    pub fn set_settings(&mut self, settings: LoadSettings) -> Result<(), LoadError> {
        settings.validate()?;
        self.views = Sources {
            settings: &settings,
            temperatures: None,
            ..self.sources()
        }
        .derive()?;
        self.settings = settings;
        self.temperatures = None;
        Ok(())
    }

    /// Recomputes ground loads with efficiencies taken at these temperatures.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Temperatures`] if the series do not cover the
    /// simulation period step by step (hourly temperatures need an hourly
    /// input), or a table lookup error.
    pub fn apply_operating_temperatures(
        &mut self,
        temperatures: OperatingTemperatures,
    ) -> Result<(), LoadError> {
        let expected = match temperatures {
            OperatingTemperatures::Monthly { .. } => self.months(),
            OperatingTemperatures::Hourly(_) if self.is_hourly() => self.hours(),
            OperatingTemperatures::Hourly(_) => 0,
        };
        let actual = temperatures.steps().unwrap_or(0);
        if actual != expected || expected == 0 {
            return Err(LoadError::Temperatures { expected, actual });
        }

        self.views = Sources {
            temperatures: Some(&temperatures),
            ..self.sources()
        }
        .derive()?;
        self.temperatures = Some(temperatures);
        Ok(())
    }

    /// Returns to the reference efficiencies.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the derived arrays cannot be computed.
    pub fn clear_operating_temperatures(&mut self) -> Result<(), LoadError> {
        self.views = Sources {
            temperatures: None,
            ..self.sources()
        }
        .derive()?;
        self.temperatures = None;
        Ok(())
    }

    fn sources(&self) -> Sources<'_> {
        Sources {
            input: &self.input,
            side: &self.side,
            hot_water: self.hot_water.as_ref(),
            settings: &self.settings,
            temperatures: self.temperatures.as_ref(),
        }
    }

    #[must_use]
    pub fn input(&self) -> &LoadInput {
        &self.input
    }

    #[must_use]
    pub fn side(&self) -> &LoadSide {
        &self.side
    }

    #[must_use]
    pub fn hot_water(&self) -> Option<&DomesticHotWater> {
        self.hot_water.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &LoadSettings {
        &self.settings
    }

    #[must_use]
    pub fn operating_temperatures(&self) -> Option<&OperatingTemperatures> {
        self.temperatures.as_ref()
    }

    /// Whether ground loads change with the operating temperatures.
    #[must_use]
    pub fn is_temperature_dependent(&self) -> bool {
        let side = match &self.side {
            LoadSide::Geothermal => false,
            LoadSide::Building { heating, cooling } => {
                heating.is_temperature_dependent() || cooling.is_temperature_dependent()
            }
        };
        side || self
            .hot_water
            .as_ref()
            .is_some_and(|dhw| dhw.efficiency().is_temperature_dependent())
    }

    /// Years simulated.
    #[must_use]
    pub fn simulation_period(&self) -> usize {
        self.views.years
    }

    /// Months simulated.
    #[must_use]
    pub fn months(&self) -> usize {
        self.views.years * MONTHS_PER_YEAR
    }

    /// Hours simulated.
    #[must_use]
    pub fn hours(&self) -> usize {
        self.views.years * HOURS_PER_YEAR
    }

    /// Whether hourly arrays are available.
    #[must_use]
    pub fn is_hourly(&self) -> bool {
        self.views.hourly.is_some()
    }

    /// Hours in each simulation month.
    #[must_use]
    pub fn hours_per_month(&self) -> &[f64] {
        &self.views.hours_per_month
    }

    /// Building heating demand per month (kWh), excluding hot water.
    #[must_use]
    pub fn monthly_baseload_heating(&self) -> &[f64] {
        &self.views.heating.baseload
    }

    #[must_use]
    pub fn monthly_baseload_cooling(&self) -> &[f64] {
        &self.views.cooling.baseload
    }

    #[must_use]
    pub fn monthly_peak_heating(&self) -> &[f64] {
        &self.views.heating.peak
    }

    #[must_use]
    pub fn monthly_peak_cooling(&self) -> &[f64] {
        &self.views.cooling.peak
    }

    /// Ground extraction per month (kWh).
    #[must_use]
    pub fn monthly_baseload_extraction(&self) -> &[f64] {
        &self.views.extraction.baseload
    }

    /// Ground injection per month (kWh).
    #[must_use]
    pub fn monthly_baseload_injection(&self) -> &[f64] {
        &self.views.injection.baseload
    }

    /// Extraction peak per month (kW), at least the month's average power.
    #[must_use]
    pub fn monthly_peak_extraction(&self) -> &[f64] {
        &self.views.extraction.peak
    }

    /// Injection peak per month (kW), at least the month's average power.
    #[must_use]
    pub fn monthly_peak_injection(&self) -> &[f64] {
        &self.views.injection.peak
    }

    /// Average extraction power per month (kW).
    #[must_use]
    pub fn monthly_average_extraction(&self) -> Vec<f64> {
        self.per_hour(&self.views.extraction.baseload)
    }

    /// Average injection power per month (kW).
    #[must_use]
    pub fn monthly_average_injection(&self) -> Vec<f64> {
        self.per_hour(&self.views.injection.baseload)
    }

    /// Net average ground load per month (kW), positive when injecting.
    #[must_use]
    pub fn monthly_average_load(&self) -> Vec<f64> {
        self.views
            .injection
            .baseload
            .iter()
            .zip(&self.views.extraction.baseload)
            .zip(&self.views.hours_per_month)
            .map(|((inj, ext), upm)| (inj - ext) / upm)
            .collect()
    }

    fn per_hour(&self, energy: &[f64]) -> Vec<f64> {
        energy
            .iter()
            .zip(&self.views.hours_per_month)
            .map(|(e, upm)| e / upm)
            .collect()
    }

    /// Yearly injection minus yearly extraction (kWh), averaged over the
    /// simulation period. Positive values heat the ground up.
    #[must_use]
    pub fn imbalance(&self) -> f64 {
        let injection: f64 = self.views.injection.baseload.iter().sum();
        let extraction: f64 = self.views.extraction.baseload.iter().sum();
        (injection - extraction) / self.views.years as f64
    }

    #[must_use]
    pub fn hourly_heating(&self) -> Option<&[f64]> {
        self.views.hourly.as_ref().map(|h| h.heating.as_slice())
    }

    #[must_use]
    pub fn hourly_cooling(&self) -> Option<&[f64]> {
        self.views.hourly.as_ref().map(|h| h.cooling.as_slice())
    }

    /// Hourly ground extraction (kW), including hot water.
    #[must_use]
    pub fn hourly_extraction(&self) -> Option<&[f64]> {
        self.views.hourly.as_ref().map(|h| h.extraction.as_slice())
    }

    #[must_use]
    pub fn hourly_injection(&self) -> Option<&[f64]> {
        self.views.hourly.as_ref().map(|h| h.injection.as_slice())
    }

    /// Net hourly ground load (kW), positive when injecting.
    #[must_use]
    pub fn hourly_load(&self) -> Option<Vec<f64>> {
        self.views.hourly.as_ref().map(|h| {
            h.injection
                .iter()
                .zip(&h.extraction)
                .map(|(inj, ext)| inj - ext)
                .collect()
        })
    }
}
