use crate::support::units::HOURS_PER_YEAR;

use super::{
    Efficiency, LoadError,
    error::{check_non_negative, check_series},
};

/// Domestic hot water demand.
#[derive(Debug, Clone, PartialEq)]
pub enum HotWaterDemand {
    /// Yearly energy (kWh), spread evenly over the hours of the year.
    Annual(f64),
    /// One year of hourly power (kW), January first.
    Hourly(Vec<f64>),
}

/// Hot water served by its own heat pump, always an extraction from the ground.
#[derive(Debug, Clone)]
pub struct DomesticHotWater {
    demand: HotWaterDemand,
    efficiency: Efficiency,
    include_peak: bool,
}

impl DomesticHotWater {
    /// Annual demand in kWh. The hot water power is included in the
    /// extraction peak.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the demand is negative.
    pub fn annual(energy: f64, efficiency: Efficiency) -> Result<Self, LoadError> {
        check_non_negative("hot_water", &[energy])?;
        Ok(Self {
            demand: HotWaterDemand::Annual(energy),
            efficiency,
            include_peak: true,
        })
    }

    /// # Errors
    ///
    /// Returns a [`LoadError`] unless `power` holds 8760 non-negative entries.
    pub fn hourly(power: Vec<f64>, efficiency: Efficiency) -> Result<Self, LoadError> {
        check_series("hot_water", &power, HOURS_PER_YEAR)?;
        Ok(Self {
            demand: HotWaterDemand::Hourly(power),
            efficiency,
            include_peak: true,
        })
    }

    /// Sets whether hot water adds to the monthly extraction peak.
    #[must_use]
    pub fn with_peak(mut self, include: bool) -> Self {
        self.include_peak = include;
        self
    }

    #[must_use]
    pub fn demand(&self) -> &HotWaterDemand {
        &self.demand
    }

    #[must_use]
    pub fn efficiency(&self) -> &Efficiency {
        &self.efficiency
    }

    #[must_use]
    pub fn include_peak(&self) -> bool {
        self.include_peak
    }

    /// Building-side demand of one calendar year, hour by hour (kW).
    pub(super) fn one_year(&self) -> Vec<f64> {
        match &self.demand {
            HotWaterDemand::Annual(energy) => vec![energy / HOURS_PER_YEAR as f64; HOURS_PER_YEAR],
            HotWaterDemand::Hourly(power) => power.clone(),
        }
    }
}
