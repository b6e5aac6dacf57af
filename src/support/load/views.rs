//! Derivation of the monthly and hourly arrays over the simulation period.

use crate::support::units::{HOURS_PER_YEAR, MONTHS_PER_YEAR};

use super::{
    DomesticHotWater, Efficiency, HotWaterDemand, LoadError, LoadInput, LoadSettings, LoadSide,
    OperatingTemperatures, calendar,
    efficiency::{extraction, injection},
};

/// Baseloads (kWh per month) and peaks (kW) of one direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Monthly {
    pub(super) baseload: Vec<f64>,
    pub(super) peak: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Hourly {
    pub(super) heating: Vec<f64>,
    pub(super) cooling: Vec<f64>,
    pub(super) extraction: Vec<f64>,
    pub(super) injection: Vec<f64>,
}

/// Everything a profile exposes, computed once per change.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Views {
    pub(super) years: usize,
    pub(super) hours_per_month: Vec<f64>,
    pub(super) heating: Monthly,
    pub(super) cooling: Monthly,
    pub(super) extraction: Monthly,
    pub(super) injection: Monthly,
    pub(super) hourly: Option<Hourly>,
}

/// The parts of a profile the views depend on.
pub(super) struct Sources<'a> {
    pub(super) input: &'a LoadInput,
    pub(super) side: &'a LoadSide,
    pub(super) hot_water: Option<&'a DomesticHotWater>,
    pub(super) settings: &'a LoadSettings,
    pub(super) temperatures: Option<&'a OperatingTemperatures>,
}

impl Sources<'_> {
    pub(super) fn years(&self) -> usize {
        self.input
            .fixed_years()
            .unwrap_or(self.settings.simulation_period)
    }

    pub(super) fn derive(&self) -> Result<Views, LoadError> {
        let years = self.years();
        let months = years * MONTHS_PER_YEAR;
        let start = self.settings.start_month;
        let hours_per_month =
            calendar::hours_per_month(start, months, self.settings.all_months_equal)?;

        let mut views = match self.input {
            LoadInput::Monthly(load) => {
                let spread = |values: &[f64]| {
                    calendar::tile(&calendar::rotate_monthly(values, start), years)
                };
                let heating = Monthly {
                    baseload: spread(load.baseload_heating()),
                    peak: spread(load.peak_heating()),
                };
                let cooling = Monthly {
                    baseload: spread(load.baseload_cooling()),
                    peak: spread(load.peak_cooling()),
                };
                self.from_monthly(heating, cooling, &hours_per_month)?
            }
            LoadInput::MonthlySeries(load) => {
                let heating = Monthly {
                    baseload: load.baseload_heating().to_vec(),
                    peak: load.peak_heating().to_vec(),
                };
                let cooling = Monthly {
                    baseload: load.baseload_cooling().to_vec(),
                    peak: load.peak_cooling().to_vec(),
                };
                self.from_monthly(heating, cooling, &hours_per_month)?
            }
            LoadInput::Hourly(load) => {
                let heating = self.spread_hourly(load.heating(), years)?;
                let cooling = self.spread_hourly(load.cooling(), years)?;
                self.from_hourly(heating, cooling, &hours_per_month)?
            }
        };

        for direction in [&mut views.extraction, &mut views.injection] {
            for ((peak, base), upm) in direction
                .peak
                .iter_mut()
                .zip(&direction.baseload)
                .zip(&hours_per_month)
            {
                *peak = peak.max(base / upm);
            }
        }
        views.years = years;
        views.hours_per_month = hours_per_month;
        Ok(views)
    }

    /// One calendar year of hourly data laid over the simulation period.
    fn spread_hourly(&self, values: &[f64], years: usize) -> Result<Vec<f64>, LoadError> {
        if values.len() > HOURS_PER_YEAR {
            return Ok(values.to_vec());
        }
        let rotated = calendar::rotate_hourly(
            values,
            self.settings.start_month,
            self.settings.all_months_equal,
        )?;
        Ok(calendar::tile(&rotated, years))
    }

    fn month_lengths(&self, months: usize) -> Result<Vec<usize>, LoadError> {
        calendar::month_lengths(
            self.settings.start_month,
            months,
            self.settings.all_months_equal,
        )
    }

    fn efficiencies(&self) -> (Option<&Efficiency>, Option<&Efficiency>) {
        match self.side {
            LoadSide::Geothermal => (None, None),
            LoadSide::Building { heating, cooling } => (Some(heating), Some(cooling)),
        }
    }

    fn from_monthly(
        &self,
        heating: Monthly,
        cooling: Monthly,
        hours_per_month: &[f64],
    ) -> Result<Views, LoadError> {
        let months = hours_per_month.len();
        let (cop, eer) = self.efficiencies();
        let hot_water = self.hot_water_monthly(hours_per_month)?;

        let heating_ref = reference_power(&heating, hours_per_month);
        let cooling_ref = reference_power(&cooling, hours_per_month);

        let mut extraction_view = Monthly::default();
        let mut injection_view = Monthly::default();
        for month in 0..months {
            let upm = hours_per_month[month];
            let (t_base_ext, t_peak_ext) = self
                .temperatures
                .map_or((None, None), |t| t.extraction(month));
            let (t_base_inj, t_peak_inj) = self
                .temperatures
                .map_or((None, None), |t| t.injection(month));

            let base = heating.baseload[month];
            let peak = heating.peak[month];
            let (mut ext_base, mut ext_peak) = match cop {
                Some(cop) => (
                    extraction(base, cop.at(t_base_ext, part_load(base / upm, heating_ref))?),
                    extraction(peak, cop.at(t_peak_ext, part_load(peak, heating_ref))?),
                ),
                None => (base, peak),
            };

            if let Some((dhw, energy, power)) = &hot_water {
                ext_base += extraction(energy[month], dhw.efficiency().at(t_base_ext, 1.0)?);
                if dhw.include_peak() {
                    ext_peak += extraction(power[month], dhw.efficiency().at(t_peak_ext, 1.0)?);
                }
            }

            let base = cooling.baseload[month];
            let peak = cooling.peak[month];
            let (inj_base, inj_peak) = match eer {
                Some(eer) => (
                    injection(base, eer.at(t_base_inj, part_load(base / upm, cooling_ref))?),
                    injection(peak, eer.at(t_peak_inj, part_load(peak, cooling_ref))?),
                ),
                None => (base, peak),
            };

            extraction_view.baseload.push(ext_base);
            extraction_view.peak.push(ext_peak);
            injection_view.baseload.push(inj_base);
            injection_view.peak.push(inj_peak);
        }

        Ok(Views {
            heating,
            cooling,
            extraction: extraction_view,
            injection: injection_view,
            ..Views::default()
        })
    }

    /// Hot water energy (kWh) and power (kW) per simulation month.
    fn hot_water_monthly(
        &self,
        hours_per_month: &[f64],
    ) -> Result<Option<(&DomesticHotWater, Vec<f64>, Vec<f64>)>, LoadError> {
        let Some(dhw) = self.hot_water else {
            return Ok(None);
        };
        let (energy, power) = match dhw.demand() {
            HotWaterDemand::Annual(annual) => {
                let energy: Vec<f64> = hours_per_month
                    .iter()
                    .map(|upm| annual * upm / HOURS_PER_YEAR as f64)
                    .collect();
                let power = vec![annual / HOURS_PER_YEAR as f64; hours_per_month.len()];
                (energy, power)
            }
            HotWaterDemand::Hourly(_) => {
                let years = hours_per_month.len() / MONTHS_PER_YEAR;
                let hourly = self.spread_hourly(&dhw.one_year(), years)?;
                calendar::resample(&hourly, &self.month_lengths(hours_per_month.len())?)
            }
        };
        Ok(Some((dhw, energy, power)))
    }

    fn from_hourly(
        &self,
        heating: Vec<f64>,
        cooling: Vec<f64>,
        hours_per_month: &[f64],
    ) -> Result<Views, LoadError> {
        let years = hours_per_month.len() / MONTHS_PER_YEAR;
        let lengths = self.month_lengths(hours_per_month.len())?;
        let month_of_hour: Vec<usize> = lengths
            .iter()
            .enumerate()
            .flat_map(|(month, &length)| std::iter::repeat_n(month, length))
            .collect();

        let (cop, eer) = self.efficiencies();
        let hot_water = match self.hot_water {
            Some(dhw) => Some((dhw, self.spread_hourly(&dhw.one_year(), years)?)),
            None => None,
        };
        let heating_ref = heating.iter().copied().fold(0.0, f64::max);
        let cooling_ref = cooling.iter().copied().fold(0.0, f64::max);

        let mut ext = Vec::with_capacity(heating.len());
        let mut inj = Vec::with_capacity(cooling.len());
        for (hour, (&heat, &cool)) in heating.iter().zip(&cooling).enumerate() {
            let month = month_of_hour.get(hour).copied().unwrap_or_default();
            let (t_ext, t_inj) = self
                .temperatures
                .map_or((None, None), |t| t.hour(hour, month));

            let mut e = match cop {
                Some(cop) => extraction(heat, cop.at(t_ext, part_load(heat, heating_ref))?),
                None => heat,
            };
            if let Some((dhw, demand)) = &hot_water {
                e += extraction(demand[hour], dhw.efficiency().at(t_ext, 1.0)?);
            }
            let i = match eer {
                Some(eer) => injection(cool, eer.at(t_inj, part_load(cool, cooling_ref))?),
                None => cool,
            };
            ext.push(e);
            inj.push(i);
        }

        let monthly = |series: &[f64]| {
            let (baseload, peak) = calendar::resample(series, &lengths);
            Monthly { baseload, peak }
        };
        Ok(Views {
            heating: monthly(&heating),
            cooling: monthly(&cooling),
            extraction: monthly(&ext),
            injection: monthly(&inj),
            hourly: Some(Hourly {
                heating,
                cooling,
                extraction: ext,
                injection: inj,
            }),
            ..Views::default()
        })
    }
}

/// Largest power of a direction, the reference for part load.
fn reference_power(direction: &Monthly, hours_per_month: &[f64]) -> f64 {
    direction
        .baseload
        .iter()
        .zip(hours_per_month)
        .map(|(base, upm)| base / upm)
        .chain(direction.peak.iter().copied())
        .fold(0.0, f64::max)
}

fn part_load(power: f64, reference: f64) -> f64 {
    if reference > 0.0 { power / reference } else { 0.0 }
}
