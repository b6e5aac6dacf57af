use uom::si::time::second;

use crate::support::units::{HOURS_PER_YEAR, MONTHS_PER_YEAR, UPM, hours_to_seconds};

use super::LoadProfile;

/// Loads and times of the last simulation year, as used by the three-pulse
/// (Bernier) sizing law.
///
/// Loads are in W and signed so that the limiting direction is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastYearParams {
    /// Peak duration (s).
    pub t_peak: f64,
    /// Length of the monthly pulse (s).
    pub t_month: f64,
    /// Whole simulation period (s).
    pub t_total: f64,
    pub q_peak: f64,
    /// Average load of the month holding the peak.
    pub q_monthly: f64,
    /// Yearly average load.
    pub q_annual: f64,
}

/// Loads and times of the first simulation year, as used by the first-year
/// (Carcel) sizing law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstYearParams {
    /// Peak duration (s).
    pub t_peak: f64,
    /// Length of one month (s).
    pub t_month: f64,
    /// End of the month holding the peak, from the start of the simulation (s).
    pub t_month_end: f64,
    pub q_peak: f64,
    /// Average load over the months preceding the peak month.
    pub q_preceding: f64,
    /// Average load of the month holding the peak.
    pub q_monthly: f64,
}

/// The pieces both laws share for one year of the profile.
struct YearPeak {
    t_peak: f64,
    q_peak: f64,
    month: usize,
    sign: f64,
    average: Vec<f64>,
}

impl LoadProfile {
    /// Parameters of the last year for the limiting direction.
    #[must_use]
    pub fn last_year_params(&self, heating_limited: bool) -> LastYearParams {
        let months = self.months();
        let year = self.year_peak(months.saturating_sub(MONTHS_PER_YEAR), heating_limited);
        LastYearParams {
            t_peak: year.t_peak,
            t_month: hours_to_seconds(UPM),
            t_total: hours_to_seconds((self.simulation_period() * HOURS_PER_YEAR) as f64),
            q_peak: year.q_peak,
            q_monthly: year.sign * year.average[year.month] * 1000.0,
            q_annual: year.sign * self.imbalance() / HOURS_PER_YEAR as f64 * 1000.0,
        }
    }

    /// Parameters of the first year for the limiting direction.
    #[must_use]
    pub fn first_year_params(&self, heating_limited: bool) -> FirstYearParams {
        let year = self.year_peak(0, heating_limited);
        let preceding = &year.average[..year.month];
        let q_preceding = if preceding.is_empty() {
            0.0
        } else {
            year.sign * preceding.iter().sum::<f64>() / preceding.len() as f64 * 1000.0
        };
        let t_month = hours_to_seconds(UPM);
        FirstYearParams {
            t_peak: year.t_peak,
            t_month,
            t_month_end: (year.month + 1) as f64 * t_month,
            q_peak: year.q_peak,
            q_preceding,
            q_monthly: year.sign * year.average[year.month] * 1000.0,
        }
    }

    /// Finds the first month with the largest peak in the year starting at `first`.
    fn year_peak(&self, first: usize, heating_limited: bool) -> YearPeak {
        let last = (first + MONTHS_PER_YEAR).min(self.months());
        let (peaks, duration) = if heating_limited {
            (self.monthly_peak_extraction(), self.settings.peak_duration_extraction)
        } else {
            (self.monthly_peak_injection(), self.settings.peak_duration_injection)
        };

        let mut month = 0;
        let mut q_peak = f64::NEG_INFINITY;
        for (i, &peak) in peaks[first..last].iter().enumerate() {
            if peak > q_peak {
                q_peak = peak;
                month = i;
            }
        }

        let average = self.monthly_average_load()[first..last].to_vec();
        YearPeak {
            t_peak: duration.get::<second>(),
            q_peak: q_peak.max(0.0) * 1000.0,
            month,
            sign: if heating_limited { -1.0 } else { 1.0 },
            average,
        }
    }
}
