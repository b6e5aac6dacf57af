/// Fluid temperatures (°C) at which the heat pumps operate, one per
/// simulation step.
///
/// Temperature-dependent efficiencies are evaluated at these values. Heating
/// uses the extraction-side temperatures, cooling the injection side.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatingTemperatures {
    /// Monthly series over the simulation period. Baseloads use the base
    /// temperatures, peaks the peak temperatures.
    Monthly {
        base_extraction: Vec<f64>,
        base_injection: Vec<f64>,
        peak_extraction: Vec<f64>,
        peak_injection: Vec<f64>,
    },
    /// Hourly fluid temperature over the simulation period.
    Hourly(Vec<f64>),
}

impl OperatingTemperatures {
    /// Number of steps covered, or `None` if the monthly series differ in length.
    pub(super) fn steps(&self) -> Option<usize> {
        match self {
            Self::Monthly {
                base_extraction,
                base_injection,
                peak_extraction,
                peak_injection,
            } => {
                let n = base_extraction.len();
                [base_injection, peak_extraction, peak_injection]
                    .iter()
                    .all(|series| series.len() == n)
                    .then_some(n)
            }
            Self::Hourly(fluid) => Some(fluid.len()),
        }
    }

    /// Temperatures used for the month's baseload and peak, extraction side.
    pub(super) fn extraction(&self, month: usize) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Monthly {
                base_extraction,
                peak_extraction,
                ..
            } => (base_extraction.get(month).copied(), peak_extraction.get(month).copied()),
            Self::Hourly(_) => (None, None),
        }
    }

    /// Temperatures used for the month's baseload and peak, injection side.
    pub(super) fn injection(&self, month: usize) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Monthly {
                base_injection,
                peak_injection,
                ..
            } => (base_injection.get(month).copied(), peak_injection.get(month).copied()),
            Self::Hourly(_) => (None, None),
        }
    }

    /// Extraction- and injection-side temperatures for an hour in `month`.
    pub(super) fn hour(&self, hour: usize, month: usize) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Hourly(fluid) => {
                let t = fluid.get(hour).copied();
                (t, t)
            }
            Self::Monthly { .. } => (self.extraction(month).0, self.injection(month).0),
        }
    }
}
