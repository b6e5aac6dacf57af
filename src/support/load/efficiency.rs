use crate::support::{
    constraint::{StrictlyPositive, check_all},
    table::{Table1D, Table2D},
};

use super::LoadError;

/// Heat pump efficiency: a COP when heating, an EER when cooling.
#[derive(Debug, Clone)]
pub enum Efficiency {
    /// Seasonal value (SCOP or SEER).
    Seasonal(f64),
    /// Depends on the fluid temperature, optionally on part load too.
    Table(EfficiencyTable),
}

impl Efficiency {
    /// # Errors
    ///
    /// Returns [`LoadError::Efficiency`] unless `value` is strictly positive.
    pub fn seasonal(value: f64) -> Result<Self, LoadError> {
        check_all::<f64, StrictlyPositive>(&[value])
            .map_err(|(_, err)| LoadError::Efficiency(err))?;
        Ok(Self::Seasonal(value))
    }

    #[must_use]
    pub fn is_temperature_dependent(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// The value used before any operating temperature is known.
    #[must_use]
    pub fn reference(&self) -> f64 {
        match self {
            Self::Seasonal(value) => *value,
            Self::Table(table) => table.reference,
        }
    }

    /// Efficiency at a fluid temperature (°C) and part load in `[0, 1]`.
    ///
    /// Without a temperature the reference value is returned.
    pub(super) fn at(&self, temperature: Option<f64>, part_load: f64) -> Result<f64, LoadError> {
        match (self, temperature) {
            (Self::Table(table), Some(t)) => table.eval(t, part_load),
            _ => Ok(self.reference()),
        }
    }
}

/// Ground-side extraction (kWh or kW) for a heating demand served at `cop`.
///
/// A COP below one extracts nothing.
pub(super) fn extraction(heating: f64, cop: f64) -> f64 {
    (heating * (1.0 - 1.0 / cop)).max(0.0)
}

/// Ground-side injection for a cooling demand served at `eer`.
pub(super) fn injection(cooling: f64, eer: f64) -> f64 {
    cooling * (1.0 + 1.0 / eer)
}

#[derive(Debug, Clone)]
enum Lookup {
    Temperature(Table1D),
    TemperaturePartLoad(Table2D),
}

/// Efficiency lookup, linear between points and clamped at the bounds.
#[derive(Debug, Clone)]
pub struct EfficiencyTable {
    lookup: Lookup,
    reference: f64,
}

impl EfficiencyTable {
    /// Efficiency as a function of the fluid temperature (°C).
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the table is malformed or holds
    /// non-positive values.
    pub fn temperature(
        temperatures: Vec<f64>,
        values: Vec<f64>,
        reference: f64,
    ) -> Result<Self, LoadError> {
        check_positive(&values)?;
        check_positive(&[reference])?;
        Ok(Self {
            lookup: Lookup::Temperature(Table1D::new(temperatures, values)?),
            reference,
        })
    }

    /// Efficiency as a function of fluid temperature (°C) and part load;
    /// `values[i][j]` belongs to `temperatures[i]` and `part_loads[j]`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the table is malformed or holds
    /// non-positive values.
    pub fn part_load(
        temperatures: Vec<f64>,
        part_loads: Vec<f64>,
        values: Vec<Vec<f64>>,
        reference: f64,
    ) -> Result<Self, LoadError> {
        for row in &values {
            check_positive(row)?;
        }
        check_positive(&[reference])?;
        Ok(Self {
            lookup: Lookup::TemperaturePartLoad(Table2D::new(temperatures, part_loads, values)?),
            reference,
        })
    }

    /// # Errors
    ///
    /// Returns a [`LoadError`] if the lookup fails, e.g. for a `NaN` input.
    pub fn eval(&self, temperature: f64, part_load: f64) -> Result<f64, LoadError> {
        Ok(match &self.lookup {
            Lookup::Temperature(table) => table.eval(temperature)?,
            Lookup::TemperaturePartLoad(table) => table.eval(temperature, part_load)?,
        })
    }
}

fn check_positive(values: &[f64]) -> Result<(), LoadError> {
    check_all::<f64, StrictlyPositive>(values).map_err(|(_, err)| LoadError::Efficiency(err))
}
