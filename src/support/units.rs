//! Extensions to [`uom`] and the time constants of the monthly discretisation.
//!
//! Public inputs use [`uom`] quantities. Long series (loads, g-values,
//! temperatures) are plain `f64` slices in kWh, kW, °C and seconds; the
//! constants here convert between those series and the calendar.
//!
//! ## Temperature differences
//!
//! The [`TemperatureDifference`] trait provides a [`minus`](TemperatureDifference::minus) method
//! for subtracting one absolute temperature from another to get a temperature interval:
//!
//! ```
//! use uom::si::f64::ThermodynamicTemperature;
//! use uom::si::thermodynamic_temperature::degree_celsius;
//! use twine_borefield::support::units::TemperatureDifference;
//!
//! let t_max = ThermodynamicTemperature::new::<degree_celsius>(16.0);
//! let t_ground = ThermodynamicTemperature::new::<degree_celsius>(10.0);
//! let headroom = t_max.minus(t_ground);
//! // headroom is a TemperatureInterval of 6 K
//! ```

mod temperature_difference;

pub use temperature_difference::TemperatureDifference;

use uom::si::{f64::ThermodynamicTemperature, thermodynamic_temperature::degree_celsius};

/// Hours in a (non-leap) simulation year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Months in a simulation year.
pub const MONTHS_PER_YEAR: usize = 12;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Hours per month when all months are treated as equal.
pub const UPM: f64 = 730.0;

/// Reads a temperature in degrees Celsius, the unit of every temperature series.
#[must_use]
pub fn celsius(temperature: ThermodynamicTemperature) -> f64 {
    temperature.get::<degree_celsius>()
}

/// Converts a number of hours into seconds.
#[must_use]
pub fn hours_to_seconds(hours: f64) -> f64 {
    hours * SECONDS_PER_HOUR
}
