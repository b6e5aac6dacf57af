//! Borefield sizing and temperature computation.
//!
//! The core works on plain numbers in SI units (metres, watts, seconds,
//! degrees Celsius) over borrowed inputs. The public controller in the parent
//! module owns those inputs, keeps the g-function cache between calls and
//! converts to and from `uom` quantities.

mod config;
mod error;
mod event;
mod quadrant;
mod sizing;
mod system;
mod temperature;

#[cfg(test)]
mod test_support;

pub use config::{
    QuadrantChoice, SizingConfig, SizingMethod, SizingOverrides, TemperatureLimits,
};
pub use error::{BorefieldError, MissingData};
pub use event::{SizingAction, SizingEvent, SizingWarning};
pub use quadrant::Quadrant;
pub use sizing::{QuadrantSizing, SizingOutcome, SizingStatus};
pub use temperature::{FluidTemperatures, TemperatureResult};

pub(crate) use sizing::size;
pub(crate) use system::{Resistance, System};
pub(crate) use temperature::{hourly, monthly};
