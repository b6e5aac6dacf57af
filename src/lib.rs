//! # Twine Borefield
//!
//! Sizing and simulation of vertical ground-coupled borehole heat exchangers
//! for [Twine](https://github.com/isentropic-dev/twine).
//!
//! Given a building's monthly or hourly thermal demand, the ground, the
//! borehole resistance and an allowed fluid temperature range, the
//! [`Borefield`](models::geothermal::borefield::Borefield) controller finds
//! the smallest borehole depth that keeps the fluid inside that range over
//! the whole simulation period.
//!
//! ## Crate layout
//!
//! - [`models`]: The sizing controller and its [`twine_core::Model`] adapter.
//! - [`support`]: Inputs and building blocks: geometry, ground, pipes, loads
//!   and the g-function service.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.
//! Model-specific code stays in the model's internal `core` module.

pub mod models;
pub mod support;
