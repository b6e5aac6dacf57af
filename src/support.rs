//! Supporting utilities used by the borefield model.
//!
//! These modules are public because the model's inputs are built from them,
//! but their APIs are not stable.

pub mod borehole;
pub mod constraint;
pub mod gfunction;
pub mod ground;
pub mod load;
pub mod pipe;
pub mod superposition;
pub mod table;
pub mod units;
