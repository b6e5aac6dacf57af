//! Ground-source heat exchanger models.

pub mod borefield;
