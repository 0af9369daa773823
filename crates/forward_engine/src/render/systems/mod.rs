//! Active rendering systems
//!
//! Stateful runtime systems the renderer coordinates. Currently lighting and
//! shadow mapping.

pub mod lighting;
