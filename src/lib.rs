//! Hard iron offset estimation for magnetometer data logs.
//!
//! Pipeline: [`data_log::load_log`] -> [`pipeline::analyze`]
//! (time sync, sphere fit, correction) -> [`plot::PlotScene`] rendered by a
//! [`plot::Visualizer`] such as [`rerun_logger::RerunLogger`].

pub mod calibration;
pub mod data_log;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod rerun_logger;
pub mod sync;
pub mod types;

pub use calibration::{correct, estimate_hard_iron, HardIronEstimate};
pub use error::{CalibrationError, Result};
pub use pipeline::{analyze, CalibrationConfig, CalibrationReport};
