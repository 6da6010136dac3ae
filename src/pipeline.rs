//! Batch calibration pipeline: synchronize -> estimate -> correct

use serde::{Deserialize, Serialize};

use crate::calibration::{correct, estimate_hard_iron, to_points, HardIronEstimate};
use crate::error::Result;
use crate::sync::{sync_signal_in_time, uniform_time_base, IMU_SAMPLE_INTERVAL_S};
use crate::types::{
    FieldVec, SignalBundle, CHANNEL_ACCEL_X, CHANNEL_MAG_X, CHANNEL_MAG_Y, CHANNEL_MAG_Z,
    SOURCE_IMU,
};

/// Which channels to read and how to resample them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub source: String,
    /// Channel whose last timestamp bounds the time base
    pub reference_channel: String,
    pub mag_channels: [String; 3],
    pub sample_interval_s: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            source: SOURCE_IMU.to_string(),
            reference_channel: CHANNEL_ACCEL_X.to_string(),
            mag_channels: [
                CHANNEL_MAG_X.to_string(),
                CHANNEL_MAG_Y.to_string(),
                CHANNEL_MAG_Z.to_string(),
            ],
            sample_interval_s: IMU_SAMPLE_INTERVAL_S,
        }
    }
}

/// Everything the renderer needs, computed once per run
#[derive(Clone, Debug)]
pub struct CalibrationReport {
    pub estimate: HardIronEstimate,
    pub raw: Vec<FieldVec>,
    pub corrected: Vec<FieldVec>,
    /// Duration covered by the time base [s]
    pub duration_s: f64,
}

/// Run the full estimation on a loaded signal bundle
pub fn analyze(bundle: &SignalBundle, config: &CalibrationConfig) -> Result<CalibrationReport> {
    let reference = bundle.channel(&config.source, &config.reference_channel)?;
    let [ch_x, ch_y, ch_z] = &config.mag_channels;
    let sig_x = bundle.channel(&config.source, ch_x)?;
    let sig_y = bundle.channel(&config.source, ch_y)?;
    let sig_z = bundle.channel(&config.source, ch_z)?;

    let duration_s = reference.last_timestamp();
    let t_s = uniform_time_base(duration_s, config.sample_interval_s)?;
    log::info!(
        "Resampling {} magnetometer axes onto {} samples ({:.0} Hz, {:.2}s)",
        config.source,
        t_s.len(),
        1.0 / config.sample_interval_s,
        duration_s
    );

    let mag_x = sync_signal_in_time(sig_x, &t_s);
    let mag_y = sync_signal_in_time(sig_y, &t_s);
    let mag_z = sync_signal_in_time(sig_z, &t_s);
    let raw = to_points(&mag_x, &mag_y, &mag_z)?;

    let estimate = estimate_hard_iron(&raw)?;
    let corrected = correct(&raw, &estimate);

    Ok(CalibrationReport {
        estimate,
        raw,
        corrected,
        duration_s,
    })
}
