pub mod linalg;

pub use linalg::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, Result};

// ===== Channel Names =====
pub const SOURCE_IMU: &str = "Imu";
pub const CHANNEL_ACCEL_X: &str = "AccelerationX";
pub const CHANNEL_MAG_X: &str = "MagneticFieldX";
pub const CHANNEL_MAG_Y: &str = "MagneticFieldY";
pub const CHANNEL_MAG_Z: &str = "MagneticFieldZ";

/// Raw channel record as it appears in a data log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSignal {
    pub t_s: Vec<f64>,
    pub val: Vec<f64>,
}

/// Validated time series: equal-length, finite, non-decreasing timestamps
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    t_s: Vec<f64>,
    val: Vec<f64>,
}

impl Signal {
    /// Build a signal, checking the time series invariants.
    /// `name` is only used in error messages.
    pub fn new(name: &str, t_s: Vec<f64>, val: Vec<f64>) -> Result<Self> {
        if t_s.len() != val.len() {
            return Err(CalibrationError::invalid_signal(
                name,
                format!("{} timestamps but {} values", t_s.len(), val.len()),
            ));
        }
        if t_s.is_empty() {
            return Err(CalibrationError::invalid_signal(name, "no samples"));
        }
        if let Some(idx) = t_s.iter().chain(val.iter()).position(|v| !v.is_finite()) {
            return Err(CalibrationError::invalid_signal(
                name,
                format!("non-finite sample at index {}", idx % t_s.len()),
            ));
        }
        if let Some(idx) = t_s.windows(2).position(|w| w[1] < w[0]) {
            return Err(CalibrationError::invalid_signal(
                name,
                format!(
                    "timestamps decrease at index {} ({:.6}s -> {:.6}s)",
                    idx + 1,
                    t_s[idx],
                    t_s[idx + 1]
                ),
            ));
        }
        Ok(Signal { t_s, val })
    }

    pub fn t_s(&self) -> &[f64] {
        &self.t_s
    }

    pub fn val(&self) -> &[f64] {
        &self.val
    }

    pub fn len(&self) -> usize {
        self.t_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_s.is_empty()
    }

    /// Timestamp of the last sample
    pub fn last_timestamp(&self) -> f64 {
        self.t_s.last().copied().unwrap_or(0.0)
    }
}

/// Named channels of one signal source (e.g. "Imu")
pub type Channels = BTreeMap<String, Signal>;

/// Read-only collection of signal sources loaded from a data log
#[derive(Clone, Debug, Default)]
pub struct SignalBundle {
    sources: BTreeMap<String, Channels>,
}

impl SignalBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every raw channel and assemble the bundle
    pub fn from_raw(raw: BTreeMap<String, BTreeMap<String, RawSignal>>) -> Result<Self> {
        let mut bundle = SignalBundle::new();
        for (source, channels) in raw {
            for (channel, signal) in channels {
                let name = format!("{}.{}", source, channel);
                let signal = Signal::new(&name, signal.t_s, signal.val)?;
                bundle.insert(&source, &channel, signal);
            }
        }
        Ok(bundle)
    }

    pub fn insert(&mut self, source: &str, channel: &str, signal: Signal) {
        self.sources
            .entry(source.to_string())
            .or_default()
            .insert(channel.to_string(), signal);
    }

    pub fn channel(&self, source: &str, channel: &str) -> Result<&Signal> {
        self.sources
            .get(source)
            .and_then(|channels| channels.get(channel))
            .ok_or_else(|| CalibrationError::MissingChannel {
                source_name: source.to_string(),
                channel: channel.to_string(),
            })
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &Channels)> {
        self.sources.iter().map(|(name, channels)| (name.as_str(), channels))
    }

    pub fn channel_count(&self) -> usize {
        self.sources.values().map(|c| c.len()).sum()
    }
}
