//! Data log reader
//!
//! Logs are JSON documents (optionally gzip-compressed, detected by a `.gz`
//! extension) holding a free-form header and a `signals` map of
//! source -> channel -> `{ "t_s": [...], "val": [...] }`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::types::{RawSignal, SignalBundle};

#[derive(Deserialize)]
struct LogFile {
    #[serde(default)]
    header: Option<Value>,
    signals: BTreeMap<String, BTreeMap<String, RawSignal>>,
}

/// Parsed and validated data log
#[derive(Debug, Clone)]
pub struct DataLog {
    pub header: Option<Value>,
    pub signals: SignalBundle,
}

/// Load a data log from disk, decompressing `.gz` files
pub fn load_log(path: &Path) -> Result<DataLog> {
    let file = File::open(path)?;
    let parsed = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        read_log(BufReader::new(gz))?
    } else {
        read_log(BufReader::new(file))?
    };
    log::info!(
        "Loaded {} ({} channels)",
        path.display(),
        parsed.signals.channel_count()
    );
    Ok(parsed)
}

/// Parse a data log from any reader
pub fn read_log<R: Read>(reader: R) -> Result<DataLog> {
    let raw: LogFile = serde_json::from_reader(reader)?;
    let signals = SignalBundle::from_raw(raw.signals)?;
    for (source, channels) in signals.sources() {
        for (channel, signal) in channels {
            log::debug!(
                "  {}.{}: {} samples, last t={:.3}s",
                source,
                channel,
                signal.len(),
                signal.last_timestamp()
            );
        }
    }
    Ok(DataLog {
        header: raw.header,
        signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalibrationError;
    use crate::types::{CHANNEL_MAG_X, SOURCE_IMU};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const LOG: &str = r#"{
        "header": {"version": 1},
        "signals": {
            "Imu": {
                "AccelerationX": {"t_s": [0.0, 0.5, 1.0], "val": [0.1, 0.2, 0.3]},
                "MagneticFieldX": {"t_s": [0.0, 1.0], "val": [0.25, 0.35]}
            }
        }
    }"#;

    #[test]
    fn test_read_log() {
        let log = read_log(LOG.as_bytes()).unwrap();
        assert_eq!(log.signals.channel_count(), 2);
        let mag = log.signals.channel(SOURCE_IMU, CHANNEL_MAG_X).unwrap();
        assert_eq!(mag.val(), &[0.25, 0.35]);
        assert_eq!(log.header.unwrap()["version"], 1);
    }

    #[test]
    fn test_read_log_without_header() {
        let log = read_log(r#"{"signals": {}}"#.as_bytes()).unwrap();
        assert!(log.header.is_none());
        assert_eq!(log.signals.channel_count(), 0);
    }

    #[test]
    fn test_read_log_rejects_length_mismatch() {
        let bad = r#"{"signals": {"Imu": {"MagneticFieldX": {"t_s": [0.0, 1.0], "val": [0.2]}}}}"#;
        let err = read_log(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidSignal { ref name, .. } if name == "Imu.MagneticFieldX"));
    }

    #[test]
    fn test_read_log_rejects_garbage() {
        let err = read_log("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, CalibrationError::Parse(_)));
    }

    #[test]
    fn test_load_log_gzip() {
        let path = std::env::temp_dir().join(format!("hard_iron_test_{}.json.gz", std::process::id()));
        {
            let file = File::create(&path).unwrap();
            let mut enc = GzEncoder::new(file, Compression::default());
            enc.write_all(LOG.as_bytes()).unwrap();
            enc.finish().unwrap();
        }
        let log = load_log(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(log.signals.channel_count(), 2);
    }

    #[test]
    fn test_load_log_missing_file() {
        let err = load_log(Path::new("/nonexistent/hard_iron.json")).unwrap_err();
        assert!(matches!(err, CalibrationError::Io(_)));
    }
}
