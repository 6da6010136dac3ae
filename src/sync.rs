//! Time synchronization of irregularly sampled signals onto a uniform base

use ndarray::Array1;

use crate::error::{CalibrationError, Result};
use crate::types::Signal;

/// Default IMU resampling interval: 20 ms (50 Hz)
pub const IMU_SAMPLE_INTERVAL_S: f64 = 0.02;

/// Upper bound on resampled points (~55 hours at 50 Hz)
pub const MAX_TIME_BASE_SAMPLES: usize = 10_000_000;

/// Uniform time base `0, dt, 2*dt, ...` strictly below `end_s`.
///
/// Sample count is `ceil(end_s / dt)`, computed up front so that the grid
/// does not accumulate floating point drift.
///
/// # Errors
///
/// `TimeBaseTooLarge` if the grid would exceed [`MAX_TIME_BASE_SAMPLES`].
pub fn uniform_time_base(end_s: f64, dt: f64) -> Result<Array1<f64>> {
    if !(dt > 0.0) || !(end_s > 0.0) {
        return Ok(Array1::zeros(0));
    }
    let n = (end_s / dt).ceil();
    if !n.is_finite() || n > MAX_TIME_BASE_SAMPLES as f64 {
        return Err(CalibrationError::TimeBaseTooLarge {
            end_s,
            interval_s: dt,
            max: MAX_TIME_BASE_SAMPLES,
        });
    }
    Ok(Array1::from_shape_fn(n as usize, |i| i as f64 * dt))
}

/// Piecewise-linear interpolation of `signal` at each timestamp in `t_s`.
///
/// Targets outside the signal's time range clamp to the first/last sample.
pub fn sync_signal_in_time(signal: &Signal, t_s: &Array1<f64>) -> Array1<f64> {
    t_s.mapv(|t| interpolate(signal.t_s(), signal.val(), t))
}

fn interpolate(xp: &[f64], fp: &[f64], t: f64) -> f64 {
    let last = xp.len() - 1;
    if t <= xp[0] {
        return fp[0];
    }
    if t >= xp[last] {
        return fp[last];
    }
    // First index with xp[idx] > t; xp[idx - 1] <= t < xp[idx]
    let idx = xp.partition_point(|&x| x <= t);
    let (x0, x1) = (xp[idx - 1], xp[idx]);
    let (f0, f1) = (fp[idx - 1], fp[idx]);
    let frac = (t - x0) / (x1 - x0);
    f0 + frac * (f1 - f0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    fn signal(t: &[f64], v: &[f64]) -> Signal {
        Signal::new("test", t.to_vec(), v.to_vec()).unwrap()
    }

    #[test]
    fn test_time_base_excludes_end() {
        let t = uniform_time_base(10.0, IMU_SAMPLE_INTERVAL_S).unwrap();
        assert_eq!(t.len(), 500);
        assert_eq!(t[0], 0.0);
        assert_abs_diff_eq!(t[499], 9.98, epsilon = 1e-12);
    }

    #[test]
    fn test_time_base_partial_step() {
        assert_eq!(uniform_time_base(0.05, 0.02).unwrap().len(), 3);
    }

    #[test]
    fn test_time_base_empty() {
        assert_eq!(uniform_time_base(0.0, 0.02).unwrap().len(), 0);
        assert_eq!(uniform_time_base(1.0, 0.0).unwrap().len(), 0);
    }

    #[test]
    fn test_time_base_rejects_oversized_grid() {
        let err = uniform_time_base(1e12, IMU_SAMPLE_INTERVAL_S).unwrap_err();
        assert!(matches!(err, CalibrationError::TimeBaseTooLarge { max: MAX_TIME_BASE_SAMPLES, .. }));
        assert!(uniform_time_base(10.0, 1e-300).is_err());
        assert!(uniform_time_base(f64::MAX, 1e-3).is_err());
    }

    #[test]
    fn test_time_base_cap_boundary() {
        let end = MAX_TIME_BASE_SAMPLES as f64;
        assert!(uniform_time_base(end + 1.0, 1.0).is_err());
        // One sample per second for a day
        assert_eq!(uniform_time_base(86_400.0, 1.0).unwrap().len(), 86_400);
    }

    #[test]
    fn test_linear_interpolation() {
        let s = signal(&[0.0, 1.0, 3.0], &[0.0, 10.0, 30.0]);
        let out = sync_signal_in_time(&s, &arr1(&[0.5, 2.0, 2.5]));
        assert_abs_diff_eq!(out[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clamps_outside_range() {
        let s = signal(&[1.0, 2.0], &[4.0, 8.0]);
        let out = sync_signal_in_time(&s, &arr1(&[0.0, 0.99, 2.01, 100.0]));
        assert_eq!(out.to_vec(), vec![4.0, 4.0, 8.0, 8.0]);
    }

    #[test]
    fn test_exact_at_knots() {
        let t: Vec<f64> = (0..50).map(|i| i as f64 * 0.027 + (i % 3) as f64 * 0.004).collect();
        let v: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin() * 0.4 + 0.1).collect();
        let s = signal(&t, &v);
        let out = sync_signal_in_time(&s, &Array1::from(t.clone()));
        for (a, b) in out.iter().zip(v.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_single_sample_signal() {
        let s = signal(&[0.5], &[3.0]);
        let out = sync_signal_in_time(&s, &arr1(&[0.0, 0.5, 1.0]));
        assert_eq!(out.to_vec(), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_empty_time_base() {
        let s = signal(&[0.0, 1.0], &[1.0, 2.0]);
        assert!(sync_signal_in_time(&s, &Array1::zeros(0)).is_empty());
    }

    #[test]
    fn test_37hz_to_50hz_sample_count() {
        // Irregular ~37 Hz magnetometer ticks
        let t: Vec<f64> = (0..380)
            .map(|i| i as f64 / 37.0 + if i % 2 == 0 { 0.003 } else { 0.0 })
            .collect();
        let v: Vec<f64> = t.iter().map(|t| (t * 0.3).cos()).collect();
        let s = signal(&t, &v);
        let base = uniform_time_base(9.98 + IMU_SAMPLE_INTERVAL_S / 2.0, IMU_SAMPLE_INTERVAL_S).unwrap();
        assert_abs_diff_eq!(base[base.len() - 1], 9.98, epsilon = 1e-12);
        let out = sync_signal_in_time(&s, &base);
        assert_eq!(out.len(), (9.98_f64 / 0.02).floor() as usize + 1);
        assert_eq!(out.len(), 500);
    }
}
