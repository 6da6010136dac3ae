//! Hard iron offset estimation
//!
//! Fits a sphere `(m - v)'(m - v) = R^2` to magnetometer samples. The model is
//! linear in `[2*v_x, 2*v_y, 2*v_z, c]` with `c = R^2 - |v|^2`:
//!
//! ```text
//! 2*v_x*m_x + 2*v_y*m_y + 2*v_z*m_z + c = m_x^2 + m_y^2 + m_z^2
//! ```
//!
//! so a single SVD least-squares solve recovers the offset and radius.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, Result};
use crate::types::{DesignMatrix, FieldVec, SphereParams, TargetVec, SPHERE_PARAMS};

/// Result of a sphere fit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HardIronEstimate {
    /// Hard iron offset [gauss]
    pub offset: [f64; 3],
    /// Calibration sphere radius (local field strength) [gauss]
    pub radius: f64,
    /// Number of samples used in the fit
    pub sample_count: usize,
    /// RMS of `|m - v| - R` over all samples [gauss]
    pub rms_residual: f64,
}

impl HardIronEstimate {
    pub fn offset_vec(&self) -> FieldVec {
        FieldVec::new(self.offset[0], self.offset[1], self.offset[2])
    }

    /// Subtract the offset from a single raw sample
    pub fn apply(&self, raw: &FieldVec) -> FieldVec {
        raw - self.offset_vec()
    }
}

/// Pack three synchronized axis series into 3D samples
pub fn to_points(mag_x: &Array1<f64>, mag_y: &Array1<f64>, mag_z: &Array1<f64>) -> Result<Vec<FieldVec>> {
    if mag_x.len() != mag_y.len() || mag_x.len() != mag_z.len() {
        return Err(CalibrationError::LengthMismatch {
            x: mag_x.len(),
            y: mag_y.len(),
            z: mag_z.len(),
        });
    }
    Ok(mag_x
        .iter()
        .zip(mag_y.iter())
        .zip(mag_z.iter())
        .map(|((&x, &y), &z)| FieldVec::new(x, y, z))
        .collect())
}

fn build_system(samples: &[FieldVec]) -> (DesignMatrix, TargetVec) {
    let n = samples.len();
    let mut a = DesignMatrix::zeros(n, SPHERE_PARAMS);
    let mut y = TargetVec::zeros(n);
    for (i, m) in samples.iter().enumerate() {
        a[(i, 0)] = m.x;
        a[(i, 1)] = m.y;
        a[(i, 2)] = m.z;
        a[(i, 3)] = 1.0;
        y[i] = m.norm_squared();
    }
    (a, y)
}

fn solve_least_squares(a: DesignMatrix, y: &TargetVec) -> Result<SphereParams> {
    let n = a.nrows();
    let svd = a.svd(true, true);
    let max_sv = svd.singular_values.max();
    // Rank cutoff: max singular value * max(rows, cols) * machine epsilon
    let eps = max_sv * n.max(SPHERE_PARAMS) as f64 * f64::EPSILON;
    let rank = svd.singular_values.iter().filter(|&&s| s > eps).count();
    if rank < SPHERE_PARAMS {
        return Err(CalibrationError::RankDeficient {
            rank,
            required: SPHERE_PARAMS,
        });
    }
    svd.solve(y, eps)
        .map_err(|e| CalibrationError::DegenerateFit(e.to_string()))
}

/// Estimate the hard iron offset and sphere radius from 3D samples.
///
/// # Errors
///
/// - `InsufficientSamples` for fewer than 4 samples
/// - `RankDeficient` if the samples are coplanar or collinear
/// - `DegenerateFit` if the fitted radius is not a real positive number
pub fn estimate_hard_iron(samples: &[FieldVec]) -> Result<HardIronEstimate> {
    if samples.len() < SPHERE_PARAMS {
        return Err(CalibrationError::InsufficientSamples {
            got: samples.len(),
            required: SPHERE_PARAMS,
        });
    }

    let (a, y) = build_system(samples);
    let b = solve_least_squares(a, &y)?;

    let offset = FieldVec::new(b[0] / 2.0, b[1] / 2.0, b[2] / 2.0);
    let radius_sq = b[3] + offset.norm_squared();
    if !radius_sq.is_finite() || radius_sq <= 0.0 {
        return Err(CalibrationError::DegenerateFit(format!(
            "radius^2 = {:.6e}",
            radius_sq
        )));
    }
    let radius = radius_sq.sqrt();

    let sum_sq: f64 = samples
        .iter()
        .map(|m| ((m - offset).norm() - radius).powi(2))
        .sum();
    let rms_residual = (sum_sq / samples.len() as f64).sqrt();

    log::debug!(
        "Sphere fit: v=({:.4}, {:.4}, {:.4}) R={:.4} rms={:.2e} n={}",
        offset.x,
        offset.y,
        offset.z,
        radius,
        rms_residual,
        samples.len()
    );

    Ok(HardIronEstimate {
        offset: [offset.x, offset.y, offset.z],
        radius,
        sample_count: samples.len(),
        rms_residual,
    })
}

/// Subtract the estimated offset from every sample
pub fn correct(samples: &[FieldVec], estimate: &HardIronEstimate) -> Vec<FieldVec> {
    samples.iter().map(|m| estimate.apply(m)).collect()
}
