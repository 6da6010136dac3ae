//! Linear algebra type aliases for the sphere fit
//!
//! Keeps the least-squares dimensions in one place.

use nalgebra::{DMatrix, DVector, Vector3};

// ===== Sphere Fit Dimensions =====
pub const SPHERE_PARAMS: usize = 4; // (2*v_x, 2*v_y, 2*v_z, c)

/// Magnetic field sample or offset [gauss]
pub type FieldVec = Vector3<f64>;

/// N×4 design matrix, rows [m_x, m_y, m_z, 1]
pub type DesignMatrix = DMatrix<f64>;

/// N-vector of squared field magnitudes
pub type TargetVec = DVector<f64>;

/// Least-squares solution [2*v_x, 2*v_y, 2*v_z, c]
pub type SphereParams = DVector<f64>;
