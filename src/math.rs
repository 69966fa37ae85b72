//! Small dense linear algebra and finite-difference helpers

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

pub type Mat2 = Matrix2<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec2 = Vector2<f64>;
pub type Vec3 = Vector3<f64>;

/// Determinant floor below which a 3x3 section tangent is treated as singular
pub const SINGULAR_DET_3X3: f64 = 1e-30;

/// Determinant floor for the 2x2 axial/flexural block
pub const SINGULAR_DET_2X2: f64 = 1e-20;

/// Cofactor expansion along the first row
pub fn det3(a: &Mat3) -> f64 {
    a[(0, 0)] * (a[(1, 1)] * a[(2, 2)] - a[(1, 2)] * a[(2, 1)])
        - a[(0, 1)] * (a[(1, 0)] * a[(2, 2)] - a[(1, 2)] * a[(2, 0)])
        + a[(0, 2)] * (a[(1, 0)] * a[(2, 1)] - a[(1, 1)] * a[(2, 0)])
}

/// Solve a 3x3 system `A x = b` with Cramer's rule.
///
/// Returns `None` when `|det(A)| < SINGULAR_DET_3X3`.
pub fn solve_3x3(a: &Mat3, b: &Vec3) -> Option<Vec3> {
    let det = det3(a);
    if det.abs() < SINGULAR_DET_3X3 {
        return None;
    }

    let mut x = Vec3::zeros();
    for col in 0..3 {
        let mut m = *a;
        m.set_column(col, b);
        x[col] = det3(&m) / det;
    }
    Some(x)
}

/// Solve a 2x2 system in closed form.
///
/// Returns `None` when `|det(A)| < det_floor`.
pub fn solve_2x2(a: &Mat2, b: &Vec2, det_floor: f64) -> Option<Vec2> {
    let det = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)];
    if det.abs() < det_floor {
        return None;
    }
    Some(Vec2::new(
        (a[(1, 1)] * b[0] - a[(0, 1)] * b[1]) / det,
        (a[(0, 0)] * b[1] - a[(1, 0)] * b[0]) / det,
    ))
}

/// Central finite difference of a scalar function
pub fn central_difference<F: Fn(f64) -> f64>(f: F, x: f64, h: f64) -> f64 {
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Limit `value` to `[-max_abs, max_abs]` keeping its sign
pub fn clamp_magnitude(value: f64, max_abs: f64) -> f64 {
    if value.abs() > max_abs {
        max_abs.copysign(value)
    } else {
        value
    }
}
