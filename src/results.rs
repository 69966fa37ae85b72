//! Result types for sectional analyses

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a sweep ended before reaching its control limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    ConcreteCrushing,
    RebarFracture,
    TendonRupture,
    ConvergenceFailure,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::ConcreteCrushing => "concrete_crushing",
            FailureMode::RebarFracture => "rebar_fracture",
            FailureMode::TendonRupture => "tendon_rupture",
            FailureMode::ConvergenceFailure => "convergence_failure",
        }
    }

    /// Physical failure as opposed to a numerical one
    pub fn is_physical(&self) -> bool {
        !matches!(self, FailureMode::ConvergenceFailure)
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which control variable a curve sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Control is curvature (1/mm)
    MomentCurvature,
    /// Control is average shear strain
    Shear,
}

/// One equilibrium state on a response curve (N, N·mm, 1/mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsePoint {
    /// Curvature or average shear strain
    pub control: f64,
    pub axial: f64,
    pub moment: f64,
    pub shear: f64,
    pub eps_ref: f64,
    pub curvature: f64,
    pub avg_shear_strain: f64,
    /// Elevation of zero longitudinal strain (moment-curvature only)
    pub neutral_axis: Option<f64>,
    pub converged: bool,
    pub iterations: usize,
}

/// Ordered response of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCurve {
    pub kind: CurveKind,
    pub points: Vec<ResponsePoint>,
    pub applied_axial: f64,
    pub applied_moment: f64,
    pub y_ref: f64,
    pub cracking_index: Option<usize>,
    pub yield_index: Option<usize>,
    pub ultimate_index: Option<usize>,
    pub failure_mode: Option<FailureMode>,
}

impl ResponseCurve {
    pub fn new(kind: CurveKind, applied_axial: f64, applied_moment: f64, y_ref: f64) -> Self {
        Self {
            kind,
            points: Vec::new(),
            applied_axial,
            applied_moment,
            y_ref,
            cracking_index: None,
            yield_index: None,
            ultimate_index: None,
            failure_mode: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn converged_points(&self) -> impl Iterator<Item = &ResponsePoint> {
        self.points.iter().filter(|p| p.converged)
    }

    fn point(&self, index: Option<usize>) -> Option<&ResponsePoint> {
        index.and_then(|i| self.points.get(i))
    }

    pub fn cracking_point(&self) -> Option<&ResponsePoint> {
        self.point(self.cracking_index)
    }

    pub fn yield_point(&self) -> Option<&ResponsePoint> {
        self.point(self.yield_index)
    }

    pub fn ultimate_point(&self) -> Option<&ResponsePoint> {
        self.point(self.ultimate_index)
    }

    /// Moment at first cracking (N·mm)
    pub fn cracking_moment(&self) -> Option<f64> {
        self.cracking_point().map(|p| p.moment)
    }

    pub fn yield_moment(&self) -> Option<f64> {
        self.yield_point().map(|p| p.moment)
    }

    pub fn ultimate_moment(&self) -> Option<f64> {
        self.ultimate_point().map(|p| p.moment)
    }

    /// Largest |V| over all points (N)
    pub fn peak_shear(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.shear.abs())
            .fold(0.0, f64::max)
    }

    /// Shear strain at which [`ResponseCurve::peak_shear`] occurs
    pub fn gamma_at_peak(&self) -> f64 {
        self.points
            .iter()
            .max_by(|a, b| a.shear.abs().total_cmp(&b.shear.abs()))
            .map_or(0.0, |p| p.avg_shear_strain)
    }
}

/// Shear stress at a layer from the longitudinal stiffness method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShearStressPoint {
    /// Layer mid-height (mm)
    pub y: f64,
    /// Shear stress (MPa)
    pub tau: f64,
    /// Shear flow gradient at the layer (N/mm²)
    pub delta_q: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(control: f64, moment: f64, shear: f64) -> ResponsePoint {
        ResponsePoint {
            control,
            axial: 0.0,
            moment,
            shear,
            eps_ref: 0.0,
            curvature: control,
            avg_shear_strain: control,
            neutral_axis: None,
            converged: true,
            iterations: 1,
        }
    }

    #[test]
    fn test_event_accessors() {
        let mut curve = ResponseCurve::new(CurveKind::MomentCurvature, 0.0, 0.0, 250.0);
        curve.points = vec![point(1.0, 10.0, 0.0), point(2.0, 50.0, 0.0), point(3.0, 60.0, 0.0)];
        curve.cracking_index = Some(0);
        curve.ultimate_index = Some(2);

        assert_eq!(curve.cracking_moment(), Some(10.0));
        assert_eq!(curve.yield_moment(), None);
        assert_eq!(curve.ultimate_moment(), Some(60.0));
        assert_eq!(curve.converged_points().count(), 3);
    }

    #[test]
    fn test_peak_shear() {
        let mut curve = ResponseCurve::new(CurveKind::Shear, 0.0, 0.0, 250.0);
        assert_eq!(curve.peak_shear(), 0.0);
        curve.points = vec![point(0.0, 0.0, 0.0), point(0.001, 0.0, -300.0), point(0.002, 0.0, 200.0)];
        assert_eq!(curve.peak_shear(), 300.0);
        assert_eq!(curve.gamma_at_peak(), 0.001);
    }

    #[test]
    fn test_failure_mode_names() {
        assert_eq!(FailureMode::ConcreteCrushing.to_string(), "concrete_crushing");
        assert_eq!(
            serde_json::to_string(&FailureMode::TendonRupture).unwrap(),
            "\"tendon_rupture\""
        );
        assert!(!FailureMode::ConvergenceFailure.is_physical());
    }
}
