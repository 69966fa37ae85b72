//! Analysis types and options

pub mod mcft;
pub mod moment_curvature;
pub mod shear_flow;
pub mod shear_response;

use serde::{Deserialize, Serialize};

pub use mcft::{principal_strains, solve_node, McftState, NodeSolverSettings};
pub use moment_curvature::MomentCurvatureAnalysis;
pub use shear_flow::shear_stress_distribution;
pub use shear_response::ShearAnalysis;

/// Type of sectional analysis to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Curvature sweep under constant axial load
    #[default]
    MomentCurvature,
    /// Average shear strain sweep under constant N and M
    Shear,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::MomentCurvature => "moment_curvature",
            AnalysisType::Shear => "shear",
        }
    }
}

/// Options for the moment-curvature sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentCurvatureOptions {
    /// Applied axial load (N, tension positive)
    pub axial_load: f64,
    /// Curvature limit (1/mm); defaults to 0.0035 / (0.1 h)
    pub max_curvature: Option<f64>,
    pub n_steps: usize,
    /// Fixed curvature increment; overrides `n_steps`
    pub curvature_step: Option<f64>,
    /// Reference axis; defaults to the gross concrete centroid
    pub y_ref: Option<f64>,
    /// Axial equilibrium tolerance (N)
    pub tol_force: f64,
    pub max_iter: usize,
}

impl Default for MomentCurvatureOptions {
    fn default() -> Self {
        Self {
            axial_load: 0.0,
            max_curvature: None,
            n_steps: 200,
            curvature_step: None,
            y_ref: None,
            tol_force: 1.0,
            max_iter: 50,
        }
    }
}

impl MomentCurvatureOptions {
    pub fn with_axial_load(mut self, axial_load: f64) -> Self {
        self.axial_load = axial_load;
        self
    }

    pub fn with_max_curvature(mut self, max_curvature: f64) -> Self {
        self.max_curvature = Some(max_curvature);
        self
    }

    pub fn with_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    pub fn with_curvature_step(mut self, step: f64) -> Self {
        self.curvature_step = Some(step);
        self
    }

    pub fn with_reference_axis(mut self, y_ref: f64) -> Self {
        self.y_ref = Some(y_ref);
        self
    }

    pub fn with_tolerance(mut self, tol_force: f64) -> Self {
        self.tol_force = tol_force;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

/// Options for the V-gamma sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShearOptions {
    /// Applied axial load (N)
    pub axial_load: f64,
    /// Applied moment (N·mm, sagging positive)
    pub moment: f64,
    pub y_ref: Option<f64>,
    /// Largest average shear strain
    pub gamma_max: f64,
    pub n_steps: usize,
    pub max_iter: usize,
    /// Axial residual tolerance (N)
    pub tol_force: f64,
    /// Moment residual tolerance (N·mm)
    pub tol_moment: f64,
    /// Newton step limit on eps_ref
    pub max_strain_step: f64,
    /// Newton step limit on curvature (1/mm)
    pub max_curvature_step: f64,
    pub node: NodeSolverSettings,
}

impl Default for ShearOptions {
    fn default() -> Self {
        Self {
            axial_load: 0.0,
            moment: 0.0,
            y_ref: None,
            gamma_max: 0.01,
            n_steps: 50,
            max_iter: 30,
            tol_force: 1.0,
            tol_moment: 1000.0,
            max_strain_step: 0.001,
            max_curvature_step: 1e-4,
            node: NodeSolverSettings::default(),
        }
    }
}

impl ShearOptions {
    pub fn with_loads(mut self, axial_load: f64, moment: f64) -> Self {
        self.axial_load = axial_load;
        self.moment = moment;
        self
    }

    pub fn with_gamma_max(mut self, gamma_max: f64) -> Self {
        self.gamma_max = gamma_max;
        self
    }

    pub fn with_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    pub fn with_reference_axis(mut self, y_ref: f64) -> Self {
        self.y_ref = Some(y_ref);
        self
    }

    pub fn with_tolerances(mut self, tol_force: f64, tol_moment: f64) -> Self {
        self.tol_force = tol_force;
        self.tol_moment = tol_moment;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}
