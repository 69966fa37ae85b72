//! JSON and CSV output report.
//!
//! Control curves are converted to engineering output units: curvature in
//! mrad/m, moment in kN·m, strain in mm/m, force in kN. The raw response is
//! kept alongside in N, mm.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisType;
use crate::results::{FailureMode, ResponseCurve, ResponsePoint, ShearStressPoint};
use crate::section::CrossSection;

/// curvature 1/mm -> mrad/m
pub const CURVATURE_TO_OUTPUT: f64 = 1e6;
/// N·mm -> kN·m
pub const MOMENT_TO_OUTPUT: f64 = 1e-6;
/// strain -> mm/m
pub const STRAIN_TO_OUTPUT: f64 = 1e3;
/// N -> kN
pub const FORCE_TO_OUTPUT: f64 = 1e-3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: Metadata,
    pub units: OutputUnits,
    pub section_properties: SectionProperties,
    pub results: ReportResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub generator: String,
    pub analysis_type: AnalysisType,
    pub input_units: String,
    /// Wall time in seconds, filled in by front ends that measure it
    pub computation_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputUnits {
    pub length: String,
    pub force: String,
    pub stress: String,
    pub moment: String,
    pub strain: String,
    pub curvature: String,
}

impl Default for OutputUnits {
    fn default() -> Self {
        Self {
            length: "mm".to_string(),
            force: "kN".to_string(),
            stress: "MPa".to_string(),
            moment: "kNm".to_string(),
            strain: "mm/m".to_string(),
            curvature: "mrad/m".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionProperties {
    pub height_mm: f64,
    pub gross_area_mm2: f64,
    pub centroid_y_mm: f64,
    #[serde(rename = "gross_Ig_mm4")]
    pub gross_ig_mm4: f64,
    pub transformed_area_mm2: f64,
    pub total_rebar_area_mm2: f64,
    pub reinforcement_ratio: f64,
    pub n_concrete_layers: usize,
    pub n_rebars: usize,
    pub n_tendons: usize,
}

impl SectionProperties {
    pub fn of(section: &CrossSection) -> Self {
        Self {
            height_mm: section.height(),
            gross_area_mm2: section.gross_area(),
            centroid_y_mm: section.centroid_y(),
            gross_ig_mm4: section.gross_moment_of_inertia(),
            transformed_area_mm2: section.transformed_area(),
            total_rebar_area_mm2: section.total_rebar_area(),
            reinforcement_ratio: section.reinforcement_ratio(),
            n_concrete_layers: section.layers().len(),
            n_rebars: section.rebars().len(),
            n_tendons: section.tendons().len(),
        }
    }
}

/// One named x-y curve in output units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCurve {
    pub name: String,
    pub description: String,
    pub x_axis: String,
    pub y_axis: String,
    pub data: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// kN·m for moment-curvature, kN for shear
    pub cracking: Option<f64>,
    #[serde(rename = "yield")]
    pub yielding: Option<f64>,
    pub ultimate: Option<f64>,
    pub failure_mode: Option<FailureMode>,
    pub total_points: usize,
    pub converged_points: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResults {
    pub control_curves: Vec<ControlCurve>,
    pub summary: Summary,
    /// Shear stress through the depth at the ultimate point (shear analysis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shear_stress_profile: Option<Vec<ShearStressPoint>>,
    pub response: ResponseCurve,
}

impl ReportResults {
    pub fn from_curve(
        analysis_type: AnalysisType,
        curve: ResponseCurve,
        shear_stress_profile: Option<Vec<ShearStressPoint>>,
    ) -> Self {
        let converged: Vec<_> = curve.converged_points().copied().collect();

        let (control_curves, scale) = match analysis_type {
            AnalysisType::MomentCurvature => (
                vec![
                    ControlCurve {
                        name: "moment_curvature".to_string(),
                        description: "Moment vs Curvature".to_string(),
                        x_axis: "curvature".to_string(),
                        y_axis: "moment".to_string(),
                        data: converged
                            .iter()
                            .map(|p| [p.curvature * CURVATURE_TO_OUTPUT, p.moment * MOMENT_TO_OUTPUT])
                            .collect(),
                    },
                    ControlCurve {
                        name: "moment_axial_strain".to_string(),
                        description: "Moment vs Reference Axial Strain".to_string(),
                        x_axis: "axial_strain".to_string(),
                        y_axis: "moment".to_string(),
                        data: converged
                            .iter()
                            .map(|p| [p.eps_ref * STRAIN_TO_OUTPUT, p.moment * MOMENT_TO_OUTPUT])
                            .collect(),
                    },
                ],
                MOMENT_TO_OUTPUT,
            ),
            AnalysisType::Shear => (
                vec![ControlCurve {
                    name: "shear_strain".to_string(),
                    description: "Shear Force vs Average Shear Strain".to_string(),
                    x_axis: "shear_strain".to_string(),
                    y_axis: "shear".to_string(),
                    data: converged
                        .iter()
                        .map(|p| [p.avg_shear_strain * STRAIN_TO_OUTPUT, p.shear * FORCE_TO_OUTPUT])
                        .collect(),
                }],
                FORCE_TO_OUTPUT,
            ),
        };

        let resultant = |p: &ResponsePoint| match analysis_type {
            AnalysisType::MomentCurvature => p.moment * scale,
            AnalysisType::Shear => p.shear * scale,
        };
        let summary = Summary {
            cracking: curve.cracking_point().map(resultant),
            yielding: curve.yield_point().map(resultant),
            ultimate: curve.ultimate_point().map(resultant),
            failure_mode: curve.failure_mode,
            total_points: curve.len(),
            converged_points: converged.len(),
        };

        Self {
            control_curves,
            summary,
            shear_stress_profile,
            response: curve,
        }
    }
    /// Every response point as CSV rows in N, mm
    pub fn to_csv(&self, analysis_type: AnalysisType) -> String {
        let mut out = String::new();
        match analysis_type {
            AnalysisType::MomentCurvature => {
                out.push_str(
                    "curvature_1/mm,curvature_1/m,moment_Nmm,moment_kNm,eps_0,neutral_axis_y_mm,converged\n",
                );
                for p in &self.response.points {
                    let neutral_axis = p.neutral_axis.map(|y| format!("{:.3}", y)).unwrap_or_default();
                    // writing to a String cannot fail
                    let _ = writeln!(
                        out,
                        "{:.10e},{:.10e},{:.6e},{:.6},{:.10e},{},{}",
                        p.curvature,
                        p.curvature * 1e3,
                        p.moment,
                        p.moment * MOMENT_TO_OUTPUT,
                        p.eps_ref,
                        neutral_axis,
                        p.converged
                    );
                }
            }
            AnalysisType::Shear => {
                out.push_str("shear_strain,shear_N,shear_kN,eps_0,curvature_1/mm,converged\n");
                for p in &self.response.points {
                    let _ = writeln!(
                        out,
                        "{:.10e},{:.6e},{:.6},{:.10e},{:.10e},{}",
                        p.avg_shear_strain,
                        p.shear,
                        p.shear * FORCE_TO_OUTPUT,
                        p.eps_ref,
                        p.curvature,
                        p.converged
                    );
                }
            }
        }
        out
    }
}
