//! Request parsing (JSON and `.r2t`) and report output

mod input;
mod r2t;
mod report;

pub use input::{
    AnalysisRequest, AnalysisSettings, Loading, RebarInput, TendonInput, TransverseInput,
};
pub use report::{
    AnalysisReport, ControlCurve, Metadata, OutputUnits, ReportResults, SectionProperties, Summary,
};

use log::info;

use crate::analysis::{
    shear_flow::shear_stress_distribution_with, AnalysisType, MomentCurvatureAnalysis,
    ShearAnalysis,
};
use crate::error::SectionResult;
use crate::section::StrainProfile;

/// Build the section, run the requested analysis and assemble the report
pub fn run_request(request: &AnalysisRequest) -> SectionResult<AnalysisReport> {
    let section = request.build_section()?;
    let analysis_type = request.analysis.analysis_type;
    info!(
        "running {} on a {:.0} mm deep section ({} layers)",
        analysis_type.as_str(),
        section.height(),
        section.layers().len()
    );

    let results = match analysis_type {
        AnalysisType::MomentCurvature => {
            let curve =
                MomentCurvatureAnalysis::new(&section, request.moment_curvature_options())?.run();
            ReportResults::from_curve(analysis_type, curve, None)
        }
        AnalysisType::Shear => {
            let options = request.shear_options();
            let node = options.node;
            let analysis = ShearAnalysis::new(&section, options)?;
            let curve = analysis.run();
            let profile = curve.ultimate_point().filter(|p| p.control > 0.0).map(|p| {
                let strains = StrainProfile::new(p.eps_ref, p.curvature, analysis.y_ref())
                    .with_shear(p.avg_shear_strain);
                shear_stress_distribution_with(&section, &strains, &node)
            });
            ReportResults::from_curve(analysis_type, curve, profile)
        }
    };

    Ok(AnalysisReport {
        metadata: Metadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generator: format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            analysis_type,
            input_units: request.units.clone(),
            computation_time: None,
        },
        units: OutputUnits::default(),
        section_properties: SectionProperties::of(&section),
        results,
    })
}

/// JSON request in, pretty JSON report out
pub fn run_json(request_json: &str) -> SectionResult<String> {
    let request = AnalysisRequest::from_json(request_json)?;
    let report = run_request(&request)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SectionError;

    #[test]
    fn test_run_json_moment_curvature() {
        let json = r#"{
            "section": {"shape": "rectangular", "b": 300, "h": 500},
            "concrete": {"fc": 35},
            "rebars": [{"y": 50, "area": 1500}],
            "analysis": {"n_steps": 40, "n_layers": 40}
        }"#;
        let out = run_json(json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["metadata"]["analysis_type"], "moment_curvature");
        assert_eq!(value["units"]["curvature"], "mrad/m");
        assert_eq!(value["section_properties"]["n_concrete_layers"], 40);
        assert_eq!(value["results"]["control_curves"][0]["name"], "moment_curvature");
        assert!(value["results"]["summary"]["ultimate"].as_f64().unwrap() > 0.0);
        assert!(value["results"].get("shear_stress_profile").is_none());
    }

    #[test]
    fn test_csv_rows_follow_response() {
        let request = AnalysisRequest::from_r2t(
            "[SECTION]\nb = 300\nh = 500\n[REBAR]\n50 1500\n[ANALYSIS]\nn_steps = 20\nn_layers = 40\n",
        )
        .unwrap();
        let report = run_request(&request).unwrap();
        let csv = report.results.to_csv(report.metadata.analysis_type);
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("curvature_1/mm,curvature_1/m,moment_Nmm,moment_kNm"));
        let rows: Vec<Vec<&str>> = lines.map(|l| l.split(',').collect()).collect();
        assert_eq!(rows.len(), report.results.response.len());
        assert!(rows.iter().all(|r| r.len() == 7));

        let first = &report.results.response.points[0];
        let curvature: f64 = rows[0][0].parse().unwrap();
        assert!((curvature - first.curvature).abs() <= 1e-9 * first.curvature);
        assert_eq!(rows[0][6], first.converged.to_string());
    }

    #[test]
    fn test_run_json_rejects_bad_input() {
        assert!(matches!(
            run_json("not json"),
            Err(SectionError::SerializationError(_))
        ));
        let zero_depth = r#"{"section": {"shape": "rectangular", "b": 300, "h": 0}}"#;
        assert!(matches!(
            run_json(zero_depth),
            Err(SectionError::InvalidGeometry(_))
        ));
    }
}
