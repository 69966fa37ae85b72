//! Analysis request, read from JSON or from `.r2t` text

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisType, MomentCurvatureOptions, ShearOptions};
use crate::error::{SectionError, SectionResult};
use crate::materials::{
    Concrete, ConcreteParams, PrestressParams, PrestressingSteel, ReinforcingSteel, SteelParams,
};
use crate::section::{
    CrossSection, CrossSectionBuilder, RebarBar, SectionShape, Stirrups, Tendon,
};

pub(super) const DEFAULT_PRESTRAIN: f64 = 0.005;

/// Complete analysis input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default = "default_units")]
    pub units: String,
    pub section: SectionShape,
    #[serde(default)]
    pub concrete: ConcreteParams,
    /// Default material for every bar
    #[serde(default)]
    pub long_steel: SteelParams,
    #[serde(default)]
    pub rebars: Vec<RebarInput>,
    #[serde(default)]
    pub tendons: Vec<TendonInput>,
    #[serde(default)]
    pub trans_steel: Option<TransverseInput>,
    #[serde(default)]
    pub loading: Loading,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

fn default_units() -> String {
    "SI".to_string()
}

/// Bar given either by `area` or by `n_bars` and `diameter`; material fields
/// override `long_steel` when `fy` is present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebarInput {
    pub y: f64,
    pub area: Option<f64>,
    pub n_bars: Option<u32>,
    pub diameter: Option<f64>,
    pub fy: Option<f64>,
    #[serde(rename = "Es")]
    pub es: Option<f64>,
    pub fu: Option<f64>,
    pub esu: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TendonInput {
    pub y: f64,
    pub area: f64,
    #[serde(default = "default_prestrain")]
    pub prestrain: f64,
    #[serde(flatten)]
    pub material: PrestressParams,
}

fn default_prestrain() -> f64 {
    DEFAULT_PRESTRAIN
}

/// Stirrups; `fy` and `Es` default to the longitudinal steel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransverseInput {
    #[serde(rename = "Av")]
    pub av: f64,
    pub s: f64,
    pub fy: Option<f64>,
    #[serde(rename = "Es")]
    pub es: Option<f64>,
    pub y_bot: Option<f64>,
    pub y_top: Option<f64>,
}

/// Applied actions (N, N·mm)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Loading {
    #[serde(rename = "N")]
    pub axial: f64,
    #[serde(rename = "M")]
    pub moment: f64,
    /// Accepted and echoed but not used: the V-gamma sweep is driven by shear
    /// strain, so shear force is always an output
    #[serde(rename = "V")]
    pub shear: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    #[serde(rename = "type")]
    pub analysis_type: AnalysisType,
    pub n_layers: usize,
    pub n_steps: Option<usize>,
    pub max_curvature: Option<f64>,
    pub curvature_step: Option<f64>,
    pub tol_force: Option<f64>,
    pub max_iter: Option<usize>,
    pub gamma_max: Option<f64>,
    pub tol_moment: Option<f64>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::default(),
            n_layers: 100,
            n_steps: None,
            max_curvature: None,
            curvature_step: None,
            tol_force: None,
            max_iter: None,
            gamma_max: None,
            tol_moment: None,
        }
    }
}

impl AnalysisRequest {
    pub fn from_json(json: &str) -> SectionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a `.json` or `.r2t` request. Without an extension JSON is tried
    /// first, then R2T; any other extension is rejected.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SectionResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if let Some(ext) = ext.as_deref() {
            if ext != "json" && ext != "r2t" {
                return Err(SectionError::UnsupportedFormat(ext.to_string()));
            }
        }

        let text = std::fs::read_to_string(path)?;
        match ext.as_deref() {
            Some("json") => Self::from_json(&text),
            Some(_) => Self::from_r2t(&text),
            None => Self::from_json(&text).or_else(|err| {
                debug!("{} is not JSON ({}), reading as r2t", path.display(), err);
                Self::from_r2t(&text)
            }),
        }
    }

    /// Resolve materials and assemble the layered section
    pub fn build_section(&self) -> SectionResult<CrossSection> {
        let concrete = Concrete::from_params(self.concrete.clone())?;
        let steel = ReinforcingSteel::from_params(self.long_steel.clone())?;

        let mut builder =
            CrossSectionBuilder::from_shape(&self.section, concrete, self.analysis.n_layers)?;

        for bar in &self.rebars {
            builder = builder.add_rebar(RebarBar {
                y: bar.y,
                area: bar.resolved_area()?,
                material: bar.material(&steel)?,
            });
        }

        for tendon in &self.tendons {
            builder = builder.add_tendon(Tendon {
                y: tendon.y,
                area: tendon.area,
                material: PrestressingSteel::from_params(tendon.material.clone())?,
                prestrain: tendon.prestrain,
            });
        }

        if let Some(ts) = &self.trans_steel {
            let material = ReinforcingSteel::from_params(SteelParams {
                fy: ts.fy.unwrap_or(steel.fy),
                es: ts.es.unwrap_or(steel.es),
                ..SteelParams::default()
            })?;
            builder = builder.stirrups(Stirrups {
                av: ts.av,
                spacing: ts.s,
                material,
                y_bottom: ts.y_bot,
                y_top: ts.y_top,
            });
        }

        builder.build()
    }

    pub fn moment_curvature_options(&self) -> MomentCurvatureOptions {
        let a = &self.analysis;
        let defaults = MomentCurvatureOptions::default();
        MomentCurvatureOptions {
            axial_load: self.loading.axial,
            max_curvature: a.max_curvature,
            n_steps: a.n_steps.unwrap_or(defaults.n_steps),
            curvature_step: a.curvature_step,
            y_ref: None,
            tol_force: a.tol_force.unwrap_or(defaults.tol_force),
            max_iter: a.max_iter.unwrap_or(defaults.max_iter),
        }
    }

    pub fn shear_options(&self) -> ShearOptions {
        let a = &self.analysis;
        let defaults = ShearOptions::default();
        ShearOptions {
            axial_load: self.loading.axial,
            moment: self.loading.moment,
            gamma_max: a.gamma_max.unwrap_or(defaults.gamma_max),
            n_steps: a.n_steps.unwrap_or(defaults.n_steps),
            max_iter: a.max_iter.unwrap_or(defaults.max_iter),
            tol_force: a.tol_force.unwrap_or(defaults.tol_force),
            tol_moment: a.tol_moment.unwrap_or(defaults.tol_moment),
            ..defaults
        }
    }
}

impl RebarInput {
    fn resolved_area(&self) -> SectionResult<f64> {
        match (self.area, self.n_bars, self.diameter) {
            (_, Some(n), Some(d)) => Ok(n as f64 * std::f64::consts::FRAC_PI_4 * d * d),
            (Some(area), _, _) => Ok(area),
            _ => Err(SectionError::InvalidInput(format!(
                "rebar at y={} needs `area` or `n_bars` and `diameter`",
                self.y
            ))),
        }
    }

    fn material(&self, base: &ReinforcingSteel) -> SectionResult<ReinforcingSteel> {
        match self.fy {
            None => Ok(*base),
            Some(fy) => ReinforcingSteel::from_params(SteelParams {
                fy,
                es: self.es.unwrap_or(base.es),
                fu: Some(self.fu.unwrap_or(base.fu.max(fy))),
                esu: self.esu.unwrap_or(base.esu),
                ..SteelParams::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BEAM: &str = r#"{
        "section": {"shape": "rectangular", "b": 300, "h": 500},
        "concrete": {"fc": 35},
        "long_steel": {"fy": 400, "fu": 600, "esh": 0.01},
        "rebars": [
            {"y": 50, "area": 1500},
            {"y": 450, "n_bars": 2, "diameter": 16, "fy": 500}
        ],
        "trans_steel": {"Av": 157, "s": 200},
        "loading": {"N": -100000},
        "analysis": {"type": "moment_curvature", "n_steps": 80, "n_layers": 50}
    }"#;

    #[test]
    fn test_parse_and_build() {
        let request = AnalysisRequest::from_json(BEAM).unwrap();
        assert_eq!(request.units, "SI");
        assert_eq!(request.loading.axial, -100_000.0);

        let section = request.build_section().unwrap();
        assert_eq!(section.layers().len(), 50);
        assert_eq!(section.rebars().len(), 2);
        assert_relative_eq!(
            section.rebars()[1].area,
            2.0 * std::f64::consts::FRAC_PI_4 * 256.0,
            epsilon = 1e-9
        );
        assert_eq!(section.rebars()[0].material.fu, 600.0);
        assert_eq!(section.rebars()[1].material.fy, 500.0);
        assert!(section.has_transverse_steel());
    }

    #[test]
    fn test_options_follow_request() {
        let request = AnalysisRequest::from_json(BEAM).unwrap();
        let mc = request.moment_curvature_options();
        assert_eq!(mc.n_steps, 80);
        assert_eq!(mc.axial_load, -100_000.0);
        assert_eq!(mc.max_iter, 50);

        let shear = request.shear_options();
        assert_eq!(shear.n_steps, 80);
        assert_eq!(shear.gamma_max, 0.01);
    }

    #[test]
    fn test_tendon_defaults() {
        let json = r#"{
            "section": {"shape": "tee", "bw": 200, "hw": 600, "bf": 1000, "hf": 150},
            "tendons": [{"y": 100, "area": 987, "fpu": 1860}]
        }"#;
        let request = AnalysisRequest::from_json(json).unwrap();
        let section = request.build_section().unwrap();
        let tendon = section.tendons()[0];
        assert_eq!(tendon.prestrain, 0.005);
        assert_eq!(tendon.material.ep, 196_500.0);
        assert_relative_eq!(tendon.material.fpy, 0.9 * 1860.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        assert!(matches!(
            AnalysisRequest::from_file("beam.txt"),
            Err(SectionError::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(matches!(
            AnalysisRequest::from_file("does/not/exist.json"),
            Err(SectionError::IoError(_))
        ));
        assert!(matches!(
            AnalysisRequest::from_file("does/not/exist.R2T"),
            Err(SectionError::IoError(_))
        ));

        let dir = std::env::temp_dir().join(format!("rc-section-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let r2t = dir.join("beam.r2t");
        std::fs::write(&r2t, "[CONCRETE]\nfc = 40\n[REBAR]\n50 1500\n").unwrap();
        let bare = dir.join("beam");
        std::fs::write(&bare, BEAM).unwrap();

        let from_text = AnalysisRequest::from_file(&r2t).unwrap();
        assert_eq!(from_text.concrete.fc, 40.0);
        assert_eq!(from_text.rebars.len(), 1);
        let from_json = AnalysisRequest::from_file(&bare).unwrap();
        assert_eq!(from_json.rebars.len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_requests() {
        assert!(AnalysisRequest::from_json("{").is_err());
        let no_area = r#"{"section": {"shape": "rectangular", "b": 300, "h": 500},
                          "rebars": [{"y": 50}]}"#;
        let request = AnalysisRequest::from_json(no_area).unwrap();
        assert!(request.build_section().is_err());

        let bad_concrete = r#"{"section": {"shape": "rectangular", "b": 300, "h": 500},
                               "concrete": {"fc": -5}}"#;
        let request = AnalysisRequest::from_json(bad_concrete).unwrap();
        assert!(matches!(
            request.build_section(),
            Err(SectionError::InvalidMaterial(_))
        ));
    }
}
