//! Response-2000 style `.r2t` text input
//!
//! The file is a sequence of blocks opened by a bracketed header such as
//! `[CONCRETE]`. Lines starting with `#` or `;` are comments. Property lines
//! read `key = value` (or `key value`), while `[REBAR]` and `[TENDON]` rows are
//! whitespace-separated numbers. Missing blocks fall back to the same defaults
//! as the JSON request.

use std::collections::HashMap;

use log::{debug, warn};

use super::input::{
    AnalysisRequest, AnalysisSettings, Loading, RebarInput, TendonInput, TransverseInput,
    DEFAULT_PRESTRAIN,
};
use crate::analysis::AnalysisType;
use crate::error::{SectionError, SectionResult};
use crate::materials::{ConcreteParams, PrestressParams, SteelParams};
use crate::section::SectionShape;

/// Third rebar column above this is a yield stress, otherwise a bar diameter
const REBAR_FY_THRESHOLD: f64 = 100.0;

const KNOWN_BLOCKS: [&str; 10] = [
    "UNITS",
    "SECTION",
    "CONCRETE",
    "LONG STEEL",
    "TRANS STEEL",
    "REBAR",
    "TENDON",
    "PRESTRESSING STEEL",
    "LOADING",
    "ANALYSIS",
];

/// Lines grouped under their upper-cased block name
struct Blocks<'a> {
    lines: HashMap<String, Vec<&'a str>>,
}

impl<'a> Blocks<'a> {
    fn split(text: &'a str) -> Self {
        let mut lines: HashMap<String, Vec<&'a str>> = HashMap::new();
        let mut current = String::from("_HEADER");

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = name.trim().to_uppercase();
                if !KNOWN_BLOCKS.contains(&current.as_str()) {
                    warn!("ignoring unsupported r2t block [{}]", current);
                }
                lines.entry(current.clone()).or_default();
                continue;
            }
            lines.entry(current.clone()).or_default().push(line);
        }
        Self { lines }
    }

    fn get(&self, name: &str) -> &[&'a str] {
        self.lines.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `key = value` pairs of a block with numeric values
    fn properties(&self, name: &str) -> Properties {
        Properties::parse(self.get(name))
    }
}

/// Numeric properties keyed by lower-cased name; later lines win
#[derive(Default)]
struct Properties {
    values: HashMap<String, f64>,
    text: HashMap<String, String>,
}

impl Properties {
    fn parse(lines: &[&str]) -> Self {
        let mut props = Self::default();
        for line in lines {
            let Some((key, value)) = split_key_value(line) else {
                continue;
            };
            match value.parse::<f64>() {
                Ok(v) => {
                    props.values.insert(key, v);
                }
                Err(_) => {
                    props.text.insert(key, value.to_string());
                }
            }
        }
        props
    }

    /// First of `keys` that is present
    fn get(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| self.values.get(*k).copied())
    }

    fn get_or(&self, keys: &[&str], default: f64) -> f64 {
        self.get(keys).unwrap_or(default)
    }

    fn count(&self, key: &str) -> SectionResult<Option<usize>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(&v) if v >= 1.0 && v.fract() == 0.0 => Ok(Some(v as usize)),
            Some(&v) => Err(SectionError::InvalidInput(format!(
                "`{}` must be a positive whole number, got {}",
                key, v
            ))),
        }
    }
}

/// Split `key = value`, `key, value` or `key value` at the first separator run
fn split_key_value(line: &str) -> Option<(String, &str)> {
    let is_sep = |c: char| c == '=' || c == ',' || c.is_whitespace();
    let end = line.find(is_sep)?;
    let key = line[..end].trim().to_lowercase();
    let value = line[end..].trim_start_matches(is_sep).trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Whitespace-separated numeric row; `None` if any column is not a number
fn numeric_row(line: &str) -> Option<Vec<f64>> {
    line.split_whitespace().map(|p| p.parse::<f64>().ok()).collect()
}

impl AnalysisRequest {
    /// Parse the text of an `.r2t` file
    pub fn from_r2t(text: &str) -> SectionResult<Self> {
        let blocks = Blocks::split(text);

        let units = if blocks
            .get("UNITS")
            .iter()
            .any(|l| l.to_uppercase().contains("US"))
        {
            "US"
        } else {
            "SI"
        };

        let request = AnalysisRequest {
            units: units.to_string(),
            section: section_shape(blocks.get("SECTION")),
            concrete: concrete(&blocks.properties("CONCRETE")),
            long_steel: long_steel(&blocks.properties("LONG STEEL")),
            rebars: rebars(blocks.get("REBAR")),
            tendons: tendons(blocks.get("TENDON"), &blocks.properties("PRESTRESSING STEEL")),
            trans_steel: transverse(blocks.get("TRANS STEEL")),
            loading: loading(&blocks.properties("LOADING")),
            analysis: analysis(blocks.get("ANALYSIS"))?,
        };
        debug!(
            "r2t: {} rebars, {} tendons, stirrups: {}",
            request.rebars.len(),
            request.tendons.len(),
            request.trans_steel.is_some()
        );
        Ok(request)
    }
}

fn section_shape(lines: &[&str]) -> SectionShape {
    let mut circular = false;
    let mut tee = false;
    for line in lines {
        let low = line.to_lowercase();
        if low.contains("circular") || low.contains("circle") {
            circular = true;
        } else if low.contains("tee") || low.contains("t-section") {
            tee = true;
        }
    }

    let p = Properties::parse(lines);
    if circular {
        SectionShape::Circular {
            diameter: p.get_or(&["d", "diameter"], 500.0),
        }
    } else if tee {
        SectionShape::Tee {
            bw: p.get_or(&["bw"], 300.0),
            hw: p.get_or(&["hw"], 400.0),
            bf: p.get_or(&["bf"], 600.0),
            hf: p.get_or(&["hf"], 100.0),
        }
    } else {
        SectionShape::Rectangular {
            b: p.get_or(&["b", "width"], 300.0),
            h: p.get_or(&["h", "height", "d"], 500.0),
        }
    }
}

fn concrete(p: &Properties) -> ConcreteParams {
    let defaults = ConcreteParams::default();
    ConcreteParams {
        fc: p.get_or(&["fc", "f'c", "fpc"], defaults.fc),
        ec: p.get(&["ec"]),
        ec_modulus: p.get(&["ec_mod", "e_c"]),
        ft: p.get(&["ft"]),
        ecu: p.get_or(&["ecu"], defaults.ecu),
        aggregate_size: p.get_or(&["agg", "aggregate"], defaults.aggregate_size),
        ..defaults
    }
}

fn long_steel(p: &Properties) -> SteelParams {
    let defaults = SteelParams::default();
    SteelParams {
        fy: p.get_or(&["fy"], defaults.fy),
        es: p.get_or(&["es", "e_s"], defaults.es),
        fu: p.get(&["fu"]),
        esh: p.get(&["esh"]),
        esu: p.get_or(&["esu"], defaults.esu),
        ..defaults
    }
}

/// Rows of `y area`, `y area fy` or `y n_bars diameter`
fn rebars(lines: &[&str]) -> Vec<RebarInput> {
    let mut bars = Vec::new();
    for line in lines {
        let Some(vals) = numeric_row(line).filter(|v| v.len() >= 2) else {
            warn!("skipping rebar row `{}`", line);
            continue;
        };
        let mut bar = RebarInput {
            y: vals[0],
            area: None,
            n_bars: None,
            diameter: None,
            fy: None,
            es: None,
            fu: None,
            esu: None,
        };
        match vals.get(2) {
            Some(&third) if third <= REBAR_FY_THRESHOLD => {
                bar.n_bars = Some(vals[1].round().max(0.0) as u32);
                bar.diameter = Some(third);
            }
            third => {
                bar.area = Some(vals[1]);
                bar.fy = third.copied();
            }
        }
        bars.push(bar);
    }
    bars
}

/// Rows of `y area [prestrain]` sharing the `[PRESTRESSING STEEL]` material
fn tendons(lines: &[&str], material: &Properties) -> Vec<TendonInput> {
    let defaults = PrestressParams::default();
    let params = PrestressParams {
        fpu: material.get_or(&["fpu"], defaults.fpu),
        ep: material.get_or(&["ep"], defaults.ep),
        fpy: material.get(&["fpy"]),
        epu: material.get_or(&["epu"], defaults.epu),
        ..defaults
    };

    lines
        .iter()
        .filter_map(|line| {
            let row = numeric_row(line).filter(|v| v.len() >= 2);
            if row.is_none() {
                warn!("skipping tendon row `{}`", line);
            }
            row
        })
        .map(|vals| TendonInput {
            y: vals[0],
            area: vals[1],
            prestrain: vals.get(2).copied().unwrap_or(DEFAULT_PRESTRAIN),
            material: params.clone(),
        })
        .collect()
}

fn transverse(lines: &[&str]) -> Option<TransverseInput> {
    if lines.is_empty() {
        return None;
    }
    let p = Properties::parse(lines);
    match (p.get(&["av"]), p.get(&["s"])) {
        (Some(av), Some(s)) => Some(TransverseInput {
            av,
            s,
            fy: p.get(&["fy"]),
            es: p.get(&["es"]),
            y_bot: p.get(&["y_bot"]),
            y_top: p.get(&["y_top"]),
        }),
        _ => {
            warn!("[TRANS STEEL] needs both Av and s; stirrups ignored");
            None
        }
    }
}

fn loading(p: &Properties) -> Loading {
    Loading {
        axial: p.get_or(&["n", "axial"], 0.0),
        moment: p.get_or(&["m", "moment"], 0.0),
        shear: p.get_or(&["v", "shear"], 0.0),
    }
}

fn analysis(lines: &[&str]) -> SectionResult<AnalysisSettings> {
    let mut settings = AnalysisSettings::default();
    for line in lines {
        let low = line.to_lowercase();
        if low.contains("moment") && low.contains("curvature") {
            settings.analysis_type = AnalysisType::MomentCurvature;
        } else if low.contains("shear") {
            settings.analysis_type = AnalysisType::Shear;
        } else if ["member", "pushover", "interaction"]
            .iter()
            .any(|k| low.contains(k))
        {
            return Err(SectionError::InvalidInput(format!(
                "analysis `{}` is not supported",
                line
            )));
        }
    }

    let p = Properties::parse(lines);
    if let Some(n) = p.count("n_layers")? {
        settings.n_layers = n;
    }
    settings.n_steps = p.count("n_steps")?;
    settings.max_iter = p.count("max_iter")?;
    settings.max_curvature = p.get(&["max_curvature"]);
    settings.curvature_step = p.get(&["curvature_step"]);
    settings.tol_force = p.get(&["tol_force"]);
    settings.gamma_max = p.get(&["gamma_max"]);
    settings.tol_moment = p.get(&["tol_moment"]);
    for key in p.text.keys().filter(|k| k.as_str() != "type") {
        debug!("r2t: ignoring non-numeric analysis key `{}`", key);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BEAM: &str = "\
# 300 x 500 beam with stirrups
[UNITS]
SI

[SECTION]
rectangular
b = 300
h = 500

[CONCRETE]
fc = 35
agg = 10

[LONG STEEL]
fy = 400
fu = 600
esh = 0.01

[REBAR]
; y  area
50   1500
450  2  16
250  300  500

[TRANS STEEL]
Av = 157
s = 200
fy = 450

[LOADING]
N = -100000
V = 150000

[ANALYSIS]
type = shear
n_layers = 30
n_steps = 10
gamma_max = 0.002
";

    #[test]
    fn test_parse_beam() {
        let request = AnalysisRequest::from_r2t(BEAM).unwrap();
        assert_eq!(request.units, "SI");
        assert!(matches!(
            request.section,
            SectionShape::Rectangular { b, h } if b == 300.0 && h == 500.0
        ));
        assert_eq!(request.concrete.fc, 35.0);
        assert_eq!(request.concrete.aggregate_size, 10.0);
        assert_eq!(request.long_steel.fu, Some(600.0));
        assert_eq!(request.loading.axial, -100_000.0);
        assert_eq!(request.loading.shear, 150_000.0);

        let a = &request.analysis;
        assert_eq!(a.analysis_type, AnalysisType::Shear);
        assert_eq!(a.n_layers, 30);
        assert_eq!(a.n_steps, Some(10));
        assert_eq!(a.gamma_max, Some(0.002));

        let stirrups = request.trans_steel.as_ref().unwrap();
        assert_eq!((stirrups.av, stirrups.s, stirrups.fy), (157.0, 200.0, Some(450.0)));
    }

    #[test]
    fn test_rebar_row_forms() {
        let request = AnalysisRequest::from_r2t(BEAM).unwrap();
        let section = request.build_section().unwrap();
        let bars = section.rebars();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].area, 1500.0);
        assert_relative_eq!(
            bars[1].area,
            2.0 * std::f64::consts::FRAC_PI_4 * 256.0,
            epsilon = 1e-9
        );
        assert_eq!(bars[1].material.fy, 400.0);
        // third column above 100 is a yield stress
        assert_eq!(bars[2].area, 300.0);
        assert_eq!(bars[2].material.fy, 500.0);
        assert_eq!(section.layers().len(), 30);
        assert!(section.has_transverse_steel());
    }

    #[test]
    fn test_defaults_and_tendons() {
        let text = "\
[UNITS]
US customary
[SECTION]
T-section
bw = 200
hw = 600
bf = 1000
hf = 150
[PRESTRESSING STEEL]
fpu = 1770
[TENDON]
100 987
80 500 0.006
not a row
";
        let request = AnalysisRequest::from_r2t(text).unwrap();
        assert_eq!(request.units, "US");
        assert!(matches!(request.section, SectionShape::Tee { bf, .. } if bf == 1000.0));
        assert_eq!(request.concrete.fc, 30.0);
        assert_eq!(request.analysis.analysis_type, AnalysisType::MomentCurvature);
        assert_eq!(request.analysis.n_layers, 100);
        assert!(request.trans_steel.is_none());

        assert_eq!(request.tendons.len(), 2);
        assert_eq!(request.tendons[0].prestrain, 0.005);
        assert_eq!(request.tendons[1].prestrain, 0.006);
        assert_eq!(request.tendons[1].material.fpu, 1770.0);
        assert_eq!(request.tendons[1].material.epu, 0.04);
    }

    #[test]
    fn test_circular_section_and_separators() {
        let text = "[SECTION]\ncircular\ndiameter, 600\n[ANALYSIS]\nmoment curvature\nn_steps 50\n";
        let request = AnalysisRequest::from_r2t(text).unwrap();
        assert!(matches!(
            request.section,
            SectionShape::Circular { diameter } if diameter == 600.0
        ));
        assert_eq!(request.analysis.n_steps, Some(50));
    }

    #[test]
    fn test_incomplete_stirrups_are_dropped() {
        let text = "[TRANS STEEL]\nAv = 157\n";
        let request = AnalysisRequest::from_r2t(text).unwrap();
        assert!(request.trans_steel.is_none());
    }

    #[test]
    fn test_rejects_unsupported_analysis() {
        let text = "[ANALYSIS]\ntype = member_response\n";
        assert!(matches!(
            AnalysisRequest::from_r2t(text),
            Err(SectionError::InvalidInput(_))
        ));
        let fractional = "[ANALYSIS]\nn_layers = 12.5\n";
        assert!(AnalysisRequest::from_r2t(fractional).is_err());
    }

    #[test]
    fn test_split_key_value() {
        assert_eq!(split_key_value("fc = 35"), Some(("fc".to_string(), "35")));
        assert_eq!(split_key_value("Av=157"), Some(("av".to_string(), "157")));
        assert_eq!(split_key_value("b 300"), Some(("b".to_string(), "300")));
        assert_eq!(split_key_value("rectangular"), None);
    }
}
