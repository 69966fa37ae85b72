//! Concrete constitutive model
//!
//! Compression backbones: Popovics/Thorenfeldt/Collins (default), Hognestad
//! parabola, Collins-Mitchell base curve. Tension: linear to cracking, then
//! MCFT tension stiffening `ft / (1 + sqrt(500 eps))`, a linear cutoff, or no
//! tension at all.

use serde::{Deserialize, Serialize};

use super::MaterialModel;
use crate::error::{SectionError, SectionResult};

/// Compression backbone curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompressionModel {
    #[default]
    Popovics,
    Hognestad,
    CollinsMitchell,
}

/// Post-cracking tension behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TensionModel {
    #[default]
    Mcft,
    LinearCutoff,
    NoTension,
}

/// User-facing concrete parameters; unset values are derived from `fc`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcreteParams {
    /// Compressive strength (MPa, positive)
    pub fc: f64,
    /// Strain at peak stress (positive)
    pub ec: Option<f64>,
    /// Initial modulus (MPa)
    #[serde(rename = "Ec")]
    pub ec_modulus: Option<f64>,
    /// Tensile strength (MPa)
    pub ft: Option<f64>,
    /// Crushing strain (positive)
    pub ecu: f64,
    pub compression_model: CompressionModel,
    pub tension_model: TensionModel,
    /// Maximum aggregate size (mm)
    pub aggregate_size: f64,
}

impl Default for ConcreteParams {
    fn default() -> Self {
        Self {
            fc: 30.0,
            ec: None,
            ec_modulus: None,
            ft: None,
            ecu: 0.0035,
            compression_model: CompressionModel::default(),
            tension_model: TensionModel::default(),
            aggregate_size: 19.0,
        }
    }
}

/// Concrete material with all defaults resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Concrete {
    pub fc: f64,
    pub ec: f64,
    #[serde(rename = "Ec")]
    pub ec_modulus: f64,
    pub ft: f64,
    pub ecu: f64,
    pub compression_model: CompressionModel,
    pub tension_model: TensionModel,
    pub aggregate_size: f64,
    /// Popovics curve-fitting parameter
    #[serde(skip)]
    n: f64,
    /// Post-peak decay factor
    #[serde(skip)]
    k: f64,
}

impl Concrete {
    /// Concrete of strength `fc` (MPa) with every other property derived
    pub fn new(fc: f64) -> SectionResult<Self> {
        Self::from_params(ConcreteParams {
            fc,
            ..ConcreteParams::default()
        })
    }

    /// Resolve defaults (Collins & Mitchell 1991) and validate
    pub fn from_params(params: ConcreteParams) -> SectionResult<Self> {
        let fc = params.fc;
        if !(fc > 0.0) {
            return Err(SectionError::InvalidMaterial(format!(
                "concrete fc must be positive, got {}",
                fc
            )));
        }
        if !(params.ecu > 0.0) {
            return Err(SectionError::InvalidMaterial(format!(
                "concrete ecu must be positive, got {}",
                params.ecu
            )));
        }

        let ec_modulus = params
            .ec_modulus
            .unwrap_or_else(|| 3320.0 * fc.sqrt() + 6900.0);
        let ft = params.ft.unwrap_or_else(|| 0.33 * fc.sqrt());
        let ec = params.ec.unwrap_or(2.0 * fc / ec_modulus);

        if !(ec_modulus > 0.0) || !(ec > 0.0) || ft < 0.0 {
            return Err(SectionError::InvalidMaterial(format!(
                "concrete requires Ec > 0, ec > 0 and ft >= 0 (Ec={}, ec={}, ft={})",
                ec_modulus, ec, ft
            )));
        }

        let k = if fc <= 67.0 { 1.0 } else { 0.67 + fc / 62.0 };

        Ok(Self {
            fc,
            ec,
            ec_modulus,
            ft,
            ecu: params.ecu,
            compression_model: params.compression_model,
            tension_model: params.tension_model,
            aggregate_size: params.aggregate_size,
            n: 0.8 + fc / 17.0,
            k,
        })
    }

    /// Select a different compression backbone
    pub fn with_compression_model(mut self, model: CompressionModel) -> Self {
        self.compression_model = model;
        self
    }

    /// Select a different tension model
    pub fn with_tension_model(mut self, model: TensionModel) -> Self {
        self.tension_model = model;
        self
    }

    /// Cracking strain
    pub fn ecr(&self) -> f64 {
        self.ft / self.ec_modulus
    }

    /// Compressive stress magnitude on the base backbone (strain magnitude input)
    pub fn compression_backbone(&self, eps: f64) -> f64 {
        match self.compression_model {
            CompressionModel::Popovics => self.popovics(eps),
            CompressionModel::Hognestad => self.hognestad(eps),
            CompressionModel::CollinsMitchell => self.collins_mitchell(eps),
        }
    }

    /// Vecchio-Collins softened compressive stress magnitude.
    ///
    /// `beta = 1 / (0.8 + 170 eps_1)` clamped to `[0.15, 1.0]`; the base curve
    /// is evaluated at `eps / beta` and scaled by `beta`.
    pub fn compression_stress_softened(&self, eps_magnitude: f64, eps_1: f64) -> f64 {
        let beta = softening_factor(eps_1);
        beta * self.compression_backbone(eps_magnitude / beta)
    }

    /// MCFT tension stiffening stress for a cracked strain
    pub fn tension_stiffening(&self, eps: f64) -> f64 {
        self.ft / (1.0 + (500.0 * eps).sqrt())
    }

    fn popovics(&self, eps: f64) -> f64 {
        let ratio = eps / self.ec;
        let k = if ratio <= 1.0 { 1.0 } else { self.k };
        let denom = self.n - 1.0 + ratio.powf(self.n * k);
        if denom <= 0.0 {
            return 0.0;
        }
        self.fc * ratio * self.n / denom
    }

    fn hognestad(&self, eps: f64) -> f64 {
        let ratio = eps / self.ec;
        if ratio <= 1.0 {
            self.fc * (2.0 * ratio - ratio * ratio)
        } else {
            let slope = 0.15 * self.fc / (self.ecu - self.ec);
            (self.fc - slope * (eps - self.ec)).max(0.0)
        }
    }

    fn collins_mitchell(&self, eps: f64) -> f64 {
        let ratio = eps / self.ec;
        let denom = self.n - 1.0 + ratio.powf(self.n);
        if denom <= 0.0 {
            return 0.0;
        }
        self.fc * ratio * self.n / denom
    }

    fn tension_stress(&self, eps: f64) -> f64 {
        if self.tension_model == TensionModel::NoTension {
            return 0.0;
        }
        if eps <= self.ecr() {
            return self.ec_modulus * eps;
        }
        match self.tension_model {
            TensionModel::Mcft => self.tension_stiffening(eps),
            TensionModel::LinearCutoff | TensionModel::NoTension => 0.0,
        }
    }
}

impl MaterialModel for Concrete {
    fn stress(&self, strain: f64) -> f64 {
        if strain < -self.ecu {
            // crushed
            0.0
        } else if strain < 0.0 {
            -self.compression_backbone(-strain)
        } else if strain == 0.0 {
            0.0
        } else {
            self.tension_stress(strain)
        }
    }
}

/// Compression softening factor for a principal tensile strain
pub(crate) fn softening_factor(eps_1: f64) -> f64 {
    let eps_1 = eps_1.max(0.0);
    (1.0 / (0.8 + 170.0 * eps_1)).clamp(0.15, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_resolution() {
        let c = Concrete::new(35.0).unwrap();
        let expected_ec = 3320.0 * 35.0_f64.sqrt() + 6900.0;
        assert_relative_eq!(c.ec_modulus, expected_ec, epsilon = 1e-9);
        assert_relative_eq!(c.ft, 0.33 * 35.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(c.ec, 2.0 * 35.0 / expected_ec, epsilon = 1e-12);
        assert_relative_eq!(c.ecr(), c.ft / c.ec_modulus, epsilon = 1e-15);
        assert_eq!(c.ecu, 0.0035);
    }

    #[test]
    fn test_invalid_strength() {
        assert!(Concrete::new(0.0).is_err());
        assert!(Concrete::new(-20.0).is_err());
        assert!(Concrete::new(f64::NAN).is_err());
    }

    #[test]
    fn test_peak_stress_at_ec() {
        for model in [
            CompressionModel::Popovics,
            CompressionModel::Hognestad,
            CompressionModel::CollinsMitchell,
        ] {
            let c = Concrete::new(35.0).unwrap().with_compression_model(model);
            assert_relative_eq!(c.stress(-c.ec), -35.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_tension_branches() {
        let c = Concrete::new(35.0).unwrap();
        let eps = 0.5 * c.ecr();
        assert_relative_eq!(c.stress(eps), c.ec_modulus * eps, epsilon = 1e-12);

        let cracked = 0.001;
        assert_relative_eq!(
            c.stress(cracked),
            c.ft / (1.0 + (500.0 * cracked).sqrt()),
            epsilon = 1e-12
        );

        let cutoff = c.with_tension_model(TensionModel::LinearCutoff);
        assert_eq!(cutoff.stress(cracked), 0.0);
        let none = c.with_tension_model(TensionModel::NoTension);
        assert_eq!(none.stress(eps), 0.0);
    }

    #[test]
    fn test_crushed_carries_nothing() {
        let c = Concrete::new(35.0).unwrap();
        assert_eq!(c.stress(-0.004), 0.0);
        assert_eq!(c.tangent(-0.01), 0.0);
    }

    #[test]
    fn test_initial_tangent() {
        let c = Concrete::new(35.0).unwrap();
        // Popovics initial slope is fc*n/((n-1)*ec)
        let n = 0.8 + 35.0 / 17.0;
        let expected = 35.0 * n / ((n - 1.0) * c.ec);
        assert_relative_eq!(c.tangent(-1e-6), expected, max_relative = 0.01);
    }

    #[test]
    fn test_no_tension_no_softening() {
        let c = Concrete::new(35.0).unwrap();
        let unsoftened = c.compression_backbone(0.002);
        assert_relative_eq!(
            c.compression_stress_softened(0.002, 0.0),
            unsoftened,
            max_relative = 0.01
        );
    }

    #[test]
    fn test_tension_reduces_compression() {
        let c = Concrete::new(35.0).unwrap();
        let unsoftened = c.compression_backbone(0.002);
        assert!(c.compression_stress_softened(0.002, 0.005) < 0.9 * unsoftened);
        // beta floors at 0.15
        assert!(c.compression_stress_softened(0.002, 0.1) > 0.0);
        assert_eq!(softening_factor(1.0), 0.15);
        assert_eq!(softening_factor(-0.001), 1.0);
    }
}
