//! Prestressing steel
//!
//! The power formula `eps = f/Ep + k (f/fpu)^N` is fitted so the curve passes
//! through the 0.1% offset yield point and through `(epu, fpu)`, then inverted
//! by Newton iteration.

use serde::{Deserialize, Serialize};

use super::MaterialModel;
use crate::error::{SectionError, SectionResult};

/// Offset strain defining fpy
const YIELD_OFFSET: f64 = 0.001;
const FALLBACK_EXPONENT: f64 = 7.0;
const INVERSION_MAX_ITER: usize = 50;
const INVERSION_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrestressModel {
    #[default]
    PowerFormula,
    Bilinear,
}

/// User-facing prestressing steel parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestressParams {
    /// Ultimate strength (MPa)
    pub fpu: f64,
    /// Elastic modulus (MPa)
    #[serde(rename = "Ep")]
    pub ep: f64,
    /// 0.1% offset yield stress, defaults to 0.9 fpu
    pub fpy: Option<f64>,
    /// Rupture strain
    pub epu: f64,
    pub model: PrestressModel,
}

impl Default for PrestressParams {
    fn default() -> Self {
        Self {
            fpu: 1860.0,
            ep: 196_500.0,
            fpy: None,
            epu: 0.04,
            model: PrestressModel::default(),
        }
    }
}

/// Strand, wire or bar material; carries tension only
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrestressingSteel {
    pub fpu: f64,
    #[serde(rename = "Ep")]
    pub ep: f64,
    pub fpy: f64,
    pub epu: f64,
    pub model: PrestressModel,
    #[serde(skip)]
    exponent: f64,
    #[serde(skip)]
    k: f64,
}

impl PrestressingSteel {
    pub fn new(fpu: f64) -> SectionResult<Self> {
        Self::from_params(PrestressParams {
            fpu,
            ..PrestressParams::default()
        })
    }

    pub fn from_params(params: PrestressParams) -> SectionResult<Self> {
        if !(params.fpu > 0.0) {
            return Err(SectionError::InvalidMaterial(format!(
                "prestressing fpu must be positive, got {}",
                params.fpu
            )));
        }
        if !(params.ep > 0.0) || !(params.epu > 0.0) {
            return Err(SectionError::InvalidMaterial(format!(
                "prestressing Ep and epu must be positive (Ep={}, epu={})",
                params.ep, params.epu
            )));
        }

        let fpu = params.fpu;
        let fpy = params.fpy.unwrap_or(0.9 * fpu);

        let mut k = params.epu - fpu / params.ep;
        let exponent = if k > 0.0 && fpy < fpu {
            let ratio = fpy / fpu;
            if ratio > 0.0 && YIELD_OFFSET < k {
                (YIELD_OFFSET / k).ln() / ratio.ln()
            } else {
                FALLBACK_EXPONENT
            }
        } else {
            k = k.max(YIELD_OFFSET);
            FALLBACK_EXPONENT
        };

        Ok(Self {
            fpu,
            ep: params.ep,
            fpy,
            epu: params.epu,
            model: params.model,
            exponent,
            k,
        })
    }

    /// Strain on the power formula for a given stress
    fn power_strain(&self, f: f64) -> f64 {
        let ratio = (f / self.fpu).max(1e-12);
        f / self.ep + self.k * ratio.powf(self.exponent)
    }

    fn power_formula(&self, eps: f64) -> f64 {
        let mut f = (eps * self.ep).min(0.999 * self.fpu);
        for _ in 0..INVERSION_MAX_ITER {
            let ratio = (f / self.fpu).max(1e-12);
            let residual = self.power_strain(f) - eps;
            if residual.abs() < INVERSION_TOL {
                break;
            }
            let slope = 1.0 / self.ep
                + self.k * self.exponent * ratio.powf(self.exponent - 1.0) / self.fpu;
            f = (f - residual / slope).clamp(0.0, 0.9999 * self.fpu);
        }
        f
    }

    fn bilinear(&self, eps: f64) -> f64 {
        let epy = self.fpy / self.ep + YIELD_OFFSET;
        if eps <= epy {
            return self.ep * eps;
        }
        let hardening = if self.epu > epy {
            (self.fpu - self.fpy) / (self.epu - epy)
        } else {
            0.0
        };
        self.fpy + hardening * (eps - epy)
    }
}

impl MaterialModel for PrestressingSteel {
    fn stress(&self, strain: f64) -> f64 {
        if strain <= 0.0 || strain >= self.epu {
            return 0.0;
        }
        match self.model {
            PrestressModel::PowerFormula => self.power_formula(strain),
            PrestressModel::Bilinear => self.bilinear(strain),
        }
    }
}
