//! Reinforcing steel

use serde::{Deserialize, Serialize};

use super::MaterialModel;
use crate::error::{SectionError, SectionResult};

/// Reinforcing steel backbone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SteelModel {
    /// Elastic then linear hardening from (ey, fy) to (esu, fu)
    Bilinear,
    /// Elastic, yield plateau to esh, parabolic hardening to (esu, fu)
    #[default]
    Trilinear,
}

/// User-facing steel parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteelParams {
    /// Yield stress (MPa)
    pub fy: f64,
    /// Elastic modulus (MPa)
    #[serde(rename = "Es")]
    pub es: f64,
    /// Ultimate stress (MPa), defaults to fy
    pub fu: Option<f64>,
    /// Onset of strain hardening, defaults to 5 ey
    pub esh: Option<f64>,
    /// Rupture strain
    pub esu: f64,
    pub model: SteelModel,
}

impl Default for SteelParams {
    fn default() -> Self {
        Self {
            fy: 400.0,
            es: 200_000.0,
            fu: None,
            esh: None,
            esu: 0.05,
            model: SteelModel::default(),
        }
    }
}

/// Reinforcing bar material (symmetric in tension and compression)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReinforcingSteel {
    pub fy: f64,
    #[serde(rename = "Es")]
    pub es: f64,
    pub fu: f64,
    pub esh: f64,
    pub esu: f64,
    pub model: SteelModel,
}

impl ReinforcingSteel {
    /// Steel with yield stress `fy` and default properties
    pub fn new(fy: f64) -> SectionResult<Self> {
        Self::from_params(SteelParams {
            fy,
            ..SteelParams::default()
        })
    }

    pub fn from_params(params: SteelParams) -> SectionResult<Self> {
        if !(params.fy > 0.0) {
            return Err(SectionError::InvalidMaterial(format!(
                "steel fy must be positive, got {}",
                params.fy
            )));
        }
        if !(params.es > 0.0) {
            return Err(SectionError::InvalidMaterial(format!(
                "steel Es must be positive, got {}",
                params.es
            )));
        }
        let ey = params.fy / params.es;
        if !(params.esu > ey) {
            return Err(SectionError::InvalidMaterial(format!(
                "steel esu ({}) must exceed the yield strain ({})",
                params.esu, ey
            )));
        }

        let fu = params.fu.unwrap_or(params.fy);
        if fu < params.fy {
            return Err(SectionError::InvalidMaterial(format!(
                "steel fu ({}) must not be below fy ({})",
                fu, params.fy
            )));
        }

        Ok(Self {
            fy: params.fy,
            es: params.es,
            fu,
            esh: params.esh.unwrap_or(5.0 * ey),
            esu: params.esu,
            model: params.model,
        })
    }

    /// Override the hardening parameters
    pub fn with_hardening(mut self, fu: f64, esh: f64) -> Self {
        self.fu = fu;
        self.esh = esh;
        self
    }

    /// Yield strain
    pub fn ey(&self) -> f64 {
        self.fy / self.es
    }

    fn bilinear(&self, eps: f64) -> f64 {
        let ey = self.ey();
        if eps <= ey {
            return self.es * eps;
        }
        let hardening = (self.fu - self.fy) / (self.esu - ey);
        self.fy + hardening * (eps - ey)
    }

    fn trilinear(&self, eps: f64) -> f64 {
        if eps <= self.ey() {
            return self.es * eps;
        }
        if eps <= self.esh || self.esu <= self.esh {
            return self.fy;
        }
        let ratio = (eps - self.esh) / (self.esu - self.esh);
        self.fy + (self.fu - self.fy) * (2.0 * ratio - ratio * ratio)
    }
}

impl MaterialModel for ReinforcingSteel {
    fn stress(&self, strain: f64) -> f64 {
        let eps = strain.abs();
        if eps >= self.esu {
            // fractured
            return 0.0;
        }
        let magnitude = match self.model {
            SteelModel::Bilinear => self.bilinear(eps),
            SteelModel::Trilinear => self.trilinear(eps),
        };
        magnitude.copysign(strain)
    }
}
