//! Uniaxial material models
//!
//! Every material is an immutable value offering `stress(strain)` and
//! `tangent(strain)`. Sign convention: tension positive, compression negative.
//! Stresses are in MPa.

mod concrete;
mod prestressing;
mod steel;

pub use concrete::{CompressionModel, Concrete, ConcreteParams, TensionModel};
pub use prestressing::{PrestressModel, PrestressParams, PrestressingSteel};
pub use steel::{ReinforcingSteel, SteelModel, SteelParams};

use crate::math::central_difference;

/// Strain increment used for finite-difference tangents
pub const TANGENT_STRAIN_STEP: f64 = 1.0e-8;

/// Stress-strain capability shared by all materials
pub trait MaterialModel {
    /// Stress (MPa) at the given strain
    fn stress(&self, strain: f64) -> f64;

    /// Tangent modulus (MPa) at the given strain.
    ///
    /// Defaults to a central difference of [`MaterialModel::stress`].
    fn tangent(&self, strain: f64) -> f64 {
        central_difference(|e| self.stress(e), strain, TANGENT_STRAIN_STEP)
    }
}
