//! Section resultants and tangent stiffness for a plane strain profile.
//!
//! `eps_x(y) = eps_ref - curvature * (y - y_ref)`; positive curvature is
//! sagging and the moment is taken as `M = -sum(f * (y - y_ref))` so tension
//! at the bottom gives a positive moment.

use serde::Serialize;

use super::cross_section::CrossSection;
use crate::analysis::mcft::{solve_node, McftState, NodeSolverSettings};
use crate::materials::MaterialModel;
use crate::math::Mat3;

/// Plane-section strain state with a parabolic shear strain distribution
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StrainProfile {
    pub eps_ref: f64,
    pub curvature: f64,
    /// Average shear strain over the depth
    pub avg_shear_strain: f64,
    pub y_ref: f64,
}

impl StrainProfile {
    pub fn new(eps_ref: f64, curvature: f64, y_ref: f64) -> Self {
        Self {
            eps_ref,
            curvature,
            avg_shear_strain: 0.0,
            y_ref,
        }
    }

    pub fn with_shear(mut self, avg_shear_strain: f64) -> Self {
        self.avg_shear_strain = avg_shear_strain;
        self
    }

    /// Longitudinal strain at elevation `y`
    pub fn strain_at(&self, y: f64) -> f64 {
        self.eps_ref - self.curvature * (y - self.y_ref)
    }

    /// Shear strain at `y` for a section spanning `y_bottom..y_top`
    pub fn shear_strain_at(&self, y: f64, y_bottom: f64, y_top: f64) -> f64 {
        self.avg_shear_strain * shear_strain_profile(y, y_bottom, y_top)
    }
}

/// Parabolic shear strain shape `6 xi (1 - xi)`: 1.5 at mid-depth, zero at
/// the extreme fibres and outside the section, unit mean.
pub fn shear_strain_profile(y: f64, y_bottom: f64, y_top: f64) -> f64 {
    let h = y_top - y_bottom;
    if h <= 0.0 {
        return 0.0;
    }
    let xi = (y - y_bottom) / h;
    if !(0.0..=1.0).contains(&xi) {
        return 0.0;
    }
    6.0 * xi * (1.0 - xi)
}

/// Axial force and moment `(N, M)` from uniaxial fibre stresses
pub fn integrate_forces(section: &CrossSection, profile: &StrainProfile) -> (f64, f64) {
    let mut axial = 0.0;
    let mut moment = 0.0;
    let mut add = |y: f64, force: f64| {
        axial += force;
        moment -= force * (y - profile.y_ref);
    };

    for layer in section.layers() {
        let y = layer.y_mid();
        add(y, layer.material.stress(profile.strain_at(y)) * layer.area());
    }
    for bar in section.rebars() {
        add(bar.y, bar.material.stress(profile.strain_at(bar.y)) * bar.area);
    }
    for tendon in section.tendons() {
        let eps = profile.strain_at(tendon.y) + tendon.prestrain;
        add(tendon.y, tendon.material.stress(eps) * tendon.area);
    }

    (axial, moment)
}

/// Tangent terms `(EA, ES, EI)`: dN/d(eps_ref), dN/d(curvature) and
/// dM/d(curvature)
pub fn integrate_stiffness(section: &CrossSection, profile: &StrainProfile) -> (f64, f64, f64) {
    let mut ea_sum = 0.0;
    let mut es_sum = 0.0;
    let mut ei_sum = 0.0;
    let mut add = |y: f64, ea: f64| {
        let dy = y - profile.y_ref;
        ea_sum += ea;
        es_sum -= ea * dy;
        ei_sum += ea * dy * dy;
    };

    for layer in section.layers() {
        let y = layer.y_mid();
        add(y, layer.material.tangent(profile.strain_at(y)) * layer.area());
    }
    for bar in section.rebars() {
        add(bar.y, bar.material.tangent(profile.strain_at(bar.y)) * bar.area);
    }
    for tendon in section.tendons() {
        let eps = profile.strain_at(tendon.y) + tendon.prestrain;
        add(tendon.y, tendon.material.tangent(eps) * tendon.area);
    }

    (ea_sum, es_sum, ei_sum)
}

/// Solved biaxial state of one concrete layer
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LayerState {
    pub y: f64,
    /// Lever arm `y - y_ref`
    pub dy: f64,
    pub area: f64,
    pub thickness: f64,
    pub width: f64,
    /// Shear strain shape factor s(y)
    pub shear_factor: f64,
    pub state: McftState,
}

impl LayerState {
    /// `j = d(sigma_x)/d(eps_x) * A`
    pub fn j(&self) -> f64 {
        self.state.tangent_xx * self.area
    }

    /// `k = d(sigma_x)/d(gamma) * A`
    pub fn k(&self) -> f64 {
        self.state.tangent_xg * self.area
    }
}

/// Resultants, 3x3 tangent and per-layer states for a biaxial strain state.
///
/// The tangent maps `(d eps_ref, d curvature, d avg_shear)` to `(dN, dM, dV)`.
#[derive(Debug, Clone)]
pub struct BiaxialSection {
    pub axial: f64,
    pub moment: f64,
    pub shear: f64,
    pub tangent: Mat3,
    pub layers: Vec<LayerState>,
}

pub fn integrate_biaxial(
    section: &CrossSection,
    profile: &StrainProfile,
    settings: &NodeSolverSettings,
) -> BiaxialSection {
    let (yb, yt) = (section.y_bottom(), section.y_top());
    let mut axial = 0.0;
    let mut moment = 0.0;
    let mut shear = 0.0;
    let mut tangent = Mat3::zeros();
    let mut layers = Vec::with_capacity(section.layers().len());

    for layer in section.layers() {
        let y = layer.y_mid();
        let dy = y - profile.y_ref;
        let s = shear_strain_profile(y, yb, yt);
        let state = solve_node(
            profile.strain_at(y),
            profile.avg_shear_strain * s,
            &layer.material,
            layer.transverse.as_ref(),
            settings,
        );
        let area = layer.area();

        let force = state.sigma_x * area;
        axial += force;
        moment -= force * dy;
        shear += state.tau_xy * area;

        let ls = LayerState {
            y,
            dy,
            area,
            thickness: layer.thickness(),
            width: layer.width,
            shear_factor: s,
            state,
        };
        let (j, k) = (ls.j(), ls.k());
        let tgx = state.tangent_gx * area;
        let tgg = state.tangent_gg * area;

        tangent[(0, 0)] += j;
        tangent[(0, 1)] -= j * dy;
        tangent[(0, 2)] += k * s;
        tangent[(1, 0)] -= dy * j;
        tangent[(1, 1)] += dy * dy * j;
        tangent[(1, 2)] -= dy * k * s;
        tangent[(2, 0)] += tgx;
        tangent[(2, 1)] -= tgx * dy;
        tangent[(2, 2)] += tgg * s;

        layers.push(ls);
    }

    // discrete steel: axial and flexural terms only
    let mut add_steel = |y: f64, stress: f64, modulus: f64, area: f64| {
        let dy = y - profile.y_ref;
        let force = stress * area;
        axial += force;
        moment -= force * dy;

        let ea = modulus * area;
        tangent[(0, 0)] += ea;
        tangent[(0, 1)] -= ea * dy;
        tangent[(1, 0)] -= ea * dy;
        tangent[(1, 1)] += ea * dy * dy;
    };
    for bar in section.rebars() {
        let eps = profile.strain_at(bar.y);
        add_steel(bar.y, bar.material.stress(eps), bar.material.tangent(eps), bar.area);
    }
    for tendon in section.tendons() {
        let eps = profile.strain_at(tendon.y) + tendon.prestrain;
        add_steel(
            tendon.y,
            tendon.material.stress(eps),
            tendon.material.tangent(eps),
            tendon.area,
        );
    }

    BiaxialSection {
        axial,
        moment,
        shear,
        tangent,
        layers,
    }
}

impl BiaxialSection {
    /// Layers whose free-surface iteration did not converge
    pub fn unconverged_layers(&self) -> usize {
        self.layers.iter().filter(|l| !l.state.converged).count()
    }
}

/// `(N, M, V)` with concrete layers resolved through the MCFT node solver
pub fn integrate_forces_shear(
    section: &CrossSection,
    profile: &StrainProfile,
    settings: &NodeSolverSettings,
) -> (f64, f64, f64) {
    let result = integrate_biaxial(section, profile, settings);
    (result.axial, result.moment, result.shear)
}

/// 3x3 section tangent for the biaxial state
pub fn integrate_stiffness_3x3(
    section: &CrossSection,
    profile: &StrainProfile,
    settings: &NodeSolverSettings,
) -> Mat3 {
    integrate_biaxial(section, profile, settings).tangent
}
