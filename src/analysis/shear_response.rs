//! Shear force versus average shear strain (V-gamma) sweep.
//!
//! The average shear strain is raised in equal steps from zero. At each step a
//! two-variable Newton iteration on `(eps_ref, curvature)` restores the
//! applied axial force and moment, using the upper-left 2x2 block of the
//! biaxial section tangent as the Jacobian.

use log::{debug, info, warn};

use super::{NodeSolverSettings, ShearOptions};
use crate::error::{SectionError, SectionResult};
use crate::math::{clamp_magnitude, solve_2x2, Mat2, Vec2, SINGULAR_DET_2X2};
use crate::results::{CurveKind, FailureMode, ResponseCurve, ResponsePoint};
use crate::section::integration::{integrate_biaxial, BiaxialSection, LayerState};
use crate::section::{ConcreteLayer, CrossSection, StrainProfile};

/// V-gamma analysis with all defaults resolved
#[derive(Debug, Clone)]
pub struct ShearAnalysis<'a> {
    section: &'a CrossSection,
    options: ShearOptions,
    y_ref: f64,
}

/// Outcome of one equilibrium solve
struct Equilibrium {
    eps_ref: f64,
    curvature: f64,
    state: BiaxialSection,
    converged: bool,
    iterations: usize,
}

impl<'a> ShearAnalysis<'a> {
    pub fn new(section: &'a CrossSection, options: ShearOptions) -> SectionResult<Self> {
        if !(section.height() > 0.0) {
            return Err(SectionError::InvalidGeometry(format!(
                "section depth must be positive, got {}",
                section.height()
            )));
        }
        if options.n_steps == 0 || !(options.gamma_max > 0.0) {
            return Err(SectionError::InvalidInput(format!(
                "shear sweep needs n_steps > 0 and gamma_max > 0 (n_steps={}, gamma_max={})",
                options.n_steps, options.gamma_max
            )));
        }
        if options.max_iter == 0 || !(options.tol_force > 0.0) || !(options.tol_moment > 0.0) {
            return Err(SectionError::InvalidInput(
                "max_iter and tolerances must be positive".to_string(),
            ));
        }
        let y_ref = options.y_ref.unwrap_or_else(|| section.centroid_y());
        Ok(Self {
            section,
            options,
            y_ref,
        })
    }

    pub fn y_ref(&self) -> f64 {
        self.y_ref
    }

    fn node_settings(&self) -> &NodeSolverSettings {
        &self.options.node
    }

    pub fn run(&self) -> ResponseCurve {
        let opts = &self.options;
        let mut curve = ResponseCurve::new(CurveKind::Shear, opts.axial_load, opts.moment, self.y_ref);
        let d_gamma = opts.gamma_max / opts.n_steps as f64;
        let (mut eps_ref, mut curvature) = (0.0, 0.0);

        info!(
            "V-gamma: {} steps to gamma = {:.4}, N = {:.1} N, M = {:.1} Nmm",
            opts.n_steps, opts.gamma_max, opts.axial_load, opts.moment
        );

        for step in 0..=opts.n_steps {
            let gamma = step as f64 * d_gamma;
            let eq = self.equilibrate(eps_ref, curvature, gamma);
            eps_ref = eq.eps_ref;
            curvature = eq.curvature;

            curve.points.push(ResponsePoint {
                control: gamma,
                axial: eq.state.axial,
                moment: eq.state.moment,
                shear: eq.state.shear,
                eps_ref,
                curvature,
                avg_shear_strain: gamma,
                neutral_axis: None,
                converged: eq.converged,
                iterations: eq.iterations,
            });
            let index = curve.points.len() - 1;
            debug!(
                "gamma = {:.5}: V = {:.2} kN, {} iterations",
                gamma,
                eq.state.shear / 1e3,
                eq.iterations
            );
            let unconverged = eq.state.unconverged_layers();
            if unconverged > 0 {
                debug!(
                    "gamma = {:.5}: {} layers missed the free-surface tolerance",
                    gamma, unconverged
                );
            }

            if !eq.converged {
                warn!("equilibrium not reached at gamma = {:.5}", gamma);
                curve.failure_mode = Some(FailureMode::ConvergenceFailure);
                break;
            }

            let profile = StrainProfile::new(eps_ref, curvature, self.y_ref).with_shear(gamma);
            if curve.cracking_index.is_none() && self.is_cracked(&eq.state) {
                info!("diagonal cracking at gamma = {:.5}, V = {:.2} kN", gamma, eq.state.shear / 1e3);
                curve.cracking_index = Some(index);
            }
            if curve.yield_index.is_none() && self.is_yielded(&eq.state, &profile) {
                info!("first yield at gamma = {:.5}, V = {:.2} kN", gamma, eq.state.shear / 1e3);
                curve.yield_index = Some(index);
            }
            if let Some(mode) = self.failure(&eq.state, &profile) {
                info!("{} at gamma = {:.5}", mode, gamma);
                curve.failure_mode = Some(mode);
                break;
            }
        }

        curve.ultimate_index = curve
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.converged)
            .max_by(|(_, a), (_, b)| a.shear.abs().total_cmp(&b.shear.abs()))
            .map(|(i, _)| i);

        info!(
            "V-gamma finished: {} points, peak V = {:.2} kN",
            curve.points.len(),
            curve.peak_shear() / 1e3
        );
        curve
    }

    fn equilibrate(&self, mut eps_ref: f64, mut curvature: f64, gamma: f64) -> Equilibrium {
        let opts = &self.options;
        let mut iterations = 0;
        loop {
            let profile = StrainProfile::new(eps_ref, curvature, self.y_ref).with_shear(gamma);
            let state = integrate_biaxial(self.section, &profile, self.node_settings());
            let r_n = state.axial - opts.axial_load;
            let r_m = state.moment - opts.moment;

            let converged = r_n.abs() < opts.tol_force && r_m.abs() < opts.tol_moment;
            if converged || iterations == opts.max_iter {
                return Equilibrium {
                    eps_ref,
                    curvature,
                    state,
                    converged,
                    iterations,
                };
            }

            let t = &state.tangent;
            let block = Mat2::new(t[(0, 0)], t[(0, 1)], t[(1, 0)], t[(1, 1)]);
            let step = match solve_2x2(&block, &Vec2::new(-r_n, -r_m), SINGULAR_DET_2X2) {
                Some(step) => step,
                None => {
                    warn!("axial-flexural tangent is singular at gamma = {:.5}", gamma);
                    return Equilibrium {
                        eps_ref,
                        curvature,
                        state,
                        converged: false,
                        iterations,
                    };
                }
            };

            eps_ref += clamp_magnitude(step[0], opts.max_strain_step);
            curvature += clamp_magnitude(step[1], opts.max_curvature_step);
            iterations += 1;
        }
    }

    /// Layer states paired with their layers, skipping unconverged nodes
    fn trusted_layers<'s>(
        &'s self,
        state: &'s BiaxialSection,
    ) -> impl Iterator<Item = (&'s LayerState, &'s ConcreteLayer)> {
        state
            .layers
            .iter()
            .zip(self.section.layers())
            .filter(|(ls, _)| ls.state.converged)
    }

    fn is_cracked(&self, state: &BiaxialSection) -> bool {
        self.trusted_layers(state)
            .any(|(ls, layer)| ls.state.eps_1 > layer.material.ecr())
    }

    fn is_yielded(&self, state: &BiaxialSection, profile: &StrainProfile) -> bool {
        let bars = self
            .section
            .rebars()
            .iter()
            .any(|b| profile.strain_at(b.y).abs() >= b.material.ey());
        let stirrups = self
            .trusted_layers(state)
            .any(|(ls, layer)| match layer.transverse {
                Some(t) if t.ratio > 0.0 => ls.state.eps_y >= t.material.ey(),
                _ => false,
            });
        bars || stirrups
    }

    fn failure(&self, state: &BiaxialSection, profile: &StrainProfile) -> Option<FailureMode> {
        if self
            .trusted_layers(state)
            .any(|(ls, layer)| ls.state.eps_2 < -layer.material.ecu)
        {
            return Some(FailureMode::ConcreteCrushing);
        }
        if self
            .section
            .rebars()
            .iter()
            .any(|b| profile.strain_at(b.y).abs() >= b.material.esu)
        {
            return Some(FailureMode::RebarFracture);
        }
        if self
            .section
            .tendons()
            .iter()
            .any(|t| profile.strain_at(t.y) + t.prestrain >= t.material.epu)
        {
            return Some(FailureMode::TendonRupture);
        }
        None
    }
}
