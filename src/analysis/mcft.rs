//! MCFT biaxial node solver
//!
//! Given the longitudinal strain and shear strain at one fibre, find the
//! transverse strain `eps_y` that satisfies the free-surface condition
//! `sigma_cy + rho_y * f_stirrup(eps_y) = 0`, then report the stress state and
//! the condensed tangent (eps_y eliminated) by forward differences. When
//! Newton fails the root is bracketed and bisected instead.

use serde::{Deserialize, Serialize};

use crate::materials::{Concrete, MaterialModel};
use crate::math::clamp_magnitude;
use crate::section::TransverseSteel;

/// First half-width tried when bracketing a root after Newton fails
const BRACKET_START_STEP: f64 = 1e-5;
const BISECTION_MAX_ITER: usize = 60;

/// Iteration controls for [`solve_node`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSolverSettings {
    pub max_iter: usize,
    /// Free-surface tolerance on sigma_y (MPa)
    pub tol: f64,
    /// Largest eps_y change per Newton step
    pub max_step: f64,
    /// eps_y is kept within +/- this bound
    pub eps_y_bound: f64,
    /// Residual slopes below this are treated as flat
    pub flat_slope: f64,
    /// Fixed eps_y step taken on a flat slope
    pub flat_step: f64,
    /// Perturbation used for the condensed tangent
    pub fd_step: f64,
    /// Iteration cap of the re-solves behind the tangent
    pub tangent_max_iter: usize,
    /// Shear strains below this take the uniaxial path
    pub zero_shear: f64,
}

impl Default for NodeSolverSettings {
    fn default() -> Self {
        Self {
            max_iter: 40,
            tol: 1e-3,
            max_step: 0.01,
            eps_y_bound: 0.05,
            flat_slope: 1e-12,
            flat_step: 0.001,
            fd_step: 1e-7,
            tangent_max_iter: 20,
            zero_shear: 1e-14,
        }
    }
}

impl NodeSolverSettings {
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

/// Solved state of one biaxial fibre
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct McftState {
    pub eps_x: f64,
    /// Transverse strain satisfying the free-surface condition
    pub eps_y: f64,
    pub gamma_xy: f64,
    /// Principal tensile strain (eps_1 >= eps_2)
    pub eps_1: f64,
    pub eps_2: f64,
    /// Angle from the x axis to the eps_1 direction (rad)
    pub theta: f64,
    /// Concrete principal tensile stress
    pub fc1: f64,
    /// Concrete principal compressive stress
    pub fc2: f64,
    pub sigma_x: f64,
    /// Net transverse stress left at the end of the iteration
    pub sigma_y: f64,
    pub tau_xy: f64,
    /// d(sigma_x)/d(eps_x)
    pub tangent_xx: f64,
    /// d(sigma_x)/d(gamma_xy)
    pub tangent_xg: f64,
    /// d(tau_xy)/d(eps_x)
    pub tangent_gx: f64,
    /// d(tau_xy)/d(gamma_xy)
    pub tangent_gg: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Mohr's circle of strain: `(eps_1, eps_2, theta)` with `eps_1 >= eps_2`
pub fn principal_strains(eps_x: f64, eps_y: f64, gamma_xy: f64) -> (f64, f64, f64) {
    let avg = 0.5 * (eps_x + eps_y);
    let half_diff = 0.5 * (eps_x - eps_y);
    let radius = (half_diff * half_diff + 0.25 * gamma_xy * gamma_xy).sqrt();

    let theta = if (eps_x - eps_y).abs() < 1e-15 && gamma_xy.abs() < 1e-15 {
        0.0
    } else {
        0.5 * gamma_xy.atan2(eps_x - eps_y)
    };

    (avg + radius, avg - radius, theta)
}

/// Concrete stresses at a trial transverse strain
#[derive(Debug, Clone, Copy)]
struct Trial {
    residual: f64,
    sigma_cx: f64,
    tau: f64,
    fc1: f64,
    fc2: f64,
    eps_1: f64,
    eps_2: f64,
    theta: f64,
}

/// Cracked-or-not principal tensile stress
fn principal_tension(concrete: &Concrete, eps: f64) -> f64 {
    if eps <= concrete.ecr() {
        concrete.ec_modulus * eps
    } else {
        concrete.tension_stiffening(eps)
    }
}

fn principal_stresses(concrete: &Concrete, eps_1: f64, eps_2: f64) -> (f64, f64) {
    let fc1 = if eps_1 > 0.0 {
        principal_tension(concrete, eps_1)
    } else {
        0.0
    };
    let fc2 = if eps_2 < 0.0 {
        -concrete.compression_stress_softened(eps_2.abs(), eps_1.max(0.0))
    } else {
        principal_tension(concrete, eps_2)
    };
    (fc1, fc2)
}

/// One fibre's free-surface problem
struct NodeProblem<'a> {
    eps_x: f64,
    gamma_xy: f64,
    concrete: &'a Concrete,
    transverse: Option<&'a TransverseSteel>,
    settings: &'a NodeSolverSettings,
}

/// What to do when the residual slope is flat
#[derive(Clone, Copy, PartialEq)]
enum FlatSlope {
    Perturb,
    Stop,
}

impl NodeProblem<'_> {
    fn evaluate(&self, eps_y: f64) -> Trial {
        let (eps_1, eps_2, theta) = principal_strains(self.eps_x, eps_y, self.gamma_xy);
        let (fc1, fc2) = principal_stresses(self.concrete, eps_1, eps_2);

        let (sin, cos) = theta.sin_cos();
        let (c2, s2, cs) = (cos * cos, sin * sin, cos * sin);
        let sigma_cx = fc1 * c2 + fc2 * s2;
        let sigma_cy = fc1 * s2 + fc2 * c2;
        let tau = (fc1 - fc2) * cs;

        let steel = match self.transverse {
            Some(t) if t.ratio > 0.0 => t.ratio * t.material.stress(eps_y),
            _ => 0.0,
        };

        Trial {
            residual: sigma_cy + steel,
            sigma_cx,
            tau,
            fc1,
            fc2,
            eps_1,
            eps_2,
            theta,
        }
    }

    /// Newton on eps_y; returns (eps_y, converged, iterations)
    fn iterate(&self, mut eps_y: f64, max_iter: usize, flat: FlatSlope) -> (f64, bool, usize) {
        let s = self.settings;
        for iter in 0..max_iter {
            let res = self.evaluate(eps_y).residual;
            if res.abs() < s.tol {
                return (eps_y, true, iter);
            }

            let h = (eps_y.abs() * 1e-6).max(1e-10);
            let slope = (self.evaluate(eps_y + h).residual - res) / h;
            if slope.abs() < s.flat_slope {
                match flat {
                    FlatSlope::Perturb => {
                        eps_y -= s.flat_step.copysign(res);
                        continue;
                    }
                    FlatSlope::Stop => return (eps_y, false, iter),
                }
            }

            let delta = clamp_magnitude(-res / slope, s.max_step);
            eps_y = (eps_y + delta).clamp(-s.eps_y_bound, s.eps_y_bound);
        }
        (eps_y, false, max_iter)
    }

    /// Bracket a sign change of the residual around `seed` and bisect it.
    ///
    /// The cracking jump in the tension branch can trap Newton against the
    /// eps_y bound; the bracket keeps the root near the physical state.
    /// `None` when no sign change exists within the bounds.
    fn bisect(&self, seed: f64) -> Option<(f64, bool, usize)> {
        let s = self.settings;
        let r_seed = self.evaluate(seed).residual;
        if r_seed.abs() < s.tol {
            return Some((seed, true, 0));
        }

        let mut step = BRACKET_START_STEP;
        let mut other = None;
        while other.is_none() && step <= 2.0 * s.eps_y_bound {
            other = [seed + step, seed - step]
                .into_iter()
                .map(|e| e.clamp(-s.eps_y_bound, s.eps_y_bound))
                .map(|e| (e, self.evaluate(e).residual))
                .find(|&(_, r)| (r > 0.0) != (r_seed > 0.0));
            step *= 2.0;
        }
        let ((mut a, mut r_a), (mut b, mut r_b)) = ((seed, r_seed), other?);

        for iter in 0..BISECTION_MAX_ITER {
            let mid = 0.5 * (a + b);
            let r_mid = self.evaluate(mid).residual;
            if r_mid.abs() < s.tol {
                return Some((mid, true, iter + 1));
            }
            if (r_mid > 0.0) == (r_a > 0.0) {
                (a, r_a) = (mid, r_mid);
            } else {
                (b, r_b) = (mid, r_mid);
            }
        }
        let best = if r_a.abs() < r_b.abs() { a } else { b };
        Some((best, false, BISECTION_MAX_ITER))
    }

    /// (sigma_x, tau) at the re-solved eps_y, seeded from a neighbouring state
    fn resolve(&self, eps_y_seed: f64) -> (f64, f64) {
        let (eps_y, _, _) =
            self.iterate(eps_y_seed, self.settings.tangent_max_iter, FlatSlope::Stop);
        let trial = self.evaluate(eps_y);
        (trial.sigma_cx, trial.tau)
    }
}

/// Solve the MCFT equations at one fibre.
///
/// With (numerically) zero shear the uniaxial concrete law is returned
/// unchanged, with `tangent_xx = concrete.tangent(eps_x)` and no coupling.
pub fn solve_node(
    eps_x: f64,
    gamma_xy: f64,
    concrete: &Concrete,
    transverse: Option<&TransverseSteel>,
    settings: &NodeSolverSettings,
) -> McftState {
    if gamma_xy.abs() < settings.zero_shear {
        let sigma_x = concrete.stress(eps_x);
        return McftState {
            eps_x,
            eps_y: 0.0,
            gamma_xy: 0.0,
            eps_1: eps_x.max(0.0),
            eps_2: eps_x.min(0.0),
            theta: 0.0,
            fc1: sigma_x.max(0.0),
            fc2: sigma_x.min(0.0),
            sigma_x,
            sigma_y: 0.0,
            tau_xy: 0.0,
            tangent_xx: concrete.tangent(eps_x),
            tangent_xg: 0.0,
            tangent_gx: 0.0,
            tangent_gg: 0.0,
            converged: true,
            iterations: 0,
        };
    }

    let problem = NodeProblem {
        eps_x,
        gamma_xy,
        concrete,
        transverse,
        settings,
    };
    let seed = 0.5 * eps_x;
    let (mut eps_y, mut converged, mut iterations) =
        problem.iterate(seed, settings.max_iter, FlatSlope::Perturb);
    if !converged {
        if let Some((bracketed, ok, extra)) = problem.bisect(seed) {
            eps_y = bracketed;
            converged = ok;
            iterations += extra;
        }
    }
    let base = problem.evaluate(eps_y);

    let h = settings.fd_step;
    let (sx_px, tau_px) = NodeProblem {
        eps_x: eps_x + h,
        ..problem
    }
    .resolve(eps_y);
    let (sx_pg, tau_pg) = NodeProblem {
        gamma_xy: gamma_xy + h,
        ..problem
    }
    .resolve(eps_y);

    McftState {
        eps_x,
        eps_y,
        gamma_xy,
        eps_1: base.eps_1,
        eps_2: base.eps_2,
        theta: base.theta,
        fc1: base.fc1,
        fc2: base.fc2,
        sigma_x: base.sigma_cx,
        sigma_y: base.residual,
        tau_xy: base.tau,
        tangent_xx: (sx_px - base.sigma_cx) / h,
        tangent_xg: (sx_pg - base.sigma_cx) / h,
        tangent_gx: (tau_px - base.tau) / h,
        tangent_gg: (tau_pg - base.tau) / h,
        converged,
        iterations,
    }
}
