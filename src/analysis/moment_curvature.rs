//! Moment-curvature sweep
//!
//! Curvature is imposed in equal increments; at each step Newton iteration on
//! the reference-axis strain restores axial equilibrium with `EA` as the
//! Jacobian, starting from the previous step's solution.

use log::{debug, info, warn};

use super::MomentCurvatureOptions;
use crate::error::{SectionError, SectionResult};
use crate::results::{CurveKind, FailureMode, ResponseCurve, ResponsePoint};
use crate::section::integration::{integrate_forces, integrate_stiffness};
use crate::section::{CrossSection, StrainProfile};

/// Crushing strain used for the default curvature limit
const DEFAULT_LIMIT_STRAIN: f64 = 0.0035;

/// Axial stiffness below which the section is considered to have collapsed
const MIN_AXIAL_STIFFNESS: f64 = 1e-6;

/// Moment-curvature analysis with all defaults resolved
#[derive(Debug, Clone)]
pub struct MomentCurvatureAnalysis<'a> {
    section: &'a CrossSection,
    axial_load: f64,
    y_ref: f64,
    curvatures: Vec<f64>,
    tol_force: f64,
    max_iter: usize,
}

impl<'a> MomentCurvatureAnalysis<'a> {
    pub fn new(section: &'a CrossSection, options: MomentCurvatureOptions) -> SectionResult<Self> {
        let h = section.height();
        if !(h > 0.0) {
            return Err(SectionError::InvalidGeometry(format!(
                "section depth must be positive, got {}",
                h
            )));
        }
        let max_curvature = options
            .max_curvature
            .unwrap_or(DEFAULT_LIMIT_STRAIN / (0.1 * h));
        if !(max_curvature > 0.0) {
            return Err(SectionError::InvalidInput(format!(
                "max_curvature must be positive, got {}",
                max_curvature
            )));
        }
        if options.max_iter == 0 || !(options.tol_force > 0.0) {
            return Err(SectionError::InvalidInput(
                "max_iter and tol_force must be positive".to_string(),
            ));
        }

        let curvatures: Vec<f64> = match options.curvature_step {
            Some(step) => {
                if !(step > 0.0) {
                    return Err(SectionError::InvalidInput(format!(
                        "curvature_step must be positive, got {}",
                        step
                    )));
                }
                let n = (max_curvature / step).floor() as usize + 1;
                (1..=n).map(|i| i as f64 * step).collect()
            }
            None => {
                if options.n_steps == 0 {
                    return Err(SectionError::InvalidInput(
                        "n_steps must be positive".to_string(),
                    ));
                }
                let step = max_curvature / options.n_steps as f64;
                (1..=options.n_steps).map(|i| i as f64 * step).collect()
            }
        };

        Ok(Self {
            section,
            axial_load: options.axial_load,
            y_ref: options.y_ref.unwrap_or_else(|| section.centroid_y()),
            curvatures,
            tol_force: options.tol_force,
            max_iter: options.max_iter,
        })
    }

    pub fn y_ref(&self) -> f64 {
        self.y_ref
    }

    /// Imposed curvatures in sweep order
    pub fn curvatures(&self) -> &[f64] {
        &self.curvatures
    }

    pub fn run(&self) -> ResponseCurve {
        let mut curve =
            ResponseCurve::new(CurveKind::MomentCurvature, self.axial_load, 0.0, self.y_ref);
        let mut eps_ref = 0.0;

        info!(
            "moment-curvature: {} steps to {:.3e} 1/mm, N = {:.1} N",
            self.curvatures.len(),
            self.curvatures.last().copied().unwrap_or(0.0),
            self.axial_load
        );

        for &curvature in &self.curvatures {
            let (solved, converged, iterations) = self.equilibrate(eps_ref, curvature);
            eps_ref = solved;

            let profile = StrainProfile::new(eps_ref, curvature, self.y_ref);
            let (axial, moment) = integrate_forces(self.section, &profile);
            let neutral_axis = if curvature.abs() > 1e-20 {
                Some(self.y_ref + eps_ref / curvature)
            } else {
                None
            };

            curve.points.push(ResponsePoint {
                control: curvature,
                axial,
                moment,
                shear: 0.0,
                eps_ref,
                curvature,
                avg_shear_strain: 0.0,
                neutral_axis,
                converged,
                iterations,
            });
            let index = curve.points.len() - 1;
            debug!(
                "phi = {:.4e}: M = {:.3} kNm, eps_ref = {:.4e}, {} iterations",
                curvature,
                moment / 1e6,
                eps_ref,
                iterations
            );

            if curve.cracking_index.is_none() && self.is_cracked(&profile) {
                info!("cracking at phi = {:.4e}, M = {:.2} kNm", curvature, moment / 1e6);
                curve.cracking_index = Some(index);
            }
            if curve.yield_index.is_none() && self.is_yielded(&profile) {
                info!("first yield at phi = {:.4e}, M = {:.2} kNm", curvature, moment / 1e6);
                curve.yield_index = Some(index);
            }

            if let Some(mode) = self.failure(&profile) {
                info!("{} at phi = {:.4e}, M = {:.2} kNm", mode, curvature, moment / 1e6);
                curve.ultimate_index = Some(index);
                curve.failure_mode = Some(mode);
                break;
            }
            if !converged {
                warn!(
                    "axial equilibrium not reached at phi = {:.4e} (residual {:.3} N)",
                    curvature,
                    axial - self.axial_load
                );
                curve.ultimate_index = Some(index);
                curve.failure_mode = Some(FailureMode::ConvergenceFailure);
                break;
            }
        }

        if curve.ultimate_index.is_none() && !curve.points.is_empty() {
            curve.ultimate_index = Some(curve.points.len() - 1);
        }

        info!(
            "moment-curvature finished: {} points, ultimate {:?} kNm",
            curve.points.len(),
            curve.ultimate_moment().map(|m| m / 1e6)
        );
        curve
    }

    /// Newton on eps_ref for fixed curvature: (eps_ref, converged, iterations)
    fn equilibrate(&self, mut eps_ref: f64, curvature: f64) -> (f64, bool, usize) {
        for iter in 0..self.max_iter {
            let profile = StrainProfile::new(eps_ref, curvature, self.y_ref);
            let (axial, _) = integrate_forces(self.section, &profile);
            let residual = axial - self.axial_load;
            if residual.abs() < self.tol_force {
                return (eps_ref, true, iter);
            }

            let (ea, _, _) = integrate_stiffness(self.section, &profile);
            if ea.abs() < MIN_AXIAL_STIFFNESS {
                return (eps_ref, false, iter);
            }
            eps_ref -= residual / ea;
        }
        (eps_ref, false, self.max_iter)
    }

    fn is_cracked(&self, profile: &StrainProfile) -> bool {
        self.section
            .layers()
            .iter()
            .any(|l| profile.strain_at(l.y_mid()) > l.material.ecr())
    }

    fn is_yielded(&self, profile: &StrainProfile) -> bool {
        self.section
            .rebars()
            .iter()
            .any(|b| profile.strain_at(b.y).abs() >= b.material.ey())
    }

    fn failure(&self, profile: &StrainProfile) -> Option<FailureMode> {
        if self
            .section
            .layers()
            .iter()
            .any(|l| profile.strain_at(l.y_mid()) < -l.material.ecu)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{
        CompressionModel, Concrete, PrestressParams, PrestressingSteel, ReinforcingSteel,
        SteelParams, TensionModel,
    };
    use crate::section::{CrossSectionBuilder, RebarBar, SectionShape, Tendon};
    use approx::assert_relative_eq;

    fn axial_residual(section: &CrossSection, point: &ResponsePoint, y_ref: f64, n_app: f64) -> f64 {
        let profile = StrainProfile::new(point.eps_ref, point.curvature, y_ref);
        integrate_forces(section, &profile).0 - n_app
    }

    fn beam() -> CrossSection {
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        let steel = ReinforcingSteel::new(400.0)
            .unwrap()
            .with_hardening(600.0, 0.01);
        CrossSectionBuilder::from_shape(&shape, Concrete::new(35.0).unwrap(), 100)
            .unwrap()
            .add_rebar(RebarBar { y: 50.0, area: 1500.0, material: steel })
            .add_rebar(RebarBar { y: 450.0, area: 400.0, material: steel })
            .build()
            .unwrap()
    }

    #[test]
    fn test_curvature_grid() {
        let section = beam();
        let analysis = MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_max_curvature(1e-5).with_steps(4),
        )
        .unwrap();
        assert_eq!(analysis.curvatures().len(), 4);
        assert_relative_eq!(analysis.curvatures()[0], 2.5e-6, epsilon = 1e-18);
        assert_relative_eq!(analysis.curvatures()[3], 1e-5, epsilon = 1e-18);

        let stepped = MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default()
                .with_max_curvature(1e-5)
                .with_curvature_step(3e-6),
        )
        .unwrap();
        // floor(1e-5 / 3e-6) + 1 points
        assert_eq!(stepped.curvatures().len(), 4);
        assert_relative_eq!(stepped.curvatures()[3], 1.2e-5, epsilon = 1e-18);
    }

    #[test]
    fn test_default_limit_and_reference_axis() {
        let section = beam();
        let analysis =
            MomentCurvatureAnalysis::new(&section, MomentCurvatureOptions::default()).unwrap();
        assert_eq!(analysis.curvatures().len(), 200);
        assert_relative_eq!(
            *analysis.curvatures().last().unwrap(),
            0.0035 / 50.0,
            epsilon = 1e-15
        );
        assert_relative_eq!(analysis.y_ref(), 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_options() {
        let section = beam();
        assert!(MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_steps(0)
        )
        .is_err());
        assert!(MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_max_curvature(-1.0)
        )
        .is_err());
        assert!(MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_curvature_step(0.0)
        )
        .is_err());
    }

    #[test]
    fn test_converged_points_are_in_equilibrium() {
        let section = beam();
        let n_app = -200_000.0;
        let analysis = MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_axial_load(n_app).with_steps(60),
        )
        .unwrap();
        let curve = analysis.run();
        assert!(!curve.is_empty());
        for p in curve.converged_points() {
            assert!(axial_residual(&section, p, analysis.y_ref(), n_app).abs() < 1.0);
        }
        for w in curve.points.windows(2) {
            assert!(w[1].curvature >= w[0].curvature);
        }
    }

    #[test]
    fn test_uncracked_stiffness_matches_gross_section() {
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        let concrete = Concrete::new(30.0)
            .unwrap()
            .with_compression_model(CompressionModel::Hognestad);
        let section = CrossSectionBuilder::from_shape(&shape, concrete, 200)
            .unwrap()
            .build()
            .unwrap();
        let curve = MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_max_curvature(1e-7).with_steps(50),
        )
        .unwrap()
        .run();

        let first = &curve.points[0];
        let ei = concrete.ec_modulus * 300.0 * 500.0_f64.powi(3) / 12.0;
        assert_relative_eq!(first.moment / first.curvature, ei, max_relative = 0.05);
        assert!(curve.cracking_index.is_none());
        assert!(curve.failure_mode.is_none());
        assert_eq!(curve.ultimate_index, Some(49));
    }

    #[test]
    fn test_crushing_ends_sweep() {
        let section = beam();
        let curve = MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_max_curvature(2e-4).with_steps(200),
        )
        .unwrap()
        .run();
        assert_eq!(curve.failure_mode, Some(FailureMode::ConcreteCrushing));
        assert_eq!(curve.ultimate_index, Some(curve.len() - 1));
        assert!(curve.len() < 200);
    }

    #[test]
    fn test_bar_fracture_ends_sweep() {
        // one small bar with a short rupture strain snaps long before the top crushes
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        let steel = ReinforcingSteel::from_params(SteelParams {
            esu: 0.01,
            ..SteelParams::default()
        })
        .unwrap();
        let section = CrossSectionBuilder::from_shape(&shape, Concrete::new(35.0).unwrap(), 100)
            .unwrap()
            .add_rebar(RebarBar { y: 50.0, area: 100.0, material: steel })
            .build()
            .unwrap();
        let analysis =
            MomentCurvatureAnalysis::new(&section, MomentCurvatureOptions::default()).unwrap();
        let curve = analysis.run();

        assert_eq!(curve.failure_mode, Some(FailureMode::RebarFracture));
        assert_eq!(curve.ultimate_index, Some(curve.len() - 1));
        let last = curve.points.last().unwrap();
        let profile = StrainProfile::new(last.eps_ref, last.curvature, analysis.y_ref());
        assert!(profile.strain_at(50.0) >= 0.01);
        assert!(profile.strain_at(500.0) > -0.0035);
    }

    #[test]
    fn test_tendon_rupture_ends_sweep() {
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        let strand = PrestressingSteel::from_params(PrestressParams {
            epu: 0.04,
            ..PrestressParams::default()
        })
        .unwrap();
        let section = CrossSectionBuilder::from_shape(&shape, Concrete::new(35.0).unwrap(), 100)
            .unwrap()
            .add_tendon(Tendon { y: 50.0, area: 100.0, material: strand, prestrain: 0.035 })
            .build()
            .unwrap();
        let analysis =
            MomentCurvatureAnalysis::new(&section, MomentCurvatureOptions::default()).unwrap();
        let curve = analysis.run();

        assert_eq!(curve.failure_mode, Some(FailureMode::TendonRupture));
        assert_eq!(curve.ultimate_index, Some(curve.len() - 1));
        let last = curve.points.last().unwrap();
        let profile = StrainProfile::new(last.eps_ref, last.curvature, analysis.y_ref());
        assert!(profile.strain_at(50.0) + 0.035 >= 0.04);
        assert!(profile.strain_at(500.0) > -0.0035);
    }

    #[test]
    fn test_vanishing_axial_stiffness_stops_newton() {
        // concrete without tension under net axial tension has nothing left to resist it
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        let concrete = Concrete::new(35.0)
            .unwrap()
            .with_tension_model(TensionModel::NoTension);
        let section = CrossSectionBuilder::from_shape(&shape, concrete, 50)
            .unwrap()
            .build()
            .unwrap();
        let analysis = MomentCurvatureAnalysis::new(
            &section,
            MomentCurvatureOptions::default().with_axial_load(100_000.0),
        )
        .unwrap();

        let (eps_ref, converged, iterations) = analysis.equilibrate(0.01, 1e-9);
        assert!(!converged);
        assert_eq!(iterations, 0);
        assert_eq!(eps_ref, 0.01);

        let curve = analysis.run();
        assert_eq!(curve.failure_mode, Some(FailureMode::ConvergenceFailure));
        assert_eq!(curve.len(), 1);
        assert!(!curve.points[0].converged);
        assert_eq!(curve.ultimate_index, Some(0));
    }
}
