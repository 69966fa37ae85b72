//! Shear stress distribution by the longitudinal stiffness method.
//!
//! The 3x3 section tangent is solved for a unit moment increment with axial
//! force and shear held fixed. The resulting virtual strains give the change
//! of longitudinal force in every layer, `dq = j d(eps_x) + k d(gamma)`, which
//! is accumulated from the top face down into the shear flow `q(y)`.

use log::{debug, warn};

use super::NodeSolverSettings;
use crate::math::{solve_3x3, Vec3};
use crate::results::ShearStressPoint;
use crate::section::integration::integrate_biaxial;
use crate::section::{CrossSection, StrainProfile};

/// Shear stress profile for a converged strain state, ordered bottom to top.
///
/// A singular section tangent yields an all-zero profile.
pub fn shear_stress_distribution(
    section: &CrossSection,
    profile: &StrainProfile,
) -> Vec<ShearStressPoint> {
    shear_stress_distribution_with(section, profile, &NodeSolverSettings::default())
}

pub fn shear_stress_distribution_with(
    section: &CrossSection,
    profile: &StrainProfile,
    settings: &NodeSolverSettings,
) -> Vec<ShearStressPoint> {
    if section.layers().is_empty() {
        return Vec::new();
    }

    let biaxial = integrate_biaxial(section, profile, settings);
    let virtual_strains = match solve_3x3(&biaxial.tangent, &Vec3::new(0.0, 1.0, 0.0)) {
        Some(x) => x,
        None => {
            warn!("section tangent is singular; returning a zero shear profile");
            return biaxial
                .layers
                .iter()
                .map(|l| ShearStressPoint {
                    y: l.y,
                    tau: 0.0,
                    delta_q: 0.0,
                })
                .collect();
        }
    };
    let (d_eps, d_phi, d_gamma) = (virtual_strains[0], virtual_strains[1], virtual_strains[2]);
    debug!(
        "virtual strains: d_eps = {:.4e}, d_phi = {:.4e}, d_gamma = {:.4e}",
        d_eps, d_phi, d_gamma
    );

    let mut q = 0.0;
    let mut points: Vec<ShearStressPoint> = biaxial
        .layers
        .iter()
        .rev()
        .map(|l| {
            let delta_q = l.j() * (d_eps - d_phi * l.dy) + l.k() * d_gamma * l.shear_factor;
            q += delta_q * l.thickness;
            ShearStressPoint {
                y: l.y,
                tau: if l.width > 0.0 { q / l.width } else { 0.0 },
                delta_q,
            }
        })
        .collect();
    points.reverse();
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Concrete, ReinforcingSteel};
    use crate::section::{CrossSectionBuilder, RebarBar, SectionShape, Stirrups};

    fn section(with_steel: bool) -> CrossSection {
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        let steel = ReinforcingSteel::new(400.0).unwrap();
        let mut builder =
            CrossSectionBuilder::from_shape(&shape, Concrete::new(35.0).unwrap(), 20).unwrap();
        if with_steel {
            builder = builder
                .add_rebar(RebarBar { y: 50.0, area: 1500.0, material: steel })
                .stirrups(Stirrups {
                    av: 157.0,
                    spacing: 200.0,
                    material: steel,
                    y_bottom: None,
                    y_top: None,
                });
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_profile_is_ordered_bottom_to_top() {
        let section = section(true);
        let profile =
            StrainProfile::new(0.0, 1e-6, section.centroid_y()).with_shear(0.0002);
        let points = shear_stress_distribution(&section, &profile);
        assert_eq!(points.len(), section.layers().len());
        for w in points.windows(2) {
            assert!(w[1].y > w[0].y);
        }
        assert!(points.iter().all(|p| p.tau.is_finite()));
    }

    #[test]
    fn test_zero_shear_state_is_singular() {
        // no shear strain means no shear stiffness row
        let section = section(false);
        let profile = StrainProfile::new(0.0, 1e-6, section.centroid_y());
        let points = shear_stress_distribution(&section, &profile);
        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|p| p.tau == 0.0 && p.delta_q == 0.0));
    }

    #[test]
    fn test_crushed_section_returns_zero_profile() {
        let section = section(false);
        // every layer beyond the crushing strain carries no stress
        let profile = StrainProfile::new(-0.01, 0.0, section.centroid_y());
        let points = shear_stress_distribution(&section, &profile);
        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|p| p.tau == 0.0));
    }
}
