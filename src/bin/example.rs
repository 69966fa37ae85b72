//! Sectional analysis example - simply reinforced beam with stirrups

use rc_section::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Sectional Analysis Example: 300 x 500 Beam ===\n");

    let concrete = Concrete::new(35.0)?;
    let steel = ReinforcingSteel::new(400.0)?.with_hardening(600.0, 0.01);

    //   +-----------+  y = 500
    //   |  o     o  |  2 x 16 mm at y = 450
    //   |           |
    //   |  o  o  o  |  3 x 25 mm at y = 50
    //   +-----------+  y = 0
    let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
    let section = CrossSectionBuilder::from_shape(&shape, concrete, 100)?
        .add_rebar_layer(RebarLayer {
            y: 50.0,
            n_bars: 3,
            bar_diameter: 25.0,
            material: steel,
        })
        .add_rebar_layer(RebarLayer {
            y: 450.0,
            n_bars: 2,
            bar_diameter: 16.0,
            material: steel,
        })
        .stirrups(Stirrups {
            av: 157.0,
            spacing: 200.0,
            material: ReinforcingSteel::new(400.0)?,
            y_bottom: None,
            y_top: None,
        })
        .build()?;

    println!("Section:");
    println!("  Gross area:   {:.0} mm²", section.gross_area());
    println!("  Centroid:     {:.1} mm", section.centroid_y());
    println!("  Ig:           {:.3e} mm⁴", section.gross_moment_of_inertia());
    println!("  Steel ratio:  {:.4}", section.reinforcement_ratio());

    // Moment-curvature
    let curve = MomentCurvatureAnalysis::new(&section, MomentCurvatureOptions::default())?.run();

    println!("\n--- Moment-Curvature ---");
    if let Some(p) = curve.cracking_point() {
        println!("  Cracking: M = {:8.2} kNm at phi = {:.3} mrad/m", p.moment / 1e6, p.curvature * 1e6);
    }
    if let Some(p) = curve.yield_point() {
        println!("  Yield:    M = {:8.2} kNm at phi = {:.3} mrad/m", p.moment / 1e6, p.curvature * 1e6);
    }
    if let Some(p) = curve.ultimate_point() {
        println!("  Ultimate: M = {:8.2} kNm at phi = {:.3} mrad/m", p.moment / 1e6, p.curvature * 1e6);
    }
    match curve.failure_mode {
        Some(mode) => println!("  Ended by:  {}", mode),
        None => println!("  Reached curvature limit"),
    }

    // V-gamma under a small compressive load
    let options = ShearOptions::default()
        .with_loads(-100_000.0, 0.0)
        .with_gamma_max(0.004)
        .with_steps(40);
    let analysis = ShearAnalysis::new(&section, options)?;
    let shear = analysis.run();

    println!("\n--- Shear Response ---");
    println!("  Points:       {}", shear.len());
    println!("  Peak V:       {:.2} kN", shear.peak_shear() / 1e3);
    println!("  gamma at Vu:  {:.5}", shear.gamma_at_peak());
    if let Some(mode) = shear.failure_mode {
        println!("  Ended by:     {}", mode);
    }

    if let Some(p) = shear.ultimate_point() {
        let strains = StrainProfile::new(p.eps_ref, p.curvature, analysis.y_ref())
            .with_shear(p.avg_shear_strain);
        let profile = shear_stress_distribution(&section, &strains);

        println!("\n  Shear stress at ultimate (every 10th layer):");
        println!("  {:>8} {:>10}", "y [mm]", "tau [MPa]");
        for point in profile.iter().step_by(10) {
            println!("  {:>8.1} {:>10.3}", point.y, point.tau);
        }
    }

    Ok(())
}
