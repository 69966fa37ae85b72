//! Benchmarks for the sectional solvers

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rc_section::prelude::*;

fn create_beam(n_layers: usize) -> CrossSection {
    let steel = ReinforcingSteel::new(400.0).unwrap();
    let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
    CrossSectionBuilder::from_shape(&shape, Concrete::new(35.0).unwrap(), n_layers)
        .unwrap()
        .add_rebar(RebarBar { y: 50.0, area: 1500.0, material: steel })
        .add_rebar(RebarBar { y: 450.0, area: 400.0, material: steel })
        .stirrups(Stirrups {
            av: 157.0,
            spacing: 200.0,
            material: steel,
            y_bottom: None,
            y_top: None,
        })
        .build()
        .unwrap()
}

fn benchmark_node(c: &mut Criterion) {
    let concrete = Concrete::new(35.0).unwrap();
    let settings = NodeSolverSettings::default();

    c.bench_function("mcft_node_cracked", |b| {
        b.iter(|| solve_node(black_box(0.001), black_box(0.002), &concrete, None, &settings))
    });
}

fn benchmark_moment_curvature(c: &mut Criterion) {
    let mut group = c.benchmark_group("moment_curvature");

    for n_layers in [50, 100, 200] {
        let section = create_beam(n_layers);
        group.bench_function(format!("{}_layers", n_layers), |b| {
            b.iter(|| {
                MomentCurvatureAnalysis::new(black_box(&section), MomentCurvatureOptions::default())
                    .unwrap()
                    .run()
            })
        });
    }

    group.finish();
}

fn benchmark_shear_flow(c: &mut Criterion) {
    let section = create_beam(100);
    let profile = StrainProfile::new(-0.0002, 5e-6, section.centroid_y()).with_shear(0.002);

    c.bench_function("shear_stress_distribution", |b| {
        b.iter(|| shear_stress_distribution(black_box(&section), black_box(&profile)))
    });
}

fn benchmark_shear_sweep(c: &mut Criterion) {
    let section = create_beam(40);
    let options = ShearOptions::default().with_gamma_max(0.002).with_steps(10);

    c.bench_function("v_gamma_10_steps", |b| {
        b.iter(|| ShearAnalysis::new(black_box(&section), options.clone()).unwrap().run())
    });
}

criterion_group!(
    benches,
    benchmark_node,
    benchmark_moment_curvature,
    benchmark_shear_flow,
    benchmark_shear_sweep
);
criterion_main!(benches);
