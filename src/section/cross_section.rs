//! Assembled cross-section and its builder

use log::debug;
use serde::Serialize;

use super::fibres::{ConcreteLayer, RebarBar, RebarLayer, Stirrups, Tendon, TransverseSteel};
use super::shape::SectionShape;
use crate::error::{SectionError, SectionResult};
use crate::materials::Concrete;

/// Immutable layered section: concrete layers ordered bottom to top plus
/// discrete bars and tendons.
#[derive(Debug, Clone, Serialize)]
pub struct CrossSection {
    layers: Vec<ConcreteLayer>,
    rebars: Vec<RebarBar>,
    tendons: Vec<Tendon>,
}

impl CrossSection {
    pub fn layers(&self) -> &[ConcreteLayer] {
        &self.layers
    }

    pub fn rebars(&self) -> &[RebarBar] {
        &self.rebars
    }

    pub fn tendons(&self) -> &[Tendon] {
        &self.tendons
    }

    pub fn y_bottom(&self) -> f64 {
        self.layers.first().map_or(0.0, |l| l.y_bottom)
    }

    pub fn y_top(&self) -> f64 {
        self.layers.last().map_or(0.0, |l| l.y_top)
    }

    pub fn height(&self) -> f64 {
        self.y_top() - self.y_bottom()
    }

    /// Gross concrete area, reinforcement ignored
    pub fn gross_area(&self) -> f64 {
        self.layers.iter().map(ConcreteLayer::area).sum()
    }

    /// Elevation of the gross concrete centroid
    pub fn centroid_y(&self) -> f64 {
        let area = self.gross_area();
        if area == 0.0 {
            return 0.0;
        }
        self.layers.iter().map(|l| l.area() * l.y_mid()).sum::<f64>() / area
    }

    /// Gross moment of inertia about the centroid
    pub fn gross_moment_of_inertia(&self) -> f64 {
        let yc = self.centroid_y();
        self.layers
            .iter()
            .map(|l| {
                let dy = l.y_mid() - yc;
                l.width * l.thickness().powi(3) / 12.0 + l.area() * dy * dy
            })
            .sum()
    }

    /// Concrete plus `(n - 1) A` for every bar and tendon, with `n` taken
    /// against the bottom layer's modulus
    pub fn transformed_area(&self) -> f64 {
        let ec = match self.layers.first() {
            Some(layer) => layer.material.ec_modulus,
            None => return 0.0,
        };
        let bars: f64 = self
            .rebars
            .iter()
            .map(|b| (b.material.es / ec - 1.0) * b.area)
            .sum();
        let tendons: f64 = self
            .tendons
            .iter()
            .map(|t| (t.material.ep / ec - 1.0) * t.area)
            .sum();
        self.gross_area() + bars + tendons
    }

    pub fn total_rebar_area(&self) -> f64 {
        self.rebars.iter().map(|b| b.area).sum()
    }

    /// Longitudinal reinforcement ratio As / Ag
    pub fn reinforcement_ratio(&self) -> f64 {
        let ag = self.gross_area();
        if ag == 0.0 {
            0.0
        } else {
            self.total_rebar_area() / ag
        }
    }

    pub fn has_transverse_steel(&self) -> bool {
        self.layers.iter().any(|l| l.transverse.is_some())
    }
}

/// Builder collecting fibres; stirrups are assigned when the section is built
#[derive(Debug, Clone, Default)]
pub struct CrossSectionBuilder {
    layers: Vec<ConcreteLayer>,
    rebars: Vec<RebarBar>,
    tendons: Vec<Tendon>,
    stirrups: Option<Stirrups>,
}

impl CrossSectionBuilder {
    /// Start from explicit concrete layers
    pub fn new(layers: Vec<ConcreteLayer>) -> Self {
        Self {
            layers,
            ..Self::default()
        }
    }

    /// Discretise a shape into `n_layers` layers of `concrete`
    pub fn from_shape(
        shape: &SectionShape,
        concrete: Concrete,
        n_layers: usize,
    ) -> SectionResult<Self> {
        shape.validate()?;
        if n_layers == 0 {
            return Err(SectionError::InvalidGeometry(
                "number of concrete layers must be positive".to_string(),
            ));
        }
        Ok(Self::new(shape.discretise(concrete, n_layers)))
    }

    pub fn add_rebar(mut self, bar: RebarBar) -> Self {
        self.rebars.push(bar);
        self
    }

    pub fn add_rebar_layer(mut self, layer: RebarLayer) -> Self {
        self.rebars.push(layer.to_bar());
        self
    }

    pub fn add_tendon(mut self, tendon: Tendon) -> Self {
        self.tendons.push(tendon);
        self
    }

    pub fn stirrups(mut self, stirrups: Stirrups) -> Self {
        self.stirrups = Some(stirrups);
        self
    }

    pub fn build(self) -> SectionResult<CrossSection> {
        let mut layers = self.layers;
        if layers.is_empty() {
            return Err(SectionError::InvalidGeometry(
                "section has no concrete layers".to_string(),
            ));
        }
        for (i, layer) in layers.iter().enumerate() {
            if !(layer.y_bottom < layer.y_top) || !(layer.width > 0.0) {
                return Err(SectionError::InvalidGeometry(format!(
                    "layer {} is degenerate (y {}..{}, width {})",
                    i, layer.y_bottom, layer.y_top, layer.width
                )));
            }
        }
        if let Some(bar) = self.rebars.iter().find(|b| !(b.area > 0.0)) {
            return Err(SectionError::InvalidGeometry(format!(
                "rebar at y={} has non-positive area {}",
                bar.y, bar.area
            )));
        }
        if let Some(t) = self.tendons.iter().find(|t| !(t.area > 0.0)) {
            return Err(SectionError::InvalidGeometry(format!(
                "tendon at y={} has non-positive area {}",
                t.y, t.area
            )));
        }

        layers.sort_by(|a, b| a.y_bottom.total_cmp(&b.y_bottom));

        if let Some(stirrups) = self.stirrups {
            assign_stirrups(&mut layers, &stirrups)?;
        }

        debug!(
            "built section: {} layers, {} bars, {} tendons",
            layers.len(),
            self.rebars.len(),
            self.tendons.len()
        );

        Ok(CrossSection {
            layers,
            rebars: self.rebars,
            tendons: self.tendons,
        })
    }
}

fn assign_stirrups(layers: &mut [ConcreteLayer], stirrups: &Stirrups) -> SectionResult<()> {
    if !(stirrups.spacing > 0.0) || stirrups.av < 0.0 {
        return Err(SectionError::InvalidGeometry(format!(
            "stirrups need spacing > 0 and Av >= 0 (s={}, Av={})",
            stirrups.spacing, stirrups.av
        )));
    }
    let (lo, hi) = match (layers.first(), layers.last()) {
        (Some(first), Some(last)) => (
            stirrups.y_bottom.unwrap_or(first.y_bottom),
            stirrups.y_top.unwrap_or(last.y_top),
        ),
        _ => return Ok(()),
    };

    for layer in layers.iter_mut() {
        let y = layer.y_mid();
        if (lo..=hi).contains(&y) {
            layer.transverse = Some(TransverseSteel {
                ratio: stirrups.av / (layer.width * stirrups.spacing),
                material: stirrups.material,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{PrestressingSteel, ReinforcingSteel};
    use approx::assert_relative_eq;

    fn rect(n_layers: usize) -> CrossSectionBuilder {
        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        CrossSectionBuilder::from_shape(&shape, Concrete::new(30.0).unwrap(), n_layers).unwrap()
    }

    #[test]
    fn test_gross_properties() {
        let section = rect(100).build().unwrap();
        assert_relative_eq!(section.height(), 500.0, epsilon = 1e-9);
        assert_relative_eq!(section.gross_area(), 150_000.0, epsilon = 1e-6);
        assert_relative_eq!(section.centroid_y(), 250.0, epsilon = 1e-9);
        let ig = 300.0 * 500.0_f64.powi(3) / 12.0;
        assert_relative_eq!(section.gross_moment_of_inertia(), ig, max_relative = 1e-9);
    }

    #[test]
    fn test_transformed_area_and_ratio() {
        let steel = ReinforcingSteel::new(400.0).unwrap();
        let section = rect(50)
            .add_rebar(RebarBar { y: 50.0, area: 1500.0, material: steel })
            .build()
            .unwrap();
        let n = 200_000.0 / section.layers()[0].material.ec_modulus;
        assert_relative_eq!(
            section.transformed_area(),
            150_000.0 + (n - 1.0) * 1500.0,
            epsilon = 1e-6
        );
        assert_relative_eq!(section.reinforcement_ratio(), 0.01, epsilon = 1e-12);
        assert_eq!(section.total_rebar_area(), 1500.0);
    }

    #[test]
    fn test_stirrups_assigned_in_range() {
        let steel = ReinforcingSteel::new(400.0).unwrap();
        let section = rect(10)
            .stirrups(Stirrups {
                av: 150.0,
                spacing: 200.0,
                material: steel,
                y_bottom: Some(100.0),
                y_top: Some(400.0),
            })
            .build()
            .unwrap();

        for layer in section.layers() {
            let inside = (100.0..=400.0).contains(&layer.y_mid());
            assert_eq!(layer.transverse.is_some(), inside);
            if let Some(t) = layer.transverse {
                assert_relative_eq!(t.ratio, 150.0 / (300.0 * 200.0), epsilon = 1e-15);
            }
        }
        assert!(section.has_transverse_steel());
    }

    #[test]
    fn test_builder_validation() {
        assert!(CrossSectionBuilder::new(Vec::new()).build().is_err());

        let concrete = Concrete::new(30.0).unwrap();
        let flipped = vec![ConcreteLayer::new(10.0, 0.0, 300.0, concrete)];
        assert!(CrossSectionBuilder::new(flipped).build().is_err());

        let steel = ReinforcingSteel::new(400.0).unwrap();
        assert!(rect(10)
            .add_rebar(RebarBar { y: 50.0, area: 0.0, material: steel })
            .build()
            .is_err());

        let strand = PrestressingSteel::new(1860.0).unwrap();
        assert!(rect(10)
            .add_tendon(Tendon { y: 50.0, area: -1.0, material: strand, prestrain: 0.005 })
            .build()
            .is_err());

        assert!(rect(10)
            .stirrups(Stirrups {
                av: 100.0,
                spacing: 0.0,
                material: steel,
                y_bottom: None,
                y_top: None,
            })
            .build()
            .is_err());

        let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
        assert!(CrossSectionBuilder::from_shape(&shape, concrete, 0).is_err());
    }

    #[test]
    fn test_layers_sorted_bottom_to_top() {
        let concrete = Concrete::new(30.0).unwrap();
        let layers = vec![
            ConcreteLayer::new(10.0, 20.0, 100.0, concrete),
            ConcreteLayer::new(0.0, 10.0, 100.0, concrete),
        ];
        let section = CrossSectionBuilder::new(layers).build().unwrap();
        assert_eq!(section.y_bottom(), 0.0);
        assert_eq!(section.y_top(), 20.0);
    }
}
