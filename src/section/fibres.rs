//! Fibres making up a cross-section: concrete layers and discrete steel

use serde::Serialize;

use crate::materials::{Concrete, PrestressingSteel, ReinforcingSteel};

/// Smeared transverse reinforcement in a concrete layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransverseSteel {
    /// Av / (b s)
    pub ratio: f64,
    pub material: ReinforcingSteel,
}

/// Horizontal concrete layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcreteLayer {
    pub y_bottom: f64,
    pub y_top: f64,
    pub width: f64,
    pub material: Concrete,
    pub transverse: Option<TransverseSteel>,
}

impl ConcreteLayer {
    pub fn new(y_bottom: f64, y_top: f64, width: f64, material: Concrete) -> Self {
        Self {
            y_bottom,
            y_top,
            width,
            material,
            transverse: None,
        }
    }

    pub fn y_mid(&self) -> f64 {
        0.5 * (self.y_bottom + self.y_top)
    }

    pub fn thickness(&self) -> f64 {
        self.y_top - self.y_bottom
    }

    pub fn area(&self) -> f64 {
        self.width * self.thickness()
    }
}

/// Bar or lumped group of bars at one elevation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RebarBar {
    pub y: f64,
    pub area: f64,
    pub material: ReinforcingSteel,
}

/// Row of identical bars
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebarLayer {
    pub y: f64,
    pub n_bars: u32,
    pub bar_diameter: f64,
    pub material: ReinforcingSteel,
}

impl RebarLayer {
    pub fn bar_area(&self) -> f64 {
        std::f64::consts::FRAC_PI_4 * self.bar_diameter * self.bar_diameter
    }

    pub fn total_area(&self) -> f64 {
        self.n_bars as f64 * self.bar_area()
    }

    /// Lump the row into a single bar
    pub fn to_bar(&self) -> RebarBar {
        RebarBar {
            y: self.y,
            area: self.total_area(),
            material: self.material,
        }
    }
}

/// Prestressing tendon or strand group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tendon {
    pub y: f64,
    pub area: f64,
    pub material: PrestressingSteel,
    /// Effective tensile prestrain after losses
    pub prestrain: f64,
}

/// Stirrup definition applied over an elevation range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stirrups {
    /// Area of all legs in one stirrup (mm²)
    pub av: f64,
    /// Spacing along the member (mm)
    pub spacing: f64,
    pub material: ReinforcingSteel,
    /// Range of layers that receive stirrups; `None` means the section extreme
    pub y_bottom: Option<f64>,
    pub y_top: Option<f64>,
}
