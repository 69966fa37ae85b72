//! Gross section shapes and their discretisation into horizontal layers.
//! Elevations are measured upward from the section bottom (mm).

use serde::{Deserialize, Serialize};

use super::fibres::ConcreteLayer;
use crate::error::{SectionError, SectionResult};
use crate::materials::Concrete;

/// Outline of the concrete section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SectionShape {
    Rectangular {
        b: f64,
        h: f64,
    },
    /// Web of width `bw` and height `hw` under a flange `bf` x `hf`
    #[serde(alias = "t")]
    Tee {
        bw: f64,
        hw: f64,
        bf: f64,
        hf: f64,
    },
    Circular {
        #[serde(alias = "d")]
        diameter: f64,
    },
    /// Piecewise-linear width profile of `[y, width]` pairs
    Generic { profile: WidthProfile },
}

/// `[y, width]` points, kept sorted by elevation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct WidthProfile(Vec<[f64; 2]>);

impl WidthProfile {
    pub fn points(&self) -> &[[f64; 2]] {
        &self.0
    }
}

impl From<Vec<[f64; 2]>> for WidthProfile {
    fn from(mut points: Vec<[f64; 2]>) -> Self {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Self(points)
    }
}

impl From<WidthProfile> for Vec<[f64; 2]> {
    fn from(profile: WidthProfile) -> Self {
        profile.0
    }
}

impl SectionShape {
    pub fn validate(&self) -> SectionResult<()> {
        let ok = match self {
            SectionShape::Rectangular { b, h } => *b > 0.0 && *h > 0.0,
            SectionShape::Tee { bw, hw, bf, hf } => {
                *bw > 0.0 && *hw >= 0.0 && *bf > 0.0 && *hf >= 0.0 && hw + hf > 0.0
            }
            SectionShape::Circular { diameter } => *diameter > 0.0,
            SectionShape::Generic { profile } => {
                profile.points().len() >= 2
                    && profile.points().iter().all(|p| p[1] >= 0.0)
                    && self.height() > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(SectionError::InvalidGeometry(format!(
                "{:?} has non-positive dimensions",
                self
            )))
        }
    }

    /// Lowest elevation of the outline
    pub fn y_min(&self) -> f64 {
        match self {
            SectionShape::Generic { profile } => {
                profile.points().first().map_or(0.0, |p| p[0])
            }
            _ => 0.0,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            SectionShape::Rectangular { h, .. } => *h,
            SectionShape::Tee { hw, hf, .. } => hw + hf,
            SectionShape::Circular { diameter } => *diameter,
            SectionShape::Generic { profile } => match (profile.points().first(), profile.points().last()) {
                (Some(bottom), Some(top)) => top[0] - bottom[0],
                _ => 0.0,
            },
        }
    }

    /// Section width at elevation `y`
    pub fn width_at(&self, y: f64) -> f64 {
        match self {
            SectionShape::Rectangular { b, h } => {
                if (0.0..=*h).contains(&y) {
                    *b
                } else {
                    0.0
                }
            }
            SectionShape::Tee { bw, hw, bf, hf } => {
                if y < 0.0 || y > hw + hf {
                    0.0
                } else if y <= *hw {
                    *bw
                } else {
                    *bf
                }
            }
            SectionShape::Circular { diameter } => {
                let r = 0.5 * diameter;
                let dy = y - r;
                if dy.abs() >= r {
                    0.0
                } else {
                    2.0 * (r * r - dy * dy).sqrt()
                }
            }
            SectionShape::Generic { profile } => interpolate_width(profile.points(), y),
        }
    }

    /// Slice into `n_layers` equal-thickness layers, skipping zero-width ones
    pub fn discretise(&self, material: Concrete, n_layers: usize) -> Vec<ConcreteLayer> {
        let h = self.height();
        if n_layers == 0 || h <= 0.0 {
            return Vec::new();
        }
        let base = self.y_min();
        let t = h / n_layers as f64;

        (0..n_layers)
            .filter_map(|i| {
                let y_bottom = base + i as f64 * t;
                let y_top = base + (i + 1) as f64 * t;
                let width = self.width_at(0.5 * (y_bottom + y_top));
                (width > 0.0).then(|| ConcreteLayer::new(y_bottom, y_top, width, material))
            })
            .collect()
    }
}

fn interpolate_width(pts: &[[f64; 2]], y: f64) -> f64 {
    let (first, last) = match (pts.first(), pts.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if y <= first[0] {
        return first[1];
    }
    if y >= last[0] {
        return last[1];
    }
    for w in pts.windows(2) {
        let (y0, w0, y1, w1) = (w[0][0], w[0][1], w[1][0], w[1][1]);
        if y0 <= y && y <= y1 {
            if y1 == y0 {
                return w1;
            }
            return w0 + (y - y0) / (y1 - y0) * (w1 - w0);
        }
    }
    0.0
}
