//! Layered cross-section model
//!
//! A section is a list of horizontal concrete layers (bottom to top) plus
//! discrete reinforcing bars and prestressing tendons. Elevations are in mm
//! measured upward; areas in mm².

mod cross_section;
mod fibres;
pub mod integration;
mod shape;

pub use cross_section::{CrossSection, CrossSectionBuilder};
pub use fibres::{ConcreteLayer, RebarBar, RebarLayer, Stirrups, Tendon, TransverseSteel};
pub use integration::StrainProfile;
pub use shape::{SectionShape, WidthProfile};
