//! rc-section - reinforced and prestressed concrete sectional analysis
//!
//! Layered sections are analysed with the Modified Compression Field Theory:
//! - Moment-curvature response under constant axial load
//! - MCFT biaxial state at a single fibre (free-surface condition)
//! - Shear stress distribution by the longitudinal stiffness method
//! - Shear force versus average shear strain (V-gamma) response
//!
//! Units are mm, N and MPa throughout; tension and sagging are positive.
//!
//! ## Example
//! ```rust
//! use rc_section::prelude::*;
//!
//! let concrete = Concrete::new(35.0).unwrap();
//! let steel = ReinforcingSteel::new(400.0).unwrap();
//!
//! let shape = SectionShape::Rectangular { b: 300.0, h: 500.0 };
//! let section = CrossSectionBuilder::from_shape(&shape, concrete, 100)
//!     .unwrap()
//!     .add_rebar(RebarBar { y: 50.0, area: 1500.0, material: steel })
//!     .build()
//!     .unwrap();
//!
//! let curve = MomentCurvatureAnalysis::new(&section, MomentCurvatureOptions::default())
//!     .unwrap()
//!     .run();
//!
//! let mu = curve.ultimate_moment().unwrap();
//! assert!(mu > 0.0);
//! ```

pub mod analysis;
pub mod error;
pub mod io;
pub mod materials;
pub mod math;
pub mod results;
pub mod section;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        shear_stress_distribution, solve_node, AnalysisType, McftState,
        MomentCurvatureAnalysis, MomentCurvatureOptions, NodeSolverSettings, ShearAnalysis,
        ShearOptions,
    };
    pub use crate::error::{SectionError, SectionResult};
    pub use crate::io::{run_json, run_request, AnalysisReport, AnalysisRequest};
    pub use crate::materials::{
        Concrete, ConcreteParams, MaterialModel, PrestressingSteel, PrestressParams,
        ReinforcingSteel, SteelParams,
    };
    pub use crate::results::{FailureMode, ResponseCurve, ResponsePoint, ShearStressPoint};
    pub use crate::section::{
        ConcreteLayer, CrossSection, CrossSectionBuilder, RebarBar, RebarLayer, SectionShape,
        Stirrups, StrainProfile, Tendon,
    };
}

#[cfg(feature = "wasm")]
pub mod wasm;
