//! # Kerfjoint Joinery
//!
//! Interlocking joinery for flat panels cut from sheet material.
//!
//! ## Joints
//!
//! - **Tabs**: finger tabs, screw T-slots, continuous edges and flex clips on a
//!   panel face with matching holes in the panels they meet
//! - **Cross joints**: half-depth notches where two panels cross, with optional
//!   strength nodes and dog-bones
//! - **Living hinges**: unrolls a chain of bent panels into one flat part with a
//!   slit pattern over every bend
//!
//! ## Supporting Infrastructure
//!
//! - **Material model**: thickness estimation, kerf and tolerances per panel
//! - **Box generators**: rectangular and regular polygon boxes
//! - **Sessions**: editable jobs over a shape document, persisted as JSON
//! - **Configuration**: tolerances and tessellation from TOML or JSON

pub mod assembler;
pub mod boxes;
pub mod config;
pub mod cross;
pub mod document;
pub mod error;
pub mod features;
pub mod flex;
pub mod hinge;
pub mod ids;
pub mod joinery;
pub mod material;
pub mod rounded_box;
pub mod screw;
pub mod session;
pub mod slots;
pub mod tab;

pub use assembler::{assemble_list_element, MaterialElement, PanelMaterial};
pub use boxes::{
    make_box, BoxPart, BoxProperties, LengthWidthPriority, PlatePosition, TopBottomProperties,
    TopType,
};
pub use config::{BoxJob, JoineryConfig, Tessellation, Tolerances};
pub use cross::{classify, make_cross_parts, CrossCase, CrossClassification};
pub use document::ShapeDocument;
pub use error::{JoineryError, JoineryResult, ParameterError, ParameterResult};
pub use hinge::{
    create_linked_part, estimate_min_link, GlobalLivingHingeMaterial, HingeGeometry,
    HingeProperties, HingeType, LinkedPart,
};
pub use ids::{GroupId, IdAllocator, TabId};
pub use joinery::make_tabs_joins;
pub use material::{estimate_thickness, MaterialProperties, NodeType, PartsList};
pub use rounded_box::{make_rounded_box, RoundedBoxProperties, TopBottomRoundedProperties};
pub use screw::{get_screw_nut_spec, ScrewNutSpec};
pub use session::{
    CrossSession, HingeOutput, HingeRecord, JoinerySession, LivingHingeSession, ParameterRecord,
    TabLinkRecord, TabRecord,
};
pub use slots::get_slot_positions;
pub use tab::{TabParameters, TabProperties, TabType, TabsList};
