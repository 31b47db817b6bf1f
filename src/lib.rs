//! # Kerfjoint
//!
//! Laser-cut interlocking joinery and living hinges for flat panels derived
//! from 3D solids.
//!
//! ## Architecture
//!
//! Kerfjoint is organized as a workspace with two crates:
//!
//! 1. **kerfjoint-geometry** - Solids, booleans, face analysis, local frames
//! 2. **kerfjoint-joinery** - Tabs, cross joints, living hinges, box generators,
//!    sessions and configuration
//!
//! This crate re-exports both and sets up logging for the binary.

pub use kerfjoint_geometry as geometry;
pub use kerfjoint_joinery as joinery;

pub use kerfjoint_geometry::{BoundingBox, Face, GeometryError, LocalFrame, Solid};
pub use kerfjoint_joinery::{
    make_box, make_cross_parts, make_rounded_box, make_tabs_joins, BoxPart, CrossSession,
    JoineryConfig, JoineryError, JoinerySession, LivingHingeSession, ShapeDocument,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date information
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with tracing.
///
/// `RUST_LOG` selects what is shown on top of the INFO default.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
