use anyhow::Context;
use kerfjoint::{init_logging, make_box, JoineryConfig, BUILD_DATE, VERSION};
use std::path::PathBuf;

/// Generates the box described by the configuration file given as the first
/// argument, or the default box, and logs every panel.
fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("kerfjoint {} ({})", VERSION, BUILD_DATE);

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => JoineryConfig::load_from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => JoineryConfig::default(),
    };

    let job = &config.box_job;
    let parts = make_box(&job.properties, &job.top, &job.bottom).context("generating box")?;
    for part in &parts {
        let bbox = part.solid.bounding_box();
        tracing::info!(
            "{}: {:.2} x {:.2} x {:.2} at ({:.2}, {:.2}, {:.2})",
            part.name,
            bbox.x_length(),
            bbox.y_length(),
            bbox.z_length(),
            bbox.x_min,
            bbox.y_min,
            bbox.z_min
        );
    }
    tracing::info!("{} panels", parts.len());
    Ok(())
}
