use crate::core::config::AppConfig;
use anyhow::{Context, Result, ensure};
use std::path::{Path, PathBuf};

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the platform config directory.
pub fn setup() -> Result<()> {
    let path = write_example_config(AppConfig::default_config_path()?)?;
    println!("Created configuration at {}", path.display());
    println!("Edit the portfolio section, then run `etf-helper portfolio`.");
    Ok(())
}

/// Writes the example configuration to `path`, creating parent directories.
/// An existing file is never replaced.
pub fn write_example_config<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    ensure!(
        !path.exists(),
        "Configuration file already exists at {}",
        path.display()
    );

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote example configuration");
    Ok(path.to_path_buf())
}
