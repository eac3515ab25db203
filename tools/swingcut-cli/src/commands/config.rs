//! Show or initialize the user configuration.

use swingcut_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, write_defaults: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if write_defaults {
        if path.exists() {
            anyhow::bail!("Config already exists: {}", path.display());
        }
        AppConfig::default()
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Wrote default config: {}", path.display());
        return Ok(());
    }

    let source = if path.exists() { "file" } else { "defaults" };
    println!("# {} ({source})", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}
