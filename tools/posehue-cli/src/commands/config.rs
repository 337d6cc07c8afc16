//! Inspect, create, and check configuration files.

use std::path::{Path, PathBuf};

use posehue_common::config::{config_file_path, AppConfig};

pub fn show(config: &AppConfig, explicit: Option<&Path>) -> anyhow::Result<()> {
    let source = match explicit {
        Some(path) => path.display().to_string(),
        None => {
            let path = config_file_path();
            if path.exists() {
                path.display().to_string()
            } else {
                "built-in defaults".to_string()
            }
        }
    };
    println!("# Source: {source}");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn init(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    let written = AppConfig::default()
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
    println!("Wrote default config to {}", written.display());
    Ok(())
}

pub fn validate(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    println!("Validating config: {}", path.display());

    match AppConfig::load_from(&path) {
        Ok(config) => {
            let d = &config.detection;
            println!("  [OK] Parsed and validated");
            println!("  Hue ranges:      {}", d.hue_ranges.len());
            println!("  Throttle:        {} ms", d.throttle_interval_ms);
            println!("  Smoothing:       {} samples", d.smoothing_window_size);
            println!("  Min area:        {} px", d.min_object_area_px);
            println!("  Near distance:   {} px", d.near_distance_px);
            println!(
                "  Tracked joints:  {}",
                d.tracked_joints
                    .iter()
                    .map(|j| j.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(())
        }
        Err(e) => {
            println!("  [FAIL] {e}");
            anyhow::bail!("Config is invalid")
        }
    }
}
