//! Check-profile CLI command

use crate::models::ArchitectureProfile;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Validate an architecture profile file and print its layers
pub fn run(path: &Path) -> Result<()> {
    let profile = ArchitectureProfile::from_yaml_file(path)?;

    println!("{}", "Profile OK".green().bold());
    for layer in profile.layers() {
        let deps: Vec<&str> = layer
            .allowed_dependencies
            .iter()
            .map(|d| d.as_str())
            .collect();
        if deps.is_empty() {
            println!("  {} (no dependencies)", layer.name.cyan());
        } else {
            println!("  {} -> {}", layer.name.cyan(), deps.join(", "));
        }
    }
    Ok(())
}
