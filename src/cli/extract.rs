//! Extract CLI command - preview feature extraction for a request

use crate::extract::{FeatureExtractor, KeywordExtractor};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Show the features the keyword extractor would raise for clarification
pub fn run(text: Option<&str>, file: Option<&Path>) -> Result<()> {
    let raw = match (text, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => anyhow::bail!("provide request text or --file"),
    };

    let features = KeywordExtractor::new().extract(&raw);
    if features.is_empty() {
        println!("{}", "No features extracted".yellow());
        return Ok(());
    }

    println!("{}", format!("{} feature(s):", features.len()).bold());
    for feature in features {
        println!("  - {}", feature.cyan());
    }
    Ok(())
}
