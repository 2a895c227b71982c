//! Run CLI command - drive a full workflow from a bundle directory
//!
//! A bundle is a directory holding `task.yaml` (request, profile,
//! clarification answers) plus one optional artifact file per phase
//! (`clarify.yaml`, `plan.yaml`, `implement.yaml`, `verify.yaml`).

use crate::extract::{KeywordExtractor, StaticExtractor};
use crate::models::{
    ArchitectureProfile, ArtifactDraft, Layer, Phase, ScopeDecision, TaskDescriptor, Verdict,
};
use crate::state::Workflow;
use crate::validator::ValidationRules;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// task.yaml contents
#[derive(Debug, Deserialize)]
pub struct TaskBundle {
    /// Raw request text
    pub request: String,

    /// Architecture profile (validated at load)
    pub profile: Vec<Layer>,

    /// Explicit scope items; when present the keyword extractor is bypassed
    #[serde(default)]
    pub scope_items: Vec<String>,

    /// Clarification answers applied before the clarify artifact
    #[serde(default)]
    pub clarifications: BTreeMap<String, ScopeDecision>,

    /// Validation thresholds
    #[serde(default)]
    pub rules: Option<ValidationRules>,
}

impl TaskBundle {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("task.yaml");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).context("Failed to parse task.yaml")
    }
}

/// Drive every phase of a bundle; stops at the first failing verdict
pub fn run(bundle_dir: &Path) -> Result<()> {
    let bundle = TaskBundle::load(bundle_dir)?;
    let profile =
        ArchitectureProfile::new(bundle.profile.clone()).context("Invalid architecture profile")?;
    let descriptor = TaskDescriptor::new(bundle.request.clone(), profile);

    let rules = bundle.rules.clone().unwrap_or_default();
    let mut workflow = if bundle.scope_items.is_empty() {
        Workflow::create_with_rules(descriptor, &KeywordExtractor::new(), rules)?
    } else {
        let items: Vec<&str> = bundle.scope_items.iter().map(|s| s.as_str()).collect();
        Workflow::create_with_rules(descriptor, &StaticExtractor::new(&items), rules)?
    };

    println!("{} {}", "workflow".bold(), workflow.id());
    println!(
        "raised for clarification: [{}]",
        workflow
            .state()
            .ledger
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    for (name, decision) in &bundle.clarifications {
        workflow.answer_clarification(name, *decision)?;
        let label = match decision {
            ScopeDecision::Approve => "approved".green(),
            ScopeDecision::Reject => "rejected".yellow(),
        };
        println!("  {} {}", label, name);
    }

    for phase in Phase::ALL {
        let draft = load_artifact(bundle_dir, phase)?;
        let verdict = workflow.submit_artifact(phase, draft)?;
        print_verdict(&verdict);
        if !verdict.is_pass() {
            bail!("phase '{}' failed compliance", phase);
        }
    }

    let report = workflow.finalize()?;
    println!();
    println!("{}", report.format_summary());
    Ok(())
}

fn load_artifact(dir: &Path, phase: Phase) -> Result<ArtifactDraft> {
    let path = dir.join(format!("{}.yaml", phase));
    if !path.exists() {
        return Ok(ArtifactDraft::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {} artifact", phase))
}

fn print_verdict(verdict: &Verdict) {
    let label = if verdict.is_pass() {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!("{:>10}  {}", verdict.phase.to_string(), label);
    for violation in &verdict.violations {
        println!("            {}", violation.format().red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_parses_minimal_task() {
        let yaml = r#"
request: collect name and email
profile:
  - name: presentation
    allowed_dependencies: [domain]
  - name: domain
clarifications:
  name: approve
  email: reject
"#;
        let bundle: TaskBundle = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bundle.clarifications.len(), 2);
        assert!(bundle.scope_items.is_empty());
        assert!(bundle.rules.is_none());
    }
}
