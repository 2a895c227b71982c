//! Task descriptor and architecture profile
//!
//! The descriptor is the immutable input to a workflow: the raw request text
//! plus the declared architecture profile (named layers and the dependency
//! directions they permit). The profile is validated once at load; it is
//! never mutated afterwards.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// A named architectural layer and the layers it may reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    /// Layer name (e.g., "presentation", "domain", "data")
    pub name: String,

    /// Names of layers this one is allowed to depend on
    #[serde(default)]
    pub allowed_dependencies: BTreeSet<String>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed_dependencies: BTreeSet::new(),
        }
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.allowed_dependencies.insert(name.into());
        self
    }
}

/// Errors raised while loading an architecture profile
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile declares no layers")]
    Empty,

    #[error("duplicate layer name '{0}'")]
    DuplicateLayer(String),

    #[error("layer '{layer}' allows dependency on undeclared layer '{dependency}'")]
    UnknownDependency { layer: String, dependency: String },

    #[error("dependency cycle among layers: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },
}

/// Ordered set of layers with validated, acyclic dependency directions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchitectureProfile {
    layers: Vec<Layer>,
}

impl ArchitectureProfile {
    /// Build a profile, rejecting duplicates, unknown dependencies, and
    /// cycles. This is the only place the dependency graph is checked; the
    /// profile is read-only for the rest of the workflow's life.
    pub fn new(layers: Vec<Layer>) -> Result<Self, ProfileError> {
        if layers.is_empty() {
            return Err(ProfileError::Empty);
        }

        let mut names = HashSet::new();
        for layer in &layers {
            if !names.insert(layer.name.as_str()) {
                return Err(ProfileError::DuplicateLayer(layer.name.clone()));
            }
        }

        for layer in &layers {
            for dep in &layer.allowed_dependencies {
                if !names.contains(dep.as_str()) {
                    return Err(ProfileError::UnknownDependency {
                        layer: layer.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let profile = Self { layers };
        profile.check_acyclic()?;
        Ok(profile)
    }

    /// Depth-first cycle check over the allowed-dependency edges
    fn check_acyclic(&self) -> Result<(), ProfileError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let index: HashMap<&str, &Layer> =
            self.layers.iter().map(|l| (l.name.as_str(), l)).collect();
        let mut marks: HashMap<&str, Mark> = self
            .layers
            .iter()
            .map(|l| (l.name.as_str(), Mark::Unvisited))
            .collect();

        fn visit<'a>(
            name: &'a str,
            index: &HashMap<&'a str, &'a Layer>,
            marks: &mut HashMap<&'a str, Mark>,
            path: &mut Vec<String>,
        ) -> Result<(), ProfileError> {
            match marks[name] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    let mut cycle = path.clone();
                    cycle.push(name.to_string());
                    return Err(ProfileError::DependencyCycle { path: cycle });
                }
                Mark::Unvisited => {}
            }

            marks.insert(name, Mark::InProgress);
            path.push(name.to_string());
            for dep in &index[name].allowed_dependencies {
                visit(dep.as_str(), index, marks, path)?;
            }
            path.pop();
            marks.insert(name, Mark::Done);
            Ok(())
        }

        for layer in &self.layers {
            let mut path = Vec::new();
            visit(layer.name.as_str(), &index, &mut marks, &mut path)?;
        }
        Ok(())
    }

    /// Look up a layer by name
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Whether a dependency from `from` to `to` is permitted
    pub fn allows(&self, from: &str, to: &str) -> bool {
        self.layer(from)
            .map(|l| l.allowed_dependencies.contains(to))
            .unwrap_or(false)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Parse a profile from YAML
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let layers: Vec<Layer> =
            serde_yaml::from_str(yaml).context("Failed to parse architecture profile")?;
        Self::new(layers).context("Invalid architecture profile")
    }

    /// Load a profile from a YAML file
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile from {}", path.display()))?;
        Self::from_yaml_str(&content)
    }
}

/// Immutable input describing the task under governance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Workflow identifier
    pub id: Uuid,

    /// Raw request text as received from the caller
    pub raw_request: String,

    /// Architecture profile the task must respect
    pub profile: ArchitectureProfile,
}

impl TaskDescriptor {
    pub fn new(raw_request: impl Into<String>, profile: ArchitectureProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_request: raw_request.into(),
            profile,
        }
    }
}
