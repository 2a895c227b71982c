//! CLI command implementations
//!
//! Thin harness over the library boundary: the engine itself stays
//! synchronous and file-format agnostic; these commands only read YAML
//! bundles and print verdicts.

pub mod extract;
pub mod profile;
pub mod run;
