use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::runtime::Runtime;

/// File that marks a directory as an installed package version.
pub const PACKAGE_FILE: &str = "package.json";

/// Package definition stored in each version directory.
///
/// Every field is optional; unknown fields are ignored so definitions written
/// by other tools still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PackageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    /// Each variant is a list of requirement strings, e.g. `[["python-2.7"], ["python-3.7"]]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Vec<String>>,
}

impl PackageMeta {
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed package definition {:?}", path))
    }

    /// Multi-line summary shown when hovering or inspecting a package:
    /// description, variants, then tools. Sections without data are omitted.
    pub fn summary(&self) -> String {
        let mut sections = Vec::new();

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            sections.push(format!("Description: {}", description));
        }

        if !self.variants.is_empty() {
            let mut lines = vec!["Variants: ".to_string()];
            for variant in &self.variants {
                lines.push(format!(" * {}", variant.join(" | ")));
            }
            sections.push(lines.join("\n"));
        }

        if !self.tools.is_empty() {
            sections.push(format!("Tools: {}", self.tools.join(", ")));
        }

        sections.join("\n")
    }
}
