//! Manifest file format for actiongen templates.
//!
//! This module defines the structure of the `manifest.yaml` (or
//! `manifest.toml`) file that names the templates a template set provides and
//! the language whose context builder feeds them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

/// The root manifest structure for a template set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// The name of the template set
    pub name: String,

    /// A short description of what the template set generates
    #[serde(default)]
    pub description: String,

    /// The version of the template set (should follow semantic versioning)
    #[serde(default = "default_version")]
    pub version: String,

    /// The target language; selects the context builder (e.g., "csharp")
    pub language: String,

    /// Template file for each generated part
    pub templates: TemplateFiles,
}

/// Template file names, relative to the template directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFiles {
    /// Outer source document
    pub source: String,

    /// One action's nested class, rendered once per action
    pub action: String,

    /// Enumeration document
    pub enumeration: String,
}

impl TemplateFiles {
    /// Iterate over `(role, file)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("source", self.source.as_str()),
            ("action", self.action.as_str()),
            ("enumeration", self.enumeration.as_str()),
        ]
        .into_iter()
    }
}

fn default_version() -> String {
    String::from("0.1.0")
}

impl TemplateManifest {
    /// Parse a manifest from YAML text
    pub fn from_yaml(content: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a manifest from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a template manifest from a directory.
    ///
    /// Looks for `manifest.yaml` first, then `manifest.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither file exists, can't be read, or is invalid.
    pub async fn load_from_dir(template_dir: &Path) -> crate::Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        let (path, is_yaml) = if yaml_path.exists() {
            (yaml_path, true)
        } else if toml_path.exists() {
            (toml_path, false)
        } else {
            return Err(crate::Error::template(format!(
                "No manifest.yaml or manifest.toml in {}",
                template_dir.display()
            )));
        };

        log::debug!("Reading template manifest from {}", path.display());
        let content = fs::read_to_string(&path).await.map_err(|e| {
            crate::Error::template(format!(
                "Failed to read template manifest at {}: {}",
                path.display(),
                e
            ))
        })?;

        let parsed = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_toml(&content)
        };
        parsed.map_err(|e| {
            crate::Error::template(format!(
                "Invalid template manifest at {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const YAML: &str = r#"
name: csharp
language: csharp
templates:
  source: actions.cs.tera
  action: action.cs.tera
  enumeration: action_type.cs.tera
"#;

    #[test]
    fn test_yaml_defaults() -> crate::Result<()> {
        let manifest = TemplateManifest::from_yaml(YAML)?;
        assert_eq!(manifest.version, "0.1.0");
        assert_eq!(manifest.description, "");
        let roles: Vec<_> = manifest.templates.iter().map(|(role, _)| role).collect();
        assert_eq!(roles, vec!["source", "action", "enumeration"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_toml_from_dir() -> crate::Result<()> {
        let dir = tempdir()?;
        let manifest = TemplateManifest::from_yaml(YAML)?;
        let toml = toml::to_string_pretty(&manifest)
            .map_err(|e| crate::Error::template(e.to_string()))?;
        tokio::fs::write(dir.path().join("manifest.toml"), toml).await?;

        let loaded = TemplateManifest::load_from_dir(dir.path()).await?;
        assert_eq!(loaded, manifest);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_manifest() -> crate::Result<()> {
        let dir = tempdir()?;
        let err = TemplateManifest::load_from_dir(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("No manifest.yaml or manifest.toml"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_manifest_names_the_file() -> crate::Result<()> {
        let dir = tempdir()?;
        tokio::fs::write(dir.path().join("manifest.yaml"), "name: [").await?;
        let err = TemplateManifest::load_from_dir(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("manifest.yaml"));
        Ok(())
    }
}
