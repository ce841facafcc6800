//! Unified handling of template directory resolution

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// Environment variable pointing at a directory of template sets
pub const TEMPLATE_DIR_ENV: &str = "ACTIONGEN_TEMPLATE_DIR";

/// Represents a template directory with resolved paths and validation
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Path to the template set (contains the manifest)
    template_path: PathBuf,
    /// The template kind
    kind: TemplateKind,
}

impl TemplateDir {
    /// Create a new TemplateDir with an explicit path
    pub fn new(template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            template_path,
            kind,
        }
    }

    /// Discover the template directory based on the template kind and optional override
    ///
    /// An explicit directory is used as-is when it holds a manifest, otherwise
    /// it is treated as a root containing one sub-directory per kind.
    pub fn discover(kind: TemplateKind, custom_dir: Option<&Path>) -> io::Result<Self> {
        let template_path = if let Some(dir) = custom_dir {
            if !dir.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Template directory not found: {}", dir.display()),
                ));
            }
            if has_manifest(dir) {
                dir.to_path_buf()
            } else {
                dir.join(kind.as_str())
            }
        } else {
            Self::find_template_base_dir(kind)
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!(
                            "Could not find '{}' templates in any standard location",
                            kind
                        ),
                    )
                })?
                .join(kind.as_str())
        };

        if !has_manifest(&template_path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "Template directory has no manifest: {}",
                    template_path.display()
                ),
            ));
        }

        Ok(Self::new(template_path, kind))
    }

    /// Find the base template directory by checking standard locations
    fn find_template_base_dir(kind: TemplateKind) -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.join(kind.as_str()).exists() {
                return Some(path);
            }
        }

        // 2. Check current directory
        let templates_dir = PathBuf::from(".").join("templates");
        if templates_dir.join(kind.as_str()).exists() {
            return Some(templates_dir);
        }

        // 3. Check in the user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            let templates_dir = home_dir.join(".actiongen").join("templates");
            if templates_dir.join(kind.as_str()).exists() {
                return Some(templates_dir);
            }
        }

        None
    }

    /// Get the template kind
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the path to the specific template directory
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }
}

fn has_manifest(dir: &Path) -> bool {
    dir.join("manifest.yaml").exists() || dir.join("manifest.toml").exists()
}
