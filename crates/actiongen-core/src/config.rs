//! Configuration management for actiongen code generation.
//!
//! This module defines the `Config` struct that drives a generation run. The
//! configuration can be loaded from a YAML file, created programmatically, or
//! assembled from command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use actiongen_core::config::Config;
//!
//! // Create a new config programmatically
//! let mut config = Config::new("Daemon/actions_meta.yml", "Daemon/Action/ActionTemplate.cs");
//! config.usings.push("MCServerLauncher.Daemon.Storage".to_string());
//! config.extra_types.push("EventType".to_string());
//!
//! // Or load from a config file
//! # async fn load() -> actiongen_core::Result<()> {
//! let config = Config::from_file("actiongen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    location::{display_posix, strip_root, OutputLocation, DEFAULT_ENUM_FILE_NAME},
    templates::{options::default_usings, TemplateKind},
    type_map::TypeRegistry,
};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Configuration for an actiongen run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path (relative to the project root) or `http(s)://` URL of the action schema
    pub schema_path: String,

    /// Path of the generated source document, relative to the project root
    pub output_path: String,

    /// Root the output namespace is derived from
    #[serde(default = "default_project_root")]
    pub project_root: String,

    /// File name of the enumeration document, written next to the source
    #[serde(default = "default_enum_file_name")]
    pub enum_file_name: String,

    /// Template to use for code generation
    #[serde(default = "default_template")]
    pub template_kind: String,

    /// Optional path to template directory
    #[serde(default)]
    pub template_dir: Option<String>,

    /// `using` directives of the source document
    #[serde(default = "default_usings")]
    pub usings: Vec<String>,

    /// C# expression building the shared `JsonSerializer`
    #[serde(default)]
    pub serializer: Option<String>,

    /// Type names accepted in addition to the built-in ones
    #[serde(default)]
    pub extra_types: Vec<String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(schema_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            schema_path: schema_path.into(),
            output_path: output_path.into(),
            project_root: default_project_root(),
            enum_file_name: default_enum_file_name(),
            template_kind: default_template(),
            template_dir: None,
            usings: default_usings(),
            serializer: None,
            extra_types: Vec::new(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Failed to read config at {}: {}", path.display(), e))
        })?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn project_root(&self) -> &Path {
        Path::new(&self.project_root)
    }

    /// The type allow-list for this project
    pub fn registry(&self) -> TypeRegistry {
        TypeRegistry::with_extra_types(&self.extra_types)
    }

    pub fn template_kind(&self) -> Result<TemplateKind> {
        self.template_kind.parse().map_err(Error::config)
    }

    pub fn template_dir(&self) -> Option<PathBuf> {
        self.template_dir.as_ref().map(PathBuf::from)
    }

    /// Derive namespace, class name and output files from `output_path`
    pub fn output_location(&self) -> Result<OutputLocation> {
        OutputLocation::resolve(
            self.project_root(),
            Path::new(&self.output_path),
            &self.enum_file_name,
        )
    }

    /// Where to read the schema from: a URL as given, or a path under the project root
    pub fn schema_location(&self) -> String {
        if self.is_remote_schema() {
            return self.schema_path.clone();
        }
        self.project_root()
            .join(&self.schema_path)
            .to_string_lossy()
            .into_owned()
    }

    /// Schema reference recorded in the generated header
    pub fn schema_display(&self) -> String {
        if self.is_remote_schema() {
            return self.schema_path.clone();
        }
        let path = Path::new(&self.schema_path);
        if !path.is_absolute() {
            return display_posix(path);
        }
        match strip_root(self.project_root(), path) {
            Some(relative) => display_posix(&relative),
            None => path.display().to_string(),
        }
    }

    /// Whether the schema is fetched over HTTP
    pub fn is_remote_schema(&self) -> bool {
        Url::parse(&self.schema_path)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

fn default_project_root() -> String {
    ".".to_string()
}

fn default_enum_file_name() -> String {
    DEFAULT_ENUM_FILE_NAME.to_string()
}

fn default_template() -> String {
    TemplateKind::default().as_str().to_string()
}
