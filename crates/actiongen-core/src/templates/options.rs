//! Render options for the generated source document.
//!
//! [`TemplateOptions`] holds the parts of the output that are fixed boilerplate
//! in every action but still vary between projects: which namespaces the
//! source imports and how the shared `JsonSerializer` is built.
//!
//! # Example
//!
//! ```rust
//! use actiongen_core::templates::TemplateOptions;
//!
//! let options = TemplateOptions {
//!     serializer: Some("JsonSerializer.Create(WebJsonConverter.Settings)".to_string()),
//!     ..Default::default()
//! };
//! assert_eq!(options.serializer_expr(), "JsonSerializer.Create(WebJsonConverter.Settings)");
//! assert!(options.usings.iter().any(|u| u == "Newtonsoft.Json.Linq"));
//! ```

/// Serializer expression used when none is configured
pub const DEFAULT_SERIALIZER: &str = "JsonSerializer.CreateDefault()";

/// Namespaces imported by default
pub fn default_usings() -> Vec<String> {
    vec![
        "Newtonsoft.Json".to_string(),
        "Newtonsoft.Json.Linq".to_string(),
    ]
}

/// Project-level knobs for the generated source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    /// `using` directives, emitted in this order
    pub usings: Vec<String>,

    /// Expression initializing the shared serializer
    pub serializer: Option<String>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            usings: default_usings(),
            serializer: None,
        }
    }
}

impl TemplateOptions {
    pub fn serializer_expr(&self) -> &str {
        self.serializer.as_deref().unwrap_or(DEFAULT_SERIALIZER)
    }
}

impl From<&crate::Config> for TemplateOptions {
    fn from(config: &crate::Config) -> Self {
        Self {
            usings: config.usings.clone(),
            serializer: config.serializer.clone(),
        }
    }
}
