//! Template system for code generation

// Internal imports (std, crate)
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    builders::ActionContext,
    error::{Error, Result},
    location::OutputLocation,
    manifest::TemplateManifest,
    schema::{ActionSchema, EMPTY_ACTION},
};

use super::{TemplateDir, TemplateKind, TemplateOptions};

// External imports (alphabetized)
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tera::{Context, Tera};

/// Built-in C# template set
const EMBEDDED_CSHARP: &[(&str, &str)] = &[
    (
        "manifest.yaml",
        include_str!("../../templates/csharp/manifest.yaml"),
    ),
    (
        "actions.cs.tera",
        include_str!("../../templates/csharp/actions.cs.tera"),
    ),
    (
        "action.cs.tera",
        include_str!("../../templates/csharp/action.cs.tera"),
    ),
    (
        "action_type.cs.tera",
        include_str!("../../templates/csharp/action_type.cs.tera"),
    ),
];

/// One action rendered through the action template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedAction {
    /// Nested class name, also the enum member
    pub name: String,
    /// The nested class block, without trailing whitespace
    pub block: String,
}

/// Where a template set was loaded from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Embedded(TemplateKind),
    Directory(TemplateDir),
}

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    /// Where the templates came from
    source: TemplateSource,
    /// The template manifest
    manifest: TemplateManifest,
}

impl TemplateManager {
    /// Create a new TemplateManager for the given template kind and directory
    ///
    /// # Arguments
    /// * `template_kind` - The kind of template to use
    /// * `template_dir` - Optional template directory. Embedded kinds use their
    ///   built-in templates when this is `None`.
    pub async fn new(template_kind: TemplateKind, template_dir: Option<PathBuf>) -> Result<Self> {
        match template_dir {
            None if template_kind.is_embedded() => Self::embedded(template_kind),
            dir => {
                let template_dir = TemplateDir::discover(template_kind, dir.as_deref())?;
                Self::from_dir(template_dir).await
            }
        }
    }

    /// Load a built-in template set
    pub fn embedded(template_kind: TemplateKind) -> Result<Self> {
        let files = match template_kind {
            TemplateKind::CSharp => EMBEDDED_CSHARP,
            TemplateKind::Custom => {
                return Err(Error::template(
                    "Custom templates need a template directory",
                ))
            }
        };
        let lookup = |name: &str| {
            files
                .iter()
                .find(|(file, _)| *file == name)
                .map(|(_, content)| *content)
                .ok_or_else(|| Error::template(format!("Built-in template '{name}' is missing")))
        };

        let manifest = TemplateManifest::from_yaml(lookup("manifest.yaml")?)?;
        let mut tera = Tera::default();
        let mut templates = Vec::new();
        for (_, file) in manifest.templates.iter() {
            templates.push((file, lookup(file)?));
        }
        tera.add_raw_templates(templates)?;

        Self::assemble(tera, TemplateSource::Embedded(template_kind), manifest)
    }

    /// Load a template set from a directory
    pub async fn from_dir(template_dir: TemplateDir) -> Result<Self> {
        let template_path = template_dir.template_path();
        let manifest = TemplateManifest::load_from_dir(template_path).await?;

        let mut files = Vec::new();
        for (role, file) in manifest.templates.iter() {
            let path = template_path.join(file);
            if !path.is_file() {
                return Err(Error::template(format!(
                    "Template '{}' for {} not found in {}",
                    file,
                    role,
                    template_path.display()
                )));
            }
            files.push((path, Some(file.to_string())));
        }

        let mut tera = Tera::default();
        tera.add_template_files(files)?;

        Self::assemble(tera, TemplateSource::Directory(template_dir), manifest)
    }

    fn assemble(mut tera: Tera, source: TemplateSource, manifest: TemplateManifest) -> Result<Self> {
        // Generated code is not HTML
        tera.autoescape_on(vec![]);
        // Fail early on a language we cannot build contexts for
        ActionContext::get_builder(&manifest.language)?;
        log::debug!(
            "Loaded template set '{}' ({}) for language {}",
            manifest.name,
            manifest.version,
            manifest.language
        );
        Ok(Self {
            tera: Arc::new(tera),
            source,
            manifest,
        })
    }

    /// Get the template kind this template manager is configured for
    pub fn template_kind(&self) -> TemplateKind {
        match &self.source {
            TemplateSource::Embedded(kind) => *kind,
            TemplateSource::Directory(dir) => dir.kind(),
        }
    }

    /// Where the templates were loaded from
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Template directory path, if the templates were loaded from disk
    pub fn template_dir_path(&self) -> Option<&Path> {
        match &self.source {
            TemplateSource::Embedded(_) => None,
            TemplateSource::Directory(dir) => Some(dir.template_path()),
        }
    }

    /// Get a reference to the template manifest
    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Render every action of the schema, in schema order
    pub fn render_actions(&self, schema: &ActionSchema) -> Result<Vec<RenderedAction>> {
        let contexts = ActionContext::transform_actions(&self.manifest.language, schema)?;
        let template = &self.manifest.templates.action;

        contexts
            .into_iter()
            .zip(&schema.actions)
            .map(|(mut context, action)| {
                if let JsonValue::Object(map) = &mut context {
                    map.insert("empty_type".to_string(), json!(EMPTY_ACTION));
                }
                log::debug!("Rendering action '{}'", action.name);
                let block = self.render(template, &context)?;
                Ok(RenderedAction {
                    name: action.type_name(),
                    block: block.trim_end().to_string(),
                })
            })
            .collect()
    }

    /// Assemble the source document around the rendered actions
    pub fn render_source_document(
        &self,
        actions: &[RenderedAction],
        location: &OutputLocation,
        schema_path: &str,
        options: &TemplateOptions,
    ) -> Result<String> {
        let context = json!({
            "namespace": location.namespace,
            "class_name": location.class_name,
            "schema_path": schema_path,
            "usings": options.usings,
            "serializer": options.serializer_expr(),
            "empty_type": EMPTY_ACTION,
            "actions": actions,
        });
        self.render_document(&self.manifest.templates.source, &context)
    }

    /// Assemble the enumeration document, one member per action
    pub fn render_enum_document(
        &self,
        schema: &ActionSchema,
        location: &OutputLocation,
    ) -> Result<String> {
        let members: Vec<String> = schema.actions.iter().map(|a| a.type_name()).collect();
        let context = json!({
            "namespace": location.namespace,
            "enum_name": location.enum_name,
            "members": members,
        });
        self.render_document(&self.manifest.templates.enumeration, &context)
    }

    fn render_document(&self, template: &str, context: &JsonValue) -> Result<String> {
        let mut content = self.render(template, context)?.trim().to_string();
        content.push('\n');
        Ok(content)
    }

    /// Render a template with a JSON object context
    fn render(&self, template_name: &str, context: &JsonValue) -> Result<String> {
        let context_map = context
            .as_object()
            .ok_or_else(|| Error::template("Context must be a JSON object"))?;

        let mut tera_context = Context::new();
        for (k, v) in context_map {
            tera_context.insert(k, v);
        }

        self.tera.render(template_name, &tera_context).map_err(|e| {
            log::error!("Template rendering failed for '{}': {}", template_name, e);
            log::error!(
                "Available context keys: {:?}",
                context_map.keys().collect::<Vec<_>>()
            );
            Error::template(format!(
                "Failed to render template '{}': {}",
                template_name,
                error_chain(&e)
            ))
        })
    }
}

/// Flatten an error and its sources into one line
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
