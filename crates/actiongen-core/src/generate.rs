//! Code generation functionality for actiongen
//!
//! Rendering is pure and happens entirely in memory. Only once both documents
//! exist does the driver ask the [`WriteGate`] about each one and persist it.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    config::Config,
    error::{Error, Result},
    location::{display_posix, OutputLocation},
    schema::ActionSchema,
    templates::{TemplateManager, TemplateOptions},
};

use tokio::fs;

/// Which of the two artifacts a document is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Source,
    Enumeration,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Enumeration => "enumeration",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    /// Path relative to the project root
    pub path: PathBuf,
    pub content: String,
}

/// Both documents of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocuments {
    pub source: GeneratedDocument,
    pub enumeration: GeneratedDocument,
}

impl GeneratedDocuments {
    /// Source first, then the enumeration
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedDocument> {
        [&self.source, &self.enumeration].into_iter()
    }
}

/// Decides whether a rendered document may be written to `target`
pub trait WriteGate {
    fn confirm(&mut self, document: &GeneratedDocument, target: &Path) -> Result<bool>;
}

/// Gate that approves every write
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl WriteGate for AlwaysConfirm {
    fn confirm(&mut self, _document: &GeneratedDocument, _target: &Path) -> Result<bool> {
        Ok(true)
    }
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub kind: DocumentKind,
    pub target: PathBuf,
    pub written: bool,
}

/// Result of a [`generate`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub documents: Vec<DocumentOutcome>,
}

impl GenerationReport {
    pub fn written(&self) -> usize {
        self.documents.iter().filter(|d| d.written).count()
    }

    pub fn declined(&self) -> usize {
        self.documents.len() - self.written()
    }
}

/// Why a file on disk no longer matches the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Missing,
    Outdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleDocument {
    pub kind: DocumentKind,
    pub target: PathBuf,
    pub staleness: Staleness,
}

impl fmt::Display for StaleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.staleness {
            Staleness::Missing => "missing",
            Staleness::Outdated => "out of date",
        };
        write!(f, "{} ({}): {}", self.target.display(), self.kind, reason)
    }
}

/// Render both documents for a validated schema
///
/// Nothing here touches the filesystem, so the same inputs always give the
/// same bytes.
pub fn render_documents(
    schema: &ActionSchema,
    location: &OutputLocation,
    templates: &TemplateManager,
    options: &TemplateOptions,
    schema_display: &str,
) -> Result<GeneratedDocuments> {
    if let Some(action) = schema
        .actions
        .iter()
        .find(|action| action.type_name() == location.class_name)
    {
        return Err(Error::schema(format!(
            "action `{}` has the same name as the generated class `{}`",
            action.name, location.class_name
        )));
    }

    let actions = templates.render_actions(schema)?;
    let source = templates.render_source_document(&actions, location, schema_display, options)?;
    let enumeration = templates.render_enum_document(schema, location)?;

    Ok(GeneratedDocuments {
        source: GeneratedDocument {
            kind: DocumentKind::Source,
            path: location.source_path.clone(),
            content: source,
        },
        enumeration: GeneratedDocument {
            kind: DocumentKind::Enumeration,
            path: location.enum_path.clone(),
            content: enumeration,
        },
    })
}

/// Load the schema and templates named by `config` and render both documents
pub async fn render_from_config(config: &Config) -> Result<GeneratedDocuments> {
    // 1. Resolve where the output goes before doing any work
    let location = config.output_location()?;

    // 2. Load and validate the schema
    let schema = ActionSchema::from_file_or_url(config.schema_location(), &config.registry()).await?;
    log::debug!(
        "Loaded {} action(s) from {}",
        schema.len(),
        config.schema_display()
    );

    // 3. Initialize template manager with template_dir from config if available
    let templates = TemplateManager::new(config.template_kind()?, config.template_dir()).await?;

    // 4. Render
    render_documents(
        &schema,
        &location,
        &templates,
        &TemplateOptions::from(config),
        &config.schema_display(),
    )
}

/// Main entry point for code generation
///
/// Every document is rendered before `gate` is consulted, so a schema error
/// leaves the output files untouched.
pub async fn generate<G: WriteGate + ?Sized>(
    config: &Config,
    gate: &mut G,
) -> Result<GenerationReport> {
    let documents = render_from_config(config).await?;
    let root = config.project_root();

    let mut report = GenerationReport::default();
    for document in documents.iter() {
        let target = root.join(&document.path);
        let written = if gate.confirm(document, &target)? {
            write_document(&target, &document.content).await?;
            log::info!("Wrote {} to {}", document.kind, target.display());
            true
        } else {
            log::warn!("Skipped writing {}", display_posix(&document.path));
            false
        };
        report.documents.push(DocumentOutcome {
            kind: document.kind,
            target,
            written,
        });
    }
    Ok(report)
}

/// List the generated files that differ from what `config` would produce now
pub async fn check(config: &Config) -> Result<Vec<StaleDocument>> {
    let documents = render_from_config(config).await?;
    let root = config.project_root();

    let mut stale = Vec::new();
    for document in documents.iter() {
        let target = root.join(&document.path);
        let staleness = match fs::read_to_string(&target).await {
            Ok(existing) if existing == document.content => continue,
            Ok(_) => Staleness::Outdated,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Staleness::Missing,
            Err(e) => return Err(e.into()),
        };
        log::debug!("{} is stale", target.display());
        stale.push(StaleDocument {
            kind: document.kind,
            target,
            staleness,
        });
    }
    Ok(stale)
}

async fn write_document(target: &Path, content: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(target, content).await?;
    Ok(())
}
