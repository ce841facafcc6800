//! actiongen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use actiongen_core::{
    AlwaysConfirm, Config, Error, GeneratedDocument, GenerationReport, WriteGate,
};
use anyhow::Context;
use clap::Parser;
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "actiongen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate the action source and enumeration files from an action schema
    Generate {
        #[command(flatten)]
        source: SourceArgs,
        /// Write every file without showing a preview or asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Fail when the generated files do not match the schema
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Regenerate whenever the schema file changes
    Watch {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where the schema comes from and where the output goes
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// YAML config file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path or URL to the action schema (YAML or JSON)
    ///
    /// Example: --schema Daemon/actions_meta.yml
    /// Example: --schema https://example.com/actions_meta.yml
    #[arg(long)]
    schema: Option<String>,
    /// Source file to generate, relative to the project root
    ///
    /// The parent directories become the namespace and the file name the class.
    /// Example: --out Daemon/Action/ActionTemplate.cs
    #[arg(long)]
    out: Option<String>,
    /// Project root the output path is relative to (default: .)
    #[arg(long)]
    project_root: Option<String>,
    /// File name of the enumeration written next to the source (default: ActionType.cs)
    #[arg(long)]
    enum_file: Option<String>,
    /// Template to use for code generation (csharp, custom)
    #[arg(long)]
    template_kind: Option<String>,
    /// Custom template directory
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// Additional type name accepted in the schema (repeatable)
    #[arg(long = "extra-type")]
    extra_types: Vec<String>,
}

impl SourceArgs {
    /// Build the run configuration from the config file and flags
    async fn resolve(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => {
                let schema = self
                    .schema
                    .clone()
                    .context("--schema is required when no --config is given")?;
                let out = self
                    .out
                    .clone()
                    .context("--out is required when no --config is given")?;
                Config::new(schema, out)
            }
        };

        if let Some(schema) = &self.schema {
            config.schema_path = schema.clone();
        }
        if let Some(out) = &self.out {
            config.output_path = out.clone();
        }
        if let Some(root) = &self.project_root {
            config.project_root = root.clone();
        }
        if let Some(enum_file) = &self.enum_file {
            config.enum_file_name = enum_file.clone();
        }
        if let Some(kind) = &self.template_kind {
            config.template_kind = kind.clone();
        }
        if let Some(dir) = &self.template_dir {
            config.template_dir = Some(dir.to_string_lossy().into_owned());
        }
        config.extra_types.extend(self.extra_types.iter().cloned());

        Ok(config)
    }
}

/// Shows each document and asks before writing it
struct PromptGate;

impl WriteGate for PromptGate {
    fn confirm(
        &mut self,
        document: &GeneratedDocument,
        target: &Path,
    ) -> actiongen_core::Result<bool> {
        println!("{}", document.content);
        let question = format!("Write {} to {}?", document.kind, target.display());
        let answer = dialoguer::Confirm::new()
            .with_prompt(question)
            .default(true)
            .interact_opt()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        // Escape counts as "no"
        Ok(answer.unwrap_or(false))
    }
}

fn init_tracing(verbose: u8) {
    let base_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| match verbose {
        0 => "info".to_string(),
        _ => "debug".to_string(),
    });
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose > 0)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn summarize(report: &GenerationReport) {
    for document in &report.documents {
        if document.written {
            println!("✅ Wrote {}", document.target.display());
        } else {
            println!("Skipped {}", document.target.display());
        }
    }
}

async fn run_watch(config: Config) -> anyhow::Result<()> {
    if config.is_remote_schema() {
        anyhow::bail!("watch needs a local schema file, got {}", config.schema_path);
    }
    let schema_path = PathBuf::from(config.schema_location());

    match actiongen_core::generate(&config, &mut AlwaysConfirm).await {
        Ok(report) => summarize(&report),
        Err(e) => tracing::error!("Generation failed: {e}"),
    }

    // Editors often replace the file, so watch its directory
    let watch_dir = match schema_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let schema_name = schema_path.file_name().map(|name| name.to_os_string());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })
    .context("Failed to start file watcher")?;
    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", watch_dir.display()))?;
    tracing::info!("Watching {} (Ctrl-C to stop)", schema_path.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Watch error: {e}");
                        continue;
                    }
                };
                let touches_schema = event
                    .paths
                    .iter()
                    .any(|path| path.file_name().map(|n| n.to_os_string()) == schema_name);
                if !touches_schema || !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    continue;
                }
                tracing::info!("Schema changed, regenerating");
                match actiongen_core::generate(&config, &mut AlwaysConfirm).await {
                    Ok(report) => summarize(&report),
                    Err(e) => tracing::error!("Generation failed: {e}"),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate { source, yes } => {
            let config = source.resolve().await?;
            tracing::debug!("Generating with {:?}", config);
            let report = if *yes {
                actiongen_core::generate(&config, &mut AlwaysConfirm).await
            } else {
                actiongen_core::generate(&config, &mut PromptGate).await
            }
            .context("Generation failed")?;
            summarize(&report);
        }
        Commands::Check { source } => {
            let config = source.resolve().await?;
            let stale = actiongen_core::check(&config)
                .await
                .context("Check failed")?;
            if !stale.is_empty() {
                for document in &stale {
                    println!("{document}");
                }
                anyhow::bail!("{} generated file(s) are out of date", stale.len());
            }
            println!("✅ Generated files are up to date");
        }
        Commands::Watch { source } => {
            let config = source.resolve().await?;
            run_watch(config).await?;
        }
    }
    Ok(())
}
