use crate::config::{AppConfig, StoreBackend};
use crate::execution::{ExecutionRequest, ExecutionService};
use crate::generator::{
    write_artifacts, ArtifactKind, GenerationOrchestrator, OpenApiRenderer, PlsqlRenderer,
    PostmanRenderer,
};
use crate::lint::{has_errors, lint_descriptor, print_lint_issues, LintSeverity};
use crate::model::ApiDescriptor;
use crate::store::{ApiRepository, InMemoryApiRepository, SqliteApiRepository};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for apiforge
///
/// Generates PL/SQL packages, OpenAPI documents and Postman collections from
/// API descriptors, and exercises stored APIs.
#[derive(Parser)]
#[command(name = "apiforge")]
#[command(about = "API descriptor code generator", long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or TOML)
    #[arg(short, long, global = true, env = "APIFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate, persist and generate every enabled artifact for a descriptor
    Generate {
        /// Descriptor file (JSON or YAML)
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Output directory (defaults to `generator.output_dir`)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Recorded as the descriptor's creator
        #[arg(long, default_value = "cli")]
        actor: String,
    },
    /// Render one artifact to stdout without persisting the descriptor
    Render {
        /// Descriptor file (JSON or YAML)
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Artifact to render: plsql, openapi or postman
        #[arg(short, long)]
        kind: ArtifactKind,
    },
    /// Render one artifact for an already stored API
    Show {
        /// API code of the stored descriptor
        #[arg(long)]
        code: String,

        /// Artifact to render: plsql, openapi or postman
        #[arg(short, long)]
        kind: ArtifactKind,
    },
    /// Lint a descriptor
    Lint {
        /// Descriptor file (JSON or YAML)
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Run a stored API through validation and the simulated executor
    Execute {
        /// API code of the stored descriptor
        #[arg(long)]
        code: String,

        /// Path or query parameter (`key=value`, repeatable)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Request header (`name=value`, repeatable)
        #[arg(long = "header", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Client identity used for rate limiting
        #[arg(long)]
        client: Option<String>,

        /// Role held by the caller (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Load a descriptor, choosing the format from the file extension
///
/// `.yaml` and `.yml` are read as YAML, everything else as JSON.
pub fn load_descriptor(path: &Path) -> anyhow::Result<ApiDescriptor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor {}", path.display()))?;
    let descriptor = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => ApiDescriptor::from_yaml(&text)
            .with_context(|| format!("Failed to parse YAML descriptor {}", path.display()))?,
        _ => ApiDescriptor::from_json(&text)
            .with_context(|| format!("Failed to parse JSON descriptor {}", path.display()))?,
    };
    Ok(descriptor)
}

/// Open the repository selected by `store.backend`
pub fn open_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn ApiRepository>> {
    let repository: Arc<dyn ApiRepository> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryApiRepository::new()),
        StoreBackend::Sqlite => Arc::new(
            SqliteApiRepository::open(&config.store.path).with_context(|| {
                format!("Failed to open store {}", config.store.path.display())
            })?,
        ),
    };
    Ok(repository)
}

fn orchestrator(
    config: &AppConfig,
) -> anyhow::Result<GenerationOrchestrator<Arc<dyn ApiRepository>>> {
    Ok(GenerationOrchestrator::with_clock(
        open_repository(config)?,
        config.generator.render_options(),
        Arc::new(crate::clock::SystemClock),
        config.cache.artifact_ttl(),
    ))
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if:
/// - A descriptor cannot be read or parsed
/// - Lint finds errors
/// - The store cannot be opened or the API code is already taken
/// - An artifact cannot be rendered or written
/// - An execution request is rejected
pub fn run_cli(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            descriptor,
            out,
            actor,
        } => {
            let descriptor = load_descriptor(&descriptor)?;
            let api_code = descriptor.api_code.clone();
            let result = orchestrator(config)?.generate(descriptor, &actor)?;

            let out_dir = out.unwrap_or_else(|| config.generator.output_dir.clone());
            let written = write_artifacts(&result, &api_code, &out_dir)
                .with_context(|| format!("Failed to write artifacts to {}", out_dir.display()))?;
            for path in &written {
                info!(path = %path.display(), "wrote artifact");
            }
            let summary = serde_json::json!({
                "apiCode": api_code,
                "persistedId": result.persisted_id,
                "metadata": result.metadata,
                "files": written,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::Render { descriptor, kind } => {
            let mut descriptor = load_descriptor(&descriptor)?;
            let issues = lint_descriptor(&descriptor);
            if has_errors(&issues) {
                print_lint_issues(&issues);
                bail!("descriptor {} has lint errors", descriptor.api_code);
            }
            descriptor.sort_by_position();
            let options = config.generator.render_options();
            let text = match kind {
                ArtifactKind::Plsql => PlsqlRenderer::new().render(&descriptor)?,
                ArtifactKind::Openapi => OpenApiRenderer::new(options).try_render(&descriptor)?,
                ArtifactKind::Postman => PostmanRenderer::new(options).try_render(&descriptor)?,
            };
            println!("{text}");
            Ok(())
        }
        Commands::Show { code, kind } => {
            let text = orchestrator(config)?.artifact(&code, kind)?;
            println!("{text}");
            Ok(())
        }
        Commands::Lint {
            descriptor,
            errors_only,
        } => {
            let descriptor = load_descriptor(&descriptor)?;
            let mut issues = lint_descriptor(&descriptor);
            if errors_only {
                issues.retain(|i| i.severity == LintSeverity::Error);
            }
            print_lint_issues(&issues);
            if has_errors(&issues) {
                bail!("descriptor {} has lint errors", descriptor.api_code);
            }
            Ok(())
        }
        Commands::Execute {
            code,
            params,
            headers,
            body,
            client,
            roles,
        } => {
            let mut request = ExecutionRequest::new();
            for (k, v) in &params {
                request = request.with_param(k, v);
            }
            for (k, v) in &headers {
                request = request.with_header(k, v);
            }
            if let Some(body) = body {
                let body = serde_json::from_str(&body).context("Request body is not valid JSON")?;
                request = request.with_body(body);
            }
            if let Some(client) = &client {
                request = request.with_client(client);
            }
            for role in &roles {
                request = request.with_role(role);
            }

            let service = ExecutionService::simulated(open_repository(config)?);
            let response = service
                .execute(&code, &request)
                .map_err(|e| anyhow::anyhow!("{} {}", e.status(), e))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
