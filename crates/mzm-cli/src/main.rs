//! 🚀 mzm-cli: drive the component converters and the pipeline API from a terminal.
//!
//! 🎬 *[narrator voice]* "It all started with a JSON file and a question: what would the API see?"
//!
//! Configs and states are plain JSON objects with the same attribute names the schema
//! declares. `render` shows the request body a config turns into, `apply` creates (or,
//! with `--state`, updates) the component and prints the new state, `refresh` and
//! `destroy` take a state file. `--dry-run` swaps the real API for an in-memory one. 🦆

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use mzm::client::{ApiBackend, HttpPipelineApi, InMemoryPipelineApi};
use mzm::components::{all_definitions, find_definition};
use mzm::resource::{ComponentResource, Outcome};
use mzm::{AttrObject, AttrValue, ComponentDefinition, ComponentKind};
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mzm-cli", about = "Mezmo pipeline components, from plan to API and back")]
struct Cli {
    /// TOML provider config. MZM_* environment variables are read either way.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Talk to an in-memory API instead of Mezmo. Nothing leaves the process.
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every component type.
    Types {
        #[arg(long)]
        kind: Option<ComponentKind>,
    },
    /// Print the full schema of one component type as JSON.
    Schema { kind: ComponentKind, type_name: String },
    /// Validate a config and print the request body it turns into.
    Render {
        kind: ComponentKind,
        type_name: String,
        config: PathBuf,
    },
    /// Create a component, or update it when --state points at its current state.
    Apply {
        kind: ComponentKind,
        type_name: String,
        config: PathBuf,
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Read a component back from the API and print its state.
    Refresh {
        kind: ComponentKind,
        type_name: String,
        state: PathBuf,
    },
    /// Delete a component.
    Destroy {
        kind: ComponentKind,
        type_name: String,
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("💀 error: {}", err);
        let mut looks_like_connection_trouble = false;
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
            let cause_str = cause.to_string();
            if cause_str.contains("error sending request")
                || cause_str.contains("Connection refused")
                || cause_str.contains("connection refused")
                || cause_str.contains("tcp connect error")
                || cause_str.contains("dns error")
            {
                looks_like_connection_trouble = true;
            }
        }
        if looks_like_connection_trouble {
            error!(
                "🔧 hint: the pipeline API isn't reachable. Check [api] endpoint in the config \
                 (or MZM_API__ENDPOINT), or try again with --dry-run to stay offline."
            );
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Types { kind } => {
            print_types(*kind);
            Ok(())
        }
        Command::Schema { kind, type_name } => {
            let definition = definition(*kind, type_name)?;
            println!("{}", serde_json::to_string_pretty(&definition.schema())?);
            Ok(())
        }
        Command::Render { kind, type_name, config } => {
            let definition = definition(*kind, type_name)?;
            let resource = ComponentResource::new(definition, ApiBackend::InMemory(InMemoryPipelineApi::new()));
            let plan = plan(&resource, config)?;
            let component = definition
                .from_model(&plan, None)
                .map_err(anyhow::Error::new)
                .context("💀 The config validated but could not be converted")?;
            println!("{}", serde_json::to_string_pretty(&component)?);
            Ok(())
        }
        Command::Apply {
            kind,
            type_name,
            config,
            state,
        } => {
            let resource = ComponentResource::new(definition(*kind, type_name)?, backend(&cli)?);
            let plan = plan(&resource, config)?;
            let outcome = match state {
                Some(state) => resource.update(&plan, &read_object(state)?).await,
                None => resource.create(&plan).await,
            };
            finish(outcome)
        }
        Command::Refresh { kind, type_name, state } => {
            let resource = ComponentResource::new(definition(*kind, type_name)?, backend(&cli)?);
            let outcome = resource.read(&read_object(state)?).await;
            if outcome.state.is_none() && !outcome.diagnostics.has_error() {
                warn!("🕳️ The component no longer exists");
            }
            finish(outcome)
        }
        Command::Destroy { kind, type_name, state } => {
            let resource = ComponentResource::new(definition(*kind, type_name)?, backend(&cli)?);
            finish(resource.delete(&read_object(state)?).await)
        }
    }
}

fn print_types(kind: Option<ComponentKind>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["resource", "kind", "api type", "description"]);
    for definition in all_definitions() {
        if kind.is_some_and(|kind| kind != definition.kind) {
            continue;
        }
        table.add_row(vec![
            definition.resource_name(),
            definition.kind.to_string(),
            definition.api_type.to_string(),
            definition.description.to_string(),
        ]);
    }
    println!("{table}");
}

fn definition(kind: ComponentKind, type_name: &str) -> Result<ComponentDefinition> {
    find_definition(kind, type_name)
        .with_context(|| format!("💀 There is no {kind} called '{type_name}'. `mzm-cli types --kind {kind}` lists them all."))
}

fn backend(cli: &Cli) -> Result<ApiBackend> {
    if cli.dry_run {
        info!("🧪 Dry run: using the in-memory pipeline API");
        return Ok(ApiBackend::InMemory(InMemoryPipelineApi::new()));
    }
    let config = mzm::app_config::load_config(cli.config.as_deref())?;
    Ok(ApiBackend::Http(HttpPipelineApi::new(&config.api)?))
}

fn plan(resource: &ComponentResource<ApiBackend>, config: &Path) -> Result<AttrObject> {
    let (plan, diagnostics) = resource.plan(&read_object(config)?);
    for diagnostic in diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    if diagnostics.has_error() {
        anyhow::bail!(
            "💀 {} has {} problem(s), see above",
            config.display(),
            diagnostics.errors().count()
        );
    }
    Ok(plan)
}

/// 📥 A JSON object from disk, as an attribute tree.
fn read_object(path: &Path) -> Result<AttrObject> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("💀 Could not read '{}'. Relative paths are relative to the current directory.", path.display()))?;
    let json: Value =
        serde_json::from_str(&text).with_context(|| format!("💀 '{}' is not valid JSON", path.display()))?;
    match AttrValue::from_json(&json) {
        AttrValue::Object(object) => Ok(object),
        _ => anyhow::bail!("💀 '{}' must hold a JSON object", path.display()),
    }
}

/// 📤 Print the outcome's state (if any) to stdout and its diagnostics to stderr.
fn finish(outcome: Outcome) -> Result<()> {
    if let Some(state) = &outcome.state {
        println!("{}", serde_json::to_string_pretty(&AttrValue::Object(state.clone()).to_json())?);
    }
    for diagnostic in outcome.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    if outcome.diagnostics.has_error() {
        return Err(anyhow::Error::new(outcome.diagnostics).context("💀 The operation did not go through"));
    }
    Ok(())
}
