//! CLI subcommands — init, validate, build, apply, history.

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::manifest::{self, FlowManifest};
use crate::history::{self, DeployEvent};
use crate::platform::http::HttpOrchestrator;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new flow project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate flow.yaml without building anything
    Validate {
        /// Path to flow.yaml
        #[arg(short, long, default_value = "flow.yaml")]
        file: PathBuf,
    },

    /// Compose the deployment specification and print it
    Build {
        /// Path to flow.yaml
        #[arg(short, long, default_value = "flow.yaml")]
        file: PathBuf,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Compose and submit the deployment to the orchestration platform
    Apply {
        /// Path to flow.yaml
        #[arg(short, long, default_value = "flow.yaml")]
        file: PathBuf,

        /// Platform base URL
        #[arg(long)]
        url: Option<String>,

        /// Bearer token for the platform
        #[arg(long)]
        token: Option<String>,

        /// Compose and print without submitting
        #[arg(long)]
        dry_run: bool,

        /// State directory for the apply history
        #[arg(long, default_value = "state")]
        state_dir: PathBuf,
    },

    /// Show past apply events from the history log
    History {
        /// State directory
        #[arg(long, default_value = "state")]
        state_dir: PathBuf,

        /// Show a single flow
        #[arg(short, long)]
        flow: Option<String>,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Build { file, json } => cmd_build(&file, json),
        Commands::Apply {
            file,
            url,
            token,
            dry_run,
            state_dir,
        } => cmd_apply(&file, url.as_deref(), token.as_deref(), dry_run, &state_dir),
        Commands::History { state_dir, flow } => cmd_history(&state_dir, flow.as_deref()),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let manifest_path = path.join("flow.yaml");
    if manifest_path.exists() {
        return Err(format!("{} already exists", manifest_path.display()));
    }

    let state_dir = path.join("state");
    std::fs::create_dir_all(&state_dir).map_err(|e| format!("cannot create state dir: {}", e))?;

    let template = r#"version: "1.0"

flow:
  name: my_flow
  entrypoint: my_crate::flows::my_flow
  description: "Managed by lanzar"
  parameters: []

annotations:
  - kind: metadata
    options:
      environment: dev
"#;
    std::fs::write(&manifest_path, template)
        .map_err(|e| format!("cannot write {}: {}", manifest_path.display(), e))?;

    println!("Initialized lanzar project at {}", path.display());
    println!("  Created: {}", manifest_path.display());
    println!("  Created: {}/", state_dir.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let manifest = manifest::parse_manifest_file(file).map_err(|e| e.to_string())?;
    let errors = manifest::validate_manifest(&manifest);

    if errors.is_empty() {
        println!(
            "OK: {} ({} annotations)",
            manifest.flow.name,
            manifest.annotations.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_build(file: &Path, json: bool) -> Result<(), String> {
    let manifest = parse_and_validate(file)?;
    let spec = build_spec(&manifest)?;
    let fingerprint = spec.fingerprint().map_err(|e| e.to_string())?;

    if json {
        let payload = spec.payload().map_err(|e| e.to_string())?;
        let pretty =
            serde_json::to_string_pretty(&payload).map_err(|e| format!("JSON error: {}", e))?;
        println!("{}", pretty);
    } else {
        let yaml = spec.to_yaml().map_err(|e| e.to_string())?;
        print!("{}", yaml);
    }
    println!();
    println!("Fingerprint: {}", fingerprint);
    Ok(())
}

fn cmd_apply(
    file: &Path,
    url: Option<&str>,
    token: Option<&str>,
    dry_run: bool,
    state_dir: &Path,
) -> Result<(), String> {
    let manifest = parse_and_validate(file)?;
    let spec = build_spec(&manifest)?;
    let fingerprint = spec.fingerprint().map_err(|e| e.to_string())?;

    if dry_run {
        let yaml = spec.to_yaml().map_err(|e| e.to_string())?;
        print!("{}", yaml);
        println!();
        println!("Fingerprint: {}", fingerprint);
        println!("Dry run: nothing submitted.");
        return Ok(());
    }

    let url = url.ok_or_else(|| "apply requires --url (or use --dry-run)".to_string())?;
    let mut api = HttpOrchestrator::new(url);
    if let Some(token) = token {
        api = api.with_token(token);
    }

    let run_id = history::generate_run_id();
    history::append_event(
        state_dir,
        &spec.name,
        DeployEvent::ApplyStarted {
            flow: spec.name.clone(),
            run_id: run_id.clone(),
            lanzar_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )?;

    let start = Instant::now();
    match spec.apply(&api) {
        Ok(receipt) => {
            history::append_event(
                state_dir,
                &spec.name,
                DeployEvent::ApplyCompleted {
                    flow: spec.name.clone(),
                    run_id,
                    deployment_id: receipt.deployment_id.clone(),
                    fingerprint,
                    duration_seconds: start.elapsed().as_secs_f64(),
                },
            )?;
            println!(
                "Applied {}: deployment {} ({:.1}s)",
                spec.name,
                receipt.deployment_id,
                start.elapsed().as_secs_f64()
            );
            if let Some(url) = &receipt.url {
                println!("  {}", url);
            }
            Ok(())
        }
        Err(e) => {
            history::append_event(
                state_dir,
                &spec.name,
                DeployEvent::ApplyFailed {
                    flow: spec.name.clone(),
                    run_id,
                    error: e.to_string(),
                },
            )?;
            Err(e.to_string())
        }
    }
}

fn cmd_history(state_dir: &Path, flow_filter: Option<&str>) -> Result<(), String> {
    let entries = std::fs::read_dir(state_dir)
        .map_err(|e| format!("cannot read state dir {}: {}", state_dir.display(), e))?;

    let mut found = false;

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(filter) = flow_filter {
            if name != filter {
                continue;
            }
        }
        if !entry.path().is_dir() {
            continue;
        }

        let events = history::read_events(state_dir, &name)?;
        if events.is_empty() {
            continue;
        }
        found = true;

        println!("Flow: {} ({} events)", name, events.len());
        for event in &events {
            println!("  {} {}", event.ts, describe_event(&event.event));
        }
    }

    if !found {
        println!("No apply history.");
    }
    Ok(())
}

/// One-line human rendering of a history event.
fn describe_event(event: &DeployEvent) -> String {
    match event {
        DeployEvent::ApplyStarted { run_id, .. } => format!("apply started ({})", run_id),
        DeployEvent::ApplyCompleted {
            run_id,
            deployment_id,
            duration_seconds,
            ..
        } => format!(
            "apply completed ({}) deployment {} in {:.1}s",
            run_id, deployment_id, duration_seconds
        ),
        DeployEvent::ApplyFailed { run_id, error, .. } => {
            format!("apply FAILED ({}): {}", run_id, error)
        }
    }
}

/// Parse and validate a flow manifest, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<FlowManifest, String> {
    let manifest = manifest::parse_manifest_file(file).map_err(|e| e.to_string())?;
    let errors = manifest::validate_manifest(&manifest);
    if errors.is_empty() {
        return Ok(manifest);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

/// Compose the manifest into a specification.
fn build_spec(manifest: &FlowManifest) -> Result<crate::core::types::DeploymentSpec, String> {
    let handle = manifest::into_handle(manifest).map_err(|e| e.to_string())?;
    handle.build_deployment().map_err(|e| e.to_string())
}
