use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use vyos_zones::module::{execute, ModuleParams};
use vyos_zones::report::{render_result, render_tree};
use vyos_zones::settings::{default_settings, load_settings, OutputFormat, Settings};
use vyos_zones::transport::SnapshotTransport;
use zone_policy_core::{format_facts_json, gather, want_from_json, want_from_toml, Facts, Zone};

mod cli;
mod path_guard;

use cli::{Cli, Command, FactsArgs, ReconcileArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Reconcile(args) => run_reconcile(args),
        Command::Facts(args) => run_facts(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_reconcile(args: ReconcileArgs) -> Result<()> {
    let settings = resolve_settings(args.settings.as_deref());
    let state = args.state.unwrap_or(settings.reconcile.state);
    let check_mode = args.check || settings.reconcile.check_mode;
    let format = args.format.unwrap_or(settings.output.format);
    if !settings.output.color {
        colored::control::set_override(false);
    }

    let config = args.config.as_deref().map(load_want).transpose()?;
    let running_config = args
        .running_config
        .as_deref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read running config {}", path.display()))
        })
        .transpose()?;

    if let Some(output) = &args.output {
        let inputs: Vec<&Path> = [&args.config, &args.running_config, &args.device]
            .into_iter()
            .filter_map(|path| path.as_deref())
            .collect();
        path_guard::ensure_distinct_output(output, &inputs)?;
    }

    let mut transport = SnapshotTransport::new(args.device.clone(), args.output.clone());
    let params = ModuleParams {
        config,
        running_config,
        state,
        check_mode,
    };
    let result = execute(params, &mut transport)
        .with_context(|| format!("{state} run failed"))?;

    match format {
        OutputFormat::Text => println!("{}", render_result(state, &result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    if !result.failures.is_empty() {
        bail!("{} change(s) could not be rendered", result.failures.len());
    }
    Ok(())
}

fn run_facts(args: FactsArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let zones = gather(&text);

    match args.format {
        OutputFormat::Text => println!("{}", render_tree(&zones)),
        OutputFormat::Json => println!("{}", format_facts_json(&Facts::new(zones))),
    }
    Ok(())
}

fn resolve_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path else {
        return default_settings();
    };
    match load_settings(path) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("{err}; falling back to built-in settings");
            default_settings()
        }
    }
}

fn load_want(path: &Path) -> Result<Vec<Zone>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read want document {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let zones = if is_toml {
        want_from_toml(&text)
    } else {
        want_from_json(&text)
    };
    zones.with_context(|| format!("invalid want document {}", path.display()))
}
