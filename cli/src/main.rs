//! hupi CLI - signed requests to the HuPi payment gateway

mod cli;
mod config_utils;
mod errors;
mod exit_codes;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{parse_params, Cli, Commands, ConfigCommands};
use exit_codes::{ExitCode, InvalidUsage};
use hupi_lib::constants::HASH_FIELD;
use hupi_lib::signer::canonical_string;
use hupi_lib::{Config, HupiClient};
use tracing_subscriber::EnvFilter;

use config_utils::{apply_overrides, load_config, load_credentials, load_file_config};
use output::{format_config, format_signature, handle_response};

fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("{}", errors::format_error_with_suggestion(&e));
        ExitCode::from(&e).exit();
    }
}

/// Route `tracing` output to stderr at a level chosen by `-v`/`-q`.
///
/// `RUST_LOG` takes precedence when set.
fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "off"
    } else {
        match cli.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hupi={level},hupi_lib={level}")));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
    {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Sign { params, timestamp } => sign_command(cli, params, *timestamp),
        Commands::Pay { params } => pay_command(cli, params),
        Commands::Query { order } => query_command(cli, order),
        Commands::Config { command } => match command {
            None | Some(ConfigCommands::Show) => show_config(cli),
            Some(ConfigCommands::Init { force }) => init_config(cli, *force),
            Some(ConfigCommands::Validate) => validate_config(cli),
        },
    }
}

fn sign_command(cli: &Cli, args: &[String], timestamp: Option<u64>) -> Result<()> {
    let config = load_credentials(cli)?;
    let client = HupiClient::with_credentials(config.credentials());
    let mut params = parse_params(args).map_err(InvalidUsage)?;

    // Canonical string of exactly the set that was digested
    let (hash, canonical) = match timestamp {
        Some(timestamp) => {
            let supplied_hash = params.get(HASH_FIELD).cloned();
            let hash = client.assemble(&mut params, timestamp);

            let mut signed = params.clone();
            match supplied_hash {
                Some(supplied) => signed.insert(HASH_FIELD.to_string(), supplied),
                None => signed.remove(HASH_FIELD),
            };
            (hash, canonical_string(&signed))
        }
        None => {
            let hash = client.sign(&mut params);
            (hash, canonical_string(&params))
        }
    };

    if cli.is_verbose() && cli.should_show_output() {
        eprintln!("Canonical string: {canonical}");
    }

    println!(
        "{}",
        format_signature(&hash, &canonical, &params, cli.output_format)?
    );
    Ok(())
}

fn pay_command(cli: &Cli, args: &[String]) -> Result<()> {
    let params = parse_params(args).map_err(InvalidUsage)?;
    let client = build_client(cli)?;

    let response = client.pay(params).context("Payment request failed")?;
    handle_response(cli, response)
}

fn query_command(cli: &Cli, order: &str) -> Result<()> {
    let client = build_client(cli)?;

    let response = client.query(order).context("Order query failed")?;
    handle_response(cli, response)
}

/// Client from the effective config; `-vv` echoes every raw gateway answer.
fn build_client(cli: &Cli) -> Result<HupiClient> {
    let config = load_config(cli)?;
    let client = HupiClient::from_config(&config)?;
    tracing::info!(
        payment_url = config.payment_url(),
        query_url = config.query_url(),
        timeout = config.timeout(),
        "using gateway"
    );

    if cli.verbosity >= 2 && cli.should_show_output() {
        Ok(client.with_observer(|url: &str, body: &[u8]| {
            eprintln!("< {url}\n< {}", String::from_utf8_lossy(body));
        }))
    } else {
        Ok(client)
    }
}

fn config_source(cli: &Cli) -> Result<String> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::default_config_path()?.display().to_string()),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let mut config = load_file_config(cli)?;
    apply_overrides(&mut config, cli);

    println!(
        "{}",
        format_config(&config, &config_source(cli)?, cli.output_format)?
    );
    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = match &cli.config {
        Some(path) => std::path::PathBuf::from(path),
        None => Config::default_config_path()?,
    };

    if path.exists() && !force {
        return Err(InvalidUsage(format!(
            "Config file already exists at {}. Use --force to overwrite it.",
            path.display()
        ))
        .into());
    }

    let mut config = Config::default();
    apply_overrides(&mut config, cli);
    config
        .save_to(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    if cli.should_show_output() {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn validate_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    if cli.should_show_output() {
        println!("Configuration OK (app_id {})", config.app_id);
    }
    Ok(())
}
