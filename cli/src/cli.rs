use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};
use hupi_lib::Params;

/// Custom styles for CLI help output
fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "hupi")]
#[command(about = "Signed requests to the HuPi payment gateway", long_about = None)]
#[command(version)]
#[command(styles = styles())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short = 'C', long = "config", value_name = "PATH", global = true)]
    pub config: Option<String>,

    // Credential Options
    /// Merchant identifier (overrides the config file)
    #[arg(
        long,
        value_name = "APPID",
        env = "HUPI_APPID",
        global = true,
        help_heading = "Credential Options"
    )]
    pub appid: Option<String>,

    /// Merchant secret (overrides the config file)
    #[arg(
        long,
        value_name = "SECRET",
        env = "HUPI_APPSECRET",
        hide_env_values = true,
        global = true,
        help_heading = "Credential Options"
    )]
    pub appsecret: Option<String>,

    // Gateway Options
    /// Payment endpoint
    #[arg(
        long,
        value_name = "URL",
        env = "HUPI_PAYMENT_URL",
        global = true,
        help_heading = "Gateway Options"
    )]
    pub payment_url: Option<String>,

    /// Order query endpoint
    #[arg(
        long,
        value_name = "URL",
        env = "HUPI_QUERY_URL",
        global = true,
        help_heading = "Gateway Options"
    )]
    pub query_url: Option<String>,

    /// Maximum time in seconds for a gateway request
    #[arg(
        short = 'm',
        long = "max-time",
        value_name = "SECONDS",
        global = true,
        help_heading = "Gateway Options"
    )]
    pub max_time: Option<u64>,

    // Display Options
    /// Verbosity level (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count, global = true, help_heading = "Display Options")]
    pub verbosity: u8,

    /// Do not print log messages
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help_heading = "Display Options"
    )]
    pub quiet: bool,

    /// Output format
    #[arg(
        short = 'o',
        long = "output-format",
        value_name = "FORMAT",
        default_value = "text",
        global = true,
        help_heading = "Display Options"
    )]
    pub output_format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the request digest offline
    #[command(visible_alias = "s")]
    Sign {
        /// Request fields as KEY=VALUE
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Also fill in time/nonce_str with this Unix timestamp, as a real request would
        #[arg(long, value_name = "UNIX_SECONDS")]
        timestamp: Option<u64>,
    },

    /// Create a payment
    #[command(visible_alias = "p")]
    Pay {
        /// Request fields as KEY=VALUE (e.g. version=1.1 trade_order_id=42 total_fee=0.1 title=Coffee)
        #[arg(value_name = "KEY=VALUE", required = true)]
        params: Vec<String>,
    },

    /// Query an order by merchant order number
    #[command(visible_alias = "q")]
    Query {
        /// Merchant-side order number (out_trade_order)
        #[arg(value_name = "ORDER")]
        order: String,
    },

    /// Show or manage configuration
    #[command(visible_alias = "c")]
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (secret redacted)
    Show,

    /// Write credentials from --appid/--appsecret to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Check the configuration without contacting the gateway
    Validate,
}

impl Cli {
    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbosity >= 1
    }

    /// Check if output should be shown (not quiet)
    pub fn should_show_output(&self) -> bool {
        !self.quiet
    }
}

/// Parse `KEY=VALUE` arguments into request parameters.
///
/// Only the first `=` separates key from value; values may be empty. Keys
/// are signed byte for byte, so surrounding whitespace is rejected rather
/// than trimmed.
pub fn parse_params(args: &[String]) -> Result<Params, String> {
    let mut params = Params::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Invalid parameter '{arg}'. Expected KEY=VALUE"))?;

        if key.is_empty() {
            return Err(format!("Invalid parameter '{arg}'. Key cannot be empty"));
        }
        if key.trim() != key {
            return Err(format!(
                "Invalid parameter '{arg}'. Key has leading or trailing whitespace"
            ));
        }

        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}
