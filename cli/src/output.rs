//! Output formatting and display utilities for the CLI

use anyhow::Result;
use hupi_lib::{Config, Params, Response};
use serde_json::json;
use std::collections::BTreeMap;

use crate::cli::{Cli, OutputFormat};

/// The gateway decoded fine but reported a business error.
#[derive(Debug, thiserror::Error)]
#[error("Gateway returned errcode {errcode}: {errmsg}")]
pub struct GatewayRejected {
    pub errcode: i64,
    pub errmsg: String,
}

/// Print a gateway response, then turn a nonzero errcode into an error.
pub fn handle_response(cli: &Cli, response: Response) -> Result<()> {
    println!("{}", format_response(&response, cli.output_format)?);

    if response.is_success() {
        Ok(())
    } else {
        Err(GatewayRejected {
            errcode: response.errcode,
            errmsg: response.errmsg,
        }
        .into())
    }
}

pub fn format_response(response: &Response, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Text => {
            let mut lines = vec![
                format!("errcode: {}", response.errcode),
                format!("errmsg: {}", response.errmsg),
            ];

            let optional = [
                ("openid", (response.openid != 0).then(|| response.openid.to_string())),
                ("url", non_empty(&response.url)),
                ("url_qrcode", non_empty(&response.url_qrcode)),
                ("hash", non_empty(&response.hash)),
            ];

            let data = &response.data;
            let order = [
                ("open_order_id", non_empty(&data.open_order_id)),
                ("out_trade_order", non_empty(&data.out_trade_order)),
                ("status", non_empty(&data.status)),
                ("total_amount", non_empty(&data.total_amount)),
                ("title", non_empty(&data.title)),
                ("payment_method", non_empty(&data.payment_method)),
                ("transaction_id", non_empty(&data.transaction_id)),
                ("paid_date", non_empty(&data.paid_date)),
                ("pay_url", non_empty(&data.pay_url)),
                ("plugins", non_empty(&data.plugins)),
            ];

            for (name, value) in optional {
                if let Some(value) = value {
                    lines.push(format!("{name}: {value}"));
                }
            }

            if !data.is_empty() {
                lines.push("data:".to_string());
                for (name, value) in order {
                    if let Some(value) = value {
                        lines.push(format!("  {name}: {value}"));
                    }
                }
            }

            Ok(lines.join("\n"))
        }
    }
}

/// Format the result of `hupi sign`.
pub fn format_signature(
    hash: &str,
    canonical: &str,
    params: &Params,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(hash.to_string()),
        OutputFormat::Json => {
            let sorted: BTreeMap<&String, &String> = params.iter().collect();
            Ok(serde_json::to_string_pretty(&json!({
                "hash": hash,
                "canonical": canonical,
                "params": sorted,
            }))?)
        }
    }
}

/// Configuration display with the secret redacted.
pub fn format_config(config: &Config, source: &str, format: OutputFormat) -> Result<String> {
    let secret = redact(&config.app_secret);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "config_path": source,
            "app_id": config.app_id,
            "app_secret": secret,
            "payment_url": config.payment_url(),
            "query_url": config.query_url(),
            "timeout": config.timeout(),
            "user_agent": config.user_agent,
        }))?),
        OutputFormat::Text => {
            let mut lines = vec![
                format!("# {source}"),
                format!("app_id = \"{}\"", config.app_id),
                format!("app_secret = \"{secret}\""),
                format!("payment_url = \"{}\"", config.payment_url()),
                format!("query_url = \"{}\"", config.query_url()),
                format!("timeout = {}", config.timeout()),
            ];
            if let Some(ua) = &config.user_agent {
                lines.push(format!("user_agent = \"{ua}\""));
            }
            Ok(lines.join("\n"))
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Keep the last four characters of a secret.
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}
