//! Error display helpers with actionable suggestions.

use hupi_lib::HupiError;

use crate::output::GatewayRejected;

/// Get a suggestion for how to fix an error, if available.
pub fn get_suggestion(err: &anyhow::Error) -> Option<String> {
    if let Some(hupi_err) = err.downcast_ref::<HupiError>() {
        return get_hupi_error_suggestion(hupi_err);
    }

    if let Some(rejected) = err.downcast_ref::<GatewayRejected>() {
        return Some(format!(
            "The gateway rejected the request with errcode {}. Check the request fields \
             and that the appid/appsecret pair is the one issued for this merchant.",
            rejected.errcode
        ));
    }

    None
}

/// Get suggestion for a specific HupiError variant.
fn get_hupi_error_suggestion(err: &HupiError) -> Option<String> {
    match err {
        HupiError::ConfigMissing(_) => Some(
            "Provide credentials with --appid/--appsecret, the HUPI_APPID/HUPI_APPSECRET \
             environment variables, or run 'hupi config init'."
                .into(),
        ),

        HupiError::InvalidConfig(_) => {
            Some("Run 'hupi config show' to view your current configuration.".into())
        }

        HupiError::NoConfigDir => {
            Some("Could not determine home directory. Set HOME or pass --config.".into())
        }

        HupiError::Transport(e) if e.is_operation_timedout() => Some(
            "The request timed out. Try again or increase the timeout with --max-time.".into(),
        ),

        HupiError::Transport(e) if e.is_couldnt_connect() || e.is_couldnt_resolve_host() => {
            Some("Check your internet connection and the gateway URL.".into())
        }

        HupiError::Decode(_) => Some(
            "The gateway did not answer with JSON. Re-run with -vv to see the raw response."
                .into(),
        ),

        _ => None,
    }
}

/// Format an error with its suggestion for display on stderr.
pub fn format_error_with_suggestion(err: &anyhow::Error) -> String {
    let mut output = format!("Error: {err:#}");

    if let Some(suggestion) = get_suggestion(err) {
        output.push_str("\n\nSuggestion:\n");
        output.push_str(&suggestion);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_suggestion() {
        let err = anyhow::Error::new(HupiError::config_missing("app_id is not set"));
        let text = format_error_with_suggestion(&err);
        assert!(text.starts_with("Error: app_id is not set"));
        assert!(text.contains("hupi config init"));
    }

    #[test]
    fn test_connection_refused_suggestion() {
        let err = anyhow::Error::new(HupiError::Transport(curl::Error::new(7)));
        let suggestion = get_suggestion(&err).unwrap();
        assert!(suggestion.contains("internet connection"));
    }

    #[test]
    fn test_no_suggestion_for_unknown_errors() {
        let err = anyhow::anyhow!("something odd");
        assert_eq!(format_error_with_suggestion(&err), "Error: something odd");
    }
}
