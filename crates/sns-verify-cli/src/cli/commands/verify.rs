//! CLI command: sns-verify verify
//!
//! Run the full pipeline on one message.
//!
//! Usage:
//!   sns-verify verify message.json [--format text|json] [--config verifier.yaml]
//!                                  [--cert-ttl SECS] [--timeout SECS]
//!
//! Exit codes: 0 verified, 1 decode failure, 2 internal error,
//! 3 certificate rejected, 4 signature rejected.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sns_verify::{NotificationMessage, VerificationPipeline, VerifierConfig};

use super::{print_message, read_input};
use crate::cli::args::{OutputFormat, VerifyArgs};
use crate::exit_codes::{self, SUCCESS};

#[derive(Serialize)]
struct VerifyReport<'a> {
    verified: bool,
    category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a NotificationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    retryable: bool,
}

pub async fn run(args: VerifyArgs) -> Result<i32> {
    let config = load_config(args.config.as_deref())?;
    let config = apply_overrides(config, args.cert_ttl, args.timeout);

    let raw = read_input(&args.input.input)?;
    let pipeline =
        VerificationPipeline::new(config).context("failed to build verification pipeline")?;

    match pipeline.verify_message(&raw).await {
        Ok(message) => {
            if args.input.format == OutputFormat::Json {
                print_report(&VerifyReport {
                    verified: true,
                    category: exit_codes::category(SUCCESS),
                    message: Some(&message),
                    error: None,
                    retryable: false,
                })?;
            } else {
                eprintln!("verified: {}", message.message_id());
                print_message(&message, OutputFormat::Text)?;
            }
            Ok(SUCCESS)
        }
        Err(failure) => {
            let code = exit_codes::for_failure(&failure);
            if args.input.format == OutputFormat::Json {
                print_report(&VerifyReport {
                    verified: false,
                    category: exit_codes::category(code),
                    message: None,
                    error: Some(failure.to_string()),
                    retryable: failure.is_retryable(),
                })?;
            } else {
                eprintln!("verification failed: {failure}");
            }
            Ok(code)
        }
    }
}

fn print_report(report: &VerifyReport<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<VerifierConfig> {
    let Some(path) = path else {
        return Ok(VerifierConfig::from_env());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn apply_overrides(
    mut config: VerifierConfig,
    cert_ttl: Option<u64>,
    timeout: Option<u64>,
) -> VerifierConfig {
    if let Some(secs) = cert_ttl {
        config = config.with_cert_cache_ttl(secs);
    }
    if let Some(secs) = timeout {
        config = config.with_timeout(secs);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_load_config_yaml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cert_cache_ttl_secs: 120").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.cert_cache_ttl_secs, 120);
        assert_eq!(config.timeout_secs, VerifierConfig::default().timeout_secs);
    }

    #[test]
    fn test_load_config_rejects_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cert_cache_ttl_secs: [not, a, number]").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn test_flag_overrides_win() {
        let config = apply_overrides(VerifierConfig::default(), Some(30), Some(2));
        assert_eq!(config.cert_cache_ttl_secs, 30);
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.connect_timeout_secs, 5);
    }
}
