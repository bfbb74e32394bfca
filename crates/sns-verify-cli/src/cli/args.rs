use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sns-verify",
    version,
    about = "Verify the authenticity of SNS notification messages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode, fetch the signing certificate and verify the signature
    Verify(VerifyArgs),
    /// Decode and validate a message without any network access
    Decode(InputArgs),
    /// Print the canonical string-to-sign for a message
    Canonical(CanonicalArgs),
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Message file, or `-` for stdin
    pub input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CanonicalArgs {
    /// Message file, or `-` for stdin
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// YAML file with verifier settings (default: SNS_VERIFY_* environment)
    #[arg(long, env = "SNS_VERIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Certificate cache TTL in seconds
    #[arg(long = "cert-ttl")]
    pub cert_ttl: Option<u64>,

    /// Certificate fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
