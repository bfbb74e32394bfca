pub mod canonical;
pub mod decode;
pub mod verify;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sns_verify::NotificationMessage;

use super::args::{Cli, Command, OutputFormat};
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::Verify(args) => verify::run(args).await,
        Command::Decode(args) => decode::run(args),
        Command::Canonical(args) => canonical::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Read a message from `path`, or from stdin when `path` is `-`.
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read message from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read message file {}", path.display()))
}

pub(crate) fn print_message(message: &NotificationMessage, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(message)?);
        }
        OutputFormat::Text => {
            println!("Type:             {}", message.message_type());
            println!("MessageId:        {}", message.message_id());
            println!("TopicArn:         {}", message.topic_arn());
            println!("Timestamp:        {}", message.timestamp_str());
            println!("SignatureVersion: {}", message.signature_version());
            println!("SigningCertURL:   {}", message.signing_cert_url());
            if let Some(subject) = message.subject() {
                println!("Subject:          {subject}");
            }
            if let Some(url) = message.unsubscribe_url() {
                println!("UnsubscribeURL:   {url}");
            }
            if let Some(token) = message.token() {
                println!("Token:            {token}");
            }
            for (key, value) in message.message_attributes() {
                println!("Attribute:        {key}={value}");
            }
            println!();
            println!("{}", message.message_body());
        }
    }
    Ok(())
}
