//! CLI command: sns-verify canonical
//!
//! Print the exact string the signature covers. Output is written verbatim,
//! so `sns-verify canonical msg.json | openssl dgst ...` works.

use std::io::Write;

use anyhow::{Context, Result};
use sns_verify::{decode_message, string_to_sign};

use super::read_input;
use crate::cli::args::CanonicalArgs;
use crate::exit_codes::{DECODE_FAILED, SUCCESS};

pub fn run(args: CanonicalArgs) -> Result<i32> {
    let raw = read_input(&args.input)?;
    let message = match decode_message(&raw) {
        Ok(message) => message,
        Err(e) => {
            eprintln!("decode failed: {e}");
            return Ok(DECODE_FAILED);
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(string_to_sign(&message).as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write canonical string")?;
    Ok(SUCCESS)
}
