//! CLI command: sns-verify decode
//!
//! Validate a message offline. No certificate is fetched and the signature
//! is not checked.
//!
//! Usage:
//!   sns-verify decode message.json [--format text|json]
//!   cat message.json | sns-verify decode -

use anyhow::Result;
use sns_verify::decode_message;

use super::{print_message, read_input};
use crate::cli::args::InputArgs;
use crate::exit_codes::{DECODE_FAILED, SUCCESS};

pub fn run(args: InputArgs) -> Result<i32> {
    let raw = read_input(&args.input)?;
    match decode_message(&raw) {
        Ok(message) => {
            print_message(&message, args.format)?;
            Ok(SUCCESS)
        }
        Err(e) => {
            eprintln!("decode failed: {e}");
            Ok(DECODE_FAILED)
        }
    }
}
