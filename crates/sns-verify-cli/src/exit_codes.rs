//! Exit codes for `sns-verify`.
//! Part of the public contract; scripts branch on them.

use sns_verify::VerificationFailure;

pub const SUCCESS: i32 = 0;
pub const DECODE_FAILED: i32 = 1; // Payload is not a valid notification message
pub const INTERNAL_ERROR: i32 = 2; // I/O, config or unexpected failure
pub const CERTIFICATE_REJECTED: i32 = 3; // Certificate unavailable or untrusted
pub const SIGNATURE_REJECTED: i32 = 4; // Signature does not verify

pub fn for_failure(failure: &VerificationFailure) -> i32 {
    failure.exit_code()
}

/// Short label for a failure exit code, used in JSON output.
pub fn category(code: i32) -> &'static str {
    match code {
        SUCCESS => "ok",
        DECODE_FAILED => "decode",
        CERTIFICATE_REJECTED => "certificate",
        SIGNATURE_REJECTED => "signature",
        _ => "unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sns_verify::{CertError, DecodeError, SigError};

    #[test]
    fn test_codes_match_library_mapping() {
        let decode = VerificationFailure::from(DecodeError::EmptyObject);
        let cert = VerificationFailure::from(CertError::BlankUrl);
        let sig = VerificationFailure::from(SigError::Mismatch);

        assert_eq!(for_failure(&decode), DECODE_FAILED);
        assert_eq!(for_failure(&cert), CERTIFICATE_REJECTED);
        assert_eq!(for_failure(&sig), SIGNATURE_REJECTED);
        assert_eq!(category(for_failure(&cert)), "certificate");
        assert_eq!(category(INTERNAL_ERROR), "unexpected");
    }
}
