#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Ok(message) = sns_verify::decode_message(&raw) {
        // Anything that decodes must also produce a canonical string
        let _ = sns_verify::string_to_sign(&message);
    }
});
