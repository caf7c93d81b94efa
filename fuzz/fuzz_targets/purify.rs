#![no_main]
use libfuzzer_sys::fuzz_target;
use svgpure::{Allowlist, Purifier, Sanitizer};

fuzz_target!(|data: &[u8]| {
    if let Ok(sanitizer) = Sanitizer::new(Allowlist::broad()) {
        let _ = Purifier::new(sanitizer).purify(data);
    }
});
