#![no_main]
use libfuzzer_sys::fuzz_target;
use svgpure::{from_bytes, to_string, Allowlist, Sanitizer};

fuzz_target!(|data: &[u8]| {
    let (Ok(doc), Ok(sanitizer)) = (from_bytes(data), Sanitizer::new(Allowlist::minimal())) else {
        return;
    };
    let once = sanitizer.sanitize(doc.root);
    let text = to_string(&once);
    let twice = sanitizer.sanitize(once);
    assert_eq!(to_string(&twice), text);
});
