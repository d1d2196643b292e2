#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(window) = semantic_manifest::primitives::parse_window(&s, &[]) {
        assert!(!window.granularity.is_empty());
        assert_eq!(window.granularity, window.granularity.to_lowercase());
    }
});
