#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let manifest = match semantic_manifest::parse(&s) {
        Ok(m) => m,
        Err(_) => return,
    };

    // Validation never fails, whatever the manifest holds.
    let _ = semantic_manifest::validate(&manifest);

    let transformed = match semantic_manifest::transform(manifest) {
        Ok(m) => m,
        Err(_) => return,
    };

    let json = match semantic_manifest::serialize(&transformed) {
        Ok(j) => j,
        Err(_) => return,
    };

    match semantic_manifest::parse(&json) {
        Ok(reparsed) => assert_eq!(reparsed, transformed, "serialize/parse changed the manifest"),
        Err(e) => panic!(
            "Roundtrip failure: serialize produced JSON that cannot be re-parsed: {}\n\
             Serialized JSON:\n{}",
            e,
            json.get(..500).unwrap_or(&json),
        ),
    }
});
