#![no_main]

use libfuzzer_sys::fuzz_target;

use statpar_core::dataset::Dataset;

fuzz_target!(|data: &[u8]| {
    // Arbitrary stdin must never panic a worker; anything accepted is a
    // non-empty dataset that survives another handoff unchanged.
    if let Ok(dataset) = Dataset::read_from(data) {
        assert!(!dataset.is_empty());
        let mut buf = Vec::new();
        dataset.write_to(&mut buf).unwrap();
        assert_eq!(Dataset::read_from(&buf[..]).unwrap(), dataset);
    }
});
