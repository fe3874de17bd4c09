#![no_main]

use libfuzzer_sys::fuzz_target;

use statpar_core::baseline::compute_sequential;
use statpar_core::dataset::Dataset;
use statpar_core::kind::StatKind;
use statpar_core::worker::worker_for;

fuzz_target!(|data: &[u8]| {
    let values: Vec<i32> = data
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let Ok(dataset) = Dataset::from_values(values) else {
        return;
    };

    let summary = compute_sequential(&dataset).unwrap();
    let min = f64::from(*dataset.values().iter().min().unwrap());
    let max = f64::from(*dataset.values().iter().max().unwrap());
    assert!(summary.mean >= min && summary.mean <= max);
    assert!(summary.median >= min && summary.median <= max);
    assert!(summary.deviation >= 0.0);

    // Each worker alone agrees with the baseline bit for bit.
    for kind in StatKind::ALL {
        let result = worker_for(kind).run(&dataset).unwrap();
        assert_eq!(result.kind, kind);
        assert_eq!(result.value.to_bits(), summary.get(kind).to_bits());
    }
});
