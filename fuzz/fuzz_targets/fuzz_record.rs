#![no_main]

use libfuzzer_sys::fuzz_target;

use statpar_core::constants::RECORD_LEN;
use statpar_core::wire::{encode_record, RecordReader, WireError};

fuzz_target!(|data: &[u8]| {
    let mut decoded = 0;
    for record in RecordReader::new(data) {
        match record {
            Ok(result) => {
                // Every accepted record re-encodes to the bytes it came from.
                let start = decoded * RECORD_LEN;
                assert_eq!(&encode_record(&result)[..], &data[start..start + RECORD_LEN]);
                decoded += 1;
            }
            Err(WireError::UnknownTag(tag)) => {
                assert_eq!(tag, data[decoded * RECORD_LEN]);
                break;
            }
            Err(WireError::Truncated { got, .. }) => {
                assert_eq!(got, data.len() - decoded * RECORD_LEN);
                break;
            }
            Err(_) => break,
        }
    }
    assert!(decoded <= data.len() / RECORD_LEN);
});
