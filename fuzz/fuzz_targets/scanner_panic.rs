#![no_main]
use ferroloc_core::{reinject, validate_structure};
use ferroloc_syntax::{locate, MarkerScanner};
use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes, lossily decoded so that near-text inputs reach the scanner.
    let text = String::from_utf8_lossy(data);

    match MarkerScanner::new(&text).units() {
        Ok(units) => {
            for unit in &units {
                assert!(unit.start_offset <= unit.end_offset);
                let _ = locate(&text, unit.marker_start);
            }
            // Reinjecting the extracted text must reproduce the input.
            let identity: IndexMap<String, String> = units
                .iter()
                .map(|unit| (unit.key.clone(), unit.raw_text.clone()))
                .collect();
            if let Ok(result) = reinject(&text, &identity) {
                assert_eq!(result.text, text);
            }
        }
        Err(err) => {
            let _ = locate(&text, err.offset());
        }
    }

    if let Err(err) = validate_structure(&text) {
        let _ = locate(&text, err.offset());
    }
});
