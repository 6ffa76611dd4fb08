//! Fuzzing placeholder for droidwire-core decoders
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decode_script

pub fn fuzz_decode_script(data: &[u8]) {
    use droidwire_core::decoder::decode_script;

    // Try to decode - should never panic
    let _ = decode_script(data);
}

pub fn fuzz_parse_advertisement(data: &[u8]) {
    use droidwire_core::advert::parse_advertisement;

    // Try to parse - should never panic
    let _ = parse_advertisement(data);
}
