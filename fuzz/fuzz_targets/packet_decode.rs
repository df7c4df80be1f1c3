#![no_main]

use egts::{CodecOptions, Counters, Limits, Packet};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = CodecOptions::new().with_limits(Limits::for_testing());
    let counters = Counters::new();

    match Packet::decode(data, &options) {
        Ok(packet) => {
            // Whatever decodes and re-encodes must decode again.
            if let Ok(bytes) = packet.encode(&options) {
                assert!(Packet::decode(&bytes, &options).is_ok());
            }
            let _ = packet.response(&counters);
        }
        Err(err) => {
            let _ = err.result_code();
            let _ = err.response(&counters);
        }
    }
});
