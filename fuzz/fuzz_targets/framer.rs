#![no_main]

use egts::{EgtsSplitter, FrameSplitter, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut splitter = EgtsSplitter::with_limits(&Limits::for_testing());

    // Feed the input in growing prefixes, the way partial reads arrive.
    let mut start = 0usize;
    let mut end = 0usize;
    while end < data.len() {
        end = (end + 7).min(data.len());
        let at_eof = end == data.len();
        loop {
            match splitter.split(&data[start..end], at_eof) {
                Ok(split) if split.frame.is_some() => {
                    assert!(split.consumed > 0);
                    assert!(split.consumed <= end - start);
                    start += split.consumed;
                }
                Ok(_) => break,
                Err(_) => {
                    assert!(splitter.bad_data().is_some());
                    return;
                }
            }
        }
    }
});
