//! Fuzz target: `FrameDecoder::feed_byte`
//!
//! Drives arbitrary byte sequences into the KISS decoder and asserts that
//! it never panics, never yields an empty or oversized payload, and that
//! anything it yields re-encodes to a frame it decodes identically.
//!
//! cargo fuzz run fuzz_kiss_decoder

#![no_main]

use avionics::link::kiss::{FrameDecoder, MAX_FRAME_LEN, encode_frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();

    for (i, &byte) in data.iter().enumerate() {
        // Step time so the idle timeout is exercised too.
        let Ok(Some(frame)) = decoder.feed_byte(byte, i as u64 * 100) else {
            continue;
        };
        assert!(!frame.payload.is_empty(), "decoder must not yield empty payload");
        assert!(frame.payload.len() <= MAX_FRAME_LEN, "payload exceeds MAX_FRAME_LEN");

        let wire = encode_frame(frame.kind.type_byte(), &frame.payload, true)
            .expect("decoded payload must re-encode");
        let (again, _) = FrameDecoder::new().feed(&wire, 0);
        assert_eq!(again, Some(frame));
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    let _ = decoder.feed(data, 0);
});
