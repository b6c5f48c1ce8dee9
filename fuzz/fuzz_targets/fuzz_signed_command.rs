//! Fuzz target: uplink text through validation, tokenising and the
//! command factory.
//!
//! Arbitrary text must never panic, never leave the command pool busy,
//! and never pass hard validation while carrying a signature envelope.
//!
//! cargo fuzz run fuzz_signed_command

#![no_main]

use avionics::command::{CommandPool, build_command};
use avionics::link::auth::SignatureValidator;
use avionics::link::parser::tokenize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut validator = SignatureValidator::new(*b"0123456789abcdef", true, 1);
    let mut pool = CommandPool::new();

    if let Ok(auth) = validator.validate(text) {
        // Forging a MAC by chance is not expected.
        assert!(!auth.signed, "random text passed signature validation");
        let tokens = tokenize(auth.command);
        let command = build_command(tokens.as_deref().map_err(|e| *e), &mut pool);
        let _ = command.operation();
    }
    assert!(pool.in_use().is_none());
});
