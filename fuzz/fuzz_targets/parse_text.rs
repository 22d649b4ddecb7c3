//! Fuzzing the text front end: arbitrary input must either be rejected
//! with an error or parse into functions that analyze or fail
//! validation cleanly.

#![no_main]
use libfuzzer_sys::fuzz_target;
use livevars::{liveness_for_module, Module};

fuzz_target!(|data: &[u8]| {
    let _ = env_logger::try_init();
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(_) => return,
    };
    let module = match Module::from_text(text) {
        Ok(module) => module,
        Err(e) => {
            log::debug!("rejected: {}", e);
            return;
        }
    };
    let reparsed = Module::from_text(&module.display().to_string()).unwrap();
    assert_eq!(
        reparsed.display().to_string(),
        module.display().to_string()
    );
    let _ = liveness_for_module(&module);
});
