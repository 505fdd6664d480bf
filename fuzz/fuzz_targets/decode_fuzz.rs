#![no_main]
use libfuzzer_sys::fuzz_target;
use rsrc_dcmp::engine::Engine;

fuzz_target!(|data: &[u8]| {
    // Arbitrary blobs must only ever produce errors, never panics.
    let mut engine = Engine::default();
    let _ = engine.decompress_resource(data);
});
