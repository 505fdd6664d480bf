#![no_main]
use libfuzzer_sys::fuzz_target;
use rsrc_dcmp::cli;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let args: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    cli::fuzz_try_parse_args(&args);
});
