use std::process::Command;

use rsrc_dcmp::format::header::{CompressFlags, DCMP_DONN_BITS, DCMP_GREGGY_BITS, ResourceHeader};
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_rsrc-dcmp").to_string()
}

fn donn_bits_blob() -> Vec<u8> {
    let mut blob = ResourceHeader::donn_bits(8, 255, DCMP_DONN_BITS).to_bytes();
    blob.extend_from_slice(&[0x41, b'o', b'k', b'a', b'y', 0xD0]);
    blob
}

#[test]
fn cli_decode_writes_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.rsrc");
    let output = dir.path().join("out.bin");
    std::fs::write(&input, donn_bits_blob()).unwrap();

    let st = Command::new(bin())
        .arg("decode")
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"okayokay");
}

#[test]
fn cli_refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.rsrc");
    let output = dir.path().join("out.bin");
    std::fs::write(&input, donn_bits_blob()).unwrap();
    std::fs::write(&output, b"keep").unwrap();

    let st = Command::new(bin())
        .arg("decode")
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"keep");

    let st = Command::new(bin())
        .args(["-f", "decode"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"okayokay");
}

#[test]
fn cli_check_only_with_json_stats() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.rsrc");
    std::fs::write(&input, donn_bits_blob()).unwrap();

    let out = Command::new(bin())
        .args(["--json", "decode", "--check-only"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    let json: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(json["command"], "decode");
    assert_eq!(json["method"], "DonnBits");
    assert_eq!(json["output_size"], 8);
}

#[test]
fn cli_decode_error_exits_nonzero() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.rsrc");
    let mut blob = ResourceHeader::donn_bits(8, 255, DCMP_DONN_BITS).to_bytes();
    blob.extend_from_slice(&[0x03, 1, 2]);
    std::fs::write(&input, blob).unwrap();

    let out = Command::new(bin())
        .args(["decode", "--check-only"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("-190"), "{stderr}");
}

#[test]
fn cli_header_prints_fields() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.rsrc");
    let blob = ResourceHeader::greggy_bits(
        64,
        DCMP_GREGGY_BITS,
        3,
        CompressFlags::BYTE_TABLE_SAVED,
    )
    .to_bytes();
    std::fs::write(&input, blob).unwrap();

    let out = Command::new(bin()).arg("header").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Header version:      9"));
    assert!(stdout.contains("Byte table size:     3"));
    assert!(stdout.contains("GreggyBits"));
}

#[test]
fn cli_header_rejects_plain_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("plain.bin");
    std::fs::write(&input, b"just some bytes here").unwrap();

    let st = Command::new(bin()).arg("header").arg(&input).status().unwrap();
    assert!(!st.success());
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("REGISTRY_CAPACITY=16"));
}
