use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rsrc_dcmp::error::{DecompressError, error_string};
use rsrc_dcmp::format::header::{
    CompressFlags, DCMP_BYTE_WISE, DCMP_DONN_BITS, DCMP_GREGGY_BITS, ExtendedAttributes,
    ResourceHeader,
};
use rsrc_dcmp::{Engine, EngineOptions};

fn blob(header: ResourceHeader, payload: &[u8]) -> Vec<u8> {
    let mut v = header.to_bytes();
    v.extend_from_slice(payload);
    v
}

#[test]
fn each_builtin_decoder_is_reachable() {
    let mut engine = Engine::default();

    // DonnBits: constant 0x4E75 (token 0x4B), then four bytes remembered and reused.
    let donn = blob(
        ResourceHeader::donn_bits(10, 255, DCMP_DONN_BITS),
        &[0x4B, 0x41, 0xAB, 0xCD, 0xEF, 0x01, 0xD0],
    );
    assert_eq!(
        engine.decompress_resource(&donn).unwrap(),
        [0x4E, 0x75, 0xAB, 0xCD, 0xEF, 0x01, 0xAB, 0xCD, 0xEF, 0x01]
    );

    // Byte-wise: 3-byte literal, then constant 0x0001.
    let bytes = blob(
        ResourceHeader::donn_bits(5, 255, DCMP_BYTE_WISE),
        &[0x02, b'x', b'y', b'z', 0xD6],
    );
    assert_eq!(engine.decompress_resource(&bytes).unwrap(), b"xyz\x00\x01");

    // GreggyBits: static table plain expansion.
    let greggy = blob(
        ResourceHeader::greggy_bits(4, DCMP_GREGGY_BITS, 0, CompressFlags::empty()),
        &[0x02, 0x00],
    );
    assert_eq!(
        engine.decompress_resource(&greggy).unwrap(),
        [0x4E, 0x75, 0x00, 0x00]
    );
}

#[test]
fn extended_jump_table_through_dispatcher() {
    // Escape, jump table for segment 1 with a single entry at offset 0x40.
    let donn = blob(
        ResourceHeader::donn_bits(8, 255, DCMP_DONN_BITS),
        &[0xFB, 0x00, 0x01, 0x01, 0x40],
    );
    let mut engine = Engine::default();
    assert_eq!(
        engine.decompress_resource(&donn).unwrap(),
        [0x00, 0x40, 0x3F, 0x3C, 0x00, 0x01, 0xA9, 0xF0]
    );
}

#[test]
fn declared_uncompressed_returns_payload() {
    let mut header = ResourceHeader::donn_bits(4, 0, 0);
    header.common.attributes = ExtendedAttributes::empty();
    let input = blob(header, b"DATAtrailing");
    let mut engine = Engine::default();
    assert_eq!(engine.decompress_resource(&input).unwrap(), b"DATA");
}

#[test]
fn truncated_header_is_init_failure() {
    let headers = [
        ResourceHeader::donn_bits(8, 255, DCMP_DONN_BITS),
        ResourceHeader::donn_bits(8, 255, DCMP_BYTE_WISE),
        ResourceHeader::greggy_bits(8, DCMP_GREGGY_BITS, 0, CompressFlags::empty()),
    ];
    let mut engine = Engine::default();
    for header in headers {
        let input = blob(header, &[]);
        for len in 16..22 {
            let err = engine.decompress_resource(&input[..len]).unwrap_err();
            assert!(
                matches!(err, DecompressError::TruncatedHeader { .. }),
                "{header:?} truncated to {len}"
            );
            assert_eq!(err.code(), -108);
        }
    }
}

#[test]
fn error_codes_have_descriptions() {
    for (err, text) in [
        (DecompressError::InputOutOfBounds, "Input out of bounds"),
        (DecompressError::OutputOutOfBounds, "Output out of bounds"),
        (DecompressError::BadExtResource, "Bad extended resource format"),
        (
            DecompressError::CantDecompress("x".into()),
            "Can't decompress resource",
        ),
    ] {
        assert_eq!(error_string(err.code()), text);
    }
    assert_eq!(error_string(0), "No error");
    assert_eq!(error_string(12345), "Unknown error");
}

#[test]
fn cache_serves_repeat_decodes_without_rerunning_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mut engine = Engine::new(EngineOptions {
        caching: true,
        ..Default::default()
    });
    engine
        .register_decompressor(
            0x1234,
            move |src: &[u8], out: &mut [u8], _: &ResourceHeader| -> Result<(), DecompressError> {
                seen.fetch_add(1, Ordering::SeqCst);
                out.copy_from_slice(&src[..out.len()]);
                Ok(())
            },
        )
        .unwrap();

    let input = blob(
        ResourceHeader::greggy_bits(3, 0x1234, 0, CompressFlags::empty()),
        b"abc",
    );
    assert_eq!(engine.decompress_resource(&input).unwrap(), b"abc");
    assert_eq!(engine.decompress_resource(&input).unwrap(), b"abc");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let stats = engine.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));

    engine.clear_cache();
    assert_eq!(engine.decompress_resource(&input).unwrap(), b"abc");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn custom_handler_errors_propagate() {
    let mut engine = Engine::default();
    engine
        .register_decompressor(
            9,
            |_: &[u8], _: &mut [u8], _: &ResourceHeader| -> Result<(), DecompressError> {
                Err(DecompressError::Custom {
                    id: 9,
                    message: "unsupported".into(),
                })
            },
        )
        .unwrap();
    let input = blob(ResourceHeader::donn_bits(2, 0, 9), &[]);
    let err = engine.decompress_resource(&input).unwrap_err();
    assert_eq!(err.code(), -186);
}

#[test]
fn registry_capacity_is_configurable() {
    let mut engine = Engine::new(EngineOptions {
        registry_capacity: 1,
        ..Default::default()
    });
    let noop = |_: &[u8], _: &mut [u8], _: &ResourceHeader| -> Result<(), DecompressError> { Ok(()) };
    engine.register_decompressor(1, noop).unwrap();
    assert_eq!(
        engine.register_decompressor(2, noop),
        Err(DecompressError::RegistryFull { capacity: 1 })
    );
    engine.register_decompressor(1, noop).unwrap();
}

#[test]
fn default_engine_free_functions() {
    // The only test in this binary touching the process-wide engine.
    rsrc_dcmp::set_decompress_caching(true);
    rsrc_dcmp::set_decompress_debug(true);

    let input = blob(
        ResourceHeader::donn_bits(2, 255, DCMP_DONN_BITS),
        &[0x10, 0xBE, 0xEF],
    );
    assert_eq!(rsrc_dcmp::decompress_resource(&input).unwrap(), [0xBE, 0xEF]);
    assert_eq!(rsrc_dcmp::decompress_resource(&input).unwrap(), [0xBE, 0xEF]);
    assert_eq!(rsrc_dcmp::decompress_cache_stats().hits, 1);

    rsrc_dcmp::register_decompressor(
        0x77,
        |_: &[u8], out: &mut [u8], _: &ResourceHeader| -> Result<(), DecompressError> {
            out.fill(0x77);
            Ok(())
        },
    )
    .unwrap();
    assert!(rsrc_dcmp::get_decompressor(0x77).is_some());
    assert!(rsrc_dcmp::unregister_decompressor(0x77));
    assert!(rsrc_dcmp::get_decompressor(0x77).is_none());

    rsrc_dcmp::clear_decompress_cache();
    assert_eq!(rsrc_dcmp::decompress_cache_stats().entries, 0);
    rsrc_dcmp::set_decompress_caching(false);
    rsrc_dcmp::set_decompress_debug(false);
}
