#![no_main]
use libfuzzer_sys::fuzz_target;
use rsrc_dcmp::codec::{byte_wise, donn_bits, greggy_bits};
use rsrc_dcmp::format::header::{CompressFlags, DCMP_GREGGY_BITS, ResourceHeader};

// First byte picks the decoder, second the size; the rest is the payload.
fuzz_target!(|data: &[u8]| {
    let [which, size, payload @ ..] = data else {
        return;
    };
    let actual = u32::from(*size) * 4;
    let mut blob = match which % 4 {
        0 => ResourceHeader::donn_bits(actual, *which, 0).to_bytes(),
        1 => ResourceHeader::donn_bits(actual, *which, 1).to_bytes(),
        n => ResourceHeader::greggy_bits(
            actual,
            DCMP_GREGGY_BITS,
            *size,
            CompressFlags::from_bits_retain(n),
        )
        .to_bytes(),
    };
    blob.extend_from_slice(payload);

    if let Ok(decoded) = match which % 4 {
        0 => donn_bits::decompress(&blob, false),
        1 => byte_wise::decompress(&blob, false),
        _ => greggy_bits::decompress(&blob, false),
    } {
        assert!(decoded.data.len() <= actual as usize);
    }
});
