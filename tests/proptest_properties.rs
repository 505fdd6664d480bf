use proptest::prelude::*;
use rsrc_dcmp::Engine;
use rsrc_dcmp::format::header::{
    CompressFlags, DCMP_BYTE_WISE, DCMP_DONN_BITS, DCMP_GREGGY_BITS, ExtendedAttributes,
    ResourceHeader, is_extended_resource,
};

fn with_payload(header: ResourceHeader, payload: &[u8]) -> Vec<u8> {
    let mut blob = header.to_bytes();
    blob.extend_from_slice(payload);
    blob
}

fn any_compressed_header() -> impl Strategy<Value = ResourceHeader> {
    let size = 0u32..4096;
    prop_oneof![
        (size.clone(), any::<u8>())
            .prop_map(|(n, ratio)| ResourceHeader::donn_bits(n, ratio, DCMP_DONN_BITS)),
        (size.clone(), any::<u8>())
            .prop_map(|(n, ratio)| ResourceHeader::donn_bits(n, ratio, DCMP_BYTE_WISE)),
        (size, any::<u8>(), 0u8..4).prop_map(|(n, table, flags)| {
            ResourceHeader::greggy_bits(
                n,
                DCMP_GREGGY_BITS,
                table,
                CompressFlags::from_bits_retain(flags),
            )
        }),
    ]
}

/// Byte-wise literal tokens (`0x00..=0x0F`) carrying `data` verbatim.
fn byte_wise_literals(data: &[u8]) -> Vec<u8> {
    let mut tokens = Vec::with_capacity(data.len() + data.len() / 16 + 1);
    for chunk in data.chunks(16) {
        tokens.push((chunk.len() - 1) as u8);
        tokens.extend_from_slice(chunk);
    }
    tokens
}

proptest! {
    #[test]
    fn prop_plain_blobs_pass_through(
        mut data in proptest::collection::vec(any::<u8>(), 0..2048)
    ) {
        if data.len() > 4 {
            data[4] = 0;
        }
        prop_assume!(!is_extended_resource(&data));
        let mut engine = Engine::default();
        prop_assert_eq!(engine.decompress_resource(&data).unwrap(), data);
    }

    #[test]
    fn prop_uncompressed_payload_is_returned(
        payload in proptest::collection::vec(any::<u8>(), 0..2048),
        trailing in proptest::collection::vec(any::<u8>(), 0..64)
    ) {
        let mut header = ResourceHeader::donn_bits(payload.len() as u32, 0, 0);
        header.common.attributes = ExtendedAttributes::empty();
        let mut blob = with_payload(header, &payload);
        blob.extend_from_slice(&trailing);

        let mut engine = Engine::default();
        prop_assert_eq!(engine.decompress_resource(&blob).unwrap(), payload);
    }

    #[test]
    fn prop_garbage_payload_never_overruns(
        header in any_compressed_header(),
        payload in proptest::collection::vec(any::<u8>(), 0..1024)
    ) {
        let actual = header.common.actual_size as usize;
        let blob = with_payload(header, &payload);
        let mut engine = Engine::default();
        if let Ok(data) = engine.decompress_resource(&blob) {
            prop_assert!(data.len() <= actual, "out={} actual={}", data.len(), actual);
        }
    }

    #[test]
    fn prop_byte_wise_literals_reproduce_data(
        data in proptest::collection::vec(any::<u8>(), 1..4096),
        ratio in any::<u8>()
    ) {
        let header = ResourceHeader::donn_bits(data.len() as u32, ratio, DCMP_BYTE_WISE);
        let blob = with_payload(header, &byte_wise_literals(&data));
        let mut engine = Engine::default();
        prop_assert_eq!(engine.decompress_resource(&blob).unwrap(), data);
    }

    #[test]
    fn prop_cached_result_matches_fresh_decode(
        data in proptest::collection::vec(any::<u8>(), 1..1024)
    ) {
        let header = ResourceHeader::donn_bits(data.len() as u32, 0, DCMP_BYTE_WISE);
        let blob = with_payload(header, &byte_wise_literals(&data));

        let mut engine = Engine::default();
        engine.set_caching(true);
        let first = engine.decompress_resource(&blob).unwrap();
        let second = engine.decompress_resource(&blob).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(engine.cache_stats().hits, 1);
    }
}
