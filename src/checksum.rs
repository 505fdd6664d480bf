// Checksums used for cache signatures and decode statistics.

/// Adler-32 of `data`.
pub fn checksum(data: &[u8]) -> u32 {
    #[cfg(feature = "adler32")]
    {
        let mut hasher = simd_adler32::Adler32::new();
        hasher.write(data);
        hasher.finish()
    }
    #[cfg(not(feature = "adler32"))]
    {
        const MOD_ADLER: u32 = 65521;
        let mut a: u32 = 1;
        let mut b: u32 = 0;
        for &byte in data {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        (b << 16) | a
    }
}

/// True iff `decompressed` is byte-for-byte identical to `original`.
pub fn verify_decompression(original: &[u8], decompressed: &[u8]) -> bool {
    original == decompressed
}
