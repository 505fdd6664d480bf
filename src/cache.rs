// Decompression cache keyed by a checksum of the compressed input.
//
// Each entry keeps the input it was decoded from; a hit needs the checksum
// and the input bytes to match. Newest entries are searched first. Hit and
// miss counters reset with the entries on `clear`.

use std::time::Instant;

use log::trace;

use crate::error::{DecompressError, try_copy};

/// Snapshot of cache occupancy and effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    /// Sum of cached output lengths.
    pub total_size: usize,
    pub hits: usize,
    pub misses: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    signature: u32,
    input: Vec<u8>,
    data: Vec<u8>,
    timestamp: Instant,
}

#[derive(Debug, Default)]
pub struct DecompressCache {
    entries: Vec<CacheEntry>,
    hits: usize,
    misses: usize,
}

impl DecompressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the output cached for `input`, counting a hit.
    pub fn lookup(
        &mut self,
        signature: u32,
        input: &[u8],
    ) -> Result<Option<Vec<u8>>, DecompressError> {
        let Some(entry) = self
            .entries
            .iter()
            .rev()
            .find(|e| e.signature == signature && e.input == input)
        else {
            return Ok(None);
        };
        let data = try_copy(&entry.data)?;
        self.hits += 1;
        trace!(
            "cache hit {signature:#010X}, {} bytes, cached {:?} ago",
            data.len(),
            entry.timestamp.elapsed()
        );
        Ok(Some(data))
    }

    /// Record a miss whose decode succeeded and cache its output.
    pub fn insert(
        &mut self,
        signature: u32,
        input: &[u8],
        data: &[u8],
    ) -> Result<(), DecompressError> {
        let input = try_copy(input)?;
        let data = try_copy(data)?;
        self.entries
            .try_reserve(1)
            .map_err(|_| DecompressError::MemFull {
                bytes: data.len(),
            })?;
        self.misses += 1;
        self.entries.push(CacheEntry {
            signature,
            input,
            data,
            timestamp: Instant::now(),
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            total_size: self.entries.iter().map(|e| e.data.len()).sum(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
