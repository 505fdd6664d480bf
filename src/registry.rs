// Custom decompressor registry.
//
// Maps a format-specific id (`decompressID` for version 8, `defProcID` for
// version 9 and later) to a handler. Lookup is linear; the registry is small
// and bounded.

use std::fmt;
use std::sync::Arc;

use crate::error::DecompressError;
use crate::format::header::ResourceHeader;

/// Maximum number of distinct ids, unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 16;

/// A decoder for a format this crate does not implement.
///
/// `input` is the payload following the header; `output` is exactly
/// `actualSize` bytes and must be filled in place.
pub trait CustomDecompressor: Send + Sync {
    fn decompress(
        &self,
        input: &[u8],
        output: &mut [u8],
        header: &ResourceHeader,
    ) -> Result<(), DecompressError>;
}

impl<F> CustomDecompressor for F
where
    F: Fn(&[u8], &mut [u8], &ResourceHeader) -> Result<(), DecompressError> + Send + Sync,
{
    fn decompress(
        &self,
        input: &[u8],
        output: &mut [u8],
        header: &ResourceHeader,
    ) -> Result<(), DecompressError> {
        self(input, output, header)
    }
}

pub struct Registry {
    entries: Vec<(u16, Arc<dyn CustomDecompressor>)>,
    capacity: usize,
}

impl Registry {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Register `handler` under `id`, replacing any existing handler.
    ///
    /// Only a new id can fail, with `RegistryFull`.
    pub fn register(
        &mut self,
        id: u16,
        handler: Arc<dyn CustomDecompressor>,
    ) -> Result<(), DecompressError> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == id) {
            slot.1 = handler;
            return Ok(());
        }
        if self.entries.len() >= self.capacity {
            return Err(DecompressError::RegistryFull {
                capacity: self.capacity,
            });
        }
        self.entries.push((id, handler));
        Ok(())
    }

    pub fn get(&self, id: u16) -> Option<Arc<dyn CustomDecompressor>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(_, h)| Arc::clone(h))
    }

    /// Remove the handler for `id`. Returns whether one was registered.
    pub fn unregister(&mut self, id: u16) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ids", &self.entries.iter().map(|(k, _)| *k).collect::<Vec<_>>())
            .field("capacity", &self.capacity)
            .finish()
    }
}
