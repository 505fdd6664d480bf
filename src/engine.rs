// Dispatcher: ties header detection, the cache, the built-in decoders and
// the custom registry together.
//
// An `Engine` owns its cache and registry. A process-wide default engine
// backs the free functions at the bottom of this module.

use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::cache::{CacheStats, DecompressCache};
use crate::checksum::checksum;
use crate::codec::{byte_wise, donn_bits, greggy_bits};
use crate::error::{DecompressError, try_copy, try_zeroed};
use crate::format::header::{
    DCMP_BYTE_WISE, DCMP_DONN_BITS, DCMP_GREGGY_BITS, ExtendedHeader, FormatParams,
    GREGGY_HEADER_VERSION, RESOURCE_SIZE_FIELD_LEN, ResourceHeader, is_extended_resource,
};
use crate::registry::{CustomDecompressor, DEFAULT_CAPACITY, Registry};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Remember successful decodes, keyed by a checksum of the input.
    pub caching: bool,
    /// Dump headers, tables and statistics at `debug`; report errors at `warn`.
    pub debug: bool,
    /// Maximum number of distinct custom decompressor ids.
    pub registry_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            caching: false,
            debug: false,
            registry_capacity: DEFAULT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder selection
// ---------------------------------------------------------------------------

/// Which decoder handles a compressed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    DonnBits,
    ByteWise,
    GreggyBits,
    /// Looked up in the registry under this id.
    Custom(u16),
}

impl Method {
    /// Choose a decoder from the parsed header.
    pub fn select(header: &ResourceHeader) -> Result<Self, DecompressError> {
        Ok(match header.format {
            FormatParams::DonnBits(p) => match p.decompress_id {
                DCMP_DONN_BITS => Self::DonnBits,
                DCMP_BYTE_WISE => Self::ByteWise,
                id => Self::Custom(u16::from(id)),
            },
            FormatParams::GreggyBits(p)
                if header.common.header_version == GREGGY_HEADER_VERSION
                    && p.def_proc_id == DCMP_GREGGY_BITS =>
            {
                Self::GreggyBits
            }
            FormatParams::GreggyBits(p) => Self::Custom(p.def_proc_id),
            FormatParams::Unknown => return Err(DecompressError::BadExtResource),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DonnBits => f.write_str("DonnBits"),
            Self::ByteWise => f.write_str("byte-wise"),
            Self::GreggyBits => f.write_str("GreggyBits"),
            Self::Custom(id) => write!(f, "custom ({id})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    options: EngineOptions,
    cache: DecompressCache,
    registry: Registry,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            cache: DecompressCache::new(),
            registry: Registry::new(options.registry_capacity),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Decompress one resource blob (including its leading size field).
    ///
    /// Plain blobs are copied verbatim. Extended blobs without the
    /// compressed bit yield the `actualSize` bytes after the header.
    /// A failed decode leaves the cache untouched.
    pub fn decompress_resource(&mut self, input: &[u8]) -> Result<Vec<u8>, DecompressError> {
        let result = self.dispatch(input);
        if let Err(e) = &result
            && self.options.debug
        {
            warn!("decompress_resource failed ({}): {e}", e.code());
        }
        result
    }

    fn dispatch(&mut self, input: &[u8]) -> Result<Vec<u8>, DecompressError> {
        if !is_extended_resource(input) {
            debug!("plain resource, copying {} bytes", input.len());
            return try_copy(input);
        }
        let common = ExtendedHeader::parse(input).ok_or(DecompressError::BadExtResource)?;

        if !common.is_compressed() {
            return copy_uncompressed(input, &common);
        }

        let signature = self.options.caching.then(|| checksum(input));
        if let Some(sig) = signature
            && let Some(data) = self.cache.lookup(sig, input)?
        {
            debug!("cache hit {sig:#010X}, {} bytes", data.len());
            return Ok(data);
        }

        let header = ResourceHeader::parse(input)?;
        if self.options.debug {
            debug!("{header}");
        }
        let method = Method::select(&header)?;
        debug!(
            "decoding {} bytes with {method} into {} bytes",
            input.len(),
            header.common.actual_size
        );

        let data = self.decode(input, &header, method)?;

        if let Some(sig) = signature {
            debug!("cache miss {sig:#010X}, storing {} bytes", data.len());
            self.cache.insert(sig, input, &data)?;
        }
        Ok(data)
    }

    fn decode(
        &self,
        input: &[u8],
        header: &ResourceHeader,
        method: Method,
    ) -> Result<Vec<u8>, DecompressError> {
        let debug = self.options.debug;
        match method {
            Method::DonnBits => donn_bits::decompress(input, debug).map(|d| d.data),
            Method::ByteWise => byte_wise::decompress(input, debug).map(|d| d.data),
            Method::GreggyBits => greggy_bits::decompress(input, debug).map(|d| d.data),
            Method::Custom(id) => {
                let handler = self
                    .registry
                    .get(id)
                    .ok_or(DecompressError::BadExtResource)?;
                let payload = input
                    .get(header.data_offset()..)
                    .ok_or(DecompressError::InputOutOfBounds)?;
                let mut output = try_zeroed(header.common.actual_size as usize)?;
                handler.decompress(payload, &mut output, header)?;
                Ok(output)
            }
        }
    }

    // -- cache ---------------------------------------------------------------

    /// Enable or disable caching. Disabling empties the cache.
    pub fn set_caching(&mut self, enable: bool) {
        self.options.caching = enable;
        if !enable {
            self.cache.clear();
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn set_debug(&mut self, enable: bool) {
        self.options.debug = enable;
    }

    // -- registry ------------------------------------------------------------

    pub fn register_decompressor<D>(&mut self, id: u16, handler: D) -> Result<(), DecompressError>
    where
        D: CustomDecompressor + 'static,
    {
        self.registry.register(id, Arc::new(handler))
    }

    pub fn get_decompressor(&self, id: u16) -> Option<Arc<dyn CustomDecompressor>> {
        self.registry.get(id)
    }

    pub fn unregister_decompressor(&mut self, id: u16) -> bool {
        self.registry.unregister(id)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

/// Copy the payload of an extended resource whose compressed bit is clear.
fn copy_uncompressed(input: &[u8], common: &ExtendedHeader) -> Result<Vec<u8>, DecompressError> {
    let start = RESOURCE_SIZE_FIELD_LEN + usize::from(common.header_length);
    let end = start
        .checked_add(common.actual_size as usize)
        .ok_or(DecompressError::InputOutOfBounds)?;
    let payload = input
        .get(start..end)
        .ok_or(DecompressError::InputOutOfBounds)?;
    debug!("uncompressed extended resource, {} bytes", payload.len());
    try_copy(payload)
}

// ---------------------------------------------------------------------------
// Process-wide default engine
// ---------------------------------------------------------------------------

static DEFAULT_ENGINE: LazyLock<Mutex<Engine>> = LazyLock::new(|| Mutex::new(Engine::default()));

fn default_engine() -> MutexGuard<'static, Engine> {
    DEFAULT_ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decompress with the default engine.
///
/// The engine stays locked while a custom decompressor runs, so handlers
/// must not call back into these functions.
pub fn decompress_resource(input: &[u8]) -> Result<Vec<u8>, DecompressError> {
    default_engine().decompress_resource(input)
}

pub fn register_decompressor<D>(id: u16, handler: D) -> Result<(), DecompressError>
where
    D: CustomDecompressor + 'static,
{
    default_engine().register_decompressor(id, handler)
}

pub fn get_decompressor(id: u16) -> Option<Arc<dyn CustomDecompressor>> {
    default_engine().get_decompressor(id)
}

pub fn unregister_decompressor(id: u16) -> bool {
    default_engine().unregister_decompressor(id)
}

pub fn set_decompress_caching(enable: bool) {
    default_engine().set_caching(enable);
}

pub fn clear_decompress_cache() {
    default_engine().clear_cache();
}

pub fn decompress_cache_stats() -> CacheStats {
    default_engine().cache_stats()
}

pub fn set_decompress_debug(enable: bool) {
    default_engine().set_debug(enable);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
