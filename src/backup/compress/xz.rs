use crate::backup::compress::CompressorBuilder;
use crate::backup::file_ext::FileExtProvider;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithDebugObjectAndFnName;
use liblzma::stream::{Check, MtStreamBuilder};
use liblzma::write::XzEncoder;
use serde::Deserialize;
use std::io::Write;
use std::num::NonZero;
use std::sync::{Arc, OnceLock};
use validator::Validate;

/// Default compression level (balance of speed vs size)
static DEFAULT_COMPRESSION_LEVEL: u32 = 3;
/// Maximum threads to prevent resource exhaustion
static DEFAULT_MAX_PARALLELIZATION: usize = 32;

static XZ_FILE_EXT: OnceLock<Arc<str>> = OnceLock::new();

/// Configuration for XZ (LZMA) compression of the archives.
///
/// Both settings are optional in the YAML document:
///
/// ```yaml
/// compressor:
///   level: 6
///   thread: 2
/// ```
#[derive(Clone, Debug, Default, Validate, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct XzConfig {
    /// Compression level, 0 (fastest) to 9 (smallest).
    #[validate(range(min = 0, max = 9))]
    level: Option<u32>,

    /// Number of compression threads, half of the available cores when unset.
    #[validate(range(min = 1))]
    thread: Option<u32>,
}

impl XzConfig {
    pub fn new(level: Option<u32>, thread: Option<u32>) -> Self {
        Self { level, thread }
    }

    fn thread_count(&self) -> u32 {
        self.thread.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZero::get)
                .map(|core| core / 2)
                .map(|t| t.max(1))
                .map(|t| t.min(DEFAULT_MAX_PARALLELIZATION) as u32)
                .unwrap_or(1)
        })
    }
}

impl<W: Write> CompressorBuilder<W> for XzConfig {
    type Compressor = XzEncoder<W>;

    fn build_compressor(&self, writer: W) -> Result<XzEncoder<W>> {
        let level = self.level.unwrap_or(DEFAULT_COMPRESSION_LEVEL);
        let thread = self.thread_count();

        tracing::debug!("Creating XZ compressor with level={}, threads={}", level, thread);

        if thread == 1 {
            Ok(XzEncoder::new(writer, level))
        } else {
            MtStreamBuilder::new()
                .preset(level)
                .check(Check::Crc64)
                .threads(thread)
                .encoder()
                .map(|stream| XzEncoder::new_stream(writer, stream))
                .map_err(Error::from)
                .with_debug_object_and_fn_name(self.clone(), "build_compressor")
        }
    }
}

impl FileExtProvider for XzConfig {
    fn file_ext(&self) -> Option<Arc<str>> {
        Some(XZ_FILE_EXT.get_or_init(|| "xz".into()).clone())
    }
}
