pub mod xz;

use crate::backup::result_error::result::Result;
use std::io::Write;

pub use xz::XzConfig;

pub trait CompressorBuilder<W: Write> {
    type Compressor: Write;

    fn build_compressor(&self, writer: W) -> Result<Self::Compressor>;
}
