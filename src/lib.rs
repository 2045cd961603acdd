//! Decoding of TGA Images
//!
//! TGA (Truevision Graphics Adapter) is a header-then-data raster format
//! with no magic number at the start of the file. This crate provides the
//! two operations a format-dispatch layer needs: [`classify`], a heuristic
//! that decides from the 18-byte header whether a stream plausibly holds a
//! TGA image, and [`decode`] (or the lower-level [`TgaDecoder`]), which
//! fully materializes the pixel data.
//!
//! All seven image types are handled: uncompressed and run-length encoded
//! variants of color-mapped, truecolor and grayscale data, with 15/16/24/32
//! bit color map entries and truecolor pixels and 1/2/4/8/16 bit indices
//! and intensities. Output is always 8 bits per channel with a top-left
//! origin; the orientation flags of the image descriptor are applied by the
//! decoder.
//!
//! TGA 2.0 files may carry a trailing extension area and developer
//! directory after the image data; this crate does not read them.
//!
//! # Related Links
//! <https://en.wikipedia.org/wiki/Truevision_TGA>
//!
//! # Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let mut reader = BufReader::new(File::open("image.tga")?);
//! if targa::classify(&mut reader)? {
//!     let image = targa::decode(reader)?;
//!     println!("{}x{}", image.width(), image.height());
//! }
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unused_qualifications)]
#![deny(unreachable_pub)]
#![forbid(unsafe_code)]

use std::io::Read;

mod buffer;
mod color;
mod decoder;
mod error;
mod header;
mod io;
mod sniffer;

pub use crate::buffer::PixelBuffer;
pub use crate::color::ColorType;
pub use crate::decoder::TgaDecoder;
pub use crate::error::{DecodeStage, HeaderError, TgaError, TgaResult};
pub use crate::sniffer::classify;

/// Decode a TGA image from the reader into a [`PixelBuffer`].
///
/// The stream does not have to be pre-screened with [`classify`]; a stream
/// that is not a valid TGA image fails with [`TgaError::InvalidHeader`]
/// rather than decoding garbage.
///
/// # Errors
///
/// Any header invariant violation, truncated color map, pixel or RLE data,
/// or fault of the underlying reader. A partially decoded buffer is never
/// returned.
pub fn decode<R: Read>(r: R) -> TgaResult<PixelBuffer> {
    TgaDecoder::new(r)?.decode()
}
