//! Contains detailed error representation.
//!
//! See the main [`TgaError`] which contains a variant for each failure class. Header
//! violations carry a [`HeaderError`] naming the offending field and the observed
//! value; truncation errors carry the [`DecodeStage`] that ran dry.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

use snafu::prelude::*;

/// The generic error type for decoding operations.
///
/// This high level enum allows, by variant matching, a rough separation of concerns
/// between underlying IO, malformed headers and data the format cannot express.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum TgaError {
    /// A header field or cross-field invariant does not hold.
    ///
    /// The header was readable but its contents do not describe a valid TGA image.
    /// [`classify`](crate::classify) converts this class of failure into a `false`
    /// verdict instead.
    #[snafu(context(false))]
    #[snafu(display("invalid TGA header: {source}"))]
    InvalidHeader {
        /// The violated field constraint.
        source: HeaderError,
    },

    /// The header is valid but describes a depth/type combination with no defined
    /// channel layout, or a feature this decoder does not implement.
    #[snafu(display("unsupported TGA image: {feature}"))]
    Unsupported {
        /// Description of the unsupported feature.
        feature: String,
    },

    /// The stream ended before the named decode stage was fully consumed.
    #[snafu(display("truncated TGA data while reading {stage}"))]
    TruncatedData {
        /// The stage that ran out of bytes.
        stage: DecodeStage,
    },

    /// Pixel data referenced a color-map entry outside the table.
    #[snafu(display("color map index {index} out of range"))]
    InvalidColorMapIndex {
        /// The out-of-range index.
        index: usize,
    },

    /// An error occurred while interacting with the underlying reader.
    #[snafu(context(false))]
    #[snafu(display("IO error: {source}"))]
    Io {
        /// The propagated reader failure.
        source: io::Error,
    },
}

impl From<TryReserveError> for TgaError {
    fn from(err: TryReserveError) -> TgaError {
        TgaError::Io {
            source: io::Error::new(io::ErrorKind::OutOfMemory, err),
        }
    }
}

/// A violated header field constraint, with the observed value.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeaderError {
    /// The color map type byte is neither 0 (none) nor 1 (palette).
    #[snafu(display("color map type {value} is not 0 or 1"))]
    ColorMapTypeInvalid {
        /// Observed color map type byte.
        value: u8,
    },

    /// The image type byte is outside the set 0, 1, 2, 3, 9, 10, 11.
    #[snafu(display("image type {value} is not a known TGA image type"))]
    ImageTypeInvalid {
        /// Observed image type byte.
        value: u8,
    },

    /// No color map is present but the start or depth fields are not zeroed.
    #[snafu(display(
        "empty color map with non-zero start {start} or entry depth {depth}"
    ))]
    ColorMapNotZeroed {
        /// Observed first-entry index.
        start: u16,
        /// Observed entry depth in bits.
        depth: u8,
    },

    /// A color map is present but the color map type byte says none.
    #[snafu(display("color map of {length} entries without palette color map type"))]
    ColorMapWithoutPalette {
        /// Observed color map length.
        length: u16,
    },

    /// A present color map must hold at least two entries.
    #[snafu(display("color map of {length} entries is shorter than 2"))]
    ColorMapTooShort {
        /// Observed color map length.
        length: u16,
    },

    /// The first used entry lies at or beyond the end of the color map.
    #[snafu(display("color map start {start} not below length {length}"))]
    ColorMapStartOutOfRange {
        /// Observed first-entry index.
        start: u16,
        /// Observed color map length.
        length: u16,
    },

    /// The color map entry depth is outside the set 15, 16, 24, 32.
    #[snafu(display("color map entry depth {value} is not one of 15, 16, 24 or 32"))]
    ColorMapDepthInvalid {
        /// Observed entry depth in bits.
        value: u8,
    },

    /// A color-mapped image type with no color map to index into.
    #[snafu(display("color-mapped image without a color map"))]
    ColorMapMissing,

    /// The pixel depth is outside the set 1, 2, 4, 8, 16, 24, 32.
    #[snafu(display("pixel depth {value} is not one of 1, 2, 4, 8, 16, 24 or 32"))]
    PixelDepthInvalid {
        /// Observed pixel depth in bits.
        value: u8,
    },

    /// Width or height is zero; nothing can be decoded.
    #[snafu(display("invalid empty image ({width}x{height})"))]
    EmptyImage {
        /// Observed width in pixels.
        width: u16,
        /// Observed height in pixels.
        height: u16,
    },
}

/// The decode stage during which the stream ran out of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DecodeStage {
    /// Reading the color map table.
    ColorMap,
    /// Reading uncompressed pixel data.
    PixelData,
    /// Reading run-length encoded packets.
    RlePackets,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStage::ColorMap => f.write_str("the color map table"),
            DecodeStage::PixelData => f.write_str("pixel data"),
            DecodeStage::RlePackets => f.write_str("RLE packets"),
        }
    }
}

/// Result of a decoding process
pub type TgaResult<T> = Result<T, TgaError>;

/// Classify an `io::Error` raised by the given decode stage.
///
/// `UnexpectedEof` means the stream ended mid-stage and is reported as
/// [`TgaError::TruncatedData`]; anything else is a genuine IO fault.
pub(crate) fn stage_error(err: io::Error, stage: DecodeStage) -> TgaError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TgaError::TruncatedData { stage }
    } else {
        TgaError::Io { source: err }
    }
}
