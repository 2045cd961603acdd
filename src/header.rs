//! The fixed 18-byte TGA header and its field-level validation.
//!
//! TGA carries no magic number; the header fields with enumerable legal
//! ranges are all the format gives us to recognize it by. The closed enums
//! here are that legal range: a raw byte that does not map to a variant is
//! rejected at the parse boundary, so the decoder never needs defensive
//! `unreachable!` arms on field values.

use std::io::Read;

use byteorder_lite::{LittleEndian, ReadBytesExt};

use crate::error::HeaderError;

/// Alpha channel bit count lives in the low 4 bits of the image descriptor.
pub(crate) const ALPHA_BIT_MASK: u8 = 0b1111;

/// Pixel depths the format admits, in bits per pixel.
pub(crate) const PIXEL_DEPTHS: [u8; 7] = [1, 2, 4, 8, 16, 24, 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorMapType {
    None = 0,
    Palette = 1,
}

impl ColorMapType {
    pub(crate) fn from_u8(value: u8) -> Option<ColorMapType> {
        match value {
            0 => Some(ColorMapType::None),
            1 => Some(ColorMapType::Palette),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageType {
    NoImageData = 0,
    /// Uncompressed images.
    RawColorMap = 1,
    RawTrueColor = 2,
    RawGrayScale = 3,
    /// Run length encoded images.
    RunColorMap = 9,
    RunTrueColor = 10,
    RunGrayScale = 11,
}

impl ImageType {
    /// Create a new image type from a u8, rejecting unknown codes.
    pub(crate) fn from_u8(img_type: u8) -> Option<ImageType> {
        match img_type {
            0 => Some(ImageType::NoImageData),

            1 => Some(ImageType::RawColorMap),
            2 => Some(ImageType::RawTrueColor),
            3 => Some(ImageType::RawGrayScale),

            9 => Some(ImageType::RunColorMap),
            10 => Some(ImageType::RunTrueColor),
            11 => Some(ImageType::RunGrayScale),

            _ => None,
        }
    }

    /// Check if the image format uses colors as opposed to gray scale.
    pub(crate) fn is_color(self) -> bool {
        matches! { self,
            ImageType::RawColorMap
            | ImageType::RawTrueColor
            | ImageType::RunTrueColor
            | ImageType::RunColorMap
        }
    }

    /// Does the image use a color map.
    pub(crate) fn is_color_mapped(self) -> bool {
        matches! { self, ImageType::RawColorMap | ImageType::RunColorMap }
    }

    /// Is the image run length encoded.
    pub(crate) fn is_encoded(self) -> bool {
        matches! { self, ImageType::RunColorMap | ImageType::RunTrueColor | ImageType::RunGrayScale }
    }
}

/// Bit width of one color map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorMapDepth {
    Bits15,
    Bits16,
    Bits24,
    Bits32,
}

impl ColorMapDepth {
    pub(crate) fn from_u8(value: u8) -> Option<ColorMapDepth> {
        match value {
            15 => Some(ColorMapDepth::Bits15),
            16 => Some(ColorMapDepth::Bits16),
            24 => Some(ColorMapDepth::Bits24),
            32 => Some(ColorMapDepth::Bits32),
            _ => None,
        }
    }

    /// Bytes occupied by one raw entry in the stream.
    pub(crate) fn bytes_per_entry(self) -> usize {
        match self {
            ColorMapDepth::Bits15 | ColorMapDepth::Bits16 => 2,
            ColorMapDepth::Bits24 => 3,
            ColorMapDepth::Bits32 => 4,
        }
    }
}

/// Header used by TGA image files.
#[derive(Debug, Default, Clone)]
pub(crate) struct Header {
    pub(crate) id_length: u8,      // length of ID string
    pub(crate) map_type: u8,       // color map type
    pub(crate) image_type: u8,     // image type code
    pub(crate) map_origin: u16,    // starting index of map
    pub(crate) map_length: u16,    // length of map
    pub(crate) map_entry_size: u8, // size of map entries in bits
    pub(crate) x_origin: u16,      // x-origin of image
    pub(crate) y_origin: u16,      // y-origin of image
    pub(crate) image_width: u16,   // width of image
    pub(crate) image_height: u16,  // height of image
    pub(crate) pixel_depth: u8,    // bits per pixel
    pub(crate) image_desc: u8,     // image descriptor
}

/// The enumerated fields of a [`Header`] after validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValidatedFields {
    pub(crate) map_type: ColorMapType,
    pub(crate) image_type: ImageType,
    /// `Some` iff the header carries a color map (`map_length > 0`).
    pub(crate) map_depth: Option<ColorMapDepth>,
}

impl Header {
    /// Load the header with values from the reader.
    pub(crate) fn from_reader(r: &mut dyn Read) -> std::io::Result<Self> {
        Ok(Self {
            id_length: r.read_u8()?,
            map_type: r.read_u8()?,
            image_type: r.read_u8()?,
            map_origin: r.read_u16::<LittleEndian>()?,
            map_length: r.read_u16::<LittleEndian>()?,
            map_entry_size: r.read_u8()?,
            x_origin: r.read_u16::<LittleEndian>()?,
            y_origin: r.read_u16::<LittleEndian>()?,
            image_width: r.read_u16::<LittleEndian>()?,
            image_height: r.read_u16::<LittleEndian>()?,
            pixel_depth: r.read_u8()?,
            image_desc: r.read_u8()?,
        })
    }

    /// Check every field constraint and cross-field color map invariant,
    /// converting the raw enumerated bytes into closed variants.
    ///
    /// The origin and dimension fields are deliberately not constrained here;
    /// any bit pattern is legal for them.
    pub(crate) fn validate(&self) -> Result<ValidatedFields, HeaderError> {
        let map_type = ColorMapType::from_u8(self.map_type)
            .ok_or(HeaderError::ColorMapTypeInvalid { value: self.map_type })?;
        let image_type = ImageType::from_u8(self.image_type)
            .ok_or(HeaderError::ImageTypeInvalid { value: self.image_type })?;

        let map_depth = if self.map_length == 0 {
            // No color map, the remaining map fields must be zeroed.
            if self.map_origin != 0 || self.map_entry_size != 0 {
                return Err(HeaderError::ColorMapNotZeroed {
                    start: self.map_origin,
                    depth: self.map_entry_size,
                });
            }
            None
        } else {
            if map_type == ColorMapType::None {
                return Err(HeaderError::ColorMapWithoutPalette {
                    length: self.map_length,
                });
            }
            if self.map_length < 2 {
                return Err(HeaderError::ColorMapTooShort {
                    length: self.map_length,
                });
            }
            if self.map_origin >= self.map_length {
                return Err(HeaderError::ColorMapStartOutOfRange {
                    start: self.map_origin,
                    length: self.map_length,
                });
            }
            Some(
                ColorMapDepth::from_u8(self.map_entry_size).ok_or(
                    HeaderError::ColorMapDepthInvalid {
                        value: self.map_entry_size,
                    },
                )?,
            )
        };

        if !PIXEL_DEPTHS.contains(&self.pixel_depth) {
            return Err(HeaderError::PixelDepthInvalid {
                value: self.pixel_depth,
            });
        }

        Ok(ValidatedFields {
            map_type,
            image_type,
            map_depth,
        })
    }
}
