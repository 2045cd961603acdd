//! The TGA pixel decoder: color map expansion, run-length decompression,
//! bit-depth unpacking and orientation fix-up.

use std::io::{self, Read};

use byteorder_lite::ReadBytesExt;

use crate::buffer::PixelBuffer;
use crate::color::ColorType;
use crate::error::{stage_error, DecodeStage, HeaderError, TgaError, TgaResult};
use crate::header::{ColorMapDepth, ColorMapType, Header, ImageType, ALPHA_BIT_MASK};
use crate::io::{vec_try_with_capacity, ReadExt};

static LOOKUP_TABLE_1_BIT_TO_8_BIT: [u8; 2] = [0, 255];
static LOOKUP_TABLE_2_BIT_TO_8_BIT: [u8; 4] = [0, 85, 170, 255];
static LOOKUP_TABLE_4_BIT_TO_8_BIT: [u8; 16] = [
    0, 17, 34, 51, 68, 85, 102, 119, 136, 153, 170, 187, 204, 221, 238, 255,
];
static LOOKUP_TABLE_5_BIT_TO_8_BIT: [u8; 32] = [
    0, 8, 16, 25, 33, 41, 49, 58, 66, 74, 82, 90, 99, 107, 115, 123, 132, 140, 148, 156, 165, 173,
    181, 189, 197, 206, 214, 222, 230, 239, 247, 255,
];

/// Expand one ARGB1555 word (stored little-endian) to 8-bit RGB.
///
/// The top bit is the attribute bit; like the original Truevision readers we
/// ignore it rather than treat it as alpha.
fn expand_argb1555(lo: u8, hi: u8) -> [u8; 3] {
    let word = u16::from_le_bytes([lo, hi]);
    [
        LOOKUP_TABLE_5_BIT_TO_8_BIT[usize::from((word >> 10) & 0x1F)],
        LOOKUP_TABLE_5_BIT_TO_8_BIT[usize::from((word >> 5) & 0x1F)],
        LOOKUP_TABLE_5_BIT_TO_8_BIT[usize::from(word & 0x1F)],
    ]
}

/// A color map with entries already expanded to canonical channels.
#[derive(Debug)]
struct ColorMap {
    /// Index of the first usable entry.
    start_index: usize,
    /// Canonical bytes per entry (3 for RGB, 4 for RGBA).
    channels: usize,
    bytes: Vec<u8>,
}

impl ColorMap {
    /// Read `length` raw entries of `depth` bits each and expand them.
    fn read_from(
        r: &mut impl Read,
        start_index: usize,
        length: usize,
        depth: ColorMapDepth,
    ) -> TgaResult<ColorMap> {
        let mut raw = Vec::new();
        r.read_exact_vec(&mut raw, depth.bytes_per_entry() * length)
            .map_err(|e| stage_error(e, DecodeStage::ColorMap))?;

        let channels = match depth {
            ColorMapDepth::Bits32 => 4,
            _ => 3,
        };
        let mut bytes = vec_try_with_capacity(channels * length)?;
        match depth {
            ColorMapDepth::Bits15 | ColorMapDepth::Bits16 => {
                for entry in raw.chunks_exact(2) {
                    bytes.extend_from_slice(&expand_argb1555(entry[0], entry[1]));
                }
            }
            ColorMapDepth::Bits24 => {
                for entry in raw.chunks_exact(3) {
                    bytes.extend_from_slice(&[entry[2], entry[1], entry[0]]);
                }
            }
            ColorMapDepth::Bits32 => {
                for entry in raw.chunks_exact(4) {
                    bytes.extend_from_slice(&[entry[2], entry[1], entry[0], entry[3]]);
                }
            }
        }

        Ok(ColorMap {
            start_index,
            channels,
            bytes,
        })
    }

    /// Get one entry from the color map
    fn get(&self, index: usize) -> Option<&[u8]> {
        let entry = self.channels * index.checked_sub(self.start_index)?;
        self.bytes.get(entry..entry + self.channels)
    }
}

/// How one source sample turns into canonical channels. Decided once while
/// validating the header, so the expansion loops have no invalid depth/type
/// combinations left to defend against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleFormat {
    /// One-byte index into the color map.
    Index8,
    /// Two-byte little-endian index into the color map.
    Index16,
    /// 16-bit ARGB1555 word, attribute bit ignored.
    Argb1555,
    /// Blue, green, red.
    Bgr8,
    /// Blue, green, red, alpha.
    Bgra8,
    /// 1-bit intensity scaled to 8 bits.
    Gray1,
    /// 2-bit intensity scaled to 8 bits.
    Gray2,
    /// 4-bit intensity scaled to 8 bits.
    Gray4,
    /// 8-bit intensity copied through.
    Gray8,
    /// 8-bit intensity followed by an 8-bit alpha channel.
    GrayAlpha8,
    /// No pixel data in the stream; the output stays blank.
    Blank,
}

impl SampleFormat {
    /// Bytes one sample occupies in the working buffer. Sub-byte samples are
    /// unpacked to one byte each as they are read.
    fn sample_bytes(self) -> usize {
        match self {
            SampleFormat::Index8
            | SampleFormat::Gray1
            | SampleFormat::Gray2
            | SampleFormat::Gray4
            | SampleFormat::Gray8
            | SampleFormat::Blank => 1,
            SampleFormat::Index16 | SampleFormat::Argb1555 | SampleFormat::GrayAlpha8 => 2,
            SampleFormat::Bgr8 => 3,
            SampleFormat::Bgra8 => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialOrd, PartialEq)]
enum TgaOrientation {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl TgaOrientation {
    fn from_image_desc_byte(value: u8) -> Self {
        // Bit 4 set means pixel order right -> left, bit 5 set means rows run
        // top -> bottom. The format default is bottom-left.
        if value & (1u8 << 4) == 0 {
            // Left -> Right
            if value & (1u8 << 5) == 0 {
                TgaOrientation::BottomLeft
            } else {
                TgaOrientation::TopLeft
            }
        } else {
            // Right -> Left
            if value & (1u8 << 5) == 0 {
                TgaOrientation::BottomRight
            } else {
                TgaOrientation::TopRight
            }
        }
    }
}

/// The representation of a TGA decoder
#[derive(Debug)]
pub struct TgaDecoder<R> {
    r: R,

    width: usize,
    height: usize,

    image_type: ImageType,
    sample_format: SampleFormat,
    // The number of bytes one sample takes in the working buffer. If a color
    // map is used, this is the number of bytes for each color map index.
    sample_bytes: usize,

    color_type: ColorType,

    header: Header,
    color_map: Option<ColorMap>,
}

impl<R: Read> TgaDecoder<R> {
    /// Create a new decoder that decodes from the stream `r`.
    ///
    /// Reads and validates the header, skips the identification field and
    /// reads the color map table if one is present, leaving the reader
    /// positioned at the start of the pixel data.
    pub fn new(mut r: R) -> TgaResult<TgaDecoder<R>> {
        let header = Header::from_reader(&mut r)?;
        let fields = header.validate()?;
        let image_type = fields.image_type;
        let width = usize::from(header.image_width);
        let height = usize::from(header.image_height);
        let num_alpha_bits = header.image_desc & ALPHA_BIT_MASK;

        if width == 0 || height == 0 {
            return Err(HeaderError::EmptyImage {
                width: header.image_width,
                height: header.image_height,
            }
            .into());
        }

        // 0 and 8 are real alpha channel widths, 1 is the ARGB1555 attribute
        // bit. Anything else has no defined channel layout.
        if ![0, 1, 8].contains(&num_alpha_bits) {
            return Err(TgaError::Unsupported {
                feature: format!("{num_alpha_bits} alpha bits in the image descriptor"),
            });
        }
        // An RLE packet repeats whole bytes; there is no defined packet unit
        // for samples narrower than a byte.
        if image_type.is_encoded() && header.pixel_depth < 8 {
            return Err(TgaError::Unsupported {
                feature: format!(
                    "run-length encoding of {}-bit pixels",
                    header.pixel_depth
                ),
            });
        }

        // Settle the sample layout and the canonical output format.
        let (sample_format, color_type) = if image_type.is_color_mapped() {
            let map_depth = fields.map_depth.ok_or(HeaderError::ColorMapMissing)?;
            let format = match header.pixel_depth {
                1 | 2 | 4 | 8 => SampleFormat::Index8,
                16 => SampleFormat::Index16,
                depth => {
                    return Err(TgaError::Unsupported {
                        feature: format!("{depth}-bit color map indices"),
                    })
                }
            };
            let color = match map_depth {
                ColorMapDepth::Bits32 => ColorType::Rgba8,
                _ => ColorType::Rgb8,
            };
            (format, color)
        } else if image_type.is_color() {
            match (header.pixel_depth, num_alpha_bits) {
                (15 | 16, 0 | 1) => (SampleFormat::Argb1555, ColorType::Rgb8),
                (24, 0) => (SampleFormat::Bgr8, ColorType::Rgb8),
                (32, 0 | 8) => (SampleFormat::Bgra8, ColorType::Rgba8),
                (depth, alpha) => {
                    return Err(TgaError::Unsupported {
                        feature: format!("{depth}-bit truecolor with {alpha} alpha bits"),
                    })
                }
            }
        } else if image_type == ImageType::NoImageData {
            (SampleFormat::Blank, ColorType::L8)
        } else {
            match (header.pixel_depth, num_alpha_bits) {
                (1, 0) => (SampleFormat::Gray1, ColorType::L8),
                (2, 0) => (SampleFormat::Gray2, ColorType::L8),
                (4, 0) => (SampleFormat::Gray4, ColorType::L8),
                // An 8 bit pixel that is all alpha is still a single channel.
                (8, 0 | 8) => (SampleFormat::Gray8, ColorType::L8),
                (16, 8) => (SampleFormat::GrayAlpha8, ColorType::La8),
                (depth, alpha) => {
                    return Err(TgaError::Unsupported {
                        feature: format!("{depth}-bit grayscale with {alpha} alpha bits"),
                    })
                }
            }
        };

        // Read image ID (and ignore it)
        let mut tmp = [0u8; 256];
        r.read_exact(&mut tmp[0..usize::from(header.id_length)])?;

        // Read the color map. A color map is allowed to accompany an image
        // that does not index into it; it still has to be consumed so the
        // pixel data that follows starts in the right place.
        let mut color_map = None;
        if fields.map_type == ColorMapType::Palette && header.map_length > 0 {
            let map = ColorMap::read_from(
                &mut r,
                usize::from(header.map_origin),
                usize::from(header.map_length),
                fields.map_depth.expect("map_length > 0 implies a map depth"),
            )?;
            if image_type.is_color_mapped() {
                color_map = Some(map);
            }
        }

        Ok(TgaDecoder {
            r,

            width,
            height,

            image_type,
            sample_format,
            sample_bytes: sample_format.sample_bytes(),

            color_type,

            header,
            color_map,
        })
    }

    /// Returns a tuple containing the width and height of the image
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Returns the color type of the pixel data produced by this decoder
    #[must_use]
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    /// Returns the total number of bytes in the decoded image.
    ///
    /// This is the size of the buffer that must be passed to `read_image`.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        let total_pixels = self.width as u64 * self.height as u64;
        total_pixels * u64::from(self.color_type.bytes_per_pixel())
    }

    /// Decode the whole image into a freshly allocated [`PixelBuffer`].
    pub fn decode(self) -> TgaResult<PixelBuffer> {
        let (width, height) = self.dimensions();
        let color_type = self.color_type();
        let len = usize::try_from(self.total_bytes()).map_err(|_| TgaError::Io {
            source: io::Error::from(io::ErrorKind::OutOfMemory),
        })?;

        let mut data = vec_try_with_capacity(len)?;
        data.resize(len, 0);
        self.read_image(&mut data)?;

        Ok(PixelBuffer::new(width, height, color_type, data))
    }

    /// Decode the whole image into `buf`.
    ///
    /// Every pixel position is written exactly once; on failure no buffer is
    /// handed back at all, so callers never observe partially decoded data.
    ///
    /// # Panics
    ///
    /// This function panics if `buf.len() != self.total_bytes()`.
    pub fn read_image(mut self, buf: &mut [u8]) -> TgaResult<()> {
        assert_eq!(u64::try_from(buf.len()), Ok(self.total_bytes()));

        if self.sample_format == SampleFormat::Blank {
            buf.fill(0);
            return Ok(());
        }

        let num_raw_bytes = self.width * self.height * self.sample_bytes;
        let mut samples = vec_try_with_capacity(num_raw_bytes)?;
        samples.resize(num_raw_bytes, 0);

        if self.header.pixel_depth < 8 {
            self.read_packed_rows(&mut samples)?;
        } else if self.image_type.is_encoded() {
            self.read_encoded_data(&mut samples)
                .map_err(|e| stage_error(e, DecodeStage::RlePackets))?;
        } else {
            self.r
                .read_exact(&mut samples)
                .map_err(|e| stage_error(e, DecodeStage::PixelData))?;
        }

        self.fixup_orientation(&mut samples);
        self.expand_samples(&samples, buf)
    }

    /// Read rows of samples narrower than a byte, unpacking them to one byte
    /// per sample. Samples are packed most significant bits first and every
    /// row starts on a byte boundary.
    fn read_packed_rows(&mut self, samples: &mut [u8]) -> TgaResult<()> {
        let depth = usize::from(self.header.pixel_depth);
        let row_bytes = (self.width * depth).div_ceil(8);
        let mask = (1u8 << depth) - 1;
        let mut packed = vec![0u8; row_bytes];

        for row in samples.chunks_exact_mut(self.width) {
            self.r
                .read_exact(&mut packed)
                .map_err(|e| stage_error(e, DecodeStage::PixelData))?;
            for (x, sample) in row.iter_mut().enumerate() {
                let bit = x * depth;
                let shift = 8 - depth - bit % 8;
                *sample = (packed[bit / 8] >> shift) & mask;
            }
        }
        Ok(())
    }

    /// Reads run length encoded data for the given number of bytes
    fn read_encoded_data(&mut self, buf: &mut [u8]) -> io::Result<()> {
        assert!(self.sample_bytes <= 4);
        let mut repeat_buf = [0; 4];
        let repeat_buf = &mut repeat_buf[..self.sample_bytes];

        let mut index = 0;
        while index < buf.len() {
            let run_packet = self.r.read_u8()?;
            // If the highest bit in `run_packet` is set, then we repeat pixels
            //
            // Note: the TGA format adds 1 to both counts because having a count
            // of 0 would be pointless.
            if (run_packet & 0x80) != 0 {
                // high bit set, so we will repeat the data
                let repeat_count = ((run_packet & !0x80) + 1) as usize;
                self.r.read_exact(repeat_buf)?;

                // A packet that would run past the pixel count is truncated.
                for chunk in buf[index..]
                    .chunks_exact_mut(self.sample_bytes)
                    .take(repeat_count)
                {
                    chunk.copy_from_slice(repeat_buf);
                }
                index += repeat_count * self.sample_bytes;
            } else {
                // not set, so `run_packet+1` is the number of non-encoded pixels
                let num_raw_bytes =
                    ((run_packet + 1) as usize * self.sample_bytes).min(buf.len() - index);

                self.r.read_exact(&mut buf[index..][..num_raw_bytes])?;
                index += num_raw_bytes;
            }
        }

        Ok(())
    }

    /// Change image orientation depending on the flags set
    fn fixup_orientation(&mut self, samples: &mut [u8]) {
        let orientation = TgaOrientation::from_image_desc_byte(self.header.image_desc);

        // Flip image if bottom->top direction
        if (orientation == TgaOrientation::BottomLeft || orientation == TgaOrientation::BottomRight)
            && self.height > 1
        {
            let row_stride = self.width * self.sample_bytes;

            let (left_part, right_part) = samples.split_at_mut(self.height / 2 * row_stride);

            for (src, dst) in left_part
                .chunks_exact_mut(row_stride)
                .zip(right_part.chunks_exact_mut(row_stride).rev())
            {
                for (src, dst) in src.iter_mut().zip(dst.iter_mut()) {
                    std::mem::swap(src, dst);
                }
            }
        }

        // Flop image if right->left direction
        if (orientation == TgaOrientation::BottomRight || orientation == TgaOrientation::TopRight)
            && self.width > 1
        {
            for row in samples.chunks_exact_mut(self.width * self.sample_bytes) {
                let (left_part, right_part) =
                    row.split_at_mut(self.width / 2 * self.sample_bytes);
                for (src, dst) in left_part
                    .chunks_exact_mut(self.sample_bytes)
                    .zip(right_part.chunks_exact_mut(self.sample_bytes).rev())
                {
                    for (src, dst) in src.iter_mut().zip(dst.iter_mut()) {
                        std::mem::swap(dst, src);
                    }
                }
            }
        }
    }

    /// Expand every sample in the working buffer to canonical channels.
    fn expand_samples(&self, samples: &[u8], buf: &mut [u8]) -> TgaResult<()> {
        let out_bpp = usize::from(self.color_type.bytes_per_pixel());

        match self.sample_format {
            SampleFormat::Index8 => {
                let map = self.color_map.as_ref().expect("checked in TgaDecoder::new");
                for (&index, chunk) in samples.iter().zip(buf.chunks_exact_mut(out_bpp)) {
                    let color = map
                        .get(usize::from(index))
                        .ok_or(TgaError::InvalidColorMapIndex {
                            index: usize::from(index),
                        })?;
                    chunk.copy_from_slice(color);
                }
            }
            SampleFormat::Index16 => {
                let map = self.color_map.as_ref().expect("checked in TgaDecoder::new");
                for (raw, chunk) in samples.chunks_exact(2).zip(buf.chunks_exact_mut(out_bpp)) {
                    let index =
                        usize::from(u16::from_le_bytes(raw.try_into().unwrap()));
                    let color = map
                        .get(index)
                        .ok_or(TgaError::InvalidColorMapIndex { index })?;
                    chunk.copy_from_slice(color);
                }
            }
            SampleFormat::Argb1555 => {
                for (raw, chunk) in samples.chunks_exact(2).zip(buf.chunks_exact_mut(3)) {
                    chunk.copy_from_slice(&expand_argb1555(raw[0], raw[1]));
                }
            }
            SampleFormat::Bgr8 => {
                for (raw, chunk) in samples.chunks_exact(3).zip(buf.chunks_exact_mut(3)) {
                    chunk.copy_from_slice(&[raw[2], raw[1], raw[0]]);
                }
            }
            SampleFormat::Bgra8 => {
                for (raw, chunk) in samples.chunks_exact(4).zip(buf.chunks_exact_mut(4)) {
                    chunk.copy_from_slice(&[raw[2], raw[1], raw[0], raw[3]]);
                }
            }
            SampleFormat::Gray1 => {
                for (&sample, out) in samples.iter().zip(buf.iter_mut()) {
                    *out = LOOKUP_TABLE_1_BIT_TO_8_BIT[usize::from(sample)];
                }
            }
            SampleFormat::Gray2 => {
                for (&sample, out) in samples.iter().zip(buf.iter_mut()) {
                    *out = LOOKUP_TABLE_2_BIT_TO_8_BIT[usize::from(sample)];
                }
            }
            SampleFormat::Gray4 => {
                for (&sample, out) in samples.iter().zip(buf.iter_mut()) {
                    *out = LOOKUP_TABLE_4_BIT_TO_8_BIT[usize::from(sample)];
                }
            }
            SampleFormat::Gray8 | SampleFormat::GrayAlpha8 => {
                buf.copy_from_slice(samples);
            }
            SampleFormat::Blank => unreachable!("handled before sample reading"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Build an 18-byte header followed by `payload`.
    fn tga(header: [u8; 18], payload: &[u8]) -> Cursor<Vec<u8>> {
        let mut bytes = header.to_vec();
        bytes.extend_from_slice(payload);
        Cursor::new(bytes)
    }

    fn truecolor_header(width: u16, height: u16, depth: u8, desc: u8) -> [u8; 18] {
        let mut header = [0u8; 18];
        header[2] = 2;
        header[12..14].copy_from_slice(&width.to_le_bytes());
        header[14..16].copy_from_slice(&height.to_le_bytes());
        header[16] = depth;
        header[17] = desc;
        header
    }

    fn decode(r: Cursor<Vec<u8>>) -> TgaResult<PixelBuffer> {
        TgaDecoder::new(r)?.decode()
    }

    #[test]
    fn truecolor_bottom_left_rows_are_flipped() {
        // Source rows bottom-up: first stored row is the bottom of the image.
        let data = tga(
            truecolor_header(2, 2, 24, 0),
            &[
                10, 11, 12, 20, 21, 22, // bottom row (BGR)
                30, 31, 32, 40, 41, 42, // top row
            ],
        );
        let buffer = decode(data).unwrap();
        assert_eq!(buffer.color_type(), ColorType::Rgb8);
        assert_eq!(buffer.pixel(0, 0), [32, 31, 30]);
        assert_eq!(buffer.pixel(1, 0), [42, 41, 40]);
        assert_eq!(buffer.pixel(0, 1), [12, 11, 10]);
        assert_eq!(buffer.pixel(1, 1), [22, 21, 20]);
    }

    #[test]
    fn truecolor_top_left_rows_kept() {
        let data = tga(
            truecolor_header(2, 2, 24, 0b10_0000),
            &[
                10, 11, 12, 20, 21, 22, //
                30, 31, 32, 40, 41, 42,
            ],
        );
        let buffer = decode(data).unwrap();
        assert_eq!(buffer.pixel(0, 0), [12, 11, 10]);
        assert_eq!(buffer.pixel(1, 1), [42, 41, 40]);
    }

    #[test]
    fn top_right_mirrors_columns() {
        let data = tga(
            truecolor_header(2, 1, 24, 0b11_0000),
            &[10, 11, 12, 20, 21, 22],
        );
        let buffer = decode(data).unwrap();
        assert_eq!(buffer.pixel(0, 0), [22, 21, 20]);
        assert_eq!(buffer.pixel(1, 0), [12, 11, 10]);
    }

    #[test]
    fn truecolor_16_bit_expands_channels() {
        // 0x7FFF = white, 0x0000 = black, red-only and blue-only words.
        let red: u16 = 0x1F << 10;
        let blue: u16 = 0x1F;
        let mut payload = Vec::new();
        for word in [0x7FFFu16, 0, red, blue] {
            payload.extend_from_slice(&word.to_le_bytes());
        }
        let data = tga(truecolor_header(4, 1, 16, 0b10_0001), &payload);
        let buffer = decode(data).unwrap();
        assert_eq!(buffer.color_type(), ColorType::Rgb8);
        assert_eq!(buffer.pixel(0, 0), [255, 255, 255]);
        assert_eq!(buffer.pixel(1, 0), [0, 0, 0]);
        assert_eq!(buffer.pixel(2, 0), [255, 0, 0]);
        assert_eq!(buffer.pixel(3, 0), [0, 0, 255]);
    }

    #[test]
    fn truecolor_32_bit_keeps_alpha() {
        let data = tga(
            truecolor_header(1, 1, 32, 0b10_1000),
            &[1, 2, 3, 128], // B G R A
        );
        let buffer = decode(data).unwrap();
        assert_eq!(buffer.color_type(), ColorType::Rgba8);
        assert_eq!(buffer.pixel(0, 0), [3, 2, 1, 128]);
    }

    #[test]
    fn rle_run_and_raw_packets() {
        // Run of 3 red pixels, then 1 raw blue pixel.
        let mut payload = vec![0x82, 0, 0, 255]; // run packet, count 3, BGR red
        payload.extend_from_slice(&[0x00, 255, 0, 0]); // raw packet, count 1, BGR blue
        let mut header = truecolor_header(4, 1, 24, 0b10_0000);
        header[2] = 10; // truecolor RLE
        let buffer = decode(tga(header, &payload)).unwrap();
        assert_eq!(buffer.pixel(0, 0), [255, 0, 0]);
        assert_eq!(buffer.pixel(2, 0), [255, 0, 0]);
        assert_eq!(buffer.pixel(3, 0), [0, 0, 255]);
    }

    #[test]
    fn rle_overlong_final_packet_is_truncated() {
        // A run of 128 pixels against a 2 pixel image.
        let mut header = truecolor_header(2, 1, 24, 0b10_0000);
        header[2] = 10;
        let buffer = decode(tga(header, &[0xFF, 5, 6, 7])).unwrap();
        assert_eq!(buffer.pixel(0, 0), [7, 6, 5]);
        assert_eq!(buffer.pixel(1, 0), [7, 6, 5]);
    }

    #[test]
    fn rle_out_of_packets_is_truncated_data() {
        // Only one pixel's worth of packets for a 4 pixel image.
        let mut header = truecolor_header(4, 1, 24, 0b10_0000);
        header[2] = 10;
        let err = decode(tga(header, &[0x80, 1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            TgaError::TruncatedData {
                stage: DecodeStage::RlePackets
            }
        ));
    }

    #[test]
    fn raw_pixel_shortfall_is_truncated_data() {
        let err = decode(tga(truecolor_header(2, 2, 24, 0), &[1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            TgaError::TruncatedData {
                stage: DecodeStage::PixelData
            }
        ));
    }

    fn color_mapped_header(
        width: u16,
        image_type: u8,
        pixel_depth: u8,
        map_origin: u16,
        map_length: u16,
        map_entry_size: u8,
    ) -> [u8; 18] {
        let mut header = [0u8; 18];
        header[1] = 1;
        header[2] = image_type;
        header[3..5].copy_from_slice(&map_origin.to_le_bytes());
        header[5..7].copy_from_slice(&map_length.to_le_bytes());
        header[7] = map_entry_size;
        header[12..14].copy_from_slice(&width.to_le_bytes());
        header[14] = 1;
        header[16] = pixel_depth;
        header[17] = 0b10_0000;
        header
    }

    #[test]
    fn color_map_lookup() {
        let mut payload = vec![
            255, 0, 0, // entry 0, BGR blue
            0, 0, 255, // entry 1, BGR red
        ];
        payload.extend_from_slice(&[1, 0, 1]); // indices
        let buffer = decode(tga(color_mapped_header(3, 1, 8, 0, 2, 24), &payload)).unwrap();
        assert_eq!(buffer.color_type(), ColorType::Rgb8);
        assert_eq!(buffer.pixel(0, 0), [255, 0, 0]);
        assert_eq!(buffer.pixel(1, 0), [0, 0, 255]);
        assert_eq!(buffer.pixel(2, 0), [255, 0, 0]);
    }

    #[test]
    fn color_map_respects_start_index() {
        let mut payload = vec![
            10, 10, 10, // entry 1
            20, 20, 20, // entry 2
        ];
        payload.push(2); // index 2 -> second entry
        let buffer = decode(tga(color_mapped_header(1, 1, 8, 1, 2, 24), &payload)).unwrap();
        assert_eq!(buffer.pixel(0, 0), [20, 20, 20]);
    }

    #[test]
    fn color_map_index_below_start_is_rejected() {
        let mut payload = vec![10, 10, 10, 20, 20, 20];
        payload.push(0);
        let err = decode(tga(color_mapped_header(1, 1, 8, 1, 2, 24), &payload)).unwrap_err();
        assert!(matches!(err, TgaError::InvalidColorMapIndex { index: 0 }));
    }

    #[test]
    fn color_map_index_out_of_range_is_rejected() {
        let mut payload = vec![10, 10, 10, 20, 20, 20];
        payload.push(2);
        let err = decode(tga(color_mapped_header(1, 1, 8, 0, 2, 24), &payload)).unwrap_err();
        assert!(matches!(err, TgaError::InvalidColorMapIndex { index: 2 }));
    }

    #[test]
    fn color_map_16_bit_indices() {
        let mut payload = vec![0, 0, 0, 0, 0, 255]; // two BGR entries
        payload.extend_from_slice(&1u16.to_le_bytes());
        let buffer = decode(tga(color_mapped_header(1, 1, 16, 0, 2, 24), &payload)).unwrap();
        assert_eq!(buffer.pixel(0, 0), [255, 0, 0]);
    }

    #[test]
    fn color_map_rgba_entries() {
        let mut payload = vec![
            1, 2, 3, 4, // BGRA
            5, 6, 7, 8,
        ];
        payload.push(1);
        let buffer = decode(tga(color_mapped_header(1, 1, 8, 0, 2, 32), &payload)).unwrap();
        assert_eq!(buffer.color_type(), ColorType::Rgba8);
        assert_eq!(buffer.pixel(0, 0), [7, 6, 5, 8]);
    }

    #[test]
    fn color_map_shortfall_is_truncated_data() {
        let err = decode(tga(color_mapped_header(1, 1, 8, 0, 2, 24), &[1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            TgaError::TruncatedData {
                stage: DecodeStage::ColorMap
            }
        ));
    }

    #[test]
    fn unused_color_map_is_skipped() {
        // A palette accompanies a grayscale image; the pixel data starts
        // after it.
        let mut header = [0u8; 18];
        header[1] = 1; // palette present
        header[2] = 3; // grayscale
        header[5..7].copy_from_slice(&2u16.to_le_bytes());
        header[7] = 24;
        header[12] = 1;
        header[14] = 1;
        header[16] = 8;
        header[17] = 0b10_0000;
        let payload = [9, 9, 9, 9, 9, 9, 77]; // 2 map entries, then one gray pixel
        let buffer = decode(tga(header, &payload)).unwrap();
        assert_eq!(buffer.color_type(), ColorType::L8);
        assert_eq!(buffer.pixel(0, 0), [77]);
    }

    #[test]
    fn grayscale_4_bit_packed_rows() {
        // 3 samples per row at 4 bpp: two bytes per row, low nibble of the
        // second byte is padding.
        let mut header = [0u8; 18];
        header[2] = 3;
        header[12] = 3;
        header[14] = 2;
        header[16] = 4;
        header[17] = 0b10_0000;
        let payload = [0x0F, 0x80, 0xF0, 0x10];
        let buffer = decode(tga(header, &payload)).unwrap();
        assert_eq!(buffer.as_bytes(), &[0, 255, 136, 255, 0, 17]);
    }

    #[test]
    fn grayscale_1_bit_packed_rows() {
        let mut header = [0u8; 18];
        header[2] = 3;
        header[12] = 10; // 10 pixels: 2 bytes per row
        header[14] = 1;
        header[16] = 1;
        header[17] = 0b10_0000;
        let payload = [0b1010_1010, 0b1100_0000];
        let buffer = decode(tga(header, &payload)).unwrap();
        assert_eq!(
            buffer.as_bytes(),
            &[255, 0, 255, 0, 255, 0, 255, 0, 255, 255]
        );
    }

    #[test]
    fn sub_byte_color_map_indices() {
        let mut payload = vec![
            255, 0, 0, // entry 0
            0, 255, 0, //
            0, 0, 255, //
            9, 9, 9, // entry 3
        ];
        payload.push(0b00_01_10_11); // indices 0,1,2,3 at 2 bpp
        let buffer = decode(tga(color_mapped_header(4, 1, 2, 0, 4, 24), &payload)).unwrap();
        assert_eq!(buffer.pixel(0, 0), [0, 0, 255]);
        assert_eq!(buffer.pixel(1, 0), [0, 255, 0]);
        assert_eq!(buffer.pixel(2, 0), [255, 0, 0]);
        assert_eq!(buffer.pixel(3, 0), [9, 9, 9]);
    }

    #[test]
    fn grayscale_16_bit_with_alpha() {
        let mut header = [0u8; 18];
        header[2] = 3;
        header[12] = 1;
        header[14] = 1;
        header[16] = 16;
        header[17] = 0b10_1000; // top-left, 8 alpha bits
        let buffer = decode(tga(header, &[200, 100])).unwrap();
        assert_eq!(buffer.color_type(), ColorType::La8);
        assert_eq!(buffer.pixel(0, 0), [200, 100]);
    }

    #[test]
    fn no_image_data_is_blank() {
        let mut header = [0u8; 18];
        header[12] = 2;
        header[14] = 2;
        header[16] = 8;
        let buffer = decode(tga(header, &[])).unwrap();
        assert_eq!(buffer.color_type(), ColorType::L8);
        assert_eq!(buffer.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let header = truecolor_header(0, 4, 24, 0);
        let err = TgaDecoder::new(tga(header, &[])).unwrap_err();
        assert!(matches!(
            err,
            TgaError::InvalidHeader {
                source: HeaderError::EmptyImage { width: 0, height: 4 }
            }
        ));
    }

    #[test]
    fn sub_byte_rle_is_unsupported() {
        let mut header = color_mapped_header(4, 9, 4, 0, 2, 24);
        header[2] = 9; // color-mapped RLE
        let err = TgaDecoder::new(tga(header, &[])).unwrap_err();
        assert!(matches!(err, TgaError::Unsupported { .. }));
    }

    #[test]
    fn truecolor_8_bit_is_unsupported() {
        let header = truecolor_header(1, 1, 8, 0);
        let err = TgaDecoder::new(tga(header, &[0])).unwrap_err();
        assert!(matches!(err, TgaError::Unsupported { .. }));
    }

    #[test]
    fn id_field_is_skipped() {
        let mut header = truecolor_header(1, 1, 24, 0b10_0000);
        header[0] = 3;
        let buffer = decode(tga(header, &[b'i', b'd', b'!', 1, 2, 3])).unwrap();
        assert_eq!(buffer.pixel(0, 0), [3, 2, 1]);
    }
}
