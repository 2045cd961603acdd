//! Content-based recognition of TGA streams.
//!
//! The TGA format has no magic identifier, so this is guesswork: the header
//! fields with enumerable legal ranges are checked against those ranges and
//! a stream that passes every check is judged plausible. False positives on
//! non-TGA data that happens to carry a valid-looking byte pattern remain
//! possible.

use std::io::{Read, Seek};

use byteorder_lite::{LittleEndian, ReadBytesExt};

use crate::header::{ColorMapDepth, ColorMapType, ImageType, PIXEL_DEPTHS};
use crate::io::StreamGuard;

/// Decide whether the stream at the current position plausibly starts a TGA
/// image.
///
/// Reads the 18 fixed header bytes and validates every field with an
/// enumerable legal range, returning `false` at the first violated
/// constraint without reading further. The stream position is restored
/// before returning on every path, including propagated IO faults, so the
/// caller may probe the same stream against several formats in sequence.
///
/// A `true` verdict is probabilistic, not proof; only a full
/// [`decode`](crate::decode) settles the question.
///
/// # Errors
///
/// Returns any failure of the underlying reader, including running out of
/// bytes inside the 18-byte header. Malformed-but-readable headers are a
/// `false` verdict, never an error.
pub fn classify<R: Read + Seek>(r: &mut R) -> std::io::Result<bool> {
    let mut guard = StreamGuard::mark(r)?;
    classify_header(&mut *guard)
}

fn classify_header<R: Read>(r: &mut R) -> std::io::Result<bool> {
    // ID length, any value is fine.
    r.read_u8()?;

    let Some(map_type) = ColorMapType::from_u8(r.read_u8()?) else {
        return Ok(false);
    };
    if ImageType::from_u8(r.read_u8()?).is_none() {
        return Ok(false);
    }

    let map_origin = r.read_u16::<LittleEndian>()?;
    let map_length = r.read_u16::<LittleEndian>()?;
    let map_entry_size = r.read_u8()?;

    if map_length == 0 {
        // No color map, all 3 fields should be 0.
        if map_origin != 0 || map_entry_size != 0 {
            return Ok(false);
        }
    } else {
        if map_type == ColorMapType::None {
            return Ok(false);
        }
        if map_length < 2 {
            return Ok(false);
        }
        if map_origin >= map_length {
            return Ok(false);
        }
        if ColorMapDepth::from_u8(map_entry_size).is_none() {
            return Ok(false);
        }
    }

    // Skip x, y, w, h as these can be anything.
    for _ in 0..4 {
        r.read_u16::<LittleEndian>()?;
    }

    // Verify sane pixel depth.
    if !PIXEL_DEPTHS.contains(&r.read_u8()?) {
        return Ok(false);
    }

    // We're pretty sure by now, but there can still be false positives.
    // For 2.0 format files we could seek to the end and look for the
    // "TRUEVISION-XFILE.\0" signature, but that would be too slow.
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A minimal valid header: uncompressed truecolor, 1x1, 24 bpp.
    fn truecolor_header() -> [u8; 18] {
        let mut header = [0u8; 18];
        header[2] = 2; // image type
        header[12] = 1; // width
        header[14] = 1; // height
        header[16] = 24; // pixel depth
        header
    }

    #[test]
    fn accepts_minimal_truecolor() {
        assert!(classify(&mut Cursor::new(truecolor_header())).unwrap());
    }

    #[test]
    fn accepts_color_mapped_example() {
        // idLength=0, palette, color-mapped, 2 entries of 24 bits, 1x1, 8 bpp
        let bytes = [
            0x00, 0x01, 0x01, 0x00, 0x00, 0x02, 0x00, 0x18, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
            0x01, 0x00, 0x08, 0x00,
        ];
        assert!(classify(&mut Cursor::new(bytes)).unwrap());
    }

    #[test]
    fn rejects_bad_color_map_type() {
        let mut header = truecolor_header();
        header[1] = 2;
        assert!(!classify(&mut Cursor::new(header)).unwrap());
    }

    #[test]
    fn rejects_bad_image_type() {
        let mut header = truecolor_header();
        for bad in [4, 8, 12, 128, 255] {
            header[2] = bad;
            assert!(!classify(&mut Cursor::new(header)).unwrap());
        }
    }

    #[test]
    fn empty_map_with_nonzero_fields() {
        // Start index set while the map is empty.
        let mut header = truecolor_header();
        header[3] = 1;
        assert!(!classify(&mut Cursor::new(header)).unwrap());

        // Entry depth set while the map is empty.
        let mut header = truecolor_header();
        header[7] = 24;
        assert!(!classify(&mut Cursor::new(header)).unwrap());
    }

    fn color_mapped_header(start: u16, length: u16, depth: u8) -> [u8; 18] {
        let mut header = truecolor_header();
        header[1] = 1; // palette
        header[2] = 1; // color-mapped
        header[3..5].copy_from_slice(&start.to_le_bytes());
        header[5..7].copy_from_slice(&length.to_le_bytes());
        header[7] = depth;
        header[16] = 8;
        header
    }

    #[test]
    fn map_start_boundary() {
        assert!(classify(&mut Cursor::new(color_mapped_header(255, 256, 24))).unwrap());
        assert!(!classify(&mut Cursor::new(color_mapped_header(256, 256, 24))).unwrap());
    }

    #[test]
    fn map_needs_palette_type_and_two_entries() {
        let mut header = color_mapped_header(0, 2, 24);
        header[1] = 0;
        assert!(!classify(&mut Cursor::new(header)).unwrap());

        assert!(!classify(&mut Cursor::new(color_mapped_header(0, 1, 24))).unwrap());
    }

    #[test]
    fn map_depth_set() {
        for bad in [0, 1, 8, 17, 31, 255] {
            assert!(!classify(&mut Cursor::new(color_mapped_header(0, 2, bad))).unwrap());
        }
        for good in [15, 16, 24, 32] {
            assert!(classify(&mut Cursor::new(color_mapped_header(0, 2, good))).unwrap());
        }
    }

    #[test]
    fn pixel_depth_set() {
        let mut header = truecolor_header();
        for bad in [0, 3, 5, 9, 64, 255] {
            header[16] = bad;
            assert!(!classify(&mut Cursor::new(header)).unwrap());
        }
        for good in PIXEL_DEPTHS {
            header[16] = good;
            assert!(classify(&mut Cursor::new(header)).unwrap());
        }
    }

    #[test]
    fn idempotent_and_position_preserving() {
        // The header sits behind a 5 byte prefix; the cursor must come back
        // to the prefix end after each probe.
        let mut bytes = vec![0xAAu8; 5];
        bytes.extend_from_slice(&truecolor_header());
        let mut cursor = Cursor::new(bytes);
        cursor.set_position(5);

        assert!(classify(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 5);
        assert!(classify(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn short_stream_propagates_eof_and_restores() {
        let mut cursor = Cursor::new([0u8; 10]);
        let err = classify(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn rejection_restores_position() {
        let mut header = truecolor_header();
        header[1] = 9;
        let mut cursor = Cursor::new(header);
        assert!(!classify(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 0);
    }
}
