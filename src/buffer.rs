//! The decoded pixel buffer handed to the caller.

use crate::color::ColorType;

/// A fully decoded image: row-major, tightly packed 8-bit channels with a
/// top-left origin. Ownership of the data passes to the caller on a
/// successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    color_type: ColorType,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap decoded bytes. The container length must match the dimensions.
    pub(crate) fn new(width: u32, height: u32, color_type: ColorType, data: Vec<u8>) -> PixelBuffer {
        debug_assert_eq!(
            data.len() as u64,
            u64::from(width) * u64::from(height) * u64::from(color_type.bytes_per_pixel())
        );
        PixelBuffer {
            width,
            height,
            color_type,
            data,
        }
    }

    /// The width of this image in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of this image in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a tuple containing the width and height of the image.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The canonical channel layout of every pixel in [`as_bytes`](Self::as_bytes).
    #[must_use]
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    /// The raw decoded bytes, rows from top to bottom, pixels left to right,
    /// channels packed per [`color_type`](Self::color_type).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The channels of the pixel at `(x, y)`, counted from the top-left corner.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` lies outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let bpp = usize::from(self.color_type.bytes_per_pixel());
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        &self.data[offset..offset + bpp]
    }

    /// Consume the buffer, returning the underlying bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
