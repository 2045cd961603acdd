/// An enumeration over the canonical output formats produced by the decoder.
///
/// Whatever the pixel depth of the source data, every sample is expanded to
/// one of these 8-bit-per-channel representations.
#[derive(Copy, PartialEq, Eq, Debug, Clone, Hash)]
#[non_exhaustive]
pub enum ColorType {
    /// Pixel is 8-bit luminance
    L8,
    /// Pixel is 8-bit luminance with an alpha channel
    La8,
    /// Pixel contains 8-bit R, G and B channels
    Rgb8,
    /// Pixel is 8-bit RGB with an alpha channel
    Rgba8,
}

impl ColorType {
    /// Returns the number of bytes contained in a pixel of `ColorType` ```c```
    #[must_use]
    pub fn bytes_per_pixel(self) -> u8 {
        match self {
            ColorType::L8 => 1,
            ColorType::La8 => 2,
            ColorType::Rgb8 => 3,
            ColorType::Rgba8 => 4,
        }
    }

    /// Returns the number of color channels that make up this pixel
    #[must_use]
    pub fn channel_count(self) -> u8 {
        self.bytes_per_pixel()
    }

    /// Returns if there is an alpha channel.
    #[must_use]
    pub fn has_alpha(self) -> bool {
        use ColorType::*;
        match self {
            L8 | Rgb8 => false,
            La8 | Rgba8 => true,
        }
    }

    /// Returns false if the color scheme is grayscale, true otherwise.
    #[must_use]
    pub fn has_color(self) -> bool {
        use ColorType::*;
        match self {
            L8 | La8 => false,
            Rgb8 | Rgba8 => true,
        }
    }
}
