//! Packed 4-bit image buffer and decoder
//!
//! The sensor streams its 256x288 grayscale capture at 4 bits per pixel, two
//! pixels per byte, high nibble first.

use bytes::{BufMut, Bytes, BytesMut};
use image::GrayImage;
use tracing::trace;

use crate::constants::NIBBLE_SCALE;
use crate::error::{Error, Result};

/// Number of packed bytes carrying a `width x height` image
///
/// # Errors
///
/// Returns `InvalidDimensions` for empty images or odd pixel counts, which
/// cannot be split into whole bytes.
pub fn packed_len(width: u32, height: u32) -> Result<usize> {
    let pixels = width as usize * height as usize;
    if pixels == 0 || pixels % 2 != 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(pixels / 2)
}

/// Unpack nibbles into 8-bit samples
///
/// Each input byte yields two pixels, `17 * (b >> 4)` then `17 * (b & 0x0F)`.
pub fn decode_pixels(packed: &[u8]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(packed.len() * 2);
    for &byte in packed {
        pixels.push((byte >> 4) * NIBBLE_SCALE);
        pixels.push((byte & 0x0F) * NIBBLE_SCALE);
    }
    pixels
}

/// Decode a packed buffer into a `width x height` grayscale raster
///
/// The length is expected to be exactly `width * height / 2`; the transfer
/// layer enforces that before handing bytes over.
///
/// # Examples
///
/// ```
/// use as608_core::raster::decode;
///
/// let img = decode(&[0xF0], 2, 1).unwrap();
/// assert_eq!(img.as_raw(), &vec![255, 0]);
/// ```
pub fn decode(packed: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    let pixels = decode_pixels(packed);
    let actual = packed.len();

    GrayImage::from_raw(width, height, pixels).ok_or(Error::ImageSizeMismatch {
        expected: width as usize * height as usize / 2,
        actual,
    })
}

/// Append-only buffer filled chunk by chunk during an image download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageBuffer {
    data: BytesMut,
    expected: usize,
}

impl RawImageBuffer {
    /// Create an empty buffer that must end up holding `expected` bytes
    pub fn new(expected: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(expected),
            expected,
        }
    }

    /// Append one chunk payload
    pub fn extend(&mut self, payload: &[u8]) {
        self.data.put_slice(payload);
        trace!(
            chunk_len = payload.len(),
            total = self.data.len(),
            expected = self.expected,
            "Buffered image chunk"
        );
    }

    /// Bytes accumulated so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte count the download must reach
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Check if the buffer holds exactly the expected byte count
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.expected
    }

    /// Freeze the buffer, failing unless its length is exact
    pub fn into_bytes(self) -> Result<Bytes> {
        if !self.is_complete() {
            return Err(Error::ImageSizeMismatch {
                expected: self.expected,
                actual: self.data.len(),
            });
        }
        Ok(self.data.freeze())
    }

    /// Validate and decode in one step
    pub fn into_image(self, width: u32, height: u32) -> Result<GrayImage> {
        let bytes = self.into_bytes()?;
        decode(&bytes, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(256, 288).unwrap(), 36864);
        assert_eq!(packed_len(2, 1).unwrap(), 1);
        assert!(matches!(
            packed_len(3, 1),
            Err(Error::InvalidDimensions { width: 3, height: 1 })
        ));
        assert!(packed_len(0, 10).is_err());
    }

    #[test]
    fn test_decode_high_nibble_first() {
        let img = decode(&[0x1F, 0xA0], 2, 2).unwrap();
        assert_eq!(img.as_raw(), &vec![17, 255, 170, 0]);
        assert_eq!(img.get_pixel(0, 1).0, [170]);
    }

    #[test]
    fn test_decode_wrong_length() {
        let result = decode(&[0x00, 0x00], 2, 1);
        assert!(matches!(
            result,
            Err(Error::ImageSizeMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_buffer_completion() {
        let mut buf = RawImageBuffer::new(3);
        buf.extend(&[0xAA, 0xBB]);
        assert!(!buf.is_complete());
        buf.extend(&[0xCC]);
        assert!(buf.is_complete());
        assert_eq!(buf.into_bytes().unwrap().as_ref(), &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_buffer_short_is_never_partial_success() {
        let mut buf = RawImageBuffer::new(4);
        buf.extend(&[0x11, 0x22]);
        assert!(matches!(
            buf.into_bytes(),
            Err(Error::ImageSizeMismatch { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_buffer_into_image() {
        let mut buf = RawImageBuffer::new(2);
        buf.extend(&[0x0F, 0xF0]);
        let img = buf.into_image(2, 2).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.as_raw(), &vec![0, 255, 255, 0]);
    }

    proptest! {
        #[test]
        fn prop_single_byte_decode(b in any::<u8>()) {
            let img = decode(&[b], 2, 1).unwrap();
            prop_assert_eq!(img.as_raw(), &vec![17 * (b >> 4), 17 * (b & 0x0F)]);
        }

        #[test]
        fn prop_pixel_count_doubles(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(decode_pixels(&bytes).len(), bytes.len() * 2);
        }
    }
}
