//! Strided views over caller-owned 32-bpp pixel buffers.

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::pixel::Pixel;

/// Geometry and format of an image. `stride` counts pixels, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub format: PixelFormat,
}

impl ImageDesc {
    /// Tightly packed rows.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            stride: width,
            format,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Pixels a buffer must hold: the last row needs no padding.
    pub fn required_len(&self) -> usize {
        match self.height {
            0 => 0,
            h => self.stride * (h - 1) + self.width,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stride < self.width {
            return Err(Error::InvalidGeometry {
                width: self.width,
                height: self.height,
                stride: self.stride,
            });
        }
        Ok(())
    }

    fn check_buffer(&self, len: usize) -> Result<()> {
        self.validate()?;
        let required = self.required_len();
        if len < required {
            return Err(Error::BufferTooSmall {
                required,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn row_range(&self, y: usize) -> std::ops::Range<usize> {
        assert!(y < self.height, "row {} out of {} rows", y, self.height);
        let start = y * self.stride;
        start..start + self.width
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    desc: ImageDesc,
    pixels: &'a [Pixel],
}

impl<'a> ImageView<'a> {
    pub fn new(desc: ImageDesc, pixels: &'a [Pixel]) -> Result<Self> {
        desc.check_buffer(pixels.len())?;
        Ok(Self { desc, pixels })
    }

    /// Views raw bytes as pixels; `bytes` must be 4-byte aligned.
    pub fn from_bytes(desc: ImageDesc, bytes: &'a [u8]) -> Result<Self> {
        let pixels: &[Pixel] = bytemuck::try_cast_slice(bytes).map_err(Error::Cast)?;
        Self::new(desc, pixels)
    }

    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn pixels(&self) -> &'a [Pixel] {
        self.pixels
    }

    /// The `width` pixels of row `y`, without stride padding.
    pub fn row(&self, y: usize) -> &'a [Pixel] {
        &self.pixels[self.desc.row_range(y)]
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [Pixel]> + '_ {
        (0..self.desc.height).map(move |y| self.row(y))
    }
}

#[derive(Debug)]
pub struct ImageViewMut<'a> {
    desc: ImageDesc,
    pixels: &'a mut [Pixel],
}

impl<'a> ImageViewMut<'a> {
    pub fn new(desc: ImageDesc, pixels: &'a mut [Pixel]) -> Result<Self> {
        desc.check_buffer(pixels.len())?;
        Ok(Self { desc, pixels })
    }

    pub fn from_bytes(desc: ImageDesc, bytes: &'a mut [u8]) -> Result<Self> {
        let pixels: &mut [Pixel] = bytemuck::try_cast_slice_mut(bytes).map_err(Error::Cast)?;
        Self::new(desc, pixels)
    }

    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn pixels(&self) -> &[Pixel] {
        &*self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut *self.pixels
    }

    pub fn row(&self, y: usize) -> &[Pixel] {
        &self.pixels[self.desc.row_range(y)]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [Pixel] {
        let range = self.desc.row_range(y);
        &mut self.pixels[range]
    }

    pub fn as_view(&self) -> ImageView<'_> {
        ImageView {
            desc: self.desc,
            pixels: &*self.pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_len_skips_last_row_padding() {
        let desc = ImageDesc::new(3, 4, PixelFormat::A8R8G8B8).with_stride(5);
        assert_eq!(desc.required_len(), 5 * 3 + 3);
        assert_eq!(ImageDesc::new(3, 0, PixelFormat::A8R8G8B8).required_len(), 0);
    }

    #[test]
    fn test_stride_smaller_than_width_rejected() {
        let desc = ImageDesc::new(4, 2, PixelFormat::A8R8G8B8).with_stride(3);
        let pixels = [0; 16];
        assert!(matches!(
            ImageView::new(desc, &pixels),
            Err(Error::InvalidGeometry { stride: 3, .. })
        ));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let desc = ImageDesc::new(4, 2, PixelFormat::A8R8G8B8);
        let mut pixels = [0; 7];
        assert!(matches!(
            ImageViewMut::new(desc, &mut pixels),
            Err(Error::BufferTooSmall {
                required: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_rows_exclude_padding() {
        let desc = ImageDesc::new(2, 3, PixelFormat::X8R8G8B8).with_stride(3);
        let pixels: Vec<Pixel> = (0..8).collect();
        let view = ImageView::new(desc, &pixels).unwrap();
        let rows: Vec<&[Pixel]> = view.rows().collect();
        assert_eq!(rows, vec![&[0, 1][..], &[3, 4][..], &[6, 7][..]]);
    }

    #[test]
    fn test_from_bytes_casts_pixels() {
        let pixels: Vec<Pixel> = vec![0x0403_0201, 0x0807_0605];
        let bytes: &[u8] = bytemuck::cast_slice(&pixels);
        let desc = ImageDesc::new(2, 1, PixelFormat::A8R8G8B8);
        let view = ImageView::from_bytes(desc, bytes).unwrap();
        assert_eq!(view.row(0), &pixels[..]);

        // Three bytes cannot hold whole pixels.
        assert!(matches!(
            ImageView::from_bytes(desc, &bytes[..3]),
            Err(Error::Cast(_))
        ));
    }

    #[test]
    fn test_row_mut_writes_in_place() {
        let mut pixels = vec![0; 6];
        let desc = ImageDesc::new(2, 2, PixelFormat::A8R8G8B8).with_stride(3);
        let mut view = ImageViewMut::new(desc, &mut pixels).unwrap();
        view.row_mut(1).fill(9);
        assert_eq!(view.as_view().row(1), &[9, 9]);
        assert_eq!(pixels, vec![0, 0, 0, 9, 9, 0]);
    }
}
