//! Image-level composites built on the row combiners.
//!
//! The `*_8888_*` functions are the direct fast paths: one combiner call per
//! row, no staging. [`general`] handles every other operator/format pairing
//! by staging `x8` sources (and solid colors) through a scratch row first.
//!
//! Rows are disjoint slices of the destination, so they fan out over the
//! rayon pool when [`Config::parallel_for`] says so.

use rayon::prelude::*;

use crate::combine::{CombineFn, Kernels};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::image::{ImageDesc, ImageView, ImageViewMut};
use crate::pixel::Pixel;

/// What is composited onto the destination.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Image(ImageView<'a>),
    /// A premultiplied pixel in the destination's channel layout.
    Solid(Pixel),
}

impl Source<'_> {
    pub fn format(&self) -> SourceFormat {
        match self {
            Source::Image(view) => SourceFormat::Image(view.desc().format),
            Source::Solid(_) => SourceFormat::Solid,
        }
    }
}

/// The shape of a [`Source`], as matched by fast-path tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Image(PixelFormat),
    Solid,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Image(format) => write!(f, "{}", format),
            SourceFormat::Solid => f.write_str("solid"),
        }
    }
}

/// Calls `f(y, row, scratch)` for every destination row, `row` trimmed to
/// the image width. `scratch` is a per-worker buffer.
fn for_each_row<F>(config: &Config, dst: &mut ImageViewMut<'_>, f: F)
where
    F: Fn(usize, &mut [Pixel], &mut Vec<Pixel>) + Send + Sync,
{
    let desc = *dst.desc();
    if desc.is_empty() {
        return;
    }
    let (width, stride, height) = (desc.width, desc.stride, desc.height);
    let pixels = dst.pixels_mut();

    if config.parallel_for(height) {
        pixels
            .par_chunks_mut(stride)
            .take(height)
            .enumerate()
            .for_each_init(Vec::new, |scratch, (y, row)| {
                f(y, &mut row[..width], scratch)
            });
    } else {
        let mut scratch = Vec::new();
        for (y, row) in pixels.chunks_mut(stride).take(height).enumerate() {
            f(y, &mut row[..width], &mut scratch);
        }
    }
}

fn check_size(src: &ImageDesc, dst: &ImageDesc) -> Result<()> {
    if src.width != dst.width || src.height != dst.height {
        return Err(Error::SizeMismatch {
            src_width: src.width,
            src_height: src.height,
            dst_width: dst.width,
            dst_height: dst.height,
        });
    }
    Ok(())
}

fn check_layout(src: PixelFormat, dst: PixelFormat) -> Result<()> {
    if !src.same_layout(dst) {
        return Err(Error::LayoutMismatch { src, dst });
    }
    Ok(())
}

fn check_alpha(format: PixelFormat) -> Result<()> {
    if !format.has_alpha() {
        return Err(Error::NoAlpha { format });
    }
    Ok(())
}

fn check_image_pair(src: &ImageView<'_>, dst: &ImageViewMut<'_>) -> Result<()> {
    check_size(src.desc(), dst.desc())?;
    check_alpha(src.desc().format)?;
    check_layout(src.desc().format, dst.desc().format)
}

/// `dst = src OVER dst` for an `a8` source onto an `a8` or `x8`
/// destination of the same channel order.
///
/// `kernels` must be built for the destination's alpha position.
pub fn over_8888_8888(
    kernels: &Kernels,
    config: &Config,
    src: &ImageView<'_>,
    dst: &mut ImageViewMut<'_>,
) -> Result<()> {
    check_image_pair(src, dst)?;

    let over = kernels.over;
    for_each_row(config, dst, |y, row, _| over(row, src.row(y), None));
    Ok(())
}

/// `dst = adds(src, dst)` between two `a8` images of the same layout.
pub fn add_8888_8888(
    kernels: &Kernels,
    config: &Config,
    src: &ImageView<'_>,
    dst: &mut ImageViewMut<'_>,
) -> Result<()> {
    check_image_pair(src, dst)?;
    check_alpha(dst.desc().format)?;

    let add = kernels.add;
    for_each_row(config, dst, |y, row, _| add(row, src.row(y), None));
    Ok(())
}

/// `dst = dst OVER solid`. The destination must carry alpha.
pub fn over_reverse_solid_8888(
    kernels: &Kernels,
    config: &Config,
    solid: Pixel,
    dst: &mut ImageViewMut<'_>,
) -> Result<()> {
    check_alpha(dst.desc().format)?;
    if solid == 0 {
        return Ok(());
    }

    let over_reverse_solid = kernels.over_reverse_solid;
    for_each_row(config, dst, |_, row, _| over_reverse_solid(row, solid));
    Ok(())
}

/// Fetches an `x8` row as its `a8` counterpart.
#[inline]
pub fn fetch_opaque_row(kernels: &Kernels, src: &[Pixel], dst: &mut [Pixel]) {
    (kernels.fill_alpha)(dst, src)
}

/// Any operator, any source, optional mask.
///
/// `x8` sources are fetched with alpha 255 and `x8` destinations are read
/// as opaque. Solid sources are replicated across a scratch row.
pub fn general(
    combiner: CombineFn,
    kernels: &Kernels,
    config: &Config,
    src: &Source<'_>,
    mask: Option<&ImageView<'_>>,
    dst: &mut ImageViewMut<'_>,
) -> Result<()> {
    let dst_desc = *dst.desc();

    if let Source::Image(src) = src {
        check_size(src.desc(), &dst_desc)?;
        check_layout(src.desc().format, dst_desc.format)?;
    }
    if let Some(mask) = mask {
        check_size(mask.desc(), &dst_desc)?;
        check_alpha(mask.desc().format)?;
        if mask.desc().format.alpha_position() != dst_desc.format.alpha_position() {
            return Err(Error::LayoutMismatch {
                src: mask.desc().format,
                dst: dst_desc.format,
            });
        }
    }

    let opaque_dst = !dst_desc.format.has_alpha();
    let fill_alpha = kernels.fill_alpha;

    for_each_row(config, dst, |y, row, scratch| {
        let width = row.len();
        if opaque_dst {
            scratch.clear();
            scratch.extend_from_slice(row);
            fill_alpha(row, scratch.as_slice());
        }

        let src_row: &[Pixel] = match src {
            Source::Image(src) if src.desc().format.has_alpha() => src.row(y),
            Source::Image(src) => {
                scratch.resize(width, 0);
                fill_alpha(scratch.as_mut_slice(), src.row(y));
                &scratch[..]
            }
            Source::Solid(solid) => {
                scratch.clear();
                scratch.resize(width, *solid);
                &scratch[..]
            }
        };

        combiner(row, src_row, mask.map(|m| m.row(y)));
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{kernels, scalar, Capability};
    use crate::pixel::{AlphaHigh, AlphaPosition};

    fn best() -> Kernels {
        kernels(Capability::best(), AlphaPosition::High).unwrap()
    }

    fn parallel() -> Config {
        Config {
            min_parallel_rows: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_over_respects_stride_padding() {
        let src_pixels = vec![0xff11_2233; 3 * 4];
        let src_desc = ImageDesc::new(3, 4, PixelFormat::A8R8G8B8);
        let src = ImageView::new(src_desc, &src_pixels).unwrap();

        for config in [parallel(), Config::single_threaded()] {
            let mut dst_pixels = vec![0x8000_0080; 5 * 4];
            let dst_desc = ImageDesc::new(3, 4, PixelFormat::X8R8G8B8).with_stride(5);
            let mut dst = ImageViewMut::new(dst_desc, &mut dst_pixels).unwrap();

            over_8888_8888(&best(), &config, &src, &mut dst).unwrap();

            for (i, &p) in dst_pixels.iter().enumerate() {
                let expected = if i % 5 < 3 { 0xff11_2233 } else { 0x8000_0080 };
                assert_eq!(p, expected, "pixel {}", i);
            }
        }
    }

    #[test]
    fn test_over_rejects_x8_source_and_size_mismatch() {
        let pixels = vec![0; 4];
        let mut out = vec![0; 4];
        let x8 = ImageView::new(ImageDesc::new(2, 2, PixelFormat::X8R8G8B8), &pixels).unwrap();
        let mut dst =
            ImageViewMut::new(ImageDesc::new(2, 2, PixelFormat::A8R8G8B8), &mut out).unwrap();
        assert!(matches!(
            over_8888_8888(&best(), &Config::default(), &x8, &mut dst),
            Err(Error::NoAlpha { .. })
        ));

        let small = ImageView::new(ImageDesc::new(1, 2, PixelFormat::A8R8G8B8), &pixels).unwrap();
        assert!(matches!(
            over_8888_8888(&best(), &Config::default(), &small, &mut dst),
            Err(Error::SizeMismatch { .. })
        ));

        let abgr = ImageView::new(ImageDesc::new(2, 2, PixelFormat::A8B8G8R8), &pixels).unwrap();
        assert!(matches!(
            add_8888_8888(&best(), &Config::default(), &abgr, &mut dst),
            Err(Error::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn test_add_saturates_image() {
        let src_pixels = vec![0x6464_6464; 6];
        let src = ImageView::new(ImageDesc::new(3, 2, PixelFormat::A8B8G8R8), &src_pixels).unwrap();
        let mut out = vec![0xc8c8_c8c8; 6];
        let mut dst =
            ImageViewMut::new(ImageDesc::new(3, 2, PixelFormat::A8B8G8R8), &mut out).unwrap();

        add_8888_8888(&best(), &parallel(), &src, &mut dst).unwrap();
        assert!(out.iter().all(|&p| p == 0xffff_ffff));
    }

    #[test]
    fn test_over_reverse_solid_image() {
        let solid = 0x8040_2010;
        let mut out = vec![0x0000_0000, 0xff00_0000, 0x8000_0080, 0x4020_1008];
        let before = out.clone();
        let mut dst =
            ImageViewMut::new(ImageDesc::new(2, 2, PixelFormat::A8R8G8B8), &mut out).unwrap();

        over_reverse_solid_8888(&best(), &parallel(), solid, &mut dst).unwrap();

        let mut expected = before;
        scalar::over_reverse_solid::<AlphaHigh>(&mut expected, solid);
        assert_eq!(out, expected);
        assert_eq!(out[0], solid);
        assert_eq!(out[1], 0xff00_0000);
    }

    #[test]
    fn test_over_reverse_solid_needs_dst_alpha() {
        let mut out = vec![0; 4];
        let mut dst =
            ImageViewMut::new(ImageDesc::new(2, 2, PixelFormat::X8R8G8B8), &mut out).unwrap();
        assert!(matches!(
            over_reverse_solid_8888(&best(), &Config::default(), 1, &mut dst),
            Err(Error::NoAlpha {
                format: PixelFormat::X8R8G8B8
            })
        ));
    }

    #[test]
    fn test_fetch_opaque_row() {
        let src = [0x0011_2233, 0x7f44_5566];
        let mut dst = [0; 2];
        fetch_opaque_row(&best(), &src, &mut dst);
        assert_eq!(dst, [0xff11_2233, 0xff44_5566]);
    }

    #[test]
    fn test_general_x8_source_is_opaque() {
        // Alpha bytes of x8 pixels are garbage and must not leak into Over.
        let src_pixels = vec![0x0011_2233; 9];
        let src = ImageView::new(ImageDesc::new(3, 3, PixelFormat::X8R8G8B8), &src_pixels).unwrap();
        let mut out = vec![0x8080_8080; 9];
        let mut dst =
            ImageViewMut::new(ImageDesc::new(3, 3, PixelFormat::A8R8G8B8), &mut out).unwrap();

        let k = best();
        general(k.over, &k, &parallel(), &Source::Image(src), None, &mut dst).unwrap();
        assert!(out.iter().all(|&p| p == 0xff11_2233));
    }

    #[test]
    fn test_general_x8_destination_reads_opaque() {
        let mut out = vec![0x0010_2030; 4];
        let mut dst =
            ImageViewMut::new(ImageDesc::new(2, 2, PixelFormat::X8R8G8B8), &mut out).unwrap();

        let k = best();
        general(
            k.over_reverse,
            &k,
            &Config::single_threaded(),
            &Source::Solid(0x8080_8080),
            None,
            &mut dst,
        )
        .unwrap();
        assert!(out.iter().all(|&p| p == 0xff10_2030));
    }

    #[test]
    fn test_general_masked_solid() {
        let mask_pixels = vec![0xff00_0000, 0x0000_0000, 0x8000_0000, 0xff12_3456];
        let mask =
            ImageView::new(ImageDesc::new(4, 1, PixelFormat::A8R8G8B8), &mask_pixels).unwrap();
        let mut out = vec![0; 4];
        let mut dst =
            ImageViewMut::new(ImageDesc::new(4, 1, PixelFormat::A8R8G8B8), &mut out).unwrap();

        let k = best();
        general(
            k.add,
            &k,
            &Config::default(),
            &Source::Solid(0xff00_ff00),
            Some(&mask),
            &mut dst,
        )
        .unwrap();
        assert_eq!(out, vec![0xff00_ff00, 0, 0x8000_8000, 0xff00_ff00]);
    }

    #[test]
    fn test_general_rejects_mask_with_other_alpha_position() {
        let mask_pixels = vec![0; 4];
        let mask =
            ImageView::new(ImageDesc::new(2, 2, PixelFormat::R8G8B8A8), &mask_pixels).unwrap();
        let mut out = vec![0; 4];
        let mut dst =
            ImageViewMut::new(ImageDesc::new(2, 2, PixelFormat::A8R8G8B8), &mut out).unwrap();

        let k = best();
        let result = general(k.add, &k, &Config::default(), &Source::Solid(1), Some(&mask), &mut dst);
        assert!(matches!(result, Err(Error::LayoutMismatch { .. })));
    }
}
