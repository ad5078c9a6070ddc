//! Scalar (non-SIMD) implementations of the operators.
//!
//! These are the reference every vector backend is tested against, and the
//! fallback on targets without a supported instruction set. They apply the
//! full arithmetic to every pixel, without shortcuts.

use super::{check_extents, Kernels};
use crate::pixel::{
    add_sat_pixel, alpha, broadcast, mul_pixel, multiply, narrow, negate_wide, widen,
    AlphaChannel, Pixel,
};

/// `src * alpha(mask) / 255`.
#[inline]
pub fn in_mask<A: AlphaChannel>(src: Pixel, mask: Pixel) -> Pixel {
    mul_pixel(src, alpha::<A>(mask))
}

/// `adds(src, dst * (255 - alpha(src)))`.
#[inline]
pub fn over_pixel<A: AlphaChannel>(src: Pixel, dst: Pixel) -> Pixel {
    let inv_alpha = negate_wide(broadcast::<A>(widen(src)));
    add_sat_pixel(src, narrow(multiply(widen(dst), inv_alpha)))
}

#[inline]
pub fn over_reverse_pixel<A: AlphaChannel>(src: Pixel, dst: Pixel) -> Pixel {
    over_pixel::<A>(dst, src)
}

/// `dst * (255 - alpha(src))`.
#[inline]
pub fn out_reverse_pixel<A: AlphaChannel>(src: Pixel, dst: Pixel) -> Pixel {
    let inv_alpha = negate_wide(broadcast::<A>(widen(src)));
    narrow(multiply(widen(dst), inv_alpha))
}

#[inline]
pub fn add_pixel<A: AlphaChannel>(src: Pixel, dst: Pixel) -> Pixel {
    add_sat_pixel(src, dst)
}

#[inline(always)]
fn combine_with<A: AlphaChannel>(
    dst: &mut [Pixel],
    src: &[Pixel],
    mask: Option<&[Pixel]>,
    op: impl Fn(Pixel, Pixel) -> Pixel,
) {
    check_extents(dst, src, mask);
    match mask {
        None => {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = op(s, *d);
            }
        }
        Some(mask) => {
            for ((d, &s), &m) in dst.iter_mut().zip(src).zip(mask) {
                *d = op(in_mask::<A>(s, m), *d);
            }
        }
    }
}

pub fn over<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
    combine_with::<A>(dst, src, mask, over_pixel::<A>)
}

pub fn over_reverse<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
    combine_with::<A>(dst, src, mask, over_reverse_pixel::<A>)
}

pub fn out_reverse<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
    combine_with::<A>(dst, src, mask, out_reverse_pixel::<A>)
}

pub fn add<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
    combine_with::<A>(dst, src, mask, add_pixel::<A>)
}

pub fn over_reverse_solid<A: AlphaChannel>(dst: &mut [Pixel], solid: Pixel) {
    for d in dst.iter_mut() {
        *d = over_reverse_pixel::<A>(solid, *d);
    }
}

pub fn fill_alpha<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel]) {
    check_extents(dst, src, None);
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s | A::MASK;
    }
}

pub(super) fn kernels<A: AlphaChannel>() -> Kernels {
    Kernels {
        over: over::<A>,
        over_reverse: over_reverse::<A>,
        out_reverse: out_reverse::<A>,
        add: add::<A>,
        over_reverse_solid: over_reverse_solid::<A>,
        fill_alpha: fill_alpha::<A>,
    }
}
