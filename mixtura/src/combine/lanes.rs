//! The vector-operations interface the operator kernels are written against.
//!
//! A backend groups `LANES` pixels in one `Packed` register and splits it
//! into two `Wide` halves of 16-bit channels for multiplication. All methods
//! are `unsafe` because they run only inside a `#[target_feature]` entry
//! point whose feature the caller has verified, and because loads and stores
//! go through raw pointers.

use crate::pixel::{AlphaChannel, AlphaPosition, Pixel};

pub(crate) trait PixelLanes {
    const LANES: usize;

    type Packed: Copy;
    type Wide: Copy;
    /// Selects which lanes of a span are live.
    type Lanes: Copy;

    /// Lane selector for a span of `active` pixels, `1..=LANES`.
    unsafe fn span_lanes(active: usize) -> Self::Lanes;

    /// Loads the live lanes from `ptr`; dead lanes read as zero and their
    /// addresses are never touched.
    unsafe fn load(ptr: *const Pixel, lanes: Self::Lanes) -> Self::Packed;

    /// Stores the live lanes to `ptr`; memory behind dead lanes is untouched.
    unsafe fn store(ptr: *mut Pixel, lanes: Self::Lanes, v: Self::Packed);

    unsafe fn splat(pixel: Pixel) -> Self::Packed;
    unsafe fn and(a: Self::Packed, b: Self::Packed) -> Self::Packed;
    unsafe fn or(a: Self::Packed, b: Self::Packed) -> Self::Packed;
    /// Per-channel saturating add.
    unsafe fn adds(a: Self::Packed, b: Self::Packed) -> Self::Packed;

    unsafe fn widen(v: Self::Packed) -> (Self::Wide, Self::Wide);
    /// Packs two wide halves back, saturating each channel at 255.
    unsafe fn narrow(lo: Self::Wide, hi: Self::Wide) -> Self::Packed;

    /// Per-channel `round(a * b / 255)`.
    unsafe fn multiply(a: Self::Wide, b: Self::Wide) -> Self::Wide;
    unsafe fn negate(a: Self::Wide) -> Self::Wide;
    /// Replicates channel 3 of each pixel across the pixel.
    unsafe fn broadcast_alpha(a: Self::Wide) -> Self::Wide;
    /// Replicates channel 0 of each pixel across the pixel.
    unsafe fn broadcast_alpha_rev(a: Self::Wide) -> Self::Wide;

    unsafe fn is_zero(v: Self::Packed) -> bool;
    /// True when channel `index` of every pixel equals `value`.
    unsafe fn channel_all_eq(v: Self::Packed, index: usize, value: u8) -> bool;
}

/// Alpha broadcast for the alpha position `A`.
#[inline(always)]
pub(crate) unsafe fn expand_alpha<V: PixelLanes, A: AlphaChannel>(w: V::Wide) -> V::Wide {
    match A::POSITION {
        AlphaPosition::High => V::broadcast_alpha(w),
        AlphaPosition::Low => V::broadcast_alpha_rev(w),
    }
}

#[inline(always)]
pub(crate) unsafe fn is_opaque<V: PixelLanes, A: AlphaChannel>(v: V::Packed) -> bool {
    V::channel_all_eq(v, A::INDEX, 0xff)
}

#[inline(always)]
pub(crate) unsafe fn is_transparent<V: PixelLanes, A: AlphaChannel>(v: V::Packed) -> bool {
    V::channel_all_eq(v, A::INDEX, 0)
}
