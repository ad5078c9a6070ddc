// AVX2 backend, 8 pixels per vector.
//
// The tail span goes through `vpmaskmovd`: dead lanes load as zero without
// being accessed and are skipped on store, so no staging is needed.
//
// Unpack and pack work within 128-bit halves, so `widen` puts pixels
// 0,1,4,5 in `lo` and 2,3,6,7 in `hi`; `narrow` restores the order.

#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

use super::lanes::PixelLanes;
use crate::pixel::Pixel;
use crate::span::SpanMask;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Avx2;

const LANES: usize = 8;

impl PixelLanes for Avx2 {
    const LANES: usize = LANES;

    type Packed = __m256i;
    type Wide = __m256i;
    type Lanes = __m256i;

    #[inline(always)]
    unsafe fn span_lanes(active: usize) -> __m256i {
        if active == LANES {
            return _mm256_set1_epi32(-1);
        }
        let mask = SpanMask::<LANES>::new(active);
        _mm256_load_si256(mask.words().as_ptr() as *const __m256i)
    }

    #[inline(always)]
    unsafe fn load(ptr: *const Pixel, lanes: __m256i) -> __m256i {
        _mm256_maskload_epi32(ptr as *const i32, lanes)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut Pixel, lanes: __m256i, v: __m256i) {
        _mm256_maskstore_epi32(ptr as *mut i32, lanes, v)
    }

    #[inline(always)]
    unsafe fn splat(pixel: Pixel) -> __m256i {
        _mm256_set1_epi32(pixel as i32)
    }

    #[inline(always)]
    unsafe fn and(a: __m256i, b: __m256i) -> __m256i {
        _mm256_and_si256(a, b)
    }

    #[inline(always)]
    unsafe fn or(a: __m256i, b: __m256i) -> __m256i {
        _mm256_or_si256(a, b)
    }

    #[inline(always)]
    unsafe fn adds(a: __m256i, b: __m256i) -> __m256i {
        _mm256_adds_epu8(a, b)
    }

    #[inline(always)]
    unsafe fn widen(v: __m256i) -> (__m256i, __m256i) {
        let zero = _mm256_setzero_si256();
        (_mm256_unpacklo_epi8(v, zero), _mm256_unpackhi_epi8(v, zero))
    }

    #[inline(always)]
    unsafe fn narrow(lo: __m256i, hi: __m256i) -> __m256i {
        _mm256_packus_epi16(lo, hi)
    }

    #[inline(always)]
    unsafe fn multiply(a: __m256i, b: __m256i) -> __m256i {
        let t = _mm256_mullo_epi16(a, b);
        let t = _mm256_adds_epu16(t, _mm256_set1_epi16(0x0080));
        _mm256_mulhi_epu16(t, _mm256_set1_epi16(0x0101))
    }

    #[inline(always)]
    unsafe fn negate(a: __m256i) -> __m256i {
        _mm256_xor_si256(a, _mm256_set1_epi16(0x00ff))
    }

    #[inline(always)]
    unsafe fn broadcast_alpha(a: __m256i) -> __m256i {
        _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(a, 0xff), 0xff)
    }

    #[inline(always)]
    unsafe fn broadcast_alpha_rev(a: __m256i) -> __m256i {
        _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(a, 0x00), 0x00)
    }

    #[inline(always)]
    unsafe fn is_zero(v: __m256i) -> bool {
        _mm256_testz_si256(v, v) != 0
    }

    #[inline(always)]
    unsafe fn channel_all_eq(v: __m256i, index: usize, value: u8) -> bool {
        let bits = 0x1111_1111u32 << index;
        let eq = _mm256_movemask_epi8(_mm256_cmpeq_epi8(v, _mm256_set1_epi8(value as i8))) as u32;
        eq & bits == bits
    }
}

simd_kernels!(Avx2, "avx2");
