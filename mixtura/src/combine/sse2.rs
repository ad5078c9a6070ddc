// SSE2 backend, 4 pixels per vector.
//
// SSE2 has no masked load/store for 32-bit lanes, so the tail span is staged
// through a zeroed 4-pixel buffer and exactly `active` pixels are copied in
// and out.

#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;
use std::ptr;

use super::lanes::PixelLanes;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Sse2;

const LANES: usize = 4;

impl PixelLanes for Sse2 {
    const LANES: usize = LANES;

    type Packed = __m128i;
    type Wide = __m128i;
    type Lanes = usize;

    #[inline(always)]
    unsafe fn span_lanes(active: usize) -> usize {
        debug_assert!(active <= LANES);
        active
    }

    #[inline(always)]
    unsafe fn load(ptr: *const Pixel, lanes: usize) -> __m128i {
        if lanes == LANES {
            return _mm_loadu_si128(ptr as *const __m128i);
        }
        let mut staged = [0 as Pixel; LANES];
        ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), lanes);
        _mm_loadu_si128(staged.as_ptr() as *const __m128i)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut Pixel, lanes: usize, v: __m128i) {
        if lanes == LANES {
            _mm_storeu_si128(ptr as *mut __m128i, v);
            return;
        }
        let mut staged = [0 as Pixel; LANES];
        _mm_storeu_si128(staged.as_mut_ptr() as *mut __m128i, v);
        ptr::copy_nonoverlapping(staged.as_ptr(), ptr, lanes);
    }

    #[inline(always)]
    unsafe fn splat(pixel: Pixel) -> __m128i {
        _mm_set1_epi32(pixel as i32)
    }

    #[inline(always)]
    unsafe fn and(a: __m128i, b: __m128i) -> __m128i {
        _mm_and_si128(a, b)
    }

    #[inline(always)]
    unsafe fn or(a: __m128i, b: __m128i) -> __m128i {
        _mm_or_si128(a, b)
    }

    #[inline(always)]
    unsafe fn adds(a: __m128i, b: __m128i) -> __m128i {
        _mm_adds_epu8(a, b)
    }

    #[inline(always)]
    unsafe fn widen(v: __m128i) -> (__m128i, __m128i) {
        let zero = _mm_setzero_si128();
        (_mm_unpacklo_epi8(v, zero), _mm_unpackhi_epi8(v, zero))
    }

    #[inline(always)]
    unsafe fn narrow(lo: __m128i, hi: __m128i) -> __m128i {
        _mm_packus_epi16(lo, hi)
    }

    #[inline(always)]
    unsafe fn multiply(a: __m128i, b: __m128i) -> __m128i {
        let t = _mm_mullo_epi16(a, b);
        let t = _mm_adds_epu16(t, _mm_set1_epi16(0x0080));
        _mm_mulhi_epu16(t, _mm_set1_epi16(0x0101))
    }

    #[inline(always)]
    unsafe fn negate(a: __m128i) -> __m128i {
        _mm_xor_si128(a, _mm_set1_epi16(0x00ff))
    }

    #[inline(always)]
    unsafe fn broadcast_alpha(a: __m128i) -> __m128i {
        _mm_shufflehi_epi16(_mm_shufflelo_epi16(a, 0xff), 0xff)
    }

    #[inline(always)]
    unsafe fn broadcast_alpha_rev(a: __m128i) -> __m128i {
        _mm_shufflehi_epi16(_mm_shufflelo_epi16(a, 0x00), 0x00)
    }

    #[inline(always)]
    unsafe fn is_zero(v: __m128i) -> bool {
        _mm_movemask_epi8(_mm_cmpeq_epi8(v, _mm_setzero_si128())) == 0xffff
    }

    #[inline(always)]
    unsafe fn channel_all_eq(v: __m128i, index: usize, value: u8) -> bool {
        let bits = 0x1111u32 << index;
        let eq = _mm_movemask_epi8(_mm_cmpeq_epi8(v, _mm_set1_epi8(value as i8))) as u32;
        eq & bits == bits
    }
}

simd_kernels!(Sse2, "sse2");
