// NEON backend, 4 pixels per vector (aarch64).
//
// Like SSE2 there is no masked load/store, so the tail span is staged
// through a zeroed 4-pixel buffer.

#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::aarch64::*;
use std::ptr;

use super::lanes::PixelLanes;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Neon;

const LANES: usize = 4;

// Byte indices replicating u16 lane 3 (resp. 0) of each 4-lane pixel.
const ALPHA_HIGH_TABLE: [u8; 16] = [6, 7, 6, 7, 6, 7, 6, 7, 14, 15, 14, 15, 14, 15, 14, 15];
const ALPHA_LOW_TABLE: [u8; 16] = [0, 1, 0, 1, 0, 1, 0, 1, 8, 9, 8, 9, 8, 9, 8, 9];

impl PixelLanes for Neon {
    const LANES: usize = LANES;

    type Packed = uint8x16_t;
    type Wide = uint16x8_t;
    type Lanes = usize;

    #[inline(always)]
    unsafe fn span_lanes(active: usize) -> usize {
        debug_assert!(active <= LANES);
        active
    }

    #[inline(always)]
    unsafe fn load(ptr: *const Pixel, lanes: usize) -> uint8x16_t {
        if lanes == LANES {
            return vld1q_u8(ptr as *const u8);
        }
        let mut staged = [0 as Pixel; LANES];
        ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), lanes);
        vld1q_u8(staged.as_ptr() as *const u8)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut Pixel, lanes: usize, v: uint8x16_t) {
        if lanes == LANES {
            vst1q_u8(ptr as *mut u8, v);
            return;
        }
        let mut staged = [0 as Pixel; LANES];
        vst1q_u8(staged.as_mut_ptr() as *mut u8, v);
        ptr::copy_nonoverlapping(staged.as_ptr(), ptr, lanes);
    }

    #[inline(always)]
    unsafe fn splat(pixel: Pixel) -> uint8x16_t {
        vreinterpretq_u8_u32(vdupq_n_u32(pixel))
    }

    #[inline(always)]
    unsafe fn and(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        vandq_u8(a, b)
    }

    #[inline(always)]
    unsafe fn or(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        vorrq_u8(a, b)
    }

    #[inline(always)]
    unsafe fn adds(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        vqaddq_u8(a, b)
    }

    #[inline(always)]
    unsafe fn widen(v: uint8x16_t) -> (uint16x8_t, uint16x8_t) {
        (vmovl_u8(vget_low_u8(v)), vmovl_high_u8(v))
    }

    #[inline(always)]
    unsafe fn narrow(lo: uint16x8_t, hi: uint16x8_t) -> uint8x16_t {
        vcombine_u8(vqmovn_u16(lo), vqmovn_u16(hi))
    }

    #[inline(always)]
    unsafe fn multiply(a: uint16x8_t, b: uint16x8_t) -> uint16x8_t {
        // (t + (t >> 8)) >> 8 == (t * 257) >> 16 without leaving 16 bits.
        let t = vaddq_u16(vmulq_u16(a, b), vdupq_n_u16(0x80));
        vshrq_n_u16(vsraq_n_u16(t, t, 8), 8)
    }

    #[inline(always)]
    unsafe fn negate(a: uint16x8_t) -> uint16x8_t {
        veorq_u16(a, vdupq_n_u16(0xff))
    }

    #[inline(always)]
    unsafe fn broadcast_alpha(a: uint16x8_t) -> uint16x8_t {
        let table = vld1q_u8(ALPHA_HIGH_TABLE.as_ptr());
        vreinterpretq_u16_u8(vqtbl1q_u8(vreinterpretq_u8_u16(a), table))
    }

    #[inline(always)]
    unsafe fn broadcast_alpha_rev(a: uint16x8_t) -> uint16x8_t {
        let table = vld1q_u8(ALPHA_LOW_TABLE.as_ptr());
        vreinterpretq_u16_u8(vqtbl1q_u8(vreinterpretq_u8_u16(a), table))
    }

    #[inline(always)]
    unsafe fn is_zero(v: uint8x16_t) -> bool {
        vmaxvq_u8(v) == 0
    }

    #[inline(always)]
    unsafe fn channel_all_eq(v: uint8x16_t, index: usize, value: u8) -> bool {
        let eq = vceqq_u8(v, vdupq_n_u8(value));
        let selected = vreinterpretq_u8_u32(vdupq_n_u32(0xff << (index * 8)));
        // Bytes outside the selected channel are forced to all-ones.
        vminvq_u8(vornq_u8(eq, selected)) == 0xff
    }
}

simd_kernels!(Neon, "neon");
