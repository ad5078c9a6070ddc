//! Fixed-point blend primitives on packed 32-bit premultiplied pixels.
//!
//! Every operator in the crate is built from the handful of functions here.
//! The SIMD backends implement the same arithmetic lane-wise and must agree
//! with these bit for bit.

/// A packed pixel: four 8-bit premultiplied channels in a `u32`.
pub type Pixel = u32;

/// A pixel widened to four 16-bit channels, channel 0 being the low byte.
pub type WidePixel = [u16; 4];

/// Where the alpha channel lives inside a [`Pixel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaPosition {
    /// Bits 24..32 (`a8r8g8b8`, `a8b8g8r8`).
    High,
    /// Bits 0..8 (`r8g8b8a8`, `b8g8r8a8`).
    Low,
}

/// Compile-time alpha position, used to monomorphize kernels.
pub trait AlphaChannel: Copy + Send + Sync + 'static {
    const POSITION: AlphaPosition;
    /// Channel index of alpha (byte index on little-endian targets).
    const INDEX: usize;
    const SHIFT: u32 = Self::INDEX as u32 * 8;
    /// The pixel with only the alpha channel set to 255.
    const MASK: Pixel = 0xff << Self::SHIFT;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaHigh;

#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaLow;

impl AlphaChannel for AlphaHigh {
    const POSITION: AlphaPosition = AlphaPosition::High;
    const INDEX: usize = 3;
}

impl AlphaChannel for AlphaLow {
    const POSITION: AlphaPosition = AlphaPosition::Low;
    const INDEX: usize = 0;
}

/// `round(a * b / 255)` for `a, b` in `0..=255`, exact for every pair.
#[inline(always)]
pub const fn mul_un8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 0x80;
    ((t * 0x101) >> 16) as u8
}

/// `255 - a`.
#[inline(always)]
pub const fn negate(a: u8) -> u8 {
    !a
}

#[inline(always)]
pub const fn add_sat(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[inline(always)]
pub const fn channel(pixel: Pixel, index: usize) -> u8 {
    (pixel >> (index * 8)) as u8
}

#[inline(always)]
pub const fn alpha<A: AlphaChannel>(pixel: Pixel) -> u8 {
    channel(pixel, A::INDEX)
}

/// Builds a pixel from channels, channel 0 in the low byte.
#[inline(always)]
pub const fn pack(channels: [u8; 4]) -> Pixel {
    u32::from_le_bytes(channels)
}

#[inline(always)]
pub const fn unpack(pixel: Pixel) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Zero-extends each channel to 16 bits.
#[inline(always)]
pub fn widen(pixel: Pixel) -> WidePixel {
    unpack(pixel).map(u16::from)
}

/// Narrows each channel back to 8 bits, saturating at 255.
#[inline(always)]
pub fn narrow(wide: WidePixel) -> Pixel {
    pack(wide.map(|c| c.min(0xff) as u8))
}

/// A wide pixel with every channel set to the alpha of `wide`.
#[inline(always)]
pub fn broadcast_alpha(wide: WidePixel) -> WidePixel {
    [wide[3]; 4]
}

/// Like [`broadcast_alpha`] for formats whose alpha is channel 0.
#[inline(always)]
pub fn broadcast_alpha_rev(wide: WidePixel) -> WidePixel {
    [wide[0]; 4]
}

#[inline(always)]
pub fn broadcast<A: AlphaChannel>(wide: WidePixel) -> WidePixel {
    match A::POSITION {
        AlphaPosition::High => broadcast_alpha(wide),
        AlphaPosition::Low => broadcast_alpha_rev(wide),
    }
}

/// Channel-wise `mul_un8` on widened pixels.
#[inline(always)]
pub fn multiply(a: WidePixel, b: WidePixel) -> WidePixel {
    std::array::from_fn(|i| u16::from(mul_un8(a[i] as u8, b[i] as u8)))
}

/// Channel-wise `255 - a` on widened pixels.
#[inline(always)]
pub fn negate_wide(a: WidePixel) -> WidePixel {
    a.map(|c| c ^ 0xff)
}

/// Multiplies every channel of `pixel` by `a / 255`.
#[inline]
pub fn mul_pixel(pixel: Pixel, a: u8) -> Pixel {
    pack(unpack(pixel).map(|c| mul_un8(c, a)))
}

#[inline]
pub fn add_sat_pixel(p: Pixel, q: Pixel) -> Pixel {
    let (p, q) = (unpack(p), unpack(q));
    pack(std::array::from_fn(|i| add_sat(p[i], q[i])))
}
