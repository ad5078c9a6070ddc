//! Row combiners: the four compositing operators over one row of pixels.
//!
//! Each backend (scalar, SSE2, AVX2, NEON) provides the same [`Kernels`]
//! table. Vector tables are only handed out once the CPU has been probed for
//! the instruction set, which is what makes their safe function pointers
//! sound to call.
//!
//! Paths with SIMD:
//! - x86_64: AVX2 (8 pixels, hardware masked tail), SSE2 (4 pixels)
//! - aarch64: NEON (4 pixels)

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::format::PixelFormat;
use crate::pixel::{AlphaChannel, AlphaHigh, AlphaLow, AlphaPosition, Pixel};
use common::cpu_features;

/// Emits the `#[target_feature]` entry points and the safe [`Kernels`]
/// table for a [`lanes::PixelLanes`] backend.
macro_rules! simd_kernels {
    ($lanes:ty, $feature:tt) => {
        use $crate::combine::kernel;
        use $crate::combine::{check_extents, Kernels};
        use $crate::pixel::AlphaChannel;

        #[target_feature(enable = $feature)]
        unsafe fn over_simd<A: AlphaChannel>(
            dst: &mut [Pixel],
            src: &[Pixel],
            mask: Option<&[Pixel]>,
        ) {
            kernel::over::<$lanes, A>(dst, src, mask)
        }

        #[target_feature(enable = $feature)]
        unsafe fn over_reverse_simd<A: AlphaChannel>(
            dst: &mut [Pixel],
            src: &[Pixel],
            mask: Option<&[Pixel]>,
        ) {
            kernel::over_reverse::<$lanes, A>(dst, src, mask)
        }

        #[target_feature(enable = $feature)]
        unsafe fn out_reverse_simd<A: AlphaChannel>(
            dst: &mut [Pixel],
            src: &[Pixel],
            mask: Option<&[Pixel]>,
        ) {
            kernel::out_reverse::<$lanes, A>(dst, src, mask)
        }

        #[target_feature(enable = $feature)]
        unsafe fn add_simd<A: AlphaChannel>(
            dst: &mut [Pixel],
            src: &[Pixel],
            mask: Option<&[Pixel]>,
        ) {
            kernel::add::<$lanes, A>(dst, src, mask)
        }

        #[target_feature(enable = $feature)]
        unsafe fn over_reverse_solid_simd<A: AlphaChannel>(dst: &mut [Pixel], solid: Pixel) {
            kernel::over_reverse_solid::<$lanes, A>(dst, solid)
        }

        #[target_feature(enable = $feature)]
        unsafe fn fill_alpha_simd<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel]) {
            kernel::fill_alpha::<$lanes, A>(dst, src)
        }

        // SAFETY (all wrappers below): only reachable through `kernels`, which
        // `combine::select` calls after the instruction set was detected.

        fn over<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
            check_extents(dst, src, mask);
            unsafe { over_simd::<A>(dst, src, mask) }
        }

        fn over_reverse<A: AlphaChannel>(
            dst: &mut [Pixel],
            src: &[Pixel],
            mask: Option<&[Pixel]>,
        ) {
            check_extents(dst, src, mask);
            unsafe { over_reverse_simd::<A>(dst, src, mask) }
        }

        fn out_reverse<A: AlphaChannel>(
            dst: &mut [Pixel],
            src: &[Pixel],
            mask: Option<&[Pixel]>,
        ) {
            check_extents(dst, src, mask);
            unsafe { out_reverse_simd::<A>(dst, src, mask) }
        }

        fn add<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
            check_extents(dst, src, mask);
            unsafe { add_simd::<A>(dst, src, mask) }
        }

        fn over_reverse_solid<A: AlphaChannel>(dst: &mut [Pixel], solid: Pixel) {
            unsafe { over_reverse_solid_simd::<A>(dst, solid) }
        }

        fn fill_alpha<A: AlphaChannel>(dst: &mut [Pixel], src: &[Pixel]) {
            check_extents(dst, src, None);
            unsafe { fill_alpha_simd::<A>(dst, src) }
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
    };
}

pub(crate) mod kernel;
pub(crate) mod lanes;
pub mod scalar;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "x86_64")]
mod sse2;

/// Combines `src` (optionally weighted by `mask`) into `dst` in place.
///
/// All three slices cover the same pixels. The mask's alpha channel sits at
/// the same position as the pixels'.
pub type CombineFn = fn(dst: &mut [Pixel], src: &[Pixel], mask: Option<&[Pixel]>);

/// `dst = dst OVER solid` over a row.
pub type SolidFn = fn(dst: &mut [Pixel], solid: Pixel);

/// Copies a row forcing alpha to 255.
pub type FillFn = fn(dst: &mut [Pixel], src: &[Pixel]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Operator {
    /// `src + dst * (1 - src.a)`
    Over,
    /// `dst + src * (1 - dst.a)`
    OverReverse,
    /// `dst * (1 - src.a)`
    OutReverse,
    /// `src + dst`, saturating
    Add,
}

/// Instruction sets a combiner can be built for, weakest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Capability {
    Scalar,
    Sse2,
    Neon,
    Avx2,
}

impl Capability {
    /// Whether this CPU can run combiners built for `self`.
    pub fn is_available(self) -> bool {
        match self {
            Capability::Scalar => true,
            Capability::Sse2 => cpu_features::has_sse2(),
            Capability::Neon => cpu_features::has_neon(),
            Capability::Avx2 => cpu_features::has_avx2(),
        }
    }

    /// Pixels per vector iteration.
    pub fn lanes(self) -> usize {
        match self {
            Capability::Scalar => 1,
            Capability::Sse2 | Capability::Neon => 4,
            Capability::Avx2 => 8,
        }
    }

    /// The strongest capability available on this CPU.
    pub fn best() -> Capability {
        Capability::best_up_to(Capability::Avx2)
    }

    /// The strongest available capability not above `max`.
    pub fn best_up_to(max: Capability) -> Capability {
        Capability::available()
            .filter(|&c| c <= max)
            .last()
            .unwrap_or(Capability::Scalar)
    }

    pub fn available() -> impl Iterator<Item = Capability> {
        Capability::iter().filter(|c| c.is_available())
    }
}

/// Function table of one backend for one alpha position.
#[derive(Clone, Copy)]
pub struct Kernels {
    pub over: CombineFn,
    pub over_reverse: CombineFn,
    pub out_reverse: CombineFn,
    pub add: CombineFn,
    pub over_reverse_solid: SolidFn,
    pub fill_alpha: FillFn,
}

impl Kernels {
    pub fn combiner(&self, op: Operator) -> CombineFn {
        match op {
            Operator::Over => self.over,
            Operator::OverReverse => self.over_reverse,
            Operator::OutReverse => self.out_reverse,
            Operator::Add => self.add,
        }
    }
}

impl std::fmt::Debug for Kernels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernels").finish_non_exhaustive()
    }
}

/// Kernels for `capability`, or `None` if this CPU lacks it.
pub fn kernels(capability: Capability, alpha: AlphaPosition) -> Option<Kernels> {
    if !capability.is_available() {
        return None;
    }
    Some(match alpha {
        AlphaPosition::High => select::<AlphaHigh>(capability),
        AlphaPosition::Low => select::<AlphaLow>(capability),
    })
}

/// Kernels for the strongest capability available.
pub fn best_kernels(alpha: AlphaPosition) -> Kernels {
    let capability = Capability::best();
    match alpha {
        AlphaPosition::High => select::<AlphaHigh>(capability),
        AlphaPosition::Low => select::<AlphaLow>(capability),
    }
}

pub fn combiner(op: Operator, alpha: AlphaPosition, capability: Capability) -> Option<CombineFn> {
    kernels(capability, alpha).map(|k| k.combiner(op))
}

/// One-shot combine with the strongest available backend.
pub fn combine(
    op: Operator,
    format: PixelFormat,
    dst: &mut [Pixel],
    src: &[Pixel],
    mask: Option<&[Pixel]>,
) {
    best_kernels(format.alpha_position()).combiner(op)(dst, src, mask)
}

// Callers guarantee `capability.is_available()`.
fn select<A: AlphaChannel>(capability: Capability) -> Kernels {
    match capability {
        #[cfg(target_arch = "x86_64")]
        Capability::Sse2 => sse2::kernels::<A>(),
        #[cfg(target_arch = "x86_64")]
        Capability::Avx2 => avx2::kernels::<A>(),
        #[cfg(target_arch = "aarch64")]
        Capability::Neon => neon::kernels::<A>(),
        _ => scalar::kernels::<A>(),
    }
}

/// Panics unless `src` and `mask` cover exactly the pixels of `dst`.
#[inline]
pub(crate) fn check_extents(dst: &[Pixel], src: &[Pixel], mask: Option<&[Pixel]>) {
    assert_eq!(
        src.len(),
        dst.len(),
        "source length {} does not match destination length {}",
        src.len(),
        dst.len()
    );
    if let Some(mask) = mask {
        assert_eq!(
            mask.len(),
            dst.len(),
            "mask length {} does not match destination length {}",
            mask.len(),
            dst.len()
        );
    }
}

#[cfg(test)]
mod tests;
