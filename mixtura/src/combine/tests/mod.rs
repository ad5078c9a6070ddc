//! Combiner correctness tests
//!
//! Every vector backend is checked bit for bit against the scalar reference
//! over widths that hit full spans, partial tails and mixed rows, with guard
//! pixels past the row end to catch out-of-range stores.
//!
//! Test modules:
//! - `common_tests`: operator semantics on every available capability
//! - `sse2_tests`, `avx2_tests`: x86_64 backends
//! - `neon_tests`: aarch64 backend


#[cfg(target_arch = "x86_64")]
mod avx2_tests;

#[cfg(target_arch = "aarch64")]
mod neon_tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;

use super::{kernels, scalar, Capability, Operator};
use crate::pixel::{pack, AlphaChannel, AlphaHigh, AlphaLow, Pixel};

/// Widths beyond `1..2*LANES` that still leave assorted tails.
pub const TEST_WIDTHS: [usize; 8] = [15, 16, 17, 31, 33, 64, 100, 257];

pub const GUARD: usize = 9;
pub const GUARD_PIXEL: Pixel = 0xdead_beef;

pub fn widths(lanes: usize) -> impl Iterator<Item = usize> {
    (1..2 * lanes).chain(TEST_WIDTHS)
}

/// A premultiplied pixel: transparent, opaque or anything in between.
pub fn random_pixel<A: AlphaChannel>(rng: &mut StdRng) -> Pixel {
    let a: u8 = match rng.random_range(0..4) {
        0 => 0,
        1 => 255,
        _ => rng.random(),
    };
    let mut channels: [u8; 4] = std::array::from_fn(|_| rng.random_range(0..=a));
    channels[A::INDEX] = a;
    pack(channels)
}

/// Runs of zero, opaque and mixed pixels, so whole spans hit each shortcut.
pub fn random_row<A: AlphaChannel>(rng: &mut StdRng, width: usize) -> Vec<Pixel> {
    let mut row = Vec::with_capacity(width);
    while row.len() < width {
        let run = rng.random_range(1..=12).min(width - row.len());
        let kind = rng.random_range(0..3);
        for _ in 0..run {
            let pixel = match kind {
                0 => 0,
                1 => {
                    let mut channels: [u8; 4] = rng.random();
                    channels[A::INDEX] = 255;
                    pack(channels)
                }
                _ => random_pixel::<A>(rng),
            };
            row.push(pixel);
        }
    }
    row
}

/// Coverage masks: color channels are noise, only alpha matters.
pub fn random_mask_row<A: AlphaChannel>(rng: &mut StdRng, width: usize) -> Vec<Pixel> {
    let mut row = Vec::with_capacity(width);
    while row.len() < width {
        let run = rng.random_range(1..=12).min(width - row.len());
        let kind = rng.random_range(0..3);
        for _ in 0..run {
            let mut channels: [u8; 4] = rng.random();
            channels[A::INDEX] = match kind {
                0 => 0,
                1 => 255,
                _ => rng.random(),
            };
            row.push(pack(channels));
        }
    }
    row
}

/// Applies `f` to a copy of `dst` followed by guard pixels and returns the
/// row, asserting nothing past its end was written.
pub fn run_guarded(dst: &[Pixel], f: impl FnOnce(&mut [Pixel])) -> Vec<Pixel> {
    let width = dst.len();
    let mut buf = dst.to_vec();
    buf.extend([GUARD_PIXEL; GUARD]);

    f(&mut buf[..width]);

    assert!(
        buf[width..].iter().all(|&p| p == GUARD_PIXEL),
        "pixels past width {} were written",
        width
    );
    buf.truncate(width);
    buf
}

/// Compares every kernel of `capability` with the scalar reference for both
/// alpha positions.
pub fn assert_matches_scalar(capability: Capability) {
    assert_alpha_matches_scalar::<AlphaHigh>(capability);
    assert_alpha_matches_scalar::<AlphaLow>(capability);
}

fn assert_alpha_matches_scalar<A: AlphaChannel>(capability: Capability) {
    let actual = kernels(capability, A::POSITION).expect("capability is available");
    let reference = scalar::kernels::<A>();
    let mut rng = StdRng::seed_from_u64(0x6d69_7874 + A::INDEX as u64);

    for width in widths(capability.lanes()) {
        let src = random_row::<A>(&mut rng, width);
        let dst = random_row::<A>(&mut rng, width);
        let mask = random_mask_row::<A>(&mut rng, width);

        for op in Operator::iter() {
            for mask in [None, Some(mask.as_slice())] {
                let expected = run_guarded(&dst, |d| reference.combiner(op)(d, &src, mask));
                let got = run_guarded(&dst, |d| actual.combiner(op)(d, &src, mask));
                assert_eq!(
                    got,
                    expected,
                    "{} {} width={} masked={}",
                    capability,
                    op,
                    width,
                    mask.is_some()
                );
            }
        }

        let solid = random_pixel::<A>(&mut rng);
        let expected = run_guarded(&dst, |d| (reference.over_reverse_solid)(d, solid));
        let got = run_guarded(&dst, |d| (actual.over_reverse_solid)(d, solid));
        assert_eq!(got, expected, "{} solid width={}", capability, width);

        let expected = run_guarded(&dst, |d| (reference.fill_alpha)(d, &src));
        let got = run_guarded(&dst, |d| (actual.fill_alpha)(d, &src));
        assert_eq!(got, expected, "{} fill width={}", capability, width);
    }
}
