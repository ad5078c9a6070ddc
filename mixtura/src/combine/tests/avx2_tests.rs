//! AVX2 backend tests for x86_64
//!
//! These also compare against SSE2 so the two x86 paths stay consistent.

use rand::rngs::StdRng;
use rand::SeedableRng;
use strum::IntoEnumIterator;

use super::{assert_matches_scalar, random_mask_row, random_row, run_guarded, widths};
use crate::combine::{avx2, sse2, Capability, Operator};
use crate::pixel::{AlphaLow, Pixel};
use common::cpu_features;

#[test]
fn test_avx2_matches_scalar() {
    if !cpu_features::has_avx2() {
        return;
    }
    assert_matches_scalar(Capability::Avx2);
}

#[test]
fn test_avx2_matches_sse2() {
    if !cpu_features::has_avx2() || !cpu_features::has_sse2() {
        return;
    }

    let avx = avx2::kernels::<AlphaLow>();
    let sse = sse2::kernels::<AlphaLow>();
    let mut rng = StdRng::seed_from_u64(29);

    for width in widths(8) {
        let src = random_row::<AlphaLow>(&mut rng, width);
        let dst = random_row::<AlphaLow>(&mut rng, width);
        let mask = random_mask_row::<AlphaLow>(&mut rng, width);

        for op in Operator::iter() {
            let got = run_guarded(&dst, |d| avx.combiner(op)(d, &src, Some(mask.as_slice())));
            let expected = run_guarded(&dst, |d| sse.combiner(op)(d, &src, Some(mask.as_slice())));
            assert_eq!(got, expected, "{} width={}", op, width);
        }
    }
}

#[test]
fn test_avx2_masked_tail_leaves_rest_of_buffer() {
    if !cpu_features::has_avx2() {
        return;
    }

    let kernels = avx2::kernels::<AlphaLow>();
    // A row of 13 inside a larger buffer: one full span and a 5-lane tail.
    let mut buf: Vec<Pixel> = vec![0x1020_30ff; 16];
    let src = vec![0x0000_0000; 13];
    (kernels.fill_alpha)(&mut buf[..13], &src);

    assert!(buf[..13].iter().all(|&p| p == 0x0000_00ff));
    assert!(buf[13..].iter().all(|&p| p == 0x1020_30ff));
}
