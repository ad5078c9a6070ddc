//! NEON backend tests for aarch64

use super::{assert_matches_scalar, run_guarded};
use crate::combine::{neon, Capability};
use crate::pixel::AlphaHigh;
use common::cpu_features;

#[test]
fn test_neon_matches_scalar() {
    if !cpu_features::has_neon() {
        return;
    }
    assert_matches_scalar(Capability::Neon);
}

#[test]
fn test_neon_tail_shorter_than_vector() {
    if !cpu_features::has_neon() {
        return;
    }

    let kernels = neon::kernels::<AlphaHigh>();
    for width in 1..4 {
        let src = vec![0x8040_2010; width];
        let dst = vec![0xff00_ff00; width];
        let got = run_guarded(&dst, |d| (kernels.add)(d, &src, None));
        assert!(got.iter().all(|&p| p == 0xff40_ff10), "width={}", width);
    }
}
