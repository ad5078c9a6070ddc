//! Operator kernels and the row driver, generic over the vector backend.
//!
//! Each kernel walks the row in [`Spans`], loads with the span's lane
//! selector, tries the uniform-span shortcuts and only then runs the full
//! widen / multiply / narrow pipeline. Everything here is `#[inline(always)]`
//! so it lands inside the backend's `#[target_feature]` entry point.

use super::lanes::{expand_alpha, is_opaque, is_transparent, PixelLanes};
use crate::pixel::{AlphaChannel, Pixel};
use crate::span::Spans;

/// `src * alpha(mask)`, or zero without touching `src` when the mask is
/// transparent across the span.
#[inline(always)]
unsafe fn masked_source<V: PixelLanes, A: AlphaChannel>(
    ps: *const Pixel,
    pm: Option<*const Pixel>,
    lanes: V::Lanes,
) -> V::Packed {
    let Some(pm) = pm else {
        return V::load(ps, lanes);
    };

    let m = V::load(pm, lanes);
    if is_transparent::<V, A>(m) {
        return V::splat(0);
    }

    let s = V::load(ps, lanes);
    in_mask::<V, A>(s, m)
}

#[inline(always)]
unsafe fn in_mask<V: PixelLanes, A: AlphaChannel>(s: V::Packed, m: V::Packed) -> V::Packed {
    let (s_lo, s_hi) = V::widen(s);
    let (m_lo, m_hi) = V::widen(m);
    let m_lo = expand_alpha::<V, A>(m_lo);
    let m_hi = expand_alpha::<V, A>(m_hi);
    V::narrow(V::multiply(s_lo, m_lo), V::multiply(s_hi, m_hi))
}

/// `adds(src, dst * (255 - alpha))`, `alpha` already widened and broadcast.
#[inline(always)]
unsafe fn over_wide<V: PixelLanes>(
    src: V::Packed,
    alpha: (V::Wide, V::Wide),
    dst: V::Packed,
) -> V::Packed {
    let (d_lo, d_hi) = V::widen(dst);
    let d_lo = V::multiply(d_lo, V::negate(alpha.0));
    let d_hi = V::multiply(d_hi, V::negate(alpha.1));
    V::adds(src, V::narrow(d_lo, d_hi))
}

#[inline(always)]
unsafe fn over_packed<V: PixelLanes, A: AlphaChannel>(
    src: V::Packed,
    dst: V::Packed,
) -> V::Packed {
    let (s_lo, s_hi) = V::widen(src);
    let alpha = (expand_alpha::<V, A>(s_lo), expand_alpha::<V, A>(s_hi));
    over_wide::<V>(src, alpha, dst)
}

#[inline(always)]
fn mask_ptr(mask: Option<&[Pixel]>) -> Option<*const Pixel> {
    mask.map(<[Pixel]>::as_ptr)
}

/// `dst = src OVER dst`.
#[inline(always)]
pub(crate) unsafe fn over<V: PixelLanes, A: AlphaChannel>(
    dst: &mut [Pixel],
    src: &[Pixel],
    mask: Option<&[Pixel]>,
) {
    let pd = dst.as_mut_ptr();
    let ps = src.as_ptr();

    match mask_ptr(mask) {
        None => {
            for span in Spans::new(dst.len(), V::LANES) {
                let lanes = V::span_lanes(span.len);
                let (d, s) = (pd.add(span.offset), ps.add(span.offset));

                let src = V::load(s, lanes);
                if V::is_zero(src) {
                    continue;
                }
                if is_opaque::<V, A>(src) {
                    V::store(d, lanes, src);
                    continue;
                }

                let dst = V::load(d, lanes);
                V::store(d, lanes, over_packed::<V, A>(src, dst));
            }
        }
        Some(pm) => {
            for span in Spans::new(dst.len(), V::LANES) {
                let lanes = V::span_lanes(span.len);
                let d = pd.add(span.offset);
                let s = ps.add(span.offset);
                let m = pm.add(span.offset);

                let mask = V::load(m, lanes);
                if is_transparent::<V, A>(mask) {
                    continue;
                }

                let src = V::load(s, lanes);
                // Both alphas at 255 leave the source unscaled and opaque.
                if is_opaque::<V, A>(V::and(src, mask)) {
                    V::store(d, lanes, src);
                    continue;
                }

                let src = in_mask::<V, A>(src, mask);
                let dst = V::load(d, lanes);
                V::store(d, lanes, over_packed::<V, A>(src, dst));
            }
        }
    }
}

/// `dst = dst OVER src`.
#[inline(always)]
pub(crate) unsafe fn over_reverse<V: PixelLanes, A: AlphaChannel>(
    dst: &mut [Pixel],
    src: &[Pixel],
    mask: Option<&[Pixel]>,
) {
    let pd = dst.as_mut_ptr();
    let ps = src.as_ptr();
    let pm = mask_ptr(mask);

    for span in Spans::new(dst.len(), V::LANES) {
        let lanes = V::span_lanes(span.len);
        let d = pd.add(span.offset);

        let m = pm.map(|m| m.add(span.offset));
        let src = masked_source::<V, A>(ps.add(span.offset), m, lanes);
        if V::is_zero(src) {
            continue;
        }

        let dst = V::load(d, lanes);
        if is_opaque::<V, A>(dst) {
            continue;
        }

        V::store(d, lanes, over_packed::<V, A>(dst, src));
    }
}

/// `dst = dst * (255 - alpha(src))`.
#[inline(always)]
pub(crate) unsafe fn out_reverse<V: PixelLanes, A: AlphaChannel>(
    dst: &mut [Pixel],
    src: &[Pixel],
    mask: Option<&[Pixel]>,
) {
    let pd = dst.as_mut_ptr();
    let ps = src.as_ptr();
    let pm = mask_ptr(mask);

    for span in Spans::new(dst.len(), V::LANES) {
        let lanes = V::span_lanes(span.len);
        let d = pd.add(span.offset);

        let m = pm.map(|m| m.add(span.offset));
        let src = masked_source::<V, A>(ps.add(span.offset), m, lanes);
        if V::is_zero(src) {
            continue;
        }

        let (s_lo, s_hi) = V::widen(src);
        let a_lo = V::negate(expand_alpha::<V, A>(s_lo));
        let a_hi = V::negate(expand_alpha::<V, A>(s_hi));

        let (d_lo, d_hi) = V::widen(V::load(d, lanes));
        V::store(
            d,
            lanes,
            V::narrow(V::multiply(d_lo, a_lo), V::multiply(d_hi, a_hi)),
        );
    }
}

/// `dst = adds(src, dst)`.
#[inline(always)]
pub(crate) unsafe fn add<V: PixelLanes, A: AlphaChannel>(
    dst: &mut [Pixel],
    src: &[Pixel],
    mask: Option<&[Pixel]>,
) {
    let pd = dst.as_mut_ptr();
    let ps = src.as_ptr();
    let pm = mask_ptr(mask);

    for span in Spans::new(dst.len(), V::LANES) {
        let lanes = V::span_lanes(span.len);
        let d = pd.add(span.offset);

        let m = pm.map(|m| m.add(span.offset));
        let src = masked_source::<V, A>(ps.add(span.offset), m, lanes);
        if V::is_zero(src) {
            continue;
        }

        V::store(d, lanes, V::adds(src, V::load(d, lanes)));
    }
}

/// `dst = dst OVER solid` for a single solid source pixel.
#[inline(always)]
pub(crate) unsafe fn over_reverse_solid<V: PixelLanes, A: AlphaChannel>(
    dst: &mut [Pixel],
    solid: Pixel,
) {
    if solid == 0 {
        return;
    }

    let pd = dst.as_mut_ptr();
    let src = V::splat(solid);

    for span in Spans::new(dst.len(), V::LANES) {
        let lanes = V::span_lanes(span.len);
        let d = pd.add(span.offset);

        let dst = V::load(d, lanes);
        if is_opaque::<V, A>(dst) {
            continue;
        }

        V::store(d, lanes, over_packed::<V, A>(dst, src));
    }
}

/// Copies `src` into `dst` with the alpha channel forced to 255.
#[inline(always)]
pub(crate) unsafe fn fill_alpha<V: PixelLanes, A: AlphaChannel>(
    dst: &mut [Pixel],
    src: &[Pixel],
) {
    let pd = dst.as_mut_ptr();
    let ps = src.as_ptr();
    let alpha = V::splat(A::MASK);

    for span in Spans::new(dst.len(), V::LANES) {
        let lanes = V::span_lanes(span.len);
        let s = V::load(ps.add(span.offset), lanes);
        V::store(pd.add(span.offset), lanes, V::or(s, alpha));
    }
}
