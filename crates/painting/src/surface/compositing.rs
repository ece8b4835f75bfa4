//! Porter-Duff and separable blend math
//!
//! Pixels are stored straight (non-premultiplied); the operators work on
//! premultiplied values and convert back.

use crate::types::BlendMode;

#[inline]
fn premultiply(c: [f32; 4]) -> [f32; 4] {
    [c[0] * c[3], c[1] * c[3], c[2] * c[3], c[3]]
}

#[inline]
fn unpremultiply(c: [f32; 4]) -> [f32; 4] {
    let a = c[3].clamp(0.0, 1.0);
    if a <= f32::EPSILON {
        return [0.0; 4];
    }
    [
        (c[0] / a).clamp(0.0, 1.0),
        (c[1] / a).clamp(0.0, 1.0),
        (c[2] / a).clamp(0.0, 1.0),
        a,
    ]
}

impl BlendMode {
    /// Whether a fully transparent source leaves the destination unchanged
    ///
    /// `DestinationIn` clears the destination wherever the source is empty,
    /// so it has to visit pixels outside the drawn source too.
    #[inline]
    pub fn keeps_destination_under_transparent_source(&self) -> bool {
        !matches!(self, BlendMode::DestinationIn)
    }
}

/// Composite `src` over `dst` with the given operator
pub fn composite(src: [f32; 4], dst: [f32; 4], mode: BlendMode) -> [f32; 4] {
    let s = premultiply(src);
    let d = premultiply(dst);
    let sa = s[3];
    let da = d[3];

    let out = match mode {
        BlendMode::SourceOver => {
            let inv = 1.0 - sa;
            [
                s[0] + d[0] * inv,
                s[1] + d[1] * inv,
                s[2] + d[2] * inv,
                sa + da * inv,
            ]
        }
        BlendMode::SourceAtop => {
            let inv = 1.0 - sa;
            [
                s[0] * da + d[0] * inv,
                s[1] * da + d[1] * inv,
                s[2] * da + d[2] * inv,
                da,
            ]
        }
        BlendMode::DestinationIn => [d[0] * sa, d[1] * sa, d[2] * sa, da * sa],
        BlendMode::DestinationOut => {
            let inv = 1.0 - sa;
            [d[0] * inv, d[1] * inv, d[2] * inv, da * inv]
        }
        BlendMode::Lighter => [
            (s[0] + d[0]).min(1.0),
            (s[1] + d[1]).min(1.0),
            (s[2] + d[2]).min(1.0),
            (sa + da).min(1.0),
        ],
        BlendMode::Multiply => separable(s, d, src, dst, |cb, cs| cb * cs),
        BlendMode::Screen => separable(s, d, src, dst, |cb, cs| cb + cs - cb * cs),
    };

    unpremultiply(out)
}

/// co = cs(1 - ad) + cd(1 - as) + as*ad*B(Cb, Cs)
#[inline]
fn separable(
    s: [f32; 4],
    d: [f32; 4],
    src: [f32; 4],
    dst: [f32; 4],
    blend: impl Fn(f32, f32) -> f32,
) -> [f32; 4] {
    let sa = s[3];
    let da = d[3];
    let mut out = [0.0; 4];
    for i in 0..3 {
        out[i] = s[i] * (1.0 - da) + d[i] * (1.0 - sa) + sa * da * blend(dst[i], src[i]);
    }
    out[3] = sa + da * (1.0 - sa);
    out
}
