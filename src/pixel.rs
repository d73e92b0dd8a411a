//! Channel and pixel abstractions the convolution engine reads and writes.
//!
//! Pixels are widened to an [`Accum`] of `f64` channels for all arithmetic and
//! narrowed back with saturation, so the storage depth never limits precision
//! of the intermediate buffer.

use rgb::{RGB, RGBA};

/// Largest channel count a [`Pixel`] may carry.
pub const MAX_CHANNELS: usize = 4;

/// Full-precision per-channel accumulator.
pub type Accum = [f64; MAX_CHANNELS];

/// A single channel sample with a fixed numeric range.
pub trait Sample: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    /// Upper bound of the storage range (the lower bound is 0).
    const MAX: f64;

    fn to_f64(self) -> f64;

    /// Narrows `v`, saturating at the range bounds.
    fn from_f64(v: f64) -> Self;
}

impl Sample for u8 {
    const MAX: f64 = 255.0;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.round().clamp(0.0, <Self as Sample>::MAX) as u8
    }
}

impl Sample for u16 {
    const MAX: f64 = 65535.0;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.round().clamp(0.0, <Self as Sample>::MAX) as u16
    }
}

/// Linear samples in `0.0..=1.0`.
impl Sample for f32 {
    const MAX: f64 = 1.0;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.clamp(0.0, <Self as Sample>::MAX) as f32
    }
}

/// A fixed-size tuple of channel samples.
pub trait Pixel: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    /// Number of channels in use; at most [`MAX_CHANNELS`].
    const CHANNELS: usize;

    /// Widens the pixel; unused trailing channels are zero.
    fn to_accum(self) -> Accum;

    /// Narrows an accumulator back to storage, saturating each channel.
    fn from_accum(acc: Accum) -> Self;
}

macro_rules! gray_pixel {
    ($($t:ty),*) => {$(
        impl Pixel for $t {
            const CHANNELS: usize = 1;

            fn to_accum(self) -> Accum {
                [self.to_f64(), 0.0, 0.0, 0.0]
            }

            fn from_accum(acc: Accum) -> Self {
                <$t as Sample>::from_f64(acc[0])
            }
        }
    )*};
}

gray_pixel!(u8, u16, f32);

impl<T: Sample> Pixel for RGB<T> {
    const CHANNELS: usize = 3;

    fn to_accum(self) -> Accum {
        [self.r.to_f64(), self.g.to_f64(), self.b.to_f64(), 0.0]
    }

    fn from_accum(acc: Accum) -> Self {
        RGB {
            r: T::from_f64(acc[0]),
            g: T::from_f64(acc[1]),
            b: T::from_f64(acc[2]),
        }
    }
}

impl<T: Sample> Pixel for RGBA<T> {
    const CHANNELS: usize = 4;

    fn to_accum(self) -> Accum {
        [
            self.r.to_f64(),
            self.g.to_f64(),
            self.b.to_f64(),
            self.a.to_f64(),
        ]
    }

    fn from_accum(acc: Accum) -> Self {
        RGBA {
            r: T::from_f64(acc[0]),
            g: T::from_f64(acc[1]),
            b: T::from_f64(acc[2]),
            a: T::from_f64(acc[3]),
        }
    }
}

/// `acc += px * weight` over the channels `P` uses.
#[inline]
pub(crate) fn accumulate<P: Pixel>(acc: &mut Accum, px: &Accum, weight: f64) {
    let n = P::CHANNELS.min(MAX_CHANNELS);
    for (a, p) in acc[..n].iter_mut().zip(&px[..n]) {
        *a += p * weight;
    }
}
