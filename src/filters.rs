use std::f64::consts::PI;
use std::str::FromStr;

use crate::Error;

/// A resampling kernel: a weight function with bounded support.
///
/// Implementations must return `0.0` for every `|x| >= radius()`.
pub trait Kernel {
    /// Distance beyond which the kernel is zero.
    fn radius(&self) -> f64;

    /// Kernel value at offset `x` (in source pixels, before scaling).
    fn weight(&self, x: f64) -> f64;

    /// Point samplers pick exactly one source pixel per output pixel and
    /// never blend, whatever the scale.
    fn is_point_sampler(&self) -> bool {
        false
    }
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn radius(&self) -> f64 {
        (**self).radius()
    }

    fn weight(&self, x: f64) -> f64 {
        (**self).weight(x)
    }

    fn is_point_sampler(&self) -> bool {
        (**self).is_point_sampler()
    }
}

// Cubic BC pairs for the spline family.
const MITCHELL: (f64, f64) = (1.0 / 3.0, 1.0 / 3.0);
const SPLINE: (f64, f64) = (1.0, 0.0);
const ROBIDOUX: (f64, f64) = (0.37821575509399867, 0.31089212245300067);
const ROBIDOUX_SHARP: (f64, f64) = (0.2620145123990142, 0.3689927438004929);
const ROBIDOUX_SOFT: (f64, f64) = (0.67962275898295921, 0.1601886205085204);

/// Keys' cubic convolution coefficient.
const BICUBIC_A: f64 = -0.5;

/// The built-in resampling kernels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Resampler {
    NearestNeighbor,
    Box,
    Triangle,
    #[default]
    Bicubic,
    Lanczos3,
    Lanczos5,
    Lanczos8,
    MitchellNetravali,
    Hermite,
    Spline,
    Robidoux,
    RobidouxSharp,
    RobidouxSoft,
    Welch,
    /// Mitchell-Netravali cubic with arbitrary B and C.
    Cubic { b: f64, c: f64 },
}

impl Resampler {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NearestNeighbor => "NearestNeighbor",
            Self::Box => "Box",
            Self::Triangle => "Triangle",
            Self::Bicubic => "Bicubic",
            Self::Lanczos3 => "Lanczos3",
            Self::Lanczos5 => "Lanczos5",
            Self::Lanczos8 => "Lanczos8",
            Self::MitchellNetravali => "MitchellNetravali",
            Self::Hermite => "Hermite",
            Self::Spline => "Spline",
            Self::Robidoux => "Robidoux",
            Self::RobidouxSharp => "RobidouxSharp",
            Self::RobidouxSoft => "RobidouxSoft",
            Self::Welch => "Welch",
            Self::Cubic { .. } => "Cubic",
        }
    }

    /// All built-in named kernels.
    pub fn all_named() -> &'static [Resampler] {
        &[
            Resampler::NearestNeighbor,
            Resampler::Box,
            Resampler::Triangle,
            Resampler::Bicubic,
            Resampler::Lanczos3,
            Resampler::Lanczos5,
            Resampler::Lanczos8,
            Resampler::MitchellNetravali,
            Resampler::Hermite,
            Resampler::Spline,
            Resampler::Robidoux,
            Resampler::RobidouxSharp,
            Resampler::RobidouxSoft,
            Resampler::Welch,
        ]
    }
}

impl Kernel for Resampler {
    fn radius(&self) -> f64 {
        match self {
            Self::Box => 0.5,
            Self::NearestNeighbor | Self::Triangle | Self::Hermite | Self::Welch => 1.0,
            Self::Bicubic
            | Self::MitchellNetravali
            | Self::Spline
            | Self::Robidoux
            | Self::RobidouxSharp
            | Self::RobidouxSoft
            | Self::Cubic { .. } => 2.0,
            Self::Lanczos3 => 3.0,
            Self::Lanczos5 => 5.0,
            Self::Lanczos8 => 8.0,
        }
    }

    fn weight(&self, x: f64) -> f64 {
        match self {
            Self::NearestNeighbor | Self::Box => box_filter(x),
            Self::Triangle => triangle(x),
            Self::Bicubic => bicubic(x),
            Self::Lanczos3 => lanczos(x, 3),
            Self::Lanczos5 => lanczos(x, 5),
            Self::Lanczos8 => lanczos(x, 8),
            Self::MitchellNetravali => mitchell_netravali(x, MITCHELL),
            Self::Hermite => hermite(x),
            Self::Spline => mitchell_netravali(x, SPLINE),
            Self::Robidoux => mitchell_netravali(x, ROBIDOUX),
            Self::RobidouxSharp => mitchell_netravali(x, ROBIDOUX_SHARP),
            Self::RobidouxSoft => mitchell_netravali(x, ROBIDOUX_SOFT),
            Self::Welch => welch(x),
            Self::Cubic { b, c } => mitchell_netravali(x, (*b, *c)),
        }
    }

    fn is_point_sampler(&self) -> bool {
        matches!(self, Self::NearestNeighbor)
    }
}

impl std::fmt::Display for Resampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cubic { b, c } => write!(f, "Cubic(B={b:.3}, C={c:.3})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Resampler {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all_named()
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidRequest {
                reason: format!("unknown resampler `{wanted}`"),
            })
    }
}

/// A caller-supplied kernel.
///
/// Nothing is checked at construction; the weight table builder rejects a
/// non-positive radius or non-finite weights with [`Error::UnsupportedKernel`].
pub struct CustomKernel {
    weight: Box<dyn Fn(f64) -> f64 + Send + Sync>,
    radius: f64,
}

impl CustomKernel {
    pub fn new(weight: impl Fn(f64) -> f64 + Send + Sync + 'static, radius: f64) -> Self {
        Self {
            weight: Box::new(weight),
            radius,
        }
    }
}

impl std::fmt::Debug for CustomKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomKernel")
            .field("radius", &self.radius)
            .finish_non_exhaustive()
    }
}

impl Kernel for CustomKernel {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn weight(&self, x: f64) -> f64 {
        if x.abs() >= self.radius {
            0.0
        } else {
            (self.weight)(x)
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

fn box_filter(x: f64) -> f64 {
    if x.abs() < 0.5 { 1.0 } else { 0.0 }
}

fn triangle(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

fn hermite(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 {
        (2.0 * ax - 3.0) * ax * ax + 1.0
    } else {
        0.0
    }
}

fn welch(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax * ax } else { 0.0 }
}

fn bicubic(x: f64) -> f64 {
    let a = BICUBIC_A;
    let ax = x.abs();
    if ax <= 1.0 {
        ((a + 2.0) * ax - (a + 3.0)) * ax * ax + 1.0
    } else if ax < 2.0 {
        ((a * ax - 5.0 * a) * ax + 8.0 * a) * ax - 4.0 * a
    } else {
        0.0
    }
}

fn mitchell_netravali(x: f64, (b, c): (f64, f64)) -> f64 {
    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * ax * ax * ax
            + (-18.0 + 12.0 * b + 6.0 * c) * ax * ax
            + (6.0 - 2.0 * b))
            / 6.0
    } else if ax < 2.0 {
        ((-b - 6.0 * c) * ax * ax * ax
            + (6.0 * b + 30.0 * c) * ax * ax
            + (-12.0 * b - 48.0 * c) * ax
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

fn lanczos(x: f64, n: u32) -> f64 {
    let ax = x.abs();
    if ax < n as f64 {
        sinc(x) * sinc(x / n as f64)
    } else {
        0.0
    }
}
