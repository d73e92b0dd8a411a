#![forbid(unsafe_code)]

//! Image resizing by separable convolution.
//!
//! A resize runs in three stages:
//!
//! 1. [`geometry::resolve`] turns a [`ResizeRequest`] (target size plus a
//!    [`ResizeMode`]) into a [`ResizeGeometry`]: which part of the source is
//!    sampled, what size it is resampled to, and where it lands on the output
//!    canvas.
//! 2. [`compute_weights`] builds a [`WeightTable`] per axis from a [`Kernel`],
//!    widening the kernel when downscaling.
//! 3. [`resample`] applies the tables as a horizontal pass into a
//!    full-precision intermediate, then a vertical pass back to storage.
//!
//! Padding modes then composite the result onto a background-filled canvas.
//!
//! ```
//! use imgref::ImgVec;
//! use resizer::{ResizeMode, ResizeRequest, Resampler};
//! use rgb::RGBA8;
//!
//! let src = ImgVec::new(vec![RGBA8::new(200, 100, 50, 255); 400 * 300], 400, 300);
//! let request = ResizeRequest {
//!     width: 600,
//!     height: 300,
//!     mode: ResizeMode::Pad,
//!     resampler: Resampler::Lanczos3,
//!     ..Default::default()
//! };
//! let out = resizer::resize(src.as_ref(), &request).unwrap();
//! assert_eq!((out.width(), out.height()), (600, 300));
//! ```
//!
//! Pixels are anything implementing [`Pixel`]: `u8`, `u16` and `f32` gray
//! samples, and `rgb::RGB` / `rgb::RGBA` over those.

pub mod convolve;
pub mod filters;
pub mod geometry;
pub mod pixel;
pub mod weights;

use imgref::{ImgRef, ImgVec};

pub use convolve::resample;
pub use filters::{CustomKernel, Kernel, Resampler};
pub use geometry::{AnchorPosition, Point, Rect, ResizeGeometry, ResizeMode, Size};
pub use pixel::{Pixel, Sample};
pub use weights::{PixelWeights, WeightEntry, WeightTable, compute_weights, validate_kernel};

use convolve::Progress;

/// Progress sink: receives percentages in `0.0..=100.0`, non-decreasing,
/// the last one exactly `100.0`.
pub type ProgressFn<'a> = dyn FnMut(f64) + 'a;

/// What to resize to, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    /// Target width; 0 derives it from `height` and the source aspect ratio.
    pub width: usize,
    /// Target height; 0 derives it from `width` and the source aspect ratio.
    pub height: usize,
    pub mode: ResizeMode,
    /// Crop window placement for [`ResizeMode::Crop`], image placement for
    /// [`ResizeMode::Pad`] and [`ResizeMode::BoxPad`].
    pub anchor: AnchorPosition,
    /// Focal point for [`ResizeMode::Crop`] as fractions of the source width
    /// and height. Overrides `anchor` when set.
    pub center: Option<(f64, f64)>,
    pub resampler: Resampler,
}

impl ResizeRequest {
    /// A [`ResizeMode::Stretch`] request with the default resampler.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

impl Default for ResizeRequest {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            mode: ResizeMode::Stretch,
            anchor: AnchorPosition::Center,
            center: None,
            resampler: Resampler::default(),
        }
    }
}

/// Error type for resize operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid resize request: {reason}")]
    InvalidRequest { reason: String },
    #[error("source image is empty ({width}x{height})")]
    EmptySource { width: usize, height: usize },
    #[error("unsupported kernel: {reason}")]
    UnsupportedKernel { reason: String },
}

/// Resize `src` as described by `request`, padding with `P::default()`.
pub fn resize<P: Pixel>(src: ImgRef<'_, P>, request: &ResizeRequest) -> Result<ImgVec<P>, Error> {
    resize_with(src, request, P::default(), &mut |_| {})
}

/// Resize with an explicit padding background and a progress sink.
pub fn resize_with<P: Pixel>(
    src: ImgRef<'_, P>,
    request: &ResizeRequest,
    background: P,
    progress: &mut ProgressFn<'_>,
) -> Result<ImgVec<P>, Error> {
    resize_with_kernel(src, request, &request.resampler, background, progress)
}

/// Resize using `kernel` instead of `request.resampler`.
pub fn resize_with_kernel<P: Pixel, K: Kernel + ?Sized>(
    src: ImgRef<'_, P>,
    request: &ResizeRequest,
    kernel: &K,
    background: P,
    progress: &mut ProgressFn<'_>,
) -> Result<ImgVec<P>, Error> {
    let geometry = geometry::resolve(Size::new(src.width(), src.height()), request)?;
    log::debug!(
        "resize {}x{} -> {} ({}): crop {:?}, dest {}, paste {:?}",
        src.width(),
        src.height(),
        geometry.canvas_size,
        request.mode,
        geometry.source_crop,
        geometry.dest_size,
        geometry.paste_position,
    );
    apply_geometry(src, &geometry, kernel, background, progress)
}

/// Run an already resolved geometry.
///
/// Geometries built by hand are checked with [`ResizeGeometry::validate`],
/// and the kernel with [`validate_kernel`], even when no resampling is needed.
pub fn apply_geometry<P: Pixel, K: Kernel + ?Sized>(
    src: ImgRef<'_, P>,
    geometry: &ResizeGeometry,
    kernel: &K,
    background: P,
    progress: &mut ProgressFn<'_>,
) -> Result<ImgVec<P>, Error> {
    geometry.validate(Size::new(src.width(), src.height()))?;
    validate_kernel(kernel)?;
    let crop = geometry.source_crop;
    let region = src.sub_image(crop.x, crop.y, crop.width, crop.height);
    let dest = geometry.dest_size;

    let (h_weights, v_weights) = if geometry.is_copy() {
        (None, None)
    } else {
        (
            Some(compute_weights(kernel, crop.width, dest.width)?),
            Some(compute_weights(kernel, crop.height, dest.height)?),
        )
    };

    let resample_rows = if h_weights.is_some() {
        crop.height + dest.height
    } else {
        dest.height
    };
    let composite_rows = if geometry.is_padded() {
        dest.height
    } else {
        0
    };
    let mut progress = Progress::new(progress, resample_rows + composite_rows);

    let resized = match (h_weights, v_weights) {
        (Some(h), Some(v)) => {
            let temp = convolve::horizontal_pass(region, &h, &mut progress);
            convolve::vertical_pass(&temp, h.len(), &v, &mut progress)
        }
        _ => copy_region(region, &mut progress),
    };

    let out = if geometry.is_padded() {
        let mut canvas = ImgVec::new(
            vec![background; geometry.canvas_size.width * geometry.canvas_size.height],
            geometry.canvas_size.width,
            geometry.canvas_size.height,
        );
        paste(&mut canvas, resized.as_ref(), geometry.paste_position, &mut progress);
        canvas
    } else {
        resized
    };

    progress.finish();
    Ok(out)
}

fn copy_region<P: Pixel>(region: ImgRef<'_, P>, progress: &mut Progress<'_, '_>) -> ImgVec<P> {
    let mut pixels = Vec::with_capacity(region.width() * region.height());
    for y in 0..region.height() {
        pixels.extend_from_slice(&region.buf()[y * region.stride()..][..region.width()]);
        progress.tick();
    }
    ImgVec::new(pixels, region.width(), region.height())
}

fn paste<P: Pixel>(
    canvas: &mut ImgVec<P>,
    region: ImgRef<'_, P>,
    at: Point,
    progress: &mut Progress<'_, '_>,
) {
    let stride = canvas.stride();
    let buf = canvas.buf_mut();
    for y in 0..region.height() {
        let src_row = &region.buf()[y * region.stride()..][..region.width()];
        buf[(at.y + y) * stride + at.x..][..region.width()].copy_from_slice(src_row);
        progress.tick();
    }
}
