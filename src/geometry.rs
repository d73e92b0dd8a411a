//! Maps a [`ResizeRequest`] onto a concrete crop/scale/pad transformation.
//!
//! All dimension math happens here, once per resize call; the convolution
//! engine only ever sees the resulting crop rectangle and output size.

use std::str::FromStr;

use crate::{Error, ResizeRequest};

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering all of `size`.
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// How the requested size is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeMode {
    /// Exactly the requested size; aspect ratio is not preserved.
    #[default]
    Stretch,
    /// Fit inside the requested box, never upscaling.
    Max,
    /// Cover the requested box; may exceed it on one axis.
    Min,
    /// Cover the requested box, then crop the overflow.
    Crop,
    /// Fit inside the requested box, then pad to it.
    Pad,
    /// Pad to the requested box, downscaling only when the source does not fit.
    BoxPad,
}

impl ResizeMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stretch => "Stretch",
            Self::Max => "Max",
            Self::Min => "Min",
            Self::Crop => "Crop",
            Self::Pad => "Pad",
            Self::BoxPad => "BoxPad",
        }
    }

    pub fn all() -> &'static [ResizeMode] {
        &[
            ResizeMode::Stretch,
            ResizeMode::Max,
            ResizeMode::Min,
            ResizeMode::Crop,
            ResizeMode::Pad,
            ResizeMode::BoxPad,
        ]
    }
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidRequest {
                reason: format!("unknown resize mode `{wanted}`"),
            })
    }
}

/// Which edge or corner a crop window or padded image hugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnchorPosition {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl AnchorPosition {
    /// Offset of a `free`-sized slack region for this anchor.
    ///
    /// Centered axes take the floor of half the slack.
    fn offset(self, free: Size) -> Point {
        use AnchorPosition::*;
        let x = match self {
            Left | TopLeft | BottomLeft => 0,
            Right | TopRight | BottomRight => free.width,
            Center | Top | Bottom => free.width / 2,
        };
        let y = match self {
            Top | TopLeft | TopRight => 0,
            Bottom | BottomLeft | BottomRight => free.height,
            Center | Left | Right => free.height / 2,
        };
        Point::new(x, y)
    }
}

/// Resolved transformation for one resize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeGeometry {
    /// Region of the source that is sampled.
    pub source_crop: Rect,
    /// Size the cropped region is resampled to.
    pub dest_size: Size,
    /// Final output size; larger than `dest_size` when padding.
    pub canvas_size: Size,
    /// Where the resampled region lands on the canvas.
    pub paste_position: Point,
}

impl ResizeGeometry {
    pub fn is_padded(&self) -> bool {
        self.dest_size != self.canvas_size
    }

    /// True when resampling is a pixel copy.
    pub fn is_copy(&self) -> bool {
        self.source_crop.size() == self.dest_size
    }

    /// Check that the geometry can be applied to a `source`-sized image:
    /// no empty sizes, the crop lies inside the source and the resampled
    /// region fits on the canvas.
    pub fn validate(&self, source: Size) -> Result<(), Error> {
        let invalid = |reason: String| Err(Error::InvalidRequest { reason });
        let crop = self.source_crop;
        for (name, size) in [
            ("source crop", crop.size()),
            ("destination", self.dest_size),
            ("canvas", self.canvas_size),
        ] {
            if size.is_empty() {
                return invalid(format!("{name} size {size} is empty"));
            }
        }
        let fits = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if !fits(crop.x, crop.width, source.width) || !fits(crop.y, crop.height, source.height) {
            return invalid(format!("crop {crop:?} lies outside the {source} source"));
        }
        let at = self.paste_position;
        if !fits(at.x, self.dest_size.width, self.canvas_size.width)
            || !fits(at.y, self.dest_size.height, self.canvas_size.height)
        {
            return invalid(format!(
                "{} region at {at:?} does not fit the {} canvas",
                self.dest_size, self.canvas_size
            ));
        }
        Ok(())
    }
}

/// Nearest integer, at least 1.
fn round_dim(v: f64) -> usize {
    (v.round() as usize).max(1)
}

/// Resolve `request` against a source of size `source`.
pub fn resolve(source: Size, request: &ResizeRequest) -> Result<ResizeGeometry, Error> {
    if source.is_empty() {
        return Err(Error::EmptySource {
            width: source.width,
            height: source.height,
        });
    }
    let target = target_size(source, request)?;

    let sw = source.width as f64;
    let sh = source.height as f64;
    let rw = target.width as f64 / sw;
    let rh = target.height as f64 / sh;
    let full = Rect::full(source);
    let scaled = |ratio: f64| Size::new(round_dim(sw * ratio), round_dim(sh * ratio));

    let geometry = match request.mode {
        ResizeMode::Stretch => unpadded(full, target),
        ResizeMode::Max => unpadded(full, scaled(rw.min(rh).min(1.0))),
        ResizeMode::Min => unpadded(full, scaled(rw.max(rh))),
        ResizeMode::Crop => {
            let ratio = rw.max(rh);
            let crop = Size::new(
                round_dim(target.width as f64 / ratio).min(source.width),
                round_dim(target.height as f64 / ratio).min(source.height),
            );
            let origin = match request.center {
                Some(focus) => focal_origin(source, crop, focus)?,
                None => request.anchor.offset(Size::new(
                    source.width - crop.width,
                    source.height - crop.height,
                )),
            };
            unpadded(
                Rect::new(origin.x, origin.y, crop.width, crop.height),
                target,
            )
        }
        ResizeMode::Pad => padded(full, scaled(rw.min(rh)), target, request.anchor),
        ResizeMode::BoxPad => {
            if source.width <= target.width && source.height <= target.height {
                padded(full, source, target, request.anchor)
            } else {
                padded(full, scaled(rw.min(rh)), target, request.anchor)
            }
        }
    };

    Ok(geometry)
}

/// Fill in a zero dimension from the source aspect ratio.
fn target_size(source: Size, request: &ResizeRequest) -> Result<Size, Error> {
    let (w, h) = (request.width, request.height);
    let sw = source.width as f64;
    let sh = source.height as f64;
    match (w, h) {
        (0, 0) => Err(Error::InvalidRequest {
            reason: "width and height cannot both be zero".into(),
        }),
        (0, h) => Ok(Size::new(round_dim(h as f64 * sw / sh), h)),
        (w, 0) => Ok(Size::new(w, round_dim(w as f64 * sh / sw))),
        (w, h) => Ok(Size::new(w, h)),
    }
}

fn unpadded(source_crop: Rect, size: Size) -> ResizeGeometry {
    ResizeGeometry {
        source_crop,
        dest_size: size,
        canvas_size: size,
        paste_position: Point::default(),
    }
}

fn padded(source_crop: Rect, dest: Size, canvas: Size, anchor: AnchorPosition) -> ResizeGeometry {
    let dest = Size::new(dest.width.min(canvas.width), dest.height.min(canvas.height));
    ResizeGeometry {
        source_crop,
        dest_size: dest,
        canvas_size: canvas,
        paste_position: anchor.offset(Size::new(
            canvas.width - dest.width,
            canvas.height - dest.height,
        )),
    }
}

/// Top-left of a `crop` window centered on the fractional point `focus`,
/// kept inside the source.
fn focal_origin(source: Size, crop: Size, (fx, fy): (f64, f64)) -> Result<Point, Error> {
    let valid = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
    if !valid(fx) || !valid(fy) {
        return Err(Error::InvalidRequest {
            reason: format!("center ({fx}, {fy}) must lie within 0..=1 on both axes"),
        });
    }
    let place = |focus: f64, extent: usize, window: usize| {
        let start = (focus * extent as f64 - window as f64 / 2.0).round();
        start.clamp(0.0, (extent - window) as f64) as usize
    };
    Ok(Point::new(
        place(fx, source.width, crop.width),
        place(fy, source.height, crop.height),
    ))
}
