use crate::Error;
use crate::filters::Kernel;

/// Weights at or below this magnitude are dropped.
const NEGLIGIBLE: f64 = 1e-12;

/// A single weight entry: which source pixel contributes and by how much.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    pub src_pixel: usize,
    pub weight: f64,
}

/// The computed weights for a single output pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelWeights {
    pub entries: Vec<WeightEntry>,
}

impl PixelWeights {
    fn single(src_pixel: usize) -> Self {
        Self {
            entries: vec![WeightEntry {
                src_pixel,
                weight: 1.0,
            }],
        }
    }
}

/// Per-axis mapping from destination index to weighted source contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    src_len: usize,
    pixels: Vec<PixelWeights>,
}

impl WeightTable {
    /// Source length the table samples from.
    pub fn src_len(&self) -> usize {
        self.src_len
    }

    /// Destination length (number of output pixels).
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, dst: usize) -> Option<&PixelWeights> {
        self.pixels.get(dst)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PixelWeights> {
        self.pixels.iter()
    }

    /// True when every output pixel copies exactly one source pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.src_len == self.pixels.len()
            && self.pixels.iter().enumerate().all(|(i, pw)| {
                matches!(pw.entries.as_slice(), [e] if e.src_pixel == i && e.weight == 1.0)
            })
    }

    fn identity(len: usize) -> Self {
        Self {
            src_len: len,
            pixels: (0..len).map(PixelWeights::single).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a WeightTable {
    type Item = &'a PixelWeights;
    type IntoIter = std::slice::Iter<'a, PixelWeights>;

    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

/// Reject kernels with a non-positive or non-finite radius, or that return
/// a non-finite weight inside their support.
///
/// Only a few points are sampled; [`compute_weights`] still checks every tap
/// it evaluates.
pub fn validate_kernel<K: Kernel + ?Sized>(kernel: &K) -> Result<(), Error> {
    let radius = kernel.radius();
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::UnsupportedKernel {
            reason: format!("radius must be finite and positive, got {radius}"),
        });
    }
    for x in [0.0, radius / 2.0, -radius / 2.0, radius, -radius] {
        let w = kernel.weight(x);
        if !w.is_finite() {
            return Err(Error::UnsupportedKernel {
                reason: format!("weight at {x} is {w}"),
            });
        }
    }
    Ok(())
}

/// Compute the pixel weight table for a 1D resize of `src_len` to `dst_len`.
///
/// When downscaling the kernel is stretched by the scale factor so every
/// source pixel contributes. Out-of-range taps are clamped onto the edge
/// pixel, and each output pixel's weights are normalized to sum to 1.
///
/// An axis whose length does not change is an identity mapping, and point
/// samplers always get a single tap.
pub fn compute_weights<K: Kernel + ?Sized>(
    kernel: &K,
    src_len: usize,
    dst_len: usize,
) -> Result<WeightTable, Error> {
    if src_len == 0 || dst_len == 0 {
        return Err(Error::InvalidRequest {
            reason: format!("cannot build a weight table for {src_len} -> {dst_len}"),
        });
    }

    validate_kernel(kernel)?;
    let radius = kernel.radius();

    if src_len == dst_len {
        log::trace!("identity weight table for {src_len} pixels");
        return Ok(WeightTable::identity(src_len));
    }

    // Source pixels per destination pixel.
    let scale = src_len as f64 / dst_len as f64;
    let last = src_len - 1;

    if kernel.is_point_sampler() {
        log::trace!("point-sampled weight table {src_len} -> {dst_len}");
        let pixels = (0..dst_len)
            .map(|dst_x| {
                // Sample under the output pixel's center, not its left edge.
                let src_x = ((dst_x as f64 + 0.5) * scale).floor() as usize;
                PixelWeights::single(src_x.min(last))
            })
            .collect();
        return Ok(WeightTable { src_len, pixels });
    }

    let filter_scale = scale.max(1.0);
    let support = radius * filter_scale;
    log::trace!("weight table {src_len} -> {dst_len}, support {support:.3}");

    let mut pixels = Vec::with_capacity(dst_len);

    for dst_x in 0..dst_len {
        // Center of this output pixel in source coordinates.
        let center = (dst_x as f64 + 0.5) * scale - 0.5;

        let left = (center - support).floor() as isize;
        let right = (center + support).ceil() as isize;

        let mut entries: Vec<WeightEntry> = Vec::new();
        let mut total = 0.0;

        for src_x in left..=right {
            let distance = (src_x as f64 - center) / filter_scale;
            let w = kernel.weight(distance);
            if !w.is_finite() {
                return Err(Error::UnsupportedKernel {
                    reason: format!("weight at {distance} is {w}"),
                });
            }
            if w.abs() <= NEGLIGIBLE {
                continue;
            }

            let clamped = src_x.clamp(0, last as isize) as usize;
            // Merge with existing entry for same clamped pixel.
            if let Some(existing) = entries.iter_mut().find(|e| e.src_pixel == clamped) {
                existing.weight += w;
            } else {
                entries.push(WeightEntry {
                    src_pixel: clamped,
                    weight: w,
                });
            }
            total += w;
        }

        if total.abs() <= NEGLIGIBLE {
            let nearest = center.round().clamp(0.0, last as f64) as usize;
            pixels.push(PixelWeights::single(nearest));
            continue;
        }

        for e in &mut entries {
            e.weight /= total;
        }
        pixels.push(PixelWeights { entries });
    }

    Ok(WeightTable { src_len, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{CustomKernel, Resampler};

    fn assert_normalized(table: &WeightTable, label: &str) {
        for (i, pw) in table.iter().enumerate() {
            assert!(!pw.entries.is_empty(), "{label}: pixel {i} has no taps");
            let sum: f64 = pw.entries.iter().map(|e| e.weight).sum();
            assert!(
                (sum - 1.0).abs() < 1e-6,
                "{label}: pixel {i} weights sum to {sum}"
            );
            for e in &pw.entries {
                assert!(e.src_pixel < table.src_len(), "{label}: tap {} out of range", e.src_pixel);
            }
        }
    }

    #[test]
    fn weights_sum_to_one() {
        for filter in Resampler::all_named() {
            let weights = compute_weights(filter, 15, 555).unwrap();
            assert_eq!(weights.len(), 555);
            assert_normalized(&weights, filter.name());
        }
    }

    #[test]
    fn weights_sum_to_one_downscale() {
        for filter in Resampler::all_named() {
            for (src, dst) in [(557, 555), (400, 133), (1000, 7), (9, 1)] {
                let weights = compute_weights(filter, src, dst).unwrap();
                assert_eq!(weights.len(), dst);
                assert_normalized(&weights, filter.name());
            }
        }
    }

    #[test]
    fn same_length_is_identity() {
        for filter in Resampler::all_named() {
            let weights = compute_weights(filter, 37, 37).unwrap();
            assert!(weights.is_identity(), "{} not identity", filter.name());
        }
    }

    #[test]
    fn downscale_widens_support() {
        let up = compute_weights(&Resampler::Triangle, 10, 20).unwrap();
        let down = compute_weights(&Resampler::Triangle, 40, 10).unwrap();
        let max_up = up.iter().map(|pw| pw.entries.len()).max().unwrap();
        let min_down = down.iter().skip(1).take(8).map(|pw| pw.entries.len()).min().unwrap();
        assert!(max_up <= 2, "triangle upscale uses {max_up} taps");
        assert!(min_down >= 7, "triangle 4x downscale uses only {min_down} taps");
    }

    #[test]
    fn edge_taps_merge_onto_boundary() {
        let weights = compute_weights(&Resampler::Lanczos3, 4, 9).unwrap();
        for pw in &weights {
            let mut seen: Vec<usize> = pw.entries.iter().map(|e| e.src_pixel).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), pw.entries.len(), "duplicate taps in {pw:?}");
        }
        assert!(weights.get(0).unwrap().entries.iter().any(|e| e.src_pixel == 0));
    }

    #[test]
    fn nearest_neighbor_single_tap() {
        for (src, dst) in [(10, 3), (3, 10), (7, 5), (1, 4)] {
            let weights = compute_weights(&Resampler::NearestNeighbor, src, dst).unwrap();
            for pw in &weights {
                assert_eq!(pw.entries.len(), 1);
                assert_eq!(pw.entries[0].weight, 1.0);
            }
        }
        let halved = compute_weights(&Resampler::NearestNeighbor, 4, 2).unwrap();
        let picked: Vec<usize> = halved.iter().map(|pw| pw.entries[0].src_pixel).collect();
        assert_eq!(picked, vec![1, 3]);
    }

    #[test]
    fn box_upscale_always_has_a_tap() {
        // Centers landing exactly between two source pixels give zero box weight.
        let weights = compute_weights(&Resampler::Box, 2, 3).unwrap();
        assert_normalized(&weights, "Box");
    }

    #[test]
    fn rejects_bad_kernels() {
        let zero = CustomKernel::new(|_| 1.0, 0.0);
        assert!(matches!(
            compute_weights(&zero, 10, 5),
            Err(Error::UnsupportedKernel { .. })
        ));

        let infinite = CustomKernel::new(|_| 1.0, f64::INFINITY);
        assert!(matches!(
            compute_weights(&infinite, 10, 5),
            Err(Error::UnsupportedKernel { .. })
        ));

        let nan = CustomKernel::new(|x| if x > 0.2 { f64::NAN } else { 1.0 }, 1.0);
        assert!(matches!(
            compute_weights(&nan, 10, 5),
            Err(Error::UnsupportedKernel { .. })
        ));
    }

    #[test]
    fn rejects_bad_kernels_on_identity_axis() {
        let nan = CustomKernel::new(|_| f64::NAN, 2.0);
        assert!(matches!(
            compute_weights(&nan, 12, 12),
            Err(Error::UnsupportedKernel { .. })
        ));
        let zero = CustomKernel::new(|_| 1.0, 0.0);
        assert!(matches!(
            compute_weights(&zero, 12, 12),
            Err(Error::UnsupportedKernel { .. })
        ));
    }

    #[test]
    fn builtin_kernels_validate() {
        for filter in Resampler::all_named() {
            assert!(validate_kernel(filter).is_ok(), "{}", filter.name());
        }
        assert!(validate_kernel(&Resampler::Cubic { b: 0.0, c: 0.75 }).is_ok());
    }

    #[test]
    fn rejects_empty_lengths() {
        assert!(matches!(
            compute_weights(&Resampler::Triangle, 0, 5),
            Err(Error::InvalidRequest { .. })
        ));
        assert!(matches!(
            compute_weights(&Resampler::Triangle, 5, 0),
            Err(Error::InvalidRequest { .. })
        ));
    }

    #[test]
    fn custom_kernel_matches_builtin() {
        let tent = CustomKernel::new(|x| 1.0 - x.abs(), 1.0);
        let custom = compute_weights(&tent, 13, 29).unwrap();
        let builtin = compute_weights(&Resampler::Triangle, 13, 29).unwrap();
        for (a, b) in custom.iter().zip(builtin.iter()) {
            assert_eq!(a.entries.len(), b.entries.len());
            for (ea, eb) in a.entries.iter().zip(b.entries.iter()) {
                assert_eq!(ea.src_pixel, eb.src_pixel);
                assert!((ea.weight - eb.weight).abs() < 1e-12);
            }
        }
    }
}
