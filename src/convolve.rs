use imgref::{ImgRef, ImgVec};

use crate::ProgressFn;
use crate::pixel::{Accum, MAX_CHANNELS, Pixel, accumulate};
use crate::weights::WeightTable;

/// Row-granular progress reporting, monotonic and ending at exactly 100.
pub(crate) struct Progress<'a, 'f> {
    sink: &'a mut (dyn FnMut(f64) + 'f),
    done: usize,
    total: usize,
    complete: bool,
}

impl<'a, 'f> Progress<'a, 'f> {
    pub(crate) fn new(sink: &'a mut (dyn FnMut(f64) + 'f), total: usize) -> Self {
        Self {
            sink,
            done: 0,
            total,
            complete: false,
        }
    }

    pub(crate) fn tick(&mut self) {
        if self.complete {
            return;
        }
        self.done += 1;
        if self.done >= self.total {
            self.finish();
        } else {
            (self.sink)(self.done as f64 * 100.0 / self.total as f64);
        }
    }

    pub(crate) fn finish(&mut self) {
        if !self.complete {
            self.complete = true;
            self.done = self.total;
            (self.sink)(100.0);
        }
    }
}

/// Resample every row of `src` through `weights`, producing a
/// `weights.len() x src.height()` intermediate at full precision.
pub(crate) fn horizontal_pass<P: Pixel>(
    src: ImgRef<'_, P>,
    weights: &WeightTable,
    progress: &mut Progress<'_, '_>,
) -> Vec<Accum> {
    assert_eq!(
        weights.src_len(),
        src.width(),
        "horizontal weights built for a different source width"
    );
    let dst_width = weights.len();
    let mut temp = Vec::with_capacity(dst_width * src.height());
    let mut wide_row: Vec<Accum> = Vec::with_capacity(src.width());

    for y in 0..src.height() {
        let src_row = &src.buf()[y * src.stride()..][..src.width()];
        wide_row.clear();
        wide_row.extend(src_row.iter().map(|px| px.to_accum()));

        temp.extend(weights.iter().map(|pw| {
            let mut acc = [0.0; MAX_CHANNELS];
            for e in &pw.entries {
                accumulate::<P>(&mut acc, &wide_row[e.src_pixel], e.weight);
            }
            acc
        }));
        progress.tick();
    }

    temp
}

/// Resample the columns of a `width`-wide intermediate through `weights`
/// and narrow the result back to storage.
pub(crate) fn vertical_pass<P: Pixel>(
    temp: &[Accum],
    width: usize,
    weights: &WeightTable,
    progress: &mut Progress<'_, '_>,
) -> ImgVec<P> {
    assert_eq!(
        temp.len(),
        width * weights.src_len(),
        "vertical weights built for a different intermediate height"
    );
    let mut result = Vec::with_capacity(width * weights.len());
    let mut acc_row = vec![[0.0; MAX_CHANNELS]; width];

    for pw in weights {
        acc_row.fill([0.0; MAX_CHANNELS]);
        for e in &pw.entries {
            let temp_row = &temp[e.src_pixel * width..][..width];
            for (acc, px) in acc_row.iter_mut().zip(temp_row) {
                accumulate::<P>(acc, px, e.weight);
            }
        }
        result.extend(acc_row.iter().map(|&acc| P::from_accum(acc)));
        progress.tick();
    }

    ImgVec::new(result, width, weights.len())
}

/// Separable 2D resample: horizontal pass then vertical pass.
///
/// `h_weights` must map `src.width()` and `v_weights` must map `src.height()`.
/// The output is `h_weights.len() x v_weights.len()`. `progress` receives one
/// report per completed row of either pass, ending at exactly 100.
pub fn resample<P: Pixel>(
    src: ImgRef<'_, P>,
    h_weights: &WeightTable,
    v_weights: &WeightTable,
    progress: &mut ProgressFn<'_>,
) -> ImgVec<P> {
    let mut progress = Progress::new(progress, src.height() + v_weights.len());
    let temp = horizontal_pass(src, h_weights, &mut progress);
    let out = vertical_pass(&temp, h_weights.len(), v_weights, &mut progress);
    progress.finish();
    out
}
