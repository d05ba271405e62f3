//! Vertical region aggregation.
//!
//! [`RegionAccumulator`] keeps the last `region_height` row scores and their
//! running vertical sum. Advancing one row subtracts the row leaving the
//! window and adds the row entering it, so each step costs one pass over a
//! score row regardless of the window height.
//!
//! Both rings hold `region_height + 1` slots: the horizontal ring always has
//! a spare slot for the entering row, and the vertical ring keeps the previous
//! sum alive while the next one is written. Heads wrap with explicit compares.

pub mod five;

pub use five::{best_two_sum, combine_five_regions};

use crate::numeric::Score;

/// Window starts between direct re-summations for inexact score types.
///
/// Stripe seeds are aligned to this interval, which makes floating-point
/// sums independent of how the image is split.
pub const RESEED_INTERVAL: usize = 32;

/// Rolling vertical sum over `region_height` consecutive score rows.
#[derive(Debug, Default)]
pub struct RegionAccumulator<S> {
    region_height: usize,
    len: usize,
    normalize: bool,
    horizontal: Vec<S>,
    vertical: Vec<S>,
    normalized: Vec<S>,
    // Horizontal slot holding the oldest row of the window.
    oldest: usize,
    // Horizontal slot that receives the next row.
    spare: usize,
    // Vertical slot holding the latest sum.
    head: usize,
    produced: usize,
}

impl<S: Score> RegionAccumulator<S> {
    /// Creates an empty accumulator; buffers are sized by [`Self::configure`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares for rows of `len` scores and a window of `region_height` rows.
    ///
    /// Buffers only grow, so a reused accumulator never reallocates for
    /// images it has already seen.
    pub fn configure(&mut self, region_height: usize, len: usize, normalize: bool) {
        let total = (region_height + 1) * len;
        grow(&mut self.horizontal, total);
        grow(&mut self.vertical, total);
        if normalize {
            grow(&mut self.normalized, total);
        }
        self.region_height = region_height;
        self.len = len;
        self.normalize = normalize;
        self.oldest = 0;
        self.spare = region_height;
        self.head = 0;
        self.produced = 0;
    }

    /// Window height in rows.
    pub fn region_height(&self) -> usize {
        self.region_height
    }

    /// Number of region sums produced since the last seed.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Scores the first window directly and sums it.
    ///
    /// `score_row(k, buf)` must fill `buf` with the scores of the `k`-th row
    /// of the window.
    pub fn seed<F: FnMut(usize, &mut [S])>(&mut self, mut score_row: F) {
        let len = self.len;
        for k in 0..self.region_height {
            score_row(k, &mut self.horizontal[k * len..(k + 1) * len]);
        }
        self.oldest = 0;
        self.spare = self.region_height;
        self.head = 0;
        self.sum_window(0);
        self.produced = 1;
    }

    /// Slides the window down one row.
    ///
    /// `score_row` fills the entering row. When `resum` is set the new sum is
    /// recomputed from the ring instead of updated incrementally.
    pub fn advance<F: FnOnce(&mut [S])>(&mut self, resum: bool, score_row: F) {
        let len = self.len;
        let entering = self.spare;
        let leaving = self.oldest;
        score_row(&mut self.horizontal[entering * len..(entering + 1) * len]);

        let next = self.wrap(self.head + 1);
        self.oldest = self.wrap(leaving + 1);
        self.spare = leaving;
        if resum {
            self.sum_window(next);
        } else {
            let (prev, out) = split_slots(&mut self.vertical, len, self.head, next);
            S::rolling_update(
                prev,
                &self.horizontal[leaving * len..(leaving + 1) * len],
                &self.horizontal[entering * len..(entering + 1) * len],
                out,
            );
        }
        self.head = next;
        self.produced += 1;
    }

    /// Rewrites the latest sum through `normalize(sum, out)`.
    ///
    /// Does nothing unless the accumulator was configured with
    /// normalization.
    pub fn normalize_latest<F: FnOnce(&[S], &mut [S])>(&mut self, normalize: F) {
        if !self.normalize {
            return;
        }
        let start = self.head * self.len;
        let end = start + self.len;
        normalize(&self.vertical[start..end], &mut self.normalized[start..end]);
    }

    /// Latest region sum (normalized when configured).
    pub fn latest(&self) -> &[S] {
        self.lagged(0).unwrap_or(&[])
    }

    /// Region sum produced `steps` advances before the latest one.
    ///
    /// Available for `steps < produced()` and `steps <= region_height()`.
    pub fn lagged(&self, steps: usize) -> Option<&[S]> {
        if steps >= self.produced || steps > self.region_height {
            return None;
        }
        let slot = if steps <= self.head {
            self.head - steps
        } else {
            self.head + self.region_height + 1 - steps
        };
        let buf = if self.normalize {
            &self.normalized
        } else {
            &self.vertical
        };
        Some(&buf[slot * self.len..(slot + 1) * self.len])
    }

    #[inline]
    fn wrap(&self, slot: usize) -> usize {
        if slot > self.region_height {
            slot - self.region_height - 1
        } else {
            slot
        }
    }

    fn sum_window(&mut self, target: usize) {
        let len = self.len;
        let slots = self.region_height + 1;
        let out = &mut self.vertical[target * len..(target + 1) * len];
        out.fill(S::ZERO);
        let mut slot = self.oldest;
        for _ in 0..self.region_height {
            S::accumulate(out, &self.horizontal[slot * len..(slot + 1) * len]);
            slot += 1;
            if slot == slots {
                slot = 0;
            }
        }
    }
}

fn grow<S: Score>(buf: &mut Vec<S>, len: usize) {
    if buf.len() < len {
        buf.resize(len, S::ZERO);
    }
}

fn split_slots<S>(buf: &mut [S], len: usize, read: usize, write: usize) -> (&[S], &mut [S]) {
    if read < write {
        let (lo, hi) = buf.split_at_mut(write * len);
        (&lo[read * len..(read + 1) * len], &mut hi[..len])
    } else {
        let (lo, hi) = buf.split_at_mut(read * len);
        (&hi[..len], &mut lo[write * len..(write + 1) * len])
    }
}

#[cfg(test)]
mod tests {
    use super::{RegionAccumulator, RESEED_INTERVAL};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_rows<T>(count: usize, len: usize, mut sample: impl FnMut() -> T) -> Vec<Vec<T>> {
        (0..count)
            .map(|_| (0..len).map(|_| sample()).collect())
            .collect()
    }

    #[test]
    fn rolling_sum_matches_direct_sum_i32() {
        let mut rng = StdRng::seed_from_u64(11);
        let (len, region_height, count) = (13, 5, 40);
        let rows = random_rows(count, len, || rng.random_range(0..1000i32));

        let mut acc = RegionAccumulator::<i32>::new();
        acc.configure(region_height, len, false);
        acc.seed(|k, buf| buf.copy_from_slice(&rows[k]));
        for start in 0..=count - region_height {
            if start > 0 {
                let entering = start + region_height - 1;
                acc.advance(false, |buf| buf.copy_from_slice(&rows[entering]));
            }
            for i in 0..len {
                let direct: i32 = rows[start..start + region_height].iter().map(|r| r[i]).sum();
                assert_eq!(acc.latest()[i], direct, "start={start} i={i}");
            }
        }
    }

    #[test]
    fn rolling_sum_tracks_direct_sum_f32_and_resums_exactly() {
        let mut rng = StdRng::seed_from_u64(5);
        let (len, region_height, count) = (9, 3, 3 * RESEED_INTERVAL);
        let rows = random_rows(count, len, || rng.random_range(0.0f32..255.0));

        let mut acc = RegionAccumulator::<f32>::new();
        acc.configure(region_height, len, false);
        acc.seed(|k, buf| buf.copy_from_slice(&rows[k]));
        for start in 1..=count - region_height {
            let entering = start + region_height - 1;
            let resum = start % RESEED_INTERVAL == 0;
            acc.advance(resum, |buf| buf.copy_from_slice(&rows[entering]));
            for i in 0..len {
                let mut direct = 0.0f32;
                for row in &rows[start..start + region_height] {
                    direct += row[i];
                }
                let got = acc.latest()[i];
                if resum {
                    assert_eq!(got, direct);
                } else {
                    assert!((got - direct).abs() <= 1e-2, "start={start} got={got}");
                }
            }
        }
    }

    #[test]
    fn single_row_window_and_lagged_sums() {
        let rows: Vec<Vec<i32>> = (0..6).map(|r| vec![r, 10 * r]).collect();
        let mut acc = RegionAccumulator::<i32>::new();
        acc.configure(1, 2, false);
        acc.seed(|k, buf| buf.copy_from_slice(&rows[k]));
        assert!(acc.lagged(1).is_none());
        for r in 1..6 {
            acc.advance(false, |buf| buf.copy_from_slice(&rows[r]));
            assert_eq!(acc.latest(), rows[r].as_slice());
            assert_eq!(acc.lagged(1).unwrap(), rows[r - 1].as_slice());
        }
    }

    #[test]
    fn normalized_ring_is_read_when_configured() {
        let mut acc = RegionAccumulator::<f32>::new();
        acc.configure(2, 3, true);
        acc.seed(|k, buf| buf.fill(k as f32 + 1.0));
        acc.normalize_latest(|sum, out| {
            for (o, s) in out.iter_mut().zip(sum) {
                *o = s / 3.0;
            }
        });
        assert_eq!(acc.latest(), &[1.0, 1.0, 1.0]);
    }
}
