//! Five-region aggregation.
//!
//! The score of a window is the centre region plus the two best of the four
//! corner regions centred `radius.y` rows above and below and `radius.x`
//! columns to either side. Picking corners per pixel lets windows straddling
//! a depth edge ignore the side that belongs to the other surface.

use crate::disparity::ScoreGeometry;
use crate::numeric::Score;
use crate::order::ScoreOrder;

/// Sum of the two best of four corner scores.
///
/// Each half is ordered first, then two comparisons decide between both
/// bottom, one of each, or both top. The result always equals the optimal
/// pair, which may come entirely from one half.
#[inline]
pub fn best_two_sum<S: Score, O: ScoreOrder>(top_a: S, top_b: S, bottom_a: S, bottom_b: S) -> S {
    let (top_best, top_worst) = if O::is_better(top_b, top_a) {
        (top_b, top_a)
    } else {
        (top_a, top_b)
    };
    let (bottom_best, bottom_worst) = if O::is_better(bottom_b, bottom_a) {
        (bottom_b, bottom_a)
    } else {
        (bottom_a, bottom_b)
    };

    if O::is_better(bottom_worst, top_best) {
        bottom_best + bottom_worst
    } else if O::is_better(bottom_best, top_worst) {
        bottom_best + top_best
    } else {
        top_best + top_worst
    }
}

/// Combines three region-sum rows into five-region scores.
///
/// `top`, `middle` and `bottom` are region sums centred `2 * radius.y`,
/// `radius.y` and `0` rows before the latest one; all share `geometry`'s
/// layout. Only valid centre columns of `out` are written, the rest are
/// zeroed.
///
/// Near the left end of a block the corners are sampled at offsets `0` and
/// `+radius.x`; near the right end the two `-radius.x` corners are summed
/// as they are.
pub fn combine_five_regions<S: Score, O: ScoreOrder>(
    top: &[S],
    middle: &[S],
    bottom: &[S],
    geometry: &ScoreGeometry,
    out: &mut [S],
) {
    let width = geometry.width();
    let rx = geometry.radius().x;

    for (index, block) in out
        .chunks_exact_mut(width)
        .take(geometry.disparities())
        .enumerate()
    {
        block.fill(S::ZERO);
        let Some((first, last)) = geometry.centre_columns(index) else {
            continue;
        };
        let base = index * width;
        let top = &top[base..base + width];
        let middle = &middle[base..base + width];
        let bottom = &bottom[base..base + width];

        for x in first..=last {
            let corners = if x < first + rx {
                if x + rx <= last {
                    best_two_sum::<S, O>(top[x], top[x + rx], bottom[x], bottom[x + rx])
                } else {
                    top[x] + bottom[x]
                }
            } else if x + rx > last {
                top[x - rx] + bottom[x - rx]
            } else {
                best_two_sum::<S, O>(top[x - rx], top[x + rx], bottom[x - rx], bottom[x + rx])
            };
            block[x] = middle[x] + corners;
        }
    }
}
