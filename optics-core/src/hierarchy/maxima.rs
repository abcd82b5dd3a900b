//! Local maxima of a reachability plot.

/// Returns the ordering positions that are local maxima of `plot`, highest
/// first.
///
/// Position `i` (with `1 <= i < plot.len() - 1`) qualifies when it rises
/// strictly above its left neighbour, is not below its right neighbour, and
/// is not below any value in its window: `neighbourhood + 1` positions to
/// the left and `neighbourhood` positions to the right. Windows are clamped
/// to the plot and never include position 0.
/// Candidates are ordered by reachability descending, then by position
/// ascending.
///
/// # Examples
/// ```
/// use optics_core::find_local_maxima;
///
/// let plot = [f64::INFINITY, 0.1, 0.1, 0.9, 0.1, 0.1, 0.5, 0.1, 0.1];
/// assert_eq!(find_local_maxima(&plot, 1), [3, 6]);
/// assert_eq!(find_local_maxima(&plot, 3), [3]);
/// ```
#[must_use]
pub fn find_local_maxima(plot: &[f64], neighbourhood: usize) -> Vec<usize> {
    let len = plot.len();
    let mut maxima: Vec<usize> = (1..len.saturating_sub(1))
        .filter(|&position| is_local_maximum(plot, position, neighbourhood))
        .collect();
    maxima.sort_by(|&a, &b| {
        let (left, right) = (plot.get(a), plot.get(b));
        right
            .zip(left)
            .map_or(core::cmp::Ordering::Equal, |(r, l)| r.total_cmp(l))
            .then_with(|| a.cmp(&b))
    });
    maxima
}

fn is_local_maximum(plot: &[f64], position: usize, neighbourhood: usize) -> bool {
    let (Some(&value), Some(&previous), Some(&next)) = (
        plot.get(position),
        position
            .checked_sub(1)
            .and_then(|previous| plot.get(previous)),
        plot.get(position + 1),
    ) else {
        return false;
    };
    if !(value > previous && value >= next) {
        return false;
    }
    let lower = position
        .saturating_sub(neighbourhood.saturating_add(1))
        .max(1);
    let upper = plot
        .len()
        .min(position.saturating_add(neighbourhood).saturating_add(1));
    let before = plot.get(lower..position).unwrap_or_default();
    let after = plot.get(position + 1..upper).unwrap_or_default();
    before.iter().chain(after).all(|&other| value >= other)
}
