use std::cmp::Ordering;

/// Ranks one similarity row.
///
/// The full row is sorted by descending score with a stable sort, so equal
/// scores keep row order. `exclude` is filtered out afterwards and the first
/// `k` survivors are returned as `(index, score)`. NaN scores sort last.
pub fn top_k(row: &[f64], exclude: usize, k: usize) -> Vec<(usize, f64)> {
    if k == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| descending(row[a], row[b]));

    order
        .into_iter()
        .filter(|&i| i != exclude)
        .take(k)
        .map(|i| (i, row[i]))
        .collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
