use std::cmp::Ordering;

/// Rank items using competition ranking ("1224" ranking).
///
/// Items are sorted descending by `key`. Items with equal keys share a rank,
/// and the rank following a tie skips by the number of tied items. Sorting is
/// stable, tied items keep their relative order.
pub fn competition_rank_desc<T, K, F>(mut items: Vec<T>, key: F) -> Vec<(usize, T)>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));

    let mut ranked: Vec<(usize, T)> = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some((prev_rank, prev)) if key(prev) == key(&item) => *prev_rank,
            _ => idx + 1,
        };
        ranked.push((rank, item));
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_rank_and_skip() {
        let ranked = competition_rank_desc(vec![10, 30, 20, 30, 5], |v| *v);
        assert_eq!(vec![(1, 30), (1, 30), (3, 20), (4, 10), (5, 5)], ranked);
    }

    #[test]
    fn stable_within_ties() {
        let ranked = competition_rank_desc(vec![("a", 1), ("b", 2), ("c", 1)], |v| v.1);
        assert_eq!(vec![(1, ("b", 2)), (2, ("a", 1)), (2, ("c", 1))], ranked);
    }

    #[test]
    fn empty() {
        let ranked = competition_rank_desc(Vec::<i32>::new(), |v| *v);
        assert!(ranked.is_empty());
    }
}
