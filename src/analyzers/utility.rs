/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sorts `(key, value)` pairs by value, highest first, and keeps the first `n`.
///
/// The sort is stable, so equal values keep their incoming order.
pub fn top_n_desc<K>(mut pairs: Vec<(K, f64)>, n: usize) -> Vec<(K, f64)> {
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs.truncate(n);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[100.0, 200.0]), 150.0);
    }

    #[test]
    fn test_top_n_desc_is_stable_on_ties() {
        let pairs = vec![("a", 1.0), ("b", 5.0), ("c", 5.0), ("d", 3.0)];
        assert_eq!(top_n_desc(pairs, 3), vec![("b", 5.0), ("c", 5.0), ("d", 3.0)]);
    }

    #[test]
    fn test_top_n_desc_shorter_than_n() {
        assert_eq!(top_n_desc(vec![("a", 1.0)], 10), vec![("a", 1.0)]);
    }
}
