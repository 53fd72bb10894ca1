//! Seeded selection of the non-class attributes participating in a split.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Picks the attribute columns for a split.
///
/// A non-empty include list wins outright and is returned verbatim,
/// in the caller-given order. Otherwise the exclude list filters the
/// candidates (schema order preserved) and a seeded sample of
/// ⌊N·attributes_rate⌋ names is drawn from what remains. Unknown names
/// in the include list are not checked here; the store rejects them.
pub fn select_attributes(
    candidates: &[String],
    include: &[String],
    exclude: &[String],
    attributes_rate: f64,
    random_seed: i64,
) -> Vec<String> {
    if !include.is_empty() {
        return include.to_vec();
    }

    let filtered: Vec<String> = candidates
        .iter()
        .filter(|name| !exclude.contains(*name))
        .cloned()
        .collect();

    let sample_size = (filtered.len() as f64 * attributes_rate) as usize;
    ordered_sample(&filtered, sample_size, random_seed)
        .into_iter()
        .cloned()
        .collect()
}

/// Draws `k` elements without replacement, re-emitting them in their
/// original index order so the result is a stable sub-sequence of the
/// input rather than a shuffle.
fn ordered_sample<'a, T>(population: &'a [T], k: usize, random_seed: i64) -> Vec<&'a T> {
    let mut rng = StdRng::seed_from_u64(random_seed as u64);
    let mut indices = rand::seq::index::sample(&mut rng, population.len(), k).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| &population[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("attr_{i}")).collect()
    }

    #[test]
    fn test_include_overrides_everything() {
        let candidates = names(10);
        let include = vec!["c".to_string(), "a".to_string()];
        let exclude = vec!["a".to_string()];
        let picked = select_attributes(&candidates, &include, &exclude, 0.2, 7);
        assert_eq!(picked, include);
    }

    #[test]
    fn test_exclude_filters_preserving_order() {
        let candidates = names(4);
        let exclude = vec!["attr_1".to_string(), "attr_3".to_string()];
        let picked = select_attributes(&candidates, &[], &exclude, 1.0, 0);
        assert_eq!(picked, vec!["attr_0".to_string(), "attr_2".to_string()]);
    }

    #[test]
    fn test_sample_size_is_floor_of_rate() {
        let candidates = names(10);
        for (rate, expected) in [(0.0, 0), (0.15, 1), (0.5, 5), (0.99, 9), (1.0, 10)] {
            let picked = select_attributes(&candidates, &[], &[], rate, 42);
            assert_eq!(picked.len(), expected, "rate {rate}");
        }
    }

    #[test]
    fn test_same_seed_same_subset_every_call() {
        let candidates = names(10);
        let first = select_attributes(&candidates, &[], &[], 0.5, 0);
        for _ in 0..5 {
            assert_eq!(select_attributes(&candidates, &[], &[], 0.5, 0), first);
        }
    }

    #[test]
    fn test_different_seed_same_size() {
        let candidates = names(10);
        let a = select_attributes(&candidates, &[], &[], 0.5, 0);
        let b = select_attributes(&candidates, &[], &[], 0.5, 1);
        assert_eq!(a.len(), 5);
        assert_eq!(b.len(), 5);
    }

    #[test]
    fn test_result_is_subsequence_of_input() {
        let candidates = names(20);
        let picked = select_attributes(&candidates, &[], &[], 0.4, 99);
        let mut positions: Vec<usize> = picked
            .iter()
            .map(|p| candidates.iter().position(|c| c == p).unwrap())
            .collect();
        let sorted = {
            let mut s = positions.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(positions, sorted);
        positions.dedup();
        assert_eq!(positions.len(), picked.len(), "no duplicates");
    }
}
