//! Random draw helpers over any `rand::Rng`.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Uniform integer in `lo..=hi`. Collapses to `lo` when the range is empty.
pub fn roll_range<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// True with `percent`/100 probability (uniform draw in [0, 100) below `percent`).
pub fn roll_percent<R: Rng + ?Sized>(rng: &mut R, percent: f32) -> bool {
    rng.gen::<f32>() * 100.0 < percent
}

/// True with probability `p`. Values outside [0, 1] saturate.
pub fn roll_chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Pick one of `items` with probability proportional to `weights`.
///
/// Returns `None` when the slices are empty, mismatched, or all weights are zero.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weights: &[f32],
    rng: &mut R,
) -> Option<&'a T> {
    if items.is_empty() || items.len() != weights.len() {
        return None;
    }
    let dist = WeightedIndex::new(weights).ok()?;
    items.get(dist.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_roll_range_inclusive() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut seen_lo = false;
        let mut seen_hi = false;
        for _ in 0..500 {
            let v = roll_range(&mut rng, 3, 6);
            assert!((3..=6).contains(&v));
            seen_lo |= v == 3;
            seen_hi |= v == 6;
        }
        assert!(seen_lo && seen_hi, "Both bounds should be reachable");
    }

    #[test]
    fn test_roll_range_empty_collapses() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert_eq!(roll_range(&mut rng, 5, 5), 5);
        assert_eq!(roll_range(&mut rng, 5, 2), 5);
    }

    #[test]
    fn test_roll_percent_extremes() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        for _ in 0..100 {
            assert!(!roll_percent(&mut rng, 0.0));
            assert!(roll_percent(&mut rng, 100.0));
        }
    }

    #[test]
    fn test_weighted_choice_respects_zero_weight() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let items = ["never", "always"];
        for _ in 0..200 {
            assert_eq!(weighted_choice(&items, &[0.0, 1.0], &mut rng), Some(&"always"));
        }
    }

    #[test]
    fn test_weighted_choice_rejects_bad_input() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let items = [1, 2];
        assert!(weighted_choice(&items, &[1.0], &mut rng).is_none());
        assert!(weighted_choice(&items, &[0.0, 0.0], &mut rng).is_none());
        let empty: [i32; 0] = [];
        assert!(weighted_choice(&empty, &[], &mut rng).is_none());
    }
}
