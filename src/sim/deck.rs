//! Deck dealing
//!
//! Duplicates each chosen image once and shuffles the result with an
//! in-place Fisher-Yates pass driven by the session RNG.

use std::collections::HashSet;

use rand::Rng;

use super::state::Card;
use crate::error::ConfigError;

/// The observed image pool: `/images/0.jpg` .. `/images/{n-1}.jpg`
pub fn image_pool(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("/images/{i}.jpg")).collect()
}

/// Build a shuffled deck of `2 * pair_count` face-down cards.
///
/// Takes the first `pair_count` distinct tokens from `pool` (duplicates in the
/// pool are skipped). Each card's `id` is its final grid position.
pub fn build_deck<R: Rng>(
    pair_count: usize,
    pool: &[String],
    rng: &mut R,
) -> Result<Vec<Card>, ConfigError> {
    if pair_count == 0 {
        return Err(ConfigError::ZeroPairs);
    }

    let mut seen = HashSet::with_capacity(pair_count);
    let chosen: Vec<&String> = pool
        .iter()
        .filter(|img| seen.insert(img.as_str()))
        .take(pair_count)
        .collect();
    if chosen.len() < pair_count {
        return Err(ConfigError::PoolTooSmall {
            pair_count,
            available: chosen.len(),
        });
    }

    let mut images: Vec<&String> = chosen.iter().flat_map(|img| [*img, *img]).collect();

    for i in (1..images.len()).rev() {
        let j = rng.random_range(0..=i);
        images.swap(i, j);
    }

    Ok(images
        .into_iter()
        .enumerate()
        .map(|(id, image)| Card::new(id, image.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashMap;

    fn counts(deck: &[Card]) -> HashMap<&str, usize> {
        let mut map = HashMap::new();
        for card in deck {
            *map.entry(card.image.as_str()).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_full_pool_deck() {
        let mut rng = Pcg32::seed_from_u64(7);
        let deck = build_deck(12, &image_pool(12), &mut rng).unwrap();
        assert_eq!(deck.len(), 24);
        let counts = counts(&deck);
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&n| n == 2));
        for (pos, card) in deck.iter().enumerate() {
            assert_eq!(card.id, pos);
            assert!(!card.is_flipped);
            assert!(!card.is_matched);
        }
    }

    #[test]
    fn test_pool_too_small() {
        let mut rng = Pcg32::seed_from_u64(1);
        let err = build_deck(12, &image_pool(11), &mut rng).unwrap_err();
        assert_eq!(
            err,
            ConfigError::PoolTooSmall {
                pair_count: 12,
                available: 11
            }
        );
    }

    #[test]
    fn test_duplicate_pool_entries_do_not_count() {
        let mut rng = Pcg32::seed_from_u64(1);
        let pool = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        assert!(build_deck(3, &pool, &mut rng).is_err());
        let deck = build_deck(2, &pool, &mut rng).unwrap();
        assert_eq!(counts(&deck).len(), 2);
    }

    #[test]
    fn test_zero_pairs() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(
            build_deck(0, &image_pool(4), &mut rng),
            Err(ConfigError::ZeroPairs)
        );
    }

    #[test]
    fn test_same_seed_same_deck() {
        let a = build_deck(12, &image_pool(12), &mut Pcg32::seed_from_u64(42)).unwrap();
        let b = build_deck(12, &image_pool(12), &mut Pcg32::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_deck_is_paired_permutation(seed in any::<u64>(), pairs in 1usize..20, extra in 0usize..5) {
            let pool = image_pool(pairs + extra);
            let deck = build_deck(pairs, &pool, &mut Pcg32::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(deck.len(), pairs * 2);

            let counts = counts(&deck);
            prop_assert_eq!(counts.len(), pairs);
            prop_assert!(counts.values().all(|&n| n == 2));

            // Same multiset as the unshuffled pairs
            let mut shuffled: Vec<&str> = deck.iter().map(|c| c.image.as_str()).collect();
            let mut expected: Vec<&str> = pool[..pairs].iter().flat_map(|s| [s.as_str(), s.as_str()]).collect();
            shuffled.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(shuffled, expected);
        }
    }
}
