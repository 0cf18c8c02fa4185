use rand::{seq::SliceRandom, Rng};

/// Shuffle the cards and deal them out into hands of the requested sizes.
/// Used both for the initial deal and when determining the cards the other
/// players could hold given what has been played so far.
pub fn shuffle_and_deal<T: Copy>(
    cards: &[T],
    hand_sizes: &[usize],
    rng: &mut impl Rng,
) -> Vec<Vec<T>> {
    assert!(
        hand_sizes.iter().sum::<usize>() == cards.len(),
        "hand sizes {:?} do not add up to {} cards",
        hand_sizes,
        cards.len()
    );
    let mut deck: Vec<T> = cards.to_vec();
    deck.shuffle(rng);

    let mut hands = Vec::with_capacity(hand_sizes.len());
    for &size in hand_sizes {
        // take from the back so the remaining deck does not have to move
        let hand = deck.split_off(deck.len() - size);
        hands.push(hand);
    }

    // All the cards were dealt
    assert!(deck.is_empty());
    hands
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_shuffle_and_deal_partitions_cards() {
        let cards: Vec<i32> = (0..27).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let hands = shuffle_and_deal(&cards, &[9, 8, 10], &mut rng);
        assert_eq!(
            hands.iter().map(|h| h.len()).collect::<Vec<_>>(),
            vec![9, 8, 10]
        );
        let seen: HashSet<i32> = hands.iter().flatten().copied().collect();
        assert_eq!(seen.len(), 27);
    }

    #[test]
    fn test_shuffle_and_deal_is_reproducible() {
        let cards: Vec<i32> = (0..36).collect();
        let a = shuffle_and_deal(&cards, &[9, 9, 9, 9], &mut StdRng::seed_from_u64(7));
        let b = shuffle_and_deal(&cards, &[9, 9, 9, 9], &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "do not add up")]
    fn test_shuffle_and_deal_rejects_wrong_sizes() {
        let cards: Vec<i32> = (0..10).collect();
        shuffle_and_deal(&cards, &[9], &mut StdRng::seed_from_u64(1));
    }
}
