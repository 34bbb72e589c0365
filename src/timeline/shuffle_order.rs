//! Shuffled playback order of a playlist
//!
//! A [`ShuffleOrder`] is a permutation of `0..len` plus its inverse, so the
//! neighbours of any index in playback order are found in constant time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::utils::error::{check_argument, Result};

/// A permutation of playlist indices and the random source used to extend it.
#[derive(Debug, Clone)]
pub struct ShuffleOrder {
    shuffled: Vec<usize>,
    index_in_shuffled: Vec<usize>,
    /// Keeps the identity order through inserts and removals.
    unshuffled: bool,
    random: StdRng,
}

impl ShuffleOrder {
    /// Creates a random order of `length` indices.
    pub fn new(length: usize, seed: u64) -> Self {
        let mut random = StdRng::seed_from_u64(seed);
        let shuffled = create_shuffled_list(length, &mut random);
        Self::from_parts(shuffled, false, random)
    }

    /// Creates an order that always equals playlist order.
    pub fn unshuffled(length: usize) -> Self {
        Self::from_parts((0..length).collect(), true, StdRng::seed_from_u64(0))
    }

    /// Creates an order from an explicit permutation of `0..shuffled.len()`.
    pub fn from_indices(shuffled: Vec<usize>, seed: u64) -> Result<Self> {
        let mut seen = vec![false; shuffled.len()];
        for &index in &shuffled {
            check_argument(index < shuffled.len() && !seen[index], || {
                format!("{:?} is not a permutation", shuffled)
            })?;
            seen[index] = true;
        }
        Ok(Self::from_parts(shuffled, false, StdRng::seed_from_u64(seed)))
    }

    fn from_parts(shuffled: Vec<usize>, unshuffled: bool, random: StdRng) -> Self {
        let mut index_in_shuffled = vec![0; shuffled.len()];
        for (position, &index) in shuffled.iter().enumerate() {
            index_in_shuffled[index] = position;
        }
        Self {
            shuffled,
            index_in_shuffled,
            unshuffled,
            random,
        }
    }

    pub fn len(&self) -> usize {
        self.shuffled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shuffled.is_empty()
    }

    /// The playlist indices in playback order.
    pub fn shuffled_indices(&self) -> &[usize] {
        &self.shuffled
    }

    /// Index played after `index`, or `None` if it is last.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let position = self.index_in_shuffled[index] + 1;
        self.shuffled.get(position).copied()
    }

    /// Index played before `index`, or `None` if it is first.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        let position = self.index_in_shuffled[index].checked_sub(1)?;
        Some(self.shuffled[position])
    }

    pub fn first_index(&self) -> Option<usize> {
        self.shuffled.first().copied()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.shuffled.last().copied()
    }

    /// Returns a copy with `insertion_count` new indices starting at
    /// `insertion_index`, placed at random positions.
    pub fn clone_and_insert(&self, insertion_index: usize, insertion_count: usize) -> Self {
        if self.unshuffled {
            return Self::unshuffled(self.len() + insertion_count);
        }
        let mut random = self.random.clone();
        let mut insertion_points = Vec::with_capacity(insertion_count);
        let mut insertion_values = vec![0; insertion_count];
        for i in 0..insertion_count {
            insertion_points.push(random.gen_range(0..=self.shuffled.len()));
            let swap_index = random.gen_range(0..=i);
            insertion_values[i] = insertion_values[swap_index];
            insertion_values[swap_index] = i + insertion_index;
        }
        insertion_points.sort_unstable();

        let mut new_shuffled = Vec::with_capacity(self.shuffled.len() + insertion_count);
        let mut old_position = 0;
        let mut insertion_position = 0;
        for _ in 0..self.shuffled.len() + insertion_count {
            if insertion_position < insertion_count && old_position == insertion_points[insertion_position] {
                new_shuffled.push(insertion_values[insertion_position]);
                insertion_position += 1;
            } else {
                let index = self.shuffled[old_position];
                old_position += 1;
                new_shuffled.push(if index >= insertion_index {
                    index + insertion_count
                } else {
                    index
                });
            }
        }
        let next_seed = random.gen::<u64>();
        Self::from_parts(new_shuffled, false, StdRng::seed_from_u64(next_seed))
    }

    /// Returns a copy without the indices in `from..to`; later indices shift down.
    pub fn clone_and_remove(&self, from: usize, to: usize) -> Self {
        let removed = to.saturating_sub(from);
        if self.unshuffled {
            return Self::unshuffled(self.len() - removed);
        }
        let new_shuffled = self
            .shuffled
            .iter()
            .filter(|&&index| index < from || index >= to)
            .map(|&index| if index >= to { index - removed } else { index })
            .collect();
        Self::from_parts(new_shuffled, false, self.random.clone())
    }

    pub fn clone_and_clear(&self) -> Self {
        if self.unshuffled {
            return Self::unshuffled(0);
        }
        Self::from_parts(Vec::new(), false, self.random.clone())
    }
}

impl PartialEq for ShuffleOrder {
    fn eq(&self, other: &Self) -> bool {
        self.shuffled == other.shuffled
    }
}

fn create_shuffled_list(length: usize, random: &mut StdRng) -> Vec<usize> {
    let mut shuffled = vec![0; length];
    for i in 0..length {
        let swap_index = random.gen_range(0..=i);
        shuffled[i] = shuffled[swap_index];
        shuffled[swap_index] = i;
    }
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_permutation(order: &ShuffleOrder) {
        let mut sorted = order.shuffled_indices().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..order.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_order_is_permutation() {
        let order = ShuffleOrder::new(20, 42);
        assert_permutation(&order);
        assert_eq!(ShuffleOrder::new(20, 42), order);
    }

    #[test]
    fn test_navigation_follows_order() {
        let order = ShuffleOrder::from_indices(vec![2, 0, 1], 0).unwrap();
        assert_eq!(order.first_index(), Some(2));
        assert_eq!(order.next_index(2), Some(0));
        assert_eq!(order.next_index(0), Some(1));
        assert_eq!(order.next_index(1), None);
        assert_eq!(order.previous_index(2), None);
        assert_eq!(order.previous_index(1), Some(0));
        assert_eq!(order.last_index(), Some(1));
    }

    #[test]
    fn test_from_indices_rejects_non_permutation() {
        assert!(ShuffleOrder::from_indices(vec![0, 0], 0).is_err());
        assert!(ShuffleOrder::from_indices(vec![0, 2], 0).is_err());
    }

    #[test]
    fn test_insert_and_remove() {
        let order = ShuffleOrder::from_indices(vec![2, 0, 1], 7).unwrap();
        let inserted = order.clone_and_insert(1, 2);
        assert_eq!(inserted.len(), 5);
        assert_permutation(&inserted);
        // Old relative order survives, with shifted indices.
        let survivors: Vec<_> = inserted
            .shuffled_indices()
            .iter()
            .copied()
            .filter(|index| *index != 1 && *index != 2)
            .collect();
        assert_eq!(survivors, vec![4, 0, 3]);

        let removed = order.clone_and_remove(0, 1);
        assert_eq!(removed.shuffled_indices(), &[1, 0]);
        assert!(order.clone_and_clear().is_empty());
    }

    #[test]
    fn test_unshuffled_stays_identity() {
        let order = ShuffleOrder::unshuffled(3).clone_and_insert(1, 2).clone_and_remove(0, 2);
        assert_eq!(order.shuffled_indices(), &[0, 1, 2]);
    }
}
