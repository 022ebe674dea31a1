use std::collections::HashMap;
use std::hash::Hash;

#[cfg(feature = "rand")]
use rand::Rng;

/// A finite population supporting constant-time
/// insertion, removal, and uniform sampling.
///
/// Members are stored contiguously. Removal swaps the
/// last member into the vacated slot, so iteration order
/// is not insertion order.
///
/// # Examples
///
/// ```
/// use asgsim_core::ActiveSet;
/// let mut active = ActiveSet::from_iter([1, 2, 3]);
/// assert!(active.remove(&2));
/// assert!(!active.remove(&2));
/// assert_eq!(active.len(), 2);
/// assert!(active.contains(&3));
/// ```
#[derive(Clone, Debug)]
pub struct ActiveSet<T> {
    members: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T> Default for ActiveSet<T> {
    fn default() -> Self {
        Self {
            members: vec![],
            positions: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> ActiveSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.members.iter()
    }

    /// Add `item`.
    ///
    /// Returns `false` if `item` was already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.positions.contains_key(&item) {
            return false;
        }
        self.positions.insert(item, self.members.len());
        self.members.push(item);
        true
    }

    /// Remove `item`.
    ///
    /// Returns `false` if `item` was not present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.positions.remove(item) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, index: usize) -> T {
        let removed = self.members.swap_remove(index);
        if let Some(moved) = self.members.get(index) {
            self.positions.insert(*moved, index);
        }
        removed
    }
}

#[cfg(feature = "rand")]
impl<T: Copy + Eq + Hash> ActiveSet<T> {
    /// Choose a member uniformly at random.
    ///
    /// Returns `None` if the set is empty.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        if self.members.is_empty() {
            None
        } else {
            Some(self.members[rng.random_range(0..self.members.len())])
        }
    }

    /// Remove and return a member chosen uniformly at random.
    ///
    /// Repeated calls sample without replacement.
    pub fn remove_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.members.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.members.len());
        let removed = self.remove_at(index);
        self.positions.remove(&removed);
        Some(removed)
    }

    /// Remove `amount` members sampled uniformly without replacement.
    ///
    /// Returns `None`, leaving the set untouched,
    /// if fewer than `amount` members are present.
    pub fn remove_sample<R: Rng + ?Sized>(&mut self, amount: usize, rng: &mut R) -> Option<Vec<T>> {
        if amount > self.members.len() {
            return None;
        }
        let mut sampled = Vec::with_capacity(amount);
        for _ in 0..amount {
            sampled.push(self.remove_random(rng)?);
        }
        Some(sampled)
    }
}

impl<T: Copy + Eq + Hash> FromIterator<T> for ActiveSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_swap_remove() {
        let mut active = ActiveSet::from_iter(0..5);
        assert!(active.remove(&1));
        // 4 now lives where 1 was
        assert_eq!(active.as_slice(), &[0, 4, 2, 3]);
        assert!(active.remove(&4));
        assert_eq!(active.as_slice(), &[0, 3, 2]);
        for i in [0, 2, 3] {
            assert!(active.contains(&i));
        }
        assert!(!active.contains(&4));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut active = ActiveSet::new();
        assert!(active.insert(1));
        assert!(!active.insert(1));
        assert_eq!(active.len(), 1);
    }

    #[cfg(feature = "rand")]
    #[test]
    fn test_remove_sample_too_many() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let mut active = ActiveSet::from_iter(0..2);
        assert!(active.remove_sample(3, &mut rng).is_none());
        assert_eq!(active.len(), 2);
        let pair = active.remove_sample(2, &mut rng).unwrap();
        assert_eq!(pair.len(), 2);
        assert_ne!(pair[0], pair[1]);
        assert!(active.is_empty());
        assert!(active.choose(&mut rng).is_none());
    }
}
