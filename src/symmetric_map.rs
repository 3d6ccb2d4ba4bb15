use fnv::FnvHashMap;

/// A map keyed by unordered pairs of indices, so `(i, j)` and `(j, i)` name the same entry.
#[derive(Clone, Debug, Default)]
pub struct SymmetricMap<T> {
    map: FnvHashMap<(usize, usize), T>,
}

impl<T> SymmetricMap<T> {
    pub fn new() -> Self {
        SymmetricMap {
            map: FnvHashMap::default(),
        }
    }

    pub fn order_indices(i1: usize, i2: usize) -> (usize, usize) {
        if i1 > i2 {
            (i2, i1)
        } else {
            (i1, i2)
        }
    }

    pub fn get(&self, i1: usize, i2: usize) -> Option<&T> {
        self.map.get(&Self::order_indices(i1, i2))
    }

    pub fn contains(&self, i1: usize, i2: usize) -> bool {
        self.map.contains_key(&Self::order_indices(i1, i2))
    }

    /// Returns the previous value, if any.
    pub fn insert(&mut self, i1: usize, i2: usize, value: T) -> Option<T> {
        self.map.insert(Self::order_indices(i1, i2), value)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
