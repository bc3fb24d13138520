use std::collections::BTreeSet;

/// Selected answer indices, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    indices: Vec<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `index`. A selected index is removed; an unselected one is
    /// added, and in single mode the set is cleared first so at most one
    /// index remains. Returns whether `index` is selected afterwards.
    pub fn toggle(&mut self, index: usize, single: bool) -> bool {
        if let Some(position) = self.indices.iter().position(|i| *i == index) {
            self.indices.remove(position);
            return false;
        }
        if single {
            self.indices.clear();
        }
        self.indices.push(index);
        true
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The selection ignoring order.
    pub fn as_set(&self) -> BTreeSet<usize> {
        self.indices.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }
}
