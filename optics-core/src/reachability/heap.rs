//! Indexed binary min-heap keyed by reachability distance.

use std::cmp::Ordering;

/// A point awaiting finalisation together with its best known reachability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Entry {
    pub(crate) reachability: f64,
    pub(crate) point: usize,
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.reachability
            .total_cmp(&other.reachability)
            .then_with(|| self.point.cmp(&other.point))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary min-heap over point indices in `[0, capacity)` with O(log n)
/// decrease-key.
///
/// `positions[p]` holds the slot of point `p` in `entries` while it is
/// queued.
#[derive(Debug)]
pub(crate) struct IndexedMinHeap {
    entries: Vec<Entry>,
    positions: Vec<Option<usize>>,
}

impl IndexedMinHeap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            positions: vec![None; capacity],
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts `point`, or lowers its key when it is already queued with a
    /// larger reachability. Larger keys for queued points are ignored.
    pub(crate) fn push_or_decrease(&mut self, point: usize, reachability: f64) {
        let entry = Entry {
            reachability,
            point,
        };
        match self.positions.get(point).copied().flatten() {
            Some(slot) => {
                if let Some(current) = self.entries.get_mut(slot) {
                    if entry < *current {
                        *current = entry;
                        self.sift_up(slot);
                    }
                }
            }
            None => {
                let slot = self.entries.len();
                self.entries.push(entry);
                if let Some(position) = self.positions.get_mut(point) {
                    *position = Some(slot);
                }
                self.sift_up(slot);
            }
        }
    }

    /// Removes and returns the entry with the smallest `(reachability, point)`.
    pub(crate) fn pop(&mut self) -> Option<Entry> {
        let last = self.entries.len().checked_sub(1)?;
        self.swap(0, last);
        let entry = self.entries.pop()?;
        if let Some(position) = self.positions.get_mut(entry.point) {
            *position = None;
        }
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(entry)
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.entries.get(slot) >= self.entries.get(parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < self.entries.len() && self.entries.get(left) < self.entries.get(smallest) {
                smallest = left;
            }
            if right < self.entries.len() && self.entries.get(right) < self.entries.get(smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        for slot in [a, b] {
            if let Some(point) = self.entries.get(slot).map(|entry| entry.point) {
                if let Some(position) = self.positions.get_mut(point) {
                    *position = Some(slot);
                }
            }
        }
    }
}
