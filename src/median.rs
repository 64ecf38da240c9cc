//! Streaming median tracker.
//!
//! [`MedianHeap`] keeps every pushed `(value, id)` pair in one of two heaps: a
//! max-heap holding the lower half and a min-heap holding the upper half. The
//! upper half always has `ceil(n / 2)` entries and its smallest entry is the
//! median. For even counts that is the upper of the two middle values.
//!
//! Entries are ordered by value and then by insertion sequence, so tied values
//! are split deterministically: among equal values, later pushes rank higher.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    value: OrderedFloat<f64>,
    seq: u64,
    id: usize,
}

/// Two-heap median tracker over `(value, id)` pairs.
///
/// # Examples
///
/// ```
/// use pacbandit::MedianHeap;
///
/// let mut heap = MedianHeap::new();
/// for (i, v) in [3.0, 1.0, 2.0].into_iter().enumerate() {
///     heap.push(v, i);
/// }
/// assert_eq!(heap.median(), Some((2.0, 2)));
/// assert_eq!(heap.upper_half(), vec![(2.0, 2), (3.0, 0)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MedianHeap {
    lower: BinaryHeap<Entry>,
    upper: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl MedianHeap {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tracker with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lower: BinaryHeap::with_capacity(capacity / 2 + 1),
            upper: BinaryHeap::with_capacity(capacity / 2 + 1),
            next_seq: 0,
        }
    }

    /// Inserts one entry in `O(log n)`.
    ///
    /// `value` must be finite.
    pub fn push(&mut self, value: f64, id: usize) {
        debug_assert!(value.is_finite(), "median heap values must be finite");

        let entry = Entry {
            value: OrderedFloat(value),
            seq: self.next_seq,
            id,
        };
        self.next_seq += 1;

        match self.upper.peek() {
            Some(Reverse(min)) if entry < *min => self.lower.push(entry),
            _ => self.upper.push(Reverse(entry)),
        }

        // Keep len(upper) - len(lower) in {0, 1}.
        if self.lower.len() > self.upper.len() {
            if let Some(max) = self.lower.pop() {
                self.upper.push(Reverse(max));
            }
        } else if self.upper.len() > self.lower.len() + 1 {
            if let Some(Reverse(min)) = self.upper.pop() {
                self.lower.push(min);
            }
        }
    }

    /// The current median as `(value, id)`, `None` when empty.
    pub fn median(&self) -> Option<(f64, usize)> {
        self.upper
            .peek()
            .map(|Reverse(entry)| (entry.value.into_inner(), entry.id))
    }

    /// The entries at or above the median, sorted ascending.
    ///
    /// The first element is the median. Does not modify the tracker.
    pub fn upper_half(&self) -> Vec<(f64, usize)> {
        let mut entries: Vec<Entry> = self.upper.iter().map(|Reverse(entry)| *entry).collect();
        entries.sort_unstable();
        entries
            .into_iter()
            .map(|entry| (entry.value.into_inner(), entry.id))
            .collect()
    }

    /// Ids of the entries at or above the median, in ascending value order.
    pub fn upper_ids(&self) -> Vec<usize> {
        self.upper_half().into_iter().map(|(_, id)| id).collect()
    }

    /// Total number of entries pushed
    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// True when nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }
}

impl Extend<(f64, usize)> for MedianHeap {
    fn extend<I: IntoIterator<Item = (f64, usize)>>(&mut self, iter: I) {
        for (value, id) in iter {
            self.push(value, id);
        }
    }
}

impl FromIterator<(f64, usize)> for MedianHeap {
    fn from_iter<I: IntoIterator<Item = (f64, usize)>>(iter: I) -> Self {
        let mut heap = MedianHeap::new();
        heap.extend(iter);
        heap
    }
}
