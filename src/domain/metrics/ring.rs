//! Fixed-capacity ring buffer.
//!
//! Storage is allocated once at construction and never grows. When full, a
//! push overwrites the oldest entry.

/// FIFO ring of at most `capacity` items.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    /// Index of the oldest item once the buffer has wrapped.
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring. A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Appends an item, returning the evicted oldest item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if !self.is_full() {
            self.items.push(item);
            return None;
        }
        let evicted = std::mem::replace(&mut self.items[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.items.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Oldest retained item.
    pub fn oldest(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Newest retained item.
    pub fn newest(&self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let idx = (self.head + self.items.len() - 1) % self.items.len();
        self.items.get(idx)
    }

    /// Keeps only items matching the predicate, preserving order.
    ///
    /// Capacity is unchanged; the ring is compacted so the oldest kept item
    /// is first.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.rotate_left(self.head);
        self.head = 0;
        self.items.retain(|item| keep(item));
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copies the contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
