/// Default number of events retained by the log.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Fixed-capacity ring store.
///
/// Slots are addressed through `head` (oldest logical element) and `size`;
/// the next write goes to `(head + size) % capacity`. Appending to a full
/// buffer overwrites the oldest slot and advances `head`. The backing storage
/// is allocated once and never resized.
#[derive(Debug)]
pub struct EventBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    size: usize,
}

impl<T> EventBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            size: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    fn slot_index(&self, logical: usize) -> usize {
        (self.head + logical) % self.capacity()
    }

    /// Append an element, evicting the oldest one when full.
    ///
    /// Returns the element that no longer fits: the evicted oldest element,
    /// or `item` itself when the capacity is zero.
    pub fn append(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Some(item);
        }

        if self.size == capacity {
            let evicted = self.slots[self.head].replace(item);
            self.head = (self.head + 1) % capacity;
            evicted
        } else {
            let index = self.slot_index(self.size);
            self.slots[index] = Some(item);
            self.size += 1;
            None
        }
    }

    /// Iterate oldest to newest. Each call starts a fresh walk.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buffer: self,
            next: 0,
        }
    }

    /// Remove every element matching `remove`, keeping the relative order of
    /// the rest. Returns the removed elements oldest first.
    ///
    /// Single forward pass: the write cursor never passes the read cursor, and
    /// every slot is taken as it is read, so trailing slots end up empty.
    pub fn compact<F>(&mut self, mut remove: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = Vec::new();
        let mut write = 0;

        for read in 0..self.size {
            let read_index = self.slot_index(read);
            let Some(item) = self.slots[read_index].take() else {
                continue;
            };

            if remove(&item) {
                removed.push(item);
            } else {
                let write_index = self.slot_index(write);
                self.slots[write_index] = Some(item);
                write += 1;
            }
        }

        self.size = write;
        removed
    }

    /// Drop all elements without resizing the backing storage.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.size = 0;
    }
}

pub struct Iter<'a, T> {
    buffer: &'a EventBuffer<T>,
    next: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.buffer.size {
            let index = self.buffer.slot_index(self.next);
            self.next += 1;
            if let Some(item) = self.buffer.slots[index].as_ref() {
                return Some(item);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.size - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a EventBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
