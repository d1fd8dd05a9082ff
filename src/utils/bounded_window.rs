use alloc::{boxed::Box, vec::Vec};

use crate::{Result, TrendError};

/// Smallest capacity a [`BoundedWindow`] accepts
pub const MIN_WINDOW_CAPACITY: usize = 2;

/// A fixed-capacity FIFO window of the most recent samples.
///
/// Samples fill the slots in order until the window is full. From then on
/// each push overwrites the oldest slot and moves `oldest` one slot forward,
/// so eviction is O(1). Iteration yields samples oldest first, and the 1-based
/// position of a sample is its place in that order.
#[derive(Debug, Clone)]
pub struct BoundedWindow<T> {
    /// One slot per sample of capacity
    slots: Box<[T]>,
    /// Slot of the oldest sample; stays 0 until the window first fills
    oldest: usize,
    /// Number of samples held, never above `slots.len()`
    len: usize,
}

impl<T: Default + Copy> BoundedWindow<T> {
    /// Creates an empty window
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of samples held, at least 2
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The window, or `InvalidCapacity` if `capacity` is below 2
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_WINDOW_CAPACITY {
            return Err(TrendError::InvalidCapacity {
                got: capacity,
                min: MIN_WINDOW_CAPACITY,
            });
        }
        Ok(Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            oldest: 0,
            len: 0,
        })
    }

    /// Returns the maximum number of samples held
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of samples held
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no sample has been pushed since construction or reset
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once the next push will evict
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Appends a sample, evicting the oldest one when the window is full
    ///
    /// # Arguments
    ///
    /// * `value` - The sample to append
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The evicted sample, if the window was full
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::BoundedWindow;
    ///
    /// let mut window = BoundedWindow::new(3)?;
    /// let evicted: Vec<_> = (1..=5).filter_map(|v| window.push(v as f64)).collect();
    ///
    /// assert_eq!(evicted, vec![1.0, 2.0]);
    /// assert_eq!(window.to_vec(), vec![3.0, 4.0, 5.0]);
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    pub fn push(&mut self, value: T) -> Option<T> {
        if !self.is_full() {
            self.slots[self.len] = value;
            self.len += 1;
            return None;
        }

        let slot = self.oldest;
        self.oldest = if slot + 1 == self.capacity() { 0 } else { slot + 1 };
        Some(core::mem::replace(&mut self.slots[slot], value))
    }

    /// Empties the window, keeping its capacity
    pub fn reset(&mut self) {
        self.oldest = 0;
        self.len = 0;
    }

    /// Iterates the samples oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.slots.split_at(self.oldest);
        older.iter().chain(newer).take(self.len)
    }

    /// Copies the samples out in insertion order
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}
