//! Bounded rolling history of readings.
//!
//! The window holds the most recent readings (60 by default, i.e. five
//! minutes at one reading every five seconds) and feeds the periodic
//! average report.

use crate::core::record::Record;
use crate::sensor::{Reading, SensorField};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Default number of readings kept in the window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 60;

/// FIFO buffer of the most recent readings.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    capacity: usize,
    readings: VecDeque<Reading>,
}

impl HistoryWindow {
    /// Create a window with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    /// Create a window holding at most `capacity` readings.
    ///
    /// A capacity of zero is raised to one so the latest reading is always
    /// available for averaging.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a reading, evicting the oldest one when the window is full.
    ///
    /// Returns the evicted reading, if any.
    pub fn append(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = if self.readings.len() >= self.capacity {
            self.readings.pop_front()
        } else {
            None
        };
        self.readings.push_back(reading);
        evicted
    }

    /// Per-field mean over the current contents.
    ///
    /// Computed from scratch on every call. An empty window yields an empty
    /// record.
    pub fn average(&self) -> Record {
        let mut record = Record::new();
        if self.readings.is_empty() {
            return record;
        }

        for field in SensorField::ALL {
            let mean = self.readings.iter().map(|r| r.get(field)).mean();
            record.insert(field.key(), mean);
        }
        record
    }

    /// Number of readings held.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True before the first append.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// True once the next append will evict.
    pub fn is_full(&self) -> bool {
        self.readings.len() == self.capacity
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest reading still in the window.
    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.front()
    }

    /// Most recently appended reading.
    pub fn newest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> + '_ {
        self.readings.iter()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMP: SensorField = SensorField::InternalTemperature;

    fn avg(window: &HistoryWindow, field: SensorField) -> f64 {
        window
            .average()
            .get(field.key())
            .and_then(|v| v.as_f64())
            .unwrap()
    }

    #[test]
    fn test_empty_average() {
        let window = HistoryWindow::new();
        assert!(window.average().is_empty());
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        for capacity in [1, 2, 5, 60] {
            let mut window = HistoryWindow::with_capacity(capacity);
            for n in 1..=(capacity * 3) {
                window.append(Reading::uniform(n as f64));
                assert_eq!(window.len(), n.min(capacity));
            }
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut window = HistoryWindow::with_capacity(3);
        for n in 1..=5 {
            window.append(Reading::uniform(n as f64));
        }

        let values: Vec<f64> = window.iter().map(|r| r.get(TEMP)).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
        assert_eq!(window.oldest().map(|r| r.get(TEMP)), Some(3.0));
        assert_eq!(window.newest().map(|r| r.get(TEMP)), Some(5.0));
    }

    #[test]
    fn test_append_returns_evicted() {
        let mut window = HistoryWindow::with_capacity(2);
        assert!(window.append(Reading::uniform(1.0)).is_none());
        assert!(window.append(Reading::uniform(2.0)).is_none());

        let evicted = window.append(Reading::uniform(3.0));
        assert_eq!(evicted.map(|r| r.get(TEMP)), Some(1.0));
    }

    #[test]
    fn test_average_of_partial_window() {
        let mut window = HistoryWindow::with_capacity(10);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.append(Reading::uniform(v));
        }

        assert!((avg(&window, TEMP) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_average_after_eviction() {
        let mut window = HistoryWindow::with_capacity(2);
        for v in [1.0, 2.0, 3.0] {
            window.append(Reading::uniform(v));
        }

        for field in SensorField::ALL {
            assert!((avg(&window, field) - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_average_shift_on_full_window() {
        let capacity = 5;
        let mut window = HistoryWindow::with_capacity(capacity);
        for v in [10.0, 20.0, 30.0, 40.0, 50.0] {
            window.append(Reading::uniform(v));
        }
        let before = avg(&window, TEMP);

        let new = 100.0;
        let evicted = window.append(Reading::uniform(new)).unwrap().get(TEMP);
        let after = avg(&window, TEMP);

        let expected_shift = (new - evicted) / capacity as f64;
        assert!((after - before - expected_shift).abs() < 1e-9);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = HistoryWindow::with_capacity(0);
        window.append(Reading::uniform(1.0));
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
    }
}
