//! Sorted, non-overlapping sets of inclusive integer ranges
//!
//! Used for transition labels (token types or code points) and for the
//! results of lookahead analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range `start..=stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: i32,
    pub stop: i32,
}

impl Interval {
    pub fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.start <= value && value <= self.stop
    }

    pub fn len(&self) -> usize {
        if self.stop < self.start {
            0
        } else {
            (self.stop as i64 - self.start as i64 + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(value: i32) -> Self {
        Self::of_range(value, value)
    }

    pub fn of_range(start: i32, stop: i32) -> Self {
        let mut set = Self::new();
        set.add_range(start, stop);
        set
    }

    pub fn from_ranges<I: IntoIterator<Item = (i32, i32)>>(ranges: I) -> Self {
        let mut set = Self::new();
        for (start, stop) in ranges {
            set.add_range(start, stop);
        }
        set
    }

    pub fn add(&mut self, value: i32) {
        self.add_range(value, value);
    }

    /// Insert `start..=stop`, coalescing with adjacent or overlapping ranges
    pub fn add_range(&mut self, start: i32, stop: i32) {
        if stop < start {
            return;
        }
        let mut merged = Interval::new(start, stop);
        let mut result = Vec::with_capacity(self.intervals.len() + 1);
        let mut inserted = false;

        for &existing in &self.intervals {
            if (existing.stop as i64) + 1 < merged.start as i64 {
                result.push(existing);
            } else if (merged.stop as i64) + 1 < existing.start as i64 {
                if !inserted {
                    result.push(merged);
                    inserted = true;
                }
                result.push(existing);
            } else {
                merged.start = merged.start.min(existing.start);
                merged.stop = merged.stop.max(existing.stop);
            }
        }
        if !inserted {
            result.push(merged);
        }
        self.intervals = result;
    }

    pub fn add_set(&mut self, other: &IntervalSet) {
        for interval in &other.intervals {
            self.add_range(interval.start, interval.stop);
        }
    }

    pub fn remove(&mut self, value: i32) {
        let mut result = Vec::with_capacity(self.intervals.len() + 1);
        for &interval in &self.intervals {
            if !interval.contains(value) {
                result.push(interval);
                continue;
            }
            if interval.start < value {
                result.push(Interval::new(interval.start, value - 1));
            }
            if value < interval.stop {
                result.push(Interval::new(value + 1, interval.stop));
            }
        }
        self.intervals = result;
    }

    pub fn contains(&self, value: i32) -> bool {
        self.intervals
            .binary_search_by(|interval| {
                if interval.stop < value {
                    std::cmp::Ordering::Less
                } else if interval.start > value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of values in the set
    pub fn len(&self) -> usize {
        self.intervals.iter().map(Interval::len).sum()
    }

    pub fn min_element(&self) -> Option<i32> {
        self.intervals.first().map(|i| i.start)
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Values of `min..=max` not in this set
    pub fn complement(&self, min: i32, max: i32) -> IntervalSet {
        let mut result = IntervalSet::new();
        let mut next = min as i64;
        for interval in &self.intervals {
            if interval.stop < min {
                continue;
            }
            if interval.start > max {
                break;
            }
            if (interval.start as i64) > next {
                result.add_range(next as i32, interval.start - 1);
            }
            next = next.max(interval.stop as i64 + 1);
        }
        if next <= max as i64 {
            result.add_range(next as i32, max);
        }
        result
    }

    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals.iter().flat_map(|i| i.start..=i.stop)
    }

    /// Render with a caller-supplied symbol namer, e.g. `{'a', 'c'..'f'}`
    pub fn to_string_with<F: Fn(i32) -> String>(&self, name: F) -> String {
        if self.is_empty() {
            return "{}".to_string();
        }
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|i| {
                if i.start == i.stop {
                    name(i.start)
                } else {
                    format!("{}..{}", name(i.start), name(i.stop))
                }
            })
            .collect();
        if parts.len() == 1 && self.len() == 1 {
            parts[0].clone()
        } else {
            format!("{{{}}}", parts.join(", "))
        }
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with(|v| v.to_string()))
    }
}
