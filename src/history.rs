use std::collections::VecDeque;
use std::fmt;

/// Bounded command history. Once full, each push evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// One `N: line` row per entry, numbered from 1.
impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.iter().enumerate() {
            writeln!(f, "{}: {}", i + 1, line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut h = History::new(3);
        h.push("a");
        h.push("b");
        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut h = History::new(2);
        h.push("a");
        h.push("b");
        h.push("c");
        assert_eq!(h.len(), 2);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut h = History::new(0);
        h.push("a");
        assert!(h.is_empty());
    }

    #[test]
    fn display_numbers_from_one() {
        let mut h = History::new(5);
        h.push("ls");
        h.push("echo hi | cat");
        assert_eq!(h.to_string(), "1: ls\n2: echo hi | cat\n");
    }
}
