//! Monotonic sequence numbers for one log.

use crate::error::{LogError, LogResult};

/// Hands out 1, 2, 3, ... with no gaps and no reuse
#[derive(Debug, Default)]
pub struct Sequencer {
    last: u64,
}

impl Sequencer {
    /// Create a sequencer whose first number is 1
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Take the next sequence number
    ///
    /// # Errors
    ///
    /// Returns error once the counter is exhausted
    pub fn next_seq(&mut self) -> LogResult<u64> {
        self.last = self.last.checked_add(1).ok_or(LogError::SequenceExhausted)?;
        Ok(self.last)
    }

    /// Last number handed out (0 if none yet)
    #[must_use]
    pub const fn last(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_one() {
        let mut seq = Sequencer::new();
        assert_eq!(seq.last(), 0);
        assert_eq!(seq.next_seq().unwrap(), 1);
        assert_eq!(seq.next_seq().unwrap(), 2);
        assert_eq!(seq.last(), 2);
    }

    #[test]
    fn test_exhaustion() {
        let mut seq = Sequencer { last: u64::MAX };
        assert!(matches!(seq.next_seq(), Err(LogError::SequenceExhausted)));
    }

    proptest! {
        #[test]
        fn prop_contiguous(count in 1usize..500) {
            let mut seq = Sequencer::new();
            let taken: Vec<u64> = (0..count).map(|_| seq.next_seq().unwrap()).collect();
            let expected: Vec<u64> = (1..=count as u64).collect();
            prop_assert_eq!(taken, expected);
        }
    }
}
