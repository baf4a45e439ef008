//! src/game/history.rs
//!
//! Bounded log of finished runs shown in the history panel.

use std::collections::VecDeque;

use crate::program::RunReport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRecord {
    /// 1-based run counter since startup.
    pub number: usize,
    pub level: String,
    pub report: RunReport,
    pub steps: usize,
    pub stars: Option<u8>,
}

#[derive(Debug)]
pub struct RunLog {
    /// oldest at front
    pub entries: VecDeque<RunRecord>,
    pub capacity: usize,
    total: usize,
}

impl RunLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    /// Number the next run will get.
    pub fn next_number(&self) -> usize {
        self.total + 1
    }

    /// Append a record, dropping the oldest to stay within `capacity`.
    pub fn push(&mut self, record: RunRecord) {
        self.total = self.total.max(record.number);
        self.entries.push_back(record);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&RunRecord> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: usize) -> RunRecord {
        RunRecord {
            number,
            level: "Level 1".into(),
            report: RunReport {
                success: false,
                score: None,
                error: Some("the robot did not reach the goal".into()),
            },
            steps: 0,
            stars: None,
        }
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = RunLog::new(3);
        for n in 1..=5 {
            assert_eq!(log.next_number(), n);
            log.push(record(n));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries.front().map(|r| r.number), Some(3));
        assert_eq!(log.latest().map(|r| r.number), Some(5));
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut log = RunLog::new(0);
        log.push(record(1));
        log.push(record(2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().map(|r| r.number), Some(2));
    }
}
