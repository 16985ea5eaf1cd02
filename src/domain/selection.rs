// Selected point in time shared by the chart and the record list
use super::record::NormalizedRecord;

/// Holds at most one selected timestamp. Never cleared implicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCoordinator {
    selected: Option<i64>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, time_ms: i64) {
        self.selected = Some(time_ms);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Records whose time equals `time_ms` exactly, in input order.
    pub fn resolve<'a>(records: &'a [NormalizedRecord], time_ms: i64) -> Vec<&'a NormalizedRecord> {
        records
            .iter()
            .filter(|r| r.time_ms == Some(time_ms))
            .collect()
    }

    /// Index of the record to scroll to and highlight. Ties go to the
    /// first occurrence in input order.
    pub fn highlight_index(records: &[NormalizedRecord], time_ms: i64) -> Option<usize> {
        records.iter().position(|r| r.time_ms == Some(time_ms))
    }
}
