use pvx_model::LogEntry;

/// Highest log sequence already emitted for one job.
///
/// The cluster may return overlapping or unordered pages; `accept` keeps only
/// entries strictly above the cursor, sorted and deduplicated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LogCursor(u64);

impl LogCursor {
    pub(crate) fn position(&self) -> u64 {
        self.0
    }

    /// Filter a page down to unseen entries and advance past them.
    pub(crate) fn accept(&mut self, mut page: Vec<LogEntry>) -> Vec<LogEntry> {
        page.retain(|e| e.sequence > self.0);
        page.sort_by_key(|e| e.sequence);
        page.dedup_by_key(|e| e.sequence);

        if let Some(last) = page.last() {
            self.0 = last.sequence;
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(seqs: &[u64]) -> Vec<LogEntry> {
        seqs.iter().map(|n| LogEntry::new(*n, format!("line {n}"))).collect()
    }

    #[test]
    fn starts_at_zero() {
        assert_eq!(LogCursor::default().position(), 0);
    }

    #[test]
    fn drops_seen_entries_and_advances() {
        let mut cursor = LogCursor::default();
        let first = cursor.accept(page(&[1, 2, 3]));
        assert_eq!(first.len(), 3);
        assert_eq!(cursor.position(), 3);

        let second = cursor.accept(page(&[2, 3, 4, 5]));
        let seqs: Vec<u64> = second.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![4, 5]);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn sorts_and_dedups_unordered_page() {
        let mut cursor = LogCursor::default();
        let out = cursor.accept(page(&[7, 5, 6, 5]));
        let seqs: Vec<u64> = out.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![5, 6, 7]);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn empty_page_keeps_position() {
        let mut cursor = LogCursor::default();
        cursor.accept(page(&[1, 2]));
        assert!(cursor.accept(Vec::new()).is_empty());
        assert_eq!(cursor.position(), 2);
    }
}
