//! Immediate-histogram store (IH): a small increment-or-add counter
//! used by the analyzer for immediate values, branch offsets, stack
//! offsets and the like.
//!
//! Backed by a `Vec<(i64, u64)>` with linear scan rather than a
//! `HashMap`: analyzer inputs are small programs, and this mirrors the
//! teacher lineage's habit of growing small collections by ad-hoc
//! `Vec` scans instead of reaching for a map by default.

#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: Vec<(i64, u64)>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `value`, adding a new bucket if this is
    /// the first time it's seen.
    pub fn record(&mut self, value: i64) {
        if let Some(entry) = self.counts.iter_mut().find(|(v, _)| *v == value) {
            entry.1 += 1;
        } else {
            self.counts.push((value, 1));
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Buckets sorted by value, treating the stored key as signed.
    pub fn sorted_signed(&self) -> Vec<(i64, u64)> {
        let mut out = self.counts.clone();
        out.sort_by_key(|(v, _)| *v);
        out
    }

    /// Buckets sorted by value, treating the stored key as an unsigned
    /// 16-bit quantity (for immediates where the unsigned view is more
    /// natural, e.g. ANDI/ORI/LUI operands).
    pub fn sorted_unsigned(&self) -> Vec<(u16, u64)> {
        let mut out: Vec<(u16, u64)> = self.counts.iter().map(|(v, c)| (*v as u16, *c)).collect();
        out.sort_by_key(|(v, _)| *v);
        out
    }

    /// The bucket(s) with the highest count, ties broken by value.
    pub fn mode(&self) -> Option<(i64, u64)> {
        self.counts
            .iter()
            .copied()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_increments() {
        let mut h = Histogram::new();
        h.record(5);
        h.record(-3);
        h.record(5);
        assert_eq!(h.total(), 3);
        assert_eq!(h.distinct(), 2);
    }

    #[test]
    fn sorted_signed_orders_by_value() {
        let mut h = Histogram::new();
        h.record(10);
        h.record(-10);
        h.record(0);
        assert_eq!(h.sorted_signed(), vec![(-10, 1), (0, 1), (10, 1)]);
    }

    #[test]
    fn mode_picks_highest_count() {
        let mut h = Histogram::new();
        h.record(1);
        h.record(2);
        h.record(2);
        assert_eq!(h.mode(), Some((2, 2)));
    }

    #[test]
    fn empty_histogram_has_no_mode() {
        assert_eq!(Histogram::new().mode(), None);
    }
}
