use crate::models::{TransactionRecord, TransactionType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub count: usize,
    pub volume: f64,
    pub gci: f64,
    pub brokerage_fees: f64,
    pub nci: f64,
}

impl Totals {
    fn add(&mut self, record: &TransactionRecord) {
        self.count += 1;
        self.volume += record.net_volume.number();
        self.gci += record.gci.number();
        self.brokerage_fees += record.total_brokerage_fees.number();
        self.nci += record.nci.number();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub overall: Totals,
    /// Keyed by brokerage label, in first-seen order.
    pub by_brokerage: Vec<(String, Totals)>,
    pub by_type: Vec<(TransactionType, Totals)>,
}

/// Totals from the stored derived values, which is what the user saw and saved.
pub fn summarize(records: &[TransactionRecord]) -> Summary {
    let mut summary = Summary::default();
    for record in records {
        summary.overall.add(record);

        let label = match record.brokerage.label() {
            "" => "(none)".to_string(),
            other => other.to_string(),
        };
        match summary.by_brokerage.iter_mut().find(|(b, _)| *b == label) {
            Some((_, totals)) => totals.add(record),
            None => {
                let mut totals = Totals::default();
                totals.add(record);
                summary.by_brokerage.push((label, totals));
            }
        }
    }

    for kind in TransactionType::ALL {
        let mut totals = Totals::default();
        for record in records.iter().filter(|r| r.transaction_type == *kind) {
            totals.add(record);
        }
        if totals.count > 0 {
            summary.by_type.push((*kind, totals));
        }
    }
    summary
}
