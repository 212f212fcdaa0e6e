use crate::domain::model::{Dataset, Record, SummaryCounts};
use std::fmt;

const PANEL_WIDTH: usize = 56;

impl SummaryCounts {
    /// Counts over raw (not normalized) request records.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let count = |pred: fn(&Record) -> bool| -> i64 {
            dataset.records.iter().filter(|r| pred(r)).count() as i64
        };

        let approved = count(|r| r.text("status") == Some("approved"));
        let confirmed = count(confirmed_visit);
        let scheduled = count(|r| {
            r.is_present("scheduled_date")
                && r.text("status") == Some("approved")
                && !confirmed_visit(r)
        });

        Self {
            total: dataset.len() as i64,
            pending: count(|r| r.text("status") == Some("pending")),
            approved,
            rejected: count(|r| r.text("status") == Some("rejected")),
            confirmed,
            scheduled,
            approved_not_scheduled: approved - scheduled - confirmed,
        }
    }
}

fn confirmed_visit(record: &Record) -> bool {
    record.text("visit_status") == Some("confirmed")
}

impl fmt::Display for SummaryCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return writeln!(f, "No data available");
        }

        let rule = "═".repeat(PANEL_WIDTH);
        writeln!(f, "╔{}╗", rule)?;
        writeln!(f, "║{:^width$}║", "SITE VISIT EXPORT SUMMARY", width = PANEL_WIDTH)?;
        writeln!(f, "╠{}╣", rule)?;

        let lines = [
            ("Total Records:", self.total),
            ("Pending Requests:", self.pending),
            ("Approved (not sched):", self.approved_not_scheduled),
            ("Scheduled:", self.scheduled),
            ("Completed:", self.confirmed),
            ("Rejected:", self.rejected),
        ];
        for (label, value) in lines {
            // 1 + 22 + 5 + 28 = PANEL_WIDTH
            writeln!(f, "║ {:<22}{:>5}{:<28}║", label, value, "")?;
        }

        writeln!(f, "╚{}╝", rule)
    }
}
