use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where one rendered artifact goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSlot {
    /// `<prefix>_<YYYYMMDD_HHMMSS>.xlsx`, one per run.
    Timestamped(NaiveDateTime),
    /// `<prefix>_latest.xlsx`, overwritten by every run.
    Latest,
}

impl OutputSlot {
    pub fn file_name(&self, prefix: &str) -> String {
        match self {
            Self::Timestamped(at) => format!("{}_{}.xlsx", prefix, at.format(TIMESTAMP_FORMAT)),
            Self::Latest => format!("{}_latest.xlsx", prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_slot_file_names() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(0, 5, 9)
            .unwrap();

        assert_eq!(
            OutputSlot::Timestamped(at).file_name("site_visit_requests"),
            "site_visit_requests_20240310_000509.xlsx"
        );
        assert_eq!(
            OutputSlot::Latest.file_name("site_visit_requests"),
            "site_visit_requests_latest.xlsx"
        );
    }
}
