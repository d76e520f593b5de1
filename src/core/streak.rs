use chrono::NaiveDate;

/// Compute the daily-visit streak for a visit on `today`.
///
/// A visit exactly one calendar day after the last one extends the streak;
/// a longer gap resets it to 1; a repeat visit on the same day leaves it
/// unchanged. A first visit (nothing stored) starts at 1. Days are compared
/// as calendar dates, not 24-hour windows.
pub fn advance(last_visit: Option<NaiveDate>, today: NaiveDate, current: Option<u32>) -> u32 {
    let Some(last) = last_visit else {
        return 1;
    };

    match (today - last).num_days() {
        1 => current.map_or(1, |streak| streak + 1),
        gap if gap > 1 => 1,
        // Same day, or a clock that moved backwards.
        _ => current.unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn one_day_gap_increments() {
        assert_eq!(advance(Some(date("2026-08-04")), date("2026-08-05"), Some(3)), 4);
    }

    #[test]
    fn longer_gap_resets_to_one() {
        assert_eq!(advance(Some(date("2026-08-01")), date("2026-08-05"), Some(7)), 1);
    }

    #[test]
    fn same_day_is_unchanged() {
        assert_eq!(advance(Some(date("2026-08-05")), date("2026-08-05"), Some(5)), 5);
    }

    #[test]
    fn first_visit_starts_at_one() {
        assert_eq!(advance(None, date("2026-08-05"), None), 1);
        assert_eq!(advance(None, date("2026-08-05"), Some(9)), 1);
    }

    #[test]
    fn missing_stored_count_never_panics() {
        assert_eq!(advance(Some(date("2026-08-04")), date("2026-08-05"), None), 1);
        assert_eq!(advance(Some(date("2026-08-05")), date("2026-08-05"), None), 1);
    }

    #[test]
    fn month_boundary_counts_as_one_day() {
        assert_eq!(advance(Some(date("2026-07-31")), date("2026-08-01"), Some(1)), 2);
    }
}
