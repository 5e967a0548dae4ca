//! Trimester arithmetic shared by the dashboard and assignment screens.

/// Human label for a teaching period. Trimester 3 runs into the next
/// calendar year; anything outside 1..=3 is just the year.
pub fn trimester_date_range(year: i64, trimester: i64) -> String {
    match trimester {
        1 => format!("February – April {}", year),
        2 => format!("July – September {}", year),
        3 => format!("November – February {}", year + 1),
        _ => year.to_string(),
    }
}

/// Tri 1: Jan-Apr, Tri 2: May-Aug, Tri 3: Sep-Dec.
pub fn trimester_from_month(month: u32) -> i64 {
    match month {
        1..=4 => 1,
        5..=8 => 2,
        _ => 3,
    }
}

pub fn context_label(year: i64, trimester: i64) -> String {
    format!("{} - Trimester {}", year, trimester)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_labels() {
        assert_eq!(trimester_date_range(2026, 1), "February – April 2026");
        assert_eq!(trimester_date_range(2026, 2), "July – September 2026");
        assert_eq!(trimester_date_range(2026, 3), "November – February 2027");
    }

    #[test]
    fn date_range_falls_back_to_year() {
        assert_eq!(trimester_date_range(2026, 9), "2026");
        assert_eq!(trimester_date_range(2026, 0), "2026");
        assert_eq!(trimester_date_range(2026, -1), "2026");
    }

    #[test]
    fn month_to_trimester() {
        assert_eq!(trimester_from_month(1), 1);
        assert_eq!(trimester_from_month(4), 1);
        assert_eq!(trimester_from_month(5), 2);
        assert_eq!(trimester_from_month(8), 2);
        assert_eq!(trimester_from_month(9), 3);
        assert_eq!(trimester_from_month(12), 3);
    }
}
