use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::{DaySuggestion, Holiday};

fn is_holiday(day: NaiveDate, holidays: &[Holiday]) -> bool {
    holidays.iter().any(|holiday| holiday.date == day)
}

/// A single day of leave that bridges a weekend and a Tuesday or Thursday holiday.
pub fn suggestion_for(day: NaiveDate, holidays: &[Holiday]) -> Option<String> {
    if is_holiday(day, holidays) {
        return None;
    }

    match day.weekday() {
        Weekday::Mon if is_holiday(day + Duration::days(1), holidays) => {
            Some("Take Monday off for a 4-day weekend.".to_string())
        }
        Weekday::Fri if is_holiday(day - Duration::days(1), holidays) => {
            Some("Take Friday off for a 4-day weekend.".to_string())
        }
        _ => None,
    }
}

fn is_long_weekend(day: NaiveDate, holidays: &[Holiday]) -> bool {
    let (friday_offset, monday_offset) = match day.weekday() {
        Weekday::Sat => (1, 2),
        Weekday::Sun => (2, 1),
        _ => return false,
    };

    suggestion_for(day - Duration::days(friday_offset), holidays).is_some()
        || suggestion_for(day + Duration::days(monday_offset), holidays).is_some()
}

pub fn scan_month(year: i32, month: u32, holidays: &[Holiday]) -> Vec<DaySuggestion> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|day| day.month() == month)
        .map(|date| DaySuggestion {
            date,
            suggestion: suggestion_for(date, holidays),
            long_weekend: is_long_weekend(date, holidays),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn holiday(name: &str, date: NaiveDate) -> Holiday {
        Holiday {
            name: name.to_string(),
            date,
            is_floating: false,
        }
    }

    #[test]
    fn monday_before_tuesday_holiday_is_suggested() {
        let holidays = vec![holiday("Parsi New Year", date(2025, 8, 19))];
        assert!(suggestion_for(date(2025, 8, 18), &holidays).is_some());
        assert_eq!(suggestion_for(date(2025, 8, 15), &holidays), None);
    }

    #[test]
    fn friday_after_thursday_holiday_is_suggested() {
        let holidays = vec![holiday("Ganesh Chaturthi", date(2025, 8, 28))];
        assert_eq!(
            suggestion_for(date(2025, 8, 29), &holidays).as_deref(),
            Some("Take Friday off for a 4-day weekend.")
        );
    }

    #[test]
    fn holidays_themselves_get_no_suggestion() {
        let holidays = vec![
            holiday("Bridge", date(2025, 8, 18)),
            holiday("Parsi New Year", date(2025, 8, 19)),
        ];
        assert_eq!(suggestion_for(date(2025, 8, 18), &holidays), None);
    }

    #[test]
    fn month_scan_flags_adjacent_weekend() {
        let holidays = vec![holiday("Parsi New Year", date(2025, 8, 19))];
        let days = scan_month(2025, 8, &holidays);
        assert_eq!(days.len(), 31);

        let flagged: Vec<NaiveDate> = days
            .iter()
            .filter(|day| day.long_weekend)
            .map(|day| day.date)
            .collect();
        assert_eq!(flagged, vec![date(2025, 8, 16), date(2025, 8, 17)]);

        let suggested: Vec<NaiveDate> = days
            .iter()
            .filter(|day| day.suggestion.is_some())
            .map(|day| day.date)
            .collect();
        assert_eq!(suggested, vec![date(2025, 8, 18)]);
    }

    #[test]
    fn invalid_month_scans_nothing() {
        assert!(scan_month(2025, 13, &[]).is_empty());
    }
}
