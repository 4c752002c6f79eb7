use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::models::StudentInfo;

static ROLL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})([a-z]{3})(\d{3})").expect("valid roll pattern"));

const BRANCHES: [(&str, &str); 8] = [
    ("bce", "Computer Science and Engineering"),
    ("bit", "Information Technology"),
    ("bec", "Electronics and Communication Engineering"),
    ("bee", "Electrical Engineering"),
    ("bei", "Instrumentation and Control Engineering"),
    ("bme", "Mechanical Engineering"),
    ("bcl", "Civil Engineering"),
    ("bch", "Chemical Engineering"),
];

pub fn branch_name(code: &str) -> Option<&'static str> {
    BRANCHES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
}

/// Reads admission year, branch and roll number from an institute email such
/// as `24bce167@nirmauni.ac.in`.
pub fn parse_student(email: &str) -> Option<StudentInfo> {
    let lowered = email.trim().to_lowercase();
    let captures = ROLL_PATTERN.captures(&lowered)?;

    let year: i32 = captures[1].parse().ok()?;
    let branch = branch_name(&captures[2])?;

    Some(StudentInfo {
        branch: branch.to_string(),
        admission_year: 2000 + year,
        roll_no: captures[0].to_string(),
    })
}

/// Odd semesters start in July.
pub fn current_semester(admission_year: i32, today: NaiveDate) -> u32 {
    let years = i64::from(today.year() - admission_year);
    let semester = if today.month() >= 7 {
        2 * years + 1
    } else {
        2 * years
    };
    u32::try_from(semester.max(1)).unwrap_or(1)
}

/// Both semesters of the academic year `semester` falls in.
pub fn eligible_semesters(semester: u32) -> [u32; 2] {
    let odd = semester.max(1).div_ceil(2) * 2 - 1;
    [odd, odd + 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parses_institute_email() {
        let info = parse_student("24BCE167@nirmauni.ac.in").unwrap();
        assert_eq!(
            info,
            StudentInfo {
                branch: "Computer Science and Engineering".to_string(),
                admission_year: 2024,
                roll_no: "24bce167".to_string(),
            }
        );
    }

    #[test]
    fn rejects_unknown_branch_and_bad_shape() {
        assert_eq!(parse_student("24xyz167@nirmauni.ac.in"), None);
        assert_eq!(parse_student("professor@nirmauni.ac.in"), None);
        assert_eq!(parse_student("2bce167@nirmauni.ac.in"), None);
    }

    #[test]
    fn november_of_second_year_is_semester_three() {
        let semester = current_semester(2024, date(2025, 11, 10));
        assert_eq!(semester, 3);
        assert_eq!(eligible_semesters(semester), [3, 4]);
    }

    #[test]
    fn spring_is_even_semester() {
        assert_eq!(current_semester(2024, date(2026, 2, 1)), 4);
        assert_eq!(eligible_semesters(4), [3, 4]);
    }

    #[test]
    fn semester_is_floored_at_one() {
        assert_eq!(current_semester(2025, date(2025, 3, 1)), 1);
        assert_eq!(current_semester(2026, date(2025, 9, 1)), 1);
        assert_eq!(eligible_semesters(1), [1, 2]);
    }
}
