use std::fmt::Write;

use serde::Serialize;

use crate::models::{AttendanceRecord, Outcome, Recommendation, RecommendKind};
use crate::recommend;

#[derive(Debug, Clone, Serialize)]
pub struct AssessedRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub recommendation: Recommendation,
}

pub fn assess(records: &[AttendanceRecord], target: u32) -> Vec<AssessedRecord> {
    records
        .iter()
        .map(|record| AssessedRecord {
            record: record.clone(),
            recommendation: recommend::recommend_record(record, target),
        })
        .collect()
}

pub fn in_bucket(assessed: &[AssessedRecord], outcome: Outcome) -> Vec<&AssessedRecord> {
    assessed
        .iter()
        .filter(|entry| entry.recommendation.kind == outcome)
        .collect()
}

pub fn overall_recommendation(records: &[AttendanceRecord], target: u32) -> (u32, Recommendation) {
    let (attended, total) = recommend::overall(records);
    (
        recommend::attendance_percentage(attended, total),
        recommend::recommend(attended, total, target, RecommendKind::Overall),
    )
}

pub fn build_report(
    source: &str,
    target: u32,
    records: &[AttendanceRecord],
    limit: usize,
) -> String {
    let assessed = assess(records, target);
    let (percentage, overall) = overall_recommendation(records, target);

    let mut output = String::new();
    let _ = writeln!(output, "# Attendance Report");
    let _ = writeln!(output, "Generated from {} (target {}%)", source, target);
    let _ = writeln!(output);
    let _ = writeln!(output, "Overall: {}% - {}", percentage, overall.message);

    let sections = [
        (Outcome::Danger, "Critical", "No subjects below target."),
        (Outcome::Success, "Safe to Bunk", "No subjects with spare sessions."),
        (Outcome::Neutral, "Maintain", "No subjects sitting on the line."),
    ];

    for (outcome, title, empty) in sections {
        let entries = in_bucket(&assessed, outcome);
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", title);

        if entries.is_empty() {
            let _ = writeln!(output, "{}", empty);
            continue;
        }

        for entry in entries.iter().take(limit) {
            let _ = writeln!(
                output,
                "- {} {} ({:?}) {}/{} = {}%: {}",
                entry.record.code,
                entry.record.name,
                entry.record.session_kind,
                entry.record.attended,
                entry.record.total,
                entry.record.percentage,
                entry.recommendation.message
            );
        }
    }

    output
}
