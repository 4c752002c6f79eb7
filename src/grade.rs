use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{Grade, GradeResult};

const GRADE_TABLE: [(f64, Grade, u32); 7] = [
    (91.0, Grade::O, 10),
    (81.0, Grade::APlus, 9),
    (71.0, Grade::A, 8),
    (61.0, Grade::BPlus, 7),
    (51.0, Grade::B, 6),
    (46.0, Grade::C, 5),
    (40.0, Grade::P, 4),
];

/// Maps a weighted percentage onto the grade table. Thresholds are compared
/// against the raw value, so 90.99 stays an A+.
pub fn grade_for(percentage: f64) -> GradeResult {
    GRADE_TABLE
        .iter()
        .find(|(threshold, _, _)| percentage >= *threshold)
        .map(|&(_, grade, points)| GradeResult { grade, points })
        .unwrap_or(GradeResult {
            grade: Grade::F,
            points: 0,
        })
}

/// Credit-weighted mean of grade points.
pub fn sgpa(subjects: &[(f64, u32)]) -> f64 {
    weighted_mean(
        subjects
            .iter()
            .map(|&(credits, points)| (credits, f64::from(points))),
    )
}

/// Credit-weighted mean of semester SGPAs, each paired with the credits it covers.
pub fn cgpa(semesters: &[(f64, f64)]) -> f64 {
    weighted_mean(semesters.iter().copied())
}

fn weighted_mean(values: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (credits, weighted) = values.fold((0.0, 0.0), |(credits, weighted), (c, v)| {
        (credits + c, weighted + c * v)
    });

    if credits <= 0.0 {
        0.0
    } else {
        weighted / credits
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectScore {
    pub semester: u32,
    pub subject: String,
    pub credits: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone)]
pub struct SemesterSummary {
    pub semester: u32,
    pub credits: f64,
    pub sgpa: f64,
    pub subjects: Vec<(SubjectScore, GradeResult)>,
}

pub fn load_scores(csv_path: &Path) -> anyhow::Result<Vec<SubjectScore>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut scores = Vec::new();

    for result in reader.deserialize::<SubjectScore>() {
        scores.push(result?);
    }

    Ok(scores)
}

pub fn summarize(scores: &[SubjectScore]) -> Vec<SemesterSummary> {
    let mut by_semester: BTreeMap<u32, Vec<(SubjectScore, GradeResult)>> = BTreeMap::new();

    for score in scores {
        let grade = grade_for(score.percentage);
        by_semester
            .entry(score.semester)
            .or_default()
            .push((score.clone(), grade));
    }

    by_semester
        .into_iter()
        .map(|(semester, subjects)| {
            let pairs: Vec<(f64, u32)> = subjects
                .iter()
                .map(|(score, grade)| (score.credits, grade.points))
                .collect();
            SemesterSummary {
                semester,
                credits: pairs.iter().map(|(credits, _)| credits).sum(),
                sgpa: sgpa(&pairs),
                subjects,
            }
        })
        .collect()
}

pub fn overall_cgpa(summaries: &[SemesterSummary]) -> f64 {
    let semesters: Vec<(f64, f64)> = summaries
        .iter()
        .map(|summary| (summary.credits, summary.sgpa))
        .collect();
    cgpa(&semesters)
}
