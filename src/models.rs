use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionKind {
    Lecture,
    Lab,
    Tutorial,
}

impl SessionKind {
    /// `P` is a practical (lab) session, `T` a tutorial, anything else a lecture.
    pub fn from_letter(letter: &str) -> Self {
        match letter.trim() {
            "P" => SessionKind::Lab,
            "T" => SessionKind::Tutorial,
            _ => SessionKind::Lecture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub code: String,
    pub name: String,
    pub session_kind: SessionKind,
    pub attended: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecommendKind {
    Lecture,
    Lab,
    Overall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Danger,
    Neutral,
}

impl Outcome {
    pub fn bucket(self) -> &'static str {
        match self {
            Outcome::Success => "safe",
            Outcome::Danger => "critical",
            Outcome::Neutral => "maintain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: Outcome,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    O,
    APlus,
    A,
    BPlus,
    B,
    C,
    P,
    F,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::O => "O",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::P => "P",
            Grade::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeResult {
    pub grade: Grade,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInfo {
    pub branch: String,
    pub admission_year: i32,
    pub roll_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_floating: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySuggestion {
    pub date: NaiveDate,
    pub suggestion: Option<String>,
    pub long_weekend: bool,
}
