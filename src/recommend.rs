use crate::models::{AttendanceRecord, Outcome, Recommendation, RecommendKind, SessionKind};

/// Rounded-up attendance percentage. An empty register counts as 0%.
pub fn attendance_percentage(attended: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }

    let scaled = u64::from(attended) * 100;
    u32::try_from(scaled.div_ceil(u64::from(total))).unwrap_or(u32::MAX)
}

pub fn recommend(attended: u32, total: u32, target: u32, kind: RecommendKind) -> Recommendation {
    let target = target.clamp(1, 100);
    let percentage = attendance_percentage(attended, total);

    let attended = i64::from(attended);
    let total = i64::from(total);
    let target = i64::from(target);

    if i64::from(percentage) >= target {
        let safe_bunks = (attended * 100 - target * total).div_euclid(target);
        if safe_bunks <= 0 {
            return neutral("Maintain your attendance.");
        }
        return Recommendation {
            kind: Outcome::Success,
            message: bunk_message(safe_bunks, kind),
        };
    }

    // Any absence already rules out a perfect register.
    if target == 100 {
        return Recommendation {
            kind: Outcome::Danger,
            message: "100% is no longer reachable.".to_string(),
        };
    }

    let needed = ceil_div(target * total - 100 * attended, 100 - target);
    if needed <= 0 {
        return neutral("On track.");
    }

    Recommendation {
        kind: Outcome::Danger,
        message: attend_message(needed, kind),
    }
}

pub fn recommend_record(record: &AttendanceRecord, target: u32) -> Recommendation {
    let kind = match record.session_kind {
        SessionKind::Lab => RecommendKind::Lab,
        SessionKind::Lecture | SessionKind::Tutorial => RecommendKind::Lecture,
    };
    recommend(record.attended, record.total, target, kind)
}

/// Attended and total sessions summed across every record.
pub fn overall(records: &[AttendanceRecord]) -> (u32, u32) {
    records.iter().fold((0u32, 0u32), |(attended, total), record| {
        (
            attended.saturating_add(record.attended),
            total.saturating_add(record.total),
        )
    })
}

fn neutral(message: &str) -> Recommendation {
    Recommendation {
        kind: Outcome::Neutral,
        message: message.to_string(),
    }
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    -(-numerator).div_euclid(denominator)
}

fn plural(count: i64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

// Two lectures are worth one lab session.
fn bunk_message(safe_bunks: i64, kind: RecommendKind) -> String {
    match kind {
        RecommendKind::Lecture => {
            let labs = safe_bunks / 2;
            if labs == 0 {
                format!("Safe to bunk {}.", plural(safe_bunks, "Lecture", "Lectures"))
            } else {
                format!(
                    "Safe to bunk {} / {}.",
                    plural(safe_bunks, "Lecture", "Lectures"),
                    plural(labs, "Lab", "Labs")
                )
            }
        }
        RecommendKind::Lab => format!(
            "Safe to bunk {} / {}.",
            plural(safe_bunks, "Lab", "Labs"),
            plural(safe_bunks * 2, "Lecture", "Lectures")
        ),
        RecommendKind::Overall => {
            format!("Safe to bunk {}.", plural(safe_bunks, "class", "classes"))
        }
    }
}

fn attend_message(needed: i64, kind: RecommendKind) -> String {
    let sessions = match kind {
        RecommendKind::Lecture => plural(needed, "Lecture", "Lectures"),
        RecommendKind::Lab => plural(needed, "Lab", "Labs"),
        RecommendKind::Overall => plural(needed, "class", "classes"),
    };
    format!("Attend {sessions}.")
}
