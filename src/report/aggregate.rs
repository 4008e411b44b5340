use crate::types::{Outcome, Report, ReportSummary};

/// Build the terminal report from per-essay outcomes
///
/// Outcomes may arrive in any order; details are sorted back into upload
/// order. The average covers successful grades only, rounded to two decimal
/// places, and is `0.0` when nothing was graded.
pub fn build_report(mut outcomes: Vec<Outcome>) -> Report {
    outcomes.sort_by_key(|outcome| outcome.index);

    let scores: Vec<f64> = outcomes.iter().filter_map(|o| o.grade.score()).collect();
    let successful_grades = scores.len();
    let average_score = if scores.is_empty() {
        0.0
    } else {
        round2(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    Report {
        summary: ReportSummary {
            total_essays: outcomes.len(),
            successful_grades,
            failed_grades: outcomes.len() - successful_grades,
            emails_sent: outcomes.iter().filter(|o| o.email_sent).count(),
            average_score,
        },
        details: outcomes,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
