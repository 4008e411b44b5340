use crate::{
    report::{build_report, failure_notice, graded_notice, render_report},
    types::{Grade, GradingResult, Outcome, Suggestion},
};
use chrono::{TimeZone, Utc};

fn result(score: f64, suggestions: Vec<Suggestion>) -> GradingResult {
    GradingResult {
        score,
        suggestions,
        strengths: Some("Strong structure".to_string()),
        weaknesses: None,
        summary_comment: Some("Good work overall".to_string()),
    }
}

fn graded(index: usize, name: &str, score: f64, email_sent: bool) -> Outcome {
    Outcome {
        index,
        filename: format!("{name}.png"),
        student_name: name.to_string(),
        student_email: Some(format!("{name}@school.test")),
        grade: Grade::Graded {
            grading_result: result(score, Vec::new()),
        },
        email_sent,
    }
}

fn failed(index: usize, name: &str, error: &str) -> Outcome {
    Outcome {
        index,
        filename: format!("{name}.png"),
        student_name: name.to_string(),
        student_email: None,
        grade: Grade::Failed {
            error: error.to_string(),
        },
        email_sent: false,
    }
}

fn revision(original: &str, revised: &str, reason: &str) -> Suggestion {
    Suggestion::Revision {
        original_sentence: original.to_string(),
        revised_sentence: revised.to_string(),
        reason: reason.to_string(),
    }
}

#[test]
fn summary_counts_and_average_over_successes() {
    let report = build_report(vec![
        graded(0, "alice", 85.0, true),
        failed(1, "bob", "timed out"),
        graded(2, "carol", 90.5, false),
    ]);

    assert_eq!(report.summary.total_essays, 3);
    assert_eq!(report.summary.successful_grades, 2);
    assert_eq!(report.summary.failed_grades, 1);
    assert_eq!(report.summary.emails_sent, 1);
    assert_eq!(report.summary.average_score, 87.75);
}

#[test]
fn details_are_sorted_into_upload_order() {
    let report = build_report(vec![
        graded(2, "carol", 70.0, false),
        graded(0, "alice", 80.0, false),
        failed(1, "bob", "down"),
    ]);
    let indices: Vec<_> = report.details.iter().map(|o| o.index).collect();
    assert_eq!(indices, [0, 1, 2]);
}

#[test]
fn average_is_rounded_to_two_places() {
    let report = build_report(vec![
        graded(0, "a", 70.0, false),
        graded(1, "b", 80.0, false),
        graded(2, "c", 81.0, false),
    ]);
    // 231 / 3 = 77.0
    assert_eq!(report.summary.average_score, 77.0);

    let report = build_report(vec![
        graded(0, "a", 66.0, false),
        graded(1, "b", 67.0, false),
        graded(2, "c", 67.0, false),
    ]);
    // 200 / 3 = 66.666..
    assert_eq!(report.summary.average_score, 66.67);
}

#[test]
fn zero_successes_average_to_zero() {
    let report = build_report(vec![failed(0, "a", "x"), failed(1, "b", "y")]);
    assert_eq!(report.summary.average_score, 0.0);
    assert_eq!(report.summary.successful_grades, 0);

    let empty = build_report(Vec::new());
    assert_eq!(empty.summary.total_essays, 0);
    assert_eq!(empty.summary.average_score, 0.0);
}

#[test]
fn outcome_serializes_flat() {
    let json = serde_json::to_value(graded(0, "alice", 85.0, true)).unwrap();
    assert_eq!(json["student_name"], "alice");
    assert_eq!(json["grading_result"]["score"], 85.0);
    assert!(json.get("error").is_none());

    let json = serde_json::to_value(failed(1, "bob", "down")).unwrap();
    assert_eq!(json["error"], "down");
    assert!(json.get("grading_result").is_none());
}

#[test]
fn export_renders_summary_and_details() {
    let mut alice = graded(0, "alice", 85.0, true);
    alice.grade = Grade::Graded {
        grading_result: result(
            85.0,
            vec![
                Suggestion::Text("Use more transitions.".to_string()),
                revision("He go to school.", "He goes to school.", "Subject-verb agreement"),
            ],
        ),
    };
    let report = build_report(vec![alice, failed(1, "bob", "backend unavailable: down")]);
    let generated = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();

    let text = render_report(&report, generated);

    assert!(text.starts_with(&"=".repeat(50)));
    assert!(text.contains("Generated: 2026-03-01 09:30:00 UTC"));
    assert!(text.contains("Total essays: 2\n"));
    assert!(text.contains("Graded: 1\n"));
    assert!(text.contains("Failed: 1\n"));
    assert!(text.contains("Average score: 85\n"));
    assert!(text.contains("Emails sent: 1\n"));

    assert!(text.contains("1. Student: alice\n   File: alice.png\n   Score: 85\n   Email: sent\n"));
    assert!(text.contains("     1) Use more transitions.\n"));
    assert!(text.contains(
        "     2) Original: He go to school.\n        Revised: He goes to school.\n        Reason: Subject-verb agreement\n"
    ));

    assert!(text.contains("2. Student: bob\n"));
    assert!(text.contains("   Score: not graded\n"));
    assert!(text.contains("   Email: not sent\n"));
    assert!(text.contains("   Error: backend unavailable: down\n"));
    assert!(text.trim_end().ends_with("End of report"));
}

#[test]
fn export_handles_partial_and_empty_revisions() {
    let mut outcome = graded(0, "alice", 70.0, false);
    outcome.grade = Grade::Graded {
        grading_result: result(
            70.0,
            vec![revision("", "Better sentence.", ""), revision("", "", "")],
        ),
    };
    let text = render_report(&build_report(vec![outcome]), Utc::now());

    assert!(text.contains("     1) Revised: Better sentence.\n"));
    assert!(text.contains("     2) (empty suggestion)\n"));
    assert!(!text.contains("Original:"));
}

#[test]
fn graded_notice_carries_score_and_feedback() {
    let message = graded_notice(
        "alice@school.test",
        "alice",
        &result(88.0, vec![Suggestion::Text("Tighten the conclusion.".to_string())]),
    );

    assert_eq!(message.to, "alice@school.test");
    assert_eq!(message.subject, "Essay feedback for alice: 88/100");
    assert!(message.body.starts_with("Hi alice,"));
    assert!(message.body.contains("Score: 88/100"));
    assert!(message.body.contains("Strengths:\n  Strong structure"));
    assert!(message.body.contains("Summary:\n  Good work overall"));
    assert!(!message.body.contains("Weaknesses:"));
    assert!(message.body.contains("Suggestions:\n  1) Tighten the conclusion."));
}

#[test]
fn failure_notice_explains_the_error() {
    let message = failure_notice("bob@school.test", "bob", "blank page");
    assert_eq!(message.subject, "Essay feedback for bob: not graded");
    assert!(message.body.contains("(blank page)"));
}
