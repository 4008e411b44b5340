//! Plain-text report export
//!
//! Flattens a report into the text file teachers download: a summary block
//! followed by one numbered block per essay.

use crate::types::{Grade, Outcome, Report, Suggestion};
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 50;
const SECTION_WIDTH: usize = 30;

pub fn render_report(report: &Report, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, report, generated_at);
    out
}

fn write_report(out: &mut String, report: &Report, generated_at: DateTime<Utc>) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let section = "-".repeat(SECTION_WIDTH);
    let summary = &report.summary;

    writeln!(out, "{rule}")?;
    writeln!(out, "Essay Grading Report")?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out)?;

    writeln!(out, "[Summary]")?;
    writeln!(out, "{section}")?;
    writeln!(out, "Total essays: {}", summary.total_essays)?;
    writeln!(out, "Graded: {}", summary.successful_grades)?;
    writeln!(out, "Failed: {}", summary.failed_grades)?;
    writeln!(out, "Average score: {}", summary.average_score)?;
    writeln!(out, "Emails sent: {}", summary.emails_sent)?;
    writeln!(out)?;

    writeln!(out, "[Details]")?;
    writeln!(out, "{section}")?;
    for (position, outcome) in report.details.iter().enumerate() {
        write_outcome(out, position + 1, outcome)?;
        writeln!(out)?;
    }

    writeln!(out, "{rule}")?;
    writeln!(out, "End of report")
}

fn write_outcome(out: &mut String, number: usize, outcome: &Outcome) -> fmt::Result {
    writeln!(out, "{number}. Student: {}", outcome.student_name)?;
    writeln!(out, "   File: {}", outcome.filename)?;
    match &outcome.grade {
        Grade::Graded { grading_result } => {
            writeln!(out, "   Score: {}", grading_result.score)?;
        }
        Grade::Failed { .. } => {
            writeln!(out, "   Score: not graded")?;
        }
    }
    let email = if outcome.email_sent { "sent" } else { "not sent" };
    writeln!(out, "   Email: {email}")?;

    match &outcome.grade {
        Grade::Graded { grading_result } if !grading_result.suggestions.is_empty() => {
            writeln!(out, "   Suggestions:")?;
            write_suggestions(out, &grading_result.suggestions, "     ")
        }
        Grade::Graded { .. } => Ok(()),
        Grade::Failed { error } => writeln!(out, "   Error: {error}"),
    }
}

/// Plain suggestions print on one line; sentence rewrites print as an
/// Original / Revised / Reason group under their number.
pub(crate) fn write_suggestions(
    out: &mut String,
    suggestions: &[Suggestion],
    indent: &str,
) -> fmt::Result {
    for (idx, suggestion) in suggestions.iter().enumerate() {
        let number = idx + 1;
        match suggestion {
            Suggestion::Text(text) => {
                writeln!(out, "{indent}{number}) {text}")?;
            }
            Suggestion::Revision {
                original_sentence,
                revised_sentence,
                reason,
            } => {
                let continuation = " ".repeat(indent.len() + number.to_string().len() + 2);
                let mut lines = Vec::new();
                if !original_sentence.is_empty() {
                    lines.push(format!("Original: {original_sentence}"));
                }
                if !revised_sentence.is_empty() {
                    lines.push(format!("Revised: {revised_sentence}"));
                }
                if !reason.is_empty() {
                    lines.push(format!("Reason: {reason}"));
                }
                if lines.is_empty() {
                    lines.push("(empty suggestion)".to_string());
                }

                for (line_no, line) in lines.iter().enumerate() {
                    if line_no == 0 {
                        writeln!(out, "{indent}{number}) {line}")?;
                    } else {
                        writeln!(out, "{continuation}{line}")?;
                    }
                }
            }
        }
    }
    Ok(())
}
