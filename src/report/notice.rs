use crate::report::export::write_suggestions;
use crate::types::{EmailMessage, GradingResult};
use std::fmt::{self, Write};

/// Notification sent to a student whose essay was graded
pub fn graded_notice(to: &str, student_name: &str, result: &GradingResult) -> EmailMessage {
    let mut body = String::new();
    let _ = write_graded_body(&mut body, student_name, result);
    EmailMessage {
        to: to.to_string(),
        subject: format!("Essay feedback for {student_name}: {}/100", result.score),
        body,
    }
}

/// Notification sent when grading failed and failure notices are enabled
pub fn failure_notice(to: &str, student_name: &str, error: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Essay feedback for {student_name}: not graded"),
        body: format!(
            "Hi {student_name},\n\n\
             Your essay could not be graded automatically ({error}).\n\
             Please check that the scan is legible and ask your teacher to resubmit it.\n"
        ),
    }
}

fn write_graded_body(out: &mut String, student_name: &str, result: &GradingResult) -> fmt::Result {
    writeln!(out, "Hi {student_name},")?;
    writeln!(out)?;
    writeln!(out, "Score: {}/100", result.score)?;

    let sections = [
        ("Strengths", &result.strengths),
        ("Weaknesses", &result.weaknesses),
        ("Summary", &result.summary_comment),
    ];
    for (title, text) in sections {
        if let Some(text) = text {
            writeln!(out)?;
            writeln!(out, "{title}:")?;
            writeln!(out, "  {text}")?;
        }
    }

    if !result.suggestions.is_empty() {
        writeln!(out)?;
        writeln!(out, "Suggestions:")?;
        write_suggestions(out, &result.suggestions, "  ")?;
    }
    Ok(())
}
