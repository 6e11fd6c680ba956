use std::fmt::Write;

use crate::grades::SubjectGrades;

fn format_value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{v}"),
        None => "-".to_string(),
    }
}

/// `Subject: 5, 4, 3  (átlag: 4)` per line.
pub fn render_grades(summary: &[SubjectGrades]) -> String {
    if summary.is_empty() {
        return "No grades.\n".to_string();
    }
    let mut out = String::new();
    for s in summary {
        let values: Vec<String> = s.grades.iter().map(|g| format_value(g.value)).collect();
        let subject = if s.subject.is_empty() { "?" } else { s.subject.as_str() };
        let avg = s.average.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        let _ = writeln!(out, "{}: {}  (átlag: {})", subject, values.join(", "), avg);
    }
    out
}
