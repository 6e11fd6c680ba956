//! Per-subject grade summaries.

use serde::Serialize;

use crate::api::models::Grade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectGrades {
    pub subject: String,
    pub grades: Vec<Grade>,
    pub average: Option<i64>,
}

/// Floor of the mean. Grades without a numeric value count as 0; an empty
/// slice has no average.
pub fn floor_average(grades: &[Grade]) -> Option<i64> {
    if grades.is_empty() {
        return None;
    }
    let sum: f64 = grades.iter().map(|g| g.value.unwrap_or(0.0)).sum();
    Some((sum / grades.len() as f64).floor() as i64)
}

/// Group grades by subject in first-seen order, each with its floored average.
pub fn summarize_by_subject(grades: &[Grade]) -> Vec<SubjectGrades> {
    let mut out: Vec<SubjectGrades> = Vec::new();
    for grade in grades {
        match out.iter_mut().find(|s| s.subject == grade.subject) {
            Some(entry) => entry.grades.push(grade.clone()),
            None => out.push(SubjectGrades {
                subject: grade.subject.clone(),
                grades: vec![grade.clone()],
                average: None,
            }),
        }
    }
    for entry in &mut out {
        entry.average = floor_average(&entry.grades);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(subject: &str, value: Option<f64>) -> Grade {
        Grade {
            id: 0,
            subject: subject.into(),
            value,
            teacher_name: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn average_is_floored() {
        let grades = [grade("Matek", Some(5.0)), grade("Matek", Some(4.0))];
        assert_eq!(floor_average(&grades), Some(4));
    }

    #[test]
    fn non_numeric_counts_as_zero() {
        let grades = [grade("Matek", Some(5.0)), grade("Matek", None)];
        assert_eq!(floor_average(&grades), Some(2));
        assert_eq!(floor_average(&[]), None);
    }

    #[test]
    fn subjects_keep_first_seen_order() {
        let grades = [
            grade("Matek", Some(3.0)),
            grade("Angol", Some(5.0)),
            grade("Matek", Some(4.0)),
        ];
        let summary = summarize_by_subject(&grades);
        let subjects: Vec<_> = summary.iter().map(|s| (s.subject.as_str(), s.grades.len(), s.average)).collect();
        assert_eq!(subjects, vec![("Matek", 2, Some(3)), ("Angol", 1, Some(5))]);
    }
}
