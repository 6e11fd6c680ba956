use std::fmt::Write;

use crate::schedule::{ScheduleRow, Weekday};

const CELL_WIDTH: usize = 18;

fn pad(text: &str) -> String {
    let len = text.chars().count();
    if len >= CELL_WIDTH {
        let cut: String = text.chars().take(CELL_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        format!("{}{}", text, " ".repeat(CELL_WIDTH - len))
    }
}

/// Plain-text timetable. A cell holding several courses joins their names with `/`.
pub fn render_schedule(rows: &[ScheduleRow]) -> String {
    if rows.is_empty() {
        return "No schedule available.\n".to_string();
    }
    let with_unrecognized = rows.iter().any(|r| !r.unrecognized.is_empty());

    let mut out = String::new();
    out.push_str(&pad("Időpont"));
    for day in Weekday::ALL {
        out.push_str(&pad(day.label()));
    }
    if with_unrecognized {
        out.push_str(&pad("?"));
    }
    let header_len = out.chars().count();
    out = out.trim_end().to_string();
    out.push('\n');
    out.push_str(&"-".repeat(header_len));
    out.push('\n');

    for row in rows {
        let mut line = pad(row.duration());
        for day in Weekday::ALL {
            let names: Vec<&str> = row.day(day).iter().map(|c| c.name.as_str()).collect();
            line.push_str(&pad(&names.join("/")));
        }
        if with_unrecognized {
            let names: Vec<String> = row.unrecognized.iter().map(|c| format!("{} ({})", c.name, c.day)).collect();
            line.push_str(&pad(&names.join("/")));
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::CourseEntry;
    use crate::schedule::{DayFallback, build_schedule_rows_with};

    fn course(id: i64, name: &str, day: &str) -> CourseEntry {
        CourseEntry {
            id,
            name: name.into(),
            day: day.into(),
            duration: "8:00-8:45".into(),
            teacher_name: String::new(),
            department_name: String::new(),
        }
    }

    #[test]
    fn empty_schedule_has_placeholder() {
        assert_eq!(render_schedule(&[]), "No schedule available.\n");
    }

    #[test]
    fn courses_land_in_their_day_column() {
        let rows = build_schedule_rows_with(&[course(1, "Matek", "szerda")], DayFallback::Tuesday);
        let out = render_schedule(&rows);
        let line = out.lines().nth(2).unwrap();
        assert!(line.starts_with("8:00-8:45"));
        let col = line.find("Matek").unwrap();
        assert_eq!(line[..col].chars().count(), CELL_WIDTH * 3);
    }

    #[test]
    fn unrecognized_column_only_when_needed() {
        let rows = build_schedule_rows_with(&[course(1, "Rajz", "Funday")], DayFallback::Unrecognized);
        let out = render_schedule(&rows);
        assert!(out.lines().next().unwrap().ends_with('?'));
        assert!(out.contains("Rajz (Funday)"));
    }
}
