//! Timetable grid: distinct time slots as rows, Monday to Friday as columns.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::api::models::{CourseEntry, Role};

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]{1,2}):([0-9]{2})").expect("valid regex"));

/// A time-slot label such as `"10:00-10:45"` with its first two clock times
/// parsed to minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub label: String,
    pub start: Option<u16>,
    pub end: Option<u16>,
}

impl TimeSlot {
    pub fn parse(label: &str) -> Self {
        // ASCII digits only, so every capture fits in a u16
        let mut times = CLOCK_RE.captures_iter(label).filter_map(|c| {
            let h: u16 = c[1].parse().ok()?;
            let m: u16 = c[2].parse().ok()?;
            Some(h * 60 + m)
        });
        let start = times.next();
        let end = times.next();
        Self { label: label.to_string(), start, end }
    }
}

/// Missing times order after every present one.
fn cmp_minutes(a: Option<u16>, b: Option<u16>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl TimeSlot {
    /// Start time, then end time. Labels are not compared, so distinct labels
    /// with the same range compare equal and keep their first-seen order.
    pub fn cmp_range(&self, other: &Self) -> Ordering {
        cmp_minutes(self.start, other.start).then_with(|| cmp_minutes(self.end, other.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Where day text nothing matches ends up under [`DayFallback::Tuesday`].
    pub const FALLBACK: Weekday = Weekday::Tuesday;

    /// Case-insensitive prefix match against Hungarian day names, with the
    /// English abbreviations accepted too.
    pub fn recognize(day: &str) -> Option<Weekday> {
        let d = day.trim().to_lowercase();
        let starts = |stems: &[&str]| stems.iter().any(|s| d.starts_with(s));
        if starts(&["hét", "het", "mon"][..]) {
            Some(Weekday::Monday)
        } else if starts(&["ked", "tue"][..]) {
            Some(Weekday::Tuesday)
        } else if starts(&["sze", "wed"][..]) {
            Some(Weekday::Wednesday)
        } else if starts(&["cs", "thu"][..]) {
            Some(Weekday::Thursday)
        } else if starts(&["pén", "pen", "fri"][..]) {
            Some(Weekday::Friday)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Hétfő",
            Weekday::Tuesday => "Kedd",
            Weekday::Wednesday => "Szerda",
            Weekday::Thursday => "Csütörtök",
            Weekday::Friday => "Péntek",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// What to do with day text that matches no weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFallback {
    /// File it under Tuesday, like the web client always has.
    #[default]
    Tuesday,
    /// Keep it in [`ScheduleRow::unrecognized`].
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub slot: TimeSlot,
    days: [Vec<CourseEntry>; 5],
    pub unrecognized: Vec<CourseEntry>,
}

impl ScheduleRow {
    fn new(slot: TimeSlot) -> Self {
        Self { slot, days: Default::default(), unrecognized: Vec::new() }
    }

    pub fn duration(&self) -> &str {
        &self.slot.label
    }

    pub fn day(&self, day: Weekday) -> &[CourseEntry] {
        &self.days[day.index()]
    }

    /// Every placed course, in column order.
    pub fn courses(&self) -> impl Iterator<Item = &CourseEntry> {
        self.days.iter().flatten().chain(self.unrecognized.iter())
    }
}

/// Build the timetable with the historical Tuesday fallback.
pub fn build_schedule_rows(courses: &[CourseEntry]) -> Vec<ScheduleRow> {
    build_schedule_rows_with(courses, DayFallback::default())
}

pub fn build_schedule_rows_with(courses: &[CourseEntry], fallback: DayFallback) -> Vec<ScheduleRow> {
    let mut labels: Vec<&str> = Vec::new();
    for c in courses {
        let dur = c.duration.trim();
        if !dur.is_empty() && !labels.contains(&dur) {
            labels.push(dur);
        }
    }
    let mut slots: Vec<TimeSlot> = labels.into_iter().map(TimeSlot::parse).collect();
    slots.sort_by(TimeSlot::cmp_range);

    let mut rows: Vec<ScheduleRow> = slots.into_iter().map(ScheduleRow::new).collect();
    for c in courses {
        let dur = c.duration.trim();
        let Some(row) = rows.iter_mut().find(|r| r.slot.label == dur) else {
            continue;
        };
        match (Weekday::recognize(&c.day), fallback) {
            (Some(day), _) => row.days[day.index()].push(c.clone()),
            (None, DayFallback::Tuesday) => {
                log::debug!("course {} has unknown day {:?}, filing under {:?}", c.id, c.day, Weekday::FALLBACK);
                row.days[Weekday::FALLBACK.index()].push(c.clone());
            }
            (None, DayFallback::Unrecognized) => row.unrecognized.push(c.clone()),
        }
    }
    rows
}

/// Which course listing the timetable is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseSource {
    CurrentUser,
    ByTeacher,
    ByDepartment(String),
}

impl CourseSource {
    /// Teachers see the courses they teach; administrators browse a department.
    pub fn for_role(role: &Role, department: Option<&str>) -> Self {
        match (role, department) {
            (Role::Teacher, _) => CourseSource::ByTeacher,
            (Role::Sysadmin, Some(name)) if !name.trim().is_empty() => {
                CourseSource::ByDepartment(name.trim().to_string())
            }
            _ => CourseSource::CurrentUser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: i64, day: &str, duration: &str) -> CourseEntry {
        CourseEntry {
            id,
            name: format!("course{id}"),
            day: day.to_string(),
            duration: duration.to_string(),
            teacher_name: "Tanár".into(),
            department_name: "Informatika".into(),
        }
    }

    #[test]
    fn slot_parsing() {
        let s = TimeSlot::parse("10:00-10:45");
        assert_eq!((s.start, s.end), (Some(600), Some(645)));
        let s = TimeSlot::parse("8:05 – 9:50");
        assert_eq!((s.start, s.end), (Some(485), Some(590)));
        let s = TimeSlot::parse("2 óra");
        assert_eq!((s.start, s.end), (None, None));
        let s = TimeSlot::parse("from 7:30");
        assert_eq!((s.start, s.end), (Some(450), None));
    }

    #[test]
    fn non_ascii_digits_are_not_clock_times() {
        let s = TimeSlot::parse("٠٨:٤٥-٠٩:٣٠");
        assert_eq!((s.start, s.end), (None, None));
        let rows = build_schedule_rows(&[
            course(1, "kedd", "٠٨:٤٥-٠٩:٣٠"),
            course(2, "kedd", "8:00-8:45"),
            course(3, "kedd", "extra"),
        ]);
        let labels: Vec<_> = rows.iter().map(|r| r.duration()).collect();
        assert_eq!(labels, vec!["8:00-8:45", "٠٨:٤٥-٠٩:٣٠", "extra"]);
    }

    #[test]
    fn same_range_keeps_first_seen_order() {
        let a = TimeSlot::parse("8:00-8:45");
        let b = TimeSlot::parse("8:00 - 8:45 (A)");
        assert_eq!(a.cmp_range(&b), Ordering::Equal);
        assert_ne!(a, b);
        let rows = build_schedule_rows(&[course(1, "kedd", "8:00 - 8:45 (A)"), course(2, "kedd", "8:00-8:45")]);
        let labels: Vec<_> = rows.iter().map(|r| r.duration()).collect();
        assert_eq!(labels, vec!["8:00 - 8:45 (A)", "8:00-8:45"]);
    }

    #[test]
    fn rows_sorted_by_start_time() {
        let rows = build_schedule_rows(&[course(1, "Monday", "9:00-9:45"), course(2, "Monday", "8:00-8:45")]);
        let labels: Vec<_> = rows.iter().map(|r| r.duration()).collect();
        assert_eq!(labels, vec!["8:00-8:45", "9:00-9:45"]);
        assert_eq!(rows[0].day(Weekday::Monday)[0].id, 2);
    }

    #[test]
    fn end_time_breaks_ties_and_unparseable_sorts_last() {
        let rows = build_schedule_rows(&[
            course(1, "kedd", "extra"),
            course(2, "kedd", "8:00-9:30"),
            course(3, "kedd", "8:00-8:45"),
            course(4, "kedd", "10:00-10:45"),
        ]);
        let labels: Vec<_> = rows.iter().map(|r| r.duration()).collect();
        assert_eq!(labels, vec!["8:00-8:45", "8:00-9:30", "10:00-10:45", "extra"]);
    }

    #[test]
    fn hungarian_and_english_days() {
        assert_eq!(Weekday::recognize("Hétfő"), Some(Weekday::Monday));
        assert_eq!(Weekday::recognize("hetfo"), Some(Weekday::Monday));
        assert_eq!(Weekday::recognize(" KEDD "), Some(Weekday::Tuesday));
        assert_eq!(Weekday::recognize("Szerda"), Some(Weekday::Wednesday));
        assert_eq!(Weekday::recognize("csütörtök"), Some(Weekday::Thursday));
        assert_eq!(Weekday::recognize("Péntek"), Some(Weekday::Friday));
        assert_eq!(Weekday::recognize("pentek"), Some(Weekday::Friday));
        assert_eq!(Weekday::recognize("Wednesday"), Some(Weekday::Wednesday));
        assert_eq!(Weekday::recognize("Funday"), None);
        assert_eq!(Weekday::recognize(""), None);
    }

    #[test]
    fn unknown_day_lands_on_tuesday_by_default() {
        let rows = build_schedule_rows(&[course(1, "Wednesday", "8:00-8:45"), course(2, "Funday", "8:00-8:45")]);
        assert_eq!(rows[0].day(Weekday::Wednesday)[0].id, 1);
        assert_eq!(rows[0].day(Weekday::Tuesday)[0].id, 2);
        assert!(rows[0].unrecognized.is_empty());
    }

    #[test]
    fn unknown_day_kept_apart_when_requested() {
        let rows = build_schedule_rows_with(&[course(2, "Funday", "8:00-8:45")], DayFallback::Unrecognized);
        assert!(rows[0].day(Weekday::Tuesday).is_empty());
        assert_eq!(rows[0].unrecognized[0].id, 2);
    }

    #[test]
    fn every_course_in_exactly_one_cell() {
        let input = vec![
            course(1, "hétfő", "8:00-8:45"),
            course(2, "hétfő", "8:00-8:45"),
            course(3, "péntek", "12:00-12:45"),
            course(4, "???", "9:00-9:45"),
            course(5, "szerda", " 8:00-8:45 "),
        ];
        let rows = build_schedule_rows(&input);
        let mut ids: Vec<i64> = rows.iter().flat_map(|r| r.courses().map(|c| c.id)).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(rows.len(), 3);
        let monday: Vec<_> = rows[0].day(Weekday::Monday).iter().map(|c| c.id).collect();
        assert_eq!(monday, vec![1, 2]);
    }

    #[test]
    fn blank_durations_make_no_row() {
        let rows = build_schedule_rows(&[course(1, "kedd", "   ")]);
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_and_repeatable() {
        assert!(build_schedule_rows(&[]).is_empty());
        let input = vec![course(1, "kedd", "8:00-8:45"), course(2, "cs", "9:00-9:45")];
        assert_eq!(build_schedule_rows(&input), build_schedule_rows(&input));
    }

    #[test]
    fn course_source_by_role() {
        assert_eq!(CourseSource::for_role(&Role::Teacher, Some("Info")), CourseSource::ByTeacher);
        assert_eq!(
            CourseSource::for_role(&Role::Sysadmin, Some("Info")),
            CourseSource::ByDepartment("Info".into())
        );
        assert_eq!(CourseSource::for_role(&Role::Sysadmin, None), CourseSource::CurrentUser);
        assert_eq!(CourseSource::for_role(&Role::Student, Some("Info")), CourseSource::CurrentUser);
    }
}
