use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use dialoguer::Select;

use crate::error::Result;
use crate::timetable::models::{Lesson, ALL_GROUPS};

/// Format of the dates written by the source
pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// Past days kept before the first upcoming one
const HISTORY: usize = 2;

/// Day shown when opening a timetable
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A single day, `YYYY.MM.DD`
    Day(String),
    /// The whole timetable, unfiltered
    Week,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => f.write_str(date),
            Self::Week => f.write_str("week"),
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        match value {
            "week" => Self::Week,
            date => Self::Day(date.to_owned()),
        }
    }
}

/// Days to show by default
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayWindow {
    /// Visible dates, oldest first
    pub visible: Vec<String>,
    /// Day selected at first
    pub selection: Selection,
}

/// Read a source date, unreadable ones are the oldest possible
fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).unwrap_or(NaiveDate::MIN)
}

/// Choose which days are visible around `today`
///
/// Only two days of history are kept before the first upcoming day, and
/// only the two last days when everything is in the past
#[must_use]
pub fn window<'a, I>(dates: I, today: NaiveDate) -> DayWindow
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = dates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    sorted.sort_by_key(|date| parse_date(date));

    let upcoming = sorted.iter().position(|date| parse_date(date) >= today);

    let visible = match upcoming {
        Some(index) if index > HISTORY => &sorted[index - HISTORY..],
        None if sorted.len() > HISTORY => &sorted[sorted.len() - HISTORY..],
        _ => &sorted[..],
    };

    let selection = upcoming
        .map(|index| sorted[index])
        .or_else(|| sorted.last().copied())
        .map_or(Selection::Week, |date| Selection::Day(date.to_owned()));

    DayWindow {
        visible: visible.iter().map(|date| (*date).to_owned()).collect(),
        selection,
    }
}

/// Window of the days of a list of lessons
#[must_use]
pub fn lessons_window(lessons: &[Lesson], today: NaiveDate) -> DayWindow {
    window(lessons.iter().map(|lesson| lesson.date.as_str()), today)
}

/// Groups of a timetable, sorted
#[must_use]
pub fn groups(lessons: &[Lesson]) -> Vec<String> {
    lessons
        .iter()
        .map(|lesson| lesson.group.as_str())
        .filter(|group| !group.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Keep the wanted group only if the timetable knows it
#[must_use]
pub fn resolve_group(wanted: &str, groups: &[String]) -> String {
    if wanted == ALL_GROUPS || groups.iter().any(|group| group == wanted) {
        wanted.to_owned()
    } else {
        ALL_GROUPS.to_owned()
    }
}

/// Lessons to show for a day and a group, within the visible days
#[must_use]
pub fn lessons<'a>(
    lessons: &'a [Lesson],
    selection: &Selection,
    group: &str,
    visible: &[String],
) -> Vec<&'a Lesson> {
    lessons
        .iter()
        .filter(|lesson| match selection {
            Selection::Week => true,
            Selection::Day(date) => lesson.date == *date,
        })
        .filter(|lesson| group == ALL_GROUPS || lesson.group == group || lesson.group == ALL_GROUPS)
        .filter(|lesson| visible.contains(&lesson.date))
        .collect()
}

/// Ask the user for its group when the timetable has more than one
///
/// # Errors
/// Fails when the prompt can't be shown
pub fn group(groups: &[String]) -> Result<String> {
    if groups.len() < 2 {
        return Ok(ALL_GROUPS.to_owned());
    }

    let mut items = vec![ALL_GROUPS.to_owned()];
    items.extend(groups.iter().filter(|group| *group != ALL_GROUPS).cloned());

    let selection = Select::new()
        .with_prompt("Choose your group")
        .items(&items[..])
        .default(0)
        .interact()?;

    Ok(items.swap_remove(selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str) -> NaiveDate {
        parse_date(date)
    }

    const DATES: [&str; 5] = [
        "2025.01.01",
        "2025.01.02",
        "2025.01.03",
        "2025.01.10",
        "2025.01.11",
    ];

    #[test]
    fn two_days_of_history() {
        let window = window(DATES, day("2025.01.10"));

        assert_eq!(
            window.visible,
            vec!["2025.01.02", "2025.01.03", "2025.01.10", "2025.01.11"]
        );
        assert_eq!(window.selection, Selection::Day("2025.01.10".to_owned()));
    }

    #[test]
    fn upcoming_is_next_day() {
        let window = window(DATES, day("2025.01.05"));

        assert_eq!(window.visible, DATES[1..].to_vec());
        assert_eq!(window.selection, Selection::Day("2025.01.10".to_owned()));
    }

    #[test]
    fn today_among_first_days_keeps_all() {
        let window = window(DATES, day("2025.01.03"));

        assert_eq!(window.visible, DATES.to_vec());
        assert_eq!(window.selection, Selection::Day("2025.01.03".to_owned()));
    }

    #[test]
    fn everything_in_the_past() {
        let window = window(DATES, day("2025.02.01"));

        assert_eq!(window.visible, vec!["2025.01.10", "2025.01.11"]);
        assert_eq!(window.selection, Selection::Day("2025.01.11".to_owned()));
    }

    #[test]
    fn few_past_days_are_kept() {
        let window = window(["2025.01.02", "2025.01.01"], day("2025.02.01"));

        assert_eq!(window.visible, vec!["2025.01.01", "2025.01.02"]);
        assert_eq!(window.selection, Selection::Day("2025.01.02".to_owned()));
    }

    #[test]
    fn no_date_is_the_week() {
        let window = window([], day("2025.02.01"));

        assert!(window.visible.is_empty());
        assert_eq!(window.selection, Selection::Week);
    }

    #[test]
    fn dates_are_sorted_and_distinct() {
        let window = window(
            ["2025.01.11", "garbage", "2025.01.10", "2025.01.11"],
            day("2025.01.01"),
        );

        // Unreadable dates are the oldest
        assert_eq!(window.visible, vec!["garbage", "2025.01.10", "2025.01.11"]);
        assert_eq!(window.selection, Selection::Day("2025.01.10".to_owned()));
    }

    fn lesson(date: &str, group: &str) -> Lesson {
        Lesson {
            date: date.to_owned(),
            group: group.to_owned(),
            subject: "Law (W)".to_owned(),
            lecturer: "Nowak".to_owned(),
            short_name: "LAW".to_owned(),
            id: None,
            category: crate::timetable::models::Category::Lecture,
            room: None,
            start: "08:00".to_owned(),
            end: "09:30".to_owned(),
        }
    }

    #[test]
    fn groups_are_sorted() {
        let lessons = [
            lesson("2025.01.10", "126/2"),
            lesson("2025.01.10", "126/1"),
            lesson("2025.01.11", "126/2"),
            lesson("2025.01.11", ""),
        ];

        assert_eq!(groups(&lessons), vec!["126/1", "126/2"]);
    }

    #[test]
    fn unknown_group_falls_back() {
        let groups = vec!["126/1".to_owned()];

        assert_eq!(resolve_group("126/1", &groups), "126/1");
        assert_eq!(resolve_group("999", &groups), ALL_GROUPS);
    }

    #[test]
    fn lessons_of_a_group() {
        let all = [
            lesson("2025.01.10", "126/1"),
            lesson("2025.01.10", "126/2"),
            lesson("2025.01.10", ALL_GROUPS),
            lesson("2025.01.11", "126/1"),
            lesson("2024.12.01", "126/1"),
        ];
        let visible = vec!["2025.01.10".to_owned(), "2025.01.11".to_owned()];

        let day = lessons(&all, &Selection::from("2025.01.10"), "126/1", &visible);
        assert_eq!(day.len(), 2);

        let week = lessons(&all, &Selection::Week, "126/1", &visible);
        assert_eq!(week.len(), 3);

        let everyone = lessons(&all, &Selection::Week, ALL_GROUPS, &visible);
        assert_eq!(everyone.len(), 4);
    }
}
