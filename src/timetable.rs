use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html, Selector};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::utils::{self, format_time_slot, models::Position, Upstream};

use self::classify::{classify, Classified};
use self::models::{GroupOption, Lesson, ALL_GROUPS};

pub mod classify;
pub mod models;

// Selectors
static SEL_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table.h3").unwrap());
static SEL_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("table.h3 tr").unwrap());
static SEL_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SEL_GROUPS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"select[name="grupa"]"#).unwrap());
static SEL_OPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("option").unwrap());

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}\.\d{2}\.\d{2}").unwrap());
static ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=(\d+)").unwrap());
/// Any tag, doctype or comment
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z!/?]").unwrap());

/// Class of the cells holding a lesson
const CLASS_LESSON: &str = "p1";
/// Class of the cells naming a group
const CLASS_GROUP: &str = "h2";
/// Class of the header cells
const CLASS_HEADER: &str = "h1";

/// Fetch and extract the timetable of a selector pair
///
/// # Errors
/// Fails when the page can't be fetched or holds no timetable
pub async fn timetable(upstream: &Upstream, se: &str, gr: &str) -> Result<Vec<Lesson>> {
    let url = upstream.plan_url(se, gr)?;
    let html = upstream.get_webpage(&url).await?;

    let document = document(&html)?;
    if document.select(&SEL_TABLE).next().is_none() {
        return Err(Error::NoTimetable {
            url: url.to_string(),
        });
    }

    let lessons = lessons(&document);
    info!("{} lessons found for se={se} gr={gr}", lessons.len());

    Ok(lessons)
}

/// Extract all the lessons of a timetable page, in the order of the table
///
/// # Errors
/// Fails only when the input holds text but no markup at all
pub fn extract_schedule(html: &str) -> Result<Vec<Lesson>> {
    Ok(lessons(&document(html)?))
}

/// Extract the choices of the group `<select>` of a page
///
/// # Errors
/// Fails only when the input holds text but no markup at all
pub fn extract_groups(html: &str) -> Result<Vec<GroupOption>> {
    let document = document(html)?;

    let Some(select) = document.select(&SEL_GROUPS).next() else {
        return Ok(vec![]);
    };

    Ok(select
        .select(&SEL_OPTION)
        .filter_map(|option| {
            let label = text(option);
            // Without attribute, the value is the label
            let value = option
                .value()
                .attr("value")
                .map_or_else(|| label.clone(), str::to_owned);

            (!value.is_empty() && !label.is_empty()).then_some(GroupOption { value, label })
        })
        .collect())
}

/// Display the lessons, one table per day
pub fn display(lessons: &[&Lesson]) {
    if lessons.is_empty() {
        println!("No lesson to show");
        return;
    }

    let widths = [11, 32, 8, 6, 8, 24];

    let mut sorted = lessons.to_vec();
    sorted.sort_by(|a, b| (&a.date, &a.start).cmp(&(&b.date, &b.start)));

    for day in sorted.chunk_by(|a, b| a.date == b.date) {
        println!("\n{}", day[0].date);
        utils::line_table(&widths, &Position::Top);
        utils::row_table(
            &widths,
            &["Time", "Subject", "Type", "Room", "Group", "Lecturer"],
        );
        utils::line_table(&widths, &Position::Middle);

        for lesson in day {
            let time = format!("{}-{}", lesson.start, lesson.end);
            let category = lesson.category.to_string();
            utils::row_table(
                &widths,
                &[
                    time.as_str(),
                    lesson.subject.as_str(),
                    category.as_str(),
                    lesson.room.as_deref().unwrap_or("-"),
                    lesson.group.as_str(),
                    lesson.lecturer.as_str(),
                ],
            );
        }

        utils::line_table(&widths, &Position::Bottom);
    }
}

/// Parse the page, refusing inputs without any markup
fn document(html: &str) -> Result<Html> {
    let document = Html::parse_document(html);

    if !html.trim().is_empty() && !TAG.is_match(html) {
        return Err(Error::NotMarkup);
    }

    Ok(document)
}

/// What is carried from a row to the next one
#[derive(Default)]
struct Extraction {
    /// Last date seen in the table
    current_date: Option<String>,
    lessons: Vec<Lesson>,
}

fn lessons(document: &Html) -> Vec<Lesson> {
    document
        .select(&SEL_ROW)
        .fold(Extraction::default(), read_row)
        .lessons
}

/// Shape of a row of the table
enum Row<'a> {
    /// Hours of the day, repeated header or empty row
    Ignored,
    /// First row of a day
    Dated {
        date: String,
        group: String,
        cells: Vec<ElementRef<'a>>,
    },
    /// Another group of the current day
    Continuation {
        group: String,
        cells: Vec<ElementRef<'a>>,
    },
}

impl<'a> Row<'a> {
    fn read(row: ElementRef<'a>) -> Self {
        let row_text = row.text().collect::<String>();
        if row_text.contains("8:00") && row_text.contains("9:00") {
            return Self::Ignored;
        }

        let mut cells: Vec<_> = row.children().filter_map(ElementRef::wrap).collect();
        let Some(&first) = cells.first() else {
            return Self::Ignored;
        };

        if let Some(date) = DATE.find(&text(first)) {
            // [Date][Group][...Lessons]
            let (group, cells) = if cells.len() > 1 {
                (text(cells[1]), cells.split_off(2))
            } else {
                (ALL_GROUPS.to_owned(), vec![])
            };

            return Self::Dated {
                date: date.as_str().to_owned(),
                group,
                cells,
            };
        }

        if has_class(first, CLASS_GROUP) {
            // [Group][...Lessons]
            return Self::Continuation {
                group: text(first),
                cells: cells.split_off(1),
            };
        }

        if has_class(first, CLASS_HEADER) {
            return Self::Ignored;
        }

        debug!("Row without date nor group, read as lessons of everyone");
        Self::Continuation {
            group: ALL_GROUPS.to_owned(),
            cells,
        }
    }
}

fn read_row(mut state: Extraction, row: ElementRef) -> Extraction {
    let (group, cells) = match Row::read(row) {
        Row::Ignored => return state,
        Row::Dated { date, group, cells } => {
            state.current_date = Some(date);
            (group, cells)
        }
        Row::Continuation { group, cells } => (group, cells),
    };

    let Some(date) = state.current_date.clone() else {
        debug!("Row of group {group} before any date, skipped");
        return state;
    };

    // Every cell moves the column, lesson or not
    let width = cells.into_iter().fold(0_usize, |column, cell| {
        let size = span(cell);
        if let Some(lesson) = read_lesson(cell, &date, &group, column, size) {
            state.lessons.push(lesson);
        }

        column.saturating_add(size)
    });
    trace!("Row of group {group} on {date} spans {width} columns");

    state
}

/// Build the lesson of a cell, if it's one
fn read_lesson(
    cell: ElementRef,
    date: &str,
    group: &str,
    column: usize,
    size: usize,
) -> Option<Lesson> {
    if !has_class(cell, CLASS_LESSON) {
        return None;
    }

    let Some(link) = cell.select(&SEL_LINK).next() else {
        debug!("Lesson cell without link on {date} at column {column}, skipped");
        return None;
    };

    let title = link.value().attr("title").unwrap_or_default();
    let short_name = text(link);
    let id = link
        .value()
        .attr("href")
        .and_then(|href| ID.captures(href))
        .map(|captures| captures[1].to_owned());

    let Classified {
        subject,
        lecturer,
        category,
        room,
    } = classify(title, &residual_text(cell, link), &short_name);

    let (start, end) = format_time_slot(column, size);

    Some(Lesson {
        date: date.to_owned(),
        group: group.to_owned(),
        subject,
        lecturer,
        short_name,
        id,
        category,
        room,
        start,
        end,
    })
}

/// Number of columns taken by a cell
fn span(cell: ElementRef) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|colspan| colspan.trim().parse().ok())
        .unwrap_or(1)
}

fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|name| name == class)
}

/// Trimmed text of an element
fn text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Text of the cell without the link, line breaks read as spaces
fn residual_text(cell: ElementRef, link: ElementRef) -> String {
    let link_id = (*link).id();
    let mut raw = String::new();

    for node in cell.descendants() {
        if node.id() == link_id || node.ancestors().any(|ancestor| ancestor.id() == link_id) {
            continue;
        }

        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(element) if element.name() == "br" => raw.push(' '),
            _ => (),
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
