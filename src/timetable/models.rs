use std::fmt;

use serde::Serialize;

/// Group value of the lessons that apply to everyone
pub const ALL_GROUPS: &str = "All";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lecture,
    Lab,
    Exercise,
    Project,
    Seminar,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lecture => "lecture",
            Self::Lab => "lab",
            Self::Exercise => "exercise",
            Self::Project => "project",
            Self::Seminar => "seminar",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// One scheduled class
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Day of the lesson, as written by the source: `YYYY.MM.DD`
    pub date: String,

    /// Group attending, or `All`
    pub group: String,

    /// Course's name
    pub subject: String,

    /// Professor's name, may be empty
    pub lecturer: String,

    /// Short code shown inside the cell
    pub short_name: String,

    /// Identifier of the course's detail page
    pub id: Option<String>,

    /// Type of the lesson
    #[serde(rename = "type")]
    pub category: Category,

    /// Room where the lesson takes place, `None` when online or unknown
    pub room: Option<String>,

    /// Time the lesson starts, `HH:MM`
    pub start: String,

    /// Time the lesson ends, `HH:MM`
    pub end: String,
}

/// Choice of the group selector of a timetable page
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupOption {
    pub value: String,
    pub label: String,
}
