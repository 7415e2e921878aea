use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::models::Category;

/// Room numbers: `209D`, `101`, `A1`, `3/14`
static ROOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+[a-zA-Z]?|[a-zA-Z]\d+|\d+/\d+)$").unwrap());

static EXERCISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\([cć]\)").unwrap());

/// What could be guessed from the content of a cell
#[derive(Debug, PartialEq, Eq)]
pub struct Classified {
    pub subject: String,
    pub lecturer: String,
    pub category: Category,
    pub room: Option<String>,
}

/// Classify a cell from its link's title, the text around the link and the link's label
#[must_use]
pub fn classify(title: &str, residual: &str, short_name: &str) -> Classified {
    let (subject, lecturer) = split_title(title);
    let category = category(&subject);
    let room = room(residual).or_else(|| room_from_label(short_name));

    Classified {
        subject,
        lecturer,
        category,
        room,
    }
}

/// Split `Subject (Lecturer)` on its last parenthesis
#[must_use]
pub fn split_title(title: &str) -> (String, String) {
    match title.rfind('(') {
        Some(index) => {
            let inside = &title[index + 1..];
            let lecturer = inside.rfind(')').map_or(inside, |end| &inside[..end]);

            (title[..index].trim().to_owned(), lecturer.trim().to_owned())
        }
        None => (title.trim().to_owned(), String::new()),
    }
}

/// Find the type of lesson from the markers of the subject
#[must_use]
pub fn category(subject: &str) -> Category {
    if subject.contains("(W)") {
        Category::Lecture
    } else if subject.contains("(L)") {
        Category::Lab
    } else if EXERCISE.is_match(subject) {
        Category::Exercise
    } else if subject.contains("(P)") {
        Category::Project
    } else if subject.contains("(S)") {
        Category::Seminar
    } else {
        Category::Other
    }
}

/// Find the room in the text of a cell, it's always the last word
#[must_use]
pub fn room(residual: &str) -> Option<String> {
    if let Some(token) = residual.split_whitespace().last().filter(|token| is_room(token)) {
        return Some(token.to_owned());
    }

    if is_online(residual) {
        trace!("Online lesson: {residual}");
    }

    None
}

/// Some cells only print the room in the link's label, e.g. `TINF 209D`
fn room_from_label(short_name: &str) -> Option<String> {
    let tokens: Vec<_> = short_name.split_whitespace().collect();
    match tokens.as_slice() {
        [_, .., last] if is_room(last) => Some((*last).to_owned()),
        _ => None,
    }
}

fn is_room(token: &str) -> bool {
    ROOM.is_match(token)
}

/// True when the text says the lesson is held remotely
fn is_online(residual: &str) -> bool {
    let lower = residual.to_lowercase();
    lower.contains("zda") || lower.contains("online")
}
