pub mod error;
pub mod filter;
pub mod timetable;
pub mod tree;
pub mod utils;

pub use filter::{window as select_visible_window, DayWindow, Selection};
pub use timetable::extract_schedule;
pub use tree::extract_navigation_tree;
