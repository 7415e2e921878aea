use std::time::Duration;

use tracing::info;
use url::Url;

use crate::error::Result;
use crate::utils::models::{Position, BAR, DASH};

pub mod models;

/// Wall-clock minute of the first column of the timetable (08:00)
const BASE_MINUTES: usize = 8 * 60;

/// Minutes covered by one column of the timetable
const SLOT_MINUTES: usize = 15;

/// Minutes in a day, times are wrapped on it
const DAY_MINUTES: usize = 24 * 60;

/// Columns in a day
const DAY_SLOTS: usize = DAY_MINUTES / SLOT_MINUTES;

/// Page of the upstream server holding the schedule of a group
const PLAN_PAGE: &str = "l_pozycjaplanu1.php";

/// Turn a column offset and a column span into a (start, end) couple of `HH:MM`
///
/// Both values are counted in 15-minute slots from 08:00
#[must_use]
pub fn format_time_slot(start: usize, size: usize) -> (String, String) {
    // Whole days don't change the time, drop them before multiplying
    let start_minutes = BASE_MINUTES + (start % DAY_SLOTS) * SLOT_MINUTES;
    let end_minutes = start_minutes + (size % DAY_SLOTS) * SLOT_MINUTES;

    (format_minutes(start_minutes), format_minutes(end_minutes))
}

fn format_minutes(minutes: usize) -> String {
    let minutes = minutes % DAY_MINUTES;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Where the raw pages come from
pub struct Upstream {
    base_url: Url,
    user_agent: String,
}

impl Upstream {
    /// # Errors
    /// Fails when `base_url` isn't a valid URL
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            user_agent: user_agent.to_owned(),
        })
    }

    /// Address of the index page holding the navigation tree source
    #[must_use]
    pub fn index_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Address of the schedule of a selector pair
    ///
    /// # Errors
    /// Fails when the page can't be joined to the base URL
    pub fn plan_url(&self, se: &str, gr: &str) -> Result<Url> {
        let mut url = self.base_url.join(PLAN_PAGE)?;
        url.query_pairs_mut().append_pair("se", se).append_pair("gr", gr);

        Ok(url)
    }

    /// Get a webpage as text
    ///
    /// # Errors
    /// Fails on network errors and on non-success status codes
    pub async fn get_webpage(&self, url: &Url) -> Result<String> {
        info!("GET {url}");

        // Use custom User-Agent, the server also wants to be its own referer
        let client = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .build()?;
        let html = client
            .get(url.clone())
            .header(reqwest::header::REFERER, self.base_url.as_str())
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(html)
    }
}

/// Cut a string to `length` chars, ending it with an ellipsis when cut
#[must_use]
pub fn etc_str(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_owned();
    }

    let mut cut: String = text.chars().take(length.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Print a separator line of the table
pub fn line_table(widths: &[usize], position: &Position) {
    let (left, middle, right) = position.joints();

    let line = widths
        .iter()
        .map(|width| DASH.to_string().repeat(width + 2))
        .collect::<Vec<_>>()
        .join(&middle.to_string());

    println!("{left}{line}{right}");
}

/// Print a row of the table, cells too long are cut
pub fn row_table(widths: &[usize], cells: &[&str]) {
    print!("{BAR}");
    for (&width, cell) in widths.iter().zip(cells) {
        print!(" {:<width$} {BAR}", etc_str(cell, width));
    }
    println!();
}
