use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use dialoguer::Select;
use tracing::Level;

use planue::error::{Error, Result};
use planue::filter::{self, Selection, DATE_FORMAT};
use planue::timetable;
use planue::tree::{self, models::NavigationNode};
use planue::utils::Upstream;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Schedule selector, skips the course directory when given with `--gr`
    #[clap(long, value_name = "SE", requires = "gr")]
    se: Option<String>,

    /// Group selector, i.e.: 126/1
    #[clap(long, value_name = "GR", requires = "se")]
    gr: Option<String>,

    /// Read the timetable from a local HTML file
    #[clap(short, long, value_name = "FILE", conflicts_with = "se")]
    file: Option<PathBuf>,

    /// Read the course directory from a local file
    #[clap(long, value_name = "FILE")]
    tree_file: Option<PathBuf>,

    /// Only show the lessons of this group, default to asking
    #[clap(short, long, value_name = "GROUP")]
    group: Option<String>,

    /// Day to show (YYYY.MM.DD or "week"), default to the next day with lessons
    #[clap(short, long, value_name = "DAY")]
    day: Option<String>,

    /// Date used as today (YYYY.MM.DD)
    #[clap(short, long, value_parser = parse_day, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Export the lessons to a JSON file
    #[clap(short, long, value_name = "FILE NAME")]
    export: Option<PathBuf>,

    /// Server hosting the timetables
    #[clap(long, value_name = "URL", default_value = "https://plan.ue.wroc.pl/")]
    base_url: String,

    /// More logs, can be repeated
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_day(day: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(day, DATE_FORMAT)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(args).await {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let user_agent = format!("planue/{}", env!("CARGO_PKG_VERSION"));
    let upstream = Upstream::new(&args.base_url, &user_agent)?;

    let lessons = match (&args.file, &args.se, &args.gr) {
        (Some(path), _, _) => {
            let html = tokio::fs::read_to_string(path).await?;
            timetable::extract_schedule(&html)?
        }
        (None, Some(se), Some(gr)) => timetable::timetable(&upstream, se, gr).await?,
        _ => {
            let forest = match &args.tree_file {
                Some(path) => {
                    let source = tokio::fs::read_to_string(path).await?;
                    tree::extract_navigation_tree(&source)
                }
                None => {
                    println!("Fetching the course directory...");
                    tree::tree(&upstream).await?
                }
            };

            let node = navigate(&forest)?;
            println!("Fetching the timetable of {}...", node.full_label);
            let (se, gr) = node.selectors().ok_or_else(|| Error::NoLeafSelected {
                label: node.full_label.clone(),
            })?;
            timetable::timetable(&upstream, se, gr).await?
        }
    };

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let window = filter::lessons_window(&lessons, today);

    let (selection, visible) = match args.day.as_deref() {
        None => (window.selection, window.visible),
        // A forced day may be older than the window, show every day
        Some(day) => (
            Selection::from(day),
            filter::lessons_window(&lessons, NaiveDate::MIN).visible,
        ),
    };

    let groups = filter::groups(&lessons);
    let group = match &args.group {
        Some(wanted) => filter::resolve_group(wanted, &groups),
        None => filter::group(&groups)?,
    };

    let shown = filter::lessons(&lessons, &selection, &group, &visible);

    if let Some(filename) = args.export {
        // Export the lessons
        tokio::fs::write(&filename, serde_json::to_string_pretty(&shown)?).await?;
        println!("{} lessons exported => {}", shown.len(), filename.display());
    } else {
        println!("{selection} • group {group}");
        timetable::display(&shown);
    }

    Ok(())
}

/// Walk the course directory until an entry with a timetable is chosen
fn navigate(forest: &[NavigationNode]) -> Result<&NavigationNode> {
    let mut level = forest;
    let mut parent = "Course directory".to_owned();

    loop {
        if level.is_empty() {
            return Err(Error::NoLeafSelected { label: parent });
        }

        let labels: Vec<_> = level.iter().map(|node| node.label.as_str()).collect();
        let choice = Select::new()
            .with_prompt(&parent)
            .items(&labels[..])
            .default(0)
            .interact()?;

        let node = &level[choice];
        if node.children.is_empty() {
            return Ok(node);
        }

        level = &node.children;
        parent = node.full_label.clone();
    }
}
