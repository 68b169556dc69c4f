#![warn(clippy::pedantic)]

mod config;
mod fetch;

use std::{
	collections::HashSet,
	fs::{self, File},
	io::{self, Read, Write},
	path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};
use uwcal_core::{
	build_event, calendar_url, course::page_heading, create_calendar, fetch_quarter_dates,
	google_calendar_url, ics_filename, parse_schedule, quarter::MonthDay, to_ics, CalendarEvent,
	Quarter, QuarterInfo, QuarterTable,
};

use crate::fetch::HttpFetcher;

#[derive(Parser)]
#[clap(version, about)]
struct Cli {
	#[clap(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Write an ICS file for every scheduled course.
	Ics {
		#[clap(flatten)]
		schedule: ScheduleArgs,
		/// Directory to write the files to. Prints to stdout when omitted.
		#[clap(short, long, value_hint = clap::ValueHint::DirPath)]
		output: Option<PathBuf>,
		/// Put every course in a single calendar.
		#[clap(long)]
		combined: bool,
	},
	/// Print a Google Calendar link for every scheduled course.
	Links {
		#[clap(flatten)]
		schedule: ScheduleArgs,
	},
	/// Look up instruction dates on the registrar's academic calendar.
	QuarterDates {
		#[clap(long)]
		quarter: Quarter,
		#[clap(long)]
		year: i32,
		/// Number of consecutive quarters to list.
		#[clap(long, default_value_t = 1)]
		count: usize,
	},
}

#[derive(Args)]
struct ScheduleArgs {
	/// Saved registration page. Reads stdin when omitted.
	#[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
	path: Option<PathBuf>,
	/// Quarter of the schedule, instead of reading it from the page.
	#[clap(long, requires = "year")]
	quarter: Option<Quarter>,
	#[clap(long, requires = "quarter")]
	year: Option<i32>,
	/// Address the page was saved from, used to detect the quarter.
	#[clap(long)]
	url: Option<String>,
	/// Pretend today is this date (YYYY-MM-DD).
	#[clap(long)]
	today: Option<NaiveDate>,
	/// TOML file overriding the built-in quarter dates.
	#[clap(long, value_hint = clap::ValueHint::FilePath)]
	quarters: Option<PathBuf>,
	/// Take the quarter's dates from the registrar's academic calendar.
	#[clap(long)]
	fetch_dates: bool,
	/// Also list the first N meetings of each course on stderr.
	#[clap(long, value_name = "N")]
	preview: Option<u16>,
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
	let mut html = String::new();

	if let Some(path) = path {
		File::open(path)
			.with_context(|| format!("failed to open {}", path.display()))?
			.read_to_string(&mut html)?;
	} else {
		io::stdin().read_to_string(&mut html)?;
	}

	Ok(html)
}

async fn load_events(args: &ScheduleArgs) -> anyhow::Result<Vec<CalendarEvent>> {
	let html = read_input(args.path.as_deref())?;
	let today = args.today.unwrap_or_else(uwcal_core::today);
	let quarter = match (args.quarter, args.year) {
		(Some(quarter), Some(year)) => QuarterInfo::new(quarter, year),
		_ => QuarterInfo::detect(page_heading(&html).as_deref(), args.url.as_deref(), today),
	};

	let mut table = match &args.quarters {
		Some(path) => config::load_quarter_table(path)?,
		None => QuarterTable::default(),
	};

	if args.fetch_dates {
		match fetch_quarter_dates(&HttpFetcher::new()?, quarter).await {
			Ok(dates) => table.set_row(quarter.quarter, dates.to_row()),
			Err(err) => warn!("keeping the quarter table dates for {quarter}: {err}"),
		}
	}

	info!("building events for {quarter}, today is {today}");

	let courses = parse_schedule(&html).context("failed to read the schedule page")?;
	let events = courses
		.iter()
		.filter_map(|course| {
			build_event(course, quarter, &table, today)
				.inspect_err(|err| warn!("skipping {}: {err}", course.course_number))
				.ok()
		})
		.collect::<Vec<_>>();

	if let Some(limit) = args.preview {
		for event in &events {
			print_preview(event, limit);
		}
	}

	Ok(events)
}

fn print_preview(event: &CalendarEvent, limit: u16) {
	match event.meetings(limit) {
		Ok(meetings) => {
			eprintln!("{}:", event.title);
			for meeting in meetings {
				eprintln!("  {}", meeting.format("%a %Y-%m-%d %H:%M"));
			}
		}
		Err(err) => warn!("{}: {err}", event.title),
	}
}

/// File name for `title`, numbered when an earlier course already took it.
fn unique_name(title: &str, taken: &mut HashSet<String>) -> String {
	let name = ics_filename(title);
	if taken.insert(name.clone()) {
		return name;
	}

	let stem = name.trim_end_matches(".ics");
	let mut n = 2;
	loop {
		let numbered = format!("{stem}_{n}.ics");
		if taken.insert(numbered.clone()) {
			warn!("{title} appears more than once, writing it to {numbered}");
			return numbered;
		}
		n += 1;
	}
}

fn write_ics(events: &[CalendarEvent], output: Option<&Path>, combined: bool) -> anyhow::Result<()> {
	let documents = if combined {
		vec![("schedule.ics".to_string(), create_calendar(events).to_string())]
	} else {
		let mut taken = HashSet::new();

		events
			.iter()
			.map(|event| Ok((unique_name(&event.title, &mut taken), to_ics(event)?)))
			.collect::<anyhow::Result<Vec<_>>>()?
	};

	let Some(dir) = output else {
		let mut stdout = io::stdout().lock();
		for (_, document) in documents {
			write!(stdout, "{document}")?;
		}
		return Ok(());
	};

	fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

	for (name, document) in documents {
		let path = dir.join(name);
		fs::write(&path, document).with_context(|| format!("failed to write {}", path.display()))?;
		info!("wrote {}", path.display());
	}

	Ok(())
}

async fn print_quarter_dates(quarter: Quarter, year: i32, count: usize) -> anyhow::Result<()> {
	let fetcher = HttpFetcher::new()?;
	let mut info = QuarterInfo::new(quarter, year);

	for _ in 0..count {
		match fetch_quarter_dates(&fetcher, info).await {
			Ok(dates) => {
				println!("# {info}: {} to {}", dates.start, dates.end);
				println!("# {}", calendar_url(info.academic_year()));
				println!("[{}]", info.quarter.to_string().to_lowercase());
				println!("start = \"{}\"", MonthDay::of(dates.start));
				println!("end = \"{}\"", MonthDay::of(dates.end));
				println!();
			}
			Err(err) => warn!("{info}: {err}"),
		}

		info = info.next();
	}

	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::new()
		.filter_level(LevelFilter::Warn)
		.parse_default_env()
		.init();

	match Cli::parse().command {
		Command::Ics {
			schedule,
			output,
			combined,
		} => {
			let events = load_events(&schedule).await?;
			write_ics(&events, output.as_deref(), combined)
		}
		Command::Links { schedule } => {
			for event in load_events(&schedule).await? {
				println!("{}: {}", event.title, google_calendar_url(&event));
			}
			Ok(())
		}
		Command::QuarterDates {
			quarter,
			year,
			count,
		} => print_quarter_dates(quarter, year, count).await,
	}
}
