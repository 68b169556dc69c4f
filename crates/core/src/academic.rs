//! Quarter dates from the registrar's published academic calendar.
//!
//! The page has a "Dates of Instruction" table with one column per quarter.
//! Fetching it is left to a [`PageFetcher`] supplied by the caller.

use std::future::Future;

use chrono::NaiveDate;
use log::{debug, warn};
use select::{
	document::Document,
	node::Node,
	predicate::{Attr, Class, Descendant, Name, Predicate},
};

use crate::{
	error::{Error, Result},
	quarter::{MonthDay, Quarter, QuarterInfo, QuarterRow},
};

pub const REGISTRAR_CALENDAR_BASE: &str = "https://www.washington.edu/students/reg/";

/// Total attempts per page, the first one included.
pub const FETCH_ATTEMPTS: u32 = 2;

const INSTRUCTION_BEGINS: &str = "Instruction Begins";
const LAST_DAY_OF_INSTRUCTION: &str = "Last Day of Instruction";

const DATE_FORMATS: [&str; 4] = ["%b %d, %Y", "%B %d, %Y", "%m/%d/%Y", "%Y-%m-%d"];

/// Calendar page for the academic year ending in `end_year`, e.g. `2526cal.html`
/// for 2026.
#[must_use]
pub fn calendar_url(end_year: i32) -> String {
	let yy = |year: i32| year.rem_euclid(100);

	format!(
		"{REGISTRAR_CALENDAR_BASE}{:02}{:02}cal.html",
		yy(end_year - 1),
		yy(end_year)
	)
}

fn column(quarter: Quarter) -> usize {
	match quarter {
		Quarter::Autumn => 1,
		Quarter::Winter => 2,
		Quarter::Spring => 3,
		Quarter::Summer => 4,
	}
}

fn parse_cell_date(text: &str) -> Option<NaiveDate> {
	let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

	DATE_FORMATS
		.iter()
		.find_map(|format| NaiveDate::parse_and_remainder(&text, format).ok())
		.map(|(date, _)| date)
}

fn instruction_table(document: &Document) -> Option<Node<'_>> {
	document
		.find(Name("table").and(Attr("id", "SUMFE").or(Class("table-striped"))))
		.next()
}

fn find_date(html: &str, row_label: &str, quarter: Quarter) -> Option<NaiveDate> {
	let document = Document::from(html);
	let Some(table) = instruction_table(&document) else {
		debug!("no dates of instruction table");
		return None;
	};

	let row = table
		.find(Descendant(Name("tbody"), Name("tr")))
		.filter(|row| row.text().contains(row_label))
		.last()?;
	let cell = row.find(Name("td").or(Name("th"))).nth(column(quarter))?;
	let date = parse_cell_date(&cell.text());

	if date.is_none() {
		warn!("unreadable {quarter} date in {row_label:?}: {:?}", cell.text().trim());
	}

	date
}

/// First day of instruction for `quarter`, if the page lists one.
#[must_use]
pub fn parse_quarter_start(html: &str, quarter: Quarter) -> Option<NaiveDate> {
	find_date(html, INSTRUCTION_BEGINS, quarter)
}

/// Last day of instruction for `quarter`, if the page lists one.
#[must_use]
pub fn parse_quarter_end(html: &str, quarter: Quarter) -> Option<NaiveDate> {
	find_date(html, LAST_DAY_OF_INSTRUCTION, quarter)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterDates {
	pub start: NaiveDate,
	pub end: NaiveDate,
}

impl QuarterDates {
	/// The dates as a row for a custom [`QuarterTable`](crate::QuarterTable).
	#[must_use]
	pub fn to_row(self) -> QuarterRow {
		QuarterRow {
			start: MonthDay::of(self.start),
			end: MonthDay::of(self.end),
		}
	}
}

/// Both instruction dates for `quarter`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when either date is missing from the page.
pub fn parse_quarter_dates(html: &str, quarter: Quarter) -> Result<QuarterDates> {
	let start = parse_quarter_start(html, quarter)
		.ok_or_else(|| Error::not_found(format!("{quarter} {INSTRUCTION_BEGINS}")))?;
	let end = parse_quarter_end(html, quarter)
		.ok_or_else(|| Error::not_found(format!("{quarter} {LAST_DAY_OF_INSTRUCTION}")))?;

	Ok(QuarterDates { start, end })
}

/// Retrieves page HTML. Implementations report failures as [`Error::Fetch`].
pub trait PageFetcher {
	fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>>;
}

/// Fetches `url`, trying again once before giving up.
///
/// # Errors
///
/// Returns the fetcher's last error.
pub async fn fetch_page_with_retry<F: PageFetcher>(fetcher: &F, url: &str) -> Result<String> {
	let mut attempt = 1;

	loop {
		match fetcher.fetch_page(url).await {
			Ok(html) => return Ok(html),
			Err(err) if attempt < FETCH_ATTEMPTS => {
				warn!("attempt {attempt} to fetch {url} failed: {err}");
				attempt += 1;
			}
			Err(err) => return Err(err),
		}
	}
}

/// Looks up the instruction dates of `quarter` on the registrar's calendar.
///
/// # Errors
///
/// Returns [`Error::Fetch`] when the page cannot be retrieved and
/// [`Error::NotFound`] when it does not list the quarter.
pub async fn fetch_quarter_dates<F: PageFetcher>(
	fetcher: &F,
	quarter: QuarterInfo,
) -> Result<QuarterDates> {
	let url = calendar_url(quarter.academic_year());
	debug!("fetching {quarter} dates from {url}");

	let html = fetch_page_with_retry(fetcher, &url).await?;

	parse_quarter_dates(&html, quarter.quarter)
}
