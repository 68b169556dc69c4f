#![warn(clippy::pedantic)]

//! Bindings for the extension's content script. The script scrapes the row
//! and the page heading, and passes them here as plain strings; everything
//! that touches the DOM stays on the JavaScript side.

use chrono::NaiveDate;
use log::warn;
use uwcal_core::{
	academic, build_event, course::page_heading, CalendarEvent, CourseMeeting, Error, Quarter,
	QuarterInfo, QuarterTable,
};
use wasm_bindgen::prelude::{wasm_bindgen, JsError};

fn parse_today(today: &str) -> Result<NaiveDate, JsError> {
	if today.is_empty() {
		return Ok(uwcal_core::today());
	}

	today
		.parse()
		.map_err(|err| JsError::new(&format!("invalid date {today:?}: {err}")))
}

fn event_for(
	course_json: &str,
	heading: &str,
	page_url: &str,
	today: &str,
) -> Result<CalendarEvent, JsError> {
	let course: CourseMeeting = serde_json::from_str(course_json)?;
	let today = parse_today(today)?;
	let quarter = QuarterInfo::detect(Some(heading), Some(page_url), today);

	Ok(build_event(&course, quarter, &QuarterTable::default(), today)?)
}

/// Google Calendar link for one course row, given as JSON
/// (`{"courseNumber", "instructor", "location", "days", "time"}`).
/// An empty `today` means the current date on campus.
#[wasm_bindgen]
pub fn google_calendar_url(
	course_json: &str,
	heading: &str,
	page_url: &str,
	today: &str,
) -> Result<String, JsError> {
	let event = event_for(course_json, heading, page_url, today)?;

	Ok(uwcal_core::google_calendar_url(&event))
}

/// ICS file contents for one course row. See [`google_calendar_url`].
#[wasm_bindgen]
pub fn ics_document(
	course_json: &str,
	heading: &str,
	page_url: &str,
	today: &str,
) -> Result<String, JsError> {
	let event = event_for(course_json, heading, page_url, today)?;

	Ok(uwcal_core::to_ics(&event)?)
}

#[wasm_bindgen]
#[must_use]
pub fn ics_filename(course_number: &str) -> String {
	uwcal_core::ics_filename(course_number)
}

#[wasm_bindgen]
#[must_use]
pub fn ics_mime_type() -> String {
	uwcal_core::export::ICS_MIME.to_string()
}

/// One calendar holding every course on a saved registration page.
#[wasm_bindgen]
pub fn from_html(html: &str, page_url: &str, today: &str) -> Result<String, JsError> {
	let events = schedule_events(html, page_url, parse_today(today)?)?;

	Ok(uwcal_core::create_calendar(&events).to_string())
}

/// Rows that cannot become an event are skipped with a warning. A page whose
/// rows were all skipped is an error, unlike a page with no rows at all.
fn schedule_events(
	html: &str,
	page_url: &str,
	today: NaiveDate,
) -> uwcal_core::Result<Vec<CalendarEvent>> {
	let heading = page_heading(html);
	let quarter = QuarterInfo::detect(heading.as_deref(), Some(page_url), today);
	let table = QuarterTable::default();
	let courses = uwcal_core::parse_schedule(html)?;

	let events = courses
		.iter()
		.filter_map(|course| {
			build_event(course, quarter, &table, today)
				.inspect_err(|err| warn!("skipping {}: {err}", course.course_number))
				.ok()
		})
		.collect::<Vec<_>>();

	if events.is_empty() && !courses.is_empty() {
		return Err(Error::InvalidFormat(format!(
			"none of the {} courses on the page could be scheduled",
			courses.len()
		)));
	}

	Ok(events)
}

/// Built-in first day of `quarter` as `YYYY-MM-DD`. Unknown names read as Autumn.
#[wasm_bindgen]
pub fn quarter_start(quarter: &str, year: i32) -> Result<String, JsError> {
	let quarter = Quarter::from_name_or_autumn(quarter);

	Ok(QuarterTable::default().start_date(quarter, year)?.to_string())
}

/// Built-in RRULE `UNTIL` value for `quarter`. Unknown names read as Autumn.
#[wasm_bindgen]
pub fn quarter_end_timestamp(quarter: &str, year: i32) -> Result<String, JsError> {
	let quarter = Quarter::from_name_or_autumn(quarter);

	Ok(QuarterTable::default().end_timestamp(quarter, year)?)
}

#[wasm_bindgen]
#[must_use]
pub fn calendar_url(end_year: i32) -> String {
	uwcal_core::calendar_url(end_year)
}

/// Instruction dates for `quarter` as `{"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}`,
/// from calendar page HTML the extension fetched itself.
#[wasm_bindgen]
pub fn parse_quarter_dates(html: &str, quarter: &str) -> Result<String, JsError> {
	let quarter = quarter.parse::<Quarter>()?;
	let dates = academic::parse_quarter_dates(html, quarter)?;

	Ok(serde_json::json!({
		"start": dates.start.to_string(),
		"end": dates.end.to_string(),
	})
	.to_string())
}
