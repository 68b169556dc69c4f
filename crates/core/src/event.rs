use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use rrule::RRuleSet;

use crate::{
	course::CourseMeeting,
	days::{extract_weekdays, WeekdaySet},
	error::{Error, Result},
	occurrence::first_meeting,
	quarter::{QuarterInfo, QuarterTable, UNTIL_FORMAT},
	time::{normalize_time, TimeRange},
	TZ,
};

/// Prefixed to every room so map apps resolve the right campus.
pub const CAMPUS: &str = "University of Washington";

/// Local date-times (`DTSTART;TZID=...`, deep-link `dates`) use this layout.
pub const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Weekly repetition on the class days until the end of the quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
	pub days: WeekdaySet,
	pub until: DateTime<Utc>,
}

impl Recurrence {
	/// The RRULE value, without the `RRULE:` name.
	#[must_use]
	pub fn rule(&self) -> String {
		format!(
			"FREQ=WEEKLY;BYDAY={};UNTIL={}",
			self.days.byday(),
			self.until.format(UNTIL_FORMAT)
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
	pub title: String,
	pub description: String,
	pub location: String,
	/// Date of the first meeting.
	pub date: NaiveDate,
	/// `None` when the time label could not be read at all.
	pub times: Option<TimeRange>,
	pub timezone: Tz,
	pub recurrence: Recurrence,
}

impl CalendarEvent {
	#[must_use]
	pub fn start(&self) -> Option<NaiveDateTime> {
		self.times.map(|t| self.date.and_time(t.start.as_naive()))
	}

	#[must_use]
	pub fn end(&self) -> Option<NaiveDateTime> {
		self.times.map(|t| self.date.and_time(t.end.as_naive()))
	}

	/// Start as `YYYYMMDDTHHMMSS`, or empty when the time is unknown.
	#[must_use]
	pub fn start_stamp(&self) -> String {
		self.start()
			.map(|dt| dt.format(LOCAL_FORMAT).to_string())
			.unwrap_or_default()
	}

	/// End as `YYYYMMDDTHHMMSS`, or empty when the time is unknown.
	#[must_use]
	pub fn end_stamp(&self) -> String {
		self.end()
			.map(|dt| dt.format(LOCAL_FORMAT).to_string())
			.unwrap_or_default()
	}

	/// Start times of the first `limit` meetings, in local time.
	///
	/// # Errors
	///
	/// Returns [`Error::Recurrence`] if the generated rule does not parse.
	pub fn meetings(&self, limit: u16) -> Result<Vec<NaiveDateTime>> {
		let Some(start) = self.start() else {
			return Ok(Vec::new());
		};

		let set = format!(
			"DTSTART;TZID={}:{}\nRRULE:{}",
			self.timezone.name(),
			start.format(LOCAL_FORMAT),
			self.recurrence.rule()
		)
		.parse::<RRuleSet>()
		.map_err(|e| Error::Recurrence(e.to_string()))?;

		Ok(set.all(limit).dates.iter().map(DateTime::naive_local).collect())
	}
}

fn description(instructor: &str) -> String {
	let instructor = instructor.trim();

	if instructor.is_empty() || instructor == "TBA" {
		String::new()
	} else {
		format!("Instructor: {instructor}")
	}
}

/// Turns one schedule row into a calendar event for the given quarter.
///
/// An unreadable time label is logged and leaves the event without times;
/// a row without any class day is rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] when `meeting.days` names no weekday or
/// the quarter table has a day that does not exist in `quarter.year`.
pub fn build_event(
	meeting: &CourseMeeting,
	quarter: QuarterInfo,
	table: &QuarterTable,
	today: NaiveDate,
) -> Result<CalendarEvent> {
	let days = extract_weekdays(&meeting.days);

	if days.is_empty() {
		return Err(Error::invalid(format!(
			"{}: no class days in {:?}",
			meeting.course_number, meeting.days
		)));
	}

	let times = normalize_time(&meeting.time)
		.inspect_err(|err| warn!("{}: {err}", meeting.course_number))
		.ok();

	let quarter_start = table.start_date(quarter.quarter, quarter.year)?;
	let date = first_meeting(quarter_start, &days, today);
	let until = table.end_instant(quarter.quarter, quarter.year)?;

	debug!(
		"{} in {quarter}: first meeting {date}, until {until}",
		meeting.course_number
	);

	Ok(CalendarEvent {
		title: meeting.course_number.clone(),
		description: description(&meeting.instructor),
		location: format!("{CAMPUS}, {}", meeting.location),
		date,
		times,
		timezone: TZ,
		recurrence: Recurrence { days, until },
	})
}
