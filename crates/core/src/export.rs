//! Renders a [`CalendarEvent`] as a Google Calendar link or an ICS file.
//!
//! Both formats read the same accessors on the event, so the dates and the
//! recurrence rule are identical in either output.

use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike, Property};
use log::warn;
use url::form_urlencoded;

use crate::{
	event::{CalendarEvent, CAMPUS},
	Result,
};

pub const GOOGLE_EVENT_EDIT: &str = "https://calendar.google.com/calendar/r/eventedit";
pub const PRODUCT_ID: &str = "-//UW Calendar Exporter//EN";
pub const ICS_MIME: &str = "text/calendar";

/// Link that opens Google Calendar's event editor pre-filled with `event`.
#[must_use]
pub fn google_calendar_url(event: &CalendarEvent) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("text", &event.title)
		.append_pair(
			"dates",
			&format!("{}/{}", event.start_stamp(), event.end_stamp()),
		)
		.append_pair("ctz", event.timezone.name())
		.append_pair("details", &event.description)
		.append_pair("location", &event.location)
		.append_pair("recur", &format!("RRULE:{}", event.recurrence.rule()))
		.finish();

	format!("{GOOGLE_EVENT_EDIT}?{query}")
}

fn dated(key: &str, tzid: &str, stamp: String) -> Property {
	Property::new(key, stamp).add_parameter("TZID", tzid).done()
}

/// A single-event calendar file for `event`. Content lines are escaped and
/// folded at 75 octets.
///
/// # Errors
///
/// Returns [`Error::Write`](crate::Error::Write) if a content line cannot be written.
pub fn to_ics(event: &CalendarEvent) -> Result<String> {
	let tzid = event.timezone.name();
	let mut ics = format!(
		"BEGIN:VCALENDAR\r\n\
		VERSION:2.0\r\n\
		PRODID:{PRODUCT_ID}\r\n\
		CALSCALE:GREGORIAN\r\n\
		BEGIN:VEVENT\r\n"
	);

	for property in [
		dated("DTSTART", tzid, event.start_stamp()),
		dated("DTEND", tzid, event.end_stamp()),
		Property::new("RRULE", event.recurrence.rule()),
		Property::new("SUMMARY", &event.title),
		Property::new("DESCRIPTION", &event.description),
		Property::new("LOCATION", &event.location),
	] {
		let line: String = property.try_into()?;
		ics.push_str(&line);
	}

	ics.push_str("END:VEVENT\r\nEND:VCALENDAR\r\n");
	Ok(ics)
}

/// Every event in one calendar, for importing a whole schedule at once.
/// Events without meeting times are left out.
#[must_use]
pub fn create_calendar(events: &[CalendarEvent]) -> Calendar {
	let mut calendar = Calendar::new();

	calendar.name(CAMPUS);
	calendar.timezone(crate::TZ.name());

	for event in events {
		let (Some(start), Some(end)) = (event.start(), event.end()) else {
			warn!("{}: no meeting time, left out of the calendar", event.title);
			continue;
		};

		let mut entry = Event::new();

		entry
			.summary(&event.title)
			.starts(CalendarDateTime::WithTimezone {
				date_time: start,
				tzid: event.timezone.name().to_string(),
			})
			.ends(CalendarDateTime::WithTimezone {
				date_time: end,
				tzid: event.timezone.name().to_string(),
			})
			.location(&event.location)
			.add_property("RRULE", event.recurrence.rule());

		if !event.description.is_empty() {
			entry.description(&event.description);
		}

		calendar.push(entry);
	}

	calendar
}

/// Download name for a course's ICS file, e.g. `CSE_142_A_calendar.ics`.
#[must_use]
pub fn ics_filename(course_number: &str) -> String {
	format!(
		"{}_calendar.ics",
		course_number.split_whitespace().collect::<Vec<_>>().join("_")
	)
}

#[cfg(test)]
mod tests {
	use chrono::{NaiveDate, TimeZone, Utc};

	use super::*;
	use crate::{
		days::extract_weekdays,
		event::Recurrence,
		time::normalize_time,
		TZ,
	};

	fn event() -> CalendarEvent {
		CalendarEvent {
			title: "CSE 142 A".into(),
			description: "Instructor: Jane Doe".into(),
			location: "University of Washington, KNE 130".into(),
			date: NaiveDate::from_ymd_opt(2025, 9, 29).unwrap(),
			times: Some(normalize_time("11:30am-12:20pm").unwrap()),
			timezone: TZ,
			recurrence: Recurrence {
				days: extract_weekdays("MWF"),
				until: Utc.with_ymd_and_hms(2025, 12, 15, 23, 59, 59).unwrap(),
			},
		}
	}

	#[test]
	fn test_google_calendar_url() {
		assert_eq!(
			google_calendar_url(&event()),
			"https://calendar.google.com/calendar/r/eventedit\
			?text=CSE+142+A\
			&dates=20250929T113000%2F20250929T122000\
			&ctz=America%2FLos_Angeles\
			&details=Instructor%3A+Jane+Doe\
			&location=University+of+Washington%2C+KNE+130\
			&recur=RRULE%3AFREQ%3DWEEKLY%3BBYDAY%3DMO%2CWE%2CFR%3BUNTIL%3D20251215T235959Z"
		);
	}

	#[test]
	fn test_ics_body() {
		assert_eq!(
			to_ics(&event()).unwrap(),
			"BEGIN:VCALENDAR\r\n\
			VERSION:2.0\r\n\
			PRODID:-//UW Calendar Exporter//EN\r\n\
			CALSCALE:GREGORIAN\r\n\
			BEGIN:VEVENT\r\n\
			DTSTART;TZID=America/Los_Angeles:20250929T113000\r\n\
			DTEND;TZID=America/Los_Angeles:20250929T122000\r\n\
			RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;UNTIL=20251215T235959Z\r\n\
			SUMMARY:CSE 142 A\r\n\
			DESCRIPTION:Instructor: Jane Doe\r\n\
			LOCATION:University of Washington\\, KNE 130\r\n\
			END:VEVENT\r\n\
			END:VCALENDAR\r\n"
		);
	}

	#[test]
	fn test_link_and_ics_agree() {
		let event = event();
		let link = url::Url::parse(&google_calendar_url(&event)).unwrap();
		let pair = |name: &str| {
			link.query_pairs()
				.find(|(key, _)| key == name)
				.map(|(_, value)| value.into_owned())
				.unwrap()
		};
		let ics = to_ics(&event).unwrap();
		let line = |prefix: &str| {
			ics.lines()
				.find_map(|line| line.strip_prefix(prefix))
				.map(str::to_string)
				.unwrap()
		};

		let dates = pair("dates");
		let (start, end) = dates.split_once('/').unwrap();

		assert_eq!(start, line("DTSTART;TZID=America/Los_Angeles:"));
		assert_eq!(end, line("DTEND;TZID=America/Los_Angeles:"));
		assert_eq!(pair("recur"), format!("RRULE:{}", line("RRULE:")));
		assert_eq!(pair("ctz"), "America/Los_Angeles");
	}

	#[test]
	fn test_unknown_time_keeps_both_formats_empty() {
		let mut event = event();
		event.times = None;

		assert!(google_calendar_url(&event).contains("&dates=%2F&"));
		assert!(to_ics(&event).unwrap().contains("\r\nDTSTART;TZID=America/Los_Angeles:\r\n"));
	}

	#[test]
	fn test_combined_calendar() {
		let mut untimed = event();
		untimed.title = "CSE 190 A".into();
		untimed.times = None;

		let calendar = create_calendar(&[event(), untimed]).to_string();

		assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 1);
		assert!(calendar.contains("DTSTART;TZID=America/Los_Angeles:20250929T113000"));
		assert!(calendar.contains("RRULE:FREQ=WEEKLY"));
		assert!(calendar.contains("UNTIL=20251215T235959Z"));
		assert!(calendar.contains("SUMMARY:CSE 142 A"));
		assert!(!calendar.contains("CSE 190 A"));
	}

	#[test]
	fn test_ics_escapes_text() {
		let mut event = event();
		event.title = "CSE 142; Lab\\B".into();
		event.description = "Instructor: Doe, Jane\nTA: Lee".into();

		let ics = to_ics(&event).unwrap();

		assert!(ics.contains("\r\nSUMMARY:CSE 142\\; Lab\\\\B\r\n"));
		assert!(ics.contains("\r\nDESCRIPTION:Instructor: Doe\\, Jane\\nTA: Lee\r\n"));
	}

	#[test]
	fn test_ics_folds_long_lines() {
		let mut event = event();
		event.location = "University of Washington, Paul G. Allen Center for Computer \
			Science & Engineering Room 305"
			.into();

		let ics = to_ics(&event).unwrap();

		assert!(ics.ends_with("\r\n"));
		assert!(ics.split("\r\n").all(|line| line.len() <= 75));
		assert!(ics.contains("\r\nLOCATION:University of Washington\\, Paul G. Allen Center"));
		assert!(ics.contains("\r\n ce & Engineering Room 305\r\nEND:VEVENT\r\n"));
	}

	#[test]
	fn test_ics_filename() {
		assert_eq!(ics_filename("CSE 142 A"), "CSE_142_A_calendar.ics");
		assert_eq!(ics_filename("MATH  124\tB"), "MATH_124_B_calendar.ics");
	}
}
