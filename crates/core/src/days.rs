use std::sync::LazyLock;

use chrono::Weekday;
use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

// Longer alternatives first so that "Th" is never read as "T" + junk.
static DAY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new("Monday|Tuesday|Wednesday|Thursday|Friday|Th|M|T|W|F").unwrap()
});

/// Placeholder the registration page shows for unscheduled sections.
const TO_BE_ANNOUNCED: &str = "TBA";

/// Class days in order of appearance. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekdaySet(Vec<Weekday>);

impl WeekdaySet {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn contains(&self, day: Weekday) -> bool {
		self.0.contains(&day)
	}

	pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
		self.0.iter().copied()
	}

	/// Day numbers with Sunday as 0.
	#[must_use]
	pub fn numbers(&self) -> Vec<u32> {
		self.iter().map(|day| day.num_days_from_sunday()).collect()
	}

	/// The `BYDAY` value of a weekly RRULE, e.g. `MO,WE,FR`.
	#[must_use]
	pub fn byday(&self) -> String {
		self.iter().map(rrule_token).collect::<Vec<_>>().join(",")
	}
}

impl FromIterator<Weekday> for WeekdaySet {
	fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

#[must_use]
pub fn rrule_token(day: Weekday) -> &'static str {
	match day {
		Weekday::Mon => "MO",
		Weekday::Tue => "TU",
		Weekday::Wed => "WE",
		Weekday::Thu => "TH",
		Weekday::Fri => "FR",
		Weekday::Sat => "SA",
		Weekday::Sun => "SU",
	}
}

fn weekday_of(token: &str) -> Option<Weekday> {
	Some(match token {
		"Monday" | "M" => Weekday::Mon,
		"Tuesday" | "T" => Weekday::Tue,
		"Wednesday" | "W" => Weekday::Wed,
		"Thursday" | "Th" => Weekday::Thu,
		"Friday" | "F" => Weekday::Fri,
		_ => return None,
	})
}

/// Reads the class days out of free text (`Monday Wednesday Friday`) or an
/// abbreviation list (`MWF`, `TTh`). Anything unrecognized is skipped.
#[must_use]
pub fn extract_weekdays(text: &str) -> WeekdaySet {
	if text.trim().eq_ignore_ascii_case(TO_BE_ANNOUNCED) {
		return WeekdaySet::default();
	}

	DAY_TOKEN
		.find_iter(text)
		.filter_map(|token| weekday_of(token.as_str()))
		.collect()
}

/// Comma-joined RRULE day tokens for `text`.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] when no weekday is recognized.
pub fn recurrence_days(text: &str) -> Result<String> {
	let days = extract_weekdays(text);

	if days.is_empty() {
		return Err(Error::invalid(format!("no class days in {text:?}")));
	}

	let byday = days.byday();
	debug!("recurrence days for {text:?}: {byday}");

	Ok(byday)
}
