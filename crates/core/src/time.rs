use std::fmt;

use chrono::NaiveTime;
use log::{debug, warn};

use crate::error::{Error, Result};

/// A wall-clock time of day, always rendered as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
	hour: u8,
	minute: u8,
}

impl ClockTime {
	/// Substituted for any label that cannot be read.
	pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

	#[must_use]
	pub fn new(hour: u32, minute: u32) -> Option<Self> {
		if hour > 23 || minute > 59 {
			return None;
		}

		Some(Self {
			hour: u8::try_from(hour).ok()?,
			minute: u8::try_from(minute).ok()?,
		})
	}

	#[must_use]
	pub fn hour(self) -> u8 {
		self.hour
	}

	#[must_use]
	pub fn minute(self) -> u8 {
		self.minute
	}

	#[must_use]
	pub fn as_naive(self) -> NaiveTime {
		NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0).unwrap_or_default()
	}
}

impl fmt::Display for ClockTime {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:02}:{:02}", self.hour, self.minute)
	}
}

/// Start and end of one meeting, on the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
	pub start: ClockTime,
	pub end: ClockTime,
}

/// Normalizes a registrar time label such as `11:30am-12:50pm` or `1130-1250`
/// into a 24-hour range.
///
/// Only a missing `-` is an error. A side that cannot be read becomes
/// [`ClockTime::MIDNIGHT`] so that the caller still has something to show.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] when the label has no `-` separator.
pub fn normalize_time(raw: &str) -> Result<TimeRange> {
	let cleaned = raw.replace("&nbsp;", "").replace('\u{a0}', "");
	let cleaned = cleaned.trim();

	if !cleaned.contains('-') {
		return Err(Error::invalid(format!("time range without '-': {raw:?}")));
	}

	let mut sides = cleaned.split('-');
	let start = parse_clock(sides.next().unwrap_or_default());
	let end = parse_clock(sides.next().unwrap_or_default());

	debug!("normalized {cleaned:?} to {start}-{end}");

	Ok(TimeRange { start, end })
}

fn parse_clock(label: &str) -> ClockTime {
	let label = label.trim().to_lowercase();

	let Some((hour, minute)) = split_hour_minute(&label) else {
		warn!("invalid time format: {label:?}");
		return ClockTime::MIDNIGHT;
	};

	let hour = to_24_hour(hour, &label);

	ClockTime::new(hour, minute).unwrap_or_else(|| {
		warn!("time out of range: {label:?} ({hour}:{minute})");
		ClockTime::MIDNIGHT
	})
}

fn split_hour_minute(label: &str) -> Option<(u32, u32)> {
	if label.contains(':') {
		let mut parts = label.split(':');
		let hour = parts
			.next()?
			.trim()
			.chars()
			.take_while(char::is_ascii_digit)
			.collect::<String>()
			.parse()
			.ok()?;
		let minute = parts
			.next()?
			.chars()
			.filter(char::is_ascii_digit)
			.collect::<String>()
			.parse()
			.ok()?;

		return Some((hour, minute));
	}

	let digits = label.chars().filter(char::is_ascii_digit).collect::<String>();
	let split = match digits.len() {
		4 => 2,
		3 => 1,
		_ => return None,
	};

	let (hour, minute) = digits.split_at(split);

	Some((hour.parse().ok()?, minute.parse().ok()?))
}

/// Applies an explicit meridiem, or the teaching-day guess when there is none:
/// 8 to 11 are morning, 1 to 7 are afternoon and 12 is left alone.
fn to_24_hour(hour: u32, label: &str) -> u32 {
	let pm = label.contains("pm");
	let am = label.contains("am");

	match (am, pm) {
		(_, true) if hour < 12 => hour + 12,
		(true, false) if hour == 12 => 0,
		(false, false) if (1..=7).contains(&hour) => hour + 12,
		_ => hour,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn range(raw: &str) -> (String, String) {
		let range = normalize_time(raw).unwrap();
		(range.start.to_string(), range.end.to_string())
	}

	#[test]
	fn test_explicit_meridiem() {
		assert_eq!(range("11:30am-12:50pm"), ("11:30".into(), "12:50".into()));
		assert_eq!(range("2:30pm-3:20pm"), ("14:30".into(), "15:20".into()));
		assert_eq!(range("12:30am-1:00am"), ("00:30".into(), "01:00".into()));
	}

	#[test]
	fn test_morning_hours_without_meridiem_stay_am() {
		// 9 falls in the 8 to 11 band on both sides.
		assert_eq!(range("9:00-9:50"), ("09:00".into(), "09:50".into()));
		assert_eq!(range("8:30-11:20"), ("08:30".into(), "11:20".into()));
	}

	#[test]
	fn test_afternoon_hours_without_meridiem_become_pm() {
		assert_eq!(range("1:30-2:50"), ("13:30".into(), "14:50".into()));
		assert_eq!(range("12:30-1:20"), ("12:30".into(), "13:20".into()));
		assert_eq!(range("7:00-7:50"), ("19:00".into(), "19:50".into()));
	}

	#[test]
	fn test_digit_only_labels() {
		assert_eq!(range("1130-1250"), ("11:30".into(), "12:50".into()));
		assert_eq!(range("930-1020"), ("09:30".into(), "10:20".into()));
		assert_eq!(range("130-220"), ("13:30".into(), "14:20".into()));
		assert_eq!(range("130pm-220pm"), ("13:30".into(), "14:20".into()));
	}

	#[test]
	fn test_nbsp_and_whitespace_are_stripped() {
		assert_eq!(
			range("&nbsp;10:30 AM - 11:20 AM\u{a0}"),
			("10:30".into(), "11:20".into())
		);
	}

	#[test]
	fn test_unreadable_side_degrades_to_midnight() {
		assert_eq!(range("11:30am-"), ("11:30".into(), "00:00".into()));
		assert_eq!(range("12345-1250"), ("00:00".into(), "12:50".into()));
		assert_eq!(range("25:00-26:00"), ("00:00".into(), "00:00".into()));
	}

	#[test]
	fn test_missing_separator_is_invalid() {
		assert!(matches!(normalize_time("TBA"), Err(Error::InvalidFormat(_))));
		assert!(matches!(normalize_time("&nbsp;"), Err(Error::InvalidFormat(_))));
	}

	#[test]
	fn test_twelve_hour_labels_rederive() {
		for hour in 1..=12u32 {
			for minute in (0..60u32).step_by(10) {
				for meridiem in ["am", "pm"] {
					let label = format!("{hour}:{minute:02}{meridiem}-{hour}:{minute:02}{meridiem}");
					let start = normalize_time(&label).unwrap().start;

					assert!(start.hour() <= 23, "{label}");
					assert_eq!(u32::from(start.minute()), minute, "{label}");

					let twelve = match u32::from(start.hour()) % 12 {
						0 => 12,
						h => h,
					};
					assert_eq!(twelve, hour, "{label}");
					assert_eq!(start.hour() >= 12, meridiem == "pm", "{label}");
				}
			}
		}
	}
}
