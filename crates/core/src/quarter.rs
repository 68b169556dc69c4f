use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use log::warn;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// `UNTIL` timestamps are written in UTC with this layout.
pub const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

static NEW_HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)Your\s+(Autumn|Winter|Spring|Summer)\s+(\d{4})\s+Schedule").unwrap()
});
static OLD_HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"Registration - (Autumn|Winter|Spring|Summer) (\d{4})").unwrap()
});
static URL_CODE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)/([a-z]{2})(\d{2})").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quarter {
	Autumn,
	Winter,
	Spring,
	Summer,
}

impl Quarter {
	/// Parses a quarter name, falling back to Autumn for anything unknown.
	#[must_use]
	pub fn from_name_or_autumn(name: &str) -> Self {
		name.parse().unwrap_or_else(|_| {
			warn!("unknown quarter {name:?}, using Autumn");
			Self::Autumn
		})
	}

	fn from_code(code: &str) -> Option<Self> {
		Some(match code.to_ascii_lowercase().as_str() {
			"au" => Self::Autumn,
			"wi" => Self::Winter,
			"sp" => Self::Spring,
			"su" => Self::Summer,
			_ => return None,
		})
	}
}

impl fmt::Display for Quarter {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::Autumn => "Autumn",
			Self::Winter => "Winter",
			Self::Spring => "Spring",
			Self::Summer => "Summer",
		})
	}
}

impl FromStr for Quarter {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim().to_ascii_lowercase().as_str() {
			"autumn" => Self::Autumn,
			"winter" => Self::Winter,
			"spring" => Self::Spring,
			"summer" => Self::Summer,
			_ => return Err(Error::invalid(format!("unknown quarter {s:?}"))),
		})
	}
}

/// The quarter a schedule page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuarterInfo {
	pub quarter: Quarter,
	pub year: i32,
}

impl QuarterInfo {
	#[must_use]
	pub fn new(quarter: Quarter, year: i32) -> Self {
		Self { quarter, year }
	}

	/// Reads `Your Spring 2025 Schedule` or the older
	/// `Registration - Spring 2024` page heading.
	#[must_use]
	pub fn from_heading(heading: &str) -> Option<Self> {
		let caps = NEW_HEADING
			.captures(heading)
			.or_else(|| OLD_HEADING.captures(heading))?;

		Some(Self {
			quarter: caps[1].parse().ok()?,
			year: caps[2].parse().ok()?,
		})
	}

	/// Reads a quarter code such as `/au25` from a page URL.
	#[must_use]
	pub fn from_url(url: &str) -> Option<Self> {
		URL_CODE.captures_iter(url).find_map(|caps| {
			let quarter = Quarter::from_code(&caps[1])?;
			let year = caps[2].parse::<i32>().ok()?;

			Some(Self::new(quarter, 2000 + year))
		})
	}

	/// Heading first, then URL, then Spring of the current year.
	#[must_use]
	pub fn detect(heading: Option<&str>, url: Option<&str>, today: NaiveDate) -> Self {
		heading
			.and_then(Self::from_heading)
			.or_else(|| url.and_then(Self::from_url))
			.unwrap_or_else(|| {
				warn!("could not find the quarter in the heading or url");
				Self::new(Quarter::Spring, today.year())
			})
	}

	/// The academic year (named by its final calendar year) whose registrar
	/// calendar lists this quarter.
	#[must_use]
	pub fn academic_year(self) -> i32 {
		match self.quarter {
			Quarter::Autumn => self.year + 1,
			_ => self.year,
		}
	}

	#[must_use]
	pub fn next(self) -> Self {
		match self.quarter {
			Quarter::Autumn => Self::new(Quarter::Winter, self.year + 1),
			Quarter::Winter => Self::new(Quarter::Spring, self.year),
			Quarter::Spring => Self::new(Quarter::Summer, self.year),
			Quarter::Summer => Self::new(Quarter::Autumn, self.year),
		}
	}
}

impl fmt::Display for QuarterInfo {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} {}", self.quarter, self.year)
	}
}

/// A month and day without a year, written `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MonthDay {
	month: u32,
	day: u32,
}

impl MonthDay {
	/// # Errors
	///
	/// Returns [`Error::InvalidFormat`] for a day that exists in no year.
	pub fn new(month: u32, day: u32) -> Result<Self> {
		// 2000 is a leap year, so 02-29 is accepted here.
		NaiveDate::from_ymd_opt(2000, month, day)
			.map(|_| Self { month, day })
			.ok_or_else(|| Error::invalid(format!("no such day {month:02}-{day:02}")))
	}

	#[must_use]
	pub fn of(date: NaiveDate) -> Self {
		Self {
			month: date.month(),
			day: date.day(),
		}
	}

	/// # Errors
	///
	/// Returns [`Error::InvalidFormat`] when the day does not exist in `year`.
	pub fn in_year(self, year: i32) -> Result<NaiveDate> {
		NaiveDate::from_ymd_opt(year, self.month, self.day)
			.ok_or_else(|| Error::invalid(format!("{self} does not exist in {year}")))
	}
}

impl fmt::Display for MonthDay {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:02}-{:02}", self.month, self.day)
	}
}

impl FromStr for MonthDay {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (month, day) = s
			.trim()
			.split_once('-')
			.ok_or_else(|| Error::invalid(format!("expected MM-DD, got {s:?}")))?;
		let month = month
			.parse()
			.map_err(|_| Error::invalid(format!("bad month in {s:?}")))?;
		let day = day
			.parse()
			.map_err(|_| Error::invalid(format!("bad day in {s:?}")))?;

		Self::new(month, day)
	}
}

impl TryFrom<String> for MonthDay {
	type Error = Error;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// First day of instruction and last day covered by the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuarterRow {
	pub start: MonthDay,
	pub end: MonthDay,
}

impl QuarterRow {
	const fn fixed(start: (u32, u32), end: (u32, u32)) -> Self {
		Self {
			start: MonthDay {
				month: start.0,
				day: start.1,
			},
			end: MonthDay {
				month: end.0,
				day: end.1,
			},
		}
	}
}

/// Approximate quarter boundaries. They drift every year, so callers can
/// load their own table (see the CLI's `--quarters` flag).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuarterTable {
	pub winter: QuarterRow,
	pub spring: QuarterRow,
	pub summer: QuarterRow,
	pub autumn: QuarterRow,
}

impl Default for QuarterTable {
	fn default() -> Self {
		Self {
			winter: QuarterRow::fixed((1, 3), (3, 20)),
			spring: QuarterRow::fixed((3, 27), (6, 7)),
			summer: QuarterRow::fixed((6, 19), (8, 15)),
			autumn: QuarterRow::fixed((9, 27), (12, 15)),
		}
	}
}

impl QuarterTable {
	pub fn set_row(&mut self, quarter: Quarter, row: QuarterRow) {
		let slot = match quarter {
			Quarter::Winter => &mut self.winter,
			Quarter::Spring => &mut self.spring,
			Quarter::Summer => &mut self.summer,
			Quarter::Autumn => &mut self.autumn,
		};

		*slot = row;
	}

	#[must_use]
	pub fn row(&self, quarter: Quarter) -> QuarterRow {
		match quarter {
			Quarter::Winter => self.winter,
			Quarter::Spring => self.spring,
			Quarter::Summer => self.summer,
			Quarter::Autumn => self.autumn,
		}
	}

	/// # Errors
	///
	/// Returns [`Error::InvalidFormat`] when the row's start day does not
	/// exist in `year`.
	pub fn start_date(&self, quarter: Quarter, year: i32) -> Result<NaiveDate> {
		self.row(quarter).start.in_year(year)
	}

	/// The last instant the weekly recurrence may fall on: 23:59:59 UTC of
	/// the row's end day.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidFormat`] when the end day does not exist in `year`.
	pub fn end_instant(&self, quarter: Quarter, year: i32) -> Result<DateTime<Utc>> {
		let end = self.row(quarter).end.in_year(year)?;
		let last_second = end
			.and_hms_opt(23, 59, 59)
			.ok_or_else(|| Error::invalid(format!("no end of day for {end}")))?;

		Ok(Utc.from_utc_datetime(&last_second))
	}

	/// [`Self::end_instant`] as an RRULE `UNTIL` value, e.g. `20251215T235959Z`.
	///
	/// # Errors
	///
	/// See [`Self::end_instant`].
	pub fn end_timestamp(&self, quarter: Quarter, year: i32) -> Result<String> {
		Ok(self.end_instant(quarter, year)?.format(UNTIL_FORMAT).to_string())
	}
}
