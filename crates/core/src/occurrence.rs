use chrono::{Datelike, Days, NaiveDate};
use log::debug;

use crate::days::WeekdaySet;

/// How far ahead to look for a class day. Class days are Monday to Friday, so
/// a week always contains one when the set is not empty.
const SCAN_DAYS: u64 = 7;

/// Date of the meeting a new calendar entry should start on.
///
/// Before the quarter starts this is the first class day on or after
/// `quarter_start`. Once the quarter is under way it is the next class day
/// from `today` (today included), so the entry does not begin in the past.
/// Falls back to `quarter_start` when no class day is found.
#[must_use]
pub fn first_meeting(quarter_start: NaiveDate, weekdays: &WeekdaySet, today: NaiveDate) -> NaiveDate {
	let is_class_day = |date: &NaiveDate| weekdays.contains(date.weekday());

	if today > quarter_start {
		if is_class_day(&today) {
			debug!("{today} is a class day");
			return today;
		}

		if let Some(next) = scan(today, 1..=SCAN_DAYS).find(is_class_day) {
			debug!("next class day after {today} is {next}");
			return next;
		}
	}

	scan(quarter_start, 0..SCAN_DAYS)
		.find(is_class_day)
		.unwrap_or(quarter_start)
}

fn scan(from: NaiveDate, offsets: impl Iterator<Item = u64>) -> impl Iterator<Item = NaiveDate> {
	offsets.filter_map(move |offset| from.checked_add_days(Days::new(offset)))
}

#[cfg(test)]
mod tests {
	use chrono::Weekday;

	use super::*;
	use crate::days::extract_weekdays;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn test_before_quarter_uses_first_class_day_after_start() {
		// 2025-09-27 is a Saturday.
		let start = date(2025, 9, 27);
		let mwf = extract_weekdays("MWF");

		assert_eq!(first_meeting(start, &mwf, date(2025, 9, 1)), date(2025, 9, 29));
	}

	#[test]
	fn test_on_quarter_start_day_anchors_to_start() {
		// 2025-01-03 is a Friday.
		let start = date(2025, 1, 3);

		assert_eq!(first_meeting(start, &extract_weekdays("F"), start), start);
		assert_eq!(first_meeting(start, &extract_weekdays("TTh"), start), date(2025, 1, 7));
	}

	#[test]
	fn test_mid_quarter_class_day_is_today() {
		let start = date(2025, 9, 27);
		// Wednesday
		let today = date(2025, 10, 15);

		assert_eq!(first_meeting(start, &extract_weekdays("MWF"), today), today);
	}

	#[test]
	fn test_mid_quarter_finds_next_class_day() {
		let start = date(2025, 9, 27);
		// Saturday, so the next Tuesday is the 21st.
		let today = date(2025, 10, 18);

		assert_eq!(first_meeting(start, &extract_weekdays("TTh"), today), date(2025, 10, 21));
	}

	#[test]
	fn test_empty_set_falls_back_to_quarter_start() {
		let start = date(2025, 9, 27);

		assert_eq!(first_meeting(start, &WeekdaySet::default(), date(2025, 9, 1)), start);
		assert_eq!(first_meeting(start, &WeekdaySet::default(), date(2025, 11, 1)), start);
	}

	#[test]
	fn test_weekend_only_set_still_resolves() {
		let start = date(2025, 9, 27);
		let sunday = [Weekday::Sun].into_iter().collect::<WeekdaySet>();

		assert_eq!(first_meeting(start, &sunday, date(2025, 9, 1)), date(2025, 9, 28));
	}
}
