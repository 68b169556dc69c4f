#![warn(clippy::pedantic)]

pub mod academic;
pub mod course;
pub mod days;
pub mod error;
pub mod event;
pub mod export;
pub mod occurrence;
pub mod quarter;
pub mod time;

pub use academic::{calendar_url, fetch_quarter_dates, PageFetcher, QuarterDates};
pub use course::{parse_schedule, CourseMeeting};
pub use error::{Error, Result};
pub use event::{build_event, CalendarEvent};
pub use export::{create_calendar, google_calendar_url, ics_filename, to_ics};
pub use quarter::{Quarter, QuarterInfo, QuarterTable};

pub const TZ: chrono_tz::Tz = chrono_tz::America::Los_Angeles;

/// Today's date on campus.
#[must_use]
pub fn today() -> chrono::NaiveDate {
	chrono::Utc::now().with_timezone(&TZ).date_naive()
}
