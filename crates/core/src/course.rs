use log::debug;
use select::{
	document::Document,
	node::Node,
	predicate::{Attr, Class, Descendant, Name, Predicate},
};
use serde::Deserialize;

use crate::error::{Error, Result};

const TBA: &str = "TBA";

fn tba() -> String {
	String::from(TBA)
}

/// One row of the registration schedule table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMeeting {
	pub course_number: String,
	#[serde(default = "tba")]
	pub title: String,
	#[serde(default = "tba")]
	pub instructor: String,
	#[serde(default = "tba")]
	pub location: String,
	pub days: String,
	pub time: String,
}

/// Rewrites `Last, First` as `First Last`.
#[must_use]
pub fn format_instructor(name: &str) -> String {
	let mut parts = name.split(',').map(str::trim);

	match (parts.next(), parts.next()) {
		(Some(last), Some(first)) => format!("{first} {last}"),
		_ => name.to_string(),
	}
}

fn text(node: &Node) -> String {
	node.text().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty_or_tba(value: Option<String>) -> String {
	value.filter(|s| !s.is_empty()).unwrap_or_else(tba)
}

fn has_responsive_class(node: &Node) -> bool {
	node.attr("class")
		.is_some_and(|class| class.contains("table-mobile-responsive"))
}

fn find_table(document: &Document) -> Option<Node<'_>> {
	document
		.find(
			Name("table")
				.and(Class("table-mobile-responsive"))
				.and(Class("mb-0"))
				.and(Class("table")),
		)
		.next()
		.or_else(|| {
			document
				.find(Name("table").and(Class("table-mobile-responsive")))
				.next()
		})
		.or_else(|| {
			document
				.find(Name("table").and(Class("mb-0")).and(Class("table")))
				.next()
		})
		.or_else(|| {
			document
				.find(Name("table").and(has_responsive_class))
				.next()
		})
		.or_else(|| document.find(Name("table")).next())
}

fn parse_row(row: Node) -> Option<CourseMeeting> {
	let meeting = row.find(Attr("data-content", "Meeting")).next()?;
	let times = meeting.find(Name("time")).map(|t| text(&t)).collect::<Vec<_>>();

	let [start, end, ..] = times.as_slice() else {
		debug!("row without meeting times, skipping");
		return None;
	};

	let course = non_empty_or_tba(row.find(Attr("data-content", "Course")).next().map(|n| text(&n)));
	let instructor = non_empty_or_tba(
		row.find(Attr("data-content", "Instructor"))
			.next()
			.map(|n| n.attr("title").map_or_else(|| text(&n), str::to_string)),
	);
	let days = meeting
		.find(Name("span").and(Attr("title", ())))
		.next()
		.and_then(|span| span.attr("title"))
		.map_or_else(tba, str::to_string);
	let time = if start.is_empty() || end.is_empty() {
		tba()
	} else {
		format!("{start}-{end}")
	};
	let location = non_empty_or_tba(
		meeting
			.find(Name("div"))
			.nth(3)
			.map(|div| text(&div).replacen("Location:", "", 1).trim().to_string()),
	);

	Some(CourseMeeting {
		course_number: course.clone(),
		title: course,
		instructor: format_instructor(&instructor),
		location,
		days,
		time,
	})
}

/// Extracts every scheduled meeting from a saved registration page. Rows
/// without two `<time>` elements (online or arranged sections) are skipped.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the page has no table at all.
pub fn parse_schedule(html: &str) -> Result<Vec<CourseMeeting>> {
	let document = Document::from(html);
	let table = find_table(&document).ok_or_else(|| Error::not_found("schedule table"))?;

	let courses = table
		.find(Descendant(Name("tbody"), Name("tr")))
		.filter_map(parse_row)
		.collect::<Vec<_>>();

	debug!("found {} scheduled meetings", courses.len());

	Ok(courses)
}

/// Text of the page's first `<h1>`.
#[must_use]
pub fn page_heading(html: &str) -> Option<String> {
	Document::from(html)
		.find(Name("h1"))
		.next()
		.map(|h1| text(&h1))
}

#[cfg(test)]
mod tests {
	use super::*;

	const PAGE: &str = r#"
<html><body>
<h1>Your Autumn 2025 Schedule</h1>
<table class="table-mobile-responsive mb-0 table">
<thead><tr><th>Course</th><th>Type</th><th>Meeting</th><th>Instructor</th></tr></thead>
<tbody>
<tr>
	<td data-content="Course">CSE 142 A</td>
	<td data-content="Type">LC</td>
	<td data-content="Meeting">
		<div><span title="Monday Wednesday Friday">MWF</span></div>
		<div><time>11:30am</time></div>
		<div><time>12:20pm</time></div>
		<div>Location: KNE 130</div>
	</td>
	<td data-content="Instructor" title="Doe, Jane">Doe, J</td>
</tr>
<tr>
	<td data-content="Course">CSE 142 AB</td>
	<td data-content="Type">QZ</td>
	<td data-content="Meeting">
		<div><span title="Thursday">Th</span></div>
		<div><time>130</time></div>
		<div><time>220</time></div>
		<div>Location: MGH 241</div>
	</td>
	<td data-content="Instructor">Smith, Alex</td>
</tr>
<tr>
	<td data-content="Course">CSE 190 A</td>
	<td data-content="Meeting"><div>To be arranged</div></td>
</tr>
</tbody>
</table>
</body></html>
"#;

	#[test]
	fn test_parse_schedule_rows() {
		let courses = parse_schedule(PAGE).unwrap();

		assert_eq!(courses.len(), 2);
		assert_eq!(
			courses[0],
			CourseMeeting {
				course_number: "CSE 142 A".into(),
				title: "CSE 142 A".into(),
				instructor: "Jane Doe".into(),
				location: "KNE 130".into(),
				days: "Monday Wednesday Friday".into(),
				time: "11:30am-12:20pm".into(),
			}
		);
		assert_eq!(courses[1].instructor, "Alex Smith");
		assert_eq!(courses[1].days, "Thursday");
		assert_eq!(courses[1].time, "130-220");
	}

	#[test]
	fn test_page_without_table() {
		assert!(matches!(
			parse_schedule("<html><body><p>Loading</p></body></html>"),
			Err(Error::NotFound(_))
		));
	}

	#[test]
	fn test_falls_back_to_any_table() {
		let html = r#"<table><tbody><tr>
			<td data-content="Course">MATH 124 B</td>
			<td data-content="Meeting"><time>9:30</time><time>10:20</time></td>
		</tr></tbody></table>"#;
		let courses = parse_schedule(html).unwrap();

		assert_eq!(courses.len(), 1);
		assert_eq!(courses[0].days, "TBA");
		assert_eq!(courses[0].location, "TBA");
		assert_eq!(courses[0].instructor, "TBA");
		assert_eq!(courses[0].time, "9:30-10:20");
	}

	#[test]
	fn test_page_heading() {
		assert_eq!(page_heading(PAGE).as_deref(), Some("Your Autumn 2025 Schedule"));
		assert_eq!(page_heading("<p>none</p>"), None);
	}

	#[test]
	fn test_format_instructor() {
		assert_eq!(format_instructor("Doe, Jane"), "Jane Doe");
		assert_eq!(format_instructor("Jane Doe"), "Jane Doe");
	}

	#[test]
	fn test_course_meeting_from_json() {
		let course: CourseMeeting = serde_json::from_str(
			r#"{"courseNumber":"CSE 142 A","days":"MWF","time":"11:30am-12:20pm"}"#,
		)
		.unwrap();

		assert_eq!(course.instructor, "TBA");
		assert_eq!(course.days, "MWF");
	}
}
