use std::{fs, path::Path};

use anyhow::Context;
use uwcal_core::QuarterTable;

/// Reads a quarter table such as
///
/// ```toml
/// [winter]
/// start = "01-06"
/// end = "03-14"
/// ```
///
/// Quarters left out of the file keep their built-in dates.
pub fn load_quarter_table(path: &Path) -> anyhow::Result<QuarterTable> {
	let text = fs::read_to_string(path)
		.with_context(|| format!("failed to read quarter table {}", path.display()))?;

	parse_quarter_table(&text)
		.with_context(|| format!("failed to parse quarter table {}", path.display()))
}

fn parse_quarter_table(text: &str) -> anyhow::Result<QuarterTable> {
	Ok(toml::from_str(text)?)
}
