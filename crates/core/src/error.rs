//! Error types shared by the calendar pipeline.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
	/// A time label, day list, quarter name or table entry could not be read.
	#[error("invalid format: {0}")]
	InvalidFormat(String),

	/// A table, row or cell that the page is expected to contain is missing.
	#[error("not found: {0}")]
	NotFound(String),

	/// The injected page fetcher gave up on `url`.
	#[error("failed to fetch {url}: {message}")]
	Fetch { url: String, message: String },

	/// The generated recurrence rule was rejected while expanding it.
	#[error("recurrence error: {0}")]
	Recurrence(String),

	#[error("failed to write calendar: {0}")]
	Write(#[from] std::fmt::Error),
}

impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidFormat(message.into())
	}

	pub(crate) fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound(message.into())
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
