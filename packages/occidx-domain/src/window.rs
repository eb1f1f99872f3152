use time::OffsetDateTime;

use crate::{Error, Result};

/// Query interval with optional inclusive bounds. A missing bound is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeWindow {
	start: Option<OffsetDateTime>,
	end: Option<OffsetDateTime>,
}
impl TimeWindow {
	pub fn make(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Result<Self> {
		if let (Some(start), Some(end)) = (start, end)
			&& start > end
		{
			return Err(Error::Validation {
				message: format!("window start {start} is after window end {end}."),
			});
		}

		Ok(Self { start, end })
	}

	pub fn unbounded() -> Self {
		Self { start: None, end: None }
	}

	pub fn starting_at(start: OffsetDateTime) -> Self {
		Self { start: Some(start), end: None }
	}

	pub fn start(&self) -> Option<OffsetDateTime> {
		self.start
	}

	pub fn end(&self) -> Option<OffsetDateTime> {
		self.end
	}

	/// No temporal filtering applies when both bounds are absent.
	pub fn is_unbounded(&self) -> bool {
		self.start.is_none() && self.end.is_none()
	}
}
