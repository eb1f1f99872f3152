pub mod calendar;
pub mod constraint;
pub mod entry;
pub mod overlap;
pub mod query;
pub mod sort;
pub mod window;

mod error;

pub use calendar::CalendarUnit;
pub use constraint::{Constraint, Field, Value};
pub use entry::IndexEntry;
pub use error::{Error, Result};
pub use overlap::{IntervalConvention, OverlapCase, OverlapPredicateBuilder, ProbeBounds};
pub use query::{LanguageSelection, ScopeTypeGroup, StorageQuery};
pub use sort::{SortColumn, SortDirection, SortField, SortSpec};
pub use window::TimeWindow;

use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Wall-clock representation of an instant in the offset the index dates were written in.
pub fn to_wall_clock(instant: OffsetDateTime, offset: UtcOffset) -> Result<PrimitiveDateTime> {
	let local = instant.checked_to_offset(offset).ok_or_else(|| Error::Validation {
		message: format!("instant {instant} is out of range in offset {offset}."),
	})?;

	Ok(PrimitiveDateTime::new(local.date(), local.time()))
}
