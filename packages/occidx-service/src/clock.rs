use time::OffsetDateTime;

/// Source of "now" for probe synthesis, traversal and list windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clock {
	#[default]
	System,
	Fixed(OffsetDateTime),
}
impl Clock {
	pub fn now(&self) -> OffsetDateTime {
		match self {
			Self::System => OffsetDateTime::now_utc(),
			Self::Fixed(now) => *now,
		}
	}
}
