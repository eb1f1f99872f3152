use std::cmp::Ordering;

use serde_json::Value as JsonValue;
use time::{Date, PrimitiveDateTime};

use crate::entry::IndexEntry;

/// Index columns a constraint may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
	Uid,
	Pid,
	ForeignTable,
	ForeignUid,
	UniqueRegisterKey,
	StartDate,
	EndDate,
	LanguageUid,
}
impl Field {
	pub fn column(&self) -> &'static str {
		match self {
			Self::Uid => "uid",
			Self::Pid => "pid",
			Self::ForeignTable => "foreign_table",
			Self::ForeignUid => "foreign_uid",
			Self::UniqueRegisterKey => "unique_register_key",
			Self::StartDate => "start_date",
			Self::EndDate => "end_date",
			Self::LanguageUid => "sys_language_uid",
		}
	}

	/// Nullable date columns and the infinity a missing value stands for.
	pub fn open_bound(&self) -> Option<Ordering> {
		match self {
			Self::StartDate => Some(Ordering::Less),
			Self::EndDate => Some(Ordering::Greater),
			_ => None,
		}
	}

	fn lookup(&self, entry: &IndexEntry) -> EntryValue {
		match self {
			Self::Uid => EntryValue::Int(entry.uid),
			Self::Pid => EntryValue::Int(entry.pid),
			Self::ForeignTable => EntryValue::Text(entry.foreign_table.clone()),
			Self::ForeignUid => EntryValue::Int(entry.foreign_uid),
			Self::UniqueRegisterKey => EntryValue::Text(entry.unique_register_key.clone()),
			Self::StartDate => EntryValue::Date { date: entry.start_date, missing: Ordering::Less },
			Self::EndDate => EntryValue::Date { date: entry.end_date, missing: Ordering::Greater },
			Self::LanguageUid => EntryValue::Int(entry.sys_language_uid),
		}
	}
}

/// Comparison operand. Date columns compare against wall-clock date-times; a stored date sits at
/// the midnight that opens its day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
	Int(i64),
	Text(String),
	DateTime(PrimitiveDateTime),
}
impl Value {
	pub fn to_json(&self) -> JsonValue {
		match self {
			Self::Int(value) => JsonValue::from(*value),
			Self::Text(value) => JsonValue::String(value.clone()),
			Self::DateTime(value) => JsonValue::String(value.to_string()),
		}
	}
}
impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}
impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(value.into())
	}
}
impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}
impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<PrimitiveDateTime> for Value {
	fn from(value: PrimitiveDateTime) -> Self {
		Self::DateTime(value)
	}
}

/// Typed constraint tree handed to the storage engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
	Equals { field: Field, value: Value },
	NotEquals { field: Field, value: Value },
	LessThan { field: Field, value: Value },
	LessOrEqual { field: Field, value: Value },
	GreaterThan { field: Field, value: Value },
	GreaterOrEqual { field: Field, value: Value },
	In { field: Field, values: Vec<Value> },
	And(Vec<Constraint>),
	Or(Vec<Constraint>),
}
impl Constraint {
	pub fn equals(field: Field, value: impl Into<Value>) -> Self {
		Self::Equals { field, value: value.into() }
	}

	pub fn not_equals(field: Field, value: impl Into<Value>) -> Self {
		Self::NotEquals { field, value: value.into() }
	}

	pub fn less_than(field: Field, value: impl Into<Value>) -> Self {
		Self::LessThan { field, value: value.into() }
	}

	pub fn less_or_equal(field: Field, value: impl Into<Value>) -> Self {
		Self::LessOrEqual { field, value: value.into() }
	}

	pub fn greater_than(field: Field, value: impl Into<Value>) -> Self {
		Self::GreaterThan { field, value: value.into() }
	}

	pub fn greater_or_equal(field: Field, value: impl Into<Value>) -> Self {
		Self::GreaterOrEqual { field, value: value.into() }
	}

	pub fn one_of<I, V>(field: Field, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		Self::In { field, values: values.into_iter().map(Into::into).collect() }
	}

	/// Conjunction of `constraints`; `None` when there is nothing to constrain.
	pub fn all(mut constraints: Vec<Self>) -> Option<Self> {
		match constraints.len() {
			0 => None,
			1 => constraints.pop(),
			_ => Some(Self::And(constraints)),
		}
	}

	pub fn matches(&self, entry: &IndexEntry) -> bool {
		match self {
			Self::Equals { field, value } =>
				compare(field.lookup(entry), value) == Some(Ordering::Equal),
			Self::NotEquals { field, value } =>
				compare(field.lookup(entry), value).is_some_and(|ord| ord != Ordering::Equal),
			Self::LessThan { field, value } =>
				compare(field.lookup(entry), value) == Some(Ordering::Less),
			Self::LessOrEqual { field, value } =>
				compare(field.lookup(entry), value).is_some_and(|ord| ord != Ordering::Greater),
			Self::GreaterThan { field, value } =>
				compare(field.lookup(entry), value) == Some(Ordering::Greater),
			Self::GreaterOrEqual { field, value } =>
				compare(field.lookup(entry), value).is_some_and(|ord| ord != Ordering::Less),
			Self::In { field, values } => {
				let lookup = field.lookup(entry);

				values.iter().any(|value| compare(lookup.clone(), value) == Some(Ordering::Equal))
			},
			Self::And(nodes) => nodes.iter().all(|node| node.matches(entry)),
			Self::Or(nodes) => nodes.iter().any(|node| node.matches(entry)),
		}
	}

	pub fn to_json(&self) -> JsonValue {
		match self {
			Self::Equals { field, value } => leaf_json("eq", field, value),
			Self::NotEquals { field, value } => leaf_json("neq", field, value),
			Self::LessThan { field, value } => leaf_json("lt", field, value),
			Self::LessOrEqual { field, value } => leaf_json("lte", field, value),
			Self::GreaterThan { field, value } => leaf_json("gt", field, value),
			Self::GreaterOrEqual { field, value } => leaf_json("gte", field, value),
			Self::In { field, values } => {
				serde_json::json!({
					"op": "in",
					"field": field.column(),
					"value": JsonValue::Array(values.iter().map(Value::to_json).collect()),
				})
			},
			Self::And(nodes) => {
				serde_json::json!({
					"op": "and",
					"args": JsonValue::Array(nodes.iter().map(Self::to_json).collect()),
				})
			},
			Self::Or(nodes) => {
				serde_json::json!({
					"op": "or",
					"args": JsonValue::Array(nodes.iter().map(Self::to_json).collect()),
				})
			},
		}
	}
}

#[derive(Clone, Debug)]
enum EntryValue {
	Int(i64),
	Text(String),
	Date { date: Option<Date>, missing: Ordering },
}

fn leaf_json(op: &str, field: &Field, value: &Value) -> JsonValue {
	serde_json::json!({ "op": op, "field": field.column(), "value": value.to_json() })
}

/// Orders the entry side against the operand; `None` when the kinds do not line up.
fn compare(entry_value: EntryValue, value: &Value) -> Option<Ordering> {
	match (entry_value, value) {
		(EntryValue::Int(lhs), Value::Int(rhs)) => Some(lhs.cmp(rhs)),
		(EntryValue::Text(lhs), Value::Text(rhs)) => Some(lhs.as_str().cmp(rhs.as_str())),
		(EntryValue::Date { date: Some(date), .. }, Value::DateTime(rhs)) =>
			Some(date.midnight().cmp(rhs)),
		(EntryValue::Date { date: None, missing }, Value::DateTime(_)) => Some(missing),
		_ => None,
	}
}
