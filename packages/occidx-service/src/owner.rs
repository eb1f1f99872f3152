use std::collections::HashMap;

use crate::{Error, Result};

/// Reference to the domain object that owns index entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerRef {
	/// Owner kind as registered in the [`TypeRegistry`], e.g. a model name.
	pub kind: String,
	pub uid: i64,
	/// Uid of the translated record when the owner was loaded in another language.
	pub localized_uid: Option<i64>,
}
impl OwnerRef {
	pub fn new(kind: impl Into<String>, uid: i64) -> Self {
		Self { kind: kind.into(), uid, localized_uid: None }
	}

	pub fn localized(mut self, localized_uid: i64) -> Self {
		self.localized_uid = Some(localized_uid);

		self
	}

	/// Translation-resolved uid, falling back to the primary uid.
	pub fn select_uid(&self) -> i64 {
		self.localized_uid.unwrap_or(self.uid)
	}
}

/// Maps owner kinds to the unique register key their entries are tagged with.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
	keys: HashMap<String, String>,
}
impl TypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(
		mut self,
		kind: impl Into<String>,
		unique_register_key: impl Into<String>,
	) -> Self {
		self.keys.insert(kind.into(), unique_register_key.into());

		self
	}

	pub fn unique_register_key(&self, owner: &OwnerRef) -> Result<&str> {
		self.keys.get(owner.kind.as_str()).map(String::as_str).ok_or_else(|| {
			Error::UnsupportedOwner {
				message: format!("no unique register key is configured for {}.", owner.kind),
			}
		})
	}
}
