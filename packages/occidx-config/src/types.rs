use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub scopes: Scopes,
	#[serde(default)]
	pub index: Index,
	#[serde(default)]
	pub calendar: Calendar,
	#[serde(default)]
	pub list: List,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Storage scope (page id) sources, consulted in order by the repository facade.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scopes {
	/// Persistence-framework storage pids.
	pub storage_pids: Vec<i64>,
	/// Optional. Comma separated host-backend default, e.g. "3, 7".
	pub backend_default_pids: Option<String>,
}
impl Scopes {
	pub fn backend_defaults(&self) -> Vec<i64> {
		self.backend_default_pids
			.as_deref()
			.map(|raw| {
				raw.split(',')
					.map(str::trim)
					.filter(|part| !part.is_empty())
					.filter_map(|part| part.parse::<i64>().ok())
					.collect()
			})
			.unwrap_or_default()
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Index {
	/// Translation visibility mode handed to the storage engine verbatim.
	pub language_mode: String,
	pub language_uid: i64,
	pub default_sort_field: Option<String>,
	pub default_sort_direction: Option<String>,
	pub traversal_limit: u32,
}
impl Default for Index {
	fn default() -> Self {
		Self {
			language_mode: default_language_mode(),
			language_uid: 0,
			default_sort_field: None,
			default_sort_direction: None,
			traversal_limit: 100,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Calendar {
	/// 0 = Sunday, 1 = Monday, ... 6 = Saturday.
	pub week_start: u8,
	pub utc_offset_seconds: i32,
}
impl Default for Calendar {
	fn default() -> Self {
		Self { week_start: 1, utc_offset_seconds: 0 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct List {
	/// "now" keeps the current time, "day" rewinds to the start of today.
	pub start_time: String,
	pub start_offset_hours: i64,
}
impl Default for List {
	fn default() -> Self {
		Self { start_time: "day".to_string(), start_offset_hours: 0 }
	}
}

fn default_language_mode() -> String {
	"strict".to_string()
}
