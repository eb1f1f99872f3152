mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Calendar, Config, Index, List, Postgres, Scopes, Service, Storage};

use std::{fs, path::Path};

const MAX_UTC_OFFSET_SECONDS: i32 = 86_399;
const MAX_LIST_START_OFFSET_HOURS: i64 = 8_760;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.index.language_mode.trim().is_empty() {
		return Err(Error::Validation {
			message: "index.language_mode must be non-empty.".to_string(),
		});
	}
	if cfg.index.traversal_limit == 0 {
		return Err(Error::Validation {
			message: "index.traversal_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.calendar.week_start > 6 {
		return Err(Error::Validation {
			message: "calendar.week_start must be in the range 0-6.".to_string(),
		});
	}
	if !(-MAX_UTC_OFFSET_SECONDS..=MAX_UTC_OFFSET_SECONDS)
		.contains(&cfg.calendar.utc_offset_seconds)
	{
		return Err(Error::Validation {
			message: format!(
				"calendar.utc_offset_seconds must be within +/-{MAX_UTC_OFFSET_SECONDS}."
			),
		});
	}
	if !matches!(cfg.list.start_time.as_str(), "now" | "day") {
		return Err(Error::Validation {
			message: "list.start_time must be one of now or day.".to_string(),
		});
	}
	if !(-MAX_LIST_START_OFFSET_HOURS..=MAX_LIST_START_OFFSET_HOURS)
		.contains(&cfg.list.start_offset_hours)
	{
		return Err(Error::Validation {
			message: format!(
				"list.start_offset_hours must be within +/-{MAX_LIST_START_OFFSET_HOURS}."
			),
		});
	}

	if let Some(raw) = cfg.scopes.backend_default_pids.as_deref() {
		for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
			if part.parse::<i64>().is_err() {
				return Err(Error::Validation {
					message: format!(
						"scopes.backend_default_pids contains a non-numeric pid '{part}'."
					),
				});
			}
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.scopes.backend_default_pids.as_deref().map(|raw| raw.trim().is_empty()).unwrap_or(false)
	{
		cfg.scopes.backend_default_pids = None;
	}
	if cfg.index.default_sort_field.as_deref().map(|field| field.trim().is_empty()).unwrap_or(false)
	{
		cfg.index.default_sort_field = None;
	}
	if cfg
		.index
		.default_sort_direction
		.as_deref()
		.map(|direction| direction.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.index.default_sort_direction = None;
	}

	let mut seen = Vec::with_capacity(cfg.scopes.storage_pids.len());

	cfg.scopes.storage_pids.retain(|pid| {
		if seen.contains(pid) {
			return false;
		}

		seen.push(*pid);

		true
	});
}
