use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Prefix for per-group enable overrides (`DOWNLOAD_SDXL=true`).
pub const GROUP_FLAG_PREFIX: &str = "DOWNLOAD_";
/// Global override that forces every group on.
pub const ALL_FLAG: &str = "DOWNLOAD_ALL";

#[derive(Debug, Clone)]
pub struct Config {
	pub workspace: PathBuf,
	pub models_dir: PathBuf,
	pub catalog_path: PathBuf,
	pub nodes_dir: PathBuf,
	pub hf_token: Option<String>,
	pub download_all: bool,
	pub group_flags: HashMap<String, bool>,
}

impl Config {
	pub fn from_env() -> Result<Self> {
		let workspace = match std::env::var("WORKSPACE") {
			Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
			_ => {
				let project_dirs = ProjectDirs::from("", "", "provy")
					.ok_or_else(|| Error::Config("Could not determine workspace directory".to_string()))?;
				project_dirs.data_dir().to_path_buf()
			}
		};

		let hf_token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
		let (download_all, group_flags) = scan_flags(std::env::vars());

		Ok(Self {
			models_dir: workspace.join("models"),
			catalog_path: workspace.join("models.toml"),
			nodes_dir: workspace.join("custom_nodes"),
			workspace,
			hf_token,
			download_all,
			group_flags,
		})
	}
}

/// Environment values are booleans only when they equal the literal `true`.
pub fn flag(value: &str) -> bool {
	value == "true"
}

fn scan_flags(vars: impl Iterator<Item = (String, String)>) -> (bool, HashMap<String, bool>) {
	let mut download_all = false;
	let mut group_flags = HashMap::new();
	for (key, value) in vars {
		if key == ALL_FLAG {
			download_all = flag(&value);
		} else if let Some(name) = key.strip_prefix(GROUP_FLAG_PREFIX) {
			if !name.is_empty() {
				group_flags.insert(name.to_string(), flag(&value));
			}
		}
	}
	(download_all, group_flags)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Iterator<Item = (String, String)> + 'a {
		pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()))
	}

	#[test]
	fn only_the_true_literal_is_truthy() {
		assert!(flag("true"));
		assert!(!flag("TRUE"));
		assert!(!flag("1"));
		assert!(!flag("yes"));
		assert!(!flag(""));
	}

	#[test]
	fn scan_picks_up_global_and_group_flags() {
		let (all, flags) = scan_flags(vars(&[
			("DOWNLOAD_ALL", "true"),
			("DOWNLOAD_SDXL", "true"),
			("DOWNLOAD_FLUX", "false"),
			("PATH", "/usr/bin"),
		]));
		assert!(all);
		assert_eq!(flags.get("SDXL"), Some(&true));
		assert_eq!(flags.get("FLUX"), Some(&false));
		assert_eq!(flags.len(), 2);
	}

	#[test]
	fn all_flag_is_not_a_group_flag() {
		let (all, flags) = scan_flags(vars(&[("DOWNLOAD_ALL", "false")]));
		assert!(!all);
		assert!(flags.is_empty());
	}
}
