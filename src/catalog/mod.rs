pub mod builtin;

use serde::{Deserialize, Serialize};
use std::fs;

use crate::config::Config;
use crate::error::{Error, Result};

/// One `"<url>:<kind>"` entry from a group's artifact table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub source_url: String,
    pub kind: String,
}

impl ArtifactRef {
    /// Split an entry into source URL and destination kind on the final `:`.
    ///
    /// Kind labels are plain directory names (`vae`, `diffusion_models`),
    /// which keeps the scheme colon in `https://` from being mistaken for
    /// the separator and catches typos at load time instead of producing an
    /// odd `models/` subtree.
    pub fn parse(entry: &str) -> Result<Self> {
        let malformed = || Error::Config(format!("no url:kind separator in entry '{}'", entry));

        let (url, kind) = entry.rsplit_once(':').ok_or_else(malformed)?;
        if url.is_empty() || !is_kind_label(kind) {
            return Err(malformed());
        }

        Ok(Self {
            source_url: url.to_string(),
            kind: kind.to_string(),
        })
    }
}

fn is_kind_label(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A named model group: an ordered artifact table plus its default
/// enablement, overridable from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    pub entries: Vec<String>,
}

/// The full group table, in declaration order. Built once at startup and
/// never mutated afterwards.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    groups: Vec<GroupDef>,
}

/// Which groups an individual run will touch.
#[derive(Debug)]
pub struct Resolution<'a> {
    /// Enabled groups, in catalog declaration order.
    pub enabled: Vec<&'a GroupDef>,
    /// Override flags naming groups the catalog does not define.
    pub unknown: Vec<String>,
}

impl Catalog {
    /// Built-in groups, extended/overridden by the workspace `models.toml`
    /// when one exists.
    pub fn load(config: &Config) -> Result<Self> {
        let mut catalog = builtin::catalog();

        if config.catalog_path.exists() {
            let content = fs::read_to_string(&config.catalog_path)?;
            let extra: Catalog = toml::from_str(&content)?;
            for group in extra.groups {
                catalog.upsert(group);
            }
        }

        Ok(catalog)
    }

    pub fn new(groups: Vec<GroupDef>) -> Self {
        Self { groups }
    }

    fn upsert(&mut self, group: GroupDef) {
        match self.groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
    }

    pub fn get(&self, name: &str) -> Option<&GroupDef> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> &[GroupDef] {
        &self.groups
    }

    /// Resolve which groups are enabled for this run.
    ///
    /// `DOWNLOAD_ALL` wins over everything; otherwise a per-group flag wins
    /// over the group's declared default. Flags naming an undefined group
    /// are collected for reporting, never fatal.
    pub fn resolve(&self, config: &Config) -> Resolution<'_> {
        let mut unknown: Vec<String> = config
            .group_flags
            .keys()
            .filter(|name| self.get(name).is_none())
            .cloned()
            .collect();
        unknown.sort();

        let enabled = self
            .groups
            .iter()
            .filter(|group| {
                config.download_all
                    || *config.group_flags.get(&group.name).unwrap_or(&group.enabled)
            })
            .collect();

        Resolution { enabled, unknown }
    }
}
