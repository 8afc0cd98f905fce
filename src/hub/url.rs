//! Pure parser for hub resolve-URLs. No network access, no side effects.

use crate::error::{Error, Result};

const HOST: &str = "huggingface.co";
const RESOLVE: &str = "resolve";

/// A file coordinate inside a hub repository, extracted from a URL of the
/// shape `…huggingface.co/<ns>/<repo>/resolve/<rev>/[<subfolder>/]<file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// Two-level repository id, `<namespace>/<repo-name>`.
    pub repo_id: String,
    pub revision: String,
    /// Path between the revision and the filename; empty when the file
    /// sits at the repository root.
    pub subfolder: String,
    pub filename: String,
}

impl RepoFile {
    pub fn parse(url: &str) -> Result<Self> {
        let malformed = || Error::Parse(url.to_string());

        // Exact host comparison; a lookalike host that merely ends in
        // the hub's name must not parse.
        let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
        let (host, path) = rest.split_once('/').ok_or_else(malformed)?;
        if host != HOST {
            return Err(malformed());
        }
        // Download URLs often carry a `?download=true` suffix.
        let path = path.split('?').next().unwrap_or(path);

        // <ns> / <repo> / resolve / <rev> / [<subfolder>…] / <file>
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 5 || segments[2] != RESOLVE {
            return Err(malformed());
        }

        Ok(Self {
            repo_id: format!("{}/{}", segments[0], segments[1]),
            revision: segments[3].to_string(),
            subfolder: segments[4..segments.len() - 1].join("/"),
            filename: segments[segments.len() - 1].to_string(),
        })
    }

    /// Path of the file inside the remote repository.
    pub fn remote_path(&self) -> String {
        if self.subfolder.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.subfolder, self.filename)
        }
    }
}
