//! Custom-node installation: shallow git clones into `custom_nodes/`.
//!
//! Same best-effort semantics as model fetching: a node already on disk is
//! skipped, a failed clone is logged and the rest proceed.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

use crate::error::{Error, Result};

/// Plugin repositories installed into the workspace.
pub const NODE_REPOS: &[&str] = &[
    "https://github.com/ltdrdata/ComfyUI-Manager",
    "https://github.com/cubiq/ComfyUI_IPAdapter_plus",
    "https://github.com/Fannovel16/comfyui_controlnet_aux",
    "https://github.com/rgthree/rgthree-comfy",
];

/// Directory name for a node repo: final URL segment, `.git` trimmed.
/// A URL without at least `<host>/<owner>/<repo>` yields nothing.
pub fn repo_name(url: &str) -> Option<&str> {
    let trimmed = url.trim_end_matches('/');
    let (_, name) = trimmed.rsplit_once('/')?;
    let name = name.trim_end_matches(".git");
    if name.is_empty() || trimmed.split('/').count() < 5 {
        return None;
    }
    Some(name)
}

/// Clone every listed node repo that is not already present. Returns how
/// many were newly installed.
pub fn install(nodes_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(nodes_dir)?;

    let mut installed = 0;
    for url in NODE_REPOS {
        let Some(name) = repo_name(url) else {
            warn!("Cannot derive a directory name from '{}', skipping", url);
            continue;
        };
        let dest = nodes_dir.join(name);
        if dest.exists() {
            info!("Node {} already installed", name);
            continue;
        }
        match clone(url, &dest) {
            Ok(()) => {
                info!("Installed node {}", name);
                installed += 1;
            }
            Err(e) => warn!("Failed to install {}: {}", name, e),
        }
    }
    Ok(installed)
}

// Discrete argv, never a shell string.
fn clone(url: &str, dest: &Path) -> Result<()> {
    let status = Command::new("git")
        .args(["clone", "--depth", "1", url])
        .arg(dest)
        .status()?;
    if !status.success() {
        return Err(Error::Transfer(format!("git clone exited with {}", status)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_name_is_the_last_url_segment() {
        assert_eq!(
            repo_name("https://github.com/ltdrdata/ComfyUI-Manager"),
            Some("ComfyUI-Manager")
        );
        assert_eq!(
            repo_name("https://github.com/rgthree/rgthree-comfy.git"),
            Some("rgthree-comfy")
        );
        assert_eq!(
            repo_name("https://github.com/cubiq/ComfyUI_IPAdapter_plus/"),
            Some("ComfyUI_IPAdapter_plus")
        );
    }

    #[test]
    fn degenerate_urls_yield_no_name() {
        assert_eq!(repo_name(""), None);
        assert_eq!(repo_name("https://github.com"), None);
    }

    #[test]
    fn builtin_node_list_is_well_formed() {
        for url in NODE_REPOS {
            assert!(repo_name(url).is_some(), "bad node url: {}", url);
        }
    }
}
