//! Idempotent fetch-if-absent downloading of hub artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::{Api, ApiBuilder};
use hf_hub::{Repo, RepoType};
use tracing::{debug, info};

use crate::catalog::ArtifactRef;
use crate::error::{Error, Result};
use crate::hub::RepoFile;

/// Transfer mechanism behind the fetcher. The production implementation
/// talks to the hub; tests substitute a local one.
pub trait Transport {
    /// Fetch one file of a repo revision, returning where it landed.
    fn fetch(&self, file: &RepoFile) -> Result<PathBuf>;
}

/// hf-hub backed transport. Authenticated when a token is configured,
/// anonymous otherwise; a missing token never aborts the run, it only
/// restricts fetches to public artifacts.
pub struct HubTransport {
    api: Api,
}

impl HubTransport {
    pub fn new(token: Option<String>) -> Result<Self> {
        let api = ApiBuilder::new()
            .with_token(token)
            .build()
            .map_err(|e| Error::Transfer(e.to_string()))?;
        Ok(Self { api })
    }
}

impl Transport for HubTransport {
    fn fetch(&self, file: &RepoFile) -> Result<PathBuf> {
        let repo = Repo::with_revision(
            file.repo_id.clone(),
            RepoType::Model,
            file.revision.clone(),
        );
        self.api
            .repo(repo)
            .get(&file.remote_path())
            .map_err(|e| Error::Transfer(e.to_string()))
    }
}

/// A fully resolved artifact: where it comes from and where it must end up.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub file: RepoFile,
    pub kind: String,
}

impl DownloadTarget {
    pub fn new(artifact: &ArtifactRef) -> Result<Self> {
        let file = RepoFile::parse(&artifact.source_url)?;
        Ok(Self {
            file,
            kind: artifact.kind.clone(),
        })
    }

    /// Local directory mirroring the remote namespace:
    /// `<models_dir>/<kind>/<namespace>/<repo-name>`. Remote subfolders are
    /// not part of the local layout.
    pub fn output_dir(&self, models_dir: &Path) -> PathBuf {
        let mut dir = models_dir.join(&self.kind);
        for segment in self.file.repo_id.split('/') {
            dir.push(segment);
        }
        dir
    }
}

/// Outcome of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// File already on disk, no transfer attempted.
    Present,
    /// File transferred and staged at the flat destination.
    Downloaded,
}

pub struct Fetcher<T> {
    transport: T,
    models_dir: PathBuf,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, models_dir: PathBuf) -> Self {
        Self {
            transport,
            models_dir,
        }
    }

    /// Ensure the target exists at its flat destination path.
    ///
    /// Presence is trusted as a completeness proxy: an existing file is
    /// never re-fetched and never verified.
    pub fn ensure(&self, target: &DownloadTarget) -> Result<FetchOutcome> {
        let out_dir = target.output_dir(&self.models_dir);
        fs::create_dir_all(&out_dir)?;

        let dest = out_dir.join(&target.file.filename);
        if dest.exists() {
            debug!("{} already present, skipping", dest.display());
            return Ok(FetchOutcome::Present);
        }

        info!("Fetching {} -> {}", target.file.remote_path(), dest.display());
        let fetched = self.transport.fetch(&target.file)?;
        stage(&fetched, &dest)?;

        Ok(FetchOutcome::Downloaded)
    }
}

/// Relocate a fetched file to its flat destination. The transport may hand
/// back a cache path or a nested subfolder path; either way the artifact
/// must end up directly under the output directory. Hard-link when the
/// filesystem allows it, copy otherwise.
fn stage(fetched: &Path, dest: &Path) -> Result<()> {
    if fetched == dest {
        return Ok(());
    }
    if fs::hard_link(fetched, dest).is_ok() {
        return Ok(());
    }
    fs::copy(fetched, dest).map_err(|e| {
        // An interrupted copy must not leave a truncated file that a later
        // run's existence check would trust as complete.
        let _ = fs::remove_file(dest);
        Error::Stage(format!(
            "{} -> {}: {}",
            fetched.display(),
            dest.display(),
            e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const VAE_URL: &str =
        "https://huggingface.co/StableDiffusionVN/Flux/resolve/main/Vae/flux_vae.safetensors";

    fn vae_target() -> DownloadTarget {
        DownloadTarget::new(&ArtifactRef {
            source_url: VAE_URL.to_string(),
            kind: "vae".to_string(),
        })
        .unwrap()
    }

    /// Writes a dummy payload into a scratch directory and counts calls.
    struct FakeTransport {
        calls: Rc<Cell<usize>>,
        scratch: PathBuf,
        fail: bool,
        /// Report success but hand back a path that does not exist, so
        /// staging cannot link or copy it.
        vanish: bool,
    }

    impl Transport for FakeTransport {
        fn fetch(&self, file: &RepoFile) -> Result<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(Error::Transfer("404".to_string()));
            }
            let path = self.scratch.join(&file.filename);
            if !self.vanish {
                fs::write(&path, b"weights")?;
            }
            Ok(path)
        }
    }

    fn fetcher(
        root: &Path,
        fail: bool,
    ) -> (Fetcher<FakeTransport>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let scratch = root.join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let transport = FakeTransport {
            calls: Rc::clone(&calls),
            scratch,
            fail,
            vanish: false,
        };
        (Fetcher::new(transport, root.join("models")), calls)
    }

    #[test]
    fn output_dir_mirrors_the_remote_namespace() {
        let target = vae_target();
        assert_eq!(
            target.output_dir(Path::new("models")),
            Path::new("models/vae/StableDiffusionVN/Flux")
        );
        assert_eq!(target.file.filename, "flux_vae.safetensors");
        assert_eq!(target.file.subfolder, "Vae");
    }

    #[test]
    fn second_ensure_short_circuits_without_a_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(dir.path(), false);
        let target = vae_target();

        assert_eq!(fetcher.ensure(&target).unwrap(), FetchOutcome::Downloaded);
        assert_eq!(fetcher.ensure(&target).unwrap(), FetchOutcome::Present);
        assert_eq!(calls.get(), 1);

        let dest = dir
            .path()
            .join("models/vae/StableDiffusionVN/Flux/flux_vae.safetensors");
        assert!(dest.is_file());
    }

    #[test]
    fn nested_remote_files_land_flat() {
        // The remote path carries a Vae/ subfolder; the local file must not.
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, _) = fetcher(dir.path(), false);

        fetcher.ensure(&vae_target()).unwrap();

        let flat = dir
            .path()
            .join("models/vae/StableDiffusionVN/Flux/flux_vae.safetensors");
        assert!(flat.is_file());
        assert!(!dir
            .path()
            .join("models/vae/StableDiffusionVN/Flux/Vae")
            .exists());
    }

    #[test]
    fn transfer_failure_leaves_no_destination_file() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(dir.path(), true);

        let err = fetcher.ensure(&vae_target()).unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
        assert_eq!(calls.get(), 1);
        assert!(!dir
            .path()
            .join("models/vae/StableDiffusionVN/Flux/flux_vae.safetensors")
            .exists());
    }

    #[test]
    fn staging_failure_is_a_stage_error_with_no_leftover_file() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Rc::new(Cell::new(0));
        let scratch = dir.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let transport = FakeTransport {
            calls: Rc::clone(&calls),
            scratch,
            fail: false,
            vanish: true,
        };
        let fetcher = Fetcher::new(transport, dir.path().join("models"));

        let err = fetcher.ensure(&vae_target()).unwrap_err();
        assert!(matches!(err, Error::Stage(_)));
        assert!(!dir
            .path()
            .join("models/vae/StableDiffusionVN/Flux/flux_vae.safetensors")
            .exists());
    }

    #[test]
    fn pre_seeded_file_counts_as_present() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(dir.path(), false);
        let target = vae_target();

        let out_dir = target.output_dir(&dir.path().join("models"));
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(out_dir.join("flux_vae.safetensors"), b"already here").unwrap();

        assert_eq!(fetcher.ensure(&target).unwrap(), FetchOutcome::Present);
        assert_eq!(calls.get(), 0);
    }
}
