//! Dependency layer caching
//!
//! Installed Composer packages live in a layer that the lifecycle restores
//! between builds. A content fingerprint of the manifests and buildpack.yml
//! decides whether the restored layer can be reused as is.
//!
//! # Layer States
//!
//! | State | Next | Description |
//! |-------|------|-------------|
//! | Unknown | ReuseDecided, RebuildDecided | Nothing compared yet |
//! | ReuseDecided | - | Fingerprint matched, layer kept |
//! | RebuildDecided | Installing | Layer cleared, record invalidated |
//! | Installing | Installed, Failed | Composer is running |
//! | Installed | - | New fingerprint persisted |
//! | Failed | - | Record left invalid, next build reinstalls |

pub mod decision;
pub mod fingerprint;
pub mod metadata;

pub use decision::{decide, CachePolicy, LayerDecision};
pub use fingerprint::Fingerprint;
pub use metadata::{keys, FileMetadataStore, LayerFlags, MemoryStore, MetadataStore};

use crate::error::{ComposerError, ComposerResult};
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the layer holding installed packages
pub const PACKAGES_LAYER: &str = "php-composer-packages";

/// Sub-directory of the packages layer used as `COMPOSER_HOME`
pub const GLOBAL_DIR: &str = "global";

/// Lifecycle state of the dependency layer within one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Unknown,
    ReuseDecided,
    RebuildDecided,
    Installing,
    Installed,
    Failed,
}

impl fmt::Display for LayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::ReuseDecided => "reuse-decided",
            Self::RebuildDecided => "rebuild-decided",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// The installed-dependencies layer of one build
pub struct DependencyLayer<S: MetadataStore> {
    root: PathBuf,
    store: S,
    state: LayerState,
    fingerprint: Option<Fingerprint>,
}

impl<S: MetadataStore> DependencyLayer<S> {
    /// Layer rooted at `root` with metadata in `store`
    pub fn new(root: PathBuf, store: S) -> Self {
        Self {
            root,
            store,
            state: LayerState::Unknown,
            fingerprint: None,
        }
    }

    /// Layer directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for globally required packages
    pub fn global_dir(&self) -> PathBuf {
        self.root.join(GLOBAL_DIR)
    }

    /// Current state
    pub fn state(&self) -> LayerState {
        self.state
    }

    /// Backing metadata store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn transition(&mut self, from: LayerState, to: LayerState) -> ComposerResult<()> {
        if self.state != from {
            return Err(ComposerError::Internal(format!(
                "layer cannot move to {} from {} (expected {})",
                to, self.state, from
            )));
        }
        debug!("Layer state: {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Compare `current` against the persisted fingerprint.
    ///
    /// On rebuild the persisted fingerprint is invalidated first and the layer
    /// directory is emptied, so the installer always starts from nothing.
    pub async fn decide(
        &mut self,
        current: &Fingerprint,
        policy: CachePolicy,
    ) -> ComposerResult<LayerDecision> {
        let persisted = self.store.get(keys::FINGERPRINT).await?;
        let decision = decide(current, persisted.as_deref(), policy);

        match decision {
            LayerDecision::Reuse => {
                self.transition(LayerState::Unknown, LayerState::ReuseDecided)?;
            }
            LayerDecision::Rebuild => {
                self.transition(LayerState::Unknown, LayerState::RebuildDecided)?;
                if persisted.is_some_and(|previous| !previous.is_empty()) {
                    self.store.put(keys::FINGERPRINT, "").await?;
                }
                self.clear().await?;
            }
        }

        info!(
            "Dependency layer {} (fingerprint {}, {:?})",
            decision,
            current.short(),
            policy
        );
        self.fingerprint = Some(current.clone());
        Ok(decision)
    }

    async fn clear(&self) -> ComposerResult<()> {
        if fs::symlink_metadata(&self.root).await.is_ok() {
            debug!("Clearing layer {}", self.root.display());
            fs::remove_dir_all(&self.root).await.map_err(|e| {
                ComposerError::io(format!("clearing layer {}", self.root.display()), e)
            })?;
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ComposerError::io(format!("creating layer {}", self.root.display()), e))
    }

    /// Mark the start of the install sequence
    pub fn begin_install(&mut self) -> ComposerResult<()> {
        self.transition(LayerState::RebuildDecided, LayerState::Installing)
    }

    /// Persist the new fingerprint after every invocation succeeded.
    ///
    /// The fingerprint is written last; it is the commit point of the install.
    pub async fn complete_install(&mut self) -> ComposerResult<()> {
        let fingerprint = self
            .fingerprint
            .clone()
            .ok_or_else(|| ComposerError::Internal("layer completed without a fingerprint".into()))?;

        self.transition(LayerState::Installing, LayerState::Installed)?;
        self.store
            .put(keys::INSTALLED_AT, &Utc::now().to_rfc3339())
            .await?;
        self.store.put(keys::FINGERPRINT, fingerprint.as_str()).await?;
        Ok(())
    }

    /// Record a failed install; metadata is left invalidated
    pub fn fail_install(&mut self) {
        debug!("Layer state: {} -> {}", self.state, LayerState::Failed);
        self.state = LayerState::Failed;
    }
}

/// Copy a vendor directory the app ships with into the layer.
///
/// Only a real directory counts; an existing link from an earlier build is
/// ignored. Returns whether anything was copied.
pub async fn seed_from_app(app_path: &Path, layer_path: &Path) -> ComposerResult<bool> {
    match fs::symlink_metadata(app_path).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Ok(false),
    }

    debug!("Seeding {} from {}", layer_path.display(), app_path.display());
    copy_dir_all(app_path, layer_path).await?;
    Ok(true)
}

async fn copy_dir_all(src: &Path, dst: &Path) -> ComposerResult<()> {
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        fs::create_dir_all(&to)
            .await
            .map_err(|e| ComposerError::io(format!("creating directory {}", to.display()), e))?;

        let mut entries = fs::read_dir(&from)
            .await
            .map_err(|e| ComposerError::io(format!("reading directory {}", from.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ComposerError::io(format!("reading directory {}", from.display()), e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ComposerError::io(format!("inspecting {}", entry.path().display()), e))?;
            let src_path = entry.path();
            let dst_path = to.join(entry.file_name());

            if file_type.is_dir() {
                pending.push((src_path, dst_path));
            } else if file_type.is_symlink() {
                copy_link(&src_path, &dst_path).await?;
            } else {
                fs::copy(&src_path, &dst_path).await.map_err(|e| {
                    ComposerError::io(
                        format!("copying {} to {}", src_path.display(), dst_path.display()),
                        e,
                    )
                })?;
            }
        }
    }

    Ok(())
}

// vendor/bin entries are usually relative links; keep them as links
#[cfg(unix)]
async fn copy_link(src: &Path, dst: &Path) -> ComposerResult<()> {
    let target = fs::read_link(src)
        .await
        .map_err(|e| ComposerError::io(format!("reading link {}", src.display()), e))?;
    fs::symlink(&target, dst)
        .await
        .map_err(|e| ComposerError::io(format!("linking {}", dst.display()), e))
}

#[cfg(not(unix))]
async fn copy_link(src: &Path, dst: &Path) -> ComposerResult<()> {
    fs::copy(src, dst)
        .await
        .map(|_| ())
        .map_err(|e| ComposerError::io(format!("copying {}", src.display()), e))
}

/// Point `app_path` at `layer_path`.
///
/// A real directory at `app_path` is replaced, since its contents were
/// seeded into the layer. An existing link or file is left alone. Returns
/// whether a link was created.
pub async fn link_into_app(layer_path: &Path, app_path: &Path) -> ComposerResult<bool> {
    match fs::symlink_metadata(app_path).await {
        Ok(meta) if meta.is_dir() => {
            debug!("Replacing {} with a link into the layer", app_path.display());
            fs::remove_dir_all(app_path)
                .await
                .map_err(|e| ComposerError::io(format!("removing {}", app_path.display()), e))?;
        }
        Ok(_) => {
            debug!("{} already exists, not linking", app_path.display());
            return Ok(false);
        }
        Err(_) => {}
    }

    #[cfg(unix)]
    {
        fs::symlink(layer_path, app_path).await.map_err(|e| {
            ComposerError::io(
                format!("linking {} to {}", app_path.display(), layer_path.display()),
                e,
            )
        })?;
        debug!("Linked {} -> {}", app_path.display(), layer_path.display());
        Ok(true)
    }

    #[cfg(not(unix))]
    {
        debug!("Symlinks unsupported, leaving {} unlinked", layer_path.display());
        Ok(false)
    }
}
