//! Workspace (host session) handling and temporary layer cleanup.
//!
//! A workspace is a directory holding named layers:
//!
//! ```text
//! <workspace>/raster/<name>.asc       ESRI ASCII grids
//! <workspace>/vector/<name>.geojson   GeoJSON feature collections
//! ```
//!
//! Opening a [`Session`] is the precondition for any run. Temporary layers
//! created during a run are registered with a [`TempLayerGuard`] right after
//! creation and removed when the guard is released or dropped, whichever comes
//! first, so every exit path cleans up exactly once.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Environment variable naming the workspace directory.
pub const WORKSPACE_ENV: &str = "HYDROSITE_WORKSPACE";

/// Name of the dissolved river layer created by `--clean`.
pub const CLEAN_RIVER_LAYER: &str = "river_clean";

/// Temporary vector layers a run may create.
pub const TEMPORARY_VECTORS: &[&str] = &[CLEAN_RIVER_LAYER];

const RASTER_DIR: &str = "raster";
const VECTOR_DIR: &str = "vector";
const RASTER_EXT: &str = "asc";
const VECTOR_EXT: &str = "geojson";

/// Layer families stored in a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Raster,
    Vector,
}

impl LayerKind {
    fn label(self) -> &'static str {
        match self {
            LayerKind::Raster => "raster",
            LayerKind::Vector => "vector",
        }
    }

    fn dir(self) -> &'static str {
        match self {
            LayerKind::Raster => RASTER_DIR,
            LayerKind::Vector => VECTOR_DIR,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            LayerKind::Raster => RASTER_EXT,
            LayerKind::Vector => VECTOR_EXT,
        }
    }
}

/// Open workspace.
#[derive(Debug, Clone)]
pub struct Session {
    root: PathBuf,
    overwrite: bool,
}

impl Session {
    /// Open the workspace at `root`.
    ///
    /// Fails with [`Error::SessionUnavailable`] when no root is given or it is
    /// not an existing directory.
    pub fn open(root: Option<&Path>, overwrite: bool) -> Result<Self> {
        let root = root.ok_or_else(|| Error::SessionUnavailable {
            reason: format!("set {WORKSPACE_ENV} or pass --workspace"),
        })?;
        if !root.is_dir() {
            return Err(Error::SessionUnavailable {
                reason: format!("{} is not a directory", root.display()),
            });
        }
        debug!(root = %root.display(), overwrite, "opened workspace");
        Ok(Self {
            root: root.to_path_buf(),
            overwrite,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// File backing layer `name`; the name is validated first.
    pub fn layer_path(&self, kind: LayerKind, name: &str) -> Result<PathBuf> {
        validate_layer_name(name)?;
        Ok(self
            .root
            .join(kind.dir())
            .join(format!("{name}.{}", kind.extension())))
    }

    pub fn layer_exists(&self, kind: LayerKind, name: &str) -> Result<bool> {
        Ok(self.layer_path(kind, name)?.exists())
    }

    /// Path of an existing input layer.
    pub fn find_layer(&self, kind: LayerKind, name: &str) -> Result<PathBuf> {
        let path = self.layer_path(kind, name)?;
        if !path.is_file() {
            return Err(Error::LayerNotFound {
                kind: kind.label(),
                name: name.to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// Path an output layer may be written to.
    pub fn output_layer(&self, kind: LayerKind, name: &str) -> Result<PathBuf> {
        let path = self.layer_path(kind, name)?;
        if path.exists() && !self.overwrite {
            return Err(Error::LayerExists {
                name: name.to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// Refuse to run when a temporary vector name is already taken, unless
    /// overwriting was requested.
    pub fn check_temporary_vectors(&self, names: &[&str]) -> Result<()> {
        if self.overwrite {
            return Ok(());
        }
        for name in names {
            if self.layer_exists(LayerKind::Vector, name)? {
                return Err(Error::TemporaryLayerExists {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn validate_layer_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidLayerName {
            name: name.to_string(),
        })
    }
}

/// Owner of the temporary layers created during a run.
#[derive(Debug)]
pub struct TempLayerGuard<'a> {
    session: &'a Session,
    layers: Vec<(LayerKind, String)>,
}

impl<'a> TempLayerGuard<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            layers: Vec::new(),
        }
    }

    /// Take ownership of a layer that was just created.
    pub fn register(&mut self, kind: LayerKind, name: &str) {
        debug!(layer = name, kind = kind.label(), "registered temporary layer");
        self.layers.push((kind, name.to_string()));
    }

    /// Register layer `name`, then create it with `write`.
    ///
    /// The layer is owned by the guard before `write` runs, so a write that
    /// fails half way still has its partial file removed.
    pub fn create<T, F>(&mut self, kind: LayerKind, name: &str, write: F) -> Result<T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let path = self.session.layer_path(kind, name)?;
        self.register(kind, name);
        write(&path)
    }

    /// Names of the layers still owned by the guard.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(_, name)| name.as_str())
    }

    /// Remove every registered layer now, reporting the first failure.
    ///
    /// All layers are attempted even when one fails; nothing is left for the
    /// destructor afterwards.
    pub fn release(mut self) -> Result<()> {
        self.remove_all()
    }

    fn remove_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for (kind, name) in self.layers.drain(..) {
            let outcome = self
                .session
                .layer_path(kind, &name)
                .and_then(|path| remove_layer_file(&path));
            match outcome {
                Ok(()) => info!(layer = %name, "removed temporary layer"),
                Err(error) => {
                    warn!(layer = %name, %error, "failed to remove temporary layer");
                    first_error.get_or_insert(error);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for TempLayerGuard<'_> {
    fn drop(&mut self) {
        if !self.layers.is_empty() {
            let _ = self.remove_all();
        }
    }
}

fn remove_layer_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
