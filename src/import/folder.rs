use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Report, Result, WrapErr};
use tracing::{debug, error, info, instrument};

use crate::{
    import::gpx::read_file,
    types::track::{GpxDocument, LatLng},
};

/// How a multi-file operation reacts to a file that cannot be read or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Stop at the first broken file and return its error
    FailFast,
    /// Log and record the broken file, then carry on with the rest
    BestEffort,
}

/// A file that was skipped under [`Strategy::BestEffort`]
#[derive(Debug)]
pub struct Failure {
    pub path: PathBuf,
    pub error: Report,
}

impl Strategy {
    /// Apply the strategy to the outcome for one file.
    ///
    /// Returns `Ok(None)` for a failure that was recorded in `failures`.
    pub fn absorb<T>(
        self,
        path: &Path,
        result: Result<T>,
        failures: &mut Vec<Failure>,
    ) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self {
                Strategy::FailFast => Err(err),
                Strategy::BestEffort => {
                    error!("Error processing {}: {:#}", display_name(path), err);
                    failures.push(Failure {
                        path: path.to_owned(),
                        error: err,
                    });
                    Ok(None)
                }
            },
        }
    }
}

/// A decoded file along with where it came from
#[derive(Debug)]
pub struct GpxFile {
    pub path: PathBuf,
    pub document: GpxDocument,
}

#[derive(Debug, Default)]
pub struct Ingested {
    pub files: Vec<GpxFile>,
    pub failures: Vec<Failure>,
}

impl Ingested {
    pub fn documents(&self) -> impl Iterator<Item = &GpxDocument> {
        self.files.iter().map(|file| &file.document)
    }

    /// Every point of every file, files in listing order and points in document order
    pub fn points(&self) -> Vec<LatLng> {
        self.documents().flat_map(GpxDocument::points).collect()
    }
}

/// True for `*.gpx`, compared case-insensitively
pub fn has_gpx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gpx"))
}

/// Non-recursive listing of the GPX files in `dir`, sorted by file name
pub fn gpx_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in
        fs::read_dir(dir).wrap_err_with(|| format!("cannot read directory {}", dir.display()))?
    {
        let entry = entry.wrap_err_with(|| format!("cannot read directory {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type()?.is_dir() || !has_gpx_extension(&path) {
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Decode every GPX file in `dir`, in listing order
#[instrument]
pub fn read_folder(dir: &Path, strategy: Strategy) -> Result<Ingested> {
    let mut ingested = Ingested::default();
    for path in gpx_paths(dir)? {
        let result = read_file(&path);
        if let Some(document) = strategy.absorb(&path, result, &mut ingested.failures)? {
            debug!(
                "{}: {} point(s)",
                display_name(&path),
                document.points().len()
            );
            ingested.files.push(GpxFile { path, document });
        }
    }
    info!(
        "read {} GPX file(s) from {}",
        ingested.files.len(),
        dir.display()
    );
    Ok(ingested)
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
