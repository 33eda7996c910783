use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, instrument, warn};

use crate::{
    import::folder::{display_name, read_folder, Failure, GpxFile, Strategy},
    track_geo::IntoTrackFeatureCollection,
};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Result of converting a directory of GPX files to GeoJSON
#[derive(Debug, Default)]
pub struct TransformSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Files that produced a `.geojson`
    pub processed_files: usize,
    pub total_points: usize,
    /// Metres along all written lines
    pub total_distance: f64,
    /// Output filenames in processing order
    pub written: Vec<String>,
    pub failures: Vec<Failure>,
    pub manifest: Option<PathBuf>,
    pub manifest_failed: bool,
}

impl TransformSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.manifest_failed
    }
}

/// What one input file turned into
#[derive(Debug)]
pub enum FileOutcome {
    Written {
        filename: String,
        points: usize,
        distance: f64,
    },
    /// Parsed fine but had no track points
    Empty,
}

pub fn output_filename(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.geojson", stem)
}

/// Convert every GPX file in `input_dir` to `<name>.geojson` in `output_dir`.
///
/// Files that cannot be read, parsed or written are logged and skipped. Only
/// problems with the directories themselves are returned as errors.
#[instrument]
pub fn transform_folder(input_dir: &Path, output_dir: &Path) -> Result<TransformSummary> {
    let input_dir = std::path::absolute(input_dir)
        .wrap_err_with(|| format!("invalid input directory {}", input_dir.display()))?;
    let output_dir = std::path::absolute(output_dir)
        .wrap_err_with(|| format!("invalid output directory {}", output_dir.display()))?;
    fs::create_dir_all(&output_dir).wrap_err_with(|| {
        format!("cannot create output directory {}", output_dir.display())
    })?;

    info!(
        "Transforming GPX files from {} to GeoJSON in {}",
        input_dir.display(),
        output_dir.display()
    );
    let ingested = read_folder(&input_dir, Strategy::BestEffort)?;

    let mut summary = TransformSummary {
        input_dir,
        output_dir,
        failures: ingested.failures,
        ..Default::default()
    };
    for file in &ingested.files {
        let result = write_geojson(file, &summary.output_dir);
        match Strategy::BestEffort.absorb(&file.path, result, &mut summary.failures)? {
            Some(FileOutcome::Written {
                filename,
                points,
                distance,
            }) => {
                info!(
                    "{} -> {} ({} points)",
                    display_name(&file.path),
                    filename,
                    points
                );
                summary.processed_files += 1;
                summary.total_points += points;
                summary.total_distance += distance;
                summary.written.push(filename);
            }
            Some(FileOutcome::Empty) => {
                info!("{} has no track points, skipped", display_name(&file.path))
            }
            None => {}
        }
    }

    if !summary.written.is_empty() {
        match write_manifest(&summary.output_dir, &summary.written) {
            Ok(manifest) => {
                info!("Generated manifest file: {}", manifest.display());
                summary.manifest = Some(manifest);
            }
            Err(err) => {
                warn!("Failed to write manifest file: {:#}", err);
                summary.manifest_failed = true;
            }
        }
    }
    Ok(summary)
}

/// Write the points of one decoded file as a single LineString feature
#[instrument(skip(file), fields(path = %file.path.display()))]
pub fn write_geojson(file: &GpxFile, output_dir: &Path) -> Result<FileOutcome> {
    let document = &file.document;
    let points = document.points().len();
    if points == 0 {
        return Ok(FileOutcome::Empty);
    }

    let feature_collection = document.into_track_feature_collection()?;
    let distance: f64 = feature_collection
        .features
        .iter()
        .filter_map(|feature| feature.property("distance")?.as_f64())
        .sum();
    let json = serde_json::to_string_pretty(&feature_collection)
        .wrap_err("failed to serialize GeoJSON")?;

    let filename = output_filename(&file.path);
    let output = output_dir.join(&filename);
    fs::write(&output, json)
        .wrap_err_with(|| format!("failed to write output file {}", output.display()))?;

    Ok(FileOutcome::Written {
        filename,
        points,
        distance,
    })
}

/// Write the list of generated files as a JSON array
pub fn write_manifest(output_dir: &Path, filenames: &[String]) -> Result<PathBuf> {
    let manifest = output_dir.join(MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(filenames).wrap_err("failed to serialize manifest")?;
    fs::write(&manifest, json)
        .wrap_err_with(|| format!("failed to write {}", manifest.display()))?;
    Ok(manifest)
}
