use std::io::{self, Write};

use color_eyre::eyre::{eyre, Result};
use tracing::info;

use crate::{
    cli::{Command, ExtractArgs, TransformArgs, VisualiseArgs},
    import::folder::{display_name, read_folder, Strategy},
    render::render_to_png,
    transform::{transform_folder, MANIFEST_FILENAME},
};

/// Single entry point for every subcommand
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Extract(args) => extract(&args, &mut io::stdout().lock()),
        Command::Transform(args) => transform(&args, &mut io::stdout().lock()),
        Command::Visualise(args) => visualise(&args, &mut io::stdout().lock()),
    }
}

/// Print every point as `latitude,longitude`
fn extract(args: &ExtractArgs, out: &mut impl Write) -> Result<()> {
    let ingested = read_folder(&args.folder, Strategy::FailFast)?;
    let points = ingested.points();
    for point in &points {
        writeln!(out, "{},{}", point.latitude, point.longitude)?;
    }
    info!(
        "extracted {} point(s) from {} GPX file(s)",
        points.len(),
        ingested.files.len()
    );
    Ok(())
}

fn transform(args: &TransformArgs, out: &mut impl Write) -> Result<()> {
    let summary = transform_folder(&args.dir, &args.outdir)?;

    writeln!(out, "--------------------")?;
    writeln!(
        out,
        "Summary: Processed {} GPX file(s) from {}, total {} points, {:.2} km.",
        summary.processed_files,
        summary.input_dir.display(),
        summary.total_points,
        summary.total_distance / 1000.0
    )?;
    if let Some(manifest) = &summary.manifest {
        writeln!(out, "Manifest: {}", manifest.display())?;
    }
    if !summary.is_success() {
        writeln!(
            out,
            "Warning: Some files could not be processed successfully (see errors above)."
        )?;
        if summary.failures.is_empty() {
            return Err(eyre!("failed to write {}", MANIFEST_FILENAME));
        }
        let details: Vec<String> = summary
            .failures
            .iter()
            .map(|failure| format!("{}: {:#}", display_name(&failure.path), failure.error))
            .collect();
        return Err(eyre!(
            "{} file(s) failed transformation\n{}",
            summary.failures.len(),
            details.join("\n")
        ));
    }
    if summary.processed_files == 0 {
        writeln!(out, "No valid GPX files with track points found to process.")?;
    }
    writeln!(out, "Transformation complete.")?;
    Ok(())
}

fn visualise(args: &VisualiseArgs, out: &mut impl Write) -> Result<()> {
    let ingested = read_folder(&args.dir, Strategy::FailFast)?;
    let plan = render_to_png(&ingested.points(), &args.render_options(), &args.output)?;
    if !plan.is_empty() {
        let (width, height) = plan.raster_size();
        writeln!(
            out,
            "Wrote {} ({}x{} px, {} stroke(s))",
            args.output.display(),
            width,
            height,
            plan.strokes.len()
        )?;
    }
    Ok(())
}
