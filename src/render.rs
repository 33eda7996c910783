//! Path visualisation: project track points onto the pixel grid of one zoom
//! level and stroke them into a PNG.

use std::path::Path;

use color_eyre::eyre::{eyre, Result};
use plotters::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    projection::{lat_lon_to_pixels, origin_pixels},
    types::{geom::Pixel, track::LatLng},
};

pub const DEFAULT_ZOOM: u8 = 16;
pub const DEFAULT_GAP_THRESHOLD: f64 = 20.0;
pub const DEFAULT_STROKE_WIDTH: u32 = 5;
/// Largest raster drawn, in pixels (about 200 MB of RGB)
pub const MAX_CANVAS_PIXELS: u32 = 1 << 26;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub zoom: u8,
    /// Consecutive pixels further apart than this are not joined
    pub gap_threshold: f64,
    pub stroke_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            zoom: DEFAULT_ZOOM,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Everything needed to rasterize one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    pub width: u32,
    pub height: u32,
    /// Polylines in raster space (row 0 at the top)
    pub strokes: Vec<Vec<Pixel>>,
}

impl PathPlan {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }

    /// Bitmap dimensions, with a zero-sized axis drawn one pixel wide
    pub fn raster_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }

    /// Fails when the raster would exceed [`MAX_CANVAS_PIXELS`]
    pub fn check_raster_size(&self) -> Result<(u32, u32)> {
        let (width, height) = self.raster_size();
        match width.checked_mul(height) {
            Some(pixels) if pixels <= MAX_CANVAS_PIXELS => Ok((width, height)),
            _ => Err(eyre!(
                "canvas {}x{} too large, lower --zoom",
                width,
                height
            )),
        }
    }
}

/// Project points to pixels relative to the lat 0, lon 0 pixel
pub fn project(points: &[LatLng], zoom: u8) -> Vec<Pixel> {
    let origin = origin_pixels(zoom);
    points
        .iter()
        .map(|point| {
            let pixel = lat_lon_to_pixels(*point, zoom);
            Pixel::new(pixel.x - origin.x, pixel.y - origin.y)
        })
        .collect()
}

/// Shift pixels so the bounding box starts at (0, 0) and return its far corner
pub fn normalize(pixels: &mut [Pixel]) -> Pixel {
    let (min_x, min_y) = pixels
        .iter()
        .fold((f64::INFINITY, f64::INFINITY), |(min_x, min_y), p| {
            (min_x.min(p.x), min_y.min(p.y))
        });

    let mut max = Pixel::new(0.0, 0.0);
    for pixel in pixels.iter_mut() {
        pixel.x -= min_x;
        pixel.y -= min_y;
        max.x = max.x.max(pixel.x);
        max.y = max.y.max(pixel.y);
    }
    max
}

/// Flip to raster orientation, where y grows downwards
pub fn invert_y(pixels: &mut [Pixel], max_y: f64) {
    for pixel in pixels.iter_mut() {
        pixel.y = max_y - pixel.y;
    }
}

/// Split an ordered run of pixels into polylines.
///
/// A jump strictly longer than `gap_threshold` starts a new polyline, so GPS
/// dropouts and the hop from one file to the next are not drawn as edges.
pub fn split_strokes(pixels: &[Pixel], gap_threshold: f64) -> Vec<Vec<Pixel>> {
    let mut strokes = Vec::new();
    let mut current: Vec<Pixel> = Vec::new();
    for pixel in pixels {
        if let Some(last) = current.last() {
            if last.distance(pixel) > gap_threshold {
                strokes.push(std::mem::take(&mut current));
            }
        }
        current.push(*pixel);
    }
    if !current.is_empty() {
        strokes.push(current);
    }
    strokes
}

pub fn plan(points: &[LatLng], options: &RenderOptions) -> PathPlan {
    let mut pixels = project(points, options.zoom);
    let max = normalize(&mut pixels);
    invert_y(&mut pixels, max.y);
    PathPlan {
        width: max.x as u32,
        height: max.y as u32,
        strokes: split_strokes(&pixels, options.gap_threshold),
    }
}

/// White canvas, black strokes
#[instrument(skip(plan))]
pub fn draw_png(plan: &PathPlan, output: &Path, stroke_width: u32) -> Result<()> {
    let size = plan.check_raster_size()?;
    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;
    let style = BLACK.stroke_width(stroke_width);
    for stroke in plan.strokes.iter().filter(|stroke| stroke.len() > 1) {
        let coords: Vec<(i32, i32)> = stroke.iter().map(|pixel| pixel.to_backend()).collect();
        root.draw(&PathElement::new(coords, style))?;
    }
    root.present()?;
    Ok(())
}

/// Plan and draw all points as one path; nothing is written when there are no points
#[instrument(skip(points))]
pub fn render_to_png(
    points: &[LatLng],
    options: &RenderOptions,
    output: &Path,
) -> Result<PathPlan> {
    let plan = plan(points, options);
    if plan.is_empty() {
        warn!("no track points to draw, {} not written", output.display());
        return Ok(plan);
    }
    info!(
        "drawing {} point(s) in {} stroke(s) on a {}x{} canvas",
        plan.point_count(),
        plan.strokes.len(),
        plan.width,
        plan.height
    );
    draw_png(&plan, output, options.stroke_width)?;
    Ok(plan)
}
