//! Visualization collaborator
//!
//! The analysis itself only hands snapshots to a [`Renderer`]; what gets
//! drawn (or whether anything gets drawn at all) is an implementation
//! choice. [`PngRenderer`] writes simple nodal scatter plots colored by
//! out-of-plane displacement, [`NullRenderer`] discards everything and is
//! the right choice for tests and headless use.

use std::path::PathBuf;

use image::{Rgb, RgbImage};

use crate::error::BucklingResult;
use crate::results::DeformedShape;

/// Sink for model and deformed-shape images
pub trait Renderer {
    /// Render the undeformed model topology under the given file stem
    fn render_model(&mut self, shape: &DeformedShape, name: &str) -> BucklingResult<()>;

    /// Render a deformed shape under the given file stem
    fn render_deformed(&mut self, shape: &DeformedShape, name: &str) -> BucklingResult<()>;
}

/// Renderer that discards all output
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_model(&mut self, _shape: &DeformedShape, _name: &str) -> BucklingResult<()> {
        Ok(())
    }

    fn render_deformed(&mut self, _shape: &DeformedShape, _name: &str) -> BucklingResult<()> {
        Ok(())
    }
}

/// Renderer writing one PNG per call into an output directory
#[derive(Debug, Clone)]
pub struct PngRenderer {
    out_dir: PathBuf,
    width: u32,
    height: u32,
}

impl PngRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            width: 800,
            height: 800,
        }
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn draw(&self, shape: &DeformedShape, name: &str, colored: bool) -> BucklingResult<()> {
        std::fs::create_dir_all(&self.out_dir)?;

        let mut img = RgbImage::from_pixel(self.width, self.height, Rgb([255, 255, 255]));

        let (min_x, max_x) = bounds(shape, 0);
        let (min_y, max_y) = bounds(shape, 1);
        let span_x = (max_x - min_x).max(f64::EPSILON);
        let span_y = (max_y - min_y).max(f64::EPSILON);
        let scale = shape.max_out_of_plane();

        let margin = 20.0;
        let draw_w = self.width as f64 - 2.0 * margin;
        let draw_h = self.height as f64 - 2.0 * margin;

        for node in &shape.nodes {
            let px = margin + (node.coords[0] - min_x) / span_x * draw_w;
            // Image rows grow downward, plate y grows upward
            let py = margin + (max_y - node.coords[1]) / span_y * draw_h;
            let color = if colored && scale > 0.0 {
                diverging_color(node.displacement[2] / scale)
            } else {
                Rgb([60, 60, 60])
            };
            blot(&mut img, px as i64, py as i64, color);
        }

        let path = self.out_dir.join(format!("{name}.png"));
        img.save(&path)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}

impl Renderer for PngRenderer {
    fn render_model(&mut self, shape: &DeformedShape, name: &str) -> BucklingResult<()> {
        self.draw(shape, name, false)
    }

    fn render_deformed(&mut self, shape: &DeformedShape, name: &str) -> BucklingResult<()> {
        self.draw(shape, name, true)
    }
}

fn bounds(shape: &DeformedShape, axis: usize) -> (f64, f64) {
    shape
        .nodes
        .iter()
        .map(|n| n.coords[axis])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Blue-white-red map over t in [-1, 1]
fn diverging_color(t: f64) -> Rgb<u8> {
    let t = t.clamp(-1.0, 1.0);
    let fade = |v: f64| (255.0 * (1.0 - v.abs())) as u8;
    if t < 0.0 {
        Rgb([fade(t), fade(t), 255])
    } else {
        Rgb([255, fade(t), fade(t)])
    }
}

/// Paint a 3x3 block so nodes stay visible at any canvas size
fn blot(img: &mut RgbImage, px: i64, py: i64, color: Rgb<u8>) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let (x, y) = (px + dx, py + dy);
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
