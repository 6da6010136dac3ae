use std::path::Path;

use rerun::{Color, LineStrips3D, Points3D, RecordingStreamBuilder, TextDocument, ViewCoordinates};

use crate::error::{CalibrationError, Result};
use crate::plot::{PlotScene, PlotStyle, Visualizer};

const ROOT: &str = "calibration";
const APP_ID: &str = "hard_iron_calibration";

/// Rerun 3D visualization of a hard iron calibration
pub struct RerunLogger {
    rec: rerun::RecordingStream,
    line_radius: f32,
    point_radius: f32,
    axis_color: [u8; 3],
}

impl RerunLogger {
    /// Spawn a Rerun viewer and stream the calibration plot to it
    pub fn spawn(style: &PlotStyle) -> Result<Self> {
        let rec = RecordingStreamBuilder::new(APP_ID)
            .spawn()
            .map_err(|e| CalibrationError::Render(format!("Failed to spawn Rerun viewer: {}", e)))?;

        log::info!("[RERUN] Streaming to spawned viewer");
        Ok(Self::with_stream(rec, style))
    }

    /// Write the calibration plot to an .rrd recording instead of a live viewer
    /// Takes output path (e.g., "session_20251122_hard_iron.rrd")
    pub fn to_file(output_path: &Path, style: &PlotStyle) -> Result<Self> {
        let rec = RecordingStreamBuilder::new(APP_ID)
            .save(output_path)
            .map_err(|e| CalibrationError::Render(format!("Failed to create Rerun recording: {}", e)))?;

        log::info!("[RERUN] Recording initialized to: {}", output_path.display());
        Ok(Self::with_stream(rec, style))
    }

    fn with_stream(rec: rerun::RecordingStream, style: &PlotStyle) -> Self {
        RerunLogger {
            rec,
            // Rerun radii are in scene units, negative values are UI points
            line_radius: -style.line_width,
            point_radius: -style.point_radius,
            axis_color: style.axis_color,
        }
    }

    fn log<A: rerun::AsComponents>(&self, path: &str, archetype: &A) -> Result<()> {
        let entity = if path.is_empty() {
            ROOT.to_string()
        } else {
            format!("{}/{}", ROOT, path)
        };
        self.rec
            .log_timeless(entity, archetype)
            .map_err(|e| CalibrationError::Render(format!("Failed to log {}: {}", path, e)))
    }
}

fn color(rgb: [u8; 3]) -> Color {
    Color::from_rgb(rgb[0], rgb[1], rgb[2])
}

impl Visualizer for RerunLogger {
    fn render(&mut self, scene: &PlotScene) -> Result<()> {
        self.log("", &ViewCoordinates::RIGHT_HAND_Z_UP)?;
        self.log("title", &TextDocument::new(scene.title.as_str()))?;

        for sphere in &scene.spheres {
            self.log(
                sphere.label,
                &LineStrips3D::new(sphere.strips.iter().cloned())
                    .with_colors([color(sphere.color)])
                    .with_radii([self.line_radius]),
            )?;
        }

        for cloud in &scene.clouds {
            self.log(
                cloud.label,
                &Points3D::new(cloud.points.iter().copied())
                    .with_colors([color(cloud.color)])
                    .with_radii([self.point_radius]),
            )?;
        }

        let axes = LineStrips3D::new(scene.axes.iter().map(|a| vec![[0.0, 0.0, 0.0], a.end]))
            .with_colors([color(self.axis_color)])
            .with_radii([self.line_radius])
            .with_labels(scene.axes.iter().map(|a| a.label.clone()));
        self.log("axes", &axes)?;

        self.rec.flush_blocking();
        log::debug!(
            "[RERUN] Logged {} clouds, {} spheres",
            scene.clouds.len(),
            scene.spheres.len()
        );
        Ok(())
    }
}
