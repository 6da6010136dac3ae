//! Plot scene for raw vs. corrected magnetometer readings
//!
//! Builds the geometry (point clouds, wireframe calibration spheres, axes and
//! title) from a [`CalibrationReport`] without touching any graphics backend.
//! Backends implement [`Visualizer`].

use std::f64::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::calibration::HardIronEstimate;
use crate::error::Result;
use crate::pipeline::CalibrationReport;
use crate::types::FieldVec;

/// Explicit plot styling, passed to every render call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Raw samples and the offset-centred sphere
    pub raw_color: [u8; 3],
    /// Corrected samples and the origin-centred sphere
    pub corrected_color: [u8; 3],
    pub axis_color: [u8; 3],
    pub line_width: f32,
    pub point_radius: f32,
    /// Grid resolution around the azimuth (0..2pi)
    pub sphere_u_steps: usize,
    /// Grid resolution from pole to pole (0..pi)
    pub sphere_v_steps: usize,
    pub unit: String,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            raw_color: [255, 0, 0],
            corrected_color: [0, 0, 255],
            axis_color: [128, 128, 128],
            line_width: 0.5,
            point_radius: 2.0,
            sphere_u_steps: 20,
            sphere_v_steps: 10,
            unit: "gauss".to_string(),
        }
    }
}

impl PlotStyle {
    /// Load a style from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

pub type Point3 = [f32; 3];
pub type LineStrip = Vec<Point3>;

#[derive(Clone, Debug)]
pub struct PointCloud {
    pub label: &'static str,
    pub color: [u8; 3],
    pub points: Vec<Point3>,
}

#[derive(Clone, Debug)]
pub struct Wireframe {
    pub label: &'static str,
    pub color: [u8; 3],
    pub strips: Vec<LineStrip>,
}

#[derive(Clone, Debug)]
pub struct Axis {
    pub label: String,
    pub end: Point3,
}

/// Renderer-agnostic description of the calibration plot
#[derive(Clone, Debug)]
pub struct PlotScene {
    pub title: String,
    pub clouds: Vec<PointCloud>,
    pub spheres: Vec<Wireframe>,
    pub axes: Vec<Axis>,
}

impl PlotScene {
    pub fn build(report: &CalibrationReport, style: &PlotStyle) -> Self {
        let est = &report.estimate;
        let offset = est.offset_vec();

        let spheres = vec![
            Wireframe {
                label: "offset_sphere",
                color: style.raw_color,
                strips: sphere_wireframe(est.radius, &offset, style.sphere_u_steps, style.sphere_v_steps),
            },
            Wireframe {
                label: "origin_sphere",
                color: style.corrected_color,
                strips: sphere_wireframe(
                    est.radius,
                    &FieldVec::zeros(),
                    style.sphere_u_steps,
                    style.sphere_v_steps,
                ),
            },
        ];

        let clouds = vec![
            PointCloud {
                label: "raw",
                color: style.raw_color,
                points: report.raw.iter().map(to_point).collect(),
            },
            PointCloud {
                label: "corrected",
                color: style.corrected_color,
                points: report.corrected.iter().map(to_point).collect(),
            },
        ];

        let reach = (est.radius + offset.abs().max()) as f32 * 1.2;
        let axes = ["x", "y", "z"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut end = [0.0; 3];
                end[i] = reach;
                Axis {
                    label: format!("{} [{}]", name, style.unit),
                    end,
                }
            })
            .collect();

        PlotScene {
            title: plot_title(est),
            clouds,
            spheres,
            axes,
        }
    }
}

/// Renders a [`PlotScene`]; implementations own their output resources
pub trait Visualizer {
    fn render(&mut self, scene: &PlotScene) -> Result<()>;
}

pub fn plot_title(estimate: &HardIronEstimate) -> String {
    format!(
        "Hard iron offset: V_x = {:.3}, V_y = {:.3}, V_z = {:.3}",
        estimate.offset[0], estimate.offset[1], estimate.offset[2]
    )
}

fn to_point(v: &FieldVec) -> Point3 {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Wireframe sphere over a `u_steps` x `v_steps` grid of
/// azimuth `u` in [0, 2pi] and polar angle `v` in [0, pi].
///
/// Returns one strip per meridian (constant `u`) followed by one strip per
/// parallel (constant `v`).
pub fn sphere_wireframe(radius: f64, center: &FieldVec, u_steps: usize, v_steps: usize) -> Vec<LineStrip> {
    let us = Array1::linspace(0.0, 2.0 * PI, u_steps);
    let vs = Array1::linspace(0.0, PI, v_steps);
    let vertex = |u: f64, v: f64| -> Point3 {
        let p = FieldVec::new(u.cos() * v.sin(), u.sin() * v.sin(), v.cos()) * radius + center;
        to_point(&p)
    };

    let meridians = us
        .iter()
        .map(|&u| vs.iter().map(|&v| vertex(u, v)).collect::<LineStrip>());
    let parallels = vs
        .iter()
        .map(|&v| us.iter().map(|&u| vertex(u, v)).collect::<LineStrip>());
    meridians.chain(parallels).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn report() -> CalibrationReport {
        let raw = vec![FieldVec::new(0.6, -0.2, 0.05), FieldVec::new(-0.4, -0.2, 0.05)];
        let estimate = HardIronEstimate {
            offset: [0.1, -0.2, 0.05],
            radius: 0.5,
            sample_count: 2,
            rms_residual: 0.0,
        };
        let corrected = crate::calibration::correct(&raw, &estimate);
        CalibrationReport {
            estimate,
            raw,
            corrected,
            duration_s: 1.0,
        }
    }

    #[test]
    fn test_wireframe_vertices_on_sphere() {
        let center = FieldVec::new(0.1, -0.2, 0.05);
        let strips = sphere_wireframe(0.5, &center, 20, 10);
        assert_eq!(strips.len(), 30);
        assert!(strips[..20].iter().all(|s| s.len() == 10));
        assert!(strips[20..].iter().all(|s| s.len() == 20));
        for p in strips.iter().flatten() {
            let d = FieldVec::new(p[0] as f64, p[1] as f64, p[2] as f64) - center;
            assert_abs_diff_eq!(d.norm(), 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_wireframe_meridians_span_poles() {
        let strips = sphere_wireframe(2.0, &FieldVec::zeros(), 20, 10);
        let meridian = &strips[0];
        assert_abs_diff_eq!(meridian[0][2], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(meridian[9][2], -2.0, epsilon = 1e-6);
        // Parallels close on themselves: u runs over the full [0, 2pi]
        let parallel = &strips[25];
        assert_abs_diff_eq!(parallel[0][0], parallel[19][0], epsilon = 1e-6);
        assert_abs_diff_eq!(parallel[0][1], parallel[19][1], epsilon = 1e-6);
    }

    #[test]
    fn test_title_format() {
        let title = plot_title(&report().estimate);
        assert_eq!(title, "Hard iron offset: V_x = 0.100, V_y = -0.200, V_z = 0.050");
    }

    #[test]
    fn test_scene_layout() {
        let style = PlotStyle::default();
        let scene = PlotScene::build(&report(), &style);
        assert_eq!(scene.clouds.len(), 2);
        assert_eq!(scene.clouds[0].label, "raw");
        assert_eq!(scene.clouds[0].color, style.raw_color);
        assert_eq!(scene.clouds[1].points[0], [0.5, 0.0, 0.0]);
        assert_eq!(scene.spheres[0].color, [255, 0, 0]);
        assert_eq!(scene.spheres[1].color, [0, 0, 255]);
        assert_eq!(scene.axes[2].label, "z [gauss]");
    }

    #[test]
    fn test_style_partial_json() {
        let style: PlotStyle = serde_json::from_str(r#"{"raw_color": [0, 255, 0], "unit": "uT"}"#).unwrap();
        assert_eq!(style.raw_color, [0, 255, 0]);
        assert_eq!(style.corrected_color, [0, 0, 255]);
        assert_eq!(style.unit, "uT");
    }

    struct RecordingVisualizer {
        titles: Vec<String>,
    }

    impl Visualizer for RecordingVisualizer {
        fn render(&mut self, scene: &PlotScene) -> Result<()> {
            self.titles.push(scene.title.clone());
            Ok(())
        }
    }

    #[test]
    fn test_visualizer_seam() {
        let mut vis = RecordingVisualizer { titles: Vec::new() };
        let scene = PlotScene::build(&report(), &PlotStyle::default());
        vis.render(&scene).unwrap();
        assert_eq!(vis.titles, vec![scene.title]);
    }
}
